use anyhow::{Context, Result, bail};
use randnummer_config::Config;
use randnummer_engine::{
    Editor, FollowUp, LinkSpan, Node, Selection, border_number_labels,
    border_number_links, io,
};
use std::{env, path::PathBuf, process};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Show,
    Links,
    Renumber,
    Wrap { from: usize, to: usize },
    Unwrap { from: usize, to: usize },
    Backspace { from: usize, to: usize },
    Paste { payload: PathBuf, at: usize },
    Drop { payload: PathBuf, at: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Invocation {
    command: Command,
    document: PathBuf,
    write: bool,
}

const USAGE: &str = "\
Usage: randnummer <command> <document.json> [arguments] [--write]

Commands:
  show                           print the document
  links                          list border number links and their status
  renumber                       make all labels sequential
  wrap <from> [<to>]             wrap the paragraphs in the range
  unwrap <from> [<to>]           unwrap the border numbers in the range
  backspace <from> [<to>]        press Backspace with the given selection
  paste <payload> <at>           paste a payload (.json, .html, .txt) with the caret at <at>
  drop <payload> <at>            drop a payload at <at>

--write saves the result back to the document.";

fn parse_args(args: &[String]) -> Result<Invocation> {
    let write = args.iter().any(|arg| arg == "--write");
    let args: Vec<&str> = args
        .iter()
        .map(String::as_str)
        .filter(|arg| *arg != "--write")
        .collect();

    let [name, document, rest @ ..] = args.as_slice() else {
        bail!("Missing command or document");
    };
    let position = |index: usize, what: &str| -> Result<usize> {
        let arg = rest
            .get(index)
            .with_context(|| format!("Missing {what} position"))?;
        arg.parse()
            .with_context(|| format!("Invalid {what} position '{arg}'"))
    };
    let range = || -> Result<(usize, usize)> {
        let from = position(0, "start")?;
        let to = if rest.len() > 1 { position(1, "end")? } else { from };
        Ok((from, to))
    };
    let payload = || -> Result<PathBuf> {
        rest.first()
            .map(PathBuf::from)
            .context("Missing payload file")
    };

    let command = match *name {
        "show" => Command::Show,
        "links" => Command::Links,
        "renumber" => Command::Renumber,
        "wrap" => {
            let (from, to) = range()?;
            Command::Wrap { from, to }
        }
        "unwrap" => {
            let (from, to) = range()?;
            Command::Unwrap { from, to }
        }
        "backspace" => {
            let (from, to) = range()?;
            Command::Backspace { from, to }
        }
        "paste" => Command::Paste {
            payload: payload()?,
            at: position(1, "caret")?,
        },
        "drop" => Command::Drop {
            payload: payload()?,
            at: position(1, "drop")?,
        },
        other => bail!("Unknown command '{other}'"),
    };

    Ok(Invocation {
        command,
        document: PathBuf::from(document),
        write,
    })
}

fn load_config() -> Config {
    match Config::load() {
        Ok(Some(config)) => config,
        Ok(None) => {
            log::debug!(
                "No config file at {}, using defaults",
                Config::config_path().display()
            );
            Config::default()
        }
        Err(e) => {
            log::warn!("Ignoring config file: {e}");
            Config::default()
        }
    }
}

fn run(invocation: &Invocation, config: &Config) -> Result<()> {
    let path = config.document_path(&invocation.document);
    let doc = io::read_document(&path)
        .with_context(|| format!("Failed to load document '{}'", path.display()))?;

    let mut editor = Editor::new(doc, config.engine_options());
    let changed = apply(&mut editor, &invocation.command, config)?;
    let follow_up = editor.settle();

    print_document(editor.doc());
    report(&invocation.command, changed, &follow_up);
    for report in editor.services_mut().take_reports() {
        for link in &report.links {
            println!("invalidated link: {}", describe_link(link));
        }
    }

    if invocation.write {
        io::write_document(&path, editor.doc())
            .with_context(|| format!("Failed to write document '{}'", path.display()))?;
        log::info!("Saved {}", path.display());
    }
    Ok(())
}

/// Run one command; returns whether the command handled the input
fn apply(editor: &mut Editor, command: &Command, config: &Config) -> Result<bool> {
    let changed = match command {
        Command::Show => false,
        Command::Links => {
            for link in border_number_links(editor.doc()) {
                println!("{}", describe_link(&link));
            }
            false
        }
        Command::Renumber => editor.renumber(),
        Command::Wrap { from, to } => {
            editor.set_selection(Selection::new(*from, *to));
            editor.add_border_numbers()
        }
        Command::Unwrap { from, to } => {
            editor.set_selection(Selection::new(*from, *to));
            editor.remove_border_numbers()
        }
        Command::Backspace { from, to } => {
            editor.set_selection(Selection::new(*from, *to));
            editor.backspace()
        }
        Command::Paste { payload, at } => {
            let payload = io::read_payload(&config.document_path(payload))?;
            editor.set_selection(Selection::caret(*at));
            editor.paste(&payload)
        }
        Command::Drop { payload, at } => {
            let payload = io::read_payload(&config.document_path(payload))?;
            editor.drop_content(&payload, *at)
        }
    };
    Ok(changed)
}

fn print_document(doc: &Node) {
    println!("{doc}");
    let labels = border_number_labels(doc);
    if !labels.is_empty() {
        println!("labels: {}", labels.join(", "));
    }
}

fn report(command: &Command, changed: bool, follow_up: &FollowUp) {
    if matches!(command, Command::Show | Command::Links) {
        return;
    }
    if !changed {
        println!("not handled");
    }
    if follow_up.renumber {
        println!("renumbered");
    }
}

fn describe_link(link: &LinkSpan) -> String {
    let status = if link.status.is_valid() {
        "valid"
    } else {
        "invalid"
    };
    format!("Rn. {} at {}..{} ({status})", link.nr, link.from, link.to)
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();
    let invocation = match parse_args(&args[1.min(args.len())..]) {
        Ok(invocation) => invocation,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("{USAGE}");
            process::exit(1);
        }
    };

    let config = load_config();
    log::debug!("Engine options: {:?}", config.engine_options());

    if let Err(e) = run(&invocation, &config) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn args(line: &str) -> Vec<String> {
        line.split_whitespace().map(String::from).collect()
    }

    #[test]
    fn test_parse_range_commands() {
        let invocation = parse_args(&args("wrap doc.json 3 9 --write")).unwrap();
        assert_eq!(
            invocation,
            Invocation {
                command: Command::Wrap { from: 3, to: 9 },
                document: PathBuf::from("doc.json"),
                write: true,
            }
        );
    }

    #[test]
    fn test_single_position_is_a_caret() {
        let invocation = parse_args(&args("backspace doc.json 6")).unwrap();
        assert_eq!(invocation.command, Command::Backspace { from: 6, to: 6 });
        assert!(!invocation.write);
    }

    #[test]
    fn test_parse_paste() {
        let invocation = parse_args(&args("paste doc.json clip.html 4")).unwrap();
        assert_eq!(
            invocation.command,
            Command::Paste {
                payload: PathBuf::from("clip.html"),
                at: 4,
            }
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_args(&args("")).is_err());
        assert!(parse_args(&args("wrap doc.json")).is_err());
        assert!(parse_args(&args("wrap doc.json x")).is_err());
        assert!(parse_args(&args("paste doc.json clip.html")).is_err());
        assert!(parse_args(&args("explode doc.json")).is_err());
    }
}
