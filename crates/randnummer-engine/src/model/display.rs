use std::fmt;

use crate::model::{Mark, Node, NodeType};

/// Compact notation used in logs and tests, e.g.
/// `doc(bn(num("1"), content(p("Text ", link[2]("Rn. 2")))))`
impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(text) = self.text_str() {
            return write_text(f, text, self.marks());
        }

        let name = match self.kind() {
            NodeType::Doc => "doc",
            NodeType::Paragraph => "p",
            NodeType::BorderNumber => "bn",
            NodeType::BorderNumberNumber => "num",
            NodeType::BorderNumberContent => "content",
            NodeType::Text => "text",
        };
        write!(f, "{name}(")?;
        for (i, child) in self.content().iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{child}")?;
        }
        f.write_str(")")
    }
}

fn write_text(f: &mut fmt::Formatter<'_>, text: &str, marks: &[Mark]) -> fmt::Result {
    for mark in marks {
        match mark {
            Mark::Strong => f.write_str("strong(")?,
            Mark::Emphasis => f.write_str("em(")?,
            Mark::BorderNumberLink { nr } => write!(f, "link[{nr}](")?,
        }
    }
    write!(f, "{text:?}")?;
    for _ in marks {
        f.write_str(")")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::model::{Mark, Node};
    use crate::tests::{bn, doc, link, p};
    use insta::assert_snapshot;

    #[test]
    fn test_display_border_number_document() {
        let d = doc(vec![
            bn("1", vec![Node::paragraph(vec![Node::text("See "), link("2", "Rn. 2")])]),
            p(""),
        ]);
        assert_snapshot!(d.to_string(), @r#"doc(bn(num("1"), content(p("See ", link[2]("Rn. 2")))), p())"#);
    }

    #[test]
    fn test_display_nested_marks() {
        let para = Node::paragraph(vec![Node::text_with_marks(
            "x",
            vec![Mark::Strong, Mark::Emphasis],
        )]);
        assert_snapshot!(para.to_string(), @r#"p(strong(em("x")))"#);
    }
}
