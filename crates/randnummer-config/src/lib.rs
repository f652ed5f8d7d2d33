use randnummer_engine::EngineOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },
}

/// Settings of the border number engine and the command-line host.
/// Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Label of freshly wrapped border numbers until renumbering runs
    pub placeholder_label: String,
    pub first_number: usize,
    /// Tag names marking serialized border numbers in pasted HTML
    pub marker_tags: Vec<String>,
    /// Base directory for relative document paths
    #[serde(skip_serializing_if = "Option::is_none")]
    pub documents_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        let options = EngineOptions::default();
        Self {
            placeholder_label: options.placeholder_label,
            first_number: options.first_number,
            marker_tags: options.marker_tags,
            documents_path: None,
        }
    }
}

impl Config {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let mut config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        // Expand shell variables and tilde in the documents path
        config.documents_path = config
            .documents_path
            .map(|path| Self::expand_path(&path).unwrap_or(path));

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        self.save_to_path(&config_path)
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/randnummer");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            placeholder_label: self.placeholder_label.clone(),
            first_number: self.first_number,
            marker_tags: self.marker_tags.clone(),
        }
    }

    /// Resolve a document path given on the command line. Relative paths
    /// are taken from `documents_path` when one is configured.
    pub fn document_path<P: AsRef<Path>>(&self, path: P) -> PathBuf {
        let path = path.as_ref();
        match &self.documents_path {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }

    fn expand_path(path: &Path) -> Option<PathBuf> {
        let path_str = path.to_string_lossy();
        match shellexpand::full(&path_str) {
            Ok(expanded) => Some(PathBuf::from(expanded.as_ref())),
            Err(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::env;
    use tempfile::TempDir;

    #[test]
    fn test_config_path() {
        let config_path = Config::config_path();
        let path_str = config_path.to_string_lossy();

        assert!(!path_str.starts_with('~'));
        assert!(path_str.ends_with(".config/randnummer/config.toml"));
    }

    #[test]
    fn test_defaults_match_engine_options() {
        assert_eq!(Config::default().engine_options(), EngineOptions::default());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let config: Config = toml::from_str("first_number = 10\n").unwrap();

        assert_eq!(config.first_number, 10);
        assert_eq!(config.placeholder_label, "0");
        assert_eq!(config.marker_tags, EngineOptions::default().marker_tags);
        assert_eq!(config.documents_path, None);
    }

    #[test]
    fn test_engine_options_from_file_values() {
        let config: Config = toml::from_str(
            r#"
placeholder_label = "?"
first_number = 3
marker_tags = ["rn", "rn-label"]
"#,
        )
        .unwrap();

        let options = config.engine_options();
        assert_eq!(options.placeholder_label, "?");
        assert_eq!(options.first_number, 3);
        assert_eq!(options.marker_tags, vec!["rn".to_string(), "rn-label".to_string()]);
    }

    #[test]
    fn test_expand_path_with_tilde() {
        let expanded = Config::expand_path(&PathBuf::from("~/test/path")).unwrap();

        assert!(!expanded.to_string_lossy().starts_with('~'));
        assert!(expanded.to_string_lossy().contains("test/path"));
    }

    #[test]
    fn test_expand_path_with_absolute_path() {
        let path = PathBuf::from("/absolute/path");
        assert_eq!(Config::expand_path(&path).unwrap(), path);
    }

    #[test]
    fn test_load_config_file_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let non_existent_config = temp_dir.path().join("nonexistent.toml");

        let result = Config::load_from_path(&non_existent_config).unwrap();

        assert!(result.is_none());
    }

    #[test]
    fn test_load_invalid_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.toml");
        std::fs::write(&config_file, "first_number = \"one\"").unwrap();

        let result = Config::load_from_path(&config_file);

        assert!(matches!(result, Err(ConfigError::ConfigParseError { .. })));
    }

    #[test]
    fn test_save_and_load_config() {
        // Given a config in a directory that does not exist yet
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("randnummer/config.toml");
        let test_config = Config {
            first_number: 5,
            documents_path: Some(PathBuf::from("/tmp/documents")),
            ..Config::default()
        };

        // When saving and loading it again
        test_config.save_to_path(&config_file).unwrap();
        let loaded_config = Config::load_from_path(&config_file).unwrap().unwrap();

        // Then nothing is lost
        assert_eq!(loaded_config, test_config);
    }

    #[test]
    fn test_documents_path_with_env_var() {
        unsafe {
            env::set_var("RANDNUMMER_TEST_DOCS", "/custom/docs");
        }

        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.toml");
        std::fs::write(
            &config_file,
            "documents_path = \"$RANDNUMMER_TEST_DOCS/legal\"\n",
        )
        .unwrap();

        let config = Config::load_from_path(&config_file).unwrap().unwrap();
        assert_eq!(config.documents_path, Some(PathBuf::from("/custom/docs/legal")));

        unsafe {
            env::remove_var("RANDNUMMER_TEST_DOCS");
        }
    }

    #[test]
    fn test_document_path_resolution() {
        let config = Config {
            documents_path: Some(PathBuf::from("/docs")),
            ..Config::default()
        };

        assert_eq!(config.document_path("a.json"), PathBuf::from("/docs/a.json"));
        assert_eq!(config.document_path("/abs/a.json"), PathBuf::from("/abs/a.json"));
        assert_eq!(Config::default().document_path("a.json"), PathBuf::from("a.json"));
    }
}
