use std::path::PathBuf;

use eyre::Result;
use log::debug;
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub languages: Option<Vec<String>>,
    pub artifact_path: Option<PathBuf>,
    pub strict_persist: Option<bool>,
}

impl Config {
    /// Load config from ~/.config/ytscribe/config.toml if it exists
    pub fn load() -> Result<Self> {
        let path = config_path();
        if path.exists() {
            debug!("Loading config from {}", path.display());
            let content = std::fs::read_to_string(&path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            debug!("No config file found at {}", path.display());
            Ok(Config::default())
        }
    }
}

pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from(".config"))
        .join("ytscribe")
        .join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let toml_str = r#"
host = "0.0.0.0"
port = 8080
languages = ["en", "de"]
artifact_path = "/var/lib/ytscribe/last.json"
strict_persist = true
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.host.as_deref(), Some("0.0.0.0"));
        assert_eq!(config.port, Some(8080));
        assert_eq!(config.languages, Some(vec!["en".to_string(), "de".to_string()]));
        assert_eq!(config.artifact_path, Some(PathBuf::from("/var/lib/ytscribe/last.json")));
        assert_eq!(config.strict_persist, Some(true));
    }

    #[test]
    fn test_parse_empty_config() {
        let toml_str = "";
        let config: Config = toml::from_str(toml_str).unwrap();
        assert!(config.host.is_none());
        assert!(config.languages.is_none());
    }

    #[test]
    fn test_parse_partial_config() {
        let toml_str = r#"port = 5001"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.port, Some(5001));
        assert!(config.artifact_path.is_none());
    }

    #[test]
    fn test_parse_rejects_bad_port() {
        let toml_str = r#"port = "http""#;
        assert!(toml::from_str::<Config>(toml_str).is_err());
    }
}
