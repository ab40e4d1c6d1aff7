use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::vault::excerpt;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub notes: NotesConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct NotesConfig {
    pub vault_path: String,
    pub extensions: Vec<String>,
    pub default_limit: usize,
    pub max_limit: usize,
    pub excerpt_chars: usize,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

impl Default for NotesConfig {
    fn default() -> Self {
        Self {
            vault_path: "./vault".to_string(),
            extensions: vec!["md".to_string(), "markdown".to_string(), "txt".to_string()],
            default_limit: 20,
            max_limit: 100,
            excerpt_chars: excerpt::DEFAULT_CHARS_AROUND,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl ServerConfig {
    /// Socket address string suitable for `TcpListener::bind`.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Config {
    /// Load configuration from a TOML file, then apply environment overrides.
    ///
    /// A missing file is not an error: every key has a default.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            Self::from_file(path)?
        } else {
            Config::default()
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        toml::from_str(&content).context("Failed to parse config file")
    }

    /// Override file values with `VAULT_PATH`, `HOST` and `PORT`.
    fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(vault_path) = lookup("VAULT_PATH") {
            self.notes.vault_path = vault_path;
        }
        if let Some(host) = lookup("HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("PORT") {
            self.server.port = port
                .trim()
                .parse()
                .with_context(|| format!("PORT must be a valid port number, got `{}`", port))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_config_parsing() {
        let toml_str = r#"
            [server]
            host = "0.0.0.0"
            port = 9000

            [notes]
            vault_path = "/data/vault"
            extensions = ["md"]
            default_limit = 5
            max_limit = 50
            excerpt_chars = 40

            [logging]
            level = "debug"
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.address(), "0.0.0.0:9000");
        assert_eq!(config.notes.vault_path, "/data/vault");
        assert_eq!(config.notes.extensions, vec!["md"]);
        assert_eq!(config.notes.max_limit, 50);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config = toml::from_str("[notes]\nvault_path = \"notes\"\n").unwrap();
        assert_eq!(config.notes.vault_path, "notes");
        assert_eq!(config.notes.default_limit, 20);
        assert_eq!(config.notes.extensions.len(), 3);
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> =
            HashMap::from([("VAULT_PATH", "/srv/vault"), ("PORT", "3001")]);
        let mut config = Config::default();
        config
            .apply_overrides(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.notes.vault_path, "/srv/vault");
        assert_eq!(config.server.port, 3001);
        assert_eq!(config.server.host, "127.0.0.1");
    }

    #[test]
    fn test_invalid_port_override_fails() {
        let mut config = Config::default();
        let err = config
            .apply_overrides(|key| (key == "PORT").then(|| "not-a-port".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::from_file(dir.path().join("absent.toml"));
        assert!(config.is_err());

        let loaded = Config::load(dir.path().join("absent.toml")).unwrap();
        assert_eq!(loaded.notes.max_limit, 100);
    }
}
