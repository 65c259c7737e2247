//! `sayit.json` plus environment overrides.
//!
//! Precedence, lowest first: config file, `SAYIT_DB` / `SAYIT_COMMIT`,
//! command-line flags.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

const DEFAULT_CONFIG: &str = "sayit.json";

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: Option<PathBuf>,
    pub commit: bool,
    pub instance_prefix: Option<String>,
}

impl Config {
    /// Read `path`, or `./sayit.json` when no path is given and it exists.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let config = match path {
            Some(path) => Self::read(path)?,
            None if Path::new(DEFAULT_CONFIG).exists() => Self::read(Path::new(DEFAULT_CONFIG))?,
            None => Self::default(),
        };
        Ok(config.with_overrides(
            std::env::var("SAYIT_DB").ok(),
            std::env::var("SAYIT_COMMIT").ok(),
        ))
    }

    fn read(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&content).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Apply environment values. An unparseable `commit` value is ignored.
    pub fn with_overrides(mut self, database: Option<String>, commit: Option<String>) -> Self {
        if let Some(db) = database.filter(|d| !d.is_empty()) {
            self.database = Some(PathBuf::from(db));
        }
        self.commit = commit
            .and_then(|v| parse_flag(&v))
            .unwrap_or(self.commit);
        self
    }

    /// Flag, then config, then the per-user default.
    pub fn database_path(&self, flag: Option<&Path>) -> anyhow::Result<PathBuf> {
        if let Some(path) = flag.or(self.database.as_deref()) {
            return Ok(path.to_path_buf());
        }
        Ok(sayit_store::default_db_path()?)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Some(true),
        "0" | "false" | "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sayit.json");
        std::fs::write(
            &path,
            r#"{"database": "/tmp/s.db", "commit": true, "instance_prefix": "test-"}"#,
        )
        .unwrap();
        let config = Config::read(&path).unwrap();
        assert_eq!(config.database.as_deref(), Some(Path::new("/tmp/s.db")));
        assert!(config.commit);
        assert_eq!(config.instance_prefix.as_deref(), Some("test-"));
    }

    #[test]
    fn missing_keys_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("c.json");
        std::fs::write(&path, "{}").unwrap();
        assert_eq!(Config::read(&path).unwrap(), Config::default());
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        assert!(Config::read(Path::new("/nonexistent/sayit.json")).is_err());
    }

    #[test]
    fn environment_overrides() {
        let config = Config::default().with_overrides(Some("/data/x.db".into()), Some("yes".into()));
        assert_eq!(config.database.as_deref(), Some(Path::new("/data/x.db")));
        assert!(config.commit);

        let kept = Config {
            commit: true,
            ..Config::default()
        }
        .with_overrides(None, Some("maybe".into()));
        assert!(kept.commit);
        assert_eq!(kept.database, None);
    }

    #[test]
    fn flag_wins_over_config() {
        let config = Config {
            database: Some(PathBuf::from("/from/config.db")),
            ..Config::default()
        };
        assert_eq!(
            config.database_path(Some(Path::new("/from/flag.db"))).unwrap(),
            PathBuf::from("/from/flag.db")
        );
        assert_eq!(
            config.database_path(None).unwrap(),
            PathBuf::from("/from/config.db")
        );
    }
}
