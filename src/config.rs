//! # Configuration Module
//!
//! Two layers of configuration:
//!
//! - [`AppConfig`] - where the site lives: view, layout and element
//!   directories, the failure log directory, the database configuration
//!   path and the layout/view names used by the error page. Loaded once at
//!   startup from `<root>/config/app.yaml` (optional, every key has a
//!   default).
//! - [`ConfigLoader`] - the collaborator every controller uses at
//!   construction time to read the database configuration. A missing file
//!   is a [`DispatchError::ConfigurationNotFound`].
//!
//! ## Environment Variables
//!
//! ### `FRONTCTL_LOG_DIR`
//!
//! Overrides `log_dir`. Relative values resolve against the site root.
//!
//! ## Example `config/app.yaml`
//!
//! ```yaml
//! view_dir: view
//! template_dir: view/template
//! element_dir: view/elements
//! log_dir: logs
//! database_config: config/database.yaml
//! default_template: default
//! error_template: error
//! error_view: exceptions/error
//! ```

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;
use tracing::debug;

use crate::error::DispatchError;

/// Name of the optional application config file under `<root>/config/`.
pub const APP_CONFIG_FILE: &str = "app.yaml";

/// Site layout and error-page settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    #[serde(skip)]
    pub root: PathBuf,
    pub view_dir: PathBuf,
    pub template_dir: PathBuf,
    pub element_dir: PathBuf,
    pub log_dir: PathBuf,
    pub database_config: PathBuf,
    pub default_template: String,
    pub error_template: String,
    pub error_view: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            view_dir: PathBuf::from("view"),
            template_dir: PathBuf::from("view/template"),
            element_dir: PathBuf::from("view/elements"),
            log_dir: PathBuf::from("logs"),
            database_config: PathBuf::from("config/database.yaml"),
            default_template: "default".to_string(),
            error_template: "error".to_string(),
            error_view: "exceptions/error".to_string(),
        }
    }
}

impl AppConfig {
    /// Load `<root>/config/app.yaml` if present, apply environment
    /// overrides and resolve every path against `root`.
    pub fn load(root: &Path) -> anyhow::Result<Self> {
        let file = root.join("config").join(APP_CONFIG_FILE);
        let mut config = if file.is_file() {
            let content = fs::read_to_string(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            serde_yaml::from_str::<AppConfig>(&content)
                .with_context(|| format!("failed to parse {}", file.display()))?
        } else {
            debug!(path = %file.display(), "No application config, using defaults");
            AppConfig::default()
        };

        if let Ok(dir) = env::var("FRONTCTL_LOG_DIR") {
            config.log_dir = PathBuf::from(dir);
        }

        Ok(config.rooted_at(root))
    }

    /// Resolve relative paths against `root`.
    #[must_use]
    pub fn rooted_at(mut self, root: &Path) -> Self {
        self.root = root.to_path_buf();
        for path in [
            &mut self.view_dir,
            &mut self.template_dir,
            &mut self.element_dir,
            &mut self.log_dir,
            &mut self.database_config,
        ] {
            if path.is_relative() {
                *path = root.join(&*path);
            }
        }
        self
    }
}

/// Database connection settings read by every controller on construction.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DatabaseConfig {
    pub driver: String,
    pub host: String,
    #[serde(default)]
    pub port: Option<u16>,
    pub name: String,
    pub user: String,
    #[serde(default)]
    pub password: String,
}

/// Reads the fixed-path database configuration resource.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    database_path: PathBuf,
}

impl ConfigLoader {
    #[must_use]
    pub fn new(database_path: impl Into<PathBuf>) -> Self {
        Self {
            database_path: database_path.into(),
        }
    }

    #[must_use]
    pub fn from_app(config: &AppConfig) -> Self {
        Self::new(config.database_config.clone())
    }

    #[must_use]
    pub fn database_path(&self) -> &Path {
        &self.database_path
    }

    pub fn load_database(&self) -> Result<DatabaseConfig, DispatchError> {
        if !self.database_path.is_file() {
            return Err(DispatchError::ConfigurationNotFound(
                self.database_path.clone(),
            ));
        }
        let content = fs::read_to_string(&self.database_path)?;
        let config = serde_yaml::from_str(&content).with_context(|| {
            format!(
                "invalid database configuration {}",
                self.database_path.display()
            )
        })?;
        debug!(path = %self.database_path.display(), "Database configuration loaded");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_rooted() {
        let root = Path::new("/srv/site");
        let config = AppConfig::default().rooted_at(root);
        assert_eq!(config.view_dir, PathBuf::from("/srv/site/view"));
        assert_eq!(
            config.database_config,
            PathBuf::from("/srv/site/config/database.yaml")
        );
        assert_eq!(config.error_view, "exceptions/error");
    }

    #[test]
    fn test_load_partial_app_config() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("config")).unwrap();
        fs::write(
            dir.path().join("config/app.yaml"),
            "view_dir: pages\ndefault_template: plain\n",
        )
        .unwrap();

        let config = AppConfig::load(dir.path()).unwrap();
        assert_eq!(config.view_dir, dir.path().join("pages"));
        assert_eq!(config.default_template, "plain");
        assert_eq!(config.template_dir, dir.path().join("view/template"));
    }

    #[test]
    fn test_missing_database_config() {
        let loader = ConfigLoader::new("/definitely/not/here/database.yaml");
        let err = loader.load_database().unwrap_err();
        assert!(matches!(err, DispatchError::ConfigurationNotFound(ref p)
            if p == Path::new("/definitely/not/here/database.yaml")));
    }

    #[test]
    fn test_load_database_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("database.yaml");
        fs::write(
            &path,
            "driver: mysql\nhost: localhost\nport: 3306\nname: app\nuser: root\n",
        )
        .unwrap();

        let db = ConfigLoader::new(&path).load_database().unwrap();
        assert_eq!(db.driver, "mysql");
        assert_eq!(db.port, Some(3306));
        assert_eq!(db.password, "");
    }

    #[test]
    fn test_invalid_database_config_is_unclassified() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("database.yaml");
        fs::write(&path, "driver: [unterminated").unwrap();
        let err = ConfigLoader::new(&path).load_database().unwrap_err();
        assert_eq!(err.kind(), crate::error::FailureKind::UnclassifiedFailure);
    }
}
