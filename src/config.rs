//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults (`wx_binding` → `archive_sqlite` → `archive/weewx.sdb`)
//! 2. Config file: `--config`, `$WXCTL_CONFIG`, or `$XDG_CONFIG_HOME/wxctl/wxctl.toml`
//! 3. Environment variables: `WXCTL_*` prefix (currently `WXCTL_ROOT`)
//!
//! Relative database paths resolve against `root`, which itself defaults
//! to the directory holding the config file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::actions::DEFAULT_BINDING;
use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::expand_env_vars;
use crate::domain::schema::DEFAULT_TABLE_NAME;

const DEFAULT_DATABASE: &str = "archive_sqlite";
const DEFAULT_DATABASE_PATH: &str = "archive/weewx.sdb";

/// A named data binding: which database, and which table inside it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BindingConfig {
    /// Key into `[databases]`
    pub database: String,
    /// Archive table name
    pub table_name: String,
}

impl Default for BindingConfig {
    fn default() -> Self {
        Self {
            database: DEFAULT_DATABASE.into(),
            table_name: DEFAULT_TABLE_NAME.into(),
        }
    }
}

/// A SQLite database file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DatabaseConfig {
    /// Absolute, or relative to `root`
    pub path: PathBuf,
}

/// Unified configuration for wxctl.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Base directory for relative database paths
    pub root: Option<PathBuf>,
    pub bindings: BTreeMap<String, BindingConfig>,
    pub databases: BTreeMap<String, DatabaseConfig>,
    /// Directory of the file these settings came from
    #[serde(skip)]
    pub config_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        let mut bindings = BTreeMap::new();
        bindings.insert(DEFAULT_BINDING.to_string(), BindingConfig::default());
        let mut databases = BTreeMap::new();
        databases.insert(
            DEFAULT_DATABASE.to_string(),
            DatabaseConfig {
                path: PathBuf::from(DEFAULT_DATABASE_PATH),
            },
        );
        Self {
            root: None,
            bindings,
            databases,
            config_dir: None,
        }
    }
}

/// A binding resolved to a concrete database file and table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedBinding {
    pub name: String,
    pub table_name: String,
    pub database: PathBuf,
}

/// Get the XDG config directory for wxctl.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "wxctl").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the default config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("wxctl.toml"))
}

/// Data directory used as root when no config file is involved.
fn default_data_dir() -> PathBuf {
    ProjectDirs::from("", "", "wxctl")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

impl Settings {
    /// Load settings from an explicit config file. The file must exist.
    pub fn load(path: &Path) -> ApplicationResult<Self> {
        debug!("load: {}", path.display());
        if !path.is_file() {
            return Err(ApplicationError::ConfigNotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
            message: format!("read {}: {}", path.display(), e),
        })?;
        let mut settings: Self = toml::from_str(&content).map_err(|e| ApplicationError::Config {
            message: format!("parse {}: {}", path.display(), e),
        })?;
        settings.config_dir = path.parent().map(Path::to_path_buf);
        settings.finalize()
    }

    /// Load the default config file if it exists, otherwise compiled defaults.
    pub fn load_default(default_path: Option<&Path>) -> ApplicationResult<Self> {
        match default_path {
            Some(path) if path.is_file() => Self::load(path),
            _ => {
                debug!("load_default: no config file, using compiled defaults");
                Self::default().finalize()
            }
        }
    }

    fn finalize(self) -> ApplicationResult<Self> {
        let mut settings = Self::apply_env_overrides(self)?;
        settings.expand_paths();
        Ok(settings)
    }

    /// Apply WXCTL_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> ApplicationResult<Self> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("WXCTL")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("root") {
            settings.root = Some(PathBuf::from(val));
        }
        Ok(settings)
    }

    /// Expand `~` and `$VAR` in path-like fields.
    fn expand_paths(&mut self) {
        if let Some(root) = &self.root {
            self.root = Some(PathBuf::from(expand_env_vars(&root.to_string_lossy())));
        }
        for db in self.databases.values_mut() {
            db.path = PathBuf::from(expand_env_vars(&db.path.to_string_lossy()));
        }
    }

    /// Directory relative database paths resolve against.
    pub fn base_dir(&self) -> PathBuf {
        match (&self.root, &self.config_dir) {
            (Some(root), Some(dir)) if root.is_relative() => dir.join(root),
            (Some(root), _) => root.clone(),
            (None, Some(dir)) => dir.clone(),
            (None, None) => default_data_dir(),
        }
    }

    /// Resolve a binding name to its database file and archive table.
    pub fn resolve_binding(&self, name: &str) -> ApplicationResult<ResolvedBinding> {
        let binding = self
            .bindings
            .get(name)
            .ok_or_else(|| ApplicationError::BindingNotFound {
                name: name.to_string(),
                available: self.bindings.keys().cloned().collect::<Vec<_>>().join(", "),
            })?;
        let database = self.databases.get(&binding.database).ok_or_else(|| {
            ApplicationError::DatabaseNotConfigured {
                binding: name.to_string(),
                database: binding.database.clone(),
            }
        })?;
        let path = if database.path.is_absolute() {
            database.path.clone()
        } else {
            self.base_dir().join(&database.path)
        };
        debug!("resolve_binding: {} -> {}:{}", name, path.display(), binding.table_name);
        Ok(ResolvedBinding {
            name: name.to_string(),
            table_name: binding.table_name.clone(),
            database: path,
        })
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> ApplicationResult<String> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# wxctl configuration
#
# Location: ~/.config/wxctl/wxctl.toml, or pass --config / set WXCTL_CONFIG.
# WXCTL_ROOT overrides `root`.

# Directory that relative database paths resolve against.
# Default: the directory containing this file.
# root = "~/weather"

# A binding names a database and the archive table inside it.
[bindings.wx_binding]
database = "archive_sqlite"
table_name = "archive"

[databases.archive_sqlite]
path = "archive/weewx.sdb"
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_defaults_when_resolving_default_binding_then_points_at_archive_table() {
        let settings = Settings {
            config_dir: Some(PathBuf::from("/etc/wx")),
            ..Settings::default()
        };
        let resolved = settings.resolve_binding(DEFAULT_BINDING).unwrap();
        assert_eq!(resolved.table_name, "archive");
        assert_eq!(resolved.database, PathBuf::from("/etc/wx/archive/weewx.sdb"));
    }

    #[test]
    fn given_unknown_binding_when_resolving_then_lists_available() {
        let err = Settings::default().resolve_binding("nope").unwrap_err();
        match err {
            ApplicationError::BindingNotFound { name, available } => {
                assert_eq!(name, "nope");
                assert_eq!(available, "wx_binding");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn given_binding_with_missing_database_when_resolving_then_fails() {
        let mut settings = Settings::default();
        settings.bindings.insert(
            "other".into(),
            BindingConfig {
                database: "missing".into(),
                table_name: "archive".into(),
            },
        );
        assert!(matches!(
            settings.resolve_binding("other"),
            Err(ApplicationError::DatabaseNotConfigured { .. })
        ));
    }

    #[test]
    fn given_relative_root_when_computing_base_dir_then_joins_config_dir() {
        let settings = Settings {
            root: Some(PathBuf::from("data")),
            config_dir: Some(PathBuf::from("/etc/wx")),
            ..Settings::default()
        };
        assert_eq!(settings.base_dir(), PathBuf::from("/etc/wx/data"));
    }

    #[test]
    fn given_absolute_root_when_computing_base_dir_then_wins() {
        let settings = Settings {
            root: Some(PathBuf::from("/srv/weather")),
            config_dir: Some(PathBuf::from("/etc/wx")),
            ..Settings::default()
        };
        assert_eq!(settings.base_dir(), PathBuf::from("/srv/weather"));
    }

    #[test]
    fn given_template_when_parsed_then_matches_defaults() {
        let parsed: Settings = toml::from_str(&Settings::template()).unwrap();
        let defaults = Settings::default();
        assert_eq!(parsed.bindings, defaults.bindings);
        assert_eq!(parsed.databases, defaults.databases);
    }

    #[test]
    fn given_settings_when_serialized_then_round_trips_bindings() {
        let toml_str = Settings::default().to_toml().unwrap();
        assert!(toml_str.contains("[bindings.wx_binding]"));
        assert!(toml_str.contains("archive/weewx.sdb"));
    }
}
