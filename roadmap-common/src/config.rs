//! Configuration loading and root folder resolution
//!
//! Root folder priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable `ROADMAP_ROOT_FOLDER`
//! 3. TOML config file (`root_folder` key)
//! 4. OS-dependent compiled default (fallback)
//!
//! A missing or unreadable TOML file never stops startup; it is logged and
//! the compiled defaults are used instead.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable consulted for the root folder
pub const ROOT_FOLDER_ENV: &str = "ROADMAP_ROOT_FOLDER";

/// Database file name inside the root folder
pub const DATABASE_FILE: &str = "roadmap.db";

pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5730;
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Optional settings read from `config.toml`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TomlConfig {
    pub root_folder: Option<PathBuf>,
    pub bind_address: Option<String>,
    pub port: Option<u16>,
    pub log_level: Option<String>,
}

impl TomlConfig {
    /// Parse a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Invalid TOML in {}: {}", path.display(), e)))
    }

    /// Load the explicit file if given, otherwise the platform default file.
    ///
    /// Falls back to an empty config when nothing can be read.
    pub fn load_or_default(explicit: Option<&Path>) -> Self {
        let path = match explicit {
            Some(p) => p.to_path_buf(),
            None => match default_config_path() {
                Some(p) if p.exists() => p,
                _ => {
                    info!("No config file found, using compiled defaults");
                    return Self::default();
                }
            },
        };

        match Self::load(&path) {
            Ok(config) => {
                info!("Loaded config file: {}", path.display());
                config
            }
            Err(e) => {
                warn!("Ignoring config file {}: {}", path.display(), e);
                Self::default()
            }
        }
    }
}

/// Fully resolved server settings
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub root_folder: PathBuf,
    pub bind_address: String,
    pub port: u16,
    pub log_level: String,
}

impl ServerConfig {
    /// Merge CLI overrides over the TOML file over compiled defaults
    pub fn resolve(
        root_cli: Option<&Path>,
        bind_cli: Option<&str>,
        port_cli: Option<u16>,
        toml_config: &TomlConfig,
    ) -> Self {
        Self {
            root_folder: resolve_root_folder(root_cli, toml_config),
            bind_address: bind_cli
                .map(str::to_string)
                .or_else(|| toml_config.bind_address.clone())
                .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string()),
            port: port_cli.or(toml_config.port).unwrap_or(DEFAULT_PORT),
            log_level: toml_config
                .log_level
                .clone()
                .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
        }
    }

    pub fn database_path(&self) -> PathBuf {
        database_path(&self.root_folder)
    }

    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}

/// Resolve the root folder using the documented priority order
pub fn resolve_root_folder(cli_arg: Option<&Path>, toml_config: &TomlConfig) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
        if !path.is_empty() {
            return PathBuf::from(path);
        }
    }

    // Priority 3: TOML config file
    if let Some(path) = &toml_config.root_folder {
        return path.clone();
    }

    // Priority 4: OS-dependent compiled default
    default_root_folder()
}

/// Platform config file location (`<config_dir>/roadmap/config.toml`)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("roadmap").join("config.toml"))
}

/// Get OS-dependent default root folder path
pub fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("roadmap"))
        .unwrap_or_else(|| PathBuf::from("./roadmap_data"))
}

/// Database file location for a root folder
pub fn database_path(root_folder: &Path) -> PathBuf {
    root_folder.join(DATABASE_FILE)
}

/// Create the root folder if it is missing
pub fn ensure_directory_exists(root_folder: &Path) -> Result<()> {
    if !root_folder.exists() {
        std::fs::create_dir_all(root_folder)?;
        info!("Created root folder: {}", root_folder.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toml_parses_partial_file() {
        let config: TomlConfig = toml::from_str("port = 8080\nlog_level = \"debug\"").unwrap();
        assert_eq!(config.port, Some(8080));
        assert_eq!(config.log_level.as_deref(), Some("debug"));
        assert!(config.root_folder.is_none());
        assert!(config.bind_address.is_none());
    }

    #[test]
    fn test_cli_overrides_toml() {
        let toml_config = TomlConfig {
            root_folder: Some(PathBuf::from("/from/toml")),
            bind_address: Some("0.0.0.0".to_string()),
            port: Some(9000),
            log_level: None,
        };

        let config = ServerConfig::resolve(
            Some(Path::new("/from/cli")),
            Some("10.0.0.1"),
            Some(7000),
            &toml_config,
        );

        assert_eq!(config.root_folder, PathBuf::from("/from/cli"));
        assert_eq!(config.listen_address(), "10.0.0.1:7000");
        assert_eq!(config.log_level, DEFAULT_LOG_LEVEL);
    }

    #[test]
    fn test_database_path_joins_file_name() {
        assert_eq!(
            database_path(Path::new("/srv/roadmap")),
            PathBuf::from("/srv/roadmap/roadmap.db")
        );
    }
}
