//! Configuration loading and output folder resolution

use crate::{Error, Result};
use serde::Deserialize;
use std::path::PathBuf;

/// TOML configuration file contents
///
/// Lives at `~/.config/psynth/config.toml` (user) or
/// `/etc/psynth/config.toml` (system-wide, Linux only).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    /// Folder that receives session working trees and committed archives
    pub output_root: Option<String>,
    /// Listen port for the upload service
    pub port: Option<u16>,
}

/// Output folder resolution priority order:
/// 1. Command-line argument (highest priority)
/// 2. Environment variable
/// 3. TOML config file
/// 4. Compiled default (`output`, relative to the working directory)
pub fn resolve_output_root(cli_arg: Option<&str>, env_var_name: &str) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return PathBuf::from(path);
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        return PathBuf::from(path);
    }

    // Priority 3: TOML config file
    if let Ok(config) = load_toml_config() {
        if let Some(root) = config.output_root {
            return PathBuf::from(root);
        }
    }

    // Priority 4: Compiled default, matching the legacy service layout
    PathBuf::from("output")
}

/// Load the TOML configuration file, if one exists
pub fn load_toml_config() -> Result<TomlConfig> {
    let path = config_file_path()?;
    let content = std::fs::read_to_string(&path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
}

/// Locate the configuration file for the platform
fn config_file_path() -> Result<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("psynth").join("config.toml"));

    if let Some(path) = user_config {
        if path.exists() {
            return Ok(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/psynth/config.toml");
        if system_config.exists() {
            return Ok(system_config);
        }
    }

    Err(Error::Config("No config file found".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_argument_wins() {
        let root = resolve_output_root(Some("/tmp/synths"), "PSYNTH_TEST_UNSET_VAR");
        assert_eq!(root, PathBuf::from("/tmp/synths"));
    }

    #[test]
    fn default_is_output_folder() {
        let root = resolve_output_root(None, "PSYNTH_TEST_UNSET_VAR");
        // No env var, no config file entry consulted under this name
        assert_eq!(root, PathBuf::from("output"));
    }

    #[test]
    fn toml_config_parses() {
        let config: TomlConfig = toml::from_str("output_root = \"/srv/synths\"\nport = 8080\n").unwrap();
        assert_eq!(config.output_root.as_deref(), Some("/srv/synths"));
        assert_eq!(config.port, Some(8080));
    }

    #[test]
    fn toml_config_allows_empty_file() {
        let config: TomlConfig = toml::from_str("").unwrap();
        assert!(config.output_root.is_none());
        assert!(config.port.is_none());
    }
}
