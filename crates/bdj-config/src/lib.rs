//! Layered configuration loading for a BDJ4 deployment.
//!
//! This crate provides configuration loading with minimal dependencies,
//! designed to be imported by every BDJ4 process crate without causing
//! circular dependency issues.
//!
//! # Configuration Philosophy
//!
//! Configuration is split into two categories:
//!
//! - **Infrastructure** (`InfraConfig`): Things that physically cannot change
//!   at runtime - paths, bus ports, web server credentials.
//!
//! - **Profile** (`ProfileConfig`): Which parallel BDJ4 install this process
//!   belongs to. Resolved once at startup, usually from `--profile`.
//!
//! # Usage
//!
//! ```rust,no_run
//! use bdj_config::BdjConfig;
//!
//! let config = BdjConfig::load().expect("failed to load config");
//!
//! println!("data dir: {}", config.infra.paths.data_top_dir.display());
//! println!("base port: {}", config.infra.bus.base_port);
//! println!("profile: {} ({})", config.profile.index, config.profile.name);
//! ```
//!
//! # Config File Locations
//!
//! Files are loaded in order (later wins):
//! 1. `/etc/bdj4/config.toml` (system)
//! 2. the platform config dir, suffixed by profile (user)
//! 3. `./bdj4.toml` (local override)
//! 4. Environment variables (`BDJ4_*`)
//!
//! # Example Config
//!
//! ```toml
//! [paths]
//! data_top_dir = "~/.local/share/bdj4"
//! music_dir = "~/Music"
//!
//! [bus]
//! base_port = 35548
//!
//! [webserver.remote]
//! user = "bdj4remote"
//! password = "secret"
//!
//! [profile]
//! index = 0
//! name = "default"
//! ```

pub mod infra;
pub mod loader;
pub mod profile;

pub use infra::{BusConfig, FileServerConfig, InfraConfig, MobileMqConfig, PathsConfig, RemoteConfig, WebServerConfig};
pub use loader::{discover_config_files_with_override, ConfigSources};
pub use profile::ProfileConfig;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

/// Complete BDJ4 configuration for one profile.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BdjConfig {
    /// Infrastructure - cannot change at runtime.
    #[serde(flatten)]
    pub infra: InfraConfig,

    /// Which profile this process is running as.
    #[serde(default)]
    pub profile: ProfileConfig,
}

impl BdjConfig {
    /// Load configuration from all sources.
    ///
    /// Load order (later wins):
    /// 1. Compiled defaults
    /// 2. `/etc/bdj4/config.toml`
    /// 3. the platform config dir, suffixed by profile
    /// 4. `./bdj4.toml`
    /// 5. Environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let (config, _sources) = Self::load_with_sources_from(None)?;
        Ok(config)
    }

    /// Load configuration from a specific file path, then apply env overrides.
    ///
    /// If `config_path` is provided, it takes precedence over the local
    /// `./bdj4.toml` override. System and user configs still load first.
    pub fn load_from(config_path: Option<&std::path::Path>) -> Result<Self, ConfigError> {
        let (config, _sources) = Self::load_with_sources_from(config_path)?;
        Ok(config)
    }

    /// Load configuration and return information about sources.
    pub fn load_with_sources() -> Result<(Self, ConfigSources), ConfigError> {
        Self::load_with_sources_from(None)
    }

    /// Load configuration from optional path and return information about sources.
    pub fn load_with_sources_from(
        config_path: Option<&std::path::Path>,
    ) -> Result<(Self, ConfigSources), ConfigError> {
        let mut sources = ConfigSources::default();
        let mut config = BdjConfig::default();

        for path in loader::discover_config_files_with_override(config_path) {
            let file_config = loader::load_from_file(&path)?;
            config = loader::merge_configs(config, file_config);
            sources.files.push(path);
        }

        loader::apply_env_overrides(&mut config, &mut sources);

        Ok((config, sources))
    }

    /// Serialize config to TOML string.
    pub fn to_toml(&self) -> String {
        let mut output = String::new();

        output.push_str("# BDJ4 Configuration\n\n");

        output.push_str("[paths]\n");
        output.push_str(&format!(
            "data_top_dir = \"{}\"\n",
            self.infra.paths.data_top_dir.display()
        ));
        output.push_str(&format!(
            "music_dir = \"{}\"\n",
            self.infra.paths.music_dir.display()
        ));
        output.push_str(&format!(
            "lock_dir = \"{}\"\n",
            self.infra.paths.lock_dir.display()
        ));
        output.push_str(&format!(
            "http_root_dir = \"{}\"\n",
            self.infra.paths.http_root_dir.display()
        ));

        output.push_str("\n[bus]\n");
        output.push_str(&format!("base_port = {}\n", self.infra.bus.base_port));
        output.push_str(&format!(
            "profile_span = {}\n",
            self.infra.bus.profile_span
        ));

        output.push_str("\n[webserver.mobilemq]\n");
        output.push_str(&format!(
            "enabled = {}\n",
            self.infra.webserver.mobilemq.enabled
        ));

        output.push_str("\n[webserver.remote]\n");
        output.push_str(&format!(
            "user = \"{}\"\n",
            self.infra.webserver.remote.user
        ));

        output.push_str("\n[webserver.fileserver]\n");
        output.push_str(&format!(
            "user = \"{}\"\n",
            self.infra.webserver.fileserver.user
        ));

        output.push_str("\n[profile]\n");
        output.push_str(&format!("index = {}\n", self.profile.index));
        output.push_str(&format!("name = \"{}\"\n", self.profile.name));

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BdjConfig::default();
        assert_eq!(config.infra.bus.base_port, 35548);
        assert_eq!(config.profile.index, 0);
    }

    #[test]
    fn test_to_toml() {
        let config = BdjConfig::default();
        let toml = config.to_toml();
        assert!(toml.contains("[paths]"));
        assert!(toml.contains("[bus]"));
        assert!(toml.contains("[profile]"));
        assert!(toml.contains("base_port = 35548"));
    }

    #[test]
    fn test_load_defaults() {
        // Load should work even with no config files
        let config = BdjConfig::load().unwrap();
        assert_eq!(config.infra.bus.base_port, 35548);
    }
}
