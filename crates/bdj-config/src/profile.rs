//! Profile identity - which of several parallel BDJ4 installs this process
//! belongs to. Everything else in this crate is shared across profiles;
//! this is the one piece every process resolves for itself first, usually
//! from a `--profile` flag, before it ever reads a config file.

use serde::{Deserialize, Serialize};

/// Identifies a profile: its numeric index (used to offset bus ports and
/// to pick a lock subdirectory) and a human-readable name for UIs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileConfig {
    /// Default: 0
    #[serde(default)]
    pub index: u16,

    /// Default: "default"
    #[serde(default = "ProfileConfig::default_name")]
    pub name: String,
}

impl ProfileConfig {
    fn default_name() -> String {
        "default".to_string()
    }
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            index: 0,
            name: Self::default_name(),
        }
    }
}
