//! Infrastructure configuration - things that cannot change at runtime.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Filesystem layout for a single profile's data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Root of all BDJ4 state for this profile: database, playlists, locks.
    /// Default: platform data dir + `/bdj4` (overridable by `BDJ4_DATATOPDIR`).
    #[serde(default = "PathsConfig::default_data_top_dir")]
    pub data_top_dir: PathBuf,

    /// Directory scanned for playable music.
    /// Default: `~/Music`
    #[serde(default = "PathsConfig::default_music_dir")]
    pub music_dir: PathBuf,

    /// Directory holding the per-route lock files the starter watches.
    /// Default: `<data_top_dir>/locks`
    #[serde(default = "PathsConfig::default_lock_dir")]
    pub lock_dir: PathBuf,

    /// Root directory the file-server process serves over HTTP(S).
    /// Default: `<data_top_dir>/http`
    #[serde(default = "PathsConfig::default_http_root_dir")]
    pub http_root_dir: PathBuf,
}

impl PathsConfig {
    fn default_data_top_dir() -> PathBuf {
        directories::ProjectDirs::from("", "", "bdj4")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from(".local/share/bdj4"))
    }

    fn default_music_dir() -> PathBuf {
        directories::UserDirs::new()
            .and_then(|dirs| dirs.audio_dir().map(|p| p.to_path_buf()))
            .unwrap_or_else(|| PathBuf::from("Music"))
    }

    fn default_lock_dir() -> PathBuf {
        Self::default_data_top_dir().join("locks")
    }

    fn default_http_root_dir() -> PathBuf {
        Self::default_data_top_dir().join("http")
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data_top_dir: Self::default_data_top_dir(),
            music_dir: Self::default_music_dir(),
            lock_dir: Self::default_lock_dir(),
            http_root_dir: Self::default_http_root_dir(),
        }
    }
}

/// Message-bus listen ports. Every route's actual port is
/// `base_port + route.port_offset() + profile_index * profile_span`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusConfig {
    /// Default: 35548
    #[serde(default = "BusConfig::default_base_port")]
    pub base_port: u16,

    /// Port range reserved per profile, so two profiles never collide.
    /// Default: 100
    #[serde(default = "BusConfig::default_profile_span")]
    pub profile_span: u16,
}

impl BusConfig {
    fn default_base_port() -> u16 {
        35548
    }

    fn default_profile_span() -> u16 {
        100
    }
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            base_port: Self::default_base_port(),
            profile_span: Self::default_profile_span(),
        }
    }
}

/// Mobile Marquee endpoint. No authentication by design: it only ever
/// serves the current-song display, nothing that can change state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MobileMqConfig {
    #[serde(default = "MobileMqConfig::default_enabled")]
    pub enabled: bool,
}

impl MobileMqConfig {
    fn default_enabled() -> bool {
        true
    }
}

impl Default for MobileMqConfig {
    fn default() -> Self {
        Self {
            enabled: Self::default_enabled(),
        }
    }
}

/// Remote-control endpoint. Basic auth, realm `BDJ4 Remote`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    #[serde(default = "RemoteConfig::default_user")]
    pub user: String,

    #[serde(default = "RemoteConfig::default_password")]
    pub password: String,
}

impl RemoteConfig {
    fn default_user() -> String {
        "bdj4remote".to_string()
    }

    fn default_password() -> String {
        String::new()
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            user: Self::default_user(),
            password: Self::default_password(),
        }
    }
}

/// Inter-host file-server endpoint. Basic auth, realm `BDJ4`, optionally TLS.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileServerConfig {
    #[serde(default = "FileServerConfig::default_user")]
    pub user: String,

    #[serde(default = "FileServerConfig::default_password")]
    pub password: String,

    /// Path to a PEM certificate. If absent, the server speaks plain HTTP.
    #[serde(default)]
    pub tls_cert: Option<PathBuf>,

    #[serde(default)]
    pub tls_key: Option<PathBuf>,
}

impl FileServerConfig {
    fn default_user() -> String {
        "bdj4".to_string()
    }

    fn default_password() -> String {
        String::new()
    }
}

impl Default for FileServerConfig {
    fn default() -> Self {
        Self {
            user: Self::default_user(),
            password: Self::default_password(),
            tls_cert: None,
            tls_key: None,
        }
    }
}

/// Settings for the three embedded HTTP(S) servers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WebServerConfig {
    #[serde(default)]
    pub mobilemq: MobileMqConfig,

    #[serde(default)]
    pub remote: RemoteConfig,

    #[serde(default)]
    pub fileserver: FileServerConfig,
}

/// Infrastructure configuration - cannot change at runtime.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InfraConfig {
    /// Filesystem paths.
    #[serde(default)]
    pub paths: PathsConfig,

    /// Message-bus port layout.
    #[serde(default)]
    pub bus: BusConfig,

    /// Embedded web server settings.
    #[serde(default)]
    pub webserver: WebServerConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_defaults() {
        let paths = PathsConfig::default();
        assert!(paths.data_top_dir.to_string_lossy().contains("bdj4"));
        assert_eq!(paths.lock_dir, paths.data_top_dir.join("locks"));
        assert_eq!(paths.http_root_dir, paths.data_top_dir.join("http"));
    }

    #[test]
    fn test_bus_defaults() {
        let bus = BusConfig::default();
        assert_eq!(bus.base_port, 35548);
        assert_eq!(bus.profile_span, 100);
    }

    #[test]
    fn test_webserver_defaults() {
        let ws = WebServerConfig::default();
        assert!(ws.mobilemq.enabled);
        assert_eq!(ws.remote.user, "bdj4remote");
        assert_eq!(ws.fileserver.user, "bdj4");
        assert!(ws.fileserver.tls_cert.is_none());
    }
}
