//! Config file discovery, loading, and environment variable overlay.

use crate::infra::{BusConfig, FileServerConfig, MobileMqConfig, RemoteConfig, WebServerConfig};
use crate::profile::ProfileConfig;
use crate::{BdjConfig, ConfigError, InfraConfig};
use std::env;
use std::path::{Path, PathBuf};

/// Information about where config values came from.
#[derive(Debug, Clone, Default)]
pub struct ConfigSources {
    /// Config files that were loaded (in order)
    pub files: Vec<PathBuf>,
    /// Environment variables that overrode config values
    pub env_overrides: Vec<String>,
}

/// The profile segment used to pick a user config file, resolved directly
/// from `BDJ4_PROFILE` since it has to be known before the layered config
/// (which itself may set a profile name) has been loaded.
fn early_profile_dir() -> String {
    env::var("BDJ4_PROFILE").unwrap_or_else(|_| "default".to_string())
}

/// Discover config files in standard locations.
///
/// Returns paths in load order (system, user, local).
/// Only returns files that exist.
pub fn discover_config_files() -> Vec<PathBuf> {
    discover_config_files_with_override(None)
}

/// Discover config files, optionally with a CLI override path.
///
/// If `cli_path` is provided and exists, it replaces the local override.
/// Returns paths in load order (system, user, local/cli).
pub fn discover_config_files_with_override(cli_path: Option<&Path>) -> Vec<PathBuf> {
    let mut files = Vec::new();

    let system = PathBuf::from("/etc/bdj4/config.toml");
    if system.exists() {
        files.push(system);
    }

    if let Some(proj) = directories::ProjectDirs::from("", "", "bdj4") {
        let user = proj.config_dir().join(early_profile_dir()).join("config.toml");
        if user.exists() {
            files.push(user);
        }
    }

    if let Some(path) = cli_path {
        if path.exists() {
            files.push(path.to_path_buf());
            return files;
        }
    }

    let local = PathBuf::from("bdj4.toml");
    if local.exists() {
        files.push(local);
    }

    files
}

/// Load config from a TOML file.
pub fn load_from_file(path: &Path) -> Result<BdjConfig, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    parse_toml(&contents, path)
}

/// Parse config from TOML string.
fn parse_toml(contents: &str, path: &Path) -> Result<BdjConfig, ConfigError> {
    let table: toml::Table = contents.parse().map_err(|e: toml::de::Error| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let mut infra = InfraConfig::default();

    if let Some(paths) = table.get("paths").and_then(|v| v.as_table()) {
        if let Some(v) = paths.get("data_top_dir").and_then(|v| v.as_str()) {
            infra.paths.data_top_dir = expand_path(v);
        }
        if let Some(v) = paths.get("music_dir").and_then(|v| v.as_str()) {
            infra.paths.music_dir = expand_path(v);
        }
        if let Some(v) = paths.get("lock_dir").and_then(|v| v.as_str()) {
            infra.paths.lock_dir = expand_path(v);
        }
        if let Some(v) = paths.get("http_root_dir").and_then(|v| v.as_str()) {
            infra.paths.http_root_dir = expand_path(v);
        }
    }

    if let Some(bus) = table.get("bus").and_then(|v| v.as_table()) {
        if let Some(v) = bus.get("base_port").and_then(|v| v.as_integer()) {
            infra.bus.base_port = v as u16;
        }
        if let Some(v) = bus.get("profile_span").and_then(|v| v.as_integer()) {
            infra.bus.profile_span = v as u16;
        }
    }

    if let Some(webserver) = table.get("webserver").and_then(|v| v.as_table()) {
        if let Some(mobilemq) = webserver.get("mobilemq").and_then(|v| v.as_table()) {
            if let Some(v) = mobilemq.get("enabled").and_then(|v| v.as_bool()) {
                infra.webserver.mobilemq.enabled = v;
            }
        }
        if let Some(remote) = webserver.get("remote").and_then(|v| v.as_table()) {
            if let Some(v) = remote.get("user").and_then(|v| v.as_str()) {
                infra.webserver.remote.user = v.to_string();
            }
            if let Some(v) = remote.get("password").and_then(|v| v.as_str()) {
                infra.webserver.remote.password = v.to_string();
            }
        }
        if let Some(fileserver) = webserver.get("fileserver").and_then(|v| v.as_table()) {
            if let Some(v) = fileserver.get("user").and_then(|v| v.as_str()) {
                infra.webserver.fileserver.user = v.to_string();
            }
            if let Some(v) = fileserver.get("password").and_then(|v| v.as_str()) {
                infra.webserver.fileserver.password = v.to_string();
            }
            if let Some(v) = fileserver.get("tls_cert").and_then(|v| v.as_str()) {
                infra.webserver.fileserver.tls_cert = Some(expand_path(v));
            }
            if let Some(v) = fileserver.get("tls_key").and_then(|v| v.as_str()) {
                infra.webserver.fileserver.tls_key = Some(expand_path(v));
            }
        }
    }

    let mut profile = ProfileConfig::default();
    if let Some(profile_section) = table.get("profile").and_then(|v| v.as_table()) {
        if let Some(v) = profile_section.get("index").and_then(|v| v.as_integer()) {
            profile.index = v as u16;
        }
        if let Some(v) = profile_section.get("name").and_then(|v| v.as_str()) {
            profile.name = v.to_string();
        }
    }

    Ok(BdjConfig { infra, profile })
}

/// Merge two configs, with `overlay` taking precedence.
///
/// Field-by-field: a field only overrides the base if it differs from the
/// compiled default, so a sparse TOML file (or a sparse env overlay) never
/// clobbers a setting it didn't mention.
pub fn merge_configs(base: BdjConfig, overlay: BdjConfig) -> BdjConfig {
    let default_paths = InfraConfig::default().paths;
    let default_bus = BusConfig::default();
    let default_webserver = WebServerConfig::default();
    let default_profile = ProfileConfig::default();

    BdjConfig {
        infra: InfraConfig {
            paths: crate::infra::PathsConfig {
                data_top_dir: pick(overlay.infra.paths.data_top_dir, base.infra.paths.data_top_dir, &default_paths.data_top_dir),
                music_dir: pick(overlay.infra.paths.music_dir, base.infra.paths.music_dir, &default_paths.music_dir),
                lock_dir: pick(overlay.infra.paths.lock_dir, base.infra.paths.lock_dir, &default_paths.lock_dir),
                http_root_dir: pick(overlay.infra.paths.http_root_dir, base.infra.paths.http_root_dir, &default_paths.http_root_dir),
            },
            bus: BusConfig {
                base_port: pick(overlay.infra.bus.base_port, base.infra.bus.base_port, &default_bus.base_port),
                profile_span: pick(overlay.infra.bus.profile_span, base.infra.bus.profile_span, &default_bus.profile_span),
            },
            webserver: WebServerConfig {
                mobilemq: MobileMqConfig {
                    enabled: pick(overlay.infra.webserver.mobilemq.enabled, base.infra.webserver.mobilemq.enabled, &default_webserver.mobilemq.enabled),
                },
                remote: RemoteConfig {
                    user: pick(overlay.infra.webserver.remote.user, base.infra.webserver.remote.user, &default_webserver.remote.user),
                    password: pick(overlay.infra.webserver.remote.password, base.infra.webserver.remote.password, &default_webserver.remote.password),
                },
                fileserver: FileServerConfig {
                    user: pick(overlay.infra.webserver.fileserver.user, base.infra.webserver.fileserver.user, &default_webserver.fileserver.user),
                    password: pick(overlay.infra.webserver.fileserver.password, base.infra.webserver.fileserver.password, &default_webserver.fileserver.password),
                    tls_cert: overlay.infra.webserver.fileserver.tls_cert.or(base.infra.webserver.fileserver.tls_cert),
                    tls_key: overlay.infra.webserver.fileserver.tls_key.or(base.infra.webserver.fileserver.tls_key),
                },
            },
        },
        profile: ProfileConfig {
            index: pick(overlay.profile.index, base.profile.index, &default_profile.index),
            name: pick(overlay.profile.name, base.profile.name, &default_profile.name),
        },
    }
}

/// Returns `overlay` if it differs from the compiled default, else `base`.
fn pick<T: PartialEq>(overlay: T, base: T, default: &T) -> T {
    if &overlay != default {
        overlay
    } else {
        base
    }
}

/// Apply environment variable overrides to config.
pub fn apply_env_overrides(config: &mut BdjConfig, sources: &mut ConfigSources) {
    if let Ok(v) = env::var("BDJ4_DATATOPDIR") {
        config.infra.paths.data_top_dir = expand_path(&v);
        sources.env_overrides.push("BDJ4_DATATOPDIR".to_string());
    }
    if let Ok(v) = env::var("BDJ4_MUSIC_DIR") {
        config.infra.paths.music_dir = expand_path(&v);
        sources.env_overrides.push("BDJ4_MUSIC_DIR".to_string());
    }
    if let Ok(v) = env::var("BDJ4_LOCK_DIR") {
        config.infra.paths.lock_dir = expand_path(&v);
        sources.env_overrides.push("BDJ4_LOCK_DIR".to_string());
    }
    if let Ok(v) = env::var("BDJ4_HTTP_ROOT_DIR") {
        config.infra.paths.http_root_dir = expand_path(&v);
        sources.env_overrides.push("BDJ4_HTTP_ROOT_DIR".to_string());
    }

    if let Ok(v) = env::var("BDJ4_BASE_PORT") {
        if let Ok(port) = v.parse() {
            config.infra.bus.base_port = port;
            sources.env_overrides.push("BDJ4_BASE_PORT".to_string());
        }
    }
    if let Ok(v) = env::var("BDJ4_PROFILE_SPAN") {
        if let Ok(span) = v.parse() {
            config.infra.bus.profile_span = span;
            sources.env_overrides.push("BDJ4_PROFILE_SPAN".to_string());
        }
    }

    if let Ok(v) = env::var("BDJ4_REMOTE_USER") {
        config.infra.webserver.remote.user = v;
        sources.env_overrides.push("BDJ4_REMOTE_USER".to_string());
    }
    if let Ok(v) = env::var("BDJ4_REMOTE_PASSWORD") {
        config.infra.webserver.remote.password = v;
        sources.env_overrides.push("BDJ4_REMOTE_PASSWORD".to_string());
    }
    if let Ok(v) = env::var("BDJ4_FILESERVER_USER") {
        config.infra.webserver.fileserver.user = v;
        sources.env_overrides.push("BDJ4_FILESERVER_USER".to_string());
    }
    if let Ok(v) = env::var("BDJ4_FILESERVER_PASSWORD") {
        config.infra.webserver.fileserver.password = v;
        sources.env_overrides.push("BDJ4_FILESERVER_PASSWORD".to_string());
    }

    if let Ok(v) = env::var("BDJ4_PROFILE") {
        if let Ok(index) = v.parse() {
            config.profile.index = index;
            sources.env_overrides.push("BDJ4_PROFILE".to_string());
        }
    }
    if let Ok(v) = env::var("BDJ4_PROFILE_NAME") {
        config.profile.name = v;
        sources.env_overrides.push("BDJ4_PROFILE_NAME".to_string());
    }
}

/// Expand ~ and environment variables in a path.
pub fn expand_path(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = directories::BaseDirs::new().map(|d| d.home_dir().to_path_buf()) {
            return home.join(stripped);
        }
        return PathBuf::from(path);
    }

    if let Some(stripped) = path.strip_prefix('$') {
        if let Some(slash_pos) = stripped.find('/') {
            let var_name = &stripped[..slash_pos];
            return env::var(var_name)
                .map(|v| PathBuf::from(v).join(&stripped[slash_pos + 1..]))
                .unwrap_or_else(|_| PathBuf::from(path));
        }
        return env::var(stripped)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(path));
    }

    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_path_tilde() {
        let expanded = expand_path("~/test/path");
        assert!(!expanded.to_string_lossy().starts_with('~'));
        assert!(expanded.to_string_lossy().contains("test/path"));
    }

    #[test]
    fn test_expand_path_absolute() {
        let expanded = expand_path("/absolute/path");
        assert_eq!(expanded, PathBuf::from("/absolute/path"));
    }

    #[test]
    fn test_discover_config_files() {
        // Just verify it doesn't panic
        let _files = discover_config_files();
    }

    #[test]
    fn test_parse_minimal_toml() {
        let toml = r#"
[paths]
data_top_dir = "/custom/state"
"#;
        let config = parse_toml(toml, Path::new("test.toml")).unwrap();
        assert_eq!(config.infra.paths.data_top_dir, PathBuf::from("/custom/state"));
        // Other values should be defaults
        assert_eq!(config.infra.bus.base_port, 35548);
    }

    #[test]
    fn test_parse_full_toml() {
        let toml = r#"
[paths]
data_top_dir = "/data/bdj4"
music_dir = "/data/music"

[bus]
base_port = 40000

[webserver.remote]
user = "dj"
password = "hunter2"

[profile]
index = 2
name = "upstairs"
"#;
        let config = parse_toml(toml, Path::new("test.toml")).unwrap();

        assert_eq!(config.infra.paths.data_top_dir, PathBuf::from("/data/bdj4"));
        assert_eq!(config.infra.paths.music_dir, PathBuf::from("/data/music"));
        assert_eq!(config.infra.bus.base_port, 40000);
        assert_eq!(config.infra.webserver.remote.user, "dj");
        assert_eq!(config.infra.webserver.remote.password, "hunter2");
        assert_eq!(config.profile.index, 2);
        assert_eq!(config.profile.name, "upstairs");
    }

    #[test]
    fn test_merge_prefers_overlay_non_default() {
        let base = BdjConfig::default();
        let mut overlay = BdjConfig::default();
        overlay.infra.bus.base_port = 41000;

        let merged = merge_configs(base, overlay);
        assert_eq!(merged.infra.bus.base_port, 41000);
        assert_eq!(merged.infra.paths.music_dir, BdjConfig::default().infra.paths.music_dir);
    }
}
