//! Per-profile addressing: which port and lock directory a route uses
//! when several BDJ4 installs run side by side on the same machine.

use bdj_core::LockManager;
use bdj_proto::Route;
use std::path::Path;

/// `base + route_offset + profile * profile_span`.
pub fn route_port(base_port: u16, profile: u16, profile_span: u16, route: Route) -> u16 {
    base_port + route.port_offset() + profile * profile_span
}

/// Lock files for profile `p` live under `<lock_dir>/<p>/`, keeping every
/// profile's fleet independently lockable.
pub fn lock_manager_for_profile(lock_dir: &Path, profile: u16) -> LockManager {
    LockManager::new(lock_dir.join(profile.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_scales_with_profile_span() {
        let base = 35548;
        let p0 = route_port(base, 0, 100, Route::Main);
        let p1 = route_port(base, 1, 100, Route::Main);
        assert_eq!(p1 - p0, 100);
    }

    #[test]
    fn different_routes_at_the_same_profile_get_different_ports() {
        let base = 35548;
        assert_ne!(
            route_port(base, 0, 100, Route::Main),
            route_port(base, 0, 100, Route::Player)
        );
    }

    #[test]
    fn profile_zero_lock_dir_is_suffixed() {
        let dir = tempfile::tempdir().unwrap();
        let mgr = lock_manager_for_profile(dir.path(), 0);
        assert_eq!(mgr.path(Route::Main), dir.path().join("0").join("main.lck"));
    }
}
