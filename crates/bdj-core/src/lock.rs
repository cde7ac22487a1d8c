//! Per-route lock files.
//!
//! Every running process writes its pid to `<lock_dir>/<route>.lck` while
//! it's up. The starter (and any other process checking on a peer) treats
//! a lock file whose pid is no longer alive as stale and clears it rather
//! than trusting its mere existence.

use bdj_proto::Route;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum LockError {
    #[error("io error on lock file: {0}")]
    Io(#[from] io::Error),
    #[error("{route} is already locked by pid {pid}")]
    Held { route: Route, pid: u32 },
}

/// Owns the directory lock files live in for one profile.
#[derive(Debug, Clone)]
pub struct LockManager {
    dir: PathBuf,
}

impl LockManager {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self, route: Route) -> PathBuf {
        self.dir.join(route.lock_name())
    }

    /// True if `route` holds a lock file naming a pid that is still alive.
    /// A lock file naming a dead pid is removed and this returns false.
    pub fn exists(&self, route: Route) -> bool {
        let path = self.path(route);
        let Some(pid) = read_pid(&path) else {
            return false;
        };
        if pid_alive(pid) {
            true
        } else {
            let _ = fs::remove_file(&path);
            false
        }
    }

    /// Take the lock for `route`, writing this process's pid.
    pub fn acquire(&self, route: Route) -> Result<LockGuard, LockError> {
        if self.exists(route) {
            let pid = read_pid(&self.path(route)).unwrap_or(0);
            return Err(LockError::Held { route, pid: pid as u32 });
        }
        fs::create_dir_all(&self.dir)?;
        fs::write(self.path(route), std::process::id().to_string())?;
        Ok(LockGuard {
            manager: self.clone(),
            route,
            released: false,
        })
    }

    /// The pid named by `route`'s lock file, if one exists, without the
    /// liveness check `exists` performs. Used by the starter's shutdown
    /// sequence to signal a process directly once it's no longer expected
    /// to respond to bus messages.
    pub fn pid_of(&self, route: Route) -> Option<u32> {
        read_pid(&self.path(route)).map(|pid| pid as u32)
    }

    /// Remove the lock file for `route` unconditionally, regardless of pid.
    /// Used by the starter's fleet-cleanup sweep.
    pub fn clear(&self, route: Route) -> io::Result<()> {
        match fs::remove_file(self.path(route)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}

/// Releases its route's lock file on drop.
pub struct LockGuard {
    manager: LockManager,
    route: Route,
    released: bool,
}

impl LockGuard {
    pub fn release(mut self) -> io::Result<()> {
        self.released = true;
        self.manager.clear(self.route)
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        if !self.released {
            let _ = self.manager.clear(self.route);
        }
    }
}

fn read_pid(path: &Path) -> Option<i32> {
    fs::read_to_string(path).ok()?.trim().parse().ok()
}

#[cfg(unix)]
fn pid_alive(pid: i32) -> bool {
    use nix::sys::signal::kill;
    use nix::unistd::Pid;
    // Signal 0 performs no actual signal, only existence/permission checks.
    kill(Pid::from_raw(pid), None).is_ok()
}

#[cfg(not(unix))]
fn pid_alive(_pid: i32) -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acquire_then_exists_then_release() {
        let dir = tempfile::tempdir().unwrap();
        let mgr = LockManager::new(dir.path());
        assert!(!mgr.exists(Route::Player));

        let guard = mgr.acquire(Route::Player).unwrap();
        assert!(mgr.exists(Route::Player));

        guard.release().unwrap();
        assert!(!mgr.exists(Route::Player));
    }

    #[test]
    fn stale_lock_with_dead_pid_is_cleared() {
        let dir = tempfile::tempdir().unwrap();
        let mgr = LockManager::new(dir.path());
        // pid 1 is init on almost any unix box; use an out-of-range pid
        // that is guaranteed not to be reused instead.
        fs::write(mgr.path(Route::Main), "999999999").unwrap();
        assert!(!mgr.exists(Route::Main));
        assert!(!mgr.path(Route::Main).exists());
    }

    #[test]
    fn double_acquire_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mgr = LockManager::new(dir.path());
        let _guard = mgr.acquire(Route::Main).unwrap();
        assert!(matches!(mgr.acquire(Route::Main), Err(LockError::Held { .. })));
    }
}
