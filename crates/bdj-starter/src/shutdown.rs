//! The five-step orderly fleet shutdown.
//!
//! Each step gives the fleet a chance to leave on its own (a bus message)
//! before escalating to an OS-level signal. `signal` is supplied by the
//! caller since sending `EXIT_REQUEST` requires a live bus connection this
//! crate doesn't own.

use bdj_core::LockManager;
use bdj_proto::{MessageCode, Route, FLEET_ROUTES};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info};

/// UI-facing routes asked to leave first, before anything in the fleet
/// that depends on them.
pub const UI_ROUTES: &[Route] = &[Route::ConfigUi, Route::ManageUi, Route::HelperUi, Route::PlayerUi];

fn remaining(lock_mgr: &LockManager, routes: &[Route]) -> Vec<Route> {
    routes.iter().copied().filter(|r| lock_mgr.exists(*r)).collect()
}

/// Runs the five-step sequence described for fleet shutdown, returning
/// once every route's lock file is gone (or the final force-kill step
/// has run out of chances).
pub async fn shutdown_fleet<F, Fut>(lock_mgr: &LockManager, mut signal: F)
where
    F: FnMut(Route, MessageCode) -> Fut,
    Fut: Future<Output = ()>,
{
    info!("fleet shutdown: step 1, exit request to UI routes");
    for route in UI_ROUTES {
        signal(*route, MessageCode::ExitRequest).await;
    }
    tokio::time::sleep(Duration::from_secs(1)).await;

    if !remaining(lock_mgr, FLEET_ROUTES).is_empty() {
        info!("fleet shutdown: step 2, exit request to main");
        signal(Route::Main, MessageCode::ExitRequest).await;
        tokio::time::sleep(Duration::from_millis(1500)).await;
    }

    let still_up = remaining(lock_mgr, FLEET_ROUTES);
    if !still_up.is_empty() {
        info!(count = still_up.len(), "fleet shutdown: step 3, exit request to remaining routes");
        for route in &still_up {
            signal(*route, MessageCode::ExitRequest).await;
        }
        tokio::time::sleep(Duration::from_millis(1500)).await;
    }

    let still_up = remaining(lock_mgr, FLEET_ROUTES);
    if !still_up.is_empty() {
        info!(count = still_up.len(), "fleet shutdown: step 4, OS terminate");
        for route in &still_up {
            if let Some(pid) = lock_mgr.pid_of(*route) {
                send_signal(pid, false);
            }
        }
        tokio::time::sleep(Duration::from_millis(1500)).await;
    }

    let still_up = remaining(lock_mgr, FLEET_ROUTES);
    if !still_up.is_empty() {
        info!(count = still_up.len(), "fleet shutdown: step 5, force kill");
        for route in &still_up {
            if let Some(pid) = lock_mgr.pid_of(*route) {
                send_signal(pid, true);
            }
            let _ = lock_mgr.clear(*route);
        }
    }

    cleanup_audio_sink_register();
}

#[cfg(unix)]
fn send_signal(pid: u32, force: bool) {
    use nix::sys::signal::{kill, Signal};
    use nix::unistd::Pid;
    let sig = if force { Signal::SIGKILL } else { Signal::SIGTERM };
    if let Err(e) = kill(Pid::from_raw(pid as i32), sig) {
        debug!(pid, ?sig, "signal delivery failed: {e}");
    }
}

#[cfg(not(unix))]
fn send_signal(_pid: u32, _force: bool) {}

/// The audio stack is out of scope here; this is a placeholder for the
/// upstream volume-register cleanup so the shutdown sequence's final
/// step has somewhere to hang a future implementation.
fn cleanup_audio_sink_register() {
    debug!("fleet shutdown: audio sink register cleanup (no-op)");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn shutdown_with_no_locks_sends_only_ui_exit_requests() {
        let dir = tempfile::tempdir().unwrap();
        let lock_mgr = LockManager::new(dir.path());
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = calls.clone();

        shutdown_fleet(&lock_mgr, |_route, _code| {
            let calls = calls_clone.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
            }
        })
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), UI_ROUTES.len());
    }
}
