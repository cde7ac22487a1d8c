//! Liveness polling and one-shot auto-restart for the player UI.
//!
//! Starter pings the player UI on a fixed interval; a failed ping means
//! the peer is gone. It's only worth restarting automatically if it had
//! been up long enough to look like a real crash rather than a process
//! that's still failing to start in the first place.

use std::time::{Duration, Instant};

pub const POLL_INTERVAL: Duration = Duration::from_millis(500);
const MIN_UPTIME_FOR_RESTART: Duration = Duration::from_secs(60);

pub struct PlayerUiWatchdog {
    spawned_at: Instant,
    restarted: bool,
}

impl PlayerUiWatchdog {
    pub fn new(spawned_at: Instant) -> Self {
        Self {
            spawned_at,
            restarted: false,
        }
    }

    /// Call when a liveness ping fails. Returns `true` if the watchdog
    /// should trigger a respawn; `false` if it's too soon to tell or the
    /// one-shot restart has already been used.
    pub fn on_ping_failure(&mut self) -> bool {
        if self.restarted {
            return false;
        }
        if self.spawned_at.elapsed() < MIN_UPTIME_FOR_RESTART {
            return false;
        }
        self.restarted = true;
        true
    }

    /// Reset after an actual respawn, so a subsequent crash that's also
    /// up for 60s can be restarted once more.
    pub fn reset(&mut self, spawned_at: Instant) {
        self.spawned_at = spawned_at;
        self.restarted = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_process_is_not_restarted_on_early_failure() {
        let mut wd = PlayerUiWatchdog::new(Instant::now());
        assert!(!wd.on_ping_failure());
    }

    #[test]
    fn restart_is_one_shot() {
        let mut wd = PlayerUiWatchdog::new(Instant::now() - Duration::from_secs(61));
        assert!(wd.on_ping_failure());
        assert!(!wd.on_ping_failure());
    }

    #[test]
    fn reset_allows_another_future_restart() {
        let mut wd = PlayerUiWatchdog::new(Instant::now() - Duration::from_secs(61));
        assert!(wd.on_ping_failure());
        wd.reset(Instant::now() - Duration::from_secs(61));
        assert!(wd.on_ping_failure());
    }
}
