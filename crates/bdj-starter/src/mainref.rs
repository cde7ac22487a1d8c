//! Reference-counted lifetime for the central `main` process.
//!
//! Several UIs can each ask the starter to bring `main` up; `main` stays
//! alive as long as at least one of them still holds a reference, and is
//! torn down the moment the last one disconnects.

use bdj_core::ManagedChild;
use bdj_proto::Route;
use std::collections::HashSet;
use std::io;
use tokio::process::Command;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// `main` was not running; it has been spawned.
    Spawned,
    /// `main` was already up and this requester is new; just counted.
    Tracked,
    /// This requester had already asked before and `main` is still up:
    /// it crashed and restarted without `main` itself going away, so
    /// tell it to re-attach instead of spawning a second copy.
    Reattach,
}

pub struct MainSupervisor {
    child: Option<ManagedChild>,
    requesters: HashSet<Route>,
}

impl Default for MainSupervisor {
    fn default() -> Self {
        Self::new()
    }
}

impl MainSupervisor {
    pub fn new() -> Self {
        Self {
            child: None,
            requesters: HashSet::new(),
        }
    }

    /// Reaps the child if it has exited; `false` once that's happened.
    pub fn is_running(&mut self) -> bool {
        match &mut self.child {
            Some(child) => match child.is_alive() {
                Ok(true) => true,
                _ => {
                    self.child = None;
                    false
                }
            },
            None => false,
        }
    }

    pub fn request_start(&mut self, requester: Route, command: Command) -> io::Result<StartOutcome> {
        if !self.is_running() {
            self.child = Some(ManagedChild::spawn(command)?);
            self.requesters.clear();
            self.requesters.insert(requester);
            return Ok(StartOutcome::Spawned);
        }

        if self.requesters.contains(&requester) {
            return Ok(StartOutcome::Reattach);
        }

        self.requesters.insert(requester);
        Ok(StartOutcome::Tracked)
    }

    /// A UI route disconnected. Returns `true` if that was the last
    /// reference and `main` should now be terminated.
    pub fn release(&mut self, requester: Route) -> bool {
        self.requesters.remove(&requester);
        self.requesters.is_empty() && self.child.is_some()
    }

    pub fn take_child(&mut self) -> Option<ManagedChild> {
        self.child.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn first_request_spawns() {
        let mut sup = MainSupervisor::new();
        let outcome = sup.request_start(Route::ConfigUi, Command::new("true")).unwrap();
        assert_eq!(outcome, StartOutcome::Spawned);
        // Give the child a moment to actually start before we check it.
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    }

    #[tokio::test]
    async fn second_distinct_requester_is_tracked_not_respawned() {
        let mut sup = MainSupervisor::new();
        let mut cmd = Command::new("sleep");
        cmd.arg("5");
        sup.request_start(Route::ConfigUi, cmd).unwrap();
        let outcome = sup.request_start(Route::ManageUi, Command::new("true")).unwrap();
        assert_eq!(outcome, StartOutcome::Tracked);
    }

    #[tokio::test]
    async fn repeat_request_from_same_ui_is_a_reattach() {
        let mut sup = MainSupervisor::new();
        let mut cmd = Command::new("sleep");
        cmd.arg("5");
        sup.request_start(Route::ConfigUi, cmd).unwrap();
        let outcome = sup.request_start(Route::ConfigUi, Command::new("true")).unwrap();
        assert_eq!(outcome, StartOutcome::Reattach);
    }

    #[tokio::test]
    async fn release_of_last_requester_signals_teardown() {
        let mut sup = MainSupervisor::new();
        let mut cmd = Command::new("sleep");
        cmd.arg("5");
        sup.request_start(Route::ConfigUi, cmd).unwrap();
        assert!(sup.release(Route::ConfigUi));
    }

    #[tokio::test]
    async fn release_while_others_remain_does_not_signal_teardown() {
        let mut sup = MainSupervisor::new();
        let mut cmd = Command::new("sleep");
        cmd.arg("5");
        sup.request_start(Route::ConfigUi, cmd).unwrap();
        sup.request_start(Route::ManageUi, Command::new("true")).unwrap();
        assert!(!sup.release(Route::ConfigUi));
    }
}
