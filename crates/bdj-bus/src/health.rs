//! Per-link health tracking for bus connections.
//!
//! Mirrors the upstream connection manager's own handshake gate: a link
//! isn't usable for message delivery until it reaches `Ready`, and a link
//! that stops answering is marked `Dead` so callers stop routing to it
//! instead of blocking on a socket that will never reply.

use std::sync::atomic::{AtomicU32, AtomicU8, Ordering};
use std::time::Instant;
use tokio::sync::RwLock;

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    /// TCP connected, handshake not yet exchanged.
    Connecting = 0,
    /// Handshake complete, messages flow.
    Ready = 1,
    /// Heartbeat failures exceeded the threshold.
    Dead = 2,
}

impl LinkState {
    fn from_u8(v: u8) -> Self {
        match v {
            0 => LinkState::Connecting,
            1 => LinkState::Ready,
            _ => LinkState::Dead,
        }
    }
}

/// Lock-free-readable health state for one peer connection.
pub struct LinkHealth {
    state: AtomicU8,
    consecutive_failures: AtomicU32,
    last_message_recv: RwLock<Option<Instant>>,
}

impl Default for LinkHealth {
    fn default() -> Self {
        Self::new()
    }
}

impl LinkHealth {
    pub fn new() -> Self {
        Self {
            state: AtomicU8::new(LinkState::Connecting as u8),
            consecutive_failures: AtomicU32::new(0),
            last_message_recv: RwLock::new(None),
        }
    }

    pub fn state(&self) -> LinkState {
        LinkState::from_u8(self.state.load(Ordering::Relaxed))
    }

    pub fn set_state(&self, state: LinkState) -> LinkState {
        LinkState::from_u8(self.state.swap(state as u8, Ordering::Relaxed))
    }

    pub fn is_connected(&self) -> bool {
        self.state() == LinkState::Ready
    }

    /// Any inbound traffic counts, same as the Majordomo pattern this is
    /// modeled on: a reply to any message is as good as a heartbeat reply.
    pub async fn record_message_received(&self) {
        *self.last_message_recv.write().await = Some(Instant::now());
        self.consecutive_failures.store(0, Ordering::Relaxed);
        if self.state() == LinkState::Connecting {
            self.set_state(LinkState::Ready);
        }
    }

    pub fn record_failure(&self, max_failures: u32) -> bool {
        let failures = self.consecutive_failures.fetch_add(1, Ordering::Relaxed) + 1;
        if failures >= max_failures {
            self.set_state(LinkState::Dead);
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_connecting() {
        let health = LinkHealth::new();
        assert_eq!(health.state(), LinkState::Connecting);
        assert!(!health.is_connected());
    }

    #[tokio::test]
    async fn message_receipt_marks_ready() {
        let health = LinkHealth::new();
        health.record_message_received().await;
        assert!(health.is_connected());
    }

    #[test]
    fn enough_failures_marks_dead() {
        let health = LinkHealth::new();
        assert!(!health.record_failure(3));
        assert!(!health.record_failure(3));
        assert!(health.record_failure(3));
        assert_eq!(health.state(), LinkState::Dead);
    }
}
