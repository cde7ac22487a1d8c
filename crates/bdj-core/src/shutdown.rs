//! Fleet-wide shutdown signaling.
//!
//! Every socket loop and background task subscribes to one
//! `broadcast::Receiver<()>`; firing the sender once wakes all of them out
//! of whatever `tokio::select!` they're parked in. Replaces a boolean
//! "kill requested" flag that every loop would otherwise have to poll.

use tokio::sync::broadcast;

#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    tx: broadcast::Sender<()>,
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownSignal {
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(1);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Wake every subscriber. Safe to call more than once.
    pub fn fire(&self) {
        let _ = self.tx.send(());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn firing_wakes_all_subscribers() {
        let signal = ShutdownSignal::new();
        let mut a = signal.subscribe();
        let mut b = signal.subscribe();
        signal.fire();
        a.recv().await.unwrap();
        b.recv().await.unwrap();
    }

    #[tokio::test]
    async fn firing_twice_does_not_panic() {
        let signal = ShutdownSignal::new();
        signal.fire();
        signal.fire();
    }
}
