//! Tracks one TCP connection per peer route: its write half and health.
//!
//! Messages other than `Handshake` are refused to a peer still in
//! `Connecting` state, mirroring the upstream connection manager's
//! `WAIT_HANDSHAKE` gate — a route that hasn't exchanged a handshake yet
//! cannot be addressed as if it were fully up.

use crate::health::{LinkHealth, LinkState};
use crate::transport::{write_message, TransportError};
use bdj_proto::{MessageCode, Route};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::io::AsyncWrite;
use tokio::sync::{Mutex, RwLock};

#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    #[error("no connection registered for {0}")]
    NotFound(Route),
    #[error("{0} has not completed its handshake yet")]
    NotReady(Route),
    #[error(transparent)]
    Transport(#[from] TransportError),
}

struct Peer<W> {
    write_half: Mutex<W>,
    health: Arc<LinkHealth>,
}

/// Tracks every peer this process currently holds a socket open to.
pub struct ConnectionManager<W> {
    peers: RwLock<HashMap<Route, Peer<W>>>,
}

impl<W> Default for ConnectionManager<W> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: AsyncWrite + Unpin> ConnectionManager<W> {
    pub fn new() -> Self {
        Self {
            peers: RwLock::new(HashMap::new()),
        }
    }

    /// Register a newly accepted or dialed connection. Starts in
    /// `Connecting` state until a handshake is observed.
    pub async fn register(&self, route: Route, write_half: W) -> Arc<LinkHealth> {
        let health = Arc::new(LinkHealth::new());
        let mut peers = self.peers.write().await;
        peers.insert(
            route,
            Peer {
                write_half: Mutex::new(write_half),
                health: health.clone(),
            },
        );
        health
    }

    pub async fn remove(&self, route: Route) {
        self.peers.write().await.remove(&route);
    }

    pub async fn is_connected(&self, route: Route) -> bool {
        self.peers
            .read()
            .await
            .get(&route)
            .map(|p| p.health.is_connected())
            .unwrap_or(false)
    }

    pub async fn mark_handshake_complete(&self, route: Route) -> Result<(), ConnectionError> {
        let peers = self.peers.read().await;
        let peer = peers.get(&route).ok_or(ConnectionError::NotFound(route))?;
        peer.health.set_state(LinkState::Ready);
        Ok(())
    }

    /// Send a message to `route`. `Handshake` itself is allowed through
    /// the gate since it's what moves the peer out of `Connecting`.
    pub async fn send(
        &self,
        from: Route,
        to: Route,
        code: MessageCode,
        args: Option<&[u8]>,
    ) -> Result<(), ConnectionError> {
        let peers = self.peers.read().await;
        let peer = peers.get(&to).ok_or(ConnectionError::NotFound(to))?;

        if code != MessageCode::Handshake && !peer.health.is_connected() {
            return Err(ConnectionError::NotReady(to));
        }

        let mut write_half = peer.write_half.lock().await;
        write_message(&mut *write_half, from, to, code, args).await?;
        Ok(())
    }
}
