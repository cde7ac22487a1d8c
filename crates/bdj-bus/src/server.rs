//! The socket main loop: accepts peer connections and dispatches their
//! frames to a handler.
//!
//! Each accepted connection gets its own read task rather than being
//! multiplexed inside one `tokio::select!` arm. That sidesteps the fairness
//! problem the upstream round-robin `sockCheck` loop solves by hand — the
//! Tokio scheduler interleaves ready tasks itself, so no single noisy peer
//! can starve the others out of service.

use crate::connection::{ConnectionError, ConnectionManager};
use crate::transport::{read_message, TransportError};
use bdj_core::ShutdownSignal;
use bdj_proto::Route;
use std::sync::Arc;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::{TcpListener, TcpStream, ToSocketAddrs};
use tracing::{debug, info, warn};

#[derive(Debug, thiserror::Error)]
pub enum BusError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Connection(#[from] ConnectionError),
}

/// Handles frames delivered by the socket main loop. Implemented by the
/// owning process (player, main, manageui, ...).
pub trait MessageHandler: Send + Sync + 'static {
    fn handle(&self, from: Route, code: bdj_proto::MessageCode, args: Vec<u8>);
}

pub type Connections = ConnectionManager<OwnedWriteHalf>;

/// One process's listening socket plus the set of peer connections it has
/// accepted or dialed.
pub struct BusServer {
    listener: TcpListener,
    connections: Arc<Connections>,
    shutdown: ShutdownSignal,
    self_route: Route,
}

impl BusServer {
    pub async fn bind(self_route: Route, addr: impl ToSocketAddrs) -> std::io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self {
            listener,
            connections: Arc::new(ConnectionManager::new()),
            shutdown: ShutdownSignal::new(),
            self_route,
        })
    }

    pub fn connections(&self) -> Arc<Connections> {
        self.connections.clone()
    }

    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.clone()
    }

    /// Run until the shutdown signal fires. Every accepted connection is
    /// read in its own task; the first frame off a new connection must be
    /// a `Handshake` naming the peer's route (anything else is a protocol
    /// error and the connection is dropped).
    pub async fn run<H: MessageHandler>(self, handler: Arc<H>) -> Result<(), BusError> {
        let mut shutdown_rx = self.shutdown.subscribe();
        info!("bus server listening on {:?}", self.listener.local_addr());

        loop {
            tokio::select! {
                accepted = self.listener.accept() => {
                    match accepted {
                        Ok((stream, peer_addr)) => {
                            debug!(%peer_addr, "accepted bus connection");
                            spawn_reader(self.self_route, stream, self.connections.clone(), handler.clone(), self.shutdown.subscribe());
                        }
                        Err(e) => warn!("accept failed: {e}"),
                    }
                }
                _ = shutdown_rx.recv() => {
                    info!("bus server shutting down");
                    break;
                }
            }
        }
        Ok(())
    }
}

fn spawn_reader<H: MessageHandler>(
    self_route: Route,
    stream: TcpStream,
    connections: Arc<Connections>,
    handler: Arc<H>,
    mut shutdown: tokio::sync::broadcast::Receiver<()>,
) {
    tokio::spawn(async move {
        let (mut read_half, write_half) = stream.into_split();
        let mut write_half = Some(write_half);
        let mut route: Option<Route> = None;

        loop {
            tokio::select! {
                frame = read_message(&mut read_half) => {
                    let (header, args) = match frame {
                        Ok(v) => v,
                        Err(TransportError::Io(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                            debug!("peer closed connection");
                            break;
                        }
                        Err(e) => {
                            warn!("frame error: {e}");
                            break;
                        }
                    };

                    // The write half is only handed to the connection manager
                    // once the peer's route is known, which the first frame
                    // establishes.
                    if route.is_none() {
                        if let Some(w) = write_half.take() {
                            connections.register(header.route_from, w).await;
                        }
                        route = Some(header.route_from);
                    }
                    if header.code == bdj_proto::MessageCode::Handshake {
                        if let Some(r) = route {
                            let _ = connections.mark_handshake_complete(r).await;
                            // The accepting side replies with its own handshake; the
                            // connector doesn't consider itself ready until it sees this.
                            let _ = connections.send(self_route, r, bdj_proto::MessageCode::Handshake, None).await;
                        }
                    }

                    handler.handle(header.route_from, header.code, args);
                }
                _ = shutdown.recv() => break,
            }
        }

        if let Some(r) = route {
            connections.remove(r).await;
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{read_message, write_message};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingHandler(AtomicUsize);

    impl MessageHandler for CountingHandler {
        fn handle(&self, _from: Route, _code: bdj_proto::MessageCode, _args: Vec<u8>) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn accepting_side_replies_to_a_handshake() {
        let server = BusServer::bind(Route::Main, ("127.0.0.1", 0)).await.unwrap();
        let addr = server.listener.local_addr().unwrap();
        let shutdown = server.shutdown_signal();
        let handler = Arc::new(CountingHandler(AtomicUsize::new(0)));
        let run_handle = tokio::spawn(server.run(handler.clone()));

        let mut stream = TcpStream::connect(addr).await.unwrap();
        write_message(&mut stream, Route::Player, Route::Main, bdj_proto::MessageCode::Handshake, None)
            .await
            .unwrap();

        let (header, _) = read_message(&mut stream).await.unwrap();
        assert_eq!(header.route_from, Route::Main);
        assert_eq!(header.route_to, Route::Player);
        assert_eq!(header.code, bdj_proto::MessageCode::Handshake);

        shutdown.fire();
        let _ = run_handle.await;
    }
}
