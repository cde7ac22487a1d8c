//! Socket transport, connection manager, and main loop for the BDJ4
//! message bus. Builds on `bdj-proto`'s wire types and `bdj-core`'s
//! shutdown signaling.

pub mod connection;
pub mod health;
pub mod server;
pub mod transport;

pub use connection::{ConnectionError, ConnectionManager};
pub use health::{LinkHealth, LinkState};
pub use server::{BusError, BusServer, Connections, MessageHandler};
pub use transport::{read_message, write_message, TransportError, MAX_FRAME_LEN};
