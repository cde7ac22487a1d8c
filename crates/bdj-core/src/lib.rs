//! Process supervision primitives shared by every BDJ4 process.
//!
//! This crate owns nothing about the wire protocol (`bdj-proto`) or
//! socket I/O (`bdj-bus`) — it's the layer below both: lock files, child
//! process control, the program lifecycle state machine, and shutdown
//! signaling.

pub mod child;
pub mod lock;
pub mod progstate;
pub mod shutdown;

pub use child::{ChildError, ManagedChild};
pub use lock::{LockError, LockGuard, LockManager};
pub use progstate::{ProgState, StateMachine};
pub use shutdown::ShutdownSignal;
