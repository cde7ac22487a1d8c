//! Wire protocol for the BDJ4 message bus.
//!
//! This crate owns everything about the *shape* of a message: the route
//! and message-code enumerations, the fixed textual header, and the
//! record-separated argument payload. It knows nothing about sockets —
//! that is `bdj-bus`'s job.

pub mod args;
pub mod frame;
pub mod message;
pub mod route;

pub use args::{ArgsBuilder, ArgsIter, Field};
pub use frame::{decode_header, encode_header, FrameError, Header, HEADER_LEN};
pub use message::MessageCode;
pub use route::{Route, FLEET_ROUTES, ROUTE_MAX};

/// Max args payload, matching the upstream `BDJMSG_MAX_ARGS` bound.
pub const MAX_ARGS_LEN: usize = 20_000;

/// Max total frame payload (header + args), matching `BDJMSG_MAX`.
pub const MAX_FRAME_LEN: usize = HEADER_LEN + MAX_ARGS_LEN;
