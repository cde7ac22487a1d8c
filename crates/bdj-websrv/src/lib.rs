//! The three embedded HTTP servers: mobile marquee (no auth), remote
//! control (Basic auth, realm `BDJ4 Remote`), and inter-host file sharing
//! (TLS + Basic auth, realm `BDJ4`). URI safety checks (forbidden
//! suffixes, traversal) apply to all three.

pub mod auth;
pub mod fileserver;
pub mod mobilemq;
pub mod remote;
pub mod serve;
pub mod uri;

pub use auth::BasicAuthConfig;
pub use fileserver::FileServerSource;
pub use mobilemq::MarqueeSource;
pub use remote::RemoteControl;
pub use serve::{serve, serve_tls, TlsFiles};
