//! Shared CLI surface and logging setup for every BDJ4 process binary.
//!
//! Each binary embeds [`BaseArgs`] via `#[command(flatten)]` and calls
//! [`init_logging`] before doing anything else. Only binaries configure a
//! subscriber; none of the library crates do.

use clap::Args;
use tracing_subscriber::EnvFilter;

/// Flags common to every process binary.
#[derive(Args, Debug, Clone)]
pub struct BaseArgs {
    /// Which profile (of several parallel installs) this process belongs to.
    #[arg(long, default_value_t = 0)]
    pub profile: u16,

    /// Bitmask controlling log verbosity; falls back to `RUST_LOG` if unset.
    #[arg(long)]
    pub debug: Option<u32>,

    /// Marks this process as launched by the starter rather than by hand.
    #[arg(long)]
    pub bdj4: bool,
}

/// Installs a `tracing_subscriber` driven by `RUST_LOG`, falling back to a
/// verbosity derived from `--debug` when the env var isn't set.
pub fn init_logging(route: &str, debug_mask: Option<u32>) {
    let default_directive = match debug_mask {
        Some(mask) if mask > 0 => "debug",
        _ => "info",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    tracing::info!(route, "logging initialized");
}
