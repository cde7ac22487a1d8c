//! Supervision policy for the `starter` process: reference-counted
//! lifetime for `main`, a watchdog over the player UI, orderly fleet
//! shutdown, and per-profile addressing.

pub mod mainref;
pub mod profile;
pub mod shutdown;
pub mod watchdog;

pub use mainref::{MainSupervisor, StartOutcome};
pub use profile::{lock_manager_for_profile, route_port};
pub use shutdown::{shutdown_fleet, UI_ROUTES};
pub use watchdog::{PlayerUiWatchdog, POLL_INTERVAL};
