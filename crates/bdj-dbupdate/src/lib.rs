//! Database-update pipeline shared by the `dbupdate` process: walks the
//! music directory, fans file paths out to the tag reader, merges the
//! replies into the live database, and atomically publishes a rebuild.

pub mod blacklist;
pub mod pipeline;
pub mod seal;

pub use blacklist::is_blacklisted;
pub use pipeline::{Counters, DbUpdatePipeline, DbUpdateState, StepOutcome, FNAMES_SENT_PER_ITER};
pub use seal::seal;
