//! Swapping a freshly built database file into place.
//!
//! `rename` is O(1) when the temp file and the live path share a
//! filesystem; when they don't (`EXDEV`), fall back to copy-then-delete.

use std::io;
use std::path::Path;

#[cfg(unix)]
fn is_cross_device(err: &io::Error) -> bool {
    err.raw_os_error() == Some(libc::EXDEV)
}

#[cfg(not(unix))]
fn is_cross_device(_err: &io::Error) -> bool {
    false
}

/// Atomically replace `live` with `temp`, falling back to copy+delete if
/// they live on different filesystems.
pub fn seal(temp: &Path, live: &Path) -> io::Result<()> {
    match std::fs::rename(temp, live) {
        Ok(()) => Ok(()),
        Err(e) if is_cross_device(&e) => {
            std::fs::copy(temp, live)?;
            std::fs::remove_file(temp)
        }
        Err(e) => Err(e),
    }
}
