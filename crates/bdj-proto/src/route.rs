//! Route identifiers for every process kind in a BDJ4 deployment.
//!
//! Stable across a single running deployment. The discriminant doubles as
//! the index into the port and lock-file tables, so new routes are always
//! appended before `Route::Max`.

use std::fmt;

/// A process kind, also the index into per-route port/lock tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u16)]
pub enum Route {
    /// Anonymous / not-yet-identified sender.
    None = 0,
    /// Reserved, not used by any current process.
    AltInst = 1,
    BpmCounter = 2,
    ConfigUi = 3,
    /// The main database-update process.
    DbUpdate = 4,
    HelperUi = 5,
    Main = 6,
    ManageUi = 7,
    Marquee = 8,
    MobileMq = 9,
    Player = 10,
    PlayerUi = 11,
    RemCtrl = 12,
    Server = 13,
    StarterUi = 14,
    TestSuite = 15,
    PodcastUpd = 16,
}

/// One past the last valid route; used for table sizing and range loops.
pub const ROUTE_MAX: u16 = 17;

/// All routes other than `StarterUi`, in ascending order.
///
/// The starter never sends itself an exit request or holds its own lock
/// file, so fleet-wide operations (shutdown, lock sweep) iterate this list.
pub const FLEET_ROUTES: &[Route] = &[
    Route::AltInst,
    Route::BpmCounter,
    Route::ConfigUi,
    Route::DbUpdate,
    Route::HelperUi,
    Route::Main,
    Route::ManageUi,
    Route::Marquee,
    Route::MobileMq,
    Route::Player,
    Route::PlayerUi,
    Route::RemCtrl,
    Route::Server,
    Route::TestSuite,
    Route::PodcastUpd,
];

impl Route {
    /// Debug name, stable across releases. Mirrors the fixed lookup table
    /// the upstream implementation keeps for diagnostics.
    pub fn as_str(self) -> &'static str {
        match self {
            Route::None => "none",
            Route::AltInst => "altinst",
            Route::BpmCounter => "bpmcounter",
            Route::ConfigUi => "configui",
            Route::DbUpdate => "dbupdate",
            Route::HelperUi => "helperui",
            Route::Main => "main",
            Route::ManageUi => "manageui",
            Route::Marquee => "marquee",
            Route::MobileMq => "mobilemq",
            Route::Player => "player",
            Route::PlayerUi => "playerui",
            Route::RemCtrl => "remctrl",
            Route::Server => "server",
            Route::StarterUi => "starterui",
            Route::TestSuite => "test-suite",
            Route::PodcastUpd => "podcastupd",
        }
    }

    /// Offset added to `base_port` (and the profile span) to get this
    /// route's listen port. Stable ordering, matches the discriminant.
    pub fn port_offset(self) -> u16 {
        self as u16
    }

    /// File name (without directory) of this route's lock file.
    pub fn lock_name(self) -> String {
        format!("{}.lck", self.as_str())
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error converting a raw numeric route field into a [`Route`].
#[derive(Debug, thiserror::Error)]
#[error("route code {0} out of range 0..{ROUTE_MAX}")]
pub struct RouteRangeError(pub u16);

impl TryFrom<u16> for Route {
    type Error = RouteRangeError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Ok(match value {
            0 => Route::None,
            1 => Route::AltInst,
            2 => Route::BpmCounter,
            3 => Route::ConfigUi,
            4 => Route::DbUpdate,
            5 => Route::HelperUi,
            6 => Route::Main,
            7 => Route::ManageUi,
            8 => Route::Marquee,
            9 => Route::MobileMq,
            10 => Route::Player,
            11 => Route::PlayerUi,
            12 => Route::RemCtrl,
            13 => Route::Server,
            14 => Route::StarterUi,
            15 => Route::TestSuite,
            16 => Route::PodcastUpd,
            other => return Err(RouteRangeError(other)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_every_route() {
        for code in 0..ROUTE_MAX {
            let route = Route::try_from(code).expect("in range");
            assert_eq!(route.port_offset(), code);
        }
    }

    #[test]
    fn out_of_range_is_rejected() {
        assert!(Route::try_from(ROUTE_MAX).is_err());
    }

    #[test]
    fn fleet_routes_exclude_starterui() {
        assert!(!FLEET_ROUTES.contains(&Route::StarterUi));
        assert_eq!(FLEET_ROUTES.len(), ROUTE_MAX as usize - 2);
    }

    #[test]
    fn lock_name_is_suffixed() {
        assert_eq!(Route::Main.lock_name(), "main.lck");
    }
}
