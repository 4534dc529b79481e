//! Host collaborator trait and stub implementation.
//!
//! The bridge never talks to the simulation engine directly -- it reads
//! world state through the [`WorldHost`] trait. The embedding host
//! implements it over its own APIs (player roster, calendar, storm
//! simulation); tests use [`FixedWorldHost`], whose readings can be
//! mutated from the outside while detectors hold a shared reference.
//!
//! Every read can fail: the host may still be loading, or a subsystem
//! may be mid-reload. Callers are required to recover locally -- the
//! snapshot builder degrades, detectors skip the poll cycle -- so a
//! [`HostError`] never propagates past an operation boundary.

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Errors produced by host collaborator reads.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    /// The host subsystem backing this read is not available.
    #[error("host unavailable: {message}")]
    Unavailable {
        /// Description of what was unavailable.
        message: String,
    },

    /// The host returned data the bridge cannot interpret.
    #[error("invalid host data: {message}")]
    Invalid {
        /// Description of the invalid data.
        message: String,
    },
}

/// Read-only view of the simulation world consumed by the bridge.
///
/// All methods are synchronous and expected to be cheap -- they are
/// called from tick callbacks that must not stall the host's loop.
pub trait WorldHost: Send + Sync {
    /// Names of all currently online players, in roster order.
    fn online_players(&self) -> Result<Vec<String>, HostError>;

    /// Configured player capacity, if the host reports one.
    fn max_players(&self) -> Option<u32>;

    /// Pretty-printed in-game date and time.
    fn pretty_date(&self) -> Result<String, HostError>;

    /// Current in-game calendar month text (leading word of the date).
    fn calendar_month(&self) -> Result<String, HostError>;

    /// Whether a temporal storm is currently active.
    fn storm_active(&self) -> Result<bool, HostError>;

    /// In-game days until the next storm onset, if one is scheduled.
    fn days_until_next_storm(&self) -> Result<Option<f64>, HostError>;
}

/// Mutable backing state of a [`FixedWorldHost`].
#[derive(Debug, Clone)]
struct FixedWorldState {
    players: Vec<String>,
    max_players: Option<u32>,
    pretty_date: String,
    month: String,
    storm_active: bool,
    days_until_next_storm: Option<f64>,
    failing: bool,
}

/// A [`WorldHost`] with externally settable readings.
///
/// Used by tests (and early integration) to script world state: hold an
/// `Arc<FixedWorldHost>`, hand a clone to the bridge, and flip readings
/// between polls. When `failing` is set, every fallible read returns
/// [`HostError::Unavailable`], which exercises the degraded paths.
#[derive(Debug)]
pub struct FixedWorldHost {
    state: RwLock<FixedWorldState>,
}

impl FixedWorldHost {
    /// Create a host with an empty roster, no storm, and a June date.
    pub fn new() -> Self {
        Self {
            state: RwLock::new(FixedWorldState {
                players: Vec::new(),
                max_players: None,
                pretty_date: String::from("June 1, year 1, 06:00"),
                month: String::from("June"),
                storm_active: false,
                days_until_next_storm: None,
                failing: false,
            }),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, FixedWorldState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, FixedWorldState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn fallible<T>(&self, value: T) -> Result<T, HostError> {
        if self.read().failing {
            return Err(HostError::Unavailable {
                message: String::from("host is in failing mode"),
            });
        }
        Ok(value)
    }

    /// Replace the online player roster.
    pub fn set_players<I: IntoIterator<Item = S>, S: Into<String>>(&self, players: I) {
        self.write().players = players.into_iter().map(Into::into).collect();
    }

    /// Set or clear the reported player capacity.
    pub fn set_max_players(&self, max: Option<u32>) {
        self.write().max_players = max;
    }

    /// Set the pretty date string.
    pub fn set_pretty_date(&self, date: &str) {
        self.write().pretty_date = date.to_owned();
    }

    /// Set the calendar month text.
    pub fn set_month(&self, month: &str) {
        self.write().month = month.to_owned();
    }

    /// Set whether a storm is active.
    pub fn set_storm_active(&self, active: bool) {
        self.write().storm_active = active;
    }

    /// Set the days remaining until the next storm onset.
    pub fn set_days_until_next_storm(&self, days: Option<f64>) {
        self.write().days_until_next_storm = days;
    }

    /// Toggle failing mode: when set, every fallible read errors.
    pub fn set_failing(&self, failing: bool) {
        self.write().failing = failing;
    }
}

impl Default for FixedWorldHost {
    fn default() -> Self {
        Self::new()
    }
}

impl WorldHost for FixedWorldHost {
    fn online_players(&self) -> Result<Vec<String>, HostError> {
        let players = self.read().players.clone();
        self.fallible(players)
    }

    fn max_players(&self) -> Option<u32> {
        self.read().max_players
    }

    fn pretty_date(&self) -> Result<String, HostError> {
        let date = self.read().pretty_date.clone();
        self.fallible(date)
    }

    fn calendar_month(&self) -> Result<String, HostError> {
        let month = self.read().month.clone();
        self.fallible(month)
    }

    fn storm_active(&self) -> Result<bool, HostError> {
        let active = self.read().storm_active;
        self.fallible(active)
    }

    fn days_until_next_storm(&self) -> Result<Option<f64>, HostError> {
        let days = self.read().days_until_next_storm;
        self.fallible(days)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_host_reflects_settings() {
        let host = FixedWorldHost::new();
        host.set_players(["Aldren", "Mara"]);
        host.set_storm_active(true);
        host.set_max_players(Some(16));

        assert_eq!(
            host.online_players().unwrap_or_default(),
            vec![String::from("Aldren"), String::from("Mara")]
        );
        assert!(host.storm_active().unwrap_or(false));
        assert_eq!(host.max_players(), Some(16));
    }

    #[test]
    fn failing_mode_errors_every_fallible_read() {
        let host = FixedWorldHost::new();
        host.set_failing(true);

        assert!(host.online_players().is_err());
        assert!(host.pretty_date().is_err());
        assert!(host.calendar_month().is_err());
        assert!(host.storm_active().is_err());
        assert!(host.days_until_next_storm().is_err());
    }
}
