//! Status snapshot construction.
//!
//! [`build_snapshot`] is a pure read of host state that never fails the
//! caller: any [`HostError`](stormwatch_core::host::HostError) degrades
//! the affected fields (zero counts, storm inactive, empty date) rather
//! than propagating, because the status endpoint must always answer
//! with HTTP 200 while the host process is up.

use serde::{Deserialize, Serialize};
use stormwatch_core::host::WorldHost;
use tracing::warn;

/// Overall mode of a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotStatus {
    /// The bridge has not finished starting; all data fields are
    /// placeholders.
    Initializing,
    /// Normal operation.
    Ok,
}

/// A point-in-time view of world state served by `GET /status/`.
///
/// Constructed fresh on every request; immutable once built; never
/// persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusSnapshot {
    /// Snapshot mode.
    pub status: SnapshotStatus,
    /// Whether the server is up and serving players.
    pub online: bool,
    /// Number of online players.
    pub player_count: u32,
    /// Configured player capacity.
    pub max_players: u32,
    /// Names of online players, in roster order.
    pub players: Vec<String>,
    /// Pretty-printed in-game date and time.
    pub pretty_date: String,
    /// Whether a temporal storm is active.
    pub temporal_storm: bool,
}

impl StatusSnapshot {
    /// The fixed placeholder served before startup completes.
    pub const fn initializing(default_max_players: u32) -> Self {
        Self {
            status: SnapshotStatus::Initializing,
            online: false,
            player_count: 0,
            max_players: default_max_players,
            players: Vec::new(),
            pretty_date: String::new(),
            temporal_storm: false,
        }
    }
}

/// Build a snapshot from current host state.
///
/// Read errors degrade the affected field and are logged at warn; the
/// function itself cannot fail.
pub fn build_snapshot(host: &dyn WorldHost, ready: bool, default_max_players: u32) -> StatusSnapshot {
    if !ready {
        return StatusSnapshot::initializing(default_max_players);
    }

    let players = host.online_players().unwrap_or_else(|e| {
        warn!(error = %e, "roster read failed, serving empty roster");
        Vec::new()
    });
    let player_count = u32::try_from(players.len()).unwrap_or(u32::MAX);
    let max_players = host.max_players().unwrap_or(default_max_players);
    let pretty_date = host.pretty_date().unwrap_or_else(|e| {
        warn!(error = %e, "calendar read failed, serving empty date");
        String::new()
    });
    let temporal_storm = host.storm_active().unwrap_or_else(|e| {
        warn!(error = %e, "storm read failed, serving inactive");
        false
    });

    StatusSnapshot {
        status: SnapshotStatus::Ok,
        online: true,
        player_count,
        max_players,
        players,
        pretty_date,
        temporal_storm,
    }
}
