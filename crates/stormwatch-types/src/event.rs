//! Outbound notification events.
//!
//! A [`NotificationEvent`] is created by a detector (or the lifecycle
//! manager) the moment a state transition is observed, held by the
//! notification buffer until the next dispatch drain, and then sent to
//! the external sink as part of a single batch. Events are immutable
//! after creation and carry their own creation timestamp so batching
//! never distorts the observed transition time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::season::Season;

/// Category of a notification, matching the sink's wire vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// Temporal storm onset, end, or pre-warning.
    Storm,
    /// Seasonal change.
    Season,
    /// Server status change (startup, player count change).
    ServerStatus,
    /// Periodic liveness signal (optional, disabled by default).
    Heartbeat,
}

impl NotificationKind {
    /// Wire name used in the sink's `type` field.
    pub const fn wire_name(self) -> &'static str {
        match self {
            Self::Storm => "storm_notification",
            Self::Season => "season_notification",
            Self::ServerStatus => "server_status",
            Self::Heartbeat => "heartbeat",
        }
    }
}

/// Structured payload of a notification, serialized into the sink's
/// `data` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NotificationPayload {
    /// Storm transition or pre-warning.
    Storm {
        /// Whether a storm is active after the transition.
        is_active: bool,
        /// Whether this is a pre-warning rather than a transition.
        is_warning: bool,
        /// In-game time at the moment of observation.
        time: String,
    },
    /// The season changed.
    Season {
        /// The season that just began.
        season: Season,
        /// In-game time at the moment of observation.
        time: String,
    },
    /// Server status changed.
    ServerStatus {
        /// Whether the server is online.
        online: bool,
        /// Current number of online players.
        player_count: u32,
        /// Configured player capacity.
        max_players: u32,
    },
    /// Periodic liveness signal.
    Heartbeat {
        /// Current number of online players.
        player_count: u32,
        /// In-game time at the moment of observation.
        time: String,
    },
}

/// A single outbound notification.
///
/// Immutable once constructed. Owned by the notification buffer until
/// drained, then by the dispatcher for the duration of one send attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationEvent {
    /// Unique event identifier (time-ordered).
    pub id: Uuid,
    /// Category of the notification.
    pub kind: NotificationKind,
    /// Structured payload.
    pub payload: NotificationPayload,
    /// Wall-clock time the event was created.
    pub created_at: DateTime<Utc>,
}

impl NotificationEvent {
    fn new(kind: NotificationKind, payload: NotificationPayload) -> Self {
        Self {
            id: Uuid::now_v7(),
            kind,
            payload,
            created_at: Utc::now(),
        }
    }

    /// A storm transition (`is_warning == false`) or pre-warning
    /// (`is_warning == true`, `is_active == false`).
    pub fn storm(is_active: bool, is_warning: bool, time: String) -> Self {
        Self::new(
            NotificationKind::Storm,
            NotificationPayload::Storm {
                is_active,
                is_warning,
                time,
            },
        )
    }

    /// A season change to `season`.
    pub fn season_change(season: Season, time: String) -> Self {
        Self::new(
            NotificationKind::Season,
            NotificationPayload::Season { season, time },
        )
    }

    /// A server status change.
    pub fn server_status(online: bool, player_count: u32, max_players: u32) -> Self {
        Self::new(
            NotificationKind::ServerStatus,
            NotificationPayload::ServerStatus {
                online,
                player_count,
                max_players,
            },
        )
    }

    /// A periodic liveness signal.
    pub fn heartbeat(player_count: u32, time: String) -> Self {
        Self::new(
            NotificationKind::Heartbeat,
            NotificationPayload::Heartbeat { player_count, time },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_names_match_sink_vocabulary() {
        assert_eq!(NotificationKind::Storm.wire_name(), "storm_notification");
        assert_eq!(NotificationKind::Season.wire_name(), "season_notification");
        assert_eq!(NotificationKind::ServerStatus.wire_name(), "server_status");
        assert_eq!(NotificationKind::Heartbeat.wire_name(), "heartbeat");
    }

    #[test]
    fn storm_payload_serializes_flat() {
        let event = NotificationEvent::storm(true, false, String::from("June 5, year 2"));
        let json = serde_json::to_value(&event.payload).unwrap_or_default();
        assert_eq!(json["is_active"], true);
        assert_eq!(json["is_warning"], false);
        assert_eq!(json["time"], "June 5, year 2");
    }

    #[test]
    fn event_ids_are_unique_and_time_ordered() {
        let a = NotificationEvent::heartbeat(0, String::new());
        let b = NotificationEvent::heartbeat(0, String::new());
        assert_ne!(a.id, b.id);
        assert!(a.id <= b.id);
    }

    #[test]
    fn season_payload_uses_lowercase_season() {
        let event = NotificationEvent::season_change(Season::Winter, String::new());
        let json = serde_json::to_value(&event.payload).unwrap_or_default();
        assert_eq!(json["season"], "winter");
    }
}
