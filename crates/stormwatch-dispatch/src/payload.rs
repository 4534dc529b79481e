//! Outbound wire format.
//!
//! The sink consumes one envelope per dispatch:
//!
//! ```json
//! {
//!   "type": "notification_batch",
//!   "timestamp": "2026-08-25T18:00:00+00:00",
//!   "notifications": [
//!     {"type": "storm_notification", "data": {...}, "timestamp": "..."}
//!   ]
//! }
//! ```
//!
//! Each inner notification carries its own creation timestamp so
//! batching never distorts when a transition was observed.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use stormwatch_types::{NotificationEvent, NotificationPayload};

/// Wire name of the batch envelope.
const BATCH_TYPE: &str = "notification_batch";

/// One notification as the sink sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireNotification {
    /// Notification kind wire name.
    #[serde(rename = "type")]
    pub kind: String,
    /// Structured payload.
    pub data: NotificationPayload,
    /// RFC 3339 creation time of the event.
    pub timestamp: String,
}

impl From<&NotificationEvent> for WireNotification {
    fn from(event: &NotificationEvent) -> Self {
        Self {
            kind: event.kind.wire_name().to_owned(),
            data: event.payload.clone(),
            timestamp: event.created_at.to_rfc3339(),
        }
    }
}

/// The batch envelope POSTed to the sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchPayload {
    /// Always [`BATCH_TYPE`].
    #[serde(rename = "type")]
    pub kind: String,
    /// RFC 3339 time the batch was assembled.
    pub timestamp: String,
    /// The batched notifications, in drain order.
    pub notifications: Vec<WireNotification>,
}

impl BatchPayload {
    /// Wrap drained events into one envelope.
    pub fn new(events: &[NotificationEvent]) -> Self {
        Self {
            kind: BATCH_TYPE.to_owned(),
            timestamp: Utc::now().to_rfc3339(),
            notifications: events.iter().map(WireNotification::from).collect(),
        }
    }
}
