//! Per-signal polling detectors with edge detection.
//!
//! Each detector owns the last-observed value of exactly one world
//! signal and is polled on its own cadence. A poll compares the current
//! reading against the stored one and enqueues exactly one
//! [`NotificationEvent`] per observed edge -- never on steady state,
//! never twice for the same transition. The first successful read is a
//! silent baseline.
//!
//! Read errors skip the poll cycle (logged at warn) without touching the
//! stored state, so a transient bad read can never mask or fabricate a
//! transition.

use stormwatch_types::{NotificationEvent, Season};
use tracing::{debug, warn};

use crate::buffer::NotificationBuffer;
use crate::host::WorldHost;

/// A polling state machine over one world signal.
///
/// Implementations hold their own last-observed state and enqueue
/// transition events into the buffer. `poll` must be cheap and
/// non-blocking; it runs inside a host tick callback.
pub trait SignalDetector: Send {
    /// Short name used in log events.
    fn name(&self) -> &'static str;

    /// Read the signal once and enqueue transition events, if any.
    fn poll(&mut self, host: &dyn WorldHost, buffer: &NotificationBuffer);
}

// ---------------------------------------------------------------------------
// Storm detector
// ---------------------------------------------------------------------------

/// Detects temporal storm onset and end, with a one-shot pre-warning.
///
/// The pre-warning fires at most once per storm cycle: when no storm is
/// active, the next onset is within `warning_lead_days`, and the latch
/// is unset. The latch resets on any active-state edge, so each new
/// cycle gets its own warning.
#[derive(Debug)]
pub struct StormDetector {
    last: Option<bool>,
    warning_issued: bool,
    warning_lead_days: f64,
}

impl StormDetector {
    /// Create a detector that pre-warns `warning_lead_days` before onset.
    pub const fn new(warning_lead_days: f64) -> Self {
        Self {
            last: None,
            warning_issued: false,
            warning_lead_days,
        }
    }
}

impl SignalDetector for StormDetector {
    fn name(&self) -> &'static str {
        "storm"
    }

    fn poll(&mut self, host: &dyn WorldHost, buffer: &NotificationBuffer) {
        let active = match host.storm_active() {
            Ok(active) => active,
            Err(e) => {
                warn!(detector = self.name(), error = %e, "storm read failed, skipping poll");
                return;
            }
        };

        let Some(last) = self.last else {
            self.last = Some(active);
            return;
        };

        if active != last {
            self.last = Some(active);
            self.warning_issued = false;
            let time = host.pretty_date().unwrap_or_default();
            debug!(active, "storm state edge");
            buffer.enqueue(NotificationEvent::storm(active, false, time));
            return;
        }

        if !active && !self.warning_issued {
            match host.days_until_next_storm() {
                Ok(Some(days)) if days <= self.warning_lead_days => {
                    self.warning_issued = true;
                    let time = host.pretty_date().unwrap_or_default();
                    debug!(days, "storm pre-warning issued");
                    buffer.enqueue(NotificationEvent::storm(false, true, time));
                }
                Ok(_) => {}
                Err(e) => {
                    warn!(detector = self.name(), error = %e, "storm forecast read failed");
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Season detector
// ---------------------------------------------------------------------------

/// Detects seasonal change from the host's calendar month text.
///
/// A [`Season::Unknown`] mapping is logged and ignored without
/// updating the stored season, so one garbled read cannot mask the real
/// subsequent transition.
#[derive(Debug, Default)]
pub struct SeasonDetector {
    last: Option<Season>,
}

impl SeasonDetector {
    /// Create a detector with no baseline yet.
    pub const fn new() -> Self {
        Self { last: None }
    }
}

impl SignalDetector for SeasonDetector {
    fn name(&self) -> &'static str {
        "season"
    }

    fn poll(&mut self, host: &dyn WorldHost, buffer: &NotificationBuffer) {
        let month = match host.calendar_month() {
            Ok(month) => month,
            Err(e) => {
                warn!(detector = self.name(), error = %e, "calendar read failed, skipping poll");
                return;
            }
        };

        let season = Season::from_month(&month);
        if season == Season::Unknown {
            warn!(month, "unmapped calendar month");
            return;
        }

        match self.last {
            None => self.last = Some(season),
            Some(last) if last != season => {
                self.last = Some(season);
                let time = host.pretty_date().unwrap_or_default();
                debug!(%season, "season changed");
                buffer.enqueue(NotificationEvent::season_change(season, time));
            }
            Some(_) => {}
        }
    }
}

// ---------------------------------------------------------------------------
// Player count detector
// ---------------------------------------------------------------------------

/// Detects changes in the online player count.
#[derive(Debug)]
pub struct PlayerCountDetector {
    last: Option<u32>,
    default_max_players: u32,
}

impl PlayerCountDetector {
    /// Create a detector; `default_max_players` backs the capacity field
    /// when the host reports none.
    pub const fn new(default_max_players: u32) -> Self {
        Self {
            last: None,
            default_max_players,
        }
    }
}

impl SignalDetector for PlayerCountDetector {
    fn name(&self) -> &'static str {
        "players"
    }

    fn poll(&mut self, host: &dyn WorldHost, buffer: &NotificationBuffer) {
        let players = match host.online_players() {
            Ok(players) => players,
            Err(e) => {
                warn!(detector = self.name(), error = %e, "roster read failed, skipping poll");
                return;
            }
        };
        let count = u32::try_from(players.len()).unwrap_or(u32::MAX);

        let Some(last) = self.last else {
            self.last = Some(count);
            return;
        };

        if count != last {
            self.last = Some(count);
            let max_players = host.max_players().unwrap_or(self.default_max_players);
            debug!(count, "player count changed");
            buffer.enqueue(NotificationEvent::server_status(true, count, max_players));
        }
    }
}
