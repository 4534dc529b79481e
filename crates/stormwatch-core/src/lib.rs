//! Core machinery for the Stormwatch status bridge.
//!
//! This crate holds everything that runs on the host's tick cadences:
//!
//! - [`host`] -- the read-only [`WorldHost`] collaborator trait through
//!   which the bridge observes the simulation, plus a configurable stub
//!   for tests
//! - [`detect`] -- per-signal polling detectors with edge detection and
//!   the storm pre-warning latch
//! - [`buffer`] -- the thread-safe append-only notification buffer with
//!   atomic drain
//! - [`scheduler`] -- the tick-registration abstraction, with a tokio
//!   interval implementation and a manual one for tests
//!
//! Nothing in this crate performs network I/O; the HTTP surfaces live in
//! `stormwatch-observer` and `stormwatch-dispatch`.
//!
//! [`WorldHost`]: host::WorldHost

pub mod buffer;
pub mod detect;
pub mod host;
pub mod scheduler;

// Re-export primary types for convenience.
pub use buffer::NotificationBuffer;
pub use detect::{PlayerCountDetector, SeasonDetector, SignalDetector, StormDetector};
pub use host::{FixedWorldHost, HostError, WorldHost};
pub use scheduler::{IntervalScheduler, ManualScheduler, TickHandle, TickScheduler};
