//! Lifecycle manager and configuration for the Stormwatch status
//! bridge.
//!
//! This crate is the assembly point. [`BridgeConfig`] mirrors the
//! `stormwatch.yaml` file (every field defaulted); [`Bridge`] takes a
//! config, a [`WorldHost`] handle, and a [`TickScheduler`], and runs
//! the whole bridge: status listener with watchdog, the three signal
//! detectors, the notification buffer, and the batch dispatcher.
//!
//! The embedding host owns process startup and shutdown. It is expected
//! to call [`Bridge::start`] once the world is loaded and
//! [`Bridge::stop`] from its shutdown hook; both tolerate duplicate
//! calls. The host also owns the tracing subscriber; this crate only
//! emits events.
//!
//! [`WorldHost`]: stormwatch_core::host::WorldHost
//! [`TickScheduler`]: stormwatch_core::scheduler::TickScheduler

pub mod bridge;
pub mod config;

// Re-export primary types for convenience.
pub use bridge::{Bridge, BridgeError};
pub use config::{BridgeConfig, ConfigError};
