//! Shared type definitions for the Stormwatch status bridge.
//!
//! This crate is the single source of truth for the types that cross
//! crate boundaries in the Stormwatch workspace:
//!
//! - [`Season`] -- the four in-game seasons plus `Unknown`, with a total
//!   mapping from calendar month text
//! - [`NotificationEvent`] -- an immutable outbound notification with its
//!   [`NotificationKind`] and structured [`NotificationPayload`]
//!
//! The heavier surfaces (host trait, detectors, HTTP server, dispatcher)
//! live in the downstream crates and depend on these types.

pub mod event;
pub mod season;

// Re-export primary types at the crate root for convenience.
pub use event::{NotificationEvent, NotificationKind, NotificationPayload};
pub use season::Season;

/// Fallback player capacity reported when the host cannot provide a
/// configured maximum.
pub const DEFAULT_MAX_PLAYERS: u32 = 32;
