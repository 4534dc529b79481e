//! Status endpoint server for the Stormwatch bridge.
//!
//! This crate provides the inbound half of the bridge: an Axum HTTP
//! server answering `GET /status/` with a fresh [`StatusSnapshot`] of
//! world state, built read-only from the host collaborator on every
//! request.
//!
//! # Architecture
//!
//! The snapshot builder never fails the request -- host read errors
//! degrade the snapshot instead, because a status endpoint must always
//! answer. The server itself runs on a background tokio task owned by
//! the [`ListenerSupervisor`], a single-slot state machine that the
//! health-check cadence uses to restart a listener that silently died,
//! without ever holding two bound sockets at once.
//!
//! [`StatusSnapshot`]: snapshot::StatusSnapshot
//! [`ListenerSupervisor`]: supervisor::ListenerSupervisor

pub mod handler;
pub mod router;
pub mod server;
pub mod snapshot;
pub mod state;
pub mod supervisor;

// Re-export primary types for convenience.
pub use router::build_router;
pub use server::{ServerConfig, ServerError};
pub use snapshot::{build_snapshot, SnapshotStatus, StatusSnapshot};
pub use state::AppState;
pub use supervisor::ListenerSupervisor;
