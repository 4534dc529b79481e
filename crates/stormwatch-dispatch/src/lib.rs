//! Batch delivery of notifications to the external sink.
//!
//! The sink is a webhook-style HTTP consumer: the bridge POSTs a single
//! JSON batch per dispatch cadence and expects nothing back beyond a
//! success status. Delivery is fire-and-forget -- the network call runs
//! on a background tokio task so [`BatchDispatcher::dispatch`] returns
//! before the sink is even contacted, and a failed batch is logged and
//! permanently dropped. There is no retry queue; this is a documented
//! at-most-once contract.
//!
//! The one exception is the shutdown flush, which uses
//! [`BatchDispatcher::dispatch_wait`] to wait (bounded) for the final
//! batch while the host is already tearing down.

pub mod dispatcher;
pub mod payload;

// Re-export primary types for convenience.
pub use dispatcher::{BatchDispatcher, DispatchError};
pub use payload::{BatchPayload, WireNotification};
