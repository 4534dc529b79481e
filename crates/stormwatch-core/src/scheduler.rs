//! Tick registration abstraction.
//!
//! The bridge runs entirely off tick callbacks: detector polls, the
//! dispatch drain, and the listener health check all fire on fixed
//! cadences. [`TickScheduler`] models the host's tick-registration
//! facility so the lifecycle manager can register and unregister
//! callbacks without knowing who drives them.
//!
//! Two implementations are provided: [`IntervalScheduler`] drives each
//! registration from its own tokio interval task (for hosts without a
//! native tick facility, and for the bridge's own integration tests),
//! and [`ManualScheduler`] fires callbacks only when told to, which
//! makes cadence-dependent behavior deterministic in tests.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::debug;

/// Opaque identifier for one tick registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TickHandle(u64);

/// A registered tick callback.
///
/// Callbacks must be short and non-blocking; they run on the driver's
/// execution context and share it with every other registration.
pub type TickFn = Box<dyn FnMut() + Send>;

/// A facility that invokes callbacks on fixed cadences.
pub trait TickScheduler: Send + Sync {
    /// Register `callback` to fire every `interval`.
    fn register(&self, interval: Duration, callback: TickFn) -> TickHandle;

    /// Remove a registration. Unknown handles are ignored, so
    /// unregistering twice is harmless.
    fn unregister(&self, handle: TickHandle);
}

// ---------------------------------------------------------------------------
// Tokio interval scheduler
// ---------------------------------------------------------------------------

/// Drives each registration from its own background tokio task.
///
/// Must be used from within a tokio runtime. The first invocation fires
/// one full interval after registration, not immediately. Unregistering
/// aborts the task; a callback that is mid-run finishes first because
/// the abort point is the interval await.
#[derive(Debug, Default)]
pub struct IntervalScheduler {
    next_id: AtomicU64,
    tasks: Mutex<BTreeMap<u64, JoinHandle<()>>>,
}

impl IntervalScheduler {
    /// Create a scheduler with no registrations.
    pub const fn new() -> Self {
        Self {
            next_id: AtomicU64::new(0),
            tasks: Mutex::new(BTreeMap::new()),
        }
    }
}

impl TickScheduler for IntervalScheduler {
    fn register(&self, interval: Duration, mut callback: TickFn) -> TickHandle {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let task = tokio::spawn(async move {
            let start = tokio::time::Instant::now().checked_add(interval);
            let mut ticker = match start {
                Some(start) => tokio::time::interval_at(start, interval),
                None => tokio::time::interval(interval),
            };
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                callback();
            }
        });
        if let Ok(mut tasks) = self.tasks.lock() {
            tasks.insert(id, task);
        } else {
            // Lock poisoned: the registration still runs, it just cannot
            // be unregistered individually anymore.
            task.abort();
        }
        let interval_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX);
        debug!(id, interval_ms, "tick registered");
        TickHandle(id)
    }

    fn unregister(&self, handle: TickHandle) {
        let task = self
            .tasks
            .lock()
            .ok()
            .and_then(|mut tasks| tasks.remove(&handle.0));
        if let Some(task) = task {
            task.abort();
            debug!(id = handle.0, "tick unregistered");
        }
    }
}

impl Drop for IntervalScheduler {
    fn drop(&mut self) {
        if let Ok(mut tasks) = self.tasks.lock() {
            for (_, task) in std::mem::take(&mut *tasks) {
                task.abort();
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Manual scheduler (tests)
// ---------------------------------------------------------------------------

/// A scheduler that fires registrations only on explicit request.
///
/// Registration order is preserved: [`fire_all`](Self::fire_all) invokes
/// callbacks in the order they were registered, which matches the
/// lifecycle manager's registration sequence (detector polls before the
/// dispatch drain). Callbacks must not call back into the scheduler.
#[derive(Default)]
pub struct ManualScheduler {
    next_id: AtomicU64,
    callbacks: Mutex<BTreeMap<u64, TickFn>>,
}

impl ManualScheduler {
    /// Create a scheduler with no registrations.
    pub const fn new() -> Self {
        Self {
            next_id: AtomicU64::new(0),
            callbacks: Mutex::new(BTreeMap::new()),
        }
    }

    /// Fire a single registration. Returns `false` for unknown handles.
    pub fn fire(&self, handle: TickHandle) -> bool {
        let Ok(mut callbacks) = self.callbacks.lock() else {
            return false;
        };
        match callbacks.get_mut(&handle.0) {
            Some(callback) => {
                callback();
                true
            }
            None => false,
        }
    }

    /// Fire every registration once, in registration order.
    pub fn fire_all(&self) {
        if let Ok(mut callbacks) = self.callbacks.lock() {
            for callback in callbacks.values_mut() {
                callback();
            }
        }
    }

    /// Number of live registrations.
    pub fn registered(&self) -> usize {
        self.callbacks.lock().map(|c| c.len()).unwrap_or(0)
    }
}

impl std::fmt::Debug for ManualScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManualScheduler")
            .field("registered", &self.registered())
            .finish()
    }
}

impl TickScheduler for ManualScheduler {
    fn register(&self, _interval: Duration, callback: TickFn) -> TickHandle {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut callbacks) = self.callbacks.lock() {
            callbacks.insert(id, callback);
        }
        TickHandle(id)
    }

    fn unregister(&self, handle: TickHandle) {
        if let Ok(mut callbacks) = self.callbacks.lock() {
            callbacks.remove(&handle.0);
        }
    }
}
