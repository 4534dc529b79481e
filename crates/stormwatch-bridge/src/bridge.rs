//! The lifecycle manager.
//!
//! [`Bridge`] owns every moving part of the status bridge: the status
//! listener (through its supervisor), the three detectors, the
//! notification buffer, and the batch dispatcher. [`start`] wires them
//! onto the host's tick cadences; [`stop`] tears them down in the
//! reverse order and flushes the final batch. Both are guarded by
//! atomic swaps, so a duplicate or late host callback is a no-op rather
//! than a double-start or double-close.
//!
//! [`start`]: Bridge::start
//! [`stop`]: Bridge::stop

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use stormwatch_core::buffer::NotificationBuffer;
use stormwatch_core::detect::{
    PlayerCountDetector, SeasonDetector, SignalDetector, StormDetector,
};
use stormwatch_core::host::WorldHost;
use stormwatch_core::scheduler::{TickHandle, TickScheduler};
use stormwatch_dispatch::{BatchDispatcher, DispatchError};
use stormwatch_observer::server::{ServerConfig, ServerError};
use stormwatch_observer::state::AppState;
use stormwatch_observer::supervisor::ListenerSupervisor;
use stormwatch_types::NotificationEvent;
use tracing::{info, warn};

use crate::config::BridgeConfig;

/// Errors from the bridge lifecycle.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// [`Bridge::start`] was called while the bridge was running.
    #[error("bridge is already started")]
    AlreadyStarted,

    /// The status server could not be started.
    #[error(transparent)]
    Server(#[from] ServerError),

    /// The dispatcher could not be constructed.
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

/// Wires detectors, buffer, dispatcher, and the status listener onto a
/// host's tick cadences.
pub struct Bridge {
    config: BridgeConfig,
    host: Arc<dyn WorldHost>,
    scheduler: Arc<dyn TickScheduler>,
    buffer: Arc<NotificationBuffer>,
    dispatcher: BatchDispatcher,
    supervisor: Arc<ListenerSupervisor>,
    state: Arc<AppState>,
    started: AtomicBool,
    stopped: AtomicBool,
    handles: Mutex<Vec<TickHandle>>,
}

impl Bridge {
    /// Assemble a bridge around a host handle and a tick facility.
    ///
    /// Nothing is bound or registered until [`start`](Self::start).
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Dispatch`] if the sink HTTP client cannot
    /// be constructed.
    pub fn new(
        config: BridgeConfig,
        host: Arc<dyn WorldHost>,
        scheduler: Arc<dyn TickScheduler>,
    ) -> Result<Self, BridgeError> {
        let dispatcher =
            BatchDispatcher::new(&config.sink.url, config.sink.request_timeout())?;
        let state = Arc::new(AppState::new(
            Arc::clone(&host),
            config.players.default_max_players,
        ));
        let server_config = ServerConfig {
            host: config.server.host.clone(),
            port: config.server.port,
        };
        let supervisor = Arc::new(ListenerSupervisor::new(server_config, Arc::clone(&state)));
        Ok(Self {
            config,
            host,
            scheduler,
            buffer: Arc::new(NotificationBuffer::new()),
            dispatcher,
            supervisor,
            state,
            started: AtomicBool::new(false),
            stopped: AtomicBool::new(false),
            handles: Mutex::new(Vec::new()),
        })
    }

    /// Start the bridge: baseline the detectors, bind the status
    /// listener, register the tick callbacks, and flip the ready flag.
    ///
    /// Returns the listener's bound address. A second call while
    /// running fails without side effects; a failed start resets the
    /// guard so the caller may retry.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::AlreadyStarted`] on a duplicate call, or
    /// [`BridgeError::Server`] if the listener cannot be bound.
    pub async fn start(&self) -> Result<SocketAddr, BridgeError> {
        if self.started.swap(true, Ordering::SeqCst) {
            return Err(BridgeError::AlreadyStarted);
        }

        let mut storm = StormDetector::new(self.config.storm.warning_lead_days);
        let mut season = SeasonDetector::new();
        let mut players = PlayerCountDetector::new(self.config.players.default_max_players);

        // Baseline each detector before any tick can fire, so pre-start
        // world state never reads as a transition.
        storm.poll(self.host.as_ref(), self.buffer.as_ref());
        season.poll(self.host.as_ref(), self.buffer.as_ref());
        players.poll(self.host.as_ref(), self.buffer.as_ref());

        let addr = match self.supervisor.start().await {
            Ok(addr) => addr,
            Err(e) => {
                self.started.store(false, Ordering::SeqCst);
                return Err(e.into());
            }
        };

        let cadence = &self.config.cadence;
        let mut handles = vec![
            self.register_detector(storm, Duration::from_millis(cadence.storm_poll_ms)),
            self.register_detector(season, Duration::from_millis(cadence.season_poll_ms)),
            self.register_detector(players, Duration::from_millis(cadence.players_poll_ms)),
            self.register_dispatch(Duration::from_millis(cadence.dispatch_ms)),
            self.register_health_check(Duration::from_millis(cadence.health_check_ms)),
        ];
        if cadence.heartbeat_ms > 0 {
            handles.push(self.register_heartbeat(Duration::from_millis(cadence.heartbeat_ms)));
        }
        if let Ok(mut stored) = self.handles.lock() {
            *stored = handles;
        }

        self.state.mark_ready();

        // Announce startup to the sink in the first batch.
        let count = self
            .host
            .online_players()
            .map_or(0, |p| u32::try_from(p.len()).unwrap_or(u32::MAX));
        let max_players = self
            .host
            .max_players()
            .unwrap_or(self.config.players.default_max_players);
        self.buffer
            .enqueue(NotificationEvent::server_status(true, count, max_players));

        info!(%addr, "bridge started");
        Ok(addr)
    }

    /// Stop the bridge: unregister every tick, flush the remaining
    /// backlog with a bounded wait, and close the listener.
    ///
    /// Idempotent and permanent. Safe to call from both an explicit
    /// shutdown hook and a duplicate or late host callback.
    pub async fn stop(&self) {
        if self.stopped.swap(true, Ordering::SeqCst) {
            return;
        }

        let handles = self
            .handles
            .lock()
            .map(|mut stored| std::mem::take(&mut *stored))
            .unwrap_or_default();
        for handle in handles {
            self.scheduler.unregister(handle);
        }

        let backlog = self.buffer.drain_all();
        if !backlog.is_empty() {
            let count = backlog.len();
            match self
                .dispatcher
                .dispatch_wait(backlog, self.config.sink.flush_timeout())
                .await
            {
                Ok(()) => info!(count, "final notification batch flushed"),
                Err(e) => warn!(error = %e, count, "final notification batch lost"),
            }
        }

        self.supervisor.stop().await;
        info!("bridge stopped");
    }

    /// Enqueue an event from outside the detectors.
    ///
    /// For host-originated signals the pollers cannot see, such as an
    /// explicit join/leave hook. The event rides the next dispatch
    /// batch like any other.
    pub fn notify(&self, event: NotificationEvent) {
        self.buffer.enqueue(event);
    }

    /// Address of the currently bound status listener, if any.
    pub async fn bound_addr(&self) -> Option<SocketAddr> {
        self.supervisor.bound_addr().await
    }

    fn register_detector<D>(&self, mut detector: D, interval: Duration) -> TickHandle
    where
        D: SignalDetector + 'static,
    {
        let host = Arc::clone(&self.host);
        let buffer = Arc::clone(&self.buffer);
        self.scheduler.register(
            interval,
            Box::new(move || detector.poll(host.as_ref(), buffer.as_ref())),
        )
    }

    fn register_dispatch(&self, interval: Duration) -> TickHandle {
        let buffer = Arc::clone(&self.buffer);
        let dispatcher = self.dispatcher.clone();
        self.scheduler.register(
            interval,
            Box::new(move || dispatcher.dispatch(buffer.drain_all())),
        )
    }

    fn register_health_check(&self, interval: Duration) -> TickHandle {
        let supervisor = Arc::clone(&self.supervisor);
        self.scheduler.register(
            interval,
            // The check needs the slot's async mutex, so it runs on its
            // own task rather than inside the tick callback.
            Box::new(move || {
                let supervisor = Arc::clone(&supervisor);
                drop(tokio::spawn(async move {
                    supervisor.health_check().await;
                }));
            }),
        )
    }

    fn register_heartbeat(&self, interval: Duration) -> TickHandle {
        let host = Arc::clone(&self.host);
        let buffer = Arc::clone(&self.buffer);
        self.scheduler.register(
            interval,
            Box::new(move || {
                let Ok(players) = host.online_players() else {
                    return;
                };
                let count = u32::try_from(players.len()).unwrap_or(u32::MAX);
                let time = host.pretty_date().unwrap_or_default();
                buffer.enqueue(NotificationEvent::heartbeat(count, time));
            }),
        )
    }
}

impl std::fmt::Debug for Bridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bridge")
            .field("config", &self.config)
            .field("started", &self.started.load(Ordering::SeqCst))
            .field("stopped", &self.stopped.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}
