//! Listener supervision and self-restart.
//!
//! The status listener runs on a background tokio task that can die
//! without anyone noticing -- a fatal accept error, a task panic, an
//! external close. [`ListenerSupervisor`] owns the single listener slot
//! and exposes three operations: [`start`], [`health_check`] (run on the
//! host's health cadence), and [`stop`].
//!
//! All slot mutation happens under one async mutex, so a health-check
//! restart can never race an explicit shutdown into a double-close or a
//! second concurrently bound listener. Once [`stop`] has run, the
//! supervisor refuses further starts -- a late health-check tick cannot
//! resurrect the listener.
//!
//! [`start`]: ListenerSupervisor::start
//! [`health_check`]: ListenerSupervisor::health_check
//! [`stop`]: ListenerSupervisor::stop

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::server::{self, ServerConfig, ServerError};
use crate::state::AppState;

/// How long a closing listener gets to finish in-flight responses
/// before the serve task is aborted.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// A live listener: its bound address, shutdown signal, and serve task.
#[derive(Debug)]
struct RunningListener {
    addr: SocketAddr,
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

/// Contents of the supervisor's single mutex region.
#[derive(Debug, Default)]
struct Slot {
    running: Option<RunningListener>,
    /// Remembered after the first successful bind so restarts reuse the
    /// same address even when port 0 was configured.
    bound_addr: Option<SocketAddr>,
    /// Set by [`ListenerSupervisor::stop`]; permanent.
    stopped: bool,
}

/// Owns the status listener's lifecycle.
pub struct ListenerSupervisor {
    config: ServerConfig,
    state: Arc<AppState>,
    slot: Mutex<Slot>,
}

impl ListenerSupervisor {
    /// Create a supervisor in the `Stopped` state (nothing bound yet).
    pub fn new(config: ServerConfig, state: Arc<AppState>) -> Self {
        Self {
            config,
            state,
            slot: Mutex::new(Slot::default()),
        }
    }

    /// Start the listener, or return the address of the one already
    /// running.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Bind`] if the address is unavailable, or
    /// [`ServerError::Stopped`] after [`stop`](Self::stop) has run.
    pub async fn start(&self) -> Result<SocketAddr, ServerError> {
        let mut slot = self.slot.lock().await;
        if slot.stopped {
            return Err(ServerError::Stopped);
        }
        if let Some(running) = slot.running.as_ref()
            && !running.task.is_finished()
        {
            return Ok(running.addr);
        }
        // A finished task is a dead listener; close out its handle
        // before binding anew.
        if let Some(stale) = slot.running.take() {
            shut_down(stale).await;
        }

        let target = match slot.bound_addr {
            Some(addr) => addr,
            None => self.config.resolve()?,
        };
        let (listener, addr) = server::bind_listener(target).await?;

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let state = Arc::clone(&self.state);
        let task = tokio::spawn(async move {
            if let Err(e) = server::serve(listener, state, shutdown_rx).await {
                error!(error = %e, "status server exited with error");
            }
        });

        slot.bound_addr = Some(addr);
        slot.running = Some(RunningListener {
            addr,
            shutdown: shutdown_tx,
            task,
        });
        info!(%addr, "status server listening");
        Ok(addr)
    }

    /// Verify the listener is alive and restart it if not.
    ///
    /// Run on the health-check cadence. Returns `true` when the
    /// listener is up afterwards. A failed restart is logged and left
    /// for the next cycle; it never panics or propagates.
    pub async fn health_check(&self) -> bool {
        {
            let slot = self.slot.lock().await;
            if slot.stopped {
                return false;
            }
            if let Some(running) = slot.running.as_ref()
                && !running.task.is_finished()
            {
                return true;
            }
        }

        warn!("status listener is down, attempting restart");
        match self.start().await {
            Ok(addr) => {
                info!(%addr, "status listener restored");
                true
            }
            Err(e) => {
                error!(error = %e, "status listener restart failed, retrying next health check");
                false
            }
        }
    }

    /// Stop and close the listener. Idempotent and permanent.
    pub async fn stop(&self) {
        let mut slot = self.slot.lock().await;
        slot.stopped = true;
        if let Some(running) = slot.running.take() {
            shut_down(running).await;
            info!("status server stopped");
        }
    }

    /// Address of the currently bound listener, if any.
    pub async fn bound_addr(&self) -> Option<SocketAddr> {
        let slot = self.slot.lock().await;
        slot.running.as_ref().map(|running| running.addr)
    }
}

impl std::fmt::Debug for ListenerSupervisor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerSupervisor")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Signal graceful shutdown and reap the serve task, aborting it if the
/// grace period elapses.
async fn shut_down(mut running: RunningListener) {
    let _ = running.shutdown.send(true);
    if tokio::time::timeout(SHUTDOWN_GRACE, &mut running.task)
        .await
        .is_err()
    {
        warn!("status server did not stop within grace period, aborting");
        running.task.abort();
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::sync::atomic::Ordering;

    use stormwatch_core::host::FixedWorldHost;

    use super::*;

    fn make_supervisor() -> ListenerSupervisor {
        let host = Arc::new(FixedWorldHost::new());
        let state = Arc::new(AppState::new(host, 32));
        state.ready.store(true, Ordering::Release);
        let config = ServerConfig {
            host: String::from("127.0.0.1"),
            port: 0,
        };
        ListenerSupervisor::new(config, state)
    }

    async fn fetch_status(addr: SocketAddr) -> Option<u16> {
        reqwest::get(format!("http://{addr}/status/"))
            .await
            .ok()
            .map(|r| r.status().as_u16())
    }

    #[tokio::test]
    async fn start_is_idempotent_while_listening() {
        let supervisor = make_supervisor();
        let first = supervisor.start().await.unwrap();
        let second = supervisor.start().await.unwrap();
        assert_eq!(first, second);
        assert_eq!(supervisor.bound_addr().await, Some(first));
        supervisor.stop().await;
    }

    #[tokio::test]
    async fn health_check_restores_killed_listener_on_same_address() {
        let supervisor = make_supervisor();
        let addr = supervisor.start().await.unwrap();
        assert_eq!(fetch_status(addr).await, Some(200));

        // Kill the serve task out from under the supervisor.
        {
            let slot = supervisor.slot.lock().await;
            if let Some(running) = slot.running.as_ref() {
                running.task.abort();
            }
        }
        // Wait for the abort to land.
        for _ in 0..50u32 {
            let slot = supervisor.slot.lock().await;
            if slot
                .running
                .as_ref()
                .is_some_and(|running| running.task.is_finished())
            {
                break;
            }
            drop(slot);
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        assert!(supervisor.health_check().await);
        assert_eq!(supervisor.bound_addr().await, Some(addr));
        assert_eq!(fetch_status(addr).await, Some(200));
        supervisor.stop().await;
    }

    #[tokio::test]
    async fn health_check_on_healthy_listener_is_a_no_op() {
        let supervisor = make_supervisor();
        let addr = supervisor.start().await.unwrap();
        assert!(supervisor.health_check().await);
        assert_eq!(supervisor.bound_addr().await, Some(addr));
        supervisor.stop().await;
    }

    #[tokio::test]
    async fn stop_is_idempotent_and_permanent() {
        let supervisor = make_supervisor();
        let addr = supervisor.start().await.unwrap();
        supervisor.stop().await;
        supervisor.stop().await;
        assert_eq!(supervisor.bound_addr().await, None);
        assert!(matches!(
            supervisor.start().await,
            Err(ServerError::Stopped)
        ));
        assert!(!supervisor.health_check().await);
        // The socket is actually released.
        assert!(server::probe(addr).await.is_ok());
    }

    #[tokio::test]
    async fn start_fails_when_address_in_use() {
        let holder = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = holder.local_addr().unwrap();
        let host = Arc::new(FixedWorldHost::new());
        let state = Arc::new(AppState::new(host, 32));
        let config = ServerConfig {
            host: String::from("127.0.0.1"),
            port: addr.port(),
        };
        let supervisor = ListenerSupervisor::new(config, state);
        assert!(matches!(
            supervisor.start().await,
            Err(ServerError::Bind(_))
        ));
    }
}
