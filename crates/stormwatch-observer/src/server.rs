//! Status server bind and serve primitives.
//!
//! Binding is split from serving so the supervisor can detect an
//! unavailable address before committing a background task to it.
//! [`probe`] performs an exploratory bind-and-release first -- detecting
//! "address in use" only at real bind time would race the supervisor's
//! failure path with the serve task's startup.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::watch;

use crate::router::build_router;
use crate::state::AppState;

/// Configuration for the status server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// The host address to bind to.
    pub host: String,
    /// The TCP port to listen on (0 picks an ephemeral port).
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: String::from("127.0.0.1"),
            port: 8080,
        }
    }
}

impl ServerConfig {
    /// Resolve the configured address.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Bind`] if host and port do not form a
    /// valid socket address.
    pub fn resolve(&self) -> Result<SocketAddr, ServerError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| ServerError::Bind(format!("invalid address: {e}")))
    }
}

/// Errors that can occur when starting or running the status server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Failed to bind to the network address.
    #[error("bind error: {0}")]
    Bind(String),

    /// The server encountered a fatal error while serving.
    #[error("serve error: {0}")]
    Serve(String),

    /// The supervisor has been stopped and will not start listeners.
    #[error("listener supervisor is stopped")]
    Stopped,
}

/// Check that `addr` can be bound, releasing it immediately.
///
/// Uses the same listener type as the real bind so both observe the
/// same socket options; an address held only by TIME_WAIT remnants of a
/// previous listener probes as available.
///
/// # Errors
///
/// Returns [`ServerError::Bind`] if the address is unavailable.
pub async fn probe(addr: SocketAddr) -> Result<(), ServerError> {
    TcpListener::bind(addr)
        .await
        .map(drop)
        .map_err(|e| ServerError::Bind(format!("address {addr} unavailable: {e}")))
}

/// Probe and bind `addr`, returning the listener and its actual address.
///
/// The actual address differs from `addr` only when port 0 was
/// requested.
///
/// # Errors
///
/// Returns [`ServerError::Bind`] if the probe or the real bind fails.
pub async fn bind_listener(addr: SocketAddr) -> Result<(TcpListener, SocketAddr), ServerError> {
    probe(addr).await?;
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| ServerError::Bind(format!("bind failed on {addr}: {e}")))?;
    let local = listener
        .local_addr()
        .map_err(|e| ServerError::Bind(format!("local_addr failed: {e}")))?;
    Ok((listener, local))
}

/// Serve the status API on `listener` until `shutdown` flips to `true`.
///
/// Connection intake re-arms per accepted connection inside Axum, so a
/// slow client never stalls the next accept. Shutdown is graceful:
/// in-flight responses complete, then the listener closes.
///
/// # Errors
///
/// Returns [`ServerError::Serve`] on a fatal I/O error in the accept
/// loop.
pub async fn serve(
    listener: TcpListener,
    state: Arc<AppState>,
    mut shutdown: watch::Receiver<bool>,
) -> Result<(), ServerError> {
    let router = build_router(state);
    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            // Closed-channel means the supervisor is gone; stop either way.
            let _ = shutdown.wait_for(|stop| *stop).await;
        })
        .await
        .map_err(|e| ServerError::Serve(format!("serve error: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_resolves() {
        let addr = ServerConfig::default().resolve().ok();
        assert_eq!(addr.map(|a| a.port()), Some(8080));
    }

    #[test]
    fn invalid_host_is_bind_error() {
        let config = ServerConfig {
            host: String::from("not a host"),
            port: 8080,
        };
        assert!(matches!(config.resolve(), Err(ServerError::Bind(_))));
    }

    #[tokio::test]
    async fn probe_detects_address_in_use() {
        let target = SocketAddr::from(([127, 0, 0, 1], 0));
        let bound = bind_listener(target).await.ok();
        assert!(bound.is_some());
        let Some((listener, addr)) = bound else {
            return;
        };

        // The port is held by `listener`, so a probe must fail.
        assert!(matches!(probe(addr).await, Err(ServerError::Bind(_))));
        drop(listener);
        assert!(probe(addr).await.is_ok());
    }
}
