//! The batch dispatcher.
//!
//! Wraps a shared [`reqwest::Client`] around the sink URL. `dispatch`
//! hands the POST to a background tokio task and returns immediately --
//! the caller is a tick callback and must not wait on the network.
//! Completion, success or failure, is observed only through logging.

use std::time::Duration;

use stormwatch_types::NotificationEvent;
use tracing::{debug, error};

use crate::payload::BatchPayload;

/// Errors from one send attempt.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// The HTTP client could not be built or the request failed in
    /// transit.
    #[error("sink transport error: {0}")]
    Transport(String),

    /// The sink answered with a non-success status.
    #[error("sink returned status {status}")]
    Status {
        /// The HTTP status code.
        status: u16,
    },

    /// The bounded shutdown flush ran out of time.
    #[error("flush timed out after {waited_ms}ms")]
    Timeout {
        /// How long the flush waited.
        waited_ms: u64,
    },
}

/// Sends notification batches to the external sink.
#[derive(Debug, Clone)]
pub struct BatchDispatcher {
    client: reqwest::Client,
    sink_url: String,
}

impl BatchDispatcher {
    /// Create a dispatcher for `sink_url` with a per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Transport`] if the HTTP client cannot
    /// be constructed.
    pub fn new(sink_url: &str, request_timeout: Duration) -> Result<Self, DispatchError> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| DispatchError::Transport(format!("client build failed: {e}")))?;
        Ok(Self {
            client,
            sink_url: sink_url.to_owned(),
        })
    }

    /// Send a batch without blocking the caller.
    ///
    /// An empty batch is a no-op -- no task, no network call. Failures
    /// are logged and the batch is dropped; there is no retry.
    pub fn dispatch(&self, events: Vec<NotificationEvent>) {
        if events.is_empty() {
            return;
        }
        let count = events.len();
        let client = self.client.clone();
        let sink_url = self.sink_url.clone();
        tokio::spawn(async move {
            match send_batch(&client, &sink_url, &events).await {
                Ok(()) => debug!(count, "notification batch delivered"),
                Err(e) => error!(error = %e, count, "notification batch dropped"),
            }
        });
    }

    /// Send a batch and wait for the outcome, bounded by `wait`.
    ///
    /// Used only by the shutdown flush, where the host is already
    /// tearing down and a short synchronous wait is acceptable.
    ///
    /// # Errors
    ///
    /// Returns the send error, or [`DispatchError::Timeout`] if `wait`
    /// elapsed first.
    pub async fn dispatch_wait(
        &self,
        events: Vec<NotificationEvent>,
        wait: Duration,
    ) -> Result<(), DispatchError> {
        if events.is_empty() {
            return Ok(());
        }
        let waited_ms = u64::try_from(wait.as_millis()).unwrap_or(u64::MAX);
        match tokio::time::timeout(wait, send_batch(&self.client, &self.sink_url, &events)).await {
            Ok(result) => result,
            Err(_) => Err(DispatchError::Timeout { waited_ms }),
        }
    }
}

/// POST one batch envelope and check the response status.
async fn send_batch(
    client: &reqwest::Client,
    sink_url: &str,
    events: &[NotificationEvent],
) -> Result<(), DispatchError> {
    let payload = BatchPayload::new(events);
    let response = client
        .post(sink_url)
        .json(&payload)
        .send()
        .await
        .map_err(|e| DispatchError::Transport(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(DispatchError::Status {
            status: status.as_u16(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::indexing_slicing)]

    use std::sync::Arc;

    use axum::extract::State;
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::Value;
    use tokio::sync::Mutex;

    use super::*;

    type Received = Arc<Mutex<Vec<Value>>>;

    async fn record(State(received): State<Received>, Json(body): Json<Value>) -> Json<Value> {
        received.lock().await.push(body);
        Json(serde_json::json!({"status": "success"}))
    }

    async fn spawn_sink() -> (String, Received) {
        let received: Received = Arc::new(Mutex::new(Vec::new()));
        let app = Router::new()
            .route("/status/notification", post(record))
            .with_state(Arc::clone(&received));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        (format!("http://{addr}/status/notification"), received)
    }

    fn sample_events(n: u32) -> Vec<NotificationEvent> {
        (0..n)
            .map(|i| NotificationEvent::heartbeat(i, String::new()))
            .collect()
    }

    #[tokio::test]
    async fn empty_batch_is_a_no_op() {
        let dispatcher = BatchDispatcher::new("http://127.0.0.1:1/", Duration::from_secs(1))
            .unwrap();
        // No sink is listening on port 1; an empty batch must still
        // succeed because nothing is sent.
        assert!(
            dispatcher
                .dispatch_wait(Vec::new(), Duration::from_secs(1))
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn batch_is_delivered_as_single_envelope() {
        let (url, received) = spawn_sink().await;
        let dispatcher = BatchDispatcher::new(&url, Duration::from_secs(5)).unwrap();

        dispatcher
            .dispatch_wait(sample_events(3), Duration::from_secs(5))
            .await
            .unwrap();

        let bodies = received.lock().await;
        assert_eq!(bodies.len(), 1);
        let batch = bodies.first().unwrap();
        assert_eq!(batch["type"], "notification_batch");
        assert_eq!(
            batch["notifications"].as_array().map(Vec::len),
            Some(3)
        );
    }

    #[tokio::test]
    async fn fire_and_forget_dispatch_delivers() {
        let (url, received) = spawn_sink().await;
        let dispatcher = BatchDispatcher::new(&url, Duration::from_secs(5)).unwrap();

        dispatcher.dispatch(sample_events(2));

        // dispatch returns before the POST happens; poll for arrival.
        for _ in 0..100u32 {
            if !received.lock().await.is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert_eq!(received.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn unreachable_sink_is_a_transport_error() {
        let dispatcher =
            BatchDispatcher::new("http://127.0.0.1:1/notify", Duration::from_secs(1)).unwrap();
        let result = dispatcher
            .dispatch_wait(sample_events(1), Duration::from_secs(5))
            .await;
        assert!(matches!(result, Err(DispatchError::Transport(_))));
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let app = Router::new().route(
            "/notify",
            post(|| async {
                (axum::http::StatusCode::INTERNAL_SERVER_ERROR, "boom")
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        let dispatcher = BatchDispatcher::new(&format!("http://{addr}/notify"), Duration::from_secs(5))
            .unwrap();
        let result = dispatcher
            .dispatch_wait(sample_events(1), Duration::from_secs(5))
            .await;
        assert!(matches!(
            result,
            Err(DispatchError::Status { status: 500 })
        ));
    }
}
