//! Periodic backend health polling.
//!
//! [`HealthMonitor`] checks once immediately, then on a fixed interval, and
//! keeps only the latest result. Dropping or shutting it down stops the timer.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::api::{ApiClient, HealthStatus};

/// Default polling period.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(30);

/// Anything that can report backend health.
#[async_trait]
pub trait HealthProbe: Send + Sync {
    async fn probe(&self) -> HealthStatus;
}

#[async_trait]
impl HealthProbe for ApiClient {
    async fn probe(&self) -> HealthStatus {
        self.check_health().await
    }
}

/// Observable health of the backend.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum HealthState {
    /// No check has completed yet.
    #[default]
    Unknown,
    Healthy { info: Option<Value> },
    Unhealthy { error: Option<String> },
}

impl HealthState {
    pub fn is_healthy(&self) -> bool {
        matches!(self, Self::Healthy { .. })
    }

    /// Short label for the indicator: the server's `status` when it sent one.
    pub fn label(&self) -> String {
        match self {
            Self::Unknown => "Checking...".to_string(),
            Self::Healthy { info } => info
                .as_ref()
                .and_then(|i| i.get("status"))
                .and_then(Value::as_str)
                .unwrap_or("healthy")
                .to_string(),
            Self::Unhealthy { .. } => "Down".to_string(),
        }
    }
}

impl From<HealthStatus> for HealthState {
    fn from(status: HealthStatus) -> Self {
        if status.ok {
            Self::Healthy { info: status.info }
        } else {
            Self::Unhealthy {
                error: status.error,
            }
        }
    }
}

/// Background health poller.
#[derive(Debug)]
pub struct HealthMonitor {
    state: watch::Receiver<HealthState>,
    cancel: CancellationToken,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl HealthMonitor {
    /// Start polling `probe` every `period`, beginning immediately.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn<P>(probe: Arc<P>, period: Duration) -> Self
    where
        P: HealthProbe + ?Sized + 'static,
    {
        let (tx, rx) = watch::channel(HealthState::Unknown);
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    () = token.cancelled() => break,
                    _ = ticker.tick() => {}
                }

                let state = tokio::select! {
                    () = token.cancelled() => break,
                    status = probe.probe() => HealthState::from(status),
                };

                let transition =
                    std::mem::discriminant(&state) != std::mem::discriminant(&*tx.borrow());
                if transition {
                    tracing::info!(
                        name: "health.changed",
                        healthy = state.is_healthy(),
                        label = %state.label(),
                        "Backend health changed"
                    );
                }
                tx.send_replace(state);
            }
            tracing::debug!(name: "health.stopped", "Health polling stopped");
        });

        Self {
            state: rx,
            cancel,
            task: Mutex::new(Some(task)),
        }
    }

    /// Latest observed state.
    pub fn current(&self) -> HealthState {
        self.state.borrow().clone()
    }

    /// Receiver notified on every completed check.
    pub fn subscribe(&self) -> watch::Receiver<HealthState> {
        self.state.clone()
    }

    /// Stop polling and wait for the poller to exit.
    pub async fn shutdown(&self) {
        self.cancel.cancel();
        let task = self.task.lock().unwrap().take();
        if let Some(task) = task {
            let _ = task.await;
        }
    }
}

impl Drop for HealthMonitor {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
