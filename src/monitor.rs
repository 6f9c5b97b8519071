use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::api::{ApiClient, ApiResult, HealthResponse};
use crate::app::BackendEvent;
use crate::tui::AppEvent;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConnectionStatus {
    #[default]
    Unknown,
    Connected { model: String, auto_speak: bool },
    Disconnected,
}

impl ConnectionStatus {
    /// Derive the status from a single poll. Nothing carries over from the
    /// previous poll.
    pub fn from_poll(result: &ApiResult<HealthResponse>) -> Self {
        match result {
            Ok(health) => ConnectionStatus::Connected {
                model: health
                    .model
                    .clone()
                    .filter(|m| !m.is_empty())
                    .unwrap_or_else(|| "unknown".to_string()),
                auto_speak: health.auto_speak,
            },
            Err(_) => ConnectionStatus::Disconnected,
        }
    }

    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionStatus::Connected { .. })
    }
}

/// Poll `/health` every `period`; the first poll runs immediately.
pub fn spawn_health_monitor(
    api: ApiClient,
    tx: UnboundedSender<AppEvent>,
    period: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            let result = api.health().await;
            if let Err(e) = &result {
                tracing::warn!(error = %e, "health check failed");
            }
            if tx.send(AppEvent::Backend(BackendEvent::Health(result))).is_err() {
                break;
            }
        }
    })
}
