//! PostgreSQL `LISTEN/NOTIFY` bridge.
//!
//! Every data table carries a trigger that calls `notify_table_change()`,
//! which sends `{"table", "action", "id"}` on the [`CHANGE_CHANNEL`]
//! channel. [`ChangeListener`] holds one dedicated connection listening on
//! that channel and republishes each notification on the [`EventBus`].

use std::sync::Arc;
use std::time::Duration;

use maintrack_db::DbPool;
use sqlx::postgres::PgListener;
use tokio_util::sync::CancellationToken;

use crate::bus::{EventBus, TableChange};

/// Notification channel written by the `notify_table_change()` trigger.
pub const CHANGE_CHANNEL: &str = "table_changes";

/// Tunable parameters for the exponential-backoff strategy used while
/// (re)connecting the listener.
#[derive(Debug, Clone)]
pub struct ReconnectConfig {
    /// Delay before the first reconnection attempt.
    pub initial_delay: Duration,
    /// Upper bound on the delay between attempts.
    pub max_delay: Duration,
    /// Factor by which the delay grows after each failure.
    pub multiplier: f64,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            multiplier: 2.0,
        }
    }
}

/// Calculate the next backoff delay from the current delay and config.
///
/// The result is clamped to [`ReconnectConfig::max_delay`].
pub fn next_delay(current: Duration, config: &ReconnectConfig) -> Duration {
    let next_ms = (current.as_millis() as f64 * config.multiplier) as u64;
    Duration::from_millis(next_ms).min(config.max_delay)
}

/// Delay before reconnecting after a listening session ends.
///
/// A session that delivered at least one notification counts as healthy and
/// restarts the backoff; one that failed before delivering anything keeps
/// the current delay.
pub fn retry_delay(current: Duration, received_any: bool, config: &ReconnectConfig) -> Duration {
    if received_any {
        config.initial_delay
    } else {
        current
    }
}

// ---------------------------------------------------------------------------
// ChangeListener
// ---------------------------------------------------------------------------

/// Background service that forwards database change notifications onto the
/// event bus.
pub struct ChangeListener {
    pool: DbPool,
    bus: Arc<EventBus>,
    reconnect: ReconnectConfig,
}

impl ChangeListener {
    pub fn new(pool: DbPool, bus: Arc<EventBus>) -> Self {
        Self {
            pool,
            bus,
            reconnect: ReconnectConfig::default(),
        }
    }

    /// Override the reconnect backoff.
    pub fn with_reconnect(mut self, reconnect: ReconnectConfig) -> Self {
        self.reconnect = reconnect;
        self
    }

    /// Run the listener loop until `cancel` is triggered.
    ///
    /// A lost connection is re-established with exponential backoff;
    /// notifications sent while disconnected are lost, so clients should
    /// re-fetch after reconnecting.
    pub async fn run(&self, cancel: CancellationToken) {
        let mut delay = self.reconnect.initial_delay;

        loop {
            let mut listener = tokio::select! {
                _ = cancel.cancelled() => break,
                result = self.connect() => match result {
                    Ok(listener) => listener,
                    Err(e) => {
                        tracing::warn!(
                            error = %e,
                            retry_in_ms = delay.as_millis() as u64,
                            "Change listener failed to connect",
                        );
                        tokio::select! {
                            _ = cancel.cancelled() => break,
                            _ = tokio::time::sleep(delay) => {}
                        }
                        delay = next_delay(delay, &self.reconnect);
                        continue;
                    }
                },
            };

            tracing::info!(channel = CHANGE_CHANNEL, "Change listener started");

            let mut received_any = false;
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        tracing::info!("Change listener cancelled");
                        return;
                    }
                    result = listener.try_recv() => match result {
                        Ok(Some(notification)) => {
                            received_any = true;
                            self.handle_payload(notification.payload());
                        }
                        Ok(None) => {
                            tracing::warn!("Change listener connection lost");
                            break;
                        }
                        Err(e) => {
                            tracing::error!(error = %e, "Change listener receive failed");
                            break;
                        }
                    },
                }
            }

            delay = retry_delay(delay, received_any, &self.reconnect);
            tracing::info!(retry_in_ms = delay.as_millis() as u64, "Change listener reconnecting");
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(delay) => {}
            }
            delay = next_delay(delay, &self.reconnect);
        }

        tracing::info!("Change listener cancelled");
    }

    async fn connect(&self) -> Result<PgListener, sqlx::Error> {
        let mut listener = PgListener::connect_with(&self.pool).await?;
        listener.listen(CHANGE_CHANNEL).await?;
        Ok(listener)
    }

    /// Decode one notification and publish it. Malformed payloads are
    /// logged and dropped.
    fn handle_payload(&self, payload: &str) {
        match payload.parse::<TableChange>() {
            Ok(change) => {
                tracing::debug!(
                    table = %change.table,
                    action = %change.action,
                    id = change.row_id,
                    "Table change received",
                );
                self.bus.publish(change);
            }
            Err(e) => {
                tracing::warn!(error = %e, payload, "Ignoring change notification");
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
