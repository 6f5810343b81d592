//! Background maintenance loop.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;

use crate::net::Connector;
use crate::pool::ConnectionPool;

/// Drives the pool's heartbeat/repair/rebalance pass on a jittered cadence.
///
/// The sleep between passes is drawn uniformly from the configured bounds on
/// every iteration, so that many SDK instances sharing one proxy fleet do
/// not tick in lockstep against it.
pub struct MaintenanceCoordinator<T: Connector> {
    pool: Arc<ConnectionPool<T>>,
    interval_min_secs: u64,
    interval_max_secs: u64,
}

impl<T: Connector> MaintenanceCoordinator<T> {
    pub fn new(pool: Arc<ConnectionPool<T>>) -> Self {
        let heartbeat = &pool.config().heartbeat;
        let (interval_min_secs, interval_max_secs) =
            (heartbeat.interval_min_secs, heartbeat.interval_max_secs);
        Self {
            pool,
            interval_min_secs,
            interval_max_secs,
        }
    }

    /// Run until the shutdown signal fires. Outstanding network calls inside
    /// a pass are not interrupted; the loop re-checks the signal once per
    /// iteration, so shutdown completes within one pass.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(
            min_secs = self.interval_min_secs,
            max_secs = self.interval_max_secs,
            "maintenance loop starting"
        );
        loop {
            let secs = fastrand::u64(self.interval_min_secs..=self.interval_max_secs);
            tokio::select! {
                _ = tokio::time::sleep(Duration::from_secs(secs)) => {
                    self.pool.maintain_once().await;
                }
                _ = shutdown.recv() => {
                    tracing::info!("maintenance loop received shutdown signal, exiting");
                    break;
                }
            }
        }
    }
}
