//! Active health checking.
//!
//! # Responsibilities
//! - Periodically probe every backend in the pool
//! - Update backend liveness based on results

use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::config::HealthCheckConfig;
use crate::health::probe::{Prober, TcpProber};
use crate::load_balancer::pool::BackendPool;

pub struct HealthMonitor {
    pool: Arc<BackendPool>,
    config: HealthCheckConfig,
    prober: Arc<dyn Prober>,
}

impl HealthMonitor {
    /// Monitor using a TCP connect probe bounded by the configured timeout.
    pub fn new(pool: Arc<BackendPool>, config: HealthCheckConfig) -> Self {
        let prober = Arc::new(TcpProber::new(config.timeout()));
        Self::with_prober(pool, config, prober)
    }

    pub fn with_prober(
        pool: Arc<BackendPool>,
        config: HealthCheckConfig,
        prober: Arc<dyn Prober>,
    ) -> Self {
        Self {
            pool,
            config,
            prober,
        }
    }

    /// Run until the shutdown signal fires.
    ///
    /// The first cycle starts one interval after launch. A slow cycle delays
    /// the next tick instead of stacking them.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(
            interval_secs = self.config.interval_secs,
            timeout_secs = self.config.timeout_secs,
            backends = self.pool.len(),
            "Health monitor starting"
        );

        let interval = self.config.interval();
        let mut ticker = time::interval_at(Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.check_all().await;
                }
                _ = shutdown.recv() => {
                    tracing::info!("Health monitor received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }

    /// One full health-check cycle.
    pub async fn check_all(&self) {
        tracing::info!("Starting health check...");
        self.pool.health_check(self.prober.as_ref()).await;
        tracing::info!(
            alive = self.pool.alive_count(),
            total = self.pool.len(),
            "Health check completed"
        );
    }
}
