//! Periodic reconciliation.
//!
//! Ticks at a fixed cadence and asks the provisioning service for every
//! configuration that is due. Which configs are due is decided by
//! [`ReconcilePolicy`]; the tick only bounds how late a check can start.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use custom_domain_core::error::CoreResult;
use custom_domain_core::services::{DomainProvisioningService, ReconcilePolicy, SweepReport};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// 最长调度间隔
const MAX_TICK: Duration = Duration::from_secs(60);

/// Background driver for [`DomainProvisioningService::reconcile_due`].
pub struct ReconciliationScheduler {
    service: Arc<DomainProvisioningService>,
    policy: ReconcilePolicy,
}

impl ReconciliationScheduler {
    #[must_use]
    pub fn new(service: Arc<DomainProvisioningService>, policy: ReconcilePolicy) -> Self {
        Self { service, policy }
    }

    /// `min(pending_interval, 60s)`
    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        self.policy.pending_interval.min(MAX_TICK)
    }

    /// Run a single sweep and log its outcome.
    pub async fn run_once(&self) -> CoreResult<SweepReport> {
        let report = self.service.reconcile_due(Utc::now(), &self.policy).await?;

        if report.checked > 0 {
            log::info!(
                "Reconciliation sweep: {} checked, {} activated, {} failed",
                report.checked,
                report.activated,
                report.failed.len()
            );
        }
        for failure in &report.failed {
            if failure.transient {
                log::warn!(
                    "Deferred {} (tenant {}): {}",
                    failure.domain,
                    failure.tenant_id,
                    failure.error
                );
            } else {
                log::error!(
                    "Failed {} (tenant {}): {}",
                    failure.domain,
                    failure.tenant_id,
                    failure.error
                );
            }
        }

        Ok(report)
    }

    /// Loop until `shutdown` flips to `true` (or its sender is dropped).
    ///
    /// The first sweep runs immediately.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut interval = tokio::time::interval(self.tick_interval());
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        log::info!(
            "Reconciliation scheduler started (tick {:?}, pending every {:?}, active every {:?})",
            self.tick_interval(),
            self.policy.pending_interval,
            self.policy.active_interval
        );

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if let Err(e) = self.run_once().await {
                        log::error!("Reconciliation sweep failed: {e}");
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        log::info!("Reconciliation scheduler stopped");
    }

    /// Spawn [`run`](Self::run) on the current runtime.
    pub fn spawn(self, shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }
}
