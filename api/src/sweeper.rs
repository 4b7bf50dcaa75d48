//! Expiry and lease sweeper
//!
//! Reads already treat expired entries and lapsed leases correctly, so the
//! sweeper only reclaims memory and keeps health counters honest.

use kvq_common::Clock;
use kvq_kv::KvEngine;
use kvq_queue::QueueEngine;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Outcome of one pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// KV entries removed
    pub kv_expired: usize,
    /// Leases turned back into visible messages
    pub leases_released: usize,
}

/// Periodic reconciliation of time-based state
#[derive(Debug)]
pub struct Sweeper {
    kv: Arc<KvEngine>,
    queue: Arc<QueueEngine>,
    clock: Arc<dyn Clock>,
    interval: Duration,
}

impl Sweeper {
    /// Sweeper over both engines
    pub fn new(
        kv: Arc<KvEngine>,
        queue: Arc<QueueEngine>,
        clock: Arc<dyn Clock>,
        interval: Duration,
    ) -> Self {
        Self {
            kv,
            queue,
            clock,
            interval,
        }
    }

    /// Run one pass at the current time
    pub fn sweep_once(&self) -> SweepReport {
        let now = self.clock.now_ms();
        let report = SweepReport {
            kv_expired: self.kv.sweep_expired(now),
            leases_released: self.queue.release_expired_leases(now),
        };

        if report == SweepReport::default() {
            tracing::debug!(now, "sweep found nothing");
        } else {
            tracing::info!(
                kv_expired = report.kv_expired,
                leases_released = report.leases_released,
                "sweep reclaimed state"
            );
        }
        report
    }

    /// Sweep on a fixed interval until the task is aborted
    pub fn spawn(self) -> JoinHandle<()> {
        tracing::info!(interval_ms = self.interval.as_millis() as u64, "starting sweeper");
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                self.sweep_once();
            }
        })
    }
}
