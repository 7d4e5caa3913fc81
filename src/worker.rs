use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

use crate::models::JobStatus;
use crate::pipeline::Pipeline;
use crate::queue::JobQueue;

/// Outcome counts for one polling cycle.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CycleStats {
    pub fetched: usize,
    pub completed: usize,
    pub failed: usize,
    pub report_errors: usize,
}

pub struct Worker {
    queue: Box<dyn JobQueue>,
    pipeline: Pipeline,
    poll_interval: Duration,
    job_pause: Duration,
}

impl Worker {
    pub fn new(
        queue: Box<dyn JobQueue>,
        pipeline: Pipeline,
        poll_interval: Duration,
        job_pause: Duration,
    ) -> Self {
        Worker {
            queue,
            pipeline,
            poll_interval,
            job_pause,
        }
    }

    /// One cycle now, then one per interval until ctrl-c. Cycles never overlap.
    pub async fn run(&self) {
        info!(
            "Worker started, polling every {}s",
            self.poll_interval.as_secs()
        );
        let mut ticker = tokio::time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let shutdown = tokio::signal::ctrl_c();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.run_cycle().await;
                }
                _ = &mut shutdown => {
                    info!("Shutdown requested, stopping worker");
                    break;
                }
            }
        }
    }

    /// Fetch the pending batch and process it sequentially.
    pub async fn run_cycle(&self) -> CycleStats {
        let mut stats = CycleStats::default();

        let jobs = match self.queue.pending_jobs().await {
            Ok(jobs) => jobs,
            Err(e) => {
                warn!("Could not fetch pending jobs: {}", e);
                return stats;
            }
        };
        stats.fetched = jobs.len();
        if jobs.is_empty() {
            info!("No pending jobs");
            return stats;
        }

        for (i, job) in jobs.iter().enumerate() {
            if i > 0 && !self.job_pause.is_zero() {
                tokio::time::sleep(self.job_pause).await;
            }
            info!(
                "[{}] Processing job {}/{}",
                job.id,
                i + 1,
                jobs.len()
            );

            let payload = self.pipeline.process_job(job).await;
            match payload.status {
                JobStatus::Completed => stats.completed += 1,
                JobStatus::Failed => stats.failed += 1,
            }

            match self.queue.report(&payload).await {
                Ok(body) => info!("[{}] Result delivered: {}", job.id, body.trim()),
                Err(e) => {
                    stats.report_errors += 1;
                    error!("[{}] Could not deliver result: {}", job.id, e);
                }
            }
        }

        info!(
            "Cycle done: {} completed, {} failed, {} undelivered",
            stats.completed, stats.failed, stats.report_errors
        );
        stats
    }
}

// ── Tests ──
