use std::time::{Duration, Instant};

use chrono::Utc;
use rand::Rng;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::config::Config;
use crate::digest::compose;
use crate::market_data::collector::SnapshotCollector;
use crate::metrics::prometheus::{record_cycle_duration, record_publish};
use crate::publish::traits::{PublishError, Publisher};
use crate::state::poll_state::PreviousPollState;

/// How long the loop idles between cycles.
#[derive(Debug, Clone, Copy)]
pub struct Schedule {
    pub interval: Duration,
    /// Upper bound of the random delay added to `interval`.
    pub jitter: Duration,
    /// Shorter wait after a failed cycle.
    pub backoff: Duration,
}

impl Schedule {
    pub fn from_config(config: &Config) -> Self {
        Self {
            interval: config.digest_interval,
            jitter: config.digest_jitter,
            backoff: config.retry_backoff,
        }
    }

    pub fn next_delay(&self) -> Duration {
        let jitter_ms = self.jitter.as_millis() as u64;
        if jitter_ms == 0 {
            return self.interval;
        }
        self.interval + Duration::from_millis(rand::thread_rng().gen_range(0..=jitter_ms))
    }
}

/// Fetch → compose → publish on a timer, for the life of the process.
pub struct DigestLoop {
    collector: SnapshotCollector,
    publisher: Box<dyn Publisher>,
    schedule: Schedule,
}

impl DigestLoop {
    pub fn new(collector: SnapshotCollector, publisher: Box<dyn Publisher>, schedule: Schedule) -> Self {
        Self {
            collector,
            publisher,
            schedule,
        }
    }

    /// Runs until `cancel` fires. The first cycle starts immediately. A failed
    /// cycle is followed by the backoff delay and never ends the loop.
    pub async fn run(self, cancel: CancellationToken) {
        info!(
            publisher = self.publisher.name(),
            interval_secs = self.schedule.interval.as_secs(),
            jitter_secs = self.schedule.jitter.as_secs(),
            backoff_secs = self.schedule.backoff.as_secs(),
            "digest loop started"
        );

        let mut state = PreviousPollState::default();

        while !cancel.is_cancelled() {
            let delay = match self.run_cycle(&state, &cancel).await {
                Ok(Some(next)) => {
                    state = next;
                    self.schedule.next_delay()
                }
                Ok(None) => break,
                Err(err) => {
                    error!(
                        error = %err,
                        retry_in_secs = self.schedule.backoff.as_secs(),
                        "digest cycle failed"
                    );
                    self.schedule.backoff
                }
            };

            debug!(delay_ms = delay.as_millis() as u64, "sleeping until next cycle");
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = sleep(delay) => {}
            }
        }

        info!("digest loop stopped");
    }

    /// One Running phase. `Ok(None)` means shutdown was requested before
    /// anything was published.
    async fn run_cycle(
        &self,
        previous: &PreviousPollState,
        cancel: &CancellationToken,
    ) -> Result<Option<PreviousPollState>, PublishError> {
        let started = Instant::now();
        info!("digest cycle starting");

        let snapshot = tokio::select! {
            _ = cancel.cancelled() => return Ok(None),
            snapshot = self.collector.collect() => snapshot,
        };

        let digest = compose(&snapshot, previous, Utc::now());

        if cancel.is_cancelled() {
            info!("shutdown requested, digest not published");
            return Ok(None);
        }

        // Not raced against cancellation: a publish in flight runs to completion.
        let result = self.publisher.publish(&digest.text).await;
        let elapsed_ms = started.elapsed().as_secs_f64() * 1_000.0;
        record_cycle_duration(elapsed_ms);
        record_publish(self.publisher.name(), if result.is_ok() { "ok" } else { "error" });
        result?;

        info!(
            chars = digest.text.chars().count(),
            elapsed_ms = elapsed_ms as u64,
            "digest published"
        );
        Ok(Some(digest.next_state))
    }
}
