use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::{Duration, SystemTime},
};

use efficiency_core::{domain::CalculationRequest, engine, EfficiencyCalculation};
use futures::StreamExt;
use time::OffsetDateTime;

use crate::{
    pipeline::{Envelope, PipelineError, Sink},
    store::{Appended, CalculationStore, StoreError},
};

/// Counts of what a backfill run did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BackfillReport {
    pub stored: u64,
    /// Records whose calculation was already in the store.
    pub already_stored: u64,
    pub rejected: u64,
}

/// Computes each submission and appends it to the store.
///
/// Upstream errors (unparseable or invalid records) are logged and skipped.
/// Store failures are retried with linear backoff; once retries are
/// exhausted the run aborts.
pub struct StoreSink {
    store: Arc<dyn CalculationStore>,
    max_retries: u32,
    retry_backoff: Duration,
    stored: AtomicU64,
    already_stored: AtomicU64,
    rejected: AtomicU64,
}

impl StoreSink {
    pub fn new(store: Arc<dyn CalculationStore>, max_retries: u32, retry_backoff: Duration) -> Self {
        Self {
            store,
            max_retries,
            retry_backoff,
            stored: AtomicU64::new(0),
            already_stored: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
        }
    }

    pub fn report(&self) -> BackfillReport {
        BackfillReport {
            stored: self.stored.load(Ordering::Relaxed),
            already_stored: self.already_stored.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
        }
    }

    async fn append_with_retry(&self, calc: &EfficiencyCalculation) -> Result<Appended, PipelineError> {
        let mut attempt: u32 = 0;
        loop {
            let res: Result<Appended, StoreError> = self.store.append(calc.clone()).await;
            match res {
                Ok(appended) => return Ok(appended),
                Err(e) if attempt < self.max_retries => {
                    attempt += 1;
                    let sleep_for = self.retry_backoff * attempt;
                    tracing::warn!(
                        error = %e,
                        attempt,
                        calculation_id = %calc.id,
                        "store append failed, retrying with backoff"
                    );
                    metrics::counter!("efficiency_store_retry_total").increment(1);
                    tokio::time::sleep(sleep_for).await;
                }
                Err(e) => {
                    tracing::error!(error = %e, calculation_id = %calc.id, "store append failed, giving up");
                    metrics::counter!("efficiency_store_errors_total").increment(1);
                    return Err(PipelineError::Sink(e.to_string()));
                }
            }
        }
    }

    fn reject(&self, e: &dyn std::fmt::Display) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
        tracing::warn!(error = %e, "skipping backfill record");
    }
}

#[async_trait::async_trait]
impl Sink<CalculationRequest> for StoreSink {
    async fn run<S>(&self, mut input: S) -> Result<(), PipelineError>
    where
        S: futures::Stream<Item = Result<Envelope<CalculationRequest>, PipelineError>> + Send + Unpin + 'static,
    {
        while let Some(item) = input.next().await {
            let env = match item {
                Ok(env) => env,
                Err(e) => {
                    self.reject(&e);
                    continue;
                }
            };

            let calc = match engine::calculate(&env.payload, OffsetDateTime::now_utc()) {
                Ok(calc) => calc,
                Err(e) => {
                    self.reject(&format!("{}: {e}", env.origin));
                    continue;
                }
            };

            if self.append_with_retry(&calc).await?.is_new() {
                self.stored.fetch_add(1, Ordering::Relaxed);
                metrics::counter!("efficiency_calculations_total").increment(1);
            } else {
                self.already_stored.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(calculation_id = %calc.id, origin = %env.origin, "calculation already stored");
            }

            if let Ok(dur) = SystemTime::now().duration_since(env.received_at) {
                metrics::histogram!("backfill_record_latency_seconds").record(dur.as_secs_f64());
            }
        }

        let report = self.report();
        tracing::info!(
            stored = report.stored,
            already_stored = report.already_stored,
            rejected = report.rejected,
            "backfill finished"
        );

        Ok(())
    }
}
