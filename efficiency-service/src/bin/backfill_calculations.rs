use anyhow::{bail, Result};
use efficiency_core::domain::CalculationRequest;
use efficiency_service::{
    config::{AppConfig, StoreKind},
    observability,
    pipeline::{Pipeline, Source},
    sinks::StoreSink,
    sources::{CalculationNdjsonFileSource, PeriodCsvFileSource},
    store,
    transform,
};
use std::{env, path::Path, sync::Arc, time::Duration};

enum BackfillSource {
    Ndjson(CalculationNdjsonFileSource),
    Csv(PeriodCsvFileSource),
}

#[async_trait::async_trait]
impl Source<CalculationRequest> for BackfillSource {
    async fn stream(&self) -> efficiency_service::pipeline::EnvelopeStream<CalculationRequest> {
        match self {
            Self::Ndjson(s) => s.stream().await,
            Self::Csv(s) => s.stream().await,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    observability::init_tracing();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        bail!("usage: backfill_calculations <ndjson_or_csv_file_path>");
    }
    let file_path = Path::new(&args[1]);

    // EFFICIENCY_CONFIG may point at a backfill-specific file.
    let cfg = AppConfig::load()?;
    if cfg.store.kind == StoreKind::Memory {
        tracing::warn!("store.kind is memory; backfilled calculations will not be persisted");
    }

    let store = store::open(&cfg.store).await?;
    let sink = Arc::new(StoreSink::new(
        store,
        cfg.backfill.max_retries,
        Duration::from_millis(cfg.backfill.retry_backoff_ms),
    ));

    let is_csv = file_path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
    let source = if is_csv {
        BackfillSource::Csv(PeriodCsvFileSource::new(file_path))
    } else {
        BackfillSource::Ndjson(CalculationNdjsonFileSource::new(file_path))
    };

    let pipeline: Pipeline<_, CalculationRequest, _> = Pipeline {
        source,
        transforms: vec![Arc::new(transform::SubmissionValidation)],
        sink: sink.clone(),
    };

    pipeline.run().await?;

    let report = sink.report();
    println!(
        "stored {} calculations, {} already stored, rejected {}",
        report.stored, report.already_stored, report.rejected
    );

    Ok(())
}
