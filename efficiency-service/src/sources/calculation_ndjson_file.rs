use std::path::PathBuf;

use async_stream::stream;
use efficiency_core::domain::CalculationRequest;
use tokio::{
    fs::File,
    io::{AsyncBufReadExt, BufReader},
};

use crate::pipeline::{Envelope, EnvelopeStream, PipelineError, Source};

/// NDJSON backfill source: one `POST /efficiency/calculate` body per line,
/// optionally carrying its historical `calculation_timestamp`. Blank lines are
/// skipped; an unparseable line is reported downstream and reading continues.
pub struct CalculationNdjsonFileSource {
    path: PathBuf,
}

impl CalculationNdjsonFileSource {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait::async_trait]
impl Source<CalculationRequest> for CalculationNdjsonFileSource {
    async fn stream(&self) -> EnvelopeStream<CalculationRequest> {
        let path = self.path.clone();
        let s = stream! {
            match File::open(&path).await {
                Err(e) => {
                    yield Err(PipelineError::Source(format!("failed to open backfill file: {e}")));
                }
                Ok(file) => {
                    let mut lines = BufReader::new(file).lines();
                    let mut line_no = 0usize;

                    loop {
                        let line = match lines.next_line().await {
                            Ok(Some(line)) => line,
                            Ok(None) => break,
                            Err(e) => {
                                yield Err(PipelineError::Source(format!(
                                    "failed to read backfill line: {e}"
                                )));
                                break;
                            }
                        };
                        line_no += 1;
                        if line.trim().is_empty() {
                            continue;
                        }

                        let origin = format!("{}:{line_no}", path.display());
                        match serde_json::from_str::<CalculationRequest>(&line) {
                            Ok(req) => {
                                yield Ok(Envelope::new(req, origin));
                            }
                            Err(e) => {
                                metrics::counter!("backfill_ndjson_parse_errors_total").increment(1);
                                yield Err(PipelineError::Source(format!("{origin}: invalid json: {e}")));
                            }
                        }
                    }
                }
            }
        };

        Box::pin(s)
    }
}
