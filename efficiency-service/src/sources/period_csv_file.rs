use std::{fs::File, path::PathBuf};

use async_stream::stream;
use csv::StringRecord;
use efficiency_core::{domain::CalculationRequest, PeriodInput};
use time::{format_description::well_known::Rfc3339, OffsetDateTime};

use crate::pipeline::{Envelope, EnvelopeStream, PipelineError, Source};

/// CSV backfill source with one period per row.
///
/// Expected header columns (by name):
/// - building_id
/// - measure_name
/// - calculation_timestamp (RFC3339, may be empty)
/// - period
/// - time_range
/// - days (`;`-separated weekday names, may be empty)
/// - current_electric_kwh, current_gas_therms
/// - baseline_electric_kwh, baseline_gas_therms
/// - electric_rate, gas_rate
///
/// Consecutive rows sharing building, measure and timestamp form one
/// submission.
pub struct PeriodCsvFileSource {
    path: PathBuf,
}

impl PeriodCsvFileSource {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }
}

struct PeriodRow {
    building_id: String,
    measure_name: String,
    calculation_timestamp: Option<OffsetDateTime>,
    period: PeriodInput,
}

impl PeriodRow {
    fn same_submission(&self, req: &CalculationRequest) -> bool {
        self.building_id == req.building_id
            && self.measure_name == req.measure_name
            && self.calculation_timestamp == req.calculation_timestamp
    }

    fn into_request(self) -> CalculationRequest {
        CalculationRequest {
            building_id: self.building_id,
            measure_name: self.measure_name,
            periods: vec![self.period],
            calculation_timestamp: self.calculation_timestamp,
        }
    }
}

fn parse_days(s: &str) -> Vec<String> {
    s.split(';')
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string)
        .collect()
}

fn record_to_row(record: &StringRecord, headers: &StringRecord) -> Result<PeriodRow, PipelineError> {
    let get = |name: &str| -> Result<&str, PipelineError> {
        headers
            .iter()
            .position(|h| h.trim() == name)
            .and_then(|idx| record.get(idx))
            .map(str::trim)
            .ok_or_else(|| PipelineError::Source(format!("missing column '{name}' in CSV record")))
    };
    let number = |name: &str| -> Result<f64, PipelineError> {
        let raw = get(name)?;
        raw.parse()
            .map_err(|e| PipelineError::Source(format!("invalid {name} '{raw}': {e}")))
    };

    let ts_str = get("calculation_timestamp")?;
    let calculation_timestamp = if ts_str.is_empty() {
        None
    } else {
        Some(
            OffsetDateTime::parse(ts_str, &Rfc3339)
                .map_err(|e| PipelineError::Source(format!("invalid calculation_timestamp '{ts_str}': {e}")))?,
        )
    };

    Ok(PeriodRow {
        building_id: get("building_id")?.to_string(),
        measure_name: get("measure_name")?.to_string(),
        calculation_timestamp,
        period: PeriodInput {
            period: get("period")?.to_string(),
            time_range: get("time_range")?.to_string(),
            days: parse_days(get("days")?),
            current_electric_kwh: number("current_electric_kwh")?,
            current_gas_therms: number("current_gas_therms")?,
            baseline_electric_kwh: number("baseline_electric_kwh")?,
            baseline_gas_therms: number("baseline_gas_therms")?,
            electric_rate: number("electric_rate")?,
            gas_rate: number("gas_rate")?,
        },
    })
}

#[async_trait::async_trait]
impl Source<CalculationRequest> for PeriodCsvFileSource {
    async fn stream(&self) -> EnvelopeStream<CalculationRequest> {
        // The CSV reader is blocking; backfill files are read on the task
        // that drives the pipeline.
        let path = self.path.clone();
        let s = stream! {
            let opened = File::open(&path)
                .map_err(|e| PipelineError::Source(format!("failed to open CSV file: {e}")))
                .and_then(|file| {
                    let mut rdr = csv::Reader::from_reader(file);
                    let headers = rdr
                        .headers()
                        .map_err(|e| PipelineError::Source(format!("failed to read CSV headers: {e}")))?
                        .clone();
                    Ok((rdr, headers))
                });

            match opened {
                Err(e) => {
                    yield Err(e);
                }
                Ok((mut rdr, headers)) => {
                    // (submission, origin of its first row)
                    let mut current: Option<(CalculationRequest, String)> = None;

                    for (idx, result) in rdr.records().enumerate() {
                        // Header is line 1.
                        let origin = format!("{}:{}", path.display(), idx + 2);
                        let parsed = result
                            .map_err(|e| PipelineError::Source(format!("{origin}: failed to read CSV record: {e}")))
                            .and_then(|record| {
                                record_to_row(&record, &headers)
                                    .map_err(|e| PipelineError::Source(format!("{origin}: {e}")))
                            });

                        let row = match parsed {
                            Ok(row) => row,
                            Err(e) => {
                                metrics::counter!("backfill_csv_parse_errors_total").increment(1);
                                yield Err(e);
                                continue;
                            }
                        };

                        match current.as_mut() {
                            Some((req, _)) if row.same_submission(req) => req.periods.push(row.period),
                            _ => {
                                if let Some((req, first)) = current.take() {
                                    yield Ok(Envelope::new(req, first));
                                }
                                current = Some((row.into_request(), origin));
                            }
                        }
                    }

                    if let Some((req, first)) = current {
                        yield Ok(Envelope::new(req, first));
                    }
                }
            }
        };

        Box::pin(s)
    }
}
