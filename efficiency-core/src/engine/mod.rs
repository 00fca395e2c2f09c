//! Pure efficiency computation: period metrics, per-calculation summaries,
//! building rollups and the paginated listing. Nothing in here performs I/O.

pub mod listing;
pub mod metrics;
pub mod rollup;
pub mod summary;

use time::OffsetDateTime;

use crate::{
    domain::{calculation::calculation_id, CalculationRequest, EfficiencyCalculation},
    validation::{validate_request, ValidationError},
};

pub use listing::{matches_search, paginate, DEFAULT_LIMIT, DEFAULT_PAGE};
pub use metrics::calculate_period;
pub use rollup::{aggregate_building, sort_newest_first};
pub use summary::summarize;

/// Validates a submission and computes the resulting calculation.
///
/// `now` stamps `created_at`, and `calculation_timestamp` when the request
/// does not carry one.
pub fn calculate(
    req: &CalculationRequest,
    now: OffsetDateTime,
) -> Result<EfficiencyCalculation, ValidationError> {
    validate_request(req)?;

    let periods: Vec<_> = req.periods.iter().map(calculate_period).collect();
    let summary = summarize(&periods)?;
    let calculation_timestamp = req.calculation_timestamp.unwrap_or(now);
    let building_id = req.building_id.trim();
    let measure_name = req.measure_name.trim();

    Ok(EfficiencyCalculation {
        id: calculation_id(building_id, measure_name, calculation_timestamp, &req.periods),
        building_id: building_id.to_string(),
        measure_name: measure_name.to_string(),
        calculation_timestamp,
        periods,
        summary,
        created_at: now,
    })
}
