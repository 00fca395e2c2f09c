use crate::{
    domain::{CalculationRequest, EfficiencySummary, PeriodInput, PeriodMetrics},
    engine::{calculate_period, summarize},
};

/// Largest page size the buildings listing serves.
pub const MAX_PAGE_LIMIT: u32 = 100;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("at least one period is required")]
    NoPeriods,
    #[error("{0} must not be empty")]
    EmptyField(String),
    #[error("{field} must be non-negative, got {value}")]
    NegativeValue { field: String, value: f64 },
    #[error("{0} must be a finite number")]
    NonFiniteValue(String),
    #[error("{0} is out of range; readings or rates are too large")]
    OutOfRange(String),
    #[error("page must be >= 1")]
    InvalidPage,
    #[error("limit must be between 1 and 100, got {0}")]
    InvalidLimit(u32),
}

fn require_non_empty(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::EmptyField(field.to_string()));
    }
    Ok(())
}

fn require_non_negative(field: String, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFiniteValue(field));
    }
    if value < 0.0 {
        return Err(ValidationError::NegativeValue { field, value });
    }
    Ok(())
}

/// Pure validation of one period's readings.
///
/// Rules:
/// - the period label must not be blank.
/// - consumption and rates must be finite and non-negative. Zero baselines
///   are accepted; the engine resolves them to "no improvement".
pub fn validate_period(index: usize, p: &PeriodInput) -> Result<(), ValidationError> {
    require_non_empty(&format!("periods[{index}].period"), &p.period)?;

    let numeric = [
        ("current_electric_kwh", p.current_electric_kwh),
        ("current_gas_therms", p.current_gas_therms),
        ("baseline_electric_kwh", p.baseline_electric_kwh),
        ("baseline_gas_therms", p.baseline_gas_therms),
        ("electric_rate", p.electric_rate),
        ("gas_rate", p.gas_rate),
    ];
    for (name, value) in numeric {
        require_non_negative(format!("periods[{index}].{name}"), value)?;
    }

    Ok(())
}

fn period_figures(m: &PeriodMetrics) -> [(&'static str, f64); 9] {
    [
        ("electric_savings_kwh", m.electric_savings_kwh),
        ("gas_savings_therms", m.gas_savings_therms),
        ("electric_cost_savings", m.electric_cost_savings),
        ("gas_cost_savings", m.gas_cost_savings),
        ("total_cost_savings", m.total_cost_savings),
        ("electric_efficiency_improvement", m.electric_efficiency_improvement),
        ("gas_efficiency_improvement", m.gas_efficiency_improvement),
        ("overall_efficiency_improvement", m.overall_efficiency_improvement),
        ("baseline_cost", m.baseline_cost),
    ]
}

fn summary_figures(s: &EfficiencySummary) -> [(&'static str, f64); 8] {
    [
        ("total_electric_savings_kwh", s.total_electric_savings_kwh),
        ("total_gas_savings_therms", s.total_gas_savings_therms),
        ("total_electric_cost_savings", s.total_electric_cost_savings),
        ("total_gas_cost_savings", s.total_gas_cost_savings),
        ("total_cost_savings", s.total_cost_savings),
        ("average_electric_efficiency_improvement", s.average_electric_efficiency_improvement),
        ("average_gas_efficiency_improvement", s.average_gas_efficiency_improvement),
        ("overall_efficiency_improvement", s.overall_efficiency_improvement),
    ]
}

/// Finite inputs can still overflow once priced, summed or divided by a tiny
/// baseline. Every derived figure must stay finite so it can be graded and
/// stored as JSON.
fn require_finite_results(periods: &[PeriodInput]) -> Result<(), ValidationError> {
    let metrics: Vec<_> = periods.iter().map(calculate_period).collect();

    for (i, m) in metrics.iter().enumerate() {
        if let Some((name, _)) = period_figures(m).into_iter().find(|(_, v)| !v.is_finite()) {
            return Err(ValidationError::OutOfRange(format!("periods[{i}].{name}")));
        }
    }

    let summary = summarize(&metrics)?;
    if let Some((name, _)) = summary_figures(&summary).into_iter().find(|(_, v)| !v.is_finite()) {
        return Err(ValidationError::OutOfRange(format!("summary.{name}")));
    }

    Ok(())
}

/// Pure validation of a submission. Runs before any computation is kept; a
/// request that passes can always be calculated, graded and stored.
pub fn validate_request(req: &CalculationRequest) -> Result<(), ValidationError> {
    require_non_empty("building_id", &req.building_id)?;
    require_non_empty("measure_name", &req.measure_name)?;

    if req.periods.is_empty() {
        return Err(ValidationError::NoPeriods);
    }

    for (i, p) in req.periods.iter().enumerate() {
        validate_period(i, p)?;
    }

    require_finite_results(&req.periods)
}

/// Listing pages are 1-indexed with a bounded page size.
pub fn validate_page(page: u32, limit: u32) -> Result<(), ValidationError> {
    if page == 0 {
        return Err(ValidationError::InvalidPage);
    }
    if limit == 0 || limit > MAX_PAGE_LIMIT {
        return Err(ValidationError::InvalidLimit(limit));
    }
    Ok(())
}
