use crate::{
    domain::{EfficiencySummary, PerformanceGrade, PeriodMetrics},
    validation::ValidationError,
};

use super::metrics::percent_of;

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 {
        0.0
    } else {
        sum / n as f64
    }
}

/// Aggregates one calculation's period metrics.
///
/// Totals are plain sums. The electric and gas averages count every period
/// once regardless of its size, while the overall figure is cost-weighted
/// across all periods and drives the grade.
pub fn summarize(periods: &[PeriodMetrics]) -> Result<EfficiencySummary, ValidationError> {
    if periods.is_empty() {
        return Err(ValidationError::NoPeriods);
    }

    let mut total_electric_savings_kwh = 0.0;
    let mut total_gas_savings_therms = 0.0;
    let mut total_electric_cost_savings = 0.0;
    let mut total_gas_cost_savings = 0.0;
    let mut total_cost_savings = 0.0;
    let mut total_baseline_cost = 0.0;

    for p in periods {
        total_electric_savings_kwh += p.electric_savings_kwh;
        total_gas_savings_therms += p.gas_savings_therms;
        total_electric_cost_savings += p.electric_cost_savings;
        total_gas_cost_savings += p.gas_cost_savings;
        total_cost_savings += p.total_cost_savings;
        total_baseline_cost += p.baseline_cost;
    }

    let overall_efficiency_improvement = percent_of(total_cost_savings, total_baseline_cost);

    Ok(EfficiencySummary {
        total_electric_savings_kwh,
        total_gas_savings_therms,
        total_electric_cost_savings,
        total_gas_cost_savings,
        total_cost_savings,
        average_electric_efficiency_improvement: mean(
            periods.iter().map(|p| p.electric_efficiency_improvement),
        ),
        average_gas_efficiency_improvement: mean(periods.iter().map(|p| p.gas_efficiency_improvement)),
        overall_efficiency_improvement,
        performance_grade: PerformanceGrade::from_improvement(overall_efficiency_improvement),
    })
}
