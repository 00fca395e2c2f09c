use crate::domain::{PeriodInput, PeriodMetrics};

/// `part / whole * 100`, or 0 when there is nothing to compare against.
pub(crate) fn percent_of(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        part / whole * 100.0
    } else {
        0.0
    }
}

/// Savings and improvement percentages for one period.
///
/// Never fails. Savings are negative when consumption rose, and a zero
/// baseline yields a 0 % improvement rather than a division by zero. The
/// overall figure weights electric and gas by their baseline dollar cost,
/// since kWh and therms do not add up directly.
pub fn calculate_period(input: &PeriodInput) -> PeriodMetrics {
    let electric_savings_kwh = input.baseline_electric_kwh - input.current_electric_kwh;
    let gas_savings_therms = input.baseline_gas_therms - input.current_gas_therms;

    let electric_cost_savings = electric_savings_kwh * input.electric_rate;
    let gas_cost_savings = gas_savings_therms * input.gas_rate;
    let total_cost_savings = electric_cost_savings + gas_cost_savings;

    let baseline_cost = input.baseline_cost();

    PeriodMetrics {
        period: input.period.clone(),
        time_range: input.time_range.clone(),
        days: input.days.clone(),
        electric_savings_kwh,
        gas_savings_therms,
        electric_cost_savings,
        gas_cost_savings,
        total_cost_savings,
        electric_efficiency_improvement: percent_of(electric_savings_kwh, input.baseline_electric_kwh),
        gas_efficiency_improvement: percent_of(gas_savings_therms, input.baseline_gas_therms),
        overall_efficiency_improvement: percent_of(total_cost_savings, baseline_cost),
        baseline_cost,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn input() -> PeriodInput {
        PeriodInput {
            period: "business_hours".to_string(),
            time_range: "08:00-18:00".to_string(),
            days: vec!["Monday".to_string(), "Friday".to_string()],
            current_electric_kwh: 800.0,
            current_gas_therms: 0.0,
            baseline_electric_kwh: 1000.0,
            baseline_gas_therms: 0.0,
            electric_rate: 0.12,
            gas_rate: 0.0,
        }
    }

    #[test]
    fn electric_only_period() {
        let m = calculate_period(&input());

        assert!((m.electric_savings_kwh - 200.0).abs() < EPS);
        assert!((m.electric_cost_savings - 24.0).abs() < EPS);
        assert!((m.electric_efficiency_improvement - 20.0).abs() < EPS);
        assert_eq!(m.gas_savings_therms, 0.0);
        assert_eq!(m.gas_efficiency_improvement, 0.0);
        // Gas costs nothing, so the cost-weighted figure equals the electric one.
        assert!((m.overall_efficiency_improvement - 20.0).abs() < EPS);
        assert!((m.baseline_cost - 120.0).abs() < EPS);
        assert_eq!(m.period, "business_hours");
        assert_eq!(m.days.len(), 2);
    }

    #[test]
    fn zero_baselines_resolve_to_no_improvement() {
        let mut i = input();
        i.baseline_electric_kwh = 0.0;
        i.current_electric_kwh = 50.0;
        i.electric_rate = 0.0;
        let m = calculate_period(&i);

        assert_eq!(m.electric_efficiency_improvement, 0.0);
        assert_eq!(m.gas_efficiency_improvement, 0.0);
        assert_eq!(m.overall_efficiency_improvement, 0.0);
        assert!(m.electric_savings_kwh < 0.0);
        assert!(m.overall_efficiency_improvement.is_finite());
    }

    #[test]
    fn increased_consumption_is_negative_improvement() {
        let mut i = input();
        i.current_electric_kwh = 1100.0;
        let m = calculate_period(&i);

        assert!((m.electric_savings_kwh + 100.0).abs() < EPS);
        assert!((m.electric_cost_savings + 12.0).abs() < EPS);
        assert!((m.electric_efficiency_improvement + 10.0).abs() < EPS);
        assert!(m.overall_efficiency_improvement < 0.0);
    }

    #[test]
    fn total_cost_is_sum_of_parts() {
        let i = PeriodInput {
            period: "weekend".to_string(),
            time_range: "00:00-24:00".to_string(),
            days: vec!["Saturday".to_string(), "Sunday".to_string()],
            current_electric_kwh: 321.7,
            current_gas_therms: 44.3,
            baseline_electric_kwh: 402.9,
            baseline_gas_therms: 39.1,
            electric_rate: 0.137,
            gas_rate: 1.27,
        };
        let m = calculate_period(&i);

        assert!((m.total_cost_savings - (m.electric_cost_savings + m.gas_cost_savings)).abs() < EPS);
    }

    #[test]
    fn overall_improvement_is_cost_weighted() {
        // Electric: 10% saved on a $100 baseline. Gas: 50% saved on a $10 baseline.
        let i = PeriodInput {
            period: "business_hours".to_string(),
            time_range: "08:00-18:00".to_string(),
            days: vec![],
            current_electric_kwh: 900.0,
            current_gas_therms: 5.0,
            baseline_electric_kwh: 1000.0,
            baseline_gas_therms: 10.0,
            electric_rate: 0.1,
            gas_rate: 1.0,
        };
        let m = calculate_period(&i);

        assert!((m.electric_efficiency_improvement - 10.0).abs() < EPS);
        assert!((m.gas_efficiency_improvement - 50.0).abs() < EPS);
        // ($10 + $5) / $110
        assert!((m.overall_efficiency_improvement - 15.0 / 110.0 * 100.0).abs() < EPS);
    }
}
