use std::cmp::Ordering;

use crate::domain::{BuildingEfficiencySummary, EfficiencyCalculation};

/// Recency order: calculation timestamp, then insertion time, then id.
pub fn recency(a: &EfficiencyCalculation, b: &EfficiencyCalculation) -> Ordering {
    a.calculation_timestamp
        .cmp(&b.calculation_timestamp)
        .then_with(|| a.created_at.cmp(&b.created_at))
        .then_with(|| a.id.cmp(&b.id))
}

/// Sorts a log newest first.
pub fn sort_newest_first(log: &mut [EfficiencyCalculation]) {
    log.sort_by(|a, b| recency(b, a));
}

/// Projects a building's calculation log into its rollup.
///
/// A pure fold: the result does not depend on the order of `log`, so callers
/// may pass the log in whatever order their store returns it. Returns `None`
/// for an empty log. Every calculation is expected to belong to `building_id`.
pub fn aggregate_building(
    building_id: &str,
    log: &[EfficiencyCalculation],
) -> Option<BuildingEfficiencySummary> {
    let first = log.first()?;

    let mut latest = first;
    let mut created_at = first.calculation_timestamp;
    let mut best_grade = first.summary.performance_grade;
    let mut improvement_sum = 0.0;
    let mut total_cost_savings = 0.0;

    for calc in log {
        if recency(calc, latest) == Ordering::Greater {
            latest = calc;
        }
        created_at = created_at.min(calc.calculation_timestamp);
        best_grade = best_grade.min(calc.summary.performance_grade);
        improvement_sum += calc.summary.overall_efficiency_improvement;
        total_cost_savings += calc.summary.total_cost_savings;
    }

    Some(BuildingEfficiencySummary {
        building_id: building_id.to_string(),
        total_calculations: log.len(),
        latest_calculation: latest.clone(),
        best_performance_grade: best_grade,
        average_efficiency_improvement: improvement_sum / log.len() as f64,
        total_cost_savings,
        created_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EfficiencySummary, PerformanceGrade};
    use time::{macros::datetime, OffsetDateTime};

    fn calc(id: &str, ts: OffsetDateTime, overall: f64, savings: f64) -> EfficiencyCalculation {
        EfficiencyCalculation {
            id: id.to_string(),
            building_id: "bldg-1".to_string(),
            measure_name: format!("measure {id}"),
            calculation_timestamp: ts,
            periods: vec![],
            summary: EfficiencySummary {
                total_electric_savings_kwh: 0.0,
                total_gas_savings_therms: 0.0,
                total_electric_cost_savings: savings,
                total_gas_cost_savings: 0.0,
                total_cost_savings: savings,
                average_electric_efficiency_improvement: overall,
                average_gas_efficiency_improvement: 0.0,
                overall_efficiency_improvement: overall,
                performance_grade: PerformanceGrade::from_improvement(overall),
            },
            created_at: ts,
        }
    }

    fn log() -> Vec<EfficiencyCalculation> {
        vec![
            calc("c1", datetime!(2024-01-10 09:00:00 UTC), 6.0, 100.0),
            calc("c2", datetime!(2024-03-05 09:00:00 UTC), -2.0, -20.0),
            calc("c3", datetime!(2024-02-01 09:00:00 UTC), 16.0, 300.0),
        ]
    }

    #[test]
    fn empty_log_has_no_rollup() {
        assert!(aggregate_building("bldg-1", &[]).is_none());
    }

    #[test]
    fn rollup_folds_the_log() {
        let s = aggregate_building("bldg-1", &log()).unwrap();

        assert_eq!(s.building_id, "bldg-1");
        assert_eq!(s.total_calculations, 3);
        assert_eq!(s.latest_calculation.id, "c2");
        assert_eq!(s.best_performance_grade, PerformanceGrade::A);
        assert!((s.average_efficiency_improvement - 20.0 / 3.0).abs() < 1e-9);
        assert!((s.total_cost_savings - 380.0).abs() < 1e-9);
        assert_eq!(s.created_at, datetime!(2024-01-10 09:00:00 UTC));
    }

    #[test]
    fn rollup_is_order_independent() {
        let mut entries = log();
        let expected = aggregate_building("bldg-1", &entries).unwrap();

        entries.reverse();
        let reversed = aggregate_building("bldg-1", &entries).unwrap();
        entries.rotate_left(1);
        let rotated = aggregate_building("bldg-1", &entries).unwrap();

        for s in [reversed, rotated] {
            assert_eq!(s.best_performance_grade, expected.best_performance_grade);
            assert_eq!(s.latest_calculation.id, expected.latest_calculation.id);
            assert_eq!(s.created_at, expected.created_at);
            assert_eq!(s.total_calculations, expected.total_calculations);
            assert!((s.total_cost_savings - expected.total_cost_savings).abs() < 1e-9);
        }
    }

    #[test]
    fn timestamp_ties_break_on_id() {
        let ts = datetime!(2024-05-01 00:00:00 UTC);
        let entries = vec![calc("aaa", ts, 1.0, 1.0), calc("bbb", ts, 1.0, 1.0)];
        let s = aggregate_building("bldg-1", &entries).unwrap();
        assert_eq!(s.latest_calculation.id, "bbb");

        let mut sorted = entries.clone();
        sort_newest_first(&mut sorted);
        assert_eq!(sorted[0].id, "bbb");
    }
}
