use std::sync::Arc;

use efficiency_core::{
    domain::{AllBuildingsSummary, BuildingCalculations, CalculationRequest},
    engine, BuildingEfficiencySummary, EfficiencyCalculation,
};
use time::OffsetDateTime;

use crate::{
    error::{ApiError, Result},
    store::CalculationStore,
};

/// Orchestrates validation, the engine and the calculation store.
///
/// Rollups are rebuilt from the stored log on every read.
#[derive(Clone)]
pub struct EfficiencyService {
    store: Arc<dyn CalculationStore>,
}

impl EfficiencyService {
    pub fn new(store: Arc<dyn CalculationStore>) -> Self {
        Self { store }
    }

    pub async fn calculate(&self, req: &CalculationRequest) -> Result<EfficiencyCalculation> {
        let calc = engine::calculate(req, OffsetDateTime::now_utc())?;
        let appended = self.store.append(calc).await?;
        let is_new = appended.is_new();
        let stored = appended.into_calculation();

        if is_new {
            metrics::counter!("efficiency_calculations_total").increment(1);
            tracing::info!(
                building_id = %stored.building_id,
                calculation_id = %stored.id,
                grade = %stored.summary.performance_grade,
                periods = stored.periods.len(),
                "efficiency calculation stored"
            );
        } else {
            tracing::debug!(calculation_id = %stored.id, "resubmitted calculation already stored");
        }

        Ok(stored)
    }

    pub async fn list_buildings(
        &self,
        page: u32,
        limit: u32,
        search: Option<&str>,
    ) -> Result<AllBuildingsSummary> {
        efficiency_core::validation::validate_page(page, limit)?;

        let summaries: Vec<_> = self
            .store
            .all_logs(search)
            .await?
            .into_iter()
            .filter_map(|(building_id, log)| engine::aggregate_building(&building_id, &log))
            .collect();

        Ok(engine::paginate(summaries, page, limit, search)?)
    }

    pub async fn building_summary(&self, building_id: &str) -> Result<BuildingEfficiencySummary> {
        let log = self.store.building_log(building_id).await?;
        engine::aggregate_building(building_id, &log).ok_or_else(|| {
            ApiError::NotFound(format!("No efficiency calculations found for building {building_id}"))
        })
    }

    pub async fn building_calculations(&self, building_id: &str) -> Result<BuildingCalculations> {
        let log = self.store.building_log(building_id).await?;
        Ok(BuildingCalculations::new(building_id, log))
    }

    pub async fn building_calculations_by_period(
        &self,
        building_id: &str,
        period: &str,
    ) -> Result<BuildingCalculations> {
        let log = self.store.building_log_for_period(building_id, period).await?;
        Ok(BuildingCalculations::new(building_id, log))
    }

    pub async fn latest_calculation(&self, building_id: &str) -> Result<EfficiencyCalculation> {
        let log = self.store.building_log(building_id).await?;
        log.into_iter().next().ok_or_else(|| {
            ApiError::NotFound(format!("No efficiency calculations found for building {building_id}"))
        })
    }

    pub async fn calculation(&self, id: &str) -> Result<EfficiencyCalculation> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Efficiency calculation {id} not found")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use efficiency_core::{PerformanceGrade, PeriodInput, ValidationError};
    use time::macros::datetime;

    fn service() -> EfficiencyService {
        EfficiencyService::new(Arc::new(MemoryStore::new()))
    }

    fn request(building_id: &str, current_kwh: f64, ts: OffsetDateTime) -> CalculationRequest {
        CalculationRequest {
            building_id: building_id.to_string(),
            measure_name: "Retro-commissioning".to_string(),
            periods: vec![PeriodInput {
                period: "business_hours".to_string(),
                time_range: "08:00-18:00".to_string(),
                days: vec!["Monday".to_string(), "Tuesday".to_string()],
                current_electric_kwh: current_kwh,
                current_gas_therms: 0.0,
                baseline_electric_kwh: 1000.0,
                baseline_gas_therms: 0.0,
                electric_rate: 0.12,
                gas_rate: 0.0,
            }],
            calculation_timestamp: Some(ts),
        }
    }

    #[tokio::test]
    async fn rejected_submission_is_not_stored() {
        let svc = service();
        let mut req = request("bldg-1", 800.0, datetime!(2024-01-01 00:00:00 UTC));
        req.periods.clear();

        let err = svc.calculate(&req).await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(ValidationError::NoPeriods)));
        assert_eq!(svc.building_calculations("bldg-1").await.unwrap().total_count, 0);
    }

    #[tokio::test]
    async fn summary_is_recomputed_after_each_append() {
        let svc = service();
        svc.calculate(&request("bldg-1", 990.0, datetime!(2024-01-01 00:00:00 UTC)))
            .await
            .unwrap();

        let before = svc.building_summary("bldg-1").await.unwrap();
        assert_eq!(before.total_calculations, 1);
        assert_eq!(before.best_performance_grade, PerformanceGrade::D);

        svc.calculate(&request("bldg-1", 800.0, datetime!(2024-02-01 00:00:00 UTC)))
            .await
            .unwrap();

        let after = svc.building_summary("bldg-1").await.unwrap();
        assert_eq!(after.total_calculations, 2);
        assert_eq!(after.best_performance_grade, PerformanceGrade::A);
        assert_eq!(after.created_at, datetime!(2024-01-01 00:00:00 UTC));
        assert!((after.total_cost_savings - (1.2 + 24.0)).abs() < 1e-9);
    }

    #[tokio::test]
    async fn resubmission_returns_the_stored_calculation() {
        let svc = service();
        let req = request("bldg-1", 900.0, datetime!(2024-01-01 00:00:00 UTC));

        let first = svc.calculate(&req).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let second = svc.calculate(&req).await.unwrap();

        assert_eq!(second, first);
        assert_eq!(svc.building_calculations("bldg-1").await.unwrap().total_count, 1);
    }

    #[tokio::test]
    async fn unknown_building_summary_is_not_found() {
        let err = service().building_summary("nope").await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
        let err = service().latest_calculation("nope").await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn latest_and_lookup_by_id() {
        let svc = service();
        let old = svc
            .calculate(&request("bldg-1", 900.0, datetime!(2024-01-01 00:00:00 UTC)))
            .await
            .unwrap();
        let new = svc
            .calculate(&request("bldg-1", 850.0, datetime!(2024-05-01 00:00:00 UTC)))
            .await
            .unwrap();

        assert_eq!(svc.latest_calculation("bldg-1").await.unwrap().id, new.id);
        assert_eq!(svc.calculation(&old.id).await.unwrap(), old);
        assert!(matches!(svc.calculation("missing").await, Err(ApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn listing_with_no_match_is_empty() {
        let svc = service();
        svc.calculate(&request("bldg-1", 900.0, datetime!(2024-01-01 00:00:00 UTC)))
            .await
            .unwrap();

        let page = svc.list_buildings(1, 10, Some("zzz-no-match")).await.unwrap();
        assert!(page.buildings.is_empty());
        assert_eq!(page.total_buildings, 0);
        assert_eq!(page.total_pages, 0);

        let page = svc.list_buildings(1, 10, None).await.unwrap();
        assert_eq!(page.total_buildings, 1);
        assert_eq!(page.buildings[0].building_id, "bldg-1");
    }
}
