use std::collections::HashMap;

use efficiency_core::{
    engine::{matches_search, sort_newest_first},
    EfficiencyCalculation,
};
use tokio::sync::RwLock;

use super::{Appended, BuildingLog, CalculationStore, StoreError};

#[derive(Default)]
struct Logs {
    by_building: HashMap<String, Vec<EfficiencyCalculation>>,
    building_of: HashMap<String, String>,
}

/// In-process store. Appends hold the write lock only for the push itself.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Logs>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_first(mut log: Vec<EfficiencyCalculation>) -> Vec<EfficiencyCalculation> {
    sort_newest_first(&mut log);
    log
}

#[async_trait::async_trait]
impl CalculationStore for MemoryStore {
    async fn append(&self, calc: EfficiencyCalculation) -> Result<Appended, StoreError> {
        let mut logs = self.inner.write().await;

        if let Some(building_id) = logs.building_of.get(&calc.id) {
            let existing = logs
                .by_building
                .get(building_id)
                .and_then(|log| log.iter().find(|c| c.id == calc.id));
            if let Some(existing) = existing {
                tracing::debug!(calculation_id = %calc.id, "calculation already stored");
                return Ok(Appended::Existing(existing.clone()));
            }
        }

        logs.building_of.insert(calc.id.clone(), calc.building_id.clone());
        logs.by_building
            .entry(calc.building_id.clone())
            .or_default()
            .push(calc.clone());

        Ok(Appended::Inserted(calc))
    }

    async fn building_log(&self, building_id: &str) -> Result<Vec<EfficiencyCalculation>, StoreError> {
        let log = {
            let logs = self.inner.read().await;
            logs.by_building.get(building_id).cloned().unwrap_or_default()
        };
        Ok(newest_first(log))
    }

    async fn building_log_for_period(
        &self,
        building_id: &str,
        period: &str,
    ) -> Result<Vec<EfficiencyCalculation>, StoreError> {
        let log: Vec<_> = {
            let logs = self.inner.read().await;
            logs.by_building
                .get(building_id)
                .map(|log| log.iter().filter(|c| c.has_period(period)).cloned().collect())
                .unwrap_or_default()
        };
        Ok(newest_first(log))
    }

    async fn get(&self, id: &str) -> Result<Option<EfficiencyCalculation>, StoreError> {
        let logs = self.inner.read().await;
        let found = logs
            .building_of
            .get(id)
            .and_then(|b| logs.by_building.get(b))
            .and_then(|log| log.iter().find(|c| c.id == id))
            .cloned();
        Ok(found)
    }

    async fn all_logs(&self, search: Option<&str>) -> Result<Vec<BuildingLog>, StoreError> {
        let matching: Vec<BuildingLog> = {
            let logs = self.inner.read().await;
            logs.by_building
                .iter()
                .filter(|(building_id, _)| matches_search(building_id, search))
                .map(|(building_id, log)| (building_id.clone(), log.clone()))
                .collect()
        };

        Ok(matching
            .into_iter()
            .map(|(building_id, log)| (building_id, newest_first(log)))
            .collect())
    }
}
