use efficiency_core::{db::calculation_queries as queries, EfficiencyCalculation};
use sqlx::postgres::{PgPool, PgPoolOptions};

use super::{Appended, BuildingLog, CalculationStore, StoreError};

/// Postgres-backed store over the `efficiency_calculations` table.
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects and creates the table if it does not exist yet.
    pub async fn connect(uri: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(uri)
            .await?;
        queries::ensure_schema(&pool).await?;
        Ok(Self::new(pool))
    }
}

#[async_trait::async_trait]
impl CalculationStore for PostgresStore {
    async fn append(&self, calc: EfficiencyCalculation) -> Result<Appended, StoreError> {
        if queries::insert_calculation(&self.pool, &calc).await? {
            return Ok(Appended::Inserted(calc));
        }

        tracing::debug!(calculation_id = %calc.id, "calculation already stored");
        let existing = queries::calculation_by_id(&self.pool, &calc.id).await?;
        Ok(Appended::Existing(existing.unwrap_or(calc)))
    }

    async fn building_log(&self, building_id: &str) -> Result<Vec<EfficiencyCalculation>, StoreError> {
        Ok(queries::building_log(&self.pool, building_id).await?)
    }

    async fn building_log_for_period(
        &self,
        building_id: &str,
        period: &str,
    ) -> Result<Vec<EfficiencyCalculation>, StoreError> {
        Ok(queries::building_log_for_period(&self.pool, building_id, period).await?)
    }

    async fn get(&self, id: &str) -> Result<Option<EfficiencyCalculation>, StoreError> {
        Ok(queries::calculation_by_id(&self.pool, id).await?)
    }

    async fn all_logs(&self, search: Option<&str>) -> Result<Vec<BuildingLog>, StoreError> {
        let rows = queries::calculations_matching(&self.pool, search).await?;

        // Rows arrive ordered by building, so each building is one contiguous run.
        let mut logs: Vec<BuildingLog> = Vec::new();
        for calc in rows {
            match logs.last_mut() {
                Some((building_id, log)) if *building_id == calc.building_id => log.push(calc),
                _ => logs.push((calc.building_id.clone(), vec![calc])),
            }
        }
        Ok(logs)
    }
}
