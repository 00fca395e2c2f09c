//! Append-only storage for efficiency calculations.
//!
//! A store only ever appends and reads; building rollups are projections
//! computed from the log by the engine, never stored.

pub mod memory;
pub mod postgres;

use efficiency_core::EfficiencyCalculation;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Outcome of [`CalculationStore::append`].
#[derive(Debug, Clone, PartialEq)]
pub enum Appended {
    /// The calculation was new and is now in the log.
    Inserted(EfficiencyCalculation),
    /// A calculation with the same id was already stored; this is that one.
    Existing(EfficiencyCalculation),
}

impl Appended {
    pub fn is_new(&self) -> bool {
        matches!(self, Appended::Inserted(_))
    }

    pub fn into_calculation(self) -> EfficiencyCalculation {
        match self {
            Appended::Inserted(c) | Appended::Existing(c) => c,
        }
    }
}

/// One building's log, newest first.
pub type BuildingLog = (String, Vec<EfficiencyCalculation>);

#[async_trait::async_trait]
pub trait CalculationStore: Send + Sync {
    /// Atomically appends `calc` to its building's log. Appending an id that
    /// is already stored is a no-op and returns the stored calculation.
    async fn append(&self, calc: EfficiencyCalculation) -> Result<Appended, StoreError>;

    /// A building's calculations, newest first. Unknown buildings have an
    /// empty log.
    async fn building_log(&self, building_id: &str) -> Result<Vec<EfficiencyCalculation>, StoreError>;

    /// Calculations of a building that contain a period labelled `period`,
    /// newest first.
    async fn building_log_for_period(
        &self,
        building_id: &str,
        period: &str,
    ) -> Result<Vec<EfficiencyCalculation>, StoreError>;

    async fn get(&self, id: &str) -> Result<Option<EfficiencyCalculation>, StoreError>;

    /// Logs of every building whose id contains `search` (case-insensitive).
    async fn all_logs(&self, search: Option<&str>) -> Result<Vec<BuildingLog>, StoreError>;
}

/// Opens the store selected by `[store]` in the config.
pub async fn open(cfg: &crate::config::StoreConfig) -> anyhow::Result<std::sync::Arc<dyn CalculationStore>> {
    use crate::config::StoreKind;

    match cfg.kind {
        StoreKind::Memory => {
            tracing::info!("using in-memory calculation store");
            Ok(std::sync::Arc::new(MemoryStore::new()))
        }
        StoreKind::Postgres => {
            let uri = cfg
                .uri
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("store.uri is required for the postgres store"))?;
            let store = PostgresStore::connect(uri, cfg.max_connections).await?;
            tracing::info!(max_connections = cfg.max_connections, "connected to postgres calculation store");
            Ok(std::sync::Arc::new(store))
        }
    }
}
