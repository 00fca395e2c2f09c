use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::{EfficiencyCalculation, PerformanceGrade};

/// Rollup of a building's calculation log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingEfficiencySummary {
    pub building_id: String,
    pub total_calculations: usize,
    pub latest_calculation: EfficiencyCalculation,
    pub best_performance_grade: PerformanceGrade,
    pub average_efficiency_improvement: f64,
    pub total_cost_savings: f64,
    /// Timestamp of the building's first calculation.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingCalculations {
    pub building_id: String,
    pub calculations: Vec<EfficiencyCalculation>,
    pub total_count: usize,
}

impl BuildingCalculations {
    pub fn new(building_id: impl Into<String>, calculations: Vec<EfficiencyCalculation>) -> Self {
        Self {
            building_id: building_id.into(),
            total_count: calculations.len(),
            calculations,
        }
    }
}

/// One page of the buildings listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllBuildingsSummary {
    pub buildings: Vec<BuildingEfficiencySummary>,
    pub total_buildings: usize,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
    pub has_next: bool,
    pub has_prev: bool,
}
