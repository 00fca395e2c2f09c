pub mod building;
pub mod calculation;
pub mod period;
pub mod summary;

pub use building::{AllBuildingsSummary, BuildingCalculations, BuildingEfficiencySummary};
pub use calculation::{CalculationRequest, EfficiencyCalculation};
pub use period::{PeriodInput, PeriodMetrics};
pub use summary::{EfficiencySummary, PerformanceGrade};
