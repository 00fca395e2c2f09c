pub mod db;
pub mod domain;
pub mod engine;
pub mod validation;

pub use domain::{
    BuildingEfficiencySummary, EfficiencyCalculation, EfficiencySummary, PerformanceGrade,
    PeriodInput, PeriodMetrics,
};
pub use validation::ValidationError;
