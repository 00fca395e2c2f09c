pub mod calculation_queries;

pub use calculation_queries::CalculationRow;
