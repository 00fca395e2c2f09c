use serde::{Deserialize, Serialize};

/// Raw consumption readings for one operational period of a building.
///
/// Consumption is in kWh (electric) and therms (gas); rates are dollars per
/// unit. Validation guarantees every numeric field is finite and non-negative
/// before the value reaches the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodInput {
    pub period: String,
    pub time_range: String,
    #[serde(default)]
    pub days: Vec<String>,
    pub current_electric_kwh: f64,
    pub current_gas_therms: f64,
    pub baseline_electric_kwh: f64,
    pub baseline_gas_therms: f64,
    pub electric_rate: f64,
    pub gas_rate: f64,
}

impl PeriodInput {
    /// Baseline consumption priced at the period's rates.
    pub fn baseline_cost(&self) -> f64 {
        self.baseline_electric_kwh * self.electric_rate + self.baseline_gas_therms * self.gas_rate
    }
}

/// Savings and improvements derived from a single [`PeriodInput`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodMetrics {
    pub period: String,
    pub time_range: String,
    pub days: Vec<String>,

    pub electric_savings_kwh: f64,
    pub gas_savings_therms: f64,

    pub electric_cost_savings: f64,
    pub gas_cost_savings: f64,
    pub total_cost_savings: f64,

    /// Percentages; negative when consumption went up.
    pub electric_efficiency_improvement: f64,
    pub gas_efficiency_improvement: f64,
    pub overall_efficiency_improvement: f64,

    /// Denominator of the cost-weighted overall figure, kept so summaries can
    /// be recomputed from stored metrics.
    #[serde(default)]
    pub baseline_cost: f64,
}
