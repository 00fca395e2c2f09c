use std::fmt;

use serde::{Deserialize, Serialize};

/// Letter grade for an overall efficiency improvement.
///
/// Variants are declared best first, so `Ord` ranks `A < B < ... < F` and the
/// best of a set is its minimum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PerformanceGrade {
    A,
    B,
    C,
    D,
    F,
}

impl PerformanceGrade {
    /// Grade bands over the overall improvement percentage, closed at the
    /// lower bound: `[15, inf) A`, `[10, 15) B`, `[5, 10) C`, `[0, 5) D`,
    /// anything below zero `F`.
    pub fn from_improvement(improvement_pct: f64) -> Self {
        if improvement_pct >= 15.0 {
            Self::A
        } else if improvement_pct >= 10.0 {
            Self::B
        } else if improvement_pct >= 5.0 {
            Self::C
        } else if improvement_pct >= 0.0 {
            Self::D
        } else {
            Self::F
        }
    }

    /// Dashboard wording for the band.
    pub fn label(self) -> &'static str {
        match self {
            Self::A => "Excellent",
            Self::B => "Good",
            Self::C => "Fair",
            Self::D => "Needs Improvement",
            Self::F => "Poor",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
            Self::F => "F",
        }
    }
}

impl fmt::Display for PerformanceGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Aggregate over all period metrics of one calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EfficiencySummary {
    pub total_electric_savings_kwh: f64,
    pub total_gas_savings_therms: f64,
    pub total_electric_cost_savings: f64,
    pub total_gas_cost_savings: f64,
    pub total_cost_savings: f64,
    pub average_electric_efficiency_improvement: f64,
    pub average_gas_efficiency_improvement: f64,
    pub overall_efficiency_improvement: f64,
    pub performance_grade: PerformanceGrade,
}
