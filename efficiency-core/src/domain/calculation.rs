use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::{EfficiencySummary, PeriodInput, PeriodMetrics};

/// A submission: one efficiency measure applied to one building.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationRequest {
    pub building_id: String,
    pub measure_name: String,
    pub periods: Vec<PeriodInput>,
    /// Historical submissions (backfill) carry their own timestamp; live
    /// submissions are stamped on arrival.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub calculation_timestamp: Option<OffsetDateTime>,
}

/// A stored, immutable calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EfficiencyCalculation {
    pub id: String,
    pub building_id: String,
    pub measure_name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub calculation_timestamp: OffsetDateTime,
    pub periods: Vec<PeriodMetrics>,
    pub summary: EfficiencySummary,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl EfficiencyCalculation {
    pub fn has_period(&self, period: &str) -> bool {
        self.periods.iter().any(|p| p.period == period)
    }
}

fn hash_str(hasher: &mut blake3::Hasher, s: &str) {
    let len = s.len() as u32;
    hasher.update(&len.to_le_bytes());
    hasher.update(s.as_bytes());
}

fn hash_f64(hasher: &mut blake3::Hasher, v: f64) {
    hasher.update(&v.to_bits().to_le_bytes());
}

/// Content-derived calculation id: 24 hex chars of a blake3 digest over the
/// submission. Identical submissions map to the same id, which makes replays
/// idempotent at the store.
pub fn calculation_id(
    building_id: &str,
    measure_name: &str,
    calculation_timestamp: OffsetDateTime,
    periods: &[PeriodInput],
) -> String {
    let mut h = blake3::Hasher::new();
    hash_str(&mut h, building_id);
    hash_str(&mut h, measure_name);
    h.update(&calculation_timestamp.unix_timestamp_nanos().to_le_bytes());
    h.update(&(periods.len() as u32).to_le_bytes());
    for p in periods {
        hash_str(&mut h, &p.period);
        hash_str(&mut h, &p.time_range);
        h.update(&(p.days.len() as u32).to_le_bytes());
        for day in &p.days {
            hash_str(&mut h, day);
        }
        hash_f64(&mut h, p.current_electric_kwh);
        hash_f64(&mut h, p.current_gas_therms);
        hash_f64(&mut h, p.baseline_electric_kwh);
        hash_f64(&mut h, p.baseline_gas_therms);
        hash_f64(&mut h, p.electric_rate);
        hash_f64(&mut h, p.gas_rate);
    }
    let mut id = h.finalize().to_hex().to_string();
    id.truncate(24);
    id
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn period(kwh: f64) -> PeriodInput {
        PeriodInput {
            period: "business_hours".to_string(),
            time_range: "08:00-18:00".to_string(),
            days: vec!["Monday".to_string(), "Tuesday".to_string()],
            current_electric_kwh: kwh,
            current_gas_therms: 10.0,
            baseline_electric_kwh: 1000.0,
            baseline_gas_therms: 12.0,
            electric_rate: 0.12,
            gas_rate: 1.1,
        }
    }

    #[test]
    fn calculation_id_is_deterministic_and_content_sensitive() {
        let ts = datetime!(2024-03-01 12:00:00 UTC);
        let a = calculation_id("bldg-1", "LED retrofit", ts, &[period(800.0)]);
        let b = calculation_id("bldg-1", "LED retrofit", ts, &[period(800.0)]);
        let c = calculation_id("bldg-1", "LED retrofit", ts, &[period(801.0)]);
        let d = calculation_id("bldg-2", "LED retrofit", ts, &[period(800.0)]);

        assert_eq!(a.len(), 24);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, d);
    }

    #[test]
    fn calculation_request_timestamp_is_optional() {
        let json = r#"{
            "building_id": "bldg-1",
            "measure_name": "HVAC tune-up",
            "periods": []
        }"#;
        let req: CalculationRequest = serde_json::from_str(json).unwrap();
        assert!(req.calculation_timestamp.is_none());

        let json = r#"{
            "building_id": "bldg-1",
            "measure_name": "HVAC tune-up",
            "periods": [],
            "calculation_timestamp": "2024-03-01T12:00:00Z"
        }"#;
        let req: CalculationRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.calculation_timestamp, Some(datetime!(2024-03-01 12:00:00 UTC)));
    }
}
