use efficiency_core::{domain::CalculationRequest, validation::validate_request};

use crate::pipeline::{Envelope, PipelineError, Transform};

/// Rejects submissions the engine would refuse, so the sink only ever sees
/// computable requests. Rejections carry the record's origin.
pub fn validate_submission(
    env: Envelope<CalculationRequest>,
) -> Result<Envelope<CalculationRequest>, PipelineError> {
    validate_request(&env.payload)
        .map_err(|e| PipelineError::Transform(format!("{}: {e}", env.origin)))?;
    Ok(env)
}

#[derive(Clone, Default)]
pub struct SubmissionValidation;

#[async_trait::async_trait]
impl Transform<CalculationRequest> for SubmissionValidation {
    async fn apply(
        &self,
        input: Envelope<CalculationRequest>,
    ) -> Result<Envelope<CalculationRequest>, PipelineError> {
        match validate_submission(input) {
            Ok(env) => Ok(env),
            Err(e) => {
                metrics::counter!("efficiency_validation_rejected_total").increment(1);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use efficiency_core::PeriodInput;

    fn envelope(periods: Vec<PeriodInput>) -> Envelope<CalculationRequest> {
        Envelope::new(
            CalculationRequest {
                building_id: "bldg-1".to_string(),
                measure_name: "VFD install".to_string(),
                periods,
                calculation_timestamp: None,
            },
            "history.csv:4",
        )
    }

    fn period(electric_rate: f64) -> PeriodInput {
        PeriodInput {
            period: "business_hours".to_string(),
            time_range: "08:00-18:00".to_string(),
            days: vec![],
            current_electric_kwh: 10.0,
            current_gas_therms: 1.0,
            baseline_electric_kwh: 12.0,
            baseline_gas_therms: 1.0,
            electric_rate,
            gas_rate: 1.0,
        }
    }

    #[test]
    fn accepts_valid_submission() {
        assert!(validate_submission(envelope(vec![period(0.1)])).is_ok());
    }

    #[test]
    fn rejects_negative_rate_with_origin() {
        let res = validate_submission(envelope(vec![period(-0.1)]));
        assert!(matches!(
            res,
            Err(PipelineError::Transform(ref msg)) if msg.starts_with("history.csv:4") && msg.contains("electric_rate")
        ));
    }

    #[test]
    fn rejects_empty_periods() {
        let res = validate_submission(envelope(vec![]));
        assert!(matches!(res, Err(PipelineError::Transform(_))));
    }
}
