use crate::estimate::{EstimateValidationError, TaskEstimate, validate_estimate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PertError {
    #[error("invalid estimate: {0}")]
    InvalidEstimate(#[from] EstimateValidationError),
}

/// Derived statistics for one estimate, all in hours (variance in hours²).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PertResult {
    pub expected_duration: f64,
    pub standard_deviation: f64,
    pub variance: f64,
}

/// Three-point PERT (beta approximation) for a validated estimate.
pub fn calculate(estimate: &TaskEstimate) -> Result<PertResult, PertError> {
    if let Err(err) = validate_estimate(estimate) {
        tracing::debug!(error = %err, "rejecting estimate");
        return Err(err.into());
    }

    let (optimistic, nominal, pessimistic) = estimate.in_hours();
    let expected_duration = (optimistic + 4.0 * nominal + pessimistic) / 6.0;
    let standard_deviation = (pessimistic - optimistic) / 6.0;
    Ok(PertResult {
        expected_duration,
        standard_deviation,
        variance: standard_deviation * standard_deviation,
    })
}
