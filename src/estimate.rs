use crate::units::TimeValue;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Three-point duration estimate for a single task.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TaskEstimate {
    pub optimistic: TimeValue,
    pub nominal: TimeValue,
    pub pessimistic: TimeValue,
}

impl TaskEstimate {
    pub fn new(optimistic: TimeValue, nominal: TimeValue, pessimistic: TimeValue) -> Self {
        Self {
            optimistic,
            nominal,
            pessimistic,
        }
    }

    /// All three points expressed in hours as `(optimistic, nominal, pessimistic)`.
    pub fn in_hours(&self) -> (f64, f64, f64) {
        (
            self.optimistic.to_hours(),
            self.nominal.to_hours(),
            self.pessimistic.to_hours(),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EstimateValidationError {
    #[error("{field} estimate is not a finite number")]
    NotFinite { field: &'static str },
    #[error("{field} estimate must be greater than zero (got {hours} hours)")]
    NonPositive { field: &'static str, hours: f64 },
    #[error("optimistic estimate ({optimistic} hours) exceeds nominal estimate ({nominal} hours)")]
    OptimisticExceedsNominal { optimistic: f64, nominal: f64 },
    #[error("nominal estimate ({nominal} hours) exceeds pessimistic estimate ({pessimistic} hours)")]
    NominalExceedsPessimistic { nominal: f64, pessimistic: f64 },
    #[error("estimate is too large to calculate (expected duration overflows)")]
    OutOfRange,
}

/// Checks `0 < optimistic <= nominal <= pessimistic` after converting to hours,
/// and that the weighted PERT sum stays finite.
pub fn validate_estimate(estimate: &TaskEstimate) -> Result<(), EstimateValidationError> {
    let (optimistic, nominal, pessimistic) = estimate.in_hours();
    let points = [
        ("optimistic", optimistic),
        ("nominal", nominal),
        ("pessimistic", pessimistic),
    ];

    for (field, hours) in points {
        if !hours.is_finite() {
            return Err(EstimateValidationError::NotFinite { field });
        }
    }
    for (field, hours) in points {
        if hours <= 0.0 {
            return Err(EstimateValidationError::NonPositive { field, hours });
        }
    }
    if optimistic > nominal {
        return Err(EstimateValidationError::OptimisticExceedsNominal {
            optimistic,
            nominal,
        });
    }
    if nominal > pessimistic {
        return Err(EstimateValidationError::NominalExceedsPessimistic {
            nominal,
            pessimistic,
        });
    }
    if !(optimistic + 4.0 * nominal + pessimistic).is_finite() {
        return Err(EstimateValidationError::OutOfRange);
    }
    Ok(())
}

pub fn is_valid_estimate(estimate: &TaskEstimate) -> bool {
    validate_estimate(estimate).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::{TimeUnit, TimeValue};

    fn hours(o: f64, n: f64, p: f64) -> TaskEstimate {
        TaskEstimate::new(TimeValue::hours(o), TimeValue::hours(n), TimeValue::hours(p))
    }

    #[test]
    fn accepts_ordered_and_degenerate_triples() {
        assert!(is_valid_estimate(&hours(1.0, 2.0, 3.0)));
        assert!(is_valid_estimate(&hours(4.0, 4.0, 4.0)));
        assert!(is_valid_estimate(&hours(1.0, 1.0, 9.0)));
    }

    #[test]
    fn rejects_out_of_order_points() {
        assert_eq!(
            validate_estimate(&hours(5.0, 3.0, 8.0)),
            Err(EstimateValidationError::OptimisticExceedsNominal {
                optimistic: 5.0,
                nominal: 3.0
            })
        );
        assert!(matches!(
            validate_estimate(&hours(1.0, 9.0, 8.0)),
            Err(EstimateValidationError::NominalExceedsPessimistic { .. })
        ));
    }

    #[test]
    fn rejects_zero_negative_and_non_finite_points() {
        assert!(!is_valid_estimate(&hours(0.0, 1.0, 2.0)));
        assert!(!is_valid_estimate(&hours(-1.0, 1.0, 2.0)));
        assert!(!is_valid_estimate(&hours(1.0, 2.0, f64::INFINITY)));
        assert!(!is_valid_estimate(&hours(f64::NAN, 2.0, 3.0)));
    }

    #[test]
    fn rejects_points_whose_weighted_sum_overflows() {
        assert_eq!(
            validate_estimate(&hours(1e308, 1e308, 1e308)),
            Err(EstimateValidationError::OutOfRange)
        );
        assert!(is_valid_estimate(&hours(1e300, 1e300, 1e300)));
    }

    #[test]
    fn compares_points_after_unit_conversion() {
        // 1 day (8h) <= 10 hours <= 1 week (40h)
        let mixed = TaskEstimate::new(
            TimeValue::new(1.0, TimeUnit::Days),
            TimeValue::hours(10.0),
            TimeValue::new(1.0, TimeUnit::Weeks),
        );
        assert!(is_valid_estimate(&mixed));

        // 120 minutes (2h) is more than 1 hour
        let inverted = TaskEstimate::new(
            TimeValue::new(120.0, TimeUnit::Minutes),
            TimeValue::hours(1.0),
            TimeValue::hours(3.0),
        );
        assert!(!is_valid_estimate(&inverted));
    }
}
