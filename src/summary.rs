use crate::task::Task;
use crate::units::{TimeUnit, from_hours};
use serde::Serialize;

/// Project level totals, recomputed from a task collection on demand.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSummary {
    pub total_expected_duration: f64,
    pub total_standard_deviation: f64,
    pub total_variance: f64,
    pub tasks: Vec<Task>,
}

impl ProjectSummary {
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn expected_duration_in(&self, unit: TimeUnit) -> f64 {
        from_hours(self.total_expected_duration, unit)
    }

    pub fn standard_deviation_in(&self, unit: TimeUnit) -> f64 {
        from_hours(self.total_standard_deviation, unit)
    }
}

/// Sums expected durations and variances over `tasks`, left to right.
///
/// Task durations are modeled as independent random variables, so the
/// project standard deviation is the square root of the summed variances.
pub fn summarize(tasks: &[Task]) -> ProjectSummary {
    let (total_expected_duration, total_variance) =
        tasks.iter().fold((0.0, 0.0), |(expected, variance), task| {
            (
                expected + task.expected_duration(),
                variance + task.variance(),
            )
        });

    ProjectSummary {
        total_expected_duration,
        total_standard_deviation: total_variance.sqrt(),
        total_variance,
        tasks: tasks.to_vec(),
    }
}
