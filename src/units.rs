use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Unit a duration magnitude is expressed in.
///
/// Days and weeks follow the working-time convention (8 hour days, 5 day
/// weeks), not calendar time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    Minutes,
    Hours,
    Days,
    Weeks,
}

impl TimeUnit {
    pub const ALL: [TimeUnit; 4] = [
        TimeUnit::Minutes,
        TimeUnit::Hours,
        TimeUnit::Days,
        TimeUnit::Weeks,
    ];

    /// Number of hours in one of this unit.
    pub fn hours_factor(self) -> f64 {
        match self {
            TimeUnit::Minutes => 1.0 / 60.0,
            TimeUnit::Hours => 1.0,
            TimeUnit::Days => 8.0,
            TimeUnit::Weeks => 40.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TimeUnit::Minutes => "minutes",
            TimeUnit::Hours => "hours",
            TimeUnit::Days => "days",
            TimeUnit::Weeks => "weeks",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TimeUnit::Minutes => "Minutes",
            TimeUnit::Hours => "Hours",
            TimeUnit::Days => "Days",
            TimeUnit::Weeks => "Weeks",
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown time unit '{0}' (expected minutes, hours, days or weeks)")]
pub struct UnknownTimeUnit(pub String);

impl FromStr for TimeUnit {
    type Err = UnknownTimeUnit;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "minutes" => Ok(TimeUnit::Minutes),
            "hours" => Ok(TimeUnit::Hours),
            "days" => Ok(TimeUnit::Days),
            "weeks" => Ok(TimeUnit::Weeks),
            _ => Err(UnknownTimeUnit(s.to_string())),
        }
    }
}

/// A magnitude tagged with its unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeValue {
    #[serde(rename = "value")]
    pub magnitude: f64,
    pub unit: TimeUnit,
}

impl TimeValue {
    pub fn new(magnitude: f64, unit: TimeUnit) -> Self {
        Self { magnitude, unit }
    }

    pub fn hours(magnitude: f64) -> Self {
        Self::new(magnitude, TimeUnit::Hours)
    }

    pub fn to_hours(&self) -> f64 {
        to_hours(self)
    }

    pub fn convert_to(&self, unit: TimeUnit) -> TimeValue {
        TimeValue::new(from_hours(self.to_hours(), unit), unit)
    }
}

pub fn to_hours(value: &TimeValue) -> f64 {
    value.magnitude * value.unit.hours_factor()
}

pub fn from_hours(hours: f64, unit: TimeUnit) -> f64 {
    hours / unit.hours_factor()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn converts_each_unit_to_hours() {
        assert!(approx(to_hours(&TimeValue::new(90.0, TimeUnit::Minutes)), 1.5));
        assert!(approx(to_hours(&TimeValue::new(3.0, TimeUnit::Hours)), 3.0));
        assert!(approx(to_hours(&TimeValue::new(2.0, TimeUnit::Days)), 16.0));
        assert!(approx(to_hours(&TimeValue::new(1.5, TimeUnit::Weeks)), 60.0));
    }

    #[test]
    fn from_hours_uses_working_time() {
        assert_eq!(from_hours(40.0, TimeUnit::Weeks), 1.0);
        assert_eq!(from_hours(8.0, TimeUnit::Days), 1.0);
        assert!(approx(from_hours(1.0, TimeUnit::Minutes), 60.0));
        assert!(approx(from_hours(1.0 / 60.0, TimeUnit::Minutes), 1.0));
    }

    #[test]
    fn round_trips_through_hours_for_every_unit() {
        for unit in TimeUnit::ALL {
            for magnitude in [0.25, 1.0, 7.5, 123.456] {
                let hours = to_hours(&TimeValue::new(magnitude, unit));
                assert!(
                    approx(from_hours(hours, unit), magnitude),
                    "{magnitude} {unit} did not survive the round trip"
                );
            }
        }
    }

    #[test]
    fn parses_unit_names_case_insensitively() {
        assert_eq!(" Hours ".parse::<TimeUnit>(), Ok(TimeUnit::Hours));
        assert_eq!("WEEKS".parse::<TimeUnit>(), Ok(TimeUnit::Weeks));
        assert!("fortnights".parse::<TimeUnit>().is_err());
        assert!("".parse::<TimeUnit>().is_err());
    }

    #[test]
    fn unknown_unit_error_names_the_token() {
        let err = "fortnights".parse::<TimeUnit>().unwrap_err();
        assert_eq!(err, UnknownTimeUnit("fortnights".into()));
        assert_eq!(
            err.to_string(),
            "unknown time unit 'fortnights' (expected minutes, hours, days or weeks)"
        );
        let _: Box<dyn std::error::Error> = Box::new(err);
    }

    #[test]
    fn serializes_with_value_key_and_lowercase_unit() {
        let json = serde_json::to_value(TimeValue::new(2.0, TimeUnit::Days)).unwrap();
        assert_eq!(json, serde_json::json!({ "value": 2.0, "unit": "days" }));
    }
}
