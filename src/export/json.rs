use super::{ExportResult, iso_timestamp};
use crate::summary::ProjectSummary;
use crate::task::Task;
use chrono::{DateTime, Utc};
use serde::Serialize;

pub const EXPORT_FORMAT_VERSION: &str = "1.0";

/// Versioned JSON envelope written by [`export_to_json`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportData<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_name: Option<&'a str>,
    pub tasks: &'a [Task],
    pub project_summary: &'a ProjectSummary,
    pub exported_at: String,
    pub version: &'static str,
}

impl<'a> ExportData<'a> {
    pub fn new(
        tasks: &'a [Task],
        summary: &'a ProjectSummary,
        project_name: Option<&'a str>,
        exported_at: DateTime<Utc>,
    ) -> Self {
        Self {
            project_name: project_name.filter(|name| !name.trim().is_empty()),
            tasks,
            project_summary: summary,
            exported_at: iso_timestamp(exported_at),
            version: EXPORT_FORMAT_VERSION,
        }
    }
}

pub fn export_to_json(
    tasks: &[Task],
    summary: &ProjectSummary,
    project_name: Option<&str>,
) -> ExportResult<String> {
    export_to_json_at(tasks, summary, project_name, Utc::now())
}

pub fn export_to_json_at(
    tasks: &[Task],
    summary: &ProjectSummary,
    project_name: Option<&str>,
    exported_at: DateTime<Utc>,
) -> ExportResult<String> {
    let data = ExportData::new(tasks, summary, project_name, exported_at);
    Ok(serde_json::to_string_pretty(&data)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimate::TaskEstimate;
    use crate::summary::summarize;
    use crate::units::TimeValue;
    use chrono::TimeZone;

    #[test]
    fn writes_versioned_envelope_with_stable_keys() {
        let tasks = vec![
            Task::create(
                Some("Design".into()),
                TaskEstimate::new(
                    TimeValue::hours(2.0),
                    TimeValue::hours(4.0),
                    TimeValue::hours(12.0),
                ),
                Some("task-1".into()),
            )
            .unwrap(),
        ];
        let at = Utc.with_ymd_and_hms(2025, 3, 7, 9, 30, 0).unwrap();
        let json = export_to_json_at(&tasks, &summarize(&tasks), Some("Launch"), at).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["version"], "1.0");
        assert_eq!(value["projectName"], "Launch");
        assert_eq!(value["exportedAt"], "2025-03-07T09:30:00.000Z");
        assert_eq!(value["tasks"][0]["id"], "task-1");
        assert_eq!(value["tasks"][0]["estimate"]["pessimistic"]["value"], 12.0);
        assert_eq!(value["tasks"][0]["estimate"]["pessimistic"]["unit"], "hours");
        assert_eq!(value["tasks"][0]["expectedDuration"], 5.0);
        assert_eq!(value["projectSummary"]["totalExpectedDuration"], 5.0);
        assert_eq!(value["projectSummary"]["tasks"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn omits_project_name_when_absent() {
        let summary = summarize(&[]);
        let json = export_to_json(&[], &summary, None).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(value.get("projectName").is_none());
        assert_eq!(value["tasks"], serde_json::json!([]));
        assert_eq!(value["projectSummary"]["totalVariance"], 0.0);
    }
}
