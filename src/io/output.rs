use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::error::{ErrorResult, TaskError};
use crate::models::{AnalysisReport, ValidationOutcome, Verdict};

/// A task's result, or the error that replaced it
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum TaskReport<T> {
    Completed(T),
    Failed(ErrorResult),
}

impl<T> From<std::result::Result<T, TaskError>> for TaskReport<T> {
    fn from(result: std::result::Result<T, TaskError>) -> Self {
        match result {
            Ok(value) => TaskReport::Completed(value),
            Err(e) => TaskReport::Failed(ErrorResult::from(e)),
        }
    }
}

/// Everything produced for one transcript
#[derive(Debug, Clone, Serialize)]
pub struct CallReport {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub transcript_id: String,
    pub formatted_transcript: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<TaskReport<AnalysisReport>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_validation: Option<TaskReport<ValidationOutcome>>,
}

impl CallReport {
    /// Write to a JSON file
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create file: {:?}", path))?;
        serde_json::to_writer_pretty(file, self).context("Failed to write JSON")?;
        Ok(())
    }
}

/// Console rendering of a report
pub fn render_summary(report: &CallReport) -> String {
    let mut output = String::new();

    let title = format!("Call Report: {}", report.transcript_id);
    output.push_str(&format!("{}\n{}\n", title, "=".repeat(title.len())));
    output.push_str(&format!(
        "Run {} at {}\n\n",
        report.run_id,
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    if let Some(analysis) = &report.analysis {
        push_heading(&mut output, "Task 1: Call Analysis");
        match analysis {
            TaskReport::Completed(analysis) => {
                output.push_str(&pretty(&analysis.document));
                output.push('\n');
                if !analysis.schema_issues.is_empty() {
                    output.push_str("Structure warnings:\n");
                    for issue in &analysis.schema_issues {
                        output.push_str(&format!("  - {}\n", issue));
                    }
                }
            }
            TaskReport::Failed(e) => {
                output.push_str(&format!("An error occurred in Task 1: {}\n", e.error));
            }
        }
        output.push('\n');
    }

    if let Some(validation) = &report.payment_validation {
        push_heading(&mut output, "Task 2: Payment Validation");
        match validation {
            TaskReport::Completed(outcome) => {
                output.push_str("Extracted tool arguments:\n");
                output.push_str(&pretty(&outcome.extracted_data));
                output.push('\n');
                let verdict = match outcome.verdict() {
                    Verdict::Correct => "Correct",
                    Verdict::Incorrect => "Incorrect",
                };
                output.push_str(&format!(
                    "API response (status {}): {}\n",
                    outcome.status_code, verdict
                ));
                output.push_str(&pretty(&outcome.api_response));
                output.push('\n');
            }
            TaskReport::Failed(e) if e.is_no_tool_call() => {
                output.push_str(
                    "No payment attempt was detected in this transcript, so the validation API was not called.\n",
                );
            }
            TaskReport::Failed(e) => {
                output.push_str(&format!("An error occurred in Task 2: {}\n", e.error));
            }
        }
    }

    output
}

fn push_heading(output: &mut String, heading: &str) {
    output.push_str(&format!("{}\n{}\n", heading, "-".repeat(heading.len())));
}

fn pretty<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}
