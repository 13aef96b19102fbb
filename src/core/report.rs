use crate::core::{CheckOutcome, Suggestion};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    pub passed: usize,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportOutputs {
    pub checklist: String,
    pub suggestions: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub schema_version: String,
    pub tool_version: String,
    pub url: String,
    pub generated_at: String,
    pub summary: ReportSummary,
    pub checks: Vec<CheckOutcome>,
    pub outputs: ReportOutputs,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<Suggestion>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
}
