use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::core::{CheckOutcome, CheckResults};

#[derive(Debug, Serialize)]
struct RunLog<'a> {
    schema_version: &'static str,
    tool_version: String,
    command: &'static str,
    url: &'a str,
    started_at: String,
    finished_at: String,
    status: &'static str,
    passed: usize,
    total: usize,
    checks: Vec<CheckOutcome>,
    rows_updated: usize,
    outputs: RunLogOutputs,
    suggestion_status: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    suggestion_error: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct RunLogOutputs {
    checklist: String,
    suggestions: String,
}

#[derive(Debug)]
pub struct RunRecord<'a> {
    pub url: &'a str,
    pub started_at: OffsetDateTime,
    pub finished_at: OffsetDateTime,
    pub results: &'a CheckResults,
    pub rows_updated: usize,
    pub checklist_out: &'a Path,
    pub suggestions_out: &'a Path,
    pub suggestion_status: &'a str,
    pub suggestion_error: Option<&'a str>,
}

/// Writes one JSON log per run into `dir` and returns its path.
pub fn write_run_log(dir: &Path, record: &RunRecord<'_>) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Log-Verzeichnis konnte nicht erstellt werden: {}", dir.display()))?;

    let pid = std::process::id();
    let ts = record.finished_at.unix_timestamp_nanos();
    let path = dir.join(format!("run-{pid}-{ts}.json"));

    let status = if record.suggestion_error.is_some() {
        "partial_error"
    } else {
        "ok"
    };

    let log = RunLog {
        schema_version: "1.0",
        tool_version: env!("CARGO_PKG_VERSION").to_string(),
        command: "check",
        url: record.url,
        started_at: format_ts(record.started_at),
        finished_at: format_ts(record.finished_at),
        status,
        passed: record.results.passed(),
        total: record.results.len(),
        checks: record.results.outcomes(),
        rows_updated: record.rows_updated,
        outputs: RunLogOutputs {
            checklist: record.checklist_out.display().to_string(),
            suggestions: record.suggestions_out.display().to_string(),
        },
        suggestion_status: record.suggestion_status,
        suggestion_error: record.suggestion_error,
    };

    let buf = serde_json::to_vec_pretty(&log).context("Run-Log konnte nicht serialisiert werden")?;
    std::fs::write(&path, buf)
        .with_context(|| format!("Run-Log konnte nicht geschrieben werden: {}", path.display()))?;
    Ok(path)
}

pub fn format_ts(ts: OffsetDateTime) -> String {
    ts.format(&Rfc3339).unwrap_or_else(|_| "unknown".to_string())
}
