use std::path::PathBuf;

use anyhow::{Context, Result};
use time::OffsetDateTime;

use crate::checklist;
use crate::core::{Report, ReportOutputs, ReportSummary};
use crate::fetch::{self, FetchOptions};
use crate::logs::{self, RunRecord};
use crate::rules;
use crate::scan;
use crate::suggest::{self, SuggestionClient, SuggestionOutcome};
use crate::ui::{self, UiConfig};

#[derive(Debug, Clone)]
pub struct EngineOptions {
    pub fetch: FetchOptions,
    pub max_text_chars: usize,
    pub checklist_in: PathBuf,
    pub checklist_out: PathBuf,
    pub suggestions_out: PathBuf,
    pub logs_dir: Option<PathBuf>,
}

pub struct Engine {
    opts: EngineOptions,
}

impl Engine {
    pub fn new(opts: EngineOptions) -> Self {
        Self { opts }
    }

    /// One full pass: fetch, scan, checklist update, suggestions, run log.
    pub fn run(
        &self,
        url: &str,
        client: &dyn SuggestionClient,
        ui_cfg: &UiConfig,
    ) -> Result<Report> {
        let started_at = OffsetDateTime::now_utc();
        ui::info(ui_cfg, &format!("Analysiere {url} ..."));

        let pb = ui::spinner(ui_cfg, format!("Lade {url}"));
        let fetched = fetch::fetch_html(url, &self.opts.fetch);
        if let Some(pb) = pb {
            pb.finish_and_clear();
        }
        let html = fetched.context("Fehler beim Laden der Seite")?;
        ui::detail(ui_cfg, &format!("{} Zeichen HTML geladen", html.chars().count()));

        let scan = scan::scan_html(&html, self.opts.max_text_chars);

        let mut rows = checklist::load(&self.opts.checklist_in)?;
        ui::detail(
            ui_cfg,
            &format!(
                "{} Einträge aus {} geladen",
                rows.len(),
                self.opts.checklist_in.display()
            ),
        );

        let results = rules::evaluate(&scan, url);
        ui::print_summary(&results, ui_cfg);

        let rows_updated = checklist::apply_results(&mut rows, &results);
        checklist::write(&self.opts.checklist_out, &rows)?;
        ui::info(
            ui_cfg,
            &format!(
                "Aktualisierte Checkliste gespeichert unter {}.",
                self.opts.checklist_out.display()
            ),
        );

        let pb = ui::spinner(ui_cfg, "Erzeuge Vorschläge");
        let suggestion = suggest::generate(client, &scan.page_text);
        if let Some(pb) = pb {
            pb.finish_and_clear();
        }
        ui::print_suggestion_outcome(&suggestion, ui_cfg);

        suggest::save(&self.opts.suggestions_out, suggestion.suggestion())?;
        ui::info(
            ui_cfg,
            &format!(
                "Vorschläge gespeichert in {}.",
                self.opts.suggestions_out.display()
            ),
        );

        let finished_at = OffsetDateTime::now_utc();
        let suggestion_error = match &suggestion {
            SuggestionOutcome::Failed { error } => Some(error.as_str()),
            _ => None,
        };

        let mut notes = Vec::new();
        if let Some(dir) = &self.opts.logs_dir {
            let record = RunRecord {
                url,
                started_at,
                finished_at,
                results: &results,
                rows_updated,
                checklist_out: &self.opts.checklist_out,
                suggestions_out: &self.opts.suggestions_out,
                suggestion_status: suggestion.label(),
                suggestion_error,
            };
            match logs::write_run_log(dir, &record) {
                Ok(path) => ui::detail(ui_cfg, &format!("Run-Log: {}", path.display())),
                Err(err) => {
                    ui::warn(ui_cfg, &format!("{err:#}"));
                    notes.push(format!("Run-Log nicht geschrieben: {err:#}"));
                }
            }
        }

        if let SuggestionOutcome::Failed { error } = &suggestion {
            notes.push(format!("Vorschläge fehlgeschlagen: {error}"));
        }

        Ok(Report {
            schema_version: "1.0".to_string(),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
            url: url.to_string(),
            generated_at: logs::format_ts(finished_at),
            summary: ReportSummary {
                passed: results.passed(),
                total: results.len(),
            },
            checks: results.outcomes(),
            outputs: ReportOutputs {
                checklist: self.opts.checklist_out.display().to_string(),
                suggestions: self.opts.suggestions_out.display().to_string(),
            },
            suggestion: suggestion.suggestion().cloned(),
            notes,
        })
    }
}
