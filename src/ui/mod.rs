use anyhow::Error;
use std::io::{self, Write};
use std::time::Duration;

use crate::core::{CheckResults, CheckStatus, Suggestion};
use crate::suggest::{DESCRIPTION_LABEL, SuggestionOutcome, TITLE_LABEL};

#[derive(Debug, Clone)]
pub struct UiConfig {
    pub color: bool,
    pub stdout_is_tty: bool,
    pub stderr_is_tty: bool,
    pub quiet: bool,
    pub verbose: bool,
}

pub fn eprintln_error(err: &Error) {
    let mut stderr = io::stderr().lock();
    let _ = writeln!(stderr, "Fehler:");
    let _ = writeln!(stderr, "  {err}");

    let mut causes = err.chain().skip(1).peekable();
    if causes.peek().is_some() {
        let _ = writeln!(stderr, "Ursache:");
        for cause in causes {
            let _ = writeln!(stderr, "  - {cause}");
        }
    }

    let _ = writeln!(stderr, "Hinweis:");
    let _ = writeln!(
        stderr,
        "  - Verfügbare Optionen siehe `seocheck --help`"
    );
}

pub fn info(cfg: &UiConfig, message: &str) {
    if cfg.quiet {
        return;
    }
    println!("{message}");
}

pub fn detail(cfg: &UiConfig, message: &str) {
    if cfg.quiet || !cfg.verbose {
        return;
    }
    eprintln!("{message}");
}

pub fn warn(cfg: &UiConfig, message: &str) {
    if cfg.quiet {
        return;
    }
    if cfg.color && cfg.stderr_is_tty {
        eprintln!("\x1b[33mWarnung:\x1b[0m {message}");
    } else {
        eprintln!("Warnung: {message}");
    }
}

/// Spinner on stderr while a blocking call runs; `None` when not on a terminal.
pub fn spinner(cfg: &UiConfig, message: impl Into<String>) -> Option<indicatif::ProgressBar> {
    if cfg.quiet || !cfg.stderr_is_tty {
        return None;
    }
    let pb = indicatif::ProgressBar::new_spinner();
    pb.set_draw_target(indicatif::ProgressDrawTarget::stderr());
    pb.set_message(message.into());
    pb.enable_steady_tick(Duration::from_millis(120));
    Some(pb)
}

pub fn print_summary(results: &CheckResults, cfg: &UiConfig) {
    if cfg.quiet {
        return;
    }
    let mut out = io::stdout().lock();
    let _ = write_summary(&mut out, results, cfg.color && cfg.stdout_is_tty);
}

fn write_summary(out: &mut dyn Write, results: &CheckResults, color: bool) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "Ergebnis der automatisierten Checks:")?;
    for (id, passed) in results.iter() {
        writeln!(out, "- {id}: {}", format_status(CheckStatus::from_passed(passed), color))?;
    }
    writeln!(out, "Bestanden: {}/{}", results.passed(), results.len())
}

fn format_status(status: CheckStatus, color: bool) -> String {
    if !color {
        return status.as_str().to_string();
    }
    let code = match status {
        CheckStatus::Done => "32",
        CheckStatus::Open => "31",
    };
    format!("\x1b[{code}m{status}\x1b[0m")
}

const NOTHING_GENERATED: &str = "Keine Vorschläge erzeugt.";

pub fn print_suggestion_outcome(outcome: &SuggestionOutcome, cfg: &UiConfig) {
    match outcome {
        SuggestionOutcome::Generated { partial: true, .. } => warn(
            cfg,
            "Antwort konnte nicht vollständig geparst werden. Rohtext wird verwendet.",
        ),
        SuggestionOutcome::Failed { error } => {
            warn(cfg, &format!("Vorschläge konnten nicht erzeugt werden: {error}"));
        }
        _ => {}
    }
    if cfg.quiet {
        return;
    }
    let mut out = io::stdout().lock();
    let _ = write_suggestion_outcome(&mut out, outcome);
}

fn write_suggestion_outcome(out: &mut dyn Write, outcome: &SuggestionOutcome) -> io::Result<()> {
    match outcome {
        SuggestionOutcome::Skipped { reason } => {
            writeln!(out, "{reason}")?;
            writeln!(out, "{NOTHING_GENERATED}")
        }
        SuggestionOutcome::Generated { suggestion, .. } => write_suggestion(out, suggestion),
        SuggestionOutcome::Empty | SuggestionOutcome::Failed { .. } => {
            writeln!(out, "{NOTHING_GENERATED}")
        }
    }
}

fn write_suggestion(out: &mut dyn Write, suggestion: &Suggestion) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{TITLE_LABEL}: {}", suggestion.title)?;
    writeln!(out, "{DESCRIPTION_LABEL}: {}", suggestion.description)
}
