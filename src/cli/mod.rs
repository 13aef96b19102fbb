use std::io;
use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use crate::engine::{Engine, EngineOptions};
use crate::suggest::{self, SuggestionClient, Unavailable};
use crate::ui::UiConfig;

pub const CONFIG_ENV: &str = "SEOCHECK_CONFIG";

#[derive(Debug, Parser)]
#[command(
    name = "seocheck",
    version,
    about = "Prüft eine Webseite auf SEO-Grundlagen, aktualisiert die Checkliste und erzeugt Vorschläge"
)]
pub struct Cli {
    /// Zu prüfende URL (http oder https)
    pub url: String,
    #[arg(long)]
    pub json: bool,
    #[arg(long = "no-color")]
    pub no_color: bool,
    #[arg(long)]
    pub verbose: bool,
    #[arg(long)]
    pub quiet: bool,
    #[arg(long)]
    pub config: Option<PathBuf>,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let stdout_is_tty = io::stdout().is_terminal();
    let stderr_is_tty = io::stderr().is_terminal();

    let url = validate_url(&cli.url)?;

    let env_config_path = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
    let cfg = crate::config::load(cli.config.as_deref().or(env_config_path.as_deref()))
        .map_err(crate::exit::invalid_args_err)?;

    let color = cfg.ui.color && !cli.no_color;

    // JSON mode keeps stdout clean for the report.
    let ui_cfg = UiConfig {
        color,
        stdout_is_tty,
        stderr_is_tty,
        quiet: cli.quiet || cli.json,
        verbose: cli.verbose,
    };

    let client: Box<dyn SuggestionClient> = if cfg.suggest.enabled {
        suggest::client_from_env(&cfg.suggest_options())
    } else {
        Box::new(Unavailable {
            reason: "Vorschläge sind in der Konfiguration deaktiviert.".to_string(),
        })
    };

    let engine = Engine::new(EngineOptions {
        fetch: cfg.fetch_options(),
        max_text_chars: cfg.scan.max_text_chars,
        checklist_in: cfg.paths.checklist.clone(),
        checklist_out: cfg.paths.checklist_out.clone(),
        suggestions_out: cfg.paths.suggestions.clone(),
        logs_dir: cfg.logs.enabled.then(|| cfg.logs.dir.clone()),
    });

    let report = engine.run(&url, client.as_ref(), &ui_cfg)?;
    if cli.json {
        write_json(&report)?;
    }

    Ok(())
}

fn validate_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(crate::exit::invalid_args("Bitte eine URL angeben."));
    }
    let parsed = reqwest::Url::parse(trimmed)
        .map_err(|err| crate::exit::invalid_args(format!("Ungültige URL '{trimmed}': {err}")))?;
    match parsed.scheme() {
        "http" | "https" if parsed.host_str().is_some() => Ok(trimmed.to_string()),
        _ => Err(crate::exit::invalid_args(format!(
            "Ungültige URL '{trimmed}': nur http und https werden unterstützt"
        ))),
    }
}

fn write_json(report: &crate::core::Report) -> Result<()> {
    use std::io::Write;

    let buf = serde_json::to_vec_pretty(report)?;

    let mut stdout = std::io::stdout().lock();
    match stdout.write_all(&buf) {
        Ok(()) => {}
        Err(err) if err.kind() == std::io::ErrorKind::BrokenPipe => return Ok(()),
        Err(err) => return Err(err.into()),
    }
    match stdout.write_all(b"\n") {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == std::io::ErrorKind::BrokenPipe => Ok(()),
        Err(err) => Err(err.into()),
    }
}
