use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::fetch::FetchOptions;
use crate::suggest::SuggestOptions;

pub const DEFAULT_CONFIG_FILE: &str = "seocheck.toml";

#[derive(Debug, Clone, Serialize)]
pub struct EffectiveConfig {
    pub paths: PathsConfig,
    pub fetch: FetchConfig,
    pub scan: ScanConfig,
    pub suggest: SuggestConfig,
    pub logs: LogsConfig,
    pub ui: UiConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_path: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PathsConfig {
    pub checklist: PathBuf,
    pub checklist_out: PathBuf,
    pub suggestions: PathBuf,
}

#[derive(Debug, Clone, Serialize)]
pub struct FetchConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
    pub accept_language: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScanConfig {
    pub max_text_chars: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SuggestConfig {
    pub enabled: bool,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub api_base: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LogsConfig {
    pub enabled: bool,
    pub dir: PathBuf,
}

#[derive(Debug, Clone, Serialize)]
pub struct UiConfig {
    pub color: bool,
}

impl Default for EffectiveConfig {
    fn default() -> Self {
        let fetch = FetchOptions::default();
        let suggest = SuggestOptions::default();
        Self {
            paths: PathsConfig {
                checklist: PathBuf::from("docs/checklist.csv"),
                checklist_out: PathBuf::from("docs/checklist_updated.csv"),
                suggestions: PathBuf::from("vorschlaege.txt"),
            },
            fetch: FetchConfig {
                timeout_secs: fetch.timeout.as_secs(),
                user_agent: fetch.user_agent,
                accept_language: fetch.accept_language,
            },
            scan: ScanConfig {
                max_text_chars: crate::scan::DEFAULT_MAX_TEXT_CHARS,
            },
            suggest: SuggestConfig {
                enabled: true,
                model: suggest.model,
                temperature: suggest.temperature,
                max_tokens: suggest.max_tokens,
                api_base: suggest.api_base,
            },
            logs: LogsConfig {
                enabled: true,
                dir: PathBuf::from(".seocheck/logs"),
            },
            ui: UiConfig { color: true },
            config_path: None,
        }
    }
}

impl EffectiveConfig {
    pub fn fetch_options(&self) -> FetchOptions {
        FetchOptions {
            timeout: Duration::from_secs(self.fetch.timeout_secs),
            user_agent: self.fetch.user_agent.clone(),
            accept_language: self.fetch.accept_language.clone(),
        }
    }

    pub fn suggest_options(&self) -> SuggestOptions {
        SuggestOptions {
            model: self.suggest.model.clone(),
            temperature: self.suggest.temperature,
            max_tokens: self.suggest.max_tokens,
            api_base: self.suggest.api_base.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    paths: Option<RawPathsConfig>,
    fetch: Option<RawFetchConfig>,
    scan: Option<RawScanConfig>,
    suggest: Option<RawSuggestConfig>,
    logs: Option<RawLogsConfig>,
    ui: Option<RawUiConfig>,
}

#[derive(Debug, Deserialize)]
struct RawPathsConfig {
    checklist: Option<PathBuf>,
    checklist_out: Option<PathBuf>,
    suggestions: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct RawFetchConfig {
    timeout_secs: Option<u64>,
    user_agent: Option<String>,
    accept_language: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawScanConfig {
    max_text_chars: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct RawSuggestConfig {
    enabled: Option<bool>,
    model: Option<String>,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
    api_base: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawLogsConfig {
    enabled: Option<bool>,
    dir: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct RawUiConfig {
    color: Option<bool>,
}

/// Builds the effective config: defaults, then the TOML file, then `SEOCHECK_*` variables.
///
/// An explicit `config_path` must exist; the default `seocheck.toml` is optional.
pub fn load(config_path: Option<&Path>) -> Result<EffectiveConfig> {
    let mut cfg = EffectiveConfig::default();

    let path = match config_path {
        Some(p) => {
            if !p.exists() {
                anyhow::bail!("Konfigurationsdatei nicht gefunden: {}", p.display());
            }
            Some(p.to_owned())
        }
        None => Some(PathBuf::from(DEFAULT_CONFIG_FILE)).filter(|p| p.exists()),
    };

    if let Some(path) = path {
        let s = std::fs::read_to_string(&path).with_context(|| {
            format!("Konfigurationsdatei konnte nicht gelesen werden: {}", path.display())
        })?;
        let raw: RawConfig =
            toml::from_str(&s).context("Konfigurationsdatei (TOML) ist ungültig")?;
        apply_raw_config(&mut cfg, raw);
        cfg.config_path = Some(path.display().to_string());
    }

    apply_env_overrides(&mut cfg, |key| std::env::var(key).ok())?;
    validate(&cfg)?;

    Ok(cfg)
}

fn apply_raw_config(cfg: &mut EffectiveConfig, raw: RawConfig) {
    if let Some(paths) = raw.paths {
        if let Some(checklist) = paths.checklist {
            cfg.paths.checklist = checklist;
        }
        if let Some(checklist_out) = paths.checklist_out {
            cfg.paths.checklist_out = checklist_out;
        }
        if let Some(suggestions) = paths.suggestions {
            cfg.paths.suggestions = suggestions;
        }
    }

    if let Some(fetch) = raw.fetch {
        if let Some(timeout_secs) = fetch.timeout_secs {
            cfg.fetch.timeout_secs = timeout_secs;
        }
        if let Some(user_agent) = fetch.user_agent {
            cfg.fetch.user_agent = user_agent;
        }
        if let Some(accept_language) = fetch.accept_language {
            cfg.fetch.accept_language = accept_language;
        }
    }

    if let Some(scan) = raw.scan {
        if let Some(max_text_chars) = scan.max_text_chars {
            cfg.scan.max_text_chars = max_text_chars;
        }
    }

    if let Some(suggest) = raw.suggest {
        if let Some(enabled) = suggest.enabled {
            cfg.suggest.enabled = enabled;
        }
        if let Some(model) = suggest.model {
            cfg.suggest.model = model;
        }
        if let Some(temperature) = suggest.temperature {
            cfg.suggest.temperature = temperature;
        }
        if let Some(max_tokens) = suggest.max_tokens {
            cfg.suggest.max_tokens = max_tokens;
        }
        if let Some(api_base) = suggest.api_base {
            cfg.suggest.api_base = api_base;
        }
    }

    if let Some(logs) = raw.logs {
        if let Some(enabled) = logs.enabled {
            cfg.logs.enabled = enabled;
        }
        if let Some(dir) = logs.dir {
            cfg.logs.dir = dir;
        }
    }

    if let Some(ui) = raw.ui {
        if let Some(color) = ui.color {
            cfg.ui.color = color;
        }
    }
}

fn apply_env_overrides(
    cfg: &mut EffectiveConfig,
    var: impl Fn(&str) -> Option<String>,
) -> Result<()> {
    if let Some(v) = non_empty(var("SEOCHECK_CHECKLIST")) {
        cfg.paths.checklist = PathBuf::from(v);
    }
    if let Some(v) = non_empty(var("SEOCHECK_CHECKLIST_OUT")) {
        cfg.paths.checklist_out = PathBuf::from(v);
    }
    if let Some(v) = non_empty(var("SEOCHECK_SUGGESTIONS")) {
        cfg.paths.suggestions = PathBuf::from(v);
    }
    if let Some(v) = var("SEOCHECK_FETCH_TIMEOUT") {
        cfg.fetch.timeout_secs = v
            .trim()
            .parse::<u64>()
            .with_context(|| "SEOCHECK_FETCH_TIMEOUT")?;
    }
    if let Some(v) = var("SEOCHECK_TEXT_MAX_CHARS") {
        cfg.scan.max_text_chars = v
            .trim()
            .parse::<usize>()
            .with_context(|| "SEOCHECK_TEXT_MAX_CHARS")?;
    }
    if let Some(v) = var("SEOCHECK_SUGGEST_ENABLED") {
        cfg.suggest.enabled = parse_bool(&v).with_context(|| "SEOCHECK_SUGGEST_ENABLED")?;
    }
    if let Some(v) = non_empty(var("SEOCHECK_SUGGEST_MODEL")) {
        cfg.suggest.model = v;
    }
    if let Some(v) = non_empty(var("SEOCHECK_SUGGEST_API_BASE")) {
        cfg.suggest.api_base = v;
    }
    if let Some(v) = var("SEOCHECK_LOGS_ENABLED") {
        cfg.logs.enabled = parse_bool(&v).with_context(|| "SEOCHECK_LOGS_ENABLED")?;
    }
    if let Some(v) = non_empty(var("SEOCHECK_LOGS_DIR")) {
        cfg.logs.dir = PathBuf::from(v);
    }
    if let Some(v) = var("SEOCHECK_UI_COLOR") {
        cfg.ui.color = parse_bool(&v).with_context(|| "SEOCHECK_UI_COLOR")?;
    }

    Ok(())
}

fn validate(cfg: &EffectiveConfig) -> Result<()> {
    if cfg.fetch.timeout_secs == 0 {
        anyhow::bail!("fetch.timeout_secs muss größer als 0 sein");
    }
    if cfg.scan.max_text_chars == 0 {
        anyhow::bail!("scan.max_text_chars muss größer als 0 sein");
    }
    if cfg.paths.checklist == cfg.paths.checklist_out {
        anyhow::bail!(
            "Ein- und Ausgabepfad der Checkliste müssen verschieden sein: {}",
            cfg.paths.checklist.display()
        );
    }
    Ok(())
}

fn non_empty(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn parse_bool(s: &str) -> Result<bool> {
    let s = s.trim().to_ascii_lowercase();
    match s.as_str() {
        "1" | "true" | "yes" | "on" | "ja" => Ok(true),
        "0" | "false" | "no" | "off" | "nein" => Ok(false),
        _ => Err(anyhow::anyhow!(
            "Ungültiger Wahrheitswert: {s} (true|false|1|0|yes|no|on|off erwartet)"
        )),
    }
}
