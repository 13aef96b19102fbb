use std::path::Path;

use anyhow::{Context, Result};
use lazy_static::lazy_static;
use regex::Regex;

use crate::core::Suggestion;

#[cfg(feature = "suggestions")]
mod openai;

pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

pub const SYSTEM_PROMPT: &str = "Du bist ein hilfreicher SEO-Assistent.";

const CLIENT_MISSING: &str = "OpenAI-Client nicht verfügbar. Vorschläge werden übersprungen.";

pub const NO_SUGGESTIONS_LINE: &str = "Keine Vorschläge verfügbar.";
pub const TITLE_LABEL: &str = "Titel-Vorschlag";
pub const DESCRIPTION_LABEL: &str = "Meta-Description-Vorschlag";

lazy_static! {
    static ref TITLE_FIELD: Regex = Regex::new(r#""title"\s*:\s*"(.*?)""#).expect("title pattern");
    static ref DESCRIPTION_FIELD: Regex =
        Regex::new(r#""description"\s*:\s*"(.*?)""#).expect("description pattern");
}

#[derive(Debug, Clone)]
pub struct SuggestOptions {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub api_base: String,
}

impl Default for SuggestOptions {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            temperature: 0.3,
            max_tokens: 200,
            api_base: "https://api.openai.com/v1".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientReply {
    Unavailable(String),
    Content(String),
}

/// Text-generation capability used for title/description suggestions.
pub trait SuggestionClient {
    fn complete(&self, system: &str, user: &str) -> Result<ClientReply>;
}

/// Stand-in used when no real client can be built.
#[derive(Debug, Clone)]
pub struct Unavailable {
    pub reason: String,
}

impl SuggestionClient for Unavailable {
    fn complete(&self, _system: &str, _user: &str) -> Result<ClientReply> {
        Ok(ClientReply::Unavailable(self.reason.clone()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuggestionOutcome {
    Skipped { reason: String },
    Generated { suggestion: Suggestion, partial: bool },
    Empty,
    Failed { error: String },
}

impl SuggestionOutcome {
    pub fn suggestion(&self) -> Option<&Suggestion> {
        match self {
            SuggestionOutcome::Generated { suggestion, .. } => Some(suggestion),
            _ => None,
        }
    }

    pub const fn label(&self) -> &'static str {
        match self {
            SuggestionOutcome::Skipped { .. } => "skipped",
            SuggestionOutcome::Generated { partial: false, .. } => "generated",
            SuggestionOutcome::Generated { partial: true, .. } => "partial",
            SuggestionOutcome::Empty => "empty",
            SuggestionOutcome::Failed { .. } => "failed",
        }
    }
}

/// Picks the real client when it is compiled in and a credential is set.
pub fn client_from_env(opts: &SuggestOptions) -> Box<dyn SuggestionClient> {
    client_from_key(std::env::var(API_KEY_ENV).ok(), opts)
}

fn client_from_key(api_key: Option<String>, opts: &SuggestOptions) -> Box<dyn SuggestionClient> {
    if !cfg!(feature = "suggestions") {
        return Box::new(Unavailable {
            reason: CLIENT_MISSING.to_string(),
        });
    }
    let Some(api_key) = api_key.filter(|k| !k.trim().is_empty()) else {
        return Box::new(Unavailable {
            reason: format!("Umgebung enthält keinen {API_KEY_ENV}. Vorschläge werden übersprungen."),
        });
    };
    real_client(api_key.trim().to_string(), opts)
}

#[cfg(feature = "suggestions")]
fn real_client(api_key: String, opts: &SuggestOptions) -> Box<dyn SuggestionClient> {
    Box::new(openai::OpenAiClient::new(api_key, opts.clone()))
}

#[cfg(not(feature = "suggestions"))]
fn real_client(_api_key: String, _opts: &SuggestOptions) -> Box<dyn SuggestionClient> {
    Box::new(Unavailable {
        reason: CLIENT_MISSING.to_string(),
    })
}

pub fn build_prompt(page_text: &str) -> String {
    format!(
        "Du bist ein SEO-Experte. Lies den folgenden Seitentext und erstelle \
         einen prägnanten Meta-Titel (maximal 60 Zeichen) sowie eine Meta-\
         Description (maximal 155 Zeichen). Antworte im JSON-Format mit den \
         Schlüsseln 'title' und 'description'.\n\n\
         Seitentext:\n{page_text}"
    )
}

/// Asks `client` for a suggestion. Service errors become `Failed` instead of aborting the run.
pub fn generate(client: &dyn SuggestionClient, page_text: &str) -> SuggestionOutcome {
    let prompt = build_prompt(page_text);
    match client.complete(SYSTEM_PROMPT, &prompt) {
        Ok(ClientReply::Unavailable(reason)) => SuggestionOutcome::Skipped { reason },
        Ok(ClientReply::Content(content)) => match parse_reply(&content) {
            Some((suggestion, partial)) => SuggestionOutcome::Generated {
                suggestion,
                partial,
            },
            None => SuggestionOutcome::Empty,
        },
        Err(err) => SuggestionOutcome::Failed {
            error: format!("{err:#}"),
        },
    }
}

/// Pulls `title`/`description` out of a JSON-like reply without a full parse.
///
/// A field that cannot be found falls back to the whole reply; the bool
/// reports whether that happened. Blank replies yield `None`.
pub fn parse_reply(content: &str) -> Option<(Suggestion, bool)> {
    let content = content.trim();
    if content.is_empty() {
        return None;
    }

    let title = capture(&TITLE_FIELD, content);
    let description = capture(&DESCRIPTION_FIELD, content);
    let partial = title.is_none() || description.is_none();

    Some((
        Suggestion {
            title: title.unwrap_or_else(|| content.to_string()),
            description: description.unwrap_or_else(|| content.to_string()),
        },
        partial,
    ))
}

fn capture(pattern: &Regex, content: &str) -> Option<String> {
    pattern
        .captures(content)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .filter(|s| !s.is_empty())
}

pub fn render(suggestion: Option<&Suggestion>) -> String {
    match suggestion {
        Some(s) => format!(
            "{TITLE_LABEL}: {}\n{DESCRIPTION_LABEL}: {}",
            s.title, s.description
        ),
        None => NO_SUGGESTIONS_LINE.to_string(),
    }
}

pub fn save(path: &Path, suggestion: Option<&Suggestion>) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Verzeichnis konnte nicht erstellt werden: {}", parent.display()))?;
    }
    std::fs::write(path, render(suggestion))
        .with_context(|| format!("Vorschläge konnten nicht gespeichert werden: {}", path.display()))
}
