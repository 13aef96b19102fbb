use std::time::Duration;

use anyhow::{Context, Result, bail};
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT_LANGUAGE, USER_AGENT};

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (compatible; SEOChecklistBot/1.0)";
pub const DEFAULT_ACCEPT_LANGUAGE: &str = "de-DE,de;q=0.9,en;q=0.8";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub timeout: Duration,
    pub user_agent: String,
    pub accept_language: String,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept_language: DEFAULT_ACCEPT_LANGUAGE.to_string(),
        }
    }
}

/// GETs `url` and returns the body decoded with the declared charset.
///
/// Undecodable bytes are replaced. Non-success status codes are errors.
pub fn fetch_html(url: &str, opts: &FetchOptions) -> Result<String> {
    let client = Client::builder()
        .timeout(opts.timeout)
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()
        .context("HTTP-Client konnte nicht erstellt werden")?;

    let response = client
        .get(url)
        .header(USER_AGENT, &opts.user_agent)
        .header(ACCEPT_LANGUAGE, &opts.accept_language)
        .send()
        .with_context(|| format!("Anfrage an {url} fehlgeschlagen"))?;

    let status = response.status();
    if !status.is_success() {
        bail!("HTTP-Fehler {status} für {url}");
    }

    response
        .text()
        .with_context(|| format!("Antwort von {url} konnte nicht gelesen werden"))
}
