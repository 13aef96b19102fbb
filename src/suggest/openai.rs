use anyhow::{Context, Result};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use super::{ClientReply, SuggestOptions, SuggestionClient};

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReplyMessage,
}

#[derive(Debug, Deserialize)]
struct ChatReplyMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Chat-completions client for OpenAI-compatible endpoints.
pub struct OpenAiClient {
    http: Client,
    api_key: String,
    opts: SuggestOptions,
}

impl OpenAiClient {
    pub fn new(api_key: String, opts: SuggestOptions) -> Self {
        Self {
            http: Client::new(),
            api_key,
            opts,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.opts.api_base.trim_end_matches('/'))
    }
}

impl SuggestionClient for OpenAiClient {
    fn complete(&self, system: &str, user: &str) -> Result<ClientReply> {
        let request = ChatRequest {
            model: &self.opts.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            temperature: self.opts.temperature,
            max_tokens: self.opts.max_tokens,
        };

        let endpoint = self.endpoint();
        let response: ChatResponse = self
            .http
            .post(&endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .with_context(|| format!("Anfrage an {endpoint} fehlgeschlagen"))?
            .error_for_status()
            .context("Textgenerierungsdienst meldet einen Fehler")?
            .json()
            .context("Antwort des Textgenerierungsdienstes ist ungültig")?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();
        Ok(ClientReply::Content(content))
    }
}
