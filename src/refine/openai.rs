use crate::config;
use crate::refine::{Error, Refiner};
use reqwest::{blocking, Url};
use serde::{Deserialize, Serialize};
use std::env;
use std::env::VarError;

const DEFAULT_OPENAI_HOST: &str = "https://api.openai.com";
const CHAT_COMPLETIONS_ENDPOINT: &str = "/v1/chat/completions";

const DEFAULT_MODEL: &str = "gpt-4o";
/// Request timeout in milliseconds.
const DEFAULT_TIMEOUT: u64 = 30000;

const TEMPERATURE: f32 = 0.7;
const MAX_TOKENS: u32 = 1000;

const EDITOR_INSTRUCTION: &str = "You are a book review editor. Your job is to refine the review \
    while maintaining the original sentiment, opinion, and rating. Improve grammar, clarity, and \
    tone. Make the review more engaging and well-structured. Do not add information or change the \
    user's opinion. Simply improve the writing quality.";

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

/// OpenAI chat-completions client serving the [`Refiner`] interface.
pub struct Client {
    api_key: String,
    host: String,
    model: String,
    timeout: u64,
}

impl Client {
    /// Builds a client from the refine settings, taking the API key from the
    /// `OPENAI_API_KEY` environment variable. An unset or blank key counts
    /// as absent, which callers use to disable refinement at wiring time.
    pub fn new_with_env(settings: &config::Refine) -> Result<Self, VarError> {
        let api_key = env::var("OPENAI_API_KEY")?;
        if api_key.trim().is_empty() {
            return Err(VarError::NotPresent);
        }

        Ok(Self {
            api_key,
            host: settings.host().unwrap_or(DEFAULT_OPENAI_HOST).to_owned(),
            model: settings.model().unwrap_or(DEFAULT_MODEL).to_owned(),
            timeout: settings.timeout().unwrap_or(DEFAULT_TIMEOUT),
        })
    }
}

impl Refiner for Client {
    fn refine(&self, content: &str) -> Result<String, Error> {
        let client = blocking::Client::builder()
            .timeout(std::time::Duration::from_millis(self.timeout))
            .build()
            .map_err(|err| Error::ConnectFailed(format!("Failed to create client: {}", err)))?;

        let url = build_chat_url(&self.host)?;
        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage { role: "system", content: EDITOR_INSTRUCTION },
                ChatMessage { role: "user", content },
            ],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };
        let body = serde_json::to_string(&body)
            .map_err(|err| Error::ConnectFailed(format!("Failed to serialize request: {}", err)))?;

        let response = client.post(url)
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .body(body)
            .send()
            .map_err(|err| Error::ConnectFailed(err.to_string()))?;

        if !response.status().is_success() {
            return Err(Error::ConnectFailed(format!("HTTP error: {}", response.status())));
        }

        let response_text = response.text()
            .map_err(|err| Error::ResponseParsingFailed(format!("Failed to read response: {}", err)))?;

        let response = serde_json::from_str::<ChatResponse>(&response_text)
            .map_err(|err| Error::ResponseParsingFailed(format!("Failed to parse response: {}", err)))?;

        response.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| Error::ResponseParsingFailed("response contained no message content".to_owned()))
    }
}

fn build_chat_url(host: &str) -> Result<Url, Error> {
    let url = format!("{}{}", host.trim_end_matches('/'), CHAT_COMPLETIONS_ENDPOINT);
    Url::parse(&url).map_err(|_| Error::ConnectFailed(format!("Invalid host: {}", host)))
}
