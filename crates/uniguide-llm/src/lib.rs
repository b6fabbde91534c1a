//! uniguide-llm
//!
//! Completion capability backed by any OpenAI-compatible `/chat/completions`
//! endpoint (Groq by default). One user message in, first choice out; no
//! retries, callers decide on retry policy.

use std::time::{Duration, Instant};

use anyhow::{anyhow, bail, Context};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use uniguide_core::config::CompletionConfig;
use uniguide_core::traits::Completer;
use uniguide_core::{Error, Result};

#[derive(Clone)]
pub struct OpenAiCompatibleCompleter {
    client: Client,
    name: String,
    base_url: String,
    model: String,
    temperature: f32,
    api_key: String,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl OpenAiCompatibleCompleter {
    pub fn new(base_url: &str, model: &str, temperature: f32, api_key: String, timeout: Duration) -> Result<Self> {
        let url = Url::parse(base_url).map_err(|e| Error::InvalidConfig(format!("completion.base_url {base_url:?}: {e}")))?;
        if model.trim().is_empty() {
            return Err(Error::InvalidConfig("completion.model must not be empty".into()));
        }
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::InvalidConfig(format!("http client: {e}")))?;
        Ok(Self {
            client,
            name: url.host_str().unwrap_or("completion").to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            temperature,
            api_key,
        })
    }

    /// Build from configuration, reading the API key from `config.api_key_env`.
    pub fn from_config(config: &CompletionConfig) -> Result<Self> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| Error::InvalidConfig(format!("{} not set in environment", config.api_key_env)))?;
        Self::new(&config.base_url, &config.model, config.temperature, api_key, Duration::from_secs(config.timeout_secs))
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn request_body(&self, prompt: &str) -> Value {
        json!({
            "model": self.model,
            "messages": [{ "role": "user", "content": prompt }],
            "temperature": self.temperature,
        })
    }
}

/// First choice's message content from a chat-completions response body.
fn parse_completion(body: &str) -> anyhow::Result<String> {
    let response: ChatCompletionResponse = serde_json::from_str(body).context("malformed completion response")?;
    let choice = response.choices.into_iter().next().ok_or_else(|| anyhow!("completion response has no choices"))?;
    choice.message.content.ok_or_else(|| anyhow!("completion choice has no content"))
}

#[async_trait]
impl Completer for OpenAiCompatibleCompleter {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, prompt: &str) -> anyhow::Result<String> {
        let url = format!("{}/chat/completions", self.base_url);
        let start = Instant::now();
        let res = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&self.request_body(prompt))
            .send()
            .await
            .with_context(|| format!("request to {url} failed"))?;
        let status = res.status();
        let body = res.text().await.context("reading completion response")?;
        if !status.is_success() {
            bail!("{} returned {}: {}", self.name, status, body.chars().take(300).collect::<String>());
        }
        debug!(provider = %self.name, model = %self.model, elapsed_ms = start.elapsed().as_millis() as u64, "completion received");
        parse_completion(&body)
    }
}
