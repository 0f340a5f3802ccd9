//! Reqwest-based LLM client for OpenAI-compatible Chat Completions.

use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};

use crate::config::Config;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self { role, content: content.into() }
    }
}

#[derive(Debug, Clone)]
pub struct ChatOptions {
    pub model: String,
}

/// Something that turns a conversation into a single reply text.
///
/// `LlmClient` is the production implementation; tests substitute canned replies.
#[async_trait]
pub trait Completion: Send + Sync {
    async fn complete(&self, messages: Vec<ChatMessage>) -> Result<String>;
}

#[derive(Debug)]
pub struct LlmClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    opts: ChatOptions,
}

impl LlmClient {
    pub fn from_config(cfg: &Config) -> Result<Self> {
        let base_url = resolve_base_url(&cfg.get("API_BASE_URL").unwrap_or_else(|| "default".into()));
        let api_key = cfg.get("OPENAI_API_KEY").filter(|k| !k.trim().is_empty());

        let mut builder = reqwest::Client::builder();
        if let Some(secs) = cfg.request_timeout() {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder.build()?;

        Ok(Self { http, base_url, api_key, opts: ChatOptions { model: cfg.model() } })
    }

    pub fn model(&self) -> &str {
        &self.opts.model
    }

    /// One non-streaming request; returns the first choice's content unmodified.
    pub async fn chat(&self, messages: Vec<ChatMessage>) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(key) = &self.api_key {
            let hv = HeaderValue::from_str(&format!("Bearer {}", key))?;
            headers.insert(AUTHORIZATION, hv);
        }

        let body = request_body(&self.opts, &messages);
        let started = Instant::now();

        let resp = self
            .http
            .post(url)
            .headers(headers)
            .json(&body)
            .send()
            .await
            .context("failed to send chat request")?;

        let status = resp.status();
        if !status.is_success() {
            let detail = resp.text().await.unwrap_or_default();
            tracing::warn!(%status, model = %self.opts.model, "completion request rejected");
            return Err(anyhow!("LLM error: {} {}", status, error_message(&detail)));
        }

        let completion: ChatCompletion = resp.json().await.context("failed to decode chat response")?;
        tracing::debug!(
            model = %self.opts.model,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "completion received"
        );
        first_choice_content(completion)
    }
}

#[async_trait]
impl Completion for LlmClient {
    async fn complete(&self, messages: Vec<ChatMessage>) -> Result<String> {
        self.chat(messages).await
    }
}

fn resolve_base_url(api_base_url: &str) -> String {
    if api_base_url == "default" || api_base_url.trim().is_empty() {
        return "https://api.openai.com/v1".to_string();
    }
    let trimmed = api_base_url.trim_end_matches('/');
    if !trimmed.ends_with("/v1") && !trimmed.contains("/v1/") {
        format!("{}/v1", trimmed)
    } else {
        trimmed.to_string()
    }
}

/// Model and messages only: no temperature, token cap or streaming.
fn request_body(opts: &ChatOptions, messages: &[ChatMessage]) -> serde_json::Value {
    serde_json::json!({
        "model": opts.model,
        "messages": messages,
    })
}

fn first_choice_content(completion: ChatCompletion) -> Result<String> {
    let choice = completion
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| anyhow!("LLM response contained no choices"))?;
    choice
        .message
        .content
        .ok_or_else(|| anyhow!("LLM response choice has no message content"))
}

/// Pull `error.message` out of an OpenAI-style error body, else return it as-is.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.pointer("/error/message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}

// Minimal response structures for OpenAI-like chat completions
#[derive(Debug, Deserialize)]
struct ChatCompletion {
    #[allow(dead_code)]
    id: Option<String>,
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}
