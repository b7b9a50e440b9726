use std::env;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use reqwest::Client;
use serde::{Deserialize, Serialize};

const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 20;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 6;

pub const API_KEY_ENV: &str = "GEMINI_API_KEY";
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";
const API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

static HTTP_CLIENT: Lazy<Client> = Lazy::new(|| {
    Client::builder()
        .user_agent("break-advisor/0.1")
        .timeout(Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS))
        .connect_timeout(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS))
        .build()
        .expect("failed to build HTTP client")
});

/// The external text-generation capability. One prompt in, one best-effort
/// response string out; no structural guarantees on the content.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Generator backed by the Gemini `generateContent` endpoint.
#[derive(Debug, Clone)]
pub struct GeminiGenerator {
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiGenerator {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            base_url: API_BASE_URL.to_string(),
        }
    }

    pub fn from_env(model: Option<&str>) -> Result<Self> {
        let api_key = env::var(API_KEY_ENV)
            .with_context(|| format!("{API_KEY_ENV} environment variable not set"))?;
        Ok(Self::new(api_key, model.unwrap_or(DEFAULT_MODEL)))
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<RequestContent>,
}

#[derive(Debug, Serialize)]
struct RequestContent {
    parts: Vec<TextPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct TextPart {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<TextPart>,
}

#[async_trait]
impl TextGenerator for GeminiGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );
        let request = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![TextPart {
                    text: prompt.to_string(),
                }],
            }],
        };

        let response = HTTP_CLIENT
            .post(&url)
            .json(&request)
            .send()
            .await
            .with_context(|| format!("failed POST to Gemini model {}", self.model))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .context("failed reading Gemini response body")?;
        if !status.is_success() {
            let preview: String = body.chars().take(180).collect();
            return Err(anyhow!("Gemini returned {status}: {preview}"));
        }

        let parsed: GenerateResponse =
            serde_json::from_str(&body).context("invalid Gemini response JSON")?;
        let text: String = parsed
            .candidates
            .first()
            .map(|c| {
                c.content
                    .parts
                    .iter()
                    .map(|p| p.text.as_str())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();
        if text.is_empty() {
            return Err(anyhow!("Gemini response contained no candidates"));
        }
        Ok(text)
    }
}
