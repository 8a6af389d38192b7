// service/gemini.rs
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::{config::Config, service::error::ServiceError};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InlineData {
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Part {
    Text { text: String },
    InlineData { inline_data: InlineData },
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Part::Text { text: text.into() }
    }

    pub fn image(mime_type: impl Into<String>, base64_data: impl Into<String>) -> Self {
        Part::InlineData {
            inline_data: InlineData {
                mime_type: mime_type.into(),
                data: base64_data.into(),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Content {
    pub role: String,
    pub parts: Vec<Part>,
}

impl Content {
    pub fn user(parts: Vec<Part>) -> Self {
        Content {
            role: "user".to_string(),
            parts,
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Content {
            role: "model".to_string(),
            parts: vec![Part::text(text)],
        }
    }
}

/// One round trip to a hosted generative model. No retries happen behind this seam.
#[async_trait]
pub trait GenerativeModel: Send + Sync + std::fmt::Debug {
    async fn generate_content(&self, api_key: &str, contents: Vec<Content>) -> Result<String, ServiceError>;
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GoogleErrorEnvelope {
    error: GoogleError,
}

#[derive(Debug, Deserialize)]
struct GoogleError {
    message: String,
    status: Option<String>,
}

#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Client,
    base_url: String,
    model: String,
}

impl GeminiClient {
    pub fn new(config: &Config) -> Self {
        Self {
            client: Client::new(),
            base_url: config.gemini_base_url.trim_end_matches('/').to_string(),
            model: config.gemini_model.clone(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

#[async_trait]
impl GenerativeModel for GeminiClient {
    async fn generate_content(&self, api_key: &str, contents: Vec<Content>) -> Result<String, ServiceError> {
        tracing::debug!(model = %self.model, turns = contents.len(), "calling generateContent");

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&GenerateContentRequest { contents })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<GoogleErrorEnvelope>(&body)
                .map(|e| match e.error.status {
                    Some(code) => format!("{} ({})", e.error.message, code),
                    None => e.error.message,
                })
                .unwrap_or(body);
            tracing::error!(%status, "generateContent failed: {}", message);
            return Err(ServiceError::Upstream(format!("{}: {}", status, message)));
        }

        let body: GenerateContentResponse = response.json().await?;
        extract_text(body)
    }
}

fn extract_text(body: GenerateContentResponse) -> Result<String, ServiceError> {
    let text: String = body
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(ServiceError::Upstream("Model returned no content".to_string()));
    }
    Ok(text)
}
