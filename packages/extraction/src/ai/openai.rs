//! OpenAI implementation of the Extractor trait.
//!
//! Uses chat completions with a JSON-schema `response_format` so the model
//! returns records in the exact shape the planner expects.
//!
//! # Example
//!
//! ```rust,ignore
//! use extraction::ai::OpenAIExtractor;
//!
//! let extractor = OpenAIExtractor::new("sk-...").with_model("gpt-4o-mini");
//! let places = extractor.extract_candidates(&request).await?;
//! ```

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ExtractionError, Result};
use crate::searchers::tavily::retry_after;
use crate::security::SecretString;
use crate::traits::extractor::Extractor;
use crate::types::{
    candidate::{CandidateEnvelope, ExtractedPlace},
    request::ExtractionRequest,
    skeleton::DayPlanSkeleton,
};

const CANDIDATE_SYSTEM_PROMPT: &str = r#"You extract real, visitable places from travel content.

Rules:
- Only include places physically located in the requested city.
- "type" must be one of: attraction, restaurant, bar, club, experience, view, zone.
- Copy names exactly as written; do not invent places that are not in the text.
- "confidence" is how sure you are the place exists and is in the city (0.0-1.0).
- Leave a field null when the text says nothing about it."#;

const SKELETON_SYSTEM_PROMPT: &str = r#"You outline multi-day city trips.
For each day give the neighborhood to focus on and a short theme.
Return exactly one entry per requested day, numbered from 1."#;

/// OpenAI-based extractor.
#[derive(Clone)]
pub struct OpenAIExtractor {
    client: Client,
    api_key: SecretString,
    model: String,
    base_url: String,
}

impl OpenAIExtractor {
    /// Create a new extractor with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: SecretString::new(api_key),
            model: "gpt-4o".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
        }
    }

    /// Create from environment variable `OPENAI_API_KEY`.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| ExtractionError::Config("OPENAI_API_KEY not set".into()))?;
        Ok(Self::new(api_key))
    }

    /// Set the chat model (default: gpt-4o).
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set a custom base URL (for Azure, proxies, etc.).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Get the current model name.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Structured output call, deserialized into `T`.
    ///
    /// A response that does not parse as `T` is `Malformed`, never a panic.
    async fn generate_structured<T: DeserializeOwned>(
        &self,
        system: &str,
        user: &str,
        schema_name: &str,
        schema: serde_json::Value,
    ) -> Result<T> {
        let request = StructuredRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user.to_string(),
                },
            ],
            temperature: 0.0,
            response_format: ResponseFormat {
                format_type: "json_schema".to_string(),
                json_schema: JsonSchemaFormat {
                    name: schema_name.to_string(),
                    strict: false,
                    schema,
                },
            },
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key.expose()))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| ExtractionError::Http(Box::new(e)))?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = retry_after(response.headers());
            let error_text = response.text().await.unwrap_or_default();
            return Err(ExtractionError::from_status(
                status.as_u16(),
                retry_after,
                &error_text,
            ));
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| ExtractionError::malformed(e.to_string()))?;

        let content = chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| ExtractionError::malformed("no choices in response"))?;

        debug!(schema = schema_name, bytes = content.len(), "Structured response received");

        serde_json::from_str(&content).map_err(|e| ExtractionError::malformed(e.to_string()))
    }
}

#[async_trait]
impl Extractor for OpenAIExtractor {
    async fn extract_candidates(&self, request: &ExtractionRequest) -> Result<Vec<ExtractedPlace>> {
        let schema = serde_json::to_value(schemars::schema_for!(CandidateEnvelope))
            .map_err(|e| ExtractionError::Config(e.to_string()))?;

        let user = format!(
            "City: {}\nCategory: {}\n\nContent:\n{}",
            request.city, request.label, request.corpus
        );

        let envelope: CandidateEnvelope = self
            .generate_structured(CANDIDATE_SYSTEM_PROMPT, &user, "candidate_places", schema)
            .await?;

        Ok(envelope.places)
    }

    async fn plan_skeleton(&self, prompt: &str) -> Result<DayPlanSkeleton> {
        let schema = serde_json::to_value(schemars::schema_for!(DayPlanSkeleton))
            .map_err(|e| ExtractionError::Config(e.to_string()))?;

        self.generate_structured(SKELETON_SYSTEM_PROMPT, prompt, "day_plan_skeleton", schema)
            .await
    }
}

// =============================================================================
// Wire types
// =============================================================================

#[derive(Serialize)]
struct StructuredRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    response_format: ResponseFormat,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: String,
    json_schema: JsonSchemaFormat,
}

#[derive(Serialize)]
struct JsonSchemaFormat {
    name: String,
    strict: bool,
    schema: serde_json::Value,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}
