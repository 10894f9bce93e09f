use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::{TransportError, truncate_body};

use super::{GenerationRequest, ModelReply, ModelTransport, RawCitation};

pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Gemini `generateContent` over HTTPS.
#[derive(Debug, Clone)]
pub struct GeminiTransport {
    api_key: String,
    model: String,
    base_url: String,
    http: Client,
}

impl GeminiTransport {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            http: Client::new(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model)
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<GenerateContent<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Tool>,
}

#[derive(Debug, Serialize)]
struct GenerateContent<'a> {
    role: &'static str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct Tool {
    google_search: GoogleSearch,
}

#[derive(Debug, Serialize)]
struct GoogleSearch {}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Option<Vec<serde_json::Value>>,
}

impl From<GenerateResponse> for ModelReply {
    fn from(response: GenerateResponse) -> Self {
        let Some(candidate) = response.candidates.into_iter().next() else {
            return ModelReply::default();
        };

        let text = candidate
            .content
            .map(|content| {
                content.parts.into_iter().filter_map(|part| part.text).collect::<String>()
            })
            .unwrap_or_default();

        let citations = candidate
            .grounding_metadata
            .and_then(|metadata| metadata.grounding_chunks)
            .map(RawCitation::from_chunks)
            .unwrap_or_default();

        ModelReply { text, citations }
    }
}

#[async_trait]
impl ModelTransport for GeminiTransport {
    #[instrument(skip_all, fields(model = %self.model, grounding = request.search_grounding))]
    async fn generate(&self, request: &GenerationRequest) -> Result<ModelReply, TransportError> {
        let tools = if request.search_grounding {
            vec![Tool { google_search: GoogleSearch {} }]
        } else {
            Vec::new()
        };

        let body = GenerateRequest {
            contents: vec![GenerateContent {
                role: "user",
                parts: vec![RequestPart { text: &request.prompt }],
            }],
            tools,
        };

        let res = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = res.status();
        let text = res.text().await?;

        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                body: truncate_body(&text),
            });
        }

        let parsed: GenerateResponse = serde_json::from_str(&text)?;
        let reply = ModelReply::from(parsed);
        debug!(chars = reply.text.len(), citations = reply.citations.len(), "model replied");

        Ok(reply)
    }
}
