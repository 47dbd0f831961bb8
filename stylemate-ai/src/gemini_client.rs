//! Gemini API client
//!
//! Calls `{base_url}/v1beta/models/{model}:generateContent` with the prompt
//! parts inline and a JSON response schema, and returns the text of the first
//! candidate.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use stylemate_common::config::GeminiConfig;

use crate::model::{GenerationRequest, GenerativeModel, Part};
use crate::ModelError;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
const USER_AGENT: &str = concat!("StyleMate/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentBody<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig<'a>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<WirePart<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum WirePart<'a> {
    #[serde(rename_all = "camelCase")]
    Inline { inline_data: InlineData<'a> },
    Text { text: &'a str },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData<'a> {
    mime_type: &'a str,
    data: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    response_mime_type: &'static str,
    response_schema: &'a serde_json::Value,
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
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Text of the first part of the first candidate
    fn first_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .find_map(|p| p.text)
            .filter(|t| !t.trim().is_empty())
    }
}

fn to_body(request: &GenerationRequest) -> GenerateContentBody<'_> {
    let parts = request
        .parts
        .iter()
        .map(|part| match part {
            Part::Image(image) => WirePart::Inline {
                inline_data: InlineData {
                    mime_type: &image.mime_type,
                    data: &image.data,
                },
            },
            Part::Text(text) => WirePart::Text { text },
        })
        .collect();

    GenerateContentBody {
        contents: vec![Content { parts }],
        generation_config: GenerationConfig {
            response_mime_type: "application/json",
            response_schema: &request.response_schema,
        },
    }
}

// ============================================================================
// Client
// ============================================================================

/// Gemini generateContent client
pub struct GeminiClient {
    http_client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl GeminiClient {
    pub fn new(api_key: String) -> Result<Self, ModelError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ModelError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            api_key,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Client using the model and base URL overrides from configuration
    pub fn from_config(api_key: String, config: &GeminiConfig) -> Result<Self, ModelError> {
        let mut client = Self::new(api_key)?;
        if let Some(model) = config.model.as_deref().filter(|m| !m.trim().is_empty()) {
            client = client.with_model(model);
        }
        if let Some(base_url) = config.base_url.as_deref().filter(|u| !u.trim().is_empty()) {
            client = client.with_base_url(base_url);
        }
        Ok(client)
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model)
    }
}

#[async_trait]
impl GenerativeModel for GeminiClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, ModelError> {
        tracing::debug!(
            model = %self.model,
            images = request.image_count(),
            "Calling Gemini generateContent"
        );

        let response = self
            .http_client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&to_body(request))
            .send()
            .await
            .map_err(|e| ModelError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ModelError::Api(status.as_u16(), error_text));
        }

        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ModelError::Parse(e.to_string()))?;

        body.first_text().ok_or(ModelError::EmptyResponse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::{Path, State};
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex};
    use stylemate_common::ImageData;

    #[derive(Clone, Default)]
    struct Captured {
        call: Arc<Mutex<Option<(String, Option<String>, Value)>>>,
    }

    /// Serve `reply` from a local endpoint, recording what the client sent
    async fn mock_server(status: StatusCode, reply: Value) -> (String, Captured) {
        let captured = Captured::default();

        let app = Router::new()
            .route(
                "/v1beta/models/:call",
                post(
                    move |State(captured): State<Captured>,
                          Path(call): Path<String>,
                          headers: HeaderMap,
                          Json(body): Json<Value>| {
                        let reply = reply.clone();
                        async move {
                            let key = headers
                                .get("x-goog-api-key")
                                .and_then(|v| v.to_str().ok())
                                .map(str::to_string);
                            *captured.call.lock().unwrap() = Some((call, key, body));
                            (status, Json(reply))
                        }
                    },
                ),
            )
            .with_state(captured.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{}", addr), captured)
    }

    fn request() -> GenerationRequest {
        GenerationRequest::new(json!({"type": "ARRAY"}))
            .image(ImageData::new("image/png", "AAAA"))
            .text("Describe")
    }

    #[tokio::test]
    async fn test_generate_sends_wire_format_and_reads_first_text() {
        let (base_url, captured) = mock_server(
            StatusCode::OK,
            json!({"candidates": [{"content": {"parts": [{"text": "[1,2]"}]}}]}),
        )
        .await;

        let client = GeminiClient::new("test-key".to_string())
            .unwrap()
            .with_base_url(base_url);

        let text = client.generate(&request()).await.unwrap();
        assert_eq!(text, "[1,2]");

        let (call, key, body) = captured.call.lock().unwrap().clone().unwrap();
        assert_eq!(call, "gemini-2.5-flash:generateContent");
        assert_eq!(key.as_deref(), Some("test-key"));
        assert_eq!(
            body["contents"][0]["parts"][0]["inlineData"]["mimeType"],
            "image/png"
        );
        assert_eq!(body["contents"][0]["parts"][1]["text"], "Describe");
        assert_eq!(
            body["generationConfig"]["responseMimeType"],
            "application/json"
        );
        assert_eq!(body["generationConfig"]["responseSchema"]["type"], "ARRAY");
    }

    #[tokio::test]
    async fn test_non_success_status_is_api_error() {
        let (base_url, _) =
            mock_server(StatusCode::FORBIDDEN, json!({"error": {"message": "bad key"}})).await;

        let client = GeminiClient::new("k".to_string()).unwrap().with_base_url(base_url);
        let err = client.generate(&request()).await.unwrap_err();

        assert!(matches!(err, ModelError::Api(403, _)));
    }

    #[tokio::test]
    async fn test_missing_candidates_is_empty_response() {
        let (base_url, _) = mock_server(StatusCode::OK, json!({"candidates": []})).await;

        let client = GeminiClient::new("k".to_string()).unwrap().with_base_url(base_url);
        let err = client.generate(&request()).await.unwrap_err();

        assert!(matches!(err, ModelError::EmptyResponse));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_network_error() {
        // Bind then drop to get a port nobody listens on
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = GeminiClient::new("k".to_string())
            .unwrap()
            .with_base_url(format!("http://{}", addr));
        let err = client.generate(&request()).await.unwrap_err();

        assert!(matches!(err, ModelError::Network(_)));
    }

    #[test]
    fn test_from_config_overrides() {
        let config = GeminiConfig {
            api_key: None,
            model: Some("gemini-test".to_string()),
            base_url: Some("http://localhost:9/".to_string()),
        };
        let client = GeminiClient::from_config("k".to_string(), &config).unwrap();

        assert_eq!(client.model(), "gemini-test");
        assert_eq!(
            client.endpoint(),
            "http://localhost:9/v1beta/models/gemini-test:generateContent"
        );
    }
}
