//! Language model client
//!
//! The proxy server talks to the model through the [`LanguageModel`] trait;
//! [`GeminiClient`] implements it against the generative language REST API.

use std::time::Instant;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument};

use crate::config::ModelConfig;
use crate::{Result, WanderplanError};

/// Text-in, text-out model
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Client for `models/{name}:generateContent`
pub struct GeminiClient {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
}

#[derive(Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    error: Option<ApiError>,
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

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

impl GenerateResponse {
    /// Concatenated text parts of the first candidate
    fn text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        let text: String = content.parts.into_iter().filter_map(|part| part.text).collect();
        (!text.is_empty()).then_some(text)
    }
}

impl GeminiClient {
    /// Create a client from configuration. Fails without an API key.
    pub fn new(config: &ModelConfig, user_agent: &str) -> Result<Self> {
        let api_key = config.api_key.clone().ok_or_else(|| {
            WanderplanError::config(
                "Model API key is required. Set GOOGLE_API_KEY or model.api_key in the config file.",
            )
        })?;

        let client = Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(|e| WanderplanError::config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self::with_http_client(client, &config.base_url, &config.name, api_key))
    }

    #[must_use]
    pub fn with_http_client(
        client: Client,
        base_url: &str,
        model: &str,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: api_key.into(),
        }
    }

    fn url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url,
            urlencoding::encode(&self.model)
        )
    }
}

#[async_trait]
impl LanguageModel for GeminiClient {
    #[instrument(skip(self, prompt), fields(model = %self.model))]
    async fn generate(&self, prompt: &str) -> Result<String> {
        let start_time = Instant::now();
        debug!("Calling model with a {} character prompt", prompt.len());

        let request = GenerateRequest {
            contents: [Content {
                parts: [Part { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(self.url())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| WanderplanError::model(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| WanderplanError::model(e.to_string()))?;

        if !status.is_success() {
            let message = serde_json::from_str::<GenerateResponse>(&body)
                .ok()
                .and_then(|parsed| parsed.error)
                .map(|e| e.message)
                .unwrap_or_else(|| format!("model request failed with status {status}"));
            error!("Model call failed ({}): {}", status, message);
            return Err(WanderplanError::model(message));
        }

        let parsed: GenerateResponse = serde_json::from_str(&body)
            .map_err(|e| WanderplanError::model(format!("Invalid model response: {e}")))?;

        let text = parsed
            .text()
            .ok_or_else(|| WanderplanError::model("Empty response from model"))?;

        info!(
            "Model answered with {} characters in {:.3}s",
            text.len(),
            start_time.elapsed().as_secs_f64()
        );
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Json, Router, http::HeaderMap, http::StatusCode, http::Uri};
    use serde_json::{Value, json};
    use tokio::{net::TcpListener, sync::mpsc};

    type Captured = (String, String, Value);

    async fn serve(app: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        format!("http://{addr}/v1beta")
    }

    async fn spawn_model(
        status: StatusCode,
        answer: Value,
    ) -> (String, mpsc::UnboundedReceiver<Captured>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let app = Router::new().fallback(
            move |uri: Uri, headers: HeaderMap, Json(body): Json<Value>| {
                let tx = tx.clone();
                let answer = answer.clone();
                async move {
                    let key = headers
                        .get("x-goog-api-key")
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or_default()
                        .to_string();
                    let _ = tx.send((uri.path().to_string(), key, body));
                    (status, Json(answer))
                }
            },
        );
        (serve(app).await, rx)
    }

    fn client(base_url: &str) -> GeminiClient {
        let http = Client::builder().no_proxy().build().unwrap();
        GeminiClient::with_http_client(http, base_url, "test-model", "secret-key")
    }

    #[tokio::test]
    async fn test_generate_concatenates_text_parts() {
        let answer = json!({
            "candidates": [
                {"content": {"parts": [{"text": "{\"cities\": "}, {"text": "[]}"}]}},
                {"content": {"parts": [{"text": "ignored"}]}}
            ]
        });
        let (base, mut rx) = spawn_model(StatusCode::OK, answer).await;

        let text = client(&base).generate("Recommend cities").await.unwrap();
        assert_eq!(text, "{\"cities\": []}");

        let (path, key, body) = rx.recv().await.unwrap();
        assert_eq!(path, "/v1beta/models/test-model:generateContent");
        assert_eq!(key, "secret-key");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "Recommend cities");
    }

    #[tokio::test]
    async fn test_api_error_message_is_kept() {
        let answer = json!({"error": {"code": 429, "message": "Resource has been exhausted"}});
        let (base, _rx) = spawn_model(StatusCode::TOO_MANY_REQUESTS, answer).await;

        let err = client(&base).generate("hi").await.unwrap_err();
        assert!(matches!(err, WanderplanError::Model { .. }));
        assert_eq!(err.to_string(), "Gemini API error: Resource has been exhausted");
    }

    #[tokio::test]
    async fn test_empty_candidates_is_an_error() {
        let (base, _rx) = spawn_model(StatusCode::OK, json!({"candidates": []})).await;

        let err = client(&base).generate("hi").await.unwrap_err();
        assert!(err.to_string().contains("Empty response"));
    }

    #[tokio::test]
    async fn test_non_json_success_body_is_reported() {
        let app = Router::new().fallback(|| async { "<html>proxy login page</html>" });
        let base = serve(app).await;

        let err = client(&base).generate("hi").await.unwrap_err();
        assert!(matches!(err, WanderplanError::Model { .. }));
        assert!(err.to_string().starts_with("Gemini API error: Invalid model response:"));
    }

    #[tokio::test]
    async fn test_non_json_error_body_falls_back_to_status() {
        let app = Router::new()
            .fallback(|| async { (StatusCode::BAD_GATEWAY, "<html>upstream down</html>") });
        let base = serve(app).await;

        let err = client(&base).generate("hi").await.unwrap_err();
        assert!(err.to_string().contains("502"));
    }

    #[test]
    fn test_missing_api_key_is_config_error() {
        let config = ModelConfig::default();
        let result = GeminiClient::new(&config, "test-agent");
        assert!(matches!(result, Err(WanderplanError::Config { .. })));
    }
}
