//! Recommendation dispatcher
//!
//! Builds the prompt, sends exactly one request to the recommendation
//! endpoint and hands the decoded result to the renderer. There is no retry
//! and no cancellation; a response that arrives after a newer request was
//! issued is dropped instead of being rendered.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};

use crate::config::ServiceConfig;
use crate::envelope::decode_envelope;
use crate::models::{Preferences, RecommendationResult};
use crate::prompt::build_prompt;
use crate::render::{self, RecommendationView, RenderSummary};
use crate::{Result, WanderplanError};

/// JSON body posted to the recommendation endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationRequest {
    pub prompt: String,
    pub starting_city: String,
}

impl From<&Preferences> for RecommendationRequest {
    fn from(preferences: &Preferences) -> Self {
        Self {
            prompt: build_prompt(preferences),
            starting_city: preferences.starting_city.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(u64);

/// Hands out increasing request ids and remembers the latest one
#[derive(Debug, Default)]
pub struct RequestTracker {
    latest: AtomicU64,
}

impl RequestTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self) -> RequestId {
        RequestId(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    #[must_use]
    pub fn is_latest(&self, id: RequestId) -> bool {
        self.latest.load(Ordering::SeqCst) == id.0
    }
}

/// What happened to a dispatched request
#[derive(Debug)]
pub enum Outcome {
    Rendered(RenderSummary),
    /// The error has already been written to the view's error surface
    Failed(WanderplanError),
    /// A newer request was issued before this one completed
    Superseded(RequestId),
}

/// Client for the recommendation endpoint
#[derive(Clone)]
pub struct RecommendationClient {
    client: Client,
    endpoint: String,
    tracker: Arc<RequestTracker>,
}

impl RecommendationClient {
    /// Create a client for the configured endpoint
    pub fn new(config: &ServiceConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| WanderplanError::config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self::with_http_client(client, config.endpoint_url()))
    }

    /// Create a client around an existing HTTP client
    #[must_use]
    pub fn with_http_client(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            tracker: Arc::new(RequestTracker::new()),
        }
    }

    /// Share a request tracker with other clients
    #[must_use]
    pub fn with_tracker(mut self, tracker: Arc<RequestTracker>) -> Self {
        self.tracker = tracker;
        self
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    #[must_use]
    pub fn tracker(&self) -> &Arc<RequestTracker> {
        &self.tracker
    }

    /// Send one recommendation request and decode the answer
    #[instrument(skip(self, preferences), fields(starting_city = %preferences.starting_city))]
    pub async fn fetch(&self, preferences: &Preferences) -> Result<RecommendationResult> {
        let request = RecommendationRequest::from(preferences);
        debug!("Prompt is {} characters", request.prompt.len());
        self.send(&request).await
    }

    async fn send(&self, request: &RecommendationRequest) -> Result<RecommendationResult> {
        let start_time = Instant::now();

        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        debug!(
            "HTTP response received: {} in {:.3}s",
            status,
            start_time.elapsed().as_secs_f64()
        );

        if !status.is_success() {
            warn!("Recommendation endpoint returned {}", status);
            return Err(WanderplanError::transport(status.as_u16()));
        }

        let body = response.text().await?;
        let result = decode_envelope(status.as_u16(), &body)?;

        info!(
            "Received {} recommendations in {:.3}s",
            result.cities.len(),
            start_time.elapsed().as_secs_f64()
        );
        Ok(result)
    }

    /// Request recommendations and render them into `view`.
    ///
    /// Every failure is written to the view's error surface; nothing is
    /// propagated past this call.
    pub async fn get_recommendations(
        &self,
        preferences: &Preferences,
        view: &mut dyn RecommendationView,
    ) -> Outcome {
        let id = self.tracker.begin();
        let result = self.fetch(preferences).await;

        if !self.tracker.is_latest(id) {
            debug!("Dropping response for superseded request {:?}", id);
            return Outcome::Superseded(id);
        }

        match result {
            Ok(result) => match render::display_recommendations(&result, view) {
                Ok(summary) => Outcome::Rendered(summary),
                Err(err) => Outcome::Failed(err),
            },
            Err(err) => {
                error!("Error: {}", err);
                view.show_error(&err.user_message());
                Outcome::Failed(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{Page, RECOMMENDATIONS_TAB};
    use axum::{Json, Router, http::HeaderMap, http::StatusCode, routing::post};
    use serde_json::{Value, json};
    use std::time::Duration;
    use tokio::{net::TcpListener, sync::mpsc};

    const INNER: &str = r#"{
        "cities": [
            {"name": "Rome, Italy", "activities": ["history"], "budget": "moderate",
             "bestSeasons": ["spring"], "description": "Eternal city"},
            {"name": "Seville, Spain", "activities": ["flamenco"], "budget": "budget-friendly",
             "bestSeasons": ["spring", "fall"], "description": "Andalusian capital"}
        ],
        "travelTimes": {"Rome, Italy": {"Seville, Spain": {"airplane": 2.5}}}
    }"#;

    async fn spawn_server(app: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        format!("http://{addr}")
    }

    fn client_for(endpoint: String) -> RecommendationClient {
        let http = Client::builder().no_proxy().build().unwrap();
        RecommendationClient::with_http_client(http, endpoint)
    }

    fn answering(status: StatusCode, body: Value) -> Router {
        Router::new().route(
            "/api/gemini",
            post(move || {
                let body = body.clone();
                async move { (status, Json(body)) }
            }),
        )
    }

    fn preferences() -> Preferences {
        Preferences::new("Berlin")
            .with_activities(["history"])
            .with_dates("2025-04-01", "2025-04-10")
    }

    #[tokio::test]
    async fn test_posts_prompt_and_starting_city() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let app = Router::new().route(
            "/api/gemini",
            post(move |headers: HeaderMap, Json(body): Json<RecommendationRequest>| {
                let tx = tx.clone();
                async move {
                    let content_type = headers
                        .get("content-type")
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or_default()
                        .to_string();
                    let _ = tx.send((content_type, body));
                    Json(json!({ "response": INNER }))
                }
            }),
        );
        let base = spawn_server(app).await;
        let client = client_for(format!("{base}/api/gemini"));

        let result = client.fetch(&preferences()).await.unwrap();
        assert_eq!(result.cities.len(), 2);

        let (content_type, body) = rx.recv().await.unwrap();
        assert_eq!(content_type, "application/json");
        assert_eq!(body.starting_city, "Berlin");
        assert_eq!(body.prompt, build_prompt(&preferences()));
    }

    #[tokio::test]
    async fn test_success_renders_cards_in_order() {
        let base = spawn_server(answering(StatusCode::OK, json!({ "response": INNER }))).await;
        let client = client_for(format!("{base}/api/gemini"));
        let mut page = Page::new();

        let outcome = client.get_recommendations(&preferences(), &mut page).await;

        assert!(matches!(outcome, Outcome::Rendered(RenderSummary { cards: 2, rows: 1 })));
        assert_eq!(page.cards()[0].name, "Rome, Italy");
        assert_eq!(page.cards()[1].name, "Seville, Spain");
        assert_eq!(page.travel_times()[0].train, "N/A");
        assert!(page.error().is_none());
    }

    #[tokio::test]
    async fn test_server_error_status_is_reported_without_rendering() {
        let base = spawn_server(answering(
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({ "response": INNER }),
        ))
        .await;
        let client = client_for(format!("{base}/api/gemini"));
        let mut page = Page::new();

        let outcome = client.get_recommendations(&preferences(), &mut page).await;

        assert!(matches!(
            outcome,
            Outcome::Failed(WanderplanError::Transport { status: 500 })
        ));
        assert!(page.error().unwrap().contains("500"));
        assert!(page.active_tab().is_none());
        assert!(page.cards().is_empty());
    }

    #[tokio::test]
    async fn test_service_error_message_is_surfaced_verbatim() {
        let base =
            spawn_server(answering(StatusCode::OK, json!({ "error": "quota exceeded" }))).await;
        let client = client_for(format!("{base}/api/gemini"));
        let mut page = Page::new();

        let outcome = client.get_recommendations(&preferences(), &mut page).await;

        assert!(matches!(outcome, Outcome::Failed(WanderplanError::Service { .. })));
        assert_eq!(page.error(), Some("Error: quota exceeded"));
        assert_ne!(page.active_tab(), Some(RECOMMENDATIONS_TAB));
    }

    #[tokio::test]
    async fn test_bad_inner_json_is_reported() {
        let base = spawn_server(answering(StatusCode::OK, json!({ "response": "not json" }))).await;
        let client = client_for(format!("{base}/api/gemini"));
        let mut page = Page::new();

        let outcome = client.get_recommendations(&preferences(), &mut page).await;

        assert!(matches!(outcome, Outcome::Failed(WanderplanError::Parse { .. })));
        assert!(page.error().unwrap().starts_with("Error: "));
        assert!(page.cards().is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_reported() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = client_for(format!("http://{addr}/api/gemini"));
        let mut page = Page::new();

        let outcome = client.get_recommendations(&preferences(), &mut page).await;

        assert!(matches!(outcome, Outcome::Failed(WanderplanError::Network { .. })));
        assert!(page.error().is_some());
    }

    #[tokio::test]
    async fn test_late_response_is_superseded() {
        let slow = Router::new().route(
            "/api/gemini",
            post(|| async {
                tokio::time::sleep(Duration::from_millis(400)).await;
                Json(json!({ "response": INNER }))
            }),
        );
        let slow_base = spawn_server(slow).await;
        let fast_base = spawn_server(answering(StatusCode::OK, json!({ "response": INNER }))).await;

        let tracker = Arc::new(RequestTracker::new());
        let slow_client =
            client_for(format!("{slow_base}/api/gemini")).with_tracker(tracker.clone());
        let fast_client = client_for(format!("{fast_base}/api/gemini")).with_tracker(tracker);

        let mut first_page = Page::new();
        let mut second_page = Page::new();
        let prefs = preferences();

        let (first, second) = tokio::join!(
            slow_client.get_recommendations(&prefs, &mut first_page),
            async {
                tokio::time::sleep(Duration::from_millis(100)).await;
                fast_client.get_recommendations(&prefs, &mut second_page).await
            }
        );

        assert!(matches!(first, Outcome::Superseded(_)));
        assert!(matches!(second, Outcome::Rendered(_)));
        assert!(first_page.cards().is_empty());
        assert!(first_page.error().is_none());
        assert_eq!(second_page.cards().len(), 2);
    }

    #[test]
    fn test_request_tracker() {
        let tracker = RequestTracker::new();
        let first = tracker.begin();
        assert!(tracker.is_latest(first));
        let second = tracker.begin();
        assert!(second > first);
        assert!(!tracker.is_latest(first));
        assert!(tracker.is_latest(second));
    }

    #[test]
    fn test_request_body_shape() {
        let request = RecommendationRequest::from(&preferences());
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["startingCity"], "Berlin");
        assert!(value["prompt"].as_str().unwrap().contains("Berlin"));
    }
}
