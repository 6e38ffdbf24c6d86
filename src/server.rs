//! Recommendation proxy
//!
//! `POST /api/gemini` takes `{prompt, startingCity}` (plus optional structured
//! preference fields), calls the language model and answers with
//! `{"response": "<model text>"}` or `{"error": "..."}`.
//!
//! `POST /get_travel_times` takes `{cities, startingCity}` and answers with
//! `{"travel_times": {...}}`, normalised by [`process_travel_times`].

use std::sync::Arc;

use anyhow::Context;
use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info};

use crate::config::WanderplanConfig;
use crate::llm::{GeminiClient, LanguageModel};
use crate::models::{Budget, Preferences, RouteTable, process_travel_times};
use crate::prompt::{build_prompt, city_correction_prompt, travel_times_prompt};
use crate::{Result, WanderplanError};

#[derive(Clone)]
pub struct AppState {
    model: Arc<dyn LanguageModel>,
    correct_starting_city: bool,
}

impl AppState {
    #[must_use]
    pub fn new(model: Arc<dyn LanguageModel>, correct_starting_city: bool) -> Self {
        Self {
            model,
            correct_starting_city,
        }
    }
}

/// Body accepted by the proxy
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyRequest {
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub starting_city: String,
    #[serde(default)]
    pub activities: Vec<String>,
    #[serde(default)]
    pub budget: Option<Budget>,
    #[serde(default)]
    pub regions: Vec<String>,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
}

/// Body returned by the proxy: `{"response": ...}` or `{"error": ...}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProxyResponse {
    Response(String),
    Error(String),
}

/// Body accepted by the travel-time endpoint
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TravelTimesRequest {
    #[serde(default)]
    pub cities: Vec<String>,
    #[serde(default)]
    pub starting_city: String,
}

#[derive(Debug, Serialize)]
pub struct TravelTimesResponse {
    pub travel_times: RouteTable,
}

pub fn router(state: AppState, max_body_bytes: usize) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/gemini", post(gemini_api))
        .route("/get_travel_times", post(get_travel_times))
        .with_state(state)
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Bind the configured address and serve until Ctrl-C
pub async fn run(config: &WanderplanConfig) -> anyhow::Result<()> {
    let model = GeminiClient::new(&config.model, &config.service.user_agent)?;
    let state = AppState::new(Arc::new(model), config.model.correct_starting_city);
    let max_body_bytes = usize::try_from(config.server.max_body_kb)
        .context("Body limit does not fit in memory")?
        * 1024;
    let app = router(state, max_body_bytes);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Recommendation proxy running at http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutting down");
}

type ErrorResponse = (StatusCode, Json<ProxyResponse>);

fn rejected(rejection: &JsonRejection) -> ErrorResponse {
    debug!("Rejected request body: {}", rejection.body_text());
    (
        StatusCode::BAD_REQUEST,
        Json(ProxyResponse::Error(rejection.body_text())),
    )
}

/// Validation failures are the caller's fault; everything else is a 500
fn failed(err: &WanderplanError) -> ErrorResponse {
    let status = match err {
        WanderplanError::Validation { .. } => StatusCode::BAD_REQUEST,
        _ => {
            error!("Error in recommendation proxy: {}", err);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, Json(ProxyResponse::Error(err.to_string())))
}

async fn gemini_api(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ProxyRequest>, JsonRejection>,
) -> ErrorResponse {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return rejected(&rejection),
    };

    match recommend(&state, request).await {
        Ok(text) => (StatusCode::OK, Json(ProxyResponse::Response(text))),
        Err(err) => failed(&err),
    }
}

async fn get_travel_times(
    State(state): State<AppState>,
    payload: std::result::Result<Json<TravelTimesRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return rejected(&rejection).into_response(),
    };

    match travel_times(&state, request).await {
        Ok(travel_times) => Json(TravelTimesResponse { travel_times }).into_response(),
        Err(err) => failed(&err).into_response(),
    }
}

async fn travel_times(state: &AppState, request: TravelTimesRequest) -> Result<RouteTable> {
    let TravelTimesRequest {
        mut cities,
        starting_city,
    } = request;
    if cities.is_empty() {
        return Err(WanderplanError::validation("No cities provided"));
    }

    let starting_city = starting_city.trim();
    if !starting_city.is_empty() {
        cities.insert(0, starting_city.to_string());
    }
    info!("Generating travel times for {} cities", cities.len());

    let text = state.model.generate(&travel_times_prompt(&cities)).await?;
    let table = process_travel_times(&text);
    debug!("Normalised travel times for {} origins", table.len());
    Ok(table)
}

async fn recommend(state: &AppState, request: ProxyRequest) -> Result<String> {
    let starting_city = request.starting_city.trim();
    if starting_city.is_empty() {
        return Err(WanderplanError::validation("Starting city is required"));
    }
    info!("Processing request for starting city: {}", starting_city);

    let prompt = if request.prompt.trim().is_empty() {
        let starting_city = if state.correct_starting_city {
            correct_city(state.model.as_ref(), starting_city).await?
        } else {
            starting_city.to_string()
        };
        build_prompt(&Preferences {
            starting_city,
            activities: request.activities,
            budget: request.budget.unwrap_or_default(),
            regions: request.regions,
            start_date: request.start_date,
            end_date: request.end_date,
        })
    } else {
        request.prompt
    };

    state.model.generate(&prompt).await
}

/// Ask the model for the "City, Country" form of a free-form city name
async fn correct_city(model: &dyn LanguageModel, starting_city: &str) -> Result<String> {
    let corrected = model.generate(&city_correction_prompt(starting_city)).await?;
    let corrected = corrected.trim().trim_matches('"').trim();
    if corrected.is_empty() {
        return Ok(starting_city.to_string());
    }
    debug!("Corrected city: {}", corrected);
    Ok(corrected.to_string())
}
