// HTTP/JSON surface of the price service
//
// Core calls block (network, SQLite), so every handler moves its work onto
// the blocking pool.

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::fetcher::ByteStreamSource;
use crate::generator::{generate_feed, DEFAULT_COUNT};
use crate::service::{FetchReply, ListReply, PriceService};
use crate::store::RecordCollection;

/// Upper bound for `/generator.csv?count=`
pub const MAX_GENERATED_ROWS: usize = 100_000;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody {
    code: u16,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Internal(reason) => (StatusCode::INTERNAL_SERVER_ERROR, reason.clone()),
        };
        let body = Json(ErrorBody {
            code: status.as_u16(),
            message,
        });
        (status, body).into_response()
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        ApiError::Internal(format!("request task failed: {}", err))
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Shared application state
pub struct AppState<S, C> {
    service: Arc<PriceService<S, C>>,
}

impl<S, C> Clone for AppState<S, C> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct FetchRequest {
    #[serde(default)]
    pub url: String,
}

/// Missing parameters fall through to the store's normalization.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
    #[serde(alias = "orderBy")]
    pub order_by: Option<String>,
    #[serde(alias = "orderDirection")]
    pub order_direction: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct GeneratorParams {
    pub count: Option<String>,
    pub plain: Option<String>,
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

/// POST /api/fetch - Download a feed and import it
///
/// Feed and storage failures come back as `status: "error"` in a 200 reply,
/// like any other RPC result.
async fn fetch<S, C>(
    State(state): State<AppState<S, C>>,
    Json(request): Json<FetchRequest>,
) -> ApiResult<Json<FetchReply>>
where
    S: ByteStreamSource + 'static,
    C: RecordCollection + 'static,
{
    let service = Arc::clone(&state.service);
    let reply =
        tokio::task::spawn_blocking(move || service.fetch_and_import(&request.url)).await?;
    Ok(Json(reply))
}

/// GET /api/prices - One page of stored prices
async fn list_prices<S, C>(
    State(state): State<AppState<S, C>>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<ListReply>>
where
    S: ByteStreamSource + 'static,
    C: RecordCollection + 'static,
{
    let service = Arc::clone(&state.service);
    let reply = tokio::task::spawn_blocking(move || {
        service.list_prices(
            params.skip.unwrap_or(0),
            params.limit.unwrap_or(0),
            params.order_by.as_deref().unwrap_or_default(),
            params.order_direction.as_deref().unwrap_or_default(),
        )
    })
    .await?;
    Ok(Json(reply))
}

/// GET /generator.csv - Random feed; `plain=true` skips the download headers
async fn generator(Query(params): Query<GeneratorParams>) -> Response {
    let count = params
        .count
        .as_deref()
        .and_then(|c| c.parse::<usize>().ok())
        .unwrap_or(DEFAULT_COUNT)
        .min(MAX_GENERATED_ROWS);

    let feed = generate_feed(&mut rand::thread_rng(), count);

    if params.plain.as_deref() == Some("true") {
        return feed.into_response();
    }

    (
        [
            (header::CONTENT_TYPE, "text/csv"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=generator.csv",
            ),
            (header::PRAGMA, "no-cache"),
            (header::EXPIRES, "0"),
        ],
        feed,
    )
        .into_response()
}

/// Build the full router around an explicitly constructed service.
pub fn app_router<S, C>(service: Arc<PriceService<S, C>>, static_dir: Option<&Path>) -> Router
where
    S: ByteStreamSource + 'static,
    C: RecordCollection + 'static,
{
    let state = AppState { service };

    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/fetch", post(fetch::<S, C>))
        .route("/prices", get(list_prices::<S, C>))
        .with_state(state);

    let mut app = Router::new()
        .route("/generator.csv", get(generator))
        .nest("/api", api_routes);

    if let Some(dir) = static_dir {
        app = app.nest_service("/static", ServeDir::new(dir));
    }

    app.layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
