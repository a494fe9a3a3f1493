use axum::{
    extract::{Json, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gamevault_search::core::AppDetailsResponse;
use gamevault_search::{EngineConfig, SearchEngine, SearchError, SearchResponse};

#[derive(Clone)]
struct AppState {
    engine: Arc<SearchEngine>,
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    #[serde(default)]
    q: String,
}

#[derive(Debug, Deserialize)]
struct AppParams {
    #[serde(default, rename = "appId")]
    app_id: String,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gamevault_server=debug,gamevault_search=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = EngineConfig::from_env()?;

    tracing::info!("Starting GameVault search server");
    tracing::info!("Mode: {:?}", config.drive_mode);

    let engine = SearchEngine::from_config(&config).await?;
    let state = AppState {
        engine: Arc::new(engine),
    };

    let app = Router::new()
        .route("/health", get(health_handler))
        .route("/api/search", get(search_handler))
        .route("/api/steam-app", get(steam_app_handler))
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = config.bind_addr();
    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: gamevault_search::VERSION.to_string(),
    })
}

async fn search_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, AppError> {
    let response = state.engine.search(&params.q).await?;
    tracing::info!("{} → {}", params.q.trim(), response.display());
    Ok(Json(response))
}

async fn steam_app_handler(
    State(state): State<AppState>,
    Query(params): Query<AppParams>,
) -> Result<Json<AppDetailsResponse>, AppError> {
    match state.engine.app_details(&params.app_id).await? {
        Some(app) => Ok(Json(app.into())),
        None => Err(AppError(
            SearchError::Other(format!("No app found for: {}", params.app_id.trim())),
            Some(StatusCode::NOT_FOUND),
        )),
    }
}

// Error handling, with an optional status override
struct AppError(SearchError, Option<StatusCode>);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.1.unwrap_or(match &self.0 {
            SearchError::InvalidInput(_) | SearchError::Config(_) => StatusCode::BAD_REQUEST,
            SearchError::Provider { .. } | SearchError::HttpRequest(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        });
        let message = self.0.to_string();

        if status.is_server_error() {
            tracing::error!("{} - {}", status, message);
        } else {
            tracing::debug!("{} - {}", status, message);
        }

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<SearchError>,
{
    fn from(err: E) -> Self {
        Self(err.into(), None)
    }
}
