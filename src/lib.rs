pub mod channels;
pub mod classify;
pub mod config;
pub mod error;
pub mod metrics;
pub mod proxy;
pub mod sources;

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    handler::HandlerWithoutStateExt,
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing::{error, info, warn};

use crate::channels::Channel;
use crate::config::Settings;
use crate::error::ApiError;
use crate::proxy::{ManifestProxy, MANIFEST_CONTENT_TYPE, NO_CACHE};
use crate::sources::Aggregator;

pub struct AppState {
    pub aggregator: Aggregator,
    pub proxy: ManifestProxy,
    pub public_dir: PathBuf,
}

impl AppState {
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        Ok(Self {
            aggregator: Aggregator::new(settings.sources.clone())?,
            proxy: ManifestProxy::new(settings.proxy.clone())?,
            public_dir: settings.server.public_dir.clone(),
        })
    }
}

pub fn create_app(state: AppState) -> Router {
    let static_files =
        ServeDir::new(&state.public_dir).not_found_service(fallback_handler.into_service());

    Router::new()
        .route("/api/channels", get(channels_api_handler))
        .route("/proxy", get(proxy_handler))
        .route("/metrics", get(metrics_handler))
        .fallback_service(static_files)
        .with_state(Arc::new(state))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

async fn fallback_handler(method: Method, uri: Uri, headers: HeaderMap) -> impl IntoResponse {
    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("<none>");
    info!(
        "HTTP 404: method={} uri={} UA=\"{}\"",
        method,
        uri,
        user_agent
    );
    (StatusCode::NOT_FOUND, "Not found")
}

async fn channels_api_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Channel>>, ApiError> {
    match state.aggregator.load_channels().await {
        Ok(channels) => {
            metrics::CHANNELS_SERVED.set(channels.len() as i64);
            Ok(Json(channels))
        }
        Err(e) => {
            error!("Fetch Error: {}", e);
            Err(ApiError::ChannelsUnavailable)
        }
    }
}

#[derive(Deserialize)]
struct ProxyQuery {
    url: Option<String>,
}

async fn proxy_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ProxyQuery>,
) -> Result<Response, ApiError> {
    let target = match params.url {
        Some(url) if !url.is_empty() => url,
        _ => return Err(ApiError::MissingUrl),
    };

    let body = state.proxy.fetch_rewritten(&target).await.map_err(|e| {
        warn!("Proxy fetch failed: {}", e);
        ApiError::SourceUnreachable
    })?;

    Ok((
        [
            (header::CONTENT_TYPE, MANIFEST_CONTENT_TYPE),
            (header::CACHE_CONTROL, NO_CACHE),
        ],
        body,
    )
        .into_response())
}

async fn metrics_handler() -> Response {
    match metrics::gather_metrics() {
        Ok(text) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            text,
        )
            .into_response(),
        Err(e) => {
            error!("Failed to encode metrics: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
