//! HTTP surface of the efficiency service.
//!
//! - `POST /efficiency/calculate`
//! - `GET  /efficiency/buildings?page&limit&search`
//! - `GET  /efficiency/building/:building_id` (+ `/summary`, `/latest`, `/period/:period`)
//! - `GET  /efficiency/calculation/:id`
//! - `GET  /health` (never behind auth)

pub mod handlers;
pub mod schemas;

use std::{net::SocketAddr, sync::Arc, time::Instant};

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};

use crate::{error::ApiError, service::EfficiencyService};

#[derive(Clone)]
pub struct AppState {
    pub service: EfficiencyService,
    pub auth_bearer_token: Option<Arc<str>>,
}

impl AppState {
    pub fn new(service: EfficiencyService, auth_bearer_token: Option<String>) -> Self {
        Self {
            service,
            auth_bearer_token: auth_bearer_token.map(Into::into),
        }
    }
}

pub fn router(state: AppState) -> Router {
    let efficiency = Router::new()
        .route("/efficiency/calculate", post(handlers::calculate))
        .route("/efficiency/buildings", get(handlers::list_buildings))
        .route("/efficiency/building/:building_id", get(handlers::building_calculations))
        .route("/efficiency/building/:building_id/summary", get(handlers::building_summary))
        .route("/efficiency/building/:building_id/latest", get(handlers::latest_calculation))
        .route(
            "/efficiency/building/:building_id/period/:period",
            get(handlers::building_calculations_by_period),
        )
        .route("/efficiency/calculation/:id", get(handlers::calculation))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_bearer))
        .route_layer(middleware::from_fn(track_latency));

    Router::new()
        .route("/health", get(handlers::health))
        .merge(efficiency)
        .with_state(state)
}

/// Extracts the token from an `Authorization: Bearer <token>` header value.
fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.split_once(' ')?;
    if scheme.eq_ignore_ascii_case("bearer") {
        Some(token.trim())
    } else {
        None
    }
}

async fn require_bearer(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(expected) = state.auth_bearer_token.as_deref() else {
        return Ok(next.run(req).await);
    };

    let supplied = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(bearer_token);

    match supplied {
        Some(token) if token == expected => Ok(next.run(req).await),
        _ => {
            tracing::warn!(path = %req.uri().path(), "rejected request without valid bearer token");
            Err(ApiError::Unauthorized)
        }
    }
}

async fn track_latency(req: Request, next: Next) -> Response {
    let started = Instant::now();
    let response = next.run(req).await;
    metrics::histogram!("efficiency_request_latency_seconds").record(started.elapsed().as_secs_f64());
    response
}

/// Binds `bind_addr` and serves the API until ctrl-c.
pub async fn serve(bind_addr: &str, state: AppState) -> anyhow::Result<()> {
    let addr: SocketAddr = bind_addr
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid api.bind_addr: {e}"))?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "efficiency API listening");

    axum::serve(listener, router(state).into_make_service())
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for shutdown signal");
            }
            tracing::info!("shutting down");
        })
        .await?;

    Ok(())
}
