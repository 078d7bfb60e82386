//! HTTP server setup and handlers.
//!
//! # Responsibilities
//! - Create the Axum router for the four boundary operations
//! - Wire up middleware (timeout, tracing)
//! - Map domain errors to HTTP statuses
//! - Serve with graceful shutdown

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::schema::ServerConfig;
use crate::orchestrator::sweep::{OrchestrateError, Orchestrator};
use crate::verify::input::CreateIntentInput;
use crate::verify::types::EngineError;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
}

/// HTTP server exposing the reconciler API.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server over the orchestrator.
    pub fn new(orchestrator: Arc<Orchestrator>, config: &ServerConfig) -> Self {
        let state = AppState { orchestrator };
        let router = Router::new()
            .route("/intents", post(create_intent))
            .route("/intents/{id}", get(get_intent))
            .route("/intents/{id}/verify", post(trigger_verify))
            .route("/health", get(health))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.request_timeout_secs,
            )))
            .layer(TraceLayer::new_for_http());
        Self { router }
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

fn error_body(status: StatusCode, code: &str, message: String) -> Response {
    (status, Json(json!({ "code": code, "error": message }))).into_response()
}

async fn create_intent(
    State(state): State<AppState>,
    Json(input): Json<CreateIntentInput>,
) -> Response {
    match state.orchestrator.create_intent(input).await {
        Ok((stored, request)) => (
            StatusCode::CREATED,
            Json(json!({
                "intent": stored.intent,
                "payment_request": request,
            })),
        )
            .into_response(),
        Err(e) => {
            let status = match &e {
                EngineError::ReferenceInUse(_) => StatusCode::CONFLICT,
                EngineError::Validation(_) | EngineError::ChainMismatch { .. } => {
                    StatusCode::BAD_REQUEST
                }
                EngineError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            };
            tracing::debug!(error = %e, "Intent creation rejected");
            error_body(status, e.code().as_str(), e.to_string())
        }
    }
}

async fn get_intent(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.orchestrator.get_intent(&id).await {
        Ok(stored) => Json(json!({
            "intent": stored.intent,
            "status": stored.intent.status,
            "tx_hash": stored.tx_hash,
            "confirmations": stored.confirmations,
            "last_checked_at": stored.last_checked_at,
        }))
        .into_response(),
        Err(e) => not_found_or_internal(e),
    }
}

async fn trigger_verify(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.orchestrator.verify_intent(&id).await {
        Ok(result) => Json(result).into_response(),
        Err(e) => not_found_or_internal(e),
    }
}

async fn health(State(state): State<AppState>) -> Response {
    let report = state.orchestrator.health().await;
    let status = if report.ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(report)).into_response()
}

fn not_found_or_internal(e: OrchestrateError) -> Response {
    match e {
        OrchestrateError::NotFound(id) => error_body(
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("intent not found: {id}"),
        ),
        OrchestrateError::Store(e) => error_body(
            StatusCode::INTERNAL_SERVER_ERROR,
            "STORE_ERROR",
            e.to_string(),
        ),
    }
}
