use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use eyre::{Result, WrapErr};
use log::{debug, info, warn};
use tower_http::cors::{Any, CorsLayer};

use crate::TranscribeRequest;
use crate::transcribe::{TranscribeError, TranscriptionService};

impl IntoResponse for TranscribeError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

/// Build the HTTP router. Browser clients may call it from any origin.
pub fn router(service: Arc<TranscriptionService>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/transcribe", post(transcribe))
        .with_state(service)
        .layer(cors)
}

async fn transcribe(
    State(service): State<Arc<TranscriptionService>>,
    body: Result<Json<TranscribeRequest>, JsonRejection>,
) -> Response {
    // An unreadable body carries no URL, including a JSON body sent without `Content-Type: application/json`
    let request = match body {
        Ok(Json(request)) => request,
        Err(rejection) => {
            debug!("Rejected request body (expects JSON with Content-Type: application/json): {rejection}");
            TranscribeRequest::default()
        }
    };

    match service.handle(request).await {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(e) => {
            if e.status() >= 500 {
                warn!("Transcription failed: {e}");
            } else {
                debug!("Transcription rejected: {e}");
            }
            e.into_response()
        }
    }
}

/// Serve `app` on `addr` until Ctrl-C.
pub async fn serve(addr: SocketAddr, app: Router) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .wrap_err_with(|| format!("failed to bind {addr}"))?;
    info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Could not listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
}
