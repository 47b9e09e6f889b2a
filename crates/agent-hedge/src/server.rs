//! HTTP surface for the relays
//!
//! Three JSON endpoints, each a thin adapter over [`Relay`]:
//!
//! ```text
//! POST /chat            {messages}                 -> {response}
//! POST /analyze_image   {image_base64, text_prompt} -> {response}
//! POST /generate_image  {prompt}                   -> {image_url}
//! ```
//!
//! Failures are returned as `{error}` with 400 for caller mistakes and 500 for
//! everything else.

use std::sync::Arc;

use agent_llm::Message;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{error, info};

use crate::config::HedgeConfig;
use crate::error::{HedgeError, RelayError};
use crate::relay::{AnalysisRequest, Relay};

/// Body of `POST /chat`
#[derive(Debug, Default, Deserialize)]
pub struct ChatRequest {
    /// Conversation to forward
    #[serde(default)]
    pub messages: Option<Vec<Message>>,
}

/// Body of `POST /analyze_image`
#[derive(Debug, Default, Deserialize)]
pub struct AnalyzeImageRequest {
    /// Base64 payload or image URL
    #[serde(default)]
    pub image_base64: Option<String>,
    /// Optional instruction for the vision model
    #[serde(default)]
    pub text_prompt: Option<String>,
}

/// Body of `POST /generate_image`
#[derive(Debug, Default, Deserialize)]
pub struct GenerateImageRequest {
    /// Absent: default prompt. Present but null: rejected.
    #[serde(default, deserialize_with = "double_option")]
    pub prompt: Option<Option<String>>,
}

/// Successful text reply
#[derive(Debug, Serialize, Deserialize)]
pub struct TextReply {
    pub response: String,
}

/// Successful image reply
#[derive(Debug, Serialize, Deserialize)]
pub struct ImageReply {
    pub image_url: String,
}

/// Error envelope
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorReply {
    pub error: String,
}

/// An error on its way to the client
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    /// HTTP status that will be sent
    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<RelayError> for ApiError {
    fn from(err: RelayError) -> Self {
        let status = if err.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(status = %self.status, error = %self.message, "Request failed");
        }
        (self.status, Json(ErrorReply { error: self.message })).into_response()
    }
}

/// Build the router over a shared relay
pub fn router(relay: Arc<Relay>) -> Router {
    Router::new()
        .route("/chat", post(chat))
        .route("/analyze_image", post(analyze_image))
        .route("/generate_image", post(generate_image))
        .with_state(relay)
}

/// Bind the configured address and serve until Ctrl-C
pub async fn serve(config: &HedgeConfig, relay: Arc<Relay>) -> Result<(), HedgeError> {
    let addr = config.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "Hedge relay listening");

    axum::serve(listener, router(relay))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Hedge relay stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
    }
}

async fn chat(
    State(relay): State<Arc<Relay>>,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<TextReply>, ApiError> {
    let Json(body) = body?;
    let response = relay.chat(body.messages.unwrap_or_default()).await?;
    Ok(Json(TextReply { response }))
}

async fn analyze_image(
    State(relay): State<Arc<Relay>>,
    body: Result<Json<AnalyzeImageRequest>, JsonRejection>,
) -> Result<Json<TextReply>, ApiError> {
    let Json(body) = body?;
    let mut request = AnalysisRequest::new(body.image_base64.unwrap_or_default());
    if let Some(prompt) = body.text_prompt.filter(|p| !p.is_empty()) {
        request = request.with_prompt(prompt);
    }
    let response = relay.analyze_image(request).await?;
    Ok(Json(TextReply { response }))
}

async fn generate_image(
    State(relay): State<Arc<Relay>>,
    body: Result<Json<GenerateImageRequest>, JsonRejection>,
) -> Result<Json<ImageReply>, ApiError> {
    let Json(body) = body?;
    let prompt = match &body.prompt {
        None => None,
        Some(value) => Some(value.as_deref().unwrap_or_default()),
    };
    let image_url = relay.generate_image(prompt).await?;
    Ok(Json(ImageReply { image_url }))
}

fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
