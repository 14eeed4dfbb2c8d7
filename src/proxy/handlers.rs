use axum::{extract::State, Json};
use std::sync::Arc;
use tracing::debug;

use crate::proxy::models::*;
use crate::proxy::upstream::ProviderRegistry;
use crate::{Error, Result};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<ProviderRegistry>,
    pub settings: crate::config::Settings,
}

/// POST /api/embed - forward a text to the first configured provider
/// and answer with the normalized vector shape
pub async fn embed_text(
    State(state): State<AppState>,
    Json(payload): Json<EmbedTextRequest>,
) -> Result<Json<EmbedTextResponse>> {
    let text = payload.text.as_deref().unwrap_or("");
    if text.is_empty() {
        return Err(Error::BadInput("no text".to_string()));
    }
    if text.len() > state.settings.server.max_text_length {
        return Err(Error::BadInput(format!(
            "text exceeds {} bytes",
            state.settings.server.max_text_length
        )));
    }

    debug!(bytes = text.len(), "Embed request");
    let vector = state.registry.embed(text).await?;
    Ok(Json(EmbedTextResponse::from_vector(vector)))
}

/// GET /health - health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Result<Json<HealthResponse>> {
    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        providers: state.registry.len(),
    }))
}
