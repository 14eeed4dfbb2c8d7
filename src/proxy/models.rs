use serde::{Deserialize, Serialize};

/// POST /api/embed request body.
#[derive(Debug, Deserialize)]
pub struct EmbedTextRequest {
    /// Optional so a missing field and an empty string get the same
    /// bad-input answer instead of a serde rejection.
    #[serde(default)]
    pub text: Option<String>,
}

/// Canonical embed response: one vector under `data[0].embedding`, the
/// same shape no matter which upstream provider answered.
#[derive(Debug, Serialize)]
pub struct EmbedTextResponse {
    pub data: Vec<EmbedVector>,
}

#[derive(Debug, Serialize)]
pub struct EmbedVector {
    pub embedding: Vec<f64>,
}

impl EmbedTextResponse {
    pub fn from_vector(embedding: Vec<f64>) -> Self {
        Self {
            data: vec![EmbedVector { embedding }],
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub providers: usize,
}
