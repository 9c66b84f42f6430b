//! Embedding DTOs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Maximum accepted text length for `POST /embed`, in bytes
pub const MAX_EMBED_TEXT_BYTES: usize = 32 * 1024;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EmbedResponse {
    pub embeddings: Vec<f32>,
}
