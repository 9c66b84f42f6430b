//! Text embeddings, served by a sibling backend with its own contract

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::providers::error_from_response;
use crate::types::*;

/// Turns text into a fixed-length vector
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Length of every vector this embedder returns
    fn dimension(&self) -> usize;

    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

/// Configuration for the OpenAI embeddings endpoint
#[derive(Debug, Clone)]
pub struct OpenAIEmbedderConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub dimension: usize,
}

impl OpenAIEmbedderConfig {
    pub const DEFAULT_MODEL: &'static str = "text-embedding-ada-002";
    pub const DEFAULT_DIMENSION: usize = 1536;

    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: Self::DEFAULT_MODEL.to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            dimension: Self::DEFAULT_DIMENSION,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>, dimension: usize) -> Self {
        self.model = model.into();
        self.dimension = dimension;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

pub struct OpenAIEmbedder {
    config: OpenAIEmbedderConfig,
    client: reqwest::Client,
}

impl OpenAIEmbedder {
    /// Returns `None` when no API key is set
    pub fn new(config: OpenAIEmbedderConfig) -> Option<Self> {
        if config.api_key.trim().is_empty() {
            return None;
        }
        Some(Self {
            config,
            client: reqwest::Client::new(),
        })
    }
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[async_trait]
impl Embedder for OpenAIEmbedder {
    fn dimension(&self) -> usize {
        self.config.dimension
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let response = self
            .client
            .post(format!("{}/embeddings", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .json(&EmbeddingRequest {
                model: &self.config.model,
                input: text,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let parsed: EmbeddingResponse =
            response.json().await.map_err(|e| LLMError::InvalidResponse {
                message: e.to_string(),
            })?;

        let vector = parsed
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| LLMError::InvalidResponse {
                message: "embedding response contained no data".to_string(),
            })?;

        if vector.len() != self.config.dimension {
            return Err(LLMError::InvalidResponse {
                message: format!(
                    "expected {} dimensions, got {}",
                    self.config.dimension,
                    vector.len()
                ),
            });
        }

        Ok(vector)
    }
}

/// Deterministic embedder for offline use: byte values folded into a unit vector
pub struct HashEmbedder {
    dimension: usize,
}

impl HashEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }
}

#[async_trait]
impl Embedder for HashEmbedder {
    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vector = vec![0.0f32; self.dimension];
        for (i, byte) in text.bytes().enumerate() {
            vector[i % self.dimension] += f32::from(byte);
        }
        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|v| *v /= norm);
        }
        Ok(vector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_hash_embedder_is_deterministic() {
        let embedder = HashEmbedder::new(8);
        let a = embedder.embed("coffee").await.unwrap();
        let b = embedder.embed("coffee").await.unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 8);

        let empty = embedder.embed("").await.unwrap();
        assert!(empty.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_missing_key_yields_no_embedder() {
        assert!(OpenAIEmbedder::new(OpenAIEmbedderConfig::new("")).is_none());
        let embedder = OpenAIEmbedder::new(OpenAIEmbedderConfig::new("sk-test")).unwrap();
        assert_eq!(embedder.dimension(), 1536);
    }
}
