use crate::error::{Result, VectorStoreError};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// External text-encoder collaborator.
///
/// Any sentence encoder with a fixed output dimension works. Encoding the
/// same catalog snapshot twice may drift slightly between library versions,
/// so vectors are regenerated from scratch per snapshot rather than cached.
pub trait TextEncoder: Send + Sync {
    /// Output dimensionality; every returned vector has exactly this length.
    fn dimension(&self) -> usize;

    /// Encode one text into a vector of [`dimension`](Self::dimension) length.
    fn encode(&self, text: &str) -> Result<Vec<f32>>;
}

/// Encoder backed by an Ollama-compatible embeddings endpoint.
///
/// Selected by configuration alongside the model name and expected
/// dimension; the dimension is verified on every response so a model swap on
/// the server surfaces as [`VectorStoreError::InvalidDimension`] instead of
/// corrupting the index.
pub struct OllamaEncoder {
    client: reqwest::blocking::Client,
    base_url: String,
    model: String,
    dimension: usize,
}

#[derive(Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingsResponse {
    embedding: Vec<f32>,
}

impl OllamaEncoder {
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        dimension: usize,
    ) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| VectorStoreError::EmbeddingError(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            dimension,
        })
    }
}

impl TextEncoder for OllamaEncoder {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn encode(&self, text: &str) -> Result<Vec<f32>> {
        let response = self
            .client
            .post(format!("{}/api/embeddings", self.base_url))
            .json(&EmbeddingsRequest {
                model: &self.model,
                prompt: text,
            })
            .send()
            .map_err(|e| VectorStoreError::EmbeddingError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(VectorStoreError::EmbeddingError(format!(
                "encoder endpoint returned {}",
                response.status()
            )));
        }

        let body: EmbeddingsResponse = response
            .json()
            .map_err(|e| VectorStoreError::EmbeddingError(e.to_string()))?;

        if body.embedding.len() != self.dimension {
            return Err(VectorStoreError::InvalidDimension {
                expected: self.dimension,
                actual: body.embedding.len(),
            });
        }

        Ok(body.embedding)
    }
}
