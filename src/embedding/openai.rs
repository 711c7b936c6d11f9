//! Embeddings from the OpenAI embeddings endpoint.

use super::Embedder;
use crate::config::{EmbeddingSettings, OpenAISettings};
use crate::error::{CourseQaError, Result};
use crate::openai::create_client;
use async_openai::config::OpenAIConfig;
use async_openai::types::{CreateEmbeddingRequestArgs, EmbeddingInput};
use async_openai::Client;
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Inputs sent per embeddings request.
const MAX_INPUTS_PER_REQUEST: usize = 100;

/// Embedder backed by an OpenAI embedding model.
pub struct OpenAIEmbedder {
    client: Client<OpenAIConfig>,
    model: String,
    dimensions: usize,
}

impl OpenAIEmbedder {
    pub fn new(embedding: &EmbeddingSettings, openai: &OpenAISettings) -> Result<Self> {
        Ok(Self {
            client: create_client(openai)?,
            model: embedding.model.clone(),
            dimensions: embedding.dimensions as usize,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Embed one request's worth of inputs, returned in input order.
    async fn request(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>> {
        let request = CreateEmbeddingRequestArgs::default()
            .model(&self.model)
            .input(EmbeddingInput::StringArray(inputs.to_vec()))
            .dimensions(self.dimensions as u32)
            .build()
            .map_err(|e| CourseQaError::Embedding(format!("Invalid embeddings request: {}", e)))?;

        let mut data = self
            .client
            .embeddings()
            .create(request)
            .await
            .map_err(|e| CourseQaError::OpenAI(format!("Embeddings request failed: {}", e)))?
            .data;

        if data.len() != inputs.len() {
            return Err(CourseQaError::Embedding(format!(
                "Asked for {} embeddings, received {}",
                inputs.len(),
                data.len()
            )));
        }

        data.sort_by_key(|item| item.index);
        Ok(data.into_iter().map(|item| item.embedding).collect())
    }
}

#[async_trait]
impl Embedder for OpenAIEmbedder {
    #[instrument(skip(self, texts), fields(model = %self.model, count = texts.len()))]
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut vectors = Vec::with_capacity(texts.len());
        for inputs in texts.chunks(MAX_INPUTS_PER_REQUEST) {
            vectors.extend(self.request(inputs).await?);
        }

        debug!("Embedded {} texts", vectors.len());
        Ok(vectors)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_select_model_and_dimensions() {
        let embedder =
            OpenAIEmbedder::new(&EmbeddingSettings::default(), &OpenAISettings::default()).unwrap();
        assert_eq!(embedder.model(), "text-embedding-3-small");
        assert_eq!(embedder.dimensions(), 1536);

        let settings = EmbeddingSettings {
            model: "text-embedding-3-large".to_string(),
            dimensions: 256,
        };
        let openai = OpenAISettings {
            api_base: Some("http://localhost:8080/v1".to_string()),
            ..OpenAISettings::default()
        };
        let embedder = OpenAIEmbedder::new(&settings, &openai).unwrap();
        assert_eq!(embedder.model(), "text-embedding-3-large");
        assert_eq!(embedder.dimensions(), 256);
    }

    #[tokio::test]
    async fn test_empty_batch_makes_no_request() {
        let embedder =
            OpenAIEmbedder::new(&EmbeddingSettings::default(), &OpenAISettings::default()).unwrap();
        assert!(embedder.embed_batch(&[]).await.unwrap().is_empty());
    }
}
