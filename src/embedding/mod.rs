//! Embedding generation for course titles and content chunks.
//!
//! Stores embed both sides of every comparison with the same [`Embedder`], and
//! rank by [`cosine_distance`].

mod openai;

pub use openai::OpenAIEmbedder;

use crate::error::{CourseQaError, Result};
use async_trait::async_trait;

/// Turns text into fixed-length vectors.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// One vector per input, in input order.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Vector length this embedder produces.
    fn dimensions(&self) -> usize;

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_batch(&[text.to_string()])
            .await?
            .pop()
            .ok_or_else(|| CourseQaError::Embedding("Empty embedding response".to_string()))
    }
}

/// Cosine similarity in [-1, 1]. Mismatched, empty, or zero vectors score 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let (dot, norm_a, norm_b) = a
        .iter()
        .zip(b)
        .fold((0.0f32, 0.0f32, 0.0f32), |(dot, na, nb), (x, y)| {
            (dot + x * y, na + x * x, nb + y * y)
        });

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a.sqrt() * norm_b.sqrt())
    }
}

/// `1 - cosine_similarity`: 0 for the same direction, 2 for opposite ones.
pub fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    1.0 - cosine_similarity(a, b)
}
