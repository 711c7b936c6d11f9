//! In-memory course store.
//!
//! Useful for testing and small course packs.

use super::{
    CatalogHit, CatalogIndex, ContentHit, ContentIndex, Course, CourseChunk, CourseStore,
    SearchFilter,
};
use crate::embedding::{cosine_distance, Embedder};
use crate::error::{CourseQaError, Result};
use async_trait::async_trait;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

struct CatalogEntry {
    course: Course,
    embedding: Vec<f32>,
}

struct StoredChunk {
    id: String,
    chunk: CourseChunk,
    embedding: Vec<f32>,
}

/// In-memory course store.
pub struct MemoryCourseStore {
    embedder: Arc<dyn Embedder>,
    catalog: RwLock<Vec<CatalogEntry>>,
    chunks: RwLock<Vec<StoredChunk>>,
}

impl MemoryCourseStore {
    /// Create an empty store that embeds with `embedder`.
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self {
            embedder,
            catalog: RwLock::new(Vec::new()),
            chunks: RwLock::new(Vec::new()),
        }
    }
}

fn read<T>(lock: &RwLock<T>) -> Result<RwLockReadGuard<'_, T>> {
    lock.read()
        .map_err(|e| CourseQaError::VectorStore(format!("Failed to acquire lock: {}", e)))
}

fn write<T>(lock: &RwLock<T>) -> Result<RwLockWriteGuard<'_, T>> {
    lock.write()
        .map_err(|e| CourseQaError::VectorStore(format!("Failed to acquire lock: {}", e)))
}

#[async_trait]
impl CatalogIndex for MemoryCourseStore {
    async fn query_catalog(&self, query: &str, limit: usize) -> Result<Vec<CatalogHit>> {
        if read(&self.catalog)?.is_empty() {
            return Ok(Vec::new());
        }

        let query_embedding = self.embedder.embed(query).await?;
        let catalog = read(&self.catalog)?;

        let mut hits: Vec<CatalogHit> = catalog
            .iter()
            .map(|entry| CatalogHit {
                title: entry.course.title.clone(),
                distance: cosine_distance(&query_embedding, &entry.embedding),
            })
            .collect();

        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits.truncate(limit);
        Ok(hits)
    }

    async fn course(&self, title: &str) -> Result<Option<Course>> {
        let catalog = read(&self.catalog)?;
        Ok(catalog
            .iter()
            .find(|e| e.course.title == title)
            .map(|e| e.course.clone()))
    }

    async fn courses(&self) -> Result<Vec<Course>> {
        let catalog = read(&self.catalog)?;
        Ok(catalog.iter().map(|e| e.course.clone()).collect())
    }
}

#[async_trait]
impl ContentIndex for MemoryCourseStore {
    async fn query_content(
        &self,
        query: &str,
        filter: Option<&SearchFilter>,
        limit: usize,
    ) -> Result<Vec<ContentHit>> {
        let query_embedding = self.embedder.embed(query).await?;
        let chunks = read(&self.chunks)?;

        let mut hits: Vec<ContentHit> = chunks
            .iter()
            .filter(|stored| {
                filter.map_or(true, |f| f.matches(&stored.chunk.metadata()))
            })
            .map(|stored| ContentHit {
                content: stored.chunk.content.clone(),
                metadata: stored.chunk.metadata(),
                distance: cosine_distance(&query_embedding, &stored.embedding),
            })
            .collect();

        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits.truncate(limit);
        Ok(hits)
    }
}

#[async_trait]
impl CourseStore for MemoryCourseStore {
    async fn add_course_metadata(&self, course: &Course) -> Result<()> {
        let embedding = self.embedder.embed(&course.title).await?;
        let mut catalog = write(&self.catalog)?;

        let entry = CatalogEntry {
            course: course.clone(),
            embedding,
        };
        match catalog.iter_mut().find(|e| e.course.title == course.title) {
            Some(existing) => *existing = entry,
            None => catalog.push(entry),
        }
        Ok(())
    }

    async fn add_course_content(&self, chunks: &[CourseChunk]) -> Result<usize> {
        if chunks.is_empty() {
            return Ok(0);
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;
        if embeddings.len() != chunks.len() {
            return Err(CourseQaError::Embedding(format!(
                "Expected {} embeddings, got {}",
                chunks.len(),
                embeddings.len()
            )));
        }

        let mut stored = write(&self.chunks)?;
        for (chunk, embedding) in chunks.iter().zip(embeddings) {
            let id = chunk.id();
            let entry = StoredChunk {
                id: id.clone(),
                chunk: chunk.clone(),
                embedding,
            };
            match stored.iter_mut().find(|s| s.id == id) {
                Some(existing) => *existing = entry,
                None => stored.push(entry),
            }
        }
        Ok(chunks.len())
    }

    async fn clear(&self) -> Result<()> {
        write(&self.catalog)?.clear();
        write(&self.chunks)?.clear();
        Ok(())
    }
}
