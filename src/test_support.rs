//! Shared fixtures for unit tests: a deterministic embedder, failing indexes, a
//! scripted completion client, and a sample course.

use crate::agent::{CompletionClient, CompletionRequest, CompletionResponse, ContentBlock, StopReason};
use crate::embedding::Embedder;
use crate::error::{CourseQaError, Result};
use crate::vector_store::{
    CatalogHit, CatalogIndex, ContentHit, ContentIndex, Course, CourseChunk, Lesson, SearchFilter,
};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

const DIMENSIONS: usize = 512;

/// Bag-of-words embedder: each lowercase word hashes into one bucket.
pub struct KeywordEmbedder;

impl KeywordEmbedder {
    fn bucket(word: &str) -> usize {
        // FNV-1a
        let mut hash: u64 = 0xcbf29ce484222325;
        for byte in word.bytes() {
            hash ^= u64::from(byte);
            hash = hash.wrapping_mul(0x100000001b3);
        }
        (hash % DIMENSIONS as u64) as usize
    }

    fn vector(text: &str) -> Vec<f32> {
        let mut vector = vec![0.0; DIMENSIONS];
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            vector[Self::bucket(&word.to_lowercase())] += 1.0;
        }
        vector
    }
}

#[async_trait]
impl Embedder for KeywordEmbedder {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| Self::vector(t)).collect())
    }

    fn dimensions(&self) -> usize {
        DIMENSIONS
    }
}

/// Content and catalog index whose every query fails.
pub struct FailingIndex(pub &'static str);

#[async_trait]
impl ContentIndex for FailingIndex {
    async fn query_content(
        &self,
        _query: &str,
        _filter: Option<&SearchFilter>,
        _limit: usize,
    ) -> Result<Vec<ContentHit>> {
        Err(CourseQaError::VectorStore(self.0.to_string()))
    }
}

#[async_trait]
impl CatalogIndex for FailingIndex {
    async fn query_catalog(&self, _query: &str, _limit: usize) -> Result<Vec<CatalogHit>> {
        Err(CourseQaError::VectorStore(self.0.to_string()))
    }

    async fn course(&self, _title: &str) -> Result<Option<Course>> {
        Err(CourseQaError::VectorStore(self.0.to_string()))
    }

    async fn courses(&self) -> Result<Vec<Course>> {
        Err(CourseQaError::VectorStore(self.0.to_string()))
    }
}

/// Completion client that replays scripted responses and records every request.
///
/// Once the script runs out it keeps returning the last scripted response.
pub struct ScriptedClient {
    script: Mutex<VecDeque<CompletionResponse>>,
    last: Mutex<Option<CompletionResponse>>,
    pub requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedClient {
    pub fn new(responses: Vec<CompletionResponse>) -> Self {
        Self {
            script: Mutex::new(responses.into()),
            last: Mutex::new(None),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionClient for ScriptedClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse> {
        self.requests.lock().unwrap().push(request.clone());

        let next = self.script.lock().unwrap().pop_front();
        let mut last = self.last.lock().unwrap();
        if let Some(response) = next {
            *last = Some(response);
        }
        last.clone()
            .ok_or_else(|| CourseQaError::Completion("script is empty".to_string()))
    }
}

/// Completion client that always fails.
pub struct UnavailableClient;

#[async_trait]
impl CompletionClient for UnavailableClient {
    async fn complete(&self, _request: &CompletionRequest) -> Result<CompletionResponse> {
        Err(CourseQaError::Completion("service unavailable".to_string()))
    }
}

/// A plain-text final answer.
pub fn text_response(text: &str) -> CompletionResponse {
    CompletionResponse {
        content: vec![ContentBlock::Text {
            text: text.to_string(),
        }],
        stop_reason: StopReason::EndTurn,
    }
}

/// A response requesting one tool call.
pub fn tool_response(id: &str, name: &str, input: serde_json::Value) -> CompletionResponse {
    CompletionResponse {
        content: vec![ContentBlock::ToolUse {
            id: id.to_string(),
            name: name.to_string(),
            input,
        }],
        stop_reason: StopReason::ToolUse,
    }
}

pub const COURSE_TITLE: &str = "Advanced Retrieval for AI with Chroma";

pub fn sample_course() -> Course {
    Course {
        title: COURSE_TITLE.to_string(),
        instructor: Some("John Doe".to_string()),
        course_link: Some("https://example.com/course".to_string()),
        lessons: vec![
            Lesson {
                lesson_number: 1,
                lesson_title: "Introduction to Vectors".to_string(),
                lesson_link: Some("https://example.com/lesson1".to_string()),
            },
            Lesson {
                lesson_number: 2,
                lesson_title: "Embedding Basics".to_string(),
                lesson_link: Some("https://example.com/lesson2".to_string()),
            },
            Lesson {
                lesson_number: 3,
                lesson_title: "Similarity Search".to_string(),
                lesson_link: None,
            },
        ],
    }
}

pub fn sample_chunks() -> Vec<CourseChunk> {
    [
        (1, "Vector databases are essential for modern AI applications. They enable semantic search."),
        (2, "Embeddings convert text into numerical vectors that capture semantic meaning."),
        (3, "Similarity search finds the most relevant documents based on vector distance."),
    ]
    .into_iter()
    .enumerate()
    .map(|(i, (lesson, content))| CourseChunk {
        content: content.to_string(),
        course_title: COURSE_TITLE.to_string(),
        lesson_number: Some(lesson),
        chunk_index: i,
    })
    .collect()
}
