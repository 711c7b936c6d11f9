//! Vector store abstraction for courseqa.
//!
//! Two indexes sit behind this module: a small course catalog that embeds course
//! titles (used to resolve fuzzy course names) and the content index holding
//! transcript chunks. Both take query text and embed it internally, so callers
//! treat them as opaque nearest-neighbour services.

mod memory;
mod sqlite;

pub use memory::MemoryCourseStore;
pub use sqlite::SqliteCourseStore;

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A lesson inside a course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lesson {
    pub lesson_number: u32,
    pub lesson_title: String,
    #[serde(default)]
    pub lesson_link: Option<String>,
}

/// Catalog metadata for one course. `title` is unique across the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub title: String,
    #[serde(default)]
    pub instructor: Option<String>,
    #[serde(default)]
    pub course_link: Option<String>,
    #[serde(default)]
    pub lessons: Vec<Lesson>,
}

impl Course {
    /// Find a lesson by number.
    pub fn lesson(&self, lesson_number: u32) -> Option<&Lesson> {
        self.lessons.iter().find(|l| l.lesson_number == lesson_number)
    }
}

/// A chunk of course transcript, produced upstream and only queried here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseChunk {
    pub content: String,
    pub course_title: String,
    #[serde(default)]
    pub lesson_number: Option<u32>,
    pub chunk_index: usize,
}

impl CourseChunk {
    /// Stable identifier, so re-importing a chunk replaces it.
    pub fn id(&self) -> String {
        format!("{}_{}", self.course_title.replace(' ', "_"), self.chunk_index)
    }

    /// Metadata returned alongside this chunk by content queries.
    pub fn metadata(&self) -> ChunkMetadata {
        ChunkMetadata {
            course_title: self.course_title.clone(),
            lesson_number: self.lesson_number,
            chunk_index: self.chunk_index,
        }
    }
}

/// Metadata attached to a content hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    pub course_title: String,
    pub lesson_number: Option<u32>,
    pub chunk_index: usize,
}

/// A single equality test on chunk metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterClause {
    CourseTitle(String),
    LessonNumber(u32),
}

impl FilterClause {
    fn matches(&self, metadata: &ChunkMetadata) -> bool {
        match self {
            FilterClause::CourseTitle(title) => metadata.course_title == *title,
            FilterClause::LessonNumber(n) => metadata.lesson_number == Some(*n),
        }
    }
}

/// Metadata filter for content queries: one equality or a conjunction of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchFilter {
    Eq(FilterClause),
    And(Vec<FilterClause>),
}

impl SearchFilter {
    /// The equality clauses in evaluation order.
    pub fn clauses(&self) -> &[FilterClause] {
        match self {
            SearchFilter::Eq(clause) => std::slice::from_ref(clause),
            SearchFilter::And(clauses) => clauses,
        }
    }

    /// Whether a chunk's metadata passes every clause.
    pub fn matches(&self, metadata: &ChunkMetadata) -> bool {
        self.clauses().iter().all(|c| c.matches(metadata))
    }
}

impl std::fmt::Display for SearchFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self
            .clauses()
            .iter()
            .map(|c| match c {
                FilterClause::CourseTitle(t) => format!("course_title = '{}'", t),
                FilterClause::LessonNumber(n) => format!("lesson_number = {}", n),
            })
            .collect();
        write!(f, "{}", parts.join(" AND "))
    }
}

/// A content chunk returned by a nearest-neighbour query.
#[derive(Debug, Clone)]
pub struct ContentHit {
    pub content: String,
    pub metadata: ChunkMetadata,
    /// Cosine distance to the query (lower is nearer).
    pub distance: f32,
}

/// A course title returned by a catalog query.
#[derive(Debug, Clone)]
pub struct CatalogHit {
    pub title: String,
    /// Cosine distance to the query (lower is nearer).
    pub distance: f32,
}

/// Course catalog: title embeddings plus full course metadata.
#[async_trait]
pub trait CatalogIndex: Send + Sync {
    /// Nearest course titles to `query`, nearest first.
    async fn query_catalog(&self, query: &str, limit: usize) -> Result<Vec<CatalogHit>>;

    /// Full metadata for a course by exact title.
    async fn course(&self, title: &str) -> Result<Option<Course>>;

    /// Metadata for every course, in insertion order.
    async fn courses(&self) -> Result<Vec<Course>>;

    /// Titles of every course, in insertion order.
    async fn course_titles(&self) -> Result<Vec<String>> {
        Ok(self.courses().await?.into_iter().map(|c| c.title).collect())
    }

    /// Number of courses in the catalog.
    async fn course_count(&self) -> Result<usize> {
        Ok(self.courses().await?.len())
    }

    /// Link to a course, if it has one.
    async fn course_link(&self, title: &str) -> Result<Option<String>> {
        Ok(self.course(title).await?.and_then(|c| c.course_link))
    }

    /// Link to a lesson, if the course and lesson exist and the lesson has one.
    async fn lesson_link(&self, title: &str, lesson_number: u32) -> Result<Option<String>> {
        Ok(self
            .course(title)
            .await?
            .and_then(|c| c.lesson(lesson_number).and_then(|l| l.lesson_link.clone())))
    }
}

/// Content index over course chunks.
#[async_trait]
pub trait ContentIndex: Send + Sync {
    /// Nearest chunks to `query` that pass `filter`, nearest first.
    async fn query_content(
        &self,
        query: &str,
        filter: Option<&SearchFilter>,
        limit: usize,
    ) -> Result<Vec<ContentHit>>;
}

/// A store that owns both indexes and accepts new data.
#[async_trait]
pub trait CourseStore: CatalogIndex + ContentIndex {
    /// Add or replace a course in the catalog.
    async fn add_course_metadata(&self, course: &Course) -> Result<()>;

    /// Add or replace content chunks. Returns the number written.
    async fn add_course_content(&self, chunks: &[CourseChunk]) -> Result<usize>;

    /// Remove every course and chunk.
    async fn clear(&self) -> Result<()>;
}
