//! SQLite-based course store.
//!
//! Uses SQLite for storage with cosine distance computed in Rust. Metadata filters
//! are pushed into the SQL query, so only matching chunks are scored.

use super::{
    CatalogHit, CatalogIndex, ContentHit, ContentIndex, Course, CourseChunk, CourseStore,
    ChunkMetadata, FilterClause, SearchFilter,
};
use crate::embedding::{cosine_distance, Embedder};
use crate::error::{CourseQaError, Result};
use async_trait::async_trait;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info, instrument};

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS courses (
        title TEXT PRIMARY KEY,
        instructor TEXT,
        course_link TEXT,
        lessons_json TEXT NOT NULL,
        embedding BLOB NOT NULL
    );

    CREATE TABLE IF NOT EXISTS chunks (
        id TEXT PRIMARY KEY,
        course_title TEXT NOT NULL,
        lesson_number INTEGER,
        chunk_index INTEGER NOT NULL,
        content TEXT NOT NULL,
        embedding BLOB NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_chunks_course_title ON chunks(course_title);
    CREATE INDEX IF NOT EXISTS idx_chunks_lesson_number ON chunks(lesson_number);
"#;

/// SQLite-based course store.
pub struct SqliteCourseStore {
    conn: Mutex<Connection>,
    embedder: Arc<dyn Embedder>,
}

impl SqliteCourseStore {
    /// Open (or create) a store at `path`.
    #[instrument(skip_all)]
    pub fn new(path: &Path, embedder: Arc<dyn Embedder>) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch(SCHEMA)?;

        info!("Initialized SQLite course store at {:?}", path);

        Ok(Self {
            conn: Mutex::new(conn),
            embedder,
        })
    }

    /// Create an in-memory SQLite store (useful for testing).
    pub fn in_memory(embedder: Arc<dyn Embedder>) -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;

        Ok(Self {
            conn: Mutex::new(conn),
            embedder,
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| CourseQaError::VectorStore(format!("Failed to acquire lock: {}", e)))
    }

    /// Serialize embedding to bytes.
    fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
        embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
    }

    /// Deserialize embedding from bytes.
    fn bytes_to_embedding(bytes: &[u8]) -> Vec<f32> {
        bytes
            .chunks_exact(4)
            .map(|chunk| {
                let arr: [u8; 4] = chunk.try_into().unwrap_or_default();
                f32::from_le_bytes(arr)
            })
            .collect()
    }

    /// Translate a metadata filter into a WHERE clause and its parameters.
    fn where_clause(filter: Option<&SearchFilter>) -> (String, Vec<Value>) {
        let Some(filter) = filter else {
            return (String::new(), Vec::new());
        };

        let mut conditions = Vec::new();
        let mut values = Vec::new();
        for clause in filter.clauses() {
            let index = values.len() + 1;
            match clause {
                FilterClause::CourseTitle(title) => {
                    conditions.push(format!("course_title = ?{}", index));
                    values.push(Value::Text(title.clone()));
                }
                FilterClause::LessonNumber(n) => {
                    conditions.push(format!("lesson_number = ?{}", index));
                    values.push(Value::Integer(i64::from(*n)));
                }
            }
        }

        (format!("WHERE {}", conditions.join(" AND ")), values)
    }

    fn row_to_course(
        title: String,
        instructor: Option<String>,
        course_link: Option<String>,
        lessons_json: &str,
    ) -> Result<Course> {
        let lessons = serde_json::from_str(lessons_json).map_err(|e| {
            CourseQaError::VectorStore(format!("Corrupt lesson list for '{}': {}", title, e))
        })?;
        Ok(Course {
            title,
            instructor,
            course_link,
            lessons,
        })
    }
}

#[async_trait]
impl CatalogIndex for SqliteCourseStore {
    #[instrument(skip(self))]
    async fn query_catalog(&self, query: &str, limit: usize) -> Result<Vec<CatalogHit>> {
        if self.course_count().await? == 0 {
            return Ok(Vec::new());
        }

        let query_embedding = self.embedder.embed(query).await?;
        let conn = self.lock()?;

        let mut stmt = conn.prepare("SELECT title, embedding FROM courses")?;
        let rows = stmt.query_map([], |row| {
            let title: String = row.get(0)?;
            let embedding_bytes: Vec<u8> = row.get(1)?;
            Ok((title, embedding_bytes))
        })?;

        let mut hits = Vec::new();
        for row in rows {
            let (title, embedding_bytes) = row?;
            let embedding = Self::bytes_to_embedding(&embedding_bytes);
            hits.push(CatalogHit {
                title,
                distance: cosine_distance(&query_embedding, &embedding),
            });
        }

        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits.truncate(limit);
        Ok(hits)
    }

    #[instrument(skip(self))]
    async fn course(&self, title: &str) -> Result<Option<Course>> {
        let conn = self.lock()?;

        let row = conn.query_row(
            "SELECT title, instructor, course_link, lessons_json FROM courses WHERE title = ?1",
            params![title],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, Option<String>>(1)?,
                    row.get::<_, Option<String>>(2)?,
                    row.get::<_, String>(3)?,
                ))
            },
        );

        match row {
            Ok((title, instructor, link, lessons)) => {
                Ok(Some(Self::row_to_course(title, instructor, link, &lessons)?))
            }
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(skip(self))]
    async fn courses(&self) -> Result<Vec<Course>> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(
            "SELECT title, instructor, course_link, lessons_json FROM courses ORDER BY rowid",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, Option<String>>(1)?,
                row.get::<_, Option<String>>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;

        let mut courses = Vec::new();
        for row in rows {
            let (title, instructor, link, lessons) = row?;
            courses.push(Self::row_to_course(title, instructor, link, &lessons)?);
        }
        Ok(courses)
    }

    async fn course_titles(&self) -> Result<Vec<String>> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare("SELECT title FROM courses ORDER BY rowid")?;
        let titles = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(titles)
    }

    async fn course_count(&self) -> Result<usize> {
        let conn = self.lock()?;

        let count: i64 = conn.query_row("SELECT COUNT(*) FROM courses", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

#[async_trait]
impl ContentIndex for SqliteCourseStore {
    #[instrument(skip(self, filter))]
    async fn query_content(
        &self,
        query: &str,
        filter: Option<&SearchFilter>,
        limit: usize,
    ) -> Result<Vec<ContentHit>> {
        let query_embedding = self.embedder.embed(query).await?;
        let conn = self.lock()?;

        let (where_sql, values) = Self::where_clause(filter);
        let sql = format!(
            "SELECT course_title, lesson_number, chunk_index, content, embedding FROM chunks {} ORDER BY rowid",
            where_sql
        );

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(values.iter()), |row| {
            let embedding_bytes: Vec<u8> = row.get(4)?;
            let chunk_index: i64 = row.get(2)?;
            Ok((
                ChunkMetadata {
                    course_title: row.get(0)?,
                    lesson_number: row.get(1)?,
                    chunk_index: chunk_index as usize,
                },
                row.get::<_, String>(3)?,
                embedding_bytes,
            ))
        })?;

        let mut hits = Vec::new();
        for row in rows {
            let (metadata, content, embedding_bytes) = row?;
            let embedding = Self::bytes_to_embedding(&embedding_bytes);
            hits.push(ContentHit {
                content,
                metadata,
                distance: cosine_distance(&query_embedding, &embedding),
            });
        }

        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits.truncate(limit);

        debug!("Found {} matching chunks", hits.len());
        Ok(hits)
    }
}

#[async_trait]
impl CourseStore for SqliteCourseStore {
    #[instrument(skip(self, course), fields(title = %course.title))]
    async fn add_course_metadata(&self, course: &Course) -> Result<()> {
        let embedding = self.embedder.embed(&course.title).await?;
        let lessons_json = serde_json::to_string(&course.lessons)?;
        let conn = self.lock()?;

        conn.execute(
            r#"
            INSERT INTO courses (title, instructor, course_link, lessons_json, embedding)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(title) DO UPDATE SET
                instructor = excluded.instructor,
                course_link = excluded.course_link,
                lessons_json = excluded.lessons_json,
                embedding = excluded.embedding
            "#,
            params![
                course.title,
                course.instructor,
                course.course_link,
                lessons_json,
                Self::embedding_to_bytes(&embedding),
            ],
        )?;

        debug!("Stored course metadata");
        Ok(())
    }

    #[instrument(skip(self, chunks), fields(count = chunks.len()))]
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

        let conn = self.lock()?;
        let tx = conn.unchecked_transaction()?;

        for (chunk, embedding) in chunks.iter().zip(&embeddings) {
            tx.execute(
                r#"
                INSERT OR REPLACE INTO chunks
                (id, course_title, lesson_number, chunk_index, content, embedding)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
                params![
                    chunk.id(),
                    chunk.course_title,
                    chunk.lesson_number,
                    chunk.chunk_index as i64,
                    chunk.content,
                    Self::embedding_to_bytes(embedding),
                ],
            )?;
        }

        tx.commit()?;
        info!("Stored {} course chunks", chunks.len());
        Ok(chunks.len())
    }

    async fn clear(&self) -> Result<()> {
        let conn = self.lock()?;
        conn.execute_batch("DELETE FROM chunks; DELETE FROM courses;")?;
        info!("Cleared course store");
        Ok(())
    }
}
