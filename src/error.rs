//! Error types for courseqa.

use thiserror::Error;

/// Library-level error type for courseqa operations.
///
/// Only failures that should abort a query live here. Retrieval problems that the
/// model can react to (unknown course, empty results, index failures inside a tool)
/// are reported as plain text by the tools instead.
#[derive(Error, Debug)]
pub enum CourseQaError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    #[error("Vector store error: {0}")]
    VectorStore(String),

    #[error("Completion service error: {0}")]
    Completion(String),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),

    #[error("Tool registration rejected: {0}")]
    ToolRegistration(String),

    #[error("Course not found: {0}")]
    CourseNotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

/// Result type alias for courseqa operations.
pub type Result<T> = std::result::Result<T, CourseQaError>;
