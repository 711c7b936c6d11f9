//! Pre-flight checks before commands that call the OpenAI API.

use crate::error::{CourseQaError, Result};

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Asking, searching, and importing embed text, so they need an API key.
    Query,
    /// Listing the catalog reads the store only.
    Browse,
}

/// Run pre-flight checks for the given operation.
pub fn check(operation: Operation) -> Result<()> {
    match operation {
        Operation::Query => check_api_key(std::env::var("OPENAI_API_KEY").ok().as_deref()),
        Operation::Browse => Ok(()),
    }
}

fn check_api_key(key: Option<&str>) -> Result<()> {
    match key {
        Some(key) if !key.trim().is_empty() => Ok(()),
        Some(_) => Err(CourseQaError::Config(
            "OPENAI_API_KEY is empty. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
        )),
        None => Err(CourseQaError::Config(
            "OPENAI_API_KEY not set. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
        )),
    }
}
