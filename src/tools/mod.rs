//! Tools the language model can call, and the registry that dispatches them.
//!
//! A tool describes itself with a [`ToolDefinition`] and answers invocations with
//! plain text. Tools never fail from the caller's point of view: retrieval problems
//! come back as descriptive strings so the model can react to them in-conversation.
//! Tools whose output is attributable to course chunks also implement
//! [`SourceTracking`].

mod content_search;
mod course_outline;
mod registry;

pub use content_search::{CourseSearchTool, SearchHit};
pub use course_outline::CourseOutlineTool;
pub use registry::ToolRegistry;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Static capability advertisement for a tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    /// JSON schema of the tool's parameters.
    pub input_schema: serde_json::Value,
}

/// Provenance for one retrieved chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    /// Human-readable label, e.g. "Course - Lesson 2".
    pub text: String,
    pub url: Option<String>,
}

/// A capability the model can invoke.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Descriptor advertised to the completion service.
    fn definition(&self) -> ToolDefinition;

    /// Run the tool with the model-supplied parameters.
    async fn invoke(&self, params: &serde_json::Value) -> String;

    /// Provenance capability, for tools that record sources.
    fn source_tracking(&self) -> Option<&dyn SourceTracking> {
        None
    }
}

/// Tools that remember the sources behind their last invocation.
pub trait SourceTracking: Send + Sync {
    /// Sources produced by the most recent invocation.
    fn last_sources(&self) -> Vec<Source>;

    /// Forget recorded sources.
    fn reset_sources(&self);
}

/// Parse tool parameters, producing the message returned to the model on failure.
pub(crate) fn parse_params<T: serde::de::DeserializeOwned>(
    tool: &str,
    params: &serde_json::Value,
) -> Result<T, String> {
    serde_json::from_value(params.clone())
        .map_err(|e| format!("Invalid arguments for {}: {}", tool, e))
}

/// Treat a blank course name as absent.
pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Accept lesson numbers sent as integers or numeric strings.
pub(crate) fn lesson_number<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u32),
        Text(String),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Number(n)) => Ok(Some(n)),
        Some(Raw::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(Raw::Text(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("invalid lesson number '{}'", s))),
    }
}
