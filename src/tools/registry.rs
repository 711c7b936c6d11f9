//! Tool registry: registration, capability listing, dispatch, and provenance.

use super::{Source, Tool, ToolDefinition};
use crate::error::{CourseQaError, Result};
use std::sync::Arc;
use tracing::{debug, warn};

/// Tools available to the model, keyed by their declared name.
///
/// Definitions are listed in registration order; re-registering a name replaces
/// the tool in place.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<(String, Arc<dyn Tool>)>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool under the name in its definition.
    pub fn register(&mut self, tool: Arc<dyn Tool>) -> Result<()> {
        let name = tool.definition().name;
        if name.trim().is_empty() {
            return Err(CourseQaError::ToolRegistration(
                "Tool must have a 'name' in its definition".to_string(),
            ));
        }

        match self.tools.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => {
                debug!("Replacing tool '{}'", name);
                slot.1 = tool;
            }
            None => {
                debug!("Registered tool '{}'", name);
                self.tools.push((name, tool));
            }
        }
        Ok(())
    }

    /// Definitions of every registered tool.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|(_, t)| t.definition()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Invoke a tool by name. Unknown names produce a message, not an error.
    pub async fn invoke(&self, name: &str, params: &serde_json::Value) -> String {
        match self.tools.iter().find(|(n, _)| n == name) {
            Some((_, tool)) => tool.invoke(params).await,
            None => {
                warn!("Model requested unknown tool '{}'", name);
                format!("Tool '{}' not found", name)
            }
        }
    }

    /// The first non-empty source list among tools that track sources.
    pub fn last_sources(&self) -> Vec<Source> {
        self.tools
            .iter()
            .filter_map(|(_, t)| t.source_tracking())
            .map(|tracking| tracking.last_sources())
            .find(|sources| !sources.is_empty())
            .unwrap_or_default()
    }

    /// Clear sources on every tool that tracks them.
    pub fn reset_sources(&self) {
        for tracking in self.tools.iter().filter_map(|(_, t)| t.source_tracking()) {
            tracking.reset_sources();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::{CatalogResolver, ContentRetriever};
    use crate::test_support::{sample_chunks, sample_course, KeywordEmbedder};
    use crate::tools::{CourseOutlineTool, CourseSearchTool, SourceTracking};
    use crate::vector_store::{CourseStore, MemoryCourseStore};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    struct Echo {
        name: &'static str,
        reply: &'static str,
    }

    #[async_trait]
    impl Tool for Echo {
        fn definition(&self) -> ToolDefinition {
            ToolDefinition {
                name: self.name.to_string(),
                description: "echo".to_string(),
                input_schema: json!({"type": "object", "properties": {}}),
            }
        }

        async fn invoke(&self, _params: &serde_json::Value) -> String {
            self.reply.to_string()
        }
    }

    /// Tracking tool with preset sources.
    struct Tracked {
        name: &'static str,
        sources: Mutex<Vec<Source>>,
    }

    impl Tracked {
        fn new(name: &'static str, labels: &[&str]) -> Self {
            Self {
                name,
                sources: Mutex::new(
                    labels
                        .iter()
                        .map(|l| Source {
                            text: l.to_string(),
                            url: None,
                        })
                        .collect(),
                ),
            }
        }
    }

    #[async_trait]
    impl Tool for Tracked {
        fn definition(&self) -> ToolDefinition {
            ToolDefinition {
                name: self.name.to_string(),
                description: "tracked".to_string(),
                input_schema: json!({}),
            }
        }

        async fn invoke(&self, _params: &serde_json::Value) -> String {
            String::new()
        }

        fn source_tracking(&self) -> Option<&dyn SourceTracking> {
            Some(self)
        }
    }

    impl SourceTracking for Tracked {
        fn last_sources(&self) -> Vec<Source> {
            self.sources.lock().unwrap().clone()
        }

        fn reset_sources(&self) {
            self.sources.lock().unwrap().clear();
        }
    }

    #[test]
    fn test_register_rejects_missing_name() {
        let mut registry = ToolRegistry::new();
        let result = registry.register(Arc::new(Echo { name: "", reply: "" }));

        assert!(matches!(result, Err(CourseQaError::ToolRegistration(_))));
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn test_register_overwrites_same_name_in_place() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(Echo { name: "a", reply: "first" })).unwrap();
        registry.register(Arc::new(Echo { name: "b", reply: "b" })).unwrap();
        registry.register(Arc::new(Echo { name: "a", reply: "second" })).unwrap();

        assert_eq!(registry.len(), 2);
        let names: Vec<String> = registry.definitions().into_iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(registry.invoke("a", &json!({})).await, "second");
    }

    #[tokio::test]
    async fn test_invoke_unknown_tool_returns_message() {
        let registry = ToolRegistry::new();
        assert_eq!(registry.invoke("X", &json!({})).await, "Tool 'X' not found");
    }

    #[test]
    fn test_last_sources_first_non_empty_wins() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(Echo { name: "plain", reply: "" })).unwrap();
        registry.register(Arc::new(Tracked::new("empty", &[]))).unwrap();
        registry.register(Arc::new(Tracked::new("first", &["one"]))).unwrap();
        registry.register(Arc::new(Tracked::new("second", &["two"]))).unwrap();

        let sources = registry.last_sources();
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].text, "one");

        registry.reset_sources();
        assert!(registry.last_sources().is_empty());
        // Idempotent.
        registry.reset_sources();
        assert!(registry.last_sources().is_empty());
    }

    #[tokio::test]
    async fn test_reset_after_search_leaves_no_sources() {
        let store = Arc::new(MemoryCourseStore::new(Arc::new(KeywordEmbedder)));
        store.add_course_metadata(&sample_course()).await.unwrap();
        store.add_course_content(&sample_chunks()).await.unwrap();

        let resolver = CatalogResolver::new(store.clone());
        let retriever = ContentRetriever::new(store.clone(), resolver.clone(), 5);

        let mut registry = ToolRegistry::new();
        registry
            .register(Arc::new(CourseSearchTool::new(retriever, store)))
            .unwrap();
        registry.register(Arc::new(CourseOutlineTool::new(resolver))).unwrap();

        let names: Vec<String> = registry.definitions().into_iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["search_course_content", "get_course_outline"]);

        let output = registry
            .invoke("search_course_content", &json!({"query": "vectors"}))
            .await;
        assert!(output.starts_with('['));
        assert_eq!(registry.last_sources().len(), 3);

        registry.reset_sources();
        assert!(registry.last_sources().is_empty());
    }
}
