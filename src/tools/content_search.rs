//! `search_course_content`: semantic search over course transcripts.

use super::{lesson_number, non_blank, parse_params, Source, SourceTracking, Tool, ToolDefinition};
use crate::search::{ContentRetriever, SearchResults};
use crate::vector_store::CatalogIndex;
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

const NAME: &str = "search_course_content";

#[derive(Debug, Deserialize)]
struct SearchArgs {
    query: String,
    #[serde(default)]
    course_name: Option<String>,
    #[serde(default, deserialize_with = "lesson_number")]
    lesson_number: Option<u32>,
}

/// One search hit: its provenance label, chunk text, and lesson link.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub label: String,
    pub content: String,
    pub url: Option<String>,
}

impl SearchHit {
    fn source(&self) -> Source {
        Source {
            text: self.label.clone(),
            url: self.url.clone(),
        }
    }
}

/// Content search with fuzzy course matching and lesson filtering.
pub struct CourseSearchTool {
    retriever: ContentRetriever,
    catalog: Arc<dyn CatalogIndex>,
    last_sources: Mutex<Vec<Source>>,
}

impl CourseSearchTool {
    /// `catalog` supplies lesson links for provenance.
    pub fn new(retriever: ContentRetriever, catalog: Arc<dyn CatalogIndex>) -> Self {
        Self {
            retriever,
            catalog,
            last_sources: Mutex::new(Vec::new()),
        }
    }

    /// Run a search with typed arguments and render it for the model.
    pub async fn search(
        &self,
        query: &str,
        course_name: Option<&str>,
        lesson_number: Option<u32>,
    ) -> String {
        match self.search_hits(query, course_name, lesson_number).await {
            Ok(hits) => hits
                .iter()
                .map(|hit| format!("[{}]\n{}", hit.label, hit.content))
                .collect::<Vec<_>>()
                .join("\n\n"),
            Err(message) => message,
        }
    }

    /// Run a search and return one entry per hit, recording one source each.
    ///
    /// A blank `course_name` counts as absent. `Err` carries the text shown in
    /// place of results: a resolution or search failure, or the no-match note.
    pub async fn search_hits(
        &self,
        query: &str,
        course_name: Option<&str>,
        lesson_number: Option<u32>,
    ) -> std::result::Result<Vec<SearchHit>, String> {
        let course_name = non_blank(course_name);
        let results = self
            .retriever
            .search(query, course_name, lesson_number, None)
            .await;

        if let Some(error) = &results.error {
            return Err(error.clone());
        }

        if results.is_empty() {
            let mut filter_info = String::new();
            if let Some(name) = course_name {
                filter_info.push_str(&format!(" in course '{}'", name));
            }
            if let Some(n) = lesson_number {
                filter_info.push_str(&format!(" in lesson {}", n));
            }
            return Err(format!("No relevant content found{}.", filter_info));
        }

        Ok(self.collect_hits(&results).await)
    }

    async fn collect_hits(&self, results: &SearchResults) -> Vec<SearchHit> {
        let mut hits = Vec::with_capacity(results.len());

        for (doc, meta, _) in results.iter() {
            let label = match meta.lesson_number {
                Some(n) => format!("{} - Lesson {}", meta.course_title, n),
                None => meta.course_title.clone(),
            };

            let url = match meta.lesson_number {
                Some(n) => match self.catalog.lesson_link(&meta.course_title, n).await {
                    Ok(link) => link,
                    Err(e) => {
                        warn!("Lesson link lookup failed for {}: {}", label, e);
                        None
                    }
                },
                None => None,
            };

            hits.push(SearchHit {
                label,
                content: doc.to_string(),
                url,
            });
        }

        debug!("Recorded {} sources", hits.len());
        *self
            .last_sources
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) =
            hits.iter().map(SearchHit::source).collect();

        hits
    }
}

#[async_trait]
impl Tool for CourseSearchTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: NAME.to_string(),
            description: "Search course materials with smart course name matching and lesson filtering"
                .to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "What to search for in the course content"
                    },
                    "course_name": {
                        "type": "string",
                        "description": "Course title (partial matches work, e.g. 'MCP', 'Introduction')"
                    },
                    "lesson_number": {
                        "type": "integer",
                        "description": "Specific lesson number to search within (e.g. 1, 2, 3)"
                    }
                },
                "required": ["query"]
            }),
        }
    }

    async fn invoke(&self, params: &serde_json::Value) -> String {
        let args: SearchArgs = match parse_params(NAME, params) {
            Ok(args) => args,
            Err(message) => return message,
        };
        info!(
            "Searching course content: {:?} (course: {:?}, lesson: {:?})",
            args.query, args.course_name, args.lesson_number
        );

        self.search(&args.query, args.course_name.as_deref(), args.lesson_number)
            .await
    }

    fn source_tracking(&self) -> Option<&dyn SourceTracking> {
        Some(self)
    }
}

impl SourceTracking for CourseSearchTool {
    fn last_sources(&self) -> Vec<Source> {
        self.last_sources
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn reset_sources(&self) {
        self.last_sources
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::CatalogResolver;
    use crate::test_support::{sample_chunks, sample_course, FailingIndex, KeywordEmbedder, COURSE_TITLE};
    use crate::vector_store::{Course, CourseChunk, CourseStore, MemoryCourseStore};
    use serde_json::json;

    async fn store_with(chunks: &[CourseChunk]) -> Arc<MemoryCourseStore> {
        let store = Arc::new(MemoryCourseStore::new(Arc::new(KeywordEmbedder)));
        store.add_course_metadata(&sample_course()).await.unwrap();
        store.add_course_content(chunks).await.unwrap();
        store
    }

    fn tool_for(store: Arc<MemoryCourseStore>) -> CourseSearchTool {
        let retriever = ContentRetriever::new(store.clone(), CatalogResolver::new(store.clone()), 5);
        CourseSearchTool::new(retriever, store)
    }

    #[test]
    fn test_definition() {
        let store = Arc::new(MemoryCourseStore::new(Arc::new(KeywordEmbedder)));
        let definition = tool_for(store).definition();

        assert_eq!(definition.name, "search_course_content");
        assert_eq!(definition.input_schema["required"], json!(["query"]));
        assert_eq!(
            definition.input_schema["properties"]["lesson_number"]["type"],
            "integer"
        );
    }

    #[tokio::test]
    async fn test_two_hits_produce_two_blocks_and_sources() {
        let chunks = &sample_chunks()[..2];
        let tool = tool_for(store_with(chunks).await);

        let output = tool.invoke(&json!({"query": "vector databases embeddings"})).await;

        let blocks: Vec<&str> = output.split("\n\n").collect();
        assert_eq!(blocks.len(), 2);
        assert!(blocks.iter().all(|b| b.starts_with(&format!("[{} - Lesson ", COURSE_TITLE))));

        let sources = tool.last_sources();
        assert_eq!(sources.len(), 2);
        for (block, source) in blocks.iter().zip(&sources) {
            assert!(block.starts_with(&format!("[{}]\n", source.text)));
        }
        let lesson1 = sources
            .iter()
            .find(|s| s.text == format!("{} - Lesson 1", COURSE_TITLE))
            .unwrap();
        assert_eq!(lesson1.url.as_deref(), Some("https://example.com/lesson1"));
    }

    #[tokio::test]
    async fn test_header_format_with_lesson() {
        let chunks = &sample_chunks()[..1];
        let tool = tool_for(store_with(chunks).await);

        let output = tool.invoke(&json!({"query": "vector"})).await;
        assert_eq!(
            output,
            format!("[{} - Lesson 1]\n{}", COURSE_TITLE, chunks[0].content)
        );
    }

    #[tokio::test]
    async fn test_chunk_without_lesson_omits_lesson_and_link() {
        let chunk = CourseChunk {
            content: "Course-wide introduction".to_string(),
            course_title: COURSE_TITLE.to_string(),
            lesson_number: None,
            chunk_index: 0,
        };
        let store = store_with(&[chunk]).await;
        // A catalog that fails on lookup proves no lesson link is requested.
        let retriever = ContentRetriever::new(store.clone(), CatalogResolver::new(store), 5);
        let tool = CourseSearchTool::new(retriever, Arc::new(FailingIndex("no lookups expected")));

        let output = tool.invoke(&json!({"query": "introduction"})).await;
        assert_eq!(output, format!("[{}]\nCourse-wide introduction", COURSE_TITLE));
        assert_eq!(
            tool.last_sources(),
            vec![Source {
                text: COURSE_TITLE.to_string(),
                url: None
            }]
        );
    }

    #[tokio::test]
    async fn test_empty_message_includes_supplied_filters() {
        let tool = tool_for(store_with(&sample_chunks()).await);

        let output = tool
            .invoke(&json!({"query": "x", "course_name": "Chroma", "lesson_number": 9}))
            .await;
        assert_eq!(output, "No relevant content found in course 'Chroma' in lesson 9.");

        let output = tool.invoke(&json!({"query": "x", "lesson_number": 9})).await;
        assert_eq!(output, "No relevant content found in lesson 9.");
    }

    #[tokio::test]
    async fn test_empty_message_without_filters() {
        let store = Arc::new(MemoryCourseStore::new(Arc::new(KeywordEmbedder)));
        let tool = tool_for(store);

        let output = tool.invoke(&json!({"query": "anything"})).await;
        assert_eq!(output, "No relevant content found.");
        assert!(!output.contains("in course"));
        assert!(!output.contains("in lesson"));
    }

    #[tokio::test]
    async fn test_error_returned_verbatim() {
        let store = Arc::new(MemoryCourseStore::new(Arc::new(KeywordEmbedder)));
        let tool = tool_for(store);

        let output = tool.invoke(&json!({"query": "x", "course_name": "Nonexistent"})).await;
        assert_eq!(output, "No course found matching 'Nonexistent'");
        assert!(tool.last_sources().is_empty());
    }

    #[tokio::test]
    async fn test_sources_replaced_not_accumulated() {
        let tool = tool_for(store_with(&sample_chunks()).await);

        tool.invoke(&json!({"query": "vectors"})).await;
        assert_eq!(tool.last_sources().len(), 3);

        tool.invoke(&json!({"query": "vectors", "lesson_number": 2})).await;
        assert_eq!(tool.last_sources().len(), 1);

        tool.reset_sources();
        assert!(tool.last_sources().is_empty());
    }

    #[tokio::test]
    async fn test_multi_paragraph_chunk_is_one_hit() {
        let chunk = CourseChunk {
            content: "First paragraph on vectors.\n\nSecond paragraph on vectors.".to_string(),
            course_title: COURSE_TITLE.to_string(),
            lesson_number: Some(2),
            chunk_index: 0,
        };
        let tool = tool_for(store_with(&[chunk.clone()]).await);

        let hits = tool.search_hits("vectors", None, None).await.unwrap();
        assert_eq!(
            hits,
            vec![SearchHit {
                label: format!("{} - Lesson 2", COURSE_TITLE),
                content: chunk.content,
                url: Some("https://example.com/lesson2".to_string()),
            }]
        );
        assert_eq!(tool.last_sources().len(), 1);
    }

    #[tokio::test]
    async fn test_blank_course_name_searches_every_course() {
        let store = store_with(&sample_chunks()).await;
        store
            .add_course_metadata(&Course {
                title: "Building Towards Computer Use".to_string(),
                instructor: None,
                course_link: None,
                lessons: Vec::new(),
            })
            .await
            .unwrap();
        store
            .add_course_content(&[CourseChunk {
                content: "Screenshots become vectors for the model.".to_string(),
                course_title: "Building Towards Computer Use".to_string(),
                lesson_number: None,
                chunk_index: 0,
            }])
            .await
            .unwrap();
        let tool = tool_for(store);

        let hits = tool.search_hits("vectors", Some("  "), None).await.unwrap();
        assert_eq!(hits.len(), 4);
        assert!(hits.iter().any(|h| h.label == "Building Towards Computer Use"));
        assert!(hits.iter().any(|h| h.label.starts_with(COURSE_TITLE)));
    }

    #[tokio::test]
    async fn test_missing_query_is_reported_as_text() {
        let store = Arc::new(MemoryCourseStore::new(Arc::new(KeywordEmbedder)));
        let output = tool_for(store).invoke(&json!({"course_name": "MCP"})).await;
        assert!(output.starts_with("Invalid arguments for search_course_content:"));
    }
}
