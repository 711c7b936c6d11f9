//! `get_course_outline`: course title, link, instructor, and lesson list.

use super::{parse_params, Tool, ToolDefinition};
use crate::search::CatalogResolver;
use crate::vector_store::Course;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{info, warn};

const NAME: &str = "get_course_outline";

#[derive(Debug, Deserialize)]
struct OutlineArgs {
    course_name: String,
}

/// Course outline lookup. Outlines are not attributable to a content chunk, so
/// this tool records no sources.
pub struct CourseOutlineTool {
    resolver: CatalogResolver,
}

impl CourseOutlineTool {
    pub fn new(resolver: CatalogResolver) -> Self {
        Self { resolver }
    }

    /// Resolve `course_name` and render its outline.
    pub async fn outline(&self, course_name: &str) -> String {
        let Some(title) = self.resolver.resolve(course_name).await else {
            return format!("No course found matching '{}'", course_name);
        };

        match self.resolver.catalog().course(&title).await {
            Ok(Some(course)) => format_outline(&course),
            Ok(None) => format!("Course metadata not found for '{}'", title),
            Err(e) => {
                warn!("Metadata lookup for '{}' failed: {}", title, e);
                format!("Course metadata not found for '{}'", title)
            }
        }
    }
}

/// Render course metadata as the outline text shown to the model.
pub fn format_outline(course: &Course) -> String {
    let mut parts = vec![format!("**Course:** {}", course.title)];

    if let Some(link) = &course.course_link {
        parts.push(format!("**Course Link:** {}", link));
    }
    if let Some(instructor) = &course.instructor {
        parts.push(format!("**Instructor:** {}", instructor));
    }

    if course.lessons.is_empty() {
        parts.push("\n**Course Outline:** No lessons available".to_string());
    } else {
        parts.push(format!(
            "\n**Course Outline ({} lessons):**",
            course.lessons.len()
        ));
        for lesson in &course.lessons {
            let mut entry = format!("Lesson {}: {}", lesson.lesson_number, lesson.lesson_title);
            if let Some(link) = &lesson.lesson_link {
                entry.push_str(&format!(" - {}", link));
            }
            parts.push(entry);
        }
    }

    parts.join("\n")
}

#[async_trait]
impl Tool for CourseOutlineTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: NAME.to_string(),
            description: "Get the complete outline/structure of a course including course title, course link, and all lessons"
                .to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "course_name": {
                        "type": "string",
                        "description": "Course title (partial matches work, e.g. 'MCP', 'Introduction', 'Building')"
                    }
                },
                "required": ["course_name"]
            }),
        }
    }

    async fn invoke(&self, params: &serde_json::Value) -> String {
        let args: OutlineArgs = match parse_params(NAME, params) {
            Ok(args) => args,
            Err(message) => return message,
        };

        info!("Fetching course outline for {:?}", args.course_name);
        self.outline(&args.course_name).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::test_support::{sample_course, KeywordEmbedder, COURSE_TITLE};
    use crate::vector_store::{CatalogHit, CatalogIndex, CourseStore, MemoryCourseStore};
    use serde_json::json;
    use std::sync::Arc;

    async fn tool_with(courses: &[Course]) -> CourseOutlineTool {
        let store = MemoryCourseStore::new(Arc::new(KeywordEmbedder));
        for course in courses {
            store.add_course_metadata(course).await.unwrap();
        }
        CourseOutlineTool::new(CatalogResolver::new(Arc::new(store)))
    }

    /// Catalog whose title index disagrees with its metadata.
    struct TitlesOnly;

    #[async_trait]
    impl CatalogIndex for TitlesOnly {
        async fn query_catalog(&self, _query: &str, _limit: usize) -> Result<Vec<CatalogHit>> {
            Ok(vec![CatalogHit {
                title: "Ghost Course".to_string(),
                distance: 0.0,
            }])
        }

        async fn course(&self, _title: &str) -> Result<Option<Course>> {
            Ok(None)
        }

        async fn courses(&self) -> Result<Vec<Course>> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_full_outline() {
        let tool = tool_with(&[sample_course()]).await;
        let output = tool.invoke(&json!({"course_name": "Chroma"})).await;

        let expected = format!(
            "**Course:** {}\n\
             **Course Link:** https://example.com/course\n\
             **Instructor:** John Doe\n\
             \n**Course Outline (3 lessons):**\n\
             Lesson 1: Introduction to Vectors - https://example.com/lesson1\n\
             Lesson 2: Embedding Basics - https://example.com/lesson2\n\
             Lesson 3: Similarity Search",
            COURSE_TITLE
        );
        assert_eq!(output, expected);
    }

    #[tokio::test]
    async fn test_course_without_lessons() {
        let bare = Course {
            title: "Bare Course".to_string(),
            instructor: None,
            course_link: None,
            lessons: Vec::new(),
        };
        let tool = tool_with(&[bare]).await;
        let output = tool.invoke(&json!({"course_name": "bare"})).await;

        assert_eq!(
            output,
            "**Course:** Bare Course\n\n**Course Outline:** No lessons available"
        );
        assert!(!output.contains("lessons):**"));
        assert!(!output.contains("Course Link"));
        assert!(!output.contains("Instructor"));
    }

    #[tokio::test]
    async fn test_unresolved_course() {
        let tool = tool_with(&[]).await;
        let output = tool.invoke(&json!({"course_name": "Nonexistent"})).await;
        assert_eq!(output, "No course found matching 'Nonexistent'");
    }

    #[tokio::test]
    async fn test_missing_metadata() {
        let tool = CourseOutlineTool::new(CatalogResolver::new(Arc::new(TitlesOnly)));
        let output = tool.invoke(&json!({"course_name": "ghost"})).await;
        assert_eq!(output, "Course metadata not found for 'Ghost Course'");
    }

    #[tokio::test]
    async fn test_missing_course_name_is_reported_as_text() {
        let tool = tool_with(&[sample_course()]).await;
        let output = tool.invoke(&json!({})).await;
        assert!(output.starts_with("Invalid arguments for get_course_outline:"));
    }

    #[test]
    fn test_outline_tool_tracks_no_sources() {
        let tool = CourseOutlineTool::new(CatalogResolver::new(Arc::new(TitlesOnly)));
        assert!(tool.source_tracking().is_none());
        assert_eq!(tool.definition().name, "get_course_outline");
    }
}
