//! Filtered semantic search over course content.

use super::{CatalogResolver, SearchResults};
use crate::vector_store::{ContentIndex, FilterClause, SearchFilter};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Build the metadata filter for a content query.
///
/// No arguments gives no filter, one argument a single equality, and both a
/// conjunction with the course clause first.
pub fn build_filter(course_title: Option<&str>, lesson_number: Option<u32>) -> Option<SearchFilter> {
    match (course_title, lesson_number) {
        (None, None) => None,
        (Some(title), None) => Some(SearchFilter::Eq(FilterClause::CourseTitle(title.to_string()))),
        (None, Some(n)) => Some(SearchFilter::Eq(FilterClause::LessonNumber(n))),
        (Some(title), Some(n)) => Some(SearchFilter::And(vec![
            FilterClause::CourseTitle(title.to_string()),
            FilterClause::LessonNumber(n),
        ])),
    }
}

/// Semantic search over course chunks, optionally scoped to a course and lesson.
#[derive(Clone)]
pub struct ContentRetriever {
    content: Arc<dyn ContentIndex>,
    resolver: CatalogResolver,
    max_results: usize,
}

impl ContentRetriever {
    pub fn new(content: Arc<dyn ContentIndex>, resolver: CatalogResolver, max_results: usize) -> Self {
        Self {
            content,
            resolver,
            max_results,
        }
    }

    /// Search course content. Never fails: index errors and unknown courses
    /// come back as [`SearchResults::error`].
    #[instrument(skip(self))]
    pub async fn search(
        &self,
        query: &str,
        course_name: Option<&str>,
        lesson_number: Option<u32>,
        limit: Option<usize>,
    ) -> SearchResults {
        let course_title = match course_name {
            Some(name) => match self.resolver.resolve(name).await {
                Some(title) => Some(title),
                None => return SearchResults::with_error(format!("No course found matching '{}'", name)),
            },
            None => None,
        };

        let filter = build_filter(course_title.as_deref(), lesson_number);
        if let Some(filter) = &filter {
            debug!("Filtering content by {}", filter);
        }
        let limit = limit.unwrap_or(self.max_results);

        match self.content.query_content(query, filter.as_ref(), limit).await {
            Ok(hits) => {
                debug!("Content search returned {} hits", hits.len());
                SearchResults::from_hits(hits)
            }
            Err(e) => {
                warn!("Content search failed: {}", e);
                SearchResults::with_error(format!("Search error: {}", e))
            }
        }
    }
}
