//! Uniform representation of a retrieval outcome.

use crate::vector_store::{ChunkMetadata, ContentHit};

/// Documents, metadata, and distances as parallel sequences, or an error.
///
/// When `error` is set all three sequences are empty. An error and "no matches"
/// are distinct outcomes even though both report [`SearchResults::is_empty`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchResults {
    pub documents: Vec<String>,
    pub metadata: Vec<ChunkMetadata>,
    pub distances: Vec<f32>,
    pub error: Option<String>,
}

impl SearchResults {
    /// Wrap index hits, keeping their nearest-first order.
    pub fn from_hits(hits: Vec<ContentHit>) -> Self {
        let mut results = Self {
            documents: Vec::with_capacity(hits.len()),
            metadata: Vec::with_capacity(hits.len()),
            distances: Vec::with_capacity(hits.len()),
            error: None,
        };
        for hit in hits {
            results.documents.push(hit.content);
            results.metadata.push(hit.metadata);
            results.distances.push(hit.distance);
        }
        results
    }

    /// An error outcome with no documents.
    pub fn with_error(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::default()
        }
    }

    /// True when there are no documents, whether or not an error is set.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Iterate `(document, metadata, distance)` triples in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ChunkMetadata, f32)> {
        self.documents
            .iter()
            .zip(&self.metadata)
            .zip(&self.distances)
            .map(|((doc, meta), distance)| (doc.as_str(), meta, *distance))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(content: &str, lesson: Option<u32>, distance: f32) -> ContentHit {
        ContentHit {
            content: content.to_string(),
            metadata: ChunkMetadata {
                course_title: "Course".to_string(),
                lesson_number: lesson,
                chunk_index: 0,
            },
            distance,
        }
    }

    #[test]
    fn test_from_hits_keeps_parallel_order() {
        let results = SearchResults::from_hits(vec![hit("doc1", Some(1), 0.1), hit("doc2", None, 0.2)]);

        assert_eq!(results.documents, vec!["doc1", "doc2"]);
        assert_eq!(results.metadata[0].lesson_number, Some(1));
        assert_eq!(results.metadata[1].lesson_number, None);
        assert_eq!(results.distances, vec![0.1, 0.2]);
        assert!(results.error.is_none());
        assert!(!results.is_empty());
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn test_from_no_hits_is_empty_without_error() {
        let results = SearchResults::from_hits(Vec::new());
        assert!(results.is_empty());
        assert!(results.error.is_none());
    }

    #[test]
    fn test_error_results_are_empty() {
        let results = SearchResults::with_error("Test error message");

        assert!(results.documents.is_empty());
        assert!(results.metadata.is_empty());
        assert!(results.distances.is_empty());
        assert_eq!(results.error.as_deref(), Some("Test error message"));
        assert!(results.is_empty());
    }

    #[test]
    fn test_iter_yields_triples() {
        let results = SearchResults::from_hits(vec![hit("a", Some(2), 0.5)]);
        let triples: Vec<_> = results.iter().collect();
        assert_eq!(triples.len(), 1);
        assert_eq!(triples[0].0, "a");
        assert_eq!(triples[0].1.lesson_number, Some(2));
        assert_eq!(triples[0].2, 0.5);
    }
}
