//! Fuzzy course-name resolution against the course catalog.

use crate::vector_store::CatalogIndex;
use std::sync::Arc;
use tracing::{debug, warn};

/// Resolves a user-supplied course name fragment to a canonical course title.
///
/// Resolution is a single top-1 nearest-neighbour query over course title
/// embeddings. With no distance ceiling configured, any non-empty catalog
/// resolves every fragment to *some* course; a wrong match simply yields no
/// content hits downstream.
#[derive(Clone)]
pub struct CatalogResolver {
    catalog: Arc<dyn CatalogIndex>,
    max_distance: Option<f32>,
}

impl CatalogResolver {
    pub fn new(catalog: Arc<dyn CatalogIndex>) -> Self {
        Self {
            catalog,
            max_distance: None,
        }
    }

    /// Reject matches farther than `max_distance`. `None` accepts the nearest title.
    pub fn with_max_distance(mut self, max_distance: Option<f32>) -> Self {
        self.max_distance = max_distance;
        self
    }

    /// The catalog this resolver queries.
    pub fn catalog(&self) -> &Arc<dyn CatalogIndex> {
        &self.catalog
    }

    /// Canonical title nearest to `fragment`, or `None` if the catalog is empty,
    /// the query fails, or the match is beyond the configured distance.
    pub async fn resolve(&self, fragment: &str) -> Option<String> {
        let hits = match self.catalog.query_catalog(fragment, 1).await {
            Ok(hits) => hits,
            Err(e) => {
                warn!("Course resolution for '{}' failed: {}", fragment, e);
                return None;
            }
        };

        let best = hits.into_iter().next()?;
        if let Some(max) = self.max_distance {
            if best.distance > max {
                debug!(
                    "Nearest course '{}' at distance {:.3} exceeds {:.3}",
                    best.title, best.distance, max
                );
                return None;
            }
        }

        debug!("Resolved '{}' to '{}'", fragment, best.title);
        Some(best.title)
    }
}
