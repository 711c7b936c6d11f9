//! Retrieval layer: course-name resolution, filtered content search, and the
//! result carrier both tools consume.

mod resolver;
mod results;
mod retriever;

pub use resolver::CatalogResolver;
pub use results::SearchResults;
pub use retriever::{build_filter, ContentRetriever};
