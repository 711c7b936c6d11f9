//! courseqa - Question answering over course transcripts
//!
//! A local CLI and library that answers questions about course material by letting
//! a language model call retrieval tools against an indexed course catalog.
//!
//! # Overview
//!
//! courseqa allows you to:
//! - Import pre-chunked course transcripts and lesson metadata
//! - Search course content semantically, filtered by course and lesson
//! - Look up a course outline from a partial course name
//! - Ask questions and get answers grounded in the retrieved lessons, with sources
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration and prompt templates
//! - `embedding` - Embedding generation
//! - `vector_store` - Course catalog and content indexes
//! - `search` - Course name resolution and filtered content retrieval
//! - `tools` - Tools the model can call, and their registry
//! - `agent` - Completion protocol and the tool-use conversation loop
//! - `assistant` - Facade wiring all of the above
//!
//! # Example
//!
//! ```rust,no_run
//! use courseqa::assistant::CourseAssistant;
//! use courseqa::config::Settings;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let mut assistant = CourseAssistant::new(&settings)?;
//!
//!     let response = assistant.query("What is covered in lesson 2 of the MCP course?", None).await?;
//!     println!("{}", response.answer);
//!     for source in &response.sources {
//!         println!("  {}", source.text);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod assistant;
pub mod cli;
pub mod config;
pub mod embedding;
pub mod error;
pub mod openai;
pub mod search;
pub mod tools;
pub mod vector_store;

#[cfg(test)]
mod test_support;

pub use error::{CourseQaError, Result};
