//! CLI module for courseqa.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// courseqa - Question answering over course transcripts
///
/// Ask questions about imported courses; the model searches lesson transcripts
/// and course outlines to answer them.
#[derive(Parser, Debug)]
#[command(name = "courseqa")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "COURSEQA_CONFIG")]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Ask a question about the course materials
    Ask {
        /// The question to ask
        question: String,

        /// Prior conversation to take into account
        #[arg(long)]
        history: Option<String>,

        /// LLM model to use for response generation
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Start an interactive question session that remembers recent exchanges
    Chat {
        /// LLM model to use
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Search course content directly, without the model
    Search {
        /// Search query
        query: String,

        /// Course name (partial matches work)
        #[arg(long)]
        course: Option<String>,

        /// Restrict to one lesson number
        #[arg(long)]
        lesson: Option<u32>,
    },

    /// Show the outline of a course
    Outline {
        /// Course name (partial matches work)
        course: String,
    },

    /// List cataloged courses
    Courses,

    /// Import a pre-chunked course pack (JSON)
    Import {
        /// Path to the course pack file
        path: String,

        /// Remove every existing course first
        #[arg(long)]
        clear: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Write the current configuration to the config file
    Init,

    /// Show configuration file path
    Path,
}
