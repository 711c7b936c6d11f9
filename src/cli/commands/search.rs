//! Search command implementation.

use crate::assistant::CourseAssistant;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::tools::SourceTracking;
use anyhow::Result;

/// Run the search command: the same search the model's content tool performs.
pub async fn run_search(
    query: &str,
    course: Option<&str>,
    lesson: Option<u32>,
    settings: Settings,
) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Query) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    let assistant = CourseAssistant::new(&settings)?;
    let tool = assistant.search_tool();

    let spinner = Output::spinner("Searching...");
    let outcome = tool.search_hits(query, course, lesson).await;
    spinner.finish_and_clear();
    tool.reset_sources();

    let hits = match outcome {
        Ok(hits) => hits,
        Err(message) => {
            // Empty result or a resolution/search error, already phrased for display.
            Output::warning(&message);
            return Ok(());
        }
    };

    Output::success(&format!("Found {} results", hits.len()));
    for hit in &hits {
        Output::search_result(&hit.label, &hit.content);
    }

    Output::header("Sources");
    for hit in &hits {
        Output::source(&hit.label, hit.url.as_deref());
    }

    Ok(())
}
