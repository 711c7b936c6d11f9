//! Import command implementation.

use crate::assistant::CourseAssistant;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use anyhow::Result;

/// Run the import command.
pub async fn run_import(path: &str, clear: bool, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Query) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    let path = Settings::expand_path(path);
    if !path.exists() {
        Output::error(&format!("Course pack not found: {}", path.display()));
        anyhow::bail!("Course pack not found: {}", path.display());
    }

    let assistant = CourseAssistant::new(&settings)?;

    let spinner = Output::spinner("Embedding and indexing courses...");
    let result = assistant.load_pack(&path, clear).await;
    spinner.finish_and_clear();

    let summary = match result {
        Ok(summary) => summary,
        Err(e) => {
            Output::error(&format!("Import failed: {}", e));
            return Err(e.into());
        }
    };

    Output::success(&format!(
        "Imported {} courses ({} chunks)",
        summary.courses_added, summary.chunks_added
    ));
    for title in &summary.courses_skipped {
        Output::warning(&format!("Skipped existing course: {}", title));
    }

    Ok(())
}
