//! Outline command implementation.

use crate::assistant::CourseAssistant;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use anyhow::Result;

/// Run the outline command.
pub async fn run_outline(course: &str, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Query) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    let assistant = CourseAssistant::new(&settings)?;
    let outline = assistant.outline_tool().outline(course).await;
    println!("\n{}\n", outline);

    Ok(())
}
