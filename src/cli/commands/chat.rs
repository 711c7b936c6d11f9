//! Interactive question session with rolling conversation history.

use crate::assistant::{ConversationHistory, CourseAssistant};
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use anyhow::Result;
use console::style;
use std::io::{self, BufRead, Write};

/// Run the interactive chat command.
pub async fn run_chat(model: Option<String>, mut settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Query) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    if let Some(model) = model {
        settings.generation.model = model;
    }
    let mut assistant = CourseAssistant::new(&settings)?;
    let mut history = ConversationHistory::new(settings.generation.max_history);

    println!("\n{}", style("courseqa chat").bold().cyan());
    println!(
        "{}\n",
        style("Ask about your courses, or 'exit' to quit. Use 'clear' to reset the conversation.").dim()
    );

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("{} ", style("You:").green().bold());
        stdout.flush()?;

        let mut input = String::new();
        if stdin.lock().read_line(&mut input)? == 0 {
            break;
        }
        let input = input.trim();

        if input.is_empty() {
            continue;
        }

        if input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit") {
            Output::info("Goodbye!");
            break;
        }

        if input.eq_ignore_ascii_case("clear") {
            history.clear();
            Output::info("Conversation history cleared.");
            continue;
        }

        let rendered = history.render();
        match assistant.query(input, rendered.as_deref()).await {
            Ok(response) => {
                println!("\n{} {}\n", style("courseqa:").cyan().bold(), response.answer);
                for source in &response.sources {
                    Output::source(&source.text, source.url.as_deref());
                }
                history.push(input, &response.answer);
            }
            Err(e) => {
                Output::error(&format!("Error: {}", e));
            }
        }
    }

    Ok(())
}
