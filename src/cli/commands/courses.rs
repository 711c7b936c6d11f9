//! Courses command implementation.

use crate::assistant::CourseAssistant;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::vector_store::CatalogIndex;
use anyhow::Result;

/// Run the courses command.
pub async fn run_courses(settings: Settings) -> Result<()> {
    preflight::check(Operation::Browse)?;

    let assistant = CourseAssistant::new(&settings)?;

    match assistant.store().courses().await {
        Ok(courses) => {
            if courses.is_empty() {
                Output::info("No courses imported yet. Use 'courseqa import <pack.json>' to add some.");
                return Ok(());
            }

            Output::header(&format!("Courses ({})", courses.len()));
            for course in &courses {
                let instructor = course.instructor.as_deref().unwrap_or("unknown instructor");
                Output::list_item(&format!(
                    "{} ({}, {} lessons)",
                    course.title,
                    instructor,
                    course.lessons.len()
                ));
            }

            let analytics = assistant.course_analytics().await?;
            println!();
            Output::kv("Total courses", &analytics.total_courses.to_string());
        }
        Err(e) => {
            Output::error(&format!("Failed to list courses: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
