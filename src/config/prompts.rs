//! Prompt templates for courseqa.
//!
//! Prompts can be customized by placing an `assistant.toml` file in the custom prompts directory.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub assistant: AssistantPrompts,
}

/// Prompts for the tool-calling course assistant.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantPrompts {
    pub system: String,
    /// Wraps the raw user question before it is sent to the model.
    pub query: String,
}

impl Default for AssistantPrompts {
    fn default() -> Self {
        Self {
            system: r#"You are an AI assistant specialized in course materials and educational content with access to tools for course information.

Tool Usage Guidelines:
- **Course Outline Tool** (get_course_outline): Use for questions about course structure, lesson lists, course overviews, or when users ask "what lessons are in..." or "what is the outline of..."
- **Content Search Tool** (search_course_content): Use for questions about specific course content, concepts, or detailed educational materials
- **One tool use per query maximum**
- Synthesize tool results into accurate, fact-based responses
- If a tool yields no results, state this clearly without offering alternatives
- Never invent course content that was not returned by a tool

Course Outline Responses:
- Include the course title, the course link, and every lesson with its number and title

Response Protocol:
- **General knowledge questions**: Answer using existing knowledge without using tools
- **Course-specific questions**: Use the appropriate tool first, then answer
- **No meta-commentary**: Provide direct answers only, no reasoning process, tool explanations, or question-type analysis

All responses must be:
1. **Brief, concise and focused** - Get to the point quickly
2. **Educational** - Maintain instructional value
3. **Clear** - Use accessible language
4. **Example-supported** - Include relevant examples when they aid understanding
Provide only the direct answer to what was asked."#
                .to_string(),

            query: "Answer this question about course materials: {{query}}".to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts, applying overrides from `custom_dir` when present.
    pub fn load(custom_dir: Option<&str>) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let assistant_path = custom_path.join("assistant.toml");
            if assistant_path.exists() {
                let content = std::fs::read_to_string(&assistant_path)?;
                prompts.assistant = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    pub fn render(template: &str, vars: &HashMap<String, String>) -> String {
        let mut result = template.to_string();
        for (key, value) in vars {
            result = result.replace(&format!("{{{{{}}}}}", key), value);
        }
        result
    }

    /// Wrap a user question in the assistant query template.
    pub fn render_query(&self, query: &str) -> String {
        let mut vars = HashMap::new();
        vars.insert("query".to_string(), query.to_string());
        Self::render(&self.assistant.query, &vars)
    }
}
