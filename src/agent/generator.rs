//! Bounded tool-use conversation loop.

use super::completion::{CompletionClient, CompletionRequest, ContentBlock, Message, Role, ToolChoice};
use crate::config::GenerationSettings;
use crate::error::Result;
use crate::tools::ToolRegistry;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Drives the conversation with the completion service for one query.
///
/// Every round but the last offers the registry's tools. The last round offers
/// none, so the model has to answer in text. A tool-requesting response in the
/// last round still only contributes its text.
pub struct ResponseGenerator {
    client: Arc<dyn CompletionClient>,
    system_prompt: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    max_rounds: usize,
}

impl ResponseGenerator {
    pub fn new(client: Arc<dyn CompletionClient>, system_prompt: &str, settings: &GenerationSettings) -> Self {
        Self {
            client,
            system_prompt: system_prompt.to_string(),
            model: settings.model.clone(),
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
            max_rounds: settings.max_rounds.max(1),
        }
    }

    /// Set the number of completion round-trips per query (at least one).
    pub fn with_max_rounds(mut self, max_rounds: usize) -> Self {
        self.max_rounds = max_rounds.max(1);
        self
    }

    /// Answer `query`, calling tools from `registry` as the model requests.
    ///
    /// `history` is prior conversation text, appended to the system prompt.
    /// Completion failures propagate; tool failures are conversation content.
    #[instrument(skip(self, query, history, registry), fields(rounds = self.max_rounds))]
    pub async fn generate(
        &self,
        query: &str,
        history: Option<&str>,
        registry: &ToolRegistry,
    ) -> Result<String> {
        let system = match history {
            Some(h) if !h.is_empty() => {
                format!("{}\n\nPrevious conversation:\n{}", self.system_prompt, h)
            }
            _ => self.system_prompt.clone(),
        };

        let definitions = registry.definitions();
        let mut messages = vec![Message::user(query)];

        for round in 1..=self.max_rounds {
            let offer_tools = round < self.max_rounds && !definitions.is_empty();
            let request = CompletionRequest {
                model: self.model.clone(),
                system: system.clone(),
                messages: messages.clone(),
                tools: offer_tools.then(|| definitions.clone()),
                tool_choice: offer_tools.then_some(ToolChoice::Auto),
                temperature: self.temperature,
                max_tokens: self.max_tokens,
            };

            debug!("Completion round {} (tools offered: {})", round, offer_tools);
            let response = self.client.complete(&request).await?;

            if !offer_tools || !response.requests_tools() {
                return Ok(response.text().unwrap_or_default().to_string());
            }

            messages.push(response.to_message());

            let mut results = Vec::new();
            for (id, name, input) in response.tool_uses() {
                info!("Model called tool {} with {}", name, input);
                let output = registry.invoke(name, input).await;
                results.push(ContentBlock::ToolResult {
                    tool_use_id: id.to_string(),
                    content: output,
                });
            }
            messages.push(Message {
                role: Role::User,
                content: results,
            });
        }

        // The last round never offers tools, so it always returns above.
        Ok(String::new())
    }
}
