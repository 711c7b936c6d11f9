//! OpenAI chat completions behind the [`CompletionClient`] protocol.

use super::completion::{
    CompletionClient, CompletionRequest, CompletionResponse, ContentBlock, Message, Role,
    StopReason, ToolChoice,
};
use crate::config::OpenAISettings;
use crate::error::{CourseQaError, Result};
use crate::openai::create_client;
use crate::tools::ToolDefinition;
use async_openai::types::{
    ChatCompletionMessageToolCall, ChatCompletionRequestAssistantMessageArgs,
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestToolMessageArgs, ChatCompletionRequestUserMessageArgs,
    ChatCompletionTool, ChatCompletionToolChoiceOption, ChatCompletionToolType,
    CreateChatCompletionRequestArgs, FinishReason, FunctionCall, FunctionObject,
};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Completion client for the OpenAI chat API (or a compatible server).
pub struct OpenAiCompletionClient {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
}

impl OpenAiCompletionClient {
    pub fn new(settings: &OpenAISettings) -> Result<Self> {
        Ok(Self {
            client: create_client(settings)?,
        })
    }
}

fn build_error(e: impl std::fmt::Display) -> CourseQaError {
    CourseQaError::Completion(e.to_string())
}

/// Tool definitions in OpenAI function format.
fn to_openai_tools(definitions: &[ToolDefinition]) -> Vec<ChatCompletionTool> {
    definitions
        .iter()
        .map(|d| ChatCompletionTool {
            r#type: ChatCompletionToolType::Function,
            function: FunctionObject {
                name: d.name.clone(),
                description: Some(d.description.clone()),
                parameters: Some(d.input_schema.clone()),
                strict: None,
            },
        })
        .collect()
}

fn to_openai_tool_choice(choice: ToolChoice) -> ChatCompletionToolChoiceOption {
    match choice {
        ToolChoice::Auto => ChatCompletionToolChoiceOption::Auto,
    }
}

fn joined_text(blocks: &[ContentBlock]) -> Option<String> {
    let texts: Vec<&str> = blocks
        .iter()
        .filter_map(|b| match b {
            ContentBlock::Text { text } => Some(text.as_str()),
            _ => None,
        })
        .collect();
    (!texts.is_empty()).then(|| texts.join("\n"))
}

/// Convert one conversation message into OpenAI messages. Tool results become
/// separate `tool` role messages.
fn to_openai_messages(message: &Message) -> Result<Vec<ChatCompletionRequestMessage>> {
    let mut out = Vec::new();

    match message.role {
        Role::User => {
            for block in &message.content {
                if let ContentBlock::ToolResult {
                    tool_use_id,
                    content,
                } = block
                {
                    out.push(
                        ChatCompletionRequestToolMessageArgs::default()
                            .tool_call_id(tool_use_id.clone())
                            .content(content.clone())
                            .build()
                            .map_err(build_error)?
                            .into(),
                    );
                }
            }
            if let Some(text) = joined_text(&message.content) {
                out.push(
                    ChatCompletionRequestUserMessageArgs::default()
                        .content(text)
                        .build()
                        .map_err(build_error)?
                        .into(),
                );
            }
        }
        Role::Assistant => {
            let tool_calls: Vec<ChatCompletionMessageToolCall> = message
                .content
                .iter()
                .filter_map(|b| match b {
                    ContentBlock::ToolUse { id, name, input } => Some(ChatCompletionMessageToolCall {
                        id: id.clone(),
                        r#type: ChatCompletionToolType::Function,
                        function: FunctionCall {
                            name: name.clone(),
                            arguments: input.to_string(),
                        },
                    }),
                    _ => None,
                })
                .collect();

            let mut args = ChatCompletionRequestAssistantMessageArgs::default();
            if let Some(text) = joined_text(&message.content) {
                args.content(text);
            }
            if !tool_calls.is_empty() {
                args.tool_calls(tool_calls);
            }
            out.push(args.build().map_err(build_error)?.into());
        }
    }

    Ok(out)
}

#[async_trait]
impl CompletionClient for OpenAiCompletionClient {
    #[instrument(skip(self, request), fields(model = %request.model, messages = request.messages.len()))]
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse> {
        let mut messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(request.system.clone())
                .build()
                .map_err(build_error)?
                .into(),
        ];
        for message in &request.messages {
            messages.extend(to_openai_messages(message)?);
        }

        let mut args = CreateChatCompletionRequestArgs::default();
        args.model(&request.model)
            .messages(messages)
            .temperature(request.temperature)
            .max_completion_tokens(request.max_tokens);

        if let Some(tools) = &request.tools {
            args.tools(to_openai_tools(tools));
            if let Some(choice) = request.tool_choice {
                args.tool_choice(to_openai_tool_choice(choice));
            }
        }

        let response = self
            .client
            .chat()
            .create(args.build().map_err(build_error)?)
            .await
            .map_err(|e| CourseQaError::OpenAI(format!("Chat completion failed: {}", e)))?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| CourseQaError::Completion("No response from model".to_string()))?;

        let mut content = Vec::new();
        if let Some(text) = choice.message.content {
            content.push(ContentBlock::Text { text });
        }
        for call in choice.message.tool_calls.unwrap_or_default() {
            // Unparseable arguments are passed through; the tool reports them.
            let input = serde_json::from_str(&call.function.arguments)
                .unwrap_or(serde_json::Value::String(call.function.arguments));
            content.push(ContentBlock::ToolUse {
                id: call.id,
                name: call.function.name,
                input,
            });
        }

        let stop_reason = match choice.finish_reason {
            Some(FinishReason::ToolCalls) => StopReason::ToolUse,
            Some(FinishReason::Length) => StopReason::MaxTokens,
            Some(FinishReason::Stop) | None => StopReason::EndTurn,
            Some(other) => StopReason::Other(format!("{:?}", other)),
        };

        debug!("Completion stopped with {:?} ({} blocks)", stop_reason, content.len());
        Ok(CompletionResponse {
            content,
            stop_reason,
        })
    }
}
