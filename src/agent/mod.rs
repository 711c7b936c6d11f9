//! Tool-calling conversation with a completion service.
//!
//! The [`CompletionClient`] protocol is provider-neutral; [`OpenAiCompletionClient`]
//! adapts it to OpenAI chat completions. [`ResponseGenerator`] runs the bounded
//! tool-use loop for a single query.

mod completion;
mod generator;
mod openai_client;

pub use completion::{
    CompletionClient, CompletionRequest, CompletionResponse, ContentBlock, Message, Role,
    StopReason, ToolChoice,
};
pub use generator::ResponseGenerator;
pub use openai_client::OpenAiCompletionClient;
