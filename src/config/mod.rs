//! Configuration module for courseqa.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{AssistantPrompts, Prompts};
pub use settings::{
    EmbeddingSettings, GeneralSettings, GenerationSettings, OpenAISettings, PromptSettings,
    SearchSettings, Settings, StoreProvider, VectorStoreSettings,
};
