//! Configuration settings for courseqa.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub openai: OpenAISettings,
    pub embedding: EmbeddingSettings,
    pub vector_store: VectorStoreSettings,
    pub search: SearchSettings,
    pub generation: GenerationSettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory for storing application data.
    pub data_dir: String,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            data_dir: "~/.courseqa".to_string(),
            log_level: "warn".to_string(),
        }
    }
}

/// OpenAI client settings shared by the embedder and the completion client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAISettings {
    /// Alternative API base for OpenAI-compatible servers.
    pub api_base: Option<String>,
    /// HTTP timeout for a single API request.
    pub timeout_secs: u64,
}

impl Default for OpenAISettings {
    fn default() -> Self {
        Self {
            api_base: None,
            timeout_secs: 300,
        }
    }
}

/// Embedding generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    /// Embedding model to use.
    pub model: String,
    /// Embedding dimensions.
    pub dimensions: u32,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            model: "text-embedding-3-small".to_string(),
            dimensions: 1536,
        }
    }
}

/// Vector store backend.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreProvider {
    /// SQLite file on disk (default).
    #[default]
    Sqlite,
    /// Process-local store, lost on exit.
    Memory,
}

impl std::str::FromStr for StoreProvider {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sqlite" => Ok(StoreProvider::Sqlite),
            "memory" => Ok(StoreProvider::Memory),
            _ => Err(format!("Unknown vector store provider: {}", s)),
        }
    }
}

impl std::fmt::Display for StoreProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreProvider::Sqlite => write!(f, "sqlite"),
            StoreProvider::Memory => write!(f, "memory"),
        }
    }
}

/// Vector store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorStoreSettings {
    /// Vector store provider (sqlite, memory).
    pub provider: StoreProvider,
    /// Path to SQLite database (for sqlite provider).
    pub sqlite_path: String,
}

impl Default for VectorStoreSettings {
    fn default() -> Self {
        Self {
            provider: StoreProvider::Sqlite,
            sqlite_path: "~/.courseqa/courses.db".to_string(),
        }
    }
}

/// Retrieval settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Number of content chunks returned when a search names no limit.
    pub max_results: usize,
    /// Reject catalog matches farther than this distance. Unset accepts the
    /// nearest title however far away it is.
    pub resolver_max_distance: Option<f32>,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            max_results: 5,
            resolver_max_distance: None,
        }
    }
}

/// Answer generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    /// Chat model used for answering.
    pub model: String,
    /// Output token budget per completion call.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f32,
    /// Completion round-trips per query. Tools are offered on every round but the last.
    pub max_rounds: usize,
    /// Exchanges an interactive session keeps as conversation history.
    pub max_history: usize,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            max_tokens: 800,
            temperature: 0.0,
            max_rounds: 2,
            max_history: 2,
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            settings.validate()?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Reject values the rest of the crate cannot work with.
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.generation.max_rounds == 0 {
            return Err(crate::error::CourseQaError::Config(
                "generation.max_rounds must be at least 1".to_string(),
            ));
        }
        if self.search.max_results == 0 {
            return Err(crate::error::CourseQaError::Config(
                "search.max_results must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::CourseQaError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("courseqa")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded data directory path.
    pub fn data_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.data_dir)
    }

    /// Get the expanded SQLite database path.
    pub fn sqlite_path(&self) -> PathBuf {
        Self::expand_path(&self.vector_store.sqlite_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.search.max_results, 5);
        assert_eq!(settings.generation.max_tokens, 800);
        assert_eq!(settings.generation.max_rounds, 2);
        assert_eq!(settings.generation.max_history, 2);
        assert_eq!(settings.generation.temperature, 0.0);
        assert!(settings.search.resolver_max_distance.is_none());
        assert_eq!(settings.vector_store.provider, StoreProvider::Sqlite);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            [search]
            max_results = 3

            [vector_store]
            provider = "memory"
            "#,
        )
        .unwrap();

        assert_eq!(settings.search.max_results, 3);
        assert_eq!(settings.vector_store.provider, StoreProvider::Memory);
        assert_eq!(settings.generation.max_rounds, 2);
        assert_eq!(settings.embedding.model, "text-embedding-3-small");
    }

    #[test]
    fn test_load_and_save_round_trip_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut settings = Settings::default();
        settings.generation.model = "gpt-4.1".to_string();
        settings.save_to(&path).unwrap();

        let loaded = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(loaded.generation.model, "gpt-4.1");
    }

    #[test]
    fn test_validate_rejects_zero_rounds() {
        let mut settings = Settings::default();
        settings.generation.max_rounds = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_store_provider_from_str() {
        assert_eq!("SQLite".parse::<StoreProvider>().unwrap(), StoreProvider::Sqlite);
        assert_eq!("memory".parse::<StoreProvider>().unwrap(), StoreProvider::Memory);
        assert!("chroma".parse::<StoreProvider>().is_err());
    }
}
