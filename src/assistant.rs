//! The course assistant: one entry point wiring store, tools, and generator.

use crate::agent::{CompletionClient, OpenAiCompletionClient, ResponseGenerator};
use crate::config::{Prompts, Settings, StoreProvider};
use crate::embedding::{Embedder, OpenAIEmbedder};
use crate::error::{CourseQaError, Result};
use crate::search::{CatalogResolver, ContentRetriever};
use crate::tools::{CourseOutlineTool, CourseSearchTool, Source, ToolRegistry};
use crate::vector_store::{
    CatalogIndex, ContentIndex, Course, CourseChunk, CourseStore, MemoryCourseStore,
    SqliteCourseStore,
};
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Answer to one query, with the sources the tools retrieved for it.
#[derive(Debug, Clone, Serialize)]
pub struct AssistantResponse {
    pub answer: String,
    pub sources: Vec<Source>,
}

/// Catalog statistics.
#[derive(Debug, Clone, Serialize)]
pub struct CourseAnalytics {
    pub total_courses: usize,
    pub course_titles: Vec<String>,
}

/// Pre-chunked courses ready for import.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CoursePack {
    #[serde(default)]
    pub courses: Vec<Course>,
    #[serde(default)]
    pub chunks: Vec<CourseChunk>,
}

impl CoursePack {
    /// Read a pack from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let pack: CoursePack = serde_json::from_str(&content)?;
        pack.validate()?;
        Ok(pack)
    }

    /// Every course needs a title, and every chunk must belong to a course in the pack.
    pub fn validate(&self) -> Result<()> {
        if self.courses.iter().any(|c| c.title.trim().is_empty()) {
            return Err(CourseQaError::InvalidInput(
                "Course pack contains a course without a title".to_string(),
            ));
        }

        let titles: HashSet<&str> = self.courses.iter().map(|c| c.title.as_str()).collect();
        if let Some(orphan) = self
            .chunks
            .iter()
            .find(|c| !titles.contains(c.course_title.as_str()))
        {
            return Err(CourseQaError::CourseNotFound(format!(
                "chunk {} refers to '{}', which is not in the pack",
                orphan.chunk_index, orphan.course_title
            )));
        }
        Ok(())
    }
}

/// Outcome of importing a course pack.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub courses_added: usize,
    pub chunks_added: usize,
    /// Titles already in the catalog, left untouched.
    pub courses_skipped: Vec<String>,
}

/// Rolling record of the most recent exchanges in a session.
#[derive(Debug, Clone)]
pub struct ConversationHistory {
    max_exchanges: usize,
    exchanges: VecDeque<(String, String)>,
}

impl ConversationHistory {
    pub fn new(max_exchanges: usize) -> Self {
        Self {
            max_exchanges,
            exchanges: VecDeque::new(),
        }
    }

    /// Record one question and its answer, dropping the oldest beyond the limit.
    pub fn push(&mut self, question: &str, answer: &str) {
        if self.max_exchanges == 0 {
            return;
        }
        self.exchanges
            .push_back((question.to_string(), answer.to_string()));
        while self.exchanges.len() > self.max_exchanges {
            self.exchanges.pop_front();
        }
    }

    pub fn clear(&mut self) {
        self.exchanges.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.exchanges.is_empty()
    }

    /// History text for [`CourseAssistant::query`], or `None` when empty.
    pub fn render(&self) -> Option<String> {
        if self.exchanges.is_empty() {
            return None;
        }
        let lines: Vec<String> = self
            .exchanges
            .iter()
            .map(|(q, a)| format!("User: {}\nAssistant: {}", q, a))
            .collect();
        Some(lines.join("\n"))
    }
}

/// Course question answering over a course store.
pub struct CourseAssistant {
    store: Arc<dyn CourseStore>,
    prompts: Prompts,
    search_tool: Arc<CourseSearchTool>,
    outline_tool: Arc<CourseOutlineTool>,
    registry: ToolRegistry,
    generator: ResponseGenerator,
}

impl CourseAssistant {
    /// Build an assistant with the OpenAI embedder and completion client.
    pub fn new(settings: &Settings) -> Result<Self> {
        let prompts = Prompts::load(settings.prompts.custom_dir.as_deref())?;
        let embedder: Arc<dyn Embedder> =
            Arc::new(OpenAIEmbedder::new(&settings.embedding, &settings.openai)?);
        let client: Arc<dyn CompletionClient> =
            Arc::new(OpenAiCompletionClient::new(&settings.openai)?);

        info!(
            "Using {} course store with {} for generation",
            settings.vector_store.provider, settings.generation.model
        );

        match settings.vector_store.provider {
            StoreProvider::Sqlite => {
                let store = Arc::new(SqliteCourseStore::new(&settings.sqlite_path(), embedder)?);
                Self::with_components(settings, prompts, store, client)
            }
            StoreProvider::Memory => {
                let store = Arc::new(MemoryCourseStore::new(embedder));
                Self::with_components(settings, prompts, store, client)
            }
        }
    }

    /// Build an assistant from explicit components.
    pub fn with_components<S>(
        settings: &Settings,
        prompts: Prompts,
        store: Arc<S>,
        client: Arc<dyn CompletionClient>,
    ) -> Result<Self>
    where
        S: CourseStore + 'static,
    {
        let catalog: Arc<dyn CatalogIndex> = store.clone();
        let content: Arc<dyn ContentIndex> = store.clone();

        let resolver =
            CatalogResolver::new(catalog.clone()).with_max_distance(settings.search.resolver_max_distance);
        let retriever = ContentRetriever::new(content, resolver.clone(), settings.search.max_results);

        let search_tool = Arc::new(CourseSearchTool::new(retriever, catalog));
        let outline_tool = Arc::new(CourseOutlineTool::new(resolver));

        let mut registry = ToolRegistry::new();
        registry.register(search_tool.clone())?;
        registry.register(outline_tool.clone())?;

        let generator = ResponseGenerator::new(client, &prompts.assistant.system, &settings.generation);

        Ok(Self {
            store,
            prompts,
            search_tool,
            outline_tool,
            registry,
            generator,
        })
    }

    /// Answer a question, returning the sources the tools used for it.
    ///
    /// Sources are cleared after every query, including failed ones.
    #[instrument(skip(self, history))]
    pub async fn query(&mut self, query: &str, history: Option<&str>) -> Result<AssistantResponse> {
        let prompt = self.prompts.render_query(query);
        let answer = self.generator.generate(&prompt, history, &self.registry).await;

        let sources = self.registry.last_sources();
        self.registry.reset_sources();

        Ok(AssistantResponse {
            answer: answer?,
            sources,
        })
    }

    /// Number and titles of cataloged courses.
    pub async fn course_analytics(&self) -> Result<CourseAnalytics> {
        let course_titles = self.store.course_titles().await?;
        Ok(CourseAnalytics {
            total_courses: course_titles.len(),
            course_titles,
        })
    }

    /// Import a course pack file. See [`CourseAssistant::import_pack`].
    pub async fn load_pack(&self, path: &Path, clear_existing: bool) -> Result<ImportSummary> {
        let pack = CoursePack::from_file(path)?;
        self.import_pack(&pack, clear_existing).await
    }

    /// Add the pack's courses and their chunks. Courses whose title is already
    /// cataloged are skipped together with their chunks.
    #[instrument(skip(self, pack), fields(courses = pack.courses.len(), chunks = pack.chunks.len()))]
    pub async fn import_pack(&self, pack: &CoursePack, clear_existing: bool) -> Result<ImportSummary> {
        pack.validate()?;

        if clear_existing {
            info!("Clearing existing courses before import");
            self.store.clear().await?;
        }

        let existing: HashSet<String> = self.store.course_titles().await?.into_iter().collect();
        let mut summary = ImportSummary::default();
        let mut added = HashSet::new();
        let mut pending = Vec::new();

        for course in &pack.courses {
            if existing.contains(&course.title) || added.contains(course.title.as_str()) {
                warn!("Course '{}' already exists, skipping", course.title);
                summary.courses_skipped.push(course.title.clone());
                continue;
            }
            added.insert(course.title.as_str());
            pending.push(course);
        }

        // Chunks before catalog entries: a course is listed only once its
        // content is stored.
        let chunks: Vec<CourseChunk> = pack
            .chunks
            .iter()
            .filter(|c| added.contains(c.course_title.as_str()))
            .cloned()
            .collect();
        if !chunks.is_empty() {
            summary.chunks_added = self.store.add_course_content(&chunks).await?;
        }

        for course in pending {
            self.store.add_course_metadata(course).await?;
            summary.courses_added += 1;
        }

        info!(
            "Imported {} courses with {} chunks ({} skipped)",
            summary.courses_added,
            summary.chunks_added,
            summary.courses_skipped.len()
        );
        Ok(summary)
    }

    pub fn search_tool(&self) -> &CourseSearchTool {
        &self.search_tool
    }

    pub fn outline_tool(&self) -> &CourseOutlineTool {
        &self.outline_tool
    }

    pub fn store(&self) -> Arc<dyn CourseStore> {
        self.store.clone()
    }
}
