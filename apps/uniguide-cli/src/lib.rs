//! Startup wiring shared by the `uniguide` binaries: logging, corpus loading
//! and the explicit index build that must finish before the first question.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use uniguide_answer::AnswerService;
use uniguide_core::config::Settings;
use uniguide_core::data_processor::{chunk_documents, DocumentLoader};
use uniguide_core::types::{Answer, Chunk, ConversationTurn};
use uniguide_embed::get_default_embedder;
use uniguide_index::EmbeddingIndex;
use uniguide_llm::OpenAiCompatibleCompleter;

/// Log to stderr with `RUST_LOG` (default `info`) so stdout carries only answers.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_target(false).with_writer(std::io::stderr).try_init();
}

/// Read and chunk every document under `docs_dir`.
pub fn load_corpus(settings: &Settings, docs_dir: &Path) -> anyhow::Result<Vec<Chunk>> {
    let loader = DocumentLoader::new(&settings.data.extensions);
    let documents = loader.load_directory(docs_dir)?;
    let chunks = chunk_documents(&documents, &settings.chunking)?;
    info!(documents = documents.len(), chunks = chunks.len(), "corpus loaded");
    Ok(chunks)
}

/// Embed the corpus once with the configured embedder.
pub fn build_index(settings: &Settings, chunks: Vec<Chunk>) -> anyhow::Result<EmbeddingIndex> {
    let embedder = get_default_embedder(&settings.embedding).context("loading embedder")?;
    let index = EmbeddingIndex::from_chunks(embedder, settings.retrieval.query_cache_capacity, chunks)?;
    Ok(index)
}

/// Full startup: corpus -> index -> completion client -> service.
pub fn build_service(settings: &Settings, docs_dir: &Path) -> anyhow::Result<AnswerService> {
    settings.validate()?;
    let completer = OpenAiCompatibleCompleter::from_config(&settings.completion)?;
    let chunks = load_corpus(settings, docs_dir)?;
    let index = build_index(settings, chunks)?;
    info!(chunks = index.len(), model = completer.model(), "answer service ready");
    Ok(AnswerService::from_settings(Arc::new(index), Arc::new(completer), settings)?)
}

/// Conversation state for the interactive `chat` command.
pub struct ChatSession {
    history: Vec<ConversationTurn>,
    history_turns: usize,
}

impl ChatSession {
    pub fn new(history_turns: usize) -> Self {
        Self { history: Vec::new(), history_turns }
    }

    pub fn history(&self) -> &[ConversationTurn] {
        &self.history
    }

    /// Answer `question` with the recent history as context. A failed turn
    /// leaves the history untouched so the session can continue.
    pub async fn ask(&mut self, service: &AnswerService, question: &str) -> uniguide_core::Result<Answer> {
        let tail = ConversationTurn::recent(&self.history, self.history_turns);
        let answer = service.answer(question, tail, false).await?;
        self.history.push(ConversationTurn::user(question));
        self.history.push(ConversationTurn::assistant(answer.text.clone()));
        Ok(answer)
    }
}
