//! uniguide-answer
//!
//! Request-time orchestration: retrieve -> classify -> prompt -> complete ->
//! post-process. The corpus index is built before the service is constructed
//! and is shared read-only across requests.

use std::sync::Arc;
use tracing::{debug, info};

use uniguide_core::classifier::ConfidenceClassifier;
use uniguide_core::config::Settings;
use uniguide_core::prompt::PromptBuilder;
use uniguide_core::traits::Completer;
use uniguide_core::types::{Answer, ConfidenceTier, ConversationTurn, RetrievalResult};
use uniguide_core::{Error, Result};
use uniguide_index::EmbeddingIndex;

pub mod reply;
pub mod suggestion;

pub use reply::ChatReply;
pub use suggestion::ComplaintSuggestion;

pub struct AnswerService {
    index: Arc<EmbeddingIndex>,
    completer: Arc<dyn Completer>,
    classifier: ConfidenceClassifier,
    prompts: PromptBuilder,
    suggestion: ComplaintSuggestion,
    top_k: usize,
    force_kb_threshold: Option<f32>,
}

impl AnswerService {
    /// Service with default thresholds, prompt settings and top_k = 3.
    pub fn new(index: Arc<EmbeddingIndex>, completer: Arc<dyn Completer>) -> Self {
        let defaults = Settings::default();
        Self {
            index,
            completer,
            classifier: ConfidenceClassifier::default(),
            prompts: PromptBuilder::default(),
            suggestion: ComplaintSuggestion::default(),
            top_k: defaults.retrieval.top_k,
            force_kb_threshold: defaults.thresholds.force_kb,
        }
    }

    pub fn from_settings(index: Arc<EmbeddingIndex>, completer: Arc<dyn Completer>, settings: &Settings) -> Result<Self> {
        settings.validate()?;
        Ok(Self {
            index,
            completer,
            classifier: ConfidenceClassifier::from_config(&settings.thresholds)?,
            prompts: PromptBuilder::new(settings.prompt.context_turns),
            suggestion: ComplaintSuggestion::from_config(&settings.suggestion),
            top_k: settings.retrieval.top_k,
            force_kb_threshold: settings.thresholds.force_kb,
        })
    }

    pub fn with_classifier(mut self, classifier: ConfidenceClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Confidence at which retrieval counts as strong enough to force the
    /// HIGH tier. `None` leaves the decision to the classifier and caller.
    pub fn with_force_kb_threshold(mut self, threshold: Option<f32>) -> Self {
        self.force_kb_threshold = threshold;
        self
    }

    pub fn index(&self) -> &EmbeddingIndex {
        &self.index
    }

    /// Answer `query` using the most recent turns of `conversation_tail` as
    /// context. Completion failures are returned as [`Error::Completion`];
    /// an empty or unbuilt index degrades to the GENERAL tier.
    pub async fn answer(&self, query: &str, conversation_tail: &[ConversationTurn], force_kb: bool) -> Result<Answer> {
        // Query embedding may run a full model forward pass; keep it off the runtime threads.
        let index = Arc::clone(&self.index);
        let owned_query = query.to_string();
        let top_k = self.top_k;
        let retrieval = tokio::task::spawn_blocking(move || index.retrieve(&owned_query, top_k))
            .await
            .map_err(|e| Error::Embedding(format!("retrieval task: {e}")))??;
        let strong = self.is_strong_kb(&retrieval);
        let tier = self.classifier.classify(retrieval.confidence, force_kb || strong);
        debug!(confidence = retrieval.confidence, strong, force_kb, %tier, "classified retrieval");

        let prompt = self.prompts.build(tier, query, &retrieval.retrieved_text, conversation_tail);
        let completion = self
            .completer
            .complete(&prompt)
            .await
            .map_err(|e| Error::Completion(format!("{}: {e:#}", self.completer.name())))?;
        let text = self.suggestion.apply(query, completion.trim().to_string());

        let sources = if tier == ConfidenceTier::High { retrieval.sources } else { Vec::new() };
        info!(%tier, confidence = retrieval.confidence, sources = sources.len(), "answered");
        Ok(Answer { text, tier, confidence: retrieval.confidence, sources })
    }

    fn is_strong_kb(&self, retrieval: &RetrievalResult) -> bool {
        match self.force_kb_threshold {
            Some(threshold) => {
                retrieval.confidence >= threshold && !retrieval.retrieved_text.trim().is_empty() && !retrieval.sources.is_empty()
            }
            None => false,
        }
    }
}
