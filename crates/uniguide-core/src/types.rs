//! Domain types shared by the chunker, the index and the answer service.

use serde::{Deserialize, Serialize};

/// Identifier of the document a chunk came from (the file name).
pub type SourceId = String;

/// Raw extracted text of one document, as handed over by the document source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    pub source: SourceId,
    pub text: String,
}

/// A bounded span of document text used as the retrieval unit.
///
/// - `text`: the trimmed, non-empty window content
/// - `source`: originating document; several chunks may share it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub text: String,
    pub source: SourceId,
}

impl Chunk {
    pub fn new(text: impl Into<String>, source: impl Into<SourceId>) -> Self {
        Self { text: text.into(), source: source.into() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
}

impl ConversationTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }

    /// The last `n` turns of `history`, oldest first.
    pub fn recent(history: &[ConversationTurn], n: usize) -> &[ConversationTurn] {
        &history[history.len().saturating_sub(n)..]
    }
}

/// Outcome of one nearest-neighbour lookup.
///
/// `retrieved_text` joins the selected chunks in ranked order with blank
/// lines; `sources` holds each originating document once, in order of first
/// appearance in the ranking.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RetrievalResult {
    pub retrieved_text: String,
    pub confidence: f32,
    pub sources: Vec<SourceId>,
}

impl RetrievalResult {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.retrieved_text.is_empty() && self.sources.is_empty()
    }
}

/// How well retrieved content covers a query.
///
/// Variants are declared in ascending order so that the derived `Ord` gives
/// `General < Partial < High`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ConfidenceTier {
    #[serde(rename = "general")]
    General,
    #[serde(rename = "kb_partial")]
    Partial,
    #[serde(rename = "kb")]
    High,
}

impl ConfidenceTier {
    /// Label surfaced to downstream consumers.
    pub fn label(self) -> &'static str {
        match self {
            ConfidenceTier::High => "kb",
            ConfidenceTier::Partial => "kb_partial",
            ConfidenceTier::General => "general",
        }
    }
}

impl std::fmt::Display for ConfidenceTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// The unit returned to callers of the answer service.
#[derive(Debug, Clone, PartialEq)]
pub struct Answer {
    pub text: String,
    pub tier: ConfidenceTier,
    pub confidence: f32,
    /// Only populated for [`ConfidenceTier::High`].
    pub sources: Vec<SourceId>,
}
