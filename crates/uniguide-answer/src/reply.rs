use serde::{Deserialize, Serialize};

use uniguide_core::types::Answer;

/// Payload handed to the downstream consumer (HTTP layer, CLI `--json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatReply {
    pub reply: String,
    /// `"kb"`, `"kb_partial"` or `"general"`.
    pub source: String,
    /// Rounded to two decimals.
    pub confidence: f32,
    /// Links to the attributed documents; empty below the `kb` tier.
    pub documents: Vec<String>,
}

impl ChatReply {
    pub fn from_answer(answer: &Answer, base_doc_url: Option<&str>) -> Self {
        let documents = answer
            .sources
            .iter()
            .map(|doc| match base_doc_url {
                Some(base) => format!("{}/{}", base.trim_end_matches('/'), doc),
                None => doc.clone(),
            })
            .collect();
        Self {
            reply: answer.text.clone(),
            source: answer.tier.label().to_string(),
            confidence: round2(answer.confidence),
            documents,
        }
    }
}

fn round2(value: f32) -> f32 {
    (value * 100.0).round() / 100.0
}
