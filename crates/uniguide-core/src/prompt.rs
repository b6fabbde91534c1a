//! Tier-specific prompt templates for the completion call.
//!
//! Templates are fixed data; rendering only fills in the conversation block,
//! the reference text and the question.

use serde::{Deserialize, Serialize};

use crate::types::{ConfidenceTier, ConversationTurn, Role};

pub const ASSISTANT_NAME: &str = "UniGuide AI";
pub const USER_LABEL: &str = "Student";

struct Template {
    instructions: &'static str,
    /// Heading of the reference block; `None` means no document context.
    reference_label: Option<&'static str>,
}

const HIGH_TEMPLATE: Template = Template {
    instructions: "You are UniGuide AI, a university academic support chatbot.
Answer strictly from the university reference below.

Structure:

TITLE:
Short clear heading

OVERVIEW:
1-2 simple sentences

DETAILS:
Bullet points
One idea per line

IMPORTANT NOTES:
Only if applicable",
    reference_label: Some("University Reference:"),
};

const PARTIAL_TEMPLATE: Template = Template {
    instructions: "You are UniGuide AI.
The reference below only partly covers the question. Keep what it confirms
separate from what remains uncertain.

Answer structure:

TITLE:

WHAT IS CONFIRMED:
Bullet points

WHAT IS UNCLEAR:
Bullet points

GENERAL GUIDANCE:
Simple advice",
    reference_label: Some("Reference:"),
};

const GENERAL_TEMPLATE: Template = Template {
    instructions: "You are UniGuide AI.

OVERVIEW:
2-3 simple sentences

NOTE:
One disclaimer sentence",
    reference_label: None,
};

fn template(tier: ConfidenceTier) -> &'static Template {
    match tier {
        ConfidenceTier::High => &HIGH_TEMPLATE,
        ConfidenceTier::Partial => &PARTIAL_TEMPLATE,
        ConfidenceTier::General => &GENERAL_TEMPLATE,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptConfig {
    /// Turns rendered into the prompt's conversation block.
    pub context_turns: usize,
    /// Turns a caller keeps and passes in with each question.
    pub history_turns: usize,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self { context_turns: 4, history_turns: 6 }
    }
}

#[derive(Debug, Clone)]
pub struct PromptBuilder {
    context_turns: usize,
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new(PromptConfig::default().context_turns)
    }
}

impl PromptBuilder {
    pub fn new(context_turns: usize) -> Self {
        Self { context_turns }
    }

    pub fn build(
        &self,
        tier: ConfidenceTier,
        query: &str,
        retrieved_text: &str,
        conversation_tail: &[ConversationTurn],
    ) -> String {
        let template = template(tier);
        let mut sections = vec![template.instructions.to_string()];

        let context = self.context_block(conversation_tail);
        if !context.is_empty() {
            sections.push(context);
        }
        if let Some(label) = template.reference_label {
            sections.push(format!("{label}\n{retrieved_text}"));
        }
        sections.push(format!("Question:\n{query}"));
        sections.push("Answer:".to_string());

        let mut prompt = sections.join("\n\n");
        prompt.push('\n');
        prompt
    }

    fn context_block(&self, conversation_tail: &[ConversationTurn]) -> String {
        let turns = ConversationTurn::recent(conversation_tail, self.context_turns);
        if turns.is_empty() {
            return String::new();
        }
        let mut block = String::from(
            "Previous conversation (use it ONLY to understand the question; do NOT repeat or mention it):",
        );
        for turn in turns {
            let speaker = match turn.role {
                Role::User => USER_LABEL,
                Role::Assistant => ASSISTANT_NAME,
            };
            block.push('\n');
            block.push_str(speaker);
            block.push_str(": ");
            block.push_str(&turn.content);
        }
        block
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history() -> Vec<ConversationTurn> {
        vec![
            ConversationTurn::user("oldest question"),
            ConversationTurn::assistant("oldest answer"),
            ConversationTurn::user("What is ragging?"),
            ConversationTurn::assistant("Ragging is any act of harassment."),
            ConversationTurn::user("Who handles it?"),
            ConversationTurn::assistant("The anti-ragging committee."),
        ]
    }

    #[test]
    fn high_prompt_has_structure_and_reference() {
        let prompt = PromptBuilder::default().build(ConfidenceTier::High, "What counts as ragging?", "REF TEXT", &[]);
        for section in ["TITLE:", "OVERVIEW:", "DETAILS:", "IMPORTANT NOTES:"] {
            assert!(prompt.contains(section), "missing {section}");
        }
        assert!(prompt.contains("University Reference:\nREF TEXT"));
        assert!(prompt.contains("Question:\nWhat counts as ragging?"));
        assert!(prompt.trim_end().ends_with("Answer:"));
        assert!(!prompt.contains("Previous conversation"));
    }

    #[test]
    fn partial_prompt_separates_confirmed_from_unclear() {
        let prompt = PromptBuilder::default().build(ConfidenceTier::Partial, "q", "some ref", &[]);
        for section in ["TITLE:", "WHAT IS CONFIRMED:", "WHAT IS UNCLEAR:", "GENERAL GUIDANCE:"] {
            assert!(prompt.contains(section), "missing {section}");
        }
        assert!(prompt.contains("Reference:\nsome ref"));
    }

    #[test]
    fn general_prompt_has_no_reference_block() {
        let prompt = PromptBuilder::default().build(ConfidenceTier::General, "q", "ignored text", &[]);
        assert!(prompt.contains("OVERVIEW:"));
        assert!(prompt.contains("NOTE:"));
        assert!(!prompt.contains("Reference:"));
        assert!(!prompt.contains("ignored text"));
    }

    #[test]
    fn renders_only_recent_turns_with_speaker_labels() {
        let prompt = PromptBuilder::default().build(ConfidenceTier::General, "And the penalty?", "", &history());
        assert!(prompt.contains("do NOT repeat or mention it"));
        assert!(!prompt.contains("oldest"));
        assert!(prompt.contains("Student: What is ragging?"));
        assert!(prompt.contains("UniGuide AI: The anti-ragging committee."));
        let context_at = prompt.find("Previous conversation").unwrap();
        let question_at = prompt.find("Question:").unwrap();
        assert!(context_at < question_at);
    }

    #[test]
    fn zero_context_turns_drops_block() {
        let prompt = PromptBuilder::new(0).build(ConfidenceTier::High, "q", "r", &history());
        assert!(!prompt.contains("Previous conversation"));
    }
}
