use uniguide_core::config::SuggestionConfig;

/// Appends a pointer to the complaint-drafting feature when the question
/// mentions a grievance topic. Independent of retrieval and tier.
#[derive(Debug, Clone)]
pub struct ComplaintSuggestion {
    keywords: Vec<String>,
    message: String,
}

impl Default for ComplaintSuggestion {
    fn default() -> Self {
        Self::from_config(&SuggestionConfig::default())
    }
}

impl ComplaintSuggestion {
    pub fn from_config(config: &SuggestionConfig) -> Self {
        Self {
            keywords: config.keywords.iter().map(|k| k.to_lowercase()).filter(|k| !k.trim().is_empty()).collect(),
            message: config.message.clone(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Case-insensitive substring match of any keyword in `query`.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.keywords.iter().any(|k| query.contains(k.as_str()))
    }

    /// `answer` unchanged, or `answer` + blank line + message.
    pub fn apply(&self, query: &str, mut answer: String) -> String {
        if self.matches(query) && !self.message.is_empty() {
            answer.push_str("\n\n");
            answer.push_str(&self.message);
        }
        answer
    }
}
