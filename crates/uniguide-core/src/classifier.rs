//! Maps a retrieval similarity score onto a [`ConfidenceTier`].

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::ConfidenceTier;

/// Score cut-offs.
///
/// `high`/`low` choose the prompt template. `force_kb` is a separate, lower
/// bar used by the answer service to force the HIGH template (and document
/// attribution) when retrieval looks strong; `None` disables that policy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    pub high: f32,
    pub low: f32,
    pub force_kb: Option<f32>,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self { high: 0.6, low: 0.35, force_kb: Some(0.45) }
    }
}

impl ThresholdConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.low.is_finite() || !self.high.is_finite() || self.low < 0.0 || self.low > self.high {
            return Err(Error::InvalidConfig(format!(
                "thresholds must satisfy 0 <= low <= high (low={}, high={})",
                self.low, self.high
            )));
        }
        if let Some(force) = self.force_kb {
            if !force.is_finite() {
                return Err(Error::InvalidConfig(format!("thresholds.force_kb must be finite, got {force}")));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfidenceClassifier {
    high: f32,
    low: f32,
}

impl ConfidenceClassifier {
    pub fn new(high: f32, low: f32) -> Result<Self> {
        ThresholdConfig { high, low, force_kb: None }.validate()?;
        Ok(Self { high, low })
    }

    pub fn from_config(config: &ThresholdConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { high: config.high, low: config.low })
    }

    pub fn classify(&self, confidence: f32, force_high: bool) -> ConfidenceTier {
        if force_high || confidence >= self.high {
            ConfidenceTier::High
        } else if confidence >= self.low {
            ConfidenceTier::Partial
        } else {
            ConfidenceTier::General
        }
    }
}

impl Default for ConfidenceClassifier {
    fn default() -> Self {
        let defaults = ThresholdConfig::default();
        Self { high: defaults.high, low: defaults.low }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_by_threshold() {
        let c = ConfidenceClassifier::default();
        assert_eq!(c.classify(0.72, false), ConfidenceTier::High);
        assert_eq!(c.classify(0.6, false), ConfidenceTier::High);
        assert_eq!(c.classify(0.5, false), ConfidenceTier::Partial);
        assert_eq!(c.classify(0.35, false), ConfidenceTier::Partial);
        assert_eq!(c.classify(0.1, false), ConfidenceTier::General);
        assert_eq!(c.classify(-0.4, false), ConfidenceTier::General);
        assert_eq!(c.classify(f32::NAN, false), ConfidenceTier::General);
    }

    #[test]
    fn force_wins_over_score() {
        let c = ConfidenceClassifier::default();
        assert_eq!(c.classify(0.0, true), ConfidenceTier::High);
    }

    #[test]
    fn tier_is_monotone_in_confidence() {
        let c = ConfidenceClassifier::new(0.5, 0.25).unwrap();
        let scores: Vec<f32> = (-20..=120).map(|i| i as f32 / 100.0).collect();
        for pair in scores.windows(2) {
            assert!(c.classify(pair[0], false) <= c.classify(pair[1], false), "{pair:?}");
        }
    }

    #[test]
    fn rejects_inverted_thresholds() {
        assert!(ConfidenceClassifier::new(0.3, 0.6).is_err());
        assert!(ConfidenceClassifier::new(0.6, -0.1).is_err());
        let bad = ThresholdConfig { force_kb: Some(f32::INFINITY), ..ThresholdConfig::default() };
        assert!(bad.validate().is_err());
    }
}
