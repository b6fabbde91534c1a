//! Fixed-size, overlapping character windows over extracted document text.

use serde::{Deserialize, Serialize};
use std::ops::Range;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Window length in characters.
    pub window_size: usize,
    /// Characters shared by consecutive windows; must stay below `window_size`.
    pub overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self { window_size: 600, overlap: 120 }
    }
}

impl ChunkingConfig {
    pub fn validate(&self) -> Result<()> {
        if self.window_size == 0 {
            return Err(Error::InvalidConfig("chunking.window_size must be greater than 0".into()));
        }
        if self.overlap >= self.window_size {
            return Err(Error::InvalidConfig(format!(
                "chunking.overlap ({}) must be smaller than chunking.window_size ({})",
                self.overlap, self.window_size
            )));
        }
        Ok(())
    }

    pub fn split(&self, text: &str) -> Result<Vec<String>> {
        split(text, self.window_size, self.overlap)
    }
}

/// Split `text` into trimmed windows of `window_size` characters, each starting
/// `window_size - overlap` characters after the previous one. Windows that are
/// blank after trimming are dropped.
pub fn split(text: &str, window_size: usize, overlap: usize) -> Result<Vec<String>> {
    ChunkingConfig { window_size, overlap }.validate()?;

    let chars: Vec<char> = text.chars().collect();
    let mut chunks = Vec::new();
    for span in windows(chars.len(), window_size, overlap) {
        let window: String = chars[span].iter().collect();
        let trimmed = window.trim();
        if !trimmed.is_empty() {
            chunks.push(trimmed.to_string());
        }
    }
    Ok(chunks)
}

/// Character spans visited by [`split`]. Callers guarantee `overlap < window_size`.
fn windows(len: usize, window_size: usize, overlap: usize) -> impl Iterator<Item = Range<usize>> {
    let step = window_size - overlap;
    (0..len).step_by(step).map(move |start| start..(start + window_size).min(len))
}
