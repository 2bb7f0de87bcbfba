//! Prompt assembly.
//!
//! The top-ranked passages are joined into one context block and wrapped in
//! fixed framing text that tells the model to answer from that context only.

use serde::{Deserialize, Serialize};

use crate::rank::ScoredChunk;

/// Marker appended to a truncated passage.
pub const ELLIPSIS: &str = "...";

/// Separator between passages in the context block.
pub const PASSAGE_SEPARATOR: &str = "\n\n";

/// Configuration for the prompt framing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptConfig {
    /// What the knowledge document is about, named in the framing text.
    pub subject: String,

    /// Per-passage character budget. Longer passages are cut and end with
    /// [`ELLIPSIS`]. Unlimited when unset.
    pub max_chunk_chars: Option<usize>,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            subject: "Virtual AI Officer".to_string(),
            max_chunk_chars: None,
        }
    }
}

impl PromptConfig {
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }

    pub fn with_max_chunk_chars(mut self, max: usize) -> Self {
        self.max_chunk_chars = Some(max);
        self
    }
}

/// The assembled context for one question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptContext {
    /// Passages joined by a blank line, after truncation.
    pub context: String,

    /// `context` wrapped in the framing text; sent as the system prompt.
    pub system_prompt: String,

    /// Knowledge-base positions of the passages, in prompt order.
    pub sources: Vec<usize>,
}

/// Builds [`PromptContext`]s from ranked passages.
#[derive(Debug, Clone, Default)]
pub struct PromptAssembler {
    config: PromptConfig,
}

impl PromptAssembler {
    pub fn new(config: PromptConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PromptConfig {
        &self.config
    }

    /// Assemble the prompt for `chunks`, which are already in rank order.
    pub fn assemble(&self, chunks: &[ScoredChunk]) -> PromptContext {
        let context = chunks
            .iter()
            .map(|chunk| self.fit(&chunk.text))
            .collect::<Vec<_>>()
            .join(PASSAGE_SEPARATOR);

        let system_prompt = format!(
            "Below is some relevant information about {subject}:\n\n{context}\n\n\
             Based solely on the above information, answer the following question concisely.",
            subject = self.config.subject,
        );

        PromptContext {
            context,
            system_prompt,
            sources: chunks.iter().map(|chunk| chunk.position).collect(),
        }
    }

    fn fit(&self, text: &str) -> String {
        match self.config.max_chunk_chars {
            Some(max) => truncate_chars(text, max),
            None => text.to_string(),
        }
    }
}

/// Cut `text` to at most `max` characters, appending [`ELLIPSIS`] when
/// anything was removed.
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}{ELLIPSIS}", &text[..cut]),
        None => text.to_string(),
    }
}
