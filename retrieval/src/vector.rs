//! Sparse term-frequency vectors and their cosine similarity.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::tokenizer::tokenize;

/// Occurrence count per distinct token of one text unit.
///
/// Absent tokens have an implicit count of zero; stored counts are always
/// positive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermFrequencyVector {
    counts: HashMap<String, u32>,
}

impl TermFrequencyVector {
    /// Count the tokens of an already tokenized sequence.
    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut counts = HashMap::new();
        for token in tokens {
            *counts.entry(token.into()).or_insert(0) += 1;
        }
        Self { counts }
    }

    /// Tokenize `text` and count the tokens.
    pub fn from_text(text: &str) -> Self {
        Self::from_tokens(tokenize(text))
    }

    /// Count for `token`, zero when absent.
    pub fn get(&self, token: &str) -> u32 {
        self.counts.get(token).copied().unwrap_or(0)
    }

    /// Number of distinct tokens.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Dot product over the tokens both vectors share.
    pub fn dot(&self, other: &Self) -> f64 {
        let (small, large) = if self.len() <= other.len() {
            (self, other)
        } else {
            (other, self)
        };
        small
            .counts
            .iter()
            .map(|(token, &count)| f64::from(count) * f64::from(large.get(token)))
            .sum()
    }

    /// Euclidean norm over this vector's own tokens.
    pub fn norm(&self) -> f64 {
        self.counts
            .values()
            .map(|&count| f64::from(count) * f64::from(count))
            .sum::<f64>()
            .sqrt()
    }

    /// Cosine similarity in `[0, 1]`; zero when either vector is empty.
    pub fn cosine_similarity(&self, other: &Self) -> f32 {
        let norm_a = self.norm();
        let norm_b = other.norm();
        if norm_a == 0.0 || norm_b == 0.0 {
            return 0.0;
        }
        (self.dot(other) / (norm_a * norm_b)) as f32
    }
}
