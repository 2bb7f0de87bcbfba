//! Ranking chunks against a query.

use std::cmp::Reverse;

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::knowledge::KnowledgeBase;
use crate::vector::TermFrequencyVector;

/// A chunk paired with its similarity to one query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredChunk {
    /// Position of the chunk in the knowledge base.
    pub position: usize,

    /// Chunk text.
    pub text: String,

    /// Cosine similarity to the query.
    pub score: f32,
}

/// Score every chunk's term vector against `query`, best first.
///
/// Chunks with equal scores keep their document order.
pub fn rank_lexical(query: &TermFrequencyVector, kb: &KnowledgeBase) -> Vec<(usize, f32)> {
    let mut scored: Vec<(usize, f32)> = kb
        .chunks()
        .iter()
        .map(|chunk| (chunk.position(), query.cosine_similarity(chunk.terms())))
        .collect();
    sort_best_first(&mut scored);
    scored
}

/// Stable descending sort on score.
pub(crate) fn sort_best_first(scored: &mut [(usize, f32)]) {
    scored.sort_by_key(|(_, score)| Reverse(OrderedFloat(*score)));
}

/// Materialize the first `k` entries of a ranking.
pub(crate) fn top_k(kb: &KnowledgeBase, ranked: Vec<(usize, f32)>, k: usize) -> Vec<ScoredChunk> {
    ranked
        .into_iter()
        .filter_map(|(position, score)| {
            kb.get(position).map(|chunk| ScoredChunk {
                position,
                text: chunk.text().to_string(),
                score,
            })
        })
        .take(k)
        .collect()
}
