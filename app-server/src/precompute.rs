//! Offline vector store generation.

use std::path::Path;

use kbqa_embeddings::{EmbeddingProvider, VectorStore};
use kbqa_retrieval::split_word_windows;
use tracing::info;

/// Words per passage when none is given.
pub const DEFAULT_CHUNK_WORDS: usize = 300;

/// Split the document at `input` into word windows, embed each one with
/// `provider`, and write the store to `output`. Returns the entry count.
pub async fn precompute(
    provider: &dyn EmbeddingProvider,
    input: &Path,
    output: &Path,
    chunk_words: usize,
) -> anyhow::Result<usize> {
    let document = tokio::fs::read_to_string(input)
        .await
        .map_err(|err| anyhow::anyhow!("failed to read {}: {err}", input.display()))?;

    let passages = split_word_windows(&document, chunk_words);
    info!(
        "Embedding {} passages of up to {chunk_words} words with {}",
        passages.len(),
        provider.name()
    );

    let store = VectorStore::embed_passages(provider, passages).await?;
    store.save(output).await?;

    info!("Wrote {} entries to {}", store.len(), output.display());
    Ok(store.len())
}
