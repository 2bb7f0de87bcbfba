//! The knowledge base: passages of the knowledge document, built once at
//! startup and shared read-only by every request.

use std::path::{Path, PathBuf};

use kbqa_embeddings::{Embedding, VectorStore};
use tracing::{info, warn};

use crate::error::{Result, RetrievalError};
use crate::segment::split_passages;
use crate::vector::TermFrequencyVector;

/// Supplies the raw text of the knowledge document.
pub trait KnowledgeSource {
    /// Human-readable location, used in logs and errors.
    fn location(&self) -> String;

    /// Read the whole document.
    fn read(&self) -> std::io::Result<String>;
}

/// A knowledge document on the local file system.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl KnowledgeSource for FileSource {
    fn location(&self) -> String {
        self.path.display().to_string()
    }

    fn read(&self) -> std::io::Result<String> {
        std::fs::read_to_string(&self.path)
    }
}

/// In-memory documents, mostly for fixtures.
impl KnowledgeSource for str {
    fn location(&self) -> String {
        "<inline>".to_string()
    }

    fn read(&self) -> std::io::Result<String> {
        Ok(self.to_string())
    }
}

/// One passage of the knowledge document.
#[derive(Debug, Clone, PartialEq)]
pub struct KnowledgeChunk {
    position: usize,
    text: String,
    terms: TermFrequencyVector,
    embedding: Option<Embedding>,
}

impl KnowledgeChunk {
    /// Create a chunk and derive its term-frequency vector.
    pub fn new(position: usize, text: impl Into<String>) -> Self {
        let text = text.into();
        let terms = TermFrequencyVector::from_text(&text);
        Self {
            position,
            text,
            terms,
            embedding: None,
        }
    }

    /// Attach a precomputed dense embedding.
    pub fn with_embedding(mut self, embedding: Embedding) -> Self {
        self.embedding = Some(embedding);
        self
    }

    /// Index of the chunk in document order.
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn terms(&self) -> &TermFrequencyVector {
        &self.terms
    }

    pub fn embedding(&self) -> Option<&[f32]> {
        self.embedding.as_deref()
    }
}

/// The immutable, ordered set of chunks retrieval runs against.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KnowledgeBase {
    chunks: Vec<KnowledgeChunk>,
}

impl KnowledgeBase {
    /// A knowledge base with no passages. Every query retrieves nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Segment a document into chunks.
    pub fn from_document(document: &str) -> Self {
        let chunks = split_passages(document)
            .into_iter()
            .enumerate()
            .map(|(position, text)| KnowledgeChunk::new(position, text))
            .collect();
        Self { chunks }
    }

    /// Read and segment a document, failing if the source is unreadable.
    pub fn try_load<S>(source: &S) -> Result<Self>
    where
        S: KnowledgeSource + ?Sized,
    {
        let document = source
            .read()
            .map_err(|e| RetrievalError::MissingKnowledgeSource {
                location: source.location(),
                reason: e.to_string(),
            })?;
        let kb = Self::from_document(&document);
        info!(
            "Loaded {} passages from knowledge source {}",
            kb.len(),
            source.location()
        );
        Ok(kb)
    }

    /// Read and segment a document. An unreadable source is logged and
    /// yields an empty knowledge base so the process keeps serving.
    pub fn load<S>(source: &S) -> Self
    where
        S: KnowledgeSource + ?Sized,
    {
        match Self::try_load(source) {
            Ok(kb) => kb,
            Err(e) => {
                warn!("Serving with an empty knowledge base: {e}");
                Self::empty()
            }
        }
    }

    /// Chunks carrying the precomputed embeddings of a vector store.
    pub fn from_vector_store(store: VectorStore) -> Self {
        let chunks = store
            .into_entries()
            .into_iter()
            .enumerate()
            .map(|(position, entry)| {
                KnowledgeChunk::new(position, entry.text).with_embedding(entry.embedding)
            })
            .collect();
        Self { chunks }
    }

    /// Load a precomputed vector store.
    ///
    /// A missing file degrades to an empty knowledge base like
    /// [`KnowledgeBase::load`]; a file that exists but cannot be read or
    /// parsed is an error.
    pub async fn load_vector_store(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match VectorStore::load(path).await {
            Ok(store) => Ok(Self::from_vector_store(store)),
            Err(kbqa_embeddings::EmbeddingError::Io(e))
                if e.kind() == std::io::ErrorKind::NotFound =>
            {
                warn!(
                    "Serving with an empty knowledge base: vector store {} unavailable: {e}",
                    path.display()
                );
                Ok(Self::empty())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Build directly from chunk texts, in order.
    pub fn from_passages<I, S>(passages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let chunks = passages
            .into_iter()
            .enumerate()
            .map(|(position, text)| KnowledgeChunk::new(position, text))
            .collect();
        Self { chunks }
    }

    pub fn chunks(&self) -> &[KnowledgeChunk] {
        &self.chunks
    }

    pub fn get(&self, position: usize) -> Option<&KnowledgeChunk> {
        self.chunks.get(position)
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Dimension of the chunk embeddings, if every chunk has one.
    pub fn embedding_dimension(&self) -> Option<usize> {
        let mut dims = self.chunks.iter().map(|c| c.embedding().map(<[f32]>::len));
        let first = dims.next()??;
        dims.all(|d| d == Some(first)).then_some(first)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kbqa_embeddings::VectorStoreEntry;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_from_document_keeps_order_and_positions() {
        let kb = KnowledgeBase::from_document("Intro\n\nPricing\n\n\nSupport");
        let texts: Vec<&str> = kb.chunks().iter().map(KnowledgeChunk::text).collect();
        let positions: Vec<usize> = kb.chunks().iter().map(KnowledgeChunk::position).collect();

        assert_eq!(texts, vec!["Intro", "Pricing", "Support"]);
        assert_eq!(positions, vec![0, 1, 2]);
        assert_eq!(kb.chunks()[1].terms().get("pricing"), 1);
    }

    #[test]
    fn test_missing_file_degrades_to_empty() {
        let temp_dir = TempDir::new().unwrap();
        let source = FileSource::new(temp_dir.path().join("nope.md"));

        assert!(KnowledgeBase::load(&source).is_empty());
        assert!(matches!(
            KnowledgeBase::try_load(&source),
            Err(RetrievalError::MissingKnowledgeSource { .. })
        ));
    }

    #[test]
    fn test_loads_file_source() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("kb.md");
        std::fs::write(&path, "# Title\n\nBody text.\n").unwrap();

        let kb = KnowledgeBase::load(&FileSource::new(&path));
        assert_eq!(kb.len(), 2);
    }

    #[test]
    fn test_inline_source() {
        let kb = KnowledgeBase::load("one\n\ntwo");
        assert_eq!(kb.len(), 2);
    }

    #[test]
    fn test_embedding_dimension() {
        let store = VectorStore::new(vec![
            VectorStoreEntry {
                text: "a".to_string(),
                embedding: vec![1.0, 0.0, 0.0],
            },
            VectorStoreEntry {
                text: "b".to_string(),
                embedding: vec![0.0, 1.0, 0.0],
            },
        ])
        .unwrap();

        assert_eq!(
            KnowledgeBase::from_vector_store(store).embedding_dimension(),
            Some(3)
        );
        assert_eq!(
            KnowledgeBase::from_passages(["a", "b"]).embedding_dimension(),
            None
        );
        assert_eq!(KnowledgeBase::empty().embedding_dimension(), None);
    }

    #[tokio::test]
    async fn test_missing_vector_store_degrades_to_empty() {
        let temp_dir = TempDir::new().unwrap();
        let kb = KnowledgeBase::load_vector_store(temp_dir.path().join("embeddings.json"))
            .await
            .unwrap();
        assert!(kb.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_vector_store_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("embeddings.json");
        std::fs::write(&path, "[{\"text\": 1}]").unwrap();

        assert!(matches!(
            KnowledgeBase::load_vector_store(&path).await,
            Err(RetrievalError::Embedding(_))
        ));
    }

    #[tokio::test]
    async fn test_non_utf8_vector_store_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("embeddings.json");
        std::fs::write(&path, [0xff, 0xfe, b'[', b']']).unwrap();

        assert!(matches!(
            KnowledgeBase::load_vector_store(&path).await,
            Err(RetrievalError::Embedding(_))
        ));
    }
}
