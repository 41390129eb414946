use std::path::PathBuf;

use crate::embedding::domain::embedding_source::{EmbeddingSource, PhotoFaces, SourceError};

/// Extraction progress callback: `(photos_done, photos_total)`.
pub type ExtractionProgress<'a> = dyn Fn(usize, usize) + Sync + 'a;

/// Abstracts how embeddings are extracted for a batch of photos.
///
/// This is a port. Implementations may run the source on many threads but
/// must return one result per photo, in input order, and only once every
/// photo has been handled.
pub trait ExtractionExecutor: Send {
    fn execute(
        &self,
        source: &dyn EmbeddingSource,
        photos: &[PathBuf],
        on_progress: Option<&ExtractionProgress<'_>>,
    ) -> Vec<Result<PhotoFaces, SourceError>>;
}
