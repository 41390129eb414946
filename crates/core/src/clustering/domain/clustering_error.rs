use thiserror::Error;

/// Embedding contract violations. Any of these aborts the whole run.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClusteringError {
    #[error("embedding {index} has {found} dimensions, expected {expected}")]
    DimensionMismatch {
        index: usize,
        expected: usize,
        found: usize,
    },
    #[error("embedding {index} is empty")]
    EmptyEmbedding { index: usize },
    #[error("embedding {index} contains a non-finite value")]
    NonFiniteEmbedding { index: usize },
}
