pub mod sidecar_embedding_source;
