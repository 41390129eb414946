use std::path::Path;

use crate::shared::bounding_box::BoundingBox;

pub type SourceError = Box<dyn std::error::Error + Send + Sync>;

/// One face as reported by the embedding model.
#[derive(Clone, Debug, PartialEq)]
pub struct DetectedFace {
    pub embedding: Vec<f32>,
    pub bounding_box: Option<BoundingBox>,
    pub confidence: Option<f32>,
}

/// Everything the model reported for one photo.
#[derive(Clone, Debug, PartialEq)]
pub struct PhotoFaces {
    pub image_width: u32,
    pub image_height: u32,
    pub faces: Vec<DetectedFace>,
}

/// Domain interface for the external face embedding model.
///
/// "No face found" is an empty `faces` list, not an error. Any error is
/// treated by the caller as a detection failure for that photo only.
/// Called from several worker threads at once.
pub trait EmbeddingSource: Send + Sync {
    fn extract(&self, photo: &Path) -> Result<PhotoFaces, SourceError>;
}
