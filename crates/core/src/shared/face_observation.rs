use std::path::PathBuf;

use crate::shared::bounding_box::BoundingBox;

/// One detected face in one photo. Immutable once built.
#[derive(Clone, Debug, PartialEq)]
pub struct FaceObservation {
    pub source_photo: PathBuf,
    /// Position of the face within its photo's detections.
    pub face_index: usize,
    pub embedding: Vec<f32>,
    pub bounding_box: Option<BoundingBox>,
    pub confidence: Option<f32>,
    pub image_width: u32,
    pub image_height: u32,
}

impl FaceObservation {
    /// Faces without a reported confidence are always accepted.
    pub fn is_accepted(&self, min_confidence: f32) -> bool {
        self.confidence.map_or(true, |c| c >= min_confidence)
    }

    /// The face box, if it can be cropped at all.
    pub fn croppable_box(&self) -> Option<BoundingBox> {
        self.bounding_box.filter(|b| !b.is_degenerate())
    }
}
