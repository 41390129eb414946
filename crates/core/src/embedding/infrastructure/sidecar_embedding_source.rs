//! Reads embeddings that the model service wrote next to each photo as
//! `<photo file name>.faces.json`.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::embedding::domain::embedding_source::{
    DetectedFace, EmbeddingSource, PhotoFaces, SourceError,
};
use crate::shared::bounding_box::BoundingBox;
use crate::shared::constants::SIDECAR_SUFFIX;

#[derive(Error, Debug)]
pub enum SidecarError {
    #[error("no sidecar at {path}")]
    Missing { path: PathBuf },
    #[error("failed to read sidecar {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed sidecar {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to read dimensions of {path}: {source}")]
    Dimensions {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

#[derive(Deserialize)]
struct SidecarFile {
    width: Option<u32>,
    height: Option<u32>,
    faces: Vec<SidecarFace>,
}

#[derive(Deserialize)]
struct SidecarFace {
    embedding: Vec<f32>,
    #[serde(default, alias = "bbox")]
    bounding_box: Option<BoundingBox>,
    #[serde(default)]
    confidence: Option<f32>,
}

/// Sidecar path for a photo: the full file name plus [`SIDECAR_SUFFIX`].
pub fn sidecar_path(photo: &Path) -> PathBuf {
    let mut name = photo.file_name().unwrap_or_default().to_os_string();
    name.push(SIDECAR_SUFFIX);
    photo.with_file_name(name)
}

/// Image dimensions come from the sidecar when present, otherwise from the
/// image header.
pub struct SidecarEmbeddingSource;

impl SidecarEmbeddingSource {
    pub fn new() -> Self {
        Self
    }

    fn load(&self, photo: &Path) -> Result<PhotoFaces, SidecarError> {
        let path = sidecar_path(photo);
        if !path.is_file() {
            return Err(SidecarError::Missing { path });
        }
        let text = fs::read_to_string(&path).map_err(|source| SidecarError::Read {
            path: path.clone(),
            source,
        })?;
        let sidecar: SidecarFile =
            serde_json::from_str(&text).map_err(|source| SidecarError::Parse {
                path: path.clone(),
                source,
            })?;

        let (image_width, image_height) = match (sidecar.width, sidecar.height) {
            (Some(w), Some(h)) => (w, h),
            _ => image::image_dimensions(photo).map_err(|source| SidecarError::Dimensions {
                path: photo.to_path_buf(),
                source,
            })?,
        };

        let faces = sidecar
            .faces
            .into_iter()
            .map(|f| DetectedFace {
                embedding: f.embedding,
                bounding_box: f.bounding_box,
                confidence: f.confidence,
            })
            .collect();

        Ok(PhotoFaces {
            image_width,
            image_height,
            faces,
        })
    }
}

impl Default for SidecarEmbeddingSource {
    fn default() -> Self {
        Self::new()
    }
}

impl EmbeddingSource for SidecarEmbeddingSource {
    fn extract(&self, photo: &Path) -> Result<PhotoFaces, SourceError> {
        Ok(self.load(photo)?)
    }
}
