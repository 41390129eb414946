use std::path::Path;

use crate::avatar::domain::avatar_selector::AvatarCrop;

/// Persists a person's avatar crop as an image file.
pub trait AvatarWriter: Send {
    fn write(&self, crop: &AvatarCrop, path: &Path) -> Result<(), Box<dyn std::error::Error>>;
}
