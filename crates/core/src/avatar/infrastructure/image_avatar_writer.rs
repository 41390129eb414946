use std::path::Path;

use crate::avatar::domain::avatar_selector::AvatarCrop;
use crate::avatar::domain::avatar_writer::AvatarWriter;

/// Cuts the avatar region out of its source photo and saves it using the
/// `image` crate. The output format follows the destination extension.
pub struct ImageAvatarWriter;

impl ImageAvatarWriter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ImageAvatarWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl AvatarWriter for ImageAvatarWriter {
    fn write(&self, crop: &AvatarCrop, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let img = image::open(&crop.source_photo)?;
        let r = crop.region;
        if r.is_degenerate()
            || r.x < 0
            || r.y < 0
            || (r.x + r.width) as u32 > img.width()
            || (r.y + r.height) as u32 > img.height()
        {
            return Err(format!(
                "avatar region {r:?} lies outside {} ({}x{})",
                crop.source_photo.display(),
                img.width(),
                img.height()
            )
            .into());
        }

        let face = img
            .crop_imm(r.x as u32, r.y as u32, r.width as u32, r.height as u32)
            .to_rgb8();
        face.save(path)?;
        Ok(())
    }
}
