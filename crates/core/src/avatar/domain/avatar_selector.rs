use std::path::PathBuf;

use serde::Serialize;

use crate::shared::bounding_box::BoundingBox;
use crate::shared::constants::DEFAULT_AVATAR_PADDING;
use crate::shared::face_observation::FaceObservation;

/// The chosen crop for one person: a padded, clipped region of a photo.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AvatarCrop {
    pub source_photo: PathBuf,
    pub face_index: usize,
    pub region: BoundingBox,
}

/// Picks the largest face crop among a person's observations.
///
/// Area is measured after padding and clipping, so a face near the image
/// edge can lose to a slightly smaller face in the middle of a photo.
pub struct AvatarSelector {
    padding: u32,
}

impl AvatarSelector {
    pub fn new(padding: u32) -> Self {
        Self { padding }
    }

    /// `None` when no member has a usable face box.
    pub fn select<'a, I>(&self, members: I) -> Option<AvatarCrop>
    where
        I: IntoIterator<Item = &'a FaceObservation>,
    {
        let mut best: Option<AvatarCrop> = None;
        for obs in members {
            let Some(bbox) = obs.croppable_box() else {
                continue;
            };
            let Some(region) = bbox.padded_within(self.padding, obs.image_width, obs.image_height)
            else {
                continue;
            };
            // Strictly larger only: ties keep the earlier face.
            if best.as_ref().map_or(true, |b| region.area() > b.region.area()) {
                best = Some(AvatarCrop {
                    source_photo: obs.source_photo.clone(),
                    face_index: obs.face_index,
                    region,
                });
            }
        }
        best
    }
}

impl Default for AvatarSelector {
    fn default() -> Self {
        Self::new(DEFAULT_AVATAR_PADDING)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn face(photo: &str, bbox: Option<BoundingBox>, image: (u32, u32)) -> FaceObservation {
        FaceObservation {
            source_photo: PathBuf::from(photo),
            face_index: 0,
            embedding: vec![1.0],
            bounding_box: bbox,
            confidence: None,
            image_width: image.0,
            image_height: image.1,
        }
    }

    #[test]
    fn test_larger_crop_wins() {
        let small = face("small.jpg", Some(BoundingBox::new(100, 100, 100, 100)), (1000, 1000));
        let large = face("large.jpg", Some(BoundingBox::new(100, 100, 150, 150)), (1000, 1000));
        let crop = AvatarSelector::new(40).select([&small, &large]).unwrap();
        assert_eq!(crop.source_photo, PathBuf::from("large.jpg"));
        assert_eq!(crop.region, BoundingBox::new(60, 60, 230, 230));
    }

    #[test]
    fn test_larger_crop_wins_regardless_of_order() {
        let small = face("small.jpg", Some(BoundingBox::new(100, 100, 100, 100)), (1000, 1000));
        let large = face("large.jpg", Some(BoundingBox::new(100, 100, 150, 150)), (1000, 1000));
        let crop = AvatarSelector::new(40).select([&large, &small]).unwrap();
        assert_eq!(crop.source_photo, PathBuf::from("large.jpg"));
    }

    #[test]
    fn test_tie_keeps_earlier() {
        let first = face("first.jpg", Some(BoundingBox::new(100, 100, 50, 50)), (1000, 1000));
        let second = face("second.jpg", Some(BoundingBox::new(300, 300, 50, 50)), (1000, 1000));
        let crop = AvatarSelector::new(10).select([&first, &second]).unwrap();
        assert_eq!(crop.source_photo, PathBuf::from("first.jpg"));
    }

    #[test]
    fn test_area_compared_after_clipping() {
        // Raw box is larger but sits in a corner of a small image.
        let clipped = face("corner.jpg", Some(BoundingBox::new(0, 0, 60, 60)), (70, 70));
        let centered = face("center.jpg", Some(BoundingBox::new(200, 200, 50, 50)), (1000, 1000));
        let crop = AvatarSelector::new(40).select([&clipped, &centered]).unwrap();
        // corner: 70x70 = 4900, center: 130x130 = 16900
        assert_eq!(crop.source_photo, PathBuf::from("center.jpg"));
    }

    #[test]
    fn test_degenerate_boxes_skipped() {
        let degenerate = face("zero.jpg", Some(BoundingBox::new(10, 10, 0, 0)), (100, 100));
        let missing = face("none.jpg", None, (100, 100));
        let usable = face("ok.jpg", Some(BoundingBox::new(10, 10, 5, 5)), (100, 100));
        let crop = AvatarSelector::default()
            .select([&degenerate, &missing, &usable])
            .unwrap();
        assert_eq!(crop.source_photo, PathBuf::from("ok.jpg"));
    }

    #[test]
    fn test_no_usable_box_yields_none() {
        let degenerate = face("zero.jpg", Some(BoundingBox::new(10, 10, 0, 20)), (100, 100));
        assert!(AvatarSelector::default().select([&degenerate]).is_none());
        assert!(AvatarSelector::default().select(std::iter::empty()).is_none());
    }
}
