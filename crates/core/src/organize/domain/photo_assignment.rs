use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::clustering::domain::identity_resolver::Clustering;
use crate::shared::face_observation::FaceObservation;
use crate::shared::person::{BucketLabel, PersonId};

/// Where one input photo ended up.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PhotoOutcome {
    /// One or more real persons, never empty.
    Identified(BTreeSet<PersonId>),
    /// No accepted face, or detection failed.
    Unknown,
}

/// The many-to-many photo/person relation for one run.
///
/// Every input photo is either identified as at least one person or sent to
/// `unknown`, never both and never neither.
#[derive(Clone, Debug, Default, Serialize)]
pub struct PhotoAssignment {
    #[serde(skip)]
    photos: Vec<(PathBuf, PhotoOutcome)>,
    buckets: BTreeMap<BucketLabel, Vec<PathBuf>>,
}

impl PhotoAssignment {
    /// `photos` is every input photo in run order. `observations` and
    /// `clustering` are the accepted faces and their labels.
    ///
    /// Photos inside a person bucket follow the order their faces were
    /// assigned. A photo holding the same person twice is listed once.
    pub fn build(
        photos: &[PathBuf],
        observations: &[FaceObservation],
        clustering: &Clustering,
    ) -> Self {
        let mut persons_of: HashMap<&Path, BTreeSet<PersonId>> = HashMap::new();
        let mut buckets: BTreeMap<BucketLabel, Vec<PathBuf>> = BTreeMap::new();

        for (idx, obs) in observations.iter().enumerate() {
            let Some(person) = clustering.label_of(idx) else {
                continue;
            };
            let persons = persons_of.entry(obs.source_photo.as_path()).or_default();
            if persons.insert(person) {
                buckets
                    .entry(BucketLabel::Person(person))
                    .or_default()
                    .push(obs.source_photo.clone());
            }
        }

        let mut seen: BTreeSet<&Path> = BTreeSet::new();
        let mut ordered: Vec<(PathBuf, PhotoOutcome)> = Vec::with_capacity(photos.len());
        let all_photos = photos
            .iter()
            .map(PathBuf::as_path)
            .chain(observations.iter().map(|o| o.source_photo.as_path()));
        for photo in all_photos {
            if !seen.insert(photo) {
                continue;
            }
            let outcome = match persons_of.remove(photo) {
                Some(persons) => PhotoOutcome::Identified(persons),
                None => {
                    buckets
                        .entry(BucketLabel::Unknown)
                        .or_default()
                        .push(photo.to_path_buf());
                    PhotoOutcome::Unknown
                }
            };
            ordered.push((photo.to_path_buf(), outcome));
        }

        Self {
            photos: ordered,
            buckets,
        }
    }

    /// Every photo with its outcome, in run order.
    pub fn photos(&self) -> &[(PathBuf, PhotoOutcome)] {
        &self.photos
    }

    pub fn outcome_of(&self, photo: &Path) -> Option<&PhotoOutcome> {
        self.photos
            .iter()
            .find(|(p, _)| p == photo)
            .map(|(_, outcome)| outcome)
    }

    /// Buckets with their photos: persons ascending, `unknown` last.
    pub fn buckets(&self) -> impl Iterator<Item = (BucketLabel, &[PathBuf])> {
        self.buckets.iter().map(|(label, photos)| (*label, photos.as_slice()))
    }

    pub fn bucket(&self, label: BucketLabel) -> &[PathBuf] {
        self.buckets.get(&label).map_or(&[], Vec::as_slice)
    }

    pub fn person_count(&self) -> usize {
        self.buckets
            .keys()
            .filter(|label| matches!(label, BucketLabel::Person(_)))
            .count()
    }

    pub fn unknown_count(&self) -> usize {
        self.bucket(BucketLabel::Unknown).len()
    }

    pub fn photo_count(&self) -> usize {
        self.photos.len()
    }
}
