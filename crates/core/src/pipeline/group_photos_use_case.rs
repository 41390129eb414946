use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;

use crate::avatar::domain::avatar_selector::{AvatarCrop, AvatarSelector};
use crate::clustering::domain::clustering_error::ClusteringError;
use crate::clustering::domain::identity_resolver::IdentityResolver;
use crate::clustering::domain::progress::ProgressCounters;
use crate::embedding::domain::embedding_source::EmbeddingSource;
use crate::organize::domain::group_organizer::{GroupOrganizer, Placement};
use crate::organize::domain::photo_assignment::PhotoAssignment;
use crate::pipeline::extraction_executor::{ExtractionExecutor, ExtractionProgress};
use crate::shared::face_observation::FaceObservation;
use crate::shared::person::PersonId;

/// Counts from one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub photos: usize,
    pub faces_accepted: usize,
    pub faces_dropped: usize,
    pub detection_failures: usize,
    pub persons: usize,
    pub unknown_photos: usize,
}

/// Everything a run decided. Nothing has been written to disk yet.
#[derive(Debug, Serialize)]
pub struct GroupingReport {
    pub strategy: &'static str,
    pub summary: RunSummary,
    pub assignment: PhotoAssignment,
    pub avatars: BTreeMap<PersonId, AvatarCrop>,
    pub placements: Vec<Placement>,
}

/// Photo grouping pipeline: extract → filter → resolve → assign → avatars → plan.
///
/// Per-photo extraction failures send the photo to `unknown` and the run
/// continues. Only a malformed embedding set aborts.
pub struct GroupPhotosUseCase {
    source: Box<dyn EmbeddingSource>,
    executor: Box<dyn ExtractionExecutor>,
    resolver: Box<dyn IdentityResolver>,
    selector: AvatarSelector,
    organizer: GroupOrganizer,
    min_confidence: f32,
    progress: Arc<ProgressCounters>,
    on_extract_progress: Option<Box<ExtractionProgress<'static>>>,
}

impl GroupPhotosUseCase {
    pub fn new(
        source: Box<dyn EmbeddingSource>,
        executor: Box<dyn ExtractionExecutor>,
        resolver: Box<dyn IdentityResolver>,
        selector: AvatarSelector,
        min_confidence: f32,
    ) -> Self {
        Self {
            source,
            executor,
            resolver,
            selector,
            organizer: GroupOrganizer::new(),
            min_confidence,
            progress: Arc::new(ProgressCounters::new()),
            on_extract_progress: None,
        }
    }

    /// Shares resolver counters with a host that polls them.
    pub fn with_progress(mut self, progress: Arc<ProgressCounters>) -> Self {
        self.progress = progress;
        self
    }

    pub fn with_extract_progress(
        mut self,
        on_progress: Box<ExtractionProgress<'static>>,
    ) -> Self {
        self.on_extract_progress = Some(on_progress);
        self
    }

    pub fn progress(&self) -> Arc<ProgressCounters> {
        self.progress.clone()
    }

    pub fn execute(&self, photos: &[PathBuf]) -> Result<GroupingReport, ClusteringError> {
        log::info!("Extracting faces from {} photos", photos.len());
        let results = self.executor.execute(
            &*self.source,
            photos,
            self.on_extract_progress.as_deref(),
        );

        let mut summary = RunSummary::default();
        let mut observations: Vec<FaceObservation> = Vec::new();

        for (photo, result) in photos.iter().zip(results) {
            let detected = match result {
                Ok(detected) => detected,
                Err(e) => {
                    log::warn!("Face detection failed for {}: {e}", photo.display());
                    summary.detection_failures += 1;
                    continue;
                }
            };
            if detected.faces.is_empty() {
                log::debug!("No faces in {}", photo.display());
            }
            for (face_index, face) in detected.faces.into_iter().enumerate() {
                let obs = FaceObservation {
                    source_photo: photo.clone(),
                    face_index,
                    embedding: face.embedding,
                    bounding_box: face.bounding_box,
                    confidence: face.confidence,
                    image_width: detected.image_width,
                    image_height: detected.image_height,
                };
                if obs.is_accepted(self.min_confidence) {
                    observations.push(obs);
                } else {
                    summary.faces_dropped += 1;
                }
            }
        }
        if summary.faces_dropped > 0 {
            log::debug!(
                "Dropped {} faces below confidence {}",
                summary.faces_dropped,
                self.min_confidence
            );
        }
        summary.faces_accepted = observations.len();

        let clustering = self.resolver.resolve(&observations, &self.progress)?;
        let assignment = PhotoAssignment::build(photos, &observations, &clustering);

        let mut avatars = BTreeMap::new();
        for (idx, members) in clustering.members().into_iter().enumerate() {
            let person = PersonId::from_index(idx);
            match self.selector.select(members.iter().map(|&i| &observations[i])) {
                Some(crop) => {
                    avatars.insert(person, crop);
                }
                None => log::debug!("No usable face box for {person}"),
            }
        }

        let placements = self.organizer.plan(&assignment);

        summary.photos = assignment.photo_count();
        summary.persons = assignment.person_count();
        summary.unknown_photos = assignment.unknown_count();
        log::info!(
            "Found {} persons in {} photos ({} unknown)",
            summary.persons,
            summary.photos,
            summary.unknown_photos
        );

        Ok(GroupingReport {
            strategy: self.resolver.name(),
            summary,
            assignment,
            avatars,
            placements,
        })
    }
}
