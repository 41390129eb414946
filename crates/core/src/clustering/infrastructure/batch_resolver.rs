//! Two-phase identity resolver.
//!
//! Phase 1 clusters every embedding with average linkage at a tight
//! `distance_threshold`, deliberately over-fragmenting. Phase 2 joins
//! fragments whose centroids fall within `merge_threshold`. The partition
//! does not depend on input order; the person numbers do, because clusters
//! are numbered by their earliest observation.
//!
//! Holds the full pairwise distance matrix, so memory grows with the square
//! of the face count.
//!
//! `faces_processed` advances as each face's distance row is filled, and
//! `clusters_found` is published after each phase.

use crate::clustering::domain::clustering_error::ClusteringError;
use crate::clustering::domain::distance::{check_embeddings, distance_matrix_with_progress};
use crate::clustering::domain::identity_resolver::{Clustering, IdentityResolver};
use crate::clustering::domain::progress::ProgressCounters;
use crate::clustering::infrastructure::{average_linkage, centroid_consolidation};
use crate::shared::constants::{DEFAULT_DISTANCE_THRESHOLD, DEFAULT_MERGE_THRESHOLD};
use crate::shared::face_observation::FaceObservation;

pub struct BatchResolver {
    distance_threshold: f64,
    merge_threshold: f64,
}

impl BatchResolver {
    pub fn new(distance_threshold: f64, merge_threshold: f64) -> Self {
        Self {
            distance_threshold,
            merge_threshold,
        }
    }
}

impl Default for BatchResolver {
    fn default() -> Self {
        Self::new(DEFAULT_DISTANCE_THRESHOLD, DEFAULT_MERGE_THRESHOLD)
    }
}

impl IdentityResolver for BatchResolver {
    fn resolve(
        &self,
        observations: &[FaceObservation],
        progress: &ProgressCounters,
    ) -> Result<Clustering, ClusteringError> {
        let dimensions = check_embeddings(observations)?;
        progress.begin(observations.len());
        if observations.is_empty() {
            return Ok(Clustering::empty());
        }

        let embeddings: Vec<&[f32]> = observations.iter().map(|o| &o.embedding[..]).collect();
        let distances = distance_matrix_with_progress(&embeddings, |rows| {
            progress.set_faces_processed(rows);
        });

        let initial = average_linkage::cluster(&distances, self.distance_threshold);
        let initial_count = initial.iter().max().map_or(0, |m| m + 1);
        progress.set_clusters_found(initial_count);
        log::info!(
            "Initial clusters: {initial_count} from {} faces (threshold {})",
            observations.len(),
            self.distance_threshold
        );

        let centroids = centroid_consolidation::cluster_centroids(
            &embeddings,
            &initial,
            initial_count,
            dimensions,
        );
        let merged = centroid_consolidation::consolidate(&centroids, self.merge_threshold);
        let final_labels: Vec<usize> = initial.iter().map(|&c| merged[c]).collect();

        let clustering = Clustering::from_indices(&final_labels);
        progress.set_clusters_found(clustering.person_count());
        log::info!(
            "After merging: {} clusters (merge threshold {})",
            clustering.person_count(),
            self.merge_threshold
        );
        Ok(clustering)
    }

    fn name(&self) -> &'static str {
        "batch"
    }
}
