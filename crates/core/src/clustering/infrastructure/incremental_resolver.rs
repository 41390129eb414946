//! Streaming identity resolver.
//!
//! Faces are labelled in arrival order against the first face seen for
//! each person. Decisions are final: a face is never relabelled and a
//! reference is never updated, so the outcome depends on input order.
//! Suited to small batches; use the batch resolver at scale.

use crate::clustering::domain::clustering_error::ClusteringError;
use crate::clustering::domain::distance::{check_embeddings, cosine_distance};
use crate::clustering::domain::identity_resolver::{Clustering, IdentityResolver};
use crate::clustering::domain::progress::ProgressCounters;
use crate::shared::constants::DEFAULT_TOLERANCE;
use crate::shared::face_observation::FaceObservation;

pub struct IncrementalResolver {
    tolerance: f64,
}

impl IncrementalResolver {
    pub fn new(tolerance: f64) -> Self {
        Self { tolerance }
    }
}

impl Default for IncrementalResolver {
    fn default() -> Self {
        Self::new(DEFAULT_TOLERANCE)
    }
}

/// First-seen embedding per person, indexed by 0-based person index.
struct ReferenceSet<'a> {
    references: Vec<&'a [f32]>,
}

impl<'a> ReferenceSet<'a> {
    fn new() -> Self {
        Self {
            references: Vec::new(),
        }
    }

    /// Index and distance of the closest reference; earliest wins ties.
    fn nearest(&self, embedding: &[f32]) -> Option<(usize, f64)> {
        let mut best: Option<(usize, f64)> = None;
        for (idx, reference) in self.references.iter().enumerate() {
            let d = cosine_distance(reference, embedding);
            if best.map_or(true, |(_, best_d)| d < best_d) {
                best = Some((idx, d));
            }
        }
        best
    }

    fn mint(&mut self, embedding: &'a [f32]) -> usize {
        self.references.push(embedding);
        self.references.len() - 1
    }

    fn len(&self) -> usize {
        self.references.len()
    }
}

impl IdentityResolver for IncrementalResolver {
    fn resolve(
        &self,
        observations: &[FaceObservation],
        progress: &ProgressCounters,
    ) -> Result<Clustering, ClusteringError> {
        check_embeddings(observations)?;
        progress.begin(observations.len());

        let mut references = ReferenceSet::new();
        let mut indices = Vec::with_capacity(observations.len());

        for (i, obs) in observations.iter().enumerate() {
            let person = match references.nearest(&obs.embedding) {
                Some((idx, distance)) if distance <= self.tolerance => idx,
                _ => references.mint(&obs.embedding),
            };
            indices.push(person);
            progress.set_faces_processed(i + 1);
            progress.set_clusters_found(references.len());
        }

        log::info!(
            "Incremental resolver: {} faces -> {} persons (tolerance {})",
            observations.len(),
            references.len(),
            self.tolerance
        );
        Ok(Clustering::from_indices(&indices))
    }

    fn name(&self) -> &'static str {
        "incremental"
    }
}
