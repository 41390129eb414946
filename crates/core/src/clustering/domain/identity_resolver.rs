use crate::clustering::domain::clustering_error::ClusteringError;
use crate::clustering::domain::progress::ProgressCounters;
use crate::shared::face_observation::FaceObservation;
use crate::shared::person::PersonId;

/// Domain interface for labelling faces with person identities.
///
/// A call is one complete run: implementations build their working set
/// inside `resolve` and drop it on return, so nothing leaks between runs.
/// Observations must be fully materialized before the call.
pub trait IdentityResolver: Send {
    fn resolve(
        &self,
        observations: &[FaceObservation],
        progress: &ProgressCounters,
    ) -> Result<Clustering, ClusteringError>;

    fn name(&self) -> &'static str;
}

/// Person label per observation, index-aligned with the resolver input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Clustering {
    labels: Vec<PersonId>,
    person_count: usize,
}

impl Clustering {
    /// Builds from 0-based cluster indices, which must be dense
    /// (`0..person_count`).
    pub fn from_indices(indices: &[usize]) -> Self {
        let person_count = indices.iter().max().map_or(0, |m| m + 1);
        Self {
            labels: indices.iter().map(|&i| PersonId::from_index(i)).collect(),
            person_count,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn labels(&self) -> &[PersonId] {
        &self.labels
    }

    pub fn label_of(&self, observation_index: usize) -> Option<PersonId> {
        self.labels.get(observation_index).copied()
    }

    pub fn person_count(&self) -> usize {
        self.person_count
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Observation indices per person, in person order.
    pub fn members(&self) -> Vec<Vec<usize>> {
        let mut groups = vec![Vec::new(); self.person_count];
        for (idx, label) in self.labels.iter().enumerate() {
            groups[label.index()].push(idx);
        }
        groups
    }
}
