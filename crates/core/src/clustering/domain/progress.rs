use std::sync::atomic::{AtomicUsize, Ordering};

/// Counters a host can poll while a resolver runs, from any thread.
#[derive(Debug, Default)]
pub struct ProgressCounters {
    faces_processed: AtomicUsize,
    faces_total: AtomicUsize,
    clusters_found: AtomicUsize,
}

/// Plain copy of [`ProgressCounters`] at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProgressSnapshot {
    pub faces_processed: usize,
    pub faces_total: usize,
    pub clusters_found: usize,
}

impl ProgressCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new resolver run over `total` faces.
    pub fn begin(&self, total: usize) {
        self.faces_total.store(total, Ordering::Relaxed);
        self.faces_processed.store(0, Ordering::Relaxed);
        self.clusters_found.store(0, Ordering::Relaxed);
    }

    pub fn set_faces_processed(&self, processed: usize) {
        self.faces_processed.store(processed, Ordering::Relaxed);
    }

    pub fn set_clusters_found(&self, clusters: usize) {
        self.clusters_found.store(clusters, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            faces_processed: self.faces_processed.load(Ordering::Relaxed),
            faces_total: self.faces_total.load(Ordering::Relaxed),
            clusters_found: self.clusters_found.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_begin_resets() {
        let p = ProgressCounters::new();
        p.set_faces_processed(5);
        p.set_clusters_found(2);
        p.begin(10);
        assert_eq!(
            p.snapshot(),
            ProgressSnapshot {
                faces_processed: 0,
                faces_total: 10,
                clusters_found: 0
            }
        );
    }

    #[test]
    fn test_visible_across_threads() {
        let p = std::sync::Arc::new(ProgressCounters::new());
        let writer = p.clone();
        std::thread::spawn(move || {
            writer.begin(3);
            writer.set_faces_processed(3);
            writer.set_clusters_found(1);
        })
        .join()
        .unwrap();
        let snap = p.snapshot();
        assert_eq!(snap.faces_processed, 3);
        assert_eq!(snap.clusters_found, 1);
    }
}
