use std::path::{Path, PathBuf};

use crate::embedding::domain::embedding_source::{EmbeddingSource, PhotoFaces, SourceError};
use crate::pipeline::extraction_executor::{ExtractionExecutor, ExtractionProgress};

/// Runs the embedding source on a fixed pool of worker threads.
///
/// Layout: `jobs → workers[n] → results → main [reorder/progress]`
///
/// Photos are independent, so workers pull the next photo as soon as they
/// finish one. Results are put back in input order before returning.
pub struct ThreadedExtractionExecutor {
    workers: usize,
}

impl ThreadedExtractionExecutor {
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
        }
    }
}

impl Default for ThreadedExtractionExecutor {
    fn default() -> Self {
        Self::new(std::thread::available_parallelism().map_or(1, |n| n.get()))
    }
}

impl ExtractionExecutor for ThreadedExtractionExecutor {
    fn execute(
        &self,
        source: &dyn EmbeddingSource,
        photos: &[PathBuf],
        on_progress: Option<&ExtractionProgress<'_>>,
    ) -> Vec<Result<PhotoFaces, SourceError>> {
        let total = photos.len();
        if total == 0 {
            return Vec::new();
        }
        let workers = self.workers.min(total);

        let (job_tx, job_rx) = crossbeam_channel::unbounded::<(usize, &Path)>();
        let (result_tx, result_rx) =
            crossbeam_channel::unbounded::<(usize, Result<PhotoFaces, SourceError>)>();
        for (idx, photo) in photos.iter().enumerate() {
            // The receiver is alive until the scope below ends.
            let _ = job_tx.send((idx, photo.as_path()));
        }
        drop(job_tx);

        let mut slots: Vec<Option<Result<PhotoFaces, SourceError>>> =
            (0..total).map(|_| None).collect();

        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..workers)
                .map(|_| {
                    let job_rx = job_rx.clone();
                    let result_tx = result_tx.clone();
                    scope.spawn(move || {
                        for (idx, photo) in job_rx {
                            if result_tx.send((idx, source.extract(photo))).is_err() {
                                break;
                            }
                        }
                    })
                })
                .collect();
            drop(result_tx);

            let mut done = 0;
            for (idx, result) in result_rx.iter() {
                slots[idx] = Some(result);
                done += 1;
                if let Some(cb) = on_progress {
                    cb(done, total);
                }
            }

            for handle in handles {
                if handle.join().is_err() {
                    log::warn!("Extraction worker panicked");
                }
            }
        });

        slots
            .into_iter()
            .zip(photos)
            .map(|(slot, photo)| {
                slot.unwrap_or_else(|| {
                    Err(format!("extraction aborted for {}", photo.display()).into())
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::domain::embedding_source::DetectedFace;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    // --- Stubs ---

    /// Encodes the photo's numeric file stem into the embedding.
    struct NumberedSource {
        calls: AtomicUsize,
    }

    impl NumberedSource {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl EmbeddingSource for NumberedSource {
        fn extract(&self, photo: &Path) -> Result<PhotoFaces, SourceError> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            let stem = photo.file_stem().and_then(|s| s.to_str()).unwrap_or("");
            if stem == "bad" {
                return Err("model timeout".into());
            }
            if stem == "boom" {
                panic!("model crashed");
            }
            let n: f32 = stem.parse().map_err(|_| "not a number")?;
            Ok(PhotoFaces {
                image_width: 1,
                image_height: 1,
                faces: vec![DetectedFace {
                    embedding: vec![n],
                    bounding_box: None,
                    confidence: None,
                }],
            })
        }
    }

    fn photos(names: &[&str]) -> Vec<PathBuf> {
        names.iter().map(PathBuf::from).collect()
    }

    fn first_value(result: &Result<PhotoFaces, SourceError>) -> f32 {
        result.as_ref().unwrap().faces[0].embedding[0]
    }

    // --- Tests ---

    #[test]
    fn test_results_in_input_order() {
        let names: Vec<String> = (0..50).map(|i| format!("{i}.jpg")).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let source = NumberedSource::new();

        let results = ThreadedExtractionExecutor::new(4).execute(&source, &photos(&refs), None);

        assert_eq!(results.len(), 50);
        for (i, r) in results.iter().enumerate() {
            assert_eq!(first_value(r), i as f32);
        }
        assert_eq!(source.calls.load(Ordering::Relaxed), 50);
    }

    #[test]
    fn test_failure_is_per_photo() {
        let source = NumberedSource::new();
        let results = ThreadedExtractionExecutor::new(2).execute(
            &source,
            &photos(&["1.jpg", "bad.jpg", "3.jpg"]),
            None,
        );
        assert_eq!(first_value(&results[0]), 1.0);
        assert!(results[1].is_err());
        assert_eq!(first_value(&results[2]), 3.0);
    }

    #[test]
    fn test_progress_reaches_total() {
        let seen = Mutex::new(Vec::new());
        let progress = |done: usize, total: usize| seen.lock().unwrap().push((done, total));
        let source = NumberedSource::new();

        ThreadedExtractionExecutor::new(3).execute(
            &source,
            &photos(&["1.jpg", "2.jpg", "3.jpg", "4.jpg"]),
            Some(&progress),
        );

        let seen = seen.into_inner().unwrap();
        assert_eq!(seen.len(), 4);
        assert_eq!(seen.last(), Some(&(4, 4)));
    }

    #[test]
    fn test_single_worker() {
        let source = NumberedSource::new();
        let results =
            ThreadedExtractionExecutor::new(0).execute(&source, &photos(&["7.jpg", "8.jpg"]), None);
        assert_eq!(first_value(&results[0]), 7.0);
        assert_eq!(first_value(&results[1]), 8.0);
    }

    #[test]
    fn test_empty_input() {
        let results = ThreadedExtractionExecutor::default().execute(&NumberedSource::new(), &[], None);
        assert!(results.is_empty());
    }

    #[test]
    fn test_panicking_source_marks_photo_failed() {
        let source = NumberedSource::new();
        let results = ThreadedExtractionExecutor::new(2).execute(
            &source,
            &photos(&["1.jpg", "boom.jpg", "3.jpg", "4.jpg"]),
            None,
        );
        assert_eq!(results.len(), 4);
        assert!(results[1].is_err());
        assert_eq!(first_value(&results[3]), 4.0);
    }
}
