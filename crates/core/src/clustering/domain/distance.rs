//! Cosine distance, the one similarity primitive every resolver builds on.

use ndarray::Array2;

use crate::clustering::domain::clustering_error::ClusteringError;
use crate::shared::face_observation::FaceObservation;

/// `1 - cosine_similarity`, in `[0, 2]`.
///
/// A zero vector has no direction; it is treated as orthogonal to
/// everything (distance 1).
pub fn cosine_distance(a: &[f32], b: &[f32]) -> f64 {
    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (x, y) in a.iter().zip(b.iter()) {
        let (x, y) = (*x as f64, *y as f64);
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 1.0;
    }
    let similarity = dot / (norm_a.sqrt() * norm_b.sqrt());
    (1.0 - similarity).clamp(0.0, 2.0)
}

/// Element-wise mean of equally sized vectors.
pub fn centroid<'a, I>(vectors: I, dimensions: usize) -> Vec<f32>
where
    I: IntoIterator<Item = &'a [f32]>,
{
    let mut sum = vec![0.0f64; dimensions];
    let mut count = 0usize;
    for v in vectors {
        for (acc, x) in sum.iter_mut().zip(v.iter()) {
            *acc += *x as f64;
        }
        count += 1;
    }
    if count == 0 {
        return vec![0.0; dimensions];
    }
    sum.into_iter().map(|s| (s / count as f64) as f32).collect()
}

/// Checks that every embedding is non-empty, finite and shares one
/// dimensionality. Returns that dimensionality (0 for no observations).
pub fn check_embeddings(observations: &[FaceObservation]) -> Result<usize, ClusteringError> {
    let Some(first) = observations.first() else {
        return Ok(0);
    };
    let expected = first.embedding.len();
    for (index, obs) in observations.iter().enumerate() {
        let found = obs.embedding.len();
        if found == 0 {
            return Err(ClusteringError::EmptyEmbedding { index });
        }
        if found != expected {
            return Err(ClusteringError::DimensionMismatch {
                index,
                expected,
                found,
            });
        }
        if obs.embedding.iter().any(|x| !x.is_finite()) {
            return Err(ClusteringError::NonFiniteEmbedding { index });
        }
    }
    Ok(expected)
}

/// Full symmetric pairwise distance matrix.
///
/// Quadratic in memory and time: fine for hundreds to a few thousand
/// faces, the intended scale of one run.
pub fn distance_matrix(embeddings: &[&[f32]]) -> Array2<f64> {
    distance_matrix_with_progress(embeddings, |_| {})
}

/// [`distance_matrix`], calling `on_row(rows_done)` after each row.
pub fn distance_matrix_with_progress<F>(embeddings: &[&[f32]], mut on_row: F) -> Array2<f64>
where
    F: FnMut(usize),
{
    let n = embeddings.len();
    let mut matrix = Array2::<f64>::zeros((n, n));
    for i in 0..n {
        for j in (i + 1)..n {
            let d = cosine_distance(embeddings[i], embeddings[j]);
            matrix[[i, j]] = d;
            matrix[[j, i]] = d;
        }
        on_row(i + 1);
    }
    matrix
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::path::PathBuf;

    fn observation(embedding: Vec<f32>) -> FaceObservation {
        FaceObservation {
            source_photo: PathBuf::from("p.jpg"),
            face_index: 0,
            embedding,
            bounding_box: None,
            confidence: None,
            image_width: 10,
            image_height: 10,
        }
    }

    #[test]
    fn test_cosine_distance_identical() {
        let a = [0.3, 0.4, 0.5];
        assert_relative_eq!(cosine_distance(&a, &a), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_cosine_distance_orthogonal() {
        assert_relative_eq!(cosine_distance(&[1.0, 0.0], &[0.0, 1.0]), 1.0);
    }

    #[test]
    fn test_cosine_distance_opposite() {
        assert_relative_eq!(cosine_distance(&[1.0, 0.0], &[-1.0, 0.0]), 2.0);
    }

    #[test]
    fn test_cosine_distance_ignores_magnitude() {
        assert_relative_eq!(
            cosine_distance(&[1.0, 1.0], &[5.0, 5.0]),
            0.0,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_cosine_distance_zero_vector() {
        assert_relative_eq!(cosine_distance(&[0.0, 0.0], &[1.0, 0.0]), 1.0);
    }

    #[test]
    fn test_centroid_mean() {
        let a = [1.0f32, 0.0];
        let b = [0.0f32, 1.0];
        let c = centroid([&a[..], &b[..]], 2);
        assert_relative_eq!(c[0], 0.5);
        assert_relative_eq!(c[1], 0.5);
    }

    #[test]
    fn test_centroid_empty() {
        assert_eq!(centroid(std::iter::empty(), 3), vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_check_embeddings_ok() {
        let obs = vec![observation(vec![1.0, 0.0]), observation(vec![0.0, 1.0])];
        assert_eq!(check_embeddings(&obs), Ok(2));
        assert_eq!(check_embeddings(&[]), Ok(0));
    }

    #[test]
    fn test_check_embeddings_dimension_mismatch() {
        let obs = vec![observation(vec![1.0, 0.0]), observation(vec![0.0, 1.0, 0.0])];
        assert_eq!(
            check_embeddings(&obs),
            Err(ClusteringError::DimensionMismatch {
                index: 1,
                expected: 2,
                found: 3
            })
        );
    }

    #[test]
    fn test_check_embeddings_empty_and_nan() {
        assert_eq!(
            check_embeddings(&[observation(vec![])]),
            Err(ClusteringError::EmptyEmbedding { index: 0 })
        );
        assert_eq!(
            check_embeddings(&[observation(vec![1.0]), observation(vec![f32::NAN])]),
            Err(ClusteringError::NonFiniteEmbedding { index: 1 })
        );
    }

    #[test]
    fn test_distance_matrix_symmetric_zero_diagonal() {
        let a = [1.0f32, 0.0];
        let b = [0.0f32, 1.0];
        let c = [1.0f32, 1.0];
        let m = distance_matrix(&[&a[..], &b[..], &c[..]]);
        assert_eq!(m.shape(), &[3, 3]);
        for i in 0..3 {
            assert_relative_eq!(m[[i, i]], 0.0);
            for j in 0..3 {
                assert_relative_eq!(m[[i, j]], m[[j, i]]);
            }
        }
        assert_relative_eq!(m[[0, 1]], 1.0);
    }

    #[test]
    fn test_distance_matrix_reports_each_row() {
        let a = [1.0f32, 0.0];
        let b = [0.0f32, 1.0];
        let c = [1.0f32, 1.0];
        let mut rows = Vec::new();
        let m = distance_matrix_with_progress(&[&a[..], &b[..], &c[..]], |done| rows.push(done));
        assert_eq!(rows, vec![1, 2, 3]);
        assert_eq!(m, distance_matrix(&[&a[..], &b[..], &c[..]]));
    }
}
