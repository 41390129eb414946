//! Average-linkage agglomerative clustering with a distance cut-off.
//!
//! Builds the full dendrogram with the nearest-neighbour-chain algorithm
//! (O(n²) time on top of the O(n²) distance matrix) and keeps only merges
//! strictly below the threshold. Average linkage is reducible and
//! monotone, so those merges are exactly the ones the textbook
//! "merge the closest pair until it exceeds the threshold" loop performs.

use ndarray::Array2;

use crate::clustering::infrastructure::union_find;

/// One dendrogram step: the clusters holding elements `a` and `b`
/// joined at `distance`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Merge {
    pub a: usize,
    pub b: usize,
    pub distance: f64,
}

/// Clusters `n` elements given their symmetric distance matrix.
///
/// Returns a dense 0-based cluster index per element. Clusters are numbered
/// by their smallest element, so the partition is independent of input
/// order (barring exact distance ties) while the numbering is not.
pub fn cluster(distances: &Array2<f64>, threshold: f64) -> Vec<usize> {
    let n = distances.nrows();
    let mut parent: Vec<usize> = (0..n).collect();
    for merge in dendrogram(distances) {
        if merge.distance < threshold {
            union_find::union(&mut parent, merge.a, merge.b);
        }
    }
    union_find::dense_labels(&mut parent)
}

/// All `n - 1` merges of the average-linkage dendrogram, in the order the
/// chain discovers them (not sorted by distance).
pub fn dendrogram(distances: &Array2<f64>) -> Vec<Merge> {
    let n = distances.nrows();
    if n < 2 {
        return Vec::new();
    }

    // Slot i always holds the cluster that contains element i.
    let mut d = distances.clone();
    let mut size = vec![1usize; n];
    let mut active = vec![true; n];
    let mut remaining = n;
    let mut chain: Vec<usize> = Vec::with_capacity(n);
    let mut merges = Vec::with_capacity(n - 1);

    while remaining > 1 {
        if chain.is_empty() {
            let Some(start) = active.iter().position(|&a| a) else {
                break;
            };
            chain.push(start);
        }

        let tip = chain[chain.len() - 1];
        let prev = chain.len().checked_sub(2).map(|i| chain[i]);

        // Nearest active neighbour of the tip. The previous chain element
        // wins ties so reciprocal pairs are always detected.
        let mut best = prev;
        let mut best_d = prev.map_or(f64::INFINITY, |p| d[[tip, p]]);
        for k in 0..n {
            if k == tip || !active[k] {
                continue;
            }
            if d[[tip, k]] < best_d {
                best_d = d[[tip, k]];
                best = Some(k);
            }
        }
        let Some(nearest) = best else {
            break;
        };

        if Some(nearest) != prev {
            chain.push(nearest);
            continue;
        }

        chain.truncate(chain.len() - 2);
        let (keep, drop) = (tip.min(nearest), tip.max(nearest));
        merges.push(Merge {
            a: keep,
            b: drop,
            distance: best_d,
        });

        // Lance-Williams update for average linkage.
        let (size_keep, size_drop) = (size[keep] as f64, size[drop] as f64);
        let total = size_keep + size_drop;
        for k in 0..n {
            if !active[k] || k == keep || k == drop {
                continue;
            }
            let updated = (size_keep * d[[keep, k]] + size_drop * d[[drop, k]]) / total;
            d[[keep, k]] = updated;
            d[[k, keep]] = updated;
        }
        size[keep] += size[drop];
        active[drop] = false;
        remaining -= 1;
    }

    merges
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clustering::domain::distance::distance_matrix;
    use approx::assert_relative_eq;

    fn matrix(rows: &[&[f64]]) -> Array2<f64> {
        let n = rows.len();
        Array2::from_shape_fn((n, n), |(i, j)| rows[i][j])
    }

    /// Canonical form of a labelling: groups of element indices, sorted.
    fn partition(labels: &[usize]) -> Vec<Vec<usize>> {
        let k = labels.iter().max().map_or(0, |m| m + 1);
        let mut groups = vec![Vec::new(); k];
        for (i, &l) in labels.iter().enumerate() {
            groups[l].push(i);
        }
        groups.sort();
        groups
    }

    #[test]
    fn test_empty_and_single() {
        assert!(cluster(&Array2::zeros((0, 0)), 0.5).is_empty());
        assert_eq!(cluster(&Array2::zeros((1, 1)), 0.5), vec![0]);
    }

    #[test]
    fn test_two_well_separated_groups() {
        let m = matrix(&[
            &[0.0, 0.1, 0.9, 0.9],
            &[0.1, 0.0, 0.9, 0.9],
            &[0.9, 0.9, 0.0, 0.1],
            &[0.9, 0.9, 0.1, 0.0],
        ]);
        assert_eq!(cluster(&m, 0.45), vec![0, 0, 1, 1]);
    }

    #[test]
    fn test_threshold_is_strict() {
        let m = matrix(&[&[0.0, 0.45], &[0.45, 0.0]]);
        assert_eq!(cluster(&m, 0.45), vec![0, 1]);
        assert_eq!(cluster(&m, 0.46), vec![0, 0]);
    }

    #[test]
    fn test_average_not_single_linkage() {
        // 0-1 close, 2 is close to 1 but far from 0. Single linkage would
        // chain all three at 0.3; average linkage joins 2 at (0.8+0.3)/2.
        let m = matrix(&[&[0.0, 0.1, 0.8], &[0.1, 0.0, 0.3], &[0.8, 0.3, 0.0]]);
        assert_eq!(cluster(&m, 0.5), vec![0, 0, 1]);
        assert_eq!(cluster(&m, 0.6), vec![0, 0, 0]);
    }

    #[test]
    fn test_dendrogram_heights() {
        let m = matrix(&[&[0.0, 0.1, 0.8], &[0.1, 0.0, 0.3], &[0.8, 0.3, 0.0]]);
        let mut heights: Vec<f64> = dendrogram(&m).iter().map(|m| m.distance).collect();
        heights.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(heights.len(), 2);
        assert_relative_eq!(heights[0], 0.1);
        assert_relative_eq!(heights[1], 0.55);
    }

    #[test]
    fn test_labels_numbered_by_smallest_member() {
        let m = matrix(&[
            &[0.0, 0.9, 0.1],
            &[0.9, 0.0, 0.9],
            &[0.1, 0.9, 0.0],
        ]);
        assert_eq!(cluster(&m, 0.45), vec![0, 1, 0]);
    }

    #[test]
    fn test_permutation_yields_same_partition() {
        let points: Vec<[f32; 3]> = vec![
            [1.0, 0.05, 0.0],
            [0.0, 1.0, 0.1],
            [0.98, 0.1, 0.02],
            [0.05, 0.0, 1.0],
            [0.1, 0.97, 0.0],
            [0.0, 0.1, 0.95],
            [0.95, 0.0, 0.1],
        ];
        let order: Vec<usize> = vec![4, 0, 6, 2, 5, 1, 3];

        let forward: Vec<&[f32]> = points.iter().map(|p| &p[..]).collect();
        let permuted: Vec<&[f32]> = order.iter().map(|&i| &points[i][..]).collect();

        let labels_forward = cluster(&distance_matrix(&forward), 0.45);
        let labels_permuted = cluster(&distance_matrix(&permuted), 0.45);

        // Map permuted labels back to original element indices.
        let mut restored = vec![0usize; points.len()];
        for (pos, &orig) in order.iter().enumerate() {
            restored[orig] = labels_permuted[pos];
        }
        assert_eq!(partition(&labels_forward), partition(&restored));
        assert_eq!(partition(&labels_forward).len(), 3);
    }
}
