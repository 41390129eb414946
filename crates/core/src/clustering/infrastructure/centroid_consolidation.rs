//! Second phase of the batch resolver: joins clusters whose centroids are
//! close.
//!
//! One greedy pass over a fixed snapshot of centroids, visiting clusters in
//! ascending id order. Each unclaimed cluster opens a group and claims every
//! unclaimed cluster within `merge_threshold` of any group member, so
//! A-B-C chains join through B even when A-C alone is too far apart.
//! Centroids are never recomputed during the pass and the pass is not
//! repeated, so the result is a heuristic and not a fixed point.

use std::collections::VecDeque;

use crate::clustering::domain::distance::{centroid, cosine_distance};

/// Mean embedding per cluster id `0..cluster_count`.
pub fn cluster_centroids(
    embeddings: &[&[f32]],
    labels: &[usize],
    cluster_count: usize,
    dimensions: usize,
) -> Vec<Vec<f32>> {
    let mut members: Vec<Vec<&[f32]>> = vec![Vec::new(); cluster_count];
    for (embedding, &label) in embeddings.iter().zip(labels) {
        members[label].push(*embedding);
    }
    members
        .into_iter()
        .map(|m| centroid(m, dimensions))
        .collect()
}

/// Final group index for every cluster id, dense and 0-based, numbered in
/// the order groups are opened.
pub fn consolidate(centroids: &[Vec<f32>], merge_threshold: f64) -> Vec<usize> {
    let k = centroids.len();
    let mut group_of: Vec<Option<usize>> = vec![None; k];
    let mut groups = 0usize;

    for anchor in 0..k {
        if group_of[anchor].is_some() {
            continue;
        }
        let group = groups;
        groups += 1;
        group_of[anchor] = Some(group);

        let mut frontier = VecDeque::from([anchor]);
        while let Some(member) = frontier.pop_front() {
            for other in 0..k {
                if group_of[other].is_some() {
                    continue;
                }
                let distance = cosine_distance(&centroids[member], &centroids[other]);
                if distance < merge_threshold {
                    log::debug!(
                        "Merging cluster {other} into group {group} via cluster {member} (distance {distance:.3})"
                    );
                    group_of[other] = Some(group);
                    frontier.push_back(other);
                }
            }
        }
    }

    group_of.into_iter().map(|g| g.unwrap_or_default()).collect()
}
