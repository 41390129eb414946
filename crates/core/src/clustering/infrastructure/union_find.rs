//! Disjoint-set helpers shared by the clustering phases.

/// Find root of element `i` with path halving for amortized near-O(1).
pub fn find(parent: &mut [usize], mut i: usize) -> usize {
    while parent[i] != i {
        parent[i] = parent[parent[i]];
        i = parent[i];
    }
    i
}

/// Merge the sets containing `a` and `b`.
pub fn union(parent: &mut [usize], a: usize, b: usize) {
    let ra = find(parent, a);
    let rb = find(parent, b);
    if ra != rb {
        parent[ra] = rb;
    }
}

/// Dense 0-based set index per element.
///
/// Sets are numbered by their smallest element, so the numbering is a
/// pure function of the partition and the element order.
pub fn dense_labels(parent: &mut [usize]) -> Vec<usize> {
    let n = parent.len();
    let mut root_label: Vec<Option<usize>> = vec![None; n];
    let mut labels = Vec::with_capacity(n);
    let mut next = 0;
    for i in 0..n {
        let root = find(parent, i);
        let label = *root_label[root].get_or_insert_with(|| {
            next += 1;
            next - 1
        });
        labels.push(label);
    }
    labels
}
