//! Label-balance metric used to pick a bucket for each group.
//!
//! A bucket's imbalance is the distance between its label-count vector and the
//! uniform vector of the same mass, after both are scaled to unit length. The
//! bucket score combines how much a candidate group improves that imbalance
//! with how full the bucket already is. Lower scores are more desirable.

use crate::constants::metric::{BUCKET_LEN_IMPORTANCE, DIST_IMPORTANCE, EMPTY_BUCKET_SCORE};
use crate::types::{PointIndex, Score};

/// Sorted set of the distinct labels observed in one label sequence.
///
/// Fixes the coordinate order of every label-distribution vector computed
/// during a split.
#[derive(Clone, Debug)]
pub struct LabelSpace<'a, L> {
    labels: Vec<&'a L>,
}

impl<'a, L: Ord> LabelSpace<'a, L> {
    /// Collect the distinct labels of `labels` in sorted order.
    pub fn from_labels(labels: &'a [L]) -> Self {
        let mut distinct: Vec<&L> = labels.iter().collect();
        distinct.sort();
        distinct.dedup();
        Self { labels: distinct }
    }

    /// Number of distinct labels.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// True when no labels were observed.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Coordinate of `label`, if it belongs to this space.
    pub fn position(&self, label: &L) -> Option<usize> {
        self.labels.binary_search(&label).ok()
    }

    /// Distinct labels in coordinate order.
    pub fn labels(&self) -> impl Iterator<Item = &'a L> + '_ {
        self.labels.iter().copied()
    }

    /// Count of each distinct label among `indices`.
    ///
    /// Labels outside the space are ignored.
    pub fn distribution(&self, indices: &[PointIndex], labels: &[L]) -> Vec<f64> {
        let mut counts = vec![0.0; self.labels.len()];
        for &idx in indices {
            if let Some(pos) = labels.get(idx).and_then(|label| self.position(label)) {
                counts[pos] += 1.0;
            }
        }
        counts
    }
}

/// Euclidean norm of `values`.
pub fn norm(values: &[f64]) -> f64 {
    values.iter().map(|v| v * v).sum::<f64>().sqrt()
}

/// Scale `values` to unit length; `None` for the zero vector.
pub fn normalize(values: &[f64]) -> Option<Vec<f64>> {
    let n = norm(values);
    if n == 0.0 {
        return None;
    }
    Some(values.iter().map(|v| v / n).collect())
}

/// Euclidean distance between two equally long vectors.
pub fn euclidean_distance(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len());
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}

/// Distance between `a` and `b` after each is scaled to unit length.
///
/// A zero vector on either side yields `0.0`.
pub fn normalized_distance(a: &[f64], b: &[f64]) -> f64 {
    match (normalize(a), normalize(b)) {
        (Some(a), Some(b)) => euclidean_distance(&a, &b),
        _ => 0.0,
    }
}

/// Vector with the same total mass as `distribution`, spread evenly.
pub fn uniform_like(distribution: &[f64]) -> Vec<f64> {
    if distribution.is_empty() {
        return Vec::new();
    }
    let mass: f64 = distribution.iter().sum();
    vec![mass / distribution.len() as f64; distribution.len()]
}

/// Class imbalance of a label-count vector, in `[0, 1]`.
pub fn imbalance(distribution: &[f64]) -> f64 {
    normalized_distance(distribution, &uniform_like(distribution)) / 2.0
}

/// Score of adding `group` to `bucket`; lower is more desirable.
///
/// An empty bucket always scores `0`. Otherwise the score weighs the bucket's
/// fill ratio (`len(bucket) / max_bucket_len`) equally against how much the
/// group improves the bucket's label balance, mapped so that the largest
/// improvement gives the smallest value.
pub fn bucket_score<L: Ord>(
    group: &[PointIndex],
    bucket: &[PointIndex],
    labels: &[L],
    space: &LabelSpace<'_, L>,
    max_bucket_len: usize,
) -> Score {
    if bucket.is_empty() {
        return EMPTY_BUCKET_SCORE;
    }

    let bucket_distr = space.distribution(bucket, labels);
    let bucket_only_imbalance = imbalance(&bucket_distr);

    let group_distr = space.distribution(group, labels);
    let joint_distr: Vec<f64> = bucket_distr
        .iter()
        .zip(&group_distr)
        .map(|(b, g)| b + g)
        .collect();
    let joint_imbalance = imbalance(&joint_distr);

    // The raw improvement lies in [-1, 1]; map it to [0, 1] with larger
    // improvements landing closer to 0.
    let dist_improvement = 1.0 - ((bucket_only_imbalance - joint_imbalance) / 2.0 + 0.5);
    let norm_bucket_len = if max_bucket_len == 0 {
        0.0
    } else {
        bucket.len() as f64 / max_bucket_len as f64
    };

    BUCKET_LEN_IMPORTANCE * norm_bucket_len + DIST_IMPORTANCE * dist_improvement
}
