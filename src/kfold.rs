//! Grouped, label-balanced k-fold splitting.
//!
//! `GroupedKFold` assigns every group of points (for example, every tweet of
//! one user) to one of `k` buckets, greedily picking the bucket that best
//! balances labels without letting any bucket run away in size. The frozen
//! buckets are then rotated so that each fold sees a different
//! train/valid/test arrangement of the same buckets.
//!
//! Because groups never straddle buckets, no group key appears in more than
//! one partition of any fold.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::Hash;
use tracing::{debug, info};

use crate::constants::config::MIN_K;
use crate::distance::{LabelSpace, bucket_score};
use crate::errors::FoldError;
use crate::grouping::groups_by_size_desc;
use crate::rotation::CircularRotations;
use crate::splits::{ALL_ROLES, FoldRole, SegmentSizes, SplitSpec};
use crate::types::{BucketId, PointIndex};

/// Train/validation/test indices of one fold.
///
/// Persisted as an object with exactly the keys `train`, `valid`, and `test`,
/// each an array of point indices.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KFoldIndices {
    /// Indices of training points.
    pub train: Vec<PointIndex>,
    /// Indices of validation points.
    pub valid: Vec<PointIndex>,
    /// Indices of test points.
    pub test: Vec<PointIndex>,
}

/// Borrowed elements of one fold, selected from a caller sequence.
#[derive(Clone, Debug, PartialEq)]
pub struct FoldSlices<'a, T> {
    /// Training elements.
    pub train: Vec<&'a T>,
    /// Validation elements.
    pub valid: Vec<&'a T>,
    /// Test elements.
    pub test: Vec<&'a T>,
}

impl KFoldIndices {
    /// Indices assigned to `role`.
    pub fn indices(&self, role: FoldRole) -> &[PointIndex] {
        match role {
            FoldRole::Train => &self.train,
            FoldRole::Valid => &self.valid,
            FoldRole::Test => &self.test,
        }
    }

    /// Total number of indices across all three roles.
    pub fn len(&self) -> usize {
        self.train.len() + self.valid.len() + self.test.len()
    }

    /// True when every role is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check that the three roles together hold every index in `0..len`
    /// exactly once.
    pub fn ensure_partition(&self, len: usize) -> Result<(), FoldError> {
        let mut seen = vec![false; len];
        for role in ALL_ROLES {
            for &idx in self.indices(role) {
                match seen.get_mut(idx) {
                    Some(slot) if !*slot => *slot = true,
                    Some(_) => {
                        return Err(FoldError::FoldStore(format!(
                            "index {idx} appears more than once in the fold"
                        )));
                    }
                    None => {
                        return Err(FoldError::FoldStore(format!(
                            "index {idx} out of range for {len} points"
                        )));
                    }
                }
            }
        }
        let missing = seen.iter().filter(|&&hit| !hit).count();
        if missing > 0 {
            return Err(FoldError::FoldStore(format!(
                "fold covers {} of {len} points",
                len - missing
            )));
        }
        Ok(())
    }

    /// Pick the elements of `items` referenced by this fold.
    pub fn select<'a, T>(&self, items: &'a [T]) -> Result<FoldSlices<'a, T>, FoldError> {
        let pick = |indices: &[PointIndex]| -> Result<Vec<&'a T>, FoldError> {
            indices
                .iter()
                .map(|&idx| {
                    items.get(idx).ok_or_else(|| {
                        FoldError::FoldStore(format!(
                            "fold index {idx} out of range for {} items",
                            items.len()
                        ))
                    })
                })
                .collect()
        };
        Ok(FoldSlices {
            train: pick(&self.train)?,
            valid: pick(&self.valid)?,
            test: pick(&self.test)?,
        })
    }
}

/// K-fold splitter interface.
pub trait KFold<P, L> {
    /// Number of folds produced per split.
    fn k(&self) -> usize;
    /// Split `points` (with aligned `labels`) into `k` folds according to `spec`.
    fn split(&self, points: &[P], labels: &[L], spec: &SplitSpec) -> Result<Folds, FoldError>;
}

/// K-fold splitter that keeps every group in a single bucket.
#[derive(Clone)]
pub struct GroupedKFold<F> {
    k: usize,
    key_extractor: F,
}

impl<F> fmt::Debug for GroupedKFold<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GroupedKFold").field("k", &self.k).finish()
    }
}

impl<F> GroupedKFold<F> {
    /// Create a splitter with `k` folds grouping points by `key_extractor`.
    pub fn new(k: usize, key_extractor: F) -> Result<Self, FoldError> {
        if k < MIN_K {
            return Err(FoldError::InvalidFoldCount(k));
        }
        Ok(Self { k, key_extractor })
    }

    /// Greedily assign groups to `k` buckets.
    ///
    /// Groups are visited largest first (discovery order among equal sizes)
    /// and each goes wholesale to the bucket with the lowest
    /// [`bucket_score`]. Equal scores resolve to the lowest bucket id.
    pub fn assign_buckets<P, L, K>(
        &self,
        points: &[P],
        labels: &[L],
    ) -> Result<Vec<Vec<PointIndex>>, FoldError>
    where
        F: Fn(&P) -> K,
        K: Hash + Eq,
        L: Ord,
    {
        if points.len() != labels.len() {
            return Err(FoldError::LengthMismatch {
                points: points.len(),
                labels: labels.len(),
            });
        }

        let groups = groups_by_size_desc(points, &self.key_extractor);
        let space = LabelSpace::from_labels(labels);
        let max_bucket_len = points.len();
        info!(
            k = self.k,
            points = points.len(),
            groups = groups.len(),
            labels = space.len(),
            "splitting points into buckets"
        );

        let mut buckets: Vec<Vec<PointIndex>> = vec![Vec::new(); self.k];
        for group in groups {
            let target = lowest_score_bucket(&buckets, |bucket| {
                bucket_score(&group.indices, bucket, labels, &space, max_bucket_len)
            });
            debug!(bucket = target, group_len = group.len(), "assigned group");
            buckets[target].extend(group.indices);
        }

        let sizes: Vec<usize> = buckets.iter().map(Vec::len).collect();
        info!(k = self.k, bucket_sizes = ?sizes, "split points into buckets");
        Ok(buckets)
    }
}

fn lowest_score_bucket(
    buckets: &[Vec<PointIndex>],
    score: impl Fn(&[PointIndex]) -> f64,
) -> BucketId {
    let mut target = 0;
    let mut best = f64::INFINITY;
    for (id, bucket) in buckets.iter().enumerate() {
        let candidate = score(bucket.as_slice());
        if candidate < best {
            best = candidate;
            target = id;
        }
    }
    target
}

impl<P, L, K, F> KFold<P, L> for GroupedKFold<F>
where
    F: Fn(&P) -> K,
    K: Hash + Eq,
    L: Ord,
{
    fn k(&self) -> usize {
        self.k
    }

    fn split(&self, points: &[P], labels: &[L], spec: &SplitSpec) -> Result<Folds, FoldError> {
        let segments = spec.segments(self.k)?;
        let buckets = self.assign_buckets(points, labels)?;
        Ok(Folds::new(buckets, segments))
    }
}

/// Lazy sequence of the `k` folds built from one frozen bucket assignment.
#[derive(Clone, Debug)]
pub struct Folds {
    buckets: Vec<Vec<PointIndex>>,
    segments: SegmentSizes,
    rotations: CircularRotations,
}

impl Folds {
    fn new(buckets: Vec<Vec<PointIndex>>, segments: SegmentSizes) -> Self {
        let rotations = CircularRotations::new(buckets.len());
        Self {
            buckets,
            segments,
            rotations,
        }
    }

    /// Frozen bucket contents, indexed by bucket id.
    pub fn buckets(&self) -> &[Vec<PointIndex>] {
        &self.buckets
    }

    /// Bucket counts per role, identical for every fold.
    pub fn segments(&self) -> SegmentSizes {
        self.segments
    }

    fn flatten_buckets(&self, bucket_ids: &[BucketId]) -> Vec<PointIndex> {
        bucket_ids
            .iter()
            .flat_map(|&id| self.buckets[id].iter().copied())
            .collect()
    }
}

impl Iterator for Folds {
    type Item = KFoldIndices;

    fn next(&mut self) -> Option<Self::Item> {
        let rotation = self.rotations.next()?;
        let segments = self.segments;
        Some(KFoldIndices {
            train: self.flatten_buckets(&rotation[segments.range_of(FoldRole::Train)]),
            valid: self.flatten_buckets(&rotation[segments.range_of(FoldRole::Valid)]),
            test: self.flatten_buckets(&rotation[segments.range_of(FoldRole::Test)]),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.rotations.size_hint()
    }
}

impl ExactSizeIterator for Folds {}

#[cfg(test)]
mod tests {
    use super::*;

    fn half_quarter_quarter() -> SplitSpec {
        SplitSpec::new(0.5, 0.25, 0.25).unwrap()
    }

    #[test]
    fn rejects_fold_count_below_two() {
        let err = GroupedKFold::new(1, |p: &u32| *p).unwrap_err();
        assert!(matches!(err, FoldError::InvalidFoldCount(1)));
    }

    #[test]
    fn rejects_misaligned_labels() {
        let splitter = GroupedKFold::new(4, |p: &u32| *p).unwrap();
        let err = splitter
            .split(&[1, 2, 3], &[0, 1], &half_quarter_quarter())
            .unwrap_err();
        assert!(matches!(
            err,
            FoldError::LengthMismatch {
                points: 3,
                labels: 2
            }
        ));
    }

    #[test]
    fn empty_segment_fails_before_bucketing() {
        let splitter = GroupedKFold::new(3, |p: &u32| *p).unwrap();
        let spec = SplitSpec::new(0.1, 0.1, 0.8).unwrap();
        // Misaligned input would fail in bucketing; the split spec check runs first.
        let err = splitter.split(&[1, 2], &[0], &spec).unwrap_err();
        assert!(matches!(err, FoldError::EmptySegment { train: 0, .. }));
    }

    #[test]
    fn four_equal_groups_fill_one_bucket_each_and_rotate() {
        // (user, label) pairs: four users, each with one label of each class.
        let points = vec![0u32, 0, 1, 1, 2, 2, 3, 3];
        let labels = vec![0, 1, 0, 1, 0, 1, 0, 1];
        let splitter = GroupedKFold::new(4, |p: &u32| *p).unwrap();
        let folds = splitter
            .split(&points, &labels, &half_quarter_quarter())
            .unwrap();
        assert_eq!(
            folds.buckets(),
            &[vec![0, 1], vec![2, 3], vec![4, 5], vec![6, 7]]
        );

        let folds: Vec<_> = folds.collect();
        assert_eq!(folds.len(), 4);
        assert_eq!(
            folds[0],
            KFoldIndices {
                train: vec![0, 1, 2, 3],
                valid: vec![4, 5],
                test: vec![6, 7],
            }
        );
        assert_eq!(
            folds[1],
            KFoldIndices {
                train: vec![2, 3, 4, 5],
                valid: vec![6, 7],
                test: vec![0, 1],
            }
        );
        assert_eq!(folds[3].train, vec![6, 7, 0, 1]);
        assert_eq!(folds[3].valid, vec![2, 3]);
        assert_eq!(folds[3].test, vec![4, 5]);
    }

    #[test]
    fn empty_input_yields_k_empty_folds() {
        let points: Vec<u32> = Vec::new();
        let labels: Vec<u8> = Vec::new();
        let splitter = GroupedKFold::new(4, |p: &u32| *p).unwrap();
        let folds: Vec<_> = splitter
            .split(&points, &labels, &half_quarter_quarter())
            .unwrap()
            .collect();
        assert_eq!(folds.len(), 4);
        assert!(folds.iter().all(KFoldIndices::is_empty));
    }

    #[test]
    fn oversized_group_is_kept_whole() {
        let mut points = vec![7u32; 20];
        points.extend([1, 2, 3]);
        let labels: Vec<u8> = (0..points.len()).map(|i| (i % 2) as u8).collect();
        let splitter = GroupedKFold::new(4, |p: &u32| *p).unwrap();
        let folds = splitter
            .split(&points, &labels, &half_quarter_quarter())
            .unwrap();
        assert_eq!(folds.buckets()[0], (0..20).collect::<Vec<_>>());
        assert!(folds.buckets().iter().skip(1).all(|b| b.len() == 1));
    }

    #[test]
    fn tie_goes_to_lowest_bucket_id() {
        let buckets = vec![vec![1], vec![2], vec![3]];
        assert_eq!(lowest_score_bucket(&buckets, |_| 0.25), 0);
        assert_eq!(
            lowest_score_bucket(&buckets, |b| if b[0] == 1 { 0.5 } else { 0.25 }),
            1
        );
    }

    #[test]
    fn balancing_prefers_bucket_missing_a_label() {
        // Two single-label groups seed buckets 0 and 1 and the mixed pair lands
        // in the still-empty bucket 2. The last single point then goes where it
        // balances labels best.
        let points = vec![10u32, 10, 10, 20, 20, 20, 30, 30, 40];
        let labels = vec![1, 1, 1, 0, 0, 0, 1, 0, 0];
        let splitter = GroupedKFold::new(3, |p: &u32| *p).unwrap();
        let buckets = splitter.assign_buckets(&points, &labels).unwrap();
        assert_eq!(buckets[0], vec![0, 1, 2, 8]);
        assert_eq!(buckets[1], vec![3, 4, 5]);
        assert_eq!(buckets[2], vec![6, 7]);
        // A `0` moves the all-positive bucket 0 from [0, 3] to [1, 3].
        assert_eq!(buckets.iter().position(|b| b.contains(&8)), Some(0));
    }

    #[test]
    fn select_picks_elements_and_rejects_bad_indices() {
        let fold = KFoldIndices {
            train: vec![2, 0],
            valid: vec![1],
            test: vec![],
        };
        let items = ["a", "b", "c"];
        let slices = fold.select(&items).unwrap();
        assert_eq!(slices.train, vec![&"c", &"a"]);
        assert_eq!(slices.valid, vec![&"b"]);
        assert!(slices.test.is_empty());

        let bad = KFoldIndices {
            train: vec![5],
            ..KFoldIndices::default()
        };
        assert!(matches!(bad.select(&items), Err(FoldError::FoldStore(_))));
    }

    #[test]
    fn ensure_partition_checks_coverage_and_duplicates() {
        let fold = KFoldIndices {
            train: vec![0, 3],
            valid: vec![1],
            test: vec![2],
        };
        assert!(fold.ensure_partition(4).is_ok());

        let short = fold.ensure_partition(6).unwrap_err();
        assert!(matches!(short, FoldError::FoldStore(msg) if msg.contains("covers 4 of 6")));
        let out_of_range = fold.ensure_partition(3).unwrap_err();
        assert!(matches!(out_of_range, FoldError::FoldStore(msg) if msg.contains("out of range")));

        let duplicated = KFoldIndices {
            test: vec![0],
            ..fold.clone()
        };
        assert!(matches!(
            duplicated.ensure_partition(4),
            Err(FoldError::FoldStore(msg)) if msg.contains("more than once")
        ));
    }

    #[test]
    fn fold_indices_round_trip_through_json_with_exact_keys() {
        let fold = KFoldIndices {
            train: vec![0, 1],
            valid: vec![2],
            test: vec![3],
        };
        let value = serde_json::to_value(&fold).unwrap();
        let keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys.len(), 3);
        assert!(keys.iter().all(|k| ["train", "valid", "test"].contains(&k.as_str())));

        assert!(serde_json::from_str::<KFoldIndices>(r#"{"train":[1],"valid":[2]}"#).is_err());
        assert!(
            serde_json::from_str::<KFoldIndices>(r#"{"train":[1],"valid":2,"test":[3]}"#)
                .is_err()
        );
    }
}
