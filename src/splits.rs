use serde::{Deserialize, Serialize};
use std::ops::Range;

use crate::constants::config::{DEFAULT_TEST, DEFAULT_TRAIN, DEFAULT_VALID};
use crate::errors::FoldError;

/// Role a bucket plays within one fold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FoldRole {
    /// Training partition.
    Train,
    /// Validation partition.
    Valid,
    /// Test partition.
    Test,
}

/// Canonical iteration order of fold roles.
pub const ALL_ROLES: [FoldRole; 3] = [FoldRole::Train, FoldRole::Valid, FoldRole::Test];

/// Fractions of buckets given to train, validation, and test.
///
/// Construct through [`SplitSpec::new`], which rejects fractions outside
/// `[0, 1]` and triples whose sum is not exactly `1.0`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct SplitSpec {
    train: f64,
    valid: f64,
    test: f64,
}

impl Default for SplitSpec {
    fn default() -> Self {
        Self {
            train: DEFAULT_TRAIN,
            valid: DEFAULT_VALID,
            test: DEFAULT_TEST,
        }
    }
}

impl<'de> Deserialize<'de> for SplitSpec {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw {
            train: f64,
            valid: f64,
            test: f64,
        }
        let raw = Raw::deserialize(deserializer)?;
        SplitSpec::new(raw.train, raw.valid, raw.test).map_err(serde::de::Error::custom)
    }
}

impl SplitSpec {
    /// Validate and build a split spec.
    pub fn new(train: f64, valid: f64, test: f64) -> Result<Self, FoldError> {
        for (name, value) in [("train", train), ("valid", valid), ("test", test)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(FoldError::InvalidSplitSpec(format!(
                    "{name} fraction {value} is outside [0, 1]"
                )));
            }
        }
        let sum = train + valid + test;
        if sum != 1.0 {
            return Err(FoldError::InvalidSplitSpec(format!(
                "fractions must sum to 1, got {sum} (train={train}, valid={valid}, test={test})"
            )));
        }
        Ok(Self { train, valid, test })
    }

    /// Build a split spec from fractions whose sum is within `tolerance` of `1`.
    ///
    /// The test fraction is snapped to `1 - (train + valid)` so the result
    /// passes the exact check of [`SplitSpec::new`].
    pub fn with_tolerance(
        train: f64,
        valid: f64,
        test: f64,
        tolerance: f64,
    ) -> Result<Self, FoldError> {
        let sum = train + valid + test;
        if sum.is_nan() || (sum - 1.0).abs() > tolerance {
            return Err(FoldError::InvalidSplitSpec(format!(
                "fractions must sum to 1, got {sum:.6} (train={train}, valid={valid}, test={test})"
            )));
        }
        if !(0.0..=1.0).contains(&test) {
            return Err(FoldError::InvalidSplitSpec(format!(
                "test fraction {test} is outside [0, 1]"
            )));
        }
        Self::new(train, valid, 1.0 - (train + valid))
    }

    /// Train fraction.
    pub fn train(&self) -> f64 {
        self.train
    }

    /// Validation fraction.
    pub fn valid(&self) -> f64 {
        self.valid
    }

    /// Test fraction.
    pub fn test(&self) -> f64 {
        self.test
    }

    /// Translate fractions into bucket counts for `k` buckets.
    ///
    /// `valid_start = round(k * train)` and `test_start = round(valid_start + k * valid)`,
    /// rounding half to even. Every segment must hold at least one bucket.
    pub fn segments(&self, k: usize) -> Result<SegmentSizes, FoldError> {
        let kf = k as f64;
        let valid_start = (kf * self.train).round_ties_even() as usize;
        let test_start = (valid_start as f64 + kf * self.valid).round_ties_even() as usize;

        let train = valid_start;
        let valid = test_start.saturating_sub(valid_start);
        let test = k.saturating_sub(test_start);
        if train == 0 || valid == 0 || test == 0 || test_start > k {
            return Err(FoldError::EmptySegment {
                k,
                train,
                valid,
                test,
            });
        }
        Ok(SegmentSizes { train, valid, test })
    }
}

/// Number of buckets assigned to each role in every fold.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SegmentSizes {
    /// Buckets in the train segment.
    pub train: usize,
    /// Buckets in the validation segment.
    pub valid: usize,
    /// Buckets in the test segment.
    pub test: usize,
}

impl SegmentSizes {
    /// Total bucket count (`k`).
    pub fn total(&self) -> usize {
        self.train + self.valid + self.test
    }

    /// Offset of the first validation bucket within a rotation.
    pub fn valid_start(&self) -> usize {
        self.train
    }

    /// Offset of the first test bucket within a rotation.
    pub fn test_start(&self) -> usize {
        self.train + self.valid
    }

    /// Bucket count for `role`.
    pub fn size_of(&self, role: FoldRole) -> usize {
        match role {
            FoldRole::Train => self.train,
            FoldRole::Valid => self.valid,
            FoldRole::Test => self.test,
        }
    }

    /// Positions within a rotation occupied by `role`.
    pub fn range_of(&self, role: FoldRole) -> Range<usize> {
        match role {
            FoldRole::Train => 0..self.valid_start(),
            FoldRole::Valid => self.valid_start()..self.test_start(),
            FoldRole::Test => self.test_start()..self.total(),
        }
    }
}
