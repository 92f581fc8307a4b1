use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::constants::config::{DEFAULT_K, MIN_K};
use crate::constants::store::DEFAULT_FOLD_DIR;
use crate::errors::FoldError;
use crate::splits::{SegmentSizes, SplitSpec};

/// Top-level k-fold generation configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KFoldConfig {
    /// Number of folds (and buckets).
    pub k: usize,
    /// Fractions of buckets assigned to train/valid/test in every fold.
    pub split: SplitSpec,
    /// Directory holding persisted fold files.
    pub fold_dir: PathBuf,
}

impl Default for KFoldConfig {
    fn default() -> Self {
        Self {
            k: DEFAULT_K,
            split: SplitSpec::default(),
            fold_dir: PathBuf::from(DEFAULT_FOLD_DIR),
        }
    }
}

impl KFoldConfig {
    /// Check that `k` is usable and leaves every segment non-empty.
    pub fn validate(&self) -> Result<SegmentSizes, FoldError> {
        if self.k < MIN_K {
            return Err(FoldError::InvalidFoldCount(self.k));
        }
        self.split.segments(self.k)
    }
}
