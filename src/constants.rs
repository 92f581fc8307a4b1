/// Constants used by the bucket-assignment metric.
pub mod metric {
    /// Weight of the bucket-size fairness term in the bucket score.
    pub const BUCKET_LEN_IMPORTANCE: f64 = 0.5;
    /// Weight of the label-balance improvement term in the bucket score.
    pub const DIST_IMPORTANCE: f64 = 0.5;
    /// Score given to an empty bucket; always the most desirable target.
    pub const EMPTY_BUCKET_SCORE: f64 = 0.0;
}

/// Constants used by fold persistence.
pub mod store {
    /// Extension of persisted fold files (`<k>.json`).
    pub const FOLD_FILE_EXTENSION: &str = "json";
    /// Suffix appended to the fold file while it is being written.
    pub const TEMP_FILE_SUFFIX: &str = "tmp";
    /// Default directory for persisted fold files.
    pub const DEFAULT_FOLD_DIR: &str = ".kfolds";
}

/// Constants used by k-fold configuration defaults.
pub mod config {
    /// Default number of folds.
    pub const DEFAULT_K: usize = 10;
    /// Default train fraction.
    pub const DEFAULT_TRAIN: f64 = 0.8;
    /// Default validation fraction.
    pub const DEFAULT_VALID: f64 = 0.1;
    /// Default test fraction.
    pub const DEFAULT_TEST: f64 = 0.1;
    /// Smallest usable fold count.
    pub const MIN_K: usize = 2;
    /// Tolerance used when parsing split specs from the command line.
    pub const CLI_SUM_TOLERANCE: f64 = 1e-9;
}
