use std::io;

use thiserror::Error;

/// Error type for split configuration, fold generation, and fold persistence failures.
#[derive(Debug, Error)]
pub enum FoldError {
    #[error("invalid split spec: {0}")]
    InvalidSplitSpec(String),
    #[error(
        "split spec leaves an empty segment for k={k} (train={train}, valid={valid}, test={test} buckets)"
    )]
    EmptySegment {
        k: usize,
        train: usize,
        valid: usize,
        test: usize,
    },
    #[error("fold count must be at least 2, got {0}")]
    InvalidFoldCount(usize),
    #[error("points and labels differ in length ({points} points, {labels} labels)")]
    LengthMismatch { points: usize, labels: usize },
    #[error("fold store failure: {0}")]
    FoldStore(String),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
