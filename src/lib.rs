#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

/// Command-line runner for fold generation.
pub mod app;
/// K-fold configuration types.
pub mod config;
/// Centralized constants used across the splitter, store, and config.
pub mod constants;
/// Staged tweet and labelled example types.
pub mod data;
/// Label-balance metric driving bucket assignment.
pub mod distance;
/// Index grouping helpers.
pub mod grouping;
/// Grouped k-fold splitter and fold index types.
pub mod kfold;
/// Per-fold label distribution summaries.
pub mod metrics;
/// Circular bucket rotations.
pub mod rotation;
/// Split specs and segment sizes.
pub mod splits;
/// Fold persistence.
pub mod store;
/// Shared type aliases.
pub mod types;

mod errors;

pub use config::KFoldConfig;
pub use data::{Example, Tweet, split_columns};
pub use errors::FoldError;
pub use kfold::{FoldSlices, Folds, GroupedKFold, KFold, KFoldIndices};
pub use metrics::{FoldSummary, summarize_fold};
pub use splits::{FoldRole, SegmentSizes, SplitSpec};
pub use store::FoldStore;
pub use types::{BucketId, PointIndex, Score, TweetId, UserId};
