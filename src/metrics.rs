use std::collections::BTreeMap;
use std::fmt;

use crate::errors::FoldError;
use crate::kfold::KFoldIndices;
use crate::splits::{ALL_ROLES, FoldRole};
use crate::types::PointIndex;

/// Per-label shares of one partition and how far apart the extremes are.
#[derive(Clone, Debug, PartialEq)]
pub struct LabelSkew<L> {
    /// Number of labelled examples counted.
    pub total: usize,
    /// Smallest per-label count.
    pub min: usize,
    /// Largest per-label count.
    pub max: usize,
    /// `max / min`; `1.0` for a perfectly balanced partition.
    pub ratio: f64,
    /// One entry per label, in label order.
    pub per_label: Vec<LabelShare<L>>,
}

/// Count and share of one label within a partition.
#[derive(Clone, Debug, PartialEq)]
pub struct LabelShare<L> {
    /// The label.
    pub label: L,
    /// Examples carrying the label.
    pub count: usize,
    /// `count / total`.
    pub share: f64,
}

/// Share of each label in `counts`; `None` when there are no labels.
pub fn label_skew<L: Ord + Clone>(counts: &BTreeMap<L, usize>) -> Option<LabelSkew<L>> {
    let min = *counts.values().min()?;
    let max = *counts.values().max()?;
    let total: usize = counts.values().sum();
    let ratio = if min == 0 {
        f64::INFINITY
    } else {
        max as f64 / min as f64
    };
    let per_label = counts
        .iter()
        .map(|(label, &count)| LabelShare {
            label: label.clone(),
            count,
            share: if total == 0 {
                0.0
            } else {
                count as f64 / total as f64
            },
        })
        .collect();
    Some(LabelSkew {
        total,
        min,
        max,
        ratio,
        per_label,
    })
}

/// Count labels at `indices`.
pub fn label_counts<L: Ord + Clone>(
    indices: &[PointIndex],
    labels: &[L],
) -> Result<BTreeMap<L, usize>, FoldError> {
    let mut counts = BTreeMap::new();
    for &idx in indices {
        let label = labels.get(idx).ok_or_else(|| {
            FoldError::FoldStore(format!(
                "fold index {idx} out of range for {} labels",
                labels.len()
            ))
        })?;
        *counts.entry(label.clone()).or_insert(0) += 1;
    }
    Ok(counts)
}

/// Example count and label balance of one role within a fold.
#[derive(Clone, Debug, PartialEq)]
pub struct RoleSummary<L> {
    /// Role being summarized.
    pub role: FoldRole,
    /// Number of examples in the role.
    pub examples: usize,
    /// Examples per label.
    pub counts: BTreeMap<L, usize>,
    /// Label shares; `None` for an empty role.
    pub skew: Option<LabelSkew<L>>,
}

/// Label distribution of every role in one fold.
#[derive(Clone, Debug, PartialEq)]
pub struct FoldSummary<L> {
    /// One-based fold number.
    pub fold: usize,
    /// Train, validation and test summaries in that order.
    pub roles: Vec<RoleSummary<L>>,
}

impl<L> FoldSummary<L> {
    /// Summary for `role`.
    pub fn role(&self, role: FoldRole) -> Option<&RoleSummary<L>> {
        self.roles.iter().find(|summary| summary.role == role)
    }
}

/// Summarize the label distribution of each role of `fold`.
pub fn summarize_fold<L: Ord + Clone>(
    fold_no: usize,
    fold: &KFoldIndices,
    labels: &[L],
) -> Result<FoldSummary<L>, FoldError> {
    let roles = ALL_ROLES
        .iter()
        .map(|&role| {
            let indices = fold.indices(role);
            let counts = label_counts(indices, labels)?;
            let skew = label_skew(&counts);
            Ok(RoleSummary {
                role,
                examples: indices.len(),
                counts,
                skew,
            })
        })
        .collect::<Result<Vec<_>, FoldError>>()?;
    Ok(FoldSummary {
        fold: fold_no,
        roles,
    })
}

impl<L: fmt::Debug> fmt::Display for FoldSummary<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fold {}:", self.fold)?;
        for summary in &self.roles {
            write!(f, " {:?}={}", summary.role, summary.examples)?;
            let Some(skew) = &summary.skew else {
                write!(f, " {{}}")?;
                continue;
            };
            write!(f, " {{")?;
            for (idx, entry) in skew.per_label.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write!(
                    f,
                    "{:?}: {} ({:.1}%)",
                    entry.label,
                    entry.count,
                    entry.share * 100.0
                )?;
            }
            write!(f, "}} ratio={:.2}", skew.ratio)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_skew_reports_balance() {
        let mut counts = BTreeMap::new();
        counts.insert(0, 2);
        counts.insert(1, 2);
        let skew = label_skew(&counts).expect("skew");
        assert_eq!(skew.total, 4);
        assert_eq!(skew.per_label.len(), 2);
        assert!((skew.ratio - 1.0).abs() < 1e-6);
        assert!(
            skew.per_label
                .iter()
                .all(|entry| (entry.share - 0.5).abs() < 1e-6)
        );
    }

    #[test]
    fn label_skew_reports_imbalance() {
        let mut counts = BTreeMap::new();
        counts.insert("neg", 6);
        counts.insert("pos", 2);
        let skew = label_skew(&counts).expect("skew");
        assert_eq!(skew.min, 2);
        assert_eq!(skew.max, 6);
        assert!((skew.ratio - 3.0).abs() < 1e-6);
        assert_eq!(skew.per_label[0].label, "neg");
        assert!((skew.per_label[0].share - 0.75).abs() < 1e-6);
        assert!((skew.per_label[1].share - 0.25).abs() < 1e-6);
    }

    #[test]
    fn label_skew_of_nothing_is_none() {
        let counts: BTreeMap<u8, usize> = BTreeMap::new();
        assert!(label_skew(&counts).is_none());
    }

    #[test]
    fn summarize_fold_counts_each_role() {
        let labels = vec![1, 0, 1, 1, 0];
        let fold = KFoldIndices {
            train: vec![0, 1, 2],
            valid: vec![3],
            test: vec![4],
        };
        let summary = summarize_fold(1, &fold, &labels).unwrap();
        let train = summary.role(FoldRole::Train).unwrap();
        assert_eq!(train.examples, 3);
        assert_eq!(train.counts.get(&1), Some(&2));
        assert_eq!(train.counts.get(&0), Some(&1));
        assert_eq!(summary.role(FoldRole::Test).unwrap().counts.get(&0), Some(&1));
        assert_eq!(
            summary.to_string(),
            "fold 1: Train=3 {0: 1 (33.3%), 1: 2 (66.7%)} ratio=2.00 \
             Valid=1 {1: 1 (100.0%)} ratio=1.00 \
             Test=1 {0: 1 (100.0%)} ratio=1.00"
        );
        assert!(train.skew.as_ref().is_some_and(|skew| skew.max == 2));
    }

    #[test]
    fn summary_of_an_empty_role_shows_no_shares() {
        let fold = KFoldIndices {
            train: vec![0, 1],
            valid: vec![],
            test: vec![2],
        };
        let summary = summarize_fold(2, &fold, &["a", "b", "a"]).unwrap();
        assert!(summary.role(FoldRole::Valid).unwrap().skew.is_none());
        assert_eq!(
            summary.to_string(),
            "fold 2: Train=2 {\"a\": 1 (50.0%), \"b\": 1 (50.0%)} ratio=1.00 \
             Valid=0 {} \
             Test=1 {\"a\": 1 (100.0%)} ratio=1.00"
        );
    }

    #[test]
    fn summarize_fold_rejects_out_of_range_index() {
        let fold = KFoldIndices {
            train: vec![9],
            ..KFoldIndices::default()
        };
        let err = summarize_fold(1, &fold, &[0, 1]).unwrap_err();
        assert!(matches!(err, FoldError::FoldStore(msg) if msg.contains("out of range")));
    }
}
