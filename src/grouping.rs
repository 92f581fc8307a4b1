//! Grouping helpers shared by fold splitters.
//!
//! Groups are the indivisible unit of bucket assignment: every index sharing a
//! key lands in the same bucket. Both helpers are deterministic for a fixed
//! input order (keys are kept in first-discovered order).

use indexmap::IndexMap;
use std::hash::Hash;

use crate::types::PointIndex;

/// One group of point indices sharing a key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexGroup<K> {
    /// Key extracted from every member.
    pub key: K,
    /// Member indices in input order.
    pub indices: Vec<PointIndex>,
}

impl<K> IndexGroup<K> {
    /// Number of members.
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// True when the group has no members.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Map each key to the indices of the items producing it.
///
/// Keys appear in the order they were first discovered; indices within a key
/// appear in input order.
pub fn group_indices_by<T, K, F>(items: &[T], key_extractor: F) -> IndexMap<K, Vec<PointIndex>>
where
    K: Hash + Eq,
    F: Fn(&T) -> K,
{
    let mut groups: IndexMap<K, Vec<PointIndex>> = IndexMap::new();
    for (idx, item) in items.iter().enumerate() {
        groups.entry(key_extractor(item)).or_default().push(idx);
    }
    groups
}

/// Groups ordered largest first, ties kept in first-discovered order.
pub fn groups_by_size_desc<T, K, F>(items: &[T], key_extractor: F) -> Vec<IndexGroup<K>>
where
    K: Hash + Eq,
    F: Fn(&T) -> K,
{
    let mut groups: Vec<IndexGroup<K>> = group_indices_by(items, key_extractor)
        .into_iter()
        .map(|(key, indices)| IndexGroup { key, indices })
        .collect();
    // `sort_by` is stable, which keeps discovery order among equal sizes.
    groups.sort_by(|a, b| b.len().cmp(&a.len()));
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_of(item: &String) -> String {
        item.split('/').next().unwrap_or("").to_string()
    }

    #[test]
    fn group_indices_by_keeps_discovery_order() {
        let items = vec![
            "bob/01".to_string(),
            "alice/02".to_string(),
            "bob/03".to_string(),
            "carol/04".to_string(),
        ];
        let groups = group_indices_by(&items, user_of);
        let keys: Vec<_> = groups.keys().cloned().collect();
        assert_eq!(keys, vec!["bob", "alice", "carol"]);
        assert_eq!(groups["bob"], vec![0, 2]);
        assert_eq!(groups["alice"], vec![1]);
    }

    #[test]
    fn groups_by_size_desc_is_stable_for_ties() {
        let items = vec![
            "a/1".to_string(),
            "b/2".to_string(),
            "c/3".to_string(),
            "c/4".to_string(),
            "b/5".to_string(),
            "d/6".to_string(),
            "c/7".to_string(),
        ];
        let groups = groups_by_size_desc(&items, user_of);
        let order: Vec<_> = groups.iter().map(|g| (g.key.as_str(), g.len())).collect();
        assert_eq!(order, vec![("c", 3), ("b", 2), ("a", 1), ("d", 1)]);
        assert_eq!(groups[0].indices, vec![2, 3, 6]);
    }

    #[test]
    fn grouping_empty_input_is_empty() {
        let items: Vec<String> = Vec::new();
        assert!(group_indices_by(&items, user_of).is_empty());
        assert!(groups_by_size_desc(&items, user_of).is_empty());
    }

    #[test]
    fn grouping_returns_every_index_once() {
        let items: Vec<u32> = (0..50).collect();
        let groups = groups_by_size_desc(&items, |v| v % 7);
        let mut all: Vec<_> = groups.iter().flat_map(|g| g.indices.clone()).collect();
        all.sort();
        assert_eq!(all, (0..50).collect::<Vec<_>>());
        assert!(groups.iter().all(|g| !g.is_empty()));
    }
}
