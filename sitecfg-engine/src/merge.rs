//! Inheritance merge of configuration element lists
//!
//! Items declared or overridden by the child come first, in the child's
//! order; items only present in the parent follow in the parent's order.
//! A disabled child item removes the inherited item with the same key.

use indexmap::IndexMap;

use crate::model::{ConfigElement, DetailPageInfo};

/// Collapse duplicate keys within one list, the last occurrence winning
///
/// The surviving element takes the position of the first occurrence.
pub fn dedupe<T: ConfigElement>(items: &[T]) -> Vec<T> {
    let mut map: IndexMap<T::Key, T> = IndexMap::with_capacity(items.len());
    for item in items {
        map.insert(item.key(), item.clone());
    }
    map.into_values().collect()
}

/// Merge a child list over a parent list
pub fn combine<T: ConfigElement>(parent: &[T], child: &[T]) -> Vec<T> {
    let parent = dedupe(parent);
    let child = dedupe(child);

    // Map order is the reverse of the final order: parent items seeded
    // back to front, every child item moved to the end.
    let mut map: IndexMap<T::Key, T> = IndexMap::with_capacity(parent.len() + child.len());
    for item in parent.into_iter().rev() {
        map.insert(item.key(), item);
    }

    for item in child.iter().rev() {
        let key = item.key();
        if item.is_disabled() {
            map.shift_remove(&key);
            continue;
        }
        let merged = match map.shift_remove(&key) {
            Some(existing) => existing.merge(item),
            None => item.clone(),
        };
        map.insert(key, merged);
    }

    map.into_values().rev().collect()
}

/// Merge detail pages as a union of per-type buckets
///
/// Types with child pages come first in the child's order, then the
/// remaining parent types. Within a bucket the child's pages precede the
/// parent's; a page already listed (same id) is not repeated.
pub fn combine_detail_pages(
    parent: &[DetailPageInfo],
    child: &[DetailPageInfo],
) -> Vec<DetailPageInfo> {
    let mut buckets: IndexMap<&str, Vec<DetailPageInfo>> = IndexMap::new();
    for page in child.iter().chain(parent.iter()) {
        let bucket = buckets.entry(page.type_name.as_str()).or_default();
        if !bucket.iter().any(|existing| existing.id == page.id) {
            bucket.push(page.clone());
        }
    }
    buckets.into_values().flatten().collect()
}

/// Stable sort by an optional order value; unordered items go last
pub fn sort_by_order<T, F>(items: &mut [T], order: F)
where
    F: Fn(&T) -> Option<i32>,
{
    items.sort_by_key(|item| match order(item) {
        Some(value) => (0, value),
        None => (1, 0),
    });
}
