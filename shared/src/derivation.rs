//! Pure derivations over a collection cache.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::{entity::AdminEntity, filter::FilterState};

/// Bucket name for entities without a category.
pub const UNCATEGORIZED: &str = "uncategorized";

/// Aggregate counts over a whole cache.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CollectionStats {
    /// Every counted entity.
    pub total: usize,
    /// Entities whose status flag is set.
    pub active: usize,
    /// Entities whose status flag is cleared.
    pub inactive: usize,
    /// Counts per category, blank categories bucketed as `uncategorized`.
    pub by_category: BTreeMap<String, usize>,
}

/// Whether `entity` passes every applied filter (logical AND).
///
/// Search is a case-insensitive substring match over the entity's search
/// fields; categorical filters compare case-insensitively against the
/// entity's normalized value. Unknown filter names never match.
pub fn matches<E: AdminEntity>(entity: &E, filters: &FilterState) -> bool {
    matches_search(entity, filters.search_text()) && matches_filters(entity, filters)
}

/// Search half of [`matches`]. Blank search matches everything.
pub fn matches_search<E: AdminEntity>(entity: &E, search: &str) -> bool {
    let needle = search.trim().to_lowercase();
    needle.is_empty()
        || entity
            .search_fields()
            .iter()
            .any(|field| field.to_lowercase().contains(&needle))
}

/// Categorical half of [`matches`].
pub fn matches_filters<E: AdminEntity>(entity: &E, filters: &FilterState) -> bool {
    filters.active_filters().all(|(name, wanted)| {
        entity
            .filter_value(name)
            .is_some_and(|value| value.trim().eq_ignore_ascii_case(wanted))
    })
}

/// Entities of `items` that pass `filters`, in cache order.
pub fn filtered<E: AdminEntity>(items: &[E], filters: &FilterState) -> Vec<E> {
    items
        .iter()
        .filter(|entity| matches(*entity, filters))
        .cloned()
        .collect()
}

/// Counts over every item passed in.
pub fn stats<E: AdminEntity>(items: &[E]) -> CollectionStats {
    let mut stats = CollectionStats::default();
    for entity in items {
        stats.total += 1;
        if entity.is_active() {
            stats.active += 1;
        } else {
            stats.inactive += 1;
        }
        let category = entity.category().trim();
        let bucket = if category.is_empty() { UNCATEGORIZED } else { category };
        *stats.by_category.entry(bucket.to_string()).or_default() += 1;
    }
    stats
}

/// Distinct non-empty values of one filter across `items`, sorted
/// case-insensitively, for populating filter dropdowns.
pub fn filter_options<'a, E, I>(items: I, name: &str) -> Vec<String>
where
    E: AdminEntity + 'a,
    I: IntoIterator<Item = &'a E>,
{
    let mut values: Vec<String> = items
        .into_iter()
        .filter_map(|entity| entity.filter_value(name))
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .collect();
    values.sort_by_key(|value| value.to_lowercase());
    values.dedup_by(|a, b| a.eq_ignore_ascii_case(b));
    values
}
