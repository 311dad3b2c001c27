//! Cache key construction.
//!
//! Key shapes are part of the observable contract: writes invalidate by literal
//! prefix, so every key for one resource must share its prefix.

use std::collections::BTreeMap;

use uuid::Uuid;

/// Prefix shared by every cached search result page.
pub const SEARCH_PREFIX: &str = "listings:";
/// Prefix of single listing reads.
pub const LISTING_PREFIX: &str = "listing:";
/// Prefix of similarity lists.
pub const SIMILAR_PREFIX: &str = "similar:";

/// Key for a search over the given raw parameter set.
///
/// The map is ordered, so the serialized form does not depend on the order in
/// which parameters arrived.
pub fn search_key(params: &BTreeMap<String, Vec<String>>) -> String {
    let canonical = serde_json::to_string(params).unwrap_or_else(|_| format!("{params:?}"));
    format!("{SEARCH_PREFIX}{canonical}")
}

pub fn listing_key(id: Uuid) -> String {
    format!("{LISTING_PREFIX}{id}")
}

/// Key for a similarity list; `None` selects the default-size list.
pub fn similar_key(id: Uuid, limit: Option<u32>) -> String {
    match limit {
        None => format!("{SIMILAR_PREFIX}{id}"),
        Some(limit) => format!("{SIMILAR_PREFIX}{id}:{limit}"),
    }
}

/// Prefix covering every similarity list anchored on `id`.
pub fn similar_prefix(id: Uuid) -> String {
    format!("{SIMILAR_PREFIX}{id}")
}

/// Resource label of a key (`listings`, `listing`, `similar`), used for metrics.
pub fn resource_of(key: &str) -> &str {
    key.split_once(':').map_or(key, |(resource, _)| resource)
}
