//! Process-local listing cache.
//!
//! A single [`TtlCache`] instance is constructed at startup and shared by handle
//! between request handlers. Entries expire lazily on read; writes invalidate by
//! key prefix:
//!
//! - `listings:` search result pages (90s)
//! - `listing:{id}` single listing reads (60s)
//! - `similar:{id}` similarity lists (120s)
//!
//! TTLs are configurable via the `[cache]` section of `annonces.toml`.

mod config;
mod keys;
mod lock;
mod store;

pub use config::CacheConfig;
pub use keys::{
    LISTING_PREFIX, SEARCH_PREFIX, SIMILAR_PREFIX, listing_key, resource_of, search_key,
    similar_key, similar_prefix,
};
pub use store::TtlCache;
