//! Cache configuration.
//!
//! Per-resource TTLs, set via the `[cache]` section of `annonces.toml`.

use std::time::Duration;

// Default values for cache configuration
const DEFAULT_SEARCH_TTL_SECS: u64 = 90;
const DEFAULT_LISTING_TTL_SECS: u64 = 60;
const DEFAULT_SIMILAR_TTL_SECS: u64 = 120;

/// Cache configuration from `annonces.toml`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    /// Lifetime of a cached search result page.
    pub search_ttl: Duration,
    /// Lifetime of a cached single-listing read.
    pub listing_ttl: Duration,
    /// Lifetime of a cached similarity list.
    pub similar_ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            search_ttl: Duration::from_secs(DEFAULT_SEARCH_TTL_SECS),
            listing_ttl: Duration::from_secs(DEFAULT_LISTING_TTL_SECS),
            similar_ttl: Duration::from_secs(DEFAULT_SIMILAR_TTL_SECS),
        }
    }
}

impl From<&crate::config::CacheSettings> for CacheConfig {
    fn from(settings: &crate::config::CacheSettings) -> Self {
        Self {
            search_ttl: Duration::from_secs(settings.search_ttl_seconds.get()),
            listing_ttl: Duration::from_secs(settings.listing_ttl_seconds.get()),
            similar_ttl: Duration::from_secs(settings.similar_ttl_seconds.get()),
        }
    }
}
