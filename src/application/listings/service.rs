use std::sync::Arc;

use uuid::Uuid;

use crate::application::query::SearchLimits;
use crate::application::repos::{ListingsRepo, ListingsWriteRepo};
use crate::cache::{CacheConfig, SEARCH_PREFIX, TtlCache, listing_key, similar_prefix};
use crate::config::SearchSettings;

use super::types::CachedValue;

/// Listing reads and writes over the shared cache.
///
/// The cache handle is injected; clones of the service share it.
#[derive(Clone)]
pub struct ListingService {
    pub(crate) reader: Arc<dyn ListingsRepo>,
    pub(crate) writer: Arc<dyn ListingsWriteRepo>,
    pub(crate) cache: Arc<TtlCache<CachedValue>>,
    pub(crate) ttl: CacheConfig,
    pub(crate) limits: SearchLimits,
    pub(crate) similar_limit: u32,
}

impl ListingService {
    pub fn new(
        reader: Arc<dyn ListingsRepo>,
        writer: Arc<dyn ListingsWriteRepo>,
        cache: Arc<TtlCache<CachedValue>>,
        ttl: CacheConfig,
        search: SearchSettings,
    ) -> Self {
        Self {
            reader,
            writer,
            cache,
            ttl,
            limits: SearchLimits::from(&search),
            similar_limit: search.similar_limit,
        }
    }

    pub fn cache(&self) -> &Arc<TtlCache<CachedValue>> {
        &self.cache
    }

    /// Drop every cached page, plus the entries of `id` when given.
    pub(crate) fn invalidate(&self, id: Option<Uuid>) {
        self.cache.invalidate_prefix(SEARCH_PREFIX);
        if let Some(id) = id {
            self.cache.delete(&listing_key(id));
            self.cache.invalidate_prefix(&similar_prefix(id));
        }
    }
}
