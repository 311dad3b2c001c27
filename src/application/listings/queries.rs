use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use crate::application::facets;
use crate::application::pagination::total_pages;
use crate::application::query::{ListingScope, RawParams, SearchParams, compile};
use crate::application::similar;
use crate::cache::{listing_key, search_key, similar_key};
use crate::domain::entities::ListingDetail;

use super::service::ListingService;
use super::types::{Cached, CachedValue, ListingError, SearchPage, SimilarList};

impl ListingService {
    /// Paginated, faceted search. Only public searches are cached.
    pub async fn search(
        &self,
        raw: &RawParams,
        scope: ListingScope,
    ) -> Result<Cached<SearchPage>, ListingError> {
        let key = scope.is_public().then(|| search_key(raw.as_map()));

        if let Some(key) = key.as_deref()
            && let Some(CachedValue::Search(page)) = self.cache.get(key)
        {
            return Ok(Cached::hit(page));
        }

        let params = SearchParams::from_raw(raw);
        let spec = compile(&params, scope, self.limits)?;

        let (total, items, facets) = tokio::try_join!(
            self.reader.count_listings(&spec.filter),
            self.reader
                .list_summaries(&spec.filter, spec.sort, spec.window),
            facets::aggregate(self.reader.as_ref(), &spec.filter),
        )?;

        let page = Arc::new(SearchPage {
            items,
            total,
            page: spec.window.page,
            pages: total_pages(total, spec.window.limit),
            limit: spec.window.limit,
            facets,
        });

        match key {
            Some(key) => {
                debug!(
                    target = "application::listings::search",
                    total, "caching search page"
                );
                self.cache.set(
                    key,
                    CachedValue::Search(Arc::clone(&page)),
                    self.ttl.search_ttl,
                );
                Ok(Cached::miss(page))
            }
            None => Ok(Cached::bypass(page)),
        }
    }

    /// Single listing of any status, with seller contact details redacted
    /// unless the seller shows a verified phone.
    pub async fn get_by_id(&self, id: Uuid) -> Result<Cached<ListingDetail>, ListingError> {
        let key = listing_key(id);
        if let Some(CachedValue::Listing(detail)) = self.cache.get(&key) {
            return Ok(Cached::hit(detail));
        }

        let detail = self
            .reader
            .find_detail(id)
            .await?
            .ok_or(ListingError::NotFound(id))?
            .redacted();

        let detail = Arc::new(detail);
        self.cache.set(
            key,
            CachedValue::Listing(Arc::clone(&detail)),
            self.ttl.listing_ttl,
        );
        Ok(Cached::miss(detail))
    }

    /// Related active listings for `id`; `limit` defaults to the configured size.
    pub async fn similar(
        &self,
        id: Uuid,
        limit: Option<u32>,
    ) -> Result<Cached<SimilarList>, ListingError> {
        let default_limit = similar::clamp_limit(self.similar_limit);
        let limit = limit.map_or(default_limit, similar::clamp_limit);
        let key = if limit == default_limit {
            similar_key(id, None)
        } else {
            similar_key(id, Some(limit))
        };

        if let Some(CachedValue::Similar(list)) = self.cache.get(&key) {
            return Ok(Cached::hit(list));
        }

        let anchor = self
            .reader
            .find_by_id(id)
            .await?
            .ok_or(ListingError::NotFound(id))?;
        let items = similar::resolve(self.reader.as_ref(), &anchor, limit).await?;

        let list = Arc::new(SimilarList { items });
        self.cache.set(
            key,
            CachedValue::Similar(Arc::clone(&list)),
            self.ttl.similar_ttl,
        );
        Ok(Cached::miss(list))
    }
}
