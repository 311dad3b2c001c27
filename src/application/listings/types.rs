use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::application::facets::Facets;
use crate::application::query::QueryError;
use crate::application::repos::RepoError;
use crate::domain::entities::{ListingDetail, ListingSummary};
use crate::domain::error::DomainError;

#[derive(Debug, Error)]
pub enum ListingError {
    #[error(transparent)]
    Query(#[from] QueryError),
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("listing `{0}` not found")]
    NotFound(Uuid),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

impl ListingError {
    /// Map a writer failure, turning a missing row into `NotFound(id)`.
    pub(crate) fn from_write(id: Uuid, err: RepoError) -> Self {
        match err {
            RepoError::NotFound => ListingError::NotFound(id),
            other => ListingError::Repo(other),
        }
    }
}

/// One page of search results with its facets.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchPage {
    pub items: Vec<ListingSummary>,
    pub total: u64,
    pub page: u32,
    pub pages: u64,
    pub limit: u32,
    pub facets: Facets,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarList {
    pub items: Vec<ListingSummary>,
}

/// Payloads stored in the shared listing cache.
#[derive(Debug, Clone)]
pub enum CachedValue {
    Search(Arc<SearchPage>),
    Listing(Arc<ListingDetail>),
    Similar(Arc<SimilarList>),
}

/// How a read was served.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheOutcome {
    Hit,
    Miss,
    /// Not eligible for caching (seller or admin scope).
    Bypass,
}

impl CacheOutcome {
    pub fn as_header(self) -> Option<&'static str> {
        match self {
            CacheOutcome::Hit => Some("HIT"),
            CacheOutcome::Miss => Some("MISS"),
            CacheOutcome::Bypass => None,
        }
    }
}

/// A read result paired with its cache outcome.
#[derive(Debug, Clone)]
pub struct Cached<T> {
    pub value: Arc<T>,
    pub outcome: CacheOutcome,
}

impl<T> Cached<T> {
    pub fn hit(value: Arc<T>) -> Self {
        Self {
            value,
            outcome: CacheOutcome::Hit,
        }
    }

    pub fn miss(value: Arc<T>) -> Self {
        Self {
            value,
            outcome: CacheOutcome::Miss,
        }
    }

    pub fn bypass(value: Arc<T>) -> Self {
        Self {
            value,
            outcome: CacheOutcome::Bypass,
        }
    }

    pub fn is_hit(&self) -> bool {
        self.outcome == CacheOutcome::Hit
    }
}
