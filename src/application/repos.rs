//! Repository traits describing persistence adapters.

use std::collections::BTreeMap;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::application::pagination::PageWindow;
use crate::domain::entities::{ListingDetail, ListingRecord, ListingSummary};
use crate::domain::listings::ListingDraft;
use crate::domain::types::{Condition, ListingStatus, PriceType};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("duplicate record violates unique constraint `{constraint}`")]
    Duplicate { constraint: String },
    #[error("resource not found")]
    NotFound,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("integrity error: {message}")]
    Integrity { message: String },
    #[error("database timeout")]
    Timeout,
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

/// Sort orders understood by the listing collection.
///
/// Ties break on `created_at DESC, id DESC`; listings without a price sort last
/// under both price orders.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ListingSort {
    #[default]
    Newest,
    PriceAsc,
    PriceDesc,
}

impl ListingSort {
    pub fn parse(value: &str) -> Self {
        match value {
            "price_asc" => ListingSort::PriceAsc,
            "price_desc" => ListingSort::PriceDesc,
            _ => ListingSort::Newest,
        }
    }
}

/// Conjunction of predicates over the listing collection.
///
/// Every populated field narrows the result; empty collections and `None` mean
/// "no constraint".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingFilter {
    pub status: Option<ListingStatus>,
    /// Free-text term matched by the collection's text index.
    pub text: Option<String>,
    pub seller_id: Option<Uuid>,
    pub category: Option<String>,
    pub sub_category: Option<String>,
    pub province: Option<String>,
    pub city: Option<String>,
    /// Allowed price types; empty means any.
    pub price_types: Vec<PriceType>,
    pub condition: Option<Condition>,
    pub promoted: Option<bool>,
    pub delivery_only: bool,
    pub price_min: Option<f64>,
    pub price_max: Option<f64>,
    /// Attribute key to the string form its value must equal.
    pub attributes: BTreeMap<String, String>,
    pub exclude_ids: Vec<Uuid>,
}

/// One group of the facet aggregation: listings sharing a subCategory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacetBucket {
    pub key: Option<String>,
    pub count: u64,
    pub delivery_count: u64,
}

#[derive(Debug, Clone)]
pub struct CreateListingParams {
    pub seller_id: Uuid,
    pub draft: ListingDraft,
}

#[derive(Debug, Clone)]
pub struct UpdateListingParams {
    pub id: Uuid,
    pub draft: ListingDraft,
}

#[derive(Debug, Clone, Copy)]
pub struct UpdateListingStatusParams {
    pub id: Uuid,
    pub status: ListingStatus,
}

#[async_trait]
pub trait ListingsRepo: Send + Sync {
    async fn count_listings(&self, filter: &ListingFilter) -> Result<u64, RepoError>;

    async fn list_summaries(
        &self,
        filter: &ListingFilter,
        sort: ListingSort,
        window: PageWindow,
    ) -> Result<Vec<ListingSummary>, RepoError>;

    /// Group the filtered set by subCategory in a single pass.
    async fn facet_buckets(&self, filter: &ListingFilter) -> Result<Vec<FacetBucket>, RepoError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ListingRecord>, RepoError>;

    /// Listing joined with the seller's contact fields, unredacted.
    async fn find_detail(&self, id: Uuid) -> Result<Option<ListingDetail>, RepoError>;
}

#[async_trait]
pub trait ListingsWriteRepo: Send + Sync {
    async fn create_listing(&self, params: CreateListingParams)
    -> Result<ListingRecord, RepoError>;

    async fn update_listing(&self, params: UpdateListingParams)
    -> Result<ListingRecord, RepoError>;

    async fn update_listing_status(
        &self,
        params: UpdateListingStatusParams,
    ) -> Result<ListingRecord, RepoError>;

    async fn delete_listing(&self, id: Uuid) -> Result<(), RepoError>;
}
