#![allow(dead_code)]

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering as AtomicOrdering};

use async_trait::async_trait;
use time::{Duration as TimeDuration, OffsetDateTime};
use tokio::sync::Mutex;
use uuid::Uuid;

use annonces::application::listings::ListingService;
use annonces::application::pagination::PageWindow;
use annonces::application::repos::{
    CreateListingParams, FacetBucket, ListingFilter, ListingSort, ListingsRepo, ListingsWriteRepo,
    RepoError, UpdateListingParams, UpdateListingStatusParams,
};
use annonces::cache::{CacheConfig, TtlCache};
use annonces::config::SearchSettings;
use annonces::domain::attributes::AttributeValue;
use annonces::domain::entities::{
    Delivery, ListingDetail, ListingRecord, ListingSummary, SellerContact, SellerPublic,
};
use annonces::domain::listings::ListingDraft;
use annonces::domain::types::{ListingStatus, PriceType, UserRole};

/// In-memory listing collection with the same filter semantics as the SQL adapter.
#[derive(Default)]
pub struct InMemoryListings {
    listings: Mutex<Vec<ListingRecord>>,
    sellers: Mutex<HashMap<Uuid, SellerContact>>,
    reads: AtomicUsize,
    failing: AtomicBool,
    clock: AtomicUsize,
}

impl InMemoryListings {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Number of read-side calls served so far.
    pub fn reads(&self) -> usize {
        self.reads.load(AtomicOrdering::SeqCst)
    }

    /// Make every subsequent call fail as an unreachable store would.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, AtomicOrdering::SeqCst);
    }

    pub async fn add_seller(&self, seller: SellerContact) {
        self.sellers.lock().await.insert(seller.id, seller);
    }

    pub async fn insert(&self, mut record: ListingRecord) -> ListingRecord {
        record.created_at = self.tick();
        record.updated_at = record.created_at;
        self.listings.lock().await.push(record.clone());
        record
    }

    pub async fn get(&self, id: Uuid) -> Option<ListingRecord> {
        self.listings
            .lock()
            .await
            .iter()
            .find(|record| record.id == id)
            .cloned()
    }

    fn tick(&self) -> OffsetDateTime {
        let step = self.clock.fetch_add(1, AtomicOrdering::SeqCst);
        OffsetDateTime::UNIX_EPOCH + TimeDuration::days(20_000) + TimeDuration::minutes(step as i64)
    }

    fn begin_read(&self) -> Result<(), RepoError> {
        self.reads.fetch_add(1, AtomicOrdering::SeqCst);
        self.check_available()
    }

    fn check_available(&self) -> Result<(), RepoError> {
        if self.failing.load(AtomicOrdering::SeqCst) {
            return Err(RepoError::from_persistence("connection refused"));
        }
        Ok(())
    }

    async fn matching(&self, filter: &ListingFilter) -> Vec<ListingRecord> {
        self.listings
            .lock()
            .await
            .iter()
            .filter(|record| matches_filter(record, filter))
            .cloned()
            .collect()
    }
}

pub fn matches_filter(record: &ListingRecord, filter: &ListingFilter) -> bool {
    if filter.status.is_some_and(|status| record.status != status) {
        return false;
    }
    if let Some(text) = filter.text.as_ref() {
        let haystack = format!("{} {}", record.title, record.description).to_lowercase();
        if !text
            .to_lowercase()
            .split_whitespace()
            .all(|term| haystack.contains(term))
        {
            return false;
        }
    }
    if filter.seller_id.is_some_and(|id| record.seller_id != id) {
        return false;
    }
    if filter
        .category
        .as_ref()
        .is_some_and(|value| &record.category != value)
    {
        return false;
    }
    if filter
        .sub_category
        .as_ref()
        .is_some_and(|value| record.sub_category.as_ref() != Some(value))
    {
        return false;
    }
    if filter
        .province
        .as_ref()
        .is_some_and(|value| &record.province != value)
    {
        return false;
    }
    if filter.city.as_ref().is_some_and(|value| &record.city != value) {
        return false;
    }
    if !filter.price_types.is_empty() && !filter.price_types.contains(&record.price_type) {
        return false;
    }
    if filter
        .condition
        .is_some_and(|condition| record.condition != Some(condition))
    {
        return false;
    }
    if filter.promoted.is_some_and(|promoted| record.promoted != promoted) {
        return false;
    }
    if filter.delivery_only && !record.delivery.available {
        return false;
    }
    if let Some(min) = filter.price_min
        && !record.price.is_some_and(|price| price >= min)
    {
        return false;
    }
    if let Some(max) = filter.price_max
        && !record.price.is_some_and(|price| price <= max)
    {
        return false;
    }
    let attributes_match = filter.attributes.iter().all(|(key, value)| {
        record
            .attributes
            .get(key)
            .is_some_and(|stored| stored.matches(value))
    });
    if !attributes_match {
        return false;
    }
    !filter.exclude_ids.contains(&record.id)
}

fn compare(a: &ListingRecord, b: &ListingRecord, sort: ListingSort) -> Ordering {
    let newest = b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id));
    let by_price = |ascending: bool| match (a.price, b.price) {
        (Some(x), Some(y)) => {
            let ord = x.partial_cmp(&y).unwrap_or(Ordering::Equal);
            if ascending { ord } else { ord.reverse() }
        }
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    match sort {
        ListingSort::Newest => newest,
        ListingSort::PriceAsc => by_price(true).then(newest),
        ListingSort::PriceDesc => by_price(false).then(newest),
    }
}

#[async_trait]
impl ListingsRepo for InMemoryListings {
    async fn count_listings(&self, filter: &ListingFilter) -> Result<u64, RepoError> {
        self.begin_read()?;
        Ok(self.matching(filter).await.len() as u64)
    }

    async fn list_summaries(
        &self,
        filter: &ListingFilter,
        sort: ListingSort,
        window: PageWindow,
    ) -> Result<Vec<ListingSummary>, RepoError> {
        self.begin_read()?;
        let mut records = self.matching(filter).await;
        records.sort_by(|a, b| compare(a, b, sort));

        let sellers = self.sellers.lock().await;
        Ok(records
            .into_iter()
            .skip(window.offset() as usize)
            .take(window.limit as usize)
            .map(|record| {
                let seller = sellers.get(&record.seller_id).map(|seller| SellerPublic {
                    id: seller.id,
                    name: seller.name.clone(),
                    avatar: seller.avatar.clone(),
                    badge: seller.badge.clone(),
                });
                ListingSummary {
                    id: record.id,
                    title: record.title,
                    price: record.price,
                    price_type: record.price_type,
                    images: record.images,
                    city: record.city,
                    province: record.province,
                    sub_category: record.sub_category,
                    condition: record.condition,
                    promoted: record.promoted,
                    created_at: record.created_at,
                    seller_id: record.seller_id,
                    seller,
                }
            })
            .collect())
    }

    async fn facet_buckets(&self, filter: &ListingFilter) -> Result<Vec<FacetBucket>, RepoError> {
        self.begin_read()?;
        let mut buckets: HashMap<Option<String>, FacetBucket> = HashMap::new();
        for record in self.matching(filter).await {
            let bucket = buckets
                .entry(record.sub_category.clone())
                .or_insert_with(|| FacetBucket {
                    key: record.sub_category.clone(),
                    count: 0,
                    delivery_count: 0,
                });
            bucket.count += 1;
            if record.delivery.available {
                bucket.delivery_count += 1;
            }
        }
        Ok(buckets.into_values().collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ListingRecord>, RepoError> {
        self.begin_read()?;
        Ok(self.get(id).await)
    }

    async fn find_detail(&self, id: Uuid) -> Result<Option<ListingDetail>, RepoError> {
        self.begin_read()?;
        let Some(listing) = self.get(id).await else {
            return Ok(None);
        };
        let seller = self.sellers.lock().await.get(&listing.seller_id).cloned();
        Ok(Some(ListingDetail { listing, seller }))
    }
}

#[async_trait]
impl ListingsWriteRepo for InMemoryListings {
    async fn create_listing(
        &self,
        params: CreateListingParams,
    ) -> Result<ListingRecord, RepoError> {
        self.check_available()?;
        let record = record_from_draft(Uuid::new_v4(), params.seller_id, params.draft);
        Ok(self.insert(record).await)
    }

    async fn update_listing(
        &self,
        params: UpdateListingParams,
    ) -> Result<ListingRecord, RepoError> {
        self.check_available()?;
        let now = self.tick();
        let mut listings = self.listings.lock().await;
        let existing = listings
            .iter_mut()
            .find(|record| record.id == params.id)
            .ok_or(RepoError::NotFound)?;
        let mut updated = record_from_draft(existing.id, existing.seller_id, params.draft);
        updated.status = existing.status;
        updated.created_at = existing.created_at;
        updated.updated_at = now;
        *existing = updated.clone();
        Ok(updated)
    }

    async fn update_listing_status(
        &self,
        params: UpdateListingStatusParams,
    ) -> Result<ListingRecord, RepoError> {
        self.check_available()?;
        let mut listings = self.listings.lock().await;
        let existing = listings
            .iter_mut()
            .find(|record| record.id == params.id)
            .ok_or(RepoError::NotFound)?;
        existing.status = params.status;
        Ok(existing.clone())
    }

    async fn delete_listing(&self, id: Uuid) -> Result<(), RepoError> {
        self.check_available()?;
        let mut listings = self.listings.lock().await;
        let before = listings.len();
        listings.retain(|record| record.id != id);
        if listings.len() == before {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}

fn record_from_draft(id: Uuid, seller_id: Uuid, draft: ListingDraft) -> ListingRecord {
    ListingRecord {
        id,
        title: draft.title,
        description: draft.description,
        category: draft.category,
        sub_category: draft.sub_category,
        province: draft.province,
        city: draft.city,
        price_type: draft.price_type,
        price: draft.price,
        delivery: draft.delivery,
        condition: draft.condition,
        seller_id,
        attributes: draft.attributes,
        images: draft.images,
        status: ListingStatus::Active,
        promoted: draft.promoted,
        promoted_until: draft.promoted_until,
        created_at: OffsetDateTime::UNIX_EPOCH,
        updated_at: OffsetDateTime::UNIX_EPOCH,
    }
}

pub fn service(repo: &Arc<InMemoryListings>) -> ListingService {
    service_with(repo, CacheConfig::default())
}

pub fn service_with(repo: &Arc<InMemoryListings>, ttl: CacheConfig) -> ListingService {
    ListingService::new(
        repo.clone(),
        repo.clone(),
        Arc::new(TtlCache::new()),
        ttl,
        SearchSettings::default(),
    )
}

pub fn seller(show_phone: bool, verified: bool) -> SellerContact {
    SellerContact {
        id: Uuid::new_v4(),
        name: "Mbuyi Motors".to_string(),
        avatar: Some("https://cdn.example.com/a/mbuyi.png".to_string()),
        badge: Some("pro".to_string()),
        email: "contact@mbuyi.example".to_string(),
        phone: Some("+243810000001".to_string()),
        whatsapp: Some("+243810000001".to_string()),
        show_phone,
        is_phone_verified: verified,
        role: UserRole::User,
        created_at: OffsetDateTime::UNIX_EPOCH,
    }
}

/// Listing builder with sensible marketplace defaults.
pub struct ListingBuilder {
    record: ListingRecord,
}

pub fn listing(title: &str) -> ListingBuilder {
    ListingBuilder {
        record: ListingRecord {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description: String::new(),
            category: "vehicules".to_string(),
            sub_category: Some("voitures".to_string()),
            province: "Kinshasa".to_string(),
            city: "Gombe".to_string(),
            price_type: PriceType::Fixed,
            price: Some(5000.0),
            delivery: Delivery::default(),
            condition: None,
            seller_id: Uuid::nil(),
            attributes: Default::default(),
            images: Vec::new(),
            status: ListingStatus::Active,
            promoted: false,
            promoted_until: None,
            created_at: OffsetDateTime::UNIX_EPOCH,
            updated_at: OffsetDateTime::UNIX_EPOCH,
        },
    }
}

impl ListingBuilder {
    pub fn category(mut self, category: &str, sub_category: Option<&str>) -> Self {
        self.record.category = category.to_string();
        self.record.sub_category = sub_category.map(str::to_string);
        self
    }

    pub fn location(mut self, province: &str, city: &str) -> Self {
        self.record.province = province.to_string();
        self.record.city = city.to_string();
        self
    }

    pub fn priced(mut self, price_type: PriceType, price: Option<f64>) -> Self {
        self.record.price_type = price_type;
        self.record.price = price;
        self
    }

    pub fn seller(mut self, seller_id: Uuid) -> Self {
        self.record.seller_id = seller_id;
        self
    }

    pub fn status(mut self, status: ListingStatus) -> Self {
        self.record.status = status;
        self
    }

    pub fn delivery(mut self) -> Self {
        self.record.delivery = Delivery {
            available: true,
            national: false,
            included: false,
        };
        self
    }

    pub fn attribute(mut self, key: &str, value: impl Into<AttributeValue>) -> Self {
        self.record.attributes.insert(key.to_string(), value.into());
        self
    }

    pub fn description(mut self, description: &str) -> Self {
        self.record.description = description.to_string();
        self
    }

    pub fn build(self) -> ListingRecord {
        self.record
    }
}

pub fn draft(title: &str, price_type: PriceType, price: Option<f64>) -> ListingDraft {
    ListingDraft {
        title: title.to_string(),
        description: "Bon état, visible à Gombe.".to_string(),
        category: "vehicules".to_string(),
        sub_category: Some("voitures".to_string()),
        province: "Kinshasa".to_string(),
        city: "Gombe".to_string(),
        price_type,
        price,
        delivery: Delivery::default(),
        condition: None,
        attributes: Default::default(),
        images: Vec::new(),
        promoted: false,
        promoted_until: None,
    }
}
