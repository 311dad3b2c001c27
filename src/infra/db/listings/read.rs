use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use crate::application::pagination::PageWindow;
use crate::application::repos::{
    FacetBucket, ListingFilter, ListingSort, ListingsRepo, RepoError,
};
use crate::domain::entities::{ListingDetail, ListingRecord, ListingSummary};
use crate::infra::db::map_sqlx_error;

use super::LISTING_COLUMNS;
use super::PostgresRepositories;
use super::types::{DetailRow, FacetRow, ListingRow, SummaryRow};

const SUMMARY_COLUMNS: &str = "l.id, l.title, l.price, l.price_type, l.images, l.city, \
     l.province, l.sub_category, l.condition, l.promoted, l.created_at, l.seller_id, \
     u.name AS seller_name, u.avatar AS seller_avatar, u.badge AS seller_badge";

const SELLER_CONTACT_COLUMNS: &str = "u.name AS seller_name, u.avatar AS seller_avatar, \
     u.badge AS seller_badge, u.email AS seller_email, u.phone AS seller_phone, \
     u.whatsapp AS seller_whatsapp, u.show_phone AS seller_show_phone, \
     u.is_phone_verified AS seller_is_phone_verified, u.role AS seller_role, \
     u.created_at AS seller_created_at";

#[async_trait]
impl ListingsRepo for PostgresRepositories {
    async fn count_listings(&self, filter: &ListingFilter) -> Result<u64, RepoError> {
        let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM listings l WHERE 1=1");
        Self::apply_listing_filter(&mut qb, filter);

        let count: i64 = qb
            .build_query_scalar()
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Self::convert_count(count)
    }

    async fn list_summaries(
        &self,
        filter: &ListingFilter,
        sort: ListingSort,
        window: PageWindow,
    ) -> Result<Vec<ListingSummary>, RepoError> {
        let mut qb = QueryBuilder::new("SELECT ");
        qb.push(SUMMARY_COLUMNS);
        qb.push(" FROM listings l LEFT JOIN users u ON u.id = l.seller_id WHERE 1=1");
        Self::apply_listing_filter(&mut qb, filter);
        Self::push_listing_order(&mut qb, sort);

        let offset = i64::try_from(window.offset())
            .map_err(|_| RepoError::InvalidInput {
                message: "page offset exceeds supported range".to_string(),
            })?;
        qb.push(" LIMIT ");
        qb.push_bind(i64::from(window.limit));
        qb.push(" OFFSET ");
        qb.push_bind(offset);

        let rows = qb
            .build_query_as::<SummaryRow>()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(ListingSummary::from).collect())
    }

    async fn facet_buckets(&self, filter: &ListingFilter) -> Result<Vec<FacetBucket>, RepoError> {
        let mut qb = QueryBuilder::new(
            "SELECT l.sub_category AS key, COUNT(*) AS count, \
             COUNT(*) FILTER (WHERE l.delivery_available) AS delivery_count \
             FROM listings l WHERE 1=1",
        );
        Self::apply_listing_filter(&mut qb, filter);
        qb.push(" GROUP BY l.sub_category");

        let rows = qb
            .build_query_as::<FacetRow>()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        rows.into_iter()
            .map(|row| {
                row.into_bucket()
                    .ok_or_else(|| RepoError::from_persistence("facet count out of range"))
            })
            .collect()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ListingRecord>, RepoError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT ");
        qb.push(LISTING_COLUMNS);
        qb.push(" FROM listings l WHERE l.id = ");
        qb.push_bind(id);

        let row = qb
            .build_query_as::<ListingRow>()
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.map(ListingRecord::from))
    }

    async fn find_detail(&self, id: Uuid) -> Result<Option<ListingDetail>, RepoError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT ");
        qb.push(LISTING_COLUMNS);
        qb.push(", ");
        qb.push(SELLER_CONTACT_COLUMNS);
        qb.push(" FROM listings l LEFT JOIN users u ON u.id = l.seller_id WHERE l.id = ");
        qb.push_bind(id);

        let row = qb
            .build_query_as::<DetailRow>()
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.map(ListingDetail::from))
    }
}
