use async_trait::async_trait;
use sqlx::types::Json;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::repos::{
    CreateListingParams, ListingsWriteRepo, RepoError, UpdateListingParams,
    UpdateListingStatusParams,
};
use crate::domain::entities::ListingRecord;
use crate::infra::db::map_sqlx_error;

use super::LISTING_COLUMNS;
use super::PostgresRepositories;
use super::types::ListingRow;

#[async_trait]
impl ListingsWriteRepo for PostgresRepositories {
    async fn create_listing(
        &self,
        params: CreateListingParams,
    ) -> Result<ListingRecord, RepoError> {
        let CreateListingParams { seller_id, draft } = params;

        let id = Uuid::new_v4();
        let now = OffsetDateTime::now_utc();
        let sql = format!(
            r#"
            INSERT INTO listings AS l (
                id, title, description, category, sub_category, province, city,
                price_type, price, delivery_available, delivery_national, delivery_included,
                condition, seller_id, attributes, images, promoted, promoted_until,
                created_at, updated_at
            )
            VALUES (
                $1, $2, $3, $4, $5, $6, $7,
                $8, $9, $10, $11, $12,
                $13, $14, $15, $16, $17, $18,
                $19, $19
            )
            RETURNING {LISTING_COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, ListingRow>(&sql)
            .bind(id)
            .bind(draft.title)
            .bind(draft.description)
            .bind(draft.category)
            .bind(draft.sub_category)
            .bind(draft.province)
            .bind(draft.city)
            .bind(draft.price_type)
            .bind(draft.price)
            .bind(draft.delivery.available)
            .bind(draft.delivery.national)
            .bind(draft.delivery.included)
            .bind(draft.condition)
            .bind(seller_id)
            .bind(Json(draft.attributes))
            .bind(Json(draft.images))
            .bind(draft.promoted)
            .bind(draft.promoted_until)
            .bind(now)
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(ListingRecord::from(row))
    }

    async fn update_listing(
        &self,
        params: UpdateListingParams,
    ) -> Result<ListingRecord, RepoError> {
        let UpdateListingParams { id, draft } = params;

        let sql = format!(
            r#"
            UPDATE listings AS l
            SET title = $2,
                description = $3,
                category = $4,
                sub_category = $5,
                province = $6,
                city = $7,
                price_type = $8,
                price = $9,
                delivery_available = $10,
                delivery_national = $11,
                delivery_included = $12,
                condition = $13,
                attributes = $14,
                images = $15,
                promoted = $16,
                promoted_until = $17,
                updated_at = $18
            WHERE l.id = $1
            RETURNING {LISTING_COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, ListingRow>(&sql)
            .bind(id)
            .bind(draft.title)
            .bind(draft.description)
            .bind(draft.category)
            .bind(draft.sub_category)
            .bind(draft.province)
            .bind(draft.city)
            .bind(draft.price_type)
            .bind(draft.price)
            .bind(draft.delivery.available)
            .bind(draft.delivery.national)
            .bind(draft.delivery.included)
            .bind(draft.condition)
            .bind(Json(draft.attributes))
            .bind(Json(draft.images))
            .bind(draft.promoted)
            .bind(draft.promoted_until)
            .bind(OffsetDateTime::now_utc())
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?
            .ok_or(RepoError::NotFound)?;

        Ok(ListingRecord::from(row))
    }

    async fn update_listing_status(
        &self,
        params: UpdateListingStatusParams,
    ) -> Result<ListingRecord, RepoError> {
        let sql = format!(
            r#"
            UPDATE listings AS l
            SET status = $2,
                updated_at = $3
            WHERE l.id = $1
            RETURNING {LISTING_COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, ListingRow>(&sql)
            .bind(params.id)
            .bind(params.status)
            .bind(OffsetDateTime::now_utc())
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?
            .ok_or(RepoError::NotFound)?;

        Ok(ListingRecord::from(row))
    }

    async fn delete_listing(&self, id: Uuid) -> Result<(), RepoError> {
        let result = sqlx::query(
            r#"
            DELETE FROM listings
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}
