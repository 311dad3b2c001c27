use sqlx::types::Json;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::repos::FacetBucket;
use crate::domain::attributes::Attributes;
use crate::domain::entities::{
    Delivery, ListingDetail, ListingImage, ListingRecord, ListingSummary, SellerContact,
    SellerPublic,
};
use crate::domain::types::{Condition, ListingStatus, PriceType, UserRole};

#[derive(sqlx::FromRow)]
pub(crate) struct ListingRow {
    pub(crate) id: Uuid,
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) category: String,
    pub(crate) sub_category: Option<String>,
    pub(crate) province: String,
    pub(crate) city: String,
    pub(crate) price_type: PriceType,
    pub(crate) price: Option<f64>,
    pub(crate) delivery_available: bool,
    pub(crate) delivery_national: bool,
    pub(crate) delivery_included: bool,
    pub(crate) condition: Option<Condition>,
    pub(crate) seller_id: Uuid,
    pub(crate) attributes: Json<Attributes>,
    pub(crate) images: Json<Vec<ListingImage>>,
    pub(crate) status: ListingStatus,
    pub(crate) promoted: bool,
    pub(crate) promoted_until: Option<OffsetDateTime>,
    pub(crate) created_at: OffsetDateTime,
    pub(crate) updated_at: OffsetDateTime,
}

impl From<ListingRow> for ListingRecord {
    fn from(row: ListingRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            description: row.description,
            category: row.category,
            sub_category: row.sub_category,
            province: row.province,
            city: row.city,
            price_type: row.price_type,
            price: row.price,
            delivery: Delivery {
                available: row.delivery_available,
                national: row.delivery_national,
                included: row.delivery_included,
            },
            condition: row.condition,
            seller_id: row.seller_id,
            attributes: row.attributes.0,
            images: row.images.0,
            status: row.status,
            promoted: row.promoted,
            promoted_until: row.promoted_until,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct SummaryRow {
    pub(crate) id: Uuid,
    pub(crate) title: String,
    pub(crate) price: Option<f64>,
    pub(crate) price_type: PriceType,
    pub(crate) images: Json<Vec<ListingImage>>,
    pub(crate) city: String,
    pub(crate) province: String,
    pub(crate) sub_category: Option<String>,
    pub(crate) condition: Option<Condition>,
    pub(crate) promoted: bool,
    pub(crate) created_at: OffsetDateTime,
    pub(crate) seller_id: Uuid,
    pub(crate) seller_name: Option<String>,
    pub(crate) seller_avatar: Option<String>,
    pub(crate) seller_badge: Option<String>,
}

impl From<SummaryRow> for ListingSummary {
    fn from(row: SummaryRow) -> Self {
        let seller = row.seller_name.map(|name| SellerPublic {
            id: row.seller_id,
            name,
            avatar: row.seller_avatar,
            badge: row.seller_badge,
        });
        Self {
            id: row.id,
            title: row.title,
            price: row.price,
            price_type: row.price_type,
            images: row.images.0,
            city: row.city,
            province: row.province,
            sub_category: row.sub_category,
            condition: row.condition,
            promoted: row.promoted,
            created_at: row.created_at,
            seller_id: row.seller_id,
            seller,
        }
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct DetailRow {
    #[sqlx(flatten)]
    pub(crate) listing: ListingRow,
    pub(crate) seller_name: Option<String>,
    pub(crate) seller_avatar: Option<String>,
    pub(crate) seller_badge: Option<String>,
    pub(crate) seller_email: Option<String>,
    pub(crate) seller_phone: Option<String>,
    pub(crate) seller_whatsapp: Option<String>,
    pub(crate) seller_show_phone: Option<bool>,
    pub(crate) seller_is_phone_verified: Option<bool>,
    pub(crate) seller_role: Option<UserRole>,
    pub(crate) seller_created_at: Option<OffsetDateTime>,
}

impl From<DetailRow> for ListingDetail {
    fn from(row: DetailRow) -> Self {
        let seller_id = row.listing.seller_id;
        let seller = match (row.seller_name, row.seller_email, row.seller_created_at) {
            (Some(name), Some(email), Some(created_at)) => Some(SellerContact {
                id: seller_id,
                name,
                avatar: row.seller_avatar,
                badge: row.seller_badge,
                email,
                phone: row.seller_phone,
                whatsapp: row.seller_whatsapp,
                show_phone: row.seller_show_phone.unwrap_or(false),
                is_phone_verified: row.seller_is_phone_verified.unwrap_or(false),
                role: row.seller_role.unwrap_or(UserRole::User),
                created_at,
            }),
            _ => None,
        };
        Self {
            listing: ListingRecord::from(row.listing),
            seller,
        }
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct FacetRow {
    pub(crate) key: Option<String>,
    pub(crate) count: i64,
    pub(crate) delivery_count: i64,
}

impl FacetRow {
    pub(crate) fn into_bucket(self) -> Option<FacetBucket> {
        Some(FacetBucket {
            key: self.key,
            count: self.count.try_into().ok()?,
            delivery_count: self.delivery_count.try_into().ok()?,
        })
    }
}
