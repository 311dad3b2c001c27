//! Domain entities mirrored from persistent storage.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::attributes::Attributes;
use crate::domain::types::{Condition, ListingStatus, PriceType, UserRole};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingImage {
    pub url: String,
    pub storage_key: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delivery {
    pub available: bool,
    pub national: bool,
    pub included: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingRecord {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: String,
    pub sub_category: Option<String>,
    pub province: String,
    pub city: String,
    pub price_type: PriceType,
    pub price: Option<f64>,
    pub delivery: Delivery,
    pub condition: Option<Condition>,
    pub seller_id: Uuid,
    pub attributes: Attributes,
    pub images: Vec<ListingImage>,
    pub status: ListingStatus,
    pub promoted: bool,
    #[serde(with = "time::serde::rfc3339::option")]
    pub promoted_until: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Seller fields exposed alongside list results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SellerPublic {
    pub id: Uuid,
    pub name: String,
    pub avatar: Option<String>,
    pub badge: Option<String>,
}

/// Seller fields exposed on a single listing read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SellerContact {
    pub id: Uuid,
    pub name: String,
    pub avatar: Option<String>,
    pub badge: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub whatsapp: Option<String>,
    pub show_phone: bool,
    pub is_phone_verified: bool,
    pub role: UserRole,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl SellerContact {
    /// Whether phone and whatsapp may be shown to other users.
    pub fn phone_visible(&self) -> bool {
        self.show_phone && self.is_phone_verified
    }

    /// Drop phone contact details unless the seller opted in with a verified phone.
    pub fn redact_contact(&mut self) {
        if !self.phone_visible() {
            self.phone = None;
            self.whatsapp = None;
        }
    }
}

/// List-display projection of a listing joined with public seller fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingSummary {
    pub id: Uuid,
    pub title: String,
    pub price: Option<f64>,
    pub price_type: PriceType,
    pub images: Vec<ListingImage>,
    pub city: String,
    pub province: String,
    pub sub_category: Option<String>,
    pub condition: Option<Condition>,
    pub promoted: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub seller_id: Uuid,
    pub seller: Option<SellerPublic>,
}

/// Full listing joined with seller contact fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListingDetail {
    #[serde(flatten)]
    pub listing: ListingRecord,
    pub seller: Option<SellerContact>,
}

impl ListingDetail {
    pub fn redacted(mut self) -> Self {
        if let Some(seller) = self.seller.as_mut() {
            seller.redact_contact();
        }
        self
    }
}
