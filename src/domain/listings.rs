//! Listing write-side invariants.

use serde::{Deserialize, Deserializer};
use time::OffsetDateTime;

use crate::domain::attributes::Attributes;
use crate::domain::entities::{Delivery, ListingImage, ListingRecord};
use crate::domain::error::DomainError;
use crate::domain::types::{Condition, PriceType};

pub const TITLE_MAX_CHARS: usize = 200;
pub const DESCRIPTION_MAX_CHARS: usize = 5000;
pub const IMAGES_MAX: usize = 10;

/// Seller-editable listing content, validated before it reaches persistence.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingDraft {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub category: String,
    #[serde(default)]
    pub sub_category: Option<String>,
    pub province: String,
    pub city: String,
    pub price_type: PriceType,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub delivery: Delivery,
    #[serde(default)]
    pub condition: Option<Condition>,
    #[serde(default)]
    pub attributes: Attributes,
    #[serde(default)]
    pub images: Vec<ListingImage>,
    #[serde(default)]
    pub promoted: bool,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub promoted_until: Option<OffsetDateTime>,
}

/// Partial update; absent fields keep their stored value.
///
/// `subCategory`, `condition` and `promotedUntil` are cleared by an explicit
/// `null`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub sub_category: Option<Option<String>>,
    pub province: Option<String>,
    pub city: Option<String>,
    pub price_type: Option<PriceType>,
    pub price: Option<f64>,
    pub delivery: Option<Delivery>,
    #[serde(default, deserialize_with = "nullable")]
    pub condition: Option<Option<Condition>>,
    pub attributes: Option<Attributes>,
    pub images: Option<Vec<ListingImage>>,
    pub promoted: Option<bool>,
    #[serde(default, deserialize_with = "nullable_rfc3339")]
    pub promoted_until: Option<Option<OffsetDateTime>>,
}

/// Present field (value or `null`) becomes `Some`; a missing one stays `None` via `default`.
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn nullable_rfc3339<'de, D>(deserializer: D) -> Result<Option<Option<OffsetDateTime>>, D::Error>
where
    D: Deserializer<'de>,
{
    time::serde::rfc3339::option::deserialize(deserializer).map(Some)
}

impl ListingDraft {
    /// Draft holding the current content of a stored listing.
    pub fn from_record(record: &ListingRecord) -> Self {
        Self {
            title: record.title.clone(),
            description: record.description.clone(),
            category: record.category.clone(),
            sub_category: record.sub_category.clone(),
            province: record.province.clone(),
            city: record.city.clone(),
            price_type: record.price_type,
            price: record.price,
            delivery: record.delivery,
            condition: record.condition,
            attributes: record.attributes.clone(),
            images: record.images.clone(),
            promoted: record.promoted,
            promoted_until: record.promoted_until,
        }
    }

    pub fn apply(mut self, patch: ListingPatch) -> Self {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(sub_category) = patch.sub_category {
            self.sub_category = sub_category;
        }
        if let Some(province) = patch.province {
            self.province = province;
        }
        if let Some(city) = patch.city {
            self.city = city;
        }
        if let Some(price_type) = patch.price_type {
            self.price_type = price_type;
        }
        if let Some(price) = patch.price {
            self.price = Some(price);
        }
        if let Some(delivery) = patch.delivery {
            self.delivery = delivery;
        }
        if let Some(condition) = patch.condition {
            self.condition = condition;
        }
        if let Some(attributes) = patch.attributes {
            self.attributes = attributes;
        }
        if let Some(images) = patch.images {
            self.images = images;
        }
        if let Some(promoted) = patch.promoted {
            self.promoted = promoted;
        }
        if let Some(until) = patch.promoted_until {
            self.promoted_until = until;
        }
        self
    }

    /// Trim text fields and enforce the price/priceType invariant.
    pub fn validate(mut self) -> Result<Self, DomainError> {
        self.title = self.title.trim().to_string();
        if self.title.is_empty() {
            return Err(DomainError::validation("title", "title is required"));
        }
        if self.title.chars().count() > TITLE_MAX_CHARS {
            return Err(DomainError::validation(
                "title",
                format!("title must be at most {TITLE_MAX_CHARS} characters"),
            ));
        }

        self.description = self.description.trim().to_string();
        if self.description.chars().count() > DESCRIPTION_MAX_CHARS {
            return Err(DomainError::validation(
                "description",
                format!("description must be at most {DESCRIPTION_MAX_CHARS} characters"),
            ));
        }

        self.category = self.category.trim().to_string();
        if self.category.is_empty() {
            return Err(DomainError::validation("category", "category is required"));
        }
        self.sub_category = normalize_optional(self.sub_category);

        self.province = self.province.trim().to_string();
        if self.province.is_empty() {
            return Err(DomainError::validation("province", "province is required"));
        }
        self.city = self.city.trim().to_string();
        if self.city.is_empty() {
            return Err(DomainError::validation("city", "city is required"));
        }

        if self.price_type.requires_price() {
            match self.price {
                Some(price) if price.is_finite() && price >= 0.0 => {}
                Some(_) => {
                    return Err(DomainError::validation(
                        "price",
                        "price must be a non-negative number",
                    ));
                }
                None => {
                    return Err(DomainError::validation(
                        "price",
                        format!(
                            "price is required when priceType is `{}`",
                            self.price_type.as_str()
                        ),
                    ));
                }
            }
        } else {
            self.price = None;
        }

        if self.images.len() > IMAGES_MAX {
            return Err(DomainError::validation(
                "images",
                format!("at most {IMAGES_MAX} images are allowed"),
            ));
        }

        if self.attributes.keys().any(|key| key.trim().is_empty()) {
            return Err(DomainError::validation(
                "attributes",
                "attribute names must not be blank",
            ));
        }

        if !self.promoted {
            self.promoted_until = None;
        }

        Ok(self)
    }
}

fn normalize_optional(value: Option<String>) -> Option<String> {
    value.and_then(|value| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}
