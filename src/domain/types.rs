//! Shared domain enumerations aligned with persisted database enums.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "listing_status", rename_all = "snake_case")]
pub enum ListingStatus {
    Active,
    Pending,
    Removed,
    Sold,
}

impl ListingStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ListingStatus::Active => "active",
            ListingStatus::Pending => "pending",
            ListingStatus::Removed => "removed",
            ListingStatus::Sold => "sold",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "active" => Some(ListingStatus::Active),
            "pending" => Some(ListingStatus::Pending),
            "removed" => Some(ListingStatus::Removed),
            "sold" => Some(ListingStatus::Sold),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "price_type", rename_all = "snake_case")]
pub enum PriceType {
    Fixed,
    Negotiable,
    OnRequest,
    Free,
}

impl PriceType {
    /// Price types whose listings carry a comparable price.
    pub const PRICED: [PriceType; 2] = [PriceType::Fixed, PriceType::Negotiable];

    pub fn as_str(self) -> &'static str {
        match self {
            PriceType::Fixed => "fixed",
            PriceType::Negotiable => "negotiable",
            PriceType::OnRequest => "on_request",
            PriceType::Free => "free",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "fixed" => Some(PriceType::Fixed),
            "negotiable" => Some(PriceType::Negotiable),
            "on_request" => Some(PriceType::OnRequest),
            "free" => Some(PriceType::Free),
            _ => None,
        }
    }

    pub fn requires_price(self) -> bool {
        matches!(self, PriceType::Fixed | PriceType::Negotiable)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "item_condition", rename_all = "snake_case")]
pub enum Condition {
    New,
    Used,
    Refurbished,
}

impl Condition {
    pub fn as_str(self) -> &'static str {
        match self {
            Condition::New => "new",
            Condition::Used => "used",
            Condition::Refurbished => "refurbished",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "new" => Some(Condition::New),
            "used" => Some(Condition::Used),
            "refurbished" => Some(Condition::Refurbished),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "user_role", rename_all = "snake_case")]
pub enum UserRole {
    User,
    Admin,
}
