//! Search parameter compilation.
//!
//! Untrusted query-string parameters are first partitioned into [`SearchParams`]
//! (named fields plus the open `attr_*` map) and then compiled into a
//! [`QuerySpec`] against the listing collection.

use std::collections::BTreeMap;

use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::application::pagination::PageWindow;
use crate::application::repos::{ListingFilter, ListingSort};
use crate::config::SearchSettings;
use crate::domain::types::{Condition, ListingStatus, PriceType};

const ATTRIBUTE_PREFIX: &str = "attr_";
const DEFAULT_LIMIT: u32 = 24;
/// Hard page size cap; configured limits can only lower it.
pub const MAX_LIMIT: u32 = 50;

/// Inbound parameters as received: every name maps to all of its values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawParams(BTreeMap<String, Vec<String>>);

impl RawParams {
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut map: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (key, value) in pairs {
            map.entry(key.into()).or_default().push(value.into());
        }
        Self(map)
    }

    pub fn as_map(&self) -> &BTreeMap<String, Vec<String>> {
        &self.0
    }

    /// First non-blank value of `name`, trimmed.
    pub fn first(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(|values| first_non_blank(values))
    }
}

fn first_non_blank(values: &[String]) -> Option<&str> {
    values
        .iter()
        .map(|value| value.trim())
        .find(|value| !value.is_empty())
}

/// Typed view over the recognised search parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchParams {
    pub q: Option<String>,
    pub seller_id: Option<String>,
    pub category: Option<String>,
    pub sub_category: Option<String>,
    pub province: Option<String>,
    pub city: Option<String>,
    pub price_type: Option<String>,
    pub condition: Option<String>,
    pub promoted: Option<String>,
    pub delivery: Option<String>,
    pub min: Option<String>,
    pub max: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
    pub sort: Option<String>,
    pub status: Option<String>,
    /// `attr_<key>` parameters keyed by `<key>`.
    pub attributes: BTreeMap<String, String>,
}

impl SearchParams {
    pub fn from_raw(raw: &RawParams) -> Self {
        let named = |name: &str| raw.first(name).map(str::to_string);

        let attributes = raw
            .as_map()
            .iter()
            .filter_map(|(name, values)| {
                let key = name.strip_prefix(ATTRIBUTE_PREFIX)?;
                if key.is_empty() {
                    return None;
                }
                let value = first_non_blank(values)?;
                Some((key.to_string(), value.to_string()))
            })
            .collect();

        Self {
            q: named("q"),
            seller_id: named("sellerId"),
            category: named("category"),
            sub_category: named("subCategory"),
            province: named("province"),
            city: named("city"),
            price_type: named("priceType"),
            condition: named("condition"),
            promoted: named("promoted"),
            delivery: named("delivery"),
            min: named("min"),
            max: named("max"),
            page: named("page"),
            limit: named("limit"),
            sort: named("sort"),
            status: named("status"),
            attributes,
        }
    }
}

/// Visibility context a search runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingScope {
    /// Marketplace browsing: only active listings.
    Public,
    /// A seller's own listings, any status unless `status` narrows it.
    Seller(Uuid),
    /// Moderation view, any status unless `status` narrows it.
    Admin,
}

impl ListingScope {
    pub fn is_public(self) -> bool {
        matches!(self, ListingScope::Public)
    }
}

/// Page size bounds applied while compiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchLimits {
    pub default_limit: u32,
    pub max_limit: u32,
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_LIMIT,
            max_limit: MAX_LIMIT,
        }
    }
}

impl From<&SearchSettings> for SearchLimits {
    fn from(settings: &SearchSettings) -> Self {
        Self {
            default_limit: settings.default_limit,
            max_limit: settings.max_limit,
        }
    }
}

/// Compiled search: what to match, how to order it and which page to return.
#[derive(Debug, Clone, PartialEq)]
pub struct QuerySpec {
    pub filter: ListingFilter,
    pub sort: ListingSort,
    pub window: PageWindow,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("unknown price type `{0}`")]
    InvalidPriceType(String),
    #[error("unknown condition `{0}`")]
    InvalidCondition(String),
    #[error("seller id `{0}` is not a valid identifier")]
    InvalidSellerId(String),
    #[error("unknown listing status `{0}`")]
    InvalidStatus(String),
}

impl QueryError {
    /// Parameter name the error refers to.
    pub fn parameter(&self) -> &'static str {
        match self {
            QueryError::InvalidPriceType(_) => "priceType",
            QueryError::InvalidCondition(_) => "condition",
            QueryError::InvalidSellerId(_) => "sellerId",
            QueryError::InvalidStatus(_) => "status",
        }
    }
}

/// Compile typed parameters into a query specification for `scope`.
pub fn compile(
    params: &SearchParams,
    scope: ListingScope,
    limits: SearchLimits,
) -> Result<QuerySpec, QueryError> {
    let filter = compile_filter(params, scope)?;
    let sort = params
        .sort
        .as_deref()
        .map(ListingSort::parse)
        .unwrap_or_default();
    let window = PageWindow::new(
        parse_page(params.page.as_deref()),
        parse_limit(params.limit.as_deref(), limits),
    );

    Ok(QuerySpec {
        filter,
        sort,
        window,
    })
}

/// Build the filter shared by the page query, the count and the facets.
pub fn compile_filter(
    params: &SearchParams,
    scope: ListingScope,
) -> Result<ListingFilter, QueryError> {
    let mut filter = ListingFilter::default();

    match scope {
        ListingScope::Public => filter.status = Some(ListingStatus::Active),
        ListingScope::Seller(_) | ListingScope::Admin => {
            filter.status = params
                .status
                .as_deref()
                .map(|value| {
                    ListingStatus::parse(value)
                        .ok_or_else(|| QueryError::InvalidStatus(value.to_string()))
                })
                .transpose()?;
        }
    }

    filter.text = params.q.clone();

    filter.seller_id = match scope {
        ListingScope::Seller(seller_id) => Some(seller_id),
        ListingScope::Public | ListingScope::Admin => params
            .seller_id
            .as_deref()
            .map(|value| {
                Uuid::parse_str(value).map_err(|_| QueryError::InvalidSellerId(value.to_string()))
            })
            .transpose()?,
    };

    filter.category = params.category.clone();
    filter.sub_category = params.sub_category.clone();
    filter.province = params.province.clone();
    filter.city = params.city.clone();

    let explicit_price_type = params
        .price_type
        .as_deref()
        .map(|value| {
            PriceType::parse(value).ok_or_else(|| QueryError::InvalidPriceType(value.to_string()))
        })
        .transpose()?;

    filter.condition = params
        .condition
        .as_deref()
        .map(|value| {
            Condition::parse(value).ok_or_else(|| QueryError::InvalidCondition(value.to_string()))
        })
        .transpose()?;

    filter.promoted = params.promoted.as_deref().and_then(|value| match value {
        "true" => Some(true),
        "false" => Some(false),
        other => {
            debug!(parameter = "promoted", value = other, "ignoring non-boolean flag");
            None
        }
    });

    filter.delivery_only = params.delivery.as_deref().is_some_and(is_truthy);

    filter.price_min = parse_price_bound("min", params.min.as_deref());
    filter.price_max = parse_price_bound("max", params.max.as_deref());

    filter.price_types = if filter.price_min.is_some() || filter.price_max.is_some() {
        match explicit_price_type {
            Some(price_type) if price_type.requires_price() => vec![price_type],
            _ => PriceType::PRICED.to_vec(),
        }
    } else {
        explicit_price_type.into_iter().collect()
    };

    filter.attributes = params.attributes.clone();

    Ok(filter)
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.to_ascii_lowercase().as_str(),
        "true" | "1" | "yes" | "on"
    )
}

fn parse_price_bound(name: &'static str, value: Option<&str>) -> Option<f64> {
    let raw = value?;
    match raw.parse::<f64>() {
        Ok(bound) if bound.is_finite() => Some(bound),
        _ => {
            debug!(parameter = name, value = raw, "dropping malformed price bound");
            None
        }
    }
}

fn parse_page(value: Option<&str>) -> u32 {
    match value.map(str::parse::<i64>) {
        None => 1,
        Some(Ok(page)) => page.clamp(1, i64::from(u32::MAX)) as u32,
        Some(Err(_)) => {
            debug!(parameter = "page", "dropping malformed page number");
            1
        }
    }
}

fn parse_limit(value: Option<&str>, limits: SearchLimits) -> u32 {
    let max = limits.max_limit.clamp(1, MAX_LIMIT);
    let requested = match value.map(str::parse::<i64>) {
        None => i64::from(limits.default_limit),
        Some(Ok(limit)) => limit,
        Some(Err(_)) => {
            debug!(parameter = "limit", "dropping malformed page size");
            i64::from(limits.default_limit)
        }
    };
    requested.clamp(1, i64::from(max)) as u32
}
