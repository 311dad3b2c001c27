mod read;
mod types;
mod write;

use super::PostgresRepositories;

/// Listing columns selected from `listings l`, in `ListingRow` order.
const LISTING_COLUMNS: &str = "l.id, l.title, l.description, l.category, l.sub_category, \
     l.province, l.city, l.price_type, l.price, l.delivery_available, l.delivery_national, \
     l.delivery_included, l.condition, l.seller_id, l.attributes, l.images, l.status, \
     l.promoted, l.promoted_until, l.created_at, l.updated_at";
