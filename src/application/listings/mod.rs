//! Listing retrieval orchestration: cached search, single reads, similarity and
//! the writes that invalidate them.

mod commands;
mod queries;
mod service;
pub mod types;

pub use service::*;
pub use types::{CacheOutcome, Cached, CachedValue, ListingError, SearchPage, SimilarList};
