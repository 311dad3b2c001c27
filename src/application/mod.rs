//! Application services layer.

pub mod error;
pub mod facets;
pub mod listings;
pub mod pagination;
pub mod query;
pub mod repos;
pub mod similar;
