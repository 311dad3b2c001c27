//! Listing search, filter and cache service for a classifieds marketplace.

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;
