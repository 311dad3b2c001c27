use std::sync::Arc;

use async_trait::async_trait;

use crate::application::listings::ListingService;
use crate::infra::db::PostgresRepositories;

/// Liveness probe for the backing listing store.
#[async_trait]
pub trait StoreHealth: Send + Sync {
    async fn check(&self) -> Result<(), sqlx::Error>;
}

#[async_trait]
impl StoreHealth for PostgresRepositories {
    async fn check(&self) -> Result<(), sqlx::Error> {
        self.health_check().await
    }
}

#[derive(Clone)]
pub struct ApiState {
    pub listings: Arc<ListingService>,
    pub health: Arc<dyn StoreHealth>,
}
