//! Postgres-backed repository implementations.

mod listings;
mod util;

pub use util::map_sqlx_error;

use std::sync::Arc;

use sqlx::{
    Postgres, QueryBuilder,
    postgres::{PgPool, PgPoolOptions},
    query,
};

use crate::application::repos::{ListingFilter, ListingSort, RepoError};

/// Text search configuration; `simple` keeps French and Lingala terms unstemmed.
const TEXT_SEARCH_CONFIG: &str = "simple";

#[derive(Clone)]
pub struct PostgresRepositories {
    pool: Arc<PgPool>,
}

impl PostgresRepositories {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn connect(url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
        PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await
    }

    pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./migrations")
            .run(pool)
            .await
            .map_err(Into::into)
    }

    pub async fn health_check(&self) -> Result<(), sqlx::Error> {
        query("SELECT 1").execute(self.pool()).await.map(|_| ())
    }

    /// Append `AND ...` predicates for `filter` to a query over `listings l`.
    fn apply_listing_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &ListingFilter) {
        if let Some(status) = filter.status {
            qb.push(" AND l.status = ");
            qb.push_bind(status);
        }

        if let Some(text) = filter.text.as_ref() {
            qb.push(" AND l.search_vector @@ websearch_to_tsquery('");
            qb.push(TEXT_SEARCH_CONFIG);
            qb.push("', ");
            qb.push_bind(text.clone());
            qb.push(")");
        }

        if let Some(seller_id) = filter.seller_id {
            qb.push(" AND l.seller_id = ");
            qb.push_bind(seller_id);
        }

        let equalities = [
            ("l.category", &filter.category),
            ("l.sub_category", &filter.sub_category),
            ("l.province", &filter.province),
            ("l.city", &filter.city),
        ];
        for (column, value) in equalities {
            if let Some(value) = value.as_ref() {
                qb.push(" AND ");
                qb.push(column);
                qb.push(" = ");
                qb.push_bind(value.clone());
            }
        }

        if !filter.price_types.is_empty() {
            qb.push(" AND l.price_type IN (");
            let mut separated = qb.separated(", ");
            for price_type in &filter.price_types {
                separated.push_bind(*price_type);
            }
            separated.push_unseparated(")");
        }

        if let Some(condition) = filter.condition {
            qb.push(" AND l.condition = ");
            qb.push_bind(condition);
        }

        if let Some(promoted) = filter.promoted {
            qb.push(" AND l.promoted = ");
            qb.push_bind(promoted);
        }

        if filter.delivery_only {
            qb.push(" AND l.delivery_available");
        }

        if let Some(min) = filter.price_min {
            qb.push(" AND l.price >= ");
            qb.push_bind(min);
        }

        if let Some(max) = filter.price_max {
            qb.push(" AND l.price <= ");
            qb.push_bind(max);
        }

        for (key, value) in &filter.attributes {
            qb.push(" AND (l.attributes ->> ");
            qb.push_bind(key.clone());
            qb.push(" = ");
            qb.push_bind(value.clone());
            if let Some(number) = value.parse::<f64>().ok().filter(|n| n.is_finite()) {
                qb.push(" OR l.attributes -> ");
                qb.push_bind(key.clone());
                qb.push(" = to_jsonb(");
                qb.push_bind(number);
                qb.push("::double precision)");
            }
            qb.push(")");
        }

        if !filter.exclude_ids.is_empty() {
            qb.push(" AND NOT (l.id = ANY(");
            qb.push_bind(filter.exclude_ids.clone());
            qb.push("))");
        }
    }

    fn push_listing_order(qb: &mut QueryBuilder<'_, Postgres>, sort: ListingSort) {
        match sort {
            ListingSort::Newest => qb.push(" ORDER BY l.created_at DESC, l.id DESC"),
            ListingSort::PriceAsc => {
                qb.push(" ORDER BY l.price ASC NULLS LAST, l.created_at DESC, l.id DESC")
            }
            ListingSort::PriceDesc => {
                qb.push(" ORDER BY l.price DESC NULLS LAST, l.created_at DESC, l.id DESC")
            }
        };
    }

    fn convert_count(value: i64) -> Result<u64, RepoError> {
        value
            .try_into()
            .map_err(|_| RepoError::from_persistence("count exceeds supported range"))
    }
}
