//! Facet aggregation over a compiled filter.

use serde::Serialize;

use crate::application::repos::{FacetBucket, ListingFilter, ListingsRepo, RepoError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FacetCount {
    pub value: String,
    pub count: u64,
}

/// Breakdown of the current result set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Facets {
    /// Listings per subCategory, most populated first.
    pub sub_categories: Vec<FacetCount>,
    /// Listings offering delivery, across every subCategory.
    pub delivery_available: u64,
}

impl Facets {
    pub fn from_buckets(buckets: Vec<FacetBucket>) -> Self {
        let delivery_available = buckets.iter().map(|bucket| bucket.delivery_count).sum();

        let mut sub_categories: Vec<FacetCount> = buckets
            .into_iter()
            .filter(|bucket| bucket.count > 0)
            .filter_map(|bucket| {
                bucket.key.map(|value| FacetCount {
                    value,
                    count: bucket.count,
                })
            })
            .collect();
        sub_categories.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.value.cmp(&b.value)));

        Self {
            sub_categories,
            delivery_available,
        }
    }
}

/// Aggregate facets for `filter` with one grouped query.
pub async fn aggregate(repo: &dyn ListingsRepo, filter: &ListingFilter) -> Result<Facets, RepoError> {
    let buckets = repo.facet_buckets(filter).await?;
    Ok(Facets::from_buckets(buckets))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bucket(key: Option<&str>, count: u64, delivery_count: u64) -> FacetBucket {
        FacetBucket {
            key: key.map(str::to_string),
            count,
            delivery_count,
        }
    }

    #[test]
    fn buckets_sorted_by_count_then_key() {
        let facets = Facets::from_buckets(vec![
            bucket(Some("motos"), 2, 0),
            bucket(Some("voitures"), 5, 1),
            bucket(Some("camions"), 2, 2),
        ]);
        let order: Vec<_> = facets
            .sub_categories
            .iter()
            .map(|facet| (facet.value.as_str(), facet.count))
            .collect();
        assert_eq!(order, vec![("voitures", 5), ("camions", 2), ("motos", 2)]);
        assert_eq!(facets.delivery_available, 3);
    }

    #[test]
    fn missing_sub_category_counts_only_toward_delivery() {
        let facets = Facets::from_buckets(vec![bucket(None, 4, 3), bucket(Some("motos"), 1, 1)]);
        assert_eq!(facets.sub_categories.len(), 1);
        assert_eq!(facets.delivery_available, 4);
    }

    #[test]
    fn serializes_camel_case() {
        let facets = Facets::from_buckets(vec![bucket(Some("motos"), 1, 0)]);
        let json = serde_json::to_value(&facets).expect("serialize");
        assert_eq!(json["subCategories"][0]["value"], "motos");
        assert_eq!(json["deliveryAvailable"], 0);
    }
}
