//! Related listings by tiered relaxation.
//!
//! Tiers run in order and only while the result is still short:
//! same subCategory and city, then same subCategory and province, then same
//! category. Every tier is restricted to active listings and excludes the anchor
//! plus everything already collected.

use crate::application::pagination::PageWindow;
use crate::application::repos::{ListingFilter, ListingSort, ListingsRepo, RepoError};
use crate::domain::entities::{ListingRecord, ListingSummary};
use crate::domain::types::ListingStatus;

pub const SIMILAR_MAX_LIMIT: u32 = 24;

/// Clamp a requested list length into `1..=SIMILAR_MAX_LIMIT`.
pub fn clamp_limit(requested: u32) -> u32 {
    requested.clamp(1, SIMILAR_MAX_LIMIT)
}

/// Filters for each relaxation tier, most specific first.
///
/// An anchor without a subCategory only gets the category tier.
pub fn tier_filters(anchor: &ListingRecord) -> Vec<ListingFilter> {
    let base = ListingFilter {
        status: Some(ListingStatus::Active),
        ..ListingFilter::default()
    };

    let mut tiers = Vec::with_capacity(3);
    if let Some(sub_category) = anchor.sub_category.as_ref() {
        tiers.push(ListingFilter {
            sub_category: Some(sub_category.clone()),
            city: Some(anchor.city.clone()),
            ..base.clone()
        });
        tiers.push(ListingFilter {
            sub_category: Some(sub_category.clone()),
            province: Some(anchor.province.clone()),
            ..base.clone()
        });
    }
    tiers.push(ListingFilter {
        category: Some(anchor.category.clone()),
        ..base
    });
    tiers
}

/// Collect up to `limit` listings related to `anchor`, in tier order.
pub async fn resolve(
    repo: &dyn ListingsRepo,
    anchor: &ListingRecord,
    limit: u32,
) -> Result<Vec<ListingSummary>, RepoError> {
    let limit = clamp_limit(limit);
    let wanted = limit as usize;
    let mut collected: Vec<ListingSummary> = Vec::with_capacity(wanted);
    let mut seen = vec![anchor.id];

    for mut filter in tier_filters(anchor) {
        if collected.len() >= wanted {
            break;
        }
        let remaining = limit - collected.len() as u32;
        filter.exclude_ids = seen.clone();

        let found = repo
            .list_summaries(&filter, ListingSort::Newest, PageWindow::new(1, remaining))
            .await?;
        for summary in found {
            if collected.len() >= wanted || seen.contains(&summary.id) {
                continue;
            }
            seen.push(summary.id);
            collected.push(summary);
        }
    }

    Ok(collected)
}
