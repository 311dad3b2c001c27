use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::listings::{ListingDraft, ListingPatch};
use crate::domain::types::ListingStatus;

/// Success envelope shared by every API response.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingCreateRequest {
    pub seller_id: Uuid,
    #[serde(flatten)]
    pub listing: ListingDraft,
}

pub type ListingUpdateRequest = ListingPatch;

#[derive(Debug, Deserialize)]
pub struct ListingStatusRequest {
    pub status: ListingStatus,
}

#[derive(Debug, Deserialize)]
pub struct SimilarQuery {
    pub limit: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DeletedListing {
    pub id: Uuid,
    pub deleted: bool,
}
