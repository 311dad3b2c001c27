use tracing::info;
use uuid::Uuid;

use crate::application::repos::{
    CreateListingParams, UpdateListingParams, UpdateListingStatusParams,
};
use crate::domain::entities::ListingRecord;
use crate::domain::listings::{ListingDraft, ListingPatch};
use crate::domain::types::ListingStatus;

use super::service::ListingService;
use super::types::ListingError;

impl ListingService {
    pub async fn create_listing(
        &self,
        seller_id: Uuid,
        draft: ListingDraft,
    ) -> Result<ListingRecord, ListingError> {
        let draft = draft.validate()?;
        let record = self
            .writer
            .create_listing(CreateListingParams { seller_id, draft })
            .await?;

        self.invalidate(None);
        info!(
            target = "application::listings::create_listing",
            listing_id = %record.id,
            seller_id = %seller_id,
            "listing created"
        );
        Ok(record)
    }

    pub async fn update_listing(
        &self,
        id: Uuid,
        patch: ListingPatch,
    ) -> Result<ListingRecord, ListingError> {
        let current = self
            .reader
            .find_by_id(id)
            .await?
            .ok_or(ListingError::NotFound(id))?;
        let draft = ListingDraft::from_record(&current).apply(patch).validate()?;

        let record = self
            .writer
            .update_listing(UpdateListingParams { id, draft })
            .await
            .map_err(|err| ListingError::from_write(id, err))?;

        self.invalidate(Some(id));
        info!(
            target = "application::listings::update_listing",
            listing_id = %id,
            "listing updated"
        );
        Ok(record)
    }

    /// Moderation outcome, sale or soft removal.
    pub async fn set_status(
        &self,
        id: Uuid,
        status: ListingStatus,
    ) -> Result<ListingRecord, ListingError> {
        let record = self
            .writer
            .update_listing_status(UpdateListingStatusParams { id, status })
            .await
            .map_err(|err| ListingError::from_write(id, err))?;

        self.invalidate(Some(id));
        info!(
            target = "application::listings::set_status",
            listing_id = %id,
            status = status.as_str(),
            "listing status changed"
        );
        Ok(record)
    }

    pub async fn delete_listing(&self, id: Uuid) -> Result<(), ListingError> {
        self.writer
            .delete_listing(id)
            .await
            .map_err(|err| ListingError::from_write(id, err))?;

        self.invalidate(Some(id));
        info!(
            target = "application::listings::delete_listing",
            listing_id = %id,
            "listing deleted"
        );
        Ok(())
    }
}
