//! Image attachments.
//!
//! Mutations return the complete updated image list rather than a delta so
//! callers can replace their copy wholesale.

use billsplit_shared::rpc::NewImage;
use billsplit_shared::{BillId, Image, ImageId};

use crate::database::Database;
use crate::document::load_images;
use crate::error::{Result, StoreError};

impl Database {
    pub fn get_bill_images(&self, id: BillId) -> Result<Option<Vec<Image>>> {
        load_images(self.conn(), id)
    }

    /// Append `images` with fresh IDs, keeping the bill at or under
    /// `max_images` attachments.
    pub fn append_images(
        &self,
        id: BillId,
        images: Vec<NewImage>,
        max_images: usize,
    ) -> Result<Option<Vec<Image>>> {
        self.modify_images(id, |stored| {
            let count = stored.len() + images.len();
            if count > max_images {
                return Err(StoreError::ImageLimit {
                    count,
                    limit: max_images,
                });
            }

            stored.extend(images.into_iter().map(|img| Image {
                id: ImageId::new(),
                mime_type: img.mime_type,
                base64_data: img.base64_data,
            }));

            tracing::debug!(bill_id = %id, count = stored.len(), "appended images");
            Ok(Some(stored.clone()))
        })
    }

    /// Remove one image. `Ok(None)` if the bill or the image is missing.
    pub fn remove_image(&self, bill_id: BillId, image_id: ImageId) -> Result<Option<Vec<Image>>> {
        self.modify_images(bill_id, |stored| {
            let before = stored.len();
            stored.retain(|img| img.id != image_id);
            if stored.len() == before {
                return Ok(None);
            }
            Ok(Some(stored.clone()))
        })
    }
}
