//! Bill images.
//!
//! Image payloads are fetched separately from the bill. Uploads and
//! deletions answer with the complete list, which replaces the cached one.

use billsplit_shared::rpc::NewImage;
use billsplit_shared::{BillId, Image, ImageId};

use crate::resource::{Fetched, Resource};
use crate::session::BillSession;
use crate::state::{BillsAction, Cached};

impl BillSession {
    pub async fn fetch_bill_images(&self, bill_id: BillId) -> Cached<Vec<Image>> {
        self.dispatch(BillsAction::ImagesFetched {
            bill_id,
            images: Fetched::Success(Resource::Loading),
        });

        let images = self
            .request("Failed to load images", self.api.bill_get_images(bill_id))
            .await;

        self.dispatch(BillsAction::ImagesFetched {
            bill_id,
            images: images.clone(),
        });
        images
    }

    pub async fn upload_images(&self, bill_id: BillId, images: Vec<NewImage>) -> Cached<Vec<Image>> {
        let count = images.len();
        let images = self
            .request(
                "Failed to upload images",
                self.api.bill_upload_images(bill_id, images),
            )
            .await;
        self.store_images_result(bill_id, &images);

        if images.success().is_some_and(|r| r.loaded().is_some()) {
            tracing::info!(bill_id = %bill_id, count, "Images uploaded");
        }
        images
    }

    /// Delete one image. `NotFound` if the bill or the image is gone; the
    /// cached list is refreshed in the latter case.
    pub async fn delete_image(&self, bill_id: BillId, image_id: ImageId) -> Cached<Vec<Image>> {
        let images = self
            .request(
                "Failed to delete image",
                self.api.bill_delete_image(bill_id, image_id),
            )
            .await;

        if images.success().is_some_and(Resource::is_not_found) {
            // The image may have been removed elsewhere; resync the list.
            self.fetch_bill_images(bill_id).await;
        } else {
            self.store_images_result(bill_id, &images);
        }
        images
    }

    fn store_images_result(&self, bill_id: BillId, result: &Cached<Vec<Image>>) {
        if let Fetched::Success(resource @ (Resource::Loaded(_) | Resource::NotFound)) = result {
            self.dispatch(BillsAction::ImagesFetched {
                bill_id,
                images: Fetched::Success(resource.clone()),
            });
        }
    }
}
