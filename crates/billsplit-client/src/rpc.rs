//! RPC client.
//!
//! [`BillApi`] is the seam between the session and the transport; the
//! session only ever talks to a `dyn BillApi`. [`HttpBillApi`] is the real
//! implementation against the server's `/rpc/<name>` routes.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use billsplit_shared::rpc::{
    AddChargeInput, AddChargeOutput, AddLineItemInput, AddLineItemOutput, AddTagInput,
    AddTagOutput, AddUserInput, AddUserOutput, BillIdInput, ChargeInput, ChargeUpdate,
    CreateBillInput, DeleteBillOutput, DeleteImageInput, LineItemInput, LineItemUpdate, NewImage,
    Procedure, ProcedureKind, RemoveChargeInput, RemoveLineItemInput, RemoveTagInput,
    RemoveUserInput, RenameBillInput, UpdateChargeInput, UpdateLineItemInput, UploadImagesInput,
};
use billsplit_shared::split::SplitSummary;
use billsplit_shared::{
    Bill, BillId, BillSummary, ChargeId, Image, ImageId, LineItem, LineItemId, ProportionalCharge,
    TagId, UserId,
};

use crate::error::{ClientError, Result};

/// One method per procedure. `Ok(None)` is the server's "not found".
#[async_trait]
pub trait BillApi: Send + Sync {
    async fn bill_list(&self) -> Result<Vec<BillSummary>>;
    async fn bill_get(&self, id: BillId) -> Result<Option<Bill>>;
    async fn bill_get_images(&self, id: BillId) -> Result<Option<Vec<Image>>>;
    async fn bill_split(&self, id: BillId) -> Result<Option<SplitSummary>>;

    async fn bill_create(&self, name: &str) -> Result<Bill>;
    async fn bill_rename(&self, id: BillId, name: &str) -> Result<Option<Bill>>;
    async fn bill_delete(&self, id: BillId) -> Result<bool>;

    async fn bill_upload_images(
        &self,
        id: BillId,
        images: Vec<NewImage>,
    ) -> Result<Option<Vec<Image>>>;
    async fn bill_delete_image(&self, bill_id: BillId, image_id: ImageId)
        -> Result<Option<Vec<Image>>>;

    async fn bill_add_user(&self, bill_id: BillId, name: &str) -> Result<Option<AddUserOutput>>;
    async fn bill_remove_user(&self, bill_id: BillId, user_id: UserId) -> Result<Option<Bill>>;
    async fn bill_add_tag(&self, bill_id: BillId, name: &str) -> Result<Option<AddTagOutput>>;
    async fn bill_remove_tag(&self, bill_id: BillId, tag_id: TagId) -> Result<Option<Bill>>;

    async fn bill_add_line_item(
        &self,
        bill_id: BillId,
        line_item: Option<LineItemInput>,
    ) -> Result<Option<AddLineItemOutput>>;
    async fn bill_update_line_item(
        &self,
        bill_id: BillId,
        line_item: LineItemUpdate,
    ) -> Result<Option<LineItem>>;
    async fn bill_remove_line_item(
        &self,
        bill_id: BillId,
        line_item_id: LineItemId,
    ) -> Result<Option<Bill>>;

    async fn bill_add_charge(
        &self,
        bill_id: BillId,
        charge: ChargeInput,
    ) -> Result<Option<AddChargeOutput>>;
    async fn bill_update_charge(
        &self,
        bill_id: BillId,
        charge: ChargeUpdate,
    ) -> Result<Option<ProportionalCharge>>;
    async fn bill_remove_charge(&self, bill_id: BillId, charge_id: ChargeId)
        -> Result<Option<Bill>>;
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// [`BillApi`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpBillApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBillApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, reqwest::Client::new())
    }

    /// Use a preconfigured `reqwest` client (timeouts, proxies, ...).
    pub fn with_client(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, procedure: Procedure) -> String {
        format!("{}{}", self.base_url, procedure.path())
    }

    async fn call<I, O>(&self, procedure: Procedure, input: &I) -> Result<O>
    where
        I: Serialize + Sync,
        O: DeserializeOwned,
    {
        let url = self.url(procedure);
        let request = match procedure.kind() {
            ProcedureKind::Query => {
                let input = serde_json::to_string(input)?;
                self.client.get(&url).query(&[("input", input)])
            }
            ProcedureKind::Mutation => self.client.post(&url).json(input),
        };

        tracing::debug!(procedure = procedure.name(), "RPC call");
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = match response.json::<ErrorBody>().await {
                Ok(body) => body.error,
                Err(_) => status.to_string(),
            };
            tracing::warn!(procedure = procedure.name(), %status, %message, "RPC call failed");
            return Err(ClientError::Server {
                status: status.as_u16(),
                message,
            });
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl BillApi for HttpBillApi {
    async fn bill_list(&self) -> Result<Vec<BillSummary>> {
        self.call(Procedure::BillList, &()).await
    }

    async fn bill_get(&self, id: BillId) -> Result<Option<Bill>> {
        self.call(Procedure::BillGet, &BillIdInput { id }).await
    }

    async fn bill_get_images(&self, id: BillId) -> Result<Option<Vec<Image>>> {
        self.call(Procedure::BillGetImages, &BillIdInput { id }).await
    }

    async fn bill_split(&self, id: BillId) -> Result<Option<SplitSummary>> {
        self.call(Procedure::BillSplit, &BillIdInput { id }).await
    }

    async fn bill_create(&self, name: &str) -> Result<Bill> {
        let input = CreateBillInput {
            name: name.to_string(),
        };
        self.call(Procedure::BillCreate, &input).await
    }

    async fn bill_rename(&self, id: BillId, name: &str) -> Result<Option<Bill>> {
        let input = RenameBillInput {
            id,
            name: name.to_string(),
        };
        self.call(Procedure::BillRename, &input).await
    }

    async fn bill_delete(&self, id: BillId) -> Result<bool> {
        let out: DeleteBillOutput = self.call(Procedure::BillDelete, &BillIdInput { id }).await?;
        Ok(out.deleted)
    }

    async fn bill_upload_images(
        &self,
        id: BillId,
        images: Vec<NewImage>,
    ) -> Result<Option<Vec<Image>>> {
        let input = UploadImagesInput { id, images };
        self.call(Procedure::BillUploadImages, &input).await
    }

    async fn bill_delete_image(
        &self,
        bill_id: BillId,
        image_id: ImageId,
    ) -> Result<Option<Vec<Image>>> {
        let input = DeleteImageInput { bill_id, image_id };
        self.call(Procedure::BillDeleteImage, &input).await
    }

    async fn bill_add_user(&self, bill_id: BillId, name: &str) -> Result<Option<AddUserOutput>> {
        let input = AddUserInput {
            bill_id,
            name: name.to_string(),
        };
        self.call(Procedure::BillAddUser, &input).await
    }

    async fn bill_remove_user(&self, bill_id: BillId, user_id: UserId) -> Result<Option<Bill>> {
        let input = RemoveUserInput { bill_id, user_id };
        self.call(Procedure::BillRemoveUser, &input).await
    }

    async fn bill_add_tag(&self, bill_id: BillId, name: &str) -> Result<Option<AddTagOutput>> {
        let input = AddTagInput {
            bill_id,
            name: name.to_string(),
        };
        self.call(Procedure::BillAddTag, &input).await
    }

    async fn bill_remove_tag(&self, bill_id: BillId, tag_id: TagId) -> Result<Option<Bill>> {
        let input = RemoveTagInput { bill_id, tag_id };
        self.call(Procedure::BillRemoveTag, &input).await
    }

    async fn bill_add_line_item(
        &self,
        bill_id: BillId,
        line_item: Option<LineItemInput>,
    ) -> Result<Option<AddLineItemOutput>> {
        let input = AddLineItemInput { bill_id, line_item };
        self.call(Procedure::BillAddLineItem, &input).await
    }

    async fn bill_update_line_item(
        &self,
        bill_id: BillId,
        line_item: LineItemUpdate,
    ) -> Result<Option<LineItem>> {
        let input = UpdateLineItemInput { bill_id, line_item };
        self.call(Procedure::BillUpdateLineItem, &input).await
    }

    async fn bill_remove_line_item(
        &self,
        bill_id: BillId,
        line_item_id: LineItemId,
    ) -> Result<Option<Bill>> {
        let input = RemoveLineItemInput {
            bill_id,
            line_item_id,
        };
        self.call(Procedure::BillRemoveLineItem, &input).await
    }

    async fn bill_add_charge(
        &self,
        bill_id: BillId,
        charge: ChargeInput,
    ) -> Result<Option<AddChargeOutput>> {
        let input = AddChargeInput { bill_id, charge };
        self.call(Procedure::BillAddProportionalCharge, &input).await
    }

    async fn bill_update_charge(
        &self,
        bill_id: BillId,
        charge: ChargeUpdate,
    ) -> Result<Option<ProportionalCharge>> {
        let input = UpdateChargeInput { bill_id, charge };
        self.call(Procedure::BillUpdateProportionalCharge, &input).await
    }

    async fn bill_remove_charge(
        &self,
        bill_id: BillId,
        charge_id: ChargeId,
    ) -> Result<Option<Bill>> {
        let input = RemoveChargeInput { bill_id, charge_id };
        self.call(Procedure::BillRemoveProportionalCharge, &input).await
    }
}
