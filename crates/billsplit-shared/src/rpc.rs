//! Procedure catalogue and the input/output shapes exchanged over RPC.
//!
//! Every procedure is served at `/rpc/<name>`. Queries are `GET` requests
//! carrying their input as a JSON string in the `input` query parameter;
//! mutations are `POST` requests with a JSON body. A "not found" result is
//! encoded as JSON `null`, never as an error.

use serde::{Deserialize, Serialize};

use crate::types::{
    Bill, BillId, ChargeId, ImageId, LineItem, LineItemId, ProportionalCharge, SplitId, Tag,
    TagId, User, UserId,
};

/// Whether a procedure has a persisted side effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcedureKind {
    /// Read only, safe to retry.
    Query,
    /// Persists a change, not safely retryable.
    Mutation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Procedure {
    BillList,
    BillGet,
    BillGetImages,
    BillSplit,
    BillCreate,
    BillRename,
    BillDelete,
    BillUploadImages,
    BillDeleteImage,
    BillAddUser,
    BillRemoveUser,
    BillAddTag,
    BillRemoveTag,
    BillAddLineItem,
    BillUpdateLineItem,
    BillRemoveLineItem,
    BillAddProportionalCharge,
    BillUpdateProportionalCharge,
    BillRemoveProportionalCharge,
}

impl Procedure {
    pub const ALL: [Procedure; 19] = [
        Procedure::BillList,
        Procedure::BillGet,
        Procedure::BillGetImages,
        Procedure::BillSplit,
        Procedure::BillCreate,
        Procedure::BillRename,
        Procedure::BillDelete,
        Procedure::BillUploadImages,
        Procedure::BillDeleteImage,
        Procedure::BillAddUser,
        Procedure::BillRemoveUser,
        Procedure::BillAddTag,
        Procedure::BillRemoveTag,
        Procedure::BillAddLineItem,
        Procedure::BillUpdateLineItem,
        Procedure::BillRemoveLineItem,
        Procedure::BillAddProportionalCharge,
        Procedure::BillUpdateProportionalCharge,
        Procedure::BillRemoveProportionalCharge,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Procedure::BillList => "billList",
            Procedure::BillGet => "billGet",
            Procedure::BillGetImages => "billGetImages",
            Procedure::BillSplit => "billSplit",
            Procedure::BillCreate => "billCreate",
            Procedure::BillRename => "billRename",
            Procedure::BillDelete => "billDelete",
            Procedure::BillUploadImages => "billUploadImages",
            Procedure::BillDeleteImage => "billDeleteImage",
            Procedure::BillAddUser => "billAddUser",
            Procedure::BillRemoveUser => "billRemoveUser",
            Procedure::BillAddTag => "billAddTag",
            Procedure::BillRemoveTag => "billRemoveTag",
            Procedure::BillAddLineItem => "billAddLineItem",
            Procedure::BillUpdateLineItem => "billUpdateLineItem",
            Procedure::BillRemoveLineItem => "billRemoveLineItem",
            Procedure::BillAddProportionalCharge => "billAddProportionalCharge",
            Procedure::BillUpdateProportionalCharge => "billUpdateProportionalCharge",
            Procedure::BillRemoveProportionalCharge => "billRemoveProportionalCharge",
        }
    }

    pub fn kind(self) -> ProcedureKind {
        match self {
            Procedure::BillList
            | Procedure::BillGet
            | Procedure::BillGetImages
            | Procedure::BillSplit => ProcedureKind::Query,
            _ => ProcedureKind::Mutation,
        }
    }

    /// Route path, e.g. `/rpc/billGet`.
    pub fn path(self) -> String {
        format!("/rpc/{}", self.name())
    }
}

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// Input of the procedures addressing a whole bill by ID.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BillIdInput {
    pub id: BillId,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreateBillInput {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RenameBillInput {
    pub id: BillId,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NewImage {
    pub mime_type: String,
    pub base64_data: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UploadImagesInput {
    pub id: BillId,
    pub images: Vec<NewImage>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeleteImageInput {
    #[serde(rename = "billID")]
    pub bill_id: BillId,
    #[serde(rename = "imageID")]
    pub image_id: ImageId,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AddUserInput {
    #[serde(rename = "billID")]
    pub bill_id: BillId,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RemoveUserInput {
    #[serde(rename = "billID")]
    pub bill_id: BillId,
    #[serde(rename = "userID")]
    pub user_id: UserId,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AddTagInput {
    #[serde(rename = "billID")]
    pub bill_id: BillId,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RemoveTagInput {
    #[serde(rename = "billID")]
    pub bill_id: BillId,
    #[serde(rename = "tagID")]
    pub tag_id: TagId,
}

/// One entry of a line item split as sent by a client. The ID is optional:
/// entries without one get a fresh ID, or keep the ID of the stored entry
/// for the same user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserSplitInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<SplitId>,
    #[serde(rename = "userID")]
    pub user_id: UserId,
    pub proportion: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LineItemInput {
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub tags: Vec<TagId>,
    #[serde(default)]
    pub users_split: Vec<UserSplitInput>,
}

impl From<&LineItem> for LineItemInput {
    fn from(item: &LineItem) -> Self {
        Self {
            name: item.name.clone(),
            price: item.price,
            tags: item.tags.clone(),
            users_split: item
                .users_split
                .iter()
                .map(|s| UserSplitInput {
                    id: Some(s.id),
                    user_id: s.user_id,
                    proportion: s.proportion,
                })
                .collect(),
        }
    }
}

/// A line item input that addresses an existing line item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LineItemUpdate {
    pub id: LineItemId,
    #[serde(flatten)]
    pub fields: LineItemInput,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AddLineItemInput {
    #[serde(rename = "billID")]
    pub bill_id: BillId,
    /// `None` inserts a zero-valued line item.
    pub line_item: Option<LineItemInput>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLineItemInput {
    #[serde(rename = "billID")]
    pub bill_id: BillId,
    pub line_item: LineItemUpdate,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RemoveLineItemInput {
    #[serde(rename = "billID")]
    pub bill_id: BillId,
    #[serde(rename = "lineItemID")]
    pub line_item_id: LineItemId,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChargeInput {
    pub name: String,
    #[serde(default)]
    pub filter_tags: Option<Vec<TagId>>,
    pub proportion: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChargeUpdate {
    pub id: ChargeId,
    #[serde(flatten)]
    pub fields: ChargeInput,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AddChargeInput {
    #[serde(rename = "billID")]
    pub bill_id: BillId,
    pub charge: ChargeInput,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UpdateChargeInput {
    #[serde(rename = "billID")]
    pub bill_id: BillId,
    pub charge: ChargeUpdate,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RemoveChargeInput {
    #[serde(rename = "billID")]
    pub bill_id: BillId,
    #[serde(rename = "chargeID")]
    pub charge_id: ChargeId,
}

// ---------------------------------------------------------------------------
// Outputs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AddLineItemOutput {
    pub bill: Bill,
    pub line_item: LineItem,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AddUserOutput {
    pub bill: Bill,
    pub user: User,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AddTagOutput {
    pub bill: Bill,
    pub tag: Tag,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AddChargeOutput {
    pub bill: Bill,
    pub proportional_charge: ProportionalCharge,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeleteBillOutput {
    pub deleted: bool,
}
