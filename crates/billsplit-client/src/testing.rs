//! In-process [`BillApi`] for tests, backed by an in-memory store.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;

use billsplit_shared::constants::DEFAULT_MAX_IMAGES_PER_BILL;
use billsplit_shared::rpc::{
    AddChargeOutput, AddLineItemOutput, AddTagOutput, AddUserOutput, ChargeInput, ChargeUpdate,
    LineItemInput, LineItemUpdate, NewImage,
};
use billsplit_shared::split::{self, SplitSummary};
use billsplit_shared::{
    Bill, BillId, BillSummary, ChargeId, Image, ImageId, LineItem, LineItemId, ProportionalCharge,
    TagId, UserId,
};
use billsplit_store::{Database, StoreError};

use crate::error::{ClientError, Result};
use crate::rpc::BillApi;
use crate::session::BillSession;

pub(crate) struct FakeApi {
    db: Mutex<Database>,
    failure: Mutex<Option<ClientError>>,
    /// Extra latency of `bill_update_line_item` answers, by line item name.
    /// The write happens immediately; only the answer is late.
    answer_delays: Mutex<HashMap<String, Duration>>,
    updates: Mutex<Vec<LineItemUpdate>>,
}

pub(crate) fn fake_session() -> (BillSession, Arc<FakeApi>) {
    let api = Arc::new(FakeApi::new());
    (BillSession::new(api.clone()), api)
}

fn store<T>(result: billsplit_store::Result<T>) -> Result<T> {
    result.map_err(|e| {
        let status = match e {
            StoreError::InvalidReference(_) | StoreError::ImageLimit { .. } => 400,
            _ => 500,
        };
        ClientError::Server {
            status,
            message: e.to_string(),
        }
    })
}

impl FakeApi {
    pub fn new() -> Self {
        Self {
            db: Mutex::new(Database::open_in_memory().unwrap()),
            failure: Mutex::new(None),
            answer_delays: Mutex::new(HashMap::new()),
            updates: Mutex::new(Vec::new()),
        }
    }

    /// Make every following call fail with `err`.
    pub fn fail_with(&self, err: ClientError) {
        *self.failure.lock().unwrap() = Some(err);
    }

    pub fn recover(&self) {
        *self.failure.lock().unwrap() = None;
    }

    pub fn delay_answer_for(&self, line_item_name: &str, delay: Duration) {
        self.answer_delays
            .lock()
            .unwrap()
            .insert(line_item_name.to_string(), delay);
    }

    /// Every `bill_update_line_item` payload received, in arrival order.
    pub fn updates(&self) -> Vec<LineItemUpdate> {
        self.updates.lock().unwrap().clone()
    }

    /// Direct store access for arranging and inspecting server state.
    pub fn db(&self) -> MutexGuard<'_, Database> {
        self.db.lock().unwrap()
    }

    fn check(&self) -> Result<()> {
        match self.failure.lock().unwrap().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl BillApi for FakeApi {
    async fn bill_list(&self) -> Result<Vec<BillSummary>> {
        self.check()?;
        store(self.db().list_bill_summaries())
    }

    async fn bill_get(&self, id: BillId) -> Result<Option<Bill>> {
        self.check()?;
        store(self.db().get_bill(id))
    }

    async fn bill_get_images(&self, id: BillId) -> Result<Option<Vec<Image>>> {
        self.check()?;
        store(self.db().get_bill_images(id))
    }

    async fn bill_split(&self, id: BillId) -> Result<Option<SplitSummary>> {
        self.check()?;
        let bill = store(self.db().get_bill(id))?;
        Ok(bill.as_ref().map(split::summarize))
    }

    async fn bill_create(&self, name: &str) -> Result<Bill> {
        self.check()?;
        store(self.db().create_bill(name))
    }

    async fn bill_rename(&self, id: BillId, name: &str) -> Result<Option<Bill>> {
        self.check()?;
        store(self.db().rename_bill(id, name))
    }

    async fn bill_delete(&self, id: BillId) -> Result<bool> {
        self.check()?;
        store(self.db().delete_bill(id))
    }

    async fn bill_upload_images(
        &self,
        id: BillId,
        images: Vec<NewImage>,
    ) -> Result<Option<Vec<Image>>> {
        self.check()?;
        store(self.db().append_images(id, images, DEFAULT_MAX_IMAGES_PER_BILL))
    }

    async fn bill_delete_image(
        &self,
        bill_id: BillId,
        image_id: ImageId,
    ) -> Result<Option<Vec<Image>>> {
        self.check()?;
        store(self.db().remove_image(bill_id, image_id))
    }

    async fn bill_add_user(&self, bill_id: BillId, name: &str) -> Result<Option<AddUserOutput>> {
        self.check()?;
        store(self.db().add_user(bill_id, name))
    }

    async fn bill_remove_user(&self, bill_id: BillId, user_id: UserId) -> Result<Option<Bill>> {
        self.check()?;
        store(self.db().remove_user(bill_id, user_id))
    }

    async fn bill_add_tag(&self, bill_id: BillId, name: &str) -> Result<Option<AddTagOutput>> {
        self.check()?;
        store(self.db().add_tag(bill_id, name))
    }

    async fn bill_remove_tag(&self, bill_id: BillId, tag_id: TagId) -> Result<Option<Bill>> {
        self.check()?;
        store(self.db().remove_tag(bill_id, tag_id))
    }

    async fn bill_add_line_item(
        &self,
        bill_id: BillId,
        line_item: Option<LineItemInput>,
    ) -> Result<Option<AddLineItemOutput>> {
        self.check()?;
        store(self.db().add_line_item(bill_id, line_item))
    }

    async fn bill_update_line_item(
        &self,
        bill_id: BillId,
        line_item: LineItemUpdate,
    ) -> Result<Option<LineItem>> {
        self.check()?;
        self.updates.lock().unwrap().push(line_item.clone());
        let delay = self
            .answer_delays
            .lock()
            .unwrap()
            .get(&line_item.fields.name)
            .copied();

        let result = {
            let db = self.db();
            store(db.update_line_item(bill_id, line_item))
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        result
    }

    async fn bill_remove_line_item(
        &self,
        bill_id: BillId,
        line_item_id: LineItemId,
    ) -> Result<Option<Bill>> {
        self.check()?;
        store(self.db().remove_line_item(bill_id, line_item_id))
    }

    async fn bill_add_charge(
        &self,
        bill_id: BillId,
        charge: ChargeInput,
    ) -> Result<Option<AddChargeOutput>> {
        self.check()?;
        store(self.db().add_charge(bill_id, charge))
    }

    async fn bill_update_charge(
        &self,
        bill_id: BillId,
        charge: ChargeUpdate,
    ) -> Result<Option<ProportionalCharge>> {
        self.check()?;
        store(self.db().update_charge(bill_id, charge))
    }

    async fn bill_remove_charge(
        &self,
        bill_id: BillId,
        charge_id: ChargeId,
    ) -> Result<Option<Bill>> {
        self.check()?;
        store(self.db().remove_charge(bill_id, charge_id))
    }
}
