use tracing::info;

use billsplit_shared::split::SplitSummary;
use billsplit_shared::{Bill, BillId, BillSummary};

use crate::resource::{resolve, Fetched, Resource};
use crate::session::BillSession;
use crate::state::{BillsAction, Cached};
use crate::toasts::Toast;

impl BillSession {
    pub async fn fetch_bill_list(&self) -> Cached<Vec<BillSummary>> {
        self.dispatch(BillsAction::BillListFetched(Fetched::Success(Resource::Loading)));

        let list = resolve(self.api.bill_list()).await.map(Resource::Loaded);
        if let Fetched::Errored(e) = &list {
            self.toast(Toast::error("Failed to load bills", e.to_string()));
        }

        self.dispatch(BillsAction::BillListFetched(list.clone()));
        list
    }

    pub async fn fetch_bill(&self, bill_id: BillId) -> Cached<Bill> {
        self.dispatch(BillsAction::BillFetched {
            bill_id,
            bill: Fetched::Success(Resource::Loading),
        });

        let bill = self
            .request("Failed to load bill", self.api.bill_get(bill_id))
            .await;

        self.dispatch(BillsAction::BillFetched {
            bill_id,
            bill: bill.clone(),
        });
        bill
    }

    /// Compute the per-user split. Not cached: it is derived from the bill
    /// and goes stale with every edit.
    pub async fn fetch_split(&self, bill_id: BillId) -> Cached<SplitSummary> {
        self.request("Failed to calculate split", self.api.bill_split(bill_id))
            .await
    }

    pub async fn create_bill(&self, name: &str) -> Fetched<Bill> {
        let bill = resolve(self.api.bill_create(name)).await;
        match &bill {
            Fetched::Success(bill) => {
                info!(bill_id = %bill.id, "Bill created");
                self.store_bill(bill.clone());
            }
            Fetched::Errored(e) => {
                self.toast(Toast::error("Failed to create bill", e.to_string()));
            }
        }
        bill
    }

    pub async fn rename_bill(&self, bill_id: BillId, name: &str) -> Cached<Bill> {
        let bill = self
            .request("Failed to rename bill", self.api.bill_rename(bill_id, name))
            .await;
        self.store_bill_result(bill_id, &bill);
        bill
    }

    pub async fn delete_bill(&self, bill_id: BillId) -> Fetched<bool> {
        let deleted = resolve(self.api.bill_delete(bill_id)).await;
        match &deleted {
            Fetched::Success(_) => self.dispatch(BillsAction::BillRemoved(bill_id)),
            Fetched::Errored(e) => {
                self.toast(Toast::error("Failed to delete bill", e.to_string()));
            }
        }
        deleted
    }

    /// Apply a mutation answer that carries the whole bill.
    pub(crate) fn store_bill_result(&self, bill_id: BillId, result: &Cached<Bill>) {
        match result {
            Fetched::Success(Resource::Loaded(bill)) => {
                self.store_bill(bill.clone());
            }
            Fetched::Success(Resource::NotFound) => {
                self.dispatch(BillsAction::BillRemoved(bill_id));
            }
            _ => {}
        }
    }

    /// Apply the answer of a removal of something nested in the bill. Not
    /// found there may mean only the nested entity is gone, so the cached
    /// bill is kept.
    pub(crate) fn store_bill_if_loaded(&self, result: &Cached<Bill>) {
        if let Fetched::Success(Resource::Loaded(bill)) = result {
            self.store_bill(bill.clone());
        }
    }
}
