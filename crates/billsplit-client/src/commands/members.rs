//! Users and tags.

use billsplit_shared::{Bill, BillId, Tag, TagId, User, UserId};

use crate::session::BillSession;
use crate::state::Cached;

impl BillSession {
    pub async fn add_user(&self, bill_id: BillId, name: &str) -> Cached<User> {
        let out = self
            .request("Failed to add user", self.api.bill_add_user(bill_id, name))
            .await;
        self.store_bill_result(bill_id, &out.clone().map(|r| r.map(|o| o.bill)));
        out.map(|r| r.map(|o| o.user))
    }

    /// Remove a user; their shares disappear from every line item.
    pub async fn remove_user(&self, bill_id: BillId, user_id: UserId) -> Cached<Bill> {
        let bill = self
            .request(
                "Failed to remove user",
                self.api.bill_remove_user(bill_id, user_id),
            )
            .await;
        self.store_bill_if_loaded(&bill);
        bill
    }

    pub async fn add_tag(&self, bill_id: BillId, name: &str) -> Cached<Tag> {
        let out = self
            .request("Failed to add tag", self.api.bill_add_tag(bill_id, name))
            .await;
        self.store_bill_result(bill_id, &out.clone().map(|r| r.map(|o| o.bill)));
        out.map(|r| r.map(|o| o.tag))
    }

    /// Remove a tag from the bill, its line items and its charge filters.
    pub async fn remove_tag(&self, bill_id: BillId, tag_id: TagId) -> Cached<Bill> {
        let bill = self
            .request("Failed to remove tag", self.api.bill_remove_tag(bill_id, tag_id))
            .await;
        self.store_bill_if_loaded(&bill);
        bill
    }
}
