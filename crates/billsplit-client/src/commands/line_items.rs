//! Line item editing.
//!
//! Edits are applied to the cache immediately and sent to the server after
//! the debounce delay; a burst of keystrokes becomes one request. Every edit
//! takes a sequence number per line item, and an answer is only applied if
//! no newer edit of that line item has been made since it was issued, so
//! the last edit wins whatever order the answers arrive in. Until then, a
//! whole bill sent back by another operation does not overwrite the edited
//! line item.

use tracing::debug;

use billsplit_shared::rpc::{LineItemInput, LineItemUpdate};
use billsplit_shared::{Bill, BillId, LineItem, LineItemId};

use crate::resource::{resolve, Fetched, Resource};
use crate::session::BillSession;
use crate::state::{BillsAction, Cached};
use crate::toasts::Toast;

impl BillSession {
    /// Append a blank line item for in-place editing.
    pub async fn add_line_item(&self, bill_id: BillId) -> Cached<LineItem> {
        let out = self
            .request(
                "Failed to add line item",
                self.api.bill_add_line_item(bill_id, None),
            )
            .await;

        match &out {
            Fetched::Success(Resource::Loaded(out)) => {
                self.store_bill(out.bill.clone());
            }
            Fetched::Success(Resource::NotFound) => {
                self.dispatch(BillsAction::BillRemoved(bill_id));
            }
            _ => {}
        }
        out.map(|r| r.map(|o| o.line_item))
    }

    /// Record a local edit and schedule saving it.
    pub fn edit_line_item(&self, bill_id: BillId, line_item: LineItem) {
        let key = (bill_id, line_item.id);
        let seq = self.edits.next(key);
        self.dispatch(BillsAction::LineItemStored {
            bill_id,
            line_item: line_item.clone(),
        });

        let session = self.clone();
        self.debouncer.schedule(key, async move {
            session.save_line_item(bill_id, line_item, seq).await;
        });
    }

    /// Whether an edit of the line item is still waiting to be sent.
    pub fn has_pending_edit(&self, bill_id: BillId, line_item_id: LineItemId) -> bool {
        self.debouncer.is_pending(&(bill_id, line_item_id))
    }

    async fn save_line_item(&self, bill_id: BillId, line_item: LineItem, seq: u64) {
        let key = (bill_id, line_item.id);
        let update = LineItemUpdate {
            id: line_item.id,
            fields: LineItemInput::from(&line_item),
        };

        let saved = resolve(self.api.bill_update_line_item(bill_id, update)).await;

        if !self.edits.is_latest(&key, seq) {
            debug!(bill_id = %bill_id, line_item_id = %line_item.id, seq, "Discarding superseded line item answer");
            return;
        }

        match saved {
            Fetched::Success(Some(saved)) => {
                self.edits.settle(&key, seq);
                self.dispatch(BillsAction::LineItemStored {
                    bill_id,
                    line_item: saved,
                });
            }
            Fetched::Success(None) => {
                self.edits.settle(&key, seq);
                self.toast(Toast::warning("This line item no longer exists"));
                self.fetch_bill(bill_id).await;
            }
            // The edit stays unsettled so the unsaved value survives bill
            // refreshes until the next edit.
            Fetched::Errored(e) => {
                self.toast(Toast::error("Failed to save line item", e.to_string()));
            }
        }
    }

    pub async fn remove_line_item(&self, bill_id: BillId, line_item_id: LineItemId) -> Cached<Bill> {
        let bill = self
            .request(
                "Failed to remove line item",
                self.api.bill_remove_line_item(bill_id, line_item_id),
            )
            .await;
        self.store_bill_if_loaded(&bill);
        bill
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use billsplit_shared::rpc::{LineItemInput, LineItemUpdate};
    use billsplit_shared::{Bill, LineItem};

    use crate::error::ClientError;
    use crate::resource::{Fetched, Resource};
    use crate::session::BillSession;
    use crate::testing::{fake_session, FakeApi};

    async fn bill_with_blank_item(session: &BillSession, api: &FakeApi) -> (Bill, LineItem) {
        let bill = api.db().create_bill("Dinner").unwrap();
        session.fetch_bill(bill.id).await;
        let Fetched::Success(Resource::Loaded(item)) = session.add_line_item(bill.id).await else {
            panic!("add failed");
        };
        (bill, item)
    }

    fn renamed(item: &LineItem, name: &str) -> LineItem {
        LineItem {
            name: name.to_string(),
            ..item.clone()
        }
    }

    fn cached_item(session: &BillSession, bill: &Bill, item: &LineItem) -> LineItem {
        session
            .with_state(|s| s.line_item(bill.id, item.id))
            .success()
            .and_then(|r| r.loaded())
            .cloned()
            .unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn add_blank_line_item() {
        let (session, api) = fake_session();
        let (bill, item) = bill_with_blank_item(&session, &api).await;

        assert_eq!(item.name, "");
        assert_eq!(item.price, 0.0);
        assert!(item.tags.is_empty());
        assert!(item.users_split.is_empty());
        assert_eq!(
            session.with_state(|s| s.line_items(bill.id)),
            Fetched::Success(Resource::Loaded(vec![item]))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn edits_are_debounced_into_one_request() {
        let (session, api) = fake_session();
        let (bill, item) = bill_with_blank_item(&session, &api).await;

        for name in ["P", "Pi", "Piz", "Pizza"] {
            session.edit_line_item(bill.id, renamed(&item, name));
            tokio::time::sleep(Duration::from_millis(100)).await;
        }

        // Local edits show immediately.
        assert_eq!(cached_item(&session, &bill, &item).name, "Pizza");
        assert!(session.has_pending_edit(bill.id, item.id));
        assert!(api.updates().is_empty());

        tokio::time::sleep(Duration::from_millis(600)).await;
        let updates = api.updates();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].fields.name, "Pizza");

        let stored = api.db().get_bill(bill.id).unwrap().unwrap();
        assert_eq!(stored.line_items[0].name, "Pizza");
    }

    #[tokio::test(start_paused = true)]
    async fn last_edit_wins_over_a_late_answer() {
        let (session, api) = fake_session();
        let (bill, item) = bill_with_blank_item(&session, &api).await;
        api.delay_answer_for("Pasta", Duration::from_secs(3));

        session.edit_line_item(bill.id, renamed(&item, "Pasta"));
        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(api.updates().len(), 1);

        // The first request is in flight; a newer edit goes out and is
        // answered before it.
        session.edit_line_item(bill.id, renamed(&item, "Pizza"));
        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(cached_item(&session, &bill, &item).name, "Pizza");

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(api.updates().len(), 2);
        assert_eq!(cached_item(&session, &bill, &item).name, "Pizza");
    }

    #[tokio::test(start_paused = true)]
    async fn unsaved_edit_survives_a_bill_refresh() {
        let (session, api) = fake_session();
        let (bill, item) = bill_with_blank_item(&session, &api).await;

        session.edit_line_item(bill.id, renamed(&item, "Pizza"));
        let Fetched::Success(Resource::Loaded(second)) = session.add_line_item(bill.id).await else {
            panic!("add failed");
        };

        assert_eq!(cached_item(&session, &bill, &item).name, "Pizza");
        assert_eq!(cached_item(&session, &bill, &second).name, "");

        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(cached_item(&session, &bill, &item).name, "Pizza");
        let stored = api.db().get_bill(bill.id).unwrap().unwrap();
        assert_eq!(stored.line_items[0].name, "Pizza");
        assert_eq!(stored.line_items.len(), 2);

        // Once saved, the server's copy is authoritative again.
        assert!(!session.edits.is_unsettled(&(bill.id, item.id)));
        api.db()
            .update_line_item(
                bill.id,
                LineItemUpdate {
                    id: item.id,
                    fields: LineItemInput {
                        name: "Pasta".into(),
                        ..LineItemInput::from(&item)
                    },
                },
            )
            .unwrap();
        session.rename_bill(bill.id, "Brunch").await;
        assert_eq!(cached_item(&session, &bill, &item).name, "Pasta");
    }

    #[tokio::test(start_paused = true)]
    async fn failed_save_is_toasted() {
        let (session, api) = fake_session();
        let (bill, item) = bill_with_blank_item(&session, &api).await;
        api.fail_with(ClientError::Server {
            status: 500,
            message: "Internal server error".into(),
        });

        session.edit_line_item(bill.id, renamed(&item, "Pizza"));
        tokio::time::sleep(Duration::from_millis(600)).await;

        let toasts = session.toaster().visible();
        assert_eq!(toasts.len(), 1);
        assert_eq!(toasts[0].1.text(), "Failed to save line item");
        // The local edit stays visible.
        assert_eq!(cached_item(&session, &bill, &item).name, "Pizza");

        api.recover();
        session.edit_line_item(bill.id, renamed(&item, "Pasta"));
        tokio::time::sleep(Duration::from_millis(600)).await;
        let stored = api.db().get_bill(bill.id).unwrap().unwrap();
        assert_eq!(stored.line_items[0].name, "Pasta");
    }

    #[tokio::test(start_paused = true)]
    async fn saving_a_removed_line_item_refetches_the_bill() {
        let (session, api) = fake_session();
        let (bill, item) = bill_with_blank_item(&session, &api).await;
        api.db().remove_line_item(bill.id, item.id).unwrap();

        session.edit_line_item(bill.id, renamed(&item, "Pizza"));
        tokio::time::sleep(Duration::from_millis(600)).await;

        assert_eq!(
            session.with_state(|s| s.line_items(bill.id)),
            Fetched::Success(Resource::Loaded(Vec::new()))
        );
        assert_eq!(session.toaster().visible().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn remove_line_item() {
        let (session, api) = fake_session();
        let (bill, item) = bill_with_blank_item(&session, &api).await;

        let after = session.remove_line_item(bill.id, item.id).await;
        assert!(after
            .success()
            .and_then(|r| r.loaded())
            .unwrap()
            .line_items
            .is_empty());
        assert_eq!(
            session.with_state(|s| s.line_items(bill.id)),
            Fetched::Success(Resource::Loaded(Vec::new()))
        );
    }
}
