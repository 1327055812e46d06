//! Line item operations.

use std::collections::HashSet;

use billsplit_shared::rpc::{AddLineItemOutput, LineItemInput, LineItemUpdate};
use billsplit_shared::{Bill, BillId, LineItem, LineItemId, SplitId, UserSplit};

use crate::database::Database;
use crate::document::{check_tags, check_users, position_unique};
use crate::error::Result;

fn check_references(bill: &Bill, input: &LineItemInput) -> Result<()> {
    check_tags(bill, &input.tags)?;
    check_users(bill, input.users_split.iter().map(|s| &s.user_id))
}

impl Database {
    /// Append a line item with a fresh ID (and fresh split IDs). `None`
    /// inserts a zero-valued item for in-place editing.
    pub fn add_line_item(
        &self,
        bill_id: BillId,
        input: Option<LineItemInput>,
    ) -> Result<Option<AddLineItemOutput>> {
        self.modify_bill(bill_id, |bill| {
            let line_item = match input {
                None => LineItem::blank(),
                Some(input) => {
                    check_references(bill, &input)?;
                    LineItem {
                        id: LineItemId::new(),
                        name: input.name,
                        price: input.price,
                        tags: input.tags,
                        users_split: input
                            .users_split
                            .into_iter()
                            .map(|s| UserSplit {
                                id: SplitId::new(),
                                user_id: s.user_id,
                                proportion: s.proportion,
                            })
                            .collect(),
                    }
                }
            };

            bill.line_items.push(line_item.clone());
            tracing::debug!(bill_id = %bill.id, line_item_id = %line_item.id, "added line item");

            Ok(Some(AddLineItemOutput {
                bill: bill.clone(),
                line_item,
            }))
        })
    }

    /// Replace a line item in place, keeping its position in the list.
    ///
    /// Split entries keep the ID they were sent with; entries sent without
    /// one reuse the stored ID for the same user, so repeating an update is
    /// idempotent, unless another entry was sent with that ID. Two stored
    /// items sharing the ID is an integrity error.
    pub fn update_line_item(
        &self,
        bill_id: BillId,
        update: LineItemUpdate,
    ) -> Result<Option<LineItem>> {
        self.modify_bill(bill_id, |bill| {
            let Some(pos) =
                position_unique(&bill.line_items, update.id, |i| i.id, "line item")?
            else {
                return Ok(None);
            };
            check_references(bill, &update.fields)?;

            let previous = &bill.line_items[pos];
            // IDs sent explicitly take precedence over reused ones, and no ID
            // is handed out twice within the item.
            let sent: HashSet<SplitId> =
                update.fields.users_split.iter().filter_map(|s| s.id).collect();
            let mut taken = HashSet::new();
            let users_split = update
                .fields
                .users_split
                .into_iter()
                .map(|s| {
                    let id = s.id.unwrap_or_else(|| {
                        previous
                            .users_split
                            .iter()
                            .find(|p| p.user_id == s.user_id)
                            .map(|p| p.id)
                            .filter(|id| !sent.contains(id))
                            .unwrap_or_default()
                    });
                    let id = if taken.insert(id) { id } else { SplitId::new() };
                    UserSplit {
                        id,
                        user_id: s.user_id,
                        proportion: s.proportion,
                    }
                })
                .collect();

            let updated = LineItem {
                id: update.id,
                name: update.fields.name,
                price: update.fields.price,
                tags: update.fields.tags,
                users_split,
            };
            bill.line_items[pos] = updated.clone();

            Ok(Some(updated))
        })
    }

    pub fn remove_line_item(&self, bill_id: BillId, line_item_id: LineItemId) -> Result<Option<Bill>> {
        self.modify_bill(bill_id, |bill| {
            let before = bill.line_items.len();
            bill.line_items.retain(|i| i.id != line_item_id);
            if bill.line_items.len() == before {
                return Ok(None);
            }
            Ok(Some(bill.clone()))
        })
    }
}
