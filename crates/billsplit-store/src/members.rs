//! Users and tags of a bill.
//!
//! Removal cascades: a removed user's split entries disappear from every
//! line item, and a removed tag is stripped from every line item and every
//! charge filter. A charge whose filter loses its last tag keeps an empty
//! filter (it then applies to nothing) rather than widening to all items.

use billsplit_shared::rpc::{AddTagOutput, AddUserOutput};
use billsplit_shared::{Bill, BillId, Tag, TagId, User, UserId};

use crate::database::Database;
use crate::error::Result;

impl Database {
    pub fn add_user(&self, bill_id: BillId, name: &str) -> Result<Option<AddUserOutput>> {
        self.modify_bill(bill_id, |bill| {
            let user = User {
                id: UserId::new(),
                name: name.to_string(),
            };
            bill.users.push(user.clone());
            Ok(Some(AddUserOutput {
                bill: bill.clone(),
                user,
            }))
        })
    }

    pub fn remove_user(&self, bill_id: BillId, user_id: UserId) -> Result<Option<Bill>> {
        self.modify_bill(bill_id, |bill| {
            let before = bill.users.len();
            bill.users.retain(|u| u.id != user_id);
            if bill.users.len() == before {
                return Ok(None);
            }

            for item in &mut bill.line_items {
                item.users_split.retain(|s| s.user_id != user_id);
            }

            tracing::debug!(bill_id = %bill.id, user_id = %user_id, "removed user");
            Ok(Some(bill.clone()))
        })
    }

    pub fn add_tag(&self, bill_id: BillId, name: &str) -> Result<Option<AddTagOutput>> {
        self.modify_bill(bill_id, |bill| {
            let tag = Tag {
                id: TagId::new(),
                name: name.to_string(),
            };
            bill.tags.push(tag.clone());
            Ok(Some(AddTagOutput {
                bill: bill.clone(),
                tag,
            }))
        })
    }

    pub fn remove_tag(&self, bill_id: BillId, tag_id: TagId) -> Result<Option<Bill>> {
        self.modify_bill(bill_id, |bill| {
            let before = bill.tags.len();
            bill.tags.retain(|t| t.id != tag_id);
            if bill.tags.len() == before {
                return Ok(None);
            }

            for item in &mut bill.line_items {
                item.tags.retain(|t| *t != tag_id);
            }
            for charge in &mut bill.proportional_charges {
                if let Some(filter) = charge.filter_tags.as_mut() {
                    filter.retain(|t| *t != tag_id);
                }
            }

            tracing::debug!(bill_id = %bill.id, tag_id = %tag_id, "removed tag");
            Ok(Some(bill.clone()))
        })
    }
}
