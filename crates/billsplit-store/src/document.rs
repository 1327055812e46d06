//! Row <-> document mapping and the read-modify-write helpers every
//! mutation goes through.

use rusqlite::{params, Connection, OptionalExtension, Transaction, TransactionBehavior};
use serde::{Deserialize, Serialize};

use billsplit_shared::{Bill, BillId, Image, LineItem, ProportionalCharge, Tag, TagId, User, UserId};

use crate::database::Database;
use crate::error::{Result, StoreError};

/// The JSON stored in `bills.document`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BillDocument {
    pub users: Vec<User>,
    pub tags: Vec<Tag>,
    pub line_items: Vec<LineItem>,
    pub proportional_charges: Vec<ProportionalCharge>,
}

impl BillDocument {
    pub fn of(bill: &Bill) -> BillDocumentRef<'_> {
        BillDocumentRef {
            users: &bill.users,
            tags: &bill.tags,
            line_items: &bill.line_items,
            proportional_charges: &bill.proportional_charges,
        }
    }

    fn into_bill(self, id: BillId, name: String) -> Bill {
        Bill {
            id,
            name,
            users: self.users,
            tags: self.tags,
            line_items: self.line_items,
            proportional_charges: self.proportional_charges,
        }
    }
}

/// Borrowed form of [`BillDocument`] for serialization without cloning.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BillDocumentRef<'a> {
    users: &'a [User],
    tags: &'a [Tag],
    line_items: &'a [LineItem],
    proportional_charges: &'a [ProportionalCharge],
}

pub(crate) fn parse_id(raw: &str) -> Result<BillId> {
    Ok(raw.parse::<BillId>()?)
}

/// Load a bill (without images). `Ok(None)` if no such row.
pub(crate) fn load_bill(conn: &Connection, id: BillId) -> Result<Option<Bill>> {
    let row: Option<(String, String)> = conn
        .query_row(
            "SELECT name, document FROM bills WHERE id = ?1",
            params![id.to_string()],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;

    match row {
        Some((name, document)) => {
            let document: BillDocument = serde_json::from_str(&document)?;
            Ok(Some(document.into_bill(id, name)))
        }
        None => Ok(None),
    }
}

fn save_bill(conn: &Connection, bill: &Bill) -> Result<()> {
    let document = serde_json::to_string(&BillDocument::of(bill))?;
    conn.execute(
        "UPDATE bills SET name = ?1, document = ?2 WHERE id = ?3",
        params![bill.name, document, bill.id.to_string()],
    )?;
    Ok(())
}

pub(crate) fn load_images(conn: &Connection, id: BillId) -> Result<Option<Vec<Image>>> {
    let raw: Option<String> = conn
        .query_row(
            "SELECT images FROM bills WHERE id = ?1",
            params![id.to_string()],
            |row| row.get(0),
        )
        .optional()?;

    raw.map(|json| serde_json::from_str(&json).map_err(StoreError::from))
        .transpose()
}

fn save_images(conn: &Connection, id: BillId, images: &[Image]) -> Result<()> {
    conn.execute(
        "UPDATE bills SET images = ?1 WHERE id = ?2",
        params![serde_json::to_string(images)?, id.to_string()],
    )?;
    Ok(())
}

impl Database {
    fn begin(&self) -> Result<Transaction<'_>> {
        Ok(Transaction::new_unchecked(
            self.conn(),
            TransactionBehavior::Immediate,
        )?)
    }

    /// Apply `f` to the stored bill and persist the result atomically.
    ///
    /// `f` returns `Ok(None)` when the entity it addresses does not exist;
    /// nothing is written in that case, nor when `f` fails. A missing bill
    /// yields `Ok(None)` without calling `f`.
    pub(crate) fn modify_bill<T>(
        &self,
        id: BillId,
        f: impl FnOnce(&mut Bill) -> Result<Option<T>>,
    ) -> Result<Option<T>> {
        let tx = self.begin()?;

        let Some(mut bill) = load_bill(&tx, id)? else {
            return Ok(None);
        };

        let Some(out) = f(&mut bill)? else {
            return Ok(None);
        };

        save_bill(&tx, &bill)?;
        tx.commit()?;
        Ok(Some(out))
    }

    /// Image counterpart of [`Database::modify_bill`].
    pub(crate) fn modify_images<T>(
        &self,
        id: BillId,
        f: impl FnOnce(&mut Vec<Image>) -> Result<Option<T>>,
    ) -> Result<Option<T>> {
        let tx = self.begin()?;

        let Some(mut images) = load_images(&tx, id)? else {
            return Ok(None);
        };

        let Some(out) = f(&mut images)? else {
            return Ok(None);
        };

        save_images(&tx, id, &images)?;
        tx.commit()?;
        Ok(Some(out))
    }
}

// ---------------------------------------------------------------------------
// Reference checks
// ---------------------------------------------------------------------------

pub(crate) fn check_users<'a>(
    bill: &Bill,
    users: impl IntoIterator<Item = &'a UserId>,
) -> Result<()> {
    for user in users {
        if bill.user(*user).is_none() {
            return Err(StoreError::InvalidReference(format!(
                "user {user} is not part of bill {}",
                bill.id
            )));
        }
    }
    Ok(())
}

pub(crate) fn check_tags<'a>(bill: &Bill, tags: impl IntoIterator<Item = &'a TagId>) -> Result<()> {
    for tag in tags {
        if !bill.has_tag(*tag) {
            return Err(StoreError::InvalidReference(format!(
                "tag {tag} is not part of bill {}",
                bill.id
            )));
        }
    }
    Ok(())
}

/// Position of the single element of `items` with `id(item) == wanted`.
///
/// More than one match means the list's uniqueness invariant is broken,
/// which is reported instead of silently picking one.
pub(crate) fn position_unique<T, K: PartialEq + std::fmt::Display>(
    items: &[T],
    wanted: K,
    id: impl Fn(&T) -> K,
    what: &str,
) -> Result<Option<usize>> {
    let mut found = items
        .iter()
        .enumerate()
        .filter(|(_, item)| id(*item) == wanted);
    let Some((pos, _)) = found.next() else {
        return Ok(None);
    };
    let extra = found.count();
    if extra > 0 {
        return Err(StoreError::Integrity(format!(
            "{} {what} entries share id {wanted}",
            extra + 1
        )));
    }
    Ok(Some(pos))
}
