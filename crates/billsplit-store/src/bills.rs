//! Whole-bill operations: create, list, read, rename, delete.

use chrono::Utc;
use rusqlite::params;

use billsplit_shared::{Bill, BillId, BillSummary};

use crate::database::Database;
use crate::document::{load_bill, parse_id, BillDocument};
use crate::error::Result;

impl Database {
    // ------------------------------------------------------------------
    // Create
    // ------------------------------------------------------------------

    /// Insert a new bill with every nested collection empty.
    pub fn create_bill(&self, name: &str) -> Result<Bill> {
        let bill = Bill::new(name);
        let document = serde_json::to_string(&BillDocument::of(&bill))?;

        self.conn().execute(
            "INSERT INTO bills (id, name, document, images, created_at)
             VALUES (?1, ?2, ?3, '[]', ?4)",
            params![
                bill.id.to_string(),
                bill.name,
                document,
                Utc::now().to_rfc3339(),
            ],
        )?;

        tracing::debug!(bill_id = %bill.id, "created bill");
        Ok(bill)
    }

    // ------------------------------------------------------------------
    // Read
    // ------------------------------------------------------------------

    /// List bills in creation order, with nested list sizes counted by
    /// SQLite so the documents never leave the database.
    pub fn list_bill_summaries(&self) -> Result<Vec<BillSummary>> {
        let mut stmt = self.conn().prepare(
            "SELECT id, name,
                    json_array_length(document, '$.lineItems'),
                    json_array_length(document, '$.users')
             FROM bills
             ORDER BY created_at ASC, rowid ASC",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, Option<i64>>(2)?,
                row.get::<_, Option<i64>>(3)?,
            ))
        })?;

        let mut summaries = Vec::new();
        for row in rows {
            let (id, name, line_items, users) = row?;
            summaries.push(BillSummary {
                id: parse_id(&id)?,
                name,
                line_items_count: line_items.unwrap_or(0).max(0) as usize,
                users_count: users.unwrap_or(0).max(0) as usize,
            });
        }
        Ok(summaries)
    }

    /// Fetch a bill without its images.
    pub fn get_bill(&self, id: BillId) -> Result<Option<Bill>> {
        load_bill(self.conn(), id)
    }

    // ------------------------------------------------------------------
    // Update
    // ------------------------------------------------------------------

    pub fn rename_bill(&self, id: BillId, name: &str) -> Result<Option<Bill>> {
        self.modify_bill(id, |bill| {
            bill.name = name.to_string();
            Ok(Some(bill.clone()))
        })
    }

    // ------------------------------------------------------------------
    // Delete
    // ------------------------------------------------------------------

    /// Delete a bill and everything it owns.  Returns `true` if a row was deleted.
    pub fn delete_bill(&self, id: BillId) -> Result<bool> {
        let affected = self
            .conn()
            .execute("DELETE FROM bills WHERE id = ?1", params![id.to_string()])?;
        Ok(affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_then_get() {
        let db = Database::open_in_memory().unwrap();
        let created = db.create_bill("Dinner").unwrap();

        let fetched = db.get_bill(created.id).unwrap().expect("bill exists");
        assert_eq!(fetched, created);
        assert_eq!(fetched.name, "Dinner");
        assert!(fetched.users.is_empty());
        assert!(fetched.tags.is_empty());
        assert!(fetched.line_items.is_empty());
        assert!(fetched.proportional_charges.is_empty());
    }

    #[test]
    fn missing_bill_is_none() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.get_bill(BillId::new()).unwrap().is_none());
        assert!(db.rename_bill(BillId::new(), "x").unwrap().is_none());
        assert!(!db.delete_bill(BillId::new()).unwrap());
    }

    #[test]
    fn summaries_count_nested_lists() {
        let db = Database::open_in_memory().unwrap();
        let first = db.create_bill("First").unwrap();
        let second = db.create_bill("Second").unwrap();

        db.add_user(second.id, "Alice").unwrap();
        db.add_user(second.id, "Bob").unwrap();
        db.add_line_item(second.id, None).unwrap();

        let summaries = db.list_bill_summaries().unwrap();
        assert_eq!(
            summaries,
            vec![
                BillSummary {
                    id: first.id,
                    name: "First".into(),
                    line_items_count: 0,
                    users_count: 0,
                },
                BillSummary {
                    id: second.id,
                    name: "Second".into(),
                    line_items_count: 1,
                    users_count: 2,
                },
            ]
        );
    }

    #[test]
    fn rename_and_delete() {
        let db = Database::open_in_memory().unwrap();
        let bill = db.create_bill("Draft").unwrap();

        let renamed = db.rename_bill(bill.id, "Brunch").unwrap().unwrap();
        assert_eq!(renamed.name, "Brunch");
        assert_eq!(db.list_bill_summaries().unwrap()[0].name, "Brunch");

        assert!(db.delete_bill(bill.id).unwrap());
        assert!(db.get_bill(bill.id).unwrap().is_none());
        assert!(db.get_bill_images(bill.id).unwrap().is_none());
    }
}
