//! Proportional charges (tax, tip, service fees).

use billsplit_shared::rpc::{AddChargeOutput, ChargeInput, ChargeUpdate};
use billsplit_shared::{Bill, BillId, ChargeId, ProportionalCharge};

use crate::database::Database;
use crate::document::{check_tags, position_unique};
use crate::error::Result;

fn check_filter(bill: &Bill, input: &ChargeInput) -> Result<()> {
    check_tags(bill, input.filter_tags.iter().flatten())
}

impl Database {
    pub fn add_charge(&self, bill_id: BillId, input: ChargeInput) -> Result<Option<AddChargeOutput>> {
        self.modify_bill(bill_id, |bill| {
            check_filter(bill, &input)?;
            let charge = ProportionalCharge {
                id: ChargeId::new(),
                name: input.name,
                filter_tags: input.filter_tags,
                proportion: input.proportion,
            };
            bill.proportional_charges.push(charge.clone());
            Ok(Some(AddChargeOutput {
                bill: bill.clone(),
                proportional_charge: charge,
            }))
        })
    }

    /// Replace a charge in place. Same missing/duplicate handling as
    /// [`Database::update_line_item`].
    pub fn update_charge(
        &self,
        bill_id: BillId,
        update: ChargeUpdate,
    ) -> Result<Option<ProportionalCharge>> {
        self.modify_bill(bill_id, |bill| {
            let Some(pos) = position_unique(
                &bill.proportional_charges,
                update.id,
                |c| c.id,
                "proportional charge",
            )?
            else {
                return Ok(None);
            };
            check_filter(bill, &update.fields)?;

            let charge = ProportionalCharge {
                id: update.id,
                name: update.fields.name,
                filter_tags: update.fields.filter_tags,
                proportion: update.fields.proportion,
            };
            bill.proportional_charges[pos] = charge.clone();
            Ok(Some(charge))
        })
    }

    pub fn remove_charge(&self, bill_id: BillId, charge_id: ChargeId) -> Result<Option<Bill>> {
        self.modify_bill(bill_id, |bill| {
            let before = bill.proportional_charges.len();
            bill.proportional_charges.retain(|c| c.id != charge_id);
            if bill.proportional_charges.len() == before {
                return Ok(None);
            }
            Ok(Some(bill.clone()))
        })
    }
}
