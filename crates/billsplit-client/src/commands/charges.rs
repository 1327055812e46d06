//! Proportional charges.

use billsplit_shared::rpc::{ChargeInput, ChargeUpdate};
use billsplit_shared::{Bill, BillId, ChargeId, ProportionalCharge};

use crate::resource::{Fetched, Resource};
use crate::session::BillSession;
use crate::state::{BillsAction, Cached};

impl BillSession {
    pub async fn add_charge(&self, bill_id: BillId, charge: ChargeInput) -> Cached<ProportionalCharge> {
        let out = self
            .request("Failed to add charge", self.api.bill_add_charge(bill_id, charge))
            .await;
        self.store_bill_result(bill_id, &out.clone().map(|r| r.map(|o| o.bill)));
        out.map(|r| r.map(|o| o.proportional_charge))
    }

    /// Replace a charge. `NotFound` if the bill or the charge is gone; the
    /// bill is refetched in that case.
    pub async fn update_charge(
        &self,
        bill_id: BillId,
        update: ChargeUpdate,
    ) -> Cached<ProportionalCharge> {
        let charge = self
            .request(
                "Failed to save charge",
                self.api.bill_update_charge(bill_id, update),
            )
            .await;

        match &charge {
            Fetched::Success(Resource::Loaded(charge)) => {
                self.dispatch(BillsAction::ChargeStored {
                    bill_id,
                    charge: charge.clone(),
                });
            }
            Fetched::Success(Resource::NotFound) => {
                self.fetch_bill(bill_id).await;
            }
            _ => {}
        }
        charge
    }

    pub async fn remove_charge(&self, bill_id: BillId, charge_id: ChargeId) -> Cached<Bill> {
        let bill = self
            .request(
                "Failed to remove charge",
                self.api.bill_remove_charge(bill_id, charge_id),
            )
            .await;
        self.store_bill_if_loaded(&bill);
        bill
    }
}

#[cfg(test)]
mod tests {
    use billsplit_shared::rpc::{ChargeInput, ChargeUpdate};
    use billsplit_shared::{BillId, ChargeId, TagId};

    use crate::error::ClientError;
    use crate::resource::{Fetched, Resource};
    use crate::testing::fake_session;

    fn tip(proportion: f64) -> ChargeInput {
        ChargeInput {
            name: "Tip".into(),
            filter_tags: None,
            proportion,
        }
    }

    #[tokio::test]
    async fn add_update_remove_charge() {
        let (session, api) = fake_session();
        let bill = api.db().create_bill("Dinner").unwrap();
        session.fetch_bill(bill.id).await;

        let Fetched::Success(Resource::Loaded(charge)) = session.add_charge(bill.id, tip(0.1)).await
        else {
            panic!("add failed");
        };
        assert_eq!(charge.proportion, 0.1);

        let updated = session
            .update_charge(
                bill.id,
                ChargeUpdate {
                    id: charge.id,
                    fields: tip(0.15),
                },
            )
            .await;
        assert_eq!(updated.success().and_then(|r| r.loaded()).unwrap().proportion, 0.15);

        let cached = session.with_state(|s| s.bill(bill.id));
        let cached = cached.success().and_then(|r| r.loaded()).unwrap();
        assert_eq!(cached.proportional_charges.len(), 1);
        assert_eq!(cached.proportional_charges[0].proportion, 0.15);

        let after = session.remove_charge(bill.id, charge.id).await;
        assert!(after
            .success()
            .and_then(|r| r.loaded())
            .unwrap()
            .proportional_charges
            .is_empty());
    }

    #[tokio::test]
    async fn updating_a_missing_charge_refetches_the_bill() {
        let (session, api) = fake_session();
        let bill = api.db().create_bill("Dinner").unwrap();
        api.db().add_charge(bill.id, tip(0.1)).unwrap();

        let result = session
            .update_charge(
                bill.id,
                ChargeUpdate {
                    id: ChargeId::new(),
                    fields: tip(0.2),
                },
            )
            .await;
        assert_eq!(result, Fetched::Success(Resource::NotFound));

        let cached = session.with_state(|s| s.bill(bill.id));
        let cached = cached.success().and_then(|r| r.loaded()).unwrap();
        assert_eq!(cached.proportional_charges.len(), 1);
        assert_eq!(cached.proportional_charges[0].proportion, 0.1);
    }

    #[tokio::test]
    async fn unknown_filter_tag_is_rejected() {
        let (session, api) = fake_session();
        let bill = api.db().create_bill("Dinner").unwrap();

        let result = session
            .add_charge(
                bill.id,
                ChargeInput {
                    filter_tags: Some(vec![TagId::new()]),
                    ..tip(0.1)
                },
            )
            .await;
        assert!(matches!(
            result,
            Fetched::Errored(ClientError::Server { status: 400, .. })
        ));
        assert_eq!(session.toaster().visible()[0].1.text(), "Failed to add charge");
    }

    #[tokio::test]
    async fn charge_on_missing_bill() {
        let (session, _) = fake_session();
        assert_eq!(
            session.add_charge(BillId::new(), tip(0.1)).await,
            Fetched::Success(Resource::NotFound)
        );
    }
}
