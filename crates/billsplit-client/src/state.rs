//! Cache of everything fetched from the server.
//!
//! [`BillsState`] is plain data. Every change goes through
//! [`BillsState::reduce`], so the cache can be driven and inspected in
//! tests without a UI or a network.

use std::collections::HashMap;

use billsplit_shared::{Bill, BillId, BillSummary, Image, LineItem, LineItemId, ProportionalCharge};

use crate::resource::{Fetched, Resource};

/// A cached resource: the outcome of its latest fetch or mutation.
pub type Cached<T> = Fetched<Resource<T>>;

#[derive(Debug, Clone, PartialEq)]
pub enum BillsAction {
    /// Outcome of (re)fetching the bill list; `Resource::Loading` while
    /// the request is in flight.
    BillListFetched(Cached<Vec<BillSummary>>),
    BillFetched {
        bill_id: BillId,
        bill: Cached<Bill>,
    },
    ImagesFetched {
        bill_id: BillId,
        images: Cached<Vec<Image>>,
    },
    /// A mutation returned the bill's new state.
    BillStored(Bill),
    /// A line item changed (local edit or server answer); replaced in place.
    LineItemStored {
        bill_id: BillId,
        line_item: LineItem,
    },
    ChargeStored {
        bill_id: BillId,
        charge: ProportionalCharge,
    },
    BillRemoved(BillId),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BillsState {
    bill_list: Option<Cached<Vec<BillSummary>>>,
    bills: HashMap<BillId, Cached<Bill>>,
    bill_images: HashMap<BillId, Cached<Vec<Image>>>,
}

fn summary_of(bill: &Bill) -> BillSummary {
    BillSummary {
        id: bill.id,
        name: bill.name.clone(),
        line_items_count: bill.line_items.len(),
        users_count: bill.users.len(),
    }
}

impl BillsState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reduce(&mut self, action: BillsAction) {
        match action {
            BillsAction::BillListFetched(list) => {
                self.bill_list = Some(list);
            }
            BillsAction::BillFetched { bill_id, bill } => {
                self.bills.insert(bill_id, bill);
            }
            BillsAction::ImagesFetched { bill_id, images } => {
                self.bill_images.insert(bill_id, images);
            }
            BillsAction::BillStored(bill) => {
                if let Some(Fetched::Success(Resource::Loaded(list))) = self.bill_list.as_mut() {
                    let summary = summary_of(&bill);
                    match list.iter_mut().find(|s| s.id == bill.id) {
                        Some(slot) => *slot = summary,
                        None => list.push(summary),
                    }
                }
                self.bills
                    .insert(bill.id, Fetched::Success(Resource::Loaded(bill)));
            }
            BillsAction::LineItemStored { bill_id, line_item } => {
                if let Some(Fetched::Success(Resource::Loaded(bill))) = self.bills.get_mut(&bill_id)
                {
                    if let Some(slot) = bill.line_items.iter_mut().find(|i| i.id == line_item.id) {
                        *slot = line_item;
                    }
                }
            }
            BillsAction::ChargeStored { bill_id, charge } => {
                if let Some(Fetched::Success(Resource::Loaded(bill))) = self.bills.get_mut(&bill_id)
                {
                    if let Some(slot) = bill
                        .proportional_charges
                        .iter_mut()
                        .find(|c| c.id == charge.id)
                    {
                        *slot = charge;
                    }
                }
            }
            BillsAction::BillRemoved(bill_id) => {
                if let Some(Fetched::Success(Resource::Loaded(list))) = self.bill_list.as_mut() {
                    list.retain(|s| s.id != bill_id);
                }
                self.bills
                    .insert(bill_id, Fetched::Success(Resource::NotFound));
                self.bill_images
                    .insert(bill_id, Fetched::Success(Resource::NotFound));
            }
        }
    }

    // ------------------------------------------------------------------
    // Selectors. A resource never requested reads as `Loading`.
    // ------------------------------------------------------------------

    pub fn bill_list(&self) -> Cached<Vec<BillSummary>> {
        self.bill_list
            .clone()
            .unwrap_or(Fetched::Success(Resource::Loading))
    }

    pub fn bill(&self, bill_id: BillId) -> Cached<Bill> {
        self.bills
            .get(&bill_id)
            .cloned()
            .unwrap_or(Fetched::Success(Resource::Loading))
    }

    pub fn bill_images(&self, bill_id: BillId) -> Cached<Vec<Image>> {
        self.bill_images
            .get(&bill_id)
            .cloned()
            .unwrap_or(Fetched::Success(Resource::Loading))
    }

    pub fn line_items(&self, bill_id: BillId) -> Cached<Vec<LineItem>> {
        self.bill(bill_id)
            .map(|bill| bill.map(|b| b.line_items))
    }

    pub fn line_item(&self, bill_id: BillId, line_item_id: LineItemId) -> Cached<LineItem> {
        self.bill(bill_id).map(|bill| {
            bill.and_then(|b| b.line_items.into_iter().find(|i| i.id == line_item_id))
        })
    }
}
