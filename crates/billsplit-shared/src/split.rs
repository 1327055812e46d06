//! Per-user totals for a bill.
//!
//! All money is handled in integer minor units (cents). A money amount is
//! rounded half away from zero exactly once, where it is produced (a line
//! item price, a charge amount); it is then divided between users with the
//! largest-remainder method so the parts always add back up to the whole.
//!
//! Charges are apportioned pro rata: each user pays the share of a charge
//! equal to their share of the subtotal the charge was computed from.
//! Value not assigned to any user (splits summing below 1, or splits
//! naming a user the bill no longer has) is reported as `unassigned`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::constants::MINOR_UNITS;
use crate::types::{Bill, ChargeId, UserId};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserTotal {
    #[serde(rename = "userID")]
    pub user_id: UserId,
    pub name: String,
    pub items_cents: i64,
    pub charges_cents: i64,
    pub total_cents: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChargeTotal {
    pub id: ChargeId,
    pub name: String,
    /// Filtered subtotal the charge proportion was applied to.
    pub base_cents: i64,
    pub amount_cents: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SplitSummary {
    /// One entry per bill user, in bill order.
    pub users: Vec<UserTotal>,
    pub charges: Vec<ChargeTotal>,
    pub subtotal_cents: i64,
    pub charges_cents: i64,
    pub total_cents: i64,
    pub unassigned_cents: i64,
}

/// Convert a major-unit amount to cents, rounding half away from zero.
pub fn to_cents(amount: f64) -> i64 {
    (amount * MINOR_UNITS).round() as i64
}

/// Divide `total` into parts proportional to `weights` such that the parts
/// sum to `total` exactly. Leftover cents go to the largest fractional
/// remainders, ties broken by position. If every weight is zero the whole
/// amount goes to the last slot.
pub fn distribute(total: i64, weights: &[f64]) -> Vec<i64> {
    let mut parts = vec![0i64; weights.len()];
    if weights.is_empty() {
        return parts;
    }

    let sum: f64 = weights.iter().map(|w| w.max(0.0)).sum();
    if sum <= 0.0 {
        if let Some(last) = parts.last_mut() {
            *last = total;
        }
        return parts;
    }

    let exact: Vec<f64> = weights
        .iter()
        .map(|w| total as f64 * w.max(0.0) / sum)
        .collect();
    for (part, e) in parts.iter_mut().zip(&exact) {
        *part = e.floor() as i64;
    }

    let assigned = parts.iter().fold(0i64, |acc, p| acc.saturating_add(*p));
    let leftover = total.saturating_sub(assigned);
    if leftover > 0 {
        let mut order: Vec<usize> = (0..weights.len()).collect();
        order.sort_by(|&a, &b| {
            let ra = exact[a] - exact[a].floor();
            let rb = exact[b] - exact[b].floor();
            rb.partial_cmp(&ra)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.cmp(&b))
        });
        for &i in order.iter().cycle().take(leftover as usize) {
            parts[i] += 1;
        }
    }

    parts
}

/// Prices are capped on input, so saturation only shows on bills written
/// around validation.
fn saturating_sum(values: impl Iterator<Item = i64>) -> i64 {
    values.fold(0, i64::saturating_add)
}

/// Compute what every user of `bill` owes.
pub fn summarize(bill: &Bill) -> SplitSummary {
    let user_index: HashMap<UserId, usize> = bill
        .users
        .iter()
        .enumerate()
        .map(|(i, u)| (u.id, i))
        .collect();
    let slots = bill.users.len();

    // Per line item: cents owed by each user, with the unassigned part in
    // the extra trailing slot.
    let item_shares: Vec<Vec<i64>> = bill
        .line_items
        .iter()
        .map(|item| {
            let mut weights = vec![0.0; slots + 1];
            for split in &item.users_split {
                match user_index.get(&split.user_id) {
                    Some(&i) => weights[i] += split.proportion,
                    None => weights[slots] += split.proportion,
                }
            }
            let assigned: f64 = weights[..slots].iter().sum();
            weights[slots] += (1.0 - assigned - weights[slots]).max(0.0);
            distribute(to_cents(item.price), &weights)
        })
        .collect();

    let mut items_cents = vec![0i64; slots];
    let mut charges_cents = vec![0i64; slots];
    let mut unassigned = 0i64;

    for shares in &item_shares {
        for (acc, share) in items_cents.iter_mut().zip(shares) {
            *acc = acc.saturating_add(*share);
        }
        unassigned = unassigned.saturating_add(shares[slots]);
    }

    let mut charges = Vec::with_capacity(bill.proportional_charges.len());
    for charge in &bill.proportional_charges {
        let mut base = vec![0i64; slots + 1];
        for (item, shares) in bill.line_items.iter().zip(&item_shares) {
            if charge.applies_to(item) {
                for (acc, share) in base.iter_mut().zip(shares) {
                    *acc = acc.saturating_add(*share);
                }
            }
        }
        let base_cents = saturating_sum(base.iter().copied());
        let amount_cents = (base_cents as f64 * charge.proportion).round() as i64;

        let weights: Vec<f64> = base.iter().map(|&c| c as f64).collect();
        let parts = distribute(amount_cents, &weights);
        for (acc, part) in charges_cents.iter_mut().zip(&parts) {
            *acc = acc.saturating_add(*part);
        }
        unassigned = unassigned.saturating_add(parts[slots]);

        charges.push(ChargeTotal {
            id: charge.id,
            name: charge.name.clone(),
            base_cents,
            amount_cents,
        });
    }

    let users = bill
        .users
        .iter()
        .enumerate()
        .map(|(i, user)| UserTotal {
            user_id: user.id,
            name: user.name.clone(),
            items_cents: items_cents[i],
            charges_cents: charges_cents[i],
            total_cents: items_cents[i].saturating_add(charges_cents[i]),
        })
        .collect();

    let subtotal_cents = saturating_sum(bill.line_items.iter().map(|i| to_cents(i.price)));
    let charges_total = saturating_sum(charges.iter().map(|c| c.amount_cents));

    SplitSummary {
        users,
        charges,
        subtotal_cents,
        charges_cents: charges_total,
        total_cents: subtotal_cents.saturating_add(charges_total),
        unassigned_cents: unassigned,
    }
}
