use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }
    };
}

entity_id!(
    /// Identity of a bill document.
    BillId
);
entity_id!(UserId);
entity_id!(TagId);
entity_id!(LineItemId);
entity_id!(
    /// Identity of a single entry in a line item's users split.
    SplitId
);
entity_id!(ChargeId);
entity_id!(ImageId);

// ---------------------------------------------------------------------------
// Bill aggregate
// ---------------------------------------------------------------------------

/// A receipt to be split between users.
///
/// Images belong to the same aggregate but are never carried here: their
/// payloads are unbounded, so they are read and written through the
/// dedicated image procedures.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Bill {
    pub id: BillId,
    pub name: String,
    /// Users which will split the items.
    pub users: Vec<User>,
    /// Labels which categorize line items.
    pub tags: Vec<Tag>,
    /// Items which comprise the cost.
    pub line_items: Vec<LineItem>,
    /// Costs based on a proportion of the line items (tax, tip).
    pub proportional_charges: Vec<ProportionalCharge>,
}

impl Bill {
    /// A freshly created bill: every nested collection starts empty.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: BillId::new(),
            name: name.into(),
            users: Vec::new(),
            tags: Vec::new(),
            line_items: Vec::new(),
            proportional_charges: Vec::new(),
        }
    }

    pub fn user(&self, id: UserId) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    pub fn has_tag(&self, id: TagId) -> bool {
        self.tags.iter().any(|t| t.id == id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Tag {
    pub id: TagId,
    pub name: String,
}

/// Item on the receipt which costs money.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub id: LineItemId,
    pub name: String,
    /// Currency-agnostic price.
    pub price: f64,
    /// IDs of tags in the owning bill.
    pub tags: Vec<TagId>,
    /// How much each user owes for this item.
    pub users_split: Vec<UserSplit>,
}

impl LineItem {
    /// Zero-valued row used by the "add blank row, edit in place" flow.
    pub fn blank() -> Self {
        Self {
            id: LineItemId::new(),
            name: String::new(),
            price: 0.0,
            tags: Vec::new(),
            users_split: Vec::new(),
        }
    }

    /// Sum of all split proportions. Anything below 1.0 is unassigned.
    pub fn assigned_proportion(&self) -> f64 {
        self.users_split.iter().map(|s| s.proportion).sum()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserSplit {
    pub id: SplitId,
    #[serde(rename = "userID")]
    pub user_id: UserId,
    /// Share of the line item in `[0, 1]`.
    pub proportion: f64,
}

/// A cost computed as a proportion of a (possibly filtered) subtotal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProportionalCharge {
    pub id: ChargeId,
    pub name: String,
    /// Tags a line item must carry (any of) to count toward the subtotal.
    /// `None` means every line item counts.
    pub filter_tags: Option<Vec<TagId>>,
    /// Share of the filtered subtotal in `[0, 1]`.
    pub proportion: f64,
}

impl ProportionalCharge {
    pub fn applies_to(&self, item: &LineItem) -> bool {
        match &self.filter_tags {
            None => true,
            Some(filter) => item.tags.iter().any(|t| filter.contains(t)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    pub id: ImageId,
    pub mime_type: String,
    pub base64_data: String,
}

/// List-view projection of a bill.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BillSummary {
    pub id: BillId,
    pub name: String,
    pub line_items_count: usize,
    pub users_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_bill_is_empty() {
        let bill = Bill::new("Dinner");
        assert_eq!(bill.name, "Dinner");
        assert!(bill.users.is_empty());
        assert!(bill.tags.is_empty());
        assert!(bill.line_items.is_empty());
        assert!(bill.proportional_charges.is_empty());
    }

    #[test]
    fn wire_field_names() {
        let item = LineItem {
            users_split: vec![UserSplit {
                id: SplitId::new(),
                user_id: UserId::new(),
                proportion: 0.5,
            }],
            ..LineItem::blank()
        };
        let json = serde_json::to_value(&item).unwrap();
        assert!(json.get("usersSplit").is_some());
        assert!(json["usersSplit"][0].get("userID").is_some());

        let charge = ProportionalCharge {
            id: ChargeId::new(),
            name: "Tip".into(),
            filter_tags: None,
            proportion: 0.2,
        };
        let json = serde_json::to_value(&charge).unwrap();
        assert!(json["filterTags"].is_null());
    }

    #[test]
    fn ids_round_trip_through_strings() {
        let id = BillId::new();
        let parsed: BillId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
        assert!("not-a-uuid".parse::<BillId>().is_err());
    }

    #[test]
    fn charge_filter_matches_any_tag() {
        let food = TagId::new();
        let drinks = TagId::new();
        let item = LineItem {
            tags: vec![food],
            ..LineItem::blank()
        };

        let mut charge = ProportionalCharge {
            id: ChargeId::new(),
            name: "Tax".into(),
            filter_tags: None,
            proportion: 0.1,
        };
        assert!(charge.applies_to(&item));

        charge.filter_tags = Some(vec![drinks]);
        assert!(!charge.applies_to(&item));

        charge.filter_tags = Some(vec![drinks, food]);
        assert!(charge.applies_to(&item));

        charge.filter_tags = Some(Vec::new());
        assert!(!charge.applies_to(&item));
    }
}
