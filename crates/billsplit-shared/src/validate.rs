//! Structural validation of procedure inputs.
//!
//! These checks need nothing but the input itself. Checks that depend on
//! the stored bill (unknown user or tag references, image capacity) happen
//! in the store, still before anything is written.

use std::collections::HashSet;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::constants::{MAX_IMAGE_BYTES, MAX_NAME_LEN, MAX_PRICE, PROPORTION_EPSILON};
use crate::error::ValidationError;
use crate::rpc::{
    AddChargeInput, AddLineItemInput, AddTagInput, AddUserInput, BillIdInput, ChargeInput,
    CreateBillInput, DeleteImageInput, LineItemInput, NewImage, RemoveChargeInput,
    RemoveLineItemInput, RemoveTagInput, RemoveUserInput, RenameBillInput, UpdateChargeInput,
    UpdateLineItemInput, UploadImagesInput,
};
use crate::types::TagId;

pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

fn check_name(field: &'static str, name: &str, allow_blank: bool) -> Result<(), ValidationError> {
    if !allow_blank && name.trim().is_empty() {
        return Err(ValidationError::BlankName { field });
    }
    let len = name.chars().count();
    if len > MAX_NAME_LEN {
        return Err(ValidationError::NameTooLong {
            field,
            len,
            max: MAX_NAME_LEN,
        });
    }
    Ok(())
}

fn check_proportion(p: f64) -> Result<(), ValidationError> {
    if p.is_finite() && (0.0..=1.0).contains(&p) {
        Ok(())
    } else {
        Err(ValidationError::InvalidProportion(p))
    }
}

fn check_unique_tags(tags: &[TagId]) -> Result<(), ValidationError> {
    let mut seen = HashSet::new();
    match tags.iter().find(|t| !seen.insert(**t)) {
        Some(dup) => Err(ValidationError::DuplicateTag(dup.to_string())),
        None => Ok(()),
    }
}

/// Inputs made only of IDs are fully checked by deserialization.
macro_rules! no_extra_checks {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Validate for $ty {
                fn validate(&self) -> Result<(), ValidationError> {
                    Ok(())
                }
            }
        )*
    };
}

no_extra_checks!(
    BillIdInput,
    DeleteImageInput,
    RemoveUserInput,
    RemoveTagInput,
    RemoveLineItemInput,
    RemoveChargeInput,
);

impl Validate for CreateBillInput {
    fn validate(&self) -> Result<(), ValidationError> {
        check_name("Bill name", &self.name, false)
    }
}

impl Validate for RenameBillInput {
    fn validate(&self) -> Result<(), ValidationError> {
        check_name("Bill name", &self.name, false)
    }
}

impl Validate for AddUserInput {
    fn validate(&self) -> Result<(), ValidationError> {
        check_name("User name", &self.name, false)
    }
}

impl Validate for AddTagInput {
    fn validate(&self) -> Result<(), ValidationError> {
        check_name("Tag name", &self.name, false)
    }
}

impl Validate for NewImage {
    fn validate(&self) -> Result<(), ValidationError> {
        let (kind, subtype) = self
            .mime_type
            .split_once('/')
            .ok_or_else(|| ValidationError::InvalidMimeType(self.mime_type.clone()))?;
        if kind != "image" || subtype.is_empty() || subtype.contains(char::is_whitespace) {
            return Err(ValidationError::InvalidMimeType(self.mime_type.clone()));
        }

        if self.base64_data.is_empty() {
            return Err(ValidationError::EmptyImage);
        }
        // Reject before decoding anything absurdly large.
        let estimated = self.base64_data.len() / 4 * 3;
        if estimated > MAX_IMAGE_BYTES + 3 {
            return Err(ValidationError::ImageTooLarge {
                size: estimated,
                max: MAX_IMAGE_BYTES,
            });
        }

        let decoded = STANDARD
            .decode(self.base64_data.as_bytes())
            .map_err(|e| ValidationError::InvalidBase64(e.to_string()))?;
        if decoded.is_empty() {
            return Err(ValidationError::EmptyImage);
        }
        if decoded.len() > MAX_IMAGE_BYTES {
            return Err(ValidationError::ImageTooLarge {
                size: decoded.len(),
                max: MAX_IMAGE_BYTES,
            });
        }
        Ok(())
    }
}

impl Validate for UploadImagesInput {
    fn validate(&self) -> Result<(), ValidationError> {
        self.images.iter().try_for_each(Validate::validate)
    }
}

impl Validate for LineItemInput {
    fn validate(&self) -> Result<(), ValidationError> {
        check_name("Line item name", &self.name, true)?;

        if !self.price.is_finite() || self.price < 0.0 {
            return Err(ValidationError::InvalidPrice(self.price));
        }
        if self.price > MAX_PRICE {
            return Err(ValidationError::PriceTooLarge {
                price: self.price,
                max: MAX_PRICE,
            });
        }
        check_unique_tags(&self.tags)?;

        let mut users = HashSet::new();
        let mut ids = HashSet::new();
        let mut total = 0.0;
        for split in &self.users_split {
            check_proportion(split.proportion)?;
            if !users.insert(split.user_id) {
                return Err(ValidationError::DuplicateSplitUser(split.user_id.to_string()));
            }
            if let Some(id) = split.id {
                if !ids.insert(id) {
                    return Err(ValidationError::DuplicateSplitId(id.to_string()));
                }
            }
            total += split.proportion;
        }
        if total > 1.0 + PROPORTION_EPSILON {
            return Err(ValidationError::SplitExceedsWhole(total));
        }
        Ok(())
    }
}

impl Validate for AddLineItemInput {
    fn validate(&self) -> Result<(), ValidationError> {
        match &self.line_item {
            Some(item) => item.validate(),
            None => Ok(()),
        }
    }
}

impl Validate for UpdateLineItemInput {
    fn validate(&self) -> Result<(), ValidationError> {
        self.line_item.fields.validate()
    }
}

impl Validate for ChargeInput {
    fn validate(&self) -> Result<(), ValidationError> {
        check_name("Charge name", &self.name, false)?;
        if let Some(filter) = &self.filter_tags {
            check_unique_tags(filter)?;
        }
        check_proportion(self.proportion)
    }
}

impl Validate for AddChargeInput {
    fn validate(&self) -> Result<(), ValidationError> {
        self.charge.validate()
    }
}

impl Validate for UpdateChargeInput {
    fn validate(&self) -> Result<(), ValidationError> {
        self.charge.fields.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpc::UserSplitInput;
    use crate::types::{BillId, SplitId, UserId};

    fn item(price: f64, splits: Vec<(UserId, f64)>) -> LineItemInput {
        LineItemInput {
            name: "Pizza".into(),
            price,
            tags: Vec::new(),
            users_split: splits
                .into_iter()
                .map(|(user_id, proportion)| UserSplitInput {
                    id: None,
                    user_id,
                    proportion,
                })
                .collect(),
        }
    }

    #[test]
    fn bill_name_must_not_be_blank() {
        let input = CreateBillInput { name: "   ".into() };
        assert_eq!(
            input.validate(),
            Err(ValidationError::BlankName { field: "Bill name" })
        );
        assert!(CreateBillInput { name: "Dinner".into() }.validate().is_ok());
    }

    #[test]
    fn name_length_is_capped() {
        let input = CreateBillInput {
            name: "x".repeat(MAX_NAME_LEN + 1),
        };
        assert!(matches!(
            input.validate(),
            Err(ValidationError::NameTooLong { .. })
        ));
    }

    #[test]
    fn blank_line_item_is_valid() {
        let input = AddLineItemInput {
            bill_id: BillId::new(),
            line_item: Some(LineItemInput {
                name: String::new(),
                price: 0.0,
                tags: Vec::new(),
                users_split: Vec::new(),
            }),
        };
        assert!(input.validate().is_ok());
    }

    #[test]
    fn price_must_be_finite_and_non_negative() {
        assert!(item(-1.0, vec![]).validate().is_err());
        assert!(item(f64::NAN, vec![]).validate().is_err());
        assert!(item(f64::INFINITY, vec![]).validate().is_err());
        assert!(item(12.5, vec![]).validate().is_ok());
    }

    #[test]
    fn price_is_capped() {
        assert!(item(MAX_PRICE, vec![]).validate().is_ok());
        assert!(matches!(
            item(MAX_PRICE + 0.01, vec![]).validate(),
            Err(ValidationError::PriceTooLarge { .. })
        ));
        assert!(matches!(
            item(1e17, vec![]).validate(),
            Err(ValidationError::PriceTooLarge { .. })
        ));
    }

    #[test]
    fn split_ids_must_be_unique() {
        let shared = SplitId::new();
        let mut input = item(10.0, vec![(UserId::new(), 0.5), (UserId::new(), 0.5)]);
        input.users_split[0].id = Some(shared);
        assert!(input.validate().is_ok());

        input.users_split[1].id = Some(shared);
        assert_eq!(
            input.validate(),
            Err(ValidationError::DuplicateSplitId(shared.to_string()))
        );
    }

    #[test]
    fn tags_must_be_unique() {
        let drinks = TagId::new();
        let mut input = item(10.0, vec![]);
        input.tags = vec![drinks, TagId::new()];
        assert!(input.validate().is_ok());

        input.tags.push(drinks);
        assert_eq!(
            input.validate(),
            Err(ValidationError::DuplicateTag(drinks.to_string()))
        );

        let charge = ChargeInput {
            name: "Tax".into(),
            filter_tags: Some(vec![drinks, drinks]),
            proportion: 0.1,
        };
        assert!(matches!(
            charge.validate(),
            Err(ValidationError::DuplicateTag(_))
        ));
    }

    #[test]
    fn split_rules() {
        let a = UserId::new();
        let b = UserId::new();

        assert!(item(10.0, vec![(a, 0.5), (b, 0.5)]).validate().is_ok());
        // Partial splits leave an unassigned remainder.
        assert!(item(10.0, vec![(a, 0.25)]).validate().is_ok());
        // Thirds do not sum to exactly 1.0 in floating point.
        assert!(item(10.0, vec![(a, 1.0 / 3.0), (b, 2.0 / 3.0)])
            .validate()
            .is_ok());

        assert!(matches!(
            item(10.0, vec![(a, 0.7), (b, 0.7)]).validate(),
            Err(ValidationError::SplitExceedsWhole(_))
        ));
        assert!(matches!(
            item(10.0, vec![(a, 0.2), (a, 0.2)]).validate(),
            Err(ValidationError::DuplicateSplitUser(_))
        ));
        assert_eq!(
            item(10.0, vec![(a, 1.5)]).validate(),
            Err(ValidationError::InvalidProportion(1.5))
        );
    }

    #[test]
    fn image_checks() {
        let ok = NewImage {
            mime_type: "image/png".into(),
            base64_data: STANDARD.encode(b"\x89PNG fake"),
        };
        assert!(ok.validate().is_ok());

        let wrong_type = NewImage {
            mime_type: "text/plain".into(),
            ..ok.clone()
        };
        assert!(matches!(
            wrong_type.validate(),
            Err(ValidationError::InvalidMimeType(_))
        ));

        let bad_data = NewImage {
            base64_data: "%%%not base64%%%".into(),
            ..ok.clone()
        };
        assert!(matches!(
            bad_data.validate(),
            Err(ValidationError::InvalidBase64(_))
        ));

        let empty = NewImage {
            base64_data: String::new(),
            ..ok
        };
        assert_eq!(empty.validate(), Err(ValidationError::EmptyImage));
    }

    #[test]
    fn charge_proportion_is_bounded() {
        let charge = ChargeInput {
            name: "Tip".into(),
            filter_tags: None,
            proportion: 1.2,
        };
        assert!(charge.validate().is_err());
        let charge = ChargeInput {
            proportion: 0.18,
            ..charge
        };
        assert!(charge.validate().is_ok());
    }
}
