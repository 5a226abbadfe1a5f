use serde::{Deserialize, Serialize};

use crate::workflows::validation::{
    is_blank, DrivingLicenceValidator, EmailValidator, FormatValidator, PhoneValidator,
};

/// Held and proposed values for the three reconciled fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconciliationInput<'a> {
    pub existing_email: Option<&'a str>,
    pub new_email: Option<&'a str>,
    pub existing_phone: Option<&'a str>,
    pub new_phone: Option<&'a str>,
    pub existing_licence: Option<&'a str>,
    pub new_licence: Option<&'a str>,
}

/// Values to persist plus the flags surfaced to the clerk.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DefendantDetailsReconciliation {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub driving_licence_number: Option<String>,
    pub details_updated: bool,
    pub licence_valid: bool,
    pub licence_mismatch: bool,
}

pub fn reconcile_defendant_details(input: ReconciliationInput<'_>) -> DefendantDetailsReconciliation {
    let mut result = DefendantDetailsReconciliation::default();

    let (email, email_updated) =
        reconcile_contact(input.existing_email, input.new_email, &EmailValidator);
    let (phone, phone_updated) =
        reconcile_contact(input.existing_phone, input.new_phone, &PhoneValidator);
    result.email = email;
    result.phone = phone;
    result.details_updated = email_updated || phone_updated;

    let existing_licence = input.existing_licence.filter(|value| !is_blank(value));
    match input.new_licence.filter(|value| !is_blank(value)) {
        None => {
            result.driving_licence_number = input.existing_licence.map(str::to_string);
            result.licence_valid = true;
        }
        Some(proposed) => match existing_licence {
            Some(existing) if existing == proposed => {
                result.driving_licence_number = Some(existing.to_string());
                result.licence_valid = true;
            }
            // a confirmed licence is never overwritten by a conflicting claim
            Some(existing) => {
                result.driving_licence_number = Some(existing.to_string());
                result.licence_mismatch = true;
            }
            None if DrivingLicenceValidator.is_valid(proposed) => {
                result.driving_licence_number = Some(proposed.to_string());
                result.details_updated = true;
                result.licence_valid = true;
            }
            None => {
                result.driving_licence_number = input.existing_licence.map(str::to_string);
            }
        },
    }

    result
}

fn reconcile_contact(
    existing: Option<&str>,
    proposed: Option<&str>,
    validator: &dyn FormatValidator,
) -> (Option<String>, bool) {
    let Some(proposed) = proposed.filter(|value| !is_blank(value)) else {
        return (existing.map(str::to_string), false);
    };

    let changed = existing.map_or(true, |existing| {
        existing.to_lowercase() != proposed.to_lowercase()
    });

    if changed && validator.is_valid(proposed) {
        (Some(proposed.to_string()), true)
    } else {
        (existing.map(str::to_string), false)
    }
}
