//! Bulk check of defendant contact rows exported from case systems.

mod parser;

use std::io::Read;
use std::path::Path;

use serde::Serialize;

use crate::workflows::validation::{fix_postcode_spacing, is_valid_postcode, FieldKind};
use parser::ContactRow;

#[derive(Debug, thiserror::Error)]
pub enum ContactCheckError {
    #[error("failed to read contact export: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid contact CSV data: {0}")]
    Csv(#[from] csv::Error),
}

/// Outcome for one field. `present` is false when the cell was empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldCheck {
    pub present: bool,
    pub valid: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactCheck {
    pub reference: String,
    pub email: FieldCheck,
    pub phone: FieldCheck,
    pub driving_licence: FieldCheck,
    pub ni_number: FieldCheck,
    pub postcode: FieldCheck,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_postcode: Option<String>,
}

impl ContactCheck {
    pub fn is_clean(&self) -> bool {
        [
            self.email,
            self.phone,
            self.driving_licence,
            self.ni_number,
            self.postcode,
        ]
        .iter()
        .all(|check| !check.present || check.valid)
    }

    /// Labels of fields that were supplied but failed their format check.
    pub fn failed_fields(&self) -> Vec<&'static str> {
        [
            (FieldKind::Email, self.email),
            (FieldKind::Phone, self.phone),
            (FieldKind::DrivingLicence, self.driving_licence),
            (FieldKind::NiNumber, self.ni_number),
            (FieldKind::Postcode, self.postcode),
        ]
        .into_iter()
        .filter(|(_, check)| check.present && !check.valid)
        .map(|(kind, _)| kind.label())
        .collect()
    }
}

pub struct ContactChecker;

impl ContactChecker {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<ContactCheck>, ContactCheckError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<ContactCheck>, ContactCheckError> {
        let rows = parser::parse_rows(reader)?;
        Ok(rows.iter().map(check_row).collect())
    }
}

fn check_field(kind: FieldKind, value: Option<&str>) -> FieldCheck {
    match value {
        Some(value) => FieldCheck {
            present: true,
            valid: kind.validator().is_valid(value),
        },
        None => FieldCheck {
            present: false,
            valid: false,
        },
    }
}

fn check_row(row: &ContactRow) -> ContactCheck {
    let postcode = check_field(FieldKind::Postcode, row.postcode.as_deref());
    let suggested_postcode = row
        .postcode
        .as_deref()
        .filter(|value| !is_valid_postcode(value))
        .and_then(fix_postcode_spacing);

    ContactCheck {
        reference: row.reference.clone(),
        email: check_field(FieldKind::Email, row.email.as_deref()),
        phone: check_field(FieldKind::Phone, row.phone.as_deref()),
        driving_licence: check_field(FieldKind::DrivingLicence, row.driving_licence.as_deref()),
        ni_number: check_field(FieldKind::NiNumber, row.ni_number.as_deref()),
        postcode,
        suggested_postcode,
    }
}
