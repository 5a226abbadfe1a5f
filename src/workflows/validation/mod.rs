//! Format checks applied to defendant-supplied contact and identity values.
//!
//! Every validator is a zero-sized type implementing [`FormatValidator`], so callers
//! can hold `&dyn FormatValidator` when the field being checked is only known at
//! runtime. The free functions are shorthands for the common case.

mod contact;
mod identity;
mod postcode;

pub use contact::{EmailValidator, PhoneValidator};
pub use identity::{DrivingLicenceValidator, NiNumberValidator};
pub use postcode::{fix_postcode_spacing, PostcodeValidator};

/// Single capability shared by every format check.
pub trait FormatValidator: Send + Sync {
    fn is_valid(&self, candidate: &str) -> bool;
}

pub fn is_valid_email(candidate: &str) -> bool {
    EmailValidator.is_valid(candidate)
}

pub fn is_valid_phone(candidate: &str) -> bool {
    PhoneValidator.is_valid(candidate)
}

pub fn is_valid_driving_licence(candidate: &str) -> bool {
    DrivingLicenceValidator.is_valid(candidate)
}

pub fn is_valid_ni_number(candidate: &str) -> bool {
    NiNumberValidator.is_valid(candidate)
}

pub fn is_valid_postcode(candidate: &str) -> bool {
    PostcodeValidator.is_valid(candidate)
}

/// Named field kinds, used where the field is chosen at runtime (CLI, CSV checks).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Email,
    Phone,
    DrivingLicence,
    NiNumber,
    Postcode,
}

impl FieldKind {
    pub fn validator(self) -> &'static dyn FormatValidator {
        match self {
            FieldKind::Email => &EmailValidator,
            FieldKind::Phone => &PhoneValidator,
            FieldKind::DrivingLicence => &DrivingLicenceValidator,
            FieldKind::NiNumber => &NiNumberValidator,
            FieldKind::Postcode => &PostcodeValidator,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            FieldKind::Email => "email",
            FieldKind::Phone => "phone",
            FieldKind::DrivingLicence => "driving licence",
            FieldKind::NiNumber => "NI number",
            FieldKind::Postcode => "postcode",
        }
    }
}

pub(crate) fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}
