use serde::{Deserialize, Serialize};

use crate::workflows::validation::{
    fix_postcode_spacing, is_blank, FormatValidator, NiNumberValidator, PostcodeValidator,
};

/// Contact and identity details held for the defendant named on a document.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DefendantDetails {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub driving_licence_number: Option<String>,
    #[serde(default)]
    pub ni_number: Option<String>,
    #[serde(default)]
    pub postcode: Option<String>,
    #[serde(default)]
    pub financial_means: Option<FinancialMeans>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmploymentStatus {
    Employed,
    SelfEmployed,
    Unemployed,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncomeFrequency {
    Weekly,
    Fortnightly,
    Monthly,
    Yearly,
}

/// Statement of means declared on the plea form. Amounts are in pence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinancialMeans {
    pub employment_status: EmploymentStatus,
    #[serde(default)]
    pub income_amount: Option<u64>,
    #[serde(default)]
    pub income_frequency: Option<IncomeFrequency>,
    #[serde(default)]
    pub benefits_claimed: bool,
}

/// Accept a proposed NI number only if, once spaces are removed and letters
/// upper-cased, it is a valid number. Otherwise the held value stands.
pub fn normalise_ni_number(existing: Option<&str>, proposed: Option<&str>) -> Option<String> {
    let candidate = proposed.filter(|value| !is_blank(value)).map(|value| {
        value
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_uppercase()
    });

    match candidate {
        Some(candidate) if NiNumberValidator.is_valid(&candidate) => Some(candidate),
        _ => existing.map(str::to_string),
    }
}

/// Accept a proposed postcode as-is when valid, re-spaced when that makes it
/// valid, and otherwise keep the held value.
pub fn normalise_postcode(existing: Option<&str>, proposed: Option<&str>) -> Option<String> {
    let Some(proposed) = proposed.filter(|value| !is_blank(value)) else {
        return existing.map(str::to_string);
    };

    if PostcodeValidator.is_valid(proposed) {
        return Some(proposed.to_string());
    }

    fix_postcode_spacing(proposed).or_else(|| existing.map(str::to_string))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ni_number_is_compacted_and_upper_cased() {
        assert_eq!(
            normalise_ni_number(None, Some("ab 12 34 56 c")).as_deref(),
            Some("AB123456C")
        );
    }

    #[test]
    fn invalid_ni_number_keeps_existing() {
        assert_eq!(
            normalise_ni_number(Some("AB123456C"), Some("GB123456A")).as_deref(),
            Some("AB123456C")
        );
        assert_eq!(normalise_ni_number(None, Some("")), None);
    }

    #[test]
    fn postcode_is_accepted_or_fixed() {
        assert_eq!(
            normalise_postcode(None, Some("EC1A 1BB")).as_deref(),
            Some("EC1A 1BB")
        );
        assert_eq!(
            normalise_postcode(Some("M1 1AE"), Some("EC1A1BB")).as_deref(),
            Some("EC1A 1BB")
        );
    }

    #[test]
    fn unfixable_postcode_keeps_existing() {
        assert_eq!(
            normalise_postcode(Some("M1 1AE"), Some("NOWHERE")).as_deref(),
            Some("M1 1AE")
        );
        assert_eq!(
            normalise_postcode(Some("M1 1AE"), None).as_deref(),
            Some("M1 1AE")
        );
    }
}
