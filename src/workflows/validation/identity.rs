use std::sync::LazyLock;

use regex::Regex;

use super::{is_blank, FormatValidator};

// 5 surname characters, decade digit, month digit (+5 for female holders),
// day of month, year digit, 3 initials/check characters, 2 computer check letters.
static DRIVING_LICENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Z0-9]{5}[0-9][0156][0-9](0[1-9]|[12][0-9]|3[01])[0-9][A-Z0-9]{3}[A-Z]{2}$")
        .expect("driving licence pattern compiles")
});

static NI_NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-CEGHJ-PR-TW-Z][A-CEGHJ-NPR-TW-Z][0-9]{6}[A-D]$")
        .expect("NI number pattern compiles")
});

/// Prefixes never issued by HMRC even though both letters are individually allowed.
const FORBIDDEN_NI_PREFIXES: [&str; 7] = ["BG", "GB", "NK", "KN", "TN", "NT", "ZZ"];

/// UK (DVLA) driving licence number. Blank is never valid.
#[derive(Debug, Clone, Copy, Default)]
pub struct DrivingLicenceValidator;

impl FormatValidator for DrivingLicenceValidator {
    fn is_valid(&self, candidate: &str) -> bool {
        !is_blank(candidate) && DRIVING_LICENCE_RE.is_match(candidate)
    }
}

/// National Insurance number.
#[derive(Debug, Clone, Copy, Default)]
pub struct NiNumberValidator;

impl FormatValidator for NiNumberValidator {
    fn is_valid(&self, candidate: &str) -> bool {
        NI_NUMBER_RE.is_match(candidate)
            && !FORBIDDEN_NI_PREFIXES
                .iter()
                .any(|prefix| candidate.starts_with(prefix))
    }
}
