use std::sync::LazyLock;

use regex::Regex;

use super::{is_blank, FormatValidator};

/// Outward code, exactly one space, inward code. Includes Girobank and the
/// overseas-territory codes that do not follow the standard grammar.
static POSTCODE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?i)^(?:",
        r"GIR 0AA",
        r"|(?:ASCN|STHL|TDCU|BBND|BIQQ|FIQQ|PCRN|SIQQ|ITCA) 1ZZ",
        r"|(?:",
        r"[A-PR-UWYZ][0-9][0-9]?",
        r"|[A-PR-UWYZ][A-HK-Y][0-9][0-9]?",
        r"|[A-PR-UWYZ][0-9][A-HJKPSTUW]",
        r"|[A-PR-UWYZ][A-HK-Y][0-9][ABEHMNPRVWXY]",
        r") [0-9][ABD-HJLNP-UW-Z]{2}",
        r")$"
    ))
    .expect("postcode pattern compiles")
});

const INWARD_CODE_LEN: usize = 3;

/// Space-sensitive UK postcode check. A blank postcode is treated as absent.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostcodeValidator;

impl FormatValidator for PostcodeValidator {
    fn is_valid(&self, candidate: &str) -> bool {
        is_blank(candidate) || POSTCODE_RE.is_match(candidate)
    }
}

/// Re-space a postcode so that a single space precedes the inward code.
///
/// Returns `None` when the re-spaced value still fails [`PostcodeValidator`].
pub fn fix_postcode_spacing(candidate: &str) -> Option<String> {
    let compact: Vec<char> = candidate.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.len() <= INWARD_CODE_LEN {
        return None;
    }

    let split = compact.len() - INWARD_CODE_LEN;
    let outward: String = compact[..split].iter().collect();
    let inward: String = compact[split..].iter().collect();
    let fixed = format!("{outward} {inward}");

    if POSTCODE_RE.is_match(&fixed) {
        Some(fixed)
    } else {
        None
    }
}
