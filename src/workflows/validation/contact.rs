use std::sync::LazyLock;

use email_address::EmailAddress;
use regex::Regex;

use super::{is_blank, FormatValidator};

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9+\- ]{10,}$").expect("phone pattern compiles"));

/// Mailbox address check. Grammar is delegated to `email_address`; on top of that
/// the local part must be a dot-atom and the domain a dotted host name with an
/// alphabetic top-level label.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmailValidator;

impl FormatValidator for EmailValidator {
    fn is_valid(&self, candidate: &str) -> bool {
        if candidate.chars().any(char::is_whitespace) || !EmailAddress::is_valid(candidate) {
            return false;
        }

        match candidate.rsplit_once('@') {
            Some((local, domain)) => is_dot_atom(local) && is_dotted_host(domain),
            None => false,
        }
    }
}

fn is_dot_atom(local: &str) -> bool {
    !local.is_empty() && !local.starts_with('.') && !local.ends_with('.') && !local.contains("..")
}

fn is_dotted_host(domain: &str) -> bool {
    if !domain.contains('.') || domain.starts_with('[') {
        return false;
    }

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.iter().any(|label| label.is_empty()) {
        return false;
    }

    labels
        .last()
        .is_some_and(|tld| tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic()))
}

/// Telephone number check. A blank number means "no change requested" and passes.
#[derive(Debug, Clone, Copy, Default)]
pub struct PhoneValidator;

impl FormatValidator for PhoneValidator {
    fn is_valid(&self, candidate: &str) -> bool {
        is_blank(candidate) || PHONE_RE.is_match(candidate)
    }
}
