use super::domain::{Offence, Plea, PleaValue};
use super::problem::{Problem, ProblemCode};

/// Longest offence title kept when titles are stored or compared.
pub const OFFENCE_TITLE_MAX_LENGTH: usize = 120;

const PLEA_TYPE_KEY: &str = "PLEA_TYPE";
const PLEA_TITLE_KEY: &str = "PLEA_TITLE";
const FINAL_DECISION_KEY: &str = "OFFENCE_HAS_FINAL_DECISION";
const SAME_TITLE_KEY: &str = "SAME_OFFENCE_TITLE";
const COME_TO_COURT_KEY: &str = "WISH_TO_COME_TO_COURT";

/// Strip all whitespace from an offence title and cap it at
/// [`OFFENCE_TITLE_MAX_LENGTH`] characters.
pub fn clean_offence_title(title: &str) -> String {
    title
        .chars()
        .filter(|c| !c.is_whitespace())
        .take(OFFENCE_TITLE_MAX_LENGTH)
        .collect()
}

/// Check a submitted plea against the authoritative record.
///
/// Problems are ordered by submitted offence, then by rule; the
/// wish-to-come-to-court findings follow once every offence has been visited.
pub fn validate_plea(submitted: &Plea, authoritative: &Plea, document_id: &str) -> Vec<Problem> {
    let mut problems = Vec::new();

    for offence in &submitted.offences {
        match offence.plea {
            Some(PleaValue::Both) => problems.push(Problem::single(
                ProblemCode::PleaTypeInvalid,
                PLEA_TYPE_KEY,
                PleaValue::Both.label(),
                document_id,
            )),
            None => problems.push(Problem::single(
                ProblemCode::PleaTypeEmpty,
                PLEA_TYPE_KEY,
                "EMPTY",
                document_id,
            )),
            Some(_) => {}
        }

        let title = offence.title.as_deref();
        if title.map_or(true, |title| title.trim().is_empty()) {
            problems.push(Problem::single(
                ProblemCode::PleaTitleInvalid,
                PLEA_TITLE_KEY,
                title.unwrap_or_default(),
                document_id,
            ));
        }

        let Some(title) = title else {
            continue;
        };

        let decided = authoritative
            .offences
            .iter()
            .filter(|record| record.has_final_decision && cleaned_title_matches(record, title));
        for _ in decided {
            problems.push(Problem::single(
                ProblemCode::OffenceHasFinalDecision,
                FINAL_DECISION_KEY,
                title,
                document_id,
            ));
        }

        if same_title_count(&submitted.offences, title) > 1 {
            problems.push(Problem::single(
                ProblemCode::SameOffenceTitle,
                SAME_TITLE_KEY,
                title,
                document_id,
            ));
        }
    }

    if submitted.wish_to_come_to_court.is_none() {
        let guilty = submitted
            .offences
            .iter()
            .filter(|offence| offence.plea == Some(PleaValue::Guilty));
        for _ in guilty {
            problems.push(Problem::single(
                ProblemCode::WishToComeToCourtInvalid,
                COME_TO_COURT_KEY,
                "INVALID",
                document_id,
            ));
        }
    }

    problems
}

fn cleaned_title_matches(record: &Offence, submitted_title: &str) -> bool {
    record
        .title
        .as_deref()
        .map(clean_offence_title)
        .is_some_and(|cleaned| eq_ignore_case(&cleaned, submitted_title))
}

fn same_title_count(offences: &[Offence], title: &str) -> usize {
    offences
        .iter()
        .filter_map(|offence| offence.title.as_deref())
        .filter(|candidate| eq_ignore_case(candidate, title))
        .count()
}

fn eq_ignore_case(left: &str, right: &str) -> bool {
    left.to_lowercase() == right.to_lowercase()
}
