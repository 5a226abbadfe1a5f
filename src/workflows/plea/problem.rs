use serde::{Deserialize, Serialize};

/// Business rule that a plea submission broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProblemCode {
    PleaTypeInvalid,
    PleaTitleInvalid,
    PleaTypeEmpty,
    WishToComeToCourtInvalid,
    WishToSpeakWelshInvalid,
    OffenceHasFinalDecision,
    SameOffenceTitle,
}

impl ProblemCode {
    pub const fn label(self) -> &'static str {
        match self {
            ProblemCode::PleaTypeInvalid => "PLEA_TYPE_INVALID",
            ProblemCode::PleaTitleInvalid => "PLEA_TITLE_INVALID",
            ProblemCode::PleaTypeEmpty => "PLEA_TYPE_EMPTY",
            ProblemCode::WishToComeToCourtInvalid => "WISH_TO_COME_TO_COURT_INVALID",
            ProblemCode::WishToSpeakWelshInvalid => "WISH_TO_SPEAK_WELSH_INVALID",
            ProblemCode::OffenceHasFinalDecision => "OFFENCE_HAS_FINAL_DECISION",
            ProblemCode::SameOffenceTitle => "SAME_OFFENCE_TITLE",
        }
    }
}

/// Locates the offending data: a field key, the value found, and the subject it
/// belongs to (the scanned document).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemValue {
    pub key: String,
    pub value: String,
    pub id: String,
}

/// Immutable validation finding. Always computed fresh, never stored as state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Problem {
    pub code: ProblemCode,
    pub values: Vec<ProblemValue>,
}

impl Problem {
    pub fn single(
        code: ProblemCode,
        key: &str,
        value: impl Into<String>,
        subject_id: &str,
    ) -> Self {
        Self {
            code,
            values: vec![ProblemValue {
                key: key.to_string(),
                value: value.into(),
                id: subject_id.to_string(),
            }],
        }
    }

    pub fn summary(&self) -> String {
        let details: Vec<String> = self
            .values
            .iter()
            .map(|value| format!("{}={}", value.key, value.value))
            .collect();
        format!("{} ({})", self.code.label(), details.join(", "))
    }
}
