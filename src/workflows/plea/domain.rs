use serde::{Deserialize, Serialize};

/// Plea entered against a single offence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PleaValue {
    Guilty,
    NotGuilty,
    Both,
}

impl PleaValue {
    pub const fn label(self) -> &'static str {
        match self {
            PleaValue::Guilty => "GUILTY",
            PleaValue::NotGuilty => "NOT_GUILTY",
            PleaValue::Both => "BOTH",
        }
    }
}

/// One offence as read off the scanned plea form, or as held by the SJP record.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Offence {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub plea: Option<PleaValue>,
    /// Only ever set on the authoritative record.
    #[serde(default)]
    pub has_final_decision: bool,
}

impl Offence {
    pub fn new(title: impl Into<String>, plea: Option<PleaValue>) -> Self {
        Self {
            title: Some(title.into()),
            plea,
            has_final_decision: false,
        }
    }

    pub fn with_final_decision(mut self) -> Self {
        self.has_final_decision = true;
        self
    }
}

/// A defendant's plea across every offence in the envelope.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Plea {
    #[serde(default)]
    pub offences: Vec<Offence>,
    #[serde(default)]
    pub wish_to_come_to_court: Option<bool>,
    #[serde(default)]
    pub wish_to_speak_welsh: Option<bool>,
}
