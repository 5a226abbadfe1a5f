use serde::{Deserialize, Serialize};

use super::domain::{DocumentId, DocumentStatus, EnvelopeId, RegisterDocument};
use crate::workflows::defendant::FinancialMeans;
use crate::workflows::plea::Plea;

/// Contact values read off a scanned form, proposed as replacements for the
/// values currently held.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ContactDetailsProposal {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub driving_licence_number: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinancialMeansUpdate {
    pub means: FinancialMeans,
    #[serde(default)]
    pub contact: ContactDetailsProposal,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AdditionalDetailsUpdate {
    #[serde(default)]
    pub contact: ContactDetailsProposal,
    #[serde(default)]
    pub ni_number: Option<String>,
    #[serde(default)]
    pub postcode: Option<String>,
}

/// Everything a clerk, the automation, or the expiry sweep can ask of a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum DocumentCommand {
    Register(RegisterDocument),
    MarkManuallyActioned { actioned_by: String },
    MarkAutoActioned { actioned_by: String },
    Reject { errors: Vec<String> },
    Expire,
    RaiseFollowUp,
    DecideNextStep { is_sjp: bool },
    UpdateFinancialMeans(FinancialMeansUpdate),
    UpdateAdditionalDetails(AdditionalDetailsUpdate),
    RecordPlea { submitted: Plea, authoritative: Plea },
    DeleteActioned,
}

impl DocumentCommand {
    pub const fn label(&self) -> &'static str {
        match self {
            DocumentCommand::Register(_) => "register",
            DocumentCommand::MarkManuallyActioned { .. } => "mark_manually_actioned",
            DocumentCommand::MarkAutoActioned { .. } => "mark_auto_actioned",
            DocumentCommand::Reject { .. } => "reject",
            DocumentCommand::Expire => "expire",
            DocumentCommand::RaiseFollowUp => "raise_follow_up",
            DocumentCommand::DecideNextStep { .. } => "decide_next_step",
            DocumentCommand::UpdateFinancialMeans(_) => "update_financial_means",
            DocumentCommand::UpdateAdditionalDetails(_) => "update_additional_details",
            DocumentCommand::RecordPlea { .. } => "record_plea",
            DocumentCommand::DeleteActioned => "delete_actioned",
        }
    }

    /// Reject payloads missing required fields before any state is read.
    pub(crate) fn check_payload(&self) -> Result<(), DocumentCommandError> {
        match self {
            DocumentCommand::Register(registration) if registration.file_name.trim().is_empty() => {
                Err(DocumentCommandError::Malformed(
                    "register requires a file name".to_string(),
                ))
            }
            DocumentCommand::MarkManuallyActioned { actioned_by }
            | DocumentCommand::MarkAutoActioned { actioned_by }
                if actioned_by.trim().is_empty() =>
            {
                Err(DocumentCommandError::Malformed(format!(
                    "{} requires an actioning user id",
                    self.label()
                )))
            }
            _ => Ok(()),
        }
    }
}

/// Broad class of a command failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandErrorKind {
    NotFound,
    Precondition,
    Malformed,
}

/// Why a command was refused. None of these are retried.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DocumentCommandError {
    #[error("envelope {0} not found")]
    EnvelopeNotFound(EnvelopeId),
    #[error("document {document_id} not found in envelope {envelope_id}")]
    NotFound {
        envelope_id: EnvelopeId,
        document_id: DocumentId,
    },
    #[error("document {document_id} is already registered in envelope {envelope_id}")]
    AlreadyRegistered {
        envelope_id: EnvelopeId,
        document_id: DocumentId,
    },
    #[error("document {0} has been deleted and can no longer change")]
    Deleted(DocumentId),
    #[error("cannot {command} a document in status {status}")]
    Precondition {
        command: &'static str,
        status: DocumentStatus,
    },
    #[error("malformed command: {0}")]
    Malformed(String),
}

impl DocumentCommandError {
    pub fn kind(&self) -> CommandErrorKind {
        match self {
            DocumentCommandError::EnvelopeNotFound(_) | DocumentCommandError::NotFound { .. } => {
                CommandErrorKind::NotFound
            }
            DocumentCommandError::AlreadyRegistered { .. }
            | DocumentCommandError::Deleted(_)
            | DocumentCommandError::Precondition { .. } => CommandErrorKind::Precondition,
            DocumentCommandError::Malformed(_) => CommandErrorKind::Malformed,
        }
    }
}
