use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::workflows::defendant::{DefendantDetails, DefendantDetailsReconciliation};
use crate::workflows::plea::Plea;

/// Identifier of a delivered envelope.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EnvelopeId(pub String);

/// Identifier of a document, unique only within its envelope.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DocumentId(pub String);

impl fmt::Display for EnvelopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Composite identity of a scanned document.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DocumentKey {
    pub envelope_id: EnvelopeId,
    pub document_id: DocumentId,
}

impl DocumentKey {
    pub fn new(envelope_id: EnvelopeId, document_id: DocumentId) -> Self {
        Self {
            envelope_id,
            document_id,
        }
    }
}

impl fmt::Display for DocumentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.envelope_id, self.document_id)
    }
}

/// Triage state of a scanned document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentStatus {
    FollowUp,
    ManuallyActioned,
    AutoActioned,
    Rejected,
    Expired,
}

impl DocumentStatus {
    pub const fn label(self) -> &'static str {
        match self {
            DocumentStatus::FollowUp => "FOLLOW_UP",
            DocumentStatus::ManuallyActioned => "MANUALLY_ACTIONED",
            DocumentStatus::AutoActioned => "AUTO_ACTIONED",
            DocumentStatus::Rejected => "REJECTED",
            DocumentStatus::Expired => "EXPIRED",
        }
    }

    /// Actioned documents are the only ones that may be physically deleted.
    pub const fn is_actioned(self) -> bool {
        matches!(
            self,
            DocumentStatus::ManuallyActioned | DocumentStatus::AutoActioned
        )
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A delivered batch of scanned documents. Documents are stored separately and
/// carry the envelope id as their parent reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanEnvelope {
    pub envelope_id: EnvelopeId,
    pub archive_file_name: String,
    pub extracted_at: DateTime<Utc>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Classification recorded when a clerk decides how a document proceeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NextStepDecision {
    pub is_sjp: bool,
    pub decided_at: DateTime<Utc>,
}

/// Flags from the most recent defendant-details reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReconciliationFlags {
    pub details_updated: bool,
    pub licence_valid: bool,
    pub licence_mismatch: bool,
}

impl From<&DefendantDetailsReconciliation> for ReconciliationFlags {
    fn from(value: &DefendantDetailsReconciliation) -> Self {
        Self {
            details_updated: value.details_updated,
            licence_valid: value.licence_valid,
            licence_mismatch: value.licence_mismatch,
        }
    }
}

/// Attributes captured when a document is registered against its envelope.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RegisterDocument {
    pub file_name: String,
    #[serde(default)]
    pub case_urn: Option<String>,
    #[serde(default)]
    pub pti_urn: Option<String>,
    #[serde(default)]
    pub prosecuting_authority: Option<String>,
    #[serde(default)]
    pub document_name: Option<String>,
    #[serde(default)]
    pub status_code: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// One scanned document and everything decided about it so far.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanDocument {
    pub envelope_id: EnvelopeId,
    pub document_id: DocumentId,
    pub file_name: String,
    pub received_at: DateTime<Utc>,
    pub case_urn: Option<String>,
    pub pti_urn: Option<String>,
    pub prosecuting_authority: Option<String>,
    pub document_name: Option<String>,
    pub notes: Option<String>,
    pub status: DocumentStatus,
    /// Secondary classification, independent of `status`.
    pub status_code: Option<String>,
    pub status_updated_at: DateTime<Utc>,
    pub actioned_by: Option<String>,
    pub next_step: Option<NextStepDecision>,
    pub errors: Vec<String>,
    pub expired_on: Option<DateTime<Utc>>,
    pub defendant: DefendantDetails,
    pub reconciliation: Option<ReconciliationFlags>,
    pub plea: Option<Plea>,
    pub deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl ScanDocument {
    pub(crate) fn registered(
        envelope_id: EnvelopeId,
        document_id: DocumentId,
        registration: &RegisterDocument,
        received_at: DateTime<Utc>,
    ) -> Self {
        Self {
            envelope_id,
            document_id,
            file_name: registration.file_name.clone(),
            received_at,
            case_urn: registration.case_urn.clone(),
            pti_urn: registration.pti_urn.clone(),
            prosecuting_authority: registration.prosecuting_authority.clone(),
            document_name: registration.document_name.clone(),
            notes: registration.notes.clone(),
            status: DocumentStatus::FollowUp,
            status_code: registration.status_code.clone(),
            status_updated_at: received_at,
            actioned_by: None,
            next_step: None,
            errors: Vec::new(),
            expired_on: None,
            defendant: DefendantDetails::default(),
            reconciliation: None,
            plea: None,
            deleted: false,
            deleted_at: None,
        }
    }

    pub fn key(&self) -> DocumentKey {
        DocumentKey::new(self.envelope_id.clone(), self.document_id.clone())
    }

    pub fn has_case_reference(&self) -> bool {
        [&self.case_urn, &self.pti_urn]
            .iter()
            .any(|reference| reference.as_deref().is_some_and(|value| !value.trim().is_empty()))
    }

    pub(crate) fn set_status(&mut self, status: DocumentStatus, at: DateTime<Utc>) {
        self.status = status;
        self.status_updated_at = at;
    }

    pub fn status_view(&self) -> DocumentStatusView {
        DocumentStatusView {
            envelope_id: self.envelope_id.clone(),
            document_id: self.document_id.clone(),
            case_urn: self.case_urn.clone(),
            pti_urn: self.pti_urn.clone(),
            status: self.status,
            status_label: self.status.label(),
            status_code: self.status_code.clone(),
            status_updated_at: self.status_updated_at,
            actioned_by: self.actioned_by.clone(),
            is_sjp: self.next_step.map(|decision| decision.is_sjp),
            deleted: self.deleted,
        }
    }
}

/// Read model returned by status queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentStatusView {
    pub envelope_id: EnvelopeId,
    pub document_id: DocumentId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub case_urn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pti_urn: Option<String>,
    pub status: DocumentStatus,
    pub status_label: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<String>,
    pub status_updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actioned_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_sjp: Option<bool>,
    pub deleted: bool,
}

/// An envelope together with its documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvelopeView {
    pub envelope: ScanEnvelope,
    pub documents: Vec<ScanDocument>,
}
