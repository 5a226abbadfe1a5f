use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{
    DocumentId, DocumentStatus, EnvelopeId, NextStepDecision, ReconciliationFlags,
    RegisterDocument, ScanDocument,
};
use crate::workflows::defendant::DefendantDetails;
use crate::workflows::plea::{Plea, Problem};

/// Which inbound update produced a defendant-details change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetailsSource {
    FinancialMeans,
    AdditionalDetails,
}

/// Facts appended to a document's history. State is always the fold of these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DocumentEvent {
    DocumentRegistered {
        envelope_id: EnvelopeId,
        document_id: DocumentId,
        registration: RegisterDocument,
        received_at: DateTime<Utc>,
    },
    MarkedManuallyActioned {
        actioned_by: String,
        at: DateTime<Utc>,
    },
    MarkedAutoActioned {
        actioned_by: String,
        at: DateTime<Utc>,
    },
    DocumentRejected {
        errors: Vec<String>,
        at: DateTime<Utc>,
    },
    DocumentExpired {
        at: DateTime<Utc>,
    },
    FollowUpRaised {
        at: DateTime<Utc>,
    },
    NextStepDecided {
        is_sjp: bool,
        at: DateTime<Utc>,
    },
    DefendantDetailsUpdated {
        source: DetailsSource,
        details: DefendantDetails,
        flags: ReconciliationFlags,
        at: DateTime<Utc>,
    },
    PleaRecorded {
        plea: Plea,
        at: DateTime<Utc>,
    },
    PleaProblemsFound {
        problems: Vec<Problem>,
        at: DateTime<Utc>,
    },
    ActionedDocumentDeleted {
        at: DateTime<Utc>,
    },
}

impl DocumentEvent {
    pub const fn label(&self) -> &'static str {
        match self {
            DocumentEvent::DocumentRegistered { .. } => "document_registered",
            DocumentEvent::MarkedManuallyActioned { .. } => "marked_manually_actioned",
            DocumentEvent::MarkedAutoActioned { .. } => "marked_auto_actioned",
            DocumentEvent::DocumentRejected { .. } => "document_rejected",
            DocumentEvent::DocumentExpired { .. } => "document_expired",
            DocumentEvent::FollowUpRaised { .. } => "follow_up_raised",
            DocumentEvent::NextStepDecided { .. } => "next_step_decided",
            DocumentEvent::DefendantDetailsUpdated { .. } => "defendant_details_updated",
            DocumentEvent::PleaRecorded { .. } => "plea_recorded",
            DocumentEvent::PleaProblemsFound { .. } => "plea_problems_found",
            DocumentEvent::ActionedDocumentDeleted { .. } => "actioned_document_deleted",
        }
    }
}

impl ScanDocument {
    /// Advance the document by one event. Registration starts a fresh document.
    pub fn evolve(state: Option<ScanDocument>, event: &DocumentEvent) -> Option<ScanDocument> {
        if let DocumentEvent::DocumentRegistered {
            envelope_id,
            document_id,
            registration,
            received_at,
        } = event
        {
            return Some(ScanDocument::registered(
                envelope_id.clone(),
                document_id.clone(),
                registration,
                *received_at,
            ));
        }

        let mut document = state?;
        document.apply(event);
        Some(document)
    }

    /// Rebuild a document from its full history.
    pub fn replay<'a, I>(events: I) -> Option<ScanDocument>
    where
        I: IntoIterator<Item = &'a DocumentEvent>,
    {
        events.into_iter().fold(None, ScanDocument::evolve)
    }

    pub(crate) fn apply(&mut self, event: &DocumentEvent) {
        match event {
            DocumentEvent::DocumentRegistered { .. } => {}
            DocumentEvent::MarkedManuallyActioned { actioned_by, at } => {
                self.set_status(DocumentStatus::ManuallyActioned, *at);
                self.actioned_by = Some(actioned_by.clone());
            }
            DocumentEvent::MarkedAutoActioned { actioned_by, at } => {
                self.set_status(DocumentStatus::AutoActioned, *at);
                self.actioned_by = Some(actioned_by.clone());
            }
            DocumentEvent::DocumentRejected { errors, at } => {
                self.set_status(DocumentStatus::Rejected, *at);
                self.errors = errors.clone();
            }
            DocumentEvent::DocumentExpired { at } => {
                self.set_status(DocumentStatus::Expired, *at);
                self.expired_on = Some(*at);
            }
            DocumentEvent::FollowUpRaised { at } => {
                self.set_status(DocumentStatus::FollowUp, *at);
                self.actioned_by = None;
                self.next_step = None;
                self.errors.clear();
                self.expired_on = None;
            }
            DocumentEvent::NextStepDecided { is_sjp, at } => {
                self.next_step = Some(NextStepDecision {
                    is_sjp: *is_sjp,
                    decided_at: *at,
                });
            }
            DocumentEvent::DefendantDetailsUpdated { details, flags, .. } => {
                self.defendant = details.clone();
                self.reconciliation = Some(*flags);
            }
            DocumentEvent::PleaRecorded { plea, .. } => {
                self.plea = Some(plea.clone());
            }
            DocumentEvent::PleaProblemsFound { .. } => {}
            DocumentEvent::ActionedDocumentDeleted { at } => {
                self.deleted = true;
                self.deleted_at = Some(*at);
            }
        }
    }
}
