use chrono::{DateTime, Utc};

use super::command::{
    AdditionalDetailsUpdate, ContactDetailsProposal, DocumentCommand, DocumentCommandError,
    FinancialMeansUpdate,
};
use super::domain::{DocumentKey, ReconciliationFlags, RegisterDocument, ScanDocument};
use super::event::{DetailsSource, DocumentEvent};
use crate::workflows::defendant::{
    normalise_ni_number, normalise_postcode, reconcile_defendant_details, DefendantDetails,
    DefendantDetailsReconciliation, ReconciliationInput,
};
use crate::workflows::plea::{validate_plea, Problem};

/// Result of an accepted command: the new state, the events that produced it,
/// and any validation findings raised along the way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub document: ScanDocument,
    pub events: Vec<DocumentEvent>,
    pub problems: Vec<Problem>,
}

/// Decide a command against the current state of one document.
///
/// `current` is `None` when no document with this key exists yet. The function
/// is pure: it neither reads the clock nor touches storage.
pub fn transition(
    key: &DocumentKey,
    current: Option<&ScanDocument>,
    command: DocumentCommand,
    now: DateTime<Utc>,
) -> Result<Transition, DocumentCommandError> {
    if key.envelope_id.0.trim().is_empty() || key.document_id.0.trim().is_empty() {
        return Err(DocumentCommandError::Malformed(
            "envelope id and document id are required".to_string(),
        ));
    }
    command.check_payload()?;

    match (current, command) {
        (None, DocumentCommand::Register(registration)) => Ok(register(key, registration, now)),
        (None, _) => Err(DocumentCommandError::NotFound {
            envelope_id: key.envelope_id.clone(),
            document_id: key.document_id.clone(),
        }),
        (Some(document), _) if document.deleted => {
            Err(DocumentCommandError::Deleted(document.document_id.clone()))
        }
        (Some(document), command) => {
            let (events, problems) = decide(document, command, now)?;
            let mut next = document.clone();
            for event in &events {
                next.apply(event);
            }
            Ok(Transition {
                document: next,
                events,
                problems,
            })
        }
    }
}

fn register(key: &DocumentKey, registration: RegisterDocument, now: DateTime<Utc>) -> Transition {
    let document = ScanDocument::registered(
        key.envelope_id.clone(),
        key.document_id.clone(),
        &registration,
        now,
    );
    let event = DocumentEvent::DocumentRegistered {
        envelope_id: key.envelope_id.clone(),
        document_id: key.document_id.clone(),
        registration,
        received_at: now,
    };

    Transition {
        document,
        events: vec![event],
        problems: Vec::new(),
    }
}

fn decide(
    document: &ScanDocument,
    command: DocumentCommand,
    now: DateTime<Utc>,
) -> Result<(Vec<DocumentEvent>, Vec<Problem>), DocumentCommandError> {
    let mut problems = Vec::new();
    let events = match command {
        DocumentCommand::Register(_) => {
            return Err(DocumentCommandError::AlreadyRegistered {
                envelope_id: document.envelope_id.clone(),
                document_id: document.document_id.clone(),
            })
        }
        DocumentCommand::MarkManuallyActioned { actioned_by } => {
            vec![DocumentEvent::MarkedManuallyActioned {
                actioned_by,
                at: now,
            }]
        }
        DocumentCommand::MarkAutoActioned { actioned_by } => {
            vec![DocumentEvent::MarkedAutoActioned {
                actioned_by,
                at: now,
            }]
        }
        DocumentCommand::Reject { errors } => {
            vec![DocumentEvent::DocumentRejected { errors, at: now }]
        }
        DocumentCommand::Expire => vec![DocumentEvent::DocumentExpired { at: now }],
        DocumentCommand::RaiseFollowUp => vec![DocumentEvent::FollowUpRaised { at: now }],
        DocumentCommand::DecideNextStep { is_sjp } => {
            vec![DocumentEvent::NextStepDecided { is_sjp, at: now }]
        }
        DocumentCommand::UpdateFinancialMeans(update) => {
            vec![financial_means_event(&document.defendant, update, now)]
        }
        DocumentCommand::UpdateAdditionalDetails(update) => {
            vec![additional_details_event(&document.defendant, update, now)]
        }
        DocumentCommand::RecordPlea {
            submitted,
            authoritative,
        } => {
            problems = validate_plea(&submitted, &authoritative, &document.document_id.0);
            if problems.is_empty() {
                vec![DocumentEvent::PleaRecorded {
                    plea: submitted,
                    at: now,
                }]
            } else {
                vec![DocumentEvent::PleaProblemsFound {
                    problems: problems.clone(),
                    at: now,
                }]
            }
        }
        DocumentCommand::DeleteActioned => {
            if !document.status.is_actioned() {
                return Err(DocumentCommandError::Precondition {
                    command: "delete_actioned",
                    status: document.status,
                });
            }
            vec![DocumentEvent::ActionedDocumentDeleted { at: now }]
        }
    };

    Ok((events, problems))
}

fn reconcile_contact(
    existing: &DefendantDetails,
    proposal: &ContactDetailsProposal,
) -> DefendantDetailsReconciliation {
    reconcile_defendant_details(ReconciliationInput {
        existing_email: existing.email.as_deref(),
        new_email: proposal.email.as_deref(),
        existing_phone: existing.phone.as_deref(),
        new_phone: proposal.phone.as_deref(),
        existing_licence: existing.driving_licence_number.as_deref(),
        new_licence: proposal.driving_licence_number.as_deref(),
    })
}

fn with_reconciled_contact(
    existing: &DefendantDetails,
    reconciled: DefendantDetailsReconciliation,
) -> DefendantDetails {
    DefendantDetails {
        email: reconciled.email,
        phone: reconciled.phone,
        driving_licence_number: reconciled.driving_licence_number,
        ..existing.clone()
    }
}

fn financial_means_event(
    existing: &DefendantDetails,
    update: FinancialMeansUpdate,
    now: DateTime<Utc>,
) -> DocumentEvent {
    let reconciled = reconcile_contact(existing, &update.contact);
    let flags = ReconciliationFlags::from(&reconciled);
    let mut details = with_reconciled_contact(existing, reconciled);
    details.financial_means = Some(update.means);

    DocumentEvent::DefendantDetailsUpdated {
        source: DetailsSource::FinancialMeans,
        details,
        flags,
        at: now,
    }
}

fn additional_details_event(
    existing: &DefendantDetails,
    update: AdditionalDetailsUpdate,
    now: DateTime<Utc>,
) -> DocumentEvent {
    let reconciled = reconcile_contact(existing, &update.contact);
    let flags = ReconciliationFlags::from(&reconciled);
    let mut details = with_reconciled_contact(existing, reconciled);
    details.ni_number =
        normalise_ni_number(existing.ni_number.as_deref(), update.ni_number.as_deref());
    details.postcode =
        normalise_postcode(existing.postcode.as_deref(), update.postcode.as_deref());

    DocumentEvent::DefendantDetailsUpdated {
        source: DetailsSource::AdditionalDetails,
        details,
        flags,
        at: now,
    }
}
