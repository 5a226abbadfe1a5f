use super::common::*;
use crate::workflows::defendant::{EmploymentStatus, FinancialMeans, IncomeFrequency};
use crate::workflows::plea::{Offence, Plea, PleaValue, ProblemCode};
use crate::workflows::scanning::{
    transition, AdditionalDetailsUpdate, CommandErrorKind, ContactDetailsProposal,
    DetailsSource, DocumentCommand, DocumentCommandError, DocumentEvent, DocumentId, DocumentKey,
    DocumentStatus, EnvelopeId, FinancialMeansUpdate, ScanDocument,
};

fn apply(document: &ScanDocument, command: DocumentCommand, days: i64) -> ScanDocument {
    transition(&key(), Some(document), command, later(days))
        .expect("command accepted")
        .document
}

fn auto_actioned() -> ScanDocument {
    apply(
        &registered_document(),
        DocumentCommand::MarkAutoActioned {
            actioned_by: "system".to_string(),
        },
        1,
    )
}

#[test]
fn registration_starts_in_follow_up() {
    let document = registered_document();

    assert_eq!(document.status, DocumentStatus::FollowUp);
    assert_eq!(document.received_at, received_at());
    assert_eq!(document.status_updated_at, received_at());
    assert_eq!(document.status_code.as_deref(), Some("SJPN"));
    assert!(!document.deleted);
}

#[test]
fn registering_twice_is_refused() {
    let document = registered_document();

    match transition(
        &key(),
        Some(&document),
        DocumentCommand::Register(registration()),
        later(1),
    ) {
        Err(err @ DocumentCommandError::AlreadyRegistered { .. }) => {
            assert_eq!(err.kind(), CommandErrorKind::Precondition)
        }
        other => panic!("expected already registered, got {other:?}"),
    }
}

#[test]
fn commands_against_missing_document_are_not_found() {
    match transition(&key(), None, DocumentCommand::Expire, later(1)) {
        Err(err @ DocumentCommandError::NotFound { .. }) => {
            assert_eq!(err.kind(), CommandErrorKind::NotFound)
        }
        other => panic!("expected not found, got {other:?}"),
    }
}

#[test]
fn blank_identifiers_and_payloads_are_malformed() {
    let blank_key = DocumentKey::new(EnvelopeId(" ".to_string()), DocumentId("doc".to_string()));
    match transition(&blank_key, None, DocumentCommand::Register(registration()), later(0)) {
        Err(DocumentCommandError::Malformed(_)) => {}
        other => panic!("expected malformed, got {other:?}"),
    }

    let document = registered_document();
    match transition(
        &key(),
        Some(&document),
        DocumentCommand::MarkManuallyActioned {
            actioned_by: String::new(),
        },
        later(1),
    ) {
        Err(err @ DocumentCommandError::Malformed(_)) => {
            assert_eq!(err.kind(), CommandErrorKind::Malformed)
        }
        other => panic!("expected malformed, got {other:?}"),
    }
}

#[test]
fn manual_action_records_user_and_timestamp_together() {
    let document = apply(
        &registered_document(),
        DocumentCommand::MarkManuallyActioned {
            actioned_by: "clerk-42".to_string(),
        },
        2,
    );

    assert_eq!(document.status, DocumentStatus::ManuallyActioned);
    assert_eq!(document.actioned_by.as_deref(), Some("clerk-42"));
    assert_eq!(document.status_updated_at, later(2));
}

#[test]
fn reject_attaches_errors() {
    let document = apply(
        &registered_document(),
        DocumentCommand::Reject {
            errors: vec!["Unreadable page 2".to_string()],
        },
        1,
    );

    assert_eq!(document.status, DocumentStatus::Rejected);
    assert_eq!(document.errors, vec!["Unreadable page 2".to_string()]);
}

#[test]
fn follow_up_clears_prior_decision_state() {
    let expired = apply(&registered_document(), DocumentCommand::Expire, 3);
    assert_eq!(expired.expired_on, Some(later(3)));
    let decided = apply(&expired, DocumentCommand::DecideNextStep { is_sjp: true }, 4);

    let document = apply(&decided, DocumentCommand::RaiseFollowUp, 5);

    assert_eq!(document.status, DocumentStatus::FollowUp);
    assert_eq!(document.status_updated_at, later(5));
    assert_eq!(document.expired_on, None);
    assert_eq!(document.next_step, None);
    assert!(document.errors.is_empty());
    assert_eq!(document.actioned_by, None);
}

#[test]
fn next_step_is_metadata_and_leaves_status_alone() {
    let before = registered_document();
    let result = transition(
        &key(),
        Some(&before),
        DocumentCommand::DecideNextStep { is_sjp: false },
        later(1),
    )
    .expect("decided");

    assert_eq!(result.document.status, before.status);
    assert_eq!(result.document.status_updated_at, before.status_updated_at);
    assert_eq!(
        result.document.next_step.map(|decision| decision.is_sjp),
        Some(false)
    );
}

#[test]
fn deleting_follow_up_document_is_a_precondition_failure() {
    match transition(
        &key(),
        Some(&registered_document()),
        DocumentCommand::DeleteActioned,
        later(1),
    ) {
        Err(DocumentCommandError::Precondition { status, .. }) => {
            assert_eq!(status, DocumentStatus::FollowUp)
        }
        other => panic!("expected precondition failure, got {other:?}"),
    }
}

#[test]
fn deleting_auto_actioned_document_marks_it_deleted() {
    let document = apply(&auto_actioned(), DocumentCommand::DeleteActioned, 40);

    assert!(document.deleted);
    assert_eq!(document.deleted_at, Some(later(40)));
    assert_eq!(document.status, DocumentStatus::AutoActioned);
}

#[test]
fn deleted_document_refuses_every_command() {
    let deleted = apply(&auto_actioned(), DocumentCommand::DeleteActioned, 40);

    let commands = vec![
        DocumentCommand::MarkManuallyActioned {
            actioned_by: "clerk".to_string(),
        },
        DocumentCommand::MarkAutoActioned {
            actioned_by: "system".to_string(),
        },
        DocumentCommand::Reject { errors: Vec::new() },
        DocumentCommand::Expire,
        DocumentCommand::RaiseFollowUp,
        DocumentCommand::DecideNextStep { is_sjp: true },
        DocumentCommand::UpdateAdditionalDetails(AdditionalDetailsUpdate::default()),
        DocumentCommand::DeleteActioned,
    ];

    for command in commands {
        let label = command.label();
        match transition(&key(), Some(&deleted), command, later(41)) {
            Err(DocumentCommandError::Deleted(_)) => {}
            other => panic!("{label}: expected deleted refusal, got {other:?}"),
        }
    }
}

#[test]
fn financial_means_reconciles_contact_details() {
    let mut document = registered_document();
    document.defendant.driving_licence_number = Some("ABC123".to_string());
    document.defendant.email = Some("old@example.com".to_string());

    let result = transition(
        &key(),
        Some(&document),
        DocumentCommand::UpdateFinancialMeans(FinancialMeansUpdate {
            means: FinancialMeans {
                employment_status: EmploymentStatus::Employed,
                income_amount: Some(180_000),
                income_frequency: Some(IncomeFrequency::Monthly),
                benefits_claimed: false,
            },
            contact: ContactDetailsProposal {
                email: Some("new@example.com".to_string()),
                phone: None,
                driving_licence_number: Some("XYZ999".to_string()),
            },
        }),
        later(1),
    )
    .expect("update accepted");

    let defendant = &result.document.defendant;
    assert_eq!(defendant.email.as_deref(), Some("new@example.com"));
    assert_eq!(defendant.driving_licence_number.as_deref(), Some("ABC123"));
    assert!(defendant.financial_means.is_some());
    let flags = result.document.reconciliation.expect("flags recorded");
    assert!(flags.details_updated);
    assert!(flags.licence_mismatch);
    assert!(matches!(
        result.events.as_slice(),
        [DocumentEvent::DefendantDetailsUpdated {
            source: DetailsSource::FinancialMeans,
            ..
        }]
    ));
    assert_eq!(result.document.status, DocumentStatus::FollowUp);
}

#[test]
fn additional_details_fix_postcode_and_normalise_ni_number() {
    let result = transition(
        &key(),
        Some(&registered_document()),
        DocumentCommand::UpdateAdditionalDetails(AdditionalDetailsUpdate {
            contact: ContactDetailsProposal {
                email: None,
                phone: Some("07904 103 122".to_string()),
                driving_licence_number: Some("MORGA657054SM9BF".to_string()),
            },
            ni_number: Some("ab 12 34 56 c".to_string()),
            postcode: Some("EC1A1BB".to_string()),
        }),
        later(1),
    )
    .expect("update accepted");

    let defendant = &result.document.defendant;
    assert_eq!(defendant.phone.as_deref(), Some("07904 103 122"));
    assert_eq!(
        defendant.driving_licence_number.as_deref(),
        Some("MORGA657054SM9BF")
    );
    assert_eq!(defendant.ni_number.as_deref(), Some("AB123456C"));
    assert_eq!(defendant.postcode.as_deref(), Some("EC1A 1BB"));
    let flags = result.document.reconciliation.expect("flags recorded");
    assert!(flags.details_updated && flags.licence_valid && !flags.licence_mismatch);
}

#[test]
fn plea_with_problems_is_not_recorded() {
    let submitted = Plea {
        offences: vec![Offence::new("Fare evasion", Some(PleaValue::Both))],
        wish_to_come_to_court: Some(true),
        wish_to_speak_welsh: None,
    };

    let result = transition(
        &key(),
        Some(&registered_document()),
        DocumentCommand::RecordPlea {
            submitted,
            authoritative: Plea::default(),
        },
        later(1),
    )
    .expect("validation is not an error");

    assert_eq!(result.problems.len(), 1);
    assert_eq!(result.problems[0].code, ProblemCode::PleaTypeInvalid);
    assert_eq!(result.problems[0].values[0].id, "doc-0001");
    assert_eq!(result.document.plea, None);
    assert!(matches!(
        result.events.as_slice(),
        [DocumentEvent::PleaProblemsFound { .. }]
    ));
}

#[test]
fn clean_plea_is_recorded() {
    let submitted = Plea {
        offences: vec![Offence::new("Fare evasion", Some(PleaValue::Guilty))],
        wish_to_come_to_court: Some(false),
        wish_to_speak_welsh: Some(false),
    };

    let result = transition(
        &key(),
        Some(&registered_document()),
        DocumentCommand::RecordPlea {
            submitted: submitted.clone(),
            authoritative: Plea::default(),
        },
        later(1),
    )
    .expect("plea accepted");

    assert!(result.problems.is_empty());
    assert_eq!(result.document.plea, Some(submitted));
}

#[test]
fn replaying_events_rebuilds_live_state() {
    let mut history = Vec::new();
    let mut current: Option<ScanDocument> = None;
    let commands = vec![
        DocumentCommand::Register(registration()),
        DocumentCommand::Reject {
            errors: vec!["Missing signature".to_string()],
        },
        DocumentCommand::RaiseFollowUp,
        DocumentCommand::DecideNextStep { is_sjp: true },
        DocumentCommand::MarkManuallyActioned {
            actioned_by: "clerk-7".to_string(),
        },
        DocumentCommand::DeleteActioned,
    ];

    for (day, command) in commands.into_iter().enumerate() {
        let result =
            transition(&key(), current.as_ref(), command, later(day as i64)).expect("accepted");
        history.extend(result.events);
        current = Some(result.document);
    }

    assert_eq!(ScanDocument::replay(&history), current);
}

#[test]
fn commands_round_trip_through_json() {
    let json = r#"{"command":"mark_manually_actioned","actioned_by":"clerk-1"}"#;
    let command: DocumentCommand = serde_json::from_str(json).expect("parses");
    assert_eq!(
        command,
        DocumentCommand::MarkManuallyActioned {
            actioned_by: "clerk-1".to_string()
        }
    );

    let expire: DocumentCommand =
        serde_json::from_str(r#"{"command":"expire"}"#).expect("parses unit variant");
    assert_eq!(expire, DocumentCommand::Expire);
}
