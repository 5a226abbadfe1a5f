//! Lifecycle of scanned documents: registration, triage decisions, expiry,
//! defendant-detail updates, plea checks, and retention-driven deletion.
//!
//! [`transition`] is the pure decision function; [`ScanDocumentService`] wraps it
//! with a repository, an event recorder, and a clock supplied by the caller.

mod command;
mod domain;
mod event;
mod machine;
mod memory;
mod repository;
mod retention;
mod service;

#[cfg(test)]
mod tests;

pub use command::{
    AdditionalDetailsUpdate, CommandErrorKind, ContactDetailsProposal, DocumentCommand,
    DocumentCommandError, FinancialMeansUpdate,
};
pub use domain::{
    DocumentId, DocumentKey, DocumentStatus, DocumentStatusView, EnvelopeId, EnvelopeView,
    NextStepDecision, ReconciliationFlags, RegisterDocument, ScanDocument, ScanEnvelope,
};
pub use event::{DetailsSource, DocumentEvent};
pub use machine::{transition, Transition};
pub use memory::{InMemoryEventLog, InMemoryScanStore};
pub use repository::{
    Clock, EnvelopeRepository, EventRecordError, EventRecorder, FixedClock, RecordedEvent,
    RepositoryError, SystemClock, VersionedDocument,
};
pub use retention::{is_eligible_for_deletion, RetentionPolicy};
pub use service::{
    CommandOutcome, DocumentRegistration, RegisterEnvelope, ScanDocumentService, ScanServiceError,
};
