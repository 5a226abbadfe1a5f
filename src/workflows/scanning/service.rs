use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::command::{DocumentCommand, DocumentCommandError};
use super::domain::{
    DocumentId, DocumentKey, DocumentStatus, DocumentStatusView, EnvelopeId, EnvelopeView,
    RegisterDocument, ScanDocument, ScanEnvelope,
};
use super::event::DocumentEvent;
use super::machine::transition;
use super::repository::{
    Clock, EnvelopeRepository, EventRecordError, EventRecorder, RecordedEvent, RepositoryError,
};
use super::retention::RetentionPolicy;
use crate::workflows::plea::Problem;

/// Inbound request creating an envelope and its initial documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterEnvelope {
    pub envelope_id: EnvelopeId,
    pub archive_file_name: String,
    pub extracted_at: DateTime<Utc>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub documents: Vec<DocumentRegistration>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRegistration {
    pub document_id: DocumentId,
    #[serde(flatten)]
    pub document: RegisterDocument,
}

/// What a caller gets back from an accepted command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandOutcome {
    pub document: ScanDocument,
    pub version: u64,
    pub events: Vec<DocumentEvent>,
    pub problems: Vec<Problem>,
}

impl CommandOutcome {
    pub fn status(&self) -> DocumentStatus {
        self.document.status
    }
}

/// Service composing the lifecycle transitions with storage, event recording,
/// and the clock.
pub struct ScanDocumentService<R, E, C> {
    repository: Arc<R>,
    events: Arc<E>,
    clock: Arc<C>,
    retention: RetentionPolicy,
}

impl<R, E, C> ScanDocumentService<R, E, C>
where
    R: EnvelopeRepository + 'static,
    E: EventRecorder + 'static,
    C: Clock + 'static,
{
    pub fn new(
        repository: Arc<R>,
        events: Arc<E>,
        clock: Arc<C>,
        retention: RetentionPolicy,
    ) -> Self {
        Self {
            repository,
            events,
            clock,
            retention,
        }
    }

    pub fn retention(&self) -> RetentionPolicy {
        self.retention
    }

    /// Create an envelope and register each of its documents in `FOLLOW_UP`.
    ///
    /// Every document is checked before anything is stored, and a storage failure
    /// part-way through leaves nothing behind.
    pub fn register_envelope(
        &self,
        registration: RegisterEnvelope,
    ) -> Result<EnvelopeView, ScanServiceError> {
        let RegisterEnvelope {
            envelope_id,
            archive_file_name,
            extracted_at,
            notes,
            documents,
        } = registration;

        if envelope_id.0.trim().is_empty() {
            return Err(
                DocumentCommandError::Malformed("envelope id is required".to_string()).into(),
            );
        }

        let mut seen = BTreeSet::new();
        if let Some(duplicate) = documents
            .iter()
            .find(|entry| !seen.insert(entry.document_id.clone()))
        {
            return Err(DocumentCommandError::Malformed(format!(
                "document {} appears more than once in envelope {}",
                duplicate.document_id, envelope_id
            ))
            .into());
        }

        let now = self.clock.now();
        let mut accepted = Vec::with_capacity(documents.len());
        for entry in documents {
            let key = DocumentKey::new(envelope_id.clone(), entry.document_id);
            let result = transition(&key, None, DocumentCommand::Register(entry.document), now)?;
            accepted.push((key, result));
        }

        self.repository.insert_envelope(ScanEnvelope {
            envelope_id: envelope_id.clone(),
            archive_file_name,
            extracted_at,
            notes,
        })?;

        let mut saved: Vec<(DocumentKey, u64)> = Vec::with_capacity(accepted.len());
        let mut batch = Vec::new();
        for (key, result) in &accepted {
            match self.repository.save_document(result.document.clone(), None) {
                Ok(version) => {
                    batch.extend(RecordedEvent::batch(key, version, &result.events));
                    saved.push((key.clone(), version));
                }
                Err(err) => {
                    self.abandon_registration(&envelope_id, &saved);
                    return Err(err.into());
                }
            }
        }

        if let Err(err) = self.events.append(&batch) {
            self.abandon_registration(&envelope_id, &saved);
            return Err(err.into());
        }

        for (key, version) in &saved {
            info!(document = %key, version, "document registered");
        }
        info!(%envelope_id, documents = saved.len(), "envelope registered");

        self.envelope(&envelope_id)
    }

    /// Undo a partially stored registration so the envelope can be submitted again.
    fn abandon_registration(&self, envelope_id: &EnvelopeId, saved: &[(DocumentKey, u64)]) {
        for (key, version) in saved.iter().rev() {
            if let Err(err) = self.repository.revert_document(key, *version, None) {
                warn!(document = %key, error = %err, "could not roll back registered document");
            }
        }
        if let Err(err) = self.repository.remove_envelope(envelope_id) {
            warn!(%envelope_id, error = %err, "could not roll back envelope");
        }
    }

    /// Apply one command to one document, persisting the result atomically.
    pub fn handle(
        &self,
        envelope_id: &EnvelopeId,
        document_id: &DocumentId,
        command: DocumentCommand,
    ) -> Result<CommandOutcome, ScanServiceError> {
        let label = command.label();
        let result = self.try_handle(envelope_id, document_id, command);

        match &result {
            Ok(outcome) => {
                info!(
                    %envelope_id,
                    %document_id,
                    command = label,
                    status = %outcome.status(),
                    version = outcome.version,
                    "document command applied"
                );
                if !outcome.problems.is_empty() {
                    let problems: Vec<String> =
                        outcome.problems.iter().map(Problem::summary).collect();
                    debug!(%document_id, ?problems, "plea validation raised problems");
                }
            }
            Err(err) => {
                warn!(
                    %envelope_id,
                    %document_id,
                    command = label,
                    error = %err,
                    "document command refused"
                );
            }
        }

        result
    }

    fn try_handle(
        &self,
        envelope_id: &EnvelopeId,
        document_id: &DocumentId,
        command: DocumentCommand,
    ) -> Result<CommandOutcome, ScanServiceError> {
        self.require_envelope(envelope_id)?;

        let key = DocumentKey::new(envelope_id.clone(), document_id.clone());
        let current = self.repository.fetch_document(&key)?;
        let (state, expected_version) = match &current {
            Some(stored) => (Some(&stored.document), Some(stored.version)),
            None => (None, None),
        };

        let result = transition(&key, state, command, self.clock.now())?;
        let version = self
            .repository
            .save_document(result.document.clone(), expected_version)?;

        // The stored state must stay the fold of recorded events.
        if let Err(err) = self
            .events
            .append(&RecordedEvent::batch(&key, version, &result.events))
        {
            if let Err(revert) = self.repository.revert_document(&key, version, current) {
                warn!(document = %key, version, error = %revert, "could not roll back document");
            }
            return Err(err.into());
        }

        Ok(CommandOutcome {
            document: result.document,
            version,
            events: result.events,
            problems: result.problems,
        })
    }

    pub fn update_envelope_notes(
        &self,
        envelope_id: &EnvelopeId,
        notes: Option<String>,
    ) -> Result<ScanEnvelope, ScanServiceError> {
        let mut envelope = self.require_envelope(envelope_id)?;
        envelope.notes = notes;
        self.repository.update_envelope(envelope.clone())?;
        info!(%envelope_id, "envelope notes updated");
        Ok(envelope)
    }

    pub fn envelope(&self, envelope_id: &EnvelopeId) -> Result<EnvelopeView, ScanServiceError> {
        let envelope = self.require_envelope(envelope_id)?;
        let documents = self.repository.documents(envelope_id)?;
        Ok(EnvelopeView {
            envelope,
            documents,
        })
    }

    /// Current status of a document. Status is only reported against a case, so a
    /// document with neither a case URN nor a PTI URN is refused.
    pub fn status(
        &self,
        envelope_id: &EnvelopeId,
        document_id: &DocumentId,
    ) -> Result<DocumentStatusView, ScanServiceError> {
        self.require_envelope(envelope_id)?;
        let key = DocumentKey::new(envelope_id.clone(), document_id.clone());
        let stored = self
            .repository
            .fetch_document(&key)?
            .ok_or_else(|| DocumentCommandError::NotFound {
                envelope_id: envelope_id.clone(),
                document_id: document_id.clone(),
            })?;

        if !stored.document.has_case_reference() {
            return Err(DocumentCommandError::Malformed(format!(
                "document {key} has no case URN or PTI URN"
            ))
            .into());
        }

        Ok(stored.document.status_view())
    }

    /// Documents in the envelope whose retention window has elapsed.
    pub fn deletion_candidates(
        &self,
        envelope_id: &EnvelopeId,
    ) -> Result<Vec<DocumentId>, ScanServiceError> {
        self.require_envelope(envelope_id)?;
        let now = self.clock.now();
        Ok(self
            .repository
            .documents(envelope_id)?
            .into_iter()
            .filter(|document| self.retention.is_document_eligible(document, now))
            .map(|document| document.document_id)
            .collect())
    }

    fn require_envelope(
        &self,
        envelope_id: &EnvelopeId,
    ) -> Result<ScanEnvelope, ScanServiceError> {
        let envelope = self
            .repository
            .fetch_envelope(envelope_id)?
            .ok_or_else(|| DocumentCommandError::EnvelopeNotFound(envelope_id.clone()))?;
        Ok(envelope)
    }
}

/// Error raised by the scan document service.
#[derive(Debug, thiserror::Error)]
pub enum ScanServiceError {
    #[error(transparent)]
    Command(#[from] DocumentCommandError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Events(#[from] EventRecordError),
}
