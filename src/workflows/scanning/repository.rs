use chrono::{DateTime, Utc};

use super::domain::{DocumentKey, EnvelopeId, ScanDocument, ScanEnvelope};
use super::event::DocumentEvent;

/// A document as last stored, with the version used for compare-and-swap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionedDocument {
    pub document: ScanDocument,
    pub version: u64,
}

/// Storage abstraction for envelopes and their documents.
///
/// `save_document` must be atomic per document: it succeeds only when the stored
/// version still equals `expected_version` (`None` meaning "must not exist yet"),
/// and returns the new version.
///
/// `revert_document` undoes a save whose events could not be recorded. It only
/// applies while the stored version is still the one that save produced, and puts
/// back `previous` (removing the document when there was none).
pub trait EnvelopeRepository: Send + Sync {
    fn insert_envelope(&self, envelope: ScanEnvelope) -> Result<(), RepositoryError>;
    fn update_envelope(&self, envelope: ScanEnvelope) -> Result<(), RepositoryError>;
    fn remove_envelope(&self, id: &EnvelopeId) -> Result<(), RepositoryError>;
    fn fetch_envelope(&self, id: &EnvelopeId) -> Result<Option<ScanEnvelope>, RepositoryError>;
    fn fetch_document(&self, key: &DocumentKey)
        -> Result<Option<VersionedDocument>, RepositoryError>;
    fn save_document(
        &self,
        document: ScanDocument,
        expected_version: Option<u64>,
    ) -> Result<u64, RepositoryError>;
    fn revert_document(
        &self,
        key: &DocumentKey,
        version: u64,
        previous: Option<VersionedDocument>,
    ) -> Result<(), RepositoryError>;
    fn documents(&self, envelope_id: &EnvelopeId) -> Result<Vec<ScanDocument>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    #[error("record was modified concurrently or already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// An event tagged with the document it belongs to and the version it produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedEvent {
    pub key: DocumentKey,
    pub version: u64,
    pub event: DocumentEvent,
}

impl RecordedEvent {
    pub fn batch(key: &DocumentKey, version: u64, events: &[DocumentEvent]) -> Vec<Self> {
        events
            .iter()
            .map(|event| Self {
                key: key.clone(),
                version,
                event: event.clone(),
            })
            .collect()
    }
}

/// Append-only sink for the events produced by accepted commands.
///
/// A batch is recorded whole or not at all.
pub trait EventRecorder: Send + Sync {
    fn append(&self, batch: &[RecordedEvent]) -> Result<(), EventRecordError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EventRecordError {
    #[error("event store unavailable: {0}")]
    Unavailable(String),
}

/// Source of "now" for the service layer.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock pinned to one instant, for replays and tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
