use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

use super::domain::{DocumentKey, EnvelopeId, ScanDocument, ScanEnvelope};
use super::event::DocumentEvent;
use super::repository::{
    EnvelopeRepository, EventRecordError, EventRecorder, RecordedEvent, RepositoryError,
    VersionedDocument,
};

/// Process-local store used by the CLI replay and by tests.
#[derive(Debug, Default)]
pub struct InMemoryScanStore {
    envelopes: Mutex<HashMap<EnvelopeId, ScanEnvelope>>,
    documents: Mutex<BTreeMap<DocumentKey, VersionedDocument>>,
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, RepositoryError> {
    mutex
        .lock()
        .map_err(|_| RepositoryError::Unavailable("store mutex poisoned".to_string()))
}

impl EnvelopeRepository for InMemoryScanStore {
    fn insert_envelope(&self, envelope: ScanEnvelope) -> Result<(), RepositoryError> {
        let mut guard = lock(&self.envelopes)?;
        if guard.contains_key(&envelope.envelope_id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(envelope.envelope_id.clone(), envelope);
        Ok(())
    }

    fn update_envelope(&self, envelope: ScanEnvelope) -> Result<(), RepositoryError> {
        let mut guard = lock(&self.envelopes)?;
        match guard.get_mut(&envelope.envelope_id) {
            Some(stored) => {
                *stored = envelope;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn remove_envelope(&self, id: &EnvelopeId) -> Result<(), RepositoryError> {
        match lock(&self.envelopes)?.remove(id) {
            Some(_) => Ok(()),
            None => Err(RepositoryError::NotFound),
        }
    }

    fn fetch_envelope(&self, id: &EnvelopeId) -> Result<Option<ScanEnvelope>, RepositoryError> {
        Ok(lock(&self.envelopes)?.get(id).cloned())
    }

    fn fetch_document(
        &self,
        key: &DocumentKey,
    ) -> Result<Option<VersionedDocument>, RepositoryError> {
        Ok(lock(&self.documents)?.get(key).cloned())
    }

    fn save_document(
        &self,
        document: ScanDocument,
        expected_version: Option<u64>,
    ) -> Result<u64, RepositoryError> {
        let mut guard = lock(&self.documents)?;
        let key = document.key();
        let stored_version = guard.get(&key).map(|stored| stored.version);
        if stored_version != expected_version {
            return Err(RepositoryError::Conflict);
        }

        let version = expected_version.map_or(1, |version| version + 1);
        guard.insert(key, VersionedDocument { document, version });
        Ok(version)
    }

    fn revert_document(
        &self,
        key: &DocumentKey,
        version: u64,
        previous: Option<VersionedDocument>,
    ) -> Result<(), RepositoryError> {
        let mut guard = lock(&self.documents)?;
        match guard.get(key) {
            Some(stored) if stored.version == version => {}
            Some(_) => return Err(RepositoryError::Conflict),
            None => return Err(RepositoryError::NotFound),
        }

        match previous {
            Some(previous) => {
                guard.insert(key.clone(), previous);
            }
            None => {
                guard.remove(key);
            }
        }
        Ok(())
    }

    fn documents(&self, envelope_id: &EnvelopeId) -> Result<Vec<ScanDocument>, RepositoryError> {
        let guard = lock(&self.documents)?;
        Ok(guard
            .values()
            .filter(|stored| &stored.document.envelope_id == envelope_id)
            .map(|stored| stored.document.clone())
            .collect())
    }
}

/// Event log kept in memory, in append order.
#[derive(Debug, Default)]
pub struct InMemoryEventLog {
    entries: Mutex<Vec<RecordedEvent>>,
}

impl InMemoryEventLog {
    pub fn events_for(&self, key: &DocumentKey) -> Vec<DocumentEvent> {
        match self.entries.lock() {
            Ok(guard) => guard
                .iter()
                .filter(|entry| &entry.key == key)
                .map(|entry| entry.event.clone())
                .collect(),
            Err(_) => Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|guard| guard.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl EventRecorder for InMemoryEventLog {
    fn append(&self, batch: &[RecordedEvent]) -> Result<(), EventRecordError> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|_| EventRecordError::Unavailable("event log mutex poisoned".to_string()))?;
        guard.extend_from_slice(batch);
        Ok(())
    }
}
