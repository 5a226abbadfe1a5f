use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::workflows::scanning::{
    Clock, DocumentCommand, DocumentId, DocumentKey, DocumentRegistration, EnvelopeId,
    EventRecordError, EventRecorder, InMemoryEventLog, InMemoryScanStore, RecordedEvent,
    RegisterDocument, RegisterEnvelope, RetentionPolicy, ScanDocument, ScanDocumentService,
};

pub(super) const RETENTION_DAYS: u32 = 30;

pub(super) fn received_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 2, 8, 15, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn later(days: i64) -> DateTime<Utc> {
    received_at() + Duration::days(days)
}

pub(super) fn envelope_id() -> EnvelopeId {
    EnvelopeId("env-2025-06-02-001".to_string())
}

pub(super) fn document_id() -> DocumentId {
    DocumentId("doc-0001".to_string())
}

pub(super) fn key() -> DocumentKey {
    DocumentKey::new(envelope_id(), document_id())
}

pub(super) fn registration() -> RegisterDocument {
    RegisterDocument {
        file_name: "sjp-plea-0001.pdf".to_string(),
        case_urn: Some("TFL123456".to_string()),
        pti_urn: None,
        prosecuting_authority: Some("TFL".to_string()),
        document_name: Some("SJP plea".to_string()),
        status_code: Some("SJPN".to_string()),
        notes: None,
    }
}

pub(super) fn registered_document() -> ScanDocument {
    crate::workflows::scanning::transition(
        &key(),
        None,
        DocumentCommand::Register(registration()),
        received_at(),
    )
    .expect("registers")
    .document
}

pub(super) fn envelope_registration(document_ids: &[&str]) -> RegisterEnvelope {
    RegisterEnvelope {
        envelope_id: envelope_id(),
        archive_file_name: "bulkscan-2025-06-02.zip".to_string(),
        extracted_at: received_at(),
        notes: None,
        documents: document_ids
            .iter()
            .map(|id| DocumentRegistration {
                document_id: DocumentId(id.to_string()),
                document: registration(),
            })
            .collect(),
    }
}

/// Clock that tests can move forward between commands.
#[derive(Debug)]
pub(super) struct SteppingClock {
    now: Mutex<DateTime<Utc>>,
}

impl SteppingClock {
    pub(super) fn at(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub(super) fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().expect("clock mutex poisoned") = now;
    }
}

impl Clock for SteppingClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().expect("clock mutex poisoned")
    }
}

pub(super) type TestService = ScanDocumentService<InMemoryScanStore, InMemoryEventLog, SteppingClock>;

pub(super) fn build_service() -> (
    TestService,
    Arc<InMemoryScanStore>,
    Arc<InMemoryEventLog>,
    Arc<SteppingClock>,
) {
    let store = Arc::new(InMemoryScanStore::default());
    let events = Arc::new(InMemoryEventLog::default());
    let clock = Arc::new(SteppingClock::at(received_at()));
    let service = ScanDocumentService::new(
        store.clone(),
        events.clone(),
        clock.clone(),
        RetentionPolicy::new(RETENTION_DAYS),
    );
    (service, store, events, clock)
}

pub(super) struct UnavailableEventLog;

impl EventRecorder for UnavailableEventLog {
    fn append(&self, _batch: &[RecordedEvent]) -> Result<(), EventRecordError> {
        Err(EventRecordError::Unavailable("event store offline".to_string()))
    }
}
