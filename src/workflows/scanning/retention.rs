use chrono::{DateTime, Duration, Utc};

use super::domain::{DocumentStatus, ScanDocument};

/// Retention window applied to actioned documents before physical deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionPolicy {
    retention_days: u32,
}

impl RetentionPolicy {
    pub fn new(retention_days: u32) -> Self {
        Self { retention_days }
    }

    pub fn retention_days(&self) -> u32 {
        self.retention_days
    }

    pub fn window(&self) -> Duration {
        Duration::days(i64::from(self.retention_days))
    }

    pub fn is_eligible(
        &self,
        status: DocumentStatus,
        status_updated_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> bool {
        status.is_actioned() && now - status_updated_at >= self.window()
    }

    /// Documents already deleted are never candidates again.
    pub fn is_document_eligible(&self, document: &ScanDocument, now: DateTime<Utc>) -> bool {
        !document.deleted && self.is_eligible(document.status, document.status_updated_at, now)
    }
}

pub fn is_eligible_for_deletion(
    status: DocumentStatus,
    status_updated_at: DateTime<Utc>,
    retention_days: u32,
    now: DateTime<Utc>,
) -> bool {
    RetentionPolicy::new(retention_days).is_eligible(status, status_updated_at, now)
}
