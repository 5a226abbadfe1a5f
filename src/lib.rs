//! Lifecycle tracking and business validation for bulk-scanned court documents.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
