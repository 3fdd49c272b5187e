mod record;
mod sink;

pub use record::{AuditRecord, EventKind, TIMESTAMP_FORMAT};
pub use sink::{AuditLog, LogLocation, DEFAULT_LOG_PATH};
