use std::fmt;
use std::path::PathBuf;
use chrono::{DateTime, Local};
use crate::audit::{Violation, ViolationKind};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Violation(ViolationKind),
    Remediated,
    RemediationFailed,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Violation(kind) => kind.as_str(),
            EventKind::Remediated => "REMEDIATED",
            EventKind::RemediationFailed => "REMEDIATION_FAILED",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One line of the audit log.
#[derive(Debug, Clone)]
pub struct AuditRecord {
    pub kind: EventKind,
    pub path: PathBuf,
    pub observed: String,
    pub expected: String,
    pub timestamp: DateTime<Local>,
}

impl AuditRecord {
    pub fn new(
        kind: EventKind,
        path: impl Into<PathBuf>,
        observed: impl Into<String>,
        expected: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            path: path.into(),
            observed: observed.into(),
            expected: expected.into(),
            timestamp: Local::now(),
        }
    }

    pub fn format_line(&self) -> String {
        format!(
            "[{}] {} - Path: {} | Observed: {} | Expected: {}",
            self.timestamp.format(TIMESTAMP_FORMAT),
            self.kind,
            self.path.display(),
            self.observed,
            self.expected,
        )
    }
}

impl From<&Violation> for AuditRecord {
    fn from(violation: &Violation) -> Self {
        Self {
            kind: EventKind::Violation(violation.kind),
            path: violation.path.clone(),
            observed: violation.observed.clone(),
            expected: violation.expected.clone(),
            timestamp: violation.timestamp,
        }
    }
}
