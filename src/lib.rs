pub mod error;
pub mod checklist;
pub mod probe;
pub mod log;
pub mod audit;
pub mod credential;
pub mod remediation;
pub mod stats;

pub use error::{AuditError, Result};
pub use checklist::{Checklist, ChecklistEntry, ChecklistLoader, ChecklistValidator, FileMode, ValidationResult};
pub use probe::{FileSnapshot, FileState, FileStateProbe, MockProbe, SystemProbe};
pub use log::{AuditLog, AuditRecord, EventKind, LogLocation};
pub use audit::{
    AuditReport, ChecklistEvaluator, ComplianceAuditor, EntryEvaluation, EntryReport,
    RunSummary, Verdict, Violation, ViolationKind,
};
pub use credential::{PasswordFieldScanner, ScanOutcome};
pub use remediation::{ElevatedPrivilege, RemediationEngine, RemediationOutcome};
pub use stats::{DirectoryAnalyzer, DirectoryStats, StatsReport, human_size};
