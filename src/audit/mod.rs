mod violation;
mod result;
mod evaluator;
mod auditor;

pub use violation::{Violation, ViolationKind};
pub use result::{AuditReport, EntryEvaluation, EntryReport, RunSummary, Verdict};
pub use evaluator::ChecklistEvaluator;
pub use auditor::ComplianceAuditor;
