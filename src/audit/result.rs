use std::path::PathBuf;
use serde::Serialize;
use crate::credential::ScanOutcome;
use crate::probe::FileState;
use crate::remediation::RemediationOutcome;
use super::violation::Violation;

/// Per-attribute comparison result for one entry. All false for a missing file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Verdict {
    pub mode_ok: bool,
    pub owner_ok: bool,
    pub group_ok: bool,
}

impl Verdict {
    pub fn is_compliant(&self) -> bool {
        self.mode_ok && self.owner_ok && self.group_ok
    }
}

#[derive(Debug, Clone)]
pub struct EntryEvaluation {
    pub path: PathBuf,
    pub verdict: Verdict,
    pub violations: Vec<Violation>,
    pub state: FileState,
}

impl EntryEvaluation {
    pub fn is_compliant(&self) -> bool {
        self.verdict.is_compliant()
    }

    /// True when the file exists and at least one violation can be fixed in place.
    pub fn is_remediable(&self) -> bool {
        self.state.exists() && self.violations.iter().any(|v| v.kind.is_remediable())
    }

    pub fn immutable(&self) -> Option<bool> {
        self.state.snapshot().and_then(|s| s.immutable)
    }
}

#[derive(Debug, Clone)]
pub struct EntryReport {
    pub path: PathBuf,
    pub evaluation: Option<EntryEvaluation>,
    pub remediation: Option<RemediationOutcome>,
    /// Set when the entry could not be probed at all.
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub total_checked: usize,
    pub total_violations: usize,
    pub total_remediated: usize,
    pub total_remediation_failures: usize,
    pub total_probe_errors: usize,
}

impl RunSummary {
    pub fn is_clean(&self) -> bool {
        self.total_violations == 0 && self.total_probe_errors == 0
    }
}

#[derive(Debug, Clone, Default)]
pub struct AuditReport {
    pub entries: Vec<EntryReport>,
    pub credential_scan: Option<ScanOutcome>,
    pub summary: RunSummary,
    pub remediation_enabled: bool,
}

impl AuditReport {
    pub fn violations(&self) -> impl Iterator<Item = &Violation> {
        self.entries
            .iter()
            .filter_map(|e| e.evaluation.as_ref())
            .flat_map(|e| e.violations.iter())
            .chain(self.credential_scan.as_ref().and_then(|s| s.violation()))
    }

    pub fn unresolved_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.evaluation.as_ref().is_some_and(|ev| !ev.is_compliant()))
            .filter(|e| !e.remediation.as_ref().is_some_and(|r| r.is_success()))
            .count()
    }
}
