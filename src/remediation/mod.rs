//! Brings a drifted path back to its checklist values.
//!
//! The mode is applied first, then owner and group in one `chown` call. A
//! failure in the second step leaves the first in place: there is no rollback
//! and no retry.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use nix::unistd::{chown, Uid};
use tracing::{info, warn};
use crate::checklist::ChecklistEntry;
use crate::error::{AuditError, Result};
use crate::log::{AuditLog, AuditRecord, EventKind};
use crate::probe::{lookup_gid, lookup_uid, FileSnapshot, FileStateProbe};

/// Proof that the process runs with an effective uid of 0. Checked once
/// at startup; the remediation engine cannot be built without it.
#[derive(Debug)]
pub struct ElevatedPrivilege {
    _private: (),
}

impl ElevatedPrivilege {
    pub fn verify() -> Result<Self> {
        let euid = Uid::effective();
        if euid.is_root() {
            Ok(Self { _private: () })
        } else {
            Err(AuditError::PrivilegeRequired(euid.as_raw()))
        }
    }

    #[cfg(test)]
    pub(crate) fn assume() -> Self {
        Self { _private: () }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemediationOutcome {
    Applied,
    /// Nothing to change; counts as success.
    AlreadyCompliant,
    /// The path does not exist. Missing files are never created.
    NotApplicable,
    Failed(String),
}

impl RemediationOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RemediationOutcome::Applied | RemediationOutcome::AlreadyCompliant)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RemediationOutcome::Applied => "applied",
            RemediationOutcome::AlreadyCompliant => "already_compliant",
            RemediationOutcome::NotApplicable => "not_applicable",
            RemediationOutcome::Failed(_) => "failed",
        }
    }
}

pub struct RemediationEngine<'a> {
    probe: &'a dyn FileStateProbe,
    log: &'a AuditLog,
}

impl<'a> RemediationEngine<'a> {
    pub fn new(_privilege: &ElevatedPrivilege, probe: &'a dyn FileStateProbe, log: &'a AuditLog) -> Self {
        Self { probe, log }
    }

    /// Per-entry failures, including a path that can no longer be probed,
    /// come back as `Failed`. Only a log write error is returned as `Err`.
    pub fn remediate(&self, entry: &ChecklistEntry) -> Result<RemediationOutcome> {
        let target = format!("{} {}", entry.expected_mode, entry.expected_ownership());

        let state = match self.probe.probe(&entry.path) {
            Ok(state) => state,
            Err(e) => return self.failed(entry, e.to_string(), target),
        };
        let Some(snapshot) = state.snapshot() else {
            return Ok(RemediationOutcome::NotApplicable);
        };

        if is_compliant(snapshot, entry) {
            return Ok(RemediationOutcome::AlreadyCompliant);
        }

        let before = format!("{} {}", snapshot.mode, snapshot.ownership());

        match apply(entry) {
            Ok(()) => {
                info!("Remediated {}: {} -> {}", entry.path.display(), before, target);
                self.log.record(&AuditRecord::new(EventKind::Remediated, &entry.path, before, target))?;
                Ok(RemediationOutcome::Applied)
            }
            Err(reason) => self.failed(entry, reason, target),
        }
    }

    fn failed(&self, entry: &ChecklistEntry, reason: String, target: String) -> Result<RemediationOutcome> {
        warn!("Remediation of {} failed: {}", entry.path.display(), reason);
        self.log.record(&AuditRecord::new(
            EventKind::RemediationFailed,
            &entry.path,
            reason.as_str(),
            target,
        ))?;
        Ok(RemediationOutcome::Failed(reason))
    }
}

fn is_compliant(snapshot: &FileSnapshot, entry: &ChecklistEntry) -> bool {
    snapshot.mode == entry.expected_mode
        && snapshot.owner == entry.expected_owner
        && snapshot.group == entry.expected_group
}

fn apply(entry: &ChecklistEntry) -> std::result::Result<(), String> {
    let uid = lookup_uid(&entry.expected_owner)
        .ok_or_else(|| format!("unknown user '{}'", entry.expected_owner))?;
    let gid = lookup_gid(&entry.expected_group)
        .ok_or_else(|| format!("unknown group '{}'", entry.expected_group))?;

    fs::set_permissions(&entry.path, fs::Permissions::from_mode(entry.expected_mode.bits()))
        .map_err(|e| format!("chmod {} failed: {}", entry.expected_mode, e))?;

    chown(entry.path.as_path(), Some(uid), Some(gid))
        .map_err(|e| format!("chown {} failed: {}", entry.expected_ownership(), e))?;

    Ok(())
}
