use tracing::debug;
use crate::checklist::ChecklistEntry;
use crate::error::Result;
use crate::log::{AuditLog, AuditRecord};
use crate::probe::{FileState, FileStateProbe};
use super::result::{EntryEvaluation, Verdict};
use super::violation::{Violation, ViolationKind};

/// Compares one checklist entry against probed state.
///
/// Every mismatch becomes its own violation and is written to the audit log
/// before `evaluate` returns, so a single entry can produce up to three log
/// lines (mode, owner, group, in that order). A missing path produces exactly
/// one `MISSING_FILE` line and nothing else.
pub struct ChecklistEvaluator<'a> {
    probe: &'a dyn FileStateProbe,
    log: &'a AuditLog,
}

impl<'a> ChecklistEvaluator<'a> {
    pub fn new(probe: &'a dyn FileStateProbe, log: &'a AuditLog) -> Self {
        Self { probe, log }
    }

    pub fn evaluate(&self, entry: &ChecklistEntry) -> Result<EntryEvaluation> {
        let state = self.probe.probe(&entry.path)?;

        let snapshot = match state.snapshot() {
            Some(snapshot) => snapshot.clone(),
            None => return self.missing(entry),
        };

        let verdict = Verdict {
            mode_ok: snapshot.mode == entry.expected_mode,
            owner_ok: snapshot.owner == entry.expected_owner,
            group_ok: snapshot.group == entry.expected_group,
        };

        let mut violations = Vec::new();

        if !verdict.mode_ok {
            violations.push(self.report(Violation::new(
                ViolationKind::ModeMismatch,
                &entry.path,
                snapshot.mode.to_string(),
                entry.expected_mode.to_string(),
            ))?);
        }

        if !verdict.owner_ok {
            violations.push(self.report(Violation::new(
                ViolationKind::OwnerMismatch,
                &entry.path,
                snapshot.owner.as_str(),
                entry.expected_owner.as_str(),
            ))?);
        }

        if !verdict.group_ok {
            violations.push(self.report(Violation::new(
                ViolationKind::GroupMismatch,
                &entry.path,
                snapshot.group.as_str(),
                entry.expected_group.as_str(),
            ))?);
        }

        if let Some(true) = snapshot.immutable {
            debug!("{} has the immutable attribute set", entry.path.display());
        }

        Ok(EntryEvaluation {
            path: entry.path.clone(),
            verdict,
            violations,
            state,
        })
    }

    fn missing(&self, entry: &ChecklistEntry) -> Result<EntryEvaluation> {
        let violation = self.report(Violation::new(
            ViolationKind::MissingFile,
            &entry.path,
            "absent",
            "present",
        ))?;

        Ok(EntryEvaluation {
            path: entry.path.clone(),
            verdict: Verdict::default(),
            violations: vec![violation],
            state: FileState::Missing,
        })
    }

    fn report(&self, violation: Violation) -> Result<Violation> {
        debug!("{}", violation);
        self.log.record(&AuditRecord::from(&violation))?;
        Ok(violation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checklist::FileMode;
    use crate::log::LogLocation;
    use crate::probe::MockProbe;
    use std::fs;
    use tempfile::TempDir;

    fn mode(s: &str) -> FileMode {
        s.parse().unwrap()
    }

    fn open_log(dir: &TempDir) -> AuditLog {
        AuditLog::open(&LogLocation::new(dir.path().join("audit.log"), dir.path().join("fallback.log"))).unwrap()
    }

    fn record_lines(log: &AuditLog) -> Vec<String> {
        fs::read_to_string(log.path())
            .unwrap()
            .lines()
            .filter(|l| l.contains(" - Path: "))
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_compliant_entry_logs_nothing() {
        let dir = TempDir::new().unwrap();
        let log = open_log(&dir);
        let probe = MockProbe::new().with_file("/etc/passwd", mode("644"), "root", "root");
        let entry = ChecklistEntry::new("/etc/passwd", mode("644"), "root", "root");

        let result = ChecklistEvaluator::new(&probe, &log).evaluate(&entry).unwrap();

        assert!(result.is_compliant());
        assert!(result.violations.is_empty());
        assert!(record_lines(&log).is_empty());
    }

    #[test]
    fn test_mode_only_mismatch() {
        let dir = TempDir::new().unwrap();
        let log = open_log(&dir);
        let probe = MockProbe::new().with_file("/etc/shadow", mode("640"), "root", "shadow");
        let entry = ChecklistEntry::new("/etc/shadow", mode("600"), "root", "shadow");

        let result = ChecklistEvaluator::new(&probe, &log).evaluate(&entry).unwrap();

        assert_eq!(result.verdict, Verdict { mode_ok: false, owner_ok: true, group_ok: true });
        assert_eq!(result.violations.len(), 1);
        assert_eq!(result.violations[0].kind, ViolationKind::ModeMismatch);

        let lines = record_lines(&log);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("MODE_MISMATCH - Path: /etc/shadow | Observed: 640 | Expected: 600"));
        assert!(!lines[0].contains("OWNER_MISMATCH"));
    }

    #[test]
    fn test_missing_file_single_violation() {
        let dir = TempDir::new().unwrap();
        let log = open_log(&dir);
        let probe = MockProbe::new();
        let entry = ChecklistEntry::new("/etc/gshadow", mode("640"), "root", "shadow");

        let result = ChecklistEvaluator::new(&probe, &log).evaluate(&entry).unwrap();

        assert_eq!(result.verdict, Verdict::default());
        assert_eq!(result.violations.len(), 1);
        assert_eq!(result.violations[0].kind, ViolationKind::MissingFile);
        assert!(!result.is_remediable());

        let lines = record_lines(&log);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("MISSING_FILE - Path: /etc/gshadow"));
    }

    #[test]
    fn test_all_three_mismatches_in_order() {
        let dir = TempDir::new().unwrap();
        let log = open_log(&dir);
        let probe = MockProbe::new().with_file("/tmp/test_file", mode("777"), "root", "root");
        let entry = ChecklistEntry::new("/tmp/test_file", mode("644"), "alice", "staff");

        let result = ChecklistEvaluator::new(&probe, &log).evaluate(&entry).unwrap();

        let kinds: Vec<_> = result.violations.iter().map(|v| v.kind).collect();
        assert_eq!(
            kinds,
            vec![ViolationKind::ModeMismatch, ViolationKind::OwnerMismatch, ViolationKind::GroupMismatch]
        );
        assert!(result.is_remediable());

        let lines = record_lines(&log);
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("MODE_MISMATCH - Path: /tmp/test_file | Observed: 777 | Expected: 644"));
        assert!(lines[1].contains("OWNER_MISMATCH - Path: /tmp/test_file | Observed: root | Expected: alice"));
        assert!(lines[2].contains("GROUP_MISMATCH - Path: /tmp/test_file | Observed: root | Expected: staff"));
    }

    #[test]
    fn test_immutable_flag_is_informational() {
        let dir = TempDir::new().unwrap();
        let log = open_log(&dir);
        let probe = MockProbe::new().with_state(
            "/etc/hosts",
            FileState::Present(crate::probe::FileSnapshot {
                mode: mode("644"),
                owner: "root".to_string(),
                group: "root".to_string(),
                immutable: Some(true),
            }),
        );
        let entry = ChecklistEntry::new("/etc/hosts", mode("644"), "root", "root");

        let result = ChecklistEvaluator::new(&probe, &log).evaluate(&entry).unwrap();

        assert!(result.is_compliant());
        assert_eq!(result.immutable(), Some(true));
        assert!(record_lines(&log).is_empty());
    }
}
