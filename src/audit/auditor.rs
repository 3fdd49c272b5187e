use tracing::{info, warn};
use crate::checklist::Checklist;
use crate::credential::{PasswordFieldScanner, ScanOutcome};
use crate::error::{AuditError, Result};
use crate::log::AuditLog;
use crate::probe::FileStateProbe;
use crate::remediation::{RemediationEngine, RemediationOutcome};
use super::evaluator::ChecklistEvaluator;
use super::result::{AuditReport, EntryReport};

/// Runs one audit pass: every checklist entry in order, remediation when an
/// engine is attached, then the credential scan.
pub struct ComplianceAuditor<'a> {
    checklist: &'a Checklist,
    probe: &'a dyn FileStateProbe,
    log: &'a AuditLog,
    remediation: Option<RemediationEngine<'a>>,
    scan_credentials: bool,
}

impl<'a> ComplianceAuditor<'a> {
    pub fn new(checklist: &'a Checklist, probe: &'a dyn FileStateProbe, log: &'a AuditLog) -> Self {
        Self {
            checklist,
            probe,
            log,
            remediation: None,
            scan_credentials: true,
        }
    }

    pub fn with_remediation(mut self, engine: RemediationEngine<'a>) -> Self {
        self.remediation = Some(engine);
        self
    }

    pub fn without_credential_scan(mut self) -> Self {
        self.scan_credentials = false;
        self
    }

    pub fn run(&self) -> Result<AuditReport> {
        let evaluator = ChecklistEvaluator::new(self.probe, self.log);
        let mut report = AuditReport {
            remediation_enabled: self.remediation.is_some(),
            ..AuditReport::default()
        };

        info!("Auditing {} checklist entries", self.checklist.len());

        for entry in self.checklist.entries() {
            report.summary.total_checked += 1;

            let evaluation = match evaluator.evaluate(entry) {
                Ok(evaluation) => evaluation,
                Err(e @ AuditError::Probe { .. }) => {
                    warn!("{}", e);
                    report.summary.total_probe_errors += 1;
                    report.entries.push(EntryReport {
                        path: entry.path.clone(),
                        evaluation: None,
                        remediation: None,
                        error: Some(e.to_string()),
                    });
                    continue;
                }
                Err(e) => return Err(e),
            };

            report.summary.total_violations += evaluation.violations.len();

            let remediation = match &self.remediation {
                Some(engine) if evaluation.is_remediable() => {
                    let outcome = engine.remediate(entry)?;
                    match outcome {
                        RemediationOutcome::Applied => report.summary.total_remediated += 1,
                        RemediationOutcome::Failed(_) => report.summary.total_remediation_failures += 1,
                        RemediationOutcome::AlreadyCompliant | RemediationOutcome::NotApplicable => {}
                    }
                    Some(outcome)
                }
                _ => None,
            };

            report.entries.push(EntryReport {
                path: entry.path.clone(),
                evaluation: Some(evaluation),
                remediation,
                error: None,
            });
        }

        if self.scan_credentials {
            let outcome = PasswordFieldScanner::new(self.log).scan(self.checklist.credential_file())?;
            if let ScanOutcome::Violation(_) = outcome {
                report.summary.total_violations += 1;
            }
            report.credential_scan = Some(outcome);
        }

        self.log.finish(&report.summary)?;

        info!(
            "Audit complete: {} checked, {} violations, {} remediated",
            report.summary.total_checked,
            report.summary.total_violations,
            report.summary.total_remediated
        );

        Ok(report)
    }
}
