use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use chrono::Local;
use tracing::{debug, warn};
use crate::audit::RunSummary;
use crate::error::{AuditError, Result};
use super::record::{AuditRecord, TIMESTAMP_FORMAT};

pub const DEFAULT_LOG_PATH: &str = "/var/log/fsaudit.log";
const LOG_FILE_NAME: &str = "fsaudit.log";
const RUN_SEPARATOR: &str = "========================================================================";

/// Where the audit log may live: the primary path, or the fallback when
/// the primary cannot be created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLocation {
    pub primary: PathBuf,
    pub fallback: PathBuf,
}

impl LogLocation {
    pub fn new(primary: impl Into<PathBuf>, fallback: impl Into<PathBuf>) -> Self {
        Self {
            primary: primary.into(),
            fallback: fallback.into(),
        }
    }

    pub fn default_fallback() -> PathBuf {
        dirs::state_dir()
            .or_else(dirs::home_dir)
            .map(|dir| dir.join(LOG_FILE_NAME))
            .unwrap_or_else(|| std::env::temp_dir().join(LOG_FILE_NAME))
    }
}

impl Default for LogLocation {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_PATH, Self::default_fallback())
    }
}

/// Append-only audit log, resolved once per run.
///
/// Writes go through `&File`, so the log is shared by reference between the
/// evaluator, the credential scanner and the remediation engine.
#[derive(Debug)]
pub struct AuditLog {
    path: PathBuf,
    file: File,
    used_fallback: bool,
}

impl AuditLog {
    /// Resolves the sink and writes the run-start marker.
    pub fn open(location: &LogLocation) -> Result<Self> {
        let (path, file, used_fallback) = match open_append(&location.primary) {
            Ok(file) => (location.primary.clone(), file, false),
            Err(primary_err) => {
                warn!(
                    "Cannot open audit log {} ({}), falling back to {}",
                    location.primary.display(),
                    primary_err,
                    location.fallback.display()
                );
                match open_append(&location.fallback) {
                    Ok(file) => (location.fallback.clone(), file, true),
                    Err(fallback_err) => {
                        debug!("Fallback audit log failed: {}", fallback_err);
                        return Err(AuditError::LogUnavailable {
                            primary: location.primary.clone(),
                            fallback: location.fallback.clone(),
                        });
                    }
                }
            }
        };

        let log = Self { path, file, used_fallback };
        log.write_run_marker()?;
        Ok(log)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn used_fallback(&self) -> bool {
        self.used_fallback
    }

    pub fn record(&self, record: &AuditRecord) -> Result<()> {
        self.write_line(&record.format_line())
    }

    pub fn finish(&self, summary: &RunSummary) -> Result<()> {
        self.write_line(&format!(
            "[{}] RUN_END - Checked: {} | Violations: {} | Remediated: {} | Remediation failures: {} | Probe errors: {}",
            Local::now().format(TIMESTAMP_FORMAT),
            summary.total_checked,
            summary.total_violations,
            summary.total_remediated,
            summary.total_remediation_failures,
            summary.total_probe_errors,
        ))
    }

    fn write_run_marker(&self) -> Result<()> {
        self.write_line(RUN_SEPARATOR)?;
        self.write_line(&format!(
            "[{}] RUN_START - {} {}",
            Local::now().format(TIMESTAMP_FORMAT),
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_VERSION"),
        ))
    }

    fn write_line(&self, line: &str) -> Result<()> {
        let mut file = &self.file;
        writeln!(file, "{}", line)?;
        Ok(())
    }
}

fn open_append(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    OpenOptions::new().create(true).append(true).open(path)
}
