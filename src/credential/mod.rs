//! Plaintext password detection in a colon-delimited user database.
//!
//! The scan is fail-fast: it stops at the first record whose password field
//! holds something other than a sentinel, and records after it are never
//! read. One run therefore reports at most one offending account.

use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind};
use std::path::Path;
use tracing::{debug, warn};
use crate::audit::{Violation, ViolationKind};
use crate::error::Result;
use crate::log::{AuditLog, AuditRecord};

/// Password delegated to the shadow file.
pub const SHADOW_SENTINEL: &str = "x";
/// Account with password login disabled.
pub const DISABLED_SENTINEL: &str = "*";

#[derive(Debug, Clone)]
pub enum ScanOutcome {
    /// Every record was inspected and none holds a plaintext password.
    Clean { records: usize },
    /// Scanning stopped at this record.
    Violation(Violation),
    /// The file does not exist. Not a security finding, nothing is logged.
    Absent,
}

impl ScanOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, ScanOutcome::Clean { .. })
    }

    pub fn violation(&self) -> Option<&Violation> {
        match self {
            ScanOutcome::Violation(v) => Some(v),
            _ => None,
        }
    }
}

pub struct PasswordFieldScanner<'a> {
    log: &'a AuditLog,
}

impl<'a> PasswordFieldScanner<'a> {
    pub fn new(log: &'a AuditLog) -> Self {
        Self { log }
    }

    pub fn scan(&self, path: &Path) -> Result<ScanOutcome> {
        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Credential file {} not found", path.display());
                return Ok(ScanOutcome::Absent);
            }
            Err(e) => return Err(e.into()),
        };

        // Records are compared as bytes; GECOS fields are not always UTF-8.
        let mut records = 0;
        for (index, line) in BufReader::new(file).split(b'\n').enumerate() {
            let line = line?;
            let mut fields = line.split(|&b| b == b':');

            let user = fields.next().unwrap_or_default();
            if user.is_empty() {
                continue;
            }
            records += 1;

            let password = fields.next().unwrap_or_default();
            if is_acceptable_password_field(password) {
                continue;
            }

            // The secret itself stays out of the log.
            let user = String::from_utf8_lossy(user);
            let violation = Violation::new(
                ViolationKind::PlaintextCredential,
                path,
                format!("user={} (line {})", user, index + 1),
                format!("'{}' or '{}'", SHADOW_SENTINEL, DISABLED_SENTINEL),
            );
            warn!("Plaintext password field for user '{}' in {}", user, path.display());
            self.log.record(&AuditRecord::from(&violation))?;
            return Ok(ScanOutcome::Violation(violation));
        }

        Ok(ScanOutcome::Clean { records })
    }
}

/// Sentinels pass. An empty field is a passwordless account, not a stored
/// secret, so it is not reported here either.
fn is_acceptable_password_field(field: &[u8]) -> bool {
    field.is_empty() || field == SHADOW_SENTINEL.as_bytes() || field == DISABLED_SENTINEL.as_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::LogLocation;
    use std::fs;
    use tempfile::TempDir;

    fn setup() -> (TempDir, AuditLog) {
        let dir = TempDir::new().unwrap();
        let log = AuditLog::open(&LogLocation::new(dir.path().join("audit.log"), dir.path().join("fb.log"))).unwrap();
        (dir, log)
    }

    #[test]
    fn test_sentinels_are_clean() {
        let (dir, log) = setup();
        let path = dir.path().join("passwd");
        fs::write(
            &path,
            "root:x:0:0:root:/root:/bin/bash\nnobody:*:65534:65534::/nonexistent:/usr/sbin/nologin\n\n",
        )
        .unwrap();

        let outcome = PasswordFieldScanner::new(&log).scan(&path).unwrap();
        assert!(outcome.is_ok());
        assert!(matches!(outcome, ScanOutcome::Clean { records: 2 }));
    }

    #[test]
    fn test_plaintext_password_detected() {
        let (dir, log) = setup();
        let path = dir.path().join("passwd");
        fs::write(&path, "bob:hunter2:1001:1001::/home/bob:/bin/bash\n").unwrap();

        let outcome = PasswordFieldScanner::new(&log).scan(&path).unwrap();
        assert!(!outcome.is_ok());

        let violation = outcome.violation().unwrap();
        assert_eq!(violation.kind, ViolationKind::PlaintextCredential);
        assert!(violation.observed.contains("bob"));
        assert!(!violation.observed.contains("hunter2"));

        let content = fs::read_to_string(log.path()).unwrap();
        assert!(content.contains("PLAINTEXT_CREDENTIAL"));
        assert!(!content.contains("hunter2"));
    }

    #[test]
    fn test_empty_username_skipped() {
        let (dir, log) = setup();
        let path = dir.path().join("passwd");
        fs::write(&path, ":secret:0:0::/:/bin/sh\nroot:x:0:0::/root:/bin/sh\n").unwrap();

        let outcome = PasswordFieldScanner::new(&log).scan(&path).unwrap();
        assert!(matches!(outcome, ScanOutcome::Clean { records: 1 }));
    }

    #[test]
    fn test_empty_password_field_not_reported() {
        let (dir, log) = setup();
        let path = dir.path().join("passwd");
        fs::write(&path, "guest::1002:1002::/home/guest:/bin/sh\nlonely\n").unwrap();

        let outcome = PasswordFieldScanner::new(&log).scan(&path).unwrap();
        assert!(outcome.is_ok());
    }

    #[test]
    fn test_non_utf8_record_is_scanned() {
        let (dir, log) = setup();
        let path = dir.path().join("passwd");
        fs::write(
            &path,
            b"root:x:0:0:root:/root:/bin/bash\njose:x:1000:1000:Jos\xe9:/home/jose:/bin/sh\n",
        )
        .unwrap();

        let outcome = PasswordFieldScanner::new(&log).scan(&path).unwrap();
        assert!(matches!(outcome, ScanOutcome::Clean { records: 2 }));
    }

    #[test]
    fn test_non_utf8_user_name_is_reported_lossily() {
        let (dir, log) = setup();
        let path = dir.path().join("passwd");
        fs::write(&path, b"ren\xe9:s3cret:1001:1001::/home/rene:/bin/sh\n").unwrap();

        let outcome = PasswordFieldScanner::new(&log).scan(&path).unwrap();
        let violation = outcome.violation().unwrap();
        assert!(violation.observed.starts_with("user=ren"));
        assert!(violation.observed.contains("(line 1)"));
        assert!(!violation.observed.contains("s3cret"));
    }

    #[test]
    fn test_absent_file_logs_nothing() {
        let (dir, log) = setup();
        let outcome = PasswordFieldScanner::new(&log).scan(&dir.path().join("missing")).unwrap();

        assert!(matches!(outcome, ScanOutcome::Absent));
        assert!(!outcome.is_ok());
        let content = fs::read_to_string(log.path()).unwrap();
        assert!(!content.contains("PLAINTEXT_CREDENTIAL"));
    }
}
