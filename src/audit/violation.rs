use std::fmt;
use std::path::PathBuf;
use chrono::{DateTime, Local};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ViolationKind {
    MissingFile,
    ModeMismatch,
    OwnerMismatch,
    GroupMismatch,
    PlaintextCredential,
}

impl ViolationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViolationKind::MissingFile => "MISSING_FILE",
            ViolationKind::ModeMismatch => "MODE_MISMATCH",
            ViolationKind::OwnerMismatch => "OWNER_MISMATCH",
            ViolationKind::GroupMismatch => "GROUP_MISMATCH",
            ViolationKind::PlaintextCredential => "PLAINTEXT_CREDENTIAL",
        }
    }

    /// Mode and ownership drift can be fixed in place; a missing file or a
    /// plaintext password cannot.
    pub fn is_remediable(&self) -> bool {
        matches!(
            self,
            ViolationKind::ModeMismatch | ViolationKind::OwnerMismatch | ViolationKind::GroupMismatch
        )
    }
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Violation {
    pub kind: ViolationKind,
    pub path: PathBuf,
    pub observed: String,
    pub expected: String,
    pub timestamp: DateTime<Local>,
}

impl Violation {
    pub fn new(
        kind: ViolationKind,
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
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} (observed {}, expected {})",
            self.kind,
            self.path.display(),
            self.observed,
            self.expected
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remediable_kinds() {
        assert!(ViolationKind::ModeMismatch.is_remediable());
        assert!(ViolationKind::OwnerMismatch.is_remediable());
        assert!(ViolationKind::GroupMismatch.is_remediable());
        assert!(!ViolationKind::MissingFile.is_remediable());
        assert!(!ViolationKind::PlaintextCredential.is_remediable());
    }

    #[test]
    fn test_display() {
        let v = Violation::new(ViolationKind::ModeMismatch, "/tmp/test_file", "777", "644");
        assert_eq!(v.to_string(), "MODE_MISMATCH: /tmp/test_file (observed 777, expected 644)");
    }
}
