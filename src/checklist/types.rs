use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use crate::error::{AuditError, Result};
use super::validator::ChecklistValidator;

pub const DEFAULT_CREDENTIAL_FILE: &str = "/etc/passwd";

const BUILTIN_CHECKLIST: &str = include_str!("../../checklists/system.yaml");

/// Owner/group/other permission bits, always within `0o777`.
///
/// Parsed from octal text (`"644"`, `"0640"`, `"0o600"`). Checklists must
/// quote the mode: an unquoted YAML integer has already lost the digits
/// that were written (`0o644` and `420` arrive as the same number), so
/// numbers are rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileMode(u32);

impl FileMode {
    pub fn new(bits: u32) -> Result<Self> {
        if bits > 0o777 {
            return Err(AuditError::InvalidMode(format!("{:o}", bits)));
        }
        Ok(Self(bits))
    }

    /// Keeps only the permission triple, dropping file type and special bits.
    pub fn from_raw_mode(raw: u32) -> Self {
        Self(raw & 0o777)
    }

    pub fn bits(self) -> u32 {
        self.0
    }

    pub fn is_world_writable(self) -> bool {
        self.0 & 0o002 != 0
    }
}

impl FromStr for FileMode {
    type Err = AuditError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let digits = trimmed.strip_prefix("0o").unwrap_or(trimmed);

        if digits.is_empty() || digits.len() > 4 || !digits.chars().all(|c| ('0'..='7').contains(&c)) {
            return Err(AuditError::InvalidMode(s.to_string()));
        }

        let bits = u32::from_str_radix(digits, 8)
            .map_err(|_| AuditError::InvalidMode(s.to_string()))?;

        if bits > 0o777 {
            return Err(AuditError::InvalidMode(s.to_string()));
        }

        Ok(Self(bits))
    }
}

impl fmt::Display for FileMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:03o}", self.0)
    }
}

impl Serialize for FileMode {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for FileMode {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawMode {
            Text(String),
            Number(u64),
        }

        match RawMode::deserialize(deserializer)? {
            RawMode::Text(text) => text.parse().map_err(serde::de::Error::custom),
            RawMode::Number(n) => Err(serde::de::Error::custom(format!(
                "mode must be a quoted octal string such as \"644\", got the number {}",
                n
            ))),
        }
    }
}

/// One declared rule: the path must exist with exactly this mode and ownership.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistEntry {
    pub path: PathBuf,
    #[serde(rename = "mode")]
    pub expected_mode: FileMode,
    #[serde(rename = "owner")]
    pub expected_owner: String,
    #[serde(rename = "group")]
    pub expected_group: String,
}

impl ChecklistEntry {
    pub fn new(
        path: impl Into<PathBuf>,
        expected_mode: FileMode,
        expected_owner: impl Into<String>,
        expected_group: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            expected_mode,
            expected_owner: expected_owner.into(),
            expected_group: expected_group.into(),
        }
    }

    pub fn expected_ownership(&self) -> String {
        format!("{}:{}", self.expected_owner, self.expected_group)
    }
}

/// Ordered set of entries loaded once per run. Entries are only exposed
/// by shared reference, so a loaded checklist cannot change mid-run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Checklist {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    credential_file: Option<PathBuf>,
    #[serde(default)]
    entries: Vec<ChecklistEntry>,
}

impl Checklist {
    pub fn new(entries: Vec<ChecklistEntry>) -> Self {
        Self {
            credential_file: None,
            entries,
        }
    }

    /// Standard system paths compiled into the binary, validated like any
    /// loaded checklist.
    pub fn builtin() -> Result<Self> {
        Self::from_yaml_str(BUILTIN_CHECKLIST)?.validated()
    }

    /// Rejects the checklist when the validator reports any error.
    pub fn validated(self) -> Result<Self> {
        let result = ChecklistValidator::validate(&self);
        if !result.is_valid() {
            return Err(AuditError::InvalidChecklist(result.error_summary()));
        }
        Ok(self)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn with_credential_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.credential_file = Some(path.into());
        self
    }

    pub fn entries(&self) -> &[ChecklistEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, path: impl AsRef<Path>) -> Option<&ChecklistEntry> {
        let path = path.as_ref();
        self.entries.iter().find(|e| e.path == path)
    }

    /// The user database scanned for plaintext passwords.
    pub fn credential_file(&self) -> &Path {
        self.credential_file
            .as_deref()
            .unwrap_or_else(|| Path::new(DEFAULT_CREDENTIAL_FILE))
    }

    /// Appends `other`'s entries after ours. A credential file declared by
    /// `other` replaces ours.
    pub fn merge(mut self, other: Checklist) -> Self {
        self.entries.extend(other.entries);
        if other.credential_file.is_some() {
            self.credential_file = other.credential_file;
        }
        self
    }
}
