use std::fs;
use std::io::ErrorKind;
use std::os::unix::fs::MetadataExt;
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::debug;
use crate::checklist::FileMode;
use crate::error::{AuditError, Result};
use super::accounts::{group_name, user_name};
use super::state::{FileSnapshot, FileState};
use super::FileStateProbe;

/// Probes the live filesystem. Read-only.
pub struct SystemProbe {
    check_immutable: bool,
}

impl SystemProbe {
    pub fn new() -> Self {
        Self { check_immutable: true }
    }

    /// Skip the `lsattr` call; `immutable` is then always `None`.
    pub fn without_immutable_check(mut self) -> Self {
        self.check_immutable = false;
        self
    }

    fn immutable_flag(&self, path: &Path) -> Option<bool> {
        if !self.check_immutable {
            return None;
        }

        let output = Command::new("lsattr")
            .arg("-d")
            .arg(path)
            .stderr(Stdio::null())
            .output()
            .ok()?;

        if !output.status.success() {
            debug!("lsattr failed for {}", path.display());
            return None;
        }

        parse_lsattr_flags(&String::from_utf8_lossy(&output.stdout))
    }
}

impl Default for SystemProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl FileStateProbe for SystemProbe {
    fn probe(&self, path: &Path) -> Result<FileState> {
        let metadata = match fs::metadata(path) {
            Ok(m) => m,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(FileState::Missing),
            Err(e) => {
                return Err(AuditError::Probe {
                    path: path.to_path_buf(),
                    source: e,
                })
            }
        };

        Ok(FileState::Present(FileSnapshot {
            mode: FileMode::from_raw_mode(metadata.mode()),
            owner: user_name(metadata.uid()),
            group: group_name(metadata.gid()),
            immutable: self.immutable_flag(path),
        }))
    }
}

/// `lsattr -d` prints `<flags> <path>`; the `i` flag marks an immutable file.
fn parse_lsattr_flags(stdout: &str) -> Option<bool> {
    stdout
        .split_whitespace()
        .next()
        .map(|flags| flags.contains('i'))
}
