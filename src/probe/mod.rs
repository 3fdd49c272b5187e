mod accounts;
mod state;
mod system;

use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use crate::checklist::FileMode;
use crate::error::{AuditError, Result};

pub use accounts::{current_group_name, current_user_name, group_name, lookup_gid, lookup_uid, user_name};
pub use state::{FileSnapshot, FileState};
pub use system::SystemProbe;

/// Reads the current state of one path. Implementations must not mutate
/// the filesystem.
pub trait FileStateProbe {
    fn probe(&self, path: &Path) -> Result<FileState>;
}

/// In-memory probe returning fixed states; unknown paths are `Missing`.
#[derive(Debug, Default)]
pub struct MockProbe {
    states: HashMap<PathBuf, FileState>,
    denied: HashSet<PathBuf>,
}

impl MockProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(
        mut self,
        path: impl Into<PathBuf>,
        mode: FileMode,
        owner: impl Into<String>,
        group: impl Into<String>,
    ) -> Self {
        self.states.insert(
            path.into(),
            FileState::Present(FileSnapshot {
                mode,
                owner: owner.into(),
                group: group.into(),
                immutable: None,
            }),
        );
        self
    }

    pub fn with_state(mut self, path: impl Into<PathBuf>, state: FileState) -> Self {
        self.states.insert(path.into(), state);
        self
    }

    /// Probing `path` fails with a permission error.
    pub fn with_probe_error(mut self, path: impl Into<PathBuf>) -> Self {
        self.denied.insert(path.into());
        self
    }
}

impl FileStateProbe for MockProbe {
    fn probe(&self, path: &Path) -> Result<FileState> {
        if self.denied.contains(path) {
            return Err(AuditError::Probe {
                path: path.to_path_buf(),
                source: io::Error::from(io::ErrorKind::PermissionDenied),
            });
        }
        Ok(self.states.get(path).cloned().unwrap_or(FileState::Missing))
    }
}
