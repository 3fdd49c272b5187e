use crate::checklist::FileMode;

/// Attributes of a path that exists, captured at probe time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSnapshot {
    pub mode: FileMode,
    pub owner: String,
    pub group: String,
    /// `None` when the attribute could not be read (no `lsattr`, unsupported filesystem).
    pub immutable: Option<bool>,
}

impl FileSnapshot {
    pub fn ownership(&self) -> String {
        format!("{}:{}", self.owner, self.group)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileState {
    Missing,
    Present(FileSnapshot),
}

impl FileState {
    pub fn exists(&self) -> bool {
        matches!(self, FileState::Present(_))
    }

    pub fn snapshot(&self) -> Option<&FileSnapshot> {
        match self {
            FileState::Present(snapshot) => Some(snapshot),
            FileState::Missing => None,
        }
    }
}
