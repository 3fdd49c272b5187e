use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use glob::glob;
use tracing::debug;
use crate::error::{AuditError, Result};
use super::types::Checklist;

/// Reads checklist artifacts from disk. A directory is treated as a set of
/// `*.yaml` fragments merged in filename order.
pub struct ChecklistLoader;

impl ChecklistLoader {
    pub fn new() -> Self {
        Self
    }

    pub fn load(&self, path: impl AsRef<Path>) -> Result<Checklist> {
        let path = path.as_ref();
        if path.is_dir() {
            self.load_dir(path)
        } else {
            self.load_file(path)
        }
    }

    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<Checklist> {
        let checklist = self.read_file(path.as_ref())?;
        checklist.validated()
    }

    pub fn load_dir(&self, path: impl AsRef<Path>) -> Result<Checklist> {
        let pattern = path.as_ref().join("*.yaml");
        let pattern_str = pattern.to_string_lossy();

        let mut yaml_files: Vec<PathBuf> = glob(&pattern_str)
            .map_err(|e| AuditError::InvalidChecklist(e.to_string()))?
            .filter_map(|r| r.ok())
            .collect();
        yaml_files.sort();

        if yaml_files.is_empty() {
            return Err(AuditError::ChecklistNotFound(pattern_str.into_owned()));
        }

        let mut merged = Checklist::default();
        for yaml_path in &yaml_files {
            merged = merged.merge(self.read_file(yaml_path)?);
        }

        merged.validated()
    }

    fn read_file(&self, path: &Path) -> Result<Checklist> {
        debug!("Loading checklist from {}", path.display());

        let content = fs::read_to_string(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => AuditError::ChecklistNotFound(path.display().to_string()),
            _ => AuditError::Io(e),
        })?;

        serde_yaml::from_str(&content).map_err(|e| {
            AuditError::InvalidChecklist(format!("{}: {}", path.display(), e))
        })
    }

}

impl Default for ChecklistLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const BASE: &str = r#"
entries:
  - path: /etc/passwd
    mode: "644"
    owner: root
    group: root
"#;

    const EXTRA: &str = r#"
credential_file: /srv/passwd
entries:
  - path: /etc/shadow
    mode: "640"
    owner: root
    group: shadow
"#;

    #[test]
    fn test_load_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("base.yaml");
        fs::write(&path, BASE).unwrap();

        let checklist = ChecklistLoader::new().load(&path).unwrap();
        assert_eq!(checklist.len(), 1);
        assert_eq!(checklist.entries()[0].expected_mode.bits(), 0o644);
    }

    #[test]
    fn test_load_dir_merges_in_name_order() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("20-extra.yaml"), EXTRA).unwrap();
        fs::write(dir.path().join("10-base.yaml"), BASE).unwrap();

        let checklist = ChecklistLoader::new().load(dir.path()).unwrap();
        assert_eq!(checklist.len(), 2);
        assert_eq!(checklist.entries()[0].path, PathBuf::from("/etc/passwd"));
        assert_eq!(checklist.entries()[1].path, PathBuf::from("/etc/shadow"));
        assert_eq!(checklist.credential_file(), Path::new("/srv/passwd"));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = ChecklistLoader::new().load(dir.path().join("nope.yaml")).unwrap_err();
        assert!(matches!(err, AuditError::ChecklistNotFound(_)));
    }

    #[test]
    fn test_load_empty_dir() {
        let dir = TempDir::new().unwrap();
        let err = ChecklistLoader::new().load(dir.path()).unwrap_err();
        assert!(matches!(err, AuditError::ChecklistNotFound(_)));
    }

    #[test]
    fn test_load_rejects_duplicates_across_files() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.yaml"), BASE).unwrap();
        fs::write(dir.path().join("b.yaml"), BASE).unwrap();

        let err = ChecklistLoader::new().load(dir.path()).unwrap_err();
        assert!(err.to_string().contains("Duplicate"));
    }

    #[test]
    fn test_load_rejects_bad_mode() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.yaml");
        fs::write(&path, "entries:\n  - path: /etc/passwd\n    mode: \"rw\"\n    owner: root\n    group: root\n").unwrap();

        let err = ChecklistLoader::new().load(&path).unwrap_err();
        assert!(matches!(err, AuditError::InvalidChecklist(_)));
    }
}
