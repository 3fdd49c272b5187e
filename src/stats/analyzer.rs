use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use serde::Serialize;
use tracing::{debug, warn};
use walkdir::WalkDir;
use crate::error::{AuditError, Result};
use super::size::human_size;

pub const NO_EXTENSION: &str = "(none)";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileEntry {
    pub path: PathBuf,
    pub size: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtensionCount {
    pub extension: String,
    pub count: u64,
    pub percentage: f64,
}

/// Aggregates from one walk. `total_files` counts every non-directory
/// entry; sizes and extensions only cover regular files.
#[derive(Debug, Clone, Default)]
pub struct DirectoryStats {
    pub root: PathBuf,
    pub total_files: u64,
    pub total_directories: u64,
    pub total_size: u64,
    pub skipped: u64,
    pub extensions: BTreeMap<String, u64>,
    pub files: Vec<FileEntry>,
}

impl DirectoryStats {
    pub fn is_empty(&self) -> bool {
        self.total_files == 0
    }

    pub fn average_file_size(&self) -> Option<f64> {
        if self.total_files == 0 {
            None
        } else {
            Some(self.total_size as f64 / self.total_files as f64)
        }
    }

    /// Largest first; equal sizes ordered by path.
    pub fn top_files(&self, n: usize) -> Vec<&FileEntry> {
        let mut files: Vec<&FileEntry> = self.files.iter().collect();
        files.sort_by(|a, b| b.size.cmp(&a.size).then_with(|| a.path.cmp(&b.path)));
        files.truncate(n);
        files
    }

    /// Most frequent first; equal counts ordered by extension.
    pub fn top_extensions(&self, n: usize) -> Vec<ExtensionCount> {
        let mut counts: Vec<(&String, &u64)> = self.extensions.iter().collect();
        counts.sort_by_key(|(ext, count)| (Reverse(**count), ext.to_string()));

        counts
            .into_iter()
            .take(n)
            .map(|(ext, count)| ExtensionCount {
                extension: ext.clone(),
                count: *count,
                percentage: self.percentage_of_files(*count),
            })
            .collect()
    }

    pub fn percentage_of_files(&self, count: u64) -> f64 {
        if self.total_files == 0 {
            0.0
        } else {
            count as f64 * 100.0 / self.total_files as f64
        }
    }

    pub fn report(&self, top_n: usize) -> StatsReport {
        StatsReport {
            root: self.root.clone(),
            total_files: self.total_files,
            total_directories: self.total_directories,
            total_size: self.total_size,
            total_size_human: human_size(self.total_size as f64),
            average_file_size: self.average_file_size(),
            skipped: self.skipped,
            top_extensions: self.top_extensions(top_n),
            largest_files: self.top_files(top_n).into_iter().cloned().collect(),
        }
    }
}

/// Serializable summary for YAML/JSON output.
#[derive(Debug, Clone, Serialize)]
pub struct StatsReport {
    pub root: PathBuf,
    pub total_files: u64,
    pub total_directories: u64,
    pub total_size: u64,
    pub total_size_human: String,
    pub average_file_size: Option<f64>,
    pub skipped: u64,
    pub top_extensions: Vec<ExtensionCount>,
    pub largest_files: Vec<FileEntry>,
}

pub struct DirectoryAnalyzer {
    root: PathBuf,
}

impl DirectoryAnalyzer {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn validate(&self) -> Result<()> {
        if !self.root.exists() {
            return Err(AuditError::Directory(format!(
                "'{}' does not exist",
                self.root.display()
            )));
        }

        if !self.root.is_dir() {
            return Err(AuditError::Directory(format!(
                "'{}' is not a directory",
                self.root.display()
            )));
        }

        fs::read_dir(&self.root).map_err(|e| {
            AuditError::Directory(format!("cannot read '{}': {}", self.root.display(), e))
        })?;

        Ok(())
    }

    /// Walks the tree without following symlinks. Unreadable entries are
    /// skipped and counted.
    pub fn analyze(&self) -> Result<DirectoryStats> {
        self.validate()?;

        let mut stats = DirectoryStats {
            root: self.root.clone(),
            ..DirectoryStats::default()
        };

        for entry in WalkDir::new(&self.root).min_depth(1) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    debug!("Skipping unreadable entry: {}", e);
                    stats.skipped += 1;
                    continue;
                }
            };

            let file_type = entry.file_type();

            // A symlink to a directory is listed as a directory but not descended into.
            if file_type.is_dir() || (file_type.is_symlink() && entry.path().is_dir()) {
                stats.total_directories += 1;
                continue;
            }

            stats.total_files += 1;

            if !file_type.is_file() {
                continue;
            }

            let size = match entry.metadata() {
                Ok(metadata) => metadata.len(),
                Err(e) => {
                    debug!("Cannot stat {}: {}", entry.path().display(), e);
                    stats.skipped += 1;
                    continue;
                }
            };

            stats.total_size += size;
            *stats.extensions.entry(extension_key(entry.path())).or_insert(0) += 1;
            stats.files.push(FileEntry {
                path: entry.into_path(),
                size,
            });
        }

        if stats.skipped > 0 {
            warn!("Skipped {} entries with insufficient permissions", stats.skipped);
        }

        Ok(stats)
    }
}

fn extension_key(path: &Path) -> String {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
        .unwrap_or_else(|| NO_EXTENSION.to_string())
}
