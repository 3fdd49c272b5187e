mod analyzer;
mod size;

use tabled::Tabled;

pub use analyzer::{DirectoryAnalyzer, DirectoryStats, ExtensionCount, FileEntry, StatsReport, NO_EXTENSION};
pub use size::human_size;

#[derive(Debug, Clone, Tabled)]
pub struct ExtensionTableRow {
    #[tabled(rename = "Extension")]
    pub extension: String,
    #[tabled(rename = "Count")]
    pub count: u64,
    #[tabled(rename = "Percentage")]
    pub percentage: String,
}

impl From<&ExtensionCount> for ExtensionTableRow {
    fn from(ext: &ExtensionCount) -> Self {
        Self {
            extension: ext.extension.clone(),
            count: ext.count,
            percentage: format!("{:.2}%", ext.percentage),
        }
    }
}

#[derive(Debug, Clone, Tabled)]
pub struct LargestFileTableRow {
    #[tabled(rename = "Size")]
    pub size: String,
    #[tabled(rename = "Path")]
    pub path: String,
}

impl From<&FileEntry> for LargestFileTableRow {
    fn from(file: &FileEntry) -> Self {
        Self {
            size: human_size(file.size as f64),
            path: file.path.display().to_string(),
        }
    }
}
