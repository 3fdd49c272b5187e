mod types;
mod loader;
mod validator;

use tabled::Tabled;

pub use types::{Checklist, ChecklistEntry, FileMode, DEFAULT_CREDENTIAL_FILE};
pub use loader::ChecklistLoader;
pub use validator::{ChecklistValidator, ValidationResult, ValidationError, ValidationWarning};

#[derive(Debug, Clone, Tabled)]
pub struct ChecklistTableRow {
    #[tabled(rename = "Path")]
    pub path: String,
    #[tabled(rename = "Mode")]
    pub mode: String,
    #[tabled(rename = "Owner")]
    pub owner: String,
    #[tabled(rename = "Group")]
    pub group: String,
}

impl From<&ChecklistEntry> for ChecklistTableRow {
    fn from(entry: &ChecklistEntry) -> Self {
        Self {
            path: entry.path.display().to_string(),
            mode: entry.expected_mode.to_string(),
            owner: entry.expected_owner.clone(),
            group: entry.expected_group.clone(),
        }
    }
}
