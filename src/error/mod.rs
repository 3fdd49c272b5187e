use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuditError {
    #[error("Cannot probe {path}: {source}")]
    Probe {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid mode '{0}': expected an octal permission triple such as 644")]
    InvalidMode(String),

    #[error("Invalid checklist: {0}")]
    InvalidChecklist(String),

    #[error("Checklist not found: {0}")]
    ChecklistNotFound(String),

    #[error("No writable audit log location (tried {primary} and {fallback})")]
    LogUnavailable { primary: PathBuf, fallback: PathBuf },

    #[error("Remediation requires root privileges (effective uid {0})")]
    PrivilegeRequired(u32),

    #[error("Directory error: {0}")]
    Directory(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AuditError>;
