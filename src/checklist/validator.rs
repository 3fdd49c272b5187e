use std::collections::HashSet;
use super::types::Checklist;

#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub code: &'static str,
    pub message: String,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| format!("[{}] {}", e.code, e.message))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

pub struct ChecklistValidator;

impl ChecklistValidator {
    pub fn validate(checklist: &Checklist) -> ValidationResult {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        Self::check_duplicate_paths(checklist, &mut errors);
        Self::check_absolute_paths(checklist, &mut errors);
        Self::check_ownership_names(checklist, &mut errors);
        Self::check_world_writable(checklist, &mut warnings);
        Self::check_empty(checklist, &mut warnings);

        ValidationResult { errors, warnings }
    }

    fn check_duplicate_paths(checklist: &Checklist, errors: &mut Vec<ValidationError>) {
        let mut seen = HashSet::new();
        for entry in checklist.entries() {
            if !seen.insert(&entry.path) {
                errors.push(ValidationError {
                    code: "E001",
                    message: format!("Duplicate entry for path {}", entry.path.display()),
                });
            }
        }
    }

    fn check_absolute_paths(checklist: &Checklist, errors: &mut Vec<ValidationError>) {
        for entry in checklist.entries() {
            if !entry.path.is_absolute() {
                errors.push(ValidationError {
                    code: "E002",
                    message: format!("Path {} must be absolute", entry.path.display()),
                });
            }
        }
    }

    fn check_ownership_names(checklist: &Checklist, errors: &mut Vec<ValidationError>) {
        for entry in checklist.entries() {
            if entry.expected_owner.trim().is_empty() {
                errors.push(ValidationError {
                    code: "E003",
                    message: format!("Entry {} has an empty owner", entry.path.display()),
                });
            }
            if entry.expected_group.trim().is_empty() {
                errors.push(ValidationError {
                    code: "E004",
                    message: format!("Entry {} has an empty group", entry.path.display()),
                });
            }
        }
    }

    fn check_world_writable(checklist: &Checklist, warnings: &mut Vec<ValidationWarning>) {
        for entry in checklist.entries() {
            if entry.expected_mode.is_world_writable() {
                warnings.push(ValidationWarning {
                    code: "W001",
                    message: format!(
                        "Entry {} expects world-writable mode {}",
                        entry.path.display(),
                        entry.expected_mode
                    ),
                });
            }
        }
    }

    fn check_empty(checklist: &Checklist, warnings: &mut Vec<ValidationWarning>) {
        if checklist.is_empty() {
            warnings.push(ValidationWarning {
                code: "W002",
                message: "Checklist has no entries".to_string(),
            });
        }
    }
}
