use crate::validation::rules::{FieldViolation, RULE_DUPLICATE_TARGET_NAME};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CoreError {
    /// Input rejected before any network call. Holds one violation per
    /// offending field, ordered by field name.
    #[error("Validation failed: {}", summarize(.0))]
    Validation(Vec<FieldViolation>),
}

impl CoreError {
    /// Field-scoped violations carried by this error.
    pub fn violations(&self) -> &[FieldViolation] {
        match self {
            CoreError::Validation(violations) => violations,
        }
    }

    /// Message for a given field, if that field failed.
    pub fn message_for(&self, field: &str) -> Option<&str> {
        self.violations()
            .iter()
            .find(|v| v.field == field)
            .map(|v| v.message.as_str())
    }

    /// True when mission targets were rejected for sharing a name.
    pub fn is_duplicate_target_name(&self) -> bool {
        self.violations()
            .iter()
            .any(|v| v.rule == RULE_DUPLICATE_TARGET_NAME)
    }
}

fn summarize(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(|v| format!("{}: {}", v.field, v.message))
        .collect::<Vec<_>>()
        .join("; ")
}
