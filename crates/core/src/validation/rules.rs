//! Field rules shared by the form validators.
//!
//! Each `check_*` function reports only the first constraint its value
//! fails, so a field never carries more than one message.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::{ValidationError, ValidationErrors};

// ---------------------------------------------------------------------------
// Limits
// ---------------------------------------------------------------------------

/// Maximum length of names, breeds, target names and countries.
pub const MAX_NAME_LENGTH: usize = 100;

/// Maximum length of target notes.
pub const MAX_NOTES_LENGTH: usize = 1_000;

/// Upper bound of `years_of_experience`.
pub const MAX_EXPERIENCE_YEARS: i32 = 30;

/// Upper bound of an agent salary.
pub const MAX_SALARY: f64 = 10_000_000.0;

/// Number of targets a mission may be created with.
pub const MIN_TARGETS: usize = 1;
pub const MAX_TARGETS: usize = 3;

// ---------------------------------------------------------------------------
// Rule codes
// ---------------------------------------------------------------------------

pub const RULE_REQUIRED: &str = "required";
pub const RULE_MAX_LENGTH: &str = "max_length";
pub const RULE_PATTERN: &str = "pattern";
pub const RULE_MIN_VALUE: &str = "min_value";
pub const RULE_MAX_VALUE: &str = "max_value";
pub const RULE_DECIMALS: &str = "decimal_places";
pub const RULE_TARGET_COUNT: &str = "target_count";
pub const RULE_DUPLICATE_TARGET_NAME: &str = "duplicate_target_name";

/// Letters of any script and whitespace.
static AGENT_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\p{L}\s]+$").expect("valid regex"));

/// A single field-level rule violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    pub field: String,
    pub rule: String,
    pub message: String,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, rule: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            rule: rule.to_string(),
            message: message.into(),
        }
    }
}

fn violation(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Borrowed(message))
}

fn check_text(
    value: &str,
    required: &'static str,
    too_long: &'static str,
) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(violation(RULE_REQUIRED, required));
    }
    if value.chars().count() > MAX_NAME_LENGTH {
        return Err(violation(RULE_MAX_LENGTH, too_long));
    }
    Ok(())
}

/// Agent name: required, at most 100 characters, letters and spaces only.
pub fn check_agent_name(name: &str) -> Result<(), ValidationError> {
    check_text(name, "Name is required", "Name too long")?;
    if !AGENT_NAME_RE.is_match(name) {
        return Err(violation(
            RULE_PATTERN,
            "Name must contain only letters and spaces",
        ));
    }
    Ok(())
}

/// Breed: required, at most 100 characters.
pub fn check_breed(breed: &str) -> Result<(), ValidationError> {
    check_text(breed, "Breed is required", "Breed name too long")
}

/// Years of experience: 0 to 30 inclusive.
pub fn check_experience(years: i32) -> Result<(), ValidationError> {
    if years < 0 {
        return Err(violation(RULE_MIN_VALUE, "Experience cannot be negative"));
    }
    if years > MAX_EXPERIENCE_YEARS {
        return Err(violation(RULE_MAX_VALUE, "Maximum experience is 30 years"));
    }
    Ok(())
}

/// Salary: positive, at most the salary cap, and at most two decimals.
pub fn check_salary(salary: f64) -> Result<(), ValidationError> {
    if !salary.is_finite() || salary <= 0.0 {
        return Err(violation(RULE_MIN_VALUE, "Salary must be positive"));
    }
    if salary > MAX_SALARY {
        return Err(violation(RULE_MAX_VALUE, "Salary too high"));
    }
    if !has_at_most_two_decimals(salary) {
        return Err(violation(
            RULE_DECIMALS,
            "Salary must have at most 2 decimal places",
        ));
    }
    Ok(())
}

/// `value` is a whole number of cents, within float noise.
pub fn has_at_most_two_decimals(value: f64) -> bool {
    let cents = value * 100.0;
    (cents - cents.round()).abs() < 1e-6
}

/// Target name: required, at most 100 characters.
pub fn check_target_name(name: &str) -> Result<(), ValidationError> {
    check_text(name, "Target name is required", "Name too long")
}

/// Country: required, at most 100 characters.
pub fn check_country(country: &str) -> Result<(), ValidationError> {
    check_text(country, "Country is required", "Country too long")
}

/// Notes sent on an update: required, at most 1000 characters.
pub fn check_notes_update(notes: &str) -> Result<(), ValidationError> {
    if notes.is_empty() {
        return Err(violation(
            RULE_REQUIRED,
            "Notes are required when updating target information",
        ));
    }
    if notes.chars().count() > MAX_NOTES_LENGTH {
        return Err(violation(RULE_MAX_LENGTH, "Notes too long"));
    }
    Ok(())
}

/// Flatten `validator` output into one violation per field, sorted by
/// field name. `prefix` scopes nested fields, e.g. `targets[1]`.
pub fn collect_violations(errors: &ValidationErrors, prefix: Option<&str>) -> Vec<FieldViolation> {
    let mut violations: Vec<FieldViolation> = errors
        .field_errors()
        .into_iter()
        .filter_map(|(field, errs)| {
            let first = errs.first()?;
            let field = match prefix {
                Some(prefix) => format!("{prefix}.{field}"),
                None => field.to_string(),
            };
            let message = first
                .message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| first.code.to_string());
            Some(FieldViolation::new(field, &first.code, message))
        })
        .collect();
    violations.sort_by(|a, b| a.field.cmp(&b.field));
    violations
}
