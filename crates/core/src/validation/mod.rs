//! Form validation.
//!
//! Every validator normalises its input (trims text fields), checks it,
//! and either returns the normalised payload or a
//! [`CoreError::Validation`] listing every offending field.

pub mod rules;

use std::collections::HashSet;

use validator::Validate;

use crate::error::CoreError;
use crate::models::{MissionCreate, SpyCatCreate, SpyCatFilters, SpyCatUpdate, TargetCreate, TargetUpdate};
use rules::{
    collect_violations, FieldViolation, MAX_TARGETS, MIN_TARGETS, RULE_DUPLICATE_TARGET_NAME,
    RULE_TARGET_COUNT,
};

fn run(input: &impl Validate, prefix: Option<&str>) -> Vec<FieldViolation> {
    match input.validate() {
        Ok(()) => Vec::new(),
        Err(errors) => collect_violations(&errors, prefix),
    }
}

fn finish<T>(value: T, violations: Vec<FieldViolation>) -> Result<T, CoreError> {
    if violations.is_empty() {
        Ok(value)
    } else {
        Err(CoreError::Validation(violations))
    }
}

/// Validate the agent recruitment form.
pub fn validate_spy_cat_create(input: SpyCatCreate) -> Result<SpyCatCreate, CoreError> {
    let normalized = SpyCatCreate {
        name: input.name.trim().to_string(),
        breed: input.breed.trim().to_string(),
        ..input
    };
    let violations = run(&normalized, None);
    finish(normalized, violations)
}

/// Validate the salary edit form.
pub fn validate_spy_cat_update(input: SpyCatUpdate) -> Result<SpyCatUpdate, CoreError> {
    let violations = run(&input, None);
    finish(input, violations)
}

/// Validate list filters before they are turned into a query string.
pub fn validate_filters(input: SpyCatFilters) -> Result<SpyCatFilters, CoreError> {
    let violations = run(&input, None);
    finish(input, violations)
}

fn normalize_target(target: TargetCreate) -> TargetCreate {
    let notes = target
        .notes
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty());
    TargetCreate {
        name: target.name.trim().to_string(),
        country: target.country.trim().to_string(),
        notes,
        mission_id: target.mission_id,
    }
}

/// Validate a standalone target form.
pub fn validate_target_create(input: TargetCreate) -> Result<TargetCreate, CoreError> {
    let normalized = normalize_target(input);
    let violations = run(&normalized, None);
    finish(normalized, violations)
}

/// Validate the notes edit form of an existing target.
pub fn validate_target_update(input: TargetUpdate) -> Result<TargetUpdate, CoreError> {
    let normalized = TargetUpdate {
        notes: input.notes.trim().to_string(),
    };
    let violations = run(&normalized, None);
    finish(normalized, violations)
}

/// Case- and whitespace-insensitive key used for target name uniqueness.
pub fn target_name_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Validate the mission creation form.
///
/// The target list must hold 1..=3 entries (reported on `targets`). A
/// target whose name repeats an earlier one fails on
/// `targets[i].name` with [`RULE_DUPLICATE_TARGET_NAME`], which takes
/// precedence over that field's other rules.
pub fn validate_mission_create(input: MissionCreate) -> Result<MissionCreate, CoreError> {
    let targets: Vec<TargetCreate> = input.targets.into_iter().map(normalize_target).collect();
    let mut violations = Vec::new();

    if targets.len() < MIN_TARGETS {
        violations.push(FieldViolation::new(
            "targets",
            RULE_TARGET_COUNT,
            "At least one target is required",
        ));
    } else if targets.len() > MAX_TARGETS {
        violations.push(FieldViolation::new(
            "targets",
            RULE_TARGET_COUNT,
            "Maximum 3 targets allowed",
        ));
    }

    let mut seen = HashSet::new();
    for (index, target) in targets.iter().enumerate() {
        let prefix = format!("targets[{index}]");
        let mut target_violations = run(target, Some(&prefix));

        if !seen.insert(target_name_key(&target.name)) {
            let field = format!("{prefix}.name");
            target_violations.retain(|v| v.field != field);
            target_violations.push(FieldViolation::new(
                field,
                RULE_DUPLICATE_TARGET_NAME,
                "Target names must be unique",
            ));
        }

        violations.extend(target_violations);
    }

    violations.sort_by(|a, b| a.field.cmp(&b.field));
    finish(MissionCreate { targets }, violations)
}
