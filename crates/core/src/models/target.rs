//! Target entity model and DTOs.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::types::{deserialize_optional_id, timestamp, DbId, TargetId, Timestamp};

/// A mission target as returned by `/api/targets/`.
///
/// Name and country are fixed once created; only notes and the completion
/// flag change afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Target {
    pub id: TargetId,
    pub name: String,
    pub country: String,
    #[serde(default)]
    pub notes: Option<String>,
    pub complete: bool,
    #[serde(
        default,
        alias = "mission",
        deserialize_with = "deserialize_optional_id"
    )]
    pub mission_id: Option<DbId>,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub created_at: Timestamp,
    #[serde(default, deserialize_with = "timestamp::deserialize_option")]
    pub updated_at: Option<Timestamp>,
}

/// DTO for a new target, either inline in a mission or standalone with a
/// `mission_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct TargetCreate {
    #[validate(custom(function = "crate::validation::rules::check_target_name"))]
    pub name: String,
    #[validate(custom(function = "crate::validation::rules::check_country"))]
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 1000, message = "Notes too long"))]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mission_id: Option<DbId>,
}

impl TargetCreate {
    pub fn new(name: impl Into<String>, country: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            country: country.into(),
            notes: None,
            mission_id: None,
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn for_mission(mut self, mission_id: DbId) -> Self {
        self.mission_id = Some(mission_id);
        self
    }
}

/// DTO for updating a target's notes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct TargetUpdate {
    #[validate(custom(function = "crate::validation::rules::check_notes_update"))]
    pub notes: String,
}
