//! Mission entity model and DTOs.

use serde::{Deserialize, Serialize};

use crate::models::spy_cat::SpyCat;
use crate::models::target::{Target, TargetCreate};
use crate::types::{timestamp, DbId, Timestamp};

/// A mission as returned by `/api/missions/`.
///
/// `targets_count`, `completed_targets_count`, `progress_percentage` and
/// `is_all_targets_completed` are server-computed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mission {
    pub id: DbId,
    #[serde(default)]
    pub cat_id: Option<DbId>,
    pub complete: bool,
    #[serde(default)]
    pub targets: Vec<Target>,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub created_at: Timestamp,
    #[serde(default, deserialize_with = "timestamp::deserialize_option")]
    pub updated_at: Option<Timestamp>,
    #[serde(default)]
    pub targets_count: i64,
    #[serde(default)]
    pub completed_targets_count: i64,
    #[serde(default)]
    pub progress_percentage: f64,
    #[serde(default)]
    pub is_all_targets_completed: bool,
    #[serde(default)]
    pub cat: Option<SpyCat>,
}

/// DTO for creating a mission together with its targets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionCreate {
    pub targets: Vec<TargetCreate>,
}

/// Body of `POST /api/missions/{id}/assign`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignCat {
    pub cat_id: DbId,
}
