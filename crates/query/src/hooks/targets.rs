use std::sync::Arc;

use sca_core::models::{Target, TargetCreate, TargetUpdate};
use sca_core::types::{DbId, TargetId};
use sca_core::validation::{validate_target_create, validate_target_update};

use crate::config::QueryOptions;
use crate::error::AgencyResult;
use crate::hooks::Agency;
use crate::key::target_keys;
use crate::store::CacheEffect;

/// Target reads and writes.
///
/// Every target mutation invalidates all target lists: which mission a
/// target belongs to is not reliably known on the client.
pub struct TargetHooks<'a> {
    agency: &'a Agency,
}

fn seed_and_refresh_lists(target: &Target) -> Vec<CacheEffect> {
    vec![
        CacheEffect::seed(target_keys::detail(&target.id), target.clone()),
        CacheEffect::Invalidate(target_keys::lists()),
    ]
}

impl<'a> TargetHooks<'a> {
    pub(crate) fn new(agency: &'a Agency) -> Self {
        Self { agency }
    }

    /// All targets, or those of one mission.
    pub async fn list(&self, mission_id: Option<DbId>) -> AgencyResult<Arc<Vec<Target>>> {
        let options = QueryOptions::new(self.agency.stale_times().targets);
        self.agency
            .query(target_keys::list(mission_id), options, move |api| async move {
                api.list_targets(mission_id).await
            })
            .await
    }

    /// One target by id.
    pub async fn detail(&self, id: &TargetId) -> AgencyResult<Arc<Target>> {
        let options = QueryOptions::new(self.agency.stale_times().targets);
        let id = id.clone();
        self.agency
            .query(target_keys::detail(&id), options, move |api| {
                let id = id.clone();
                async move { api.get_target(&id).await }
            })
            .await
    }

    /// Add a target to an existing mission.
    pub async fn create(&self, input: TargetCreate) -> AgencyResult<Target> {
        let input = validate_target_create(input)?;
        self.agency
            .mutation(
                self.agency.api().create_target(&input),
                seed_and_refresh_lists,
                |target: &Target| format!("Target {} has been created!", target.name),
                "Failed to create target",
            )
            .await
    }

    pub async fn update(&self, id: &TargetId, input: TargetUpdate) -> AgencyResult<Target> {
        let input = validate_target_update(input)?;
        self.agency
            .mutation(
                self.agency.api().update_target(id, &input),
                seed_and_refresh_lists,
                |_: &Target| "Target updated successfully!".to_string(),
                "Failed to update target",
            )
            .await
    }

    /// Replace a target's notes through the dedicated notes endpoint.
    pub async fn update_notes(&self, id: &TargetId, notes: &str) -> AgencyResult<Target> {
        let input = validate_target_update(TargetUpdate {
            notes: notes.to_string(),
        })?;
        self.agency
            .mutation(
                self.agency.api().update_target_notes(id, &input.notes),
                seed_and_refresh_lists,
                |_: &Target| "Target notes updated successfully!".to_string(),
                "Failed to update target notes",
            )
            .await
    }

    /// Mark a target eliminated.
    pub async fn complete(&self, id: &TargetId) -> AgencyResult<Target> {
        self.agency
            .mutation(
                self.agency.api().complete_target(id),
                seed_and_refresh_lists,
                |target: &Target| format!("Target {} marked as eliminated!", target.name),
                "Failed to complete target",
            )
            .await
    }

    /// Delete a target and drop its cached detail.
    pub async fn delete(&self, id: &TargetId) -> AgencyResult<()> {
        self.agency
            .mutation(
                self.agency.api().delete_target(id),
                |_: &()| {
                    vec![
                        CacheEffect::Remove(target_keys::detail(id)),
                        CacheEffect::Invalidate(target_keys::lists()),
                    ]
                },
                |_: &()| "Target deleted successfully".to_string(),
                "Failed to delete target",
            )
            .await
    }
}
