use std::sync::Arc;

use sca_core::models::{Mission, MissionCreate};
use sca_core::types::DbId;
use sca_core::validation::validate_mission_create;

use crate::config::QueryOptions;
use crate::error::AgencyResult;
use crate::hooks::Agency;
use crate::key::{mission_keys, target_keys};
use crate::store::CacheEffect;

/// Mission reads and writes.
pub struct MissionHooks<'a> {
    agency: &'a Agency,
}

/// Seed the returned mission and mark every mission list stale.
fn seed_and_refresh_lists(mission: &Mission) -> Vec<CacheEffect> {
    vec![
        CacheEffect::seed(mission_keys::detail(mission.id), mission.clone()),
        CacheEffect::Invalidate(mission_keys::lists()),
    ]
}

impl<'a> MissionHooks<'a> {
    pub(crate) fn new(agency: &'a Agency) -> Self {
        Self { agency }
    }

    /// Every mission with its targets.
    pub async fn list(&self) -> AgencyResult<Arc<Vec<Mission>>> {
        let options = QueryOptions::new(self.agency.stale_times().missions);
        self.agency
            .query(mission_keys::list(), options, |api| async move {
                api.list_missions().await
            })
            .await
    }

    /// One mission by id.
    pub async fn detail(&self, id: DbId) -> AgencyResult<Arc<Mission>> {
        let options = QueryOptions::new(self.agency.stale_times().missions);
        self.agency
            .query(mission_keys::detail(id), options, move |api| async move {
                api.get_mission(id).await
            })
            .await
    }

    /// Create a mission with its targets. Target names are checked for
    /// duplicates before anything is sent.
    pub async fn create(&self, input: MissionCreate) -> AgencyResult<Mission> {
        let input = validate_mission_create(input)?;
        self.agency
            .mutation(
                self.agency.api().create_mission(&input),
                |_: &Mission| {
                    vec![
                        CacheEffect::Invalidate(mission_keys::all()),
                        CacheEffect::Invalidate(target_keys::lists()),
                    ]
                },
                |mission: &Mission| format!("Mission created with {} targets!", mission.targets.len()),
                "Failed to create mission",
            )
            .await
    }

    /// Assign an agent to a mission.
    pub async fn assign_cat(&self, mission_id: DbId, cat_id: DbId) -> AgencyResult<Mission> {
        self.agency
            .mutation(
                self.agency.api().assign_cat(mission_id, cat_id),
                seed_and_refresh_lists,
                |_: &Mission| "Agent assigned to mission successfully!".to_string(),
                "Failed to assign agent to mission",
            )
            .await
    }

    /// Mark a mission complete. Completion cannot be undone.
    pub async fn complete(&self, id: DbId) -> AgencyResult<Mission> {
        self.agency
            .mutation(
                self.agency.api().complete_mission(id),
                seed_and_refresh_lists,
                |_: &Mission| "Mission completed successfully!".to_string(),
                "Failed to complete mission",
            )
            .await
    }

    /// Delete a mission and drop its cached detail.
    pub async fn delete(&self, id: DbId) -> AgencyResult<()> {
        self.agency
            .mutation(
                self.agency.api().delete_mission(id),
                |_: &()| {
                    vec![
                        CacheEffect::Remove(mission_keys::detail(id)),
                        CacheEffect::Invalidate(mission_keys::lists()),
                    ]
                },
                |_: &()| "Mission deleted successfully".to_string(),
                "Failed to delete mission",
            )
            .await
    }
}
