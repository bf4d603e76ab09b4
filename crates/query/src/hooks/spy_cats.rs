use std::sync::Arc;

use sca_core::models::{SearchResults, SpyCat, SpyCatCreate, SpyCatFilters, SpyCatStats, SpyCatUpdate};
use sca_core::types::DbId;
use sca_core::validation::{validate_filters, validate_spy_cat_create, validate_spy_cat_update};

use crate::config::QueryOptions;
use crate::error::AgencyResult;
use crate::hooks::Agency;
use crate::key::spy_cat_keys;
use crate::store::CacheEffect;

/// Agent reads and writes.
pub struct SpyCatHooks<'a> {
    agency: &'a Agency,
}

/// Everything derived from the agent roster: lists, stats, availability
/// and search results. Detail entries are handled per mutation.
fn roster_effects() -> Vec<CacheEffect> {
    vec![
        CacheEffect::Invalidate(spy_cat_keys::lists()),
        CacheEffect::Invalidate(spy_cat_keys::stats()),
        CacheEffect::Invalidate(spy_cat_keys::available()),
        CacheEffect::Invalidate(spy_cat_keys::searches()),
    ]
}

impl<'a> SpyCatHooks<'a> {
    pub(crate) fn new(agency: &'a Agency) -> Self {
        Self { agency }
    }

    // ---- queries ----

    /// Agents matching `filters`. Negative bounds are rejected before any request.
    pub async fn list(&self, filters: &SpyCatFilters) -> AgencyResult<Arc<Vec<SpyCat>>> {
        let filters = validate_filters(filters.clone())?;
        let options = QueryOptions::new(self.agency.stale_times().agents_list);
        self.agency
            .query(spy_cat_keys::list(&filters), options, move |api| {
                let filters = filters.clone();
                async move { api.list_spy_cats(&filters).await }
            })
            .await
    }

    /// One agent by id.
    pub async fn detail(&self, id: DbId) -> AgencyResult<Arc<SpyCat>> {
        let options = QueryOptions::new(self.agency.stale_times().agents_detail);
        self.agency
            .query(spy_cat_keys::detail(id), options, move |api| async move {
                api.get_spy_cat(id).await
            })
            .await
    }

    /// Agents with no active mission.
    pub async fn available(&self) -> AgencyResult<Arc<Vec<SpyCat>>> {
        let options = QueryOptions::new(self.agency.stale_times().agents_available);
        self.agency
            .query(spy_cat_keys::available(), options, |api| async move {
                api.available_spy_cats().await
            })
            .await
    }

    /// Agency-wide statistics.
    pub async fn stats(&self) -> AgencyResult<Arc<SpyCatStats>> {
        let options = QueryOptions::new(self.agency.stale_times().agents_stats);
        self.agency
            .query(spy_cat_keys::stats(), options, |api| async move {
                api.spy_cat_stats().await
            })
            .await
    }

    /// Search by free text. A blank query is disabled: it returns
    /// `Ok(None)` without touching the cache or the network.
    pub async fn search(&self, query: &str) -> AgencyResult<Option<Arc<SearchResults>>> {
        let query = query.trim().to_string();
        if query.is_empty() {
            return Ok(None);
        }
        let options = QueryOptions::new(self.agency.stale_times().agents_search);
        let results = self
            .agency
            .query(spy_cat_keys::search(&query), options, move |api| {
                let query = query.clone();
                async move { api.search_spy_cats(&query).await }
            })
            .await?;
        Ok(Some(results))
    }

    // ---- mutations ----

    /// Recruit an agent. The created agent is seeded at its detail key.
    pub async fn create(&self, input: SpyCatCreate) -> AgencyResult<SpyCat> {
        let input = validate_spy_cat_create(input)?;
        self.agency
            .mutation(
                self.agency.api().create_spy_cat(&input),
                |cat: &SpyCat| {
                    let mut effects = vec![CacheEffect::seed(spy_cat_keys::detail(cat.id), cat.clone())];
                    effects.extend(roster_effects());
                    effects
                },
                |cat: &SpyCat| format!("Agent {} has been successfully recruited!", cat.name),
                "Failed to create spy cat",
            )
            .await
    }

    /// Change an agent's salary.
    pub async fn update(&self, id: DbId, input: SpyCatUpdate) -> AgencyResult<SpyCat> {
        let input = validate_spy_cat_update(input)?;
        self.agency
            .mutation(
                self.agency.api().update_spy_cat(id, &input),
                |cat: &SpyCat| {
                    let mut effects = vec![CacheEffect::seed(spy_cat_keys::detail(cat.id), cat.clone())];
                    effects.extend(roster_effects());
                    effects
                },
                |cat: &SpyCat| format!("Agent {}'s salary has been updated!", cat.name),
                "Failed to update spy cat",
            )
            .await
    }

    /// Retire an agent.
    pub async fn delete(&self, id: DbId) -> AgencyResult<()> {
        self.agency
            .mutation(
                self.agency.api().delete_spy_cat(id),
                |_: &()| {
                    let mut effects = vec![CacheEffect::Remove(spy_cat_keys::detail(id))];
                    effects.extend(roster_effects());
                    effects
                },
                |_: &()| "Agent has been retired from service".to_string(),
                "Failed to delete spy cat",
            )
            .await
    }
}
