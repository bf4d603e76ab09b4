//! The backend contract consumed by the query layer.

use async_trait::async_trait;
use sca_core::models::{
    Mission, MissionCreate, SearchResults, SpyCat, SpyCatCreate, SpyCatFilters, SpyCatStats,
    SpyCatUpdate, Target, TargetCreate, TargetUpdate,
};
use sca_core::types::{DbId, TargetId};

use crate::error::ApiResult;

/// Every operation the dashboard performs against the backend.
///
/// Implementations perform no retries and surface every failure as an
/// [`ApiError`](crate::ApiError).
#[async_trait]
pub trait AgencyApi: Send + Sync {
    // ---- spy cats ----

    async fn list_spy_cats(&self, filters: &SpyCatFilters) -> ApiResult<Vec<SpyCat>>;

    async fn get_spy_cat(&self, id: DbId) -> ApiResult<SpyCat>;

    async fn create_spy_cat(&self, data: &SpyCatCreate) -> ApiResult<SpyCat>;

    /// Salary is the only field the backend lets a client update.
    async fn update_spy_cat(&self, id: DbId, data: &SpyCatUpdate) -> ApiResult<SpyCat>;

    async fn delete_spy_cat(&self, id: DbId) -> ApiResult<()>;

    async fn available_spy_cats(&self) -> ApiResult<Vec<SpyCat>>;

    async fn search_spy_cats(&self, query: &str) -> ApiResult<SearchResults>;

    async fn spy_cat_stats(&self) -> ApiResult<SpyCatStats>;

    // ---- missions ----

    async fn list_missions(&self) -> ApiResult<Vec<Mission>>;

    async fn get_mission(&self, id: DbId) -> ApiResult<Mission>;

    async fn create_mission(&self, data: &MissionCreate) -> ApiResult<Mission>;

    async fn assign_cat(&self, mission_id: DbId, cat_id: DbId) -> ApiResult<Mission>;

    async fn complete_mission(&self, id: DbId) -> ApiResult<Mission>;

    async fn delete_mission(&self, id: DbId) -> ApiResult<()>;

    // ---- targets ----

    async fn list_targets(&self, mission_id: Option<DbId>) -> ApiResult<Vec<Target>>;

    async fn get_target(&self, id: &TargetId) -> ApiResult<Target>;

    async fn create_target(&self, data: &TargetCreate) -> ApiResult<Target>;

    async fn update_target(&self, id: &TargetId, data: &TargetUpdate) -> ApiResult<Target>;

    async fn update_target_notes(&self, id: &TargetId, notes: &str) -> ApiResult<Target>;

    async fn complete_target(&self, id: &TargetId) -> ApiResult<Target>;

    async fn delete_target(&self, id: &TargetId) -> ApiResult<()>;
}
