//! Shared test fixtures: an in-memory [`AgencyApi`] that counts calls,
//! can fail on demand and can hold requests in flight.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use sca_client::{AgencyApi, ApiError, ApiResult};
use sca_core::models::{
    Mission, MissionCreate, SearchResults, SpyCat, SpyCatCreate, SpyCatFilters, SpyCatStats,
    SpyCatUpdate, Target, TargetCreate, TargetUpdate,
};
use sca_core::types::{DbId, TargetId};
use sca_query::{Agency, AgencyConfig, QueryClientConfig};

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

pub fn cat(id: DbId, name: &str, salary: f64) -> SpyCat {
    SpyCat {
        id,
        name: name.to_string(),
        years_of_experience: 3,
        breed: "Siamese".to_string(),
        salary,
        created_at: Utc::now(),
        updated_at: None,
        active_missions_count: 0,
        total_missions_count: 0,
        success_rate: 0.0,
        is_available: Some(true),
    }
}

pub fn target(id: &str, name: &str, mission_id: Option<DbId>) -> Target {
    Target {
        id: TargetId::from(id),
        name: name.to_string(),
        country: "FR".to_string(),
        notes: None,
        complete: false,
        mission_id,
        created_at: Utc::now(),
        updated_at: None,
    }
}

pub fn mission(id: DbId, targets: Vec<Target>) -> Mission {
    Mission {
        id,
        cat_id: None,
        complete: false,
        targets_count: targets.len() as i64,
        targets,
        created_at: Utc::now(),
        updated_at: None,
        completed_targets_count: 0,
        progress_percentage: 0.0,
        is_all_targets_completed: false,
        cat: None,
    }
}

fn not_found(what: &str) -> ApiError {
    ApiError::RequestFailed {
        status: 404,
        message: Some(format!("{what} not found")),
    }
}

// ---------------------------------------------------------------------------
// FakeApi
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct FakeApi {
    pub cats: Mutex<Vec<SpyCat>>,
    pub missions: Mutex<Vec<Mission>>,
    pub targets: Mutex<Vec<Target>>,
    pub created_cats: Mutex<Vec<SpyCatCreate>>,
    calls: Mutex<HashMap<&'static str, usize>>,
    failures: Mutex<VecDeque<ApiError>>,
    latency: Mutex<Duration>,
    next_id: AtomicI64,
}

impl FakeApi {
    pub fn new() -> Self {
        Self {
            next_id: AtomicI64::new(100),
            ..Default::default()
        }
    }

    pub fn with_cats(self, cats: Vec<SpyCat>) -> Self {
        *self.cats.lock().unwrap() = cats;
        self
    }

    pub fn with_missions(self, missions: Vec<Mission>) -> Self {
        *self.missions.lock().unwrap() = missions;
        self
    }

    pub fn with_targets(self, targets: Vec<Target>) -> Self {
        *self.targets.lock().unwrap() = targets;
        self
    }

    /// Hold every request in flight for `latency` before answering.
    pub fn with_latency(self, latency: Duration) -> Self {
        *self.latency.lock().unwrap() = latency;
        self
    }

    /// Make the next request fail with `error`. Queued failures are
    /// consumed one per request.
    pub fn fail_next(&self, error: ApiError) {
        self.failures.lock().unwrap().push_back(error);
    }

    pub fn calls(&self, method: &str) -> usize {
        self.calls.lock().unwrap().get(method).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }

    async fn enter(&self, method: &'static str) -> ApiResult<()> {
        *self.calls.lock().unwrap().entry(method).or_insert(0) += 1;
        let latency = *self.latency.lock().unwrap();
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
        match self.failures.lock().unwrap().pop_front() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn next_id(&self) -> DbId {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    fn update_target_with(&self, id: &TargetId, f: impl FnOnce(&mut Target)) -> ApiResult<Target> {
        let mut targets = self.targets.lock().unwrap();
        let target = targets
            .iter_mut()
            .find(|t| &t.id == id)
            .ok_or_else(|| not_found("Target"))?;
        f(target);
        target.updated_at = Some(Utc::now());
        Ok(target.clone())
    }

    fn update_mission_with(&self, id: DbId, f: impl FnOnce(&mut Mission) -> ApiResult<()>) -> ApiResult<Mission> {
        let mut missions = self.missions.lock().unwrap();
        let mission = missions
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| not_found("Mission"))?;
        f(mission)?;
        mission.updated_at = Some(Utc::now());
        Ok(mission.clone())
    }
}

#[async_trait]
impl AgencyApi for FakeApi {
    async fn list_spy_cats(&self, filters: &SpyCatFilters) -> ApiResult<Vec<SpyCat>> {
        self.enter("list_spy_cats").await?;
        let cats = self.cats.lock().unwrap().clone();
        Ok(cats
            .into_iter()
            .filter(|c| filters.breed.as_ref().map_or(true, |b| &c.breed == b))
            .collect())
    }

    async fn get_spy_cat(&self, id: DbId) -> ApiResult<SpyCat> {
        self.enter("get_spy_cat").await?;
        self.cats
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or_else(|| not_found("Cat"))
    }

    async fn create_spy_cat(&self, data: &SpyCatCreate) -> ApiResult<SpyCat> {
        self.enter("create_spy_cat").await?;
        self.created_cats.lock().unwrap().push(data.clone());
        let mut created = cat(self.next_id(), &data.name, data.salary);
        created.breed = data.breed.clone();
        created.years_of_experience = data.years_of_experience;
        self.cats.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn update_spy_cat(&self, id: DbId, data: &SpyCatUpdate) -> ApiResult<SpyCat> {
        self.enter("update_spy_cat").await?;
        let mut cats = self.cats.lock().unwrap();
        let cat = cats.iter_mut().find(|c| c.id == id).ok_or_else(|| not_found("Cat"))?;
        cat.salary = data.salary;
        cat.updated_at = Some(Utc::now());
        Ok(cat.clone())
    }

    async fn delete_spy_cat(&self, id: DbId) -> ApiResult<()> {
        self.enter("delete_spy_cat").await?;
        let mut cats = self.cats.lock().unwrap();
        let before = cats.len();
        cats.retain(|c| c.id != id);
        if cats.len() == before {
            return Err(not_found("Cat"));
        }
        Ok(())
    }

    async fn available_spy_cats(&self) -> ApiResult<Vec<SpyCat>> {
        self.enter("available_spy_cats").await?;
        let cats = self.cats.lock().unwrap().clone();
        Ok(cats.into_iter().filter(|c| c.is_available != Some(false)).collect())
    }

    async fn search_spy_cats(&self, query: &str) -> ApiResult<SearchResults> {
        self.enter("search_spy_cats").await?;
        let needle = query.to_lowercase();
        let cats: Vec<SpyCat> = self
            .cats
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.name.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        Ok(SearchResults {
            total_results: cats.len() as i64,
            cats,
            query: query.to_string(),
        })
    }

    async fn spy_cat_stats(&self) -> ApiResult<SpyCatStats> {
        self.enter("spy_cat_stats").await?;
        let cats = self.cats.lock().unwrap();
        let total = cats.len() as i64;
        let average = |f: fn(&SpyCat) -> f64| {
            if cats.is_empty() {
                0.0
            } else {
                cats.iter().map(f).sum::<f64>() / cats.len() as f64
            }
        };
        Ok(SpyCatStats {
            total_cats: total,
            cats_with_active_missions: 0,
            available_cats: total,
            average_experience: average(|c| c.years_of_experience as f64),
            average_salary: average(|c| c.salary),
            most_common_breed: cats.first().map(|c| c.breed.clone()),
            success_rate: None,
        })
    }

    async fn list_missions(&self) -> ApiResult<Vec<Mission>> {
        self.enter("list_missions").await?;
        Ok(self.missions.lock().unwrap().clone())
    }

    async fn get_mission(&self, id: DbId) -> ApiResult<Mission> {
        self.enter("get_mission").await?;
        self.missions
            .lock()
            .unwrap()
            .iter()
            .find(|m| m.id == id)
            .cloned()
            .ok_or_else(|| not_found("Mission"))
    }

    async fn create_mission(&self, data: &MissionCreate) -> ApiResult<Mission> {
        self.enter("create_mission").await?;
        let id = self.next_id();
        let targets = data
            .targets
            .iter()
            .map(|t| {
                let mut created = target(&self.next_id().to_string(), &t.name, Some(id));
                created.country = t.country.clone();
                created.notes = t.notes.clone();
                created
            })
            .collect();
        let created = mission(id, targets);
        self.missions.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn assign_cat(&self, mission_id: DbId, cat_id: DbId) -> ApiResult<Mission> {
        self.enter("assign_cat").await?;
        self.update_mission_with(mission_id, |m| {
            m.cat_id = Some(cat_id);
            Ok(())
        })
    }

    async fn complete_mission(&self, id: DbId) -> ApiResult<Mission> {
        self.enter("complete_mission").await?;
        self.update_mission_with(id, |m| {
            if m.complete {
                return Err(ApiError::RequestFailed {
                    status: 400,
                    message: Some("Mission already completed".into()),
                });
            }
            m.complete = true;
            Ok(())
        })
    }

    async fn delete_mission(&self, id: DbId) -> ApiResult<()> {
        self.enter("delete_mission").await?;
        self.missions.lock().unwrap().retain(|m| m.id != id);
        Ok(())
    }

    async fn list_targets(&self, mission_id: Option<DbId>) -> ApiResult<Vec<Target>> {
        self.enter("list_targets").await?;
        let targets = self.targets.lock().unwrap().clone();
        Ok(targets
            .into_iter()
            .filter(|t| mission_id.is_none() || t.mission_id == mission_id)
            .collect())
    }

    async fn get_target(&self, id: &TargetId) -> ApiResult<Target> {
        self.enter("get_target").await?;
        self.targets
            .lock()
            .unwrap()
            .iter()
            .find(|t| &t.id == id)
            .cloned()
            .ok_or_else(|| not_found("Target"))
    }

    async fn create_target(&self, data: &TargetCreate) -> ApiResult<Target> {
        self.enter("create_target").await?;
        let mut created = target(&format!("t-{}", self.next_id()), &data.name, data.mission_id);
        created.country = data.country.clone();
        created.notes = data.notes.clone();
        self.targets.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn update_target(&self, id: &TargetId, data: &TargetUpdate) -> ApiResult<Target> {
        self.enter("update_target").await?;
        self.update_target_with(id, |t| t.notes = Some(data.notes.clone()))
    }

    async fn update_target_notes(&self, id: &TargetId, notes: &str) -> ApiResult<Target> {
        self.enter("update_target_notes").await?;
        self.update_target_with(id, |t| t.notes = Some(notes.to_string()))
    }

    async fn complete_target(&self, id: &TargetId) -> ApiResult<Target> {
        self.enter("complete_target").await?;
        self.update_target_with(id, |t| t.complete = true)
    }

    async fn delete_target(&self, id: &TargetId) -> ApiResult<()> {
        self.enter("delete_target").await?;
        self.targets.lock().unwrap().retain(|t| &t.id != id);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Agency wiring
// ---------------------------------------------------------------------------

/// Query config with one retry and no backoff wait.
pub fn fast_config() -> AgencyConfig {
    AgencyConfig {
        query: QueryClientConfig {
            retry_delay: Duration::ZERO,
            ..Default::default()
        },
        ..Default::default()
    }
}

pub fn agency(api: FakeApi) -> (Agency, Arc<FakeApi>) {
    let api = Arc::new(api);
    let agency = Agency::new(api.clone(), fast_config());
    (agency, api)
}
