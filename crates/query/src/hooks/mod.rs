//! Per-resource query and mutation hooks.
//!
//! [`Agency`] owns the API handle, one [`QueryClient`] and one
//! [`Notifier`]. The handles returned by [`Agency::spy_cats`],
//! [`Agency::missions`], [`Agency::targets`] and [`Agency::breeds`] borrow
//! it and expose the dashboard's reads and writes. Mutations validate
//! their input before any network call, apply their cache effects only on
//! success, and report the outcome to the notifier.

pub mod breeds;
pub mod missions;
pub mod spy_cats;
pub mod targets;

use std::future::Future;
use std::sync::Arc;

use sca_client::{AgencyApi, ApiResult};

use crate::config::{AgencyConfig, QueryOptions, StaleTimes};
use crate::error::AgencyResult;
use crate::key::QueryKey;
use crate::notifier::Notifier;
use crate::store::{CacheEffect, QueryClient};

pub use breeds::BreedHooks;
pub use missions::MissionHooks;
pub use spy_cats::SpyCatHooks;
pub use targets::TargetHooks;

pub struct Agency {
    api: Arc<dyn AgencyApi>,
    client: QueryClient,
    notifier: Notifier,
    stale_times: StaleTimes,
}

impl Agency {
    pub fn new(api: Arc<dyn AgencyApi>, config: AgencyConfig) -> Self {
        Self {
            api,
            client: QueryClient::new(config.query),
            notifier: Notifier::default(),
            stale_times: config.stale_times,
        }
    }

    pub fn client(&self) -> &QueryClient {
        &self.client
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn stale_times(&self) -> &StaleTimes {
        &self.stale_times
    }

    pub fn spy_cats(&self) -> SpyCatHooks<'_> {
        SpyCatHooks::new(self)
    }

    pub fn missions(&self) -> MissionHooks<'_> {
        MissionHooks::new(self)
    }

    pub fn targets(&self) -> TargetHooks<'_> {
        TargetHooks::new(self)
    }

    pub fn breeds(&self) -> BreedHooks<'_> {
        BreedHooks::new(self)
    }

    // ---- shared plumbing for the hook handles ----

    /// Read `key` through the cache, calling `fetch` with the API on a miss.
    pub(crate) async fn query<T, F, Fut>(
        &self,
        key: QueryKey,
        options: QueryOptions,
        fetch: F,
    ) -> AgencyResult<Arc<T>>
    where
        T: Send + Sync + 'static,
        F: Fn(Arc<dyn AgencyApi>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ApiResult<T>> + Send + 'static,
    {
        let api = Arc::clone(&self.api);
        let value = self
            .client
            .fetch_query(key, options, move || fetch(Arc::clone(&api)))
            .await?;
        Ok(value)
    }

    /// Run a mutation, apply `effects` on success and post the outcome.
    pub(crate) async fn mutation<T, Fut>(
        &self,
        call: Fut,
        effects: impl FnOnce(&T) -> Vec<CacheEffect>,
        on_success: impl FnOnce(&T) -> String,
        fallback: &str,
    ) -> AgencyResult<T>
    where
        Fut: Future<Output = ApiResult<T>>,
    {
        let result: AgencyResult<T> = self.client.mutate(call, effects).await.map_err(Into::into);
        self.notifier.observe(&result, on_success, fallback);
        result
    }

    pub(crate) fn api(&self) -> &dyn AgencyApi {
        self.api.as_ref()
    }
}
