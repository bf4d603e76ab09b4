use std::sync::Arc;

use sca_client::ApiError;
use sca_core::models::{fallback_breeds, Breed};

use crate::config::QueryOptions;
use crate::error::AgencyResult;
use crate::hooks::Agency;
use crate::key::breed_keys;

/// Breed reference list. The backend has no breeds endpoint, so the list
/// is served from [`fallback_breeds`], cached with the breeds staleness
/// window and never retried.
pub struct BreedHooks<'a> {
    agency: &'a Agency,
}

impl<'a> BreedHooks<'a> {
    pub(crate) fn new(agency: &'a Agency) -> Self {
        Self { agency }
    }

    /// The breed list. It never goes stale and is never retried.
    pub async fn list(&self) -> AgencyResult<Arc<Vec<Breed>>> {
        let options = QueryOptions::new(self.agency.stale_times().breeds).with_retry(0);
        self.agency
            .query(breed_keys::all(), options, |_api| async { Ok::<_, ApiError>(fallback_breeds()) })
            .await
    }
}
