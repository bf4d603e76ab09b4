//! `reqwest` implementation of [`AgencyApi`].

use std::time::Instant;

use async_trait::async_trait;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;

use sca_core::models::{
    AssignCat, Mission, MissionCreate, SearchResults, SpyCat, SpyCatCreate, SpyCatFilters,
    SpyCatStats, SpyCatUpdate, Target, TargetCreate, TargetUpdate,
};
use sca_core::types::{DbId, TargetId};

use crate::api::AgencyApi;
use crate::config::ClientConfig;
use crate::error::{server_message, ApiError, ApiResult};

/// HTTP client for one backend instance.
#[derive(Debug, Clone)]
pub struct HttpAgencyApi {
    client: reqwest::Client,
    api_url: String,
}

impl HttpAgencyApi {
    pub fn new(config: &ClientConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    /// Create an API client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, config: &ClientConfig) -> Self {
        Self {
            client,
            api_url: config.api_url.clone(),
        }
    }

    /// Base URL requests are sent to.
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    // ---- private helpers ----

    /// Send a request and return the response once its status is 2xx.
    ///
    /// Request and response are logged; the log lines never change the
    /// outcome.
    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&B>,
    ) -> ApiResult<reqwest::Response> {
        let url = format!("{}{}", self.api_url, path);
        tracing::debug!(method = %method, path, "API request");

        let mut request = self.client.request(method.clone(), &url);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let started = Instant::now();
        let response = request.send().await.map_err(|e| {
            tracing::error!(method = %method, path, error = %e, "API request error");
            ApiError::NetworkUnavailable(e.to_string())
        })?;

        let status = response.status();
        tracing::debug!(
            method = %method,
            path,
            status = status.as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "API response",
        );

        Self::ensure_success(response).await
    }

    /// Turn a non-2xx response into [`ApiError::RequestFailed`].
    async fn ensure_success(response: reqwest::Response) -> ApiResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let message = server_message(&body);
        tracing::warn!(
            status = status.as_u16(),
            message = message.as_deref().unwrap_or(""),
            "API response error",
        );
        Err(ApiError::RequestFailed {
            status: status.as_u16(),
            message,
        })
    }

    async fn parse<T: DeserializeOwned>(response: reqwest::Response) -> ApiResult<T> {
        response.json::<T>().await.map_err(|e| {
            if e.is_decode() {
                ApiError::InvalidResponse(e.to_string())
            } else {
                ApiError::NetworkUnavailable(e.to_string())
            }
        })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> ApiResult<T> {
        let response = self.send::<()>(Method::GET, path, query, None).await?;
        Self::parse(response).await
    }

    async fn with_body<B, T>(&self, method: Method, path: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.send(method, path, &[], Some(body)).await?;
        Self::parse(response).await
    }

    async fn patch_empty<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let response = self.send::<()>(Method::PATCH, path, &[], None).await?;
        Self::parse(response).await
    }

    async fn delete(&self, path: &str) -> ApiResult<()> {
        self.send::<()>(Method::DELETE, path, &[], None).await?;
        Ok(())
    }
}

/// Path of target `id`, optionally followed by `action`.
///
/// Target ids are server strings, so the id is percent-encoded as one
/// path segment.
fn target_path(id: &TargetId, action: Option<&str>) -> ApiResult<String> {
    let mut url = reqwest::Url::parse("http://localhost/")
        .map_err(|e| ApiError::Internal(format!("target path: {e}")))?;
    url.path_segments_mut()
        .map_err(|()| ApiError::Internal("target path: URL cannot be a base".into()))?
        .clear()
        .extend(["api", "targets", id.as_str()])
        .extend(action);
    Ok(url.path().to_string())
}

#[async_trait]
impl AgencyApi for HttpAgencyApi {
    async fn list_spy_cats(&self, filters: &SpyCatFilters) -> ApiResult<Vec<SpyCat>> {
        self.get("/api/cats/", &filters.query_pairs()).await
    }

    async fn get_spy_cat(&self, id: DbId) -> ApiResult<SpyCat> {
        self.get(&format!("/api/cats/{id}"), &[]).await
    }

    async fn create_spy_cat(&self, data: &SpyCatCreate) -> ApiResult<SpyCat> {
        self.with_body(Method::POST, "/api/cats/", data).await
    }

    async fn update_spy_cat(&self, id: DbId, data: &SpyCatUpdate) -> ApiResult<SpyCat> {
        self.with_body(Method::PUT, &format!("/api/cats/{id}"), data)
            .await
    }

    async fn delete_spy_cat(&self, id: DbId) -> ApiResult<()> {
        self.delete(&format!("/api/cats/{id}")).await
    }

    async fn available_spy_cats(&self) -> ApiResult<Vec<SpyCat>> {
        self.get("/api/cats/available", &[]).await
    }

    async fn search_spy_cats(&self, query: &str) -> ApiResult<SearchResults> {
        self.get("/api/cats/search", &[("q", query.to_string())])
            .await
    }

    async fn spy_cat_stats(&self) -> ApiResult<SpyCatStats> {
        self.get("/api/cats/statistics", &[]).await
    }

    async fn list_missions(&self) -> ApiResult<Vec<Mission>> {
        self.get("/api/missions/", &[]).await
    }

    async fn get_mission(&self, id: DbId) -> ApiResult<Mission> {
        self.get(&format!("/api/missions/{id}"), &[]).await
    }

    async fn create_mission(&self, data: &MissionCreate) -> ApiResult<Mission> {
        self.with_body(Method::POST, "/api/missions/", data).await
    }

    async fn assign_cat(&self, mission_id: DbId, cat_id: DbId) -> ApiResult<Mission> {
        self.with_body(
            Method::POST,
            &format!("/api/missions/{mission_id}/assign"),
            &AssignCat { cat_id },
        )
        .await
    }

    async fn complete_mission(&self, id: DbId) -> ApiResult<Mission> {
        self.patch_empty(&format!("/api/missions/{id}/complete"))
            .await
    }

    async fn delete_mission(&self, id: DbId) -> ApiResult<()> {
        self.delete(&format!("/api/missions/{id}")).await
    }

    async fn list_targets(&self, mission_id: Option<DbId>) -> ApiResult<Vec<Target>> {
        let query: Vec<(&str, String)> = mission_id
            .map(|id| vec![("mission_id", id.to_string())])
            .unwrap_or_default();
        self.get("/api/targets/", &query).await
    }

    async fn get_target(&self, id: &TargetId) -> ApiResult<Target> {
        self.get(&target_path(id, None)?, &[]).await
    }

    async fn create_target(&self, data: &TargetCreate) -> ApiResult<Target> {
        self.with_body(Method::POST, "/api/targets/", data).await
    }

    async fn update_target(&self, id: &TargetId, data: &TargetUpdate) -> ApiResult<Target> {
        self.with_body(Method::PUT, &target_path(id, None)?, data)
            .await
    }

    async fn update_target_notes(&self, id: &TargetId, notes: &str) -> ApiResult<Target> {
        let body = TargetUpdate {
            notes: notes.to_string(),
        };
        self.with_body(Method::PATCH, &target_path(id, Some("notes"))?, &body)
            .await
    }

    async fn complete_target(&self, id: &TargetId) -> ApiResult<Target> {
        self.patch_empty(&target_path(id, Some("complete"))?)
            .await
    }

    async fn delete_target(&self, id: &TargetId) -> ApiResult<()> {
        self.delete(&target_path(id, None)?).await
    }
}
