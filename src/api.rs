use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::dashboard::dto::DashboardStats;
use crate::error::WorkflowError;
use crate::health::dto::{HealthEntry, SavedHealthEntry};
use crate::plan::dto::{GeneratePlanRequest, GeneratedDietPlan, SavePlanRequest};
use crate::storage::{keys, StorageClient};
use crate::tracking::dto::{CompleteMealRequest, MealTrackingSummary};

/// Shown when the server gives no usable error message.
pub const GENERIC_FAILURE: &str = "Something went wrong. Please try again.";

#[async_trait]
pub trait GenerationApi: Send + Sync {
    /// `POST /api/plans/generate`.
    async fn generate_plan(
        &self,
        request: &GeneratePlanRequest,
    ) -> Result<GeneratedDietPlan, WorkflowError>;
}

#[async_trait]
pub trait PersistenceApi: Send + Sync {
    /// `POST /api/health/entries`.
    async fn save_health_entry(
        &self,
        entry: &HealthEntry,
    ) -> Result<SavedHealthEntry, WorkflowError>;

    /// `POST /api/plans/save`.
    async fn save_plan(&self, request: &SavePlanRequest)
        -> Result<GeneratedDietPlan, WorkflowError>;
}

#[async_trait]
pub trait AnalyticsApi: Send + Sync {
    /// `POST /api/analytics/meals/complete`.
    async fn complete_meal(&self, request: &CompleteMealRequest) -> Result<(), WorkflowError>;

    /// `GET /api/analytics/dashboard`.
    async fn dashboard_stats(&self) -> Result<DashboardStats, WorkflowError>;

    /// `GET /api/analytics/meals/tracking?planId=`.
    async fn meal_tracking(&self, plan_id: &str) -> Result<MealTrackingSummary, WorkflowError>;
}

/// Plan responses arrive wrapped: `{ "data": { ... } }`.
#[derive(Debug, Deserialize)]
struct DataEnvelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    error: Option<ErrorBody>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// reqwest-backed implementation of all three API ports. The bearer token is
/// read from local storage on every call so a login/logout in the same
/// session takes effect immediately.
pub struct HttpApi {
    http: reqwest::Client,
    base_url: String,
    storage: Arc<dyn StorageClient>,
}

impl HttpApi {
    pub fn new(base_url: impl Into<String>, storage: Arc<dyn StorageClient>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            storage,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.storage.get(keys::AUTH_TOKEN) {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, WorkflowError> {
        let builder = self.http.post(self.url(path)).json(body);
        self.send(path, builder).await
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, WorkflowError> {
        let builder = self.http.get(self.url(path)).query(query);
        self.send(path, builder).await
    }

    async fn send<T: DeserializeOwned>(
        &self,
        path: &str,
        builder: reqwest::RequestBuilder,
    ) -> Result<T, WorkflowError> {
        let response = self
            .authorize(builder)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, path, "request failed to send");
                WorkflowError::network(GENERIC_FAILURE)
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = Self::error_message(response).await;
            error!(%status, path, message, "non-2xx response");
            return Err(WorkflowError::Network(message));
        }

        debug!(%status, path, "response ok");
        response.json::<T>().await.map_err(|e| {
            error!(error = %e, path, "response body did not decode");
            WorkflowError::network(GENERIC_FAILURE)
        })
    }

    /// Server-provided message when present, generic fallback otherwise.
    async fn error_message(response: reqwest::Response) -> String {
        let body = match response.text().await {
            Ok(body) => body,
            Err(_) => return GENERIC_FAILURE.to_string(),
        };
        match serde_json::from_str::<ErrorEnvelope>(&body) {
            Ok(envelope) => envelope
                .error
                .map(|e| e.message)
                .or(envelope.message)
                .unwrap_or_else(|| GENERIC_FAILURE.to_string()),
            Err(_) => GENERIC_FAILURE.to_string(),
        }
    }
}

#[async_trait]
impl GenerationApi for HttpApi {
    async fn generate_plan(
        &self,
        request: &GeneratePlanRequest,
    ) -> Result<GeneratedDietPlan, WorkflowError> {
        let envelope: DataEnvelope<GeneratedDietPlan> =
            self.post_json("/api/plans/generate", request).await?;
        Ok(envelope.data)
    }
}

#[async_trait]
impl PersistenceApi for HttpApi {
    async fn save_health_entry(
        &self,
        entry: &HealthEntry,
    ) -> Result<SavedHealthEntry, WorkflowError> {
        self.post_json("/api/health/entries", entry).await
    }

    async fn save_plan(
        &self,
        request: &SavePlanRequest,
    ) -> Result<GeneratedDietPlan, WorkflowError> {
        let envelope: DataEnvelope<GeneratedDietPlan> =
            self.post_json("/api/plans/save", request).await?;
        Ok(envelope.data)
    }
}

#[async_trait]
impl AnalyticsApi for HttpApi {
    async fn complete_meal(&self, request: &CompleteMealRequest) -> Result<(), WorkflowError> {
        // The endpoint returns a bare 200; the body is ignored.
        let builder = self
            .http
            .post(self.url("/api/analytics/meals/complete"))
            .json(request);
        let response = self.authorize(builder).send().await.map_err(|e| {
            error!(error = %e, "complete_meal failed to send");
            WorkflowError::network(GENERIC_FAILURE)
        })?;
        let status = response.status();
        if !status.is_success() {
            let message = Self::error_message(response).await;
            error!(%status, message, "complete_meal rejected");
            return Err(WorkflowError::Network(message));
        }
        Ok(())
    }

    async fn dashboard_stats(&self) -> Result<DashboardStats, WorkflowError> {
        self.get_json("/api/analytics/dashboard", &[]).await
    }

    async fn meal_tracking(&self, plan_id: &str) -> Result<MealTrackingSummary, WorkflowError> {
        self.get_json("/api/analytics/meals/tracking", &[("planId", plan_id)])
            .await
    }
}
