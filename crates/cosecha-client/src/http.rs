use reqwest::{Method, Response};
use tokio::sync::watch;
use tracing::warn;

use cosecha_session::SessionState;
use cosecha_types::api::{
    CreateContractRequest, CreateJobRequest, JobFilter, Stats, UpdateApplicationRequest,
};
use cosecha_types::models::{Application, ApplicationStatus, Contract, Job, RawContract};
use cosecha_types::{Error, Result};

/// Outbound calls to the jobs/contracts/applications backend. Attaches the
/// current bearer token (read synchronously from the session watch channel)
/// and normalizes transport failures; HTTP error statuses stay the caller's
/// to interpret.
pub struct ResourceClient {
    http: reqwest::Client,
    base_url: String,
    session: watch::Receiver<SessionState>,
}

impl ResourceClient {
    pub fn new(base_url: &str, session: watch::Receiver<SessionState>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn token(&self) -> Option<String> {
        self.session.borrow().token().map(str::to_string)
    }

    /// Issue a request with the bearer token attached when one exists.
    /// Connectivity failures become [`Error::Network`]; any HTTP status is
    /// returned as an ordinary response.
    pub async fn authenticated_request(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&serde_json::Value>,
    ) -> Result<Response> {
        let mut request = self.http.request(method, self.url(path)).query(query);
        if let Some(token) = self.token() {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        request.send().await.map_err(map_transport)
    }

    /// Job listing and creation are the only calls that go out bare.
    async fn plain_request(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&serde_json::Value>,
    ) -> Result<Response> {
        let mut request = self.http.request(method, self.url(path)).query(query);
        if let Some(body) = body {
            request = request.json(body);
        }
        request.send().await.map_err(map_transport)
    }

    // -- Typed endpoints --

    pub async fn list_jobs(&self, filter: &JobFilter) -> Result<Vec<Job>> {
        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(crop) = &filter.crop_type {
            query.push(("crop_type", crop.clone()));
        }
        if let Some(location) = &filter.location {
            query.push(("location", location.clone()));
        }
        if let Some(limit) = filter.limit {
            query.push(("limit", limit.to_string()));
        }
        let response = self.plain_request(Method::GET, "/jobs", &query, None).await?;
        Self::parse_json(response).await
    }

    pub async fn create_job(&self, request: &CreateJobRequest) -> Result<Job> {
        let body = serde_json::to_value(request)
            .map_err(|e| Error::Unexpected(e.to_string()))?;
        let response = self.plain_request(Method::POST, "/jobs", &[], Some(&body)).await?;
        Self::parse_json(response).await
    }

    pub async fn list_contracts(&self, worker_id: Option<&str>) -> Result<Vec<Contract>> {
        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(id) = worker_id {
            query.push(("worker_id", id.to_string()));
        }
        let response = self
            .authenticated_request(Method::GET, "/contracts", &query, None)
            .await?;
        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }
        let values: Vec<serde_json::Value> = response
            .json()
            .await
            .map_err(|e| Error::Unexpected(format!("malformed contracts payload: {e}")))?;
        Ok(normalize_contracts(values))
    }

    pub async fn create_contract(&self, request: &CreateContractRequest) -> Result<Contract> {
        let body = serde_json::to_value(request)
            .map_err(|e| Error::Unexpected(e.to_string()))?;
        let response = self
            .authenticated_request(Method::POST, "/contracts", &[], Some(&body))
            .await?;
        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }
        let raw: RawContract = response
            .json()
            .await
            .map_err(|e| Error::Unexpected(format!("malformed contract payload: {e}")))?;
        Ok(raw.canonicalize())
    }

    pub async fn list_applications(
        &self,
        grower_id: Option<&str>,
        status: Option<ApplicationStatus>,
    ) -> Result<Vec<Application>> {
        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(id) = grower_id {
            query.push(("grower_id", id.to_string()));
        }
        if let Some(status) = status {
            query.push(("status", status.as_str().to_string()));
        }
        let response = self
            .authenticated_request(Method::GET, "/applications", &query, None)
            .await?;
        Self::parse_json(response).await
    }

    pub async fn update_application_status(
        &self,
        application_id: i64,
        status: ApplicationStatus,
    ) -> Result<()> {
        let body = serde_json::to_value(UpdateApplicationRequest { status })
            .map_err(|e| Error::Unexpected(e.to_string()))?;
        let response = self
            .authenticated_request(
                Method::PATCH,
                &format!("/applications/{application_id}"),
                &[],
                Some(&body),
            )
            .await?;
        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }
        Ok(())
    }

    pub async fn fetch_stats(&self) -> Result<Stats> {
        let response = self.authenticated_request(Method::GET, "/stats", &[], None).await?;
        Self::parse_json(response).await
    }

    async fn parse_json<T: serde::de::DeserializeOwned>(response: Response) -> Result<T> {
        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }
        response
            .json()
            .await
            .map_err(|e| Error::Unexpected(format!("malformed response payload: {e}")))
    }
}

/// Duck-typed backend rows are translated once, here. Rows that cannot be
/// read at all are skipped rather than failing the whole list.
pub fn normalize_contracts(values: Vec<serde_json::Value>) -> Vec<Contract> {
    values
        .into_iter()
        .filter_map(|value| match serde_json::from_value::<RawContract>(value) {
            Ok(raw) => Some(raw.canonicalize()),
            Err(err) => {
                warn!("skipping unreadable contract row: {err}");
                None
            }
        })
        .collect()
}

fn map_transport(err: reqwest::Error) -> Error {
    if err.is_connect() || err.is_timeout() {
        Error::unreachable()
    } else {
        Error::Unexpected(err.to_string())
    }
}

/// Structured error body first (`detail`/`message`/`error`), raw text second.
pub async fn error_from_response(response: Response) -> Error {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| {
            ["detail", "message", "error"]
                .iter()
                .find_map(|key| v.get(key).and_then(|m| m.as_str()).map(str::to_string))
        })
        .unwrap_or_else(|| {
            if body.trim().is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("Unknown error")
                    .to_string()
            } else {
                body
            }
        });
    Error::Http { status: status.as_u16(), message }
}
