use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use cosecha_types::models::Role;
use cosecha_types::{Error, Result};

use crate::http_provider::transport_error;

/// App-owned mirror of a provider user. Kept so role lookups do not depend
/// on provider metadata alone.
#[derive(Debug, Clone, Serialize)]
pub struct UserRecord {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub role: String,
}

/// Seam over the application's user registry: role lookup plus best-effort
/// mirroring of rows that only exist upstream.
#[async_trait]
pub trait UserRegistry: Send + Sync {
    /// Role of the given user id, or `None` when no row exists.
    async fn role_of(&self, user_id: &str, bearer: Option<&str>) -> Result<Option<Role>>;

    /// Insert a mirrored row. Failures here never fail the larger flow.
    async fn mirror(&self, record: &UserRecord, bearer: Option<&str>) -> Result<()>;
}

/// Registry stand-in for degraded mode: no rows, and nothing to mirror to.
pub struct NullRegistry;

#[async_trait]
impl UserRegistry for NullRegistry {
    async fn role_of(&self, _user_id: &str, _bearer: Option<&str>) -> Result<Option<Role>> {
        Ok(None)
    }

    async fn mirror(&self, _record: &UserRecord, _bearer: Option<&str>) -> Result<()> {
        Ok(())
    }
}

/// PostgREST-style registry client (`/rest/v1/users`).
pub struct HttpUserRegistry {
    http: reqwest::Client,
    base: String,
    anon_key: String,
}

#[derive(Debug, Deserialize)]
struct RoleRow {
    #[serde(default)]
    role: Option<String>,
}

impl HttpUserRegistry {
    pub fn new(base: &str, anon_key: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base: base.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
        }
    }

    fn users_endpoint(&self) -> String {
        format!("{}/rest/v1/users", self.base)
    }
}

#[async_trait]
impl UserRegistry for HttpUserRegistry {
    async fn role_of(&self, user_id: &str, bearer: Option<&str>) -> Result<Option<Role>> {
        let mut request = self
            .http
            .get(self.users_endpoint())
            .header("apikey", &self.anon_key)
            .query(&[("id", format!("eq.{user_id}")), ("select", "role".to_string())]);
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }
        let response = request.send().await.map_err(transport_error)?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(Error::Http { status, message });
        }

        let rows: Vec<RoleRow> = response
            .json()
            .await
            .map_err(|e| Error::Unexpected(format!("malformed registry response: {e}")))?;
        Ok(rows
            .into_iter()
            .next()
            .and_then(|row| row.role)
            .and_then(|raw| Role::parse(&raw)))
    }

    async fn mirror(&self, record: &UserRecord, bearer: Option<&str>) -> Result<()> {
        let mut request = self
            .http
            .post(self.users_endpoint())
            .header("apikey", &self.anon_key)
            .header("Prefer", "return=minimal")
            .json(record);
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }
        let response = request.send().await.map_err(transport_error)?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(Error::Http { status, message });
        }
        Ok(())
    }
}
