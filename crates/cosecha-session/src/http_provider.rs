use std::sync::Mutex;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::broadcast;
use tracing::debug;

use cosecha_types::models::Profile;
use cosecha_types::{Error, Result};

use crate::provider::{AuthEvent, AuthProvider, ProviderSession, ProviderUser};

/// HTTP client for a GoTrue-style identity provider. Keeps the current
/// session in memory and pushes change events on a broadcast channel, which
/// is what the session store subscribes to.
pub struct HttpAuthProvider {
    http: reqwest::Client,
    base: String,
    anon_key: String,
    session: Mutex<Option<ProviderSession>>,
    events: broadcast::Sender<AuthEvent>,
}

#[derive(Debug, Deserialize)]
struct WireUser {
    id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    user_metadata: Option<Profile>,
}

impl WireUser {
    fn into_user(self) -> ProviderUser {
        ProviderUser {
            id: self.id,
            email: self.email,
            profile: self.user_metadata.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    user: WireUser,
}

#[derive(Debug, Deserialize)]
struct SignUpResponse {
    // Sign-up returns either a bare user or a full session depending on
    // whether email confirmation is required.
    #[serde(default)]
    user: Option<WireUser>,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    user_metadata: Option<Profile>,
}

impl HttpAuthProvider {
    pub fn new(base: &str, anon_key: &str) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            http: reqwest::Client::new(),
            base: base.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
            session: Mutex::new(None),
            events,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/auth/v1{}", self.base, path)
    }

    fn current(&self) -> Result<Option<ProviderSession>> {
        let session = self
            .session
            .lock()
            .map_err(|e| Error::Unexpected(format!("session lock poisoned: {e}")))?;
        Ok(session.clone())
    }

    fn replace(&self, session: Option<ProviderSession>) -> Result<()> {
        let mut slot = self
            .session
            .lock()
            .map_err(|e| Error::Unexpected(format!("session lock poisoned: {e}")))?;
        *slot = session;
        Ok(())
    }

    fn push(&self, event: AuthEvent) {
        // No subscribers is fine; the store may not be listening yet.
        let _ = self.events.send(event);
    }
}

#[async_trait]
impl AuthProvider for HttpAuthProvider {
    async fn get_session(&self) -> Result<Option<ProviderSession>> {
        self.current()
    }

    async fn sign_up(&self, email: &str, password: &str, profile: &Profile)
    -> Result<ProviderUser> {
        let body = serde_json::json!({
            "email": email,
            "password": password,
            "data": profile,
        });
        let response = self
            .http
            .post(self.endpoint("/signup"))
            .header("apikey", &self.anon_key)
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            return Err(provider_error(response).await);
        }

        let payload: SignUpResponse = response
            .json()
            .await
            .map_err(|e| Error::Unexpected(format!("malformed sign-up response: {e}")))?;
        let user = match (payload.user, payload.id) {
            (Some(user), _) => user,
            (None, Some(id)) => WireUser {
                id,
                email: payload.email,
                user_metadata: payload.user_metadata,
            },
            (None, None) => {
                return Err(Error::Unexpected("sign-up response carried no user".to_string()));
            }
        };
        Ok(user.into_user())
    }

    async fn sign_in_with_password(&self, email: &str, password: &str)
    -> Result<ProviderSession> {
        let response = self
            .http
            .post(self.endpoint("/token?grant_type=password"))
            .header("apikey", &self.anon_key)
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            return Err(provider_error(response).await);
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| Error::Unexpected(format!("malformed token response: {e}")))?;
        let session = ProviderSession {
            access_token: token.access_token,
            user: token.user.into_user(),
        };
        self.replace(Some(session.clone()))?;
        self.push(AuthEvent::SignedIn(session.clone()));
        Ok(session)
    }

    async fn sign_out(&self) -> Result<()> {
        let current = self.current()?;
        // Local state is cleared regardless of what the provider says.
        self.replace(None)?;
        self.push(AuthEvent::SignedOut);

        if let Some(session) = current {
            let response = self
                .http
                .post(self.endpoint("/logout"))
                .header("apikey", &self.anon_key)
                .bearer_auth(&session.access_token)
                .send()
                .await
                .map_err(transport_error)?;
            if !response.status().is_success() {
                debug!(status = %response.status(), "provider logout returned an error");
            }
        }
        Ok(())
    }

    async fn get_user(&self) -> Result<Option<ProviderUser>> {
        let Some(session) = self.current()? else {
            return Ok(None);
        };
        let response = self
            .http
            .get(self.endpoint("/user"))
            .header("apikey", &self.anon_key)
            .bearer_auth(&session.access_token)
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            return Err(provider_error(response).await);
        }
        let user: WireUser = response
            .json()
            .await
            .map_err(|e| Error::Unexpected(format!("malformed user response: {e}")))?;
        Ok(Some(user.into_user()))
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }
}

pub(crate) fn transport_error(err: reqwest::Error) -> Error {
    if err.is_connect() || err.is_timeout() {
        Error::unreachable()
    } else {
        Error::Unexpected(err.to_string())
    }
}

/// GoTrue error bodies vary: `error_description`, `msg`, or `message`.
async fn provider_error(response: reqwest::Response) -> Error {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| {
            ["error_description", "msg", "message"]
                .iter()
                .find_map(|key| v.get(key).and_then(|m| m.as_str()).map(str::to_string))
        })
        .unwrap_or_else(|| if body.is_empty() { "Authentication failed".to_string() } else { body });
    Error::Http { status, message }
}
