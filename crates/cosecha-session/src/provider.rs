use async_trait::async_trait;
use tokio::sync::broadcast;

use cosecha_types::Result;
use cosecha_types::models::Profile;

/// Minimal view of a provider-held user.
#[derive(Debug, Clone)]
pub struct ProviderUser {
    pub id: String,
    pub email: Option<String>,
    pub profile: Profile,
}

/// A live provider session: opaque bearer token plus its user.
#[derive(Debug, Clone)]
pub struct ProviderSession {
    pub access_token: String,
    pub user: ProviderUser,
}

/// Pushed by the provider whenever the auth state changes.
#[derive(Debug, Clone)]
pub enum AuthEvent {
    SignedIn(ProviderSession),
    SignedOut,
}

/// Seam over the identity provider. The session store only ever talks to
/// this trait, so tests swap in a fake and the shell wires the HTTP client.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn get_session(&self) -> Result<Option<ProviderSession>>;

    async fn sign_up(&self, email: &str, password: &str, profile: &Profile)
    -> Result<ProviderUser>;

    async fn sign_in_with_password(&self, email: &str, password: &str)
    -> Result<ProviderSession>;

    async fn sign_out(&self) -> Result<()>;

    async fn get_user(&self) -> Result<Option<ProviderUser>>;

    /// Subscribe to provider-pushed auth changes.
    fn subscribe(&self) -> broadcast::Receiver<AuthEvent>;
}

/// Stand-in provider for degraded mode. Every operation reports the missing
/// configuration; the event channel stays silent.
pub struct UnconfiguredProvider {
    events: broadcast::Sender<AuthEvent>,
}

impl UnconfiguredProvider {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(16);
        Self { events }
    }
}

impl Default for UnconfiguredProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AuthProvider for UnconfiguredProvider {
    async fn get_session(&self) -> Result<Option<ProviderSession>> {
        Ok(None)
    }

    async fn sign_up(
        &self,
        _email: &str,
        _password: &str,
        _profile: &Profile,
    ) -> Result<ProviderUser> {
        Err(cosecha_types::Error::unconfigured())
    }

    async fn sign_in_with_password(
        &self,
        _email: &str,
        _password: &str,
    ) -> Result<ProviderSession> {
        Err(cosecha_types::Error::unconfigured())
    }

    async fn sign_out(&self) -> Result<()> {
        Ok(())
    }

    async fn get_user(&self) -> Result<Option<ProviderUser>> {
        Ok(None)
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }
}
