use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, error, warn};

use cosecha_types::models::{Identity, Profile, Role};
use cosecha_types::{Error, Result};

use crate::provider::{AuthEvent, AuthProvider, ProviderSession, ProviderUser};
use crate::registry::{UserRecord, UserRegistry};

/// Role resolution must not block app readiness; past this the store falls
/// back to profile metadata.
const ROLE_RESOLUTION_TIMEOUT: Duration = Duration::from_secs(5);

/// Session lifecycle. Consumers must treat `Uninitialized` and `Loading` as
/// indeterminate, not as "no user".
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Uninitialized,
    Loading,
    Anonymous,
    Authenticated {
        identity: Identity,
        role: Option<Role>,
        access_token: String,
    },
}

impl SessionState {
    pub fn is_resolving(&self) -> bool {
        matches!(self, SessionState::Uninitialized | SessionState::Loading)
    }

    pub fn identity(&self) -> Option<&Identity> {
        match self {
            SessionState::Authenticated { identity, .. } => Some(identity),
            _ => None,
        }
    }

    pub fn role(&self) -> Option<Role> {
        match self {
            SessionState::Authenticated { role, .. } => *role,
            _ => None,
        }
    }

    pub fn token(&self) -> Option<&str> {
        match self {
            SessionState::Authenticated { access_token, .. } => Some(access_token),
            _ => None,
        }
    }
}

/// Single writer of the shared session. Everyone else holds a watch receiver
/// and only requests mutation through `sign_in`/`sign_up`/`sign_out`.
pub struct SessionStore {
    provider: Arc<dyn AuthProvider>,
    registry: Arc<dyn UserRegistry>,
    configured: bool,
    state_tx: watch::Sender<SessionState>,
    /// Bumped for every initialize/auth event. An async continuation only
    /// commits if its generation is still current, so a slow role lookup
    /// started by an older event can never overwrite newer state.
    generation: AtomicU64,
    role_timeout: Duration,
}

impl SessionStore {
    pub fn new(
        provider: Arc<dyn AuthProvider>,
        registry: Arc<dyn UserRegistry>,
        configured: bool,
    ) -> Arc<SessionStore> {
        let (state_tx, _) = watch::channel(SessionState::Uninitialized);
        Arc::new(SessionStore {
            provider,
            registry,
            configured,
            state_tx,
            generation: AtomicU64::new(0),
            role_timeout: ROLE_RESOLUTION_TIMEOUT,
        })
    }

    #[cfg(test)]
    fn with_role_timeout(self: Arc<Self>, timeout: Duration) -> Arc<Self> {
        let mut store = Arc::into_inner(self).expect("store not yet shared");
        store.role_timeout = timeout;
        Arc::new(store)
    }

    pub fn is_configured(&self) -> bool {
        self.configured
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state_tx.subscribe()
    }

    pub fn current(&self) -> SessionState {
        self.state_tx.borrow().clone()
    }

    /// Resolve the initial session. Always terminates the loading state:
    /// unconfigured providers settle immediately, provider failures settle
    /// to anonymous.
    pub async fn initialize(&self) {
        if !self.configured {
            debug!("auth provider unconfigured, session settles anonymous");
            self.state_tx.send_replace(SessionState::Anonymous);
            return;
        }

        let generation = self.begin();
        match self.provider.get_session().await {
            Ok(Some(session)) => self.settle(generation, session).await,
            Ok(None) => self.commit(generation, SessionState::Anonymous),
            Err(err) => {
                warn!("could not fetch initial session: {err}");
                self.commit(generation, SessionState::Anonymous);
            }
        }
    }

    /// Drive provider-pushed auth changes until the provider goes away.
    /// Spawn this once at app start.
    pub async fn run_events(self: Arc<Self>) {
        let mut events = self.provider.subscribe();
        loop {
            match events.recv().await {
                Ok(event) => self.handle_event(event).await,
                Err(tokio::sync::broadcast::error::RecvError::Lagged(missed)) => {
                    warn!(missed, "auth events lagged, re-syncing from provider");
                    self.initialize().await;
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            }
        }
    }

    pub async fn handle_event(&self, event: AuthEvent) {
        let generation = self.begin();
        match event {
            AuthEvent::SignedIn(session) => self.settle(generation, session).await,
            AuthEvent::SignedOut => self.commit(generation, SessionState::Anonymous),
        }
    }

    pub async fn sign_up(&self, email: &str, password: &str, profile: Profile) -> Result<()> {
        if !self.configured {
            return Err(Error::unconfigured());
        }

        // Validate before any provider call.
        let name = profile.name.as_deref().unwrap_or("").trim().to_string();
        if name.is_empty() {
            return Err(Error::Validation("Name is required.".to_string()));
        }
        let phone = profile.phone.as_deref().unwrap_or("").trim().to_string();
        let role = profile
            .role
            .as_deref()
            .filter(|r| !r.trim().is_empty())
            .unwrap_or(Role::Worker.as_str())
            .to_string();

        let submitted = Profile {
            name: Some(name.clone()),
            phone: Some(phone.clone()),
            role: Some(role.clone()),
        };
        let user = self.provider.sign_up(email, password, &submitted).await?;

        // Mirror into the registry. The identity already exists upstream,
        // so a failure here must not fail the sign-up.
        let record = UserRecord {
            id: user.id,
            name,
            phone: if phone.is_empty() { "N/A".to_string() } else { phone },
            role,
        };
        if let Err(err) = self.registry.mirror(&record, None).await {
            warn!("could not create mirrored user record: {err}");
        }
        Ok(())
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<()> {
        if !self.configured {
            return Err(Error::unconfigured());
        }
        self.provider.sign_in_with_password(email, password).await?;
        Ok(())
    }

    /// The caller is treated as signed out locally no matter what the
    /// provider answers.
    pub async fn sign_out(&self) {
        if self.configured {
            if let Err(err) = self.provider.sign_out().await {
                error!("provider sign-out failed: {err}");
            }
        }
        let generation = self.begin();
        self.commit(generation, SessionState::Anonymous);
    }

    fn begin(&self) -> u64 {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.state_tx.send_replace(SessionState::Loading);
        generation
    }

    fn commit(&self, generation: u64, state: SessionState) {
        if self.generation.load(Ordering::SeqCst) != generation {
            debug!("discarding stale session update");
            return;
        }
        self.state_tx.send_replace(state);
    }

    async fn settle(&self, generation: u64, session: ProviderSession) {
        let role = match tokio::time::timeout(
            self.role_timeout,
            self.resolve_role(&session),
        )
        .await
        {
            Ok(role) => role,
            Err(_) => {
                warn!("role resolution timed out, falling back to profile metadata");
                metadata_role(&session.user)
            }
        };

        let state = SessionState::Authenticated {
            identity: identity_of(&session.user),
            role,
            access_token: session.access_token,
        };
        self.commit(generation, state);
    }

    /// Registry row first, profile metadata second, "no role" last. When the
    /// role only exists in metadata the registry row is mirrored best-effort.
    async fn resolve_role(&self, session: &ProviderSession) -> Option<Role> {
        let user = &session.user;
        let bearer = Some(session.access_token.as_str());
        match self.registry.role_of(&user.id, bearer).await {
            Ok(Some(role)) => Some(role),
            Ok(None) => {
                let role = metadata_role(user)?;
                let record = registry_record(user, role);
                if let Err(err) = self.registry.mirror(&record, bearer).await {
                    debug!("could not sync user row to registry: {err}");
                }
                Some(role)
            }
            Err(err) => {
                warn!("role lookup failed, falling back to profile metadata: {err}");
                metadata_role(user)
            }
        }
    }
}

fn metadata_role(user: &ProviderUser) -> Option<Role> {
    user.profile.role.as_deref().and_then(Role::parse)
}

fn identity_of(user: &ProviderUser) -> Identity {
    Identity {
        id: user.id.clone(),
        email: user.email.clone(),
        name: user.profile.name.clone(),
        phone: user.profile.phone.clone(),
    }
}

fn registry_record(user: &ProviderUser, role: Role) -> UserRecord {
    let name = user
        .profile
        .name
        .clone()
        .filter(|n| !n.trim().is_empty())
        .or_else(|| {
            user.email
                .as_deref()
                .and_then(|e| e.split('@').next())
                .map(str::to_string)
        })
        .unwrap_or_else(|| "User".to_string());
    let phone = user
        .profile
        .phone
        .clone()
        .filter(|p| !p.trim().is_empty())
        .unwrap_or_else(|| "N/A".to_string());
    UserRecord { id: user.id.clone(), name, phone, role: role.as_str().to_string() }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::AtomicUsize;

    use async_trait::async_trait;
    use tokio::sync::broadcast;

    use super::*;

    struct FakeProvider {
        session: Mutex<Option<ProviderSession>>,
        events: broadcast::Sender<AuthEvent>,
        sign_up_calls: AtomicUsize,
        fail_sign_out: bool,
    }

    impl FakeProvider {
        fn new(session: Option<ProviderSession>) -> Arc<Self> {
            let (events, _) = broadcast::channel(16);
            Arc::new(Self {
                session: Mutex::new(session),
                events,
                sign_up_calls: AtomicUsize::new(0),
                fail_sign_out: false,
            })
        }
    }

    #[async_trait]
    impl AuthProvider for FakeProvider {
        async fn get_session(&self) -> Result<Option<ProviderSession>> {
            Ok(self.session.lock().unwrap().clone())
        }

        async fn sign_up(
            &self,
            _email: &str,
            _password: &str,
            profile: &Profile,
        ) -> Result<ProviderUser> {
            self.sign_up_calls.fetch_add(1, Ordering::SeqCst);
            Ok(ProviderUser {
                id: "new-user".to_string(),
                email: Some("new@example.com".to_string()),
                profile: profile.clone(),
            })
        }

        async fn sign_in_with_password(
            &self,
            _email: &str,
            _password: &str,
        ) -> Result<ProviderSession> {
            let session = session_for("signed-in", None);
            let _ = self.events.send(AuthEvent::SignedIn(session.clone()));
            Ok(session)
        }

        async fn sign_out(&self) -> Result<()> {
            if self.fail_sign_out {
                return Err(Error::Unexpected("provider offline".to_string()));
            }
            let _ = self.events.send(AuthEvent::SignedOut);
            Ok(())
        }

        async fn get_user(&self) -> Result<Option<ProviderUser>> {
            Ok(self.session.lock().unwrap().clone().map(|s| s.user))
        }

        fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
            self.events.subscribe()
        }
    }

    struct FakeRegistry {
        role: Option<Role>,
        delay: Option<Duration>,
        fail_lookup: bool,
        fail_mirror: bool,
        mirrored: Mutex<Vec<UserRecord>>,
    }

    impl FakeRegistry {
        fn with_role(role: Option<Role>) -> Arc<Self> {
            Arc::new(Self {
                role,
                delay: None,
                fail_lookup: false,
                fail_mirror: false,
                mirrored: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl UserRegistry for FakeRegistry {
        async fn role_of(&self, _user_id: &str, _bearer: Option<&str>) -> Result<Option<Role>> {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if self.fail_lookup {
                return Err(Error::Http { status: 500, message: "boom".to_string() });
            }
            Ok(self.role)
        }

        async fn mirror(&self, record: &UserRecord, _bearer: Option<&str>) -> Result<()> {
            if self.fail_mirror {
                return Err(Error::Http { status: 409, message: "exists".to_string() });
            }
            self.mirrored.lock().unwrap().push(record.clone());
            Ok(())
        }
    }

    fn session_for(user_id: &str, metadata_role: Option<&str>) -> ProviderSession {
        ProviderSession {
            access_token: format!("token-{user_id}"),
            user: ProviderUser {
                id: user_id.to_string(),
                email: Some(format!("{user_id}@example.com")),
                profile: Profile {
                    name: Some("Maria".to_string()),
                    phone: None,
                    role: metadata_role.map(str::to_string),
                },
            },
        }
    }

    #[tokio::test]
    async fn unconfigured_settles_without_touching_provider() {
        let provider = FakeProvider::new(Some(session_for("u1", Some("worker"))));
        let store = SessionStore::new(provider, FakeRegistry::with_role(None), false);

        store.initialize().await;

        assert_eq!(store.current(), SessionState::Anonymous);
        assert!(!store.is_configured());
    }

    #[tokio::test]
    async fn initialize_resolves_registry_role() {
        let provider = FakeProvider::new(Some(session_for("u1", Some("worker"))));
        let registry = FakeRegistry::with_role(Some(Role::Grower));
        let store = SessionStore::new(provider, registry, true);

        store.initialize().await;

        // Registry wins over metadata.
        assert_eq!(store.current().role(), Some(Role::Grower));
        assert_eq!(store.current().identity().unwrap().id, "u1");
    }

    #[tokio::test]
    async fn missing_session_settles_anonymous() {
        let provider = FakeProvider::new(None);
        let store = SessionStore::new(provider, FakeRegistry::with_role(None), true);

        store.initialize().await;

        assert_eq!(store.current(), SessionState::Anonymous);
    }

    #[tokio::test]
    async fn slow_role_lookup_falls_back_to_metadata() {
        let provider = FakeProvider::new(Some(session_for("u1", Some("grower"))));
        let registry = Arc::new(FakeRegistry {
            role: Some(Role::Admin),
            delay: Some(Duration::from_millis(500)),
            fail_lookup: false,
            fail_mirror: false,
            mirrored: Mutex::new(Vec::new()),
        });
        let store = SessionStore::new(provider, registry, true)
            .with_role_timeout(Duration::from_millis(20));

        store.initialize().await;

        // The registry answer never arrived in time; metadata decides.
        assert_eq!(store.current().role(), Some(Role::Grower));
    }

    #[tokio::test]
    async fn failed_lookup_with_bad_metadata_yields_no_role() {
        let provider = FakeProvider::new(Some(session_for("u1", Some("supervisor"))));
        let registry = Arc::new(FakeRegistry {
            role: None,
            delay: None,
            fail_lookup: true,
            fail_mirror: false,
            mirrored: Mutex::new(Vec::new()),
        });
        let store = SessionStore::new(provider, registry, true);

        store.initialize().await;

        match store.current() {
            SessionState::Authenticated { role, .. } => assert_eq!(role, None),
            other => panic!("expected authenticated state, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn metadata_only_role_is_mirrored() {
        let provider = FakeProvider::new(Some(session_for("u1", Some("worker"))));
        let registry = FakeRegistry::with_role(None);
        let store = SessionStore::new(provider, registry.clone(), true);

        store.initialize().await;

        assert_eq!(store.current().role(), Some(Role::Worker));
        let mirrored = registry.mirrored.lock().unwrap();
        assert_eq!(mirrored.len(), 1);
        assert_eq!(mirrored[0].id, "u1");
        assert_eq!(mirrored[0].role, "worker");
    }

    #[tokio::test]
    async fn sign_up_without_name_never_reaches_provider() {
        let provider = FakeProvider::new(None);
        let store = SessionStore::new(provider.clone(), FakeRegistry::with_role(None), true);

        let profile = Profile { name: None, phone: None, role: Some("worker".to_string()) };
        let err = store.sign_up("a@b.c", "secret123", profile).await.unwrap_err();

        assert!(err.is_validation());
        assert_eq!(provider.sign_up_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn sign_up_survives_mirror_failure() {
        let provider = FakeProvider::new(None);
        let registry = Arc::new(FakeRegistry {
            role: None,
            delay: None,
            fail_lookup: false,
            fail_mirror: true,
            mirrored: Mutex::new(Vec::new()),
        });
        let store = SessionStore::new(provider, registry, true);

        let profile = Profile {
            name: Some("Maria".to_string()),
            phone: None,
            role: None,
        };
        store.sign_up("a@b.c", "secret123", profile).await.unwrap();
    }

    #[tokio::test]
    async fn stale_resolution_never_overwrites_newer_event() {
        let provider = FakeProvider::new(Some(session_for("old", Some("worker"))));
        let registry = Arc::new(FakeRegistry {
            role: Some(Role::Worker),
            delay: Some(Duration::from_millis(100)),
            fail_lookup: false,
            fail_mirror: false,
            mirrored: Mutex::new(Vec::new()),
        });
        let store = SessionStore::new(provider, registry, true)
            .with_role_timeout(Duration::from_secs(5));

        let init_store = store.clone();
        let init = tokio::spawn(async move { init_store.initialize().await });
        tokio::time::sleep(Duration::from_millis(10)).await;

        // A newer event lands while the old resolution is still pending.
        store.handle_event(AuthEvent::SignedOut).await;
        init.await.unwrap();

        assert_eq!(store.current(), SessionState::Anonymous);
    }

    #[tokio::test]
    async fn sign_out_failure_still_goes_anonymous() {
        let (events, _) = broadcast::channel(16);
        let provider = Arc::new(FakeProvider {
            session: Mutex::new(Some(session_for("u1", Some("worker")))),
            events,
            sign_up_calls: AtomicUsize::new(0),
            fail_sign_out: true,
        });
        let store = SessionStore::new(provider, FakeRegistry::with_role(Some(Role::Worker)), true);

        store.initialize().await;
        assert!(store.current().identity().is_some());

        store.sign_out().await;
        assert_eq!(store.current(), SessionState::Anonymous);
    }

    #[tokio::test]
    async fn pushed_event_replaces_session() {
        let provider = FakeProvider::new(None);
        let registry = FakeRegistry::with_role(Some(Role::Worker));
        let store = SessionStore::new(provider.clone(), registry, true);
        let events = tokio::spawn(store.clone().run_events());
        // Let the event loop subscribe before anything is pushed.
        tokio::task::yield_now().await;

        store.initialize().await;
        assert_eq!(store.current(), SessionState::Anonymous);

        store.sign_in("a@b.c", "secret123").await.unwrap();

        let mut rx = store.subscribe();
        // The event loop settles the new session asynchronously.
        while store.current().identity().is_none() {
            rx.changed().await.unwrap();
        }
        assert_eq!(store.current().role(), Some(Role::Worker));
        events.abort();
    }
}
