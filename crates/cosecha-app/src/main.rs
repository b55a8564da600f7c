use std::io::{self, Write};
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use cosecha_client::storage::BlobStore;
use cosecha_client::{AudioClip, ContractCache, HttpBlobStore, ResourceClient};
use cosecha_session::http_provider::HttpAuthProvider;
use cosecha_session::provider::UnconfiguredProvider;
use cosecha_session::registry::{HttpUserRegistry, NullRegistry};
use cosecha_session::{Config, SessionStore};
use cosecha_types::api::JobFilter;
use cosecha_types::{Error, Result};

use cosecha_app::pages::applications::StatusFilter;
use cosecha_app::pages::auth::{LoginForm, SignUpForm};
use cosecha_app::pages::dashboard::{DashboardPage, JobForm};
use cosecha_app::pages::{admin, applications, auth, contracts, jobs};
use cosecha_app::view::View;
use cosecha_app::{Route, RouteDecision, boundary, evaluate, nav};

/// Stands in for the blob store when the provider is unconfigured, so an
/// attempted upload fails the same way every other provider call does.
struct DisabledBlobStore;

#[async_trait]
impl BlobStore for DisabledBlobStore {
    async fn upload(&self, _path: &str, _bytes: Vec<u8>, _content_type: &str) -> Result<String> {
        Err(Error::unconfigured())
    }

    fn public_url(&self, path: &str) -> String {
        path.to_string()
    }
}

struct Shell {
    store: Arc<SessionStore>,
    client: ResourceClient,
    blobs: Box<dyn BlobStore>,
    cache: Option<ContractCache>,
    dashboard: DashboardPage,
    filter: StatusFilter,
    current: Route,
    /// Where the user was headed before being bounced to sign-in.
    pending: Option<Route>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("cosecha=info")),
        )
        .init();

    let config = Config::from_env();
    info!(api = %config.api_url, configured = config.is_configured(), "starting cosecha");

    let (provider, registry, blobs): (
        Arc<dyn cosecha_session::AuthProvider>,
        Arc<dyn cosecha_session::UserRegistry>,
        Box<dyn BlobStore>,
    ) = match config.auth() {
        Some((url, key)) => (
            Arc::new(HttpAuthProvider::new(url, key)),
            Arc::new(HttpUserRegistry::new(url, key)),
            Box::new(HttpBlobStore::new(url, key)),
        ),
        None => {
            warn!("auth provider unconfigured, running in degraded mode");
            (
                Arc::new(UnconfiguredProvider::new()),
                Arc::new(NullRegistry),
                Box::new(DisabledBlobStore),
            )
        }
    };

    let store = SessionStore::new(provider, registry, config.is_configured());
    tokio::spawn(store.clone().run_events());
    store.initialize().await;

    let client = ResourceClient::new(&config.api_url, store.subscribe());
    let cache = match ContractCache::open(&config.cache_path) {
        Ok(cache) => Some(cache),
        Err(err) => {
            warn!("contract cache unavailable: {err}");
            None
        }
    };

    let mut shell = Shell {
        store,
        client,
        blobs,
        cache,
        dashboard: DashboardPage::default(),
        filter: StatusFilter::All,
        current: Route::Jobs,
        pending: None,
    };

    println!("cosecha — type `help` for commands");
    shell.open(Route::Jobs).await;

    let mut line = String::new();
    loop {
        print!("> ");
        io::stdout().flush()?;
        line.clear();
        if io::stdin().read_line(&mut line)? == 0 {
            break;
        }
        if !shell.dispatch(line.trim()).await {
            break;
        }
    }
    Ok(())
}

impl Shell {
    /// Returns false when the user asked to quit.
    async fn dispatch(&mut self, input: &str) -> bool {
        let (command, rest) = match input.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (input, ""),
        };
        match command {
            "" => {}
            "help" => print_help(),
            "quit" | "exit" => return false,
            "open" => match Route::parse(rest) {
                Some(route) => self.open(route).await,
                None => println!("No such page: {rest}"),
            },
            "reload" => self.open(self.current).await,
            "login" => self.login(rest).await,
            "signup" => self.signup(rest).await,
            "logout" => {
                self.store.sign_out().await;
                self.pending = None;
                println!("Signed out.");
                self.open(Route::Login).await;
            }
            "apply" => self.apply(rest).await,
            "post" => self.post(rest).await,
            "accept" | "reject" => self.review(command == "accept", rest).await,
            "filter" => match StatusFilter::parse(rest) {
                Some(filter) => {
                    self.filter = filter;
                    self.open(Route::Applications).await;
                }
                None => println!("Unknown filter: {rest} (all|pending|accepted|rejected)"),
            },
            other => println!("Unknown command: {other} (try `help`)"),
        }
        true
    }

    /// Navigate. Follows guard decisions until one renders: waiting states
    /// re-evaluate when the session changes, denials follow their redirect.
    async fn open(&mut self, route: Route) {
        let mut rx = self.store.subscribe();
        let mut route = route;
        loop {
            match evaluate(&self.store.current(), self.store.is_configured(), route) {
                RouteDecision::Allow => {
                    self.current = route;
                    self.show(route).await;
                    return;
                }
                RouteDecision::Waiting => {
                    println!("{}", View::Waiting.render_text());
                    if rx.changed().await.is_err() {
                        return;
                    }
                }
                RouteDecision::Unconfigured => {
                    self.current = route;
                    println!("{}", View::ConfigWarning.render_text());
                    return;
                }
                RouteDecision::RedirectToLogin { from } => {
                    self.pending = Some(from);
                    self.current = Route::Login;
                    let view = View::Login {
                        notice: Some("Please sign in to continue.".to_string()),
                    };
                    println!("{}", view.render_text());
                    return;
                }
                RouteDecision::Redirect(target) => {
                    debug!(from = route.path(), to = target.path(), "guard redirect");
                    route = target;
                }
            }
        }
    }

    async fn show(&mut self, route: Route) {
        let state = self.store.current();
        let result = match route {
            Route::Login => Ok(View::Login { notice: None }),
            Route::SignUp => Ok(View::SignUp),
            Route::Jobs => Ok(jobs::load(&self.client, &JobFilter::default()).await),
            Route::MyContracts => {
                let identity = state.identity().map(|i| i.id.clone());
                Ok(contracts::load(&self.client, self.cache.as_ref(), identity.as_deref()).await)
            }
            Route::Dashboard => Ok(self.dashboard.view()),
            Route::Applications => {
                let identity = state.identity().map(|i| i.id.clone());
                applications::load(&self.client, state.role(), identity.as_deref(), self.filter)
                    .await
            }
            Route::Admin => Ok(admin::load(&self.client).await),
        };
        let view = boundary::isolate(route.path(), || result);
        println!("{}", view.render_text());
        self.print_tabs();
    }

    fn print_tabs(&self) {
        let tabs = nav::items(self.store.current().role(), self.current);
        if tabs.is_empty() {
            return;
        }
        let rendered: Vec<String> = tabs
            .iter()
            .map(|tab| {
                let marker = if tab.active { "*" } else { " " };
                format!("[{marker}{} {} {}]", tab.icon, tab.label, tab.route.path())
            })
            .collect();
        println!("{}", rendered.join(" "));
    }

    async fn login(&mut self, rest: &str) {
        let mut parts = rest.split_whitespace();
        let form = LoginForm {
            email: parts.next().unwrap_or_default().to_string(),
            password: parts.next().unwrap_or_default().to_string(),
        };
        match auth::sign_in(&self.store, form, self.pending.take()).await {
            Ok(route) => self.open(route).await,
            Err(err) => println!("! {err}"),
        }
    }

    async fn signup(&mut self, rest: &str) {
        let mut parts = rest.split_whitespace();
        let form = SignUpForm {
            email: parts.next().unwrap_or_default().to_string(),
            password: parts.next().unwrap_or_default().to_string(),
            name: parts.next().unwrap_or_default().to_string(),
            phone: None,
            role: parts.next().map(str::to_string),
        };
        match auth::sign_up(&self.store, form).await {
            Ok(message) => println!("{message}"),
            Err(err) => println!("! {err}"),
        }
    }

    async fn apply(&mut self, rest: &str) {
        let mut parts = rest.split_whitespace();
        let Some(job_id) = parts.next().and_then(|raw| raw.parse::<i64>().ok()) else {
            println!("Usage: apply <job_id> [audio-file]");
            return;
        };
        let clip = match parts.next() {
            Some(path) => match std::fs::read(path) {
                Ok(bytes) => Some(AudioClip::new(bytes, mime_of(path))),
                Err(err) => {
                    println!("! Could not read {path}: {err}");
                    return;
                }
            },
            None => None,
        };

        let identity = self.store.current().identity().map(|i| i.id.clone());
        let message = jobs::apply(
            &self.client,
            self.blobs.as_ref(),
            self.cache.as_ref(),
            job_id,
            identity.as_deref(),
            clip.as_ref(),
            |err| {
                println!("! Audio upload failed: {err}");
                confirm("Continue without audio? [y/N] ")
            },
        )
        .await;
        println!("{message}");
    }

    async fn post(&mut self, rest: &str) {
        if self.current != Route::Dashboard {
            println!("Open the grower console first: open /dashboard");
            return;
        }
        let mut fields = rest.split('|').map(str::trim);
        let form = JobForm {
            title: fields.next().unwrap_or_default().to_string(),
            pay: fields.next().unwrap_or_default().to_string(),
            location: fields.next().unwrap_or_default().to_string(),
            date: fields.next().unwrap_or_default().to_string(),
            description: fields.next().map(str::to_string),
        };
        match self.dashboard.post_job(&self.client, form).await {
            Ok(message) => {
                println!("{message}");
                println!("{}", self.dashboard.view().render_text());
            }
            Err(err) => println!("! {err}"),
        }
    }

    async fn review(&mut self, accept: bool, rest: &str) {
        let Ok(application_id) = rest.parse::<i64>() else {
            println!("Usage: {} <application_id>", if accept { "accept" } else { "reject" });
            return;
        };
        match applications::review(&self.client, application_id, accept).await {
            Ok(()) => self.open(Route::Applications).await,
            Err(err) => println!("! {err}"),
        }
    }
}

fn mime_of(path: &str) -> &'static str {
    match path.rsplit('.').next() {
        Some("ogg") => "audio/ogg",
        Some("mp3") => "audio/mpeg",
        Some("wav") => "audio/wav",
        Some("m4a") => "audio/mp4",
        _ => "audio/webm",
    }
}

fn confirm(prompt: &str) -> bool {
    print!("{prompt}");
    let _ = io::stdout().flush();
    let mut answer = String::new();
    if io::stdin().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

fn print_help() {
    println!(
        "Commands:\n\
         \x20 open <path>                 navigate (/jobs /my-contracts /dashboard /applications /admin /login /signup)\n\
         \x20 login <email> <password>\n\
         \x20 signup <email> <password> <name> [worker|grower|admin]\n\
         \x20 logout\n\
         \x20 apply <job_id> [audio-file] apply to a job, optionally with a voice note\n\
         \x20 post <title>|<pay>|<location>|<date>[|description]\n\
         \x20 accept <id> / reject <id>   review an application\n\
         \x20 filter <all|pending|accepted|rejected>\n\
         \x20 reload\n\
         \x20 quit"
    );
}
