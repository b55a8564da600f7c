pub mod config;
pub mod http_provider;
pub mod provider;
pub mod registry;
pub mod store;

pub use config::Config;
pub use provider::{AuthEvent, AuthProvider, ProviderSession, ProviderUser};
pub use registry::{UserRecord, UserRegistry};
pub use store::{SessionState, SessionStore};
