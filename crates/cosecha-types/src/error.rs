use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// App-wide error taxonomy. Display strings are user-facing; pages show them
/// verbatim instead of crashing the render tree.
#[derive(Debug, Error)]
pub enum Error {
    /// A required backend or provider is not set up. The app degrades
    /// instead of refusing to start.
    #[error("{0}")]
    Configuration(String),

    /// Required user input is missing or malformed. Blocks the submission.
    #[error("{0}")]
    Validation(String),

    /// The transport itself failed, as opposed to the server answering
    /// with an error status.
    #[error("Network error: {0}")]
    Network(String),

    /// The server answered with a non-2xx status.
    #[error("Server error ({status}): {message}")]
    Http { status: u16, message: String },

    /// Anything else, caught at the nearest isolation boundary.
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl Error {
    /// The standard degraded-mode message for a missing auth provider.
    pub fn unconfigured() -> Error {
        Error::Configuration(
            "Auth provider is not configured. Set COSECHA_AUTH_URL and COSECHA_AUTH_KEY to use this feature."
                .to_string(),
        )
    }

    /// Connectivity failure with the reachability hint the pages rely on.
    pub fn unreachable() -> Error {
        Error::Network(
            "Could not connect to the server. Please check if the backend is running.".to_string(),
        )
    }

    pub fn is_network(&self) -> bool {
        matches!(self, Error::Network(_))
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_))
    }
}
