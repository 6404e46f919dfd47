//! Identity boundary errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    /// The clean "not logged in" outcome: the IAM answered and said no.
    #[error("Not authenticated")]
    Unauthenticated,

    /// Network-level failure reaching the IAM, including timeouts.
    #[error("Identity service unreachable: {0}")]
    Unreachable(String),

    /// IAM answered with an unexpected status (anything non-2xx that is not
    /// a 401/403).
    #[error("Identity service returned status {status}")]
    UpstreamStatus { status: u16 },

    /// IAM answered 2xx but the body was not the expected shape.
    #[error("Malformed identity service response: {0}")]
    MalformedResponse(String),
}

impl AuthError {
    /// HTTP-equivalent status for boundary layers.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Unauthenticated => 401,
            Self::Unreachable(_) => 503,
            Self::UpstreamStatus { .. } | Self::MalformedResponse(_) => 502,
        }
    }
}
