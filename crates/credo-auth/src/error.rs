use credo_core::UnixMillis;

/// Failures raised by value-type construction and token verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// A value-type invariant was violated at construction.
    Construction(String),
    /// A presented token is unusable: bad signature, missing or mistyped
    /// claim, or a nested construction failure during verification.
    InvalidParameter(String),
    /// A presented token is past its expiry instant.
    Expired(UnixMillis),
}

impl AuthError {
    /// Collapse construction failures hit while verifying untrusted input
    /// into the single parameter-error kind. Expiry stays distinct.
    pub(crate) fn parameter(self) -> Self {
        match self {
            Self::Construction(s) => Self::InvalidParameter(s),
            other => other,
        }
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Construction(s) => write!(f, "invalid construction: {}", s),
            Self::InvalidParameter(s) => write!(f, "invalid parameter: {}", s),
            Self::Expired(at) => write!(f, "token expired at {}", at),
        }
    }
}

impl std::error::Error for AuthError {}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        Self::InvalidParameter(e.to_string())
    }
}
