use crate::resource::ResourceRef;
use std::fmt;
use thiserror::Error;

/// Store-layer error type.
pub type StoreError = Box<dyn std::error::Error + Send + Sync>;

/// Crate result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Why a request was denied.
///
/// The distinction only matters at the request boundary: an anonymous caller
/// is told to authenticate, everyone else is simply refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Denial {
    /// The principal is not authenticated.
    Unauthenticated,
    /// The principal is authenticated but not allowed.
    Forbidden,
}

impl Denial {
    /// Returns the HTTP status code conventionally used for this denial.
    pub fn status_code(self) -> u16 {
        match self {
            Self::Unauthenticated => 401,
            Self::Forbidden => 403,
        }
    }
}

impl fmt::Display for Denial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unauthenticated => f.write_str("authentication required"),
            Self::Forbidden => f.write_str("forbidden"),
        }
    }
}

/// Errors returned by this crate.
#[derive(Debug, Error)]
pub enum Error {
    /// Store error wrapper.
    #[error("store error: {0}")]
    Store(#[source] StoreError),
    /// Invalid identifier input.
    #[error("invalid id: {0}")]
    InvalidId(String),
    /// Invalid action input.
    #[error("invalid action: {0}")]
    InvalidAction(String),
    /// Principal flags violate the role invariants.
    #[error("invalid principal: {0}")]
    InvalidPrincipal(String),
    /// Authorization failed.
    #[error("denied: {0}")]
    Denied(Denial),
    /// Resource reference does not resolve.
    #[error("not found: {0}")]
    NotFound(ResourceRef),
    /// A create targeted a resource that already exists.
    #[error("already exists: {0}")]
    Conflict(ResourceRef),
}

impl From<StoreError> for Error {
    fn from(error: StoreError) -> Self {
        Self::Store(error)
    }
}

/// Cache backend error.
///
/// Never surfaced to callers of the engine: failed invalidations and failed
/// populates are logged and the operation carries on.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Backend could not be reached or is in a broken state.
    #[error("cache unavailable: {0}")]
    Unavailable(String),
}
