//! Axum integration utilities.

use std::convert::Infallible;

use crate::error::{Denial, Error};
use crate::principal::Principal;

use ::axum::extract::FromRequestParts;
use ::axum::http::StatusCode;
use ::axum::http::request::Parts;
use ::axum::response::{IntoResponse, Response};

impl Denial {
    /// Status code as an [`http::StatusCode`].
    pub fn status(self) -> StatusCode {
        match self {
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
        }
    }
}

impl IntoResponse for Denial {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match &self {
            Error::Denied(denial) => return (*denial).into_response(),
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Conflict(_) => StatusCode::CONFLICT,
            Error::InvalidId(_) | Error::InvalidAction(_) | Error::InvalidPrincipal(_) => {
                StatusCode::BAD_REQUEST
            }
            Error::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        // Store errors may carry backend details; keep them out of responses.
        let message = if matches!(self, Error::Store(_)) {
            "store error".to_string()
        } else {
            self.to_string()
        };
        (status, message).into_response()
    }
}

/// Reads the principal attached to the request by an upstream layer.
///
/// Requests without one are treated as anonymous, so read-only routes keep
/// working for unauthenticated visitors.
impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<Principal>()
            .copied()
            .unwrap_or_else(Principal::anonymous))
    }
}

#[cfg(feature = "axum-jwt")]
pub mod jwt {
    use std::future::poll_fn;
    use std::pin::Pin;
    use std::sync::Arc;
    use std::task::{Context, Poll};

    use jsonwebtoken::{DecodingKey, Validation, decode};
    use thiserror::Error;

    use crate::principal::Principal;
    use crate::types::UserId;

    use ::axum::body::Body;
    use ::axum::http::header::AUTHORIZATION;
    use ::axum::http::{HeaderMap, Request, StatusCode};
    use ::axum::response::{IntoResponse, Response};
    use ::tower::{Layer, Service};

    /// Errors returned by JWT auth helpers.
    #[derive(Debug, Error)]
    pub enum AuthError {
        /// Authorization header format is invalid.
        #[error("invalid authorization header")]
        InvalidAuthorization,
        /// JWT validation error.
        #[error("invalid token")]
        InvalidToken,
        /// Claims violate the principal invariants.
        #[error("invalid claims: {0}")]
        InvalidClaims(String),
    }

    impl IntoResponse for AuthError {
        fn into_response(self) -> Response {
            (StatusCode::UNAUTHORIZED, self.to_string()).into_response()
        }
    }

    /// Claims issued at login: `{ sub, is_staff, is_superuser, is_active }`.
    #[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
    pub struct PrincipalClaims {
        /// User id.
        pub sub: u64,
        #[serde(default)]
        pub is_staff: bool,
        #[serde(default)]
        pub is_superuser: bool,
        #[serde(default = "active_by_default")]
        pub is_active: bool,
        /// Standard JWT expiration.
        pub exp: Option<usize>,
    }

    fn active_by_default() -> bool {
        true
    }

    impl PrincipalClaims {
        /// Converts claims into a principal, checking the role invariants.
        pub fn into_principal(self) -> Result<Principal, AuthError> {
            let id = UserId::new(self.sub).map_err(|err| AuthError::InvalidClaims(err.to_string()))?;
            Principal::new(Some(id), self.is_staff, self.is_superuser, self.is_active)
                .map_err(|err| AuthError::InvalidClaims(err.to_string()))
        }
    }

    /// Decoding settings for bearer tokens.
    #[derive(Clone)]
    pub struct JwtAuthState {
        decoding_key: Arc<DecodingKey>,
        validation: Validation,
    }

    impl std::fmt::Debug for JwtAuthState {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("JwtAuthState")
                .field("decoding_key", &"<redacted>")
                .field("validation", &self.validation)
                .finish()
        }
    }

    impl JwtAuthState {
        /// Creates a new JWT auth state.
        pub fn new(decoding_key: DecodingKey, validation: Validation) -> Self {
            Self {
                decoding_key: Arc::new(decoding_key),
                validation,
            }
        }

        /// Builds the principal for a request.
        ///
        /// No `Authorization` header means anonymous; a malformed header or
        /// a token that fails validation is an error.
        pub fn principal_from_headers(&self, headers: &HeaderMap) -> Result<Principal, AuthError> {
            let Some(token) = bearer_token(headers)? else {
                return Ok(Principal::anonymous());
            };
            let data = decode::<PrincipalClaims>(token, &self.decoding_key, &self.validation)
                .map_err(|_| AuthError::InvalidToken)?;
            data.claims.into_principal()
        }
    }

    /// Middleware layer that decodes bearer tokens into a [`Principal`].
    #[derive(Debug, Clone)]
    pub struct JwtAuthLayer {
        state: Arc<JwtAuthState>,
    }

    impl JwtAuthLayer {
        /// Creates a new JWT auth layer.
        pub fn new(state: JwtAuthState) -> Self {
            Self {
                state: Arc::new(state),
            }
        }
    }

    impl<S> Layer<S> for JwtAuthLayer {
        type Service = JwtAuthService<S>;

        fn layer(&self, inner: S) -> Self::Service {
            JwtAuthService {
                inner,
                state: self.state.clone(),
            }
        }
    }

    /// Middleware service that attaches the request [`Principal`].
    #[derive(Debug, Clone)]
    pub struct JwtAuthService<S> {
        inner: S,
        state: Arc<JwtAuthState>,
    }

    impl<S> Service<Request<Body>> for JwtAuthService<S>
    where
        S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
        S::Future: Send + 'static,
    {
        type Response = Response;
        type Error = S::Error;
        type Future =
            Pin<Box<dyn std::future::Future<Output = Result<Response, Self::Error>> + Send>>;

        fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
            Poll::Ready(Ok(()))
        }

        fn call(&mut self, mut req: Request<Body>) -> Self::Future {
            let state = self.state.clone();
            let mut inner = self.inner.clone();

            Box::pin(async move {
                match state.principal_from_headers(req.headers()) {
                    Ok(principal) => {
                        req.extensions_mut().insert(principal);
                        poll_fn(|cx| inner.poll_ready(cx)).await?;
                        inner.call(req).await
                    }
                    Err(err) => Ok(err.into_response()),
                }
            })
        }
    }

    fn bearer_token(headers: &HeaderMap) -> Result<Option<&str>, AuthError> {
        let Some(value) = headers.get(AUTHORIZATION) else {
            return Ok(None);
        };
        let value = value
            .to_str()
            .map_err(|_| AuthError::InvalidAuthorization)?;
        let token = value
            .strip_prefix("Bearer ")
            .ok_or(AuthError::InvalidAuthorization)?;
        if token.is_empty() {
            return Err(AuthError::InvalidAuthorization);
        }
        Ok(Some(token))
    }

}
