//! Pluggable authentication for the control-plane API. An [`Authenticator`]
//! resolves a bearer token to a caller [`Identity`]; the [`RequireIdentity`]
//! extractor wires it into axum handlers. Authorization (role/tenant-scope
//! checks) happens separately in [`crate::authz`].

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, header::AUTHORIZATION, request::Parts},
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::authz::Subject;
use crate::server::AppState;

/// An authenticated caller: a display name for audit labels plus the
/// authorization subject built from the session context.
#[derive(Debug, Clone)]
pub struct Identity {
    pub name: String,
    pub subject: Subject,
}

#[derive(Debug)]
pub enum AuthError {
    MissingAuth,
    InvalidScheme,
    InvalidToken,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let message = match self {
            AuthError::MissingAuth => "Authentication required",
            AuthError::InvalidScheme => "Invalid authorization scheme",
            AuthError::InvalidToken => "Invalid token",
        };

        let body = json!({ "error": message });
        let mut response = (StatusCode::UNAUTHORIZED, Json(body)).into_response();
        response.headers_mut().insert(
            "WWW-Authenticate",
            "Bearer realm=\"drover\"".parse().expect("static header"),
        );
        response
    }
}

/// Resolves a raw bearer token to a caller identity.
pub trait Authenticator: Send + Sync {
    fn authenticate(&self, token: &str) -> Result<Identity, AuthError>;
}

/// Token-table authenticator. The serve path seeds it with one generated
/// admin token; tests register additional scoped identities.
pub struct TokenAuthenticator {
    identities: Mutex<HashMap<String, Identity>>,
}

impl TokenAuthenticator {
    #[must_use]
    pub fn new() -> Self {
        Self {
            identities: Mutex::new(HashMap::new()),
        }
    }

    pub fn register(&self, token: impl Into<String>, identity: Identity) {
        self.identities
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(token.into(), identity);
    }
}

impl Default for TokenAuthenticator {
    fn default() -> Self {
        Self::new()
    }
}

impl Authenticator for TokenAuthenticator {
    fn authenticate(&self, token: &str) -> Result<Identity, AuthError> {
        self.identities
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(token)
            .cloned()
            .ok_or(AuthError::InvalidToken)
    }
}

/// Extractor that requires a valid authenticated identity.
pub struct RequireIdentity(pub Identity);

impl FromRequestParts<Arc<AppState>> for RequireIdentity {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok());

        let raw_token = extract_bearer_token(auth_header)?.ok_or(AuthError::MissingAuth)?;
        let identity = state.authenticator.authenticate(&raw_token)?;
        Ok(RequireIdentity(identity))
    }
}

/// Extracts the token from an Authorization header. Returns `None` when no
/// header is present; errors on an unsupported scheme.
fn extract_bearer_token(auth_header: Option<&str>) -> Result<Option<String>, AuthError> {
    match auth_header {
        Some(header) => match header.strip_prefix("Bearer ") {
            Some(token) if !token.trim().is_empty() => Ok(Some(token.trim().to_string())),
            Some(_) => Err(AuthError::InvalidToken),
            None => Err(AuthError::InvalidScheme),
        },
        None => Ok(None),
    }
}
