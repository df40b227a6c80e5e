use std::sync::Arc;

use axum::http::{HeaderMap, header::AUTHORIZATION};
use subtle::ConstantTimeEq;

use crate::config::AuthSettings;
use crate::error::{BlogError, Result};
use crate::store::Store;

/// Per-request data handed to every resolver.
pub struct RequestContext {
    pub store: Arc<Store>,
    /// Bearer token presented with the request, if any.
    pub token: Option<String>,
}

impl RequestContext {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store, token: None }
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    /// Builds the context from an HTTP request's headers
    /// (`Authorization: Bearer <token>`).
    pub fn from_headers(store: Arc<Store>, headers: &HeaderMap) -> Self {
        let token = headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_bearer);
        Self::new(store).with_token(token)
    }
}

fn parse_bearer(value: &str) -> Option<String> {
    let (scheme, token) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then(|| token.to_string())
}

/// Who may run mutations. Queries are never gated.
#[derive(Debug, Clone, Default)]
pub struct AuthPolicy {
    token: Option<String>,
}

impl AuthPolicy {
    /// Anyone may mutate.
    pub fn open() -> Self {
        Self::default()
    }

    /// Mutations need `Authorization: Bearer <token>`.
    pub fn bearer(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
        }
    }

    pub fn from_settings(settings: &AuthSettings) -> Self {
        Self {
            token: settings.token.clone(),
        }
    }

    pub fn is_open(&self) -> bool {
        self.token.is_none()
    }

    pub fn authorize(&self, presented: Option<&str>) -> Result<()> {
        match (self.token.as_deref(), presented) {
            (None, _) => Ok(()),
            (Some(expected), Some(token)) if tokens_match(expected, token) => Ok(()),
            (Some(_), Some(_)) => Err(BlogError::Unauthenticated(
                "Invalid bearer token".to_string(),
            )),
            (Some(_), None) => Err(BlogError::Unauthenticated(
                "Missing bearer token".to_string(),
            )),
        }
    }
}

fn tokens_match(expected: &str, presented: &str) -> bool {
    let (a, b) = (expected.as_bytes(), presented.as_bytes());
    a.len() == b.len() && bool::from(a.ct_eq(b))
}
