//! IAM status-check client.
//!
//! One request per authentication check, bounded by a fixed timeout, no
//! retries. The caller's cookie header is forwarded untouched.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::AuthError;
use crate::roles::is_admin;

/// The identity the rest of the system runs with.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub id: String,
    pub is_admin: bool,
}

pub struct IamClient {
    base_url: String,
    client: reqwest::Client,
}

impl IamClient {
    /// # Errors
    ///
    /// Returns `AuthError::Unreachable` if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, AuthError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AuthError::Unreachable(e.to_string()))?;
        Ok(Self {
            base_url: base_url.into(),
            client,
        })
    }

    /// Resolve the caller behind `cookie_header` via `GET /auth/status/`.
    ///
    /// # Errors
    ///
    /// `Unauthenticated` for a 401/403 or an `authenticated: false` body;
    /// `Unreachable` for network failures and timeouts; `UpstreamStatus` for
    /// any other non-2xx; `MalformedResponse` for bodies that do not parse.
    pub async fn authenticate(&self, cookie_header: &str) -> Result<AuthenticatedUser, AuthError> {
        let url = format!("{}/auth/status/", self.base_url.trim_end_matches('/'));
        debug!(%url, "checking auth status");

        let response = self
            .client
            .get(&url)
            .header(reqwest::header::COOKIE, cookie_header)
            .send()
            .await
            .map_err(|e| AuthError::Unreachable(e.to_string()))?;

        if let Some(err) = classify_status(response.status().as_u16()) {
            return Err(err);
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| AuthError::MalformedResponse(e.to_string()))?;
        parse_status_body(&body)
    }
}

/// Map an IAM response status to a failure, `None` for 2xx.
const fn classify_status(status: u16) -> Option<AuthError> {
    match status {
        200..=299 => None,
        401 | 403 => Some(AuthError::Unauthenticated),
        other => Some(AuthError::UpstreamStatus { status: other }),
    }
}

/// Interpret a 2xx `/auth/status/` body.
///
/// # Errors
///
/// `Unauthenticated` when the body says so; `MalformedResponse` when the
/// `authenticated` flag or `user.id` is missing.
pub fn parse_status_body(body: &Value) -> Result<AuthenticatedUser, AuthError> {
    let authenticated = body
        .get("authenticated")
        .and_then(Value::as_bool)
        .ok_or_else(|| AuthError::MalformedResponse("missing 'authenticated' flag".to_string()))?;
    if !authenticated {
        return Err(AuthError::Unauthenticated);
    }

    let id = body
        .get("user")
        .and_then(|user| user.get("id"))
        .and_then(Value::as_str)
        .ok_or_else(|| AuthError::MalformedResponse("missing 'user.id'".to_string()))?;

    Ok(AuthenticatedUser {
        id: id.to_string(),
        is_admin: is_admin(body),
    })
}
