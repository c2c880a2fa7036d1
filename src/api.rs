//! Typed helpers for the backend endpoints the auth core depends on.
//!
//! ERROR HANDLING
//! ==============
//! Every helper returns the client's [`ApiError`] unchanged so callers keep
//! the HTTP status for feature-level handling.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::auth::UserProfile;
use crate::config::Endpoints;
use crate::http::{ApiClient, ApiError, ApiRequest, ApiResponse};

/// Backend response wrapper: `{ "data": ... }`.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
}

/// Tokens minted by login or reissue.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

#[derive(Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials").field("email", &self.email).field("password", &"<redacted>").finish()
    }
}

// =============================================================================
// REISSUE
// =============================================================================

/// `POST <reissue>` authorized with the refresh token.
///
/// # Errors
///
/// Returns [`ApiError::InvalidRequest`] if the token cannot go in a header.
pub fn reissue_request(path: &str, refresh_token: &str) -> Result<ApiRequest, ApiError> {
    let mut request = ApiRequest::post(path);
    if !request.set_bearer(refresh_token) {
        return Err(ApiError::InvalidRequest("refresh token is not a valid header value".into()));
    }
    Ok(request)
}

/// Decode a token response, rejecting an empty access token.
///
/// # Errors
///
/// Returns [`ApiError::Decode`] when the body is not `{ data: { accessToken } }`.
pub fn parse_token_pair(response: &ApiResponse) -> Result<TokenPair, ApiError> {
    let envelope: Envelope<TokenPair> = response.json()?;
    if envelope.data.access_token.is_empty() {
        return Err(ApiError::Decode("empty accessToken".into()));
    }
    Ok(envelope.data)
}

// =============================================================================
// PROFILE
// =============================================================================

/// Extract a user profile from a body that may be empty, `null`, `{}`, a bare
/// profile object, or any of those wrapped in `{ data: ... }`.
///
/// # Errors
///
/// Returns [`ApiError::Decode`] if the body is not JSON or not an object.
pub fn profile_from_body(response: &ApiResponse) -> Result<Option<UserProfile>, ApiError> {
    if response.is_empty() {
        return Ok(None);
    }
    let value: Value = response.json()?;
    profile_from_value(value)
}

fn profile_from_value(value: Value) -> Result<Option<UserProfile>, ApiError> {
    match value {
        Value::Null => Ok(None),
        Value::Object(mut fields) => {
            if let Some(data) = fields.remove("data") {
                return profile_from_value(data);
            }
            if fields.is_empty() { Ok(None) } else { Ok(Some(UserProfile::new(fields))) }
        }
        other => Err(ApiError::Decode(format!("expected a user object, got {other}"))),
    }
}

/// `GET /members/info`: the current user's profile.
///
/// # Errors
///
/// Returns the request error, or [`ApiError::Decode`] when no profile came back.
pub async fn members_info(client: &ApiClient, endpoints: &Endpoints) -> Result<UserProfile, ApiError> {
    let response = client.send(ApiRequest::get(&endpoints.member_info)).await?;
    profile_from_body(&response)?.ok_or_else(|| ApiError::Decode("empty member info".into()))
}

/// `GET <session>`: who the server thinks is logged in, if anyone.
///
/// # Errors
///
/// Returns the request error or a decode failure.
pub async fn try_session(client: &ApiClient, endpoints: &Endpoints) -> Result<Option<UserProfile>, ApiError> {
    let response = client.send(ApiRequest::get(&endpoints.session)).await?;
    profile_from_body(&response)
}

// =============================================================================
// LOGIN / LOGOUT
// =============================================================================

/// `POST /auth/login` with email and password.
///
/// # Errors
///
/// Returns the request error or a decode failure.
pub async fn login(client: &ApiClient, endpoints: &Endpoints, credentials: &Credentials) -> Result<TokenPair, ApiError> {
    let body = serde_json::to_value(credentials).map_err(|e| ApiError::InvalidRequest(e.to_string()))?;
    let response = client.send(ApiRequest::post(&endpoints.login).with_body(body)).await?;
    parse_token_pair(&response)
}

/// `POST /auth/logout`.
///
/// # Errors
///
/// Returns the request error.
pub async fn logout(client: &ApiClient, endpoints: &Endpoints) -> Result<(), ApiError> {
    client.send(ApiRequest::post(&endpoints.logout)).await.map(|_| ())
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;
