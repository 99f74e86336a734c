//! `Authorization: Bearer` extractor.

use axum::Json;
use axum::extract::FromRequestParts;
use axum::response::{IntoResponse, Response};
use http::StatusCode;
use http::request::Parts;

/// Raw bearer token from the `Authorization` header.
///
/// Only extracts the token; signature and expiry are checked by the handler
/// with [`crate::token::validate_access_token`] because the secret lives in
/// service state.
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

/// Rejection when the header is absent or not a bearer credential.
#[derive(Debug)]
pub struct MissingBearer;

impl IntoResponse for MissingBearer {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "kind": "UNAUTHORIZED",
            "error": "unauthorized",
        });
        (StatusCode::UNAUTHORIZED, Json(body)).into_response()
    }
}

impl BearerToken {
    pub fn from_headers(headers: &http::HeaderMap) -> Option<Self> {
        let value = headers
            .get(http::header::AUTHORIZATION)?
            .to_str()
            .ok()?
            .trim();
        let (scheme, token) = value.split_once(' ')?;
        if !scheme.eq_ignore_ascii_case("bearer") {
            return None;
        }
        let token = token.trim();
        if token.is_empty() {
            return None;
        }
        Some(Self(token.to_owned()))
    }
}

impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = MissingBearer;

    // Header parsing is synchronous; returning an `async move` block keeps the
    // future 'static so it does not borrow `parts`.
    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let token = Self::from_headers(&parts.headers);
        async move { token.ok_or(MissingBearer) }
    }
}
