pub mod admin;
pub mod verification;

use axum::http::{HeaderMap, StatusCode};
use uuid::Uuid;

use cheatplace_auth_types::bearer::BearerToken;
use cheatplace_auth_types::token::validate_access_token;

use crate::error::VerificationServiceError;
use crate::state::AppState;

/// Answers a bare `OPTIONS`; real preflights are handled by the CORS layer.
pub async fn options_ok() -> StatusCode {
    StatusCode::OK
}

/// Caller address: first `X-Forwarded-For` hop, else `X-Real-IP`.
pub fn client_ip(headers: &HeaderMap) -> Option<String> {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());
    let real = || {
        headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };
    forwarded.or_else(real).map(str::to_owned)
}

/// Validate the platform access token and return the caller's user id.
pub(crate) fn authenticate(
    state: &AppState,
    bearer: &BearerToken,
) -> Result<Uuid, VerificationServiceError> {
    let info = validate_access_token(&bearer.0, &state.platform_jwt_secret).map_err(|e| {
        tracing::debug!(error = %e, "rejected platform token");
        VerificationServiceError::Unauthorized
    })?;
    Ok(info.user_id)
}

/// Treat absent and blank JSON fields alike.
pub(crate) fn present(field: Option<String>) -> Option<String> {
    field.filter(|v| !v.trim().is_empty())
}
