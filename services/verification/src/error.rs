use axum::http::{HeaderValue, StatusCode, header::RETRY_AFTER};
use axum::response::{IntoResponse, Response};
use serde_json::{Value, json};

use crate::domain::types::RETRY_AFTER_SECS;

/// Verification service error variants.
#[derive(Debug, thiserror::Error)]
pub enum VerificationServiceError {
    #[error("{0}")]
    InvalidRequest(&'static str),
    #[error("code must be 6 digits")]
    MalformedCode,
    #[error("invalid or expired code")]
    InvalidOrExpiredCode { attempts_left: u32 },
    #[error("too many attempts, try again later")]
    TooManyAttempts,
    #[error("unauthorized")]
    Unauthorized,
    #[error("forbidden")]
    Forbidden,
    #[error("access denied")]
    Banned,
    #[error("user not found")]
    UserNotFound,
    #[error("failed to send email")]
    Delivery(#[source] anyhow::Error),
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl VerificationServiceError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidRequest(_) => "INVALID_REQUEST",
            Self::MalformedCode => "MALFORMED_CODE",
            Self::InvalidOrExpiredCode { .. } => "INVALID_OR_EXPIRED_CODE",
            Self::TooManyAttempts => "TOO_MANY_ATTEMPTS",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden => "FORBIDDEN",
            Self::Banned => "BANNED",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::Delivery(_) => "DELIVERY_FAILED",
            Self::Internal(_) => "INTERNAL",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) | Self::MalformedCode | Self::InvalidOrExpiredCode { .. } => {
                StatusCode::BAD_REQUEST
            }
            Self::TooManyAttempts => StatusCode::TOO_MANY_REQUESTS,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden | Self::Banned => StatusCode::FORBIDDEN,
            Self::UserNotFound => StatusCode::NOT_FOUND,
            Self::Delivery(_) => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(&self) -> Value {
        let mut body = json!({
            "kind": self.kind(),
            "error": self.to_string(),
        });
        match self {
            Self::InvalidOrExpiredCode { attempts_left } => {
                body["attemptsLeft"] = json!(attempts_left);
            }
            Self::TooManyAttempts => {
                body["retryAfter"] = json!(RETRY_AFTER_SECS);
            }
            _ => {}
        }
        body
    }

    fn respond(self, mut body: Value) -> Response {
        // TraceLayer already records status for every request; only server-side
        // failures carry detail worth logging here.
        match &self {
            Self::Internal(e) => tracing::error!(error = %format!("{e:#}"), kind = "INTERNAL", "internal error"),
            Self::Delivery(e) => {
                tracing::error!(error = %format!("{e:#}"), kind = "DELIVERY_FAILED", "email delivery failed")
            }
            _ => {}
        }
        if body.is_null() {
            body = self.body();
        }
        let mut resp = (self.status(), axum::Json(body)).into_response();
        if matches!(self, Self::TooManyAttempts) {
            resp.headers_mut()
                .insert(RETRY_AFTER, HeaderValue::from(RETRY_AFTER_SECS));
        }
        resp
    }
}

impl IntoResponse for VerificationServiceError {
    fn into_response(self) -> Response {
        self.respond(Value::Null)
    }
}

/// Error response of `/verify-code`: same mapping, plus `"valid": false` in the body.
#[derive(Debug)]
pub struct VerifyRejection(pub VerificationServiceError);

impl From<VerificationServiceError> for VerifyRejection {
    fn from(e: VerificationServiceError) -> Self {
        Self(e)
    }
}

impl IntoResponse for VerifyRejection {
    fn into_response(self) -> Response {
        let mut body = self.0.body();
        body["valid"] = json!(false);
        self.0.respond(body)
    }
}
