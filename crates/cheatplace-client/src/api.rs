//! HTTP client for the verification service.
#![allow(async_fn_in_trait)]

use std::time::Duration;

use cheatplace_domain::email::Email;
use cheatplace_domain::verification::CodePurpose;
use reqwest::header::RETRY_AFTER;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};

use crate::error::ClientError;

/// Fallback when a 429 carries neither a body hint nor a `Retry-After` header.
const DEFAULT_RETRY_AFTER_SECS: u64 = 900;

/// Issues and checks verification codes.
pub trait CodeGateway {
    async fn issue_code(&self, email: &Email, purpose: CodePurpose) -> Result<(), ClientError>;
    async fn verify_code(
        &self,
        email: &Email,
        code: &str,
        purpose: CodePurpose,
    ) -> Result<(), ClientError>;
}

#[derive(Clone)]
pub struct VerificationApi {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

#[derive(Serialize)]
struct IssueBody<'a> {
    email: &'a str,
    #[serde(rename = "type")]
    purpose: &'a str,
}

#[derive(Serialize)]
struct VerifyBody<'a> {
    email: &'a str,
    code: &'a str,
    #[serde(rename = "type")]
    purpose: &'a str,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    kind: Option<String>,
    error: Option<String>,
    attempts_left: Option<u32>,
    retry_after: Option<u64>,
}

#[derive(Deserialize)]
struct VerifyResponse {
    valid: bool,
}

impl VerificationApi {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
            api_key: None,
        })
    }

    /// Sends `apikey` and a matching bearer header, as the hosted gateway expects.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    fn post(&self, path: &str) -> RequestBuilder {
        let req = self.client.post(format!("{}{path}", self.base_url));
        match &self.api_key {
            Some(key) => req.header("apikey", key).bearer_auth(key),
            None => req,
        }
    }
}

impl CodeGateway for VerificationApi {
    async fn issue_code(&self, email: &Email, purpose: CodePurpose) -> Result<(), ClientError> {
        let resp = self
            .post("/issue-verification-code")
            .json(&IssueBody {
                email: email.as_str(),
                purpose: purpose.as_str(),
            })
            .send()
            .await?;
        if resp.status().is_success() {
            return Ok(());
        }
        Err(error_from_response(resp).await)
    }

    async fn verify_code(
        &self,
        email: &Email,
        code: &str,
        purpose: CodePurpose,
    ) -> Result<(), ClientError> {
        let resp = self
            .post("/verify-code")
            .json(&VerifyBody {
                email: email.as_str(),
                code,
                purpose: purpose.as_str(),
            })
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(error_from_response(resp).await);
        }
        let body: VerifyResponse = resp.json().await?;
        if body.valid {
            Ok(())
        } else {
            Err(ClientError::InvalidCode {
                attempts_left: None,
            })
        }
    }
}

async fn error_from_response(resp: reqwest::Response) -> ClientError {
    let status = resp.status();
    let header_retry = resp
        .headers()
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok());
    let body = resp.json::<ErrorBody>().await.unwrap_or_default();
    classify(status, body, header_retry)
}

fn classify(status: StatusCode, body: ErrorBody, header_retry: Option<u64>) -> ClientError {
    let message = body
        .error
        .clone()
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("error").to_owned());
    match (status, body.kind.as_deref()) {
        (StatusCode::TOO_MANY_REQUESTS, _) => ClientError::RateLimited {
            retry_after: Duration::from_secs(
                body.retry_after
                    .or(header_retry)
                    .unwrap_or(DEFAULT_RETRY_AFTER_SECS),
            ),
        },
        (StatusCode::BAD_REQUEST, Some("INVALID_OR_EXPIRED_CODE")) => ClientError::InvalidCode {
            attempts_left: body.attempts_left,
        },
        (StatusCode::BAD_REQUEST, _) => ClientError::Validation(message),
        (StatusCode::FORBIDDEN, Some("BANNED")) => ClientError::Banned,
        (StatusCode::BAD_GATEWAY, _) => ClientError::Delivery,
        _ => ClientError::Server {
            status: status.as_u16(),
            message,
        },
    }
}
