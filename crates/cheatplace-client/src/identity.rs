//! Identity platform collaborator: the real sign-in / sign-up that the
//! verification step gates.
#![allow(async_fn_in_trait)]

use std::time::Duration;

use cheatplace_domain::email::Email;
use cheatplace_domain::id::UserId;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::ClientError;

/// Authenticated (or freshly registered) account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: UserId,
    pub email: Option<String>,
    /// `None` when the platform wants the address confirmed before issuing tokens.
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}

pub trait IdentityProvider {
    async fn sign_in(&self, email: &Email, password: &str) -> Result<Session, ClientError>;
    async fn sign_up(
        &self,
        username: &str,
        email: &Email,
        password: &str,
    ) -> Result<Session, ClientError>;
}

/// Password-grant and signup endpoints of the hosted auth platform.
#[derive(Clone)]
pub struct PlatformIdentityProvider {
    client: Client,
    base_url: String,
    api_key: String,
}

#[derive(Serialize)]
struct PasswordGrant<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct SignupBody<'a> {
    email: &'a str,
    password: &'a str,
    data: SignupMetadata<'a>,
}

#[derive(Serialize)]
struct SignupMetadata<'a> {
    username: &'a str,
    role: &'a str,
}

#[derive(Deserialize)]
struct PlatformUser {
    id: Uuid,
    email: Option<String>,
}

/// Token response, or a bare user object when signup awaits confirmation.
#[derive(Deserialize)]
struct AuthResponse {
    access_token: Option<String>,
    refresh_token: Option<String>,
    user: Option<PlatformUser>,
    id: Option<Uuid>,
    email: Option<String>,
}

impl PlatformIdentityProvider {
    pub fn new(
        base_url: &str,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ClientError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
            api_key: api_key.into(),
        })
    }

    async fn call(&self, path: &str, body: &impl Serialize) -> Result<Session, ClientError> {
        let resp = self
            .client
            .post(format!("{}{path}", self.base_url))
            .header("apikey", &self.api_key)
            .json(body)
            .send()
            .await?;
        let status = resp.status();
        let value: Value = resp.json().await.unwrap_or(Value::Null);
        if !status.is_success() {
            return Err(rejection(status, &value));
        }
        let parsed: AuthResponse = serde_json::from_value(value).map_err(|e| {
            ClientError::Server {
                status: status.as_u16(),
                message: format!("unexpected auth response: {e}"),
            }
        })?;
        session_from(parsed).ok_or_else(|| ClientError::Server {
            status: status.as_u16(),
            message: "auth response has no user".to_owned(),
        })
    }
}

impl IdentityProvider for PlatformIdentityProvider {
    async fn sign_in(&self, email: &Email, password: &str) -> Result<Session, ClientError> {
        self.call(
            "/auth/v1/token?grant_type=password",
            &PasswordGrant {
                email: email.as_str(),
                password,
            },
        )
        .await
    }

    async fn sign_up(
        &self,
        username: &str,
        email: &Email,
        password: &str,
    ) -> Result<Session, ClientError> {
        self.call(
            "/auth/v1/signup",
            &SignupBody {
                email: email.as_str(),
                password,
                data: SignupMetadata {
                    username,
                    role: "client",
                },
            },
        )
        .await
    }
}

fn session_from(resp: AuthResponse) -> Option<Session> {
    let (user_id, email) = match resp.user {
        Some(user) => (user.id, user.email),
        None => (resp.id?, resp.email),
    };
    Some(Session {
        user_id: UserId(user_id),
        email,
        access_token: resp.access_token,
        refresh_token: resp.refresh_token,
    })
}

/// 4xx from the platform means the credentials were refused; anything else is a server fault.
fn rejection(status: StatusCode, body: &Value) -> ClientError {
    let message = ["error_description", "msg", "message", "error"]
        .iter()
        .find_map(|k| body.get(*k).and_then(Value::as_str))
        .unwrap_or("authentication failed")
        .to_owned();
    if status.is_client_error() {
        ClientError::Rejected(message)
    } else {
        ClientError::Server {
            status: status.as_u16(),
            message,
        }
    }
}
