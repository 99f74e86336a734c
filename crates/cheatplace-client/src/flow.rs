//! Verification-gated authentication flow.
//!
//! `CollectingCredentials → AwaitingCode → Authenticated`. The submitted
//! credentials never change once the flow is built; every failure leaves the
//! flow where it was so the user can retry or ask for a new code.

use std::time::Duration;

use cheatplace_domain::email::Email;
use cheatplace_domain::verification::is_well_formed_code;
use tokio::time::Instant;

use crate::api::CodeGateway;
use crate::error::ClientError;
use crate::form::Credentials;
use crate::identity::{IdentityProvider, Session};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowState {
    CollectingCredentials,
    AwaitingCode,
    Authenticated(Session),
}

pub struct AuthFlow<G, I> {
    gateway: G,
    identity: I,
    credentials: Credentials,
    email: Email,
    state: FlowState,
    resend_blocked_until: Option<Instant>,
}

impl<G: CodeGateway, I: IdentityProvider> AuthFlow<G, I> {
    /// Validates the form; nothing is sent until [`Self::request_code`].
    pub fn new(gateway: G, identity: I, credentials: Credentials) -> Result<Self, ClientError> {
        credentials.validate()?;
        let email = Email::parse(credentials.email())
            .map_err(|e| ClientError::Validation(e.to_string()))?;
        Ok(Self {
            gateway,
            identity,
            credentials,
            email,
            state: FlowState::CollectingCredentials,
            resend_blocked_until: None,
        })
    }

    pub fn state(&self) -> &FlowState {
        &self.state
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Time left before a new code may be requested after a rate-limit response.
    pub fn resend_available_in(&self) -> Option<Duration> {
        let until = self.resend_blocked_until?;
        let left = until.saturating_duration_since(Instant::now());
        (!left.is_zero()).then_some(left)
    }

    /// Asks the service to email a code. Also the resend action.
    pub async fn request_code(&mut self) -> Result<(), ClientError> {
        if matches!(self.state, FlowState::Authenticated(_)) {
            return Err(ClientError::InvalidState("already authenticated"));
        }
        if let Some(retry_after) = self.resend_available_in() {
            return Err(ClientError::RateLimited { retry_after });
        }

        let purpose = self.credentials.purpose();
        match self.gateway.issue_code(&self.email, purpose).await {
            Ok(()) => {
                tracing::debug!(email = %self.email, %purpose, "verification code requested");
                self.state = FlowState::AwaitingCode;
                Ok(())
            }
            Err(e) => Err(self.note_failure(e)),
        }
    }

    /// Checks `code` and, once accepted, performs the real sign-in or sign-up
    /// with the credentials collected at the start.
    pub async fn submit_code(&mut self, code: &str) -> Result<Session, ClientError> {
        if self.state != FlowState::AwaitingCode {
            return Err(ClientError::InvalidState("no verification code requested"));
        }
        let code = code.trim();
        if !is_well_formed_code(code) {
            return Err(ClientError::Validation(
                "Le code doit contenir 6 chiffres".to_owned(),
            ));
        }

        let purpose = self.credentials.purpose();
        if let Err(e) = self.gateway.verify_code(&self.email, code, purpose).await {
            return Err(self.note_failure(e));
        }

        let session = match &self.credentials {
            Credentials::Login(form) => self.identity.sign_in(&self.email, &form.password).await,
            Credentials::Signup(form) => {
                self.identity
                    .sign_up(&form.username, &self.email, &form.password)
                    .await
            }
        }?;

        tracing::debug!(email = %self.email, %purpose, "authenticated after verification");
        self.state = FlowState::Authenticated(session.clone());
        Ok(session)
    }

    fn note_failure(&mut self, e: ClientError) -> ClientError {
        if let ClientError::RateLimited { retry_after } = &e {
            self.resend_blocked_until = Some(Instant::now() + *retry_after);
        }
        e
    }
}
