use rand::RngExt;
use uuid::Uuid;

use cheatplace_domain::email::Email;
use cheatplace_domain::verification::CodePurpose;

use crate::domain::repository::{BanRepository, Clock, Mailer, VerificationCodeRepository};
use crate::domain::types::{CODE_TTL, VerificationCode};
use crate::error::VerificationServiceError;
use crate::mail::verification_email;
use crate::usecase::rate_limit::RateLimiter;

/// Uniform 6-digit code, never starting with 0.
fn generate_code() -> String {
    let mut rng = rand::rng();
    rng.random_range(100_000..=999_999u32).to_string()
}

pub struct IssueCodeInput {
    pub email: String,
    pub purpose: String,
    pub user_id: Option<String>,
    /// Caller address as reported by the edge proxy.
    pub client_ip: Option<String>,
}

pub struct IssueCodeUseCase<R, B, M, C>
where
    R: VerificationCodeRepository,
    B: BanRepository,
    M: Mailer,
    C: Clock,
{
    pub codes: R,
    pub bans: B,
    pub mailer: M,
    pub clock: C,
}

impl<R, B, M, C> IssueCodeUseCase<R, B, M, C>
where
    R: VerificationCodeRepository,
    B: BanRepository,
    M: Mailer,
    C: Clock,
{
    pub async fn execute(&self, input: IssueCodeInput) -> Result<(), VerificationServiceError> {
        // 1. Validate → 400
        let email = Email::parse(&input.email)
            .map_err(|_| VerificationServiceError::InvalidRequest("invalid email address"))?;
        let purpose: CodePurpose = input
            .purpose
            .parse()
            .map_err(|_| VerificationServiceError::InvalidRequest("type must be login or signup"))?;
        let user_id = match input.user_id.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(
                raw.parse::<Uuid>()
                    .map_err(|_| VerificationServiceError::InvalidRequest("user_id must be a UUID"))?,
            ),
        };

        // 2. Ban checks → 403 (lookup errors fail closed)
        if self.bans.is_email_banned(email.as_str()).await? {
            return Err(VerificationServiceError::Banned);
        }
        if let Some(ip) = input.client_ip.as_deref() {
            if self.bans.is_ip_banned(ip).await? {
                return Err(VerificationServiceError::Banned);
            }
        }

        // 3. Rate limit → 429, nothing created
        let now = self.clock.now();
        let limiter = RateLimiter { codes: &self.codes };
        if !limiter.check_issuance(email.as_str(), now).await.allowed {
            return Err(VerificationServiceError::TooManyAttempts);
        }

        // 4. Replace the pending code for (email, purpose)
        let record = VerificationCode {
            id: Uuid::new_v4(),
            email: email.as_str().to_owned(),
            code: generate_code(),
            purpose,
            user_id,
            failed_attempts: 0,
            created_at: now,
            expires_at: now + CODE_TTL,
            verified: false,
        };
        self.codes.replace_pending(&record).await?;

        // 5. Send; on failure remove the code that never reached the user
        let mail = verification_email(&record.code, purpose);
        if let Err(e) = self
            .mailer
            .send(email.as_str(), &mail.subject, &mail.html)
            .await
        {
            if let Err(del) = self.codes.delete(record.id).await {
                tracing::warn!(error = ?del, email = email.as_str(), "failed to remove undelivered code");
            }
            return Err(VerificationServiceError::Delivery(e));
        }

        tracing::info!(email = email.as_str(), purpose = purpose.as_str(), "verification code sent");
        Ok(())
    }
}
