use cheatplace_domain::email::Email;
use cheatplace_domain::verification::{CodePurpose, is_well_formed_code};

use crate::domain::repository::{Clock, VerificationCodeRepository};
use crate::error::VerificationServiceError;
use crate::usecase::rate_limit::{RateLimiter, window_start};

pub struct VerifyCodeInput {
    pub email: String,
    pub code: String,
    pub purpose: String,
}

pub struct VerifyCodeUseCase<R, C>
where
    R: VerificationCodeRepository,
    C: Clock,
{
    pub codes: R,
    pub clock: C,
}

impl<R, C> VerifyCodeUseCase<R, C>
where
    R: VerificationCodeRepository,
    C: Clock,
{
    /// Accept a live code exactly once. Success only unblocks the caller's own
    /// sign-in or sign-up; it does not authenticate anyone.
    pub async fn execute(&self, input: VerifyCodeInput) -> Result<(), VerificationServiceError> {
        // 1. Shape checks, no store access
        if !is_well_formed_code(&input.code) {
            return Err(VerificationServiceError::MalformedCode);
        }
        let email = Email::parse(&input.email)
            .map_err(|_| VerificationServiceError::InvalidRequest("invalid email address"))?;
        let purpose: CodePurpose = input
            .purpose
            .parse()
            .map_err(|_| VerificationServiceError::InvalidRequest("type must be login or signup"))?;

        // 2. Charge the guess up front; over budget → 429
        let now = self.clock.now();
        let limiter = RateLimiter { codes: &self.codes };
        let guess = limiter.reserve_guess(email.as_str(), now).await;
        if !guess.allowed {
            return Err(VerificationServiceError::TooManyAttempts);
        }

        // 3. Match email + code + purpose among live codes; a miss keeps the charge
        let Some(found) = self
            .codes
            .find_live(email.as_str(), &input.code, purpose, now)
            .await?
        else {
            return Err(VerificationServiceError::InvalidOrExpiredCode {
                attempts_left: guess.remaining,
            });
        };

        // 4. Consume; losing a concurrent race reads as an unknown code
        if !self.codes.mark_verified(found.id).await? {
            return Err(VerificationServiceError::InvalidOrExpiredCode {
                attempts_left: guess.remaining,
            });
        }
        limiter.release_guess(&guess).await;

        // Rows still inside the window keep counting toward issuance
        if let Err(e) = self
            .codes
            .delete_stale(email.as_str(), window_start(now))
            .await
        {
            tracing::warn!(error = ?e, email = email.as_str(), "stale code cleanup failed");
        }

        tracing::info!(email = email.as_str(), purpose = purpose.as_str(), "verification code accepted");
        Ok(())
    }
}
