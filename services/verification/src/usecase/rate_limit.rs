use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::repository::VerificationCodeRepository;
use crate::domain::types::{
    AttemptReservation, MAX_FAILED_VERIFICATIONS_PER_WINDOW, MAX_ISSUANCES_PER_WINDOW,
    RATE_WINDOW,
};

/// Outcome of a rate-limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateDecision {
    pub allowed: bool,
    /// Slots left in the current window before this request.
    pub remaining: u32,
}

impl RateDecision {
    fn from_used(used: u64, limit: u32) -> Self {
        let used = u32::try_from(used).unwrap_or(u32::MAX);
        Self {
            allowed: used < limit,
            remaining: limit.saturating_sub(used),
        }
    }

    fn open(limit: u32) -> Self {
        Self {
            allowed: true,
            remaining: limit,
        }
    }
}

/// Start of the rate window ending at `now`.
pub fn window_start(now: DateTime<Utc>) -> DateTime<Utc> {
    now - RATE_WINDOW
}

/// Sliding-window limits over the code store.
///
/// A lookup failure fails open: the request is allowed and the error is logged.
pub struct RateLimiter<'a, R>
where
    R: VerificationCodeRepository,
{
    pub codes: &'a R,
}

impl<R> RateLimiter<'_, R>
where
    R: VerificationCodeRepository,
{
    /// Allowed while fewer than 5 codes were issued to `email` in the window.
    pub async fn check_issuance(&self, email: &str, now: DateTime<Utc>) -> RateDecision {
        match self
            .codes
            .count_issued_since(email, window_start(now))
            .await
        {
            Ok(count) => RateDecision::from_used(count, MAX_ISSUANCES_PER_WINDOW),
            Err(e) => {
                tracing::warn!(error = ?e, email, "issuance rate lookup failed, allowing");
                RateDecision::open(MAX_ISSUANCES_PER_WINDOW)
            }
        }
    }

    /// Charge this guess against the wrong-guess budget before the code is
    /// compared, so parallel guesses cannot all pass a stale count.
    pub async fn reserve_guess(&self, email: &str, now: DateTime<Utc>) -> GuessReservation {
        match self.codes.reserve_attempt(email, window_start(now)).await {
            Ok(Some(r)) => GuessReservation::charged(r),
            Ok(None) => GuessReservation::uncharged(),
            Err(e) => {
                tracing::warn!(error = ?e, email, "verification rate lookup failed, allowing");
                GuessReservation::uncharged()
            }
        }
    }

    /// Refund a charged guess once the code matched.
    pub async fn release_guess(&self, guess: &GuessReservation) {
        let Some(id) = guess.code_id else {
            return;
        };
        if let Err(e) = self.codes.release_attempt(id).await {
            tracing::warn!(error = ?e, code_id = %id, "failed to refund verification attempt");
        }
    }
}

/// A guess charged up front against the wrong-guess budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuessReservation {
    pub allowed: bool,
    /// Guesses left if this one turns out wrong.
    pub remaining: u32,
    /// Code the guess was charged to; `None` when nothing was charged.
    pub code_id: Option<Uuid>,
}

impl GuessReservation {
    fn charged(r: AttemptReservation) -> Self {
        let failed = u32::try_from(r.failed_in_window).unwrap_or(u32::MAX);
        Self {
            allowed: failed <= MAX_FAILED_VERIFICATIONS_PER_WINDOW,
            remaining: MAX_FAILED_VERIFICATIONS_PER_WINDOW.saturating_sub(failed),
            code_id: Some(r.code_id),
        }
    }

    fn uncharged() -> Self {
        Self {
            allowed: true,
            remaining: MAX_FAILED_VERIFICATIONS_PER_WINDOW,
            code_id: None,
        }
    }
}
