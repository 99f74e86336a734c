#![allow(async_fn_in_trait)]

use chrono::{DateTime, Utc};
use uuid::Uuid;

use cheatplace_domain::user::AppRole;
use cheatplace_domain::verification::CodePurpose;

use crate::domain::types::{Account, ActivityLog, AttemptReservation, VerificationCode};
use crate::error::VerificationServiceError;

/// Repository for one-time verification codes.
pub trait VerificationCodeRepository: Send + Sync {
    /// Count codes issued to `email` at or after `since`.
    async fn count_issued_since(
        &self,
        email: &str,
        since: DateTime<Utc>,
    ) -> Result<u64, VerificationServiceError>;

    /// Invalidate every live code for `(code.email, code.purpose)` and insert `code`,
    /// atomically. Invalidated rows get `expires_at = code.created_at`.
    async fn replace_pending(&self, code: &VerificationCode)
    -> Result<(), VerificationServiceError>;

    async fn delete(&self, id: Uuid) -> Result<(), VerificationServiceError>;

    /// Find a live code matching all of `email`, `code` and `purpose`.
    async fn find_live(
        &self,
        email: &str,
        code: &str,
        purpose: CodePurpose,
        now: DateTime<Utc>,
    ) -> Result<Option<VerificationCode>, VerificationServiceError>;

    /// Flip `verified` to true if it is still false. Returns `false` when another
    /// request already consumed the code.
    async fn mark_verified(&self, id: Uuid) -> Result<bool, VerificationServiceError>;

    /// Charge one wrong guess to the newest code issued to `email` at or after
    /// `since`, in the same step that sums the failures on those codes.
    /// Returns `None` when there is no such code.
    async fn reserve_attempt(
        &self,
        email: &str,
        since: DateTime<Utc>,
    ) -> Result<Option<AttemptReservation>, VerificationServiceError>;

    /// Give back a guess charged by `reserve_attempt` to code `id`.
    async fn release_attempt(&self, id: Uuid) -> Result<(), VerificationServiceError>;

    /// Delete the unverified codes of `email` created before `created_before`.
    async fn delete_stale(
        &self,
        email: &str,
        created_before: DateTime<Utc>,
    ) -> Result<u64, VerificationServiceError>;

    /// Delete every code created before `cutoff`.
    async fn purge_created_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<u64, VerificationServiceError>;
}

/// Banned emails and IPs.
pub trait BanRepository: Send + Sync {
    async fn is_email_banned(&self, email: &str) -> Result<bool, VerificationServiceError>;

    async fn is_ip_banned(&self, ip: &str) -> Result<bool, VerificationServiceError>;

    /// Add `email` to the ban list; an existing entry is left as is.
    async fn ban_email(
        &self,
        email: &str,
        banned_by: Uuid,
        reason: &str,
    ) -> Result<(), VerificationServiceError>;

    async fn unban_email(&self, email: &str) -> Result<(), VerificationServiceError>;
}

/// Marketplace profiles and their roles.
pub trait AccountRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, VerificationServiceError>;

    async fn set_active(&self, id: Uuid, active: bool) -> Result<(), VerificationServiceError>;

    /// Every non-empty profile email.
    async fn list_emails(&self) -> Result<Vec<String>, VerificationServiceError>;

    async fn roles_of(&self, user_id: Uuid) -> Result<Vec<AppRole>, VerificationServiceError>;
}

pub trait ActivityLogRepository: Send + Sync {
    async fn record(&self, entry: &ActivityLog) -> Result<(), VerificationServiceError>;
}

/// Outbound transactional email.
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, html: &str) -> anyhow::Result<()>;

    async fn send_bcc(
        &self,
        to: &str,
        bcc: &[String],
        subject: &str,
        html: &str,
    ) -> anyhow::Result<()>;
}

/// Source of the current time, injected so tests can move it.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
