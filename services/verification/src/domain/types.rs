use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use cheatplace_domain::verification::CodePurpose;

/// One-time code issued to an email address for a login or signup.
#[derive(Debug, Clone)]
pub struct VerificationCode {
    pub id: Uuid,
    pub email: String,
    pub code: String,
    pub purpose: CodePurpose,
    pub user_id: Option<Uuid>,
    pub failed_attempts: u32,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub verified: bool,
}

impl VerificationCode {
    /// Unverified and `now < expires_at`.
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        !self.verified && now < self.expires_at
    }
}

/// Marketplace account as seen by admin operations.
#[derive(Debug, Clone)]
pub struct Account {
    pub id: Uuid,
    pub username: String,
    pub email: Option<String>,
}

/// A wrong guess charged up front, before the code is compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttemptReservation {
    /// Code the guess was charged to.
    pub code_id: Uuid,
    /// Failures in the window, this one included.
    pub failed_in_window: u64,
}

/// Entry for the admin activity log.
#[derive(Debug, Clone)]
pub struct ActivityLog {
    pub user_id: Option<Uuid>,
    pub action_type: &'static str,
    pub message: String,
}

/// Rendered email ready for the mailer.
#[derive(Debug, Clone)]
pub struct MailContent {
    pub subject: String,
    pub html: String,
}

/// Code time-to-live.
pub const CODE_TTL: Duration = Duration::minutes(10);

/// Sliding window shared by the issuance and verification limiters.
pub const RATE_WINDOW: Duration = Duration::minutes(15);

/// Codes issued per email inside one window.
pub const MAX_ISSUANCES_PER_WINDOW: u32 = 5;

/// Wrong guesses per email inside one window.
pub const MAX_FAILED_VERIFICATIONS_PER_WINDOW: u32 = 5;

/// `retryAfter` hint sent with every rate-limit rejection.
pub const RETRY_AFTER_SECS: u64 = 900;

/// Bcc recipients per new-offer email.
pub const NOTIFY_BATCH_SIZE: usize = 50;

/// Visible `to` address of broadcast emails; real recipients go in bcc.
pub const NOTIFY_PLACEHOLDER_RECIPIENT: &str = "noreply@cheatplace.studio";

/// `banned_emails.reason` written by the admin ban action.
pub const ADMIN_BAN_REASON: &str = "Banni par l'administrateur";
