use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, TimeZone, Utc};
use uuid::Uuid;

use cheatplace_domain::user::AppRole;
use cheatplace_domain::verification::CodePurpose;
use cheatplace_verification::domain::repository::{
    AccountRepository, ActivityLogRepository, BanRepository, Clock, Mailer,
    VerificationCodeRepository,
};
use cheatplace_verification::domain::types::{
    Account, ActivityLog, AttemptReservation, VerificationCode,
};
use cheatplace_verification::error::VerificationServiceError;

fn store_down() -> VerificationServiceError {
    VerificationServiceError::Internal(anyhow::anyhow!("store unavailable"))
}

// ── FixedClock ───────────────────────────────────────────────────────────────

/// Clock that only moves when told to. Clones share the same time.
#[derive(Clone)]
pub struct FixedClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl FixedClock {
    pub fn new() -> Self {
        let start = Utc.with_ymd_and_hms(2026, 9, 1, 12, 0, 0).unwrap();
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    pub fn advance(&self, by: Duration) {
        *self.now.lock().unwrap() += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

// ── MockCodeRepo ─────────────────────────────────────────────────────────────

/// In-memory code store. Clones share rows, so issuance and verification use
/// cases built from clones see each other's writes.
#[derive(Clone, Default)]
pub struct MockCodeRepo {
    pub codes: Arc<Mutex<Vec<VerificationCode>>>,
    /// Make the rate-limit lookups fail.
    pub fail_lookups: bool,
    /// Make `replace_pending` fail.
    pub fail_writes: bool,
}

impl MockCodeRepo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a shared handle to the internal code list for post-execution inspection.
    pub fn codes_handle(&self) -> Arc<Mutex<Vec<VerificationCode>>> {
        Arc::clone(&self.codes)
    }

    /// Digits of the newest code issued to `email`.
    pub fn latest_code(&self, email: &str) -> String {
        self.codes
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.email == email)
            .max_by_key(|c| c.created_at)
            .map(|c| c.code.clone())
            .expect("no code issued")
    }
}

impl VerificationCodeRepository for MockCodeRepo {
    async fn count_issued_since(
        &self,
        email: &str,
        since: DateTime<Utc>,
    ) -> Result<u64, VerificationServiceError> {
        if self.fail_lookups {
            return Err(store_down());
        }
        let codes = self.codes.lock().unwrap();
        Ok(codes
            .iter()
            .filter(|c| c.email == email && c.created_at >= since)
            .count() as u64)
    }

    async fn replace_pending(
        &self,
        code: &VerificationCode,
    ) -> Result<(), VerificationServiceError> {
        if self.fail_writes {
            return Err(store_down());
        }
        let mut codes = self.codes.lock().unwrap();
        for c in codes.iter_mut() {
            if c.email == code.email && c.purpose == code.purpose && c.is_live(code.created_at) {
                c.expires_at = code.created_at;
            }
        }
        codes.push(code.clone());
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), VerificationServiceError> {
        self.codes.lock().unwrap().retain(|c| c.id != id);
        Ok(())
    }

    async fn find_live(
        &self,
        email: &str,
        code: &str,
        purpose: CodePurpose,
        now: DateTime<Utc>,
    ) -> Result<Option<VerificationCode>, VerificationServiceError> {
        let codes = self.codes.lock().unwrap();
        Ok(codes
            .iter()
            .filter(|c| c.email == email && c.code == code && c.purpose == purpose)
            .filter(|c| c.is_live(now))
            .max_by_key(|c| c.created_at)
            .cloned())
    }

    async fn mark_verified(&self, id: Uuid) -> Result<bool, VerificationServiceError> {
        let mut codes = self.codes.lock().unwrap();
        match codes.iter_mut().find(|c| c.id == id && !c.verified) {
            Some(c) => {
                c.verified = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn reserve_attempt(
        &self,
        email: &str,
        since: DateTime<Utc>,
    ) -> Result<Option<AttemptReservation>, VerificationServiceError> {
        if self.fail_lookups {
            return Err(store_down());
        }
        let mut codes = self.codes.lock().unwrap();
        let failed: u64 = codes
            .iter()
            .filter(|c| c.email == email && c.created_at >= since)
            .map(|c| u64::from(c.failed_attempts))
            .sum();
        match codes
            .iter_mut()
            .filter(|c| c.email == email && c.created_at >= since)
            .max_by_key(|c| c.created_at)
        {
            Some(c) => {
                c.failed_attempts += 1;
                Ok(Some(AttemptReservation {
                    code_id: c.id,
                    failed_in_window: failed + 1,
                }))
            }
            None => Ok(None),
        }
    }

    async fn release_attempt(&self, id: Uuid) -> Result<(), VerificationServiceError> {
        let mut codes = self.codes.lock().unwrap();
        if let Some(c) = codes.iter_mut().find(|c| c.id == id) {
            c.failed_attempts = c.failed_attempts.saturating_sub(1);
        }
        Ok(())
    }

    async fn delete_stale(
        &self,
        email: &str,
        created_before: DateTime<Utc>,
    ) -> Result<u64, VerificationServiceError> {
        let mut codes = self.codes.lock().unwrap();
        let before = codes.len();
        codes.retain(|c| !(c.email == email && !c.verified && c.created_at < created_before));
        Ok((before - codes.len()) as u64)
    }

    async fn purge_created_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<u64, VerificationServiceError> {
        let mut codes = self.codes.lock().unwrap();
        let before = codes.len();
        codes.retain(|c| c.created_at >= cutoff);
        Ok((before - codes.len()) as u64)
    }
}

// ── MockBanRepo ──────────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockBanRepo {
    pub emails: Arc<Mutex<Vec<(String, Uuid, String)>>>,
    pub ips: Vec<String>,
    pub fail: bool,
}

impl MockBanRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_email(self, email: &str) -> Self {
        self.emails
            .lock()
            .unwrap()
            .push((email.to_owned(), Uuid::nil(), "test".to_owned()));
        self
    }

    pub fn with_ip(mut self, ip: &str) -> Self {
        self.ips.push(ip.to_owned());
        self
    }

    pub fn emails_handle(&self) -> Arc<Mutex<Vec<(String, Uuid, String)>>> {
        Arc::clone(&self.emails)
    }
}

impl BanRepository for MockBanRepo {
    async fn is_email_banned(&self, email: &str) -> Result<bool, VerificationServiceError> {
        if self.fail {
            return Err(store_down());
        }
        Ok(self.emails.lock().unwrap().iter().any(|(e, _, _)| e == email))
    }

    async fn is_ip_banned(&self, ip: &str) -> Result<bool, VerificationServiceError> {
        if self.fail {
            return Err(store_down());
        }
        Ok(self.ips.iter().any(|i| i == ip))
    }

    async fn ban_email(
        &self,
        email: &str,
        banned_by: Uuid,
        reason: &str,
    ) -> Result<(), VerificationServiceError> {
        let mut emails = self.emails.lock().unwrap();
        if !emails.iter().any(|(e, _, _)| e == email) {
            emails.push((email.to_owned(), banned_by, reason.to_owned()));
        }
        Ok(())
    }

    async fn unban_email(&self, email: &str) -> Result<(), VerificationServiceError> {
        self.emails.lock().unwrap().retain(|(e, _, _)| e != email);
        Ok(())
    }
}

// ── MockAccountRepo ──────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockAccountRepo {
    pub accounts: Arc<Mutex<Vec<Account>>>,
    pub roles: Vec<(Uuid, AppRole)>,
    /// Last `set_active` value per account.
    pub active: Arc<Mutex<Vec<(Uuid, bool)>>>,
}

impl MockAccountRepo {
    pub fn new(accounts: Vec<Account>, roles: Vec<(Uuid, AppRole)>) -> Self {
        Self {
            accounts: Arc::new(Mutex::new(accounts)),
            roles,
            active: Arc::default(),
        }
    }

    pub fn accounts_handle(&self) -> Arc<Mutex<Vec<Account>>> {
        Arc::clone(&self.accounts)
    }

    /// Active flag last written for `id`, if any.
    pub fn active_flag(&self, id: Uuid) -> Option<bool> {
        self.active
            .lock()
            .unwrap()
            .iter()
            .find(|(a, _)| *a == id)
            .map(|(_, active)| *active)
    }
}

impl AccountRepository for MockAccountRepo {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, VerificationServiceError> {
        Ok(self
            .accounts
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.id == id)
            .cloned())
    }

    async fn set_active(&self, id: Uuid, active: bool) -> Result<(), VerificationServiceError> {
        let mut flags = self.active.lock().unwrap();
        flags.retain(|(a, _)| *a != id);
        flags.push((id, active));
        Ok(())
    }

    async fn list_emails(&self) -> Result<Vec<String>, VerificationServiceError> {
        Ok(self
            .accounts
            .lock()
            .unwrap()
            .iter()
            .filter_map(|a| a.email.clone())
            .collect())
    }

    async fn roles_of(&self, user_id: Uuid) -> Result<Vec<AppRole>, VerificationServiceError> {
        Ok(self
            .roles
            .iter()
            .filter(|(id, _)| *id == user_id)
            .map(|(_, r)| *r)
            .collect())
    }
}

pub fn account(username: &str, email: Option<&str>) -> Account {
    Account {
        id: Uuid::new_v4(),
        username: username.to_owned(),
        email: email.map(str::to_owned),
    }
}

// ── MockActivityLog ──────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockActivityLog {
    pub entries: Arc<Mutex<Vec<ActivityLog>>>,
    pub fail: bool,
}

impl MockActivityLog {
    pub fn entries_handle(&self) -> Arc<Mutex<Vec<ActivityLog>>> {
        Arc::clone(&self.entries)
    }
}

impl ActivityLogRepository for MockActivityLog {
    async fn record(&self, entry: &ActivityLog) -> Result<(), VerificationServiceError> {
        if self.fail {
            return Err(store_down());
        }
        self.entries.lock().unwrap().push(entry.clone());
        Ok(())
    }
}

// ── MockMailer ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct SentMail {
    pub to: String,
    pub bcc: Vec<String>,
    pub subject: String,
    pub html: String,
}

#[derive(Clone, Default)]
pub struct MockMailer {
    pub sent: Arc<Mutex<Vec<SentMail>>>,
    /// Fail every call once this many messages have gone out.
    pub fail_after: Option<usize>,
}

impl MockMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail_after: Some(0),
            ..Self::default()
        }
    }

    pub fn sent_handle(&self) -> Arc<Mutex<Vec<SentMail>>> {
        Arc::clone(&self.sent)
    }

    fn push(&self, mail: SentMail) -> anyhow::Result<()> {
        let mut sent = self.sent.lock().unwrap();
        if self.fail_after.is_some_and(|n| sent.len() >= n) {
            anyhow::bail!("provider returned 500");
        }
        sent.push(mail);
        Ok(())
    }
}

impl Mailer for MockMailer {
    async fn send(&self, to: &str, subject: &str, html: &str) -> anyhow::Result<()> {
        self.push(SentMail {
            to: to.to_owned(),
            bcc: vec![],
            subject: subject.to_owned(),
            html: html.to_owned(),
        })
    }

    async fn send_bcc(
        &self,
        to: &str,
        bcc: &[String],
        subject: &str,
        html: &str,
    ) -> anyhow::Result<()> {
        self.push(SentMail {
            to: to.to_owned(),
            bcc: bcc.to_vec(),
            subject: subject.to_owned(),
            html: html.to_owned(),
        })
    }
}
