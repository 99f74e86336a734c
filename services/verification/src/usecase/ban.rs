use uuid::Uuid;

use cheatplace_domain::user::AppRole;

use crate::domain::repository::{AccountRepository, ActivityLogRepository, BanRepository};
use crate::domain::types::{ADMIN_BAN_REASON, ActivityLog};
use crate::error::VerificationServiceError;

pub struct BanUserInput {
    /// Authenticated caller.
    pub caller: Uuid,
    pub user_id: Option<String>,
    pub ban: bool,
}

#[derive(Debug)]
pub struct BanUserOutput {
    pub email: String,
    pub message: &'static str,
}

pub struct BanUserUseCase<A, B, L>
where
    A: AccountRepository,
    B: BanRepository,
    L: ActivityLogRepository,
{
    pub accounts: A,
    pub bans: B,
    pub logs: L,
}

impl<A, B, L> BanUserUseCase<A, B, L>
where
    A: AccountRepository,
    B: BanRepository,
    L: ActivityLogRepository,
{
    pub async fn execute(&self, input: BanUserInput) -> Result<BanUserOutput, VerificationServiceError> {
        // 1. Admins only → 403
        let roles = self.accounts.roles_of(input.caller).await?;
        if !roles.contains(&AppRole::Admin) {
            return Err(VerificationServiceError::Forbidden);
        }

        // 2. Target → 400 / 404
        let target: Uuid = input
            .user_id
            .as_deref()
            .ok_or(VerificationServiceError::InvalidRequest("userId is required"))?
            .trim()
            .parse()
            .map_err(|_| VerificationServiceError::InvalidRequest("userId must be a UUID"))?;
        let account = self
            .accounts
            .find_by_id(target)
            .await?
            .ok_or(VerificationServiceError::UserNotFound)?;
        let email = account
            .email
            .filter(|e| !e.is_empty())
            .ok_or(VerificationServiceError::UserNotFound)?;

        // 3. Profile flag, then the email ban list
        self.accounts.set_active(account.id, !input.ban).await?;
        if input.ban {
            self.bans
                .ban_email(&email, input.caller, ADMIN_BAN_REASON)
                .await?;
        } else {
            self.bans.unban_email(&email).await?;
        }

        // 4. Activity log is best effort
        let entry = ActivityLog {
            user_id: Some(account.id),
            action_type: if input.ban { "user_banned" } else { "user_unbanned" },
            message: if input.ban {
                format!("Utilisateur banni : {}", account.username)
            } else {
                format!("Utilisateur débanni : {}", account.username)
            },
        };
        if let Err(e) = self.logs.record(&entry).await {
            tracing::warn!(error = ?e, user_id = %account.id, "failed to log ban action");
        }

        tracing::info!(admin = %input.caller, user_id = %account.id, ban = input.ban, "ban status changed");
        Ok(BanUserOutput {
            email,
            message: if input.ban {
                "Utilisateur banni avec succès"
            } else {
                "Utilisateur débanni avec succès"
            },
        })
    }
}
