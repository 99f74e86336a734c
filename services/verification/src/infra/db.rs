use anyhow::Context as _;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
};
use uuid::Uuid;

use cheatplace_domain::user::AppRole;
use cheatplace_domain::verification::CodePurpose;
use cheatplace_verification_schema::{
    banned_emails, banned_ips, logs, profiles, user_roles, verification_codes,
};

use crate::domain::repository::{
    AccountRepository, ActivityLogRepository, BanRepository, VerificationCodeRepository,
};
use crate::domain::types::{Account, ActivityLog, AttemptReservation, VerificationCode};
use crate::error::VerificationServiceError;

// ── Verification code repository ──────────────────────────────────────────────

#[derive(Clone)]
pub struct DbVerificationCodeRepository {
    pub db: DatabaseConnection,
}

impl VerificationCodeRepository for DbVerificationCodeRepository {
    async fn count_issued_since(
        &self,
        email: &str,
        since: DateTime<Utc>,
    ) -> Result<u64, VerificationServiceError> {
        let count = verification_codes::Entity::find()
            .filter(verification_codes::Column::Email.eq(email))
            .filter(verification_codes::Column::CreatedAt.gte(since))
            .count(&self.db)
            .await
            .context("count issued verification codes")?;
        Ok(count)
    }

    async fn replace_pending(
        &self,
        code: &VerificationCode,
    ) -> Result<(), VerificationServiceError> {
        self.db
            .transaction::<_, (), sea_orm::DbErr>(|txn| {
                let code = code.clone();
                Box::pin(async move {
                    invalidate_live_codes(txn, &code).await?;
                    insert_code(txn, &code).await?;
                    Ok(())
                })
            })
            .await
            .context("replace pending verification code")?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), VerificationServiceError> {
        verification_codes::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .context("delete verification code")?;
        Ok(())
    }

    async fn find_live(
        &self,
        email: &str,
        code: &str,
        purpose: CodePurpose,
        now: DateTime<Utc>,
    ) -> Result<Option<VerificationCode>, VerificationServiceError> {
        let model = verification_codes::Entity::find()
            .filter(verification_codes::Column::Email.eq(email))
            .filter(verification_codes::Column::Code.eq(code))
            .filter(verification_codes::Column::Purpose.eq(purpose.as_str()))
            .filter(verification_codes::Column::Verified.eq(false))
            .filter(verification_codes::Column::ExpiresAt.gt(now))
            .order_by_desc(verification_codes::Column::CreatedAt)
            .one(&self.db)
            .await
            .context("find live verification code")?;
        model.map(code_from_model).transpose()
    }

    async fn mark_verified(&self, id: Uuid) -> Result<bool, VerificationServiceError> {
        let result = verification_codes::Entity::update_many()
            .col_expr(verification_codes::Column::Verified, Expr::value(true))
            .filter(verification_codes::Column::Id.eq(id))
            .filter(verification_codes::Column::Verified.eq(false))
            .exec(&self.db)
            .await
            .context("mark verification code verified")?;
        Ok(result.rows_affected > 0)
    }

    async fn reserve_attempt(
        &self,
        email: &str,
        since: DateTime<Utc>,
    ) -> Result<Option<AttemptReservation>, VerificationServiceError> {
        let email = email.to_owned();
        let reservation = self
            .db
            .transaction::<_, Option<AttemptReservation>, sea_orm::DbErr>(|txn| {
                Box::pin(async move {
                    // Row locks serialize concurrent guesses for the same email
                    let rows: Vec<(Uuid, i32)> = verification_codes::Entity::find()
                        .select_only()
                        .column(verification_codes::Column::Id)
                        .column(verification_codes::Column::FailedAttempts)
                        .filter(verification_codes::Column::Email.eq(email.as_str()))
                        .filter(verification_codes::Column::CreatedAt.gte(since))
                        .order_by_asc(verification_codes::Column::CreatedAt)
                        .lock_exclusive()
                        .into_tuple()
                        .all(txn)
                        .await?;
                    let Some(&(newest, _)) = rows.last() else {
                        return Ok(None);
                    };
                    verification_codes::Entity::update_many()
                        .col_expr(
                            verification_codes::Column::FailedAttempts,
                            Expr::col(verification_codes::Column::FailedAttempts).add(1),
                        )
                        .filter(verification_codes::Column::Id.eq(newest))
                        .exec(txn)
                        .await?;
                    let failed: u64 = rows.iter().map(|(_, n)| (*n).max(0) as u64).sum();
                    Ok(Some(AttemptReservation {
                        code_id: newest,
                        failed_in_window: failed + 1,
                    }))
                })
            })
            .await
            .context("reserve verification attempt")?;
        Ok(reservation)
    }

    async fn release_attempt(&self, id: Uuid) -> Result<(), VerificationServiceError> {
        verification_codes::Entity::update_many()
            .col_expr(
                verification_codes::Column::FailedAttempts,
                Expr::col(verification_codes::Column::FailedAttempts).sub(1),
            )
            .filter(verification_codes::Column::Id.eq(id))
            .filter(verification_codes::Column::FailedAttempts.gt(0))
            .exec(&self.db)
            .await
            .context("release verification attempt")?;
        Ok(())
    }

    async fn delete_stale(
        &self,
        email: &str,
        created_before: DateTime<Utc>,
    ) -> Result<u64, VerificationServiceError> {
        let result = verification_codes::Entity::delete_many()
            .filter(verification_codes::Column::Email.eq(email))
            .filter(verification_codes::Column::Verified.eq(false))
            .filter(verification_codes::Column::CreatedAt.lt(created_before))
            .exec(&self.db)
            .await
            .context("delete stale verification codes")?;
        Ok(result.rows_affected)
    }

    async fn purge_created_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<u64, VerificationServiceError> {
        let result = verification_codes::Entity::delete_many()
            .filter(verification_codes::Column::CreatedAt.lt(cutoff))
            .exec(&self.db)
            .await
            .context("purge old verification codes")?;
        Ok(result.rows_affected)
    }
}

/// Expire every live code for the same (email, purpose) at the new code's issuance time.
async fn invalidate_live_codes(
    txn: &DatabaseTransaction,
    code: &VerificationCode,
) -> Result<(), sea_orm::DbErr> {
    verification_codes::Entity::update_many()
        .col_expr(
            verification_codes::Column::ExpiresAt,
            Expr::value(code.created_at),
        )
        .filter(verification_codes::Column::Email.eq(code.email.as_str()))
        .filter(verification_codes::Column::Purpose.eq(code.purpose.as_str()))
        .filter(verification_codes::Column::Verified.eq(false))
        .filter(verification_codes::Column::ExpiresAt.gt(code.created_at))
        .exec(txn)
        .await?;
    Ok(())
}

async fn insert_code(
    txn: &DatabaseTransaction,
    code: &VerificationCode,
) -> Result<(), sea_orm::DbErr> {
    verification_codes::ActiveModel {
        id: Set(code.id),
        email: Set(code.email.clone()),
        code: Set(code.code.clone()),
        purpose: Set(code.purpose.as_str().to_owned()),
        user_id: Set(code.user_id),
        failed_attempts: Set(0),
        created_at: Set(code.created_at),
        expires_at: Set(code.expires_at),
        verified: Set(false),
    }
    .insert(txn)
    .await?;
    Ok(())
}

fn code_from_model(
    model: verification_codes::Model,
) -> Result<VerificationCode, VerificationServiceError> {
    let purpose: CodePurpose = model
        .purpose
        .parse()
        .with_context(|| format!("verification code {} has unknown type", model.id))?;
    Ok(VerificationCode {
        id: model.id,
        email: model.email,
        code: model.code,
        purpose,
        user_id: model.user_id,
        failed_attempts: model.failed_attempts.max(0) as u32,
        created_at: model.created_at,
        expires_at: model.expires_at,
        verified: model.verified,
    })
}

// ── Ban repository ────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbBanRepository {
    pub db: DatabaseConnection,
}

impl BanRepository for DbBanRepository {
    async fn is_email_banned(&self, email: &str) -> Result<bool, VerificationServiceError> {
        let count = banned_emails::Entity::find()
            .filter(banned_emails::Column::Email.eq(email))
            .count(&self.db)
            .await
            .context("check banned email")?;
        Ok(count > 0)
    }

    async fn is_ip_banned(&self, ip: &str) -> Result<bool, VerificationServiceError> {
        let count = banned_ips::Entity::find()
            .filter(banned_ips::Column::IpAddress.eq(ip))
            .count(&self.db)
            .await
            .context("check banned ip")?;
        Ok(count > 0)
    }

    async fn ban_email(
        &self,
        email: &str,
        banned_by: Uuid,
        reason: &str,
    ) -> Result<(), VerificationServiceError> {
        let entry = banned_emails::ActiveModel {
            id: Set(Uuid::new_v4()),
            email: Set(email.to_owned()),
            banned_by: Set(Some(banned_by)),
            reason: Set(Some(reason.to_owned())),
            created_at: Set(Utc::now()),
        };
        banned_emails::Entity::insert(entry)
            .on_conflict(
                OnConflict::column(banned_emails::Column::Email)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .context("insert banned email")?;
        Ok(())
    }

    async fn unban_email(&self, email: &str) -> Result<(), VerificationServiceError> {
        banned_emails::Entity::delete_many()
            .filter(banned_emails::Column::Email.eq(email))
            .exec(&self.db)
            .await
            .context("delete banned email")?;
        Ok(())
    }
}

// ── Account repository ────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbAccountRepository {
    pub db: DatabaseConnection,
}

impl AccountRepository for DbAccountRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, VerificationServiceError> {
        let model = profiles::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find profile by id")?;
        Ok(model.map(|m| Account {
            id: m.id,
            username: m.username,
            email: m.email,
        }))
    }

    async fn set_active(&self, id: Uuid, active: bool) -> Result<(), VerificationServiceError> {
        profiles::Entity::update_many()
            .col_expr(profiles::Column::Active, Expr::value(active))
            .filter(profiles::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .context("set profile active flag")?;
        Ok(())
    }

    async fn list_emails(&self) -> Result<Vec<String>, VerificationServiceError> {
        let emails: Vec<String> = profiles::Entity::find()
            .select_only()
            .column(profiles::Column::Email)
            .filter(profiles::Column::Email.is_not_null())
            .filter(profiles::Column::Email.ne(""))
            .into_tuple()
            .all(&self.db)
            .await
            .context("list profile emails")?;
        Ok(emails)
    }

    async fn roles_of(&self, user_id: Uuid) -> Result<Vec<AppRole>, VerificationServiceError> {
        let models = user_roles::Entity::find()
            .filter(user_roles::Column::UserId.eq(user_id))
            .all(&self.db)
            .await
            .context("list user roles")?;
        Ok(models
            .into_iter()
            .filter_map(|m| match m.role.parse() {
                Ok(role) => Some(role),
                Err(e) => {
                    tracing::warn!(error = %e, %user_id, "ignoring unknown role");
                    None
                }
            })
            .collect())
    }
}

// ── Activity log repository ───────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbActivityLogRepository {
    pub db: DatabaseConnection,
}

impl ActivityLogRepository for DbActivityLogRepository {
    async fn record(&self, entry: &ActivityLog) -> Result<(), VerificationServiceError> {
        logs::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(entry.user_id),
            action_type: Set(entry.action_type.to_owned()),
            message: Set(entry.message.clone()),
            created_at: Set(Utc::now()),
        }
        .insert(&self.db)
        .await
        .context("insert activity log")?;
        Ok(())
    }
}
