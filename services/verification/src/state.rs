use sea_orm::DatabaseConnection;

use crate::domain::repository::SystemClock;
use crate::infra::db::{
    DbAccountRepository, DbActivityLogRepository, DbBanRepository, DbVerificationCodeRepository,
};
use crate::infra::mailer::ResendMailer;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub mailer: ResendMailer,
    /// HS256 secret for platform access tokens on admin routes.
    pub platform_jwt_secret: String,
}

impl AppState {
    pub fn code_repo(&self) -> DbVerificationCodeRepository {
        DbVerificationCodeRepository {
            db: self.db.clone(),
        }
    }

    pub fn ban_repo(&self) -> DbBanRepository {
        DbBanRepository {
            db: self.db.clone(),
        }
    }

    pub fn account_repo(&self) -> DbAccountRepository {
        DbAccountRepository {
            db: self.db.clone(),
        }
    }

    pub fn activity_log_repo(&self) -> DbActivityLogRepository {
        DbActivityLogRepository {
            db: self.db.clone(),
        }
    }

    pub fn mailer(&self) -> ResendMailer {
        self.mailer.clone()
    }

    pub fn clock(&self) -> SystemClock {
        SystemClock
    }
}
