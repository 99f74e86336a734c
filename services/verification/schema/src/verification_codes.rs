use sea_orm::entity::prelude::*;

/// One-time verification code emailed before login or signup.
/// Expires 10 minutes after issuance; `verified` flips false -> true at most once.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "verification_codes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub email: String,
    pub code: String,
    /// `login` or `signup`.
    #[sea_orm(column_name = "type")]
    pub purpose: String,
    pub user_id: Option<Uuid>,
    /// Wrong guesses recorded against this row while it was the newest for its email.
    pub failed_attempts: i32,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub expires_at: chrono::DateTime<chrono::Utc>,
    pub verified: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
