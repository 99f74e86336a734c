pub use sea_orm_migration::prelude::*;

mod m20260901_000001_create_profiles;
mod m20260901_000002_create_user_roles;
mod m20260901_000003_create_verification_codes;
mod m20260901_000004_create_banned_emails;
mod m20260901_000005_create_banned_ips;
mod m20260901_000006_create_logs;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260901_000001_create_profiles::Migration),
            Box::new(m20260901_000002_create_user_roles::Migration),
            Box::new(m20260901_000003_create_verification_codes::Migration),
            Box::new(m20260901_000004_create_banned_emails::Migration),
            Box::new(m20260901_000005_create_banned_ips::Migration),
            Box::new(m20260901_000006_create_logs::Migration),
        ]
    }
}
