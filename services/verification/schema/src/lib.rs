pub mod banned_emails;
pub mod banned_ips;
pub mod logs;
pub mod profiles;
pub mod user_roles;
pub mod verification_codes;
