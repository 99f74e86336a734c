pub mod ban;
pub mod issue;
pub mod notify;
pub mod rate_limit;
pub mod sweep;
pub mod verify;
