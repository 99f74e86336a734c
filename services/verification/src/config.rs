use std::time::Duration;

use serde::Deserialize;

use cheatplace_core::config::Config;

/// Verification service configuration loaded from environment variables.
#[derive(Debug, Deserialize)]
pub struct VerificationConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// HS256 secret the identity platform signs access tokens with.
    pub platform_jwt_secret: String,
    /// API key for the Resend email API.
    pub resend_api_key: String,
    /// Sender shown on outgoing mail.
    #[serde(default = "default_mail_from")]
    pub mail_from: String,
    #[serde(default = "default_resend_api_url")]
    pub resend_api_url: String,
    /// TCP port to listen on (default 3120). Env var: `VERIFICATION_PORT`.
    #[serde(default = "default_port")]
    pub verification_port: u16,
    /// Bound on database connect/acquire, each SQL statement, and email provider calls.
    #[serde(default = "default_upstream_timeout")]
    pub upstream_timeout_secs: u64,
    /// Period of the expired-code sweep; 0 is raised to one second.
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,
}

impl Config for VerificationConfig {}

impl VerificationConfig {
    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs)
    }

    /// Postgres `statement_timeout` matching the upstream timeout.
    pub fn statement_timeout(&self) -> String {
        format!("{}ms", self.upstream_timeout().as_millis())
    }

    /// Never zero, which `tokio::time::interval` rejects.
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs.max(1))
    }
}

fn default_mail_from() -> String {
    "CHEATPLACE <onboarding@resend.dev>".to_owned()
}

fn default_resend_api_url() -> String {
    "https://api.resend.com/emails".to_owned()
}

fn default_port() -> u16 {
    3120
}

fn default_upstream_timeout() -> u64 {
    10
}

fn default_sweep_interval() -> u64 {
    300
}
