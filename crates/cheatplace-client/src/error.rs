use std::time::Duration;

/// Everything the client surfaces to the user.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Local form validation or a 400 from the service.
    #[error("{0}")]
    Validation(String),
    #[error("too many attempts, retry in {}s", retry_after.as_secs())]
    RateLimited { retry_after: Duration },
    /// `attempts_left` is absent when the service did not report it.
    #[error("invalid or expired code")]
    InvalidCode { attempts_left: Option<u32> },
    #[error("access denied")]
    Banned,
    #[error("failed to send email")]
    Delivery,
    /// The identity platform refused the credentials.
    #[error("{0}")]
    Rejected(String),
    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },
    #[error("{0}")]
    InvalidState(&'static str),
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}
