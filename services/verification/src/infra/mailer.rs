use std::time::Duration;

use anyhow::{Context as _, bail};
use reqwest::Client;
use serde::Serialize;

use crate::domain::repository::Mailer;

/// Mailer backed by the Resend HTTP API.
#[derive(Clone)]
pub struct ResendMailer {
    client: Client,
    api_url: String,
    api_key: String,
    from: String,
}

#[derive(Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    #[serde(skip_serializing_if = "Option::is_none")]
    bcc: Option<&'a [String]>,
    subject: &'a str,
    html: &'a str,
}

impl ResendMailer {
    pub fn new(
        api_url: impl Into<String>,
        api_key: impl Into<String>,
        from: impl Into<String>,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("build email HTTP client")?;
        Ok(Self {
            client,
            api_url: api_url.into(),
            api_key: api_key.into(),
            from: from.into(),
        })
    }

    async fn post(&self, request: &SendEmailRequest<'_>) -> anyhow::Result<()> {
        let resp = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .context("email provider unreachable")?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            tracing::warn!(%status, body = %body, "email provider rejected message");
            bail!("email provider returned {status}");
        }
        Ok(())
    }
}

impl Mailer for ResendMailer {
    async fn send(&self, to: &str, subject: &str, html: &str) -> anyhow::Result<()> {
        self.post(&SendEmailRequest {
            from: &self.from,
            to: [to],
            bcc: None,
            subject,
            html,
        })
        .await
    }

    async fn send_bcc(
        &self,
        to: &str,
        bcc: &[String],
        subject: &str,
        html: &str,
    ) -> anyhow::Result<()> {
        self.post(&SendEmailRequest {
            from: &self.from,
            to: [to],
            bcc: Some(bcc),
            subject,
            html,
        })
        .await
    }
}
