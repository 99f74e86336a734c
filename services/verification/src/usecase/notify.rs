use uuid::Uuid;

use crate::domain::repository::{AccountRepository, Mailer};
use crate::domain::types::{NOTIFY_BATCH_SIZE, NOTIFY_PLACEHOLDER_RECIPIENT};
use crate::error::VerificationServiceError;
use crate::mail::new_offer_email;

pub struct NotifyNewOfferInput {
    pub caller: Uuid,
    pub title: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, PartialEq, Eq)]
pub struct NotifyNewOfferOutput {
    pub recipients: usize,
    pub message: String,
}

/// Broadcast a new offer to every account with an email, in bcc batches.
pub struct NotifyNewOfferUseCase<A, M>
where
    A: AccountRepository,
    M: Mailer,
{
    pub accounts: A,
    pub mailer: M,
}

impl<A, M> NotifyNewOfferUseCase<A, M>
where
    A: AccountRepository,
    M: Mailer,
{
    pub async fn execute(
        &self,
        input: NotifyNewOfferInput,
    ) -> Result<NotifyNewOfferOutput, VerificationServiceError> {
        let roles = self.accounts.roles_of(input.caller).await?;
        if !roles.iter().any(|r| r.can_publish()) {
            return Err(VerificationServiceError::Forbidden);
        }

        let title = input
            .title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(VerificationServiceError::InvalidRequest("offerTitle is required"))?;
        let description = input.description.unwrap_or_default();

        let emails: Vec<String> = self
            .accounts
            .list_emails()
            .await?
            .into_iter()
            .filter(|e| !e.trim().is_empty())
            .collect();
        if emails.is_empty() {
            return Ok(NotifyNewOfferOutput {
                recipients: 0,
                message: "No users to notify".to_owned(),
            });
        }

        let mail = new_offer_email(title, &description);
        for (i, batch) in emails.chunks(NOTIFY_BATCH_SIZE).enumerate() {
            self.mailer
                .send_bcc(NOTIFY_PLACEHOLDER_RECIPIENT, batch, &mail.subject, &mail.html)
                .await
                .map_err(|e| {
                    tracing::warn!(failed_batch = i, "offer broadcast interrupted");
                    VerificationServiceError::Delivery(e)
                })?;
        }

        tracing::info!(recipients = emails.len(), "new offer broadcast sent");
        Ok(NotifyNewOfferOutput {
            recipients: emails.len(),
            message: format!("Notification sent to {} users", emails.len()),
        })
    }
}
