use crate::domain::repository::{Clock, VerificationCodeRepository};
use crate::error::VerificationServiceError;
use crate::usecase::rate_limit::window_start;

/// Deletes codes older than the rate window. Those are expired and no longer
/// counted by either limiter.
pub struct PurgeExpiredCodesUseCase<R, C>
where
    R: VerificationCodeRepository,
    C: Clock,
{
    pub codes: R,
    pub clock: C,
}

impl<R, C> PurgeExpiredCodesUseCase<R, C>
where
    R: VerificationCodeRepository,
    C: Clock,
{
    pub async fn execute(&self) -> Result<u64, VerificationServiceError> {
        let cutoff = window_start(self.clock.now());
        let purged = self.codes.purge_created_before(cutoff).await?;
        if purged > 0 {
            tracing::info!(purged, "expired verification codes purged");
        }
        Ok(purged)
    }
}
