use crate::models::{Lodge, ScanOutcome};
use crate::scanner::error::ScanError;
use crate::scanner::types::ScanParams;
use async_trait::async_trait;

/// Common trait for all availability checks
/// This allows easy addition of new lodging sites in the future
#[async_trait]
pub trait AvailabilityCheck: Send + Sync {
    /// Scan one lodge's calendar for bookable days
    async fn scan(&self, lodge: &Lodge, params: &ScanParams) -> Result<ScanOutcome, ScanError>;

    /// Get the name of the site being checked
    fn source_name(&self) -> &'static str;
}
