//! Repository trait for one-time passcodes.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{Error, otp::OtpRecord};

/// Keyed store of live passcodes, one row per email.
#[async_trait]
pub trait OtpRepository: Send + Sync + 'static {
    /// Inserts the record, replacing any code already stored for the email.
    async fn upsert(&self, record: &OtpRecord) -> Result<(), Error>;

    async fn find(&self, email: &str) -> Result<Option<OtpRecord>, Error>;

    /// Deletes the record only if it still holds `code`.
    ///
    /// Returns `true` for exactly one of several concurrent callers presenting
    /// the same code; the others observe `false`.
    async fn consume(&self, email: &str, code: u32) -> Result<bool, Error>;

    async fn delete(&self, email: &str) -> Result<(), Error>;

    /// Removes records issued before `before`, returning how many were deleted.
    async fn cleanup_expired(&self, before: DateTime<Utc>) -> Result<u64, Error>;
}
