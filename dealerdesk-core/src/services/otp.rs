//! One-time passcode gate for mutating operations.
//!
//! ```rust,ignore
//! let service = OtpService::new(repositories, OtpConfig::default());
//!
//! let record = service.issue("sales@example.com").await?;
//! service
//!     .verify(&OtpCredentials::new("sales@example.com", record.code))
//!     .await?;
//! ```

use std::sync::Arc;

use chrono::{DateTime, Duration, SubsecRound, Utc};

use crate::{
    Error,
    error::OtpError,
    otp::{DEFAULT_OTP_TTL_SECS, OtpCredentials, OtpRecord, generate_code},
    repositories::{OtpRepository, OtpRepositoryProvider},
    validation::validate_email,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OtpConfig {
    /// How long an issued code stays valid.
    pub ttl: Duration,
}

impl Default for OtpConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::seconds(DEFAULT_OTP_TTL_SECS),
        }
    }
}

pub struct OtpService<R: OtpRepositoryProvider> {
    repositories: Arc<R>,
    config: OtpConfig,
}

impl<R: OtpRepositoryProvider> OtpService<R> {
    pub fn new(repositories: Arc<R>, config: OtpConfig) -> Self {
        Self {
            repositories,
            config,
        }
    }

    pub fn config(&self) -> &OtpConfig {
        &self.config
    }

    /// Issues a fresh code for `email`, replacing any live one.
    ///
    /// Delivery is left to the caller so that a failed send can be reported.
    pub async fn issue(&self, email: &str) -> Result<OtpRecord, Error> {
        self.issue_at(email, Utc::now()).await
    }

    pub async fn issue_at(&self, email: &str, now: DateTime<Utc>) -> Result<OtpRecord, Error> {
        let email = email.trim();
        validate_email(email)?;

        // Storage keeps millisecond precision.
        let record = OtpRecord::new(email, generate_code(), now.trunc_subsecs(3));
        self.repositories.otp().upsert(&record).await?;

        tracing::info!(email = %email, "Issued one-time passcode");
        Ok(record)
    }

    /// Checks the presented credentials and consumes the code on success.
    pub async fn verify(&self, credentials: &OtpCredentials) -> Result<(), Error> {
        self.verify_at(credentials, Utc::now()).await
    }

    pub async fn verify_at(
        &self,
        credentials: &OtpCredentials,
        now: DateTime<Utc>,
    ) -> Result<(), Error> {
        let (email, otp) = credentials.require()?;

        let record = self
            .repositories
            .otp()
            .find(email)
            .await?
            .ok_or(OtpError::NotIssued)?;

        if record.is_expired_at(now, self.config.ttl) {
            tracing::debug!(email = %email, "Rejected expired passcode");
            return Err(OtpError::Expired.into());
        }

        let presented: i64 = otp.parse().map_err(|_| OtpError::Mismatch)?;
        if presented != i64::from(record.code) {
            tracing::debug!(email = %email, "Rejected mismatched passcode");
            return Err(OtpError::Mismatch.into());
        }

        // Another request may have consumed the same code since the read.
        if !self.repositories.otp().consume(email, record.code).await? {
            return Err(OtpError::NotIssued.into());
        }

        tracing::info!(email = %email, "Verified one-time passcode");
        Ok(())
    }

    /// Deletes every code older than the configured lifetime.
    pub async fn purge_expired(&self) -> Result<u64, Error> {
        let removed = self
            .repositories
            .otp()
            .cleanup_expired(Utc::now() - self.config.ttl)
            .await?;
        if removed > 0 {
            tracing::info!(count = removed, "Purged expired passcodes");
        }
        Ok(removed)
    }

    /// Spawns a task that purges expired codes every `every` until `shutdown` fires.
    pub fn start_cleanup_task(
        &self,
        every: std::time::Duration,
        mut shutdown: tokio::sync::watch::Receiver<bool>,
    ) -> tokio::task::JoinHandle<()> {
        let repositories = Arc::clone(&self.repositories);
        let ttl = self.config.ttl;

        tokio::spawn(async move {
            let mut interval_timer = tokio::time::interval(every);

            loop {
                tokio::select! {
                    _ = interval_timer.tick() => {
                        match repositories.otp().cleanup_expired(Utc::now() - ttl).await {
                            Ok(count) if count > 0 => {
                                tracing::info!(count = count, "Purged expired passcodes");
                            }
                            Err(e) => {
                                tracing::warn!(error = %e, "Failed to purge expired passcodes");
                            }
                            _ => {}
                        }
                    }
                    _ = shutdown.changed() => {
                        tracing::debug!("Passcode cleanup task shutting down");
                        break;
                    }
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::mock::MockRepositories;

    fn service() -> OtpService<MockRepositories> {
        OtpService::new(Arc::new(MockRepositories::default()), OtpConfig::default())
    }

    fn verify_err(result: Result<(), Error>) -> OtpError {
        match result {
            Err(Error::Otp(e)) => e,
            other => panic!("expected an OTP error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_issue_then_verify_consumes_code() {
        let service = service();
        let t0 = Utc::now().trunc_subsecs(3);
        let record = service.issue_at("a@x.com", t0).await.unwrap();
        let credentials = OtpCredentials::new("a@x.com", record.code);

        service
            .verify_at(&credentials, t0 + Duration::seconds(10))
            .await
            .unwrap();

        assert_eq!(
            verify_err(service.verify_at(&credentials, t0 + Duration::seconds(11)).await),
            OtpError::NotIssued
        );
    }

    #[tokio::test]
    async fn test_reissue_invalidates_previous_code() {
        let service = service();
        let t0 = Utc::now().trunc_subsecs(3);
        let first = service.issue_at("a@x.com", t0).await.unwrap();
        let mut second = service.issue_at("a@x.com", t0).await.unwrap();
        while second.code == first.code {
            second = service.issue_at("a@x.com", t0).await.unwrap();
        }

        assert_eq!(
            verify_err(
                service
                    .verify_at(&OtpCredentials::new("a@x.com", first.code), t0)
                    .await
            ),
            OtpError::Mismatch
        );
        service
            .verify_at(&OtpCredentials::new("a@x.com", second.code), t0)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_expiry_boundary() {
        let service = service();
        let t0 = Utc::now().trunc_subsecs(3);

        let record = service.issue_at("a@x.com", t0).await.unwrap();
        service
            .verify_at(
                &OtpCredentials::new("a@x.com", record.code),
                t0 + Duration::seconds(300),
            )
            .await
            .unwrap();

        let record = service.issue_at("a@x.com", t0).await.unwrap();
        assert_eq!(
            verify_err(
                service
                    .verify_at(
                        &OtpCredentials::new("a@x.com", record.code),
                        t0 + Duration::seconds(301),
                    )
                    .await
            ),
            OtpError::Expired
        );
    }

    #[tokio::test]
    async fn test_denials() {
        let service = service();
        let t0 = Utc::now().trunc_subsecs(3);

        assert_eq!(
            verify_err(service.verify_at(&OtpCredentials::default(), t0).await),
            OtpError::MissingCredentials
        );
        assert_eq!(
            verify_err(
                service
                    .verify_at(&OtpCredentials::new("nobody@x.com", 123456), t0)
                    .await
            ),
            OtpError::NotIssued
        );

        let record = service.issue_at("a@x.com", t0).await.unwrap();
        let wrong = if record.code == 999_999 { 100_000 } else { record.code + 1 };
        assert_eq!(
            verify_err(
                service
                    .verify_at(&OtpCredentials::new("a@x.com", wrong), t0)
                    .await
            ),
            OtpError::Mismatch
        );
        assert_eq!(
            verify_err(
                service
                    .verify_at(&OtpCredentials::new("a@x.com", "12ab56"), t0)
                    .await
            ),
            OtpError::Mismatch
        );

        // A failed attempt leaves the code usable.
        service
            .verify_at(&OtpCredentials::new("a@x.com", record.code), t0)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_issue_rejects_invalid_email() {
        let result = service().issue("not-an-email").await;
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[tokio::test]
    async fn test_purge_expired() {
        let repositories = Arc::new(MockRepositories::default());
        let service = OtpService::new(repositories.clone(), OtpConfig::default());

        service
            .issue_at("old@x.com", Utc::now() - Duration::seconds(600))
            .await
            .unwrap();
        service.issue("new@x.com").await.unwrap();

        assert_eq!(service.purge_expired().await.unwrap(), 1);
        assert!(repositories.otp().find("old@x.com").await.unwrap().is_none());
        assert!(repositories.otp().find("new@x.com").await.unwrap().is_some());
    }
}
