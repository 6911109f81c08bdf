use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dealerdesk_core::{
    Error, OtpRecord,
    error::StorageError,
    repositories::OtpRepository,
};
use sqlx::SqlitePool;

use crate::storage_error;

/// Codes are stored as integers and timestamps as unix milliseconds.
#[derive(Debug, sqlx::FromRow)]
struct SqliteOtpRecord {
    email: String,
    code: i64,
    issued_at: i64,
}

impl TryFrom<SqliteOtpRecord> for OtpRecord {
    type Error = Error;

    fn try_from(row: SqliteOtpRecord) -> Result<Self, Self::Error> {
        let code = u32::try_from(row.code)
            .map_err(|_| StorageError::Database(format!("Invalid stored OTP for {}", row.email)))?;
        let issued_at = DateTime::from_timestamp_millis(row.issued_at).ok_or_else(|| {
            StorageError::Database(format!("Invalid OTP timestamp for {}", row.email))
        })?;

        Ok(OtpRecord {
            email: row.email,
            code,
            issued_at,
        })
    }
}

pub struct SqliteOtpRepository {
    pool: SqlitePool,
}

impl SqliteOtpRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OtpRepository for SqliteOtpRepository {
    async fn upsert(&self, record: &OtpRecord) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO otp_codes (email, code, issued_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT (email) DO UPDATE SET code = excluded.code, issued_at = excluded.issued_at
            "#,
        )
        .bind(&record.email)
        .bind(i64::from(record.code))
        .bind(record.issued_at.timestamp_millis())
        .execute(&self.pool)
        .await
        .map_err(|e| storage_error("Failed to store OTP", e))?;

        Ok(())
    }

    async fn find(&self, email: &str) -> Result<Option<OtpRecord>, Error> {
        let row = sqlx::query_as::<_, SqliteOtpRecord>("SELECT * FROM otp_codes WHERE email = ?1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| storage_error("Failed to fetch OTP", e))?;

        row.map(OtpRecord::try_from).transpose()
    }

    async fn consume(&self, email: &str, code: u32) -> Result<bool, Error> {
        let result = sqlx::query("DELETE FROM otp_codes WHERE email = ?1 AND code = ?2")
            .bind(email)
            .bind(i64::from(code))
            .execute(&self.pool)
            .await
            .map_err(|e| storage_error("Failed to consume OTP", e))?;

        Ok(result.rows_affected() == 1)
    }

    async fn delete(&self, email: &str) -> Result<(), Error> {
        sqlx::query("DELETE FROM otp_codes WHERE email = ?1")
            .bind(email)
            .execute(&self.pool)
            .await
            .map_err(|e| storage_error("Failed to delete OTP", e))?;

        Ok(())
    }

    async fn cleanup_expired(&self, before: DateTime<Utc>) -> Result<u64, Error> {
        let result = sqlx::query("DELETE FROM otp_codes WHERE issued_at < ?1")
            .bind(before.timestamp_millis())
            .execute(&self.pool)
            .await
            .map_err(|e| storage_error("Failed to clean up OTPs", e))?;

        Ok(result.rows_affected())
    }
}
