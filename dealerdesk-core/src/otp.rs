//! One-time passcodes.
//!
//! A passcode is a six digit number bound to an email address. Each email has
//! at most one live code; issuing a new one replaces it. A code is live from
//! `issued_at` until `issued_at + ttl` inclusive and is removed by the first
//! successful verification.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::OtpError;

pub const OTP_MIN: u32 = 100_000;
pub const OTP_MAX: u32 = 999_999;

/// Default lifetime of an issued code, in seconds.
pub const DEFAULT_OTP_TTL_SECS: i64 = 300;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OtpRecord {
    pub email: String,
    pub code: u32,
    pub issued_at: DateTime<Utc>,
}

impl OtpRecord {
    pub fn new(email: impl Into<String>, code: u32, issued_at: DateTime<Utc>) -> Self {
        Self {
            email: email.into(),
            code,
            issued_at,
        }
    }

    pub fn expires_at(&self, ttl: Duration) -> DateTime<Utc> {
        self.issued_at + ttl
    }

    /// Strictly more than `ttl` has elapsed since issue.
    pub fn is_expired_at(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.issued_at > ttl
    }
}

/// Draws a code uniformly from `[OTP_MIN, OTP_MAX]`.
pub fn generate_code() -> u32 {
    rand::rng().random_range(OTP_MIN..=OTP_MAX)
}

/// Email and passcode presented alongside a protected request.
///
/// `otp` accepts either a JSON number or a string so that form, query and
/// JSON clients can all send it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct OtpCredentials {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "code_as_text")]
    pub otp: Option<String>,
}

impl OtpCredentials {
    pub fn new(email: impl Into<String>, otp: impl ToString) -> Self {
        Self {
            email: Some(email.into()),
            otp: Some(otp.to_string()),
        }
    }

    /// Both values, trimmed, or `MissingCredentials` if either is blank.
    pub fn require(&self) -> Result<(&str, &str), OtpError> {
        let email = self.email.as_deref().map(str::trim).unwrap_or_default();
        let otp = self.otp.as_deref().map(str::trim).unwrap_or_default();
        if email.is_empty() || otp.is_empty() {
            return Err(OtpError::MissingCredentials);
        }
        Ok((email, otp))
    }
}

fn code_as_text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawCode {
        Number(i64),
        Text(String),
    }

    Ok(Option::<RawCode>::deserialize(d)?.map(|raw| match raw {
        RawCode::Number(n) => n.to_string(),
        RawCode::Text(s) => s,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_codes_are_six_digits() {
        for _ in 0..1000 {
            let code = generate_code();
            assert!((OTP_MIN..=OTP_MAX).contains(&code));
            assert_eq!(code.to_string().len(), 6);
        }
    }

    #[test]
    fn test_expiry_boundary() {
        let issued_at = Utc::now();
        let record = OtpRecord::new("a@x.com", 123456, issued_at);
        let ttl = Duration::seconds(DEFAULT_OTP_TTL_SECS);

        assert!(!record.is_expired_at(issued_at, ttl));
        assert!(!record.is_expired_at(issued_at + Duration::seconds(300), ttl));
        assert!(record.is_expired_at(issued_at + Duration::seconds(301), ttl));
        assert_eq!(
            record.expires_at(ttl),
            issued_at + Duration::seconds(300)
        );
    }

    #[test]
    fn test_credentials_accept_number_or_string() {
        let numeric: OtpCredentials =
            serde_json::from_str(r#"{"email": "a@x.com", "otp": 482913}"#).unwrap();
        assert_eq!(numeric.otp.as_deref(), Some("482913"));

        let text: OtpCredentials =
            serde_json::from_str(r#"{"email": "a@x.com", "otp": "482913"}"#).unwrap();
        assert_eq!(numeric, text);

        let missing: OtpCredentials = serde_json::from_str(r#"{"email": "a@x.com"}"#).unwrap();
        assert_eq!(missing.otp, None);
    }

    #[test]
    fn test_require() {
        assert_eq!(
            OtpCredentials::new(" a@x.com ", 123456).require().unwrap(),
            ("a@x.com", "123456")
        );
        assert_eq!(
            OtpCredentials::default().require(),
            Err(OtpError::MissingCredentials)
        );
        assert_eq!(
            OtpCredentials {
                email: Some("a@x.com".to_string()),
                otp: Some("  ".to_string()),
            }
            .require(),
            Err(OtpError::MissingCredentials)
        );
    }
}
