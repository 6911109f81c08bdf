use std::time::Duration;

use dealerdesk::{NotificationConfig, OtpConfig};

pub const DEFAULT_DATABASE_URL: &str = "sqlite://dealerdesk.db?mode=rwc";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5000";
pub const DEFAULT_OTP_TTL_SECONDS: u64 = 300;
pub const DEFAULT_OTP_SWEEP_INTERVAL_SECONDS: u64 = 600;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
}

/// Server settings read from the environment.
///
/// | Variable | Default |
/// |---|---|
/// | `DATABASE_URL` | `sqlite://dealerdesk.db?mode=rwc` |
/// | `BIND_ADDR` | `0.0.0.0:5000` |
/// | `NOTIFY_RECEIVERS` | none |
/// | `NOTIFY_ERROR_RECIPIENTS` | none |
/// | `OTP_TTL_SECONDS` | 300 |
/// | `OTP_SWEEP_INTERVAL_SECONDS` | 600 |
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub database_url: String,
    pub bind_addr: String,
    pub receivers: Vec<String>,
    pub error_recipients: Vec<String>,
    pub otp_ttl: Duration,
    pub otp_sweep_interval: Duration,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let seconds = |name: &'static str, default: u64| -> Result<Duration, ConfigError> {
            match lookup(name) {
                Some(value) => value
                    .trim()
                    .parse::<u64>()
                    .ok()
                    .filter(|secs| *secs > 0)
                    .map(Duration::from_secs)
                    .ok_or(ConfigError::InvalidValue { name, value }),
                None => Ok(Duration::from_secs(default)),
            }
        };

        Ok(Self {
            database_url: lookup("DATABASE_URL")
                .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            receivers: lookup("NOTIFY_RECEIVERS")
                .map(|v| NotificationConfig::parse_recipients(&v))
                .unwrap_or_default(),
            error_recipients: lookup("NOTIFY_ERROR_RECIPIENTS")
                .map(|v| NotificationConfig::parse_recipients(&v))
                .unwrap_or_default(),
            otp_ttl: seconds("OTP_TTL_SECONDS", DEFAULT_OTP_TTL_SECONDS)?,
            otp_sweep_interval: seconds(
                "OTP_SWEEP_INTERVAL_SECONDS",
                DEFAULT_OTP_SWEEP_INTERVAL_SECONDS,
            )?,
        })
    }

    /// Recipients for outcome notices; the sender is filled from the mailer settings.
    pub fn notification_config(&self) -> NotificationConfig {
        NotificationConfig {
            from_address: String::new(),
            receivers: self.receivers.clone(),
            error_recipients: self.error_recipients.clone(),
        }
    }

    pub fn otp_config(&self) -> Result<OtpConfig, ConfigError> {
        let ttl = chrono::Duration::from_std(self.otp_ttl).map_err(|_| {
            ConfigError::InvalidValue {
                name: "OTP_TTL_SECONDS",
                value: self.otp_ttl.as_secs().to_string(),
            }
        })?;
        Ok(OtpConfig { ttl })
    }
}
