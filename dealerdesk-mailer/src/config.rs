use crate::{FileTransport, Mailer, MailerError, SmtpTransport};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailerConfig {
    pub transport: TransportConfig,
    pub from_address: String,
    pub from_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TransportConfig {
    Smtp {
        host: String,
        port: Option<u16>,
        username: Option<String>,
        password: Option<String>,
        tls: Option<TlsType>,
    },
    File {
        output_dir: PathBuf,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TlsType {
    None,
    StartTls,
    Tls,
}

impl std::str::FromStr for TlsType {
    type Err = MailerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(TlsType::None),
            "starttls" => Ok(TlsType::StartTls),
            "tls" => Ok(TlsType::Tls),
            other => Err(MailerError::Config(format!(
                "Unknown MAILER_SMTP_TLS value: {other}"
            ))),
        }
    }
}

impl MailerConfig {
    /// Reads the transport from `MAILER_*` variables.
    ///
    /// An SMTP host wins over a file output directory; with neither set the
    /// mailer writes `.eml` files to `./emails`.
    pub fn from_env() -> Result<Self, MailerError> {
        let transport = if let Ok(host) = std::env::var("MAILER_SMTP_HOST") {
            let port = match std::env::var("MAILER_SMTP_PORT") {
                Ok(port) => Some(port.parse().map_err(|_| {
                    MailerError::Config(format!("Invalid MAILER_SMTP_PORT: {port}"))
                })?),
                Err(_) => None,
            };
            let tls = match std::env::var("MAILER_SMTP_TLS") {
                Ok(tls) => Some(tls.parse()?),
                Err(_) => None,
            };

            TransportConfig::Smtp {
                host,
                port,
                username: std::env::var("MAILER_SMTP_USERNAME").ok(),
                password: std::env::var("MAILER_SMTP_PASSWORD").ok(),
                tls,
            }
        } else if let Ok(output_dir) = std::env::var("MAILER_FILE_OUTPUT_DIR") {
            TransportConfig::File {
                output_dir: PathBuf::from(output_dir),
            }
        } else {
            TransportConfig::File {
                output_dir: PathBuf::from("./emails"),
            }
        };

        Ok(Self {
            transport,
            from_address: std::env::var("MAILER_FROM_ADDRESS")
                .unwrap_or_else(|_| "noreply@example.com".to_string()),
            from_name: std::env::var("MAILER_FROM_NAME").ok(),
        })
    }

    pub fn build_transport(&self) -> Result<Box<dyn Mailer>, MailerError> {
        match &self.transport {
            TransportConfig::Smtp {
                host,
                port,
                username,
                password,
                tls,
            } => {
                let login = match (username, password) {
                    (Some(user), Some(password)) => Some((user.as_str(), password.as_str())),
                    _ => None,
                };
                let transport = SmtpTransport::connect(
                    host,
                    *port,
                    login,
                    tls.clone().unwrap_or(TlsType::StartTls),
                )?;

                tracing::info!(host = %host, "Using SMTP mail transport");
                Ok(Box::new(transport))
            }
            TransportConfig::File { output_dir } => {
                tracing::info!(output_dir = %output_dir.display(), "Using file mail transport");
                Ok(Box::new(FileTransport::new(output_dir)?))
            }
        }
    }

    pub fn get_from_address(&self) -> String {
        if let Some(name) = &self.from_name {
            format!("{} <{}>", name, self.from_address)
        } else {
            self.from_address.clone()
        }
    }
}

impl Default for MailerConfig {
    fn default() -> Self {
        Self {
            transport: TransportConfig::File {
                output_dir: PathBuf::from("./emails"),
            },
            from_address: "noreply@example.com".to_string(),
            from_name: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MailerConfig::default();
        assert_eq!(config.from_address, "noreply@example.com");

        match config.transport {
            TransportConfig::File { output_dir } => {
                assert_eq!(output_dir, PathBuf::from("./emails"));
            }
            _ => panic!("Expected file transport"),
        }
    }

    #[test]
    fn test_get_from_address() {
        let mut config = MailerConfig::default();
        assert_eq!(config.get_from_address(), "noreply@example.com");

        config.from_name = Some("DealerDesk".to_string());
        assert_eq!(config.get_from_address(), "DealerDesk <noreply@example.com>");
    }

    #[test]
    fn test_tls_type_parsing() {
        assert_eq!("STARTTLS".parse::<TlsType>().unwrap(), TlsType::StartTls);
        assert_eq!("none".parse::<TlsType>().unwrap(), TlsType::None);
        assert!("ssl3".parse::<TlsType>().is_err());
    }

    #[test]
    fn test_build_file_transport() {
        let dir = tempfile::tempdir().unwrap();
        let config = MailerConfig {
            transport: TransportConfig::File {
                output_dir: dir.path().to_path_buf(),
            },
            ..MailerConfig::default()
        };
        assert!(config.build_transport().is_ok());
    }

    #[test]
    fn test_transport_config_from_json() {
        let config: TransportConfig = serde_json::from_str(
            r#"{"type":"smtp","host":"smtp.example.com","port":587,"tls":"start_tls"}"#,
        )
        .unwrap();

        match config {
            TransportConfig::Smtp { host, port, tls, .. } => {
                assert_eq!(host, "smtp.example.com");
                assert_eq!(port, Some(587));
                assert_eq!(tls, Some(TlsType::StartTls));
            }
            _ => panic!("Expected smtp transport"),
        }
    }
}
