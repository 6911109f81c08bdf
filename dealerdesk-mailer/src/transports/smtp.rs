use crate::{Email, Mailer, MailerError, TlsType};
use async_trait::async_trait;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

/// Delivers through an SMTP relay.
#[derive(Debug, Clone)]
pub struct SmtpTransport {
    relay: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpTransport {
    /// Connects lazily to `host`; nothing is dialled until the first send.
    ///
    /// Credentials are used only when both halves are present.
    pub fn connect(
        host: &str,
        port: Option<u16>,
        login: Option<(&str, &str)>,
        tls: TlsType,
    ) -> Result<Self, MailerError> {
        let mut relay = match tls {
            TlsType::None => AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host),
            TlsType::StartTls => AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)?,
            TlsType::Tls => AsyncSmtpTransport::<Tokio1Executor>::relay(host)?,
        };
        if let Some(port) = port {
            relay = relay.port(port);
        }
        if let Some((user, password)) = login {
            relay = relay.credentials(Credentials::new(user.to_owned(), password.to_owned()));
        }

        Ok(Self {
            relay: relay.build(),
        })
    }
}

#[async_trait]
impl Mailer for SmtpTransport {
    async fn send_email(&self, email: Email) -> Result<(), MailerError> {
        let recipients = email.to.len();
        let message = Message::try_from(email)?;
        self.relay.send(message).await?;
        tracing::debug!(recipients, "Email handed to SMTP relay");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_starttls_relay_with_login() {
        let transport = SmtpTransport::connect(
            "smtp.gmail.com",
            Some(587),
            Some(("crm@gmail.com", "app-password")),
            TlsType::StartTls,
        );
        assert!(transport.is_ok());
    }

    #[tokio::test]
    async fn test_plain_local_relay() {
        let transport = SmtpTransport::connect("localhost", Some(1025), None, TlsType::None);
        assert!(transport.is_ok());
    }
}
