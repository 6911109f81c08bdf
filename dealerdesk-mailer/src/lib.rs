//! Outbound email for the dealerdesk backend.
//!
//! Everything the CRM sends is plain text: one-time passcodes and the
//! outcome notices that follow each business operation. This crate owns the
//! [`Email`] value, the [`Mailer`] trait and the transports that deliver it.
//!
//! ```rust,no_run
//! use dealerdesk_mailer::{Email, Mailer, MailerConfig};
//!
//! # async fn run() -> Result<(), dealerdesk_mailer::MailerError> {
//! let config = MailerConfig::from_env()?;
//! let mailer = config.build_transport()?;
//!
//! let email = Email::builder()
//!     .from(config.get_from_address())
//!     .to("sales@example.com")
//!     .subject("Add Account Successful")
//!     .text_body("Successful!")
//!     .build()?;
//!
//! mailer.send_email(email).await?;
//! # Ok(())
//! # }
//! ```
pub mod config;
pub mod email;
pub mod error;
pub mod mailer;
pub mod transports;

pub use config::{MailerConfig, TlsType, TransportConfig};
pub use email::{Email, EmailBuilder};
pub use error::MailerError;
pub use mailer::Mailer;
pub use transports::{FileTransport, MemoryTransport, SmtpTransport};

pub mod prelude {
    pub use crate::{
        Email, EmailBuilder, FileTransport, Mailer, MailerConfig, MailerError, MemoryTransport,
        SmtpTransport,
    };
}
