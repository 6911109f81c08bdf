//! Builder for [`DealerDesk`] instances
//!
//! Storage must be chosen before the builder can produce anything; the
//! mailer, notification recipients and passcode settings all have defaults.
//!
//! ```rust,no_run
//! use dealerdesk::DealerDeskBuilder;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let desk = DealerDeskBuilder::new()
//!         .with_sqlite("sqlite://dealerdesk.db")
//!         .await?
//!         .with_mailer_from_env()?
//!         .apply_migrations(true)
//!         .build()
//!         .await?;
//!
//!     desk.health_check().await?;
//!     Ok(())
//! }
//! ```

use std::sync::Arc;

use dealerdesk_core::{
    RepositoryProvider,
    services::{NotificationConfig, NotificationService, OtpConfig},
};
use dealerdesk_mailer::{Mailer, MailerConfig};

use crate::DealerDesk;

/// Errors that can occur when building a [`DealerDesk`].
#[derive(Debug, thiserror::Error)]
pub enum DealerDeskBuilderError {
    #[error("Storage connection failed: {0}")]
    StorageConnection(String),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Mailer configuration failed: {0}")]
    MailerConfiguration(String),
}

/// Initial state: no storage configured.
pub struct NoStorage;

/// Storage configured; the builder can now be finished.
pub struct WithStorage<R: RepositoryProvider> {
    repositories: Arc<R>,
}

enum MailerChoice {
    Config(MailerConfig),
    Transport(Arc<dyn Mailer>),
}

/// A type-state builder for [`DealerDesk`].
pub struct DealerDeskBuilder<Storage> {
    storage: Storage,
    mailer: Option<MailerChoice>,
    notification_config: NotificationConfig,
    otp_config: OtpConfig,
    apply_migrations: bool,
}

impl Default for DealerDeskBuilder<NoStorage> {
    fn default() -> Self {
        Self::new()
    }
}

impl DealerDeskBuilder<NoStorage> {
    /// Create a builder with default settings.
    ///
    /// # Defaults
    ///
    /// - Mailer: files under `./emails`
    /// - Notification recipients: none
    /// - Passcode lifetime: 5 minutes
    /// - Apply migrations: false
    pub fn new() -> Self {
        Self {
            storage: NoStorage,
            mailer: None,
            notification_config: NotificationConfig::default(),
            otp_config: OtpConfig::default(),
            apply_migrations: false,
        }
    }

    /// Use an already constructed repository provider.
    pub fn with_repositories<R: RepositoryProvider>(
        self,
        repositories: Arc<R>,
    ) -> DealerDeskBuilder<WithStorage<R>> {
        DealerDeskBuilder {
            storage: WithStorage { repositories },
            mailer: self.mailer,
            notification_config: self.notification_config,
            otp_config: self.otp_config,
            apply_migrations: self.apply_migrations,
        }
    }
}

#[cfg(feature = "sqlite")]
impl DealerDeskBuilder<NoStorage> {
    /// Connect to SQLite at `url`, e.g. `sqlite::memory:` or `sqlite://dealerdesk.db`.
    pub async fn with_sqlite(
        self,
        url: &str,
    ) -> Result<
        DealerDeskBuilder<WithStorage<crate::SqliteRepositoryProvider>>,
        DealerDeskBuilderError,
    > {
        let repositories = crate::SqliteRepositoryProvider::connect(url)
            .await
            .map_err(|e| DealerDeskBuilderError::StorageConnection(e.to_string()))?;

        Ok(self.with_repositories(Arc::new(repositories)))
    }
}

impl<R: RepositoryProvider> DealerDeskBuilder<WithStorage<R>> {
    /// Send email through an existing transport.
    pub fn with_mailer(mut self, mailer: Arc<dyn Mailer>) -> Self {
        self.mailer = Some(MailerChoice::Transport(mailer));
        self
    }

    /// Build the transport from `config` when the builder finishes.
    pub fn with_mailer_config(mut self, config: MailerConfig) -> Self {
        self.mailer = Some(MailerChoice::Config(config));
        self
    }

    /// Read the mailer settings from `MAILER_*` environment variables.
    pub fn with_mailer_from_env(mut self) -> Result<Self, DealerDeskBuilderError> {
        let config = MailerConfig::from_env()
            .map_err(|e| DealerDeskBuilderError::MailerConfiguration(e.to_string()))?;
        self.mailer = Some(MailerChoice::Config(config));
        Ok(self)
    }

    /// Set who receives outcome notices.
    ///
    /// An empty `from_address` is filled from the mailer configuration.
    pub fn with_notification_config(mut self, config: NotificationConfig) -> Self {
        self.notification_config = config;
        self
    }

    pub fn with_otp_config(mut self, config: OtpConfig) -> Self {
        self.otp_config = config;
        self
    }

    pub fn apply_migrations(mut self, apply: bool) -> Self {
        self.apply_migrations = apply;
        self
    }

    pub async fn build(self) -> Result<DealerDesk<R>, DealerDeskBuilderError> {
        if self.otp_config.ttl <= chrono::Duration::zero() {
            return Err(DealerDeskBuilderError::InvalidConfiguration(
                "Passcode lifetime must be positive".to_string(),
            ));
        }

        let mut notification_config = self.notification_config;
        let (mailer, from_address): (Arc<dyn Mailer>, String) = match self.mailer {
            Some(MailerChoice::Transport(mailer)) => {
                (mailer, MailerConfig::default().get_from_address())
            }
            choice => {
                let config = match choice {
                    Some(MailerChoice::Config(config)) => config,
                    _ => MailerConfig::default(),
                };
                let transport = config
                    .build_transport()
                    .map_err(|e| DealerDeskBuilderError::MailerConfiguration(e.to_string()))?;
                (Arc::from(transport), config.get_from_address())
            }
        };
        if notification_config.from_address.is_empty() {
            notification_config.from_address = from_address;
        }

        if self.apply_migrations {
            self.storage
                .repositories
                .migrate()
                .await
                .map_err(|e| DealerDeskBuilderError::Migration(e.to_string()))?;
        }

        let notifications = NotificationService::new(mailer, notification_config);
        Ok(DealerDesk::new(self.storage.repositories, notifications).with_otp_config(self.otp_config))
    }
}
