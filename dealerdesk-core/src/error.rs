use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("OTP error: {0}")]
    Otp(#[from] OtpError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Record error: {0}")]
    Record(#[from] RecordError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Notification error: {0}")]
    Notification(#[from] NotificationError),
}

/// Reasons a one-time passcode check is denied.
///
/// The display strings are returned to HTTP clients verbatim.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OtpError {
    #[error("Email and OTP are required.")]
    MissingCredentials,

    #[error("No OTP generated for this email.")]
    NotIssued,

    #[error("OTP has expired.")]
    Expired,

    #[error("Invalid OTP.")]
    Mismatch,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid email format: {0}")]
    InvalidEmail(String),

    #[error("Invalid field: {0}")]
    InvalidField(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("{0}")]
    InvalidDate(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    #[error("No {0} found matching the given criteria")]
    NoMatches(&'static str),

    #[error("{entity} already exists: {key}")]
    AlreadyExists { entity: &'static str, key: String },

    #[error("No free services left for vehicle {0}")]
    NoFreeServicesLeft(String),
}

impl RecordError {
    pub fn not_found(entity: &'static str, key: impl Into<String>) -> Self {
        RecordError::NotFound {
            entity,
            key: key.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Migration error: {0}")]
    Migration(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Constraint violation: {0}")]
    Constraint(String),
}

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("Failed to build email: {0}")]
    Build(String),

    #[error("Failed to send email: {0}")]
    Send(String),
}

impl Error {
    pub fn is_otp_error(&self) -> bool {
        matches!(self, Error::Otp(_))
    }

    pub fn is_validation_error(&self) -> bool {
        matches!(self, Error::Validation(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::Record(RecordError::NotFound { .. }) | Error::Record(RecordError::NoMatches(_))
        )
    }

    pub fn is_storage_error(&self) -> bool {
        matches!(self, Error::Storage(_))
    }
}
