//! Field validation shared by every service.
//!
//! All checks return [`ValidationError`] so callers can `?` them straight
//! into [`crate::Error`].

use crate::error::ValidationError;
use regex::Regex;
use std::sync::LazyLock;

/// Practical subset of RFC 5322, loaded once and reused.
static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
        .expect("Invalid email regex pattern")
});

static STAGE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z\s/]+$").expect("Invalid stage regex pattern"));

pub const MAX_NAME_LENGTH: usize = 255;
pub const MAX_STAGE_LENGTH: usize = 100;
pub const MAX_ACCOUNT_ID_LENGTH: usize = 10;

/// Validates an email address.
///
/// ```rust
/// use dealerdesk_core::validation::validate_email;
///
/// assert!(validate_email("buyer@example.com").is_ok());
/// assert!(validate_email("invalid-email").is_err());
/// ```
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if email.is_empty() {
        return Err(ValidationError::MissingField("email".to_string()));
    }

    if email.len() > 254 {
        return Err(ValidationError::InvalidEmail(
            "Email is too long".to_string(),
        ));
    }

    if EMAIL_REGEX.is_match(email) {
        Ok(())
    } else {
        Err(ValidationError::InvalidEmail(email.to_string()))
    }
}

/// Returns the trimmed value, or `MissingField` when it is blank.
pub fn require_text<'a>(field: &str, value: Option<&'a str>) -> Result<&'a str, ValidationError> {
    match value.map(str::trim) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(ValidationError::MissingField(field.to_string())),
    }
}

pub fn validate_name_length(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.chars().count() > MAX_NAME_LENGTH {
        return Err(ValidationError::InvalidField(format!(
            "{field} exceeds maximum length of {MAX_NAME_LENGTH} characters"
        )));
    }
    Ok(())
}

pub fn validate_probability(probability: i64) -> Result<(), ValidationError> {
    if !(0..=100).contains(&probability) {
        return Err(ValidationError::InvalidField(format!(
            "Probability must be between 0 and 100, got {probability}"
        )));
    }
    Ok(())
}

pub fn validate_positive_number(field: &str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ValidationError::InvalidField(format!(
            "{field} must be a positive number"
        )));
    }
    Ok(())
}

/// Validates a pipeline stage name and returns it trimmed.
///
/// ```rust
/// use dealerdesk_core::validation::validate_stage;
///
/// assert_eq!(validate_stage("  Qualification ").unwrap(), "Qualification");
/// assert!(validate_stage("Stage 2").is_err());
/// ```
pub fn validate_stage(stage: &str) -> Result<String, ValidationError> {
    let stage = stage.trim();

    if stage.is_empty() {
        return Err(ValidationError::InvalidField(
            "Stage value cannot be empty or contain only spaces.".to_string(),
        ));
    }

    if !STAGE_REGEX.is_match(stage) {
        return Err(ValidationError::InvalidField(format!(
            "Invalid stage value: {stage}. Only letters, spaces and '/' are allowed."
        )));
    }

    if stage.chars().count() > MAX_STAGE_LENGTH {
        return Err(ValidationError::InvalidField(format!(
            "Stage exceeds maximum length of {MAX_STAGE_LENGTH} characters"
        )));
    }

    Ok(stage.to_string())
}

pub fn validate_account_id(account_id: &str) -> Result<(), ValidationError> {
    if account_id.trim().is_empty() {
        return Err(ValidationError::MissingField("account_id".to_string()));
    }

    if account_id.chars().count() > MAX_ACCOUNT_ID_LENGTH {
        return Err(ValidationError::InvalidField(format!(
            "account_id must be at most {MAX_ACCOUNT_ID_LENGTH} characters"
        )));
    }

    Ok(())
}

/// Maps a win probability to its pipeline stage.
///
/// Values between the defined bands (1-9 and 96-99) have no stage.
pub fn opportunity_stage(probability: i64) -> Result<&'static str, ValidationError> {
    let stage = match probability {
        0 => "Closed Lost",
        10..=20 => "Prospecting",
        21..=40 => "Qualification",
        41..=60 => "Needs Analysis",
        61..=70 => "Value Proposition",
        71..=80 => "Decision Makers",
        81..=85 => "Perception Analysis",
        86..=90 => "Proposal/Price Quote",
        91..=95 => "Negotiation/Review",
        100 => "Closed Won",
        _ => {
            return Err(ValidationError::InvalidField(
                "Invalid probability value".to_string(),
            ));
        }
    };
    Ok(stage)
}
