use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use dealerdesk::Error;
use dealerdesk_core::error::{RecordError, StorageError};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// A domain error from the CRM operation.
    #[error(transparent)]
    Operation(#[from] Error),

    #[error("Invalid request: {0}")]
    BadRequest(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Operation(err) => match err {
                Error::Otp(_) | Error::Validation(_) => StatusCode::BAD_REQUEST,
                Error::Record(RecordError::NotFound { .. } | RecordError::NoMatches(_)) => {
                    StatusCode::NOT_FOUND
                }
                Error::Record(RecordError::AlreadyExists { .. }) => StatusCode::CONFLICT,
                Error::Record(RecordError::NoFreeServicesLeft(_)) => StatusCode::BAD_REQUEST,
                Error::Storage(StorageError::Constraint(_)) => StatusCode::CONFLICT,
                Error::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
                Error::Notification(_) => StatusCode::BAD_GATEWAY,
            },
        }
    }

    /// The message shown to the client.
    ///
    /// Passcode and record errors are passed through verbatim; storage
    /// failures only name their category.
    pub fn message(&self) -> String {
        match self {
            ApiError::BadRequest(msg) => msg.clone(),
            ApiError::Operation(err) => match err {
                Error::Otp(e) => e.to_string(),
                Error::Validation(e) => e.to_string(),
                Error::Record(e) => e.to_string(),
                Error::Storage(StorageError::Constraint(msg)) => msg.clone(),
                Error::Storage(_) => "Internal server error".to_string(),
                Error::Notification(e) => e.to_string(),
            },
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "Request rejected");
        }

        let body = Json(json!({
            "error": self.message(),
            "code": status.as_u16()
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
