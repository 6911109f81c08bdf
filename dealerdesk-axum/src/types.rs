use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateOtpRequest {
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OtpResponse {
    pub message: String,
    pub email: String,
    pub otp: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// A single record together with an outcome message.
#[derive(Debug, Clone, Serialize)]
pub struct RecordResponse<T> {
    pub message: String,
    pub data: T,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListResponse<T> {
    pub message: String,
    pub total_count: usize,
    pub data: Vec<T>,
}

impl<T> ListResponse<T> {
    pub fn new(message: impl Into<String>, data: Vec<T>) -> Self {
        Self {
            message: message.into(),
            total_count: data.len(),
            data,
        }
    }
}

/// An updated record and the fields that changed.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateResponse<T, C> {
    pub message: String,
    pub data: T,
    pub changes: C,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccountIdParams {
    #[serde(default)]
    pub account_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VehicleModelParams {
    #[serde(default)]
    pub vehicle_model_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VehicleIdParams {
    #[serde(default)]
    pub vehicle_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServiceIdParams {
    #[serde(default)]
    pub service_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaxIdParams {
    #[serde(default)]
    pub tax_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InsuranceIdParams {
    #[serde(default)]
    pub insurance_id: Option<String>,
}
