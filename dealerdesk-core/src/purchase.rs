//! Purchased vehicles and their after-sales records: service visits, taxes
//! and insurance.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{datetime, error::ValidationError, validation::require_text};

/// Complimentary services bundled with every purchase.
pub const FREE_SERVICES_PER_PURCHASE: i64 = 3;
pub const SERVICE_INTERVAL_KM: i64 = 5000;
/// Six months of thirty days.
pub const SERVICE_INTERVAL_DAYS: i64 = 6 * 30;
pub const ROAD_TAX_VALIDITY_DAYS: i64 = 365;

pub const REGULAR_MAINTENANCE: &str = "Regular Maintenance";
pub const FREE_SERVICE: &str = "Free Service";
pub const ROAD_TAX: &str = "Road Tax";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PurchasedVehicle {
    pub vehicle_id: String,
    pub opportunity_id: String,
    pub vehicle_model_id: String,
    #[serde(with = "datetime::display")]
    pub purchase_date: NaiveDateTime,
    pub vehicle_color: Option<String>,
    pub current_kilometers: i64,
    pub free_services_left: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceRecord {
    pub service_id: String,
    pub vehicle_id: String,
    pub service_type: String,
    #[serde(with = "datetime::due_date")]
    pub due_date: NaiveDate,
    pub kilometers_due: Option<i64>,
    pub is_free: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tax {
    pub tax_id: String,
    pub vehicle_id: String,
    pub tax_amount: f64,
    pub tax_type: String,
    #[serde(with = "datetime::due_date")]
    pub due_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Insurance {
    pub insurance_id: String,
    pub vehicle_id: String,
    pub policy_number: String,
    pub provider: String,
    #[serde(with = "datetime::due_date")]
    pub expiry_date: NaiveDate,
}

/// When the next regular maintenance falls due.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NextService {
    pub service_type: String,
    #[serde(with = "datetime::due_date")]
    pub due_date: NaiveDate,
    pub kilometers_due: i64,
}

impl NextService {
    /// Due [`SERVICE_INTERVAL_KM`] or [`SERVICE_INTERVAL_DAYS`] after the purchase.
    pub fn after(vehicle: &PurchasedVehicle) -> Self {
        Self {
            service_type: REGULAR_MAINTENANCE.to_string(),
            due_date: (vehicle.purchase_date + Duration::days(SERVICE_INTERVAL_DAYS)).date(),
            kilometers_due: vehicle.current_kilometers + SERVICE_INTERVAL_KM,
        }
    }
}

/// Everything persisted together when a vehicle is sold.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PurchaseRecord {
    pub vehicle: PurchasedVehicle,
    pub tax: Tax,
    pub insurance: Option<Insurance>,
    pub free_service: ServiceRecord,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PurchaseReceipt {
    #[serde(flatten)]
    pub record: PurchaseRecord,
    pub next_service: NextService,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InsuranceDetails {
    #[serde(default)]
    pub policy_number: Option<String>,
    #[serde(default)]
    pub provider: Option<String>,
    /// `YYYY-MM-DD`
    #[serde(default)]
    pub expiry_date: Option<String>,
}

impl InsuranceDetails {
    /// Validates the details into a policy record for `vehicle_id`.
    pub fn into_insurance(self, vehicle_id: &str) -> Result<Insurance, ValidationError> {
        let policy_number = require_text("policy_number", self.policy_number.as_deref())?;
        let provider = require_text("provider", self.provider.as_deref())?;
        let expiry_date =
            datetime::parse_input_date(require_text("expiry_date", self.expiry_date.as_deref())?)?;

        Ok(Insurance {
            insurance_id: Uuid::new_v4().to_string(),
            vehicle_id: vehicle_id.to_string(),
            policy_number: policy_number.to_string(),
            provider: provider.to_string(),
            expiry_date,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PurchaseRequest {
    #[serde(default)]
    pub opportunity_id: Option<String>,
    #[serde(default)]
    pub vehicle_model_id: Option<String>,
    /// `YYYY-MM-DD HH:MM:SS`; defaults to now.
    #[serde(default)]
    pub purchase_date: Option<String>,
    #[serde(default)]
    pub vehicle_color: Option<String>,
    #[serde(default)]
    pub current_kilometers: Option<i64>,
    #[serde(default)]
    pub tax_amount: Option<f64>,
    #[serde(default)]
    pub insurance: Option<InsuranceDetails>,
    #[serde(default)]
    pub customer_email: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicle_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opportunity_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PurchaseUpdate {
    #[serde(default)]
    pub vehicle_id: Option<String>,
    #[serde(default)]
    pub vehicle_color: Option<String>,
    #[serde(default)]
    pub current_kilometers: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewServiceRecord {
    #[serde(default)]
    pub vehicle_id: Option<String>,
    #[serde(default)]
    pub service_type: Option<String>,
    /// `YYYY-MM-DD`
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub kilometers_due: Option<i64>,
    #[serde(default)]
    pub is_free: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewTax {
    #[serde(default)]
    pub vehicle_id: Option<String>,
    #[serde(default)]
    pub tax_amount: Option<f64>,
    #[serde(default)]
    pub tax_type: Option<String>,
    /// `YYYY-MM-DD`; defaults to a year from today.
    #[serde(default)]
    pub due_date: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewInsurance {
    #[serde(default)]
    pub vehicle_id: Option<String>,
    #[serde(flatten)]
    pub details: InsuranceDetails,
}
