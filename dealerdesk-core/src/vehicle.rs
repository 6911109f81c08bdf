//! Vehicle catalog entries: the models a dealership can sell.

use serde::{Deserialize, Serialize};

pub const MIN_VEHICLE_YEAR: i64 = 1886;
pub const MAX_VEHICLE_YEAR: i64 = 2100;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VehicleDetails {
    pub vehicle_model_id: String,
    pub vehicle_model: String,
    pub vehicle_year: i64,
    pub engine_type: Option<String>,
    pub transmission: Option<String>,
    pub fuel_type: Option<String>,
    pub body_type: Option<String>,
    pub warranty_period_years: Option<i64>,
    pub color: Option<String>,
    pub model_variant: Option<String>,
    pub tyre_company: Option<String>,
    pub tyre_size: Option<String>,
    pub start_type: Option<String>,
    pub sunroof_available: Option<bool>,
    pub gear_type: Option<String>,
    pub vehicle_type: Option<String>,
}

/// Catalog attributes as sent by a client; used for both creation and update.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VehicleAttributes {
    #[serde(default)]
    pub vehicle_model: Option<String>,
    #[serde(default)]
    pub vehicle_year: Option<i64>,
    #[serde(default)]
    pub engine_type: Option<String>,
    #[serde(default)]
    pub transmission: Option<String>,
    #[serde(default)]
    pub fuel_type: Option<String>,
    #[serde(default)]
    pub body_type: Option<String>,
    #[serde(default)]
    pub warranty_period_years: Option<i64>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub model_variant: Option<String>,
    #[serde(default)]
    pub tyre_company: Option<String>,
    #[serde(default)]
    pub tyre_size: Option<String>,
    #[serde(default)]
    pub start_type: Option<String>,
    #[serde(default)]
    pub sunroof_available: Option<bool>,
    #[serde(default)]
    pub gear_type: Option<String>,
    #[serde(default)]
    pub vehicle_type: Option<String>,
}

impl VehicleAttributes {
    /// Applies every set attribute to `vehicle`, returning how many changed.
    pub fn apply_to(&self, vehicle: &mut VehicleDetails) -> usize {
        let mut changed = 0;

        if let Some(model) = &self.vehicle_model {
            vehicle.vehicle_model = model.trim().to_string();
            changed += 1;
        }
        if let Some(year) = self.vehicle_year {
            vehicle.vehicle_year = year;
            changed += 1;
        }
        if self.warranty_period_years.is_some() {
            vehicle.warranty_period_years = self.warranty_period_years;
            changed += 1;
        }
        if self.sunroof_available.is_some() {
            vehicle.sunroof_available = self.sunroof_available;
            changed += 1;
        }

        let text_fields = [
            (&mut vehicle.engine_type, &self.engine_type),
            (&mut vehicle.transmission, &self.transmission),
            (&mut vehicle.fuel_type, &self.fuel_type),
            (&mut vehicle.body_type, &self.body_type),
            (&mut vehicle.color, &self.color),
            (&mut vehicle.model_variant, &self.model_variant),
            (&mut vehicle.tyre_company, &self.tyre_company),
            (&mut vehicle.tyre_size, &self.tyre_size),
            (&mut vehicle.start_type, &self.start_type),
            (&mut vehicle.gear_type, &self.gear_type),
            (&mut vehicle.vehicle_type, &self.vehicle_type),
        ];
        for (target, value) in text_fields {
            if value.is_some() {
                *target = value.clone();
                changed += 1;
            }
        }

        changed
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VehicleDetailsUpdate {
    #[serde(default)]
    pub vehicle_model_id: Option<String>,
    #[serde(flatten)]
    pub attributes: VehicleAttributes,
}

/// Exact-match deletion criteria for catalog entries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VehicleCriteria {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicle_model_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicle_model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicle_year: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fuel_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicle_type: Option<String>,
}

impl VehicleCriteria {
    pub fn is_empty(&self) -> bool {
        *self == VehicleCriteria::default()
    }

    /// `key: value` pairs of the criteria that are set.
    pub fn describe(&self) -> Vec<String> {
        let mut parts = Vec::new();
        if let Some(id) = &self.vehicle_model_id {
            parts.push(format!("vehicle_model_id: {id}"));
        }
        if let Some(model) = &self.vehicle_model {
            parts.push(format!("vehicle_model: {model}"));
        }
        if let Some(year) = self.vehicle_year {
            parts.push(format!("vehicle_year: {year}"));
        }
        if let Some(fuel) = &self.fuel_type {
            parts.push(format!("fuel_type: {fuel}"));
        }
        if let Some(kind) = &self.vehicle_type {
            parts.push(format!("vehicle_type: {kind}"));
        }
        parts
    }
}
