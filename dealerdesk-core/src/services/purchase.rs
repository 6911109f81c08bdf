//! Vehicle sales and the purchased vehicles they produce.

use std::sync::Arc;

use chrono::Duration;
use uuid::Uuid;

use crate::{
    Error,
    datetime::{business_now, parse_input_datetime},
    error::{RecordError, ValidationError},
    opportunity::Opportunity,
    purchase::{
        FREE_SERVICE, FREE_SERVICES_PER_PURCHASE, NextService, PurchaseFilter, PurchaseReceipt,
        PurchaseRecord, PurchaseRequest, PurchaseUpdate, PurchasedVehicle, ROAD_TAX,
        ROAD_TAX_VALIDITY_DAYS, ServiceRecord, Tax,
    },
    repositories::{
        OpportunityRepository, OpportunityRepositoryProvider, PurchaseRepository,
        PurchaseRepositoryProvider, VehicleRepository, VehicleRepositoryProvider,
    },
    validation::{require_text, validate_email, validate_positive_number},
    vehicle::VehicleDetails,
};

/// A recorded sale together with the records it was made against.
#[derive(Debug, Clone)]
pub struct CompletedPurchase {
    pub receipt: PurchaseReceipt,
    pub opportunity: Opportunity,
    pub model: VehicleDetails,
    pub customer_email: Option<String>,
}

fn validate_kilometers(kilometers: i64) -> Result<(), ValidationError> {
    if kilometers < 0 {
        return Err(ValidationError::InvalidField(
            "current_kilometers cannot be negative".to_string(),
        ));
    }
    Ok(())
}

pub struct PurchaseService<R>
where
    R: PurchaseRepositoryProvider + OpportunityRepositoryProvider + VehicleRepositoryProvider,
{
    repositories: Arc<R>,
}

impl<R> PurchaseService<R>
where
    R: PurchaseRepositoryProvider + OpportunityRepositoryProvider + VehicleRepositoryProvider,
{
    pub fn new(repositories: Arc<R>) -> Self {
        Self { repositories }
    }

    /// Records a sale: the vehicle, its road tax, optional insurance and the
    /// first complimentary service, all in one write.
    pub async fn purchase(&self, request: PurchaseRequest) -> Result<CompletedPurchase, Error> {
        let opportunity_id = require_text("opportunity_id", request.opportunity_id.as_deref())?;
        let vehicle_model_id =
            require_text("vehicle_model_id", request.vehicle_model_id.as_deref())?;

        let tax_amount = request
            .tax_amount
            .ok_or_else(|| ValidationError::MissingField("tax_amount".to_string()))?;
        validate_positive_number("tax_amount", tax_amount)?;

        let current_kilometers = request.current_kilometers.unwrap_or(0);
        validate_kilometers(current_kilometers)?;

        let customer_email = match request.customer_email.as_deref().map(str::trim) {
            Some(email) if !email.is_empty() => {
                validate_email(email)?;
                Some(email.to_string())
            }
            _ => None,
        };

        let purchase_date = match request.purchase_date.as_deref().map(str::trim) {
            Some(date) if !date.is_empty() => parse_input_datetime(date)?,
            _ => business_now(),
        };

        let opportunity = self
            .repositories
            .opportunity()
            .find_by_id(opportunity_id)
            .await?
            .ok_or_else(|| RecordError::not_found("Opportunity", opportunity_id))?;
        let model = self
            .repositories
            .vehicle()
            .find_by_id(vehicle_model_id)
            .await?
            .ok_or_else(|| RecordError::not_found("Vehicle", vehicle_model_id))?;

        let vehicle_id = Uuid::new_v4().to_string();
        let insurance = request
            .insurance
            .map(|details| details.into_insurance(&vehicle_id))
            .transpose()?;

        let vehicle = PurchasedVehicle {
            vehicle_id: vehicle_id.clone(),
            opportunity_id: opportunity.opportunity_id.clone(),
            vehicle_model_id: model.vehicle_model_id.clone(),
            purchase_date,
            vehicle_color: request
                .vehicle_color
                .as_deref()
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(ToString::to_string)
                .or_else(|| model.color.clone()),
            current_kilometers,
            free_services_left: FREE_SERVICES_PER_PURCHASE - 1,
        };

        let next_service = NextService::after(&vehicle);
        let record = PurchaseRecord {
            tax: Tax {
                tax_id: Uuid::new_v4().to_string(),
                vehicle_id: vehicle_id.clone(),
                tax_amount,
                tax_type: ROAD_TAX.to_string(),
                due_date: (purchase_date + Duration::days(ROAD_TAX_VALIDITY_DAYS)).date(),
            },
            insurance,
            free_service: ServiceRecord {
                service_id: Uuid::new_v4().to_string(),
                vehicle_id: vehicle_id.clone(),
                service_type: FREE_SERVICE.to_string(),
                due_date: next_service.due_date,
                kilometers_due: Some(next_service.kilometers_due),
                is_free: true,
            },
            vehicle,
        };

        self.repositories.purchase().record(&record).await?;
        tracing::info!(
            vehicle_id = %vehicle_id,
            opportunity_id = %opportunity.opportunity_id,
            "Recorded vehicle purchase"
        );

        Ok(CompletedPurchase {
            receipt: PurchaseReceipt {
                record,
                next_service,
            },
            opportunity,
            model,
            customer_email,
        })
    }

    /// Purchased vehicles matching the filter; none is reported as `NoMatches`.
    pub async fn list(&self, filter: &PurchaseFilter) -> Result<Vec<PurchasedVehicle>, Error> {
        let vehicles = self.repositories.purchase().find(filter).await?;
        if vehicles.is_empty() {
            return Err(RecordError::NoMatches("purchased vehicles").into());
        }
        Ok(vehicles)
    }

    pub async fn get(&self, vehicle_id: Option<&str>) -> Result<PurchasedVehicle, Error> {
        let vehicle_id = require_text("vehicle_id", vehicle_id)?;
        self.repositories
            .purchase()
            .find_by_id(vehicle_id)
            .await?
            .ok_or_else(|| RecordError::not_found("Purchased vehicle", vehicle_id).into())
    }

    /// Changes colour and/or odometer reading, returning the changed fields.
    pub async fn update(
        &self,
        update: PurchaseUpdate,
    ) -> Result<(PurchasedVehicle, Vec<(&'static str, String)>), Error> {
        let mut vehicle = self.get(update.vehicle_id.as_deref()).await?;
        let mut changes = Vec::new();

        if let Some(color) = update.vehicle_color.as_deref() {
            let color = require_text("vehicle_color", Some(color))?;
            vehicle.vehicle_color = Some(color.to_string());
            changes.push(("vehicle_color", color.to_string()));
        }
        if let Some(kilometers) = update.current_kilometers {
            validate_kilometers(kilometers)?;
            vehicle.current_kilometers = kilometers;
            changes.push(("current_kilometers", kilometers.to_string()));
        }

        if changes.is_empty() {
            return Err(ValidationError::MissingField(
                "vehicle_color or current_kilometers".to_string(),
            )
            .into());
        }

        let vehicle = self.repositories.purchase().update(&vehicle).await?;
        tracing::info!(vehicle_id = %vehicle.vehicle_id, "Updated purchased vehicle");
        Ok((vehicle, changes))
    }

    /// Deletes the vehicle and everything recorded against it.
    pub async fn delete(&self, vehicle_id: Option<&str>) -> Result<PurchasedVehicle, Error> {
        let vehicle = self.get(vehicle_id).await?;
        if !self.repositories.purchase().delete(&vehicle.vehicle_id).await? {
            return Err(RecordError::not_found("Purchased vehicle", vehicle.vehicle_id).into());
        }

        tracing::info!(vehicle_id = %vehicle.vehicle_id, "Deleted purchased vehicle");
        Ok(vehicle)
    }

    pub async fn next_service(&self, vehicle_id: Option<&str>) -> Result<NextService, Error> {
        Ok(NextService::after(&self.get(vehicle_id).await?))
    }
}
