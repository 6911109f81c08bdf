//! Service visits, taxes and insurance for purchased vehicles.

use std::sync::Arc;

use chrono::Duration;
use uuid::Uuid;

use crate::{
    Error,
    datetime::{business_now, parse_input_date},
    error::{RecordError, ValidationError},
    purchase::{
        FREE_SERVICE, Insurance, NewInsurance, NewServiceRecord, NewTax, NextService,
        PurchasedVehicle, REGULAR_MAINTENANCE, ROAD_TAX, ROAD_TAX_VALIDITY_DAYS, ServiceRecord,
        Tax,
    },
    repositories::{
        InsuranceRepository, InsuranceRepositoryProvider, PurchaseRepository,
        PurchaseRepositoryProvider, ServiceRecordRepository, ServiceRecordRepositoryProvider,
        TaxRepository, TaxRepositoryProvider,
    },
    validation::{require_text, validate_positive_number},
};

fn optional_date(value: Option<&str>) -> Result<Option<chrono::NaiveDate>, ValidationError> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(parse_input_date)
        .transpose()
}

pub struct AftercareService<R>
where
    R: PurchaseRepositoryProvider
        + ServiceRecordRepositoryProvider
        + TaxRepositoryProvider
        + InsuranceRepositoryProvider,
{
    repositories: Arc<R>,
}

impl<R> AftercareService<R>
where
    R: PurchaseRepositoryProvider
        + ServiceRecordRepositoryProvider
        + TaxRepositoryProvider
        + InsuranceRepositoryProvider,
{
    pub fn new(repositories: Arc<R>) -> Self {
        Self { repositories }
    }

    async fn vehicle(&self, vehicle_id: Option<&str>) -> Result<PurchasedVehicle, Error> {
        let vehicle_id = require_text("vehicle_id", vehicle_id)?;
        self.repositories
            .purchase()
            .find_by_id(vehicle_id)
            .await?
            .ok_or_else(|| RecordError::not_found("Purchased vehicle", vehicle_id).into())
    }

    /// Schedules a service visit. Free visits draw on the vehicle's allowance.
    pub async fn add_service(&self, new: NewServiceRecord) -> Result<ServiceRecord, Error> {
        let vehicle = self.vehicle(new.vehicle_id.as_deref()).await?;
        let is_free = new.is_free.unwrap_or(false);

        if let Some(km) = new.kilometers_due
            && km < 0
        {
            return Err(
                ValidationError::InvalidField("kilometers_due cannot be negative".to_string())
                    .into(),
            );
        }

        let next = NextService::after(&vehicle);
        let service_type = new
            .service_type
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(if is_free { FREE_SERVICE } else { REGULAR_MAINTENANCE })
            .to_string();

        let service = self
            .repositories
            .service_record()
            .create(&ServiceRecord {
                service_id: Uuid::new_v4().to_string(),
                vehicle_id: vehicle.vehicle_id.clone(),
                service_type,
                due_date: optional_date(new.due_date.as_deref())?.unwrap_or(next.due_date),
                kilometers_due: new.kilometers_due.or(Some(next.kilometers_due)),
                is_free,
            })
            .await?;

        tracing::info!(
            vehicle_id = %vehicle.vehicle_id,
            service_id = %service.service_id,
            is_free = is_free,
            "Scheduled service"
        );
        Ok(service)
    }

    pub async fn services_for(&self, vehicle_id: Option<&str>) -> Result<Vec<ServiceRecord>, Error> {
        let vehicle = self.vehicle(vehicle_id).await?;
        self.repositories
            .service_record()
            .list_for_vehicle(&vehicle.vehicle_id)
            .await
    }

    pub async fn delete_service(&self, service_id: Option<&str>) -> Result<(), Error> {
        let service_id = require_text("service_id", service_id)?;
        if !self.repositories.service_record().delete(service_id).await? {
            return Err(RecordError::not_found("Service", service_id).into());
        }
        tracing::info!(service_id = %service_id, "Deleted service");
        Ok(())
    }

    /// Records a tax payment; type defaults to road tax valid for a year.
    pub async fn add_tax(&self, new: NewTax) -> Result<Tax, Error> {
        let vehicle = self.vehicle(new.vehicle_id.as_deref()).await?;
        let tax_amount = new
            .tax_amount
            .ok_or_else(|| ValidationError::MissingField("tax_amount".to_string()))?;
        validate_positive_number("tax_amount", tax_amount)?;

        let due_date = match optional_date(new.due_date.as_deref())? {
            Some(date) => date,
            None => (business_now() + Duration::days(ROAD_TAX_VALIDITY_DAYS)).date(),
        };

        let tax = self
            .repositories
            .tax()
            .create(&Tax {
                tax_id: Uuid::new_v4().to_string(),
                vehicle_id: vehicle.vehicle_id.clone(),
                tax_amount,
                tax_type: new
                    .tax_type
                    .as_deref()
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .unwrap_or(ROAD_TAX)
                    .to_string(),
                due_date,
            })
            .await?;

        tracing::info!(vehicle_id = %vehicle.vehicle_id, tax_id = %tax.tax_id, "Recorded tax");
        Ok(tax)
    }

    pub async fn taxes_for(&self, vehicle_id: Option<&str>) -> Result<Vec<Tax>, Error> {
        let vehicle = self.vehicle(vehicle_id).await?;
        self.repositories.tax().list_for_vehicle(&vehicle.vehicle_id).await
    }

    pub async fn delete_tax(&self, tax_id: Option<&str>) -> Result<(), Error> {
        let tax_id = require_text("tax_id", tax_id)?;
        if !self.repositories.tax().delete(tax_id).await? {
            return Err(RecordError::not_found("Tax", tax_id).into());
        }
        tracing::info!(tax_id = %tax_id, "Deleted tax");
        Ok(())
    }

    pub async fn add_insurance(&self, new: NewInsurance) -> Result<Insurance, Error> {
        let vehicle = self.vehicle(new.vehicle_id.as_deref()).await?;
        let insurance = new.details.into_insurance(&vehicle.vehicle_id)?;

        let insurance = self.repositories.insurance().create(&insurance).await?;
        tracing::info!(
            vehicle_id = %vehicle.vehicle_id,
            insurance_id = %insurance.insurance_id,
            "Recorded insurance"
        );
        Ok(insurance)
    }

    pub async fn insurance_for(&self, vehicle_id: Option<&str>) -> Result<Vec<Insurance>, Error> {
        let vehicle = self.vehicle(vehicle_id).await?;
        self.repositories
            .insurance()
            .list_for_vehicle(&vehicle.vehicle_id)
            .await
    }

    pub async fn delete_insurance(&self, insurance_id: Option<&str>) -> Result<(), Error> {
        let insurance_id = require_text("insurance_id", insurance_id)?;
        if !self.repositories.insurance().delete(insurance_id).await? {
            return Err(RecordError::not_found("Insurance", insurance_id).into());
        }
        tracing::info!(insurance_id = %insurance_id, "Deleted insurance");
        Ok(())
    }
}
