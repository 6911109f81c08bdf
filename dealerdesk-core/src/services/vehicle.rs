//! The vehicle catalog.

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    Error,
    error::{RecordError, ValidationError},
    repositories::{VehicleRepository, VehicleRepositoryProvider},
    validation::{require_text, validate_name_length},
    vehicle::{
        MAX_VEHICLE_YEAR, MIN_VEHICLE_YEAR, VehicleAttributes, VehicleCriteria, VehicleDetails,
        VehicleDetailsUpdate,
    },
};

fn validate_year(year: i64) -> Result<(), ValidationError> {
    if !(MIN_VEHICLE_YEAR..=MAX_VEHICLE_YEAR).contains(&year) {
        return Err(ValidationError::InvalidField(format!(
            "vehicle_year must be between {MIN_VEHICLE_YEAR} and {MAX_VEHICLE_YEAR}"
        )));
    }
    Ok(())
}

fn validate_attributes(attributes: &VehicleAttributes) -> Result<(), ValidationError> {
    if let Some(model) = &attributes.vehicle_model {
        let model = require_text("vehicle_model", Some(model.as_str()))?;
        validate_name_length("vehicle_model", model)?;
    }
    if let Some(year) = attributes.vehicle_year {
        validate_year(year)?;
    }
    if let Some(warranty) = attributes.warranty_period_years
        && warranty < 0
    {
        return Err(ValidationError::InvalidField(
            "warranty_period_years cannot be negative".to_string(),
        ));
    }
    Ok(())
}

pub struct VehicleService<R: VehicleRepositoryProvider> {
    repositories: Arc<R>,
}

impl<R: VehicleRepositoryProvider> VehicleService<R> {
    pub fn new(repositories: Arc<R>) -> Self {
        Self { repositories }
    }

    pub async fn create(&self, attributes: VehicleAttributes) -> Result<VehicleDetails, Error> {
        let vehicle_model = require_text("vehicle_model", attributes.vehicle_model.as_deref())?;
        let vehicle_year = attributes
            .vehicle_year
            .ok_or_else(|| ValidationError::MissingField("vehicle_year".to_string()))?;
        validate_attributes(&attributes)?;

        let mut vehicle = VehicleDetails {
            vehicle_model_id: Uuid::new_v4().to_string(),
            vehicle_model: vehicle_model.to_string(),
            vehicle_year,
            engine_type: None,
            transmission: None,
            fuel_type: None,
            body_type: None,
            warranty_period_years: None,
            color: None,
            model_variant: None,
            tyre_company: None,
            tyre_size: None,
            start_type: None,
            sunroof_available: None,
            gear_type: None,
            vehicle_type: None,
        };
        attributes.apply_to(&mut vehicle);

        let vehicle = self.repositories.vehicle().create(&vehicle).await?;
        tracing::info!(vehicle_model_id = %vehicle.vehicle_model_id, "Added catalog vehicle");
        Ok(vehicle)
    }

    pub async fn list(&self) -> Result<Vec<VehicleDetails>, Error> {
        self.repositories.vehicle().list().await
    }

    pub async fn get(&self, vehicle_model_id: Option<&str>) -> Result<VehicleDetails, Error> {
        let vehicle_model_id = require_text("vehicle_model_id", vehicle_model_id)?;
        self.repositories
            .vehicle()
            .find_by_id(vehicle_model_id)
            .await?
            .ok_or_else(|| RecordError::not_found("Vehicle", vehicle_model_id).into())
    }

    pub async fn update(&self, update: VehicleDetailsUpdate) -> Result<VehicleDetails, Error> {
        let mut vehicle = self.get(update.vehicle_model_id.as_deref()).await?;
        validate_attributes(&update.attributes)?;

        if update.attributes.apply_to(&mut vehicle) == 0 {
            return Err(ValidationError::MissingField("at least one field to update".to_string()).into());
        }

        let vehicle = self.repositories.vehicle().update(&vehicle).await?;
        tracing::info!(vehicle_model_id = %vehicle.vehicle_model_id, "Updated catalog vehicle");
        Ok(vehicle)
    }

    /// Deletes every catalog entry matching all of the criteria.
    pub async fn delete(&self, criteria: &VehicleCriteria) -> Result<Vec<VehicleDetails>, Error> {
        if criteria.is_empty() {
            return Err(ValidationError::MissingField(
                "at least one deletion criterion".to_string(),
            )
            .into());
        }

        let deleted = self
            .repositories
            .vehicle()
            .delete_matching(criteria)
            .await?;
        if deleted.is_empty() {
            return Err(RecordError::NoMatches("vehicles").into());
        }

        tracing::info!(count = deleted.len(), "Deleted catalog vehicles");
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::mock::MockRepositories;

    fn service() -> VehicleService<MockRepositories> {
        VehicleService::new(Arc::new(MockRepositories::default()))
    }

    fn city(year: i64) -> VehicleAttributes {
        VehicleAttributes {
            vehicle_model: Some("City".to_string()),
            vehicle_year: Some(year),
            fuel_type: Some("Petrol".to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_validates_required_fields() {
        let service = service();
        let created = service.create(city(2024)).await.unwrap();
        assert_eq!(created.fuel_type.as_deref(), Some("Petrol"));
        assert_eq!(service.get(Some(created.vehicle_model_id.as_str())).await.unwrap(), created);

        assert!(service.create(city(1850)).await.unwrap_err().is_validation_error());
        assert!(
            service
                .create(VehicleAttributes {
                    vehicle_model: Some("City".to_string()),
                    ..Default::default()
                })
                .await
                .unwrap_err()
                .is_validation_error()
        );
    }

    #[tokio::test]
    async fn test_update_requires_a_change() {
        let service = service();
        let created = service.create(city(2024)).await.unwrap();

        let updated = service
            .update(VehicleDetailsUpdate {
                vehicle_model_id: Some(created.vehicle_model_id.clone()),
                attributes: VehicleAttributes {
                    sunroof_available: Some(true),
                    ..Default::default()
                },
            })
            .await
            .unwrap();
        assert_eq!(updated.sunroof_available, Some(true));

        let unchanged = service
            .update(VehicleDetailsUpdate {
                vehicle_model_id: Some(created.vehicle_model_id),
                attributes: VehicleAttributes::default(),
            })
            .await;
        assert!(unchanged.unwrap_err().is_validation_error());
    }

    #[tokio::test]
    async fn test_delete_by_criteria() {
        let service = service();
        service.create(city(2023)).await.unwrap();
        service.create(city(2024)).await.unwrap();

        assert!(
            service
                .delete(&VehicleCriteria::default())
                .await
                .unwrap_err()
                .is_validation_error()
        );

        let deleted = service
            .delete(&VehicleCriteria {
                vehicle_year: Some(2023),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(deleted.len(), 1);
        assert_eq!(service.list().await.unwrap().len(), 1);
    }
}
