use async_trait::async_trait;

use crate::{
    Error,
    vehicle::{VehicleCriteria, VehicleDetails},
};

/// Storage for the vehicle catalog.
#[async_trait]
pub trait VehicleRepository: Send + Sync + 'static {
    async fn create(&self, vehicle: &VehicleDetails) -> Result<VehicleDetails, Error>;

    async fn find_by_id(&self, vehicle_model_id: &str) -> Result<Option<VehicleDetails>, Error>;

    async fn list(&self) -> Result<Vec<VehicleDetails>, Error>;

    async fn update(&self, vehicle: &VehicleDetails) -> Result<VehicleDetails, Error>;

    /// Deletes all entries matching every set criterion and returns them.
    async fn delete_matching(&self, criteria: &VehicleCriteria)
    -> Result<Vec<VehicleDetails>, Error>;
}
