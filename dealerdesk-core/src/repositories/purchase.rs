use async_trait::async_trait;

use crate::{
    Error,
    purchase::{PurchaseFilter, PurchaseRecord, PurchasedVehicle},
};

#[async_trait]
pub trait PurchaseRepository: Send + Sync + 'static {
    /// Persists the vehicle, its tax, optional insurance and first free service
    /// atomically.
    async fn record(&self, purchase: &PurchaseRecord) -> Result<(), Error>;

    async fn find_by_id(&self, vehicle_id: &str) -> Result<Option<PurchasedVehicle>, Error>;

    async fn find(&self, filter: &PurchaseFilter) -> Result<Vec<PurchasedVehicle>, Error>;

    async fn update(&self, vehicle: &PurchasedVehicle) -> Result<PurchasedVehicle, Error>;

    /// Deletes the vehicle together with its services, taxes and insurance.
    async fn delete(&self, vehicle_id: &str) -> Result<bool, Error>;
}
