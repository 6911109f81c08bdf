//! Repositories for records hanging off a purchased vehicle.

use async_trait::async_trait;

use crate::{
    Error,
    purchase::{Insurance, ServiceRecord, Tax},
};

#[async_trait]
pub trait ServiceRecordRepository: Send + Sync + 'static {
    /// Inserts a service visit.
    ///
    /// A free visit consumes one of the vehicle's free services in the same
    /// transaction and fails with `RecordError::NoFreeServicesLeft` once the
    /// allowance is exhausted.
    async fn create(&self, service: &ServiceRecord) -> Result<ServiceRecord, Error>;

    async fn list_for_vehicle(&self, vehicle_id: &str) -> Result<Vec<ServiceRecord>, Error>;

    async fn delete(&self, service_id: &str) -> Result<bool, Error>;
}

#[async_trait]
pub trait TaxRepository: Send + Sync + 'static {
    async fn create(&self, tax: &Tax) -> Result<Tax, Error>;

    async fn list_for_vehicle(&self, vehicle_id: &str) -> Result<Vec<Tax>, Error>;

    async fn delete(&self, tax_id: &str) -> Result<bool, Error>;
}

#[async_trait]
pub trait InsuranceRepository: Send + Sync + 'static {
    async fn create(&self, insurance: &Insurance) -> Result<Insurance, Error>;

    async fn list_for_vehicle(&self, vehicle_id: &str) -> Result<Vec<Insurance>, Error>;

    async fn delete(&self, insurance_id: &str) -> Result<bool, Error>;
}
