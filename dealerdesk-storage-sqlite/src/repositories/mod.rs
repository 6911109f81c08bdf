//! Repository implementations for SQLite storage

pub mod account;
pub mod aftercare;
pub mod dealer;
pub mod opportunity;
pub mod otp;
pub mod purchase;
pub mod vehicle;

pub use account::SqliteAccountRepository;
pub use aftercare::{SqliteInsuranceRepository, SqliteServiceRecordRepository, SqliteTaxRepository};
pub use dealer::SqliteDealerRepository;
pub use opportunity::SqliteOpportunityRepository;
pub use otp::SqliteOtpRepository;
pub use purchase::SqlitePurchaseRepository;
pub use vehicle::SqliteVehicleRepository;

use std::{str::FromStr, sync::Arc};

use async_trait::async_trait;
use dealerdesk_core::{
    Error,
    error::StorageError,
    repositories::{
        AccountRepositoryProvider, DealerRepositoryProvider, InsuranceRepositoryProvider,
        OpportunityRepositoryProvider, OtpRepositoryProvider, PurchaseRepositoryProvider,
        RepositoryProvider, ServiceRecordRepositoryProvider, TaxRepositoryProvider,
        VehicleRepositoryProvider,
    },
};
use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};

use crate::migrations::{MigrationManager, SqliteMigrationManager, all};

/// Repository provider implementation for SQLite
///
/// Implements every individual provider trait as well as the unified
/// [`RepositoryProvider`]. All repositories share one pool.
pub struct SqliteRepositoryProvider {
    pool: SqlitePool,
    account: Arc<SqliteAccountRepository>,
    dealer: Arc<SqliteDealerRepository>,
    opportunity: Arc<SqliteOpportunityRepository>,
    vehicle: Arc<SqliteVehicleRepository>,
    purchase: Arc<SqlitePurchaseRepository>,
    service_record: Arc<SqliteServiceRecordRepository>,
    tax: Arc<SqliteTaxRepository>,
    insurance: Arc<SqliteInsuranceRepository>,
    otp: Arc<SqliteOtpRepository>,
}

impl SqliteRepositoryProvider {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            account: Arc::new(SqliteAccountRepository::new(pool.clone())),
            dealer: Arc::new(SqliteDealerRepository::new(pool.clone())),
            opportunity: Arc::new(SqliteOpportunityRepository::new(pool.clone())),
            vehicle: Arc::new(SqliteVehicleRepository::new(pool.clone())),
            purchase: Arc::new(SqlitePurchaseRepository::new(pool.clone())),
            service_record: Arc::new(SqliteServiceRecordRepository::new(pool.clone())),
            tax: Arc::new(SqliteTaxRepository::new(pool.clone())),
            insurance: Arc::new(SqliteInsuranceRepository::new(pool.clone())),
            otp: Arc::new(SqliteOtpRepository::new(pool.clone())),
            pool,
        }
    }

    /// Opens a pool for `url`, creating the database file if needed.
    ///
    /// In-memory databases get a single connection so every query sees the
    /// same database.
    pub async fn connect(url: &str) -> Result<Self, Error> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| {
                tracing::error!(error = %e, "Invalid database url");
                StorageError::Connection(format!("Invalid database url: {url}"))
            })?
            .create_if_missing(true)
            .foreign_keys(true);

        let max_connections = if url.contains(":memory:") { 1 } else { 5 };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to connect to database");
                StorageError::Connection("Failed to connect to database".to_string())
            })?;

        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl AccountRepositoryProvider for SqliteRepositoryProvider {
    type AccountRepo = SqliteAccountRepository;

    fn account(&self) -> &Self::AccountRepo {
        &self.account
    }
}

impl DealerRepositoryProvider for SqliteRepositoryProvider {
    type DealerRepo = SqliteDealerRepository;

    fn dealer(&self) -> &Self::DealerRepo {
        &self.dealer
    }
}

impl OpportunityRepositoryProvider for SqliteRepositoryProvider {
    type OpportunityRepo = SqliteOpportunityRepository;

    fn opportunity(&self) -> &Self::OpportunityRepo {
        &self.opportunity
    }
}

impl VehicleRepositoryProvider for SqliteRepositoryProvider {
    type VehicleRepo = SqliteVehicleRepository;

    fn vehicle(&self) -> &Self::VehicleRepo {
        &self.vehicle
    }
}

impl PurchaseRepositoryProvider for SqliteRepositoryProvider {
    type PurchaseRepo = SqlitePurchaseRepository;

    fn purchase(&self) -> &Self::PurchaseRepo {
        &self.purchase
    }
}

impl ServiceRecordRepositoryProvider for SqliteRepositoryProvider {
    type ServiceRecordRepo = SqliteServiceRecordRepository;

    fn service_record(&self) -> &Self::ServiceRecordRepo {
        &self.service_record
    }
}

impl TaxRepositoryProvider for SqliteRepositoryProvider {
    type TaxRepo = SqliteTaxRepository;

    fn tax(&self) -> &Self::TaxRepo {
        &self.tax
    }
}

impl InsuranceRepositoryProvider for SqliteRepositoryProvider {
    type InsuranceRepo = SqliteInsuranceRepository;

    fn insurance(&self) -> &Self::InsuranceRepo {
        &self.insurance
    }
}

impl OtpRepositoryProvider for SqliteRepositoryProvider {
    type OtpRepo = SqliteOtpRepository;

    fn otp(&self) -> &Self::OtpRepo {
        &self.otp
    }
}

#[async_trait]
impl RepositoryProvider for SqliteRepositoryProvider {
    async fn migrate(&self) -> Result<(), Error> {
        let manager = SqliteMigrationManager::new(self.pool.clone());
        manager.initialize().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to initialize migrations");
            Error::Storage(StorageError::Migration(
                "Failed to initialize migrations".to_string(),
            ))
        })?;

        manager.up(&all()).await.map_err(|e| {
            tracing::error!(error = %e, "Failed to run migrations");
            Error::Storage(StorageError::Migration(
                "Failed to run migrations".to_string(),
            ))
        })?;

        Ok(())
    }

    async fn health_check(&self) -> Result<(), Error> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| crate::storage_error("Health check failed", e))?;
        Ok(())
    }
}
