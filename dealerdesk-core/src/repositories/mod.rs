//! Repository traits for the data access layer.
//!
//! Services talk to storage only through these traits.
//!
//! # Trait Hierarchy
//!
//! - Individual `*Repository` traits define the operations for one entity
//! - Individual `*RepositoryProvider` traits hand out each repository
//! - [`RepositoryProvider`] combines every provider trait with lifecycle methods
//!
//! Services are generic over the provider trait they need and hold the
//! provider behind an `Arc`, so one storage backend instance serves all of them.

pub mod account;
pub mod aftercare;
pub mod dealer;
pub mod opportunity;
pub mod otp;
pub mod purchase;
pub mod vehicle;

pub use account::AccountRepository;
pub use aftercare::{InsuranceRepository, ServiceRecordRepository, TaxRepository};
pub use dealer::DealerRepository;
pub use opportunity::OpportunityRepository;
pub use otp::OtpRepository;
pub use purchase::PurchaseRepository;
pub use vehicle::VehicleRepository;

use async_trait::async_trait;

use crate::Error;

// ============================================================================
// Individual Repository Provider Traits
// ============================================================================

pub trait AccountRepositoryProvider: Send + Sync + 'static {
    type AccountRepo: AccountRepository;

    fn account(&self) -> &Self::AccountRepo;
}

pub trait DealerRepositoryProvider: Send + Sync + 'static {
    type DealerRepo: DealerRepository;

    fn dealer(&self) -> &Self::DealerRepo;
}

pub trait OpportunityRepositoryProvider: Send + Sync + 'static {
    type OpportunityRepo: OpportunityRepository;

    fn opportunity(&self) -> &Self::OpportunityRepo;
}

pub trait VehicleRepositoryProvider: Send + Sync + 'static {
    type VehicleRepo: VehicleRepository;

    fn vehicle(&self) -> &Self::VehicleRepo;
}

pub trait PurchaseRepositoryProvider: Send + Sync + 'static {
    type PurchaseRepo: PurchaseRepository;

    fn purchase(&self) -> &Self::PurchaseRepo;
}

pub trait ServiceRecordRepositoryProvider: Send + Sync + 'static {
    type ServiceRecordRepo: ServiceRecordRepository;

    fn service_record(&self) -> &Self::ServiceRecordRepo;
}

pub trait TaxRepositoryProvider: Send + Sync + 'static {
    type TaxRepo: TaxRepository;

    fn tax(&self) -> &Self::TaxRepo;
}

pub trait InsuranceRepositoryProvider: Send + Sync + 'static {
    type InsuranceRepo: InsuranceRepository;

    fn insurance(&self) -> &Self::InsuranceRepo;
}

pub trait OtpRepositoryProvider: Send + Sync + 'static {
    type OtpRepo: OtpRepository;

    fn otp(&self) -> &Self::OtpRepo;
}

// ============================================================================
// Unified Repository Provider Trait
// ============================================================================

/// Everything a storage backend must provide.
///
/// ```rust,ignore
/// use dealerdesk_core::repositories::*;
///
/// impl AccountRepositoryProvider for MyStorage {
///     type AccountRepo = MyAccountRepository;
///     fn account(&self) -> &Self::AccountRepo { &self.account }
/// }
///
/// // ... the other provider traits ...
///
/// #[async_trait]
/// impl RepositoryProvider for MyStorage {
///     async fn migrate(&self) -> Result<(), Error> { /* ... */ }
///     async fn health_check(&self) -> Result<(), Error> { /* ... */ }
/// }
/// ```
#[async_trait]
pub trait RepositoryProvider:
    AccountRepositoryProvider
    + DealerRepositoryProvider
    + OpportunityRepositoryProvider
    + VehicleRepositoryProvider
    + PurchaseRepositoryProvider
    + ServiceRecordRepositoryProvider
    + TaxRepositoryProvider
    + InsuranceRepositoryProvider
    + OtpRepositoryProvider
{
    /// Apply all pending schema migrations.
    async fn migrate(&self) -> Result<(), Error>;

    async fn health_check(&self) -> Result<(), Error>;
}
