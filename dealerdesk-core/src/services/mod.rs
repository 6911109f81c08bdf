//! Service layer for business logic
//!
//! Each service is generic over the repository provider traits it needs and
//! holds the provider behind an `Arc`. Services validate raw client input,
//! talk to storage and log what they did. Only [`NotificationService`] sends email.

pub mod aftercare;
pub mod account;
pub mod dealer;
pub mod notification;
pub mod opportunity;
pub mod otp;
pub mod purchase;
pub mod vehicle;

#[cfg(test)]
pub(crate) mod mock;

pub use account::AccountService;
pub use aftercare::AftercareService;
pub use dealer::DealerService;
pub use notification::{NotificationConfig, NotificationService};
pub use opportunity::OpportunityService;
pub use otp::{OtpConfig, OtpService};
pub use purchase::{CompletedPurchase, PurchaseService};
pub use vehicle::VehicleService;
