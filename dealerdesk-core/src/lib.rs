//! Core functionality for the dealerdesk CRM backend
//!
//! This crate holds the domain records (accounts, dealers, opportunities, the
//! vehicle catalog and purchased vehicles with their after-sales records), the
//! field validation shared by every operation, the repository traits a storage
//! backend implements, and the services that run each operation.
//!
//! Mutating operations are gated by a one-time passcode, see [`services::OtpService`].
//! Outcome emails are formatted in [`notification`] and sent by
//! [`services::NotificationService`].
pub mod account;
pub mod datetime;
pub mod dealer;
pub mod error;
pub mod notification;
pub mod opportunity;
pub mod otp;
pub mod purchase;
pub mod repositories;
pub mod services;
pub mod validation;
pub mod vehicle;

pub use account::Account;
pub use dealer::Dealer;
pub use error::Error;
pub use opportunity::Opportunity;
pub use otp::{OtpCredentials, OtpRecord};
pub use purchase::{Insurance, NextService, PurchaseReceipt, PurchasedVehicle, ServiceRecord, Tax};
pub use repositories::RepositoryProvider;
pub use vehicle::VehicleDetails;
