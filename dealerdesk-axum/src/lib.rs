//! # DealerDesk Axum Integration
//!
//! HTTP routes for the dealerdesk CRM backend. Read-only endpoints take their
//! parameters from the query string. Mutating endpoints are gated by a
//! one-time passcode: `POST`/`PUT` requests carry `email` and `otp` in the JSON
//! body, `DELETE` requests carry them in the query string. A code is obtained
//! from `POST /generate-otp`.
//!
//! Errors are returned as `{"error": <message>, "code": <status>}`.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use dealerdesk::DealerDeskBuilder;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let desk = DealerDeskBuilder::new()
//!         .with_sqlite("sqlite://dealerdesk.db?mode=rwc")
//!         .await?
//!         .apply_migrations(true)
//!         .build()
//!         .await?;
//!
//!     let app = dealerdesk_axum::routes(Arc::new(desk));
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:5000").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```

mod error;
mod extractors;
mod routes;
mod types;

pub use error::{ApiError, Result};
pub use extractors::{AppState, Body, Gated, GatedQuery, Params};
pub use routes::create_router;
pub use types::{
    AccountIdParams, GenerateOtpRequest, HealthResponse, InsuranceIdParams, ListResponse,
    MessageResponse, OtpResponse, RecordResponse, ServiceIdParams, TaxIdParams, UpdateResponse,
    VehicleIdParams, VehicleModelParams,
};

use std::sync::Arc;

use axum::Router;
use dealerdesk::{DealerDesk, RepositoryProvider};

/// Create the CRM router for `desk`.
///
/// The returned router has its state applied and can be served directly or
/// nested under a prefix.
pub fn routes<R>(desk: Arc<DealerDesk<R>>) -> Router
where
    R: RepositoryProvider,
{
    create_router(desk)
}
