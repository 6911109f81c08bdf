//! # DealerDesk
//!
//! A dealership CRM backend. It keeps customer accounts, dealers, sales
//! opportunities, the vehicle catalog and purchased vehicles together with
//! their service visits, taxes and insurance policies.
//!
//! Every operation emails an outcome notice. Mutating operations are expected
//! to be gated by a one-time passcode: call [`DealerDesk::generate_otp`] to
//! email a code and [`DealerDesk::verify_otp`] before running the operation.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use dealerdesk::{DealerDesk, NotificationConfig, NotificationService, SqliteRepositoryProvider};
//! use dealerdesk_mailer::MemoryTransport;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), dealerdesk::Error> {
//!     let repositories = Arc::new(SqliteRepositoryProvider::connect("sqlite::memory:").await?);
//!     let notifications = NotificationService::new(
//!         Arc::new(MemoryTransport::new()),
//!         NotificationConfig::default(),
//!     );
//!
//!     let desk = DealerDesk::new(repositories, notifications);
//!     desk.migrate().await?;
//!     Ok(())
//! }
//! ```
mod builder;

use std::sync::Arc;

use dealerdesk_core::{
    datetime::business_now,
    notification,
    repositories::{OtpRepository, OtpRepositoryProvider},
    services::{
        AccountService, AftercareService, DealerService, OpportunityService, OtpService,
        PurchaseService, VehicleService,
    },
};

pub use builder::{DealerDeskBuilder, DealerDeskBuilderError, NoStorage, WithStorage};

/// Re-export core types from dealerdesk_core
pub use dealerdesk_core::{
    Account, Dealer, Error, Insurance, NextService, Opportunity, OtpCredentials, OtpRecord,
    PurchaseReceipt, PurchasedVehicle, RepositoryProvider, ServiceRecord, Tax, VehicleDetails,
    account::{AccountUpdate, NewAccount},
    dealer::{DealerFilter, DealerUpdate, NewDealer},
    opportunity::{
        NewOpportunity, OpportunityChanges, OpportunityCriteria, OpportunityQuery,
        OpportunityUpdate,
    },
    purchase::{
        NewInsurance, NewServiceRecord, NewTax, PurchaseFilter, PurchaseRequest, PurchaseUpdate,
    },
    services::{CompletedPurchase, NotificationConfig, NotificationService, OtpConfig},
    vehicle::{VehicleAttributes, VehicleCriteria, VehicleDetailsUpdate},
};

/// Re-export storage backends
#[cfg(feature = "sqlite")]
pub use dealerdesk_storage_sqlite::SqliteRepositoryProvider;

/// The coordinator that runs every CRM operation and reports its outcome.
///
/// Each method delegates to a service from `dealerdesk_core` and then emails
/// the result: successes go to the configured receivers, failures to the
/// error-handling group, and empty lookups are reported as warnings. Outcome
/// emails never change the returned result.
pub struct DealerDesk<R: RepositoryProvider> {
    repositories: Arc<R>,
    otp: OtpService<R>,
    accounts: AccountService<R>,
    dealers: DealerService<R>,
    opportunities: OpportunityService<R>,
    vehicles: VehicleService<R>,
    purchases: PurchaseService<R>,
    aftercare: AftercareService<R>,
    notifications: NotificationService,
}

impl<R: RepositoryProvider> DealerDesk<R> {
    pub fn new(repositories: Arc<R>, notifications: NotificationService) -> Self {
        Self {
            otp: OtpService::new(repositories.clone(), OtpConfig::default()),
            accounts: AccountService::new(repositories.clone()),
            dealers: DealerService::new(repositories.clone()),
            opportunities: OpportunityService::new(repositories.clone()),
            vehicles: VehicleService::new(repositories.clone()),
            purchases: PurchaseService::new(repositories.clone()),
            aftercare: AftercareService::new(repositories.clone()),
            repositories,
            notifications,
        }
    }

    /// Replace the passcode settings.
    pub fn with_otp_config(mut self, config: OtpConfig) -> Self {
        self.otp = OtpService::new(self.repositories.clone(), config);
        self
    }

    /// Run migrations for all repositories
    pub async fn migrate(&self) -> Result<(), Error> {
        self.repositories.migrate().await
    }

    /// Health check for all repositories
    pub async fn health_check(&self) -> Result<(), Error> {
        self.repositories.health_check().await
    }

    pub fn otp_config(&self) -> &OtpConfig {
        self.otp.config()
    }

    pub fn notification_config(&self) -> &NotificationConfig {
        self.notifications.config()
    }

    // ------------------------------------------------------------------
    // One-time passcodes
    // ------------------------------------------------------------------

    /// Issues a passcode for `email` and emails it.
    ///
    /// If the email cannot be sent the code is withdrawn and the transport
    /// error is returned.
    pub async fn generate_otp(&self, email: &str) -> Result<OtpRecord, Error> {
        let record = self.otp.issue(email).await?;
        let ttl_secs = self.otp.config().ttl.num_seconds();

        if let Err(e) = self
            .notifications
            .send_otp(&record.email, record.code, ttl_secs)
            .await
        {
            tracing::error!(error = %e, email = %record.email, "Failed to deliver OTP");
            // Only this code; a newer one may already have been issued.
            if let Err(cleanup) = self
                .repositories
                .otp()
                .consume(&record.email, record.code)
                .await
            {
                tracing::warn!(error = %cleanup, "Failed to withdraw undelivered OTP");
            }
            return Err(e);
        }

        Ok(record)
    }

    /// Checks and consumes the passcode presented with a request.
    pub async fn verify_otp(&self, credentials: &OtpCredentials) -> Result<(), Error> {
        self.otp.verify(credentials).await
    }

    /// Spawns the background sweeper that deletes expired passcodes.
    pub fn start_otp_cleanup(
        &self,
        every: std::time::Duration,
        shutdown: tokio::sync::watch::Receiver<bool>,
    ) -> tokio::task::JoinHandle<()> {
        self.otp.start_cleanup_task(every, shutdown)
    }

    // ------------------------------------------------------------------
    // Outcome reporting
    // ------------------------------------------------------------------

    async fn report_failure(&self, subject: &str, error: &Error) {
        if error.is_not_found() {
            self.notifications
                .notify_warning(subject, &error.to_string())
                .await;
        } else {
            self.notifications
                .notify_failure(subject, &error.to_string())
                .await;
        }
    }

    /// Sends a generic outcome notice built from `details`.
    async fn report<T>(
        &self,
        subject: &str,
        result: Result<T, Error>,
        details: impl FnOnce(&T) -> String,
    ) -> Result<T, Error> {
        match &result {
            Ok(value) => {
                self.notifications
                    .notify_success(subject, &details(value))
                    .await
            }
            Err(e) => self.report_failure(subject, e).await,
        }
        result
    }

    /// Like [`Self::report`] but sends a complete body to the team on success.
    async fn announce<T>(
        &self,
        subject: &str,
        result: Result<T, Error>,
        body: impl FnOnce(&T) -> String,
    ) -> Result<T, Error> {
        match &result {
            Ok(value) => self.notifications.notify_team(subject, body(value)).await,
            Err(e) => self.report_failure(subject, e).await,
        }
        result
    }

    // ------------------------------------------------------------------
    // Accounts
    // ------------------------------------------------------------------

    pub async fn add_account(&self, new: NewAccount) -> Result<Account, Error> {
        let result = self.accounts.create(new).await;
        self.report("Account Created", result, notification::account_details)
            .await
    }

    pub async fn accounts(&self) -> Result<Vec<Account>, Error> {
        let result = self.accounts.list().await;
        self.report("Accounts Retrieved", result, |accounts| {
            notification::accounts_details(accounts)
        })
        .await
    }

    pub async fn account(&self, account_id: Option<&str>) -> Result<Account, Error> {
        let result = self.accounts.get(account_id).await;
        self.report("Account Retrieved", result, notification::account_details)
            .await
    }

    pub async fn update_account(&self, update: AccountUpdate) -> Result<Account, Error> {
        let result = self.accounts.rename(update).await;
        self.report("Account Updated", result, notification::account_details)
            .await
    }

    pub async fn delete_account(&self, account_id: Option<&str>) -> Result<Account, Error> {
        let result = self.accounts.delete(account_id).await;
        self.report("Account Deleted", result, notification::account_details)
            .await
    }

    // ------------------------------------------------------------------
    // Dealers
    // ------------------------------------------------------------------

    pub async fn add_dealer(&self, new: NewDealer) -> Result<Dealer, Error> {
        let result = self.dealers.create(new).await;
        self.report("Dealer Created", result, notification::dealer_details)
            .await
    }

    pub async fn dealers(&self) -> Result<Vec<Dealer>, Error> {
        let result = self.dealers.list().await;
        self.report("Dealers Retrieved", result, |dealers| {
            notification::dealers_details(dealers)
        })
        .await
    }

    pub async fn find_dealers(&self, filter: &DealerFilter) -> Result<Vec<Dealer>, Error> {
        let result = self.dealers.find(filter).await;
        self.report("Dealers Retrieved", result, |dealers| {
            notification::dealers_details(dealers)
        })
        .await
    }

    pub async fn update_dealer(&self, update: DealerUpdate) -> Result<Dealer, Error> {
        let result = self.dealers.update(update).await;
        self.report("Dealer Updated", result, notification::dealer_details)
            .await
    }

    /// Deletes the oldest dealer matching `filter`.
    pub async fn delete_dealer(&self, filter: &DealerFilter) -> Result<Dealer, Error> {
        let result = self.dealers.delete_first(filter).await;
        self.report("Dealer Deleted", result, notification::dealer_details)
            .await
    }

    pub async fn delete_dealers(&self, filter: &DealerFilter) -> Result<Vec<Dealer>, Error> {
        let result = self.dealers.delete_all(filter).await;
        self.report("Dealers Deleted", result, |dealers| {
            notification::dealers_details(dealers)
        })
        .await
    }

    // ------------------------------------------------------------------
    // Opportunities
    // ------------------------------------------------------------------

    pub async fn add_opportunity(&self, new: NewOpportunity) -> Result<Opportunity, Error> {
        let result = self.opportunities.create(new).await;
        self.announce(
            "New Customer Created",
            result,
            notification::opportunity_created,
        )
        .await
    }

    pub async fn search_opportunities(
        &self,
        query: &OpportunityQuery,
    ) -> Result<Vec<Opportunity>, Error> {
        let result = self.opportunities.search(query).await;
        self.report("Opportunity Search Results", result, |found| {
            notification::opportunity_listing(found)
        })
        .await
    }

    pub async fn update_opportunity(
        &self,
        update: OpportunityUpdate,
    ) -> Result<(Opportunity, OpportunityChanges), Error> {
        let result = self.opportunities.update(update).await;
        self.announce("Opportunity Updated", result, |(opportunity, changes)| {
            notification::opportunity_updated(&opportunity.opportunity_id, changes)
        })
        .await
    }

    pub async fn delete_opportunities(
        &self,
        criteria: &OpportunityCriteria,
    ) -> Result<Vec<Opportunity>, Error> {
        let result = self.opportunities.delete(criteria).await;
        self.report("Opportunities Deleted", result, |deleted| {
            notification::opportunity_listing(deleted)
        })
        .await
    }

    // ------------------------------------------------------------------
    // Vehicle catalog
    // ------------------------------------------------------------------

    pub async fn add_vehicle(&self, attributes: VehicleAttributes) -> Result<VehicleDetails, Error> {
        let result = self.vehicles.create(attributes).await;
        self.announce("New Vehicle Added", result, |vehicle| {
            notification::vehicle_changed(vehicle, "added")
        })
        .await
    }

    pub async fn vehicles(&self) -> Result<Vec<VehicleDetails>, Error> {
        let result = self.vehicles.list().await;
        self.announce("Vehicle Details", result, |vehicles| {
            notification::vehicle_listing(vehicles)
        })
        .await
    }

    pub async fn vehicle(&self, vehicle_model_id: Option<&str>) -> Result<VehicleDetails, Error> {
        let result = self.vehicles.get(vehicle_model_id).await;
        self.announce("Vehicle Details", result, notification::vehicle_detail)
            .await
    }

    pub async fn update_vehicle(
        &self,
        update: VehicleDetailsUpdate,
    ) -> Result<VehicleDetails, Error> {
        let result = self.vehicles.update(update).await;
        self.announce("Vehicle Updated", result, |vehicle| {
            notification::vehicle_changed(vehicle, "updated")
        })
        .await
    }

    pub async fn delete_vehicles(
        &self,
        criteria: &VehicleCriteria,
    ) -> Result<Vec<VehicleDetails>, Error> {
        let result = self.vehicles.delete(criteria).await;
        self.announce("Vehicles Deleted", result, |deleted| {
            notification::vehicles_deleted(deleted, criteria)
        })
        .await
    }

    // ------------------------------------------------------------------
    // Purchased vehicles
    // ------------------------------------------------------------------

    /// Records a sale and emails the customer (when an address was given) and the team.
    pub async fn purchase_vehicle(
        &self,
        request: PurchaseRequest,
    ) -> Result<CompletedPurchase, Error> {
        let purchase = match self.purchases.purchase(request).await {
            Ok(purchase) => purchase,
            Err(e) => {
                self.report_failure("Vehicle Purchase Failed", &e).await;
                return Err(e);
            }
        };

        if let Some(email) = &purchase.customer_email {
            self.notifications
                .notify_customer(
                    email,
                    "Vehicle Purchase Confirmation",
                    notification::purchase_for_customer(&purchase.receipt, &purchase.model),
                )
                .await;
        }
        self.notifications
            .notify_team(
                "New Vehicle Purchase Recorded",
                notification::purchase_for_team(
                    &purchase.receipt,
                    &purchase.model,
                    &purchase.opportunity,
                ),
            )
            .await;

        Ok(purchase)
    }

    pub async fn purchased_vehicles(
        &self,
        filter: &PurchaseFilter,
    ) -> Result<Vec<PurchasedVehicle>, Error> {
        let result = self.purchases.list(filter).await;
        self.announce("Purchased Vehicles", result, |vehicles| {
            notification::purchased_vehicles(vehicles)
        })
        .await
    }

    pub async fn update_purchased_vehicle(
        &self,
        update: PurchaseUpdate,
    ) -> Result<(PurchasedVehicle, Vec<(&'static str, String)>), Error> {
        let result = self.purchases.update(update).await;
        self.announce("Purchased Vehicle Updated", result, |(vehicle, changes)| {
            notification::purchased_vehicle_updated(&vehicle.vehicle_id, changes)
        })
        .await
    }

    /// Deletes a purchased vehicle together with its services, taxes and insurance.
    pub async fn delete_purchased_vehicle(
        &self,
        vehicle_id: Option<&str>,
    ) -> Result<PurchasedVehicle, Error> {
        let result = self.remove_purchased_vehicle(vehicle_id).await;
        let at = business_now();

        match &result {
            Ok((vehicle, services, insurance)) => {
                self.notifications
                    .notify_team(
                        "Vehicle Operation Successful",
                        notification::vehicle_operation_success(vehicle, services, insurance, &at),
                    )
                    .await;
            }
            Err(e) => {
                self.notifications
                    .notify_failure(
                        "Vehicle Operation Failed",
                        &notification::vehicle_operation_failure(
                            vehicle_id.unwrap_or("N/A"),
                            "delete",
                            &e.to_string(),
                            &at,
                        ),
                    )
                    .await;
            }
        }

        result.map(|(vehicle, _, _)| vehicle)
    }

    async fn remove_purchased_vehicle(
        &self,
        vehicle_id: Option<&str>,
    ) -> Result<(PurchasedVehicle, Vec<ServiceRecord>, Vec<Insurance>), Error> {
        let services = self.aftercare.services_for(vehicle_id).await?;
        let insurance = self.aftercare.insurance_for(vehicle_id).await?;
        let vehicle = self.purchases.delete(vehicle_id).await?;
        Ok((vehicle, services, insurance))
    }

    pub async fn next_service(&self, vehicle_id: Option<&str>) -> Result<NextService, Error> {
        let result = self.purchases.next_service(vehicle_id).await;
        self.report("Next Service", result, |next| {
            format!(
                "Vehicle ID: {}\nService Type: {}\nDue Date: {}\nKilometers Due: {}\n",
                vehicle_id.unwrap_or_default(),
                next.service_type,
                dealerdesk_core::datetime::format_due_date(&next.due_date),
                next.kilometers_due
            )
        })
        .await
    }

    // ------------------------------------------------------------------
    // Service visits, taxes and insurance
    // ------------------------------------------------------------------

    pub async fn add_service(&self, new: NewServiceRecord) -> Result<ServiceRecord, Error> {
        let result = self.aftercare.add_service(new).await;
        self.report(
            "Service Scheduled",
            result,
            notification::service_record_details,
        )
        .await
    }

    pub async fn services(&self, vehicle_id: Option<&str>) -> Result<Vec<ServiceRecord>, Error> {
        let result = self.aftercare.services_for(vehicle_id).await;
        self.report("Services Retrieved", result, |services| {
            listing(services, notification::service_record_details)
        })
        .await
    }

    pub async fn delete_service(&self, service_id: Option<&str>) -> Result<(), Error> {
        let result = self.aftercare.delete_service(service_id).await;
        self.report("Service Deleted", result, |_| {
            format!("Service ID: {}\n", service_id.unwrap_or_default())
        })
        .await
    }

    pub async fn add_tax(&self, new: NewTax) -> Result<Tax, Error> {
        let result = self.aftercare.add_tax(new).await;
        self.report("Tax Recorded", result, notification::tax_details)
            .await
    }

    pub async fn taxes(&self, vehicle_id: Option<&str>) -> Result<Vec<Tax>, Error> {
        let result = self.aftercare.taxes_for(vehicle_id).await;
        self.report("Taxes Retrieved", result, |taxes| {
            listing(taxes, notification::tax_details)
        })
        .await
    }

    pub async fn delete_tax(&self, tax_id: Option<&str>) -> Result<(), Error> {
        let result = self.aftercare.delete_tax(tax_id).await;
        self.report("Tax Deleted", result, |_| {
            format!("Tax ID: {}\n", tax_id.unwrap_or_default())
        })
        .await
    }

    pub async fn add_insurance(&self, new: NewInsurance) -> Result<Insurance, Error> {
        let result = self.aftercare.add_insurance(new).await;
        self.report("Insurance Recorded", result, notification::insurance_details)
            .await
    }

    pub async fn insurance(&self, vehicle_id: Option<&str>) -> Result<Vec<Insurance>, Error> {
        let result = self.aftercare.insurance_for(vehicle_id).await;
        self.report("Insurance Retrieved", result, |policies| {
            listing(policies, notification::insurance_details)
        })
        .await
    }

    pub async fn delete_insurance(&self, insurance_id: Option<&str>) -> Result<(), Error> {
        let result = self.aftercare.delete_insurance(insurance_id).await;
        self.report("Insurance Deleted", result, |_| {
            format!("Insurance ID: {}\n", insurance_id.unwrap_or_default())
        })
        .await
    }
}

fn listing<T>(items: &[T], render: fn(&T) -> String) -> String {
    let mut body = format!("Total Count: {}\n\n", items.len());
    for item in items {
        body.push_str(&render(item));
        body.push('\n');
    }
    body
}
