//! In-memory repositories for service tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{
    Error,
    account::Account,
    dealer::{Dealer, DealerFilter},
    error::{RecordError, StorageError},
    opportunity::{Opportunity, OpportunityMatch, OpportunitySearch},
    otp::OtpRecord,
    purchase::{Insurance, PurchaseFilter, PurchaseRecord, PurchasedVehicle, ServiceRecord, Tax},
    repositories::*,
    vehicle::{VehicleCriteria, VehicleDetails},
};

#[derive(Default)]
pub struct State {
    pub accounts: Vec<Account>,
    pub dealers: Vec<Dealer>,
    pub opportunities: Vec<Opportunity>,
    pub vehicles: Vec<VehicleDetails>,
    pub purchases: Vec<PurchasedVehicle>,
    pub services: Vec<ServiceRecord>,
    pub taxes: Vec<Tax>,
    pub insurance: Vec<Insurance>,
    pub otps: HashMap<String, OtpRecord>,
}

type Shared = Arc<Mutex<State>>;

fn lock(state: &Shared) -> Result<MutexGuard<'_, State>, Error> {
    state
        .lock()
        .map_err(|_| StorageError::Database("mock state poisoned".to_string()).into())
}

pub struct MockAccounts(Shared);
pub struct MockDealers(Shared);
pub struct MockOpportunities(Shared);
pub struct MockVehicles(Shared);
pub struct MockPurchases(Shared);
pub struct MockServices(Shared);
pub struct MockTaxes(Shared);
pub struct MockInsurance(Shared);
pub struct MockOtps(Shared);

pub struct MockRepositories {
    pub state: Shared,
    account: MockAccounts,
    dealer: MockDealers,
    opportunity: MockOpportunities,
    vehicle: MockVehicles,
    purchase: MockPurchases,
    service_record: MockServices,
    tax: MockTaxes,
    insurance: MockInsurance,
    otp: MockOtps,
}

impl Default for MockRepositories {
    fn default() -> Self {
        let state: Shared = Arc::default();
        Self {
            account: MockAccounts(state.clone()),
            dealer: MockDealers(state.clone()),
            opportunity: MockOpportunities(state.clone()),
            vehicle: MockVehicles(state.clone()),
            purchase: MockPurchases(state.clone()),
            service_record: MockServices(state.clone()),
            tax: MockTaxes(state.clone()),
            insurance: MockInsurance(state.clone()),
            otp: MockOtps(state.clone()),
            state,
        }
    }
}

#[async_trait]
impl AccountRepository for MockAccounts {
    async fn create(&self, account: &Account) -> Result<Account, Error> {
        let mut state = lock(&self.0)?;
        if state.accounts.iter().any(|a| a.account_id == account.account_id) {
            return Err(RecordError::AlreadyExists {
                entity: "Account",
                key: account.account_id.clone(),
            }
            .into());
        }
        state.accounts.push(account.clone());
        Ok(account.clone())
    }

    async fn find_by_id(&self, account_id: &str) -> Result<Option<Account>, Error> {
        let state = lock(&self.0)?;
        Ok(state.accounts.iter().find(|a| a.account_id == account_id).cloned())
    }

    async fn find_by_name(&self, account_name: &str) -> Result<Option<Account>, Error> {
        let state = lock(&self.0)?;
        Ok(state
            .accounts
            .iter()
            .find(|a| a.account_name == account_name)
            .cloned())
    }

    async fn list(&self) -> Result<Vec<Account>, Error> {
        Ok(lock(&self.0)?.accounts.clone())
    }

    async fn rename(&self, account_id: &str, account_name: &str) -> Result<Option<Account>, Error> {
        let mut state = lock(&self.0)?;
        Ok(state
            .accounts
            .iter_mut()
            .find(|a| a.account_id == account_id)
            .map(|a| {
                a.account_name = account_name.to_string();
                a.clone()
            }))
    }

    async fn delete(&self, account_id: &str) -> Result<bool, Error> {
        let mut state = lock(&self.0)?;
        if state.opportunities.iter().any(|o| o.account_id == account_id) {
            return Err(StorageError::Constraint("account is referenced".to_string()).into());
        }
        let before = state.accounts.len();
        state.accounts.retain(|a| a.account_id != account_id);
        Ok(state.accounts.len() < before)
    }
}

#[async_trait]
impl DealerRepository for MockDealers {
    async fn create(&self, dealer: &Dealer) -> Result<Dealer, Error> {
        lock(&self.0)?.dealers.push(dealer.clone());
        Ok(dealer.clone())
    }

    async fn find_by_id(&self, dealer_id: &str) -> Result<Option<Dealer>, Error> {
        let state = lock(&self.0)?;
        Ok(state.dealers.iter().find(|d| d.dealer_id == dealer_id).cloned())
    }

    async fn list(&self) -> Result<Vec<Dealer>, Error> {
        Ok(lock(&self.0)?.dealers.clone())
    }

    async fn find(&self, filter: &DealerFilter) -> Result<Vec<Dealer>, Error> {
        let state = lock(&self.0)?;
        Ok(state
            .dealers
            .iter()
            .filter(|d| filter.matches(d))
            .cloned()
            .collect())
    }

    async fn update(&self, dealer: &Dealer) -> Result<Dealer, Error> {
        let mut state = lock(&self.0)?;
        let stored = state
            .dealers
            .iter_mut()
            .find(|d| d.dealer_id == dealer.dealer_id)
            .ok_or_else(|| RecordError::not_found("Dealer", dealer.dealer_id.clone()))?;
        *stored = dealer.clone();
        Ok(dealer.clone())
    }

    async fn delete_many(&self, dealer_ids: &[String]) -> Result<u64, Error> {
        let mut state = lock(&self.0)?;
        let before = state.dealers.len();
        state.dealers.retain(|d| !dealer_ids.contains(&d.dealer_id));
        Ok((before - state.dealers.len()) as u64)
    }
}

fn matches_search(o: &Opportunity, search: &OpportunitySearch) -> bool {
    search.opportunity_id.as_ref().is_none_or(|id| *id == o.opportunity_id)
        && search
            .name_contains
            .as_ref()
            .is_none_or(|n| o.opportunity_name.contains(n.as_str()))
        && search
            .account_contains
            .as_ref()
            .is_none_or(|n| o.account_name.contains(n.as_str()))
        && search.stage.as_ref().is_none_or(|s| *s == o.stage)
        && search
            .probability_min
            .is_none_or(|min| o.probability.is_some_and(|p| p >= min))
        && search
            .probability_max
            .is_none_or(|max| o.probability.is_some_and(|p| p <= max))
        && search.created_from.is_none_or(|from| o.created_date >= from)
        && search.created_to.is_none_or(|to| o.created_date <= to)
}

fn matches_criteria(o: &Opportunity, criteria: &OpportunityMatch) -> bool {
    criteria.opportunity_id.as_ref().is_none_or(|v| *v == o.opportunity_id)
        && criteria.account_name.as_ref().is_none_or(|v| *v == o.account_name)
        && criteria.dealer_id.as_ref().is_none_or(|v| *v == o.dealer_id)
        && criteria.dealer_code.as_ref().is_none_or(|v| *v == o.dealer_code)
        && criteria
            .opportunity_name
            .as_ref()
            .is_none_or(|v| *v == o.opportunity_name)
        && criteria.stage.as_ref().is_none_or(|v| *v == o.stage)
        && criteria.probability.is_none_or(|v| o.probability == Some(v))
        && criteria.close_date.is_none_or(|v| o.close_date == Some(v))
}

#[async_trait]
impl OpportunityRepository for MockOpportunities {
    async fn create(&self, opportunity: &Opportunity) -> Result<Opportunity, Error> {
        lock(&self.0)?.opportunities.push(opportunity.clone());
        Ok(opportunity.clone())
    }

    async fn find_by_id(&self, opportunity_id: &str) -> Result<Option<Opportunity>, Error> {
        let state = lock(&self.0)?;
        Ok(state
            .opportunities
            .iter()
            .find(|o| o.opportunity_id == opportunity_id)
            .cloned())
    }

    async fn search(&self, search: &OpportunitySearch) -> Result<Vec<Opportunity>, Error> {
        let state = lock(&self.0)?;
        Ok(state
            .opportunities
            .iter()
            .filter(|o| matches_search(o, search))
            .cloned()
            .collect())
    }

    async fn update(&self, opportunity: &Opportunity) -> Result<Opportunity, Error> {
        let mut state = lock(&self.0)?;
        let stored = state
            .opportunities
            .iter_mut()
            .find(|o| o.opportunity_id == opportunity.opportunity_id)
            .ok_or_else(|| RecordError::not_found("Opportunity", opportunity.opportunity_id.clone()))?;
        *stored = opportunity.clone();
        Ok(opportunity.clone())
    }

    async fn delete_matching(
        &self,
        criteria: &OpportunityMatch,
    ) -> Result<Vec<Opportunity>, Error> {
        let mut state = lock(&self.0)?;
        let (deleted, kept): (Vec<_>, Vec<_>) = state
            .opportunities
            .drain(..)
            .partition(|o| matches_criteria(o, criteria));
        state.opportunities = kept;
        Ok(deleted)
    }
}

fn matches_vehicle(v: &VehicleDetails, criteria: &VehicleCriteria) -> bool {
    criteria
        .vehicle_model_id
        .as_ref()
        .is_none_or(|id| *id == v.vehicle_model_id)
        && criteria.vehicle_model.as_ref().is_none_or(|m| *m == v.vehicle_model)
        && criteria.vehicle_year.is_none_or(|y| y == v.vehicle_year)
        && criteria
            .fuel_type
            .as_ref()
            .is_none_or(|f| v.fuel_type.as_ref() == Some(f))
        && criteria
            .vehicle_type
            .as_ref()
            .is_none_or(|t| v.vehicle_type.as_ref() == Some(t))
}

#[async_trait]
impl VehicleRepository for MockVehicles {
    async fn create(&self, vehicle: &VehicleDetails) -> Result<VehicleDetails, Error> {
        lock(&self.0)?.vehicles.push(vehicle.clone());
        Ok(vehicle.clone())
    }

    async fn find_by_id(&self, vehicle_model_id: &str) -> Result<Option<VehicleDetails>, Error> {
        let state = lock(&self.0)?;
        Ok(state
            .vehicles
            .iter()
            .find(|v| v.vehicle_model_id == vehicle_model_id)
            .cloned())
    }

    async fn list(&self) -> Result<Vec<VehicleDetails>, Error> {
        Ok(lock(&self.0)?.vehicles.clone())
    }

    async fn update(&self, vehicle: &VehicleDetails) -> Result<VehicleDetails, Error> {
        let mut state = lock(&self.0)?;
        let stored = state
            .vehicles
            .iter_mut()
            .find(|v| v.vehicle_model_id == vehicle.vehicle_model_id)
            .ok_or_else(|| RecordError::not_found("Vehicle", vehicle.vehicle_model_id.clone()))?;
        *stored = vehicle.clone();
        Ok(vehicle.clone())
    }

    async fn delete_matching(
        &self,
        criteria: &VehicleCriteria,
    ) -> Result<Vec<VehicleDetails>, Error> {
        let mut state = lock(&self.0)?;
        let (deleted, kept): (Vec<_>, Vec<_>) = state
            .vehicles
            .drain(..)
            .partition(|v| matches_vehicle(v, criteria));
        state.vehicles = kept;
        Ok(deleted)
    }
}

#[async_trait]
impl PurchaseRepository for MockPurchases {
    async fn record(&self, purchase: &PurchaseRecord) -> Result<(), Error> {
        let mut state = lock(&self.0)?;
        state.purchases.push(purchase.vehicle.clone());
        state.taxes.push(purchase.tax.clone());
        if let Some(insurance) = &purchase.insurance {
            state.insurance.push(insurance.clone());
        }
        state.services.push(purchase.free_service.clone());
        Ok(())
    }

    async fn find_by_id(&self, vehicle_id: &str) -> Result<Option<PurchasedVehicle>, Error> {
        let state = lock(&self.0)?;
        Ok(state
            .purchases
            .iter()
            .find(|p| p.vehicle_id == vehicle_id)
            .cloned())
    }

    async fn find(&self, filter: &PurchaseFilter) -> Result<Vec<PurchasedVehicle>, Error> {
        let state = lock(&self.0)?;
        Ok(state
            .purchases
            .iter()
            .filter(|p| {
                filter.vehicle_id.as_ref().is_none_or(|v| *v == p.vehicle_id)
                    && filter
                        .opportunity_id
                        .as_ref()
                        .is_none_or(|o| *o == p.opportunity_id)
            })
            .cloned()
            .collect())
    }

    async fn update(&self, vehicle: &PurchasedVehicle) -> Result<PurchasedVehicle, Error> {
        let mut state = lock(&self.0)?;
        let stored = state
            .purchases
            .iter_mut()
            .find(|p| p.vehicle_id == vehicle.vehicle_id)
            .ok_or_else(|| RecordError::not_found("Purchased vehicle", vehicle.vehicle_id.clone()))?;
        *stored = vehicle.clone();
        Ok(vehicle.clone())
    }

    async fn delete(&self, vehicle_id: &str) -> Result<bool, Error> {
        let mut state = lock(&self.0)?;
        let before = state.purchases.len();
        state.purchases.retain(|p| p.vehicle_id != vehicle_id);
        state.services.retain(|s| s.vehicle_id != vehicle_id);
        state.taxes.retain(|t| t.vehicle_id != vehicle_id);
        state.insurance.retain(|i| i.vehicle_id != vehicle_id);
        Ok(state.purchases.len() < before)
    }
}

#[async_trait]
impl ServiceRecordRepository for MockServices {
    async fn create(&self, service: &ServiceRecord) -> Result<ServiceRecord, Error> {
        let mut state = lock(&self.0)?;
        if service.is_free {
            let vehicle = state
                .purchases
                .iter_mut()
                .find(|p| p.vehicle_id == service.vehicle_id)
                .ok_or_else(|| RecordError::not_found("Purchased vehicle", service.vehicle_id.clone()))?;
            if vehicle.free_services_left <= 0 {
                return Err(RecordError::NoFreeServicesLeft(service.vehicle_id.clone()).into());
            }
            vehicle.free_services_left -= 1;
        }
        state.services.push(service.clone());
        Ok(service.clone())
    }

    async fn list_for_vehicle(&self, vehicle_id: &str) -> Result<Vec<ServiceRecord>, Error> {
        let state = lock(&self.0)?;
        Ok(state
            .services
            .iter()
            .filter(|s| s.vehicle_id == vehicle_id)
            .cloned()
            .collect())
    }

    async fn delete(&self, service_id: &str) -> Result<bool, Error> {
        let mut state = lock(&self.0)?;
        let before = state.services.len();
        state.services.retain(|s| s.service_id != service_id);
        Ok(state.services.len() < before)
    }
}

#[async_trait]
impl TaxRepository for MockTaxes {
    async fn create(&self, tax: &Tax) -> Result<Tax, Error> {
        lock(&self.0)?.taxes.push(tax.clone());
        Ok(tax.clone())
    }

    async fn list_for_vehicle(&self, vehicle_id: &str) -> Result<Vec<Tax>, Error> {
        let state = lock(&self.0)?;
        Ok(state
            .taxes
            .iter()
            .filter(|t| t.vehicle_id == vehicle_id)
            .cloned()
            .collect())
    }

    async fn delete(&self, tax_id: &str) -> Result<bool, Error> {
        let mut state = lock(&self.0)?;
        let before = state.taxes.len();
        state.taxes.retain(|t| t.tax_id != tax_id);
        Ok(state.taxes.len() < before)
    }
}

#[async_trait]
impl InsuranceRepository for MockInsurance {
    async fn create(&self, insurance: &Insurance) -> Result<Insurance, Error> {
        lock(&self.0)?.insurance.push(insurance.clone());
        Ok(insurance.clone())
    }

    async fn list_for_vehicle(&self, vehicle_id: &str) -> Result<Vec<Insurance>, Error> {
        let state = lock(&self.0)?;
        Ok(state
            .insurance
            .iter()
            .filter(|i| i.vehicle_id == vehicle_id)
            .cloned()
            .collect())
    }

    async fn delete(&self, insurance_id: &str) -> Result<bool, Error> {
        let mut state = lock(&self.0)?;
        let before = state.insurance.len();
        state.insurance.retain(|i| i.insurance_id != insurance_id);
        Ok(state.insurance.len() < before)
    }
}

#[async_trait]
impl OtpRepository for MockOtps {
    async fn upsert(&self, record: &OtpRecord) -> Result<(), Error> {
        lock(&self.0)?
            .otps
            .insert(record.email.clone(), record.clone());
        Ok(())
    }

    async fn find(&self, email: &str) -> Result<Option<OtpRecord>, Error> {
        Ok(lock(&self.0)?.otps.get(email).cloned())
    }

    async fn consume(&self, email: &str, code: u32) -> Result<bool, Error> {
        let mut state = lock(&self.0)?;
        if state.otps.get(email).is_some_and(|r| r.code == code) {
            state.otps.remove(email);
            return Ok(true);
        }
        Ok(false)
    }

    async fn delete(&self, email: &str) -> Result<(), Error> {
        lock(&self.0)?.otps.remove(email);
        Ok(())
    }

    async fn cleanup_expired(&self, before: DateTime<Utc>) -> Result<u64, Error> {
        let mut state = lock(&self.0)?;
        let count = state.otps.len();
        state.otps.retain(|_, r| r.issued_at >= before);
        Ok((count - state.otps.len()) as u64)
    }
}

impl AccountRepositoryProvider for MockRepositories {
    type AccountRepo = MockAccounts;
    fn account(&self) -> &Self::AccountRepo {
        &self.account
    }
}

impl DealerRepositoryProvider for MockRepositories {
    type DealerRepo = MockDealers;
    fn dealer(&self) -> &Self::DealerRepo {
        &self.dealer
    }
}

impl OpportunityRepositoryProvider for MockRepositories {
    type OpportunityRepo = MockOpportunities;
    fn opportunity(&self) -> &Self::OpportunityRepo {
        &self.opportunity
    }
}

impl VehicleRepositoryProvider for MockRepositories {
    type VehicleRepo = MockVehicles;
    fn vehicle(&self) -> &Self::VehicleRepo {
        &self.vehicle
    }
}

impl PurchaseRepositoryProvider for MockRepositories {
    type PurchaseRepo = MockPurchases;
    fn purchase(&self) -> &Self::PurchaseRepo {
        &self.purchase
    }
}

impl ServiceRecordRepositoryProvider for MockRepositories {
    type ServiceRecordRepo = MockServices;
    fn service_record(&self) -> &Self::ServiceRecordRepo {
        &self.service_record
    }
}

impl TaxRepositoryProvider for MockRepositories {
    type TaxRepo = MockTaxes;
    fn tax(&self) -> &Self::TaxRepo {
        &self.tax
    }
}

impl InsuranceRepositoryProvider for MockRepositories {
    type InsuranceRepo = MockInsurance;
    fn insurance(&self) -> &Self::InsuranceRepo {
        &self.insurance
    }
}

impl OtpRepositoryProvider for MockRepositories {
    type OtpRepo = MockOtps;
    fn otp(&self) -> &Self::OtpRepo {
        &self.otp
    }
}
