use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
};
use dealerdesk::{
    AccountUpdate, DealerDesk, DealerFilter, DealerUpdate, NewAccount, NewDealer, NewInsurance,
    NewOpportunity, NewServiceRecord, NewTax, OpportunityCriteria, OpportunityQuery,
    OpportunityUpdate, PurchaseFilter, PurchaseRequest, PurchaseUpdate, RepositoryProvider,
    VehicleAttributes, VehicleCriteria, VehicleDetailsUpdate,
};

use crate::{
    error::{ApiError, Result},
    extractors::{AppState, Body, Gated, GatedQuery, Params},
    types::*,
};

pub fn create_router<R>(desk: Arc<DealerDesk<R>>) -> Router
where
    R: RepositoryProvider,
{
    let state = AppState { desk };

    Router::new()
        .route("/health", get(health_handler::<R>))
        .route("/generate-otp", post(generate_otp_handler::<R>))
        .merge(account_routes())
        .merge(dealer_routes())
        .merge(opportunity_routes())
        .merge(vehicle_routes())
        .merge(purchase_routes())
        .merge(aftercare_routes())
        .with_state(state)
}

fn account_routes<R: RepositoryProvider>() -> Router<AppState<R>> {
    Router::new()
        .route("/add-account", post(add_account_handler::<R>))
        .route("/get-all-accounts", get(list_accounts_handler::<R>))
        .route("/get-single-account", get(get_account_handler::<R>))
        .route("/update-account", put(update_account_handler::<R>))
        .route("/delete-account", delete(delete_account_handler::<R>))
}

fn dealer_routes<R: RepositoryProvider>() -> Router<AppState<R>> {
    Router::new()
        .route("/add-dealer", post(add_dealer_handler::<R>))
        .route("/get-all-dealers", get(list_dealers_handler::<R>))
        .route("/get-particular-dealers", get(find_dealers_handler::<R>))
        .route("/update-dealer", put(update_dealer_handler::<R>))
        .route("/delete-single-dealer", delete(delete_dealer_handler::<R>))
        .route("/delete-all-dealers", delete(delete_dealers_handler::<R>))
}

fn opportunity_routes<R: RepositoryProvider>() -> Router<AppState<R>> {
    Router::new()
        .route("/new-customer", post(new_customer_handler::<R>))
        .route("/get-opportunities", get(search_opportunities_handler::<R>))
        .route("/update-opportunity", put(update_opportunity_handler::<R>))
        .route("/delete-customer", delete(delete_customer_handler::<R>))
}

fn vehicle_routes<R: RepositoryProvider>() -> Router<AppState<R>> {
    Router::new()
        .route("/add-vehicle", post(add_vehicle_handler::<R>))
        .route("/get-all-vehicles", get(list_vehicles_handler::<R>))
        .route("/get-vehicle", get(get_vehicle_handler::<R>))
        .route("/update-vehicle", put(update_vehicle_handler::<R>))
        .route("/delete-vehicles", delete(delete_vehicles_handler::<R>))
}

fn purchase_routes<R: RepositoryProvider>() -> Router<AppState<R>> {
    Router::new()
        .route("/purchase-vehicle", post(purchase_vehicle_handler::<R>))
        .route("/get-purchased-vehicles", get(list_purchased_handler::<R>))
        .route("/update-purchased-vehicle", put(update_purchased_handler::<R>))
        .route("/delete-purchased-vehicle", delete(delete_purchased_handler::<R>))
        .route("/next-service", get(next_service_handler::<R>))
}

fn aftercare_routes<R: RepositoryProvider>() -> Router<AppState<R>> {
    Router::new()
        .route("/add-service", post(add_service_handler::<R>))
        .route("/get-services", get(list_services_handler::<R>))
        .route("/delete-service", delete(delete_service_handler::<R>))
        .route("/add-tax", post(add_tax_handler::<R>))
        .route("/get-taxes", get(list_taxes_handler::<R>))
        .route("/delete-tax", delete(delete_tax_handler::<R>))
        .route("/add-insurance", post(add_insurance_handler::<R>))
        .route("/get-insurance", get(list_insurance_handler::<R>))
        .route("/delete-insurance", delete(delete_insurance_handler::<R>))
}

fn record<T>(message: &str, data: T) -> Json<RecordResponse<T>> {
    Json(RecordResponse {
        message: message.to_string(),
        data,
    })
}

fn created<T>(message: &str, data: T) -> (StatusCode, Json<RecordResponse<T>>) {
    (StatusCode::CREATED, record(message, data))
}

fn message(message: &str) -> Json<MessageResponse> {
    Json(MessageResponse {
        message: message.to_string(),
    })
}

async fn health_handler<R: RepositoryProvider>(
    State(state): State<AppState<R>>,
) -> Result<impl IntoResponse> {
    state.desk.health_check().await?;

    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }))
}

async fn generate_otp_handler<R: RepositoryProvider>(
    State(state): State<AppState<R>>,
    Body(request): Body<GenerateOtpRequest>,
) -> Result<impl IntoResponse> {
    let email = request
        .email
        .filter(|e| !e.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("Email is required.".to_string()))?;

    let record = state.desk.generate_otp(&email).await?;

    Ok(Json(OtpResponse {
        message: "OTP sent successfully".to_string(),
        email: record.email,
        otp: record.code,
    }))
}

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

async fn add_account_handler<R: RepositoryProvider>(
    State(state): State<AppState<R>>,
    Gated(new): Gated<NewAccount>,
) -> Result<impl IntoResponse> {
    let account = state.desk.add_account(new).await?;
    Ok(created("Account created successfully", account))
}

async fn list_accounts_handler<R: RepositoryProvider>(
    State(state): State<AppState<R>>,
) -> Result<impl IntoResponse> {
    let accounts = state.desk.accounts().await?;
    Ok(Json(ListResponse::new("Accounts retrieved successfully", accounts)))
}

async fn get_account_handler<R: RepositoryProvider>(
    State(state): State<AppState<R>>,
    Params(params): Params<AccountIdParams>,
) -> Result<impl IntoResponse> {
    let account = state.desk.account(params.account_id.as_deref()).await?;
    Ok(record("Account retrieved successfully", account))
}

async fn update_account_handler<R: RepositoryProvider>(
    State(state): State<AppState<R>>,
    Gated(update): Gated<AccountUpdate>,
) -> Result<impl IntoResponse> {
    let account = state.desk.update_account(update).await?;
    Ok(record("Account updated successfully", account))
}

async fn delete_account_handler<R: RepositoryProvider>(
    State(state): State<AppState<R>>,
    GatedQuery(params): GatedQuery<AccountIdParams>,
) -> Result<impl IntoResponse> {
    let account = state
        .desk
        .delete_account(params.account_id.as_deref())
        .await?;
    Ok(record("Account deleted successfully", account))
}

// ---------------------------------------------------------------------------
// Dealers
// ---------------------------------------------------------------------------

async fn add_dealer_handler<R: RepositoryProvider>(
    State(state): State<AppState<R>>,
    Gated(new): Gated<NewDealer>,
) -> Result<impl IntoResponse> {
    let dealer = state.desk.add_dealer(new).await?;
    Ok(created("Dealer created successfully", dealer))
}

async fn list_dealers_handler<R: RepositoryProvider>(
    State(state): State<AppState<R>>,
) -> Result<impl IntoResponse> {
    let dealers = state.desk.dealers().await?;
    Ok(Json(ListResponse::new("Dealers retrieved successfully", dealers)))
}

async fn find_dealers_handler<R: RepositoryProvider>(
    State(state): State<AppState<R>>,
    Params(filter): Params<DealerFilter>,
) -> Result<impl IntoResponse> {
    let dealers = state.desk.find_dealers(&filter).await?;
    Ok(Json(ListResponse::new("Dealers retrieved successfully", dealers)))
}

async fn update_dealer_handler<R: RepositoryProvider>(
    State(state): State<AppState<R>>,
    Gated(update): Gated<DealerUpdate>,
) -> Result<impl IntoResponse> {
    let dealer = state.desk.update_dealer(update).await?;
    Ok(record("Dealer updated successfully", dealer))
}

async fn delete_dealer_handler<R: RepositoryProvider>(
    State(state): State<AppState<R>>,
    GatedQuery(filter): GatedQuery<DealerFilter>,
) -> Result<impl IntoResponse> {
    let dealer = state.desk.delete_dealer(&filter).await?;
    Ok(record("Dealer deleted successfully", dealer))
}

async fn delete_dealers_handler<R: RepositoryProvider>(
    State(state): State<AppState<R>>,
    GatedQuery(filter): GatedQuery<DealerFilter>,
) -> Result<impl IntoResponse> {
    let dealers = state.desk.delete_dealers(&filter).await?;
    Ok(Json(ListResponse::new("Dealers deleted successfully", dealers)))
}

// ---------------------------------------------------------------------------
// Opportunities
// ---------------------------------------------------------------------------

async fn new_customer_handler<R: RepositoryProvider>(
    State(state): State<AppState<R>>,
    Gated(new): Gated<NewOpportunity>,
) -> Result<impl IntoResponse> {
    let opportunity = state.desk.add_opportunity(new).await?;
    Ok(created("Opportunity created successfully", opportunity))
}

async fn search_opportunities_handler<R: RepositoryProvider>(
    State(state): State<AppState<R>>,
    Params(query): Params<OpportunityQuery>,
) -> Result<impl IntoResponse> {
    let opportunities = state.desk.search_opportunities(&query).await?;
    Ok(Json(ListResponse::new(
        "Opportunities retrieved successfully",
        opportunities,
    )))
}

async fn update_opportunity_handler<R: RepositoryProvider>(
    State(state): State<AppState<R>>,
    Gated(update): Gated<OpportunityUpdate>,
) -> Result<impl IntoResponse> {
    let (opportunity, changes) = state.desk.update_opportunity(update).await?;
    Ok(Json(UpdateResponse {
        message: "Opportunity updated successfully".to_string(),
        data: opportunity,
        changes,
    }))
}

async fn delete_customer_handler<R: RepositoryProvider>(
    State(state): State<AppState<R>>,
    GatedQuery(criteria): GatedQuery<OpportunityCriteria>,
) -> Result<impl IntoResponse> {
    let deleted = state.desk.delete_opportunities(&criteria).await?;
    Ok(Json(ListResponse::new(
        "Opportunities deleted successfully",
        deleted,
    )))
}

// ---------------------------------------------------------------------------
// Vehicle catalog
// ---------------------------------------------------------------------------

async fn add_vehicle_handler<R: RepositoryProvider>(
    State(state): State<AppState<R>>,
    Gated(attributes): Gated<VehicleAttributes>,
) -> Result<impl IntoResponse> {
    let vehicle = state.desk.add_vehicle(attributes).await?;
    Ok(created("Vehicle added successfully", vehicle))
}

async fn list_vehicles_handler<R: RepositoryProvider>(
    State(state): State<AppState<R>>,
) -> Result<impl IntoResponse> {
    let vehicles = state.desk.vehicles().await?;
    Ok(Json(ListResponse::new("Vehicles retrieved successfully", vehicles)))
}

async fn get_vehicle_handler<R: RepositoryProvider>(
    State(state): State<AppState<R>>,
    Params(params): Params<VehicleModelParams>,
) -> Result<impl IntoResponse> {
    let vehicle = state
        .desk
        .vehicle(params.vehicle_model_id.as_deref())
        .await?;
    Ok(record("Vehicle retrieved successfully", vehicle))
}

async fn update_vehicle_handler<R: RepositoryProvider>(
    State(state): State<AppState<R>>,
    Gated(update): Gated<VehicleDetailsUpdate>,
) -> Result<impl IntoResponse> {
    let vehicle = state.desk.update_vehicle(update).await?;
    Ok(record("Vehicle updated successfully", vehicle))
}

async fn delete_vehicles_handler<R: RepositoryProvider>(
    State(state): State<AppState<R>>,
    GatedQuery(criteria): GatedQuery<VehicleCriteria>,
) -> Result<impl IntoResponse> {
    let deleted = state.desk.delete_vehicles(&criteria).await?;
    Ok(Json(ListResponse::new("Vehicles deleted successfully", deleted)))
}

// ---------------------------------------------------------------------------
// Purchased vehicles
// ---------------------------------------------------------------------------

async fn purchase_vehicle_handler<R: RepositoryProvider>(
    State(state): State<AppState<R>>,
    Gated(request): Gated<PurchaseRequest>,
) -> Result<impl IntoResponse> {
    let purchase = state.desk.purchase_vehicle(request).await?;
    Ok(created("Vehicle purchased successfully", purchase.receipt))
}

async fn list_purchased_handler<R: RepositoryProvider>(
    State(state): State<AppState<R>>,
    Params(filter): Params<PurchaseFilter>,
) -> Result<impl IntoResponse> {
    let vehicles = state.desk.purchased_vehicles(&filter).await?;
    Ok(Json(ListResponse::new(
        "Purchased vehicles retrieved successfully",
        vehicles,
    )))
}

async fn update_purchased_handler<R: RepositoryProvider>(
    State(state): State<AppState<R>>,
    Gated(update): Gated<PurchaseUpdate>,
) -> Result<impl IntoResponse> {
    let (vehicle, changes) = state.desk.update_purchased_vehicle(update).await?;
    let changes: serde_json::Map<String, serde_json::Value> = changes
        .into_iter()
        .map(|(field, value)| (field.to_string(), value.into()))
        .collect();

    Ok(Json(UpdateResponse {
        message: "Purchased vehicle updated successfully".to_string(),
        data: vehicle,
        changes,
    }))
}

async fn delete_purchased_handler<R: RepositoryProvider>(
    State(state): State<AppState<R>>,
    GatedQuery(params): GatedQuery<VehicleIdParams>,
) -> Result<impl IntoResponse> {
    let vehicle = state
        .desk
        .delete_purchased_vehicle(params.vehicle_id.as_deref())
        .await?;
    Ok(record("Purchased vehicle deleted successfully", vehicle))
}

async fn next_service_handler<R: RepositoryProvider>(
    State(state): State<AppState<R>>,
    Params(params): Params<VehicleIdParams>,
) -> Result<impl IntoResponse> {
    let next = state.desk.next_service(params.vehicle_id.as_deref()).await?;
    Ok(record("Next service retrieved successfully", next))
}

// ---------------------------------------------------------------------------
// Services, taxes and insurance
// ---------------------------------------------------------------------------

async fn add_service_handler<R: RepositoryProvider>(
    State(state): State<AppState<R>>,
    Gated(new): Gated<NewServiceRecord>,
) -> Result<impl IntoResponse> {
    let service = state.desk.add_service(new).await?;
    Ok(created("Service added successfully", service))
}

async fn list_services_handler<R: RepositoryProvider>(
    State(state): State<AppState<R>>,
    Params(params): Params<VehicleIdParams>,
) -> Result<impl IntoResponse> {
    let services = state.desk.services(params.vehicle_id.as_deref()).await?;
    Ok(Json(ListResponse::new("Services retrieved successfully", services)))
}

async fn delete_service_handler<R: RepositoryProvider>(
    State(state): State<AppState<R>>,
    GatedQuery(params): GatedQuery<ServiceIdParams>,
) -> Result<impl IntoResponse> {
    state
        .desk
        .delete_service(params.service_id.as_deref())
        .await?;
    Ok(message("Service deleted successfully"))
}

async fn add_tax_handler<R: RepositoryProvider>(
    State(state): State<AppState<R>>,
    Gated(new): Gated<NewTax>,
) -> Result<impl IntoResponse> {
    let tax = state.desk.add_tax(new).await?;
    Ok(created("Tax added successfully", tax))
}

async fn list_taxes_handler<R: RepositoryProvider>(
    State(state): State<AppState<R>>,
    Params(params): Params<VehicleIdParams>,
) -> Result<impl IntoResponse> {
    let taxes = state.desk.taxes(params.vehicle_id.as_deref()).await?;
    Ok(Json(ListResponse::new("Taxes retrieved successfully", taxes)))
}

async fn delete_tax_handler<R: RepositoryProvider>(
    State(state): State<AppState<R>>,
    GatedQuery(params): GatedQuery<TaxIdParams>,
) -> Result<impl IntoResponse> {
    state.desk.delete_tax(params.tax_id.as_deref()).await?;
    Ok(message("Tax deleted successfully"))
}

async fn add_insurance_handler<R: RepositoryProvider>(
    State(state): State<AppState<R>>,
    Gated(new): Gated<NewInsurance>,
) -> Result<impl IntoResponse> {
    let insurance = state.desk.add_insurance(new).await?;
    Ok(created("Insurance added successfully", insurance))
}

async fn list_insurance_handler<R: RepositoryProvider>(
    State(state): State<AppState<R>>,
    Params(params): Params<VehicleIdParams>,
) -> Result<impl IntoResponse> {
    let policies = state.desk.insurance(params.vehicle_id.as_deref()).await?;
    Ok(Json(ListResponse::new(
        "Insurance retrieved successfully",
        policies,
    )))
}

async fn delete_insurance_handler<R: RepositoryProvider>(
    State(state): State<AppState<R>>,
    GatedQuery(params): GatedQuery<InsuranceIdParams>,
) -> Result<impl IntoResponse> {
    state
        .desk
        .delete_insurance(params.insurance_id.as_deref())
        .await?;
    Ok(message("Insurance deleted successfully"))
}
