//! Plain-text bodies for the emails sent after each operation.
//!
//! These are pure functions so the wording can be tested without a mailer.
//! [`crate::services::NotificationService`] decides who receives them.

use std::fmt::Display;

use chrono::NaiveDateTime;

use crate::{
    account::Account,
    datetime::{format_display, format_due_date},
    dealer::Dealer,
    opportunity::{Opportunity, OpportunityChanges},
    purchase::{Insurance, NextService, PurchaseReceipt, PurchasedVehicle, ServiceRecord, Tax},
    vehicle::{VehicleCriteria, VehicleDetails},
};

pub const SEPARATOR: &str = "********************************************";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure,
    Warning,
}

impl Outcome {
    fn heading(self) -> &'static str {
        match self {
            Outcome::Success => "Successful!",
            Outcome::Failure => "Failure!",
            Outcome::Warning => "Warning!",
        }
    }
}

/// Body shared by every generic outcome notice.
pub fn outcome_body(outcome: Outcome, details: &str) -> String {
    format!("{}\n\nDetails:\n{SEPARATOR}\n{details}", outcome.heading())
}

pub fn otp_body(code: u32, ttl_secs: i64) -> String {
    format!(
        "Your OTP code is {code}\n\n\
         It is valid for {} minutes and can be used once.\n\
         If you did not request this code, you can ignore this email.",
        ttl_secs / 60
    )
}

fn or_na<T: Display>(value: &Option<T>) -> String {
    value
        .as_ref()
        .map(ToString::to_string)
        .unwrap_or_else(|| "N/A".to_string())
}

pub fn account_details(account: &Account) -> String {
    format!(
        "Account ID: {}\nAccount Name: {}\n",
        account.account_id, account.account_name
    )
}

pub fn accounts_details(accounts: &[Account]) -> String {
    let mut body = format!("Total Accounts: {}\n\n", accounts.len());
    for account in accounts {
        body.push_str(&account_details(account));
        body.push('\n');
    }
    body
}

pub fn dealer_details(dealer: &Dealer) -> String {
    format!(
        "Dealer ID: {}\nDealer Code: {}\nOpportunity Owner: {}\n",
        dealer.dealer_id, dealer.dealer_code, dealer.opportunity_owner
    )
}

pub fn dealers_details(dealers: &[Dealer]) -> String {
    let mut body = format!("Total Dealers: {}\n\n", dealers.len());
    for dealer in dealers {
        body.push_str(&dealer_details(dealer));
        body.push('\n');
    }
    body
}

fn currency_lines(opportunity: &Opportunity) -> String {
    opportunity
        .currency_conversions
        .entries()
        .iter()
        .filter_map(|(code, value)| value.map(|v| format!("   - {code}: {v:.2}\n")))
        .collect()
}

fn opportunity_block(opportunity: &Opportunity) -> String {
    let close_date = opportunity.close_date.as_ref().map(format_display);
    format!(
        "Opportunity ID: {}\n\
         Name: {}\n\
         Account: {}\n\
         Amount: {}\n\
         Amount in Words: {}\n\
         Close Date: {}\n\
         Created Date: {}\n\
         Dealer ID: {}\n\
         Dealer Code: {}\n\
         Stage: {}\n\
         Probability: {}%\n\
         Next Step: {}\n\
         Description: {}\n\
         Currency Conversions:\n{}\
         Vehicle Model: {}\n\
         Vehicle Year: {}\n\
         Vehicle Color: {}\n\
         Vehicle Model ID: {}\n",
        opportunity.opportunity_id,
        opportunity.opportunity_name,
        opportunity.account_name,
        or_na(&opportunity.amount),
        or_na(&opportunity.amount_in_words),
        or_na(&close_date),
        format_display(&opportunity.created_date),
        opportunity.dealer_id,
        opportunity.dealer_code,
        opportunity.stage,
        or_na(&opportunity.probability),
        or_na(&opportunity.next_step),
        or_na(&opportunity.description),
        currency_lines(opportunity),
        or_na(&opportunity.vehicle_model),
        or_na(&opportunity.vehicle_year),
        or_na(&opportunity.vehicle_color),
        or_na(&opportunity.vehicle_model_id),
    )
}

/// Listing sent after a search or a bulk delete.
pub fn opportunity_listing(opportunities: &[Opportunity]) -> String {
    let mut body = format!(
        "Opportunity Details:\n{SEPARATOR}\nTotal Count of Opportunities: {}\n\n",
        opportunities.len()
    );
    for opportunity in opportunities {
        body.push_str(&opportunity_block(opportunity));
        body.push_str(SEPARATOR);
        body.push_str("\n\n");
    }
    body
}

pub fn opportunity_created(opportunity: &Opportunity) -> String {
    format!(
        "Dear Team,\n\nA new customer has been successfully created with the following details:\n\
         {SEPARATOR}\n{}{SEPARATOR}\n\nRegards,\nCustomer Management Team",
        opportunity_block(opportunity)
    )
}

fn numbered(entries: &[(&str, String)]) -> String {
    entries
        .iter()
        .enumerate()
        .map(|(i, (name, value))| format!("{}. {}: {}\n", i + 1, title_case(name), value))
        .collect()
}

fn title_case(field: &str) -> String {
    field
        .split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn opportunity_updated(opportunity_id: &str, changes: &OpportunityChanges) -> String {
    format!(
        "Dear Team,\n\nThe opportunity has been successfully updated with the following details:\n\
         {SEPARATOR}\nOpportunity ID: {opportunity_id}\n\nUpdated Fields:\n{}{SEPARATOR}\n\n\
         Regards,\nOpportunity Management Team",
        numbered(&changes.entries())
    )
}

fn vehicle_block(vehicle: &VehicleDetails) -> String {
    format!(
        "Vehicle Model ID: {}\n\
         Vehicle Model: {}\n\
         Vehicle Year: {}\n\
         Engine Type: {}\n\
         Transmission: {}\n\
         Fuel Type: {}\n\
         Body Type: {}\n\
         Warranty Period (Years): {}\n\
         Color: {}\n\
         Model Variant: {}\n\
         Tyre Company: {}\n\
         Tyre Size: {}\n\
         Start Type: {}\n\
         Sunroof Available: {}\n\
         Gear Type: {}\n\
         Vehicle Type: {}\n",
        vehicle.vehicle_model_id,
        vehicle.vehicle_model,
        vehicle.vehicle_year,
        or_na(&vehicle.engine_type),
        or_na(&vehicle.transmission),
        or_na(&vehicle.fuel_type),
        or_na(&vehicle.body_type),
        or_na(&vehicle.warranty_period_years),
        or_na(&vehicle.color),
        or_na(&vehicle.model_variant),
        or_na(&vehicle.tyre_company),
        or_na(&vehicle.tyre_size),
        or_na(&vehicle.start_type),
        or_na(&vehicle.sunroof_available),
        or_na(&vehicle.gear_type),
        or_na(&vehicle.vehicle_type),
    )
}

pub fn vehicle_listing(vehicles: &[VehicleDetails]) -> String {
    let mut body = format!(
        "Hello,\n\nHere are the details for all vehicles retrieved from the database:\n\n\
         Total Number of Vehicles: {}\n\nVehicle Details:\n",
        vehicles.len()
    );
    for vehicle in vehicles {
        body.push_str("---\n");
        body.push_str(&vehicle_block(vehicle));
        body.push_str("---\n\n");
    }
    body.push_str("Best regards,\nYour Team");
    body
}

pub fn vehicle_detail(vehicle: &VehicleDetails) -> String {
    format!(
        "Hello,\n\nHere are the details for the vehicle with ID {}:\n\n{}---\n\nBest regards,\nYour Team",
        vehicle.vehicle_model_id,
        vehicle_block(vehicle)
    )
}

/// `action` is a past participle such as `added` or `updated`.
pub fn vehicle_changed(vehicle: &VehicleDetails, action: &str) -> String {
    format!(
        "Dear Team,\n\nThis email is to inform you that the following vehicle has been {action} successfully:\n\n\
         Vehicle Details:\n-----------------------------------------------------\n{}\
         -----------------------------------------------------\n\n\
         Best regards,\nYour Vehicle Management Team",
        vehicle_block(vehicle)
    )
}

pub fn vehicles_deleted(vehicles: &[VehicleDetails], criteria: &VehicleCriteria) -> String {
    let mut body = vehicle_listing(vehicles);
    body.push_str("\n\nCriteria Used for Deletion:\n");
    for line in criteria.describe() {
        body.push_str(&line);
        body.push('\n');
    }
    body
}

fn insurance_lines(insurance: Option<&Insurance>) -> String {
    match insurance {
        Some(insurance) => format!(
            "- Policy Number: {}\n- Provider: {}\n- Expiry Date: {}\n",
            insurance.policy_number,
            insurance.provider,
            format_due_date(&insurance.expiry_date)
        ),
        None => "- Policy Number: N/A\n- Provider: N/A\n- Expiry Date: N/A\n".to_string(),
    }
}

fn next_service_lines(next: &NextService) -> String {
    format!(
        "- Service Type: {}\n- Due Date: {}\n- Kilometers Due: {}\n",
        next.service_type,
        format_due_date(&next.due_date),
        next.kilometers_due
    )
}

/// Purchase confirmation addressed to the customer.
pub fn purchase_for_customer(receipt: &PurchaseReceipt, model: &VehicleDetails) -> String {
    let vehicle = &receipt.record.vehicle;
    format!(
        "Hello,\n\nCongratulations on your new vehicle purchase!\n\n\
         Below are the details of your purchase:\n\n\
         Vehicle Details:\n\
         - Vehicle Model: {}\n\
         - Vehicle Year: {}\n\
         - Vehicle Color: {}\n\
         - Current Kilometers: {}\n\
         - Transmission: {}\n\
         - Engine Type: {}\n\
         - Fuel Type: {}\n\
         - Body Type: {}\n\
         - Warranty Period: {} years\n\n\
         Insurance Information:\n{}\n\
         Tax Information:\n- Tax Amount: ₹{}\n\n\
         Free Services:\nYou have {} free services left.\n\n\
         Next Service:\n{}\n\
         Thank you for choosing us. We look forward to serving you!\n\n\
         Best regards,\nYour Vehicle Service Team",
        model.vehicle_model,
        model.vehicle_year,
        or_na(&vehicle.vehicle_color),
        vehicle.current_kilometers,
        or_na(&model.transmission),
        or_na(&model.engine_type),
        or_na(&model.fuel_type),
        or_na(&model.body_type),
        or_na(&model.warranty_period_years),
        insurance_lines(receipt.record.insurance.as_ref()),
        receipt.record.tax.tax_amount,
        vehicle.free_services_left,
        next_service_lines(&receipt.next_service),
    )
}

/// Purchase record addressed to the sales team.
pub fn purchase_for_team(
    receipt: &PurchaseReceipt,
    model: &VehicleDetails,
    opportunity: &Opportunity,
) -> String {
    let vehicle = &receipt.record.vehicle;
    format!(
        "Team,\n\nA new vehicle purchase has been successfully recorded. Below are the details:\n\n\
         Vehicle Details:\n\
         - Vehicle ID: {}\n\
         - Vehicle Model ID: {}\n\
         - Vehicle Model: {}\n\
         - Vehicle Year: {}\n\
         - Engine Type: {}\n\
         - Transmission: {}\n\
         - Fuel Type: {}\n\
         - Body Type: {}\n\
         - Warranty Period: {} years\n\
         - Color: {}\n\
         - Current Kilometers: {}\n\
         - Gear Type: {}\n\n\
         Opportunity Details:\n\
         - Opportunity ID: {}\n\
         - Opportunity Stage: {}\n\n\
         Tax Information:\n- Tax Amount: ₹{}\n\n\
         Free Services:\nThis vehicle has {} free services remaining.\n\n\
         Next Service:\n{}\n\
         Please ensure all records are updated accordingly.\n\n\
         Best regards,\nVehicle Management System",
        vehicle.vehicle_id,
        model.vehicle_model_id,
        model.vehicle_model,
        model.vehicle_year,
        or_na(&model.engine_type),
        or_na(&model.transmission),
        or_na(&model.fuel_type),
        or_na(&model.body_type),
        or_na(&model.warranty_period_years),
        or_na(&vehicle.vehicle_color),
        vehicle.current_kilometers,
        or_na(&model.gear_type),
        opportunity.opportunity_id,
        opportunity.stage,
        receipt.record.tax.tax_amount,
        vehicle.free_services_left,
        next_service_lines(&receipt.next_service),
    )
}

pub fn purchased_vehicles(vehicles: &[PurchasedVehicle]) -> String {
    let mut body = format!(
        "Successfully retrieved {} purchased vehicle(s):\n\n",
        vehicles.len()
    );
    for vehicle in vehicles {
        body.push_str(&format!(
            "Vehicle ID: {}\nOpportunity ID: {}\nPurchase Date: {}\nVehicle Model ID: {}\n\
             Vehicle Color: {}\nCurrent Kilometers: {}\nFree Services Left: {}\n\
             ---------------------------------\n",
            vehicle.vehicle_id,
            vehicle.opportunity_id,
            format_display(&vehicle.purchase_date),
            vehicle.vehicle_model_id,
            or_na(&vehicle.vehicle_color),
            vehicle.current_kilometers,
            vehicle.free_services_left,
        ));
    }
    body.push_str(&format!("Total Count: {}\n", vehicles.len()));
    body
}

pub fn purchased_vehicle_updated(vehicle_id: &str, changes: &[(&str, String)]) -> String {
    format!(
        "Dear Team,\n\nThe vehicle has been successfully updated with the following details:\n\
         {SEPARATOR}\nVehicle ID: {vehicle_id}\n\nUpdated Fields:\n{}{SEPARATOR}\n\n\
         Regards,\nVehicle Management Team",
        numbered(changes)
    )
}

/// Sent after a purchased vehicle and its records are removed.
pub fn vehicle_operation_success(
    vehicle: &PurchasedVehicle,
    services: &[ServiceRecord],
    insurance: &[Insurance],
    at: &NaiveDateTime,
) -> String {
    let services: Vec<String> = services
        .iter()
        .map(|s| format!("{} ({})", s.service_type, format_due_date(&s.due_date)))
        .collect();
    let insurance: Vec<String> = insurance
        .iter()
        .map(|i| format!("{} {}", i.provider, i.policy_number))
        .collect();
    format!(
        "Vehicle Operation Successful\n\n\
         The following vehicle was processed successfully:\n\
         Vehicle ID: {}\n\
         Opportunity ID: {}\n\
         Purchase Date: {}\n\
         Vehicle Model ID: {}\n\
         Vehicle Color: {}\n\
         Current Kilometers: {}\n\
         Services: {}\n\
         Insurance: {}\n\
         Operation Time: {}\n",
        vehicle.vehicle_id,
        vehicle.opportunity_id,
        format_display(&vehicle.purchase_date),
        vehicle.vehicle_model_id,
        or_na(&vehicle.vehicle_color),
        vehicle.current_kilometers,
        if services.is_empty() { "None".to_string() } else { services.join(", ") },
        if insurance.is_empty() { "None".to_string() } else { insurance.join(", ") },
        format_display(at),
    )
}

pub fn vehicle_operation_failure(
    vehicle_id: &str,
    stage: &str,
    error: &str,
    at: &NaiveDateTime,
) -> String {
    format!(
        "Vehicle Operation Failed\n\n\
         The operation on the vehicle with ID {vehicle_id} failed at the stage: {stage}\n\
         Error Message: {error}\n\
         Operation Time: {}\n",
        format_display(at)
    )
}

pub fn service_record_details(service: &ServiceRecord) -> String {
    format!(
        "Service ID: {}\nVehicle ID: {}\nService Type: {}\nDue Date: {}\nKilometers Due: {}\nFree Service: {}\n",
        service.service_id,
        service.vehicle_id,
        service.service_type,
        format_due_date(&service.due_date),
        or_na(&service.kilometers_due),
        if service.is_free { "Yes" } else { "No" },
    )
}

pub fn tax_details(tax: &Tax) -> String {
    format!(
        "Tax ID: {}\nVehicle ID: {}\nTax Type: {}\nTax Amount: ₹{}\nDue Date: {}\n",
        tax.tax_id,
        tax.vehicle_id,
        tax.tax_type,
        tax.tax_amount,
        format_due_date(&tax.due_date),
    )
}

pub fn insurance_details(insurance: &Insurance) -> String {
    format!(
        "Insurance ID: {}\nVehicle ID: {}\nPolicy Number: {}\nProvider: {}\nExpiry Date: {}\n",
        insurance.insurance_id,
        insurance.vehicle_id,
        insurance.policy_number,
        insurance.provider,
        format_due_date(&insurance.expiry_date),
    )
}
