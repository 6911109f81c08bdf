//! Sales opportunities and their pricing helpers.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::datetime;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Opportunity {
    pub opportunity_id: String,
    pub opportunity_name: String,
    pub account_id: String,
    pub account_name: String,
    #[serde(with = "datetime::display_opt")]
    pub close_date: Option<NaiveDateTime>,
    pub amount: Option<f64>,
    pub description: Option<String>,
    pub dealer_id: String,
    pub dealer_code: String,
    pub stage: String,
    pub probability: Option<i64>,
    pub next_step: Option<String>,
    #[serde(with = "datetime::display")]
    pub created_date: NaiveDateTime,
    pub amount_in_words: Option<String>,
    pub currency_conversions: CurrencyConversions,
    pub vehicle_model_id: Option<String>,
    pub vehicle_model: Option<String>,
    pub vehicle_year: Option<i64>,
    pub vehicle_color: Option<String>,
}

/// Opportunity amount expressed in the currencies the dealership reports in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CurrencyConversions {
    #[serde(rename = "USD", alias = "usd", default)]
    pub usd: Option<f64>,
    #[serde(rename = "AUD", alias = "aud", alias = "aus", default)]
    pub aud: Option<f64>,
    #[serde(rename = "CAD", alias = "cad", default)]
    pub cad: Option<f64>,
    #[serde(rename = "JPY", alias = "jpy", default)]
    pub jpy: Option<f64>,
    #[serde(rename = "EUR", alias = "eur", default)]
    pub eur: Option<f64>,
    #[serde(rename = "GBP", alias = "gbp", default)]
    pub gbp: Option<f64>,
    #[serde(rename = "CNY", alias = "cny", default)]
    pub cny: Option<f64>,
}

impl CurrencyConversions {
    pub const USD_RATE: f64 = 10.0;
    pub const AUD_RATE: f64 = 5.0;
    pub const CAD_RATE: f64 = 1.0;
    pub const JPY_RATE: f64 = 1.76;
    pub const EUR_RATE: f64 = 0.012;
    pub const GBP_RATE: f64 = 20.0;
    pub const CNY_RATE: f64 = 6.0;

    /// Converts with the fixed demonstration rates, rounded to two decimals.
    pub fn from_amount(amount: f64) -> Self {
        let convert = |rate: f64| Some(round2(amount * rate));
        Self {
            usd: convert(Self::USD_RATE),
            aud: convert(Self::AUD_RATE),
            cad: convert(Self::CAD_RATE),
            jpy: convert(Self::JPY_RATE),
            eur: convert(Self::EUR_RATE),
            gbp: convert(Self::GBP_RATE),
            cny: convert(Self::CNY_RATE),
        }
    }

    pub fn entries(&self) -> [(&'static str, Option<f64>); 7] {
        [
            ("USD", self.usd),
            ("AUD", self.aud),
            ("CAD", self.cad),
            ("JPY", self.jpy),
            ("EUR", self.eur),
            ("GBP", self.gbp),
            ("CNY", self.cny),
        ]
    }

    /// Overlays every currency set in `other`.
    pub fn merge(&mut self, other: &CurrencyConversions) {
        let targets = [
            (&mut self.usd, other.usd),
            (&mut self.aud, other.aud),
            (&mut self.cad, other.cad),
            (&mut self.jpy, other.jpy),
            (&mut self.eur, other.eur),
            (&mut self.gbp, other.gbp),
            (&mut self.cny, other.cny),
        ];
        for (target, value) in targets {
            if value.is_some() {
                *target = value;
            }
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Textual amount stored alongside the number, always with a fractional
/// part: `1500.0`, `1500.25`.
pub fn amount_in_words(amount: f64) -> String {
    if amount.is_finite() && amount.fract() == 0.0 && amount.abs() < 1e16 {
        format!("{amount:.1}")
    } else {
        amount.to_string()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewOpportunity {
    #[serde(default)]
    pub opportunity_name: Option<String>,
    #[serde(default)]
    pub account_name: Option<String>,
    /// `YYYY-MM-DD HH:MM:SS`
    #[serde(default)]
    pub close_date: Option<String>,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub dealer_id: Option<String>,
    #[serde(default)]
    pub dealer_code: Option<String>,
    #[serde(default)]
    pub opportunity_owner: Option<String>,
    #[serde(default)]
    pub stage: Option<String>,
    #[serde(default)]
    pub probability: Option<i64>,
    #[serde(default)]
    pub next_step: Option<String>,
    #[serde(default)]
    pub vehicle_model_id: Option<String>,
    #[serde(default)]
    pub vehicle_color: Option<String>,
}

/// Raw search parameters as received from a client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OpportunityQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opportunity_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opportunity_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probability_min: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probability_max: Option<i64>,
    /// Display format, e.g. `10:00 AM, September 30, 2024`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_date_start: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_date_end: Option<String>,
}

/// Validated search handed to the repository.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OpportunitySearch {
    pub opportunity_id: Option<String>,
    pub name_contains: Option<String>,
    pub account_contains: Option<String>,
    pub stage: Option<String>,
    pub probability_min: Option<i64>,
    pub probability_max: Option<i64>,
    pub created_from: Option<NaiveDateTime>,
    pub created_to: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OpportunityUpdate {
    #[serde(default)]
    pub opportunity_id: Option<String>,
    #[serde(default)]
    pub opportunity_name: Option<String>,
    /// Display format, e.g. `10:00 AM, September 30, 2024`.
    #[serde(default)]
    pub close_date: Option<String>,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub currency_conversions: Option<CurrencyConversions>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub stage: Option<String>,
    #[serde(default)]
    pub probability: Option<i64>,
    #[serde(default)]
    pub next_step: Option<String>,
    #[serde(default)]
    pub vehicle_color: Option<String>,
}

/// Fields changed by an update, in request order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OpportunityChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opportunity_name: Option<String>,
    #[serde(
        with = "datetime::display_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub close_date: Option<NaiveDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency_conversions: Option<CurrencyConversions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probability: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_step: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle_color: Option<String>,
}

impl OpportunityChanges {
    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    /// Changed fields rendered as `(name, value)` pairs.
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        let mut entries = Vec::new();
        if let Some(name) = &self.opportunity_name {
            entries.push(("opportunity_name", name.clone()));
        }
        if let Some(close_date) = &self.close_date {
            entries.push(("close_date", datetime::format_display(close_date)));
        }
        if let Some(amount) = self.amount {
            entries.push(("amount", amount.to_string()));
        }
        if let Some(conversions) = &self.currency_conversions {
            let rendered: Vec<String> = conversions
                .entries()
                .iter()
                .filter_map(|(code, value)| value.map(|v| format!("{code}: {v}")))
                .collect();
            entries.push(("currency_conversions", rendered.join(", ")));
        }
        if let Some(description) = &self.description {
            entries.push(("description", description.clone()));
        }
        if let Some(stage) = &self.stage {
            entries.push(("stage", stage.clone()));
        }
        if let Some(probability) = self.probability {
            entries.push(("probability", probability.to_string()));
        }
        if let Some(next_step) = &self.next_step {
            entries.push(("next_step", next_step.clone()));
        }
        if let Some(color) = &self.vehicle_color {
            entries.push(("vehicle_color", color.clone()));
        }
        entries
    }
}

/// Raw deletion criteria as received from a client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OpportunityCriteria {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opportunity_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dealer_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dealer_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opportunity_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probability: Option<i64>,
    /// `YYYY-MM-DD HH:MM:SS`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub close_date: Option<String>,
}

/// Validated exact-match criteria handed to the repository.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OpportunityMatch {
    pub opportunity_id: Option<String>,
    pub account_name: Option<String>,
    pub dealer_id: Option<String>,
    pub dealer_code: Option<String>,
    pub opportunity_name: Option<String>,
    pub stage: Option<String>,
    pub probability: Option<i64>,
    pub close_date: Option<NaiveDateTime>,
}

impl OpportunityMatch {
    pub fn is_empty(&self) -> bool {
        *self == OpportunityMatch::default()
    }
}
