//! Sales pipeline: creating, searching, updating and removing opportunities.

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    Error,
    datetime::{business_now, parse_display_datetime, parse_input_datetime},
    dealer::Dealer,
    error::{RecordError, ValidationError},
    opportunity::{
        CurrencyConversions, NewOpportunity, Opportunity, OpportunityChanges, OpportunityCriteria,
        OpportunityMatch, OpportunityQuery, OpportunitySearch, OpportunityUpdate,
        amount_in_words,
    },
    repositories::{
        AccountRepository, AccountRepositoryProvider, DealerRepository, DealerRepositoryProvider,
        OpportunityRepository, OpportunityRepositoryProvider, VehicleRepository,
        VehicleRepositoryProvider,
    },
    validation::{
        opportunity_stage, require_text, validate_name_length, validate_positive_number,
        validate_probability, validate_stage,
    },
};

/// Stage recorded when neither a stage nor a probability is supplied.
pub const UNKNOWN_STAGE: &str = "Unknown";

fn optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

fn bounded_text(field: &str, value: Option<&str>) -> Result<Option<String>, Error> {
    let value = optional_text(value);
    if let Some(value) = &value {
        validate_name_length(field, value)?;
    }
    Ok(value)
}

pub struct OpportunityService<R>
where
    R: OpportunityRepositoryProvider
        + AccountRepositoryProvider
        + DealerRepositoryProvider
        + VehicleRepositoryProvider,
{
    repositories: Arc<R>,
}

impl<R> OpportunityService<R>
where
    R: OpportunityRepositoryProvider
        + AccountRepositoryProvider
        + DealerRepositoryProvider
        + VehicleRepositoryProvider,
{
    pub fn new(repositories: Arc<R>) -> Self {
        Self { repositories }
    }

    /// Records a new customer opportunity against an existing account and dealer.
    pub async fn create(&self, new: NewOpportunity) -> Result<Opportunity, Error> {
        let opportunity_name = require_text("opportunity_name", new.opportunity_name.as_deref())?;
        validate_name_length("opportunity_name", opportunity_name)?;
        let account_name = require_text("account_name", new.account_name.as_deref())?;

        let account = self
            .repositories
            .account()
            .find_by_name(account_name)
            .await?
            .ok_or_else(|| {
                ValidationError::InvalidField(format!("Account does not exist: {account_name}"))
            })?;

        let dealer = self.matching_dealer(&new).await?;

        let close_date = new
            .close_date
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(parse_input_datetime)
            .transpose()?;

        if let Some(amount) = new.amount {
            validate_positive_number("amount", amount)?;
        }

        let stage = match (new.probability, new.stage.as_deref()) {
            (Some(probability), _) => {
                validate_probability(probability)?;
                opportunity_stage(probability)?.to_string()
            }
            (None, Some(stage)) => validate_stage(stage)?,
            (None, None) => UNKNOWN_STAGE.to_string(),
        };

        let vehicle = match optional_text(new.vehicle_model_id.as_deref()) {
            Some(id) => Some(
                self.repositories
                    .vehicle()
                    .find_by_id(&id)
                    .await?
                    .ok_or_else(|| {
                        ValidationError::InvalidField(format!("Vehicle model does not exist: {id}"))
                    })?,
            ),
            None => None,
        };

        let opportunity = Opportunity {
            opportunity_id: Uuid::new_v4().to_string(),
            opportunity_name: opportunity_name.to_string(),
            account_id: account.account_id,
            account_name: account.account_name,
            close_date,
            amount: new.amount,
            description: optional_text(new.description.as_deref()),
            dealer_id: dealer.dealer_id,
            dealer_code: dealer.dealer_code,
            stage,
            probability: new.probability,
            next_step: optional_text(new.next_step.as_deref()),
            created_date: business_now(),
            amount_in_words: new.amount.map(amount_in_words),
            currency_conversions: new
                .amount
                .map(CurrencyConversions::from_amount)
                .unwrap_or_default(),
            vehicle_model_id: vehicle.as_ref().map(|v| v.vehicle_model_id.clone()),
            vehicle_model: vehicle.as_ref().map(|v| v.vehicle_model.clone()),
            vehicle_year: vehicle.as_ref().map(|v| v.vehicle_year),
            vehicle_color: optional_text(new.vehicle_color.as_deref())
                .or_else(|| vehicle.as_ref().and_then(|v| v.color.clone())),
        };

        let opportunity = self.repositories.opportunity().create(&opportunity).await?;
        tracing::info!(
            opportunity_id = %opportunity.opportunity_id,
            account_id = %opportunity.account_id,
            "Created opportunity"
        );
        Ok(opportunity)
    }

    /// The dealer identified by id whose code and owner also match.
    async fn matching_dealer(&self, new: &NewOpportunity) -> Result<Dealer, Error> {
        let dealer_id = require_text("dealer_id", new.dealer_id.as_deref())?;
        let dealer_code = require_text("dealer_code", new.dealer_code.as_deref())?;
        let owner = require_text("opportunity_owner", new.opportunity_owner.as_deref())?;

        self.repositories
            .dealer()
            .find_by_id(dealer_id)
            .await?
            .filter(|d| d.dealer_code == dealer_code && d.opportunity_owner == owner)
            .ok_or_else(|| {
                ValidationError::InvalidField(
                    "Dealer does not exist or its code and owner do not match".to_string(),
                )
                .into()
            })
    }

    pub async fn search(&self, query: &OpportunityQuery) -> Result<Vec<Opportunity>, Error> {
        let search = Self::validate_search(query)?;
        let opportunities = self.repositories.opportunity().search(&search).await?;
        if opportunities.is_empty() {
            return Err(RecordError::NoMatches("opportunities").into());
        }
        Ok(opportunities)
    }

    fn validate_search(query: &OpportunityQuery) -> Result<OpportunitySearch, Error> {
        let probability_min = query.probability_min;
        let probability_max = query.probability_max;
        if let Some(min) = probability_min {
            validate_probability(min)?;
        }
        if let Some(max) = probability_max {
            validate_probability(max)?;
        }
        if let (Some(min), Some(max)) = (probability_min, probability_max)
            && min > max
        {
            return Err(ValidationError::InvalidField(
                "probability_min cannot be greater than probability_max".to_string(),
            )
            .into());
        }

        let created_from = optional_text(query.created_date_start.as_deref())
            .map(|s| parse_display_datetime(&s))
            .transpose()?;
        let created_to = optional_text(query.created_date_end.as_deref())
            .map(|s| parse_display_datetime(&s))
            .transpose()?;

        Ok(OpportunitySearch {
            opportunity_id: optional_text(query.opportunity_id.as_deref()),
            name_contains: bounded_text("opportunity_name", query.opportunity_name.as_deref())?,
            account_contains: bounded_text("account_name", query.account_name.as_deref())?,
            stage: query.stage.as_deref().map(validate_stage).transpose()?,
            probability_min,
            probability_max,
            created_from,
            created_to,
        })
    }

    /// Applies the supplied fields and returns the stored record with what changed.
    pub async fn update(
        &self,
        update: OpportunityUpdate,
    ) -> Result<(Opportunity, OpportunityChanges), Error> {
        let opportunity_id = require_text("opportunity_id", update.opportunity_id.as_deref())?;
        let mut opportunity = self
            .repositories
            .opportunity()
            .find_by_id(opportunity_id)
            .await?
            .ok_or_else(|| RecordError::not_found("Opportunity", opportunity_id))?;

        let mut changes = OpportunityChanges::default();

        if let Some(name) = bounded_text("opportunity_name", update.opportunity_name.as_deref())? {
            opportunity.opportunity_name = name.clone();
            changes.opportunity_name = Some(name);
        }
        if let Some(close_date) = optional_text(update.close_date.as_deref()) {
            let close_date = parse_display_datetime(&close_date)?;
            opportunity.close_date = Some(close_date);
            changes.close_date = Some(close_date);
        }
        if let Some(amount) = update.amount {
            validate_positive_number("amount", amount)?;
            opportunity.amount = Some(amount);
            opportunity.amount_in_words = Some(amount_in_words(amount));
            opportunity.currency_conversions = CurrencyConversions::from_amount(amount);
            changes.amount = Some(amount);
            changes.currency_conversions = Some(opportunity.currency_conversions);
        }
        if let Some(overrides) = &update.currency_conversions {
            for (code, value) in overrides.entries() {
                if let Some(value) = value {
                    validate_positive_number(code, value)?;
                }
            }
            opportunity.currency_conversions.merge(overrides);
            changes.currency_conversions = Some(opportunity.currency_conversions);
        }
        if let Some(description) = optional_text(update.description.as_deref()) {
            opportunity.description = Some(description.clone());
            changes.description = Some(description);
        }
        if let Some(stage) = update.stage.as_deref() {
            let stage = validate_stage(stage)?;
            opportunity.stage = stage.clone();
            changes.stage = Some(stage);
        }
        if let Some(probability) = update.probability {
            validate_probability(probability)?;
            opportunity.probability = Some(probability);
            changes.probability = Some(probability);
        }
        if let Some(next_step) = optional_text(update.next_step.as_deref()) {
            opportunity.next_step = Some(next_step.clone());
            changes.next_step = Some(next_step);
        }
        if let Some(color) = optional_text(update.vehicle_color.as_deref()) {
            opportunity.vehicle_color = Some(color.clone());
            changes.vehicle_color = Some(color);
        }

        if changes.is_empty() {
            return Err(ValidationError::MissingField("at least one field to update".to_string()).into());
        }

        let opportunity = self.repositories.opportunity().update(&opportunity).await?;
        tracing::info!(
            opportunity_id = %opportunity.opportunity_id,
            fields = changes.entries().len(),
            "Updated opportunity"
        );
        Ok((opportunity, changes))
    }

    /// Deletes every opportunity matching all of the given criteria.
    pub async fn delete(&self, criteria: &OpportunityCriteria) -> Result<Vec<Opportunity>, Error> {
        let criteria = Self::validate_criteria(criteria)?;
        if criteria.is_empty() {
            return Err(ValidationError::MissingField(
                "at least one deletion criterion".to_string(),
            )
            .into());
        }

        let deleted = self
            .repositories
            .opportunity()
            .delete_matching(&criteria)
            .await?;
        if deleted.is_empty() {
            return Err(RecordError::NoMatches("opportunities").into());
        }

        tracing::info!(count = deleted.len(), "Deleted opportunities");
        Ok(deleted)
    }

    fn validate_criteria(criteria: &OpportunityCriteria) -> Result<OpportunityMatch, Error> {
        if let Some(probability) = criteria.probability {
            validate_probability(probability)?;
        }

        Ok(OpportunityMatch {
            opportunity_id: optional_text(criteria.opportunity_id.as_deref()),
            account_name: bounded_text("account_name", criteria.account_name.as_deref())?,
            dealer_id: optional_text(criteria.dealer_id.as_deref()),
            dealer_code: optional_text(criteria.dealer_code.as_deref()),
            opportunity_name: bounded_text(
                "opportunity_name",
                criteria.opportunity_name.as_deref(),
            )?,
            stage: criteria.stage.as_deref().map(validate_stage).transpose()?,
            probability: criteria.probability,
            close_date: optional_text(criteria.close_date.as_deref())
                .map(|s| parse_input_datetime(&s))
                .transpose()?,
        })
    }
}
