use std::sync::Arc;

use uuid::Uuid;

use crate::{
    Error,
    dealer::{Dealer, DealerFilter, DealerUpdate, NewDealer},
    error::{RecordError, ValidationError},
    repositories::{DealerRepository, DealerRepositoryProvider},
    validation::{require_text, validate_name_length},
};

pub struct DealerService<R: DealerRepositoryProvider> {
    repositories: Arc<R>,
}

impl<R: DealerRepositoryProvider> DealerService<R> {
    pub fn new(repositories: Arc<R>) -> Self {
        Self { repositories }
    }

    pub async fn create(&self, new: NewDealer) -> Result<Dealer, Error> {
        let dealer_code = require_text("dealer_code", new.dealer_code.as_deref())?;
        let opportunity_owner =
            require_text("opportunity_owner", new.opportunity_owner.as_deref())?;
        validate_name_length("dealer_code", dealer_code)?;
        validate_name_length("opportunity_owner", opportunity_owner)?;

        let dealer = self
            .repositories
            .dealer()
            .create(&Dealer {
                dealer_id: Uuid::new_v4().to_string(),
                dealer_code: dealer_code.to_string(),
                opportunity_owner: opportunity_owner.to_string(),
            })
            .await?;

        tracing::info!(dealer_id = %dealer.dealer_id, "Created dealer");
        Ok(dealer)
    }

    /// Every dealer; an empty table is reported as `NoMatches`.
    pub async fn list(&self) -> Result<Vec<Dealer>, Error> {
        let dealers = self.repositories.dealer().list().await?;
        if dealers.is_empty() {
            return Err(RecordError::NoMatches("dealers").into());
        }
        Ok(dealers)
    }

    pub async fn find(&self, filter: &DealerFilter) -> Result<Vec<Dealer>, Error> {
        if filter.is_empty() {
            return Err(ValidationError::MissingField(
                "at least one of dealer_id, dealer_code or opportunity_owner".to_string(),
            )
            .into());
        }

        let dealers = self.repositories.dealer().find(filter).await?;
        if dealers.is_empty() {
            return Err(RecordError::NoMatches("dealers").into());
        }
        Ok(dealers)
    }

    /// Applies the fields that are set and returns the stored dealer.
    pub async fn update(&self, update: DealerUpdate) -> Result<Dealer, Error> {
        let dealer_id = require_text("dealer_id", update.dealer_id.as_deref())?;
        if update.dealer_code.is_none() && update.opportunity_owner.is_none() {
            return Err(ValidationError::MissingField(
                "dealer_code or opportunity_owner".to_string(),
            )
            .into());
        }

        let mut dealer = self
            .repositories
            .dealer()
            .find_by_id(dealer_id)
            .await?
            .ok_or_else(|| RecordError::not_found("Dealer", dealer_id))?;

        if let Some(code) = update.dealer_code.as_deref() {
            let code = require_text("dealer_code", Some(code))?;
            validate_name_length("dealer_code", code)?;
            dealer.dealer_code = code.to_string();
        }
        if let Some(owner) = update.opportunity_owner.as_deref() {
            let owner = require_text("opportunity_owner", Some(owner))?;
            validate_name_length("opportunity_owner", owner)?;
            dealer.opportunity_owner = owner.to_string();
        }

        let dealer = self.repositories.dealer().update(&dealer).await?;
        tracing::info!(dealer_id = %dealer.dealer_id, "Updated dealer");
        Ok(dealer)
    }

    /// Deletes the oldest dealer matching the filter.
    pub async fn delete_first(&self, filter: &DealerFilter) -> Result<Dealer, Error> {
        let dealer = self
            .find(filter)
            .await?
            .into_iter()
            .next()
            .ok_or(RecordError::NoMatches("dealers"))?;

        self.repositories
            .dealer()
            .delete_many(std::slice::from_ref(&dealer.dealer_id))
            .await?;

        tracing::info!(dealer_id = %dealer.dealer_id, "Deleted dealer");
        Ok(dealer)
    }

    /// Deletes every dealer matching the filter.
    pub async fn delete_all(&self, filter: &DealerFilter) -> Result<Vec<Dealer>, Error> {
        let dealers = self.find(filter).await?;
        let ids: Vec<String> = dealers.iter().map(|d| d.dealer_id.clone()).collect();

        let removed = self.repositories.dealer().delete_many(&ids).await?;
        tracing::info!(count = removed, "Deleted dealers");
        Ok(dealers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::mock::MockRepositories;

    fn new_dealer(code: &str, owner: &str) -> NewDealer {
        NewDealer {
            dealer_code: Some(code.to_string()),
            opportunity_owner: Some(owner.to_string()),
        }
    }

    fn by_owner(owner: &str) -> DealerFilter {
        DealerFilter {
            opportunity_owner: Some(owner.to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_list_empty_is_no_matches() {
        let service = DealerService::new(Arc::new(MockRepositories::default()));
        assert!(service.list().await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_find_requires_a_filter() {
        let service = DealerService::new(Arc::new(MockRepositories::default()));
        assert!(
            service
                .find(&DealerFilter::default())
                .await
                .unwrap_err()
                .is_validation_error()
        );
    }

    #[tokio::test]
    async fn test_update_partial() {
        let service = DealerService::new(Arc::new(MockRepositories::default()));
        let dealer = service.create(new_dealer("DLR01", "Priya")).await.unwrap();

        let updated = service
            .update(DealerUpdate {
                dealer_id: Some(dealer.dealer_id.clone()),
                dealer_code: None,
                opportunity_owner: Some("Arjun".to_string()),
            })
            .await
            .unwrap();

        assert_eq!(updated.dealer_code, "DLR01");
        assert_eq!(updated.opportunity_owner, "Arjun");
    }

    #[tokio::test]
    async fn test_delete_first_and_all() {
        let service = DealerService::new(Arc::new(MockRepositories::default()));
        service.create(new_dealer("DLR01", "Priya")).await.unwrap();
        service.create(new_dealer("DLR02", "Priya")).await.unwrap();
        service.create(new_dealer("DLR03", "Priya")).await.unwrap();
        service.create(new_dealer("DLR04", "Arjun")).await.unwrap();

        let first = service.delete_first(&by_owner("Priya")).await.unwrap();
        assert_eq!(first.dealer_code, "DLR01");

        let rest = service.delete_all(&by_owner("Priya")).await.unwrap();
        assert_eq!(rest.len(), 2);

        let remaining = service.list().await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].opportunity_owner, "Arjun");
        assert!(
            service
                .delete_all(&by_owner("Priya"))
                .await
                .unwrap_err()
                .is_not_found()
        );
    }
}
