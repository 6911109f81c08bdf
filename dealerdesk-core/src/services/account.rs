use std::sync::Arc;

use crate::{
    Error,
    account::{Account, AccountUpdate, NewAccount, generate_account_id},
    error::RecordError,
    repositories::{AccountRepository, AccountRepositoryProvider},
    validation::{require_text, validate_account_id, validate_name_length},
};

/// How many random ids to try before giving up on a collision-free one.
const ID_ATTEMPTS: usize = 5;

pub struct AccountService<R: AccountRepositoryProvider> {
    repositories: Arc<R>,
}

impl<R: AccountRepositoryProvider> AccountService<R> {
    pub fn new(repositories: Arc<R>) -> Self {
        Self { repositories }
    }

    /// Creates an account, generating an id from the name when none is given.
    pub async fn create(&self, new: NewAccount) -> Result<Account, Error> {
        let account_name = require_text("account_name", new.account_name.as_deref())?;
        validate_name_length("account_name", account_name)?;

        let account_id = match new.account_id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => {
                validate_account_id(id)?;
                id.to_string()
            }
            _ => self.unused_id(account_name).await?,
        };

        let account = self
            .repositories
            .account()
            .create(&Account {
                account_id,
                account_name: account_name.to_string(),
            })
            .await?;

        tracing::info!(account_id = %account.account_id, "Created account");
        Ok(account)
    }

    async fn unused_id(&self, account_name: &str) -> Result<String, Error> {
        let mut candidate = generate_account_id(account_name);
        for _ in 1..ID_ATTEMPTS {
            if self
                .repositories
                .account()
                .find_by_id(&candidate)
                .await?
                .is_none()
            {
                break;
            }
            candidate = generate_account_id(account_name);
        }
        Ok(candidate)
    }

    pub async fn list(&self) -> Result<Vec<Account>, Error> {
        self.repositories.account().list().await
    }

    pub async fn get(&self, account_id: Option<&str>) -> Result<Account, Error> {
        let account_id = require_text("account_id", account_id)?;
        self.repositories
            .account()
            .find_by_id(account_id)
            .await?
            .ok_or_else(|| RecordError::not_found("Account", account_id).into())
    }

    pub async fn rename(&self, update: AccountUpdate) -> Result<Account, Error> {
        let account_id = require_text("account_id", update.account_id.as_deref())?;
        let account_name = require_text("account_name", update.account_name.as_deref())?;
        validate_name_length("account_name", account_name)?;

        let account = self
            .repositories
            .account()
            .rename(account_id, account_name)
            .await?
            .ok_or_else(|| RecordError::not_found("Account", account_id))?;

        tracing::info!(account_id = %account_id, "Renamed account");
        Ok(account)
    }

    /// Deletes an account and returns what was removed.
    pub async fn delete(&self, account_id: Option<&str>) -> Result<Account, Error> {
        let account = self.get(account_id).await?;
        if !self
            .repositories
            .account()
            .delete(&account.account_id)
            .await?
        {
            return Err(RecordError::not_found("Account", account.account_id).into());
        }

        tracing::info!(account_id = %account.account_id, "Deleted account");
        Ok(account)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use crate::services::mock::MockRepositories;

    fn service() -> AccountService<MockRepositories> {
        AccountService::new(Arc::new(MockRepositories::default()))
    }

    #[tokio::test]
    async fn test_create_generates_id() {
        let service = service();
        let account = service
            .create(NewAccount {
                account_id: None,
                account_name: Some("  Acme Motors ".to_string()),
            })
            .await
            .unwrap();

        assert!(account.account_id.starts_with("ACM"));
        assert_eq!(account.account_name, "Acme Motors");
        assert_eq!(service.list().await.unwrap(), vec![account]);
    }

    #[tokio::test]
    async fn test_create_with_explicit_id() {
        let service = service();
        let new = || NewAccount {
            account_id: Some("ACME01".to_string()),
            account_name: Some("Acme".to_string()),
        };

        service.create(new()).await.unwrap();
        assert!(matches!(
            service.create(new()).await,
            Err(Error::Record(RecordError::AlreadyExists { .. }))
        ));
        assert!(matches!(
            service
                .create(NewAccount {
                    account_id: Some("WAY-TOO-LONG-ID".to_string()),
                    account_name: Some("Acme".to_string()),
                })
                .await,
            Err(Error::Validation(ValidationError::InvalidField(_)))
        ));
    }

    #[tokio::test]
    async fn test_create_requires_name() {
        let result = service().create(NewAccount::default()).await;
        assert!(matches!(
            result,
            Err(Error::Validation(ValidationError::MissingField(field))) if field == "account_name"
        ));
    }

    #[tokio::test]
    async fn test_get_rename_delete() {
        let service = service();
        let account = service
            .create(NewAccount {
                account_id: Some("ACM0001".to_string()),
                account_name: Some("Acme".to_string()),
            })
            .await
            .unwrap();

        assert_eq!(service.get(Some("ACM0001")).await.unwrap(), account);
        assert!(service.get(Some("NOPE")).await.unwrap_err().is_not_found());
        assert!(service.get(None).await.unwrap_err().is_validation_error());

        let renamed = service
            .rename(AccountUpdate {
                account_id: Some("ACM0001".to_string()),
                account_name: Some("Acme Holdings".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(renamed.account_name, "Acme Holdings");

        assert_eq!(service.delete(Some("ACM0001")).await.unwrap(), renamed);
        assert!(service.list().await.unwrap().is_empty());
    }
}
