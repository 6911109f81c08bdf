use async_trait::async_trait;

use crate::{Error, account::Account};

#[async_trait]
pub trait AccountRepository: Send + Sync + 'static {
    /// Inserts a new account. Fails with `RecordError::AlreadyExists` when the id is taken.
    async fn create(&self, account: &Account) -> Result<Account, Error>;

    async fn find_by_id(&self, account_id: &str) -> Result<Option<Account>, Error>;

    /// First account with exactly this name.
    async fn find_by_name(&self, account_name: &str) -> Result<Option<Account>, Error>;

    async fn list(&self) -> Result<Vec<Account>, Error>;

    /// Renames an account, returning the updated row if it exists.
    async fn rename(&self, account_id: &str, account_name: &str) -> Result<Option<Account>, Error>;

    /// Returns `false` when no account had this id.
    async fn delete(&self, account_id: &str) -> Result<bool, Error>;
}
