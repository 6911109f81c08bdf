use async_trait::async_trait;
use dealerdesk_core::{Account, Error, error::RecordError, repositories::AccountRepository};
use sqlx::SqlitePool;

use crate::storage_error;

#[derive(Debug, sqlx::FromRow)]
struct SqliteAccount {
    account_id: String,
    account_name: String,
}

impl From<SqliteAccount> for Account {
    fn from(row: SqliteAccount) -> Self {
        Account {
            account_id: row.account_id,
            account_name: row.account_name,
        }
    }
}

pub struct SqliteAccountRepository {
    pool: SqlitePool,
}

impl SqliteAccountRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountRepository for SqliteAccountRepository {
    async fn create(&self, account: &Account) -> Result<Account, Error> {
        if self.find_by_id(&account.account_id).await?.is_some() {
            return Err(RecordError::AlreadyExists {
                entity: "Account",
                key: account.account_id.clone(),
            }
            .into());
        }

        let row = sqlx::query_as::<_, SqliteAccount>(
            "INSERT INTO accounts (account_id, account_name) VALUES (?1, ?2) RETURNING *",
        )
        .bind(&account.account_id)
        .bind(&account.account_name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| storage_error("Failed to create account", e))?;

        Ok(row.into())
    }

    async fn find_by_id(&self, account_id: &str) -> Result<Option<Account>, Error> {
        let row = sqlx::query_as::<_, SqliteAccount>("SELECT * FROM accounts WHERE account_id = ?1")
            .bind(account_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| storage_error("Failed to fetch account", e))?;

        Ok(row.map(Into::into))
    }

    async fn find_by_name(&self, account_name: &str) -> Result<Option<Account>, Error> {
        let row = sqlx::query_as::<_, SqliteAccount>(
            "SELECT * FROM accounts WHERE account_name = ?1 ORDER BY rowid LIMIT 1",
        )
        .bind(account_name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| storage_error("Failed to fetch account", e))?;

        Ok(row.map(Into::into))
    }

    async fn list(&self) -> Result<Vec<Account>, Error> {
        let rows = sqlx::query_as::<_, SqliteAccount>("SELECT * FROM accounts ORDER BY rowid")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| storage_error("Failed to list accounts", e))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn rename(&self, account_id: &str, account_name: &str) -> Result<Option<Account>, Error> {
        let row = sqlx::query_as::<_, SqliteAccount>(
            "UPDATE accounts SET account_name = ?2 WHERE account_id = ?1 RETURNING *",
        )
        .bind(account_id)
        .bind(account_name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| storage_error("Failed to rename account", e))?;

        Ok(row.map(Into::into))
    }

    async fn delete(&self, account_id: &str) -> Result<bool, Error> {
        let result = sqlx::query("DELETE FROM accounts WHERE account_id = ?1")
            .bind(account_id)
            .execute(&self.pool)
            .await
            .map_err(|e| storage_error("Failed to delete account", e))?;

        Ok(result.rows_affected() > 0)
    }
}
