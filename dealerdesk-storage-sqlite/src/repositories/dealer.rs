use async_trait::async_trait;
use dealerdesk_core::{
    Dealer, Error,
    dealer::DealerFilter,
    error::RecordError,
    repositories::DealerRepository,
};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::storage_error;

#[derive(Debug, sqlx::FromRow)]
struct SqliteDealer {
    dealer_id: String,
    dealer_code: String,
    opportunity_owner: String,
}

impl From<SqliteDealer> for Dealer {
    fn from(row: SqliteDealer) -> Self {
        Dealer {
            dealer_id: row.dealer_id,
            dealer_code: row.dealer_code,
            opportunity_owner: row.opportunity_owner,
        }
    }
}

pub struct SqliteDealerRepository {
    pool: SqlitePool,
}

impl SqliteDealerRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DealerRepository for SqliteDealerRepository {
    async fn create(&self, dealer: &Dealer) -> Result<Dealer, Error> {
        let row = sqlx::query_as::<_, SqliteDealer>(
            r#"
            INSERT INTO dealers (dealer_id, dealer_code, opportunity_owner)
            VALUES (?1, ?2, ?3)
            RETURNING *
            "#,
        )
        .bind(&dealer.dealer_id)
        .bind(&dealer.dealer_code)
        .bind(&dealer.opportunity_owner)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| storage_error("Failed to create dealer", e))?;

        Ok(row.into())
    }

    async fn find_by_id(&self, dealer_id: &str) -> Result<Option<Dealer>, Error> {
        let row = sqlx::query_as::<_, SqliteDealer>("SELECT * FROM dealers WHERE dealer_id = ?1")
            .bind(dealer_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| storage_error("Failed to fetch dealer", e))?;

        Ok(row.map(Into::into))
    }

    async fn list(&self) -> Result<Vec<Dealer>, Error> {
        self.find(&DealerFilter::default()).await
    }

    async fn find(&self, filter: &DealerFilter) -> Result<Vec<Dealer>, Error> {
        let mut query = QueryBuilder::<Sqlite>::new("SELECT * FROM dealers WHERE 1 = 1");
        if let Some(id) = &filter.dealer_id {
            query.push(" AND dealer_id = ").push_bind(id);
        }
        if let Some(code) = &filter.dealer_code {
            query.push(" AND dealer_code = ").push_bind(code);
        }
        if let Some(owner) = &filter.opportunity_owner {
            query.push(" AND opportunity_owner = ").push_bind(owner);
        }
        query.push(" ORDER BY rowid");

        let rows = query
            .build_query_as::<SqliteDealer>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| storage_error("Failed to find dealers", e))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn update(&self, dealer: &Dealer) -> Result<Dealer, Error> {
        let row = sqlx::query_as::<_, SqliteDealer>(
            r#"
            UPDATE dealers
            SET dealer_code = ?2, opportunity_owner = ?3
            WHERE dealer_id = ?1
            RETURNING *
            "#,
        )
        .bind(&dealer.dealer_id)
        .bind(&dealer.dealer_code)
        .bind(&dealer.opportunity_owner)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| storage_error("Failed to update dealer", e))?;

        row.map(Into::into)
            .ok_or_else(|| RecordError::not_found("Dealer", dealer.dealer_id.clone()).into())
    }

    async fn delete_many(&self, dealer_ids: &[String]) -> Result<u64, Error> {
        if dealer_ids.is_empty() {
            return Ok(0);
        }

        let mut query = QueryBuilder::<Sqlite>::new("DELETE FROM dealers WHERE dealer_id IN (");
        let mut ids = query.separated(", ");
        for id in dealer_ids {
            ids.push_bind(id);
        }
        query.push(")");

        let result = query
            .build()
            .execute(&self.pool)
            .await
            .map_err(|e| storage_error("Failed to delete dealers", e))?;

        Ok(result.rows_affected())
    }
}
