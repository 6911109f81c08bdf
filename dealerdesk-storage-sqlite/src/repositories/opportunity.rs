use async_trait::async_trait;
use chrono::NaiveDateTime;
use dealerdesk_core::{
    Error, Opportunity,
    error::RecordError,
    opportunity::{CurrencyConversions, OpportunityMatch, OpportunitySearch},
    repositories::OpportunityRepository,
};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::storage_error;

#[derive(Debug, sqlx::FromRow)]
struct SqliteOpportunity {
    opportunity_id: String,
    opportunity_name: String,
    account_id: String,
    account_name: String,
    close_date: Option<NaiveDateTime>,
    amount: Option<f64>,
    description: Option<String>,
    dealer_id: String,
    dealer_code: String,
    stage: String,
    probability: Option<i64>,
    next_step: Option<String>,
    created_date: NaiveDateTime,
    amount_in_words: Option<String>,
    usd: Option<f64>,
    aud: Option<f64>,
    cad: Option<f64>,
    jpy: Option<f64>,
    eur: Option<f64>,
    gbp: Option<f64>,
    cny: Option<f64>,
    vehicle_model_id: Option<String>,
    vehicle_model: Option<String>,
    vehicle_year: Option<i64>,
    vehicle_color: Option<String>,
}

impl From<SqliteOpportunity> for Opportunity {
    fn from(row: SqliteOpportunity) -> Self {
        Opportunity {
            opportunity_id: row.opportunity_id,
            opportunity_name: row.opportunity_name,
            account_id: row.account_id,
            account_name: row.account_name,
            close_date: row.close_date,
            amount: row.amount,
            description: row.description,
            dealer_id: row.dealer_id,
            dealer_code: row.dealer_code,
            stage: row.stage,
            probability: row.probability,
            next_step: row.next_step,
            created_date: row.created_date,
            amount_in_words: row.amount_in_words,
            currency_conversions: CurrencyConversions {
                usd: row.usd,
                aud: row.aud,
                cad: row.cad,
                jpy: row.jpy,
                eur: row.eur,
                gbp: row.gbp,
                cny: row.cny,
            },
            vehicle_model_id: row.vehicle_model_id,
            vehicle_model: row.vehicle_model,
            vehicle_year: row.vehicle_year,
            vehicle_color: row.vehicle_color,
        }
    }
}

fn push_match(query: &mut QueryBuilder<'_, Sqlite>, criteria: &OpportunityMatch) {
    if let Some(id) = &criteria.opportunity_id {
        query.push(" AND opportunity_id = ").push_bind(id.clone());
    }
    if let Some(account) = &criteria.account_name {
        query.push(" AND account_name = ").push_bind(account.clone());
    }
    if let Some(dealer_id) = &criteria.dealer_id {
        query.push(" AND dealer_id = ").push_bind(dealer_id.clone());
    }
    if let Some(code) = &criteria.dealer_code {
        query.push(" AND dealer_code = ").push_bind(code.clone());
    }
    if let Some(name) = &criteria.opportunity_name {
        query.push(" AND opportunity_name = ").push_bind(name.clone());
    }
    if let Some(stage) = &criteria.stage {
        query.push(" AND stage = ").push_bind(stage.clone());
    }
    if let Some(probability) = criteria.probability {
        query.push(" AND probability = ").push_bind(probability);
    }
    if let Some(close_date) = criteria.close_date {
        query.push(" AND close_date = ").push_bind(close_date);
    }
}

pub struct SqliteOpportunityRepository {
    pool: SqlitePool,
}

impl SqliteOpportunityRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OpportunityRepository for SqliteOpportunityRepository {
    async fn create(&self, opportunity: &Opportunity) -> Result<Opportunity, Error> {
        let conversions = &opportunity.currency_conversions;
        let row = sqlx::query_as::<_, SqliteOpportunity>(
            r#"
            INSERT INTO opportunities (
                opportunity_id, opportunity_name, account_id, account_name, close_date,
                amount, description, dealer_id, dealer_code, stage, probability, next_step,
                created_date, amount_in_words, usd, aud, cad, jpy, eur, gbp, cny,
                vehicle_model_id, vehicle_model, vehicle_year, vehicle_color
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16,
                    ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24, ?25)
            RETURNING *
            "#,
        )
        .bind(&opportunity.opportunity_id)
        .bind(&opportunity.opportunity_name)
        .bind(&opportunity.account_id)
        .bind(&opportunity.account_name)
        .bind(opportunity.close_date)
        .bind(opportunity.amount)
        .bind(&opportunity.description)
        .bind(&opportunity.dealer_id)
        .bind(&opportunity.dealer_code)
        .bind(&opportunity.stage)
        .bind(opportunity.probability)
        .bind(&opportunity.next_step)
        .bind(opportunity.created_date)
        .bind(&opportunity.amount_in_words)
        .bind(conversions.usd)
        .bind(conversions.aud)
        .bind(conversions.cad)
        .bind(conversions.jpy)
        .bind(conversions.eur)
        .bind(conversions.gbp)
        .bind(conversions.cny)
        .bind(&opportunity.vehicle_model_id)
        .bind(&opportunity.vehicle_model)
        .bind(opportunity.vehicle_year)
        .bind(&opportunity.vehicle_color)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| storage_error("Failed to create opportunity", e))?;

        Ok(row.into())
    }

    async fn find_by_id(&self, opportunity_id: &str) -> Result<Option<Opportunity>, Error> {
        let row = sqlx::query_as::<_, SqliteOpportunity>(
            "SELECT * FROM opportunities WHERE opportunity_id = ?1",
        )
        .bind(opportunity_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| storage_error("Failed to fetch opportunity", e))?;

        Ok(row.map(Into::into))
    }

    async fn search(&self, search: &OpportunitySearch) -> Result<Vec<Opportunity>, Error> {
        let mut query = QueryBuilder::<Sqlite>::new("SELECT * FROM opportunities WHERE 1 = 1");
        if let Some(id) = &search.opportunity_id {
            query.push(" AND opportunity_id = ").push_bind(id.clone());
        }
        if let Some(name) = &search.name_contains {
            query
                .push(" AND opportunity_name LIKE '%' || ")
                .push_bind(name.clone())
                .push(" || '%'");
        }
        if let Some(account) = &search.account_contains {
            query
                .push(" AND account_name LIKE '%' || ")
                .push_bind(account.clone())
                .push(" || '%'");
        }
        if let Some(stage) = &search.stage {
            query.push(" AND stage = ").push_bind(stage.clone());
        }
        if let Some(min) = search.probability_min {
            query.push(" AND probability >= ").push_bind(min);
        }
        if let Some(max) = search.probability_max {
            query.push(" AND probability <= ").push_bind(max);
        }
        if let Some(from) = search.created_from {
            query.push(" AND created_date >= ").push_bind(from);
        }
        if let Some(to) = search.created_to {
            query.push(" AND created_date <= ").push_bind(to);
        }
        query.push(" ORDER BY created_date DESC, rowid DESC");

        let rows = query
            .build_query_as::<SqliteOpportunity>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| storage_error("Failed to search opportunities", e))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn update(&self, opportunity: &Opportunity) -> Result<Opportunity, Error> {
        let conversions = &opportunity.currency_conversions;
        let row = sqlx::query_as::<_, SqliteOpportunity>(
            r#"
            UPDATE opportunities
            SET opportunity_name = ?2, close_date = ?3, amount = ?4, description = ?5,
                stage = ?6, probability = ?7, next_step = ?8, amount_in_words = ?9,
                usd = ?10, aud = ?11, cad = ?12, jpy = ?13, eur = ?14, gbp = ?15, cny = ?16,
                vehicle_color = ?17
            WHERE opportunity_id = ?1
            RETURNING *
            "#,
        )
        .bind(&opportunity.opportunity_id)
        .bind(&opportunity.opportunity_name)
        .bind(opportunity.close_date)
        .bind(opportunity.amount)
        .bind(&opportunity.description)
        .bind(&opportunity.stage)
        .bind(opportunity.probability)
        .bind(&opportunity.next_step)
        .bind(&opportunity.amount_in_words)
        .bind(conversions.usd)
        .bind(conversions.aud)
        .bind(conversions.cad)
        .bind(conversions.jpy)
        .bind(conversions.eur)
        .bind(conversions.gbp)
        .bind(conversions.cny)
        .bind(&opportunity.vehicle_color)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| storage_error("Failed to update opportunity", e))?;

        row.map(Into::into).ok_or_else(|| {
            RecordError::not_found("Opportunity", opportunity.opportunity_id.clone()).into()
        })
    }

    async fn delete_matching(
        &self,
        criteria: &OpportunityMatch,
    ) -> Result<Vec<Opportunity>, Error> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| storage_error("Failed to start transaction", e))?;

        let mut select = QueryBuilder::<Sqlite>::new("SELECT * FROM opportunities WHERE 1 = 1");
        push_match(&mut select, criteria);
        select.push(" ORDER BY rowid");
        let rows = select
            .build_query_as::<SqliteOpportunity>()
            .fetch_all(&mut *tx)
            .await
            .map_err(|e| storage_error("Failed to find opportunities", e))?;

        let mut delete = QueryBuilder::<Sqlite>::new("DELETE FROM opportunities WHERE 1 = 1");
        push_match(&mut delete, criteria);
        delete
            .build()
            .execute(&mut *tx)
            .await
            .map_err(|e| storage_error("Failed to delete opportunities", e))?;

        tx.commit()
            .await
            .map_err(|e| storage_error("Failed to commit transaction", e))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::{
        account::SqliteAccountRepository, dealer::SqliteDealerRepository,
    };
    use crate::test_support::pool;
    use dealerdesk_core::{
        Account, Dealer, datetime::parse_input_datetime,
        repositories::{AccountRepository, DealerRepository},
    };

    async fn seeded() -> SqliteOpportunityRepository {
        let pool = pool().await;
        SqliteAccountRepository::new(pool.clone())
            .create(&Account {
                account_id: "ACM0001".to_string(),
                account_name: "Acme Motors".to_string(),
            })
            .await
            .unwrap();
        SqliteDealerRepository::new(pool.clone())
            .create(&Dealer {
                dealer_id: "d-1".to_string(),
                dealer_code: "DLR01".to_string(),
                opportunity_owner: "Priya".to_string(),
            })
            .await
            .unwrap();
        SqliteOpportunityRepository::new(pool)
    }

    fn opportunity(id: &str, name: &str, probability: i64, created: &str) -> Opportunity {
        Opportunity {
            opportunity_id: id.to_string(),
            opportunity_name: name.to_string(),
            account_id: "ACM0001".to_string(),
            account_name: "Acme Motors".to_string(),
            close_date: Some(parse_input_datetime("2024-12-31 17:00:00").unwrap()),
            amount: Some(1000.0),
            description: None,
            dealer_id: "d-1".to_string(),
            dealer_code: "DLR01".to_string(),
            stage: "Prospecting".to_string(),
            probability: Some(probability),
            next_step: None,
            created_date: parse_input_datetime(created).unwrap(),
            amount_in_words: Some("1000.0".to_string()),
            currency_conversions: CurrencyConversions::from_amount(1000.0),
            vehicle_model_id: None,
            vehicle_model: None,
            vehicle_year: None,
            vehicle_color: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let repo = seeded().await;
        let created = repo
            .create(&opportunity("o-1", "Fleet deal", 10, "2024-09-01 09:00:00"))
            .await
            .unwrap();

        assert_eq!(created.currency_conversions.usd, Some(10000.0));
        assert_eq!(repo.find_by_id("o-1").await.unwrap(), Some(created));
    }

    #[tokio::test]
    async fn test_unknown_account_is_rejected() {
        let repo = seeded().await;
        let mut orphan = opportunity("o-1", "Orphan", 10, "2024-09-01 09:00:00");
        orphan.account_id = "NOPE".to_string();

        assert!(matches!(
            repo.create(&orphan).await,
            Err(Error::Storage(dealerdesk_core::error::StorageError::Constraint(_)))
        ));
    }

    #[tokio::test]
    async fn test_search_filters_and_orders_newest_first() {
        let repo = seeded().await;
        repo.create(&opportunity("o-1", "Fleet deal", 10, "2024-09-01 09:00:00"))
            .await
            .unwrap();
        repo.create(&opportunity("o-2", "Fleet renewal", 60, "2024-09-05 09:00:00"))
            .await
            .unwrap();
        repo.create(&opportunity("o-3", "Single car", 90, "2024-09-10 09:00:00"))
            .await
            .unwrap();

        let found = repo
            .search(&OpportunitySearch {
                name_contains: Some("Fleet".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        let ids: Vec<_> = found.iter().map(|o| o.opportunity_id.as_str()).collect();
        assert_eq!(ids, vec!["o-2", "o-1"]);

        let found = repo
            .search(&OpportunitySearch {
                probability_min: Some(50),
                created_to: Some(parse_input_datetime("2024-09-05 09:00:00").unwrap()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].opportunity_id, "o-2");
    }

    #[tokio::test]
    async fn test_update_overwrites_mutable_columns() {
        let repo = seeded().await;
        let mut stored = repo
            .create(&opportunity("o-1", "Fleet deal", 10, "2024-09-01 09:00:00"))
            .await
            .unwrap();

        stored.stage = "Closed Won".to_string();
        stored.probability = Some(100);
        stored.vehicle_color = Some("Red".to_string());
        let updated = repo.update(&stored).await.unwrap();
        assert_eq!(updated, stored);

        stored.opportunity_id = "o-404".to_string();
        assert!(repo.update(&stored).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_delete_matching_returns_deleted_rows() {
        let repo = seeded().await;
        repo.create(&opportunity("o-1", "Fleet deal", 10, "2024-09-01 09:00:00"))
            .await
            .unwrap();
        repo.create(&opportunity("o-2", "Fleet deal", 60, "2024-09-05 09:00:00"))
            .await
            .unwrap();

        let deleted = repo
            .delete_matching(&OpportunityMatch {
                opportunity_name: Some("Fleet deal".to_string()),
                probability: Some(60),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(deleted.len(), 1);
        assert_eq!(deleted[0].opportunity_id, "o-2");
        assert!(repo.find_by_id("o-2").await.unwrap().is_none());
        assert!(repo.find_by_id("o-1").await.unwrap().is_some());
    }
}
