//! Service visits, taxes and insurance policies of purchased vehicles.
//!
//! The `insert_*` helpers take a bare connection so the purchase repository
//! can write the first records inside its own transaction.

use async_trait::async_trait;
use chrono::NaiveDate;
use dealerdesk_core::{
    Error, Insurance, ServiceRecord, Tax,
    error::RecordError,
    repositories::{InsuranceRepository, ServiceRecordRepository, TaxRepository},
};
use sqlx::{SqliteConnection, SqlitePool};

use crate::storage_error;

#[derive(Debug, sqlx::FromRow)]
struct SqliteServiceRecord {
    service_id: String,
    vehicle_id: String,
    service_type: String,
    due_date: NaiveDate,
    kilometers_due: Option<i64>,
    is_free: bool,
}

impl From<SqliteServiceRecord> for ServiceRecord {
    fn from(row: SqliteServiceRecord) -> Self {
        ServiceRecord {
            service_id: row.service_id,
            vehicle_id: row.vehicle_id,
            service_type: row.service_type,
            due_date: row.due_date,
            kilometers_due: row.kilometers_due,
            is_free: row.is_free,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SqliteTax {
    tax_id: String,
    vehicle_id: String,
    tax_amount: f64,
    tax_type: String,
    due_date: NaiveDate,
}

impl From<SqliteTax> for Tax {
    fn from(row: SqliteTax) -> Self {
        Tax {
            tax_id: row.tax_id,
            vehicle_id: row.vehicle_id,
            tax_amount: row.tax_amount,
            tax_type: row.tax_type,
            due_date: row.due_date,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SqliteInsurance {
    insurance_id: String,
    vehicle_id: String,
    policy_number: String,
    provider: String,
    expiry_date: NaiveDate,
}

impl From<SqliteInsurance> for Insurance {
    fn from(row: SqliteInsurance) -> Self {
        Insurance {
            insurance_id: row.insurance_id,
            vehicle_id: row.vehicle_id,
            policy_number: row.policy_number,
            provider: row.provider,
            expiry_date: row.expiry_date,
        }
    }
}

pub(super) async fn insert_service(
    conn: &mut SqliteConnection,
    service: &ServiceRecord,
) -> Result<ServiceRecord, Error> {
    let row = sqlx::query_as::<_, SqliteServiceRecord>(
        r#"
        INSERT INTO vehicle_services (service_id, vehicle_id, service_type, due_date, kilometers_due, is_free)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        RETURNING *
        "#,
    )
    .bind(&service.service_id)
    .bind(&service.vehicle_id)
    .bind(&service.service_type)
    .bind(service.due_date)
    .bind(service.kilometers_due)
    .bind(service.is_free)
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| storage_error("Failed to create service", e))?;

    Ok(row.into())
}

pub(super) async fn insert_tax(conn: &mut SqliteConnection, tax: &Tax) -> Result<Tax, Error> {
    let row = sqlx::query_as::<_, SqliteTax>(
        r#"
        INSERT INTO taxes (tax_id, vehicle_id, tax_amount, tax_type, due_date)
        VALUES (?1, ?2, ?3, ?4, ?5)
        RETURNING *
        "#,
    )
    .bind(&tax.tax_id)
    .bind(&tax.vehicle_id)
    .bind(tax.tax_amount)
    .bind(&tax.tax_type)
    .bind(tax.due_date)
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| storage_error("Failed to create tax", e))?;

    Ok(row.into())
}

pub(super) async fn insert_insurance(
    conn: &mut SqliteConnection,
    insurance: &Insurance,
) -> Result<Insurance, Error> {
    let row = sqlx::query_as::<_, SqliteInsurance>(
        r#"
        INSERT INTO insurance (insurance_id, vehicle_id, policy_number, provider, expiry_date)
        VALUES (?1, ?2, ?3, ?4, ?5)
        RETURNING *
        "#,
    )
    .bind(&insurance.insurance_id)
    .bind(&insurance.vehicle_id)
    .bind(&insurance.policy_number)
    .bind(&insurance.provider)
    .bind(insurance.expiry_date)
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| storage_error("Failed to create insurance", e))?;

    Ok(row.into())
}

async fn delete_by_id(pool: &SqlitePool, statement: &str, id: &str, context: &str) -> Result<bool, Error> {
    let result = sqlx::query(statement)
        .bind(id)
        .execute(pool)
        .await
        .map_err(|e| storage_error(context, e))?;

    Ok(result.rows_affected() > 0)
}

pub struct SqliteServiceRecordRepository {
    pool: SqlitePool,
}

impl SqliteServiceRecordRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ServiceRecordRepository for SqliteServiceRecordRepository {
    async fn create(&self, service: &ServiceRecord) -> Result<ServiceRecord, Error> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| storage_error("Failed to start transaction", e))?;

        if service.is_free {
            let consumed = sqlx::query(
                r#"
                UPDATE purchased_vehicles
                SET free_services_left = free_services_left - 1
                WHERE vehicle_id = ?1 AND free_services_left > 0
                "#,
            )
            .bind(&service.vehicle_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| storage_error("Failed to consume free service", e))?
            .rows_affected();

            if consumed == 0 {
                let exists: bool = sqlx::query_scalar(
                    "SELECT EXISTS(SELECT 1 FROM purchased_vehicles WHERE vehicle_id = ?1)",
                )
                .bind(&service.vehicle_id)
                .fetch_one(&mut *tx)
                .await
                .map_err(|e| storage_error("Failed to fetch purchased vehicle", e))?;

                return Err(if exists {
                    RecordError::NoFreeServicesLeft(service.vehicle_id.clone()).into()
                } else {
                    RecordError::not_found("Purchased vehicle", service.vehicle_id.clone()).into()
                });
            }
        }

        let created = insert_service(&mut tx, service).await?;
        tx.commit()
            .await
            .map_err(|e| storage_error("Failed to commit transaction", e))?;

        Ok(created)
    }

    async fn list_for_vehicle(&self, vehicle_id: &str) -> Result<Vec<ServiceRecord>, Error> {
        let rows = sqlx::query_as::<_, SqliteServiceRecord>(
            "SELECT * FROM vehicle_services WHERE vehicle_id = ?1 ORDER BY due_date, rowid",
        )
        .bind(vehicle_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| storage_error("Failed to list services", e))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn delete(&self, service_id: &str) -> Result<bool, Error> {
        delete_by_id(
            &self.pool,
            "DELETE FROM vehicle_services WHERE service_id = ?1",
            service_id,
            "Failed to delete service",
        )
        .await
    }
}

pub struct SqliteTaxRepository {
    pool: SqlitePool,
}

impl SqliteTaxRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TaxRepository for SqliteTaxRepository {
    async fn create(&self, tax: &Tax) -> Result<Tax, Error> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| storage_error("Failed to acquire connection", e))?;
        insert_tax(&mut conn, tax).await
    }

    async fn list_for_vehicle(&self, vehicle_id: &str) -> Result<Vec<Tax>, Error> {
        let rows = sqlx::query_as::<_, SqliteTax>(
            "SELECT * FROM taxes WHERE vehicle_id = ?1 ORDER BY due_date, rowid",
        )
        .bind(vehicle_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| storage_error("Failed to list taxes", e))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn delete(&self, tax_id: &str) -> Result<bool, Error> {
        delete_by_id(
            &self.pool,
            "DELETE FROM taxes WHERE tax_id = ?1",
            tax_id,
            "Failed to delete tax",
        )
        .await
    }
}

pub struct SqliteInsuranceRepository {
    pool: SqlitePool,
}

impl SqliteInsuranceRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InsuranceRepository for SqliteInsuranceRepository {
    async fn create(&self, insurance: &Insurance) -> Result<Insurance, Error> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| storage_error("Failed to acquire connection", e))?;
        insert_insurance(&mut conn, insurance).await
    }

    async fn list_for_vehicle(&self, vehicle_id: &str) -> Result<Vec<Insurance>, Error> {
        let rows = sqlx::query_as::<_, SqliteInsurance>(
            "SELECT * FROM insurance WHERE vehicle_id = ?1 ORDER BY expiry_date, rowid",
        )
        .bind(vehicle_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| storage_error("Failed to list insurance", e))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn delete(&self, insurance_id: &str) -> Result<bool, Error> {
        delete_by_id(
            &self.pool,
            "DELETE FROM insurance WHERE insurance_id = ?1",
            insurance_id,
            "Failed to delete insurance",
        )
        .await
    }
}
