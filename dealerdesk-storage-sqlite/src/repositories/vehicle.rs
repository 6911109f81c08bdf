use async_trait::async_trait;
use dealerdesk_core::{
    Error, VehicleDetails,
    error::RecordError,
    repositories::VehicleRepository,
    vehicle::VehicleCriteria,
};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::storage_error;

#[derive(Debug, sqlx::FromRow)]
struct SqliteVehicleDetails {
    vehicle_model_id: String,
    vehicle_model: String,
    vehicle_year: i64,
    engine_type: Option<String>,
    transmission: Option<String>,
    fuel_type: Option<String>,
    body_type: Option<String>,
    warranty_period_years: Option<i64>,
    color: Option<String>,
    model_variant: Option<String>,
    tyre_company: Option<String>,
    tyre_size: Option<String>,
    start_type: Option<String>,
    sunroof_available: Option<bool>,
    gear_type: Option<String>,
    vehicle_type: Option<String>,
}

impl From<SqliteVehicleDetails> for VehicleDetails {
    fn from(row: SqliteVehicleDetails) -> Self {
        VehicleDetails {
            vehicle_model_id: row.vehicle_model_id,
            vehicle_model: row.vehicle_model,
            vehicle_year: row.vehicle_year,
            engine_type: row.engine_type,
            transmission: row.transmission,
            fuel_type: row.fuel_type,
            body_type: row.body_type,
            warranty_period_years: row.warranty_period_years,
            color: row.color,
            model_variant: row.model_variant,
            tyre_company: row.tyre_company,
            tyre_size: row.tyre_size,
            start_type: row.start_type,
            sunroof_available: row.sunroof_available,
            gear_type: row.gear_type,
            vehicle_type: row.vehicle_type,
        }
    }
}

fn push_criteria(query: &mut QueryBuilder<'_, Sqlite>, criteria: &VehicleCriteria) {
    if let Some(id) = &criteria.vehicle_model_id {
        query.push(" AND vehicle_model_id = ").push_bind(id.clone());
    }
    if let Some(model) = &criteria.vehicle_model {
        query.push(" AND vehicle_model = ").push_bind(model.clone());
    }
    if let Some(year) = criteria.vehicle_year {
        query.push(" AND vehicle_year = ").push_bind(year);
    }
    if let Some(fuel) = &criteria.fuel_type {
        query.push(" AND fuel_type = ").push_bind(fuel.clone());
    }
    if let Some(kind) = &criteria.vehicle_type {
        query.push(" AND vehicle_type = ").push_bind(kind.clone());
    }
}

pub struct SqliteVehicleRepository {
    pool: SqlitePool,
}

impl SqliteVehicleRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VehicleRepository for SqliteVehicleRepository {
    async fn create(&self, vehicle: &VehicleDetails) -> Result<VehicleDetails, Error> {
        let row = sqlx::query_as::<_, SqliteVehicleDetails>(
            r#"
            INSERT INTO vehicle_details (
                vehicle_model_id, vehicle_model, vehicle_year, engine_type, transmission,
                fuel_type, body_type, warranty_period_years, color, model_variant,
                tyre_company, tyre_size, start_type, sunroof_available, gear_type, vehicle_type
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)
            RETURNING *
            "#,
        )
        .bind(&vehicle.vehicle_model_id)
        .bind(&vehicle.vehicle_model)
        .bind(vehicle.vehicle_year)
        .bind(&vehicle.engine_type)
        .bind(&vehicle.transmission)
        .bind(&vehicle.fuel_type)
        .bind(&vehicle.body_type)
        .bind(vehicle.warranty_period_years)
        .bind(&vehicle.color)
        .bind(&vehicle.model_variant)
        .bind(&vehicle.tyre_company)
        .bind(&vehicle.tyre_size)
        .bind(&vehicle.start_type)
        .bind(vehicle.sunroof_available)
        .bind(&vehicle.gear_type)
        .bind(&vehicle.vehicle_type)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| storage_error("Failed to create vehicle", e))?;

        Ok(row.into())
    }

    async fn find_by_id(&self, vehicle_model_id: &str) -> Result<Option<VehicleDetails>, Error> {
        let row = sqlx::query_as::<_, SqliteVehicleDetails>(
            "SELECT * FROM vehicle_details WHERE vehicle_model_id = ?1",
        )
        .bind(vehicle_model_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| storage_error("Failed to fetch vehicle", e))?;

        Ok(row.map(Into::into))
    }

    async fn list(&self) -> Result<Vec<VehicleDetails>, Error> {
        let rows = sqlx::query_as::<_, SqliteVehicleDetails>(
            "SELECT * FROM vehicle_details ORDER BY rowid",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| storage_error("Failed to list vehicles", e))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn update(&self, vehicle: &VehicleDetails) -> Result<VehicleDetails, Error> {
        let row = sqlx::query_as::<_, SqliteVehicleDetails>(
            r#"
            UPDATE vehicle_details
            SET vehicle_model = ?2, vehicle_year = ?3, engine_type = ?4, transmission = ?5,
                fuel_type = ?6, body_type = ?7, warranty_period_years = ?8, color = ?9,
                model_variant = ?10, tyre_company = ?11, tyre_size = ?12, start_type = ?13,
                sunroof_available = ?14, gear_type = ?15, vehicle_type = ?16
            WHERE vehicle_model_id = ?1
            RETURNING *
            "#,
        )
        .bind(&vehicle.vehicle_model_id)
        .bind(&vehicle.vehicle_model)
        .bind(vehicle.vehicle_year)
        .bind(&vehicle.engine_type)
        .bind(&vehicle.transmission)
        .bind(&vehicle.fuel_type)
        .bind(&vehicle.body_type)
        .bind(vehicle.warranty_period_years)
        .bind(&vehicle.color)
        .bind(&vehicle.model_variant)
        .bind(&vehicle.tyre_company)
        .bind(&vehicle.tyre_size)
        .bind(&vehicle.start_type)
        .bind(vehicle.sunroof_available)
        .bind(&vehicle.gear_type)
        .bind(&vehicle.vehicle_type)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| storage_error("Failed to update vehicle", e))?;

        row.map(Into::into).ok_or_else(|| {
            RecordError::not_found("Vehicle", vehicle.vehicle_model_id.clone()).into()
        })
    }

    async fn delete_matching(
        &self,
        criteria: &VehicleCriteria,
    ) -> Result<Vec<VehicleDetails>, Error> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| storage_error("Failed to start transaction", e))?;

        let mut select = QueryBuilder::<Sqlite>::new("SELECT * FROM vehicle_details WHERE 1 = 1");
        push_criteria(&mut select, criteria);
        select.push(" ORDER BY rowid");
        let rows = select
            .build_query_as::<SqliteVehicleDetails>()
            .fetch_all(&mut *tx)
            .await
            .map_err(|e| storage_error("Failed to find vehicles", e))?;

        let mut delete = QueryBuilder::<Sqlite>::new("DELETE FROM vehicle_details WHERE 1 = 1");
        push_criteria(&mut delete, criteria);
        delete
            .build()
            .execute(&mut *tx)
            .await
            .map_err(|e| storage_error("Failed to delete vehicles", e))?;

        tx.commit()
            .await
            .map_err(|e| storage_error("Failed to commit transaction", e))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
