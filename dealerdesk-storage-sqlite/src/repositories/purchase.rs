use async_trait::async_trait;
use chrono::NaiveDateTime;
use dealerdesk_core::{
    Error, PurchasedVehicle,
    error::RecordError,
    purchase::{PurchaseFilter, PurchaseRecord},
    repositories::PurchaseRepository,
};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use super::aftercare::{insert_insurance, insert_service, insert_tax};
use crate::storage_error;

#[derive(Debug, sqlx::FromRow)]
struct SqlitePurchasedVehicle {
    vehicle_id: String,
    opportunity_id: String,
    vehicle_model_id: String,
    purchase_date: NaiveDateTime,
    vehicle_color: Option<String>,
    current_kilometers: i64,
    free_services_left: i64,
}

impl From<SqlitePurchasedVehicle> for PurchasedVehicle {
    fn from(row: SqlitePurchasedVehicle) -> Self {
        PurchasedVehicle {
            vehicle_id: row.vehicle_id,
            opportunity_id: row.opportunity_id,
            vehicle_model_id: row.vehicle_model_id,
            purchase_date: row.purchase_date,
            vehicle_color: row.vehicle_color,
            current_kilometers: row.current_kilometers,
            free_services_left: row.free_services_left,
        }
    }
}

pub struct SqlitePurchaseRepository {
    pool: SqlitePool,
}

impl SqlitePurchaseRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PurchaseRepository for SqlitePurchaseRepository {
    async fn record(&self, purchase: &PurchaseRecord) -> Result<(), Error> {
        let vehicle = &purchase.vehicle;
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| storage_error("Failed to start transaction", e))?;

        sqlx::query(
            r#"
            INSERT INTO purchased_vehicles (
                vehicle_id, opportunity_id, vehicle_model_id, purchase_date,
                vehicle_color, current_kilometers, free_services_left
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&vehicle.vehicle_id)
        .bind(&vehicle.opportunity_id)
        .bind(&vehicle.vehicle_model_id)
        .bind(vehicle.purchase_date)
        .bind(&vehicle.vehicle_color)
        .bind(vehicle.current_kilometers)
        .bind(vehicle.free_services_left)
        .execute(&mut *tx)
        .await
        .map_err(|e| storage_error("Failed to record purchase", e))?;

        insert_tax(&mut tx, &purchase.tax).await?;
        if let Some(insurance) = &purchase.insurance {
            insert_insurance(&mut tx, insurance).await?;
        }
        insert_service(&mut tx, &purchase.free_service).await?;

        tx.commit()
            .await
            .map_err(|e| storage_error("Failed to commit transaction", e))?;

        Ok(())
    }

    async fn find_by_id(&self, vehicle_id: &str) -> Result<Option<PurchasedVehicle>, Error> {
        let row = sqlx::query_as::<_, SqlitePurchasedVehicle>(
            "SELECT * FROM purchased_vehicles WHERE vehicle_id = ?1",
        )
        .bind(vehicle_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| storage_error("Failed to fetch purchased vehicle", e))?;

        Ok(row.map(Into::into))
    }

    async fn find(&self, filter: &PurchaseFilter) -> Result<Vec<PurchasedVehicle>, Error> {
        let mut query = QueryBuilder::<Sqlite>::new("SELECT * FROM purchased_vehicles WHERE 1 = 1");
        if let Some(id) = &filter.vehicle_id {
            query.push(" AND vehicle_id = ").push_bind(id);
        }
        if let Some(opportunity_id) = &filter.opportunity_id {
            query.push(" AND opportunity_id = ").push_bind(opportunity_id);
        }
        query.push(" ORDER BY purchase_date, rowid");

        let rows = query
            .build_query_as::<SqlitePurchasedVehicle>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| storage_error("Failed to find purchased vehicles", e))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn update(&self, vehicle: &PurchasedVehicle) -> Result<PurchasedVehicle, Error> {
        let row = sqlx::query_as::<_, SqlitePurchasedVehicle>(
            r#"
            UPDATE purchased_vehicles
            SET vehicle_color = ?2, current_kilometers = ?3
            WHERE vehicle_id = ?1
            RETURNING *
            "#,
        )
        .bind(&vehicle.vehicle_id)
        .bind(&vehicle.vehicle_color)
        .bind(vehicle.current_kilometers)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| storage_error("Failed to update purchased vehicle", e))?;

        row.map(Into::into).ok_or_else(|| {
            RecordError::not_found("Purchased vehicle", vehicle.vehicle_id.clone()).into()
        })
    }

    async fn delete(&self, vehicle_id: &str) -> Result<bool, Error> {
        let result = sqlx::query("DELETE FROM purchased_vehicles WHERE vehicle_id = ?1")
            .bind(vehicle_id)
            .execute(&self.pool)
            .await
            .map_err(|e| storage_error("Failed to delete purchased vehicle", e))?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::SqliteRepositoryProvider;
    use crate::test_support::pool;
    use chrono::NaiveDate;
    use dealerdesk_core::{
        Account, Dealer, Insurance, Opportunity, ServiceRecord, Tax, VehicleDetails,
        datetime::parse_input_datetime,
        opportunity::CurrencyConversions,
        repositories::{
            AccountRepository, AccountRepositoryProvider, DealerRepository,
            DealerRepositoryProvider, InsuranceRepository, InsuranceRepositoryProvider,
            OpportunityRepository, OpportunityRepositoryProvider, PurchaseRepositoryProvider,
            ServiceRecordRepository, ServiceRecordRepositoryProvider, TaxRepository,
            TaxRepositoryProvider, VehicleRepository, VehicleRepositoryProvider,
        },
    };

    fn date(value: &str) -> NaiveDate {
        NaiveDate::parse_from_str(value, "%Y-%m-%d").unwrap()
    }

    async fn seeded() -> SqliteRepositoryProvider {
        let repos = SqliteRepositoryProvider::new(pool().await);
        repos
            .account()
            .create(&Account {
                account_id: "ACM0001".to_string(),
                account_name: "Acme Motors".to_string(),
            })
            .await
            .unwrap();
        repos
            .dealer()
            .create(&Dealer {
                dealer_id: "d-1".to_string(),
                dealer_code: "DLR01".to_string(),
                opportunity_owner: "Priya".to_string(),
            })
            .await
            .unwrap();
        repos
            .vehicle()
            .create(&VehicleDetails {
                vehicle_model_id: "vm-1".to_string(),
                vehicle_model: "City".to_string(),
                vehicle_year: 2024,
                engine_type: None,
                transmission: None,
                fuel_type: Some("Petrol".to_string()),
                body_type: None,
                warranty_period_years: None,
                color: Some("White".to_string()),
                model_variant: None,
                tyre_company: None,
                tyre_size: None,
                start_type: None,
                sunroof_available: None,
                gear_type: None,
                vehicle_type: None,
            })
            .await
            .unwrap();
        repos
            .opportunity()
            .create(&Opportunity {
                opportunity_id: "o-1".to_string(),
                opportunity_name: "Fleet deal".to_string(),
                account_id: "ACM0001".to_string(),
                account_name: "Acme Motors".to_string(),
                close_date: None,
                amount: Some(1000.0),
                description: None,
                dealer_id: "d-1".to_string(),
                dealer_code: "DLR01".to_string(),
                stage: "Closed Won".to_string(),
                probability: Some(100),
                next_step: None,
                created_date: parse_input_datetime("2024-01-10 10:00:00").unwrap(),
                amount_in_words: None,
                currency_conversions: CurrencyConversions::default(),
                vehicle_model_id: Some("vm-1".to_string()),
                vehicle_model: Some("City".to_string()),
                vehicle_year: Some(2024),
                vehicle_color: None,
            })
            .await
            .unwrap();
        repos
    }

    fn purchase(vehicle_id: &str, free_services_left: i64) -> PurchaseRecord {
        PurchaseRecord {
            vehicle: PurchasedVehicle {
                vehicle_id: vehicle_id.to_string(),
                opportunity_id: "o-1".to_string(),
                vehicle_model_id: "vm-1".to_string(),
                purchase_date: parse_input_datetime("2024-01-15 11:30:00").unwrap(),
                vehicle_color: Some("Blue".to_string()),
                current_kilometers: 0,
                free_services_left,
            },
            tax: Tax {
                tax_id: format!("{vehicle_id}-tax"),
                vehicle_id: vehicle_id.to_string(),
                tax_amount: 15000.0,
                tax_type: "Road Tax".to_string(),
                due_date: date("2025-01-14"),
            },
            insurance: Some(Insurance {
                insurance_id: format!("{vehicle_id}-ins"),
                vehicle_id: vehicle_id.to_string(),
                policy_number: "POL-1".to_string(),
                provider: "Acko".to_string(),
                expiry_date: date("2025-01-14"),
            }),
            free_service: ServiceRecord {
                service_id: format!("{vehicle_id}-svc"),
                vehicle_id: vehicle_id.to_string(),
                service_type: "Free Service".to_string(),
                due_date: date("2024-07-13"),
                kilometers_due: Some(5000),
                is_free: true,
            },
        }
    }

    fn free_visit(vehicle_id: &str, service_id: &str) -> ServiceRecord {
        ServiceRecord {
            service_id: service_id.to_string(),
            vehicle_id: vehicle_id.to_string(),
            service_type: "Free Service".to_string(),
            due_date: date("2025-01-10"),
            kilometers_due: None,
            is_free: true,
        }
    }

    #[tokio::test]
    async fn test_record_writes_every_row() {
        let repos = seeded().await;
        repos.purchase().record(&purchase("veh-1", 2)).await.unwrap();

        let vehicle = repos.purchase().find_by_id("veh-1").await.unwrap().unwrap();
        assert_eq!(vehicle.free_services_left, 2);
        assert_eq!(repos.tax().list_for_vehicle("veh-1").await.unwrap().len(), 1);
        assert_eq!(repos.insurance().list_for_vehicle("veh-1").await.unwrap().len(), 1);
        let services = repos.service_record().list_for_vehicle("veh-1").await.unwrap();
        assert_eq!(services.len(), 1);
        assert!(services[0].is_free);
    }

    #[tokio::test]
    async fn test_failed_record_leaves_nothing_behind() {
        let repos = seeded().await;
        let mut record = purchase("veh-1", 2);
        record.tax.tax_amount = 0.0;

        assert!(repos.purchase().record(&record).await.is_err());
        assert!(repos.purchase().find_by_id("veh-1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_and_filter() {
        let repos = seeded().await;
        repos.purchase().record(&purchase("veh-1", 2)).await.unwrap();
        repos.purchase().record(&purchase("veh-2", 2)).await.unwrap();

        let mut vehicle = repos.purchase().find_by_id("veh-1").await.unwrap().unwrap();
        vehicle.current_kilometers = 4200;
        vehicle.vehicle_color = Some("Black".to_string());
        assert_eq!(repos.purchase().update(&vehicle).await.unwrap(), vehicle);

        let all = repos
            .purchase()
            .find(&PurchaseFilter {
                opportunity_id: Some("o-1".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn test_delete_cascades() {
        let repos = seeded().await;
        repos.purchase().record(&purchase("veh-1", 2)).await.unwrap();

        assert!(repos.purchase().delete("veh-1").await.unwrap());
        assert!(!repos.purchase().delete("veh-1").await.unwrap());
        assert!(repos.tax().list_for_vehicle("veh-1").await.unwrap().is_empty());
        assert!(repos.insurance().list_for_vehicle("veh-1").await.unwrap().is_empty());
        assert!(
            repos
                .service_record()
                .list_for_vehicle("veh-1")
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn test_free_visits_draw_down_allowance() {
        let repos = seeded().await;
        repos.purchase().record(&purchase("veh-1", 1)).await.unwrap();

        repos
            .service_record()
            .create(&free_visit("veh-1", "svc-2"))
            .await
            .unwrap();
        let vehicle = repos.purchase().find_by_id("veh-1").await.unwrap().unwrap();
        assert_eq!(vehicle.free_services_left, 0);

        let err = repos
            .service_record()
            .create(&free_visit("veh-1", "svc-3"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Record(RecordError::NoFreeServicesLeft(_))));
        assert_eq!(
            repos.service_record().list_for_vehicle("veh-1").await.unwrap().len(),
            2
        );

        let err = repos
            .service_record()
            .create(&free_visit("veh-404", "svc-4"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_paid_visit_keeps_allowance_and_deletes() {
        let repos = seeded().await;
        repos.purchase().record(&purchase("veh-1", 2)).await.unwrap();

        let mut paid = free_visit("veh-1", "svc-2");
        paid.is_free = false;
        paid.service_type = "Regular Maintenance".to_string();
        repos.service_record().create(&paid).await.unwrap();

        let vehicle = repos.purchase().find_by_id("veh-1").await.unwrap().unwrap();
        assert_eq!(vehicle.free_services_left, 2);

        assert!(repos.service_record().delete("svc-2").await.unwrap());
        assert!(repos.tax().delete("veh-1-tax").await.unwrap());
        assert!(repos.insurance().delete("veh-1-ins").await.unwrap());
        assert!(!repos.insurance().delete("veh-1-ins").await.unwrap());
    }
}
