use async_trait::async_trait;
use sqlx::{Sqlite, SqliteConnection};

use super::{Migration, Result};

/// A migration made of plain SQL statements run in order.
pub struct SchemaMigration {
    pub version: i64,
    pub name: &'static str,
    pub up: &'static [&'static str],
    pub down: &'static [&'static str],
}

async fn run_all(conn: &mut SqliteConnection, statements: &[&str]) -> Result<()> {
    for statement in statements {
        sqlx::query(statement).execute(&mut *conn).await?;
    }
    Ok(())
}

#[async_trait]
impl Migration<Sqlite> for SchemaMigration {
    async fn up<'a>(&'a self, conn: &'a mut SqliteConnection) -> Result<()> {
        run_all(conn, self.up).await
    }

    async fn down<'a>(&'a self, conn: &'a mut SqliteConnection) -> Result<()> {
        run_all(conn, self.down).await
    }

    fn version(&self) -> i64 {
        self.version
    }

    fn name(&self) -> &str {
        self.name
    }
}

pub const CREATE_ACCOUNTS_TABLE: SchemaMigration = SchemaMigration {
    version: 1,
    name: "CreateAccountsTable",
    up: &[r#"
        CREATE TABLE IF NOT EXISTS accounts (
            account_id TEXT PRIMARY KEY CHECK (length(account_id) <= 10),
            account_name TEXT NOT NULL
        )"#],
    down: &["DROP TABLE IF EXISTS accounts"],
};

pub const CREATE_DEALERS_TABLE: SchemaMigration = SchemaMigration {
    version: 2,
    name: "CreateDealersTable",
    up: &[r#"
        CREATE TABLE IF NOT EXISTS dealers (
            dealer_id TEXT PRIMARY KEY,
            dealer_code TEXT NOT NULL,
            opportunity_owner TEXT NOT NULL
        )"#],
    down: &["DROP TABLE IF EXISTS dealers"],
};

pub const CREATE_VEHICLE_DETAILS_TABLE: SchemaMigration = SchemaMigration {
    version: 3,
    name: "CreateVehicleDetailsTable",
    up: &[r#"
        CREATE TABLE IF NOT EXISTS vehicle_details (
            vehicle_model_id TEXT PRIMARY KEY,
            vehicle_model TEXT NOT NULL,
            vehicle_year INTEGER NOT NULL,
            engine_type TEXT,
            transmission TEXT,
            fuel_type TEXT,
            body_type TEXT,
            warranty_period_years INTEGER,
            color TEXT,
            model_variant TEXT,
            tyre_company TEXT,
            tyre_size TEXT,
            start_type TEXT,
            sunroof_available INTEGER,
            gear_type TEXT,
            vehicle_type TEXT
        )"#],
    down: &["DROP TABLE IF EXISTS vehicle_details"],
};

pub const CREATE_OPPORTUNITIES_TABLE: SchemaMigration = SchemaMigration {
    version: 4,
    name: "CreateOpportunitiesTable",
    up: &[r#"
        CREATE TABLE IF NOT EXISTS opportunities (
            opportunity_id TEXT PRIMARY KEY,
            opportunity_name TEXT NOT NULL,
            account_id TEXT NOT NULL REFERENCES accounts(account_id),
            account_name TEXT NOT NULL,
            close_date TEXT,
            amount REAL,
            description TEXT,
            dealer_id TEXT NOT NULL REFERENCES dealers(dealer_id),
            dealer_code TEXT NOT NULL,
            stage TEXT NOT NULL,
            probability INTEGER CHECK (probability BETWEEN 0 AND 100),
            next_step TEXT,
            created_date TEXT NOT NULL,
            amount_in_words TEXT,
            usd REAL,
            aud REAL,
            cad REAL,
            jpy REAL,
            eur REAL,
            gbp REAL,
            cny REAL,
            vehicle_model_id TEXT REFERENCES vehicle_details(vehicle_model_id),
            vehicle_model TEXT,
            vehicle_year INTEGER,
            vehicle_color TEXT
        )"#],
    down: &["DROP TABLE IF EXISTS opportunities"],
};

pub const CREATE_PURCHASE_TABLES: SchemaMigration = SchemaMigration {
    version: 5,
    name: "CreatePurchaseTables",
    up: &[
        r#"
        CREATE TABLE IF NOT EXISTS purchased_vehicles (
            vehicle_id TEXT PRIMARY KEY,
            opportunity_id TEXT NOT NULL REFERENCES opportunities(opportunity_id),
            vehicle_model_id TEXT NOT NULL REFERENCES vehicle_details(vehicle_model_id),
            purchase_date TEXT NOT NULL,
            vehicle_color TEXT,
            current_kilometers INTEGER NOT NULL CHECK (current_kilometers >= 0),
            free_services_left INTEGER NOT NULL CHECK (free_services_left >= 0)
        )"#,
        r#"
        CREATE TABLE IF NOT EXISTS vehicle_services (
            service_id TEXT PRIMARY KEY,
            vehicle_id TEXT NOT NULL REFERENCES purchased_vehicles(vehicle_id) ON DELETE CASCADE,
            service_type TEXT NOT NULL,
            due_date TEXT NOT NULL,
            kilometers_due INTEGER,
            is_free INTEGER NOT NULL DEFAULT 0
        )"#,
        r#"
        CREATE TABLE IF NOT EXISTS taxes (
            tax_id TEXT PRIMARY KEY,
            vehicle_id TEXT NOT NULL REFERENCES purchased_vehicles(vehicle_id) ON DELETE CASCADE,
            tax_amount REAL NOT NULL CHECK (tax_amount > 0),
            tax_type TEXT NOT NULL,
            due_date TEXT NOT NULL
        )"#,
        r#"
        CREATE TABLE IF NOT EXISTS insurance (
            insurance_id TEXT PRIMARY KEY,
            vehicle_id TEXT NOT NULL REFERENCES purchased_vehicles(vehicle_id) ON DELETE CASCADE,
            policy_number TEXT NOT NULL,
            provider TEXT NOT NULL,
            expiry_date TEXT NOT NULL
        )"#,
    ],
    down: &[
        "DROP TABLE IF EXISTS insurance",
        "DROP TABLE IF EXISTS taxes",
        "DROP TABLE IF EXISTS vehicle_services",
        "DROP TABLE IF EXISTS purchased_vehicles",
    ],
};

pub const CREATE_OTP_CODES_TABLE: SchemaMigration = SchemaMigration {
    version: 6,
    name: "CreateOtpCodesTable",
    up: &[r#"
        CREATE TABLE IF NOT EXISTS otp_codes (
            email TEXT PRIMARY KEY,
            code INTEGER NOT NULL,
            issued_at INTEGER NOT NULL
        )"#],
    down: &["DROP TABLE IF EXISTS otp_codes"],
};

pub const CREATE_INDEXES: SchemaMigration = SchemaMigration {
    version: 7,
    name: "CreateIndexes",
    up: &[
        "CREATE INDEX IF NOT EXISTS idx_opportunities_account_id ON opportunities(account_id)",
        "CREATE INDEX IF NOT EXISTS idx_opportunities_dealer_id ON opportunities(dealer_id)",
        "CREATE INDEX IF NOT EXISTS idx_opportunities_created_date ON opportunities(created_date)",
        "CREATE INDEX IF NOT EXISTS idx_purchased_vehicles_opportunity_id ON purchased_vehicles(opportunity_id)",
        "CREATE INDEX IF NOT EXISTS idx_vehicle_services_vehicle_id ON vehicle_services(vehicle_id)",
        "CREATE INDEX IF NOT EXISTS idx_taxes_vehicle_id ON taxes(vehicle_id)",
        "CREATE INDEX IF NOT EXISTS idx_insurance_vehicle_id ON insurance(vehicle_id)",
        "CREATE INDEX IF NOT EXISTS idx_otp_codes_issued_at ON otp_codes(issued_at)",
    ],
    down: &[
        "DROP INDEX IF EXISTS idx_otp_codes_issued_at",
        "DROP INDEX IF EXISTS idx_insurance_vehicle_id",
        "DROP INDEX IF EXISTS idx_taxes_vehicle_id",
        "DROP INDEX IF EXISTS idx_vehicle_services_vehicle_id",
        "DROP INDEX IF EXISTS idx_purchased_vehicles_opportunity_id",
        "DROP INDEX IF EXISTS idx_opportunities_created_date",
        "DROP INDEX IF EXISTS idx_opportunities_dealer_id",
        "DROP INDEX IF EXISTS idx_opportunities_account_id",
    ],
};

/// Every migration, oldest first.
pub fn all() -> Vec<Box<dyn Migration<Sqlite>>> {
    vec![
        Box::new(CREATE_ACCOUNTS_TABLE),
        Box::new(CREATE_DEALERS_TABLE),
        Box::new(CREATE_VEHICLE_DETAILS_TABLE),
        Box::new(CREATE_OPPORTUNITIES_TABLE),
        Box::new(CREATE_PURCHASE_TABLES),
        Box::new(CREATE_OTP_CODES_TABLE),
        Box::new(CREATE_INDEXES),
    ]
}
