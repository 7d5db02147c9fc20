//! Postgres-backed store implementation.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError |
//! |------------|----------------------|------------|
//! | Database (unique violation) | `23505` | `Conflict` |
//! | Database (foreign key violation) | `23503` | `Conflict` |
//! | Database (check constraint violation) | `23514` | `Conflict` |
//! | Database (other) | any other | `Database` |
//! | Anything else (pool closed, IO, TLS) | n/a | `Database` |
//!
//! ## Atomic stock writes
//!
//! - Upsert is one `INSERT .. ON CONFLICT (equipment_id, location_id) DO UPDATE`.
//! - Consumption is one `UPDATE .. WHERE quantity - $amount >= 0 RETURNING ..`;
//!   row-level locking serializes concurrent decrements on the same record,
//!   and the `CHECK (quantity >= 0)` constraint backs it up.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{FromRow, PgPool, Row, postgres::PgRow};
use tracing::{Span, instrument};

use equipstock_catalog::{EquipmentStatus, EquipmentType, NewEquipmentType};
use equipstock_core::{EquipmentTypeId, LocationId, StockRecordId};
use equipstock_stock::{StockLevels, StockRecord};

use super::{ConsumeOutcome, EquipmentRepository, StockRepository, StockUpsert, StoreError};

const CREATE_EQUIPMENT_TYPES: &str = r#"
    CREATE TABLE IF NOT EXISTS equipment_types (
        id SERIAL PRIMARY KEY,
        name VARCHAR(50) NOT NULL,
        description VARCHAR(100) NOT NULL,
        status VARCHAR(30) NOT NULL,
        acquired_on DATE NOT NULL,
        useful_life_years INTEGER
    )
"#;

const CREATE_STOCK_RECORDS: &str = r#"
    CREATE TABLE IF NOT EXISTS stock_records (
        id SERIAL PRIMARY KEY,
        equipment_id INTEGER NOT NULL REFERENCES equipment_types (id),
        location_id INTEGER NOT NULL,
        quantity INTEGER NOT NULL CHECK (quantity >= 0),
        min_threshold INTEGER NOT NULL,
        max_threshold INTEGER NOT NULL,
        updated_on DATE NOT NULL,
        UNIQUE (equipment_id, location_id)
    )
"#;

const EQUIPMENT_COLUMNS: &str =
    "id, name, description, status, acquired_on, useful_life_years";

const STOCK_COLUMNS: &str =
    "id, equipment_id, location_id, quantity, min_threshold, max_threshold, updated_on";

/// Postgres-backed store for catalog entries and stock records.
///
/// Uses the SQLx connection pool, which is `Send + Sync` and shared across
/// request tasks.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: Arc<PgPool>,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Connect and make sure both tables exist.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPool::connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        let store = Self::new(pool);
        store.ensure_schema().await?;
        Ok(store)
    }

    /// Create the tables if they do not exist yet. Idempotent.
    #[instrument(skip(self), err)]
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        for ddl in [CREATE_EQUIPMENT_TYPES, CREATE_STOCK_RECORDS] {
            sqlx::query(ddl)
                .execute(&*self.pool)
                .await
                .map_err(|e| map_sqlx_error("ensure_schema", e))?;
        }
        Ok(())
    }
}

#[async_trait]
impl EquipmentRepository for PostgresStore {
    #[instrument(skip(self, new), fields(name = %new.name()), err)]
    async fn insert(&self, new: NewEquipmentType) -> Result<EquipmentType, StoreError> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO equipment_types (name, description, status, acquired_on, useful_life_years)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {EQUIPMENT_COLUMNS}
            "#
        ))
        .bind(new.name())
        .bind(new.description())
        .bind(new.status().as_str())
        .bind(new.acquired_on())
        .bind(new.useful_life_years().map(i32::from))
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_equipment_type", e))?;

        equipment_from_row("insert_equipment_type", &row)
    }

    #[instrument(skip(self), fields(equipment_id = %id), err)]
    async fn find(&self, id: EquipmentTypeId) -> Result<Option<EquipmentType>, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {EQUIPMENT_COLUMNS} FROM equipment_types WHERE id = $1"
        ))
        .bind(id.get())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_equipment_type", e))?;

        row.map(|r| equipment_from_row("find_equipment_type", &r))
            .transpose()
    }

    #[instrument(
        skip(self, ids),
        fields(requested = ids.len(), found = tracing::field::Empty),
        err
    )]
    async fn find_many(&self, ids: &[EquipmentTypeId]) -> Result<Vec<EquipmentType>, StoreError> {
        let raw: Vec<i32> = ids.iter().map(|id| id.get()).collect();
        let rows = sqlx::query(&format!(
            "SELECT {EQUIPMENT_COLUMNS} FROM equipment_types WHERE id = ANY($1) ORDER BY id"
        ))
        .bind(raw)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_equipment_types", e))?;

        Span::current().record("found", rows.len());
        rows.iter()
            .map(|r| equipment_from_row("find_equipment_types", r))
            .collect()
    }

    #[instrument(skip(self), err)]
    async fn list(&self) -> Result<Vec<EquipmentType>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {EQUIPMENT_COLUMNS} FROM equipment_types ORDER BY id"
        ))
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_equipment_types", e))?;

        rows.iter()
            .map(|r| equipment_from_row("list_equipment_types", r))
            .collect()
    }
}

#[async_trait]
impl StockRepository for PostgresStore {
    #[instrument(skip(self), fields(stock_id = %id), err)]
    async fn find(&self, id: StockRecordId) -> Result<Option<StockRecord>, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {STOCK_COLUMNS} FROM stock_records WHERE id = $1"
        ))
        .bind(id.get())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_stock_record", e))?;

        row.map(|r| stock_from_row("find_stock_record", &r)).transpose()
    }

    #[instrument(skip(self), fields(equipment_id = %equipment_id, location_id = %location_id), err)]
    async fn find_by_pair(
        &self,
        equipment_id: EquipmentTypeId,
        location_id: LocationId,
    ) -> Result<Option<StockRecord>, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {STOCK_COLUMNS} FROM stock_records WHERE equipment_id = $1 AND location_id = $2"
        ))
        .bind(equipment_id.get())
        .bind(location_id.get())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_stock_by_pair", e))?;

        row.map(|r| stock_from_row("find_stock_by_pair", &r)).transpose()
    }

    #[instrument(skip(self), fields(location_id = %location_id), err)]
    async fn list_by_location(&self, location_id: LocationId) -> Result<Vec<StockRecord>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {STOCK_COLUMNS} FROM stock_records WHERE location_id = $1 ORDER BY id"
        ))
        .bind(location_id.get())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_stock_by_location", e))?;

        rows.iter()
            .map(|r| stock_from_row("list_stock_by_location", r))
            .collect()
    }

    #[instrument(
        skip(self, upsert),
        fields(
            equipment_id = %upsert.equipment_id,
            location_id = %upsert.location_id,
            quantity = upsert.levels.quantity()
        ),
        err
    )]
    async fn upsert(&self, upsert: StockUpsert) -> Result<StockRecord, StoreError> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO stock_records (
                equipment_id,
                location_id,
                quantity,
                min_threshold,
                max_threshold,
                updated_on
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (equipment_id, location_id)
            DO UPDATE SET
                quantity = EXCLUDED.quantity,
                min_threshold = EXCLUDED.min_threshold,
                max_threshold = EXCLUDED.max_threshold,
                updated_on = EXCLUDED.updated_on
            RETURNING {STOCK_COLUMNS}
            "#
        ))
        .bind(upsert.equipment_id.get())
        .bind(upsert.location_id.get())
        .bind(upsert.levels.quantity())
        .bind(upsert.levels.min_threshold())
        .bind(upsert.levels.max_threshold())
        .bind(upsert.updated_on)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("upsert_stock_record", e))?;

        stock_from_row("upsert_stock_record", &row)
    }

    #[instrument(skip(self), fields(stock_id = %id), err)]
    async fn consume(
        &self,
        id: StockRecordId,
        amount: i32,
        updated_on: NaiveDate,
    ) -> Result<ConsumeOutcome, StoreError> {
        let applied = sqlx::query(&format!(
            r#"
            UPDATE stock_records
            SET quantity = quantity - $2,
                updated_on = $3
            WHERE id = $1 AND quantity - $2 >= 0
            RETURNING {STOCK_COLUMNS}
            "#
        ))
        .bind(id.get())
        .bind(amount)
        .bind(updated_on)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("consume_stock", e))?;

        if let Some(row) = applied {
            return Ok(ConsumeOutcome::Applied(stock_from_row("consume_stock", &row)?));
        }

        // Nothing updated: either the record is gone or the guard refused.
        let available: Option<i32> =
            sqlx::query_scalar("SELECT quantity FROM stock_records WHERE id = $1")
                .bind(id.get())
                .fetch_optional(&*self.pool)
                .await
                .map_err(|e| map_sqlx_error("consume_stock", e))?;

        Ok(match available {
            Some(available) => ConsumeOutcome::Insufficient { available },
            None => ConsumeOutcome::Missing,
        })
    }
}

fn map_sqlx_error(operation: &'static str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let message = db_err.message().to_string();
            match db_err.code().as_deref() {
                Some("23505") | Some("23503") | Some("23514") => {
                    StoreError::Conflict { operation, message }
                }
                _ => StoreError::Database { operation, message },
            }
        }
        other => StoreError::Database {
            operation,
            message: other.to_string(),
        },
    }
}

// SQLx row types

#[derive(Debug)]
struct EquipmentRow {
    id: i32,
    name: String,
    description: String,
    status: String,
    acquired_on: NaiveDate,
    useful_life_years: Option<i32>,
}

impl<'r> FromRow<'r, PgRow> for EquipmentRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(EquipmentRow {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            status: row.try_get("status")?,
            acquired_on: row.try_get("acquired_on")?,
            useful_life_years: row.try_get("useful_life_years")?,
        })
    }
}

impl TryFrom<EquipmentRow> for EquipmentType {
    type Error = StoreError;

    fn try_from(row: EquipmentRow) -> Result<Self, Self::Error> {
        let status: EquipmentStatus = row
            .status
            .parse()
            .map_err(|e| StoreError::Corrupt(format!("equipment_types.id={}: {e}", row.id)))?;
        let useful_life_years = row
            .useful_life_years
            .map(u16::try_from)
            .transpose()
            .map_err(|e| StoreError::Corrupt(format!("equipment_types.id={}: {e}", row.id)))?;

        Ok(EquipmentType {
            id: EquipmentTypeId::new(row.id),
            name: row.name,
            description: row.description,
            status,
            acquired_on: row.acquired_on,
            useful_life_years,
        })
    }
}

fn equipment_from_row(operation: &'static str, row: &PgRow) -> Result<EquipmentType, StoreError> {
    let row = EquipmentRow::from_row(row).map_err(|e| map_sqlx_error(operation, e))?;
    EquipmentType::try_from(row)
}

#[derive(Debug)]
struct StockRow {
    id: i32,
    equipment_id: i32,
    location_id: i32,
    quantity: i32,
    min_threshold: i32,
    max_threshold: i32,
    updated_on: NaiveDate,
}

impl<'r> FromRow<'r, PgRow> for StockRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(StockRow {
            id: row.try_get("id")?,
            equipment_id: row.try_get("equipment_id")?,
            location_id: row.try_get("location_id")?,
            quantity: row.try_get("quantity")?,
            min_threshold: row.try_get("min_threshold")?,
            max_threshold: row.try_get("max_threshold")?,
            updated_on: row.try_get("updated_on")?,
        })
    }
}

fn stock_from_row(operation: &'static str, row: &PgRow) -> Result<StockRecord, StoreError> {
    let row = StockRow::from_row(row).map_err(|e| map_sqlx_error(operation, e))?;
    let levels = StockLevels::new(row.quantity, row.min_threshold, row.max_threshold)
        .map_err(|e| StoreError::Corrupt(format!("stock_records.id={}: {e}", row.id)))?;

    Ok(StockRecord {
        id: StockRecordId::new(row.id),
        equipment_id: EquipmentTypeId::new(row.equipment_id),
        location_id: LocationId::new(row.location_id),
        levels,
        updated_on: row.updated_on,
    })
}
