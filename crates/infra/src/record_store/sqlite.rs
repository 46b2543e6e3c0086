//! SQLite-backed record store.
//!
//! One table per entity kind. Uniqueness is the table primary key, so a
//! duplicate insert fails inside the database and is reported as
//! `RecordStoreError::Duplicate`.

use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use tracing::instrument;

use stockroom_core::{DomainError, Entity, LocationId, MovementId, ProductId};
use stockroom_inventory::Movement;
use stockroom_locations::Location;
use stockroom_products::Product;

use super::{RecordStore, RecordStoreError};

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS products (
        product_id  TEXT PRIMARY KEY NOT NULL,
        name        TEXT NOT NULL,
        description TEXT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS locations (
        location_id TEXT PRIMARY KEY NOT NULL,
        name        TEXT NOT NULL,
        address     TEXT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS movements (
        movement_id   TEXT PRIMARY KEY NOT NULL,
        timestamp     TEXT NOT NULL,
        product_id    TEXT NOT NULL,
        from_location TEXT NULL,
        to_location   TEXT NULL,
        qty           INTEGER NOT NULL
    )
    "#,
];

/// SQLite-backed store for all three record kinds.
///
/// `SqlitePool` is `Send + Sync` and cheap to clone, so one store value backs
/// the product, location and movement collections.
#[derive(Debug, Clone)]
pub struct SqliteRecordStore {
    pool: SqlitePool,
}

impl SqliteRecordStore {
    /// Connect to `database_url` and make sure the schema exists.
    pub async fn connect(database_url: &str) -> Result<Self, RecordStoreError> {
        let pool = SqlitePoolOptions::new()
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Self::from_pool(pool).await
    }

    /// Private in-memory database (one connection, so every query sees the same data).
    pub async fn in_memory() -> Result<Self, RecordStoreError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Self::from_pool(pool).await
    }

    pub async fn from_pool(pool: SqlitePool) -> Result<Self, RecordStoreError> {
        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    /// Create the tables if they do not exist yet.
    pub async fn migrate(&self) -> Result<(), RecordStoreError> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| map_sqlx_error("migrate", e))?;
        }
        Ok(())
    }
}

/// Map SQLx errors to RecordStoreError for a record of kind `V`.
fn map_write_error<V: Entity>(operation: &str, id: &V::Id, err: sqlx::Error) -> RecordStoreError {
    if is_unique_violation(&err) {
        return RecordStoreError::duplicate::<V>(id);
    }
    map_sqlx_error(operation, err)
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> RecordStoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            RecordStoreError::Storage(format!("database error in {}: {}", operation, db_err.message()))
        }
        sqlx::Error::PoolClosed => {
            RecordStoreError::Storage(format!("connection pool closed in {}", operation))
        }
        _ => RecordStoreError::Storage(format!("sqlx error in {}: {}", operation, err)),
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.is_unique_violation(),
        _ => false,
    }
}

fn decode_error(operation: &str, err: DomainError) -> RecordStoreError {
    RecordStoreError::Storage(format!("invalid stored row in {}: {}", operation, err))
}

fn product_from_row(row: &SqliteRow) -> Result<Product, RecordStoreError> {
    let id: String = row.try_get("product_id").map_err(|e| map_sqlx_error("decode product", e))?;
    Ok(Product {
        product_id: id.parse::<ProductId>().map_err(|e| decode_error("decode product", e))?,
        name: row.try_get("name").map_err(|e| map_sqlx_error("decode product", e))?,
        description: row
            .try_get("description")
            .map_err(|e| map_sqlx_error("decode product", e))?,
    })
}

fn location_from_row(row: &SqliteRow) -> Result<Location, RecordStoreError> {
    let id: String = row.try_get("location_id").map_err(|e| map_sqlx_error("decode location", e))?;
    Ok(Location {
        location_id: id.parse::<LocationId>().map_err(|e| decode_error("decode location", e))?,
        name: row.try_get("name").map_err(|e| map_sqlx_error("decode location", e))?,
        address: row.try_get("address").map_err(|e| map_sqlx_error("decode location", e))?,
    })
}

fn movement_from_row(row: &SqliteRow) -> Result<Movement, RecordStoreError> {
    let decode = |e: sqlx::Error| map_sqlx_error("decode movement", e);
    let movement_id: String = row.try_get("movement_id").map_err(decode)?;
    let product_id: String = row.try_get("product_id").map_err(decode)?;
    let from_location: Option<String> = row.try_get("from_location").map_err(decode)?;
    let to_location: Option<String> = row.try_get("to_location").map_err(decode)?;
    let timestamp: DateTime<Utc> = row.try_get("timestamp").map_err(decode)?;
    let qty: i64 = row.try_get("qty").map_err(decode)?;

    let parse_location = |raw: Option<String>| {
        raw.map(|l| l.parse::<LocationId>())
            .transpose()
            .map_err(|e| decode_error("decode movement", e))
    };

    Ok(Movement {
        movement_id: movement_id
            .parse::<MovementId>()
            .map_err(|e| decode_error("decode movement", e))?,
        timestamp,
        product_id: product_id
            .parse::<ProductId>()
            .map_err(|e| decode_error("decode movement", e))?,
        from_location: parse_location(from_location)?,
        to_location: parse_location(to_location)?,
        qty,
    })
}

#[async_trait::async_trait]
impl RecordStore<Product> for SqliteRecordStore {
    #[instrument(skip(self, record), fields(product_id = %record.product_id), err)]
    async fn insert(&self, record: Product) -> Result<(), RecordStoreError> {
        sqlx::query("INSERT INTO products (product_id, name, description) VALUES (?1, ?2, ?3)")
            .bind(record.product_id.as_str())
            .bind(&record.name)
            .bind(record.description.as_deref())
            .execute(&self.pool)
            .await
            .map_err(|e| map_write_error::<Product>("insert product", &record.product_id, e))?;
        Ok(())
    }

    async fn get(&self, id: &ProductId) -> Result<Product, RecordStoreError> {
        let row = sqlx::query("SELECT product_id, name, description FROM products WHERE product_id = ?1")
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get product", e))?;

        match row {
            Some(row) => product_from_row(&row),
            None => Err(RecordStoreError::not_found::<Product>(id)),
        }
    }

    async fn list(&self) -> Result<Vec<Product>, RecordStoreError> {
        let rows = sqlx::query("SELECT product_id, name, description FROM products ORDER BY product_id ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list products", e))?;
        rows.iter().map(product_from_row).collect()
    }

    #[instrument(skip(self, record), fields(product_id = %record.product_id), err)]
    async fn update(&self, record: Product) -> Result<(), RecordStoreError> {
        let result = sqlx::query("UPDATE products SET name = ?1, description = ?2 WHERE product_id = ?3")
            .bind(&record.name)
            .bind(record.description.as_deref())
            .bind(record.product_id.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("update product", e))?;

        if result.rows_affected() == 0 {
            return Err(RecordStoreError::not_found::<Product>(&record.product_id));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl RecordStore<Location> for SqliteRecordStore {
    #[instrument(skip(self, record), fields(location_id = %record.location_id), err)]
    async fn insert(&self, record: Location) -> Result<(), RecordStoreError> {
        sqlx::query("INSERT INTO locations (location_id, name, address) VALUES (?1, ?2, ?3)")
            .bind(record.location_id.as_str())
            .bind(&record.name)
            .bind(record.address.as_deref())
            .execute(&self.pool)
            .await
            .map_err(|e| map_write_error::<Location>("insert location", &record.location_id, e))?;
        Ok(())
    }

    async fn get(&self, id: &LocationId) -> Result<Location, RecordStoreError> {
        let row = sqlx::query("SELECT location_id, name, address FROM locations WHERE location_id = ?1")
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get location", e))?;

        match row {
            Some(row) => location_from_row(&row),
            None => Err(RecordStoreError::not_found::<Location>(id)),
        }
    }

    async fn list(&self) -> Result<Vec<Location>, RecordStoreError> {
        let rows = sqlx::query("SELECT location_id, name, address FROM locations ORDER BY location_id ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list locations", e))?;
        rows.iter().map(location_from_row).collect()
    }

    #[instrument(skip(self, record), fields(location_id = %record.location_id), err)]
    async fn update(&self, record: Location) -> Result<(), RecordStoreError> {
        let result = sqlx::query("UPDATE locations SET name = ?1, address = ?2 WHERE location_id = ?3")
            .bind(&record.name)
            .bind(record.address.as_deref())
            .bind(record.location_id.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("update location", e))?;

        if result.rows_affected() == 0 {
            return Err(RecordStoreError::not_found::<Location>(&record.location_id));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl RecordStore<Movement> for SqliteRecordStore {
    #[instrument(skip(self, record), fields(movement_id = %record.movement_id), err)]
    async fn insert(&self, record: Movement) -> Result<(), RecordStoreError> {
        sqlx::query(
            r#"
            INSERT INTO movements (movement_id, timestamp, product_id, from_location, to_location, qty)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(record.movement_id.as_str())
        .bind(record.timestamp)
        .bind(record.product_id.as_str())
        .bind(record.from_location.as_ref().map(LocationId::as_str))
        .bind(record.to_location.as_ref().map(LocationId::as_str))
        .bind(record.qty)
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error::<Movement>("insert movement", &record.movement_id, e))?;
        Ok(())
    }

    async fn get(&self, id: &MovementId) -> Result<Movement, RecordStoreError> {
        let row = sqlx::query(
            r#"
            SELECT movement_id, timestamp, product_id, from_location, to_location, qty
            FROM movements
            WHERE movement_id = ?1
            "#,
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("get movement", e))?;

        match row {
            Some(row) => movement_from_row(&row),
            None => Err(RecordStoreError::not_found::<Movement>(id)),
        }
    }

    async fn list(&self) -> Result<Vec<Movement>, RecordStoreError> {
        let rows = sqlx::query(
            r#"
            SELECT movement_id, timestamp, product_id, from_location, to_location, qty
            FROM movements
            ORDER BY movement_id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list movements", e))?;
        rows.iter().map(movement_from_row).collect()
    }

    #[instrument(skip(self, record), fields(movement_id = %record.movement_id), err)]
    async fn update(&self, record: Movement) -> Result<(), RecordStoreError> {
        let result = sqlx::query(
            r#"
            UPDATE movements
            SET product_id = ?1, from_location = ?2, to_location = ?3, qty = ?4
            WHERE movement_id = ?5
            "#,
        )
        .bind(record.product_id.as_str())
        .bind(record.from_location.as_ref().map(LocationId::as_str))
        .bind(record.to_location.as_ref().map(LocationId::as_str))
        .bind(record.qty)
        .bind(record.movement_id.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("update movement", e))?;

        if result.rows_affected() == 0 {
            return Err(RecordStoreError::not_found::<Movement>(&record.movement_id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use chrono::TimeZone;
    use stockroom_core::FormFields;

    async fn store() -> SqliteRecordStore {
        SqliteRecordStore::in_memory().await.unwrap()
    }

    fn movement(id: &str, from: Option<&str>, to: Option<&str>, qty: i64) -> Movement {
        Movement {
            movement_id: id.parse().unwrap(),
            timestamp: Utc.with_ymd_and_hms(2024, 5, 17, 14, 3, 9).unwrap(),
            product_id: "P1".parse().unwrap(),
            from_location: from.map(|l| l.parse().unwrap()),
            to_location: to.map(|l| l.parse().unwrap()),
            qty,
        }
    }

    #[tokio::test]
    async fn product_round_trips_through_sqlite() {
        let store = store().await;
        let product = Product::from_fields(
            &FormFields::new()
                .with("product_id", "P1")
                .with("name", "Widget")
                .with("description", "Blue"),
        )
        .unwrap();

        store.insert(product.clone()).await.unwrap();
        let fetched: Product = store.get(&product.product_id).await.unwrap();
        assert_eq!(fetched, product);
    }

    #[tokio::test]
    async fn duplicate_primary_key_maps_to_duplicate() {
        let store = store().await;
        let location = Location {
            location_id: "L1".parse().unwrap(),
            name: "Dock".to_string(),
            address: None,
        };

        store.insert(location.clone()).await.unwrap();
        let err = store.insert(location).await.unwrap_err();
        assert_eq!(
            err,
            RecordStoreError::Duplicate {
                kind: "location",
                id: "L1".to_string()
            }
        );

        let all: Vec<Location> = store.list().await.unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn movement_round_trips_including_optional_locations() {
        let store = store().await;
        let receipt = movement("M1", None, Some("L1"), 10);
        let transfer = movement("M2", Some("L1"), Some("L2"), 4);

        store.insert(receipt.clone()).await.unwrap();
        store.insert(transfer.clone()).await.unwrap();

        let listed: Vec<Movement> = store.list().await.unwrap();
        assert_eq!(listed, vec![receipt, transfer]);
    }

    #[tokio::test]
    async fn update_missing_movement_is_not_found() {
        let store = store().await;
        let err = RecordStore::<Movement>::update(&store, movement("M9", None, Some("L1"), 1))
            .await
            .unwrap_err();
        assert!(matches!(err, RecordStoreError::NotFound { kind: "movement", .. }));
    }

    #[tokio::test]
    async fn update_replaces_fields_but_not_timestamp() {
        let store = store().await;
        let original = movement("M1", None, Some("L1"), 5);
        store.insert(original.clone()).await.unwrap();

        let mut edited = original.clone();
        edited.to_location = Some("L2".parse().unwrap());
        edited.timestamp = Utc::now();
        store.update(edited).await.unwrap();

        let fetched: Movement = store.get(&original.movement_id).await.unwrap();
        assert_eq!(fetched.to_location, Some("L2".parse().unwrap()));
        assert_eq!(fetched.timestamp, original.timestamp);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_inserts_of_one_id_have_a_single_winner() {
        let store = Arc::new(store().await);

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                tokio::spawn(async move { store.insert(movement("M1", None, Some("L1"), i + 1)).await })
            })
            .collect();

        let mut wins = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(()) => wins += 1,
                Err(e) => assert!(matches!(e, RecordStoreError::Duplicate { kind: "movement", .. })),
            }
        }

        assert_eq!(wins, 1);
        let all: Vec<Movement> = store.list().await.unwrap();
        assert_eq!(all.len(), 1);
    }
}
