//! Warehouse service: validation, storage and reporting wired together.
//!
//! A create first checks that its id is free, so a taken id is reported ahead
//! of any other field error. Every field is parsed before a store is written,
//! and the store's own uniqueness check settles concurrent creates.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::instrument;

use stockroom_core::{DomainError, Entity, FormFields, LocationId, MovementId, ProductId};
use stockroom_inventory::{balance_report, BalanceLine, Movement, MovementEdit};
use stockroom_locations::{Location, LocationEdit};
use stockroom_products::{Product, ProductEdit};

use crate::record_store::{InMemoryRecordStore, RecordStore, RecordStoreError, SqliteRecordStore};

pub type WarehouseResult<T> = Result<T, WarehouseError>;

/// Service-level error: domain rejections and storage failures, flattened.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WarehouseError {
    #[error("duplicate key: {0}")]
    DuplicateKey(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("store error: {0}")]
    Store(String),
}

impl From<DomainError> for WarehouseError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::DuplicateKey(msg) => Self::DuplicateKey(msg),
            DomainError::NotFound(msg) => Self::NotFound(msg),
            DomainError::InvalidInput(msg) => Self::InvalidInput(msg),
        }
    }
}

impl From<RecordStoreError> for WarehouseError {
    fn from(value: RecordStoreError) -> Self {
        match value {
            RecordStoreError::Duplicate { kind, id } => DomainError::duplicate_key(kind, id).into(),
            RecordStoreError::NotFound { kind, id } => DomainError::not_found(kind, id).into(),
            RecordStoreError::Storage(msg) => Self::Store(msg),
        }
    }
}

/// A product with every movement that references it, newest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductDetail {
    pub product: Product,
    pub movements: Vec<Movement>,
}

/// A location with every movement into or out of it, newest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocationDetail {
    pub location: Location,
    pub movements: Vec<Movement>,
}

/// Choices offered by the movement add/edit form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MovementFormOptions {
    pub products: Vec<Product>,
    pub locations: Vec<Location>,
}

type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Application service over the three record collections.
#[derive(Clone)]
pub struct Warehouse {
    products: Arc<dyn RecordStore<Product>>,
    locations: Arc<dyn RecordStore<Location>>,
    movements: Arc<dyn RecordStore<Movement>>,
    clock: Clock,
}

impl core::fmt::Debug for Warehouse {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Warehouse").finish_non_exhaustive()
    }
}

impl Warehouse {
    pub fn new(
        products: Arc<dyn RecordStore<Product>>,
        locations: Arc<dyn RecordStore<Location>>,
        movements: Arc<dyn RecordStore<Movement>>,
    ) -> Self {
        Self {
            products,
            locations,
            movements,
            clock: Arc::new(Utc::now),
        }
    }

    /// In-memory wiring (dev/test).
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(InMemoryRecordStore::<Product>::new()),
            Arc::new(InMemoryRecordStore::<Location>::new()),
            Arc::new(InMemoryRecordStore::<Movement>::new()),
        )
    }

    /// SQLite wiring: one pool backs all three collections.
    pub fn sqlite(store: SqliteRecordStore) -> Self {
        let store = Arc::new(store);
        Self::new(store.clone(), store.clone(), store)
    }

    /// Replace the clock used to stamp new movements.
    pub fn with_clock(mut self, clock: impl Fn() -> DateTime<Utc> + Send + Sync + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    // -------------------------
    // Products
    // -------------------------

    #[instrument(skip_all)]
    pub async fn create_product(&self, fields: &FormFields) -> WarehouseResult<Product> {
        let id = fields.parse_required::<ProductId>("product_id").inspect_err(log_rejected)?;
        ensure_absent(self.products.as_ref(), &id).await.inspect_err(log_rejected)?;
        let product = Product::from_fields(fields).inspect_err(log_rejected)?;
        self.products.insert(product.clone()).await.inspect_err(log_rejected)?;
        tracing::info!(product_id = %product.product_id, "product created");
        Ok(product)
    }

    #[instrument(skip_all, fields(product_id = %id))]
    pub async fn update_product(&self, id: &ProductId, fields: &FormFields) -> WarehouseResult<Product> {
        let mut product = self.products.get(id).await?;
        let edit = ProductEdit::from_fields(fields).inspect_err(log_rejected)?;
        product.apply_edit(edit);
        self.products.update(product.clone()).await?;
        tracing::info!("product updated");
        Ok(product)
    }

    pub async fn get_product(&self, id: &ProductId) -> WarehouseResult<Product> {
        Ok(self.products.get(id).await?)
    }

    pub async fn list_products(&self) -> WarehouseResult<Vec<Product>> {
        Ok(self.products.list().await?)
    }

    /// Product view: the product plus its movements, newest first.
    pub async fn product_detail(&self, id: &ProductId) -> WarehouseResult<ProductDetail> {
        let product = self.products.get(id).await?;
        let movements = self.movements_for_product(id).await?;
        Ok(ProductDetail { product, movements })
    }

    // -------------------------
    // Locations
    // -------------------------

    #[instrument(skip_all)]
    pub async fn create_location(&self, fields: &FormFields) -> WarehouseResult<Location> {
        let id = fields.parse_required::<LocationId>("location_id").inspect_err(log_rejected)?;
        ensure_absent(self.locations.as_ref(), &id).await.inspect_err(log_rejected)?;
        let location = Location::from_fields(fields).inspect_err(log_rejected)?;
        self.locations.insert(location.clone()).await.inspect_err(log_rejected)?;
        tracing::info!(location_id = %location.location_id, "location created");
        Ok(location)
    }

    #[instrument(skip_all, fields(location_id = %id))]
    pub async fn update_location(&self, id: &LocationId, fields: &FormFields) -> WarehouseResult<Location> {
        let mut location = self.locations.get(id).await?;
        let edit = LocationEdit::from_fields(fields).inspect_err(log_rejected)?;
        location.apply_edit(edit);
        self.locations.update(location.clone()).await?;
        tracing::info!("location updated");
        Ok(location)
    }

    pub async fn get_location(&self, id: &LocationId) -> WarehouseResult<Location> {
        Ok(self.locations.get(id).await?)
    }

    pub async fn list_locations(&self) -> WarehouseResult<Vec<Location>> {
        Ok(self.locations.list().await?)
    }

    /// Location view: the location plus movements where it is source or destination.
    pub async fn location_detail(&self, id: &LocationId) -> WarehouseResult<LocationDetail> {
        let location = self.locations.get(id).await?;
        let movements = self.movements_for_location(id).await?;
        Ok(LocationDetail { location, movements })
    }

    // -------------------------
    // Movements
    // -------------------------

    #[instrument(skip_all)]
    pub async fn create_movement(&self, fields: &FormFields) -> WarehouseResult<Movement> {
        let id = fields.parse_required::<MovementId>("movement_id").inspect_err(log_rejected)?;
        ensure_absent(self.movements.as_ref(), &id).await.inspect_err(log_rejected)?;
        let movement = Movement::from_fields(fields, (self.clock)()).inspect_err(log_rejected)?;
        self.movements.insert(movement.clone()).await.inspect_err(log_rejected)?;
        tracing::info!(
            movement_id = %movement.movement_id,
            product_id = %movement.product_id,
            qty = movement.qty,
            "movement recorded"
        );
        Ok(movement)
    }

    /// Edit a movement. An invalid edit leaves the stored movement untouched.
    #[instrument(skip_all, fields(movement_id = %id))]
    pub async fn update_movement(&self, id: &MovementId, fields: &FormFields) -> WarehouseResult<Movement> {
        let mut movement = self.movements.get(id).await?;
        let edit = MovementEdit::from_fields(fields).inspect_err(log_rejected)?;
        movement.apply_edit(edit);
        self.movements.update(movement.clone()).await?;
        tracing::info!("movement updated");
        Ok(movement)
    }

    pub async fn get_movement(&self, id: &MovementId) -> WarehouseResult<Movement> {
        Ok(self.movements.get(id).await?)
    }

    /// All movements, newest first.
    pub async fn list_movements(&self) -> WarehouseResult<Vec<Movement>> {
        let mut movements = self.movements.list().await?;
        newest_first(&mut movements);
        Ok(movements)
    }

    pub async fn movements_for_product(&self, id: &ProductId) -> WarehouseResult<Vec<Movement>> {
        let mut movements = self.movements.list().await?;
        movements.retain(|m| &m.product_id == id);
        newest_first(&mut movements);
        Ok(movements)
    }

    pub async fn movements_for_location(&self, id: &LocationId) -> WarehouseResult<Vec<Movement>> {
        let mut movements = self.movements.list().await?;
        movements.retain(|m| m.touches(id));
        newest_first(&mut movements);
        Ok(movements)
    }

    pub async fn movement_form_options(&self) -> WarehouseResult<MovementFormOptions> {
        Ok(MovementFormOptions {
            products: self.products.list().await?,
            locations: self.locations.list().await?,
        })
    }

    // -------------------------
    // Report
    // -------------------------

    /// Balance report, recomputed from the full movement set on every call.
    pub async fn balance_report(&self) -> WarehouseResult<Vec<BalanceLine>> {
        let movements = self.movements.list().await?;
        let products = self.products.list().await?;
        let locations = self.locations.list().await?;

        let report = balance_report(&movements, &products, &locations);
        tracing::debug!(movements = movements.len(), rows = report.len(), "balance report computed");
        Ok(report)
    }
}

/// Timestamp descending; equal timestamps fall back to id ascending.
fn newest_first(movements: &mut [Movement]) {
    movements.sort_by(|a, b| {
        b.timestamp
            .cmp(&a.timestamp)
            .then_with(|| a.movement_id.cmp(&b.movement_id))
    });
}

/// Reject a taken id before the remaining fields are validated. The store's
/// own check-and-insert still decides races.
async fn ensure_absent<V>(store: &dyn RecordStore<V>, id: &V::Id) -> WarehouseResult<()>
where
    V: Entity + Send + Sync + 'static,
{
    match store.get(id).await {
        Ok(_) => Err(RecordStoreError::duplicate::<V>(id).into()),
        Err(RecordStoreError::NotFound { .. }) => Ok(()),
        Err(e) => Err(e.into()),
    }
}

fn log_rejected<E: core::fmt::Display>(err: &E) {
    tracing::warn!(error = %err, "write rejected");
}
