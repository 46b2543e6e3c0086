use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockroom_core::{DomainError, DomainResult, Entity, FormFields, LocationId, MovementId, ProductId};

/// A recorded transfer of `qty` units of one product.
///
/// `from_location` set alone is an issue out of the network, `to_location`
/// alone a receipt into it, both set a transfer between two locations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movement {
    pub movement_id: MovementId,
    pub timestamp: DateTime<Utc>,
    pub product_id: ProductId,
    pub from_location: Option<LocationId>,
    pub to_location: Option<LocationId>,
    pub qty: i64,
}

/// Mutable movement fields, as submitted by the add/edit form.
///
/// Constructing one enforces the write-time rules, so a `MovementEdit` always
/// names at least one location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovementEdit {
    pub product_id: ProductId,
    pub from_location: Option<LocationId>,
    pub to_location: Option<LocationId>,
    pub qty: i64,
}

impl Movement {
    /// Parse a new movement from an add-form post, stamped with `timestamp`.
    pub fn from_fields(fields: &FormFields, timestamp: DateTime<Utc>) -> DomainResult<Self> {
        let movement_id = fields.parse_required::<MovementId>("movement_id")?;
        let edit = MovementEdit::from_fields(fields)?;
        Ok(Self {
            movement_id,
            timestamp,
            product_id: edit.product_id,
            from_location: edit.from_location,
            to_location: edit.to_location,
            qty: edit.qty,
        })
    }

    /// Replace the mutable fields. The identifier and timestamp are kept.
    pub fn apply_edit(&mut self, edit: MovementEdit) {
        self.product_id = edit.product_id;
        self.from_location = edit.from_location;
        self.to_location = edit.to_location;
        self.qty = edit.qty;
    }

    /// Whether this movement has `location` as its source or destination.
    pub fn touches(&self, location: &LocationId) -> bool {
        self.from_location.as_ref() == Some(location) || self.to_location.as_ref() == Some(location)
    }
}

impl MovementEdit {
    pub fn from_fields(fields: &FormFields) -> DomainResult<Self> {
        let product_id = fields.parse_required::<ProductId>("product_id")?;
        let from_location = fields.parse_optional::<LocationId>("from_location")?;
        let to_location = fields.parse_optional::<LocationId>("to_location")?;
        let qty = fields.parse_required::<i64>("qty")?;

        Self::new(product_id, from_location, to_location, qty)
    }

    pub fn new(
        product_id: ProductId,
        from_location: Option<LocationId>,
        to_location: Option<LocationId>,
        qty: i64,
    ) -> DomainResult<Self> {
        if from_location.is_none() && to_location.is_none() {
            return Err(DomainError::invalid_input(
                "at least one location (from or to) must be specified",
            ));
        }
        Ok(Self {
            product_id,
            from_location,
            to_location,
            qty,
        })
    }
}

impl Entity for Movement {
    type Id = MovementId;
    const KIND: &'static str = "movement";

    fn id(&self) -> &MovementId {
        &self.movement_id
    }
}
