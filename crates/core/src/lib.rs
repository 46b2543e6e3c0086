//! `stockroom-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! the error model, string identifiers, the `Entity` trait and the form-field
//! map every write operation is parsed from.

pub mod entity;
pub mod error;
pub mod fields;
pub mod id;

pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use fields::FormFields;
pub use id::{LocationId, MovementId, ProductId};
