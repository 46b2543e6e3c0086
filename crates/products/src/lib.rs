//! Products domain module.
//!
//! This crate contains the product record and the rules for parsing it out of
//! a form post, implemented as deterministic domain logic (no IO, no HTTP, no
//! storage).

pub mod product;

pub use product::{Product, ProductEdit};
