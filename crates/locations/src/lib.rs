//! Locations domain module: warehouses, bins, and other places stock can sit.

pub mod location;

pub use location::{Location, LocationEdit};
