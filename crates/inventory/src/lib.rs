//! Inventory domain module.
//!
//! This crate contains the stock movement record, its write-time validation,
//! and the balance aggregation that derives quantity-on-hand from the full
//! movement history. Everything here is deterministic (no IO, no storage).

pub mod balance;
pub mod movement;

pub use balance::{balance_report, net_balances, BalanceLine};
pub use movement::{Movement, MovementEdit};
