//! Balance aggregation: quantity-on-hand per product per location.
//!
//! Balances are derived, never stored. Every call recomputes from the full
//! movement set, so an edited movement is reflected immediately.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use stockroom_core::{LocationId, ProductId};
use stockroom_locations::Location;
use stockroom_products::Product;

use crate::movement::Movement;

/// One row of the balance report, keyed by display names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceLine {
    pub product: String,
    pub location: String,
    pub qty: i128,
}

/// Net quantity per (product, location) pair that appears in any movement.
///
/// Receipts add at `to_location`, issues subtract at `from_location`; a
/// transfer does both. The sum is order-independent. Pairs netting to zero
/// are kept here; the report drops them.
pub fn net_balances<'a>(
    movements: impl IntoIterator<Item = &'a Movement>,
) -> BTreeMap<(ProductId, LocationId), i128> {
    let mut balances: BTreeMap<(ProductId, LocationId), i128> = BTreeMap::new();

    for movement in movements {
        let qty = i128::from(movement.qty);

        if let Some(to) = &movement.to_location {
            *balances
                .entry((movement.product_id.clone(), to.clone()))
                .or_insert(0) += qty;
        }

        if let Some(from) = &movement.from_location {
            *balances
                .entry((movement.product_id.clone(), from.clone()))
                .or_insert(0) -= qty;
        }
    }

    balances
}

/// Build the balance report.
///
/// Zero balances are dropped. Names are resolved against `products` and
/// `locations`, falling back to the raw id for dangling references. Rows are
/// sorted by product name, then location name (byte-wise, case-sensitive).
pub fn balance_report(
    movements: &[Movement],
    products: &[Product],
    locations: &[Location],
) -> Vec<BalanceLine> {
    let product_names: HashMap<&ProductId, &str> = products
        .iter()
        .map(|p| (&p.product_id, p.name.as_str()))
        .collect();
    let location_names: HashMap<&LocationId, &str> = locations
        .iter()
        .map(|l| (&l.location_id, l.name.as_str()))
        .collect();

    let mut lines: Vec<BalanceLine> = net_balances(movements)
        .into_iter()
        .filter(|(_, qty)| *qty != 0)
        .map(|((product_id, location_id), qty)| BalanceLine {
            product: product_names
                .get(&product_id)
                .map(|name| name.to_string())
                .unwrap_or_else(|| product_id.into_inner()),
            location: location_names
                .get(&location_id)
                .map(|name| name.to_string())
                .unwrap_or_else(|| location_id.into_inner()),
            qty,
        })
        .collect();

    // Stable sort over id-ordered input keeps rows with equal names deterministic.
    lines.sort_by(|a, b| {
        a.product
            .cmp(&b.product)
            .then_with(|| a.location.cmp(&b.location))
    });

    lines
}
