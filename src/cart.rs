//! The customer cart: a pending-reservation overlay on server stock.
//!
//! Stock is authoritative on the server; the cart only holds quantities the
//! current session intends to order. Every availability read subtracts the
//! cart's own reservation from the last-known server stock, and every
//! installed snapshot re-validates the whole cart — the overlay's prior
//! validity is never trusted across a snapshot boundary, because another
//! customer or an admin edit can shrink stock at any moment.

use tracing::{debug, warn};

use crate::error::CartError;
use crate::model::MenuItem;
use crate::snapshot::InventorySnapshot;

/// One reserved line. Name and price are display copies captured at add
/// time; checkout sends only `item_id` and `quantity`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    pub item_id: u32,
    pub name: String,
    pub unit_price: u64,
    pub quantity: u32,
}

impl CartLine {
    pub fn line_total(&self) -> u64 {
        self.unit_price * u64::from(self.quantity)
    }
}

/// A non-fatal correction applied when a refreshed snapshot no longer covers
/// what the cart had reserved. Surfaced to the user as a notice, never as an
/// error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartAdjustment {
    Clamped {
        item_id: u32,
        name: String,
        from: u32,
        to: u32,
    },
    Removed {
        item_id: u32,
        name: String,
    },
}

/// The cart itself: at most one line per menu item, insertion order kept for
/// display. Owned by exactly one customer session.
#[derive(Debug, Clone, Default)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn quantity_of(&self, item_id: u32) -> u32 {
        self.lines
            .iter()
            .find(|line| line.item_id == item_id)
            .map(|line| line.quantity)
            .unwrap_or(0)
    }

    /// Server stock minus this cart's own pending reservation. What every
    /// view must display as "how many more can be added"; never negative.
    pub fn effective_remaining_stock(&self, item: &MenuItem) -> u32 {
        item.stock.saturating_sub(self.quantity_of(item.id))
    }

    /// Add one unit of `item`. A new line starts at quantity 1 and requires
    /// stock to be available; an existing line increments only while it is
    /// still below the server-reported stock.
    pub fn add(&mut self, item: &MenuItem) -> Result<(), CartError> {
        if let Some(line) = self.lines.iter_mut().find(|line| line.item_id == item.id) {
            if line.quantity < item.stock {
                line.quantity += 1;
                Ok(())
            } else {
                Err(CartError::StockExceeded {
                    name: item.name.clone(),
                })
            }
        } else if item.stock > 0 {
            self.lines.push(CartLine {
                item_id: item.id,
                name: item.name.clone(),
                unit_price: item.unit_price,
                quantity: 1,
            });
            Ok(())
        } else {
            Err(CartError::StockExceeded {
                name: item.name.clone(),
            })
        }
    }

    /// Change a line's quantity by `delta`. Any result outside
    /// `[1, stock]` makes the whole request a no-op — boundary under/overflow
    /// must never corrupt cart state. Unknown lines and items missing from
    /// the snapshot are also no-ops.
    pub fn adjust_quantity(&mut self, item_id: u32, delta: i64, snapshot: &InventorySnapshot) {
        let Some(line) = self.lines.iter_mut().find(|line| line.item_id == item_id) else {
            return;
        };
        let Some(item) = snapshot.get(item_id) else {
            return;
        };
        let new_quantity = i64::from(line.quantity) + delta;
        if new_quantity < 1 || new_quantity > i64::from(item.stock) {
            debug!(item_id, delta, "quantity adjustment out of range, ignoring");
            return;
        }
        line.quantity = new_quantity as u32;
    }

    /// Delete a line unconditionally.
    pub fn remove(&mut self, item_id: u32) {
        self.lines.retain(|line| line.item_id != item_id);
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn total_value(&self) -> u64 {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    pub fn total_item_count(&self) -> u32 {
        self.lines.iter().map(|line| line.quantity).sum()
    }

    /// Reconcile every line against a freshly installed snapshot: clamp any
    /// quantity above the refreshed stock down to it, removing the line when
    /// stock hit zero (or the item left the menu entirely). Returns the
    /// corrections made so they can be surfaced as notices.
    pub fn validate_against(&mut self, snapshot: &InventorySnapshot) -> Vec<CartAdjustment> {
        let mut adjustments = Vec::new();
        self.lines.retain_mut(|line| {
            let stock = snapshot.stock_of(line.item_id);
            if stock == 0 {
                adjustments.push(CartAdjustment::Removed {
                    item_id: line.item_id,
                    name: line.name.clone(),
                });
                false
            } else if line.quantity > stock {
                adjustments.push(CartAdjustment::Clamped {
                    item_id: line.item_id,
                    name: line.name.clone(),
                    from: line.quantity,
                    to: stock,
                });
                line.quantity = stock;
                true
            } else {
                true
            }
        });
        if !adjustments.is_empty() {
            warn!(
                count = adjustments.len(),
                "cart clamped to refreshed stock"
            );
        }
        adjustments
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::menu_item;

    fn snapshot(items: Vec<MenuItem>) -> InventorySnapshot {
        InventorySnapshot::new(items)
    }

    #[test]
    fn test_add_until_stock_exhausted() {
        let item = menu_item(1, "Nasi Goreng", 15_000, 3);
        let mut cart = Cart::new();

        cart.add(&item).unwrap();
        cart.add(&item).unwrap();
        cart.add(&item).unwrap();
        assert_eq!(cart.quantity_of(1), 3);

        let err = cart.add(&item).unwrap_err();
        assert_eq!(
            err,
            CartError::StockExceeded {
                name: "Nasi Goreng".into()
            }
        );
        assert_eq!(cart.quantity_of(1), 3);
    }

    #[test]
    fn test_add_sold_out_item_rejected() {
        let item = menu_item(2, "Es Teh", 5_000, 0);
        let mut cart = Cart::new();
        assert!(cart.add(&item).is_err());
        assert!(cart.is_empty());
    }

    #[test]
    fn test_adjust_quantity_clamps_to_noop() {
        let item = menu_item(1, "Kopi", 8_000, 4);
        let snap = snapshot(vec![item.clone()]);
        let mut cart = Cart::new();
        cart.add(&item).unwrap();

        // Below 1 and above stock are both ignored, not errors.
        cart.adjust_quantity(1, -1, &snap);
        assert_eq!(cart.quantity_of(1), 1);
        cart.adjust_quantity(1, 10, &snap);
        assert_eq!(cart.quantity_of(1), 1);

        cart.adjust_quantity(1, 3, &snap);
        assert_eq!(cart.quantity_of(1), 4);

        // Unknown item and unknown line are no-ops too.
        cart.adjust_quantity(99, 1, &snap);
        assert_eq!(cart.total_item_count(), 4);
    }

    #[test]
    fn test_effective_remaining_stock_never_negative() {
        let mut item = menu_item(1, "Bakso", 12_000, 5);
        let mut cart = Cart::new();
        cart.add(&item).unwrap();
        cart.add(&item).unwrap();
        assert_eq!(cart.effective_remaining_stock(&item), 3);

        // Stock fell under what the cart holds; remaining saturates at zero.
        item.stock = 1;
        assert_eq!(cart.effective_remaining_stock(&item), 0);
    }

    #[test]
    fn test_validate_clamps_to_refreshed_stock() {
        let item = menu_item(1, "Sate", 20_000, 5);
        let snap = snapshot(vec![item.clone()]);
        let mut cart = Cart::new();
        cart.add(&item).unwrap();
        cart.adjust_quantity(1, 1, &snap);
        assert_eq!(cart.quantity_of(1), 2);

        // Sold down to 1 elsewhere between ticks.
        let refreshed = snapshot(vec![menu_item(1, "Sate", 20_000, 1)]);
        let adjustments = cart.validate_against(&refreshed);
        assert_eq!(
            adjustments,
            vec![CartAdjustment::Clamped {
                item_id: 1,
                name: "Sate".into(),
                from: 2,
                to: 1,
            }]
        );
        assert_eq!(cart.quantity_of(1), 1);
    }

    #[test]
    fn test_validate_removes_sold_out_and_deleted_items() {
        let a = menu_item(1, "Sate", 20_000, 2);
        let b = menu_item(2, "Es Jeruk", 6_000, 2);
        let mut cart = Cart::new();
        cart.add(&a).unwrap();
        cart.add(&b).unwrap();

        // Item 1 sold out, item 2 deleted from the menu entirely.
        let refreshed = snapshot(vec![menu_item(1, "Sate", 20_000, 0)]);
        let adjustments = cart.validate_against(&refreshed);
        assert_eq!(adjustments.len(), 2);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_totals() {
        let a = menu_item(1, "Sate", 20_000, 5);
        let b = menu_item(2, "Es Jeruk", 6_000, 5);
        let snap = snapshot(vec![a.clone(), b.clone()]);
        let mut cart = Cart::new();
        cart.add(&a).unwrap();
        cart.adjust_quantity(1, 1, &snap);
        cart.add(&b).unwrap();

        assert_eq!(cart.total_value(), 2 * 20_000 + 6_000);
        assert_eq!(cart.total_item_count(), 3);

        cart.remove(1);
        assert_eq!(cart.total_value(), 6_000);
        cart.clear();
        assert!(cart.is_empty());
    }
}
