//! Dashboard statistics, derived from the inventory snapshot and the order
//! ledger. Pure computation with no independent state — recomputed freely on
//! every refresh tick.

use chrono::Datelike;

use crate::model::{Category, DashboardFigures, Order};
use crate::snapshot::InventorySnapshot;

/// Product counts per category, fed to the category chart.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CategorySplit {
    pub food: usize,
    pub drink: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DashboardStats {
    pub product_count: usize,
    pub order_count: usize,
    /// Revenue over ALL orders regardless of status: it reflects orders
    /// placed, not fulfilment. See DESIGN.md for the rationale.
    pub total_revenue: u64,
    /// Revenue bucketed by order month, Jan..Dec, zero-filled.
    pub monthly_revenue: [u64; 12],
    pub category_split: CategorySplit,
}

impl DashboardStats {
    /// Build stats from the service's own aggregate figures, with the
    /// category split (which the endpoint does not report) computed from the
    /// snapshot. The monthly series is padded or truncated to 12 buckets.
    pub fn from_figures(figures: DashboardFigures, snapshot: &InventorySnapshot) -> Self {
        let mut monthly_revenue = [0u64; 12];
        for (bucket, value) in monthly_revenue.iter_mut().zip(figures.monthly_revenue) {
            *bucket = value;
        }
        Self {
            product_count: figures.product_count,
            order_count: figures.order_count,
            total_revenue: figures.total_revenue,
            monthly_revenue,
            category_split: split_by_category(snapshot),
        }
    }
}

fn split_by_category(snapshot: &InventorySnapshot) -> CategorySplit {
    let mut split = CategorySplit::default();
    for item in snapshot.items() {
        match item.category {
            Category::Food => split.food += 1,
            Category::Drink => split.drink += 1,
        }
    }
    split
}

/// Aggregate stats locally from a snapshot and the order ledger's rows.
pub fn aggregate(snapshot: &InventorySnapshot, orders: &[Order]) -> DashboardStats {
    let mut monthly_revenue = [0u64; 12];
    let mut total_revenue = 0u64;
    for order in orders {
        total_revenue += order.amount;
        monthly_revenue[order.timestamp.month0() as usize] += order.amount;
    }

    DashboardStats {
        product_count: snapshot.len(),
        order_count: orders.len(),
        total_revenue,
        monthly_revenue,
        category_split: split_by_category(snapshot),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::{menu_item, order};
    use crate::model::{MenuItem, OrderStatus};

    fn drink(id: u32, name: &str) -> MenuItem {
        let mut item = menu_item(id, name, 5_000, 10);
        item.category = Category::Drink;
        item
    }

    #[test]
    fn test_empty_ledger() {
        let snapshot = InventorySnapshot::new(vec![
            menu_item(1, "Nasi Goreng", 15_000, 5),
            drink(2, "Es Teh"),
        ]);
        let stats = aggregate(&snapshot, &[]);
        assert_eq!(stats.product_count, 2);
        assert_eq!(stats.order_count, 0);
        assert_eq!(stats.total_revenue, 0);
        assert_eq!(stats.monthly_revenue, [0; 12]);
        assert_eq!(stats.category_split, CategorySplit { food: 1, drink: 1 });
    }

    #[test]
    fn test_revenue_counts_all_statuses_and_buckets_by_month() {
        let snapshot = InventorySnapshot::default();
        let orders = vec![
            order(1, OrderStatus::Pending, 15_000, 1),
            order(2, OrderStatus::Completed, 5_000, 1),
            order(3, OrderStatus::Pending, 8_000, 3),
        ];
        let stats = aggregate(&snapshot, &orders);
        assert_eq!(stats.order_count, 3);
        assert_eq!(stats.total_revenue, 28_000);
        assert_eq!(stats.monthly_revenue[0], 20_000);
        assert_eq!(stats.monthly_revenue[2], 8_000);
        assert_eq!(stats.monthly_revenue[5], 0);
    }

    #[test]
    fn test_from_figures_pads_series_and_splits_locally() {
        let snapshot = InventorySnapshot::new(vec![drink(1, "Kopi"), drink(2, "Es Jeruk")]);
        let figures = DashboardFigures {
            product_count: 2,
            order_count: 7,
            total_revenue: 99_000,
            monthly_revenue: vec![1, 2, 3],
        };
        let stats = DashboardStats::from_figures(figures, &snapshot);
        assert_eq!(stats.order_count, 7);
        assert_eq!(stats.monthly_revenue[..3], [1, 2, 3]);
        assert_eq!(stats.monthly_revenue[3..], [0; 9]);
        assert_eq!(stats.category_split, CategorySplit { food: 0, drink: 2 });
    }
}
