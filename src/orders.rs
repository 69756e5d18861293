//! Admin-facing order ledger: a read model over `GET /api/pesanan` with the
//! two-state order lifecycle (Pending → Completed).
//!
//! The ledger never flips an order optimistically. After a confirmation is
//! accepted by the service, the displayed status comes from the next
//! refreshed read — if the server-side transition failed, the order must
//! keep showing as pending.

use tracing::{debug, info};

use crate::api::CafeApi;
use crate::error::ConfirmError;
use crate::model::{Order, OrderStatus};

/// Result of a confirm action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmOutcome {
    /// The service accepted the transition; re-read the ledger to see it.
    Updated,
    /// The order was already completed — confirming again is a no-op.
    AlreadyCompleted,
}

/// Read model of all orders, replaced wholesale on every refresh.
#[derive(Debug, Clone, Default)]
pub struct OrderLedger {
    orders: Vec<Order>,
}

impl OrderLedger {
    pub fn new(orders: Vec<Order>) -> Self {
        Self { orders }
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn get(&self, order_id: u32) -> Option<&Order> {
        self.orders.iter().find(|order| order.id == order_id)
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn pending_count(&self) -> usize {
        self.orders
            .iter()
            .filter(|order| order.status == OrderStatus::Pending)
            .count()
    }

    pub fn completed_count(&self) -> usize {
        self.orders.iter().filter(|order| order.is_completed()).count()
    }

    /// Confirm one order as completed.
    ///
    /// Idempotent: an order this ledger already knows as completed
    /// short-circuits without contacting the service. The local copy is not
    /// modified in either case.
    pub async fn confirm<A: CafeApi + ?Sized>(
        &self,
        api: &A,
        order_id: u32,
    ) -> Result<ConfirmOutcome, ConfirmError> {
        let order = self
            .get(order_id)
            .ok_or(ConfirmError::UnknownOrder(order_id))?;
        if order.is_completed() {
            debug!(order_id, "order already completed, confirm is a no-op");
            return Ok(ConfirmOutcome::AlreadyCompleted);
        }

        api.complete_order(order_id).await?;
        info!(order_id, "order confirmed, awaiting refreshed ledger");
        Ok(ConfirmOutcome::Updated)
    }
}

impl From<Vec<Order>> for OrderLedger {
    fn from(orders: Vec<Order>) -> Self {
        Self::new(orders)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::{order, MockApi};
    use std::sync::atomic::Ordering;

    #[test]
    fn test_counts() {
        let ledger = OrderLedger::new(vec![
            order(1, OrderStatus::Pending, 15_000, 1),
            order(2, OrderStatus::Completed, 5_000, 2),
            order(3, OrderStatus::Pending, 8_000, 2),
        ]);
        assert_eq!(ledger.len(), 3);
        assert_eq!(ledger.pending_count(), 2);
        assert_eq!(ledger.completed_count(), 1);
    }

    #[tokio::test]
    async fn test_confirm_pending_issues_write_without_local_flip() {
        let api = MockApi::default();
        let ledger = OrderLedger::new(vec![order(1, OrderStatus::Pending, 15_000, 1)]);

        let outcome = ledger.confirm(&api, 1).await.unwrap();
        assert_eq!(outcome, ConfirmOutcome::Updated);
        assert_eq!(api.calls.complete_order.load(Ordering::SeqCst), 1);

        // No optimistic flip: the local copy still reads pending until the
        // next refresh replaces the ledger.
        assert_eq!(ledger.get(1).unwrap().status, OrderStatus::Pending);
    }

    #[tokio::test]
    async fn test_confirm_completed_is_noop_with_zero_calls() {
        let api = MockApi::default();
        let ledger = OrderLedger::new(vec![order(1, OrderStatus::Completed, 15_000, 1)]);

        // Applying confirm twice yields the same final state as once.
        for _ in 0..2 {
            let outcome = ledger.confirm(&api, 1).await.unwrap();
            assert_eq!(outcome, ConfirmOutcome::AlreadyCompleted);
        }
        assert_eq!(api.calls.complete_order.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_confirm_unknown_order() {
        let api = MockApi::default();
        let ledger = OrderLedger::default();
        let err = ledger.confirm(&api, 42).await.unwrap_err();
        assert!(matches!(err, ConfirmError::UnknownOrder(42)));
        assert_eq!(api.calls.complete_order.load(Ordering::SeqCst), 0);
    }
}
