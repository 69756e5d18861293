//! Checkout: converts a validated cart into an order submission.
//!
//! All validation runs before the service is contacted. On success the cart
//! is cleared and the caller must force an immediate snapshot refresh; on
//! any failure the cart is left untouched so the user can adjust and retry.
//! Checkout is not idempotent, so retries are user-initiated only.

use tracing::info;

use crate::api::CafeApi;
use crate::cart::Cart;
use crate::error::{CheckoutError, ValidationError};
use crate::model::{CheckoutItem, CheckoutRequest, OrderConfirmation, PaymentMethod};
use crate::snapshot::InventorySnapshot;

/// Validate and submit the cart as one order.
///
/// Preconditions, checked before any network call:
/// - `customer_name` is non-empty after trimming,
/// - the cart is non-empty,
/// - every line still fits the latest snapshot's stock.
pub async fn submit<A: CafeApi + ?Sized>(
    api: &A,
    cart: &mut Cart,
    snapshot: &InventorySnapshot,
    customer_name: &str,
    payment_method: PaymentMethod,
) -> Result<OrderConfirmation, CheckoutError> {
    let customer_name = customer_name.trim();
    if customer_name.is_empty() {
        return Err(ValidationError::EmptyName.into());
    }
    if cart.is_empty() {
        return Err(ValidationError::EmptyCart.into());
    }
    for line in cart.lines() {
        if line.quantity > snapshot.stock_of(line.item_id) {
            return Err(ValidationError::StockExceeded {
                name: line.name.clone(),
            }
            .into());
        }
    }

    let request = CheckoutRequest {
        items: cart
            .lines()
            .iter()
            .map(|line| CheckoutItem {
                id: line.item_id,
                qty: line.quantity,
            })
            .collect(),
        payment_method,
        customer_name: customer_name.to_string(),
    };

    let confirmation = api.submit_order(&request).await?;
    info!(
        customer = customer_name,
        lines = request.items.len(),
        total = cart.total_value(),
        "order submitted"
    );
    cart.clear();
    Ok(confirmation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::{menu_item, MockApi};
    use std::sync::atomic::Ordering;

    fn stocked_cart() -> (Cart, InventorySnapshot) {
        let a = menu_item(1, "Nasi Goreng", 15_000, 5);
        let b = menu_item(2, "Es Teh", 5_000, 5);
        let snapshot = InventorySnapshot::new(vec![a.clone(), b.clone()]);
        let mut cart = Cart::new();
        cart.add(&a).unwrap();
        cart.add(&a).unwrap();
        cart.add(&b).unwrap();
        (cart, snapshot)
    }

    #[tokio::test]
    async fn test_empty_cart_fails_without_network() {
        let api = MockApi::default();
        let mut cart = Cart::new();
        let snapshot = InventorySnapshot::default();

        let err = submit(&api, &mut cart, &snapshot, "Budi", PaymentMethod::Cash)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CheckoutError::Validation(ValidationError::EmptyCart)
        ));
        assert_eq!(api.calls.submit_order.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_name_fails_without_network() {
        let api = MockApi::default();
        let (mut cart, snapshot) = stocked_cart();

        let err = submit(&api, &mut cart, &snapshot, "   ", PaymentMethod::Qris)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CheckoutError::Validation(ValidationError::EmptyName)
        ));
        assert_eq!(api.calls.submit_order.load(Ordering::SeqCst), 0);
        assert_eq!(cart.total_item_count(), 3);
    }

    #[tokio::test]
    async fn test_stale_overreservation_fails_without_network() {
        let api = MockApi::default();
        let (mut cart, _) = stocked_cart();

        // The latest snapshot now reports less stock than the cart holds.
        let stale = InventorySnapshot::new(vec![
            menu_item(1, "Nasi Goreng", 15_000, 1),
            menu_item(2, "Es Teh", 5_000, 5),
        ]);
        let err = submit(&api, &mut cart, &stale, "Budi", PaymentMethod::Cash)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CheckoutError::Validation(ValidationError::StockExceeded { .. })
        ));
        assert_eq!(api.calls.submit_order.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_success_clears_cart() {
        let api = MockApi::default();
        let (mut cart, snapshot) = stocked_cart();
        assert_eq!(cart.total_value(), 2 * 15_000 + 5_000);

        let confirmation = submit(&api, &mut cart, &snapshot, " Budi ", PaymentMethod::Cash)
            .await
            .unwrap();
        assert!(cart.is_empty());
        assert_eq!(confirmation.msg.as_deref(), Some("Pesanan diterima"));
        assert_eq!(api.calls.submit_order.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_rejection_leaves_cart_untouched() {
        let api = MockApi::default();
        *api.reject_orders_with.lock().unwrap() = Some("Stok tidak mencukupi".to_string());
        let (mut cart, snapshot) = stocked_cart();

        let err = submit(&api, &mut cart, &snapshot, "Budi", PaymentMethod::Qris)
            .await
            .unwrap_err();
        match err {
            CheckoutError::Rejected { msg } => assert_eq!(msg, "Stok tidak mencukupi"),
            other => panic!("expected rejection, got {other:?}"),
        }
        assert_eq!(cart.total_item_count(), 3);
    }
}
