//! Error taxonomy for the ordering core.
//!
//! Nothing here is fatal: read failures keep the previous snapshot and are
//! retried on the next poll tick, and write failures leave local state
//! untouched so the user can retry. Validation errors are raised before any
//! network call is made.

use thiserror::Error;

/// A failed read from the catalog/order service (network, HTTP status, or
/// JSON decode). Non-fatal: the previous snapshot stays in effect.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("{0}")]
    Network(String),
    #[error("{0}")]
    Status(String),
    #[error("invalid JSON from the order service: {0}")]
    Decode(#[from] serde_json::Error),
}

/// A rejected cart mutation. The cart is left exactly as it was.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CartError {
    #[error("insufficient stock for {name}")]
    StockExceeded { name: String },
    #[error("unknown menu item {0}")]
    UnknownItem(u32),
}

/// Bad local input, detected before the service is contacted.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("customer name is required")]
    EmptyName,
    #[error("cart is empty")]
    EmptyCart,
    #[error("insufficient stock for {name}")]
    StockExceeded { name: String },
}

/// A failed checkout. `Validation` never reaches the network; `Rejected`
/// carries the service's reason (for example a stock race lost to another
/// customer). No automatic retry in any case — checkout is not idempotent.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("order rejected: {msg}")]
    Rejected { msg: String },
    #[error("{0}")]
    Network(String),
}

/// A failed order confirmation.
#[derive(Debug, Error)]
pub enum ConfirmError {
    #[error("unknown order {0}")]
    UnknownOrder(u32),
    #[error("confirmation rejected: {msg}")]
    Rejected { msg: String },
    #[error("{0}")]
    Network(String),
}
