//! Kedai ordering core.
//!
//! The headless engine behind a small cafe ordering system: customers build
//! a stock-constrained cart against a live menu, submit orders, and an admin
//! concurrently edits the catalog and confirms orders. Every viewer observes
//! server state through fixed-interval polling; the server is the single
//! writer of truth for stock and order status, and the cart is a pending
//! reservation overlay reconciled against each refreshed snapshot.

use std::path::Path;

use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub mod api;
pub mod cart;
pub mod checkout;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod model;
pub mod orders;
pub mod poll;
pub mod session;
pub mod snapshot;

pub use api::{CafeApi, HttpApi};
pub use cart::{Cart, CartAdjustment, CartLine};
pub use config::ClientConfig;
pub use dashboard::{CategorySplit, DashboardStats};
pub use error::{CartError, CheckoutError, ConfirmError, FetchError, ValidationError};
pub use model::{
    Category, CheckoutRequest, MenuItem, MenuItemDraft, Order, OrderConfirmation, OrderStatus,
    PaymentMethod,
};
pub use orders::{ConfirmOutcome, OrderLedger};
pub use poll::Poller;
pub use session::{AdminSession, CustomerSession};
pub use snapshot::{InventorySnapshot, SnapshotCell};

/// Initialize structured logging: console always, plus a daily-rolling file
/// when `log_dir` is given. Honors `RUST_LOG`; defaults to info with debug
/// for this crate.
pub fn init_tracing(log_dir: Option<&Path>) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,kedai_core=debug"));

    let console_layer = fmt::layer().with_target(true);
    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer);

    match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir).ok();
            let file_appender = tracing_appender::rolling::daily(dir, "kedai");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            let file_layer = fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true);
            registry.with(file_layer).init();
            // Keep the guard alive for the process lifetime — dropping it
            // would stop flushing file logs.
            std::mem::forget(guard);
        }
        None => registry.init(),
    }

    info!("kedai-core v{} logging initialised", env!("CARGO_PKG_VERSION"));
}
