//! Viewer assemblies: the customer menu session and the admin session.
//!
//! Each session owns its poller and its snapshot cells; closing a session
//! cancels its polling deterministically. Cross-viewer consistency comes
//! only from the shared service — sessions never talk to each other.

use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, info};

use crate::api::CafeApi;
use crate::cart::{Cart, CartAdjustment};
use crate::checkout;
use crate::config::ClientConfig;
use crate::dashboard::{self, DashboardStats};
use crate::error::{CartError, CheckoutError, ConfirmError, FetchError};
use crate::model::{MenuItemDraft, OrderConfirmation, PaymentMethod};
use crate::orders::{ConfirmOutcome, OrderLedger};
use crate::poll::Poller;
use crate::snapshot::{InventorySnapshot, SnapshotCell};

// Lock poisoning only means a panicking holder; every value behind these
// mutexes is valid as a whole, so sessions keep using it.
fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// ---------------------------------------------------------------------------
// Customer session
// ---------------------------------------------------------------------------

/// One customer's menu-browsing session: live menu snapshot, cart, and the
/// poller keeping both reconciled.
pub struct CustomerSession<A: CafeApi + 'static> {
    api: Arc<A>,
    menu: Arc<SnapshotCell<InventorySnapshot>>,
    cart: Arc<Mutex<Cart>>,
    notices: Arc<Mutex<Vec<CartAdjustment>>>,
    poller: Poller,
}

impl<A: CafeApi + 'static> CustomerSession<A> {
    pub fn start(api: Arc<A>, config: &ClientConfig) -> Self {
        let menu: Arc<SnapshotCell<InventorySnapshot>> = Arc::new(SnapshotCell::new());
        let cart = Arc::new(Mutex::new(Cart::new()));
        let notices: Arc<Mutex<Vec<CartAdjustment>>> = Arc::new(Mutex::new(Vec::new()));

        let poller = Poller::spawn(config.poll_interval, {
            let api = Arc::clone(&api);
            let menu = Arc::clone(&menu);
            let cart = Arc::clone(&cart);
            let notices = Arc::clone(&notices);
            move || {
                refresh_menu(
                    Arc::clone(&api),
                    Arc::clone(&menu),
                    Arc::clone(&cart),
                    Arc::clone(&notices),
                )
            }
        });

        Self {
            api,
            menu,
            cart,
            notices,
            poller,
        }
    }

    /// The latest installed menu snapshot.
    pub fn snapshot(&self) -> Arc<InventorySnapshot> {
        self.menu.load()
    }

    /// A display copy of the cart.
    pub fn cart(&self) -> Cart {
        lock(&self.cart).clone()
    }

    pub fn add_to_cart(&self, item_id: u32) -> Result<(), CartError> {
        let snapshot = self.menu.load();
        let item = snapshot.get(item_id).ok_or(CartError::UnknownItem(item_id))?;
        lock(&self.cart).add(item)
    }

    pub fn adjust_quantity(&self, item_id: u32, delta: i64) {
        let snapshot = self.menu.load();
        lock(&self.cart).adjust_quantity(item_id, delta, &snapshot);
    }

    pub fn remove_from_cart(&self, item_id: u32) {
        lock(&self.cart).remove(item_id);
    }

    /// What the menu grid shows as "how many more can be added".
    pub fn effective_remaining_stock(&self, item_id: u32) -> u32 {
        let snapshot = self.menu.load();
        snapshot
            .get(item_id)
            .map(|item| lock(&self.cart).effective_remaining_stock(item))
            .unwrap_or(0)
    }

    /// Drain the adjustment notices accumulated by snapshot re-validation.
    pub fn take_notices(&self) -> Vec<CartAdjustment> {
        std::mem::take(&mut *lock(&self.notices))
    }

    /// Submit the cart as one order. On success the session cart is cleared
    /// and an immediate snapshot refresh is scheduled — the purchase just
    /// changed stock and the menu must reflect it without waiting for the
    /// next tick.
    pub async fn checkout(
        &self,
        customer_name: &str,
        payment_method: PaymentMethod,
    ) -> Result<OrderConfirmation, CheckoutError> {
        let snapshot = self.menu.load();
        // The round trip works on a copy: a failed submit leaves the session
        // cart exactly as it was, including clamps applied by any refresh
        // that lands while the request is in flight.
        let mut working = lock(&self.cart).clone();
        let confirmation =
            checkout::submit(&*self.api, &mut working, &snapshot, customer_name, payment_method)
                .await?;

        *lock(&self.cart) = working;
        self.poller.refresh_now();
        Ok(confirmation)
    }

    pub fn refresh_now(&self) {
        self.poller.refresh_now();
    }

    /// Unmount: cancel polling and wait for the task to wind down.
    pub async fn close(self) {
        self.poller.shutdown().await;
    }
}

/// One customer-viewer refresh: fetch the menu, install it if still the
/// newest result, and reconcile the cart against it.
async fn refresh_menu<A: CafeApi>(
    api: Arc<A>,
    menu: Arc<SnapshotCell<InventorySnapshot>>,
    cart: Arc<Mutex<Cart>>,
    notices: Arc<Mutex<Vec<CartAdjustment>>>,
) {
    let seq = menu.begin_refresh();
    match api.fetch_menus().await {
        Ok(items) => {
            if menu.install(seq, InventorySnapshot::new(items)) {
                let snapshot = menu.load();
                let adjustments = lock(&cart).validate_against(&snapshot);
                if !adjustments.is_empty() {
                    info!(count = adjustments.len(), "cart adjusted after refresh");
                    lock(&notices).extend(adjustments);
                }
            }
        }
        // Non-fatal: previous snapshot stays in effect, retried next tick.
        Err(e) => debug!("menu refresh failed, keeping previous snapshot: {e}"),
    }
}

// ---------------------------------------------------------------------------
// Admin session
// ---------------------------------------------------------------------------

/// The admin's combined viewer: menu catalog, order ledger, and dashboard
/// stats, refreshed together on one cadence (as the admin page does).
pub struct AdminSession<A: CafeApi + 'static> {
    api: Arc<A>,
    menu: Arc<SnapshotCell<InventorySnapshot>>,
    ledger: Arc<SnapshotCell<OrderLedger>>,
    stats: Arc<Mutex<DashboardStats>>,
    poller: Poller,
}

impl<A: CafeApi + 'static> AdminSession<A> {
    pub fn start(api: Arc<A>, config: &ClientConfig) -> Self {
        let menu: Arc<SnapshotCell<InventorySnapshot>> = Arc::new(SnapshotCell::new());
        let ledger: Arc<SnapshotCell<OrderLedger>> = Arc::new(SnapshotCell::new());
        let stats = Arc::new(Mutex::new(DashboardStats::default()));

        let poller = Poller::spawn(config.poll_interval, {
            let api = Arc::clone(&api);
            let menu = Arc::clone(&menu);
            let ledger = Arc::clone(&ledger);
            let stats = Arc::clone(&stats);
            move || {
                refresh_admin(
                    Arc::clone(&api),
                    Arc::clone(&menu),
                    Arc::clone(&ledger),
                    Arc::clone(&stats),
                )
            }
        });

        Self {
            api,
            menu,
            ledger,
            stats,
            poller,
        }
    }

    pub fn menus(&self) -> Arc<InventorySnapshot> {
        self.menu.load()
    }

    pub fn orders(&self) -> Arc<OrderLedger> {
        self.ledger.load()
    }

    pub fn stats(&self) -> DashboardStats {
        lock(&self.stats).clone()
    }

    /// Suppress or resume polling around a modal editing session. While
    /// suppressed, scheduled refreshes are skipped entirely so a concurrent
    /// server read cannot clobber in-progress form state.
    pub fn set_editing(&self, editing: bool) {
        self.poller.set_suppressed(editing);
    }

    /// Confirm an order as completed. Idempotent per the ledger's rules; a
    /// real transition forces a refresh so the new status comes from a
    /// confirmed read, never an optimistic local flip.
    pub async fn confirm_order(&self, order_id: u32) -> Result<ConfirmOutcome, ConfirmError> {
        let ledger = self.ledger.load();
        let outcome = ledger.confirm(&*self.api, order_id).await?;
        if outcome == ConfirmOutcome::Updated {
            self.poller.refresh_now();
        }
        Ok(outcome)
    }

    /// Create (`item_id` = None) or update a menu item, then force a
    /// refresh. Callers end the editing session (`set_editing(false)`)
    /// before saving, as the form does when it closes.
    pub async fn save_menu(
        &self,
        item_id: Option<u32>,
        draft: MenuItemDraft,
    ) -> Result<(), FetchError> {
        match item_id {
            Some(id) => self.api.update_menu(id, &draft).await?,
            None => self.api.create_menu(&draft).await?,
        }
        self.poller.refresh_now();
        Ok(())
    }

    pub async fn delete_menu(&self, item_id: u32) -> Result<(), FetchError> {
        self.api.delete_menu(item_id).await?;
        self.poller.refresh_now();
        Ok(())
    }

    pub fn refresh_now(&self) {
        self.poller.refresh_now();
    }

    pub async fn close(self) {
        self.poller.shutdown().await;
    }
}

/// One admin-viewer refresh: menus, orders, then dashboard stats. Stats
/// prefer the service's own figures and fall back to local aggregation when
/// that read fails.
async fn refresh_admin<A: CafeApi>(
    api: Arc<A>,
    menu: Arc<SnapshotCell<InventorySnapshot>>,
    ledger: Arc<SnapshotCell<OrderLedger>>,
    stats: Arc<Mutex<DashboardStats>>,
) {
    let seq = menu.begin_refresh();
    match api.fetch_menus().await {
        Ok(items) => {
            menu.install(seq, InventorySnapshot::new(items));
        }
        Err(e) => debug!("menu refresh failed, keeping previous snapshot: {e}"),
    }

    let seq = ledger.begin_refresh();
    match api.fetch_orders().await {
        Ok(orders) => {
            ledger.install(seq, OrderLedger::from(orders));
        }
        Err(e) => debug!("order refresh failed, keeping previous ledger: {e}"),
    }

    let snapshot = menu.load();
    let orders = ledger.load();
    let new_stats = match api.fetch_dashboard().await {
        Ok(figures) => DashboardStats::from_figures(figures, &snapshot),
        Err(e) => {
            debug!("dashboard fetch failed, aggregating locally: {e}");
            dashboard::aggregate(&snapshot, orders.orders())
        }
    };
    *lock(&stats) = new_stats;
}
