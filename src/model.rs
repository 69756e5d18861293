//! Domain and wire types for the catalog/order service.
//!
//! Field renames follow the service's JSON verbatim (`nama`, `harga`,
//! `stok`, ...). The service owns every id and every authoritative stock
//! figure; this crate only ever reads them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Placeholder used when an admin saves a menu item without an image.
pub const PLACEHOLDER_IMAGE: &str = "https://placehold.co/600x400?text=No+Img";

// ---------------------------------------------------------------------------
// Menu catalog
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "makanan")]
    Food,
    #[serde(rename = "minuman")]
    Drink,
}

/// One menu item as reported by `GET /api/menus`. Stock is authoritative on
/// the server; the cart tracks its own pending reservation on top of it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: u32,
    #[serde(rename = "nama")]
    pub name: String,
    #[serde(rename = "kategori")]
    pub category: Category,
    #[serde(rename = "harga")]
    pub unit_price: u64,
    #[serde(rename = "stok")]
    pub stock: u32,
    #[serde(rename = "gambar")]
    pub image: String,
}

/// Admin create/update payload for a menu item. Ids are assigned by the
/// service, so the draft carries none.
#[derive(Debug, Clone, Serialize)]
pub struct MenuItemDraft {
    #[serde(rename = "nama")]
    pub name: String,
    #[serde(rename = "kategori")]
    pub category: Category,
    #[serde(rename = "harga")]
    pub unit_price: u64,
    #[serde(rename = "stok")]
    pub stock: u32,
    #[serde(rename = "gambar")]
    pub image: String,
}

impl MenuItemDraft {
    /// Fill in the placeholder image when none was provided, as the admin
    /// form does before submitting.
    pub fn normalized(mut self) -> Self {
        if self.image.trim().is_empty() {
            self.image = PLACEHOLDER_IMAGE.to_string();
        }
        self
    }
}

// ---------------------------------------------------------------------------
// Orders
// ---------------------------------------------------------------------------

/// Order lifecycle. The transition is one-directional: once the service
/// reports `Selesai` an order never goes back to pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    Pending,
    #[serde(rename = "Selesai")]
    Completed,
}

/// One order row from `GET /api/pesanan`. Immutable except for `status`,
/// which only the service mutates (via `PUT /api/pesanan/{id}`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: u32,
    #[serde(rename = "nama_menu")]
    pub menu_name: String,
    #[serde(rename = "harga")]
    pub amount: u64,
    #[serde(rename = "metode_pembayaran")]
    pub payment_method: String,
    #[serde(rename = "nama_pelanggan")]
    pub customer_name: String,
    pub status: OrderStatus,
    #[serde(rename = "tanggal")]
    pub timestamp: DateTime<Utc>,
}

impl Order {
    pub fn is_completed(&self) -> bool {
        self.status == OrderStatus::Completed
    }
}

// ---------------------------------------------------------------------------
// Checkout
// ---------------------------------------------------------------------------

/// Payment methods offered at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PaymentMethod {
    #[serde(rename = "Tunai (Cash)")]
    Cash,
    #[serde(rename = "QRIS")]
    Qris,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cash => "Tunai (Cash)",
            Self::Qris => "QRIS",
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of `POST /api/order`. Deliberately minimal: item ids and quantities
/// only — names and prices are resolved server-side so a client can never
/// submit a stale or tampered price.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutRequest {
    pub items: Vec<CheckoutItem>,
    #[serde(rename = "metode")]
    pub payment_method: PaymentMethod,
    #[serde(rename = "nama_pelanggan")]
    pub customer_name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckoutItem {
    pub id: u32,
    pub qty: u32,
}

/// Successful response to an order submission.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderConfirmation {
    #[serde(default)]
    pub msg: Option<String>,
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

/// Raw aggregate figures from `GET /api/dashboard`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DashboardFigures {
    #[serde(rename = "totalProduk")]
    pub product_count: usize,
    #[serde(rename = "totalPesanan")]
    pub order_count: usize,
    #[serde(rename = "totalPendapatan")]
    pub total_revenue: u64,
    #[serde(rename = "grafikBulanan")]
    pub monthly_revenue: Vec<u64>,
}
