//! HTTP client for the catalog/order service.
//!
//! All endpoints speak JSON. Non-2xx responses and JSON parse failures are
//! folded into the error taxonomy uniformly; rejection bodies carry the
//! service's reason in a `msg` field, which is surfaced verbatim to the
//! user.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::{CheckoutError, ConfirmError, FetchError};
use crate::model::{
    CheckoutRequest, DashboardFigures, MenuItem, MenuItemDraft, Order, OrderConfirmation,
};

// ---------------------------------------------------------------------------
// Error mapping
// ---------------------------------------------------------------------------

/// Convert a `reqwest::Error` into a user-friendly message.
fn friendly_error(url: &str, err: &reqwest::Error) -> String {
    if err.is_connect() {
        return format!("Cannot reach the order service at {url}");
    }
    if err.is_timeout() {
        return format!("Connection to {url} timed out");
    }
    if err.is_builder() {
        return format!("Invalid order service URL: {url}");
    }
    format!("Network error communicating with {url}: {err}")
}

/// Convert an HTTP status code into a user-friendly message.
fn status_error(status: StatusCode) -> String {
    match status.as_u16() {
        404 => "Order service endpoint not found".to_string(),
        s if s >= 500 => format!("Order service error (HTTP {s})"),
        s => format!("Unexpected response from the order service (HTTP {s})"),
    }
}

/// Extract the service's rejection reason from an error body, falling back
/// to a status-derived message when the body has no usable `msg`.
fn rejection_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| {
            value
                .get("msg")
                .and_then(Value::as_str)
                .map(|msg| msg.trim().to_string())
        })
        .filter(|msg| !msg.is_empty())
        .unwrap_or_else(|| status_error(status))
}

// ---------------------------------------------------------------------------
// Service trait
// ---------------------------------------------------------------------------

/// The catalog/order service as seen by the core. Reads return whole
/// snapshots; writes are delegated entirely to the service, which is the
/// single writer of truth for stock and order status.
#[async_trait]
pub trait CafeApi: Send + Sync {
    async fn fetch_menus(&self) -> Result<Vec<MenuItem>, FetchError>;
    async fn fetch_orders(&self) -> Result<Vec<Order>, FetchError>;
    async fn fetch_dashboard(&self) -> Result<DashboardFigures, FetchError>;

    /// Submit an order. Not idempotent — callers must never retry
    /// automatically.
    async fn submit_order(
        &self,
        request: &CheckoutRequest,
    ) -> Result<OrderConfirmation, CheckoutError>;

    /// Mark one order completed (`PUT /api/pesanan/{id}`).
    async fn complete_order(&self, order_id: u32) -> Result<(), ConfirmError>;

    // Catalog mutation passthroughs. The core never touches stock directly;
    // after any of these it only forces a snapshot refresh.
    async fn create_menu(&self, draft: &MenuItemDraft) -> Result<(), FetchError>;
    async fn update_menu(&self, item_id: u32, draft: &MenuItemDraft) -> Result<(), FetchError>;
    async fn delete_menu(&self, item_id: u32) -> Result<(), FetchError>;
}

// ---------------------------------------------------------------------------
// reqwest implementation
// ---------------------------------------------------------------------------

pub struct HttpApi {
    client: Client,
    base_url: String,
}

impl HttpApi {
    pub fn new(config: &ClientConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| FetchError::Network(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, FetchError> {
        let resp = self
            .client
            .get(self.url(path))
            .send()
            .await
            .map_err(|e| FetchError::Network(friendly_error(&self.base_url, &e)))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status(status_error(status)));
        }

        let body = resp
            .text()
            .await
            .map_err(|e| FetchError::Network(friendly_error(&self.base_url, &e)))?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Fire a catalog write and discard the body; only success matters, the
    /// caller re-reads the snapshot afterwards.
    async fn send_catalog_write(&self, req: reqwest::RequestBuilder) -> Result<(), FetchError> {
        let resp = req
            .send()
            .await
            .map_err(|e| FetchError::Network(friendly_error(&self.base_url, &e)))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status(status_error(status)));
        }
        Ok(())
    }
}

#[async_trait]
impl CafeApi for HttpApi {
    async fn fetch_menus(&self) -> Result<Vec<MenuItem>, FetchError> {
        self.get_json("/api/menus").await
    }

    async fn fetch_orders(&self) -> Result<Vec<Order>, FetchError> {
        self.get_json("/api/pesanan").await
    }

    async fn fetch_dashboard(&self) -> Result<DashboardFigures, FetchError> {
        self.get_json("/api/dashboard").await
    }

    async fn submit_order(
        &self,
        request: &CheckoutRequest,
    ) -> Result<OrderConfirmation, CheckoutError> {
        let resp = self
            .client
            .post(self.url("/api/order"))
            .json(request)
            .send()
            .await
            .map_err(|e| CheckoutError::Network(friendly_error(&self.base_url, &e)))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| CheckoutError::Network(friendly_error(&self.base_url, &e)))?;

        if !status.is_success() {
            let msg = rejection_message(status, &body);
            debug!(%status, msg, "order submission rejected");
            return Err(CheckoutError::Rejected { msg });
        }

        if body.trim().is_empty() {
            return Ok(OrderConfirmation::default());
        }
        serde_json::from_str(&body).map_err(|e| {
            CheckoutError::Network(format!("Invalid JSON from the order service: {e}"))
        })
    }

    async fn complete_order(&self, order_id: u32) -> Result<(), ConfirmError> {
        let resp = self
            .client
            .put(self.url(&format!("/api/pesanan/{order_id}")))
            .send()
            .await
            .map_err(|e| ConfirmError::Network(friendly_error(&self.base_url, &e)))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ConfirmError::Rejected {
                msg: rejection_message(status, &body),
            });
        }
        Ok(())
    }

    async fn create_menu(&self, draft: &MenuItemDraft) -> Result<(), FetchError> {
        let payload = draft.clone().normalized();
        self.send_catalog_write(self.client.post(self.url("/api/menus")).json(&payload))
            .await
    }

    async fn update_menu(&self, item_id: u32, draft: &MenuItemDraft) -> Result<(), FetchError> {
        let payload = draft.clone().normalized();
        self.send_catalog_write(
            self.client
                .put(self.url(&format!("/api/menus/{item_id}")))
                .json(&payload),
        )
        .await
    }

    async fn delete_menu(&self, item_id: u32) -> Result<(), FetchError> {
        self.send_catalog_write(self.client.delete(self.url(&format!("/api/menus/{item_id}"))))
            .await
    }
}

// ---------------------------------------------------------------------------
// Test doubles
// ---------------------------------------------------------------------------


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_message_prefers_msg_field() {
        let msg = rejection_message(
            StatusCode::BAD_REQUEST,
            r#"{"msg":"Stok Nasi Goreng tidak mencukupi"}"#,
        );
        assert_eq!(msg, "Stok Nasi Goreng tidak mencukupi");
    }

    #[test]
    fn test_rejection_message_falls_back_to_status() {
        assert_eq!(
            rejection_message(StatusCode::INTERNAL_SERVER_ERROR, "not json"),
            "Order service error (HTTP 500)"
        );
        assert_eq!(
            rejection_message(StatusCode::BAD_REQUEST, r#"{"msg":""}"#),
            "Unexpected response from the order service (HTTP 400)"
        );
    }

    #[test]
    fn test_url_joins_base_and_path() {
        let api = HttpApi::new(&ClientConfig::new("localhost:5000/api")).unwrap();
        assert_eq!(api.url("/api/menus"), "http://localhost:5000/api/menus");
    }
}
