//! Fire-and-forget order notifications
//!
//! After an order is placed the dispatcher posts a JSON summary to a
//! configured webhook. Dispatch runs on its own task after the response is
//! determined: a slow or failing receiver never fails or delays order
//! placement. Failures are logged and dropped.

use serde_json::json;
use tracing::{debug, error};

use crate::models::OrderView;

/// Order notification dispatcher
#[derive(Clone)]
pub struct OrderNotifier {
    client: reqwest::Client,
    webhook_url: Option<String>,
    admin_email: Option<String>,
}

impl OrderNotifier {
    /// Create a new notifier; with no webhook configured, dispatch is a no-op
    pub fn new(webhook_url: Option<String>, admin_email: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            webhook_url,
            admin_email,
        }
    }

    /// Dispatch a notification for a freshly placed order
    pub fn dispatch(&self, order: &OrderView) {
        let Some(url) = self.webhook_url.clone() else {
            debug!("order notification skipped: no webhook configured");
            return;
        };

        let payload = json!({
            "event": "order_placed",
            "order_id": order.id,
            "total_amount": order.total_amount,
            "status": order.status,
            "items": order.items,
            "customer": order.user,
            "placed_at": order.created_at,
            "notify": self.admin_email,
        });

        let client = self.client.clone();
        tokio::spawn(async move {
            let result = client
                .post(&url)
                .json(&payload)
                .send()
                .await
                .and_then(|response| response.error_for_status());

            if let Err(e) = result {
                error!("order notification failed: {}", e);
            }
        });
    }
}
