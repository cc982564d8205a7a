//! Order model and related functionality
//!
//! An order is a snapshot: its lines and total are frozen at placement time
//! and never change, even if the underlying catalog prices do. Only the
//! status field is mutable, and only by an admin.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Order status
///
/// `OrderPlaced` is the initial state; the expected flow is
/// `OrderPlaced -> OutForDelivery -> Delivered`, with `Cancelled` reachable
/// before delivery. Transitions are admin-gated but otherwise unrestricted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    #[serde(rename = "order placed")]
    OrderPlaced,
    #[serde(rename = "out for delivery")]
    OutForDelivery,
    #[serde(rename = "delivered")]
    Delivered,
    #[serde(rename = "cancelled")]
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::OrderPlaced => "order placed",
            OrderStatus::OutForDelivery => "out for delivery",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "order placed" => Ok(OrderStatus::OrderPlaced),
            "out for delivery" => Ok(OrderStatus::OutForDelivery),
            "delivered" => Ok(OrderStatus::Delivered),
            "cancelled" => Ok(OrderStatus::Cancelled),
            other => Err(format!("unknown order status: {other}")),
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Order entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub status: OrderStatus,
    pub total_amount: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A line the client asserts it wants to buy. The price is deliberately
/// absent: totals are always computed server-side from the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacedLine {
    pub book_id: Uuid,
    pub qty: i32,
}

/// An order line as shown to clients. `unit_price` is the catalog price
/// frozen at placement time; the title/author fields resolve the current
/// catalog record and are absent when the book was since deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLineView {
    pub book_id: Uuid,
    pub qty: i32,
    pub unit_price: f64,
    pub title: Option<String>,
    pub author: Option<String>,
    pub cover_url: Option<String>,
}

/// Summary of the user an order belongs to, for the admin order listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderedBy {
    pub id: Uuid,
    pub username: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}

/// Full order view with resolved lines
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderView {
    pub id: Uuid,
    pub status: OrderStatus,
    pub total_amount: f64,
    pub items: Vec<OrderLineView>,
    pub user: OrderedBy,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_its_string_form() {
        for status in [
            OrderStatus::OrderPlaced,
            OrderStatus::OutForDelivery,
            OrderStatus::Delivered,
            OrderStatus::Cancelled,
        ] {
            assert_eq!(status.as_str().parse::<OrderStatus>(), Ok(status));
        }
    }

    #[test]
    fn status_rejects_values_outside_the_enum() {
        assert!("shipped".parse::<OrderStatus>().is_err());
        assert!("ORDER PLACED".parse::<OrderStatus>().is_err());
        assert!("".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn status_serializes_with_the_wire_strings() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::OrderPlaced).unwrap(),
            "\"order placed\""
        );
        assert_eq!(
            serde_json::from_str::<OrderStatus>("\"out for delivery\"").unwrap(),
            OrderStatus::OutForDelivery
        );
    }
}
