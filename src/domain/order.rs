use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Provider-side progress of an order.
///
/// Unknown statuses from the provider are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OrderStatus {
    Pending,
    InProgress,
    Completed,
    Partial,
    Failed,
    Canceled,
    Other(String),
}

impl OrderStatus {
    pub fn as_str(&self) -> &str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::InProgress => "in progress",
            OrderStatus::Completed => "completed",
            OrderStatus::Partial => "partial",
            OrderStatus::Failed => "failed",
            OrderStatus::Canceled => "canceled",
            OrderStatus::Other(raw) => raw,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::InProgress => "In Progress",
            OrderStatus::Completed => "Completed",
            OrderStatus::Partial => "Partial",
            OrderStatus::Failed => "Failed",
            OrderStatus::Canceled => "Canceled",
            OrderStatus::Other(raw) => raw,
        }
    }

    /// Orders still being delivered can be cancelled.
    pub fn is_cancellable(&self) -> bool {
        matches!(self, OrderStatus::Pending | OrderStatus::InProgress)
    }

    /// Orders that delivered at least partially can be refilled.
    pub fn is_refillable(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Partial)
    }
}

impl From<String> for OrderStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "pending" => OrderStatus::Pending,
            "in progress" => OrderStatus::InProgress,
            "completed" => OrderStatus::Completed,
            "partial" => OrderStatus::Partial,
            "failed" => OrderStatus::Failed,
            "canceled" | "cancelled" => OrderStatus::Canceled,
            _ => OrderStatus::Other(raw),
        }
    }
}

impl From<OrderStatus> for String {
    fn from(status: OrderStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A submitted order as recorded by the panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(alias = "_id")]
    pub id: String,
    /// Order id assigned by the upstream SMM provider.
    #[serde(rename = "topsmmOrderId")]
    pub provider_order_id: String,
    pub service_id: String,
    #[serde(rename = "type", default)]
    pub order_type: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub quantity: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub charge: Option<f64>,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

/// Per-order outcome of a bulk cancel request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CancelResult {
    pub order: u64,
    pub cancel: CancelStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CancelStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CancelResult {
    pub fn accepted(order: u64) -> Self {
        Self { order, cancel: CancelStatus::default() }
    }

    pub fn refused(order: u64, error: impl Into<String>) -> Self {
        Self { order, cancel: CancelStatus { error: Some(error.into()) } }
    }
}
