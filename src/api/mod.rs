//! Collaborator traits for the panel's REST API.
//!
//! [`HttpPanelApi`] talks to a live panel; [`InMemoryPanelApi`] keeps every
//! collection in resource actors for local runs and tests.

mod http;
mod in_memory;

pub use http::HttpPanelApi;
pub use in_memory::InMemoryPanelApi;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{
    CancelResult, Category, CategoryCreate, CategoryPatch, Order, Service, ServiceCreate, User,
    UserCreate, UserPatch,
};
use crate::error::ApiError;
use crate::order_form::OrderRequest;

/// Standard `{data, message}` envelope returned by the panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Some listings come back enveloped, some as a bare array.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Listing<T> {
    Wrapped(ApiResponse<Vec<T>>),
    Bare(Vec<T>),
}

impl<T> Listing<T> {
    pub fn into_items(self) -> Vec<T> {
        match self {
            Listing::Wrapped(response) => response.data.unwrap_or_default(),
            Listing::Bare(items) => items,
        }
    }
}

#[async_trait]
pub trait OrderApi: Send + Sync {
    async fn create_order(&self, request: &OrderRequest) -> Result<Order, ApiError>;
    async fn list_orders(&self) -> Result<Vec<Order>, ApiError>;
    /// Bulk refill by provider order id.
    async fn refill_orders(&self, ids: &[u64]) -> Result<(), ApiError>;
    /// Bulk cancel by provider order id; per-order refusals come back in the results.
    async fn cancel_orders(&self, ids: &[u64]) -> Result<Vec<CancelResult>, ApiError>;
}

#[async_trait]
pub trait ServiceApi: Send + Sync {
    async fn list_services(&self) -> Result<Vec<Service>, ApiError>;
    async fn create_service(&self, service: &ServiceCreate) -> Result<Service, ApiError>;
    async fn delete_service(&self, id: &str) -> Result<(), ApiError>;
}

#[async_trait]
pub trait CategoryApi: Send + Sync {
    async fn list_categories(&self) -> Result<Vec<Category>, ApiError>;
    async fn create_category(&self, category: &CategoryCreate) -> Result<Category, ApiError>;
    async fn update_category(&self, id: &str, patch: &CategoryPatch) -> Result<Category, ApiError>;
    async fn delete_category(&self, id: &str) -> Result<(), ApiError>;
}

#[async_trait]
pub trait UserApi: Send + Sync {
    async fn list_users(&self) -> Result<Vec<User>, ApiError>;
    async fn create_user(&self, user: &UserCreate) -> Result<User, ApiError>;
    async fn update_user(&self, id: &str, patch: &UserPatch) -> Result<User, ApiError>;
    async fn delete_user(&self, id: &str) -> Result<(), ApiError>;
    async fn ban_user(&self, id: &str) -> Result<(), ApiError>;
    async fn unban_user(&self, id: &str) -> Result<(), ApiError>;
}

/// Everything the panel needs from its backend.
pub trait PanelApi: OrderApi + ServiceApi + CategoryApi + UserApi {}

impl<T> PanelApi for T where T: OrderApi + ServiceApi + CategoryApi + UserApi {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_accepts_wrapped_and_bare() {
        let wrapped: Listing<Category> =
            serde_json::from_str(r#"{"data":[{"_id":"c1","name":"TikTok"}],"message":"ok"}"#).unwrap();
        let bare: Listing<Category> = serde_json::from_str(r#"[{"id":"c2","name":"YouTube"}]"#).unwrap();
        let empty: Listing<Category> = serde_json::from_str(r#"{"data":null}"#).unwrap();

        assert_eq!(wrapped.into_items()[0].id, "c1");
        assert_eq!(bare.into_items()[0].name, "YouTube");
        assert!(empty.into_items().is_empty());
    }
}
