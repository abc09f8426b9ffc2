//! # Panel HTTP Client
//!
//! reqwest-backed implementation of the panel collaborator traits. Every
//! endpoint path is joined onto the configured base URL and, when a token is
//! configured, requests carry it as a Bearer header.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument};

use super::{ApiResponse, CategoryApi, Listing, OrderApi, ServiceApi, UserApi};
use crate::config::ApiEndpointConfig;
use crate::domain::{
    CancelResult, Category, CategoryCreate, CategoryPatch, Order, Service, ServiceCreate, User,
    UserCreate, UserPatch,
};
use crate::error::ApiError;
use crate::order_form::OrderRequest;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OrderIds<'a> {
    order_ids: &'a [u64],
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// HTTP client for the panel REST API
#[derive(Clone)]
pub struct HttpPanelApi {
    client: Client,
    config: ApiEndpointConfig,
    base_url: Url,
}

impl std::fmt::Debug for HttpPanelApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpPanelApi")
            .field("base_url", &self.base_url.as_str())
            .field("timeout_ms", &self.config.timeout_ms)
            .field("auth_enabled", &self.config.auth_token.is_some())
            .field("admin", &self.config.admin)
            .finish()
    }
}

impl HttpPanelApi {
    /// Create a client for `config`.
    ///
    /// # Errors
    /// `InvalidUrl` for a malformed base URL or a token that is not a valid
    /// header value; `Http` if the underlying client cannot be built.
    pub fn new(config: ApiEndpointConfig) -> Result<Self, ApiError> {
        // Without the trailing slash `Url::join` would drop the last path segment
        let normalized = format!("{}/", config.base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalized)
            .map_err(|e| ApiError::InvalidUrl(format!("{}: {e}", config.base_url)))?;

        let mut builder = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(format!("smm-panel/{}", env!("CARGO_PKG_VERSION")));

        if let Some(token) = config.auth_token.as_deref().filter(|t| !t.is_empty()) {
            let mut headers = reqwest::header::HeaderMap::new();
            headers.insert(
                reqwest::header::AUTHORIZATION,
                format!("Bearer {token}")
                    .parse()
                    .map_err(|e| ApiError::InvalidUrl(format!("Invalid bearer token: {e}")))?,
            );
            builder = builder.default_headers(headers);
            debug!("Configured Bearer token authentication");
        }

        let client = builder.build()?;
        info!(
            base_url = %base_url,
            timeout_ms = config.timeout_ms,
            auth_enabled = config.auth_token.is_some(),
            "Created panel API client"
        );
        Ok(Self { client, config, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ApiError::InvalidUrl(format!("{path}: {e}")))
    }

    fn services_path(&self) -> &'static str {
        if self.config.admin { "services/admin" } else { "services" }
    }

    /// `path` followed by `id` as one percent-encoded segment, then `action`.
    fn resource_endpoint(&self, path: &str, id: &str, action: Option<&str>) -> Result<Url, ApiError> {
        if id.is_empty() || matches!(id, "." | "..") {
            return Err(ApiError::InvalidUrl(format!("Invalid resource id: {id:?}")));
        }
        let mut url = self.endpoint(path)?;
        match url.path_segments_mut() {
            Ok(mut segments) => {
                segments.pop_if_empty().push(id);
                if let Some(action) = action {
                    segments.push(action);
                }
            }
            Err(()) => return Err(ApiError::InvalidUrl(format!("{path}: cannot carry an id"))),
        }
        Ok(url)
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        let url = self.endpoint(path)?;
        Ok(self.request_to(method, url))
    }

    fn resource_request(
        &self,
        method: Method,
        path: &str,
        id: &str,
        action: Option<&str>,
    ) -> Result<RequestBuilder, ApiError> {
        let url = self.resource_endpoint(path, id, action)?;
        Ok(self.request_to(method, url))
    }

    fn request_to(&self, method: Method, url: Url) -> RequestBuilder {
        debug!(%method, %url, "Sending request");
        self.client.request(method, url)
    }

    /// Pass successful responses through; turn the rest into `ApiError::Status`.
    async fn check(response: Response, operation: &str) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let message = error_message(&body);
        error!(status = %status, error = %message, "Failed operation: {}", operation);
        Err(ApiError::status(status.as_u16(), message))
    }

    async fn send_unit(&self, request: RequestBuilder, operation: &str) -> Result<(), ApiError> {
        Self::check(request.send().await?, operation).await?;
        debug!("Successfully completed operation: {}", operation);
        Ok(())
    }

    async fn send_data<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        operation: &str,
    ) -> Result<T, ApiError> {
        let response = Self::check(request.send().await?, operation).await?;
        let bytes = response.bytes().await?;
        let data = unwrap_data(&bytes, operation)?;
        debug!("Successfully completed operation: {}", operation);
        Ok(data)
    }

    async fn send_listing<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        operation: &str,
    ) -> Result<Vec<T>, ApiError> {
        let response = Self::check(request.send().await?, operation).await?;
        let bytes = response.bytes().await?;
        let listing: Listing<T> = serde_json::from_slice(&bytes)?;
        let items = listing.into_items();
        debug!(count = items.len(), "Successfully completed operation: {}", operation);
        Ok(items)
    }
}

/// The `data` of a `{data, message}` envelope; `EmptyResponse` when absent.
fn unwrap_data<T: DeserializeOwned>(bytes: &[u8], operation: &str) -> Result<T, ApiError> {
    let envelope: ApiResponse<T> = serde_json::from_slice(bytes)?;
    envelope.data.ok_or_else(|| ApiError::EmptyResponse(operation.to_string()))
}

/// The `message` field of an error body, or empty when there is none.
fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .unwrap_or_default()
}

#[async_trait]
impl OrderApi for HttpPanelApi {
    #[instrument(skip(self, request), fields(order_type = %request.order_type()))]
    async fn create_order(&self, request: &OrderRequest) -> Result<Order, ApiError> {
        let builder = self.request(Method::POST, "topsmm/order")?.json(request);
        self.send_data(builder, "create_order").await
    }

    #[instrument(skip(self))]
    async fn list_orders(&self) -> Result<Vec<Order>, ApiError> {
        let builder = self.request(Method::GET, "topsmm/orders")?;
        self.send_listing(builder, "list_orders").await
    }

    #[instrument(skip(self))]
    async fn refill_orders(&self, ids: &[u64]) -> Result<(), ApiError> {
        let builder = self
            .request(Method::POST, "topsmm/orders/refill")?
            .json(&OrderIds { order_ids: ids });
        self.send_unit(builder, "refill_orders").await
    }

    #[instrument(skip(self))]
    async fn cancel_orders(&self, ids: &[u64]) -> Result<Vec<CancelResult>, ApiError> {
        let builder = self
            .request(Method::POST, "topsmm/orders/cancel")?
            .json(&OrderIds { order_ids: ids });
        self.send_listing(builder, "cancel_orders").await
    }
}

#[async_trait]
impl ServiceApi for HttpPanelApi {
    #[instrument(skip(self))]
    async fn list_services(&self) -> Result<Vec<Service>, ApiError> {
        let builder = self.request(Method::GET, self.services_path())?;
        self.send_listing(builder, "list_services").await
    }

    #[instrument(skip(self, service), fields(name = %service.name))]
    async fn create_service(&self, service: &ServiceCreate) -> Result<Service, ApiError> {
        let builder = self.request(Method::POST, "services/admin")?.json(service);
        self.send_data(builder, "create_service").await
    }

    #[instrument(skip(self))]
    async fn delete_service(&self, id: &str) -> Result<(), ApiError> {
        let builder = self.resource_request(Method::DELETE, "services/admin", id, None)?;
        self.send_unit(builder, "delete_service").await
    }
}

#[async_trait]
impl CategoryApi for HttpPanelApi {
    #[instrument(skip(self))]
    async fn list_categories(&self) -> Result<Vec<Category>, ApiError> {
        let builder = self.request(Method::GET, "categories")?;
        self.send_listing(builder, "list_categories").await
    }

    #[instrument(skip(self))]
    async fn create_category(&self, category: &CategoryCreate) -> Result<Category, ApiError> {
        let builder = self.request(Method::POST, "categories")?.json(category);
        self.send_data(builder, "create_category").await
    }

    #[instrument(skip(self))]
    async fn update_category(&self, id: &str, patch: &CategoryPatch) -> Result<Category, ApiError> {
        let builder = self.resource_request(Method::PUT, "categories", id, None)?.json(patch);
        self.send_data(builder, "update_category").await
    }

    #[instrument(skip(self))]
    async fn delete_category(&self, id: &str) -> Result<(), ApiError> {
        let builder = self.resource_request(Method::DELETE, "categories", id, None)?;
        self.send_unit(builder, "delete_category").await
    }
}

#[async_trait]
impl UserApi for HttpPanelApi {
    #[instrument(skip(self))]
    async fn list_users(&self) -> Result<Vec<User>, ApiError> {
        let builder = self.request(Method::GET, "users")?;
        self.send_listing(builder, "list_users").await
    }

    #[instrument(skip(self, user), fields(email = %user.email))]
    async fn create_user(&self, user: &UserCreate) -> Result<User, ApiError> {
        let builder = self.request(Method::POST, "auth/register")?.json(user);
        self.send_data(builder, "create_user").await
    }

    #[instrument(skip(self, patch))]
    async fn update_user(&self, id: &str, patch: &UserPatch) -> Result<User, ApiError> {
        let builder = self.resource_request(Method::PUT, "users", id, None)?.json(patch);
        self.send_data(builder, "update_user").await
    }

    #[instrument(skip(self))]
    async fn delete_user(&self, id: &str) -> Result<(), ApiError> {
        let builder = self.resource_request(Method::DELETE, "users", id, None)?;
        self.send_unit(builder, "delete_user").await
    }

    #[instrument(skip(self))]
    async fn ban_user(&self, id: &str) -> Result<(), ApiError> {
        let builder = self.resource_request(Method::POST, "users", id, Some("ban"))?;
        self.send_unit(builder, "ban_user").await
    }

    #[instrument(skip(self))]
    async fn unban_user(&self, id: &str) -> Result<(), ApiError> {
        let builder = self.resource_request(Method::POST, "users", id, Some("unban"))?;
        self.send_unit(builder, "unban_user").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(base_url: &str, admin: bool) -> HttpPanelApi {
        HttpPanelApi::new(ApiEndpointConfig {
            base_url: base_url.to_string(),
            admin,
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_endpoints_keep_base_path() {
        let panel = api("http://localhost:5000/api", false);
        assert_eq!(panel.endpoint("topsmm/order").unwrap().as_str(), "http://localhost:5000/api/topsmm/order");
        assert_eq!(panel.endpoint("/users/u1/ban").unwrap().as_str(), "http://localhost:5000/api/users/u1/ban");

        let trailing = api("http://localhost:5000/api/", false);
        assert_eq!(trailing.base_url().as_str(), "http://localhost:5000/api/");
    }

    #[test]
    fn test_resource_ids_stay_in_one_segment() {
        let panel = api("http://localhost:5000/api", false);
        let url = |id: &str, action| panel.resource_endpoint("users", id, action).map(|u| u.to_string());

        assert_eq!(url("u1", Some("ban")).unwrap(), "http://localhost:5000/api/users/u1/ban");
        assert_eq!(url("a/b", None).unwrap(), "http://localhost:5000/api/users/a%2Fb");
        assert_eq!(url("1?x=2", Some("unban")).unwrap(), "http://localhost:5000/api/users/1%3Fx=2/unban");
        assert!(matches!(url("..", None), Err(ApiError::InvalidUrl(_))));
        assert!(matches!(url("", Some("ban")), Err(ApiError::InvalidUrl(_))));
    }

    #[test]
    fn test_order_ids_body() {
        let body = serde_json::to_value(OrderIds { order_ids: &[101, 102] }).unwrap();
        assert_eq!(body, serde_json::json!({ "orderIds": [101, 102] }));
    }

    #[test]
    fn test_data_envelope_unwrap() {
        let category: Category =
            unwrap_data(br#"{"data":{"id":"cat1","name":"Instagram"},"message":"Created"}"#, "create_category")
                .unwrap();
        assert_eq!(category.id, "cat1");

        let missing = unwrap_data::<Category>(br#"{"message":"ok"}"#, "create_category");
        assert!(matches!(missing, Err(ApiError::EmptyResponse(ref op)) if op == "create_category"));
        assert!(unwrap_data::<Category>(b"not json", "create_category").is_err());
    }

    #[test]
    fn test_services_path_follows_admin_flag() {
        assert_eq!(api("http://panel.test", false).services_path(), "services");
        assert_eq!(api("http://panel.test", true).services_path(), "services/admin");
    }

    #[test]
    fn test_invalid_base_url() {
        let result = HttpPanelApi::new(ApiEndpointConfig {
            base_url: "not a url".to_string(),
            ..Default::default()
        });
        assert!(matches!(result, Err(ApiError::InvalidUrl(_))));
    }

    #[test]
    fn test_error_message_from_body() {
        assert_eq!(error_message(r#"{"message":"Insufficient balance"}"#), "Insufficient balance");
        assert_eq!(error_message(r#"{"error":"nope"}"#), "");
        assert_eq!(error_message("<html>Bad Gateway</html>"), "");
    }

    #[test]
    fn test_debug_hides_token() {
        let api = HttpPanelApi::new(ApiEndpointConfig {
            auth_token: Some("jwt-secret".to_string()),
            ..Default::default()
        })
        .unwrap();
        let rendered = format!("{api:?}");
        assert!(!rendered.contains("jwt-secret"));
        assert!(rendered.contains("auth_enabled: true"));
    }
}
