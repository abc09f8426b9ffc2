//! In-process panel backend: one [`ResourceActor`] per collection.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, instrument};

use super::{CategoryApi, OrderApi, ServiceApi, UserApi};
use crate::actor_framework::{FrameworkError, ResourceActor, ResourceClient};
use crate::domain::{
    CancelResult, Category, CategoryCreate, CategoryPatch, CategoryRef, Order, OrderStatus,
    Service, ServiceCreate, User, UserCreate, UserPatch,
};
use crate::error::ApiError;
use crate::order_actor::{OrderAction, OrderActionResult, OrderRecord};
use crate::order_form::OrderRequest;
use crate::service_actor::ServiceRecord;
use crate::user_actor::UserAction;

fn spawn_resource<T: crate::actor_framework::Entity<Id = String>>(
    buffer_size: usize,
    prefix: &'static str,
) -> ResourceClient<T> {
    let counter = Arc::new(AtomicU64::new(1));
    let next_id = move || format!("{prefix}{}", counter.fetch_add(1, Ordering::SeqCst));
    let (actor, client) = ResourceActor::new(buffer_size, next_id);
    tokio::spawn(actor.run());
    client
}

/// Panel backend held entirely in memory.
///
/// Order ids are plain numbers so they double as provider order ids.
#[derive(Clone)]
pub struct InMemoryPanelApi {
    services: ResourceClient<Service>,
    categories: ResourceClient<Category>,
    orders: ResourceClient<Order>,
    users: ResourceClient<User>,
}

impl std::fmt::Debug for InMemoryPanelApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryPanelApi").finish_non_exhaustive()
    }
}

impl InMemoryPanelApi {
    /// Spawns the collection actors on the current runtime.
    pub fn spawn(buffer_size: usize) -> Self {
        info!(buffer_size, "Starting in-memory panel backend");
        Self::from_clients(
            spawn_resource(buffer_size, "svc"),
            spawn_resource(buffer_size, "cat"),
            spawn_resource(buffer_size, ""),
            spawn_resource(buffer_size, "user"),
        )
    }

    /// Builds the backend over existing collection clients.
    pub(crate) fn from_clients(
        services: ResourceClient<Service>,
        categories: ResourceClient<Category>,
        orders: ResourceClient<Order>,
        users: ResourceClient<User>,
    ) -> Self {
        Self { services, categories, orders, users }
    }

    /// Simulates a provider status update.
    #[instrument(skip(self))]
    pub async fn set_order_status(&self, id: &str, status: OrderStatus) -> Result<(), ApiError> {
        self.orders
            .perform_action(id.to_string(), OrderAction::UpdateStatus(status))
            .await?;
        Ok(())
    }

    async fn service(&self, id: &str) -> Result<Service, ApiError> {
        self.services
            .get(id.to_string())
            .await?
            .ok_or_else(|| ApiError::status(404, "Service not found"))
    }
}

#[async_trait]
impl OrderApi for InMemoryPanelApi {
    #[instrument(skip(self, request), fields(service_id = %request.service_id))]
    async fn create_order(&self, request: &OrderRequest) -> Result<Order, ApiError> {
        let service = self.service(&request.service_id).await?;
        let quantity = request.payload.quantity();
        if let Some(quantity) = quantity {
            if !service.accepts_quantity(quantity) {
                return Err(ApiError::status(
                    400,
                    format!("Quantity must be between {} and {}", service.min, service.max),
                ));
            }
        }
        let charge = if service.is_free { 0.0 } else { service.charge_for(quantity.unwrap_or(1)) };

        debug!("Sending request");
        let id = self
            .orders
            .create(OrderRecord { request: request.clone(), charge })
            .await?;
        self.orders
            .get(id.clone())
            .await?
            .ok_or(ApiError::NotFound(id))
    }

    /// Newest first, as the panel lists them.
    async fn list_orders(&self) -> Result<Vec<Order>, ApiError> {
        let mut orders = self.orders.list().await?;
        orders.reverse();
        Ok(orders)
    }

    #[instrument(skip(self))]
    async fn refill_orders(&self, ids: &[u64]) -> Result<(), ApiError> {
        for id in ids {
            self.orders.perform_action(id.to_string(), OrderAction::Refill).await?;
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn cancel_orders(&self, ids: &[u64]) -> Result<Vec<CancelResult>, ApiError> {
        let mut results = Vec::with_capacity(ids.len());
        for &id in ids {
            let result = match self.orders.perform_action(id.to_string(), OrderAction::Cancel).await {
                Ok(OrderActionResult::Cancel(Ok(()))) => CancelResult::accepted(id),
                Ok(OrderActionResult::Cancel(Err(reason))) => CancelResult::refused(id, reason),
                Ok(other) => CancelResult::refused(id, format!("Unexpected result: {other:?}")),
                Err(FrameworkError::NotFound(_)) => CancelResult::refused(id, "Order not found"),
                Err(e) => return Err(e.into()),
            };
            results.push(result);
        }
        Ok(results)
    }
}

#[async_trait]
impl ServiceApi for InMemoryPanelApi {
    async fn list_services(&self) -> Result<Vec<Service>, ApiError> {
        Ok(self.services.list().await?)
    }

    #[instrument(skip(self, service), fields(name = %service.name))]
    async fn create_service(&self, service: &ServiceCreate) -> Result<Service, ApiError> {
        let category = match service.category_id.as_deref() {
            Some(category_id) => {
                let category = self
                    .categories
                    .get(category_id.to_string())
                    .await?
                    .ok_or_else(|| ApiError::status(404, "Category not found"))?;
                Some(CategoryRef { id: category.id, name: category.name })
            }
            None => None,
        };
        let id = self
            .services
            .create(ServiceRecord { spec: service.clone(), category })
            .await?;
        self.service(&id).await
    }

    async fn delete_service(&self, id: &str) -> Result<(), ApiError> {
        Ok(self.services.delete(id.to_string()).await?)
    }
}

#[async_trait]
impl CategoryApi for InMemoryPanelApi {
    async fn list_categories(&self) -> Result<Vec<Category>, ApiError> {
        Ok(self.categories.list().await?)
    }

    async fn create_category(&self, category: &CategoryCreate) -> Result<Category, ApiError> {
        let id = self.categories.create(category.clone()).await?;
        self.categories
            .get(id.clone())
            .await?
            .ok_or(ApiError::NotFound(id))
    }

    async fn update_category(&self, id: &str, patch: &CategoryPatch) -> Result<Category, ApiError> {
        Ok(self.categories.update(id.to_string(), patch.clone()).await?)
    }

    async fn delete_category(&self, id: &str) -> Result<(), ApiError> {
        Ok(self.categories.delete(id.to_string()).await?)
    }
}

#[async_trait]
impl UserApi for InMemoryPanelApi {
    async fn list_users(&self) -> Result<Vec<User>, ApiError> {
        Ok(self.users.list().await?)
    }

    #[instrument(skip(self, user), fields(email = %user.email))]
    async fn create_user(&self, user: &UserCreate) -> Result<User, ApiError> {
        let taken = self
            .users
            .list()
            .await?
            .iter()
            .any(|existing| existing.email.eq_ignore_ascii_case(&user.email));
        if taken {
            return Err(ApiError::status(409, "User already exists"));
        }
        let id = self.users.create(user.clone()).await?;
        self.users.get(id.clone()).await?.ok_or(ApiError::NotFound(id))
    }

    async fn update_user(&self, id: &str, patch: &UserPatch) -> Result<User, ApiError> {
        Ok(self.users.update(id.to_string(), patch.clone()).await?)
    }

    async fn delete_user(&self, id: &str) -> Result<(), ApiError> {
        Ok(self.users.delete(id.to_string()).await?)
    }

    async fn ban_user(&self, id: &str) -> Result<(), ApiError> {
        self.users.perform_action(id.to_string(), UserAction::Ban).await?;
        Ok(())
    }

    async fn unban_user(&self, id: &str) -> Result<(), ApiError> {
        self.users.perform_action(id.to_string(), UserAction::Unban).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order_form::{OrderPayload, PollOrder};

    async fn seeded() -> (InMemoryPanelApi, Service) {
        let api = InMemoryPanelApi::spawn(16);
        let category = api.create_category(&CategoryCreate::new("Instagram").unwrap()).await.unwrap();
        let service = api
            .create_service(&ServiceCreate {
                category_id: Some(category.id),
                ..ServiceCreate::from_service(&Service::new("", "Poll votes", 1.2, 10, 1000))
            })
            .await
            .unwrap();
        (api, service)
    }

    fn poll(service_id: &str, quantity: i64) -> OrderRequest {
        OrderRequest {
            service_id: service_id.to_string(),
            price: None,
            payload: OrderPayload::Poll(PollOrder {
                link: "https://x.com/post/9".into(),
                quantity,
                answer_number: 2,
            }),
        }
    }

    #[tokio::test]
    async fn test_create_order_checks_service() {
        let (api, service) = seeded().await;
        assert_eq!(service.id, "svc1");
        assert_eq!(service.category.as_ref().map(|c| c.name.as_str()), Some("Instagram"));

        let order = api.create_order(&poll("svc1", 50)).await.unwrap();
        assert_eq!(order.provider_order_id, "1");
        assert_eq!(order.order_type, "poll");
        assert!((order.charge.unwrap() - 0.06).abs() < 1e-9);

        let too_many = api.create_order(&poll("svc1", 5000)).await.unwrap_err();
        assert_eq!(too_many.server_message(), Some("Quantity must be between 10 and 1000"));

        let missing = api.create_order(&poll("svc9", 50)).await.unwrap_err();
        assert_eq!(missing.server_message(), Some("Service not found"));
    }

    #[tokio::test]
    async fn test_refill_and_cancel() {
        let (api, _) = seeded().await;
        api.create_order(&poll("svc1", 50)).await.unwrap();
        api.create_order(&poll("svc1", 60)).await.unwrap();
        api.set_order_status("2", OrderStatus::Completed).await.unwrap();

        let listed: Vec<String> = api.list_orders().await.unwrap().into_iter().map(|o| o.id).collect();
        assert_eq!(listed, vec!["2", "1"]);

        assert!(api.refill_orders(&[1]).await.is_err());
        api.refill_orders(&[2]).await.unwrap();

        let results = api.cancel_orders(&[1, 2, 7]).await.unwrap();
        assert_eq!(results[0], CancelResult::accepted(1));
        assert!(results[1].cancel.error.is_some());
        assert_eq!(results[2], CancelResult::refused(7, "Order not found"));
    }

    #[tokio::test]
    async fn test_user_lifecycle() {
        let api = InMemoryPanelApi::spawn(16);
        let user = api
            .create_user(&UserCreate::new("Alice", "alice@example.com", "hunter22!"))
            .await
            .unwrap();
        let duplicate = api
            .create_user(&UserCreate::new("Alias", "ALICE@example.com", "hunter22!"))
            .await
            .unwrap_err();
        assert_eq!(duplicate.server_message(), Some("User already exists"));

        api.ban_user(&user.id).await.unwrap();
        assert!(api.list_users().await.unwrap()[0].is_banned);
        api.unban_user(&user.id).await.unwrap();

        let renamed = api
            .update_user(&user.id, &UserPatch { name: Some("Alicia".into()), ..Default::default() })
            .await
            .unwrap();
        assert_eq!(renamed.name, "Alicia");

        api.delete_user(&user.id).await.unwrap();
        assert!(matches!(api.delete_user(&user.id).await, Err(ApiError::NotFound(_))));
    }
}
