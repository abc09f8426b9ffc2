//! # Mock Framework
//!
//! Utilities for testing clients in isolation.
//!
//! Use [`create_mock_client`] to get a client and a receiver.
//! Then use helpers like [`expect_create`] or [`expect_action`] to assert behavior.
//! [`ScriptedOrderApi`] stands in for the order API when testing submissions.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use tokio::sync::{mpsc, oneshot, Notify};

use crate::actor_framework::{Entity, FrameworkError, ResourceClient, ResourceRequest};
use crate::api::OrderApi;
use crate::domain::{CancelResult, Order, OrderStatus};
use crate::error::ApiError;
use crate::order_form::OrderRequest;

type Responder<T> = oneshot::Sender<Result<T, FrameworkError>>;

/// Creates a mock client and a receiver for asserting requests.
///
/// Instead of a running `ResourceActor`, the client sends to a channel the
/// test controls; the test answers each request through its responder.
pub fn create_mock_client<T: Entity>(buffer_size: usize) -> (ResourceClient<T>, mpsc::Receiver<ResourceRequest<T>>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (ResourceClient::new(sender), receiver)
}

/// Helper to verify that the next message is a Create request
pub async fn expect_create<T: Entity>(receiver: &mut mpsc::Receiver<ResourceRequest<T>>) -> Option<(T::CreatePayload, Responder<T::Id>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Create { payload, respond_to }) => Some((payload, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is a Get request
pub async fn expect_get<T: Entity>(receiver: &mut mpsc::Receiver<ResourceRequest<T>>) -> Option<(T::Id, Responder<Option<T>>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Get { id, respond_to }) => Some((id, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is a List request
pub async fn expect_list<T: Entity>(receiver: &mut mpsc::Receiver<ResourceRequest<T>>) -> Option<Responder<Vec<T>>> {
    match receiver.recv().await {
        Some(ResourceRequest::List { respond_to }) => Some(respond_to),
        _ => None,
    }
}

/// Helper to verify that the next message is an Action request
pub async fn expect_action<T: Entity>(receiver: &mut mpsc::Receiver<ResourceRequest<T>>) -> Option<(T::Id, T::Action, Responder<T::ActionResult>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Action { id, action, respond_to }) => Some((id, action, respond_to)),
        _ => None,
    }
}

/// Order API double that records every call.
///
/// Orders succeed unless a failure was queued with [`fail_next`](Self::fail_next).
/// A [`gated`](Self::gated) instance holds each `create_order` until
/// [`release`](Self::release) is called.
#[derive(Default)]
pub struct ScriptedOrderApi {
    calls: AtomicUsize,
    requests: Mutex<Vec<OrderRequest>>,
    created: Mutex<Vec<Order>>,
    failures: Mutex<VecDeque<ApiError>>,
    call_made: Notify,
    gate: Option<Arc<Notify>>,
}

impl ScriptedOrderApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gated(mut self) -> Self {
        self.gate = Some(Arc::new(Notify::new()));
        self
    }

    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.notify_one();
        }
    }

    pub fn fail_next(&self, error: ApiError) {
        self.failures.lock().push_back(error);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<OrderRequest> {
        self.requests.lock().clone()
    }

    /// Resolves once `create_order` has been entered `n` times.
    pub async fn wait_for_calls(&self, n: usize) {
        while self.calls() < n {
            self.call_made.notified().await;
        }
    }
}

#[async_trait]
impl OrderApi for ScriptedOrderApi {
    async fn create_order(&self, request: &OrderRequest) -> Result<Order, ApiError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.requests.lock().push(request.clone());
        self.call_made.notify_one();

        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        if let Some(error) = self.failures.lock().pop_front() {
            return Err(error);
        }

        let order = Order {
            id: format!("order_{n}"),
            provider_order_id: n.to_string(),
            service_id: request.service_id.clone(),
            order_type: request.order_type().to_string(),
            link: request.payload.link().unwrap_or_default().to_string(),
            quantity: request.payload.quantity().unwrap_or(1),
            charge: None,
            status: OrderStatus::Pending,
            created_at: Utc::now(),
        };
        self.created.lock().push(order.clone());
        Ok(order)
    }

    async fn list_orders(&self) -> Result<Vec<Order>, ApiError> {
        Ok(self.created.lock().clone())
    }

    async fn refill_orders(&self, _ids: &[u64]) -> Result<(), ApiError> {
        Ok(())
    }

    async fn cancel_orders(&self, ids: &[u64]) -> Result<Vec<CancelResult>, ApiError> {
        Ok(ids.iter().map(|&id| CancelResult::accepted(id)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{User, UserCreate};
    use crate::user_actor::UserAction;

    #[tokio::test]
    async fn test_mock_client() {
        let (client, mut receiver) = create_mock_client::<User>(10);

        let create_task = tokio::spawn(async move {
            let user = UserCreate::new("Test", "test@example.com", "password123");
            let id = client.create(user).await?;
            client.perform_action(id, UserAction::Ban).await
        });

        let (payload, responder) = expect_create(&mut receiver).await.expect("Expected Create request");
        assert_eq!(payload.name, "Test");
        responder.send(Ok("user_1".to_string())).unwrap();

        let (id, action, responder) = expect_action(&mut receiver).await.expect("Expected Action request");
        assert_eq!(id, "user_1");
        assert_eq!(action, UserAction::Ban);
        responder.send(Ok(true)).unwrap();

        assert_eq!(create_task.await.unwrap(), Ok(true));
    }
}
