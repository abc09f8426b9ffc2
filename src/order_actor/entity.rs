use chrono::Utc;

use crate::actor_framework::Entity;
use crate::domain::{Order, OrderStatus};
use crate::order_form::{OrderPayload, OrderRequest};
use super::actions::{OrderAction, OrderActionResult};

/// Creation payload: the validated request plus the computed charge.
#[derive(Debug, Clone)]
pub struct OrderRecord {
    pub request: OrderRequest,
    pub charge: f64,
}

impl Entity for Order {
    type Id = String;
    type CreatePayload = OrderRecord;
    type Patch = (); // Orders change only through actions
    type Action = OrderAction;
    type ActionResult = OrderActionResult;

    fn id(&self) -> &String { &self.id }

    /// Creates a new Order from a submitted request.
    ///
    /// # Notes
    /// The provider order id mirrors the record id and the order starts as
    /// `pending`. Subscriptions target a username rather than a link.
    fn from_create(id: String, record: OrderRecord) -> Result<Self, String> {
        let request = record.request;
        let link = match &request.payload {
            OrderPayload::Subscriptions(sub) => sub.username.clone(),
            payload => payload.link().unwrap_or_default().to_string(),
        };
        Ok(Self {
            provider_order_id: id.clone(),
            id,
            service_id: request.service_id,
            order_type: request.payload.order_type().to_string(),
            link,
            quantity: request.payload.quantity().unwrap_or(1),
            charge: Some(record.charge),
            status: OrderStatus::Pending,
            created_at: Utc::now(),
        })
    }

    fn on_update(&mut self, _patch: ()) -> Result<(), String> {
        Ok(())
    }

    /// Handles order-specific actions.
    ///
    /// # Actions
    /// - `Refill`: allowed for completed or partial orders
    /// - `Cancel`: moves pending/in-progress orders to `canceled`
    /// - `UpdateStatus`: overwrites the provider status
    fn handle_action(&mut self, action: OrderAction) -> Result<OrderActionResult, String> {
        match action {
            OrderAction::Refill => {
                if self.status.is_refillable() {
                    Ok(OrderActionResult::Refill)
                } else {
                    Err(format!("Order {} is not eligible for refill ({})", self.id, self.status))
                }
            }
            OrderAction::Cancel => {
                if self.status.is_cancellable() {
                    self.status = OrderStatus::Canceled;
                    Ok(OrderActionResult::Cancel(Ok(())))
                } else {
                    Ok(OrderActionResult::Cancel(Err(format!(
                        "Order {} cannot be canceled ({})",
                        self.id, self.status
                    ))))
                }
            }
            OrderAction::UpdateStatus(status) => {
                self.status = status.clone();
                Ok(OrderActionResult::UpdateStatus(status))
            }
        }
    }
}
