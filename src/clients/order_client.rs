use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::api::OrderApi;
use crate::cache::{CollectionKey, QueryCache};
use crate::domain::{CancelResult, Order};
use crate::notify::Notifier;
use crate::order_actor::OrderError;

pub const ORDERS_REFILLED: &str = "Orders refilled successfully!";
pub const ORDERS_CANCELLED: &str = "Orders cancelled successfully!";

/// Client for placed orders: listing plus bulk refill and cancel.
///
/// Orders themselves are created through
/// [`OrderSubmitter`](crate::order_form::OrderSubmitter).
#[derive(Clone)]
pub struct OrderClient {
    api: Arc<dyn OrderApi>,
    cache: QueryCache,
    notifier: Arc<dyn Notifier>,
}

impl_basic_client!(OrderClient, OrderApi, Order, OrderError, orders, Orders);

/// Provider order ids as the bulk endpoints expect them.
fn provider_ids(ids: &[String]) -> Result<Vec<u64>, OrderError> {
    if ids.is_empty() {
        return Err(OrderError::NoOrdersSelected);
    }
    ids.iter()
        .map(|id| id.trim().parse().map_err(|_| OrderError::InvalidOrderId(id.clone())))
        .collect()
}

impl OrderClient {
    #[instrument(skip(self))]
    pub async fn refill_orders(&self, ids: &[String]) -> Result<(), OrderError> {
        let ids = provider_ids(ids)?;
        match self.api.refill_orders(&ids).await {
            Ok(()) => {
                info!(count = ids.len(), "Orders refilled");
                self.cache.invalidate(CollectionKey::Orders).await;
                self.notifier.success(ORDERS_REFILLED);
                Ok(())
            }
            Err(e) => {
                notify_failure!(self.notifier, &e, "Failed to refill orders");
                Err(e.into())
            }
        }
    }

    /// Cancels the given orders. Per-order refusals are not errors; the first
    /// one is shown to the operator in place of the success notice.
    #[instrument(skip(self))]
    pub async fn cancel_orders(&self, ids: &[String]) -> Result<Vec<CancelResult>, OrderError> {
        let ids = provider_ids(ids)?;
        match self.api.cancel_orders(&ids).await {
            Ok(results) => {
                self.cache.invalidate(CollectionKey::Orders).await;
                match results.iter().find_map(|r| r.cancel.error.as_deref()) {
                    Some(refusal) => {
                        warn!(refusal, "Cancel refused for some orders");
                        self.notifier.error(refusal);
                    }
                    None => self.notifier.success(ORDERS_CANCELLED),
                }
                Ok(results)
            }
            Err(e) => {
                notify_failure!(self.notifier, &e, "Failed to cancel orders");
                Err(e.into())
            }
        }
    }
}
