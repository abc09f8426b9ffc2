use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::api::{HttpPanelApi, InMemoryPanelApi, OrderApi, PanelApi};
use crate::cache::QueryCache;
use crate::clients::{CategoryClient, OrderClient, ServiceClient, UserClient};
use crate::config::{ListingConfig, PanelConfig};
use crate::domain::{Order, Service, User};
use crate::error::ApiError;
use crate::listing::{
    paginate, recent_orders, ListFilter, OrderFilter, OrderStats, Page, UserFilter, UserStats,
};
use crate::notify::Notifier;
use crate::order_actor::OrderError;
use crate::order_form::{OrderFormController, OrderSubmitter};
use crate::user_actor::UserError;

const CACHE_BUFFER: usize = 64;
const BACKEND_BUFFER: usize = 32;
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Order counts plus the latest orders, for the dashboard.
#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    pub stats: OrderStats,
    pub recent: Vec<Order>,
}

/// The wired-up panel: one query cache shared by every collection client.
pub struct PanelSystem {
    pub order_client: OrderClient,
    pub service_client: ServiceClient,
    pub category_client: CategoryClient,
    pub user_client: UserClient,
    orders_api: Arc<dyn OrderApi>,
    cache: QueryCache,
    notifier: Arc<dyn Notifier>,
    listing: ListingConfig,
    handles: Vec<JoinHandle<()>>,
}

impl PanelSystem {
    pub fn with_api<A: PanelApi + 'static>(
        api: Arc<A>,
        notifier: Arc<dyn Notifier>,
        listing: ListingConfig,
    ) -> Self {
        let (cache, cache_handle) = QueryCache::spawn(CACHE_BUFFER);

        let order_client = OrderClient::new(api.clone(), cache.clone(), notifier.clone());
        let service_client = ServiceClient::new(api.clone(), cache.clone(), notifier.clone());
        let category_client = CategoryClient::new(api.clone(), cache.clone(), notifier.clone());
        let user_client = UserClient::new(api.clone(), cache.clone(), notifier.clone());

        info!("Panel system started");
        Self {
            order_client,
            service_client,
            category_client,
            user_client,
            orders_api: api,
            cache,
            notifier,
            listing,
            handles: vec![cache_handle],
        }
    }

    /// Panel backed by in-process actors. The backend handle is returned for
    /// seeding and simulated provider updates.
    pub fn in_memory(config: &PanelConfig, notifier: Arc<dyn Notifier>) -> (Self, InMemoryPanelApi) {
        let backend = InMemoryPanelApi::spawn(BACKEND_BUFFER);
        let system = Self::with_api(Arc::new(backend.clone()), notifier, config.listing.clone());
        (system, backend)
    }

    /// Panel talking to the REST API at `config.api.base_url`.
    pub fn http(config: &PanelConfig, notifier: Arc<dyn Notifier>) -> Result<Self, ApiError> {
        let api = HttpPanelApi::new(config.api.clone())?;
        Ok(Self::with_api(Arc::new(api), notifier, config.listing.clone()))
    }

    /// Acts on behalf of the signed-in operator from now on.
    pub fn sign_in(&mut self, user_id: impl Into<String>) {
        self.user_client = self.user_client.clone().acting_as(user_id);
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    /// The open order form, where the operator picks the service.
    pub fn order_form(&self) -> OrderSubmitter {
        self.submitter(OrderFormController::new())
    }

    /// An order form bound to `service`.
    pub fn order_form_for_service(&self, service: Service) -> OrderSubmitter {
        self.submitter(OrderFormController::for_service(service))
    }

    fn submitter(&self, form: OrderFormController) -> OrderSubmitter {
        OrderSubmitter::new(form, self.orders_api.clone(), self.cache.clone(), self.notifier.clone())
    }

    pub async fn orders_page(&self, filter: &OrderFilter, page: usize) -> Result<Page<Order>, OrderError> {
        let orders = filter.apply(&self.order_client.list_orders().await?);
        Ok(paginate(&orders, page, self.listing.orders_per_page))
    }

    pub async fn users_page(&self, filter: &UserFilter, page: usize) -> Result<Page<User>, UserError> {
        let users = filter.apply(&self.user_client.list_users().await?);
        Ok(paginate(&users, page, self.listing.users_per_page))
    }

    pub async fn user_stats(&self) -> Result<UserStats, UserError> {
        Ok(UserStats::from_users(&self.user_client.list_users().await?, Utc::now()))
    }

    pub async fn dashboard(&self) -> Result<Dashboard, OrderError> {
        let orders = self.order_client.list_orders().await?;
        Ok(Dashboard {
            stats: OrderStats::from_orders(&orders),
            recent: recent_orders(&orders, self.listing.recent_orders),
        })
    }

    /// Drops every client and waits for the cache actor to stop.
    ///
    /// Order forms still alive keep the cache open; after a grace period the
    /// actor is aborted instead.
    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down panel system...");
        let Self { order_client, service_client, category_client, user_client, cache, handles, .. } = self;
        drop((order_client, service_client, category_client, user_client, cache));

        for mut handle in handles {
            match tokio::time::timeout(SHUTDOWN_GRACE, &mut handle).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    error!("Actor task failed: {:?}", e);
                    return Err(format!("Actor task failed: {:?}", e));
                }
                Err(_) => {
                    warn!("Actor still referenced after grace period, aborting");
                    handle.abort();
                }
            }
        }

        info!("Panel system shutdown complete.");
        Ok(())
    }
}
