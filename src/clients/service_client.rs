use std::sync::Arc;

use tracing::{info, instrument};

use crate::api::ServiceApi;
use crate::cache::{CollectionKey, QueryCache};
use crate::domain::{Service, ServiceCreate};
use crate::notify::Notifier;
use crate::service_actor::ServiceError;

/// Client for the service catalog.
#[derive(Clone)]
pub struct ServiceClient {
    api: Arc<dyn ServiceApi>,
    cache: QueryCache,
    notifier: Arc<dyn Notifier>,
}

impl_basic_client!(ServiceClient, ServiceApi, Service, ServiceError, services, Services);

impl ServiceClient {
    #[instrument(skip(self, service), fields(name = %service.name))]
    pub async fn create_service(&self, service: ServiceCreate) -> Result<Service, ServiceError> {
        service.validate().map_err(ServiceError::Validation)?;
        match self.api.create_service(&service).await {
            Ok(created) => {
                info!(service_id = %created.id, "Service created");
                self.cache.invalidate(CollectionKey::Services).await;
                self.notifier.success("Service created successfully!");
                Ok(created)
            }
            Err(e) => {
                notify_failure!(self.notifier, &e, "Failed to create service");
                Err(e.into())
            }
        }
    }

    #[instrument(skip(self))]
    pub async fn delete_service(&self, id: &str) -> Result<(), ServiceError> {
        match self.api.delete_service(id).await {
            Ok(()) => {
                self.cache.invalidate(CollectionKey::Services).await;
                self.notifier.success("Service deleted successfully!");
                Ok(())
            }
            Err(e) => {
                notify_failure!(self.notifier, &e, "Failed to delete service");
                Err(e.into())
            }
        }
    }

    /// Looks a service up in the cached catalog.
    pub async fn find_service(&self, id: &str) -> Result<Option<Service>, ServiceError> {
        Ok(self.list_services().await?.into_iter().find(|s| s.id == id))
    }
}
