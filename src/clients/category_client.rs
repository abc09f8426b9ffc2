use std::sync::Arc;

use tracing::instrument;

use crate::api::CategoryApi;
use crate::cache::{CollectionKey, QueryCache};
use crate::category_actor::CategoryError;
use crate::domain::{Category, CategoryCreate, CategoryPatch};
use crate::notify::Notifier;

/// Client for service categories. Names are trimmed and length-checked
/// before any request is sent.
#[derive(Clone)]
pub struct CategoryClient {
    api: Arc<dyn CategoryApi>,
    cache: QueryCache,
    notifier: Arc<dyn Notifier>,
}

impl_basic_client!(CategoryClient, CategoryApi, Category, CategoryError, categories, Categories);

impl CategoryClient {
    #[instrument(skip(self))]
    pub async fn create_category(&self, name: &str) -> Result<Category, CategoryError> {
        let payload = CategoryCreate::new(name)?;
        match self.api.create_category(&payload).await {
            Ok(category) => {
                self.cache.invalidate(CollectionKey::Categories).await;
                self.notifier.success("Category created successfully!");
                Ok(category)
            }
            Err(e) => {
                notify_failure!(self.notifier, &e, "Failed to create category");
                Err(e.into())
            }
        }
    }

    #[instrument(skip(self))]
    pub async fn update_category(&self, id: &str, name: &str) -> Result<Category, CategoryError> {
        let patch = CategoryPatch::new(name)?;
        match self.api.update_category(id, &patch).await {
            Ok(category) => {
                self.cache.invalidate(CollectionKey::Categories).await;
                self.notifier.success("Category updated successfully!");
                Ok(category)
            }
            Err(e) => {
                notify_failure!(self.notifier, &e, "Failed to update category");
                Err(e.into())
            }
        }
    }

    #[instrument(skip(self))]
    pub async fn delete_category(&self, id: &str) -> Result<(), CategoryError> {
        match self.api.delete_category(id).await {
            Ok(()) => {
                self.cache.invalidate(CollectionKey::Categories).await;
                self.notifier.success("Category deleted successfully!");
                Ok(())
            }
            Err(e) => {
                notify_failure!(self.notifier, &e, "Failed to delete category");
                Err(e.into())
            }
        }
    }
}
