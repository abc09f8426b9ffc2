use crate::domain::{CategoryRef, ServiceCreate};

// Creation payload with the category already resolved
#[derive(Debug, Clone)]
pub struct ServiceRecord {
    pub spec: ServiceCreate,
    pub category: Option<CategoryRef>,
}
