use serde::{Deserialize, Serialize};

use crate::error::FieldErrors;
use crate::order_form::Field;

/// Category summary embedded in a service listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRef {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
}

/// A catalog item operators can order against.
///
/// Free services take a username as the order target instead of a URL and
/// never repeat delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    /// Price per thousand units.
    pub rate: f64,
    pub min: i64,
    pub max: i64,
    #[serde(default)]
    pub is_free: bool,
    #[serde(default)]
    pub dripfeed: bool,
    #[serde(default)]
    pub refill: bool,
    #[serde(default)]
    pub cancel: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<CategoryRef>,
}

/// Payload for creating a new service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceCreate {
    pub name: String,
    pub rate: f64,
    pub min: i64,
    pub max: i64,
    pub is_free: bool,
    pub dripfeed: bool,
    pub refill: bool,
    pub cancel: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
}

impl Service {
    pub fn new(id: impl Into<String>, name: impl Into<String>, rate: f64, min: i64, max: i64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            rate,
            min,
            max,
            is_free: false,
            dripfeed: false,
            refill: false,
            cancel: false,
            category: None,
        }
    }

    pub fn free(mut self) -> Self {
        self.is_free = true;
        self
    }

    pub fn in_category(mut self, category: CategoryRef) -> Self {
        self.category = Some(category);
        self
    }

    pub fn accepts_quantity(&self, quantity: i64) -> bool {
        (self.min..=self.max).contains(&quantity)
    }

    /// Charge for `quantity` units at this service's per-thousand rate.
    pub fn charge_for(&self, quantity: i64) -> f64 {
        self.rate * quantity as f64 / 1000.0
    }
}

impl ServiceCreate {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if self.name.trim().is_empty() {
            errors.add(Field::Name, "Service name is required");
        }
        if self.rate.is_nan() || self.rate < 0.0 {
            errors.add(Field::Rate, "Rate is required");
        }
        if self.min < 1 {
            errors.add(Field::Min, "Minimum quantity is required");
        }
        if self.max < 1 {
            errors.add(Field::Max, "Maximum quantity is required");
        } else if self.max < self.min {
            errors.add(Field::Max, "Maximum quantity must not be below the minimum");
        }
        if self.category_id.as_deref().is_some_and(|c| c.trim().is_empty()) {
            errors.add(Field::Category, "Category is required");
        }
        errors.into_result(())
    }

    pub fn from_service(service: &Service) -> Self {
        Self {
            name: service.name.clone(),
            rate: service.rate,
            min: service.min,
            max: service.max,
            is_free: service.is_free,
            dripfeed: service.dripfeed,
            refill: service.refill,
            cancel: service.cancel,
            category_id: service.category.as_ref().map(|c| c.id.clone()),
        }
    }
}
