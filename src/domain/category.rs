use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::FieldError;
use crate::order_form::Field;

pub const CATEGORY_NAME_MIN_LEN: usize = 2;

/// A grouping of services shown in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryCreate {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryPatch {
    pub name: String,
}

/// Trims a category name and checks its minimum length.
pub fn validated_category_name(raw: &str) -> Result<String, FieldError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(FieldError::new(Field::Name, "Category name is required"));
    }
    if name.chars().count() < CATEGORY_NAME_MIN_LEN {
        return Err(FieldError::new(Field::Name, "Name must be at least 2 characters"));
    }
    Ok(name.to_string())
}

impl CategoryCreate {
    pub fn new(name: &str) -> Result<Self, FieldError> {
        Ok(Self { name: validated_category_name(name)? })
    }
}

impl CategoryPatch {
    pub fn new(name: &str) -> Result<Self, FieldError> {
        Ok(Self { name: validated_category_name(name)? })
    }
}
