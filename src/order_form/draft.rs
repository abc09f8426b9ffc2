use std::collections::BTreeMap;

use crate::error::FieldError;
use super::registry::{Field, FieldKind, OrderType};

/// A single entered form value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Decimal(f64),
}

impl FieldValue {
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldValue::Text(_) => FieldKind::Text,
            FieldValue::Integer(_) => FieldKind::Integer,
            FieldValue::Decimal(_) => FieldKind::Decimal,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Integer(value.into())
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Decimal(value)
    }
}

/// Order data entered by an operator but not yet submitted.
///
/// Values for every field ever edited are retained; which of them matter is
/// decided by the selected [`OrderType`] at validation time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderDraft {
    pub order_type: OrderType,
    pub service_id: String,
    values: BTreeMap<Field, FieldValue>,
}

impl OrderDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_service(service_id: impl Into<String>) -> Self {
        Self { service_id: service_id.into(), ..Self::default() }
    }

    /// Stores `value` for `field`, rejecting values of the wrong shape.
    pub fn set(&mut self, field: Field, value: FieldValue) -> Result<(), FieldError> {
        if !field.is_order_field() {
            return Err(FieldError::new(field, "Not an order field"));
        }
        let value = match (field.kind(), value) {
            (FieldKind::Decimal, FieldValue::Integer(n)) => FieldValue::Decimal(n as f64),
            (expected, value) if value.kind() == expected => value,
            (FieldKind::Text, _) => return Err(FieldError::new(field, "Expected text")),
            (_, _) => return Err(FieldError::new(field, "Expected a number")),
        };

        if field == Field::ServiceId {
            if let FieldValue::Text(id) = value {
                self.service_id = id;
            }
            return Ok(());
        }
        self.values.insert(field, value);
        Ok(())
    }

    /// Stores raw form input the way the panel's inputs coerce it.
    ///
    /// Number inputs keep the leading digits of what was typed. Required
    /// counts fall back to 0 when nothing numeric was entered, optional
    /// counts (`runs`, `posts`, `old_posts`) are cleared instead.
    pub fn set_input(&mut self, field: Field, raw: &str) -> Result<(), FieldError> {
        match field.kind() {
            FieldKind::Text => self.set(field, FieldValue::Text(raw.to_string())),
            FieldKind::Integer => {
                let parsed = parse_leading_int(raw).filter(|n| *n != 0);
                match (parsed, is_optional_count(field)) {
                    (Some(n), _) => self.set(field, FieldValue::Integer(n)),
                    (None, true) => {
                        self.clear(field);
                        Ok(())
                    }
                    (None, false) => self.set(field, FieldValue::Integer(0)),
                }
            }
            FieldKind::Decimal => match raw.trim().parse::<f64>() {
                Ok(n) if n.is_finite() => self.set(field, FieldValue::Decimal(n)),
                _ => {
                    self.clear(field);
                    Ok(())
                }
            },
        }
    }

    pub fn clear(&mut self, field: Field) {
        if field == Field::ServiceId {
            self.service_id.clear();
        } else {
            self.values.remove(&field);
        }
    }

    pub fn value(&self, field: Field) -> Option<&FieldValue> {
        self.values.get(&field)
    }

    pub fn text(&self, field: Field) -> Option<&str> {
        match self.values.get(&field) {
            Some(FieldValue::Text(text)) => Some(text),
            _ => None,
        }
    }

    pub fn integer(&self, field: Field) -> Option<i64> {
        match self.values.get(&field) {
            Some(FieldValue::Integer(n)) => Some(*n),
            _ => None,
        }
    }

    pub fn price(&self) -> Option<f64> {
        match self.values.get(&Field::Price) {
            Some(FieldValue::Decimal(n)) => Some(*n),
            _ => None,
        }
    }

    /// Fields holding a value, excluding `serviceId`.
    pub fn populated_fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.values.keys().copied()
    }
}

fn is_optional_count(field: Field) -> bool {
    matches!(field, Field::Runs | Field::Posts | Field::OldPosts)
}

/// Parses an optional sign followed by the leading run of digits.
fn parse_leading_int(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let (sign, rest) = match trimmed.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse::<i64>().ok().map(|n| sign * n)
}
