use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

use crate::actor_framework::FrameworkError;
use crate::order_form::Field;

/// A validation message attached to one form field.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{field}: {message}")]
pub struct FieldError {
    pub field: Field,
    pub message: String,
}

impl FieldError {
    pub fn new(field: Field, message: impl Into<String>) -> Self {
        Self { field, message: message.into() }
    }
}

/// Field-level validation failures, at most one message per field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<Field, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `message` for `field` unless the field already has one.
    pub fn add(&mut self, field: Field, message: impl Into<String>) {
        self.0.entry(field).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn contains(&self, field: Field) -> bool {
        self.0.contains_key(&field)
    }

    pub fn remove(&mut self, field: Field) {
        self.0.remove(&field);
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn extend(&mut self, other: FieldErrors) {
        for (field, message) in other.0 {
            self.add(field, message);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.0.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = FieldError> + '_ {
        self.0.iter().map(|(field, message)| FieldError::new(*field, message.clone()))
    }

    pub(crate) fn into_result<T>(self, value: T) -> Result<T, FieldErrors> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

impl From<FieldError> for FieldErrors {
    fn from(error: FieldError) -> Self {
        let mut errors = FieldErrors::new();
        errors.add(error.field, error.message);
        errors
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "validation failed")?;
        for (i, (field, message)) in self.0.iter().enumerate() {
            let sep = if i == 0 { ": " } else { "; " };
            write!(f, "{sep}{field}: {message}")?;
        }
        Ok(())
    }
}

impl std::error::Error for FieldErrors {}

/// Failures talking to the panel's REST API (or its in-process stand-in).
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("JSON serialization/deserialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("API error: {status} - {message}")]
    Status { status: u16, message: String },
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Request rejected: {0}")]
    Rejected(String),
    #[error("Empty response from {0}")]
    EmptyResponse(String),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl ApiError {
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self::Status { status, message: message.into() }
    }

    /// The server-supplied explanation, if the failure carried one worth showing.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Status { message, .. } if !message.is_empty() => Some(message),
            ApiError::Rejected(message) => Some(message),
            _ => None,
        }
    }
}

impl From<FrameworkError> for ApiError {
    fn from(error: FrameworkError) -> Self {
        match error {
            FrameworkError::NotFound(id) => ApiError::NotFound(id),
            FrameworkError::Rejected(reason) => ApiError::Rejected(reason),
            other => ApiError::ActorCommunicationError(other.to_string()),
        }
    }
}

/// Failures while loading [`crate::config::PanelConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Failed to write config file {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}
