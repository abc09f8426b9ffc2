use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::FieldErrors;
use crate::order_form::Field;

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email pattern"));

pub const USER_NAME_MIN_LEN: usize = 2;
pub const PASSWORD_MIN_LEN: usize = 8;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

/// Represents a registered panel account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub is_banned: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for registering a new user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserCreate {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Partial update for an existing user. Blank strings mean "leave unchanged".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

fn check_name(name: &str, errors: &mut FieldErrors) {
    if name.chars().count() < USER_NAME_MIN_LEN {
        errors.add(Field::Name, "Name must be at least 2 characters");
    }
}

fn check_email(email: &str, errors: &mut FieldErrors) {
    if !EMAIL_PATTERN.is_match(email) {
        errors.add(Field::Email, "Invalid email address");
    }
}

fn check_password(password: &str, errors: &mut FieldErrors) {
    if password.chars().count() < PASSWORD_MIN_LEN {
        errors.add(Field::Password, "Password must be at least 8 characters");
    }
}

impl User {
    pub fn new(id: impl Into<String>, name: impl Into<String>, email: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            name: name.into(),
            email: email.into(),
            role: Role::User,
            is_banned: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl UserCreate {
    pub fn new(name: impl Into<String>, email: impl Into<String>, password: impl Into<String>) -> Self {
        Self { name: name.into(), email: email.into(), password: password.into() }
    }

    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        check_name(&self.name, &mut errors);
        check_email(&self.email, &mut errors);
        check_password(&self.password, &mut errors);
        errors.into_result(())
    }
}

impl UserPatch {
    /// Drops blank values, then validates whatever remains.
    pub fn cleaned(self) -> Result<Self, FieldErrors> {
        let keep = |value: Option<String>| value.filter(|v| !v.is_empty());
        let patch = Self {
            name: keep(self.name),
            email: keep(self.email),
            password: keep(self.password),
            role: self.role,
        };

        let mut errors = FieldErrors::new();
        if let Some(name) = &patch.name {
            check_name(name, &mut errors);
        }
        if let Some(email) = &patch.email {
            check_email(email, &mut errors);
        }
        if let Some(password) = &patch.password {
            check_password(password, &mut errors);
        }
        errors.into_result(patch)
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.password.is_none() && self.role.is_none()
    }
}
