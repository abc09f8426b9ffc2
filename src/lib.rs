//! # smm-panel
//!
//! Core of an SMM reseller panel: the polymorphic order form and its
//! submission, collection clients over a shared query cache, and listing
//! helpers for the admin pages.
//!
//! The backend is either the panel's REST API ([`api::HttpPanelApi`]) or an
//! in-process stand-in built from resource actors ([`api::InMemoryPanelApi`]).

pub mod actor_framework;
pub mod api;
pub mod app_system;
pub mod cache;
pub mod category_actor;
pub mod clients;
pub mod config;
pub mod domain;
pub mod error;
pub mod listing;
pub mod notify;
pub mod order_actor;
pub mod order_form;
pub mod service_actor;
pub mod user_actor;

#[cfg(test)]
mod mock_framework;
