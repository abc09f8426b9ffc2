use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use reqwest::Url;
use tracing::debug;

use crate::domain::Service;
use crate::error::{FieldError, FieldErrors};
use super::draft::{FieldValue, OrderDraft};
use super::payload::OrderRequest;
use super::registry::{self, Field, OrderType};

static USERNAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^@?[a-zA-Z0-9._]+$").expect("valid username pattern"));

pub const USERNAME_MIN_LEN: usize = 3;
pub const USERNAME_MAX_LEN: usize = 30;

pub const INVALID_USERNAME: &str = "Invalid username format. Use only letters, numbers, underscores, and dots.";
pub const USERNAME_TOO_SHORT: &str = "Username must be at least 3 characters long.";
pub const USERNAME_TOO_LONG: &str = "Username must be less than 30 characters long.";
pub const INVALID_URL: &str = "Invalid URL format. Please enter a valid URL.";

/// Whether the form is opened from a specific service or lets the operator pick one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormScope {
    Open,
    ServiceScoped,
}

/// Checks an order target against the rules for free or paid services.
pub fn check_link(link: &str, is_free: bool) -> Result<(), &'static str> {
    if is_free {
        if !USERNAME_PATTERN.is_match(link) {
            return Err(INVALID_USERNAME);
        }
        let len = link.chars().count();
        if len < USERNAME_MIN_LEN {
            return Err(USERNAME_TOO_SHORT);
        }
        if len > USERNAME_MAX_LEN {
            return Err(USERNAME_TOO_LONG);
        }
        Ok(())
    } else {
        Url::parse(link).map(|_| ()).map_err(|_| INVALID_URL)
    }
}

/// Owns the order draft and everything derived from it.
///
/// All transitions are synchronous; the submission adapter drives the
/// asynchronous part.
#[derive(Debug, Clone)]
pub struct OrderFormController {
    draft: OrderDraft,
    service: Option<Service>,
    scope: FormScope,
    errors: FieldErrors,
    root_error: Option<String>,
    session: u64,
}

impl Default for OrderFormController {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderFormController {
    /// A form where the operator picks the service.
    pub fn new() -> Self {
        Self {
            draft: OrderDraft::new(),
            service: None,
            scope: FormScope::Open,
            errors: FieldErrors::new(),
            root_error: None,
            session: 0,
        }
    }

    /// A form opened from one service's "order" action.
    pub fn for_service(service: Service) -> Self {
        let mut form = Self {
            draft: OrderDraft::for_service(service.id.clone()),
            service: Some(service),
            scope: FormScope::ServiceScoped,
            errors: FieldErrors::new(),
            root_error: None,
            session: 0,
        };
        form.seed_defaults();
        form
    }

    pub fn draft(&self) -> &OrderDraft {
        &self.draft
    }

    pub fn order_type(&self) -> OrderType {
        self.draft.order_type
    }

    pub fn service(&self) -> Option<&Service> {
        self.service.as_ref()
    }

    pub fn scope(&self) -> FormScope {
        self.scope
    }

    pub fn is_free(&self) -> bool {
        self.service.as_ref().is_some_and(|s| s.is_free)
    }

    /// Bumped whenever the form is closed; results for older sessions are stale.
    pub fn session(&self) -> u64 {
        self.session
    }

    pub fn set_type(&mut self, order_type: OrderType) {
        if self.draft.order_type != order_type {
            debug!(from = %self.draft.order_type, to = %order_type, "Order type changed");
            self.draft.order_type = order_type;
            self.errors.clear();
        }
    }

    /// Sets one field. A `serviceId` goes through the same path as
    /// [`select_service_id`](Self::select_service_id) without a catalog.
    pub fn set_field(&mut self, field: Field, value: FieldValue) -> Result<(), FieldError> {
        if field == Field::ServiceId {
            return match value {
                FieldValue::Text(id) => {
                    self.change_service_id(&id);
                    Ok(())
                }
                _ => Err(FieldError::new(field, "Expected text")),
            };
        }
        self.draft.set(field, value)?;
        self.errors.remove(field);
        Ok(())
    }

    /// Applies raw text typed into `field`'s input.
    pub fn set_input(&mut self, field: Field, raw: &str) -> Result<(), FieldError> {
        if field == Field::ServiceId {
            self.change_service_id(raw);
            return Ok(());
        }
        self.draft.set_input(field, raw)?;
        self.errors.remove(field);
        Ok(())
    }

    /// Points the draft at `service`. Switching to a different service
    /// resets `quantity` to 0, since the old value may be outside the new bounds.
    pub fn select_service(&mut self, service: Service) {
        if self.draft.service_id != service.id {
            debug!(service_id = %service.id, "Service selected");
            self.draft.service_id = service.id.clone();
            self.draft.set(Field::Quantity, FieldValue::Integer(0)).ok();
            self.errors.remove(Field::Quantity);
        }
        self.errors.remove(Field::ServiceId);
        self.service = Some(service);
    }

    /// Selects a service by id from an already fetched catalog.
    ///
    /// Returns `false` when the id is not in `services`; the id is still kept.
    pub fn select_service_id(&mut self, service_id: &str, services: &[Service]) -> bool {
        match services.iter().find(|s| s.id == service_id) {
            Some(service) => {
                self.select_service(service.clone());
                true
            }
            None => {
                self.change_service_id(service_id);
                self.service = None;
                false
            }
        }
    }

    /// Points the draft at an unresolved service id. A different id resets
    /// `quantity` to 0 and drops the previously resolved service.
    fn change_service_id(&mut self, service_id: &str) {
        self.errors.remove(Field::ServiceId);
        if self.draft.service_id == service_id {
            return;
        }
        debug!(service_id, "Service id changed");
        self.draft.service_id = service_id.to_string();
        self.draft.set(Field::Quantity, FieldValue::Integer(0)).ok();
        self.errors.remove(Field::Quantity);
        if self.service.as_ref().is_some_and(|s| s.id != service_id) {
            self.service = None;
        }
    }

    /// Fields the form currently shows, in display order.
    ///
    /// Free services never repeat delivery, so `runs` and `interval` are hidden.
    pub fn visible_fields(&self) -> Vec<Field> {
        let free = self.is_free();
        registry::schema(self.draft.order_type)
            .iter()
            .map(|spec| spec.field)
            .filter(|field| !(free && matches!(field, Field::Runs | Field::Interval)))
            .collect()
    }

    pub fn required_fields(&self) -> BTreeSet<Field> {
        registry::required_fields(self.draft.order_type)
    }

    pub fn link_label(&self) -> &'static str {
        if self.is_free() { "Username" } else { "Link" }
    }

    pub fn link_placeholder(&self) -> &'static str {
        if self.is_free() { "username" } else { "https://example.com" }
    }

    pub fn quantity_label(&self) -> String {
        match &self.service {
            Some(service) => format!("Quantity (Min: {} and Max: {})", service.min, service.max),
            None => "Quantity".to_string(),
        }
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn field_error(&self, field: Field) -> Option<&str> {
        self.errors.get(field)
    }

    pub fn root_error(&self) -> Option<&str> {
        self.root_error.as_deref()
    }

    pub(crate) fn set_root_error(&mut self, message: impl Into<String>) {
        self.root_error = Some(message.into());
    }

    /// Validates the draft for submission and returns the request to send.
    ///
    /// On failure the errors are attached to their fields and returned.
    pub fn prepare_submission(&mut self) -> Result<OrderRequest, FieldErrors> {
        self.errors.clear();
        self.root_error = None;

        if self.is_free() && self.draft.order_type == OrderType::Default {
            self.draft.set(Field::Runs, FieldValue::Integer(0)).ok();
            self.draft.set(Field::Interval, FieldValue::Integer(0)).ok();
        }

        let validated = registry::validate(&self.draft);
        let mut errors = match &validated {
            Ok(_) => FieldErrors::new(),
            Err(errors) => errors.clone(),
        };
        self.check_service_rules(&mut errors);

        match validated {
            Ok(request) if errors.is_empty() => Ok(request),
            _ => {
                debug!(errors = %errors, "Order draft rejected");
                self.errors = errors.clone();
                Err(errors)
            }
        }
    }

    fn check_service_rules(&self, errors: &mut FieldErrors) {
        let order_type = self.draft.order_type;

        if registry::field_spec(order_type, Field::Link).is_some() && !errors.contains(Field::Link) {
            if let Some(link) = self.draft.text(Field::Link).filter(|l| !l.is_empty()) {
                if let Err(message) = check_link(link, self.is_free()) {
                    errors.add(Field::Link, message);
                }
            }
        }

        if let Some(service) = &self.service {
            if registry::field_spec(order_type, Field::Quantity).is_some() && !errors.contains(Field::Quantity) {
                if let Some(quantity) = self.draft.integer(Field::Quantity) {
                    if !service.accepts_quantity(quantity) {
                        errors.add(
                            Field::Quantity,
                            format!("Quantity must be between {} and {}", service.min, service.max),
                        );
                    }
                }
            }
        }
    }

    /// Back to a fresh draft after a successful submission.
    ///
    /// A service-scoped form keeps its service; an open form clears it.
    pub fn reset(&mut self) {
        self.errors.clear();
        self.root_error = None;
        match self.scope {
            FormScope::ServiceScoped => {
                self.draft = OrderDraft::for_service(self.draft.service_id.clone());
                self.seed_defaults();
            }
            FormScope::Open => {
                self.draft = OrderDraft::new();
                self.service = None;
            }
        }
    }

    /// Dialog closed: discard the draft and all errors.
    pub fn close(&mut self) {
        self.session += 1;
        self.reset();
    }

    fn seed_defaults(&mut self) {
        if self.is_free() {
            self.draft.set(Field::Runs, FieldValue::Integer(0)).ok();
            self.draft.set(Field::Interval, FieldValue::Integer(0)).ok();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order_form::OrderPayload;

    fn paid() -> Service {
        Service::new("svc1", "Instagram Likes", 1.5, 10, 1000)
    }

    fn free() -> Service {
        Service::new("svc_free", "Free Followers", 0.0, 10, 100).free()
    }

    fn link_error(service: Service, link: &str) -> Option<String> {
        let mut form = OrderFormController::for_service(service);
        form.set_type(OrderType::Package);
        form.set_field(Field::Link, link.into()).unwrap();
        form.prepare_submission().err().and_then(|e| e.get(Field::Link).map(str::to_string))
    }

    #[test]
    fn test_required_fields_match_registry_for_every_type() {
        for order_type in OrderType::ALL {
            let mut form = OrderFormController::new();
            form.set_type(order_type);
            assert_eq!(form.required_fields(), registry::required_fields(order_type));

            let errors = form.prepare_submission().unwrap_err();
            let reported: BTreeSet<Field> = errors.fields().collect();
            assert_eq!(reported, registry::required_fields(order_type), "{order_type}");
        }
    }

    #[test]
    fn test_free_service_username_rules() {
        assert_eq!(link_error(free(), "ab").as_deref(), Some(USERNAME_TOO_SHORT));
        assert_eq!(link_error(free(), "abc"), None);
        assert_eq!(link_error(free(), "@user.name_1"), None);
        assert_eq!(link_error(free(), "invalid link!").as_deref(), Some(INVALID_USERNAME));
        assert_eq!(link_error(free(), &"a".repeat(31)).as_deref(), Some(USERNAME_TOO_LONG));
        assert_eq!(link_error(free(), &"a".repeat(30)), None);
    }

    #[test]
    fn test_paid_service_requires_url() {
        assert_eq!(link_error(paid(), "not-a-url").as_deref(), Some(INVALID_URL));
        assert_eq!(link_error(paid(), "https://example.com/p/1"), None);
    }

    #[test]
    fn test_unresolved_service_validates_link_as_url() {
        let mut form = OrderFormController::new();
        form.set_field(Field::ServiceId, "unknown".into()).unwrap();
        form.set_type(OrderType::Package);
        form.set_field(Field::Link, "someone".into()).unwrap();
        assert_eq!(form.prepare_submission().unwrap_err().get(Field::Link), Some(INVALID_URL));
    }

    #[test]
    fn test_type_switch_does_not_leak_fields() {
        let mut form = OrderFormController::for_service(paid());
        form.set_type(OrderType::MentionsWithHashtags);
        form.set_field(Field::Usernames, "@a, @b".into()).unwrap();
        form.set_field(Field::Hashtags, "#x".into()).unwrap();
        form.set_type(OrderType::Subscriptions);
        form.set_field(Field::Username, "brand".into()).unwrap();
        form.set_type(OrderType::Default);
        form.set_field(Field::Link, "https://example.com/p/1".into()).unwrap();
        form.set_field(Field::Quantity, 100.into()).unwrap();
        form.set_field(Field::Interval, 5.into()).unwrap();

        let request = form.prepare_submission().unwrap();
        let json = serde_json::to_value(&request).unwrap();
        let keys: BTreeSet<&str> = json.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, BTreeSet::from(["serviceId", "type", "link", "quantity", "interval"]));
    }

    #[test]
    fn test_selecting_new_service_resets_quantity() {
        let mut form = OrderFormController::new();
        form.select_service(paid());
        form.set_field(Field::Quantity, 500.into()).unwrap();

        form.select_service(paid());
        assert_eq!(form.draft().integer(Field::Quantity), Some(500));

        form.select_service(Service::new("svc2", "Views", 0.2, 100, 10_000));
        assert_eq!(form.draft().integer(Field::Quantity), Some(0));

        let services = vec![paid()];
        form.set_field(Field::Quantity, 700.into()).unwrap();
        assert!(form.select_service_id("svc1", &services));
        assert_eq!(form.draft().integer(Field::Quantity), Some(0));
        assert!(!form.select_service_id("gone", &services));
        assert!(form.service().is_none());
    }

    #[test]
    fn test_service_id_field_drops_resolved_service() {
        let mut form = OrderFormController::for_service(free());
        form.set_type(OrderType::Package);
        form.set_field(Field::Quantity, 50.into()).unwrap();
        form.set_field(Field::Link, "someone".into()).unwrap();

        form.set_field(Field::ServiceId, "svc_paid".into()).unwrap();
        assert_eq!(form.draft().service_id, "svc_paid");
        assert_eq!(form.draft().integer(Field::Quantity), Some(0));
        assert!(form.service().is_none());
        assert!(!form.is_free());
        assert_eq!(form.prepare_submission().unwrap_err().get(Field::Link), Some(INVALID_URL));

        form.set_input(Field::ServiceId, "svc_other").unwrap();
        assert_eq!(form.draft().service_id, "svc_other");
        assert!(form.set_field(Field::ServiceId, 3.into()).is_err());
    }

    #[test]
    fn test_same_service_id_keeps_resolved_service() {
        let mut form = OrderFormController::for_service(paid());
        form.set_field(Field::Quantity, 500.into()).unwrap();
        form.set_field(Field::ServiceId, "svc1".into()).unwrap();
        assert_eq!(form.draft().integer(Field::Quantity), Some(500));
        assert_eq!(form.service().map(|s| s.id.as_str()), Some("svc1"));
    }

    #[test]
    fn test_free_default_forces_runs_and_interval() {
        let mut form = OrderFormController::for_service(free());
        assert_eq!(form.visible_fields(), vec![Field::Link, Field::Quantity]);

        form.set_field(Field::Link, "someone".into()).unwrap();
        form.set_field(Field::Quantity, 50.into()).unwrap();
        form.set_field(Field::Runs, 7.into()).unwrap();
        form.set_field(Field::Interval, 15.into()).unwrap();

        let request = form.prepare_submission().unwrap();
        match request.payload {
            OrderPayload::Default(order) => {
                assert_eq!(order.runs, Some(0));
                assert_eq!(order.interval, 0);
            }
            other => panic!("unexpected payload: {other:?}"),
        }
    }

    #[test]
    fn test_quantity_bounded_by_service() {
        let mut form = OrderFormController::for_service(paid());
        form.set_type(OrderType::Poll);
        form.set_field(Field::Link, "https://x.com/post/9".into()).unwrap();
        form.set_field(Field::AnswerNumber, 1.into()).unwrap();
        form.set_field(Field::Quantity, 5000.into()).unwrap();

        let errors = form.prepare_submission().unwrap_err();
        assert_eq!(errors.get(Field::Quantity), Some("Quantity must be between 10 and 1000"));
        assert_eq!(form.field_error(Field::Quantity), Some("Quantity must be between 10 and 1000"));

        form.set_field(Field::Quantity, 10.into()).unwrap();
        assert!(form.field_error(Field::Quantity).is_none());
        assert!(form.prepare_submission().is_ok());
    }

    #[test]
    fn test_reset_and_close() {
        let mut scoped = OrderFormController::for_service(paid());
        scoped.set_type(OrderType::Poll);
        scoped.set_root_error("Failed to create order");
        scoped.reset();
        assert_eq!(scoped.order_type(), OrderType::Default);
        assert_eq!(scoped.draft().service_id, "svc1");
        assert!(scoped.root_error().is_none());

        let mut open = OrderFormController::new();
        open.select_service(paid());
        open.set_root_error("Failed to create order");
        open.close();
        assert_eq!(open.session(), 1);
        assert!(open.root_error().is_none());
        assert!(open.draft().service_id.is_empty());
        assert!(open.service().is_none());
    }

    #[test]
    fn test_labels_follow_service_kind() {
        assert_eq!(OrderFormController::for_service(free()).link_label(), "Username");
        let form = OrderFormController::for_service(paid());
        assert_eq!(form.link_label(), "Link");
        assert_eq!(form.quantity_label(), "Quantity (Min: 10 and Max: 1000)");
    }
}
