//! Order type registry.
//!
//! Each [`OrderType`] maps to a fixed list of [`FieldSpec`]s. The list is the
//! single source for which fields a form shows, which it requires, and how
//! each value is checked before submission.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{FieldError, FieldErrors};
use super::draft::{FieldValue, OrderDraft};
use super::payload::{OrderPayload, OrderRequest};

static DATE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{2}/\d{2}/\d{4}$").expect("valid date pattern"));

/// Discriminant selecting which fields an order submission carries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    #[default]
    Default,
    Package,
    CustomComments,
    MentionsWithHashtags,
    MentionsHashtag,
    Subscriptions,
    CommentLikes,
    Poll,
    CommentReplies,
}

impl OrderType {
    pub const ALL: [OrderType; 9] = [
        OrderType::Default,
        OrderType::Package,
        OrderType::CustomComments,
        OrderType::MentionsWithHashtags,
        OrderType::MentionsHashtag,
        OrderType::Subscriptions,
        OrderType::CommentLikes,
        OrderType::Poll,
        OrderType::CommentReplies,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderType::Default => "default",
            OrderType::Package => "package",
            OrderType::CustomComments => "custom_comments",
            OrderType::MentionsWithHashtags => "mentions_with_hashtags",
            OrderType::MentionsHashtag => "mentions_hashtag",
            OrderType::Subscriptions => "subscriptions",
            OrderType::CommentLikes => "comment_likes",
            OrderType::Poll => "poll",
            OrderType::CommentReplies => "comment_replies",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            OrderType::Default => "Default Order",
            OrderType::Package => "Package Order",
            OrderType::CustomComments => "Custom Comments",
            OrderType::MentionsWithHashtags => "Mentions with Hashtags",
            OrderType::MentionsHashtag => "Mentions Hashtag",
            OrderType::Subscriptions => "Subscriptions",
            OrderType::CommentLikes => "Comment Likes",
            OrderType::Poll => "Poll",
            OrderType::CommentReplies => "Comment Replies",
        }
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderType {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| FieldError::new(Field::Type, "Invalid order type"))
    }
}

/// Form fields known to the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    Type,
    ServiceId,
    Price,
    Link,
    Quantity,
    Runs,
    Interval,
    Comments,
    Usernames,
    Hashtags,
    Hashtag,
    Username,
    Min,
    Max,
    Delay,
    Posts,
    OldPosts,
    Expiry,
    AnswerNumber,
    // account and catalog forms
    Name,
    Email,
    Password,
    Rate,
    Category,
}

/// The value shape a field accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Integer,
    Decimal,
}

impl Field {
    /// Wire name used in API payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Type => "type",
            Field::ServiceId => "serviceId",
            Field::Price => "price",
            Field::Link => "link",
            Field::Quantity => "quantity",
            Field::Runs => "runs",
            Field::Interval => "interval",
            Field::Comments => "comments",
            Field::Usernames => "usernames",
            Field::Hashtags => "hashtags",
            Field::Hashtag => "hashtag",
            Field::Username => "username",
            Field::Min => "min",
            Field::Max => "max",
            Field::Delay => "delay",
            Field::Posts => "posts",
            Field::OldPosts => "old_posts",
            Field::Expiry => "expiry",
            Field::AnswerNumber => "answer_number",
            Field::Name => "name",
            Field::Email => "email",
            Field::Password => "password",
            Field::Rate => "rate",
            Field::Category => "category",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Field::Type => "Order Type",
            Field::ServiceId => "Service",
            Field::Price => "Price",
            Field::Link => "Link",
            Field::Quantity => "Quantity",
            Field::Runs => "Runs (Optional)",
            Field::Interval => "Interval",
            Field::Comments => "Comments",
            Field::Usernames => "Usernames",
            Field::Hashtags => "Hashtags",
            Field::Hashtag => "Hashtag",
            Field::Username => "Username",
            Field::Min => "Minimum",
            Field::Max => "Maximum",
            Field::Delay => "Delay (minutes)",
            Field::Posts => "Posts (Optional)",
            Field::OldPosts => "Old Posts (Optional)",
            Field::Expiry => "Expiry (Optional)",
            Field::AnswerNumber => "Answer Number",
            Field::Name => "Name",
            Field::Email => "Email",
            Field::Password => "Password",
            Field::Rate => "Rate",
            Field::Category => "Category",
        }
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            Field::Quantity
            | Field::Runs
            | Field::Interval
            | Field::Min
            | Field::Max
            | Field::Delay
            | Field::Posts
            | Field::OldPosts
            | Field::AnswerNumber => FieldKind::Integer,
            Field::Price | Field::Rate => FieldKind::Decimal,
            _ => FieldKind::Text,
        }
    }

    /// Whether the field belongs to an order draft at all.
    pub fn is_order_field(&self) -> bool {
        !matches!(
            self,
            Field::Type | Field::Name | Field::Email | Field::Password | Field::Rate | Field::Category
        )
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Constraint applied to a present value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// Non-empty text.
    Text,
    /// Any whole number.
    Integer,
    AtLeast(i64),
    /// Strictly greater than zero.
    Positive,
    /// Inclusive range.
    Between(i64, i64),
    /// `dd/mm/yyyy`.
    Date,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub field: Field,
    pub rule: Rule,
    pub required: bool,
    pub message: &'static str,
}

const fn required(field: Field, rule: Rule, message: &'static str) -> FieldSpec {
    FieldSpec { field, rule, required: true, message }
}

const fn optional(field: Field, rule: Rule, message: &'static str) -> FieldSpec {
    FieldSpec { field, rule, required: false, message }
}

const LINK: FieldSpec = required(Field::Link, Rule::Text, "Link/Username is required");
const QUANTITY: FieldSpec = required(Field::Quantity, Rule::AtLeast(1), "Quantity must be at least 1");
const USERNAME: FieldSpec = required(Field::Username, Rule::Text, "Username is required");
const COMMENTS: FieldSpec = required(Field::Comments, Rule::Text, "Comments are required");

static DEFAULT_FIELDS: [FieldSpec; 4] = [
    LINK,
    QUANTITY,
    optional(Field::Runs, Rule::Integer, "Runs must be a whole number"),
    required(Field::Interval, Rule::Integer, "Interval is required"),
];

static PACKAGE_FIELDS: [FieldSpec; 1] = [LINK];

static CUSTOM_COMMENTS_FIELDS: [FieldSpec; 2] = [LINK, COMMENTS];

static MENTIONS_WITH_HASHTAGS_FIELDS: [FieldSpec; 4] = [
    LINK,
    QUANTITY,
    required(Field::Usernames, Rule::Text, "Usernames are required"),
    required(Field::Hashtags, Rule::Text, "Hashtags are required"),
];

static MENTIONS_HASHTAG_FIELDS: [FieldSpec; 3] = [
    LINK,
    QUANTITY,
    required(Field::Hashtag, Rule::Text, "Hashtag is required"),
];

static SUBSCRIPTIONS_FIELDS: [FieldSpec; 7] = [
    USERNAME,
    required(Field::Min, Rule::AtLeast(1), "Minimum quantity must be at least 1"),
    required(Field::Max, Rule::AtLeast(1), "Maximum quantity must be at least 1"),
    required(Field::Delay, Rule::Between(0, 600), "Delay must be between 0 and 600 minutes"),
    optional(Field::Posts, Rule::Positive, "Posts must be positive"),
    optional(Field::OldPosts, Rule::Positive, "Old posts must be positive"),
    optional(Field::Expiry, Rule::Date, "Expiry date must be in dd/mm/yyyy format"),
];

static COMMENT_LIKES_FIELDS: [FieldSpec; 3] = [LINK, QUANTITY, USERNAME];

static POLL_FIELDS: [FieldSpec; 3] = [
    LINK,
    QUANTITY,
    required(Field::AnswerNumber, Rule::Positive, "Answer number must be positive"),
];

static COMMENT_REPLIES_FIELDS: [FieldSpec; 3] = [LINK, USERNAME, COMMENTS];

/// Type-specific fields for `order_type`, in display order.
///
/// `serviceId` and `price` are shared by every type and not listed here.
pub fn schema(order_type: OrderType) -> &'static [FieldSpec] {
    match order_type {
        OrderType::Default => &DEFAULT_FIELDS,
        OrderType::Package => &PACKAGE_FIELDS,
        OrderType::CustomComments => &CUSTOM_COMMENTS_FIELDS,
        OrderType::MentionsWithHashtags => &MENTIONS_WITH_HASHTAGS_FIELDS,
        OrderType::MentionsHashtag => &MENTIONS_HASHTAG_FIELDS,
        OrderType::Subscriptions => &SUBSCRIPTIONS_FIELDS,
        OrderType::CommentLikes => &COMMENT_LIKES_FIELDS,
        OrderType::Poll => &POLL_FIELDS,
        OrderType::CommentReplies => &COMMENT_REPLIES_FIELDS,
    }
}

pub fn field_spec(order_type: OrderType, field: Field) -> Option<&'static FieldSpec> {
    schema(order_type).iter().find(|spec| spec.field == field)
}

/// Every field a submission of `order_type` must carry, `serviceId` included.
pub fn required_fields(order_type: OrderType) -> BTreeSet<Field> {
    std::iter::once(Field::ServiceId)
        .chain(schema(order_type).iter().filter(|s| s.required).map(|s| s.field))
        .collect()
}

impl FieldSpec {
    /// Checks one draft value, returning the spec's message on failure.
    ///
    /// Blank text in an optional field counts as absent.
    pub fn check(&self, value: Option<&FieldValue>) -> Result<(), &'static str> {
        let value = match value {
            Some(FieldValue::Text(text)) if text.is_empty() && !self.required => None,
            other => other,
        };
        let Some(value) = value else {
            return if self.required { Err(self.message) } else { Ok(()) };
        };

        let ok = match (self.rule, value) {
            (Rule::Text, FieldValue::Text(text)) => !text.is_empty(),
            (Rule::Date, FieldValue::Text(text)) => DATE_PATTERN.is_match(text),
            (Rule::Integer, FieldValue::Integer(_)) => true,
            (Rule::AtLeast(min), FieldValue::Integer(n)) => *n >= min,
            (Rule::Positive, FieldValue::Integer(n)) => *n > 0,
            (Rule::Between(lo, hi), FieldValue::Integer(n)) => (lo..=hi).contains(n),
            _ => false,
        };
        if ok { Ok(()) } else { Err(self.message) }
    }
}

/// Validates `draft` against its type's schema and builds the submission.
///
/// Fields outside the selected type's schema are never inspected.
pub fn validate(draft: &OrderDraft) -> Result<OrderRequest, FieldErrors> {
    let mut errors = FieldErrors::new();

    if draft.service_id.trim().is_empty() {
        errors.add(Field::ServiceId, "Service ID is required");
    }
    if let Some(price) = draft.price() {
        if price < 0.0 {
            errors.add(Field::Price, "Price cannot be negative");
        }
    }
    for spec in schema(draft.order_type) {
        if let Err(message) = spec.check(draft.value(spec.field)) {
            errors.add(spec.field, message);
        }
    }

    if !errors.is_empty() {
        return Err(errors);
    }
    Ok(OrderRequest {
        service_id: draft.service_id.clone(),
        price: draft.price(),
        payload: OrderPayload::from_draft(draft),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(order_type: OrderType) -> OrderDraft {
        let mut draft = OrderDraft::for_service("svc1");
        draft.order_type = order_type;
        draft
    }

    #[test]
    fn test_order_type_wire_names() {
        for order_type in OrderType::ALL {
            assert_eq!(order_type.as_str().parse::<OrderType>().unwrap(), order_type);
            assert_eq!(
                serde_json::to_value(order_type).unwrap(),
                serde_json::Value::String(order_type.as_str().to_string())
            );
        }
        let err = "bulk".parse::<OrderType>().unwrap_err();
        assert_eq!(err.message, "Invalid order type");
    }

    #[test]
    fn test_required_fields_per_type() {
        use Field::*;
        let expected: [(OrderType, &[Field]); 9] = [
            (OrderType::Default, &[ServiceId, Link, Quantity, Interval]),
            (OrderType::Package, &[ServiceId, Link]),
            (OrderType::CustomComments, &[ServiceId, Link, Comments]),
            (OrderType::MentionsWithHashtags, &[ServiceId, Link, Quantity, Usernames, Hashtags]),
            (OrderType::MentionsHashtag, &[ServiceId, Link, Quantity, Hashtag]),
            (OrderType::Subscriptions, &[ServiceId, Username, Min, Max, Delay]),
            (OrderType::CommentLikes, &[ServiceId, Link, Quantity, Username]),
            (OrderType::Poll, &[ServiceId, Link, Quantity, AnswerNumber]),
            (OrderType::CommentReplies, &[ServiceId, Link, Username, Comments]),
        ];
        for (order_type, fields) in expected {
            let fields: BTreeSet<Field> = fields.iter().copied().collect();
            assert_eq!(required_fields(order_type), fields, "{order_type}");
        }
    }

    #[test]
    fn test_empty_draft_reports_exactly_required_fields() {
        for order_type in OrderType::ALL {
            let mut empty = OrderDraft::default();
            empty.order_type = order_type;
            let errors = validate(&empty).unwrap_err();
            let reported: BTreeSet<Field> = errors.fields().collect();
            assert_eq!(reported, required_fields(order_type), "{order_type}");
        }
    }

    #[test]
    fn test_subscription_rules() {
        let mut d = draft(OrderType::Subscriptions);
        d.set(Field::Username, "brand".into()).unwrap();
        d.set(Field::Min, 1.into()).unwrap();
        d.set(Field::Max, 0.into()).unwrap();
        d.set(Field::Delay, 601.into()).unwrap();
        d.set(Field::Posts, 0.into()).unwrap();
        d.set(Field::Expiry, "2025-01-31".into()).unwrap();

        let errors = validate(&d).unwrap_err();
        assert_eq!(errors.get(Field::Max), Some("Maximum quantity must be at least 1"));
        assert_eq!(errors.get(Field::Delay), Some("Delay must be between 0 and 600 minutes"));
        assert_eq!(errors.get(Field::Posts), Some("Posts must be positive"));
        assert_eq!(errors.get(Field::Expiry), Some("Expiry date must be in dd/mm/yyyy format"));
        assert!(!errors.contains(Field::Min));

        d.set(Field::Max, 10.into()).unwrap();
        d.set(Field::Delay, 600.into()).unwrap();
        d.clear(Field::Posts);
        d.set(Field::Expiry, "31/01/2025".into()).unwrap();
        assert!(validate(&d).is_ok());

        d.set(Field::Delay, 0.into()).unwrap();
        d.set(Field::Expiry, "".into()).unwrap();
        assert!(validate(&d).is_ok());
    }

    #[test]
    fn test_price_and_service_base_rules() {
        let mut d = draft(OrderType::Package);
        d.set(Field::Link, "https://x.com/p/1".into()).unwrap();
        d.set(Field::Price, FieldValue::Decimal(-0.5)).unwrap();
        assert_eq!(validate(&d).unwrap_err().get(Field::Price), Some("Price cannot be negative"));

        d.set(Field::Price, FieldValue::Decimal(0.0)).unwrap();
        assert_eq!(validate(&d).unwrap().price, Some(0.0));

        d.service_id = "  ".into();
        assert_eq!(validate(&d).unwrap_err().get(Field::ServiceId), Some("Service ID is required"));
    }

    #[test]
    fn test_irrelevant_fields_are_not_validated() {
        let mut d = draft(OrderType::Package);
        d.set(Field::Link, "https://x.com/p/1".into()).unwrap();
        // Invalid for subscriptions, but package orders never look at it
        d.set(Field::Delay, 9000.into()).unwrap();
        d.set(Field::Quantity, 0.into()).unwrap();
        assert!(validate(&d).is_ok());
    }
}
