use serde::{Deserialize, Serialize};

use super::draft::OrderDraft;
use super::registry::{Field, OrderType};

/// A validated order ready for the API, shared fields plus the typed body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub service_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(flatten)]
    pub payload: OrderPayload,
}

/// One variant per order type, each carrying only that type's fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OrderPayload {
    Default(DefaultOrder),
    Package(PackageOrder),
    CustomComments(CustomCommentsOrder),
    MentionsWithHashtags(MentionsWithHashtagsOrder),
    MentionsHashtag(MentionsHashtagOrder),
    Subscriptions(SubscriptionsOrder),
    CommentLikes(CommentLikesOrder),
    Poll(PollOrder),
    CommentReplies(CommentRepliesOrder),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefaultOrder {
    pub link: String,
    pub quantity: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runs: Option<i64>,
    pub interval: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageOrder {
    pub link: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomCommentsOrder {
    pub link: String,
    /// One comment per line.
    pub comments: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MentionsWithHashtagsOrder {
    pub link: String,
    pub quantity: i64,
    /// Comma-separated.
    pub usernames: String,
    /// Comma-separated.
    pub hashtags: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MentionsHashtagOrder {
    pub link: String,
    pub quantity: i64,
    pub hashtag: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionsOrder {
    pub username: String,
    pub min: i64,
    pub max: i64,
    /// Minutes between posts, 0..=600.
    pub delay: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub posts: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_posts: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentLikesOrder {
    pub link: String,
    pub quantity: i64,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PollOrder {
    pub link: String,
    pub quantity: i64,
    pub answer_number: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentRepliesOrder {
    pub link: String,
    pub username: String,
    pub comments: String,
}

impl OrderPayload {
    /// Builds the payload for the draft's current type.
    ///
    /// Missing values fall back to empty/zero; call after validation.
    pub(crate) fn from_draft(draft: &OrderDraft) -> Self {
        let text = |field| draft.text(field).unwrap_or_default().to_string();
        let int = |field| draft.integer(field).unwrap_or_default();
        let opt_int = |field| draft.integer(field);

        match draft.order_type {
            OrderType::Default => OrderPayload::Default(DefaultOrder {
                link: text(Field::Link),
                quantity: int(Field::Quantity),
                runs: opt_int(Field::Runs),
                interval: int(Field::Interval),
            }),
            OrderType::Package => OrderPayload::Package(PackageOrder { link: text(Field::Link) }),
            OrderType::CustomComments => OrderPayload::CustomComments(CustomCommentsOrder {
                link: text(Field::Link),
                comments: text(Field::Comments),
            }),
            OrderType::MentionsWithHashtags => OrderPayload::MentionsWithHashtags(MentionsWithHashtagsOrder {
                link: text(Field::Link),
                quantity: int(Field::Quantity),
                usernames: text(Field::Usernames),
                hashtags: text(Field::Hashtags),
            }),
            OrderType::MentionsHashtag => OrderPayload::MentionsHashtag(MentionsHashtagOrder {
                link: text(Field::Link),
                quantity: int(Field::Quantity),
                hashtag: text(Field::Hashtag),
            }),
            OrderType::Subscriptions => OrderPayload::Subscriptions(SubscriptionsOrder {
                username: text(Field::Username),
                min: int(Field::Min),
                max: int(Field::Max),
                delay: int(Field::Delay),
                posts: opt_int(Field::Posts),
                old_posts: opt_int(Field::OldPosts),
                expiry: draft.text(Field::Expiry).filter(|e| !e.is_empty()).map(str::to_string),
            }),
            OrderType::CommentLikes => OrderPayload::CommentLikes(CommentLikesOrder {
                link: text(Field::Link),
                quantity: int(Field::Quantity),
                username: text(Field::Username),
            }),
            OrderType::Poll => OrderPayload::Poll(PollOrder {
                link: text(Field::Link),
                quantity: int(Field::Quantity),
                answer_number: int(Field::AnswerNumber),
            }),
            OrderType::CommentReplies => OrderPayload::CommentReplies(CommentRepliesOrder {
                link: text(Field::Link),
                username: text(Field::Username),
                comments: text(Field::Comments),
            }),
        }
    }

    pub fn order_type(&self) -> OrderType {
        match self {
            OrderPayload::Default(_) => OrderType::Default,
            OrderPayload::Package(_) => OrderType::Package,
            OrderPayload::CustomComments(_) => OrderType::CustomComments,
            OrderPayload::MentionsWithHashtags(_) => OrderType::MentionsWithHashtags,
            OrderPayload::MentionsHashtag(_) => OrderType::MentionsHashtag,
            OrderPayload::Subscriptions(_) => OrderType::Subscriptions,
            OrderPayload::CommentLikes(_) => OrderType::CommentLikes,
            OrderPayload::Poll(_) => OrderType::Poll,
            OrderPayload::CommentReplies(_) => OrderType::CommentReplies,
        }
    }

    /// The order target, absent for subscriptions which target a username.
    pub fn link(&self) -> Option<&str> {
        match self {
            OrderPayload::Default(o) => Some(&o.link),
            OrderPayload::Package(o) => Some(&o.link),
            OrderPayload::CustomComments(o) => Some(&o.link),
            OrderPayload::MentionsWithHashtags(o) => Some(&o.link),
            OrderPayload::MentionsHashtag(o) => Some(&o.link),
            OrderPayload::Subscriptions(_) => None,
            OrderPayload::CommentLikes(o) => Some(&o.link),
            OrderPayload::Poll(o) => Some(&o.link),
            OrderPayload::CommentReplies(o) => Some(&o.link),
        }
    }

    pub fn quantity(&self) -> Option<i64> {
        match self {
            OrderPayload::Default(o) => Some(o.quantity),
            OrderPayload::MentionsWithHashtags(o) => Some(o.quantity),
            OrderPayload::MentionsHashtag(o) => Some(o.quantity),
            OrderPayload::CommentLikes(o) => Some(o.quantity),
            OrderPayload::Poll(o) => Some(o.quantity),
            OrderPayload::Package(_)
            | OrderPayload::CustomComments(_)
            | OrderPayload::Subscriptions(_)
            | OrderPayload::CommentReplies(_) => None,
        }
    }
}

impl OrderRequest {
    pub fn order_type(&self) -> OrderType {
        self.payload.order_type()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_serializes_flat_with_type_tag() {
        let request = OrderRequest {
            service_id: "svc1".into(),
            price: None,
            payload: OrderPayload::Poll(PollOrder {
                link: "https://x.com/post/9".into(),
                quantity: 50,
                answer_number: 2,
            }),
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "serviceId": "svc1",
                "type": "poll",
                "link": "https://x.com/post/9",
                "quantity": 50,
                "answer_number": 2
            })
        );
    }

    #[test]
    fn test_request_deserializes_by_type_tag() {
        let request: OrderRequest = serde_json::from_value(json!({
            "serviceId": "svc2",
            "price": 1.5,
            "type": "subscriptions",
            "username": "brand",
            "min": 10,
            "max": 20,
            "delay": 30,
            "old_posts": 5
        }))
        .unwrap();

        assert_eq!(request.order_type(), OrderType::Subscriptions);
        assert_eq!(request.price, Some(1.5));
        match request.payload {
            OrderPayload::Subscriptions(sub) => {
                assert_eq!(sub.old_posts, Some(5));
                assert_eq!(sub.posts, None);
                assert_eq!(sub.expiry, None);
            }
            other => panic!("unexpected payload: {other:?}"),
        }
    }
}
