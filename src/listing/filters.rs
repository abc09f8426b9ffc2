use serde::{Deserialize, Serialize};

use crate::domain::{Category, Order, OrderStatus, Service, User};

/// A predicate over one collection's items.
pub trait ListFilter<T: Clone> {
    fn matches(&self, item: &T) -> bool;

    fn apply(&self, items: &[T]) -> Vec<T> {
        items.iter().filter(|item| self.matches(item)).cloned().collect()
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    needle.is_empty() || haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusFilter {
    #[default]
    All,
    Only(OrderStatus),
}

/// Matches provider order id or link, optionally a single status.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderFilter {
    pub search: String,
    pub status: StatusFilter,
}

impl ListFilter<Order> for OrderFilter {
    fn matches(&self, order: &Order) -> bool {
        let search = self.search.trim();
        let matches_search = contains_ignore_case(&order.provider_order_id, search)
            || contains_ignore_case(&order.link, search);
        let matches_status = match &self.status {
            StatusFilter::All => true,
            StatusFilter::Only(status) => &order.status == status,
        };
        matches_search && matches_status
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategorySelection {
    #[default]
    All,
    Id(String),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServiceFilter {
    pub search: String,
    pub category: CategorySelection,
}

impl ListFilter<Service> for ServiceFilter {
    fn matches(&self, service: &Service) -> bool {
        let matches_category = match &self.category {
            CategorySelection::All => true,
            CategorySelection::Id(id) => service.category.as_ref().is_some_and(|c| &c.id == id),
        };
        matches_category && contains_ignore_case(&service.name, self.search.trim())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activity {
    #[default]
    All,
    Active,
    Banned,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserFilter {
    pub search: String,
    pub activity: Activity,
}

impl ListFilter<User> for UserFilter {
    fn matches(&self, user: &User) -> bool {
        let search = self.search.trim();
        let matches_search =
            contains_ignore_case(&user.name, search) || contains_ignore_case(&user.email, search);
        let matches_activity = match self.activity {
            Activity::All => true,
            Activity::Active => !user.is_banned,
            Activity::Banned => user.is_banned,
        };
        matches_search && matches_activity
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryFilter {
    pub search: String,
}

impl ListFilter<Category> for CategoryFilter {
    fn matches(&self, category: &Category) -> bool {
        contains_ignore_case(&category.name, self.search.trim())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CategoryRef;
    use chrono::Utc;

    fn order(provider_id: &str, link: &str, status: OrderStatus) -> Order {
        Order {
            id: provider_id.to_string(),
            provider_order_id: provider_id.to_string(),
            service_id: "svc1".into(),
            order_type: "default".into(),
            link: link.to_string(),
            quantity: 100,
            charge: None,
            status,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_order_filter() {
        let orders = vec![
            order("1001", "https://instagram.com/p/abc", OrderStatus::Pending),
            order("1002", "https://tiktok.com/@Someone", OrderStatus::Completed),
            order("2001", "https://instagram.com/p/xyz", OrderStatus::InProgress),
        ];

        let by_link = OrderFilter { search: "INSTAGRAM".into(), ..Default::default() };
        assert_eq!(by_link.apply(&orders).len(), 2);

        let by_id = OrderFilter { search: "100".into(), status: StatusFilter::Only(OrderStatus::Completed) };
        let found = by_id.apply(&orders);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].provider_order_id, "1002");

        assert_eq!(OrderFilter::default().apply(&orders).len(), 3);
    }

    #[test]
    fn test_service_filter_by_category() {
        let insta = CategoryRef { id: "c1".into(), name: "Instagram".into() };
        let services = vec![
            Service::new("s1", "Instagram Likes", 1.0, 10, 100).in_category(insta),
            Service::new("s2", "YouTube Views", 2.0, 10, 100),
        ];

        let filter = ServiceFilter { search: "likes".into(), category: CategorySelection::Id("c1".into()) };
        assert_eq!(filter.apply(&services)[0].id, "s1");

        let uncategorized = ServiceFilter { category: CategorySelection::Id("c2".into()), ..Default::default() };
        assert!(uncategorized.apply(&services).is_empty());
    }

    #[test]
    fn test_user_filter_activity() {
        let mut banned = User::new("u2", "Bob", "bob@example.com");
        banned.is_banned = true;
        let users = vec![User::new("u1", "Alice", "alice@example.com"), banned];

        let active = UserFilter { activity: Activity::Active, ..Default::default() };
        assert_eq!(active.apply(&users)[0].id, "u1");

        let by_email = UserFilter { search: "BOB@".into(), activity: Activity::Banned };
        assert_eq!(by_email.apply(&users)[0].id, "u2");
    }

    #[test]
    fn test_category_filter() {
        let categories = vec![
            Category { id: "c1".into(), name: "TikTok".into(), created_at: None, updated_at: None },
            Category { id: "c2".into(), name: "Twitch".into(), created_at: None, updated_at: None },
        ];
        let filter = CategoryFilter { search: "tik".into() };
        assert_eq!(filter.apply(&categories).len(), 1);
    }
}
