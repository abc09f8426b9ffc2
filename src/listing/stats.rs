use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::domain::{Order, OrderStatus, Role, User};

/// Users created within this window count as recent.
pub const RECENT_USER_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OrderStats {
    pub total: usize,
    pub completed: usize,
    pub in_progress: usize,
    pub pending: usize,
}

impl OrderStats {
    pub fn from_orders(orders: &[Order]) -> Self {
        let count = |status: OrderStatus| orders.iter().filter(|o| o.status == status).count();
        Self {
            total: orders.len(),
            completed: count(OrderStatus::Completed),
            in_progress: count(OrderStatus::InProgress),
            pending: count(OrderStatus::Pending),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UserStats {
    pub total: usize,
    /// Accounts with the `user` role
    pub regular: usize,
    pub recent: usize,
}

impl UserStats {
    pub fn from_users(users: &[User], now: DateTime<Utc>) -> Self {
        let cutoff = now - Duration::days(RECENT_USER_DAYS);
        Self {
            total: users.len(),
            regular: users.iter().filter(|u| u.role == Role::User).count(),
            recent: users.iter().filter(|u| u.created_at > cutoff).count(),
        }
    }
}

/// The first `n` orders, as listed by the panel (newest first).
pub fn recent_orders(orders: &[Order], n: usize) -> Vec<Order> {
    orders.iter().take(n).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(id: &str, status: OrderStatus) -> Order {
        Order {
            id: id.to_string(),
            provider_order_id: id.to_string(),
            service_id: "svc1".into(),
            order_type: "default".into(),
            link: String::new(),
            quantity: 1,
            charge: None,
            status,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_order_stats() {
        let orders = vec![
            order("1", OrderStatus::Completed),
            order("2", OrderStatus::InProgress),
            order("3", OrderStatus::Pending),
            order("4", OrderStatus::Pending),
            order("5", OrderStatus::Canceled),
        ];
        let stats = OrderStats::from_orders(&orders);
        assert_eq!(stats, OrderStats { total: 5, completed: 1, in_progress: 1, pending: 2 });
        assert_eq!(recent_orders(&orders, 2).len(), 2);
        assert_eq!(recent_orders(&orders, 10).len(), 5);
    }

    #[test]
    fn test_user_stats() {
        let now = Utc::now();
        let mut admin = User::new("u1", "Admin", "admin@example.com");
        admin.role = Role::Admin;
        let mut old = User::new("u2", "Old", "old@example.com");
        old.created_at = now - Duration::days(30);
        let fresh = User::new("u3", "Fresh", "fresh@example.com");

        let stats = UserStats::from_users(&[admin, old, fresh], now + Duration::seconds(1));
        assert_eq!(stats, UserStats { total: 3, regular: 2, recent: 2 });
    }
}
