//! Client-side listing helpers: pagination, search filters and dashboard
//! statistics over already-fetched collections.

pub mod filters;
pub mod stats;

pub use filters::*;
pub use stats::*;

use serde::Serialize;

/// One page of a collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based
    pub page: usize,
    pub per_page: usize,
    pub total_items: usize,
    pub total_pages: usize,
    pub has_previous: bool,
    pub has_next: bool,
}

/// Slices `items` into the requested page.
///
/// `page` is clamped into `[1, total_pages]`; an empty collection yields page
/// 1 of 0. A `per_page` of 0 is treated as 1.
pub fn paginate<T: Clone>(items: &[T], page: usize, per_page: usize) -> Page<T> {
    let per_page = per_page.max(1);
    let total_items = items.len();
    let total_pages = total_items.div_ceil(per_page);
    let page = page.clamp(1, total_pages.max(1));

    let start = (page - 1) * per_page;
    let end = (start + per_page).min(total_items);
    let items = items.get(start..end).map(<[T]>::to_vec).unwrap_or_default();

    Page {
        items,
        page,
        per_page,
        total_items,
        total_pages,
        has_previous: page > 1,
        has_next: page < total_pages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paginate_middle_page() {
        let items: Vec<u32> = (1..=23).collect();
        let page = paginate(&items, 2, 10);
        assert_eq!(page.items, (11..=20).collect::<Vec<_>>());
        assert_eq!(page.total_pages, 3);
        assert!(page.has_previous && page.has_next);

        let last = paginate(&items, 3, 10);
        assert_eq!(last.items, vec![21, 22, 23]);
        assert!(!last.has_next);
    }

    #[test]
    fn test_paginate_clamps_page() {
        let items = vec!["a", "b", "c"];
        assert_eq!(paginate(&items, 0, 2).page, 1);
        let past_end = paginate(&items, 9, 2);
        assert_eq!(past_end.page, 2);
        assert_eq!(past_end.items, vec!["c"]);
    }

    #[test]
    fn test_paginate_empty() {
        let page = paginate::<u8>(&[], 4, 5);
        assert_eq!(page.page, 1);
        assert_eq!(page.total_pages, 0);
        assert!(page.items.is_empty());
        assert!(!page.has_previous && !page.has_next);
    }
}
