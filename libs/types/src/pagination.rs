//! Pagination envelope
//!
//! Pages are 1-based. The envelope always reports the full `total`, even
//! when the requested page lies past the end.

use serde::{Deserialize, Serialize};

/// One page of a larger ordered collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paginated<T> {
    pub total: usize,
    pub page: usize,
    pub per_page: usize,
    pub records: Vec<T>,
}

impl<T> Paginated<T> {
    /// Slice `items` to page `page` of size `per_page`.
    ///
    /// `page == 0` is treated as the first page; callers validate queries
    /// before reaching this point.
    pub fn from_items(items: Vec<T>, page: usize, per_page: usize) -> Self {
        let total = items.len();
        let start = page.saturating_sub(1).saturating_mul(per_page);
        let records = items.into_iter().skip(start).take(per_page).collect();
        Self {
            total,
            page,
            per_page,
            records,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_page() {
        let items: Vec<u32> = (1..=25).collect();
        let page = Paginated::from_items(items, 2, 10);
        assert_eq!(page.total, 25);
        assert_eq!(page.records, (11..=20).collect::<Vec<_>>());
    }

    #[test]
    fn test_last_partial_page() {
        let items: Vec<u32> = (1..=25).collect();
        let page = Paginated::from_items(items, 3, 10);
        assert_eq!(page.records, (21..=25).collect::<Vec<_>>());
    }

    #[test]
    fn test_page_past_end() {
        let items: Vec<u32> = (1..=5).collect();
        let page = Paginated::from_items(items, 4, 10);
        assert!(page.is_empty());
        assert_eq!(page.total, 5);
    }

    #[test]
    fn test_envelope_serialization() {
        let page = Paginated::from_items(vec![1u8, 2, 3], 1, 2);
        let json = serde_json::to_string(&page).unwrap();
        assert_eq!(json, r#"{"total":3,"page":1,"perPage":2,"records":[1,2]}"#);
    }
}
