use serde::Serialize;

/// One page of a sorted listing
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub total_pages: usize,
    pub current_page: usize,
}

impl<T> Page<T> {
    /// Slice an already sorted list. Pages are 1-based; page 0 is treated as 1.
    pub fn paginate(items: Vec<T>, page: usize, limit: usize) -> Self {
        let limit = limit.max(1);
        let current_page = page.max(1);
        let total = items.len();
        let total_pages = total.div_ceil(limit);

        let items = items
            .into_iter()
            .skip((current_page - 1).saturating_mul(limit))
            .take(limit)
            .collect();

        Self {
            items,
            total,
            total_pages,
            current_page,
        }
    }
}
