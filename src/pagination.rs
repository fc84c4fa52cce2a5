use serde::Serialize;

pub const DEFAULT_PER_PAGE: u64 = 10;
pub const MAX_PER_PAGE: u64 = 100;

/// Normalized pagination input: 1-based page, per-page clamped to
/// [1, MAX_PER_PAGE].
#[derive(Debug, Copy, Clone)]
pub struct PageParams {
    page: u64,
    per_page: u64,
}

impl PageParams {
    pub fn new(page: Option<u64>, per_page: Option<u64>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            per_page: per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE),
        }
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn per_page(&self) -> u64 {
        self.per_page
    }

    pub fn limit(&self) -> i64 {
        self.per_page as i64
    }

    pub fn offset(&self) -> i64 {
        ((self.page - 1) * self.per_page) as i64
    }
}

/// Standard list envelope. A page past the end of the result set comes back
/// with an empty `data`, never an error.
#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub page: u64,
    pub per_page: u64,
    pub total: i64,
    pub total_pages: u64,
}

impl<T> Paginated<T> {
    pub fn new(data: Vec<T>, params: PageParams, total: i64) -> Self {
        let total = total.max(0);
        let total_pages = (total as u64).div_ceil(params.per_page());

        Self {
            data,
            page: params.page(),
            per_page: params.per_page(),
            total,
            total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_and_per_page_are_normalized() {
        let p = PageParams::new(None, None);
        assert_eq!(p.page(), 1);
        assert_eq!(p.per_page(), DEFAULT_PER_PAGE);

        let p = PageParams::new(Some(0), Some(0));
        assert_eq!(p.page(), 1);
        assert_eq!(p.per_page(), 1);

        let p = PageParams::new(Some(3), Some(500));
        assert_eq!(p.per_page(), MAX_PER_PAGE);
        assert_eq!(p.offset(), 200);
    }

    #[test]
    fn total_pages_rounds_up() {
        let params = PageParams::new(Some(1), Some(10));
        let page: Paginated<i64> = Paginated::new(Vec::new(), params, 41);
        assert_eq!(page.total_pages, 5);

        let page: Paginated<i64> = Paginated::new(Vec::new(), params, 40);
        assert_eq!(page.total_pages, 4);

        let page: Paginated<i64> = Paginated::new(Vec::new(), params, 0);
        assert_eq!(page.total_pages, 0);
    }
}
