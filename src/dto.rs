//! Response and query shapes shared across the resource modules.

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Query string for the list endpoints: `?page=&limit=&type=`.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 10;

/// Validated paging window. Out-of-range inputs are clamped rather than
/// rejected.
#[derive(Debug, Clone, Copy)]
pub struct PageParams {
    pub page: i64,
    pub limit: i64,
}

impl PageParams {
    pub fn from_query(page: Option<i64>, limit: Option<i64>) -> Self {
        Self {
            page: page.unwrap_or(DEFAULT_PAGE).max(1),
            limit: limit.unwrap_or(DEFAULT_LIMIT).max(1),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.limit
    }
}

#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub total_pages: i64,
}

impl Pagination {
    pub fn new(params: PageParams, total: i64) -> Self {
        let total_pages = if total == 0 {
            0
        } else {
            (total + params.limit - 1) / params.limit
        };
        Self {
            page: params.page,
            limit: params.limit,
            total,
            total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_absent() {
        let params = PageParams::from_query(None, None);
        assert_eq!(params.page, 1);
        assert_eq!(params.limit, 10);
        assert_eq!(params.offset(), 0);
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let params = PageParams::from_query(Some(0), Some(-5));
        assert_eq!(params.page, 1);
        assert_eq!(params.limit, 1);
    }

    #[test]
    fn second_page_offset_skips_first_window() {
        // 25 records, limit 10, page 2 -> offset 10 (records 11-20), 3 pages.
        let params = PageParams::from_query(Some(2), Some(10));
        assert_eq!(params.offset(), 10);
        let pagination = Pagination::new(params, 25);
        assert_eq!(pagination.total_pages, 3);
        assert_eq!(pagination.total, 25);
    }

    #[test]
    fn total_pages_is_exact_on_boundary() {
        let params = PageParams::from_query(Some(1), Some(10));
        assert_eq!(Pagination::new(params, 30).total_pages, 3);
        assert_eq!(Pagination::new(params, 31).total_pages, 4);
        assert_eq!(Pagination::new(params, 0).total_pages, 0);
    }

    #[test]
    fn pagination_serializes_camel_case() {
        let params = PageParams::from_query(Some(2), Some(10));
        let json = serde_json::to_string(&Pagination::new(params, 25)).unwrap();
        assert_eq!(
            json,
            r#"{"page":2,"limit":10,"total":25,"totalPages":3}"#
        );
    }
}
