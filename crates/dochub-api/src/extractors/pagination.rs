//! Pagination query parameters.

use serde::{Deserialize, Serialize};

use dochub_database::store::DEFAULT_PAGE_SIZE;

const MAX_PAGE_SIZE: u32 = 100;

/// Query parameters for the notification list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationParams {
    /// Page number (1-based, default: 1).
    #[serde(default = "default_page")]
    pub page: u32,
    /// Items per page (default: 15, max: 100).
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    DEFAULT_PAGE_SIZE
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: default_page(),
            limit: default_limit(),
        }
    }
}

impl PaginationParams {
    /// Clamp to a valid `(page, limit)` pair.
    pub fn normalized(&self) -> (u32, u32) {
        (self.page.max(1), self.limit.clamp(1, MAX_PAGE_SIZE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        assert_eq!(PaginationParams::default().normalized(), (1, 15));
    }

    #[test]
    fn test_clamps_out_of_range() {
        let params = PaginationParams { page: 0, limit: 500 };
        assert_eq!(params.normalized(), (1, 100));
        let params = PaginationParams { page: 3, limit: 0 };
        assert_eq!(params.normalized(), (3, 1));
    }
}
