// src/common/pagination.rs

/// Page size bounds shared by the staff list endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimits {
    pub default_size: i64,
    pub max_size: i64,
}

impl Default for PageLimits {
    fn default() -> Self {
        Self { default_size: 100, max_size: 500 }
    }
}

/// Raw paging input as supplied by the caller.
#[derive(Debug, Clone, Copy, Default)]
pub struct PageParams {
    /// Rows per page; clamped to the configured maximum.
    pub limit: Option<i64>,
    /// Rows to skip; negative values are treated as 0.
    pub offset: Option<i64>,
}

/// A resolved `LIMIT`/`OFFSET` pair, always within bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
}

impl PageParams {
    pub fn resolve(self, limits: PageLimits) -> Page {
        let limit = self
            .limit
            .unwrap_or(limits.default_size)
            .clamp(1, limits.max_size.max(1));
        let offset = self.offset.unwrap_or(0).max(0);
        Page { limit, offset }
    }
}
