use serde::Deserialize;

use crate::error::AppError;

pub const MAX_PAGE_SIZE: i64 = 100;

/// 1-based page query. Defaults to the first page of ten.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PageRequest {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_page_size")]
    pub page_size: i64,
}

fn default_page() -> i64 {
    1
}

fn default_page_size() -> i64 {
    10
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: default_page(),
            page_size: default_page_size(),
        }
    }
}

impl PageRequest {
    /// Rejects pages below 1 and clamps oversized pages.
    pub fn validated(self) -> Result<Self, AppError> {
        if self.page < 1 {
            return Err(AppError::Validation("page must be >= 1".into()));
        }
        if self.page_size < 1 {
            return Err(AppError::Validation("page_size must be >= 1".into()));
        }
        Ok(Self {
            page: self.page,
            page_size: self.page_size.min(MAX_PAGE_SIZE),
        })
    }

    pub fn limit(&self) -> i64 {
        self.page_size
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.page_size)
    }

    /// The window of `items` this page covers; empty past the end. Mirrors
    /// the `LIMIT`/`OFFSET` the Postgres store applies.
    #[cfg(test)]
    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let start = usize::try_from(self.offset()).unwrap_or(usize::MAX).min(items.len());
        let end = start
            .saturating_add(usize::try_from(self.limit()).unwrap_or(0))
            .min(items.len());
        &items[start..end]
    }
}
