use serde::Serialize;

use crate::error::AppError;

/// Default page size for list endpoints.
pub const DEFAULT_PAGE_LIMIT: u64 = 10;

/// Largest page size a client may request.
pub const MAX_PAGE_LIMIT: u64 = 100;

/// Pagination metadata included in list responses.
#[derive(Serialize, utoipa::ToSchema)]
pub struct Pagination {
    /// Total number of matching items across all pages.
    #[schema(example = 47)]
    pub total: u64,
    /// Current page number (1-based).
    #[schema(example = 1)]
    pub page: u64,
    /// Number of items per page.
    #[schema(example = 10)]
    pub limit: u64,
    /// Total number of pages.
    #[schema(example = 5)]
    pub pages: u64,
}

impl Pagination {
    pub fn new(total: u64, page: u64, limit: u64) -> Self {
        Self {
            total,
            page,
            limit,
            pages: total.div_ceil(limit),
        }
    }
}

/// Normalize raw `page`/`limit` query values: page floors at 1, limit
/// defaults to 10 and is clamped to 1..=100.
pub fn page_and_limit(page: Option<u64>, limit: Option<u64>) -> (u64, u64) {
    (
        Ord::max(page.unwrap_or(1), 1),
        limit
            .unwrap_or(DEFAULT_PAGE_LIMIT)
            .clamp(1, MAX_PAGE_LIMIT),
    )
}

/// Body for endpoints that only acknowledge, e.g. deletes.
#[derive(Serialize, utoipa::ToSchema)]
pub struct SuccessResponse {
    /// Always `true`.
    #[schema(example = true)]
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

/// Escape LIKE wildcard characters in a search string.
pub fn escape_like(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Validate a required text field: non-empty after trimming, bounded
/// length in Unicode characters.
pub fn validate_required_text(value: &str, name: &str, max: usize) -> Result<(), AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.chars().count() > max {
        return Err(AppError::Validation(format!(
            "{name} must be 1-{max} characters"
        )));
    }
    Ok(())
}
