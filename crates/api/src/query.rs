//! Shared query parameter types for API handlers.

use serde::Deserialize;
use uswds_pt_core::versioning::{CompareTarget, PageWindow};

use crate::error::{AppError, AppResult};

/// Page-based pagination parameters (`?page=&page_size=`).
///
/// Values are clamped via [`PageWindow::from_request`]; out-of-range input is
/// never an error.
#[derive(Debug, Default, Deserialize)]
pub struct PaginationParams {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

impl PaginationParams {
    pub fn window(&self) -> PageWindow {
        PageWindow::from_request(self.page, self.page_size)
    }
}

/// Query parameters for `GET /versions/compare?a=&b=`.
///
/// Either side may be a version number or `current`; `b` defaults to
/// `current`. Both are kept raw so that a missing or malformed side is
/// reported through the JSON error envelope.
#[derive(Debug, Default, Deserialize)]
pub struct CompareParams {
    pub a: Option<String>,
    pub b: Option<String>,
}

impl CompareParams {
    pub fn targets(&self) -> AppResult<(CompareTarget, CompareTarget)> {
        let a = self
            .a
            .as_deref()
            .ok_or_else(|| AppError::BadRequest("Query parameter 'a' is required".into()))?
            .parse::<CompareTarget>()?;
        let b = match self.b.as_deref() {
            Some(raw) => raw.parse::<CompareTarget>()?,
            None => CompareTarget::Current,
        };
        Ok((a, b))
    }
}
