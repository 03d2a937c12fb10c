//! Rules for prototype version history: paging bounds, compare targets,
//! snapshot labels, and the typed outcome of a compare-and-swap mutation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::error::CoreError;
use crate::types::{DbId, VersionNumber};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Version number assigned to a freshly created document.
pub const INITIAL_VERSION: VersionNumber = 1;

/// Page size used when the client does not ask for one.
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Hard upper bound on any page of versions or documents.
pub const MAX_PAGE_SIZE: i64 = 100;

/// Maximum length of a snapshot label, in characters.
pub const MAX_LABEL_LEN: usize = 100;

/// Maximum length of a prototype name, in characters.
pub const MAX_NAME_LEN: usize = 200;

// ---------------------------------------------------------------------------
// Paging
// ---------------------------------------------------------------------------

/// Clamp a requested page size into `1..=MAX_PAGE_SIZE`.
pub fn clamp_page_size(page_size: Option<i64>) -> i64 {
    page_size.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
}

/// Clamp a requested 1-based page number to at least 1.
pub fn clamp_page(page: Option<i64>) -> i64 {
    page.unwrap_or(1).max(1)
}

/// Resolved paging window for a list query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub page: i64,
    pub page_size: i64,
}

impl PageWindow {
    /// Build a window from untrusted client input.
    pub fn from_request(page: Option<i64>, page_size: Option<i64>) -> Self {
        Self {
            page: clamp_page(page),
            page_size: clamp_page_size(page_size),
        }
    }

    /// Row offset for SQL `OFFSET`. Saturates instead of overflowing.
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.page_size)
    }
}

// ---------------------------------------------------------------------------
// Compare targets
// ---------------------------------------------------------------------------

/// One side of a version comparison: a snapshot number or the live document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareTarget {
    Version(VersionNumber),
    Current,
}

impl FromStr for CompareTarget {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("current") {
            return Ok(Self::Current);
        }
        match s.parse::<VersionNumber>() {
            Ok(n) if n >= INITIAL_VERSION => Ok(Self::Version(n)),
            _ => Err(CoreError::Validation(format!(
                "Invalid version reference '{s}'. Expected a positive integer or 'current'"
            ))),
        }
    }
}

impl fmt::Display for CompareTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Version(n) => write!(f, "{n}"),
            Self::Current => f.write_str("current"),
        }
    }
}

/// Serializes as the bare number, or the string `"current"`.
impl Serialize for CompareTarget {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Version(n) => serializer.serialize_i32(*n),
            Self::Current => serializer.serialize_str("current"),
        }
    }
}

impl<'de> Deserialize<'de> for CompareTarget {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(i64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => VersionNumber::try_from(n)
                .ok()
                .filter(|n| *n >= INITIAL_VERSION)
                .map(Self::Version)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid version number {n}"))),
            Raw::Text(s) => s.parse().map_err(serde::de::Error::custom),
        }
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Normalise a snapshot label: trims whitespace, maps empty to `None`, and
/// rejects labels longer than [`MAX_LABEL_LEN`].
pub fn normalize_label(label: Option<&str>) -> Result<Option<String>, CoreError> {
    let Some(raw) = label else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    reject_nul("Label", trimmed)?;
    if trimmed.chars().count() > MAX_LABEL_LEN {
        return Err(CoreError::Validation(format!(
            "Label must be at most {MAX_LABEL_LEN} characters"
        )));
    }
    Ok(Some(trimmed.to_string()))
}

/// Validate a prototype name (non-empty, at most [`MAX_NAME_LEN`] characters).
pub fn validate_name(name: &str) -> Result<(), CoreError> {
    if name.trim().is_empty() {
        return Err(CoreError::Validation("Name must not be empty".into()));
    }
    reject_nul("Name", name)?;
    if name.chars().count() > MAX_NAME_LEN {
        return Err(CoreError::Validation(format!(
            "Name must be at most {MAX_NAME_LEN} characters"
        )));
    }
    Ok(())
}

/// Validate document content before it is stored.
///
/// PostgreSQL cannot store U+0000 in `TEXT` or inside `JSONB` strings, so it
/// is rejected in the HTML and in every string and object key of the payload.
pub fn validate_content(html_content: &str, project_data: &Value) -> Result<(), CoreError> {
    reject_nul("html_content", html_content)?;
    if payload_contains_nul(project_data) {
        return Err(CoreError::Validation(
            "project_data must not contain NUL (\\u0000) characters".into(),
        ));
    }
    Ok(())
}

fn payload_contains_nul(value: &Value) -> bool {
    match value {
        Value::String(s) => s.contains('\0'),
        Value::Array(items) => items.iter().any(payload_contains_nul),
        Value::Object(map) => map
            .iter()
            .any(|(key, child)| key.contains('\0') || payload_contains_nul(child)),
        Value::Null | Value::Bool(_) | Value::Number(_) => false,
    }
}

fn reject_nul(field: &str, text: &str) -> Result<(), CoreError> {
    if text.contains('\0') {
        return Err(CoreError::Validation(format!(
            "{field} must not contain NUL characters"
        )));
    }
    Ok(())
}

/// Validate a client-supplied `expected_version`.
pub fn validate_expected_version(version: VersionNumber) -> Result<(), CoreError> {
    if version < INITIAL_VERSION {
        return Err(CoreError::Validation(format!(
            "expected_version must be at least {INITIAL_VERSION}"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Mutation outcome
// ---------------------------------------------------------------------------

/// Result of a compare-and-swap mutation attempt.
///
/// Storage failures travel separately as the repository's error type; this
/// enum only carries outcomes the caller is expected to branch on.
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub enum MutationOutcome<T> {
    /// The swap committed; holds the updated row.
    Applied(T),
    /// Another writer got there first. Nothing was persisted.
    VersionMismatch {
        expected: VersionNumber,
        actual: VersionNumber,
    },
    /// The outgoing version was already archived although the document never
    /// moved past it. History and document disagree; retrying cannot help.
    SnapshotConflict { version: VersionNumber },
    /// The target row does not exist.
    NotFound,
}

impl<T> MutationOutcome<T> {
    /// Convert into a `Result`, mapping the non-applied branches to
    /// [`CoreError::NotFound`], [`CoreError::ConcurrentModification`] and
    /// [`CoreError::Conflict`].
    pub fn into_result(self, entity: &'static str, id: DbId) -> Result<T, CoreError> {
        match self {
            Self::Applied(value) => Ok(value),
            Self::VersionMismatch { expected, actual } => Err(CoreError::ConcurrentModification {
                entity,
                id,
                expected,
                actual,
            }),
            Self::SnapshotConflict { version } => Err(CoreError::Conflict(format!(
                "{entity} {id} already has a snapshot for version {version}"
            ))),
            Self::NotFound => Err(CoreError::NotFound { entity, id }),
        }
    }

    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
