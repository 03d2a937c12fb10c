//! Prototype models and DTOs.
//!
//! A prototype is the mutable, versioned document edited in the visual
//! builder: rendered HTML plus the editor's structured project data.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uswds_pt_core::types::{ActorId, DbId, Timestamp, VersionNumber};

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// A row from the `prototypes` table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Prototype {
    pub id: DbId,
    pub name: String,
    pub html_content: String,
    pub project_data: serde_json::Value,
    pub version: VersionNumber,
    pub content_checksum: String,
    pub created_by: Option<ActorId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// List-view projection without the content columns.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PrototypeSummary {
    pub id: DbId,
    pub name: String,
    pub version: VersionNumber,
    pub content_checksum: String,
    pub created_by: Option<ActorId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

// ---------------------------------------------------------------------------
// Create DTO
// ---------------------------------------------------------------------------

/// Input for creating a new prototype. Content defaults to empty.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePrototype {
    pub name: String,
    #[serde(default)]
    pub html_content: String,
    #[serde(default = "empty_project")]
    pub project_data: serde_json::Value,
}

fn empty_project() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

// ---------------------------------------------------------------------------
// Update DTOs
// ---------------------------------------------------------------------------

/// Metadata patch. Does not touch content and does not bump the version.
#[derive(Debug, Deserialize)]
pub struct UpdatePrototype {
    pub name: Option<String>,
}

/// Replacement content for a compare-and-swap update.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdatePrototypeContent {
    pub html_content: String,
    pub project_data: serde_json::Value,
    /// The version the client last read.
    pub expected_version: VersionNumber,
}

/// Request body for restoring a snapshot. When `expected_version` is absent
/// the document's version at request time is used.
#[derive(Debug, Default, Deserialize)]
pub struct RestoreVersionRequest {
    pub expected_version: Option<VersionNumber>,
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// Result of recomputing checksums for a prototype and its history.
#[derive(Debug, Serialize)]
pub struct IntegrityReport {
    pub prototype_id: DbId,
    pub version: VersionNumber,
    pub current_ok: bool,
    pub stored_checksum: String,
    pub computed_checksum: String,
    pub versions_checked: usize,
    pub mismatched_versions: Vec<VersionNumber>,
}
