//! Prototype version snapshot models.
//!
//! Snapshots are immutable copies of a prototype's outgoing content, written
//! just before each accepted mutation. Only `label` changes after insert.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uswds_pt_core::types::{ActorId, DbId, Timestamp, VersionNumber};
use uswds_pt_core::versioning::CompareTarget;

/// A row from the `prototype_versions` table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PrototypeVersion {
    pub id: DbId,
    pub prototype_id: DbId,
    pub version_number: VersionNumber,
    pub html_content: String,
    pub project_data: serde_json::Value,
    pub content_checksum: String,
    pub label: Option<String>,
    pub created_by: Option<ActorId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// History-list projection without the content columns.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PrototypeVersionSummary {
    pub id: DbId,
    pub prototype_id: DbId,
    pub version_number: VersionNumber,
    pub content_checksum: String,
    pub label: Option<String>,
    pub created_by: Option<ActorId>,
    pub created_at: Timestamp,
}

/// Input for inserting a snapshot.
#[derive(Debug, Clone)]
pub struct CreatePrototypeVersion<'a> {
    pub prototype_id: DbId,
    pub version_number: VersionNumber,
    pub html_content: &'a str,
    pub project_data: &'a serde_json::Value,
    pub content_checksum: &'a str,
    pub created_by: Option<ActorId>,
}

/// Request body for relabelling a snapshot. `null` or blank clears it.
#[derive(Debug, Deserialize)]
pub struct UpdateVersionLabel {
    pub label: Option<String>,
}

/// One side of a comparison. Only the HTML is returned.
#[derive(Debug, Clone, Serialize)]
pub struct ComparedVersion {
    pub version_number: CompareTarget,
    pub html_content: String,
}

/// Two text representations for client-side diffing.
#[derive(Debug, Clone, Serialize)]
pub struct VersionComparison {
    pub a: ComparedVersion,
    pub b: ComparedVersion,
}
