//! Repository for the `prototype_versions` table.
//!
//! The version store is append-only: rows are inserted by the archive step of
//! a content update and afterwards only their `label` may change.

use sqlx::{PgExecutor, PgPool};
use uswds_pt_core::types::{DbId, VersionNumber};
use uswds_pt_core::versioning::CompareTarget;

use crate::models::prototype_version::{
    ComparedVersion, CreatePrototypeVersion, PrototypeVersion, PrototypeVersionSummary,
    VersionComparison,
};

/// Column list for full snapshot rows.
const COLUMNS: &str = "id, prototype_id, version_number, html_content, project_data, \
    content_checksum, label, created_by, created_at, updated_at";

/// Column list for history listings (content omitted).
const SUMMARY_COLUMNS: &str =
    "id, prototype_id, version_number, content_checksum, label, created_by, created_at";

/// Unique constraint guarding one snapshot per `(prototype_id, version_number)`.
pub const SNAPSHOT_UNIQUE_CONSTRAINT: &str = "uq_prototype_versions_prototype_version";

/// Provides append, read, and relabel operations for prototype snapshots.
pub struct PrototypeVersionRepo;

impl PrototypeVersionRepo {
    /// Insert an immutable snapshot.
    ///
    /// Fails with a unique violation on [`SNAPSHOT_UNIQUE_CONSTRAINT`] if this
    /// version number is already archived for the prototype.
    pub async fn create<'e, E>(
        executor: E,
        input: &CreatePrototypeVersion<'_>,
    ) -> Result<PrototypeVersion, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "INSERT INTO prototype_versions
                (prototype_id, version_number, html_content, project_data, content_checksum, created_by)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PrototypeVersion>(&query)
            .bind(input.prototype_id)
            .bind(input.version_number)
            .bind(input.html_content)
            .bind(input.project_data)
            .bind(input.content_checksum)
            .bind(input.created_by)
            .fetch_one(executor)
            .await
    }

    /// List one page of snapshots, newest first, with the total count.
    pub async fn list_by_prototype(
        pool: &PgPool,
        prototype_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<PrototypeVersionSummary>, i64), sqlx::Error> {
        let query = format!(
            "SELECT {SUMMARY_COLUMNS} FROM prototype_versions
             WHERE prototype_id = $1
             ORDER BY version_number DESC
             LIMIT $2 OFFSET $3"
        );
        let items = sqlx::query_as::<_, PrototypeVersionSummary>(&query)
            .bind(prototype_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await?;

        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM prototype_versions WHERE prototype_id = $1")
                .bind(prototype_id)
                .fetch_one(pool)
                .await?;

        Ok((items, total))
    }

    /// Every snapshot of a prototype in ascending version order.
    pub async fn list_all_by_prototype(
        pool: &PgPool,
        prototype_id: DbId,
    ) -> Result<Vec<PrototypeVersion>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM prototype_versions
             WHERE prototype_id = $1
             ORDER BY version_number ASC"
        );
        sqlx::query_as::<_, PrototypeVersion>(&query)
            .bind(prototype_id)
            .fetch_all(pool)
            .await
    }

    /// Find a specific snapshot of a prototype.
    pub async fn find_by_prototype_and_version<'e, E>(
        executor: E,
        prototype_id: DbId,
        version_number: VersionNumber,
    ) -> Result<Option<PrototypeVersion>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "SELECT {COLUMNS} FROM prototype_versions
             WHERE prototype_id = $1 AND version_number = $2"
        );
        sqlx::query_as::<_, PrototypeVersion>(&query)
            .bind(prototype_id)
            .bind(version_number)
            .fetch_optional(executor)
            .await
    }

    /// Set or clear a snapshot's label. Returns `None` if the snapshot does
    /// not exist.
    pub async fn update_label(
        pool: &PgPool,
        prototype_id: DbId,
        version_number: VersionNumber,
        label: Option<&str>,
    ) -> Result<Option<PrototypeVersion>, sqlx::Error> {
        let query = format!(
            "UPDATE prototype_versions SET label = $3
             WHERE prototype_id = $1 AND version_number = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PrototypeVersion>(&query)
            .bind(prototype_id)
            .bind(version_number)
            .bind(label)
            .fetch_optional(pool)
            .await
    }

    /// Fetch the HTML of two versions (or the live document) for diffing.
    ///
    /// Returns `None` if either side does not exist.
    pub async fn compare(
        pool: &PgPool,
        prototype_id: DbId,
        a: CompareTarget,
        b: CompareTarget,
    ) -> Result<Option<VersionComparison>, sqlx::Error> {
        let Some(a_html) = Self::html_for(pool, prototype_id, a).await? else {
            return Ok(None);
        };
        let Some(b_html) = Self::html_for(pool, prototype_id, b).await? else {
            return Ok(None);
        };

        Ok(Some(VersionComparison {
            a: ComparedVersion {
                version_number: a,
                html_content: a_html,
            },
            b: ComparedVersion {
                version_number: b,
                html_content: b_html,
            },
        }))
    }

    async fn html_for(
        pool: &PgPool,
        prototype_id: DbId,
        target: CompareTarget,
    ) -> Result<Option<String>, sqlx::Error> {
        match target {
            CompareTarget::Current => {
                sqlx::query_scalar("SELECT html_content FROM prototypes WHERE id = $1")
                    .bind(prototype_id)
                    .fetch_optional(pool)
                    .await
            }
            CompareTarget::Version(n) => {
                sqlx::query_scalar(
                    "SELECT html_content FROM prototype_versions
                     WHERE prototype_id = $1 AND version_number = $2",
                )
                .bind(prototype_id)
                .bind(n)
                .fetch_optional(pool)
                .await
            }
        }
    }
}
