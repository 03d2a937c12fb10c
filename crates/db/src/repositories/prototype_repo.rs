//! Repository for the `prototypes` table.
//!
//! Content changes go through [`PrototypeRepo::update_content`] (or
//! [`PrototypeRepo::restore_version`]), which archive the outgoing state and
//! swap in the new content inside one transaction, conditioned on the version
//! the caller last observed.

use sqlx::{PgConnection, PgPool, Postgres, Transaction};
use uswds_pt_core::fingerprint::content_checksum;
use uswds_pt_core::types::{ActorId, DbId, VersionNumber};
use uswds_pt_core::versioning::MutationOutcome;

use crate::is_unique_violation;
use crate::models::prototype::{CreatePrototype, IntegrityReport, Prototype, PrototypeSummary};
use crate::models::prototype_version::CreatePrototypeVersion;
use crate::repositories::prototype_version_repo::{
    PrototypeVersionRepo, SNAPSHOT_UNIQUE_CONSTRAINT,
};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, html_content, project_data, version, content_checksum, \
    created_by, created_at, updated_at";

/// Column list for list views (content omitted).
const SUMMARY_COLUMNS: &str =
    "id, name, version, content_checksum, created_by, created_at, updated_at";

/// Provides CRUD and versioned content updates for prototypes.
pub struct PrototypeRepo;

impl PrototypeRepo {
    // ── Standard CRUD ────────────────────────────────────────────────

    /// Insert a new prototype at version 1 with its content checksum.
    ///
    /// The checksum covers the payload as `JSONB` stores it, not as sent.
    pub async fn create(
        pool: &PgPool,
        input: &CreatePrototype,
        created_by: Option<ActorId>,
    ) -> Result<Prototype, sqlx::Error> {
        let mut conn = pool.acquire().await?;
        let project_data = Self::normalize_payload(&mut conn, &input.project_data).await?;
        let checksum = content_checksum(&input.html_content, &project_data);
        let query = format!(
            "INSERT INTO prototypes (name, html_content, project_data, content_checksum, created_by)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Prototype>(&query)
            .bind(input.name.trim())
            .bind(&input.html_content)
            .bind(&project_data)
            .bind(&checksum)
            .bind(created_by)
            .fetch_one(&mut *conn)
            .await
    }

    /// Find a prototype by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Prototype>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM prototypes WHERE id = $1");
        sqlx::query_as::<_, Prototype>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List one page of prototypes, most recently updated first, with the
    /// total count.
    pub async fn list(
        pool: &PgPool,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<PrototypeSummary>, i64), sqlx::Error> {
        let query = format!(
            "SELECT {SUMMARY_COLUMNS} FROM prototypes
             ORDER BY updated_at DESC, id DESC
             LIMIT $1 OFFSET $2"
        );
        let items = sqlx::query_as::<_, PrototypeSummary>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM prototypes")
            .fetch_one(pool)
            .await?;

        Ok((items, total))
    }

    /// Rename a prototype. Content and version are untouched.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn rename(
        pool: &PgPool,
        id: DbId,
        name: &str,
    ) -> Result<Option<Prototype>, sqlx::Error> {
        let query = format!(
            "UPDATE prototypes SET name = $2
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Prototype>(&query)
            .bind(id)
            .bind(name.trim())
            .fetch_optional(pool)
            .await
    }

    /// Delete a prototype and, by cascade, its snapshots. Returns `true` if a
    /// row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM prototypes WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// The committed version number of a prototype, if it exists.
    pub async fn current_version(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<VersionNumber>, sqlx::Error> {
        sqlx::query_scalar("SELECT version FROM prototypes WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    // ── Versioned content updates ────────────────────────────────────

    /// Replace a prototype's content if it is still at `expected_version`.
    ///
    /// Within one transaction: read the current row, archive it as a snapshot
    /// tagged with its current version, then conditionally swap in the new
    /// content with `version + 1`. Any lost race rolls the whole transaction
    /// back and yields [`MutationOutcome::VersionMismatch`]; nothing is
    /// retried here.
    pub async fn update_content(
        pool: &PgPool,
        id: DbId,
        expected_version: VersionNumber,
        html_content: &str,
        project_data: &serde_json::Value,
        created_by: Option<ActorId>,
    ) -> Result<MutationOutcome<Prototype>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let Some(current) = Self::fetch_current(&mut tx, id).await? else {
            return Ok(MutationOutcome::NotFound);
        };
        if current.version != expected_version {
            return Ok(MutationOutcome::VersionMismatch {
                expected: expected_version,
                actual: current.version,
            });
        }

        let project_data = Self::normalize_payload(&mut tx, project_data).await?;
        let checksum = content_checksum(html_content, &project_data);
        let swapped = Self::archive_and_swap(
            &mut tx,
            &current,
            html_content,
            &project_data,
            &checksum,
            created_by,
        )
        .await?;

        Self::settle(pool, tx, id, expected_version, swapped).await
    }

    /// Make a snapshot's content the prototype's new current content.
    ///
    /// Restoring is forward-only: it runs the same archive-and-swap pipeline
    /// as [`Self::update_content`] and produces a new, higher version. When
    /// `expected_version` is `None` the version read at the start of the
    /// transaction is used. Returns [`MutationOutcome::NotFound`] if either
    /// the prototype or the snapshot is missing.
    pub async fn restore_version(
        pool: &PgPool,
        id: DbId,
        version_number: VersionNumber,
        expected_version: Option<VersionNumber>,
        created_by: Option<ActorId>,
    ) -> Result<MutationOutcome<Prototype>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let Some(current) = Self::fetch_current(&mut tx, id).await? else {
            return Ok(MutationOutcome::NotFound);
        };
        let Some(snapshot) =
            PrototypeVersionRepo::find_by_prototype_and_version(&mut *tx, id, version_number)
                .await?
        else {
            return Ok(MutationOutcome::NotFound);
        };

        let expected = expected_version.unwrap_or(current.version);
        if current.version != expected {
            return Ok(MutationOutcome::VersionMismatch {
                expected,
                actual: current.version,
            });
        }

        let checksum = content_checksum(&snapshot.html_content, &snapshot.project_data);
        let swapped = Self::archive_and_swap(
            &mut tx,
            &current,
            &snapshot.html_content,
            &snapshot.project_data,
            &checksum,
            created_by,
        )
        .await?;

        Self::settle(pool, tx, id, expected, swapped).await
    }

    /// Recompute the checksum of the live content and of every snapshot.
    ///
    /// Returns `None` if the prototype does not exist.
    pub async fn verify_integrity(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<IntegrityReport>, sqlx::Error> {
        let Some(prototype) = Self::find_by_id(pool, id).await? else {
            return Ok(None);
        };
        let versions = PrototypeVersionRepo::list_all_by_prototype(pool, id).await?;

        let computed = content_checksum(&prototype.html_content, &prototype.project_data);
        let mismatched_versions: Vec<VersionNumber> = versions
            .iter()
            .filter(|v| content_checksum(&v.html_content, &v.project_data) != v.content_checksum)
            .map(|v| v.version_number)
            .collect();

        if computed != prototype.content_checksum || !mismatched_versions.is_empty() {
            tracing::warn!(
                prototype_id = id,
                mismatched = mismatched_versions.len(),
                "Prototype checksum mismatch detected"
            );
        }

        Ok(Some(IntegrityReport {
            prototype_id: id,
            version: prototype.version,
            current_ok: computed == prototype.content_checksum,
            stored_checksum: prototype.content_checksum,
            computed_checksum: computed,
            versions_checked: versions.len(),
            mismatched_versions,
        }))
    }

    // ── Transaction steps ────────────────────────────────────────────

    async fn fetch_current(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<Prototype>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM prototypes WHERE id = $1");
        sqlx::query_as::<_, Prototype>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    /// Round-trip a payload through `JSONB` so it hashes the way it will be
    /// read back (`-0.0` becomes `0`, duplicate keys collapse).
    async fn normalize_payload(
        conn: &mut PgConnection,
        project_data: &serde_json::Value,
    ) -> Result<serde_json::Value, sqlx::Error> {
        sqlx::query_scalar::<_, serde_json::Value>("SELECT $1::jsonb")
            .bind(project_data)
            .fetch_one(conn)
            .await
    }

    /// Archive `current` and swap in the new content. Returns `None` when a
    /// concurrent writer won; the caller must roll back.
    async fn archive_and_swap(
        conn: &mut PgConnection,
        current: &Prototype,
        html_content: &str,
        project_data: &serde_json::Value,
        checksum: &str,
        created_by: Option<ActorId>,
    ) -> Result<Option<Prototype>, sqlx::Error> {
        let archived = PrototypeVersionRepo::create(
            &mut *conn,
            &CreatePrototypeVersion {
                prototype_id: current.id,
                version_number: current.version,
                html_content: &current.html_content,
                project_data: &current.project_data,
                content_checksum: &current.content_checksum,
                created_by,
            },
        )
        .await;

        match archived {
            Ok(_) => {}
            // Another transaction archived this version first and has
            // therefore already moved the row past it.
            Err(err) if is_unique_violation(&err, SNAPSHOT_UNIQUE_CONSTRAINT) => {
                tracing::debug!(
                    prototype_id = current.id,
                    version = current.version,
                    "Snapshot already archived by a concurrent update"
                );
                return Ok(None);
            }
            Err(err) => return Err(err),
        }

        let query = format!(
            "UPDATE prototypes SET
                html_content = $3,
                project_data = $4,
                content_checksum = $5,
                version = version + 1
             WHERE id = $1 AND version = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Prototype>(&query)
            .bind(current.id)
            .bind(current.version)
            .bind(html_content)
            .bind(project_data)
            .bind(checksum)
            .fetch_optional(&mut *conn)
            .await
    }

    /// Commit on success; otherwise roll back and report the version that
    /// won. If nothing moved the document, the archive collided with a
    /// snapshot that should not exist yet.
    async fn settle(
        pool: &PgPool,
        tx: Transaction<'_, Postgres>,
        id: DbId,
        expected_version: VersionNumber,
        swapped: Option<Prototype>,
    ) -> Result<MutationOutcome<Prototype>, sqlx::Error> {
        if let Some(updated) = swapped {
            tx.commit().await?;
            return Ok(MutationOutcome::Applied(updated));
        }

        tx.rollback().await?;
        match Self::current_version(pool, id).await? {
            Some(actual) if actual == expected_version => {
                tracing::error!(
                    prototype_id = id,
                    version = actual,
                    "Snapshot exists for the live version; history is inconsistent"
                );
                Ok(MutationOutcome::SnapshotConflict { version: actual })
            }
            Some(actual) => Ok(MutationOutcome::VersionMismatch {
                expected: expected_version,
                actual,
            }),
            None => Ok(MutationOutcome::NotFound),
        }
    }
}
