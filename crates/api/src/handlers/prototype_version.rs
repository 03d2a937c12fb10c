//! Handlers for a prototype's snapshot history.
//!
//! Snapshots are read-only apart from their label. Restoring one writes a
//! new version through the same compare-and-swap path as a content update.

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;

use uswds_pt_core::error::CoreError;
use uswds_pt_core::types::DbId;
use uswds_pt_core::versioning::{normalize_label, validate_expected_version, CompareTarget};
use uswds_pt_db::models::prototype::RestoreVersionRequest;
use uswds_pt_db::models::prototype_version::UpdateVersionLabel;
use uswds_pt_db::repositories::{PrototypeRepo, PrototypeVersionRepo};

use super::prototype::{ensure_prototype, ENTITY};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireEditor;
use crate::query::{CompareParams, PaginationParams};
use crate::response::{DataResponse, PaginatedResponse};
use crate::state::AppState;

const VERSION_ENTITY: &str = "PrototypeVersion";

fn version_not_found(version: i32) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: VERSION_ENTITY,
        id: DbId::from(version),
    })
}

/// GET /prototypes/{id}/versions
///
/// Newest-first snapshot summaries with the total count.
pub async fn list_versions(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Query(params): Query<PaginationParams>,
) -> AppResult<impl IntoResponse> {
    ensure_prototype(&state.pool, id).await?;

    let window = params.window();
    let (items, total) =
        PrototypeVersionRepo::list_by_prototype(&state.pool, id, window.page_size, window.offset())
            .await?;
    Ok(Json(PaginatedResponse::new(items, total, window)))
}

/// GET /prototypes/{id}/versions/{version}
pub async fn get_version(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path((id, version)): Path<(DbId, i32)>,
) -> AppResult<impl IntoResponse> {
    let snapshot = PrototypeVersionRepo::find_by_prototype_and_version(&state.pool, id, version)
        .await?
        .ok_or_else(|| version_not_found(version))?;
    Ok(Json(DataResponse { data: snapshot }))
}

/// PATCH /prototypes/{id}/versions/{version}
///
/// Set or clear a snapshot's label. Content is never touched.
pub async fn update_version_label(
    RequireEditor(user): RequireEditor,
    State(state): State<AppState>,
    Path((id, version)): Path<(DbId, i32)>,
    Json(input): Json<UpdateVersionLabel>,
) -> AppResult<impl IntoResponse> {
    let label = normalize_label(input.label.as_deref())?;

    let snapshot =
        PrototypeVersionRepo::update_label(&state.pool, id, version, label.as_deref())
            .await?
            .ok_or_else(|| version_not_found(version))?;

    tracing::info!(
        user_id = user.user_id,
        prototype_id = id,
        version,
        "Snapshot relabelled"
    );

    Ok(Json(DataResponse { data: snapshot }))
}

/// Work out which side of a failed comparison has no snapshot.
async fn missing_side(
    pool: &sqlx::PgPool,
    id: DbId,
    sides: [CompareTarget; 2],
) -> AppResult<AppError> {
    for side in sides {
        if let CompareTarget::Version(n) = side {
            if PrototypeVersionRepo::find_by_prototype_and_version(pool, id, n)
                .await?
                .is_none()
            {
                return Ok(version_not_found(n));
            }
        }
    }
    Ok(AppError::Core(CoreError::NotFound { entity: ENTITY, id }))
}

/// GET /prototypes/{id}/versions/compare?a=&b=
///
/// HTML of two versions for client-side diffing. Either side may be
/// `current`.
pub async fn compare_versions(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Query(params): Query<CompareParams>,
) -> AppResult<impl IntoResponse> {
    let (a, b) = params.targets()?;
    ensure_prototype(&state.pool, id).await?;

    let Some(comparison) = PrototypeVersionRepo::compare(&state.pool, id, a, b).await? else {
        return Err(missing_side(&state.pool, id, [a, b]).await?);
    };
    Ok(Json(DataResponse { data: comparison }))
}

/// POST /prototypes/{id}/versions/{version}/restore
///
/// Copy a snapshot's content forward as a new version. History is never
/// rewritten.
pub async fn restore_version(
    RequireEditor(user): RequireEditor,
    State(state): State<AppState>,
    Path((id, version)): Path<(DbId, i32)>,
    body: Bytes,
) -> AppResult<impl IntoResponse> {
    // The body is optional; an empty one restores against the current version.
    let input: RestoreVersionRequest = if body.is_empty() {
        RestoreVersionRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| AppError::BadRequest(format!("Invalid restore request: {e}")))?
    };
    if let Some(expected) = input.expected_version {
        validate_expected_version(expected)?;
    }

    ensure_prototype(&state.pool, id).await?;
    if PrototypeVersionRepo::find_by_prototype_and_version(&state.pool, id, version)
        .await?
        .is_none()
    {
        return Err(version_not_found(version));
    }

    let prototype = PrototypeRepo::restore_version(
        &state.pool,
        id,
        version,
        input.expected_version,
        user.actor(),
    )
    .await?
    .into_result(ENTITY, id)?;

    tracing::info!(
        user_id = user.user_id,
        prototype_id = id,
        restored_from = version,
        version = prototype.version,
        "Prototype restored from snapshot"
    );

    Ok(Json(DataResponse { data: prototype }))
}
