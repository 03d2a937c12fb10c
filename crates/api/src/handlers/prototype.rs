//! Handlers for prototype documents.
//!
//! Reads are open to any authenticated user; mutations require the editor
//! role. Content replacement is a compare-and-swap on `expected_version`.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use uswds_pt_core::error::CoreError;
use uswds_pt_core::types::DbId;
use uswds_pt_core::versioning::{validate_content, validate_expected_version, validate_name};
use uswds_pt_db::models::prototype::{
    CreatePrototype, Prototype, UpdatePrototype, UpdatePrototypeContent,
};
use uswds_pt_db::repositories::PrototypeRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireEditor;
use crate::query::PaginationParams;
use crate::response::{DataResponse, PaginatedResponse};
use crate::state::AppState;

pub(crate) const ENTITY: &str = "Prototype";

/// Fetch a prototype or return 404.
pub(crate) async fn ensure_prototype(pool: &sqlx::PgPool, id: DbId) -> AppResult<Prototype> {
    PrototypeRepo::find_by_id(pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: ENTITY, id }))
}

/// GET /prototypes
pub async fn list_prototypes(
    _auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> AppResult<impl IntoResponse> {
    let window = params.window();
    let (items, total) =
        PrototypeRepo::list(&state.pool, window.page_size, window.offset()).await?;
    Ok(Json(PaginatedResponse::new(items, total, window)))
}

/// POST /prototypes
///
/// Create a prototype at version 1.
pub async fn create_prototype(
    RequireEditor(user): RequireEditor,
    State(state): State<AppState>,
    Json(input): Json<CreatePrototype>,
) -> AppResult<impl IntoResponse> {
    validate_name(&input.name)?;
    validate_content(&input.html_content, &input.project_data)?;

    let prototype = PrototypeRepo::create(&state.pool, &input, user.actor()).await?;

    tracing::info!(
        user_id = user.user_id,
        prototype_id = prototype.id,
        "Prototype created"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: prototype })))
}

/// GET /prototypes/{id}
pub async fn get_prototype(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let prototype = ensure_prototype(&state.pool, id).await?;
    Ok(Json(DataResponse { data: prototype }))
}

/// PATCH /prototypes/{id}
///
/// Metadata-only update. Never bumps the version or writes a snapshot.
pub async fn update_prototype(
    RequireEditor(user): RequireEditor,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdatePrototype>,
) -> AppResult<impl IntoResponse> {
    let prototype = match input.name {
        Some(ref name) => {
            validate_name(name)?;
            PrototypeRepo::rename(&state.pool, id, name)
                .await?
                .ok_or(AppError::Core(CoreError::NotFound { entity: ENTITY, id }))?
        }
        None => ensure_prototype(&state.pool, id).await?,
    };

    tracing::info!(user_id = user.user_id, prototype_id = id, "Prototype renamed");

    Ok(Json(DataResponse { data: prototype }))
}

/// PUT /prototypes/{id}/content
///
/// Replace the content if the prototype is still at `expected_version`. The
/// outgoing content is archived as a snapshot and the version advances by
/// one. A stale `expected_version` yields 409 with the current version.
pub async fn update_content(
    RequireEditor(user): RequireEditor,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdatePrototypeContent>,
) -> AppResult<impl IntoResponse> {
    validate_expected_version(input.expected_version)?;
    validate_content(&input.html_content, &input.project_data)?;

    let prototype = PrototypeRepo::update_content(
        &state.pool,
        id,
        input.expected_version,
        &input.html_content,
        &input.project_data,
        user.actor(),
    )
    .await?
    .into_result(ENTITY, id)?;

    tracing::info!(
        user_id = user.user_id,
        prototype_id = id,
        version = prototype.version,
        "Prototype content updated"
    );

    Ok(Json(DataResponse { data: prototype }))
}

/// DELETE /prototypes/{id}
///
/// Removes the prototype together with its snapshot history.
pub async fn delete_prototype(
    RequireEditor(user): RequireEditor,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !PrototypeRepo::delete(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::NotFound { entity: ENTITY, id }));
    }

    tracing::info!(user_id = user.user_id, prototype_id = id, "Prototype deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// GET /prototypes/{id}/integrity
///
/// Recompute checksums for the live content and every snapshot.
pub async fn verify_integrity(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let report = PrototypeRepo::verify_integrity(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: ENTITY, id }))?;
    Ok(Json(DataResponse { data: report }))
}
