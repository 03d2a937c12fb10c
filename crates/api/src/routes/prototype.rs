//! Route definitions for prototypes and their snapshot history.
//!
//! Registered under `/prototypes`.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::{prototype, prototype_version};
use crate::state::AppState;

/// Prototype routes, registered as `/prototypes`.
///
/// ```text
/// GET    /                                  list_prototypes
/// POST   /                                  create_prototype
/// GET    /{id}                              get_prototype
/// PATCH  /{id}                              update_prototype
/// DELETE /{id}                              delete_prototype
/// PUT    /{id}/content                      update_content
/// GET    /{id}/integrity                    verify_integrity
/// GET    /{id}/versions                     list_versions
/// GET    /{id}/versions/compare             compare_versions
/// GET    /{id}/versions/{version}           get_version
/// PATCH  /{id}/versions/{version}           update_version_label
/// POST   /{id}/versions/{version}/restore   restore_version
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(prototype::list_prototypes).post(prototype::create_prototype),
        )
        .route(
            "/{id}",
            get(prototype::get_prototype)
                .patch(prototype::update_prototype)
                .delete(prototype::delete_prototype),
        )
        .route("/{id}/content", put(prototype::update_content))
        .route("/{id}/integrity", get(prototype::verify_integrity))
        .route("/{id}/versions", get(prototype_version::list_versions))
        // Static segment; matchit prefers it over `{version}`.
        .route(
            "/{id}/versions/compare",
            get(prototype_version::compare_versions),
        )
        .route(
            "/{id}/versions/{version}",
            get(prototype_version::get_version).patch(prototype_version::update_version_label),
        )
        .route(
            "/{id}/versions/{version}/restore",
            post(prototype_version::restore_version),
        )
}
