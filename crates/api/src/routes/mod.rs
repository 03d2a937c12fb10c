pub mod health;
pub mod prototype;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /prototypes                                      list, create
/// /prototypes/{id}                                 get, rename, delete
/// /prototypes/{id}/content                         compare-and-swap update (PUT)
/// /prototypes/{id}/integrity                       checksum verification
/// /prototypes/{id}/versions                        snapshot history
/// /prototypes/{id}/versions/compare                two-sided HTML comparison
/// /prototypes/{id}/versions/{version}              get, relabel
/// /prototypes/{id}/versions/{version}/restore      restore forward (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/prototypes", prototype::router())
}
