//! Identifier and value aliases shared by the storage and HTTP layers.

/// Primary key of a `prototypes` or `prototype_versions` row (BIGSERIAL).
pub type DbId = i64;

/// Identity of whoever made a change, taken from the token subject and stored
/// as `created_by`. There is no users table; the id is opaque here.
pub type ActorId = DbId;

/// A document's position in its own history. Starts at 1 and only grows.
pub type VersionNumber = i32;

/// Row timestamps, always UTC (`TIMESTAMPTZ`).
pub type Timestamp = chrono::DateTime<chrono::Utc>;
