//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - `Deserialize` request DTOs for inserts and patches
//! - Response types assembled by the repository layer

pub mod prototype;
pub mod prototype_version;
