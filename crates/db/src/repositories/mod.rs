//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that accept
//! `&PgPool` (or a connection inside an open transaction) as the first argument.

pub mod prototype_repo;
pub mod prototype_version_repo;

pub use prototype_repo::PrototypeRepo;
pub use prototype_version_repo::PrototypeVersionRepo;
