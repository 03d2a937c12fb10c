//! Domain logic for the USWDS prototyping tool's content versioning.
//!
//! This crate performs no I/O. It owns the canonical serializer, the content
//! fingerprint, the rules for paging and comparing versions, the typed
//! mutation outcome, and the shared error type used by `db` and `api`.

pub mod canonical;
pub mod error;
pub mod fingerprint;
pub mod roles;
pub mod types;
pub mod versioning;
