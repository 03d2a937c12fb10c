pub mod prototype;
pub mod prototype_version;
