// linkshelf shared type definitions
// Each submodule defines the entities and inputs used across the crate.

pub mod bookmark;
pub mod errors;
pub mod folder;
pub mod settings;
pub mod tag;
pub mod workspace;
