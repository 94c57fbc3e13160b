//! Work discovery and on-disk resumability.
//!
//! The file system is the only durable state: an artifact `<base>_<tag>.<ext>` or a failure
//! marker `<artifact>.failed` next to the input means the variant is done.

/// Jobs, variant tasks and artifact naming.
pub mod job;
/// Lazy input-tree traversal.
pub mod walker;
