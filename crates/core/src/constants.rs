//! Constants used throughout the review core crate.
//!
//! This module contains the classification type sets, fixed literals, and
//! filename constants to ensure consistency across the codebase.

/// rmTypes rendered as displayable, numerable containers.
pub const CONTAINER_TYPES: [&str; 9] = [
    "SECTION",
    "EVALUATION",
    "ADMIN_ENTRY",
    "OBSERVATION",
    "INSTRUCTION",
    "ACTION",
    "GENERIC_ENTRY",
    "CLUSTER",
    "EVENT_CONTEXT",
];

/// Context metadata ids pruned when an `inContext` node sits exactly one path
/// segment below its parent.
pub const CONTEXT_SKIP_IDS: [&str; 8] = [
    "language",
    "encoding",
    "subject",
    "category",
    "territory",
    "composer",
    "health_care_facility",
    "location",
];

/// Label used when no naming source yields a non-blank string.
pub const UNNAMED_LABEL: &str = "unnamed";

/// Composition name of the sentinel returned when the template has no tree.
pub const MISSING_TREE_COMPOSITION_NAME: &str = "error: template tree missing or invalid";

/// Composition name of the sentinel returned when the tree nests too deeply.
pub const DEPTH_EXCEEDED_COMPOSITION_NAME: &str = "error: template nesting too deep";

/// Hard bound on recursion depth over the template tree. Archetype-derived
/// trees are a few levels deep; anything past this is malformed input.
pub const MAX_TREE_DEPTH: usize = 64;

/// Language used when the template declares none.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Author recorded when a comment arrives without one.
pub const ANONYMOUS_AUTHOR: &str = "anonymous";

/// Filename for the comment store document inside the data directory.
pub const COMMENTS_FILENAME: &str = "comments.json";

/// Separator between concatenated comments in one export cell.
pub const EXPORT_COMMENT_SEPARATOR: &str = "; ";

/// Whether the given (uppercased) rmType is a displayable container.
pub fn is_container_type(rm_type: &str) -> bool {
    CONTAINER_TYPES.contains(&rm_type)
}

/// Whether the given relative path segment is pruned context metadata.
pub fn is_context_skip_id(segment: &str) -> bool {
    CONTEXT_SKIP_IDS.contains(&segment)
}
