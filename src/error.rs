//! Error taxonomy for scene construction and mutation.
//!
//! Lookups and mutators addressed to an unknown element name are deliberately
//! silent no-ops (matching expected usage); only malformed construction and
//! malformed values are surfaced as errors. A failed call never leaves the
//! scene store partially mutated.

/// Error returned by scene construction and mutation calls.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An element with this name already exists in the scene.
    #[error("element named {0:?} already exists")]
    DuplicateName(String),
    /// An existing element name starts with this pie prefix.
    #[error("an existing element already uses the prefix {0:?}")]
    DuplicatePrefix(String),
    /// The element name (or pie prefix) is empty.
    #[error("invalid element name {0:?}")]
    InvalidName(String),
    /// Merged params failed validation for the element's shape kind.
    #[error("invalid params for {name:?}: {reason}")]
    InvalidParams {
        /// Name of the element the params were destined for.
        name: String,
        /// What was wrong with the value.
        reason: String,
    },
    /// A color value could not be parsed by the codec.
    #[error("invalid color value: {0}")]
    InvalidColor(String),
}
