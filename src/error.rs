/// Errors raised when a key, prefix, pattern or query breaks the alphabet
/// contract.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A character whose code is outside `0..256`.
    #[error("invalid key: character {ch:?} at position {position} is outside the 256-character alphabet")]
    InvalidKey {
        /// The offending character.
        ch: char,
        /// Character (not byte) offset of `ch` in the input.
        position: usize,
    },

    /// A zero-length key where at least one character is required.
    #[error("key must contain at least one character")]
    EmptyKey,
}

/// Result type for dictionary operations.
pub type Result<T> = std::result::Result<T, Error>;
