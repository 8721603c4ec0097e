//! Conversion between `str` keys and the byte labels stored in the trees.
//!
//! The alphabet is the first 256 Unicode scalar values, so every accepted
//! character maps to exactly one label byte and `char::from(u8)` maps it back.

use smallvec::SmallVec;

use crate::error::{Error, Result};

/// Number of root slots, one per possible leading character.
pub const ALPHABET: usize = 256;

/// Pattern character matching any single character in
/// [`HybridTst::keys_that_match`](crate::HybridTst::keys_that_match).
pub const WILDCARD: char = '.';

pub(crate) const WILDCARD_LABEL: u8 = WILDCARD as u8;

/// Label bytes of a key or of a partially rebuilt key.
pub(crate) type KeyBuf = SmallVec<[u8; 32]>;

/// Validates `key` and returns its label bytes.
pub(crate) fn encode(key: &str) -> Result<KeyBuf> {
    let mut out = KeyBuf::with_capacity(key.len());
    for (position, ch) in key.chars().enumerate() {
        let label = u8::try_from(u32::from(ch)).map_err(|_| Error::InvalidKey { ch, position })?;
        out.push(label);
    }
    if out.is_empty() {
        return Err(Error::EmptyKey);
    }
    Ok(out)
}

/// Rebuilds a key from label bytes.
pub(crate) fn decode(labels: &[u8]) -> String {
    labels.iter().copied().map(char::from).collect()
}

/// Byte offset in `s` where its `n`th character starts, or `s.len()` if it
/// has `n` characters or fewer.
pub(crate) fn char_boundary(s: &str, n: usize) -> usize {
    s.char_indices().nth(n).map_or(s.len(), |(i, _)| i)
}
