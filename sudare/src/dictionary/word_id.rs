use std::fmt;

use crate::common::{MAX_DICTIONARIES, WORD_ID_BITS};
use crate::errors::{Result, SudareError};

const WORD_MASK: u32 = (1 << WORD_ID_BITS) - 1;

/// Identifier of a word in a set of dictionaries.
///
/// The upper 4 bits hold the dictionary index, where 0 is the system dictionary,
/// and the lower 28 bits hold the local word id.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Ord, PartialOrd, Default)]
pub struct WordId(u32);

impl WordId {
    /// Creates a new instance, checking both parts fit in their bits.
    pub fn new(dic: usize, word: u32) -> Result<Self> {
        if dic >= MAX_DICTIONARIES {
            return Err(SudareError::invalid_argument(
                "dic",
                format!("dictionary index {dic} is too large"),
            ));
        }
        if word > WORD_MASK {
            return Err(SudareError::invalid_argument(
                "word",
                format!("word id {word} is too large"),
            ));
        }
        Ok(Self(((dic as u32) << WORD_ID_BITS) | word))
    }

    /// Composes an id, truncating both parts to their bits.
    #[inline(always)]
    pub(crate) const fn compose(dic: usize, word: u32) -> Self {
        Self((((dic as u32) & 0xF) << WORD_ID_BITS) | (word & WORD_MASK))
    }

    /// Gets the raw 32-bit representation.
    #[inline(always)]
    pub const fn as_raw(self) -> u32 {
        self.0
    }

    /// Gets the index of the dictionary.
    #[inline(always)]
    pub const fn dic(self) -> usize {
        (self.0 >> WORD_ID_BITS) as usize
    }

    /// Gets the local id in the dictionary.
    #[inline(always)]
    pub const fn word(self) -> u32 {
        self.0 & WORD_MASK
    }

    /// Checks if the word is in the system dictionary.
    #[inline(always)]
    pub const fn is_system(self) -> bool {
        self.dic() == 0
    }
}

impl fmt::Debug for WordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WordId")
            .field("dic", &self.dic())
            .field("word", &self.word())
            .finish()
    }
}

impl fmt::Display for WordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.dic(), self.word())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parts() {
        let id = WordId::new(3, 12345).unwrap();
        assert_eq!(id.dic(), 3);
        assert_eq!(id.word(), 12345);
        assert_eq!(id.as_raw(), (3 << 28) | 12345);
        assert!(!id.is_system());
        assert!(WordId::new(0, 7).unwrap().is_system());
    }

    #[test]
    fn test_overflow() {
        assert!(WordId::new(16, 0).is_err());
        assert!(WordId::new(0, 1 << 28).is_err());
        assert!(WordId::new(15, (1 << 28) - 1).is_ok());
    }
}
