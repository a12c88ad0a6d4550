use bitflags::bitflags;
use std::str::FromStr;

use crate::errors::{Result, SudareError};

bitflags! {
    /// A set of character categories.
    #[repr(transparent)]
    pub struct CategoryType: u32 {
        /// Characters of no other category.
        const DEFAULT = (1 << 0);
        /// White spaces.
        const SPACE = (1 << 1);
        /// Kanji.
        const KANJI = (1 << 2);
        /// Symbols.
        const SYMBOL = (1 << 3);
        /// Digits.
        const NUMERIC = (1 << 4);
        /// Latin letters.
        const ALPHA = (1 << 5);
        /// Hiragana.
        const HIRAGANA = (1 << 6);
        /// Katakana.
        const KATAKANA = (1 << 7);
        /// Kanji numerals.
        const KANJINUMERIC = (1 << 8);
        /// Greek letters.
        const GREEK = (1 << 9);
        /// Cyrillic letters.
        const CYRILLIC = (1 << 10);
        /// User-defined category 1.
        const USER1 = (1 << 11);
        /// User-defined category 2.
        const USER2 = (1 << 12);
        /// User-defined category 3.
        const USER3 = (1 << 13);
        /// User-defined category 4.
        const USER4 = (1 << 14);
        /// Characters that cannot begin an unknown word.
        const NOOOVBOW = (1 << 15);
    }
}

const NAMES: [&str; CategoryType::NUM_CATEGORIES] = [
    "DEFAULT",
    "SPACE",
    "KANJI",
    "SYMBOL",
    "NUMERIC",
    "ALPHA",
    "HIRAGANA",
    "KATAKANA",
    "KANJINUMERIC",
    "GREEK",
    "CYRILLIC",
    "USER1",
    "USER2",
    "USER3",
    "USER4",
    "NOOOVBOW",
];

impl FromStr for CategoryType {
    type Err = SudareError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NAMES
            .iter()
            .position(|&name| name == s)
            .map(Self::from_id)
            .ok_or_else(|| {
                SudareError::invalid_argument("s", format!("Undefined category name, {s}"))
            })
    }
}

impl CategoryType {
    /// The number of categories.
    pub const NUM_CATEGORIES: usize = 16;

    /// Creates the set of the single category with the id.
    #[inline(always)]
    pub fn from_id(id: usize) -> Self {
        debug_assert!(id < Self::NUM_CATEGORIES);
        Self::from_bits_truncate(1 << id)
    }

    /// Gets the number of categories in the set.
    #[inline(always)]
    pub const fn len(&self) -> u32 {
        self.bits.count_ones()
    }

    /// Iterates over the ids of the categories in the set.
    #[inline(always)]
    pub const fn id_iter(&self) -> CategoryIdIter {
        CategoryIdIter { bits: self.bits }
    }

    /// Gets the name of the category with the id.
    pub fn name(id: usize) -> Option<&'static str> {
        NAMES.get(id).copied()
    }

    /// Gets the names of the categories in the set, in id order.
    pub fn names(&self) -> Vec<&'static str> {
        self.id_iter().map(|id| NAMES[id]).collect()
    }
}

/// Iterator over category ids, from the lowest.
pub struct CategoryIdIter {
    bits: u32,
}

impl Iterator for CategoryIdIter {
    type Item = usize;

    #[inline(always)]
    fn next(&mut self) -> Option<Self::Item> {
        if self.bits == 0 {
            return None;
        }
        let numtz = self.bits.trailing_zeros();
        self.bits ^= 1 << numtz;
        Some(numtz as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str() {
        assert_eq!("KATAKANA".parse::<CategoryType>().unwrap(), CategoryType::KATAKANA);
        assert_eq!("NOOOVBOW".parse::<CategoryType>().unwrap(), CategoryType::NOOOVBOW);
        assert!("katakana".parse::<CategoryType>().is_err());
        assert!("USER5".parse::<CategoryType>().is_err());
    }

    #[test]
    fn test_id_iter() {
        let cates = CategoryType::NUMERIC | CategoryType::KANJI | CategoryType::NOOOVBOW;
        assert_eq!(cates.id_iter().collect::<Vec<_>>(), vec![2, 4, 15]);
        assert_eq!(cates.names(), vec!["KANJI", "NUMERIC", "NOOOVBOW"]);
        assert_eq!(cates.len(), 3);
    }
}
