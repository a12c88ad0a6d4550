//! Mapping from characters to their categories, defined in `char.def`.
pub mod category;

use std::io::{prelude::*, BufReader, Read};

pub use category::CategoryType;

use crate::errors::{Result, SudareError};

const TABLE_SIZE: usize = 1 << 16;
const MAX_CODE_POINT: u32 = 0x10FFFF;

struct CharRange {
    low: u32,
    high: u32,
    categories: CategoryType,
}

/// Mapping from characters to their category sets.
///
/// When ranges overlap, the one defined later wins and replaces the whole set.
/// Characters in no range are [`CategoryType::DEFAULT`].
pub struct CharacterCategory {
    bmp: Vec<CategoryType>,
    // Ranges over supplementary planes, in definition order.
    supplementary: Vec<CharRange>,
}

impl CharacterCategory {
    /// Gets the categories of the character.
    #[inline(always)]
    pub fn get_category_types(&self, c: char) -> CategoryType {
        let cp = u32::from(c);
        if let Some(&cates) = self.bmp.get(cp as usize) {
            return cates;
        }
        self.supplementary
            .iter()
            .rev()
            .find(|r| r.low <= cp && cp <= r.high)
            .map_or(CategoryType::DEFAULT, |r| r.categories)
    }

    /// Creates a new instance from `char.def`.
    ///
    /// Only the range lines `0xHEX[..0xHEX] CAT [CAT...]` are read here;
    /// category definition lines are consumed by the MeCab OOV provider.
    pub fn from_reader<R>(rdr: R) -> Result<Self>
    where
        R: Read,
    {
        let mut bmp = vec![CategoryType::DEFAULT; TABLE_SIZE];
        let mut supplementary = vec![];

        let reader = BufReader::new(rdr);
        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let cols: Vec<_> = line.split_whitespace().collect();
            if cols.len() < 2 {
                let msg = format!("invalid format at line {}", i + 1);
                return Err(SudareError::invalid_format("char.def", msg));
            }
            if !cols[0].starts_with("0x") {
                continue;
            }
            let r = Self::parse_char_range(&cols, i + 1)?;
            if r.high < TABLE_SIZE as u32 {
                bmp[r.low as usize..=r.high as usize].fill(r.categories);
            } else {
                let bmp_high = r.high.min(TABLE_SIZE as u32 - 1);
                if r.low <= bmp_high {
                    bmp[r.low as usize..=bmp_high as usize].fill(r.categories);
                }
                supplementary.push(r);
            }
        }

        Ok(Self { bmp, supplementary })
    }

    fn parse_char_range(cols: &[&str], lineno: usize) -> Result<CharRange> {
        let parse_hex = |s: &str| -> Result<u32> {
            Ok(u32::from_str_radix(s.trim_start_matches("0x"), 16)?)
        };
        let r: Vec<_> = cols[0].split("..").collect();
        let low = parse_hex(r[0])?;
        let high = if r.len() > 1 { parse_hex(r[1])? } else { low };
        if low > high {
            let msg = format!("invalid range at line {lineno}");
            return Err(SudareError::invalid_format("char.def", msg));
        }
        if high > MAX_CODE_POINT {
            let msg = format!("a code point must be no more than 0x10FFFF at line {lineno}");
            return Err(SudareError::invalid_format("char.def", msg));
        }

        let mut categories = CategoryType::empty();
        for &cate in cols[1..].iter().take_while(|&&col| !col.starts_with('#')) {
            let cate: CategoryType = cate.parse().map_err(|_| {
                let msg = format!("{cate} is invalid type at line {lineno}");
                SudareError::invalid_format("char.def", msg)
            })?;
            categories |= cate;
        }

        Ok(CharRange {
            low,
            high,
            categories,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic() {
        let data = "DEFAULT 0 1 0\nSPACE 0 1 0\n0x0020 SPACE\n0x0030..0x0039 NUMERIC";
        let cc = CharacterCategory::from_reader(data.as_bytes()).unwrap();
        assert_eq!(cc.get_category_types(' '), CategoryType::SPACE);
        assert_eq!(cc.get_category_types('5'), CategoryType::NUMERIC);
        assert_eq!(cc.get_category_types('a'), CategoryType::DEFAULT);
    }

    #[test]
    fn test_later_range_wins() {
        let data = "0x0030..0x0039 NUMERIC\n0x0032 KANJI KANJINUMERIC # two";
        let cc = CharacterCategory::from_reader(data.as_bytes()).unwrap();
        assert_eq!(cc.get_category_types('1'), CategoryType::NUMERIC);
        assert_eq!(
            cc.get_category_types('2'),
            CategoryType::KANJI | CategoryType::KANJINUMERIC
        );
    }

    #[test]
    fn test_supplementary() {
        let data = "0xFF00..0x1F64F SYMBOL\n0x1F600 USER1";
        let cc = CharacterCategory::from_reader(data.as_bytes()).unwrap();
        assert_eq!(cc.get_category_types('\u{FF01}'), CategoryType::SYMBOL);
        assert_eq!(cc.get_category_types('\u{1F601}'), CategoryType::SYMBOL);
        assert_eq!(cc.get_category_types('\u{1F600}'), CategoryType::USER1);
        assert_eq!(cc.get_category_types('\u{1F650}'), CategoryType::DEFAULT);
    }

    #[test]
    fn test_invalid_cate() {
        let data = "0x0..0xFFFF INVALID";
        assert!(CharacterCategory::from_reader(data.as_bytes()).is_err());
    }

    #[test]
    fn test_invalid_range() {
        let data = "0x0020..0x0019 DEFAULT";
        assert!(CharacterCategory::from_reader(data.as_bytes()).is_err());
        let data = "0x0..0x110000 DEFAULT";
        assert!(CharacterCategory::from_reader(data.as_bytes()).is_err());
    }

    #[test]
    fn test_few_cols() {
        let data = "0x0020";
        assert!(CharacterCategory::from_reader(data.as_bytes()).is_err());
    }
}
