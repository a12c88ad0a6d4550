use std::io::{prelude::*, BufReader, Read};

use hashbrown::{HashMap, HashSet};
use unicode_normalization::UnicodeNormalization;

use crate::dictionary::character::CharacterCategory;
use crate::errors::{Result, SudareError};
use crate::input_text::InputText;

/// Builder of [`InputText`] applying the rules of `rewrite.def`.
///
/// Each character is either replaced by the longest matching rule, or lowercased and then
/// NFKC-normalized unless the lowercase form is in the set of characters kept as they are.
pub struct InputTextBuilder {
    ignore_normalize: HashSet<char>,
    replaces: Vec<String>,
    trie: Option<crawdad::Trie>,
}

impl InputTextBuilder {
    /// Creates a new instance from `rewrite.def`.
    pub fn from_reader<R>(rdr: R) -> Result<Self>
    where
        R: Read,
    {
        let mut ignore_normalize = HashSet::new();
        let mut replace_map = HashMap::new();

        let reader = BufReader::new(rdr);
        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let cols: Vec<_> = line.split_whitespace().collect();
            match cols.len() {
                1 => {
                    let mut chars = cols[0].chars();
                    match (chars.next(), chars.next()) {
                        (Some(c), None) => {
                            ignore_normalize.insert(c);
                        }
                        _ => {
                            let msg = format!("{} is not character at line {}", cols[0], i + 1);
                            return Err(SudareError::invalid_format("rewrite.def", msg));
                        }
                    }
                }
                2 => {
                    if replace_map.contains_key(cols[0]) {
                        let msg = format!("{} is already defined at line {}", cols[0], i + 1);
                        return Err(SudareError::invalid_format("rewrite.def", msg));
                    }
                    replace_map.insert(cols[0].to_string(), cols[1].to_string());
                }
                _ => {
                    let msg = format!("invalid format at line {}", i + 1);
                    return Err(SudareError::invalid_format("rewrite.def", msg));
                }
            }
        }

        let mut entries: Vec<_> = replace_map.into_iter().collect();
        entries.sort_unstable();
        let trie = if entries.is_empty() {
            None
        } else {
            let records = entries
                .iter()
                .enumerate()
                .map(|(i, (from, _))| (from, i as u32));
            Some(
                crawdad::Trie::from_records(records)
                    .map_err(|e| SudareError::invalid_format("rewrite.def", e.to_string()))?,
            )
        };
        let replaces = entries.into_iter().map(|(_, to)| to).collect();

        Ok(Self {
            ignore_normalize,
            replaces,
            trie,
        })
    }

    /// Finds the longest rule matching at the head of `chars`, returning the replacement
    /// and the number of chars matched.
    #[inline]
    fn longest_match(&self, chars: &[char]) -> Option<(&str, usize)> {
        let trie = self.trie.as_ref()?;
        trie.common_prefix_search(chars.iter().copied())
            .last()
            .map(|(value, end)| (self.replaces[value as usize].as_str(), end))
    }

    /// Builds the input text of `text`.
    pub fn build(&self, text: &str, char_category: &CharacterCategory) -> InputText {
        let chars: Vec<_> = text.chars().collect();
        let mut modified = String::with_capacity(text.len());
        let mut text_offsets = Vec::with_capacity(chars.len() + 1);

        let mut i = 0;
        while i < chars.len() {
            if let Some((replace, len)) = self.longest_match(&chars[i..]) {
                for c in replace.chars() {
                    modified.push(c);
                    text_offsets.push(i);
                }
                i += len;
                continue;
            }

            let lower: String = chars[i].to_lowercase().collect();
            let mut lower_chars = lower.chars();
            let keep = match (lower_chars.next(), lower_chars.next()) {
                (Some(c), None) => self.ignore_normalize.contains(&c),
                _ => false,
            };
            if keep {
                modified.push_str(&lower);
                text_offsets.extend(std::iter::repeat(i).take(lower.chars().count()));
            } else {
                for c in lower.nfkc() {
                    modified.push(c);
                    text_offsets.push(i);
                }
            }
            i += 1;
        }
        text_offsets.push(chars.len());

        let char_categories = modified
            .chars()
            .map(|c| char_category.get_category_types(c))
            .collect();

        InputText::new(text.to_string(), modified, text_offsets, char_categories)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::dictionary::character::CategoryType;

    const CHAR_DEF: &str = "0x0030..0x0039 NUMERIC\n0x0061..0x007A ALPHA\n0x30A1..0x30FC KATAKANA";

    fn builder(rewrite_def: &str) -> InputTextBuilder {
        InputTextBuilder::from_reader(rewrite_def.as_bytes()).unwrap()
    }

    fn char_category() -> CharacterCategory {
        CharacterCategory::from_reader(CHAR_DEF.as_bytes()).unwrap()
    }

    #[test]
    fn test_normalize() {
        let input = builder("").build("ＡＢＣｱｲ１", &char_category());
        assert_eq!(input.text(), "abcアイ1");
        assert_eq!(input.original_text(), "ＡＢＣｱｲ１");
        assert_eq!(input.get_original_index(3), 3);
        assert_eq!(input.get_original_index(6), 4);
        assert_eq!(input.get_char_category_types(0, 3), CategoryType::ALPHA);
        assert_eq!(input.get_char_category_types(3, 9), CategoryType::KATAKANA);
        assert_eq!(input.get_char_category_types_at(9), CategoryType::NUMERIC);
    }

    #[test]
    fn test_ignore_normalize() {
        let input = builder("# keep\nⅢ\nｱ\n").build("ⅢｱＡ", &char_category());
        // 'Ⅲ' lowercases to 'ⅲ', which is not kept and thus normalized.
        assert_eq!(input.text(), "iiiｱa");
        assert_eq!(input.get_original_index(2), 0);
        assert_eq!(input.get_original_index(3), 1);
        assert_eq!(input.get_original_index(6), 2);
    }

    #[test]
    fn test_replace_longest() {
        let input = builder("ゔ ヴ\nゔぁ ヴァ\nｶﾞ ガ").build("ゔぁゔｶﾞ", &char_category());
        assert_eq!(input.text(), "ヴァヴガ");
        assert_eq!(input.get_original_index(0), 0);
        assert_eq!(input.get_original_index(3), 0);
        assert_eq!(input.get_original_index(6), 2);
        assert_eq!(input.get_original_index(9), 3);
        assert_eq!(input.get_original_index(12), 5);
    }

    #[test]
    fn test_expansion() {
        let input = builder("").build("㍿x", &char_category());
        assert_eq!(input.text(), "株式会社x");
        assert_eq!(input.get_original_index(9), 0);
        assert_eq!(input.get_original_index(12), 1);
    }

    #[test]
    fn test_invalid_def() {
        assert!(InputTextBuilder::from_reader("ab".as_bytes()).is_err());
        assert!(InputTextBuilder::from_reader("a b c".as_bytes()).is_err());
        assert!(InputTextBuilder::from_reader("a b\na c".as_bytes()).is_err());
    }
}
