//! Normalized input text with offset and category tables.
mod builder;

pub use builder::InputTextBuilder;

use crate::dictionary::character::CategoryType;
use crate::errors::{Result, SudareError};

/// Input text prepared for tokenization.
///
/// Byte offsets given to the methods refer to the working text, which is the original text
/// after rewriting and normalization.
pub struct InputText {
    original: String,
    modified: String,
    // Byte of the working text -> char index in the working text.
    byte_indexes: Vec<usize>,
    // Byte of the working text -> char offset in the original text.
    offsets: Vec<usize>,
    // Char offset in the original text -> byte offset in the original text.
    original_byte_offsets: Vec<usize>,
    // Indexed by char of the working text.
    char_categories: Vec<CategoryType>,
    continuities: Vec<usize>,
    can_bow: Vec<bool>,
}

impl InputText {
    pub(crate) fn new(original: String, modified: String, text_offsets: Vec<usize>, char_categories: Vec<CategoryType>) -> Self {
        let len = modified.len();
        let num_chars = char_categories.len();
        debug_assert_eq!(text_offsets.len(), num_chars + 1);

        let mut byte_indexes = vec![0; len + 1];
        let mut offsets = vec![0; len + 1];
        for (ci, (bpos, c)) in modified.char_indices().enumerate() {
            for j in bpos..bpos + c.len_utf8() {
                byte_indexes[j] = ci;
                offsets[j] = text_offsets[ci];
            }
        }
        byte_indexes[len] = num_chars;
        offsets[len] = text_offsets[num_chars];

        let mut original_byte_offsets: Vec<_> = original.char_indices().map(|(b, _)| b).collect();
        original_byte_offsets.push(original.len());

        let chars: Vec<_> = modified.chars().collect();
        let mut continuities = Vec::with_capacity(len);
        let mut i = 0;
        while i < num_chars {
            let next = i + Self::continuous_length(&char_categories, i);
            let run: usize = chars[i..next].iter().map(|c| c.len_utf8()).sum();
            continuities.extend((1..=run).rev());
            i = next;
        }

        let can_bow = (0..len)
            .map(|i| {
                (modified.as_bytes()[i] & 0xC0) != 0x80
                    && !char_categories[byte_indexes[i]].contains(CategoryType::NOOOVBOW)
            })
            .collect();

        Self {
            original,
            modified,
            byte_indexes,
            offsets,
            original_byte_offsets,
            char_categories,
            continuities,
            can_bow,
        }
    }

    fn continuous_length(char_categories: &[CategoryType], offset: usize) -> usize {
        let mut cates = char_categories[offset];
        for length in 1..char_categories.len() - offset {
            cates &= char_categories[offset + length];
            if cates.is_empty() {
                return length;
            }
        }
        char_categories.len() - offset
    }

    /// Gets the original text.
    #[inline(always)]
    pub fn original_text(&self) -> &str {
        &self.original
    }

    /// Gets the working text.
    #[inline(always)]
    pub fn text(&self) -> &str {
        &self.modified
    }

    /// Gets the working text as bytes.
    #[inline(always)]
    pub fn bytes(&self) -> &[u8] {
        self.modified.as_bytes()
    }

    /// Gets the length of the working text in bytes.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.modified.len()
    }

    /// Checks if the working text is empty.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.modified.is_empty()
    }

    /// Gets the working text between two byte offsets.
    pub fn get_substring(&self, begin: usize, end: usize) -> Result<&str> {
        if begin > end {
            return Err(SudareError::invalid_argument("begin", "begin > end"));
        }
        self.modified
            .get(begin..end)
            .ok_or_else(|| SudareError::invalid_argument("end", format!("invalid range {begin}..{end}")))
    }

    /// Checks if the byte is the first byte of a character.
    #[inline(always)]
    pub fn is_char_alignment(&self, index: usize) -> bool {
        self.bytes()
            .get(index)
            .map_or(false, |&b| (b & 0xC0) != 0x80)
    }

    /// Gets the char index in the working text of the byte.
    #[inline(always)]
    pub fn get_offset_text_length(&self, index: usize) -> usize {
        self.byte_indexes[index]
    }

    /// Gets the char offset in the original text of the byte.
    #[inline(always)]
    pub fn get_original_index(&self, index: usize) -> usize {
        self.offsets[index]
    }

    /// Gets the byte offset in the original text of the byte.
    #[inline(always)]
    pub fn get_original_byte_index(&self, index: usize) -> usize {
        self.original_byte_offsets[self.offsets[index]]
    }

    /// Converts a char offset of the original text into a byte offset.
    #[inline(always)]
    pub(crate) fn original_char_to_byte(&self, offset: usize) -> usize {
        self.original_byte_offsets[offset]
    }

    /// Gets the categories of the character at the byte.
    #[inline(always)]
    pub fn get_char_category_types_at(&self, index: usize) -> CategoryType {
        self.byte_indexes
            .get(index)
            .and_then(|&ci| self.char_categories.get(ci))
            .copied()
            .unwrap_or_else(CategoryType::empty)
    }

    /// Gets the categories shared by all the characters in `[begin, end)`.
    ///
    /// The set is empty when the range crosses a boundary of category continuity.
    pub fn get_char_category_types(&self, begin: usize, end: usize) -> CategoryType {
        if begin >= self.len() || begin + self.continuities[begin] < end {
            return CategoryType::empty();
        }
        let b = self.byte_indexes[begin];
        let e = self.byte_indexes[end.min(self.len())];
        let mut cates = self.char_categories[b];
        for &c in &self.char_categories[b + 1..e.max(b + 1)] {
            cates &= c;
        }
        cates
    }

    /// Gets the number of bytes from the byte to the end of its run of characters sharing
    /// a category.
    #[inline(always)]
    pub fn get_char_category_continuous_length(&self, index: usize) -> usize {
        self.continuities.get(index).copied().unwrap_or(0)
    }

    /// Gets the number of bytes of the `code_point_offset` characters starting at the byte,
    /// capped at the end of the text.
    pub fn get_code_points_offset_length(&self, index: usize, code_point_offset: usize) -> usize {
        let target = self.byte_indexes[index] + code_point_offset;
        let mut length = 0;
        for i in index..self.len() {
            if self.byte_indexes[i] >= target {
                return length;
            }
            length += 1;
        }
        length
    }

    /// Checks if an unknown word can begin at the byte.
    #[inline(always)]
    pub fn can_bow(&self, index: usize) -> bool {
        self.can_bow.get(index).copied().unwrap_or(false)
    }
}
