use std::sync::Arc;

use crate::dictionary::binary::{read_at, ByteReader};
use crate::dictionary::storage::{Region, Storage};
use crate::dictionary::word_id::WordId;
use crate::errors::{Result, SudareError};

/// Information of a word.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct WordInfo {
    pub(crate) surface: String,
    pub(crate) head_word_length: usize,
    pub(crate) pos_id: u16,
    pub(crate) normalized_form: String,
    pub(crate) dictionary_form_word_id: Option<WordId>,
    pub(crate) dictionary_form: String,
    pub(crate) reading_form: String,
    pub(crate) a_unit_split: Vec<WordId>,
    pub(crate) b_unit_split: Vec<WordId>,
    pub(crate) word_structure: Vec<WordId>,
}

impl WordInfo {
    /// Gets the surface string.
    #[inline(always)]
    pub fn surface(&self) -> &str {
        &self.surface
    }

    /// Gets the length in bytes of the headword in the working text.
    #[inline(always)]
    pub const fn head_word_length(&self) -> usize {
        self.head_word_length
    }

    /// Gets the part-of-speech id.
    #[inline(always)]
    pub const fn pos_id(&self) -> u16 {
        self.pos_id
    }

    /// Gets the normalized form.
    #[inline(always)]
    pub fn normalized_form(&self) -> &str {
        &self.normalized_form
    }

    /// Gets the id of the word holding the dictionary form, if any.
    #[inline(always)]
    pub const fn dictionary_form_word_id(&self) -> Option<WordId> {
        self.dictionary_form_word_id
    }

    /// Gets the dictionary form.
    #[inline(always)]
    pub fn dictionary_form(&self) -> &str {
        &self.dictionary_form
    }

    /// Gets the reading as stored; an empty string means it equals the surface.
    #[inline(always)]
    pub fn reading_form(&self) -> &str {
        &self.reading_form
    }

    /// Gets the ids of the words splitting this in mode A.
    #[inline(always)]
    pub fn a_unit_split(&self) -> &[WordId] {
        &self.a_unit_split
    }

    /// Gets the ids of the words splitting this in mode B.
    #[inline(always)]
    pub fn b_unit_split(&self) -> &[WordId] {
        &self.b_unit_split
    }

    /// Gets the ids of the words forming the structure of this.
    #[inline(always)]
    pub fn word_structure(&self) -> &[WordId] {
        &self.word_structure
    }
}

/// A word-info record as stored, with file-relative ids.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub(crate) struct WordInfoRecord {
    pub surface: String,
    pub head_word_length: usize,
    pub pos_id: u16,
    pub normalized_form: String,
    pub dictionary_form_word_id: i32,
    pub reading_form: String,
    pub a_unit_split: Vec<i32>,
    pub b_unit_split: Vec<i32>,
    pub word_structure: Vec<i32>,
}

/// Offset table of word-info records, followed by the records.
pub struct WordInfos {
    data: Region,
    table_offset: usize,
    size: usize,
}

impl WordInfos {
    pub(crate) fn parse(storage: &Arc<Storage>, offset: usize, size: usize) -> Result<Self> {
        let data = Region::whole(storage);
        if offset + 4 * size > data.end() {
            return Err(SudareError::invalid_format(
                "dictionary",
                "the word info offsets exceed the data",
            ));
        }
        Ok(Self {
            data,
            table_offset: offset,
            size,
        })
    }

    /// Gets the number of records.
    #[inline(always)]
    pub const fn size(&self) -> usize {
        self.size
    }

    pub(crate) fn get(&self, word_id: u32) -> Result<WordInfoRecord> {
        if word_id as usize >= self.size {
            return Err(SudareError::invalid_argument(
                "word_id",
                format!("{word_id} is out of the lexicon"),
            ));
        }
        let data = self.data.as_ref();
        let offset = read_at::<u32>(data, self.table_offset, word_id as usize)
            .ok_or_else(|| SudareError::invalid_format("dictionary", "broken word info offset"))?;
        let mut rdr = ByteReader::new(data, offset as usize);
        let surface = rdr.read_string()?;
        let head_word_length = rdr.read_string_length()?;
        let pos_id = rdr.read::<u16>()?;
        let mut normalized_form = rdr.read_string()?;
        if normalized_form.is_empty() {
            normalized_form = surface.clone();
        }
        let dictionary_form_word_id = rdr.read::<i32>()?;
        let reading_form = rdr.read_string()?;
        let a_unit_split = rdr.read_i32_array()?;
        let b_unit_split = rdr.read_i32_array()?;
        let word_structure = rdr.read_i32_array()?;
        Ok(WordInfoRecord {
            surface,
            head_word_length,
            pos_id,
            normalized_form,
            dictionary_form_word_id,
            reading_form,
            a_unit_split,
            b_unit_split,
            word_structure,
        })
    }
}
