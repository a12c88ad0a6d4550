//! Lexicon of a single dictionary file.
mod word_id_table;
mod word_infos;
mod word_params;

use std::sync::Arc;

pub use word_id_table::WordIdTable;
pub use word_infos::{WordInfo, WordInfos};
pub use word_params::WordParams;

pub(crate) use word_infos::WordInfoRecord;

use crate::dictionary::binary::ByteReader;
use crate::dictionary::storage::{Region, Storage};
use crate::errors::Result;
use crate::trie::Trie;

/// Result of a lexicon lookup.
#[derive(Debug, Eq, PartialEq, Clone, Copy)]
pub struct LexMatch {
    /// Word id local to the lexicon.
    pub word_id: u32,

    /// Byte offset just after the word.
    pub end: usize,
}

impl LexMatch {
    #[inline(always)]
    pub const fn new(word_id: u32, end: usize) -> Self {
        Self { word_id, end }
    }
}

/// Lexicon block: trie, word-id table, word parameters and word infos.
pub struct Lexicon {
    trie: Trie<Region>,
    word_id_table: WordIdTable,
    word_params: WordParams,
    word_infos: WordInfos,
}

impl Lexicon {
    /// Parses the lexicon block starting at `offset`.
    pub(crate) fn parse(storage: &Arc<Storage>, offset: usize) -> Result<Self> {
        let mut rdr = ByteReader::new(storage.as_ref().as_ref(), offset);
        let num_units = rdr.read::<u32>()? as usize;
        let begin = rdr.position();
        let trie = Trie::new(Region::new(storage, begin, begin + 4 * num_units)?)?;
        let mut offset = begin + 4 * num_units;

        let word_id_table = WordIdTable::parse(storage, offset)?;
        offset += word_id_table.storage_size();

        let word_params = WordParams::parse(storage, offset)?;
        offset += word_params.storage_size();

        let word_infos = WordInfos::parse(storage, offset, word_params.size())?;

        Ok(Self {
            trie,
            word_id_table,
            word_params,
            word_infos,
        })
    }

    /// Finds the words that are prefixes of `input[offset..]`.
    #[inline]
    pub fn lookup<'a>(&'a self, input: &'a [u8], offset: usize) -> impl Iterator<Item = LexMatch> + 'a {
        self.trie
            .common_prefix_iterator(input, offset)
            .flat_map(move |m| {
                self.word_id_table
                    .get(m.value as usize)
                    .map(move |word_id| LexMatch::new(word_id, m.end))
            })
    }

    /// Gets the number of words.
    #[inline(always)]
    pub const fn size(&self) -> usize {
        self.word_params.size()
    }

    #[inline(always)]
    pub fn get_left_id(&self, word_id: u32) -> i16 {
        self.word_params.get_left_id(word_id)
    }

    #[inline(always)]
    pub fn get_right_id(&self, word_id: u32) -> i16 {
        self.word_params.get_right_id(word_id)
    }

    #[inline(always)]
    pub fn get_cost(&self, word_id: u32) -> i16 {
        self.word_params.get_cost(word_id)
    }

    pub(crate) fn set_cost(&mut self, word_id: u32, cost: i16) -> Result<()> {
        self.word_params.set_cost(word_id, cost)
    }

    pub(crate) fn get_record(&self, word_id: u32) -> Result<WordInfoRecord> {
        self.word_infos.get(word_id)
    }
}
