//! Lexicons of the system dictionary and the attached user dictionaries.
use std::collections::VecDeque;

use hashbrown::HashMap;

use crate::common::{MAX_DICTIONARIES, WORD_ID_BITS};
use crate::dictionary::lexicon::{Lexicon, WordInfo, WordInfoRecord};
use crate::dictionary::word_id::WordId;
use crate::errors::{Result, SudareError};

const USER_FLAG: i32 = 1 << WORD_ID_BITS;

struct Segment {
    lexicon: Lexicon,
    // Global id of the first part of speech the dictionary introduced.
    pos_offset: usize,
}

/// Set of up to 16 lexicons, where index 0 is the system lexicon.
pub struct LexiconSet {
    segments: Vec<Segment>,
    system_pos_size: usize,
}

impl LexiconSet {
    /// Creates a set holding the system lexicon.
    pub(crate) fn new(system: Lexicon, system_pos_size: usize) -> Self {
        Self {
            segments: vec![Segment {
                lexicon: system,
                pos_offset: system_pos_size,
            }],
            system_pos_size,
        }
    }

    /// Appends a user lexicon whose new parts of speech start at `pos_offset` globally.
    pub(crate) fn add(&mut self, lexicon: Lexicon, pos_offset: usize) -> Result<()> {
        if self.is_full() {
            return Err(SudareError::invalid_argument(
                "lexicon",
                format!("at most {} user dictionaries can be attached", MAX_DICTIONARIES - 1),
            ));
        }
        self.segments.push(Segment {
            lexicon,
            pos_offset,
        });
        Ok(())
    }

    /// Checks if no more lexicons can be attached.
    #[inline(always)]
    pub fn is_full(&self) -> bool {
        self.segments.len() >= MAX_DICTIONARIES
    }

    /// Gets the number of lexicons.
    #[inline(always)]
    pub fn num_lexicons(&self) -> usize {
        self.segments.len()
    }

    /// Gets the number of words in the lexicon `dic`.
    #[inline(always)]
    pub fn size(&self, dic: usize) -> usize {
        self.segments.get(dic).map_or(0, |s| s.lexicon.size())
    }

    /// Gets the number of parts of speech in the system dictionary.
    #[inline(always)]
    pub const fn system_pos_size(&self) -> usize {
        self.system_pos_size
    }

    /// Finds the words that are prefixes of `input[offset..]`.
    ///
    /// User lexicons are visited first, the latest attached first, then the system lexicon.
    pub fn lookup<'a>(
        &'a self,
        input: &'a [u8],
        offset: usize,
    ) -> impl Iterator<Item = (WordId, usize)> + 'a {
        (1..self.segments.len())
            .rev()
            .chain(std::iter::once(0))
            .flat_map(move |dic| {
                self.segments[dic]
                    .lexicon
                    .lookup(input, offset)
                    .map(move |m| (WordId::compose(dic, m.word_id), m.end))
            })
    }

    #[inline(always)]
    fn lexicon(&self, word_id: WordId) -> Option<&Lexicon> {
        self.segments.get(word_id.dic()).map(|s| &s.lexicon)
    }

    /// Gets the left context id of the word.
    #[inline(always)]
    pub fn get_left_id(&self, word_id: WordId) -> i16 {
        self.lexicon(word_id)
            .map_or(0, |lex| lex.get_left_id(word_id.word()))
    }

    /// Gets the right context id of the word.
    #[inline(always)]
    pub fn get_right_id(&self, word_id: WordId) -> i16 {
        self.lexicon(word_id)
            .map_or(0, |lex| lex.get_right_id(word_id.word()))
    }

    /// Gets the cost of the word.
    #[inline(always)]
    pub fn get_cost(&self, word_id: WordId) -> i16 {
        self.lexicon(word_id)
            .map_or(0, |lex| lex.get_cost(word_id.word()))
    }

    pub(crate) fn set_cost(&mut self, word_id: WordId, cost: i16) -> Result<()> {
        let segment = self.segments.get_mut(word_id.dic()).ok_or_else(|| {
            SudareError::invalid_argument("word_id", format!("{word_id} has no lexicon"))
        })?;
        segment.lexicon.set_cost(word_id.word(), cost)
    }

    fn get_record(&self, word_id: WordId) -> Result<WordInfoRecord> {
        let lexicon = self.lexicon(word_id).ok_or_else(|| {
            SudareError::invalid_argument("word_id", format!("{word_id} has no lexicon"))
        })?;
        lexicon.get_record(word_id.word())
    }

    /// Rewrites an id stored in the lexicon `dic` to a global id.
    fn to_global(&self, dic: usize, raw: i32) -> Result<WordId> {
        if raw < 0 {
            return Err(SudareError::invalid_format(
                "dictionary",
                format!("negative word id {raw} in dictionary {dic}"),
            ));
        }
        let global = if dic != 0 && raw & USER_FLAG != 0 {
            WordId::compose(dic, raw as u32)
        } else {
            WordId::compose(0, raw as u32)
        };
        Ok(global)
    }

    fn to_global_array(&self, dic: usize, raws: &[i32]) -> Result<Vec<WordId>> {
        raws.iter().map(|&raw| self.to_global(dic, raw)).collect()
    }

    /// Decodes the information of a word.
    ///
    /// The dictionary form is resolved by following the dictionary-form id one hop.
    pub fn get_word_info(&self, word_id: WordId) -> Result<WordInfo> {
        let dic = word_id.dic();
        let record = self.get_record(word_id)?;

        let mut pos_id = record.pos_id;
        if dic != 0 && usize::from(pos_id) >= self.system_pos_size {
            let pos_offset = self.segments[dic].pos_offset;
            pos_id = u16::try_from(usize::from(pos_id) - self.system_pos_size + pos_offset)?;
        }

        let dictionary_form_word_id = if record.dictionary_form_word_id < 0 {
            None
        } else {
            Some(self.to_global(dic, record.dictionary_form_word_id)?)
        };
        let dictionary_form = match dictionary_form_word_id {
            Some(id) if id != word_id => self.get_record(id)?.surface,
            _ => record.surface.clone(),
        };

        Ok(WordInfo {
            a_unit_split: self.to_global_array(dic, &record.a_unit_split)?,
            b_unit_split: self.to_global_array(dic, &record.b_unit_split)?,
            word_structure: self.to_global_array(dic, &record.word_structure)?,
            surface: record.surface,
            head_word_length: record.head_word_length,
            pos_id,
            normalized_form: record.normalized_form,
            dictionary_form_word_id,
            dictionary_form,
            reading_form: record.reading_form,
        })
    }

    /// Decodes the information of a word through the cache.
    pub fn get_word_info_cached(
        &self,
        word_id: WordId,
        cache: &mut WordInfoCache,
    ) -> Result<WordInfo> {
        if let Some(info) = cache.get(word_id) {
            return Ok(info.clone());
        }
        let info = self.get_word_info(word_id)?;
        cache.insert(word_id, info.clone());
        Ok(info)
    }
}

/// Bounded cache of decoded word infos, keyed by global word id.
///
/// The oldest entry is evicted first.
pub struct WordInfoCache {
    capacity: usize,
    map: HashMap<WordId, WordInfo>,
    order: VecDeque<WordId>,
}

impl WordInfoCache {
    /// Creates a cache holding at most `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            map: HashMap::new(),
            order: VecDeque::new(),
        }
    }

    /// Gets the number of entries.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Checks if the cache has no entry.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Gets the cached information of the word.
    #[inline(always)]
    pub fn get(&self, word_id: WordId) -> Option<&WordInfo> {
        self.map.get(&word_id)
    }

    /// Inserts the information of the word, evicting the oldest entry when full.
    pub fn insert(&mut self, word_id: WordId, info: WordInfo) {
        if self.capacity == 0 || self.map.contains_key(&word_id) {
            return;
        }
        while self.map.len() >= self.capacity {
            match self.order.pop_front() {
                Some(old) => {
                    self.map.remove(&old);
                }
                None => break,
            }
        }
        self.map.insert(word_id, info);
        self.order.push_back(word_id);
    }

    /// Removes all the entries.
    pub fn clear(&mut self) {
        self.map.clear();
        self.order.clear();
    }
}
