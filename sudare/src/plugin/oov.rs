//! Providers of unknown words.
pub(crate) mod mecab;
pub(crate) mod simple;

pub(crate) use mecab::MecabOovProvider;
pub(crate) use simple::SimpleOovProvider;

use crate::dictionary::lexicon::WordInfo;
use crate::errors::Result;
use crate::input_text::InputText;

/// A candidate unknown word starting at the offset given to the provider.
#[derive(Debug, Clone)]
pub(crate) struct OovNode {
    pub end: usize,
    pub left_id: i16,
    pub right_id: i16,
    pub cost: i16,
    pub info: WordInfo,
}

impl OovNode {
    /// Creates a node over `[begin, end)` of the working text.
    ///
    /// The forms are the surface, and the reading is empty.
    pub fn new(
        input: &InputText,
        begin: usize,
        end: usize,
        pos_id: u16,
        left_id: i16,
        right_id: i16,
        cost: i16,
    ) -> Result<Self> {
        let surface = input.get_substring(begin, end)?.to_string();
        let info = WordInfo {
            normalized_form: surface.clone(),
            dictionary_form: surface.clone(),
            surface,
            head_word_length: end - begin,
            pos_id,
            ..Default::default()
        };
        Ok(Self {
            end,
            left_id,
            right_id,
            cost,
            info,
        })
    }
}

/// Provider of unknown words at a position of the working text.
pub(crate) trait OovProvider {
    /// Appends candidates starting at byte `offset` to `out`.
    ///
    /// `has_other_words` tells if other candidates already start at the offset.
    fn provide_oov(
        &self,
        input: &InputText,
        offset: usize,
        has_other_words: bool,
        out: &mut Vec<OovNode>,
    ) -> Result<()>;
}
