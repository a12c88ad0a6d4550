//! Tokenization results.
use std::ops::Range;
use std::sync::Arc;

use crate::dictionary::lexicon::WordInfo;
use crate::dictionary::word_id::WordId;
use crate::dictionary::Dictionary;
use crate::errors::Result;
use crate::input_text::InputText;
use crate::tokenizer::Mode;

/// A node of the best path, holding its decoded word information.
#[derive(Clone, Debug)]
pub(crate) struct ResultNode {
    /// Byte offset in the working text.
    pub begin: usize,
    /// Byte offset in the working text.
    pub end: usize,
    pub total_cost: i32,
    pub word_id: Option<WordId>,
    pub is_oov: bool,
    pub info: WordInfo,
}

impl ResultNode {
    /// Appends the nodes splitting this in the mode, or this itself when it has at most
    /// one unit.
    pub fn split_into(
        &self,
        dict: &Dictionary,
        mode: Mode,
        text_len: usize,
        out: &mut Vec<ResultNode>,
    ) -> Result<()> {
        let word_ids = match mode {
            Mode::A => self.info.a_unit_split(),
            Mode::B => self.info.b_unit_split(),
            Mode::C => &[],
        };
        if word_ids.len() <= 1 {
            out.push(self.clone());
            return Ok(());
        }
        let mut offset = self.begin;
        for &word_id in word_ids {
            let info = dict.lexicon().get_word_info(word_id)?;
            let begin = offset;
            offset = (offset + info.head_word_length()).min(text_len);
            out.push(ResultNode {
                begin,
                end: offset,
                total_cost: self.total_cost,
                word_id: Some(word_id),
                is_oov: false,
                info,
            });
        }
        Ok(())
    }
}

/// List of morphemes.
pub struct MorphemeList<'a> {
    dict: &'a Dictionary,
    input: Arc<InputText>,
    nodes: Vec<ResultNode>,
}

impl<'a> MorphemeList<'a> {
    pub(crate) fn new(dict: &'a Dictionary, input: Arc<InputText>, nodes: Vec<ResultNode>) -> Self {
        Self { dict, input, nodes }
    }

    /// Gets the number of morphemes.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Checks if the list is empty.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Gets the `i`-th morpheme, or `None` if out of range.
    #[inline(always)]
    pub fn get(&self, i: usize) -> Option<Morpheme<'_>> {
        (i < self.nodes.len()).then(|| Morpheme::new(self, i))
    }

    /// Gets the `i`-th morpheme.
    ///
    /// # Panics
    ///
    /// Panics if `i` is out of range.
    #[inline(always)]
    pub fn morpheme(&self, i: usize) -> Morpheme<'_> {
        assert!(i < self.nodes.len(), "index out of range: {i}");
        Morpheme::new(self, i)
    }

    /// Iterates over the morphemes.
    pub fn iter(&self) -> impl Iterator<Item = Morpheme<'_>> {
        (0..self.nodes.len()).map(move |i| Morpheme::new(self, i))
    }

    /// Gets the difference of the path costs between the last and the first morphemes.
    pub fn internal_cost(&self) -> i32 {
        match (self.nodes.first(), self.nodes.last()) {
            (Some(first), Some(last)) => last.total_cost - first.total_cost,
            _ => 0,
        }
    }

    /// Gets the input text.
    #[inline(always)]
    pub fn input(&self) -> &InputText {
        &self.input
    }

    /// Gets the dictionary.
    #[inline(always)]
    pub const fn dictionary(&self) -> &'a Dictionary {
        self.dict
    }
}

/// A morpheme, pointing to an element of [`MorphemeList`].
#[derive(Clone, Copy)]
pub struct Morpheme<'a> {
    list: &'a MorphemeList<'a>,
    index: usize,
}

impl<'a> Morpheme<'a> {
    #[inline(always)]
    const fn new(list: &'a MorphemeList<'a>, index: usize) -> Self {
        Self { list, index }
    }

    #[inline(always)]
    fn node(&self) -> &'a ResultNode {
        &self.list.nodes[self.index]
    }

    #[inline(always)]
    fn info(&self) -> &'a WordInfo {
        &self.node().info
    }

    /// Gets the beginning offset in characters of the original text.
    #[inline(always)]
    pub fn begin(&self) -> usize {
        self.list.input.get_original_index(self.node().begin)
    }

    /// Gets the ending offset in characters of the original text.
    #[inline(always)]
    pub fn end(&self) -> usize {
        self.list.input.get_original_index(self.node().end)
    }

    /// Gets the position range in characters of the original text.
    #[inline(always)]
    pub fn range_char(&self) -> Range<usize> {
        self.begin()..self.end()
    }

    /// Gets the position range in bytes of the original text.
    #[inline(always)]
    pub fn range_byte(&self) -> Range<usize> {
        let input = &self.list.input;
        input.original_char_to_byte(self.begin())..input.original_char_to_byte(self.end())
    }

    /// Gets the surface as a part of the original text.
    #[inline(always)]
    pub fn surface(&self) -> &'a str {
        &self.list.input.original_text()[self.range_byte()]
    }

    /// Gets the six fields of the part of speech.
    pub fn part_of_speech(&self) -> &'a [String] {
        self.list
            .dict
            .grammar()
            .part_of_speech(self.part_of_speech_id())
            .unwrap_or(&[])
    }

    /// Gets the part-of-speech id.
    #[inline(always)]
    pub fn part_of_speech_id(&self) -> u16 {
        self.info().pos_id()
    }

    /// Gets the dictionary form.
    #[inline(always)]
    pub fn dictionary_form(&self) -> &'a str {
        self.info().dictionary_form()
    }

    /// Gets the normalized form.
    #[inline(always)]
    pub fn normalized_form(&self) -> &'a str {
        self.info().normalized_form()
    }

    /// Gets the reading.
    ///
    /// An unknown word has an empty reading. A word stored without a reading reads as its
    /// dictionary surface.
    pub fn reading_form(&self) -> &'a str {
        let info = self.info();
        if info.reading_form().is_empty() && !self.is_oov() {
            info.surface()
        } else {
            info.reading_form()
        }
    }

    /// Checks if the morpheme is an unknown word.
    #[inline(always)]
    pub fn is_oov(&self) -> bool {
        self.node().is_oov
    }

    /// Gets the word id, or `None` if the morpheme is not in the lexicons.
    #[inline(always)]
    pub fn word_id(&self) -> Option<WordId> {
        self.node().word_id
    }

    /// Gets the index of the dictionary holding the word, where 0 is the system dictionary.
    #[inline(always)]
    pub fn dictionary_id(&self) -> Option<usize> {
        self.word_id().map(WordId::dic)
    }

    /// Gets the total cost of the path up to this morpheme.
    #[inline(always)]
    pub fn total_cost(&self) -> i32 {
        self.node().total_cost
    }

    /// Gets the ids of the words forming the structure of the morpheme.
    #[inline(always)]
    pub fn word_structure(&self) -> &'a [WordId] {
        self.info().word_structure()
    }

    /// Gets the word information.
    #[inline(always)]
    pub fn word_info(&self) -> &'a WordInfo {
        self.info()
    }

    /// Splits the morpheme in the mode.
    ///
    /// Mode C, or a morpheme with at most one unit in the mode, gives the morpheme itself.
    pub fn split(&self, mode: Mode) -> Result<MorphemeList<'a>> {
        let mut nodes = vec![];
        self.node()
            .split_into(self.list.dict, mode, self.list.input.len(), &mut nodes)?;
        Ok(MorphemeList::new(
            self.list.dict,
            Arc::clone(&self.list.input),
            nodes,
        ))
    }
}

impl<'a> std::fmt::Debug for Morpheme<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Morpheme")
            .field("surface", &self.surface())
            .field("range_char", &self.range_char())
            .field("pos", &self.part_of_speech())
            .field("normalized_form", &self.normalized_form())
            .field("is_oov", &self.is_oov())
            .finish()
    }
}
