//! Lattice-based tokenizer.
pub(crate) mod lattice;

use std::io::Write;
use std::str::FromStr;
use std::sync::Arc;

use tracing::{debug, debug_span};

use crate::dictionary::lexicon::WordInfo;
use crate::dictionary::lexicon_set::WordInfoCache;
use crate::dictionary::word_id::WordId;
use crate::dictionary::Dictionary;
use crate::errors::{Result, SudareError};
use crate::input_text::InputText;
use crate::morpheme::{MorphemeList, ResultNode};
use crate::plugin::OovNode;
use crate::tokenizer::lattice::{Lattice, NodeWord};

/// Split mode of morphemes.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Mode {
    /// The shortest units.
    A,
    /// The middle units.
    B,
    /// The longest units, as found by the search.
    C,
}

impl FromStr for Mode {
    type Err = SudareError;

    fn from_str(mode: &str) -> Result<Self, Self::Err> {
        match mode {
            "A" | "a" => Ok(Self::A),
            "B" | "b" => Ok(Self::B),
            "C" | "c" => Ok(Self::C),
            _ => Err(SudareError::invalid_argument(
                "mode",
                format!("{mode} is not one of A, B and C"),
            )),
        }
    }
}

/// Tokenizer.
pub struct Tokenizer {
    dict: Dictionary,
}

impl Tokenizer {
    /// Creates a new instance.
    ///
    /// # Arguments
    ///
    ///  - `dict`: Dictionary to be used.
    pub const fn new(dict: Dictionary) -> Self {
        Self { dict }
    }

    /// Gets the reference to the dictionary.
    pub const fn dictionary(&self) -> &Dictionary {
        &self.dict
    }

    /// Creates a new worker.
    pub fn new_worker(&self) -> Worker<'_> {
        Worker::new(&self.dict)
    }

    /// Tokenizes the text with a one-off worker.
    ///
    /// Use [`Worker`] to reuse the buffers between calls.
    ///
    /// # Errors
    ///
    /// [`SudareError`] is returned when no candidate covers a position of the text,
    /// when no path connects the beginning to the end, or when the dictionary is broken.
    pub fn tokenize(&self, mode: Mode, text: &str) -> Result<MorphemeList<'_>> {
        self.new_worker().tokenize(mode, text)
    }
}

/// Tokenization worker, owning the lattice and the scratch buffers reused between calls.
pub struct Worker<'a> {
    dict: &'a Dictionary,
    lattice: Lattice,
    oov_nodes: Vec<OovNode>,
    best_path: Vec<usize>,
    cache: Option<WordInfoCache>,
    rewrite_path: bool,
}

impl<'a> Worker<'a> {
    pub(crate) fn new(dict: &'a Dictionary) -> Self {
        Self {
            dict,
            lattice: Lattice::default(),
            oov_nodes: vec![],
            best_path: vec![],
            cache: None,
            rewrite_path: true,
        }
    }

    /// Enables the path rewriters of the dictionary, which is the default.
    pub(crate) const fn rewrite_path(mut self, yes: bool) -> Self {
        self.rewrite_path = yes;
        self
    }

    /// Caches up to `capacity` decoded word information.
    ///
    /// A capacity of 0 disables the cache.
    pub fn word_info_cache(mut self, capacity: usize) -> Self {
        self.cache = (capacity != 0).then(|| WordInfoCache::new(capacity));
        self
    }

    /// Tokenizes the text.
    ///
    /// An empty text gives an empty list.
    ///
    /// # Errors
    ///
    /// [`SudareError`] is returned when no candidate covers a position of the text,
    /// when no path connects the beginning to the end, or when the dictionary is broken.
    pub fn tokenize(&mut self, mode: Mode, text: &str) -> Result<MorphemeList<'a>> {
        let _span = debug_span!("tokenize", ?mode, len = text.len()).entered();
        let input = self
            .dict
            .input_builder()
            .build(text, self.dict.character_category());
        if input.is_empty() {
            return Ok(MorphemeList::new(self.dict, Arc::new(input), vec![]));
        }

        self.build_lattice(&input)?;
        self.best_path.clear();
        self.lattice.append_best_path(&mut self.best_path);
        debug!(
            nodes = self.lattice.num_nodes(),
            path = self.best_path.len(),
            "searched lattice"
        );

        let mut path = Vec::with_capacity(self.best_path.len());
        for i in 0..self.best_path.len() {
            let idx = self.best_path[i];
            path.push(self.result_node(idx)?);
        }
        if self.rewrite_path {
            for rewriter in self.dict.path_rewriters() {
                rewriter.rewrite(&input, &mut path)?;
            }
        }

        let path = if mode == Mode::C {
            path
        } else {
            let mut expanded = Vec::with_capacity(path.len());
            for node in &path {
                node.split_into(self.dict, mode, input.len(), &mut expanded)?;
            }
            expanded
        };
        Ok(MorphemeList::new(self.dict, Arc::new(input), path))
    }

    /// Writes the lattice built by the last call of [`Worker::tokenize()`].
    ///
    /// # Errors
    ///
    /// [`SudareError`] is returned when the writer fails or the dictionary is broken.
    pub fn dump_lattice<W>(&self, wtr: &mut W) -> Result<()>
    where
        W: Write,
    {
        self.lattice.dump(self.dict, wtr)
    }

    fn build_lattice(&mut self, input: &InputText) -> Result<()> {
        let dict = self.dict;
        let grammar = dict.grammar();
        let lexicon = dict.lexicon();
        let bytes = input.bytes();
        self.lattice.reset(bytes.len());

        for i in 0..bytes.len() {
            if !input.is_char_alignment(i) || !self.lattice.has_previous_node(i) {
                continue;
            }

            let mut has_words = false;
            for (word_id, end) in lexicon.lookup(bytes, i) {
                self.lattice.insert_word(
                    i,
                    end,
                    word_id,
                    lexicon.get_left_id(word_id),
                    lexicon.get_right_id(word_id),
                    lexicon.get_cost(word_id),
                    grammar,
                );
                has_words = true;
            }

            self.oov_nodes.clear();
            if input.can_bow(i) {
                for provider in dict.oov_providers() {
                    provider.provide_oov(input, i, has_words, &mut self.oov_nodes)?;
                    has_words |= !self.oov_nodes.is_empty();
                }
            }
            if !has_words {
                if let Some(provider) = dict.oov_providers().last() {
                    provider.provide_oov(input, i, false, &mut self.oov_nodes)?;
                    has_words = !self.oov_nodes.is_empty();
                }
            }
            if !has_words {
                return Err(SudareError::NoMorpheme(i));
            }

            for node in self.oov_nodes.drain(..) {
                self.lattice.insert_oov(
                    i,
                    node.end,
                    node.left_id,
                    node.right_id,
                    node.cost,
                    node.info,
                    grammar,
                );
            }
        }

        self.lattice.insert_eos(grammar)
    }

    fn result_node(&mut self, idx: usize) -> Result<ResultNode> {
        let node = self.lattice.node(idx);
        let (begin, end, total_cost, is_oov) =
            (node.begin(), node.end(), node.total_cost(), node.is_oov());
        let (word_id, info) = match node.word() {
            NodeWord::Word(word_id) => (Some(word_id), self.word_info(word_id)?),
            NodeWord::Oov(i) => (None, self.lattice.oov_info(i).clone()),
            NodeWord::Boundary => unreachable!("BOS and EOS are not on the path"),
        };
        Ok(ResultNode {
            begin,
            end,
            total_cost,
            word_id,
            is_oov,
            info,
        })
    }

    fn word_info(&mut self, word_id: WordId) -> Result<WordInfo> {
        let lexicon = self.dict.lexicon();
        match self.cache.as_mut() {
            Some(cache) => lexicon.get_word_info_cached(word_id, cache),
            None => lexicon.get_word_info(word_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_from_str() {
        assert_eq!("A".parse::<Mode>().unwrap(), Mode::A);
        assert_eq!("b".parse::<Mode>().unwrap(), Mode::B);
        assert_eq!("C".parse::<Mode>().unwrap(), Mode::C);
        assert!("D".parse::<Mode>().is_err());
        assert!("".parse::<Mode>().is_err());
    }
}
