//! Settings of the plugins configured when a dictionary is opened.

const DEFAULT_SIMPLE_OOV_POS: [&str; 6] = ["補助記号", "一般", "*", "*", "*", "*"];
const DEFAULT_KATAKANA_OOV_POS: [&str; 6] = ["名詞", "普通名詞", "一般", "*", "*", "*"];

fn to_strings(pos: &[&str]) -> Vec<String> {
    pos.iter().map(|s| s.to_string()).collect()
}

/// Settings of the unknown word providers and the path rewriters.
///
/// The providers run in the order MeCab then simple, and the last one enabled is the
/// fallback used when no candidate starts at a position.
/// The rewriters run in the order numeric then katakana.
#[derive(Clone, Debug)]
pub struct Config {
    pub(crate) mecab_oov: bool,
    pub(crate) simple_oov: bool,
    pub(crate) simple_oov_pos: Vec<String>,
    pub(crate) simple_oov_left_id: i16,
    pub(crate) simple_oov_right_id: i16,
    pub(crate) simple_oov_cost: i16,
    pub(crate) join_numeric: bool,
    pub(crate) join_kanji_numeric: bool,
    pub(crate) join_all_numeric: bool,
    pub(crate) join_katakana_oov: bool,
    pub(crate) katakana_oov_pos: Vec<String>,
    pub(crate) katakana_oov_min_length: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mecab_oov: true,
            simple_oov: true,
            simple_oov_pos: to_strings(&DEFAULT_SIMPLE_OOV_POS),
            simple_oov_left_id: 5968,
            simple_oov_right_id: 5968,
            simple_oov_cost: 3857,
            join_numeric: true,
            join_kanji_numeric: true,
            join_all_numeric: false,
            join_katakana_oov: true,
            katakana_oov_pos: to_strings(&DEFAULT_KATAKANA_OOV_POS),
            katakana_oov_min_length: 1,
        }
    }
}

impl Config {
    /// Enables the unknown word provider reading `char.def` and `unk.def`.
    pub const fn mecab_oov(mut self, yes: bool) -> Self {
        self.mecab_oov = yes;
        self
    }

    /// Enables the provider of one-character unknown words.
    pub const fn simple_oov(mut self, yes: bool) -> Self {
        self.simple_oov = yes;
        self
    }

    /// Specifies the part of speech of one-character unknown words.
    pub fn simple_oov_pos<S>(mut self, pos: &[S]) -> Self
    where
        S: AsRef<str>,
    {
        self.simple_oov_pos = pos.iter().map(|s| s.as_ref().to_string()).collect();
        self
    }

    /// Specifies the left id, the right id and the cost of one-character unknown words.
    pub const fn simple_oov_parameters(mut self, left_id: i16, right_id: i16, cost: i16) -> Self {
        self.simple_oov_left_id = left_id;
        self.simple_oov_right_id = right_id;
        self.simple_oov_cost = cost;
        self
    }

    /// Enables joining runs of numerals.
    pub const fn join_numeric(mut self, yes: bool) -> Self {
        self.join_numeric = yes;
        self
    }

    /// Enables joining runs of kanji numerals such as `一二三`.
    pub const fn join_kanji_numeric(mut self, yes: bool) -> Self {
        self.join_kanji_numeric = yes;
        self
    }

    /// Enables joining runs mixing arabic and kanji numerals.
    pub const fn join_all_numeric(mut self, yes: bool) -> Self {
        self.join_all_numeric = yes;
        self
    }

    /// Enables joining unknown katakana words with adjacent katakana words.
    pub const fn join_katakana_oov(mut self, yes: bool) -> Self {
        self.join_katakana_oov = yes;
        self
    }

    /// Specifies the part of speech of joined katakana words.
    pub fn katakana_oov_pos<S>(mut self, pos: &[S]) -> Self
    where
        S: AsRef<str>,
    {
        self.katakana_oov_pos = pos.iter().map(|s| s.as_ref().to_string()).collect();
        self
    }

    /// Specifies the maximum length in characters of a known word that can trigger
    /// joining katakana words. The default is 1.
    pub const fn katakana_oov_min_length(mut self, min_length: usize) -> Self {
        self.katakana_oov_min_length = min_length;
        self
    }
}
