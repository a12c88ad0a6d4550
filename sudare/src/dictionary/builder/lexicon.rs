use std::io::{prelude::*, BufReader, Read};

use hashbrown::HashMap;
use regex::Regex;
use tracing::debug;

use crate::common::{MAX_ARRAY_LENGTH, MAX_STRING_LENGTH, POS_DEPTH, WORD_ID_BITS};
use crate::dictionary::binary::ByteWriter;
use crate::dictionary::builder::pos_table::PosTable;
use crate::dictionary::word_id::WordId;
use crate::dictionary::Dictionary;
use crate::errors::{Result, SudareError};
use crate::trie::builder::DoubleArrayBuilder;
use crate::utils::{self, utf16_len};

const NUM_COLS: usize = 18;
const USER_FLAG: i32 = 1 << WORD_ID_BITS;

/// A row of the lexicon whose word references are not resolved yet.
struct RawEntry {
    lineno: usize,
    headword: String,
    in_trie: bool,
    left_id: i16,
    right_id: i16,
    cost: i16,
    surface: String,
    pos_id: u16,
    reading_form: String,
    normalized_form: String,
    dictionary_form: String,
    a_unit_split: String,
    b_unit_split: String,
    word_structure: String,
}

/// A resolved row, ready to be written.
struct Entry {
    dictionary_form_word_id: i32,
    a_unit_split: Vec<i32>,
    b_unit_split: Vec<i32>,
    word_structure: Vec<i32>,
}

/// Surface, part-of-speech id and reading, identifying a word in textual references.
type WordKey = (String, u16, String);

/// The dictionary a user lexicon is built against.
struct Base<'a> {
    dict: &'a Dictionary,
    words: Option<HashMap<WordKey, u32>>,
}

impl Base<'_> {
    /// Gets the index of the system words, built on first use.
    fn words(&mut self) -> Result<&HashMap<WordKey, u32>> {
        if self.words.is_none() {
            let lexicon = self.dict.lexicon();
            let mut words = HashMap::new();
            for word in 0..u32::try_from(lexicon.size(0))? {
                let info = lexicon.get_word_info(WordId::new(0, word)?)?;
                let reading = if info.reading_form.is_empty() {
                    info.surface.clone()
                } else {
                    info.reading_form
                };
                words
                    .entry((info.surface, info.pos_id, reading))
                    .or_insert(word);
            }
            debug!(words = words.len(), "indexed system words");
            self.words = Some(words);
        }
        Ok(self.words.get_or_insert_with(HashMap::new))
    }
}

/// Builder of a lexicon block from CSV rows of 18 fields.
pub struct LexiconBuilder<'a> {
    pos_table: PosTable,
    left_size: usize,
    right_size: usize,
    base: Option<Base<'a>>,
    entries: Vec<RawEntry>,
    words: HashMap<WordKey, u32>,
    unicode_literal: Regex,
    word_ref_id: Regex,
}

impl<'a> LexiconBuilder<'a> {
    fn new(
        pos_table: PosTable,
        left_size: usize,
        right_size: usize,
        base: Option<Base<'a>>,
    ) -> Result<Self> {
        let unicode_literal = Regex::new(r"\\u(\{[0-9a-fA-F]+\}|[0-9a-fA-F]{4})")
            .map_err(|e| SudareError::invalid_argument("unicode_literal", e.to_string()))?;
        let word_ref_id = Regex::new(r"^(U?)([0-9]+)$")
            .map_err(|e| SudareError::invalid_argument("word_ref_id", e.to_string()))?;
        Ok(Self {
            pos_table,
            left_size,
            right_size,
            base,
            entries: vec![],
            words: HashMap::new(),
            unicode_literal,
            word_ref_id,
        })
    }

    /// Creates a builder of a system lexicon whose connection ids are bounded by
    /// the sizes of the matrix.
    pub fn system(left_size: usize, right_size: usize) -> Result<Self> {
        Self::new(PosTable::new(), left_size, right_size, None)
    }

    /// Creates a builder of a user lexicon referring to the system dictionary of `dict`.
    pub fn user(dict: &'a Dictionary) -> Result<Self> {
        let grammar = dict.grammar();
        let pos_table = PosTable::with_base(grammar, dict.lexicon().system_pos_size())?;
        let base = Base { dict, words: None };
        Self::new(
            pos_table,
            grammar.left_size(),
            grammar.right_size(),
            Some(base),
        )
    }

    /// Gets the number of words read so far.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub const fn pos_table(&self) -> &PosTable {
        &self.pos_table
    }

    /// Reads lexicon rows. Blank lines are skipped.
    pub fn read<R>(&mut self, rdr: R) -> Result<()>
    where
        R: Read,
    {
        let reader = BufReader::new(rdr);
        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let entry = self.parse_row(&line, i + 1)?;
            let id = u32::try_from(self.entries.len())?;
            self.words
                .entry((
                    entry.surface.clone(),
                    entry.pos_id,
                    entry.reading_form.clone(),
                ))
                .or_insert(id);
            self.entries.push(entry);
        }
        Ok(())
    }

    fn parse_row(&mut self, line: &str, lineno: usize) -> Result<RawEntry> {
        let cols = utils::parse_csv_row(line);
        if cols.len() != NUM_COLS {
            let msg = format!(
                "a row must have {NUM_COLS} fields, but has {} at line {lineno}",
                cols.len()
            );
            return Err(SudareError::invalid_format("lex.csv", msg));
        }
        let mut cols = cols
            .iter()
            .map(|col| self.unescape(col, lineno))
            .collect::<Result<Vec<_>>>()?;

        if cols[0].is_empty() {
            let msg = format!("the headword is empty at line {lineno}");
            return Err(SudareError::invalid_format("lex.csv", msg));
        }
        if cols[0].len() > MAX_STRING_LENGTH {
            let msg = format!("the headword is too long at line {lineno}");
            return Err(SudareError::invalid_format("lex.csv", msg));
        }
        for (i, name) in [(4, "surface"), (11, "reading"), (12, "normalized form")] {
            if utf16_len(&cols[i]) > MAX_STRING_LENGTH {
                let msg = format!("the {name} is too long at line {lineno}");
                return Err(SudareError::invalid_format("lex.csv", msg));
            }
        }

        let parse_param = |i: usize, name: &str| -> Result<i16> {
            cols[i].parse().map_err(|_| {
                let msg = format!("invalid {name} `{}` at line {lineno}", cols[i]);
                SudareError::invalid_format("lex.csv", msg)
            })
        };
        let left_id = parse_param(1, "left id")?;
        let right_id = parse_param(2, "right id")?;
        let cost = parse_param(3, "cost")?;
        let in_range = |id: i16, size: usize| usize::try_from(id).map_or(id == -1, |id| id < size);
        if !in_range(left_id, self.left_size) || !in_range(right_id, self.right_size) {
            let msg = format!(
                "the connection ids ({left_id}, {right_id}) are out of the matrix at line {lineno}"
            );
            return Err(SudareError::invalid_format("lex.csv", msg));
        }

        let pos_id = self.pos_table.get_or_insert(&cols[5..5 + POS_DEPTH])?;

        for (i, name) in [(15, "A unit split"), (16, "B unit split"), (17, "word structure")] {
            if cols[i].split('/').count() > MAX_ARRAY_LENGTH {
                let msg = format!("the {name} has too many words at line {lineno}");
                return Err(SudareError::invalid_format("lex.csv", msg));
            }
        }
        if cols[14] == "A" && (cols[15] != "*" || cols[16] != "*") {
            let msg = format!("a word of mode A cannot be split at line {lineno}");
            return Err(SudareError::invalid_format("lex.csv", msg));
        }

        let mut take = |i: usize| std::mem::take(&mut cols[i]);
        Ok(RawEntry {
            lineno,
            headword: take(0),
            in_trie: left_id != -1,
            left_id,
            right_id,
            cost,
            surface: take(4),
            pos_id,
            reading_form: take(11),
            normalized_form: take(12),
            dictionary_form: take(13),
            a_unit_split: take(15),
            b_unit_split: take(16),
            word_structure: take(17),
        })
    }

    /// Replaces the escapes `\uXXXX` and `\u{X...}` with the characters.
    fn unescape(&self, text: &str, lineno: usize) -> Result<String> {
        let mut result = String::with_capacity(text.len());
        let mut last = 0;
        for caps in self.unicode_literal.captures_iter(text) {
            let (Some(whole), Some(hex)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let hex = hex.as_str().trim_start_matches('{').trim_end_matches('}');
            let c = u32::from_str_radix(hex, 16)
                .ok()
                .and_then(char::from_u32)
                .ok_or_else(|| {
                    let msg = format!("invalid code point `{hex}` at line {lineno}");
                    SudareError::invalid_format("lex.csv", msg)
                })?;
            result.push_str(&text[last..whole.start()]);
            result.push(c);
            last = whole.end();
        }
        result.push_str(&text[last..]);
        Ok(result)
    }

    /// Resolves a reference to a word, one of `<id>`, `U<id>` and
    /// `<surface>,<pos1>,...,<pos6>,<reading>`.
    fn resolve_word(&mut self, item: &str, field: &str, lineno: usize) -> Result<i32> {
        let unresolved = || {
            let msg = format!("unresolved {field} `{item}` at line {lineno}");
            SudareError::invalid_format("lex.csv", msg)
        };
        let user_flag = if self.base.is_some() { USER_FLAG } else { 0 };

        if let Some(caps) = self.word_ref_id.captures(item) {
            let is_local = !caps[1].is_empty();
            let digits = &caps[2];
            let id: usize = digits.parse().map_err(|_| unresolved())?;
            let size = match &self.base {
                Some(base) if !is_local => base.dict.lexicon().size(0),
                _ => self.entries.len(),
            };
            if id >= size {
                return Err(unresolved());
            }
            let id = i32::try_from(id)?;
            return Ok(if is_local { id | user_flag } else { id });
        }

        let fields: Vec<_> = item.split(',').collect();
        if fields.len() != POS_DEPTH + 2 {
            return Err(unresolved());
        }
        let surface = self.unescape(fields[0], lineno)?;
        let reading = self.unescape(fields[POS_DEPTH + 1], lineno)?;
        let pos_id = self
            .pos_table
            .get(&fields[1..=POS_DEPTH])
            .ok_or_else(unresolved)?;
        let key = (surface, pos_id, reading);

        if let Some(&id) = self.words.get(&key) {
            return Ok(i32::try_from(id)? | user_flag);
        }
        if let Some(base) = self.base.as_mut() {
            if let Some(&id) = base.words()?.get(&key) {
                return Ok(i32::try_from(id)?);
            }
        }
        Err(unresolved())
    }

    fn resolve_words(&mut self, refs: &str, field: &str, lineno: usize) -> Result<Vec<i32>> {
        if refs == "*" || refs.is_empty() {
            return Ok(vec![]);
        }
        refs.split('/')
            .map(|item| self.resolve_word(item, field, lineno))
            .collect()
    }

    fn resolve(&mut self, i: usize) -> Result<Entry> {
        let raw = &self.entries[i];
        let lineno = raw.lineno;
        let (dictionary_form, a, b, ws) = (
            raw.dictionary_form.clone(),
            raw.a_unit_split.clone(),
            raw.b_unit_split.clone(),
            raw.word_structure.clone(),
        );
        let dictionary_form_word_id = if dictionary_form == "*" {
            -1
        } else {
            self.resolve_word(&dictionary_form, "dictionary form", lineno)?
        };
        Ok(Entry {
            dictionary_form_word_id,
            a_unit_split: self.resolve_words(&a, "A unit split", lineno)?,
            b_unit_split: self.resolve_words(&b, "B unit split", lineno)?,
            word_structure: self.resolve_words(&ws, "word structure", lineno)?,
        })
    }

    /// Writes the lexicon block: trie, word-id table, word parameters and word infos.
    ///
    /// References are resolved here, so a row may refer to a later one.
    /// The offsets of the word infos are absolute positions in `wtr`.
    pub fn write(&mut self, wtr: &mut ByteWriter) -> Result<()> {
        let resolved = (0..self.entries.len())
            .map(|i| self.resolve(i))
            .collect::<Result<Vec<_>>>()?;

        let mut trie_keys: HashMap<&str, Vec<u32>> = HashMap::new();
        for (i, e) in self.entries.iter().enumerate() {
            if e.in_trie {
                trie_keys
                    .entry(e.headword.as_str())
                    .or_default()
                    .push(u32::try_from(i)?);
            }
        }
        let mut trie_keys: Vec<_> = trie_keys.into_iter().collect();
        trie_keys.sort_unstable_by(|(a, _), (b, _)| a.as_bytes().cmp(b.as_bytes()));

        let mut word_id_table = ByteWriter::new();
        let mut keyset = Vec::with_capacity(trie_keys.len());
        for (key, ids) in &trie_keys {
            keyset.push((key.as_bytes(), u32::try_from(word_id_table.position())?));
            word_id_table.write_u32_array(ids).map_err(|_| {
                let msg = format!("too many words share the headword `{key}`");
                SudareError::invalid_format("lex.csv", msg)
            })?;
        }

        let trie = DoubleArrayBuilder::build(&keyset)?;
        wtr.write(u32::try_from(trie.len() / 4)?);
        wtr.write_bytes(&trie);
        wtr.write(u32::try_from(word_id_table.position())?);
        wtr.write_bytes(word_id_table.as_slice());
        debug!(
            keys = keyset.len(),
            trie = trie.len(),
            word_id_table = word_id_table.position(),
            "wrote the trie"
        );

        wtr.write(u32::try_from(self.entries.len())?);
        for e in &self.entries {
            wtr.write(e.left_id);
            wtr.write(e.right_id);
            wtr.write(e.cost);
        }

        let table_offset = wtr.position();
        for _ in &self.entries {
            wtr.write(0u32);
        }
        let begin = wtr.position();
        for (i, (raw, entry)) in self.entries.iter().zip(&resolved).enumerate() {
            wtr.patch_u32(table_offset + 4 * i, u32::try_from(wtr.position())?);
            wtr.write_string(&raw.surface)?;
            wtr.write_string_length(raw.headword.len())?;
            wtr.write(raw.pos_id);
            let normalized_form = if raw.normalized_form == raw.surface {
                ""
            } else {
                &raw.normalized_form
            };
            wtr.write_string(normalized_form)?;
            wtr.write(entry.dictionary_form_word_id);
            let reading_form = if raw.reading_form == raw.surface {
                ""
            } else {
                &raw.reading_form
            };
            wtr.write_string(reading_form)?;
            wtr.write_i32_array(&entry.a_unit_split)?;
            wtr.write_i32_array(&entry.b_unit_split)?;
            wtr.write_i32_array(&entry.word_structure)?;
        }
        debug!(
            words = self.entries.len(),
            word_infos = wtr.position() - begin,
            "wrote the word infos"
        );
        Ok(())
    }
}
