//! Common settings and limits of the binary format.
use bincode::config::{self, Fixint, LittleEndian};

/// Depth of a part-of-speech tuple.
pub const POS_DEPTH: usize = 6;

/// Connection cost marking a transition that must never be taken.
pub const INHIBITED_CONNECTION: i16 = 0x7fff;

/// The number of bits for a local word id.
pub const WORD_ID_BITS: u32 = 28;

/// The maximum number of dictionaries composed into one lexicon set.
pub const MAX_DICTIONARIES: usize = 16;

/// The maximum length of a string field, in UTF-16 units.
pub const MAX_STRING_LENGTH: usize = 32767;

/// The maximum number of ids in an array, whose count is a single unsigned byte.
pub const MAX_ARRAY_LENGTH: usize = u8::MAX as usize;

/// Cost given to each morpheme when estimating the cost of a user word.
pub const USER_DICT_COST_PER_MORPH: i32 = -20;

/// Configuration of bincode used for the fixed-size parts of a dictionary.
pub fn bincode_config() -> config::Configuration<LittleEndian, Fixint> {
    config::standard()
        .with_little_endian()
        .with_fixed_int_encoding()
}
