//! Plugins configured when a dictionary is opened.
pub(crate) mod oov;
pub(crate) mod path_rewrite;

pub(crate) use oov::{OovNode, OovProvider};
pub(crate) use path_rewrite::PathRewriter;

use crate::dictionary::grammar::Grammar;
use crate::errors::{Result, SudareError};

/// Finds the id of a part of speech a plugin requires.
pub(crate) fn resolve_pos_id<S>(grammar: &Grammar, pos: &[S], plugin: &'static str) -> Result<u16>
where
    S: AsRef<str>,
{
    grammar.get_part_of_speech_id(pos).ok_or_else(|| {
        let pos: Vec<_> = pos.iter().map(|s| s.as_ref()).collect();
        SudareError::invalid_argument(plugin, format!("undefined part of speech {}", pos.join(",")))
    })
}
