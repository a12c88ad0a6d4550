//! # Sudare
//!
//! Sudare is a dictionary-driven morphological analyzer for Japanese, reading binary
//! dictionaries in the Sudachi format.
//!
//! ## Examples
//!
//! ```no_run
//! use std::fs::File;
//!
//! use sudare::{Config, Dictionary, Mode, Resources, Tokenizer};
//!
//! let resources = Resources::from_readers(
//!     File::open("char.def")?,
//!     File::open("unk.def")?,
//!     File::open("rewrite.def")?,
//! )?;
//! let dict = Dictionary::open("system.dic", &Config::default(), &resources)?;
//!
//! let tokenizer = Tokenizer::new(dict);
//! let mut worker = tokenizer.new_worker();
//! let morphemes = worker.tokenize(Mode::C, "東京都に行く")?;
//! for m in morphemes.iter() {
//!     println!("{}\t{}", m.surface(), m.part_of_speech().join(","));
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
#![deny(missing_docs)]

#[cfg(target_pointer_width = "16")]
compile_error!("`target_pointer_width` must be larger than or equal to 32");

pub mod common;
pub mod config;
pub mod dictionary;
pub mod errors;
pub mod input_text;
pub mod morpheme;
mod plugin;
pub mod tokenizer;
mod trie;
mod utils;


pub use config::Config;
pub use dictionary::{Dictionary, Resources};
pub use morpheme::{Morpheme, MorphemeList};
pub use tokenizer::{Mode, Tokenizer, Worker};
