//! Builders of binary dictionaries from CSV lexicons.
mod lexicon;
mod matrix;
mod pos_table;

use std::fs;
use std::io::Read;
use std::path::Path;

use tracing::{debug, info, info_span};

use crate::dictionary::binary::ByteWriter;
use crate::dictionary::grammar::write_grammar;
use crate::dictionary::header::{DictionaryHeader, SYSTEM_DICT_VERSION, USER_DICT_VERSION_2};
use crate::dictionary::Dictionary;
use crate::errors::Result;

use lexicon::LexiconBuilder;
use matrix::Matrix;

/// Builder of a system dictionary.
pub struct SystemDictionaryBuilder {}

impl SystemDictionaryBuilder {
    /// Builds the bytes of a system dictionary.
    ///
    /// # Arguments
    ///
    ///  - `lexicons`: Readers of `lex.csv` files, concatenated in order.
    ///  - `matrix`: Reader of `matrix.def`.
    ///  - `description`: Free text stored in the header, at most 256 bytes.
    ///
    /// # Errors
    ///
    /// [`SudareError`](crate::errors::SudareError) is returned when an input is broken
    /// or a reference to a word cannot be resolved.
    pub fn from_readers<I, L, M>(lexicons: I, matrix: M, description: &str) -> Result<Vec<u8>>
    where
        I: IntoIterator<Item = L>,
        L: Read,
        M: Read,
    {
        let _span = info_span!("build_system_dictionary").entered();
        let header = DictionaryHeader::new(SYSTEM_DICT_VERSION, description).to_bytes()?;

        let matrix = Matrix::from_reader(matrix)?;
        debug!(left = matrix.left_size, right = matrix.right_size, "read matrix.def");

        let mut lexicon = LexiconBuilder::system(matrix.left_size, matrix.right_size)?;
        for rdr in lexicons {
            lexicon.read(rdr)?;
        }
        info!(words = lexicon.len(), "read the lexicons");

        let mut wtr = ByteWriter::new();
        wtr.write_bytes(&header);
        write_grammar(
            &mut wtr,
            lexicon.pos_table().new_pos_list(),
            matrix.left_size,
            matrix.right_size,
            |left, right| matrix.cost(left, right),
        )?;
        debug!(bytes = wtr.position(), "wrote the grammar");
        lexicon.write(&mut wtr)?;
        info!(bytes = wtr.position(), "built the system dictionary");
        Ok(wtr.into_inner())
    }
}

/// Builder of a user dictionary.
pub struct UserDictionaryBuilder {}

impl UserDictionaryBuilder {
    /// Builds the bytes of a user dictionary against the system dictionary of `base`.
    ///
    /// Parts of speech unknown to the system dictionary are stored in the user
    /// dictionary. Connection ids must be in the matrix of the system dictionary.
    ///
    /// # Errors
    ///
    /// [`SudareError`](crate::errors::SudareError) is returned when an input is broken
    /// or a reference to a word cannot be resolved.
    pub fn from_readers<I, L>(base: &Dictionary, lexicons: I, description: &str) -> Result<Vec<u8>>
    where
        I: IntoIterator<Item = L>,
        L: Read,
    {
        let _span = info_span!("build_user_dictionary").entered();
        let header = DictionaryHeader::new(USER_DICT_VERSION_2, description).to_bytes()?;

        let mut lexicon = LexiconBuilder::user(base)?;
        for rdr in lexicons {
            lexicon.read(rdr)?;
        }
        info!(
            words = lexicon.len(),
            new_pos = lexicon.pos_table().new_pos_list().len(),
            "read the lexicons"
        );

        let mut wtr = ByteWriter::new();
        wtr.write_bytes(&header);
        write_grammar(&mut wtr, lexicon.pos_table().new_pos_list(), 0, 0, |_, _| 0)?;
        lexicon.write(&mut wtr)?;
        info!(bytes = wtr.position(), "built the user dictionary");
        Ok(wtr.into_inner())
    }
}

/// Writes dictionary bytes to `path` through a temporary file in the same directory,
/// so a reader never sees a partial dictionary.
///
/// # Errors
///
/// [`SudareError`](crate::errors::SudareError) is returned when the file cannot be written.
pub fn write_to_path<P>(path: P, bytes: &[u8]) -> Result<()>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    fs::write(&tmp, bytes)?;
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(e.into());
    }
    info!(path = %path.display(), bytes = bytes.len(), "wrote dictionary");
    Ok(())
}
