use hashbrown::HashMap;

use crate::common::POS_DEPTH;
use crate::dictionary::grammar::{Grammar, PartOfSpeech};
use crate::errors::{Result, SudareError};

/// Table assigning ids to parts of speech in order of first appearance.
///
/// The ids of a user dictionary continue after the parts of speech of the system
/// dictionary, which are looked up but never written again.
pub struct PosTable {
    ids: HashMap<PartOfSpeech, u16>,
    base_size: usize,
    new_pos: Vec<PartOfSpeech>,
}

impl PosTable {
    pub fn new() -> Self {
        Self {
            ids: HashMap::new(),
            base_size: 0,
            new_pos: vec![],
        }
    }

    /// Creates a table seeded with the first `base_size` parts of speech of the grammar.
    pub fn with_base(grammar: &Grammar, base_size: usize) -> Result<Self> {
        let mut ids = HashMap::new();
        for (id, pos) in grammar.pos_list().iter().take(base_size).enumerate() {
            ids.entry(pos.clone()).or_insert(u16::try_from(id)?);
        }
        Ok(Self {
            ids,
            base_size,
            new_pos: vec![],
        })
    }

    /// Gets the id of the part of speech, assigning a new one if unseen.
    pub fn get_or_insert(&mut self, pos: &[String]) -> Result<u16> {
        if pos.len() != POS_DEPTH {
            return Err(SudareError::invalid_argument(
                "pos",
                format!("a part of speech must have {POS_DEPTH} fields"),
            ));
        }
        if let Some(&id) = self.ids.get(pos) {
            return Ok(id);
        }
        let id = u16::try_from(self.base_size + self.new_pos.len())?;
        if id == u16::MAX {
            return Err(SudareError::invalid_argument(
                "pos",
                "too many parts of speech",
            ));
        }
        self.ids.insert(pos.to_vec(), id);
        self.new_pos.push(pos.to_vec());
        Ok(id)
    }

    /// Gets the id of the part of speech if known.
    pub fn get<S>(&self, pos: &[S]) -> Option<u16>
    where
        S: AsRef<str>,
    {
        let pos: PartOfSpeech = pos.iter().map(|s| s.as_ref().to_string()).collect();
        self.ids.get(&pos).copied()
    }

    /// Gets the parts of speech the table introduced, in id order.
    pub fn new_pos_list(&self) -> &[PartOfSpeech] {
        &self.new_pos
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(s: &str) -> PartOfSpeech {
        s.split(',').map(String::from).collect()
    }

    #[test]
    fn test_system() {
        let mut table = PosTable::new();
        assert_eq!(table.get_or_insert(&pos("名詞,普通名詞,一般,*,*,*")).unwrap(), 0);
        assert_eq!(table.get_or_insert(&pos("動詞,一般,*,*,*,*")).unwrap(), 1);
        assert_eq!(table.get_or_insert(&pos("名詞,普通名詞,一般,*,*,*")).unwrap(), 0);
        assert_eq!(table.get(&["動詞", "一般", "*", "*", "*", "*"]), Some(1));
        assert_eq!(table.get(&["助詞", "*", "*", "*", "*", "*"]), None);
        assert_eq!(table.new_pos_list().len(), 2);
        assert!(table.get_or_insert(&pos("名詞,一般")).is_err());
    }

    #[test]
    fn test_user() {
        let grammar = Grammar::new(
            vec![pos("名詞,普通名詞,一般,*,*,*"), pos("動詞,一般,*,*,*,*")],
            1,
            1,
            vec![0],
        )
        .unwrap();
        let mut table = PosTable::with_base(&grammar, 2).unwrap();
        assert_eq!(table.get_or_insert(&pos("動詞,一般,*,*,*,*")).unwrap(), 1);
        assert_eq!(table.get_or_insert(&pos("名詞,固有名詞,一般,*,*,*")).unwrap(), 2);
        assert_eq!(table.new_pos_list(), &[pos("名詞,固有名詞,一般,*,*,*")]);
    }
}
