use std::sync::Arc;

use crate::dictionary::binary::{read_at, ByteReader};
use crate::dictionary::storage::{Region, Storage};
use crate::errors::{Result, SudareError};

const ELEMENT_SIZE: usize = 3;

enum ParamStorage {
    Mapped(Region),
    Owned(Vec<i16>),
}

/// Fixed-stride table of `(left_id, right_id, cost)` per word.
pub struct WordParams {
    size: usize,
    params: ParamStorage,
}

impl WordParams {
    pub(crate) fn parse(storage: &Arc<Storage>, offset: usize) -> Result<Self> {
        let mut rdr = ByteReader::new(storage.as_ref().as_ref(), offset);
        let size = rdr.read::<u32>()? as usize;
        let begin = rdr.position();
        let region = Region::new(storage, begin, begin + 2 * ELEMENT_SIZE * size)?;
        Ok(Self {
            size,
            params: ParamStorage::Mapped(region),
        })
    }

    /// Gets the number of words.
    #[inline(always)]
    pub const fn size(&self) -> usize {
        self.size
    }

    #[inline(always)]
    pub const fn storage_size(&self) -> usize {
        4 + 2 * ELEMENT_SIZE * self.size
    }

    #[inline(always)]
    fn get(&self, word_id: u32, field: usize) -> i16 {
        let index = ELEMENT_SIZE * word_id as usize + field;
        let value = match &self.params {
            ParamStorage::Mapped(region) => read_at(region.as_ref(), 0, index),
            ParamStorage::Owned(params) => params.get(index).copied(),
        };
        value.unwrap_or_default()
    }

    #[inline(always)]
    pub fn get_left_id(&self, word_id: u32) -> i16 {
        self.get(word_id, 0)
    }

    #[inline(always)]
    pub fn get_right_id(&self, word_id: u32) -> i16 {
        self.get(word_id, 1)
    }

    #[inline(always)]
    pub fn get_cost(&self, word_id: u32) -> i16 {
        self.get(word_id, 2)
    }

    /// Overwrites the cost of a word, copying the mapped table on the first call.
    pub fn set_cost(&mut self, word_id: u32, cost: i16) -> Result<()> {
        if word_id as usize >= self.size {
            return Err(SudareError::invalid_argument(
                "word_id",
                format!("{word_id} is out of the lexicon"),
            ));
        }
        if let ParamStorage::Mapped(region) = &self.params {
            let params = (0..ELEMENT_SIZE * self.size)
                .map(|i| read_at(region.as_ref(), 0, i).unwrap_or_default())
                .collect();
            self.params = ParamStorage::Owned(params);
        }
        if let ParamStorage::Owned(params) = &mut self.params {
            params[ELEMENT_SIZE * word_id as usize + 2] = cost;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::dictionary::binary::ByteWriter;

    #[test]
    fn test_params() {
        let mut wtr = ByteWriter::new();
        wtr.write(2u32);
        for v in [1i16, 2, 300, -1, 4, i16::MIN] {
            wtr.write(v);
        }
        let storage = Arc::new(Storage::Owned(wtr.into_inner()));
        let mut params = WordParams::parse(&storage, 0).unwrap();
        assert_eq!(params.size(), 2);
        assert_eq!(params.storage_size(), 16);
        assert_eq!(params.get_left_id(0), 1);
        assert_eq!(params.get_cost(0), 300);
        assert_eq!(params.get_left_id(1), -1);
        assert_eq!(params.get_right_id(1), 4);
        assert_eq!(params.get_cost(1), i16::MIN);

        params.set_cost(1, 42).unwrap();
        assert_eq!(params.get_cost(1), 42);
        assert_eq!(params.get_cost(0), 300);
        assert!(params.set_cost(2, 0).is_err());
    }
}
