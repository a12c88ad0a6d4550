use std::sync::Arc;

use crate::dictionary::binary::{read_at, ByteReader};
use crate::dictionary::storage::{Region, Storage};
use crate::errors::Result;

/// Table of word-id lists addressed by the values of the trie.
///
/// Each list is one count byte followed by little-endian `u32` ids.
pub struct WordIdTable {
    region: Region,
}

impl WordIdTable {
    pub(crate) fn parse(storage: &Arc<Storage>, offset: usize) -> Result<Self> {
        let mut rdr = ByteReader::new(storage.as_ref().as_ref(), offset);
        let size = rdr.read::<u32>()? as usize;
        let begin = rdr.position();
        Ok(Self {
            region: Region::new(storage, begin, begin + size)?,
        })
    }

    #[inline(always)]
    pub fn storage_size(&self) -> usize {
        4 + self.region.end() - self.region.begin()
    }

    /// Gets the ids of the list at byte `index`.
    ///
    /// A list running past the table yields nothing.
    #[inline]
    pub fn get(&self, index: usize) -> impl Iterator<Item = u32> + '_ {
        let data = self.region.as_ref();
        let len = match data.get(index) {
            Some(&len) if index + 1 + 4 * usize::from(len) <= data.len() => usize::from(len),
            _ => 0,
        };
        (0..len).filter_map(move |i| read_at(data, index + 1, i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::dictionary::binary::ByteWriter;

    #[test]
    fn test_get() {
        let mut body = ByteWriter::new();
        body.write_u32_array(&[3, 5]).unwrap();
        body.write_u32_array(&[7]).unwrap();
        let body = body.into_inner();

        let mut wtr = ByteWriter::new();
        wtr.write(body.len() as u32);
        wtr.write_bytes(&body);
        let storage = Arc::new(Storage::Owned(wtr.into_inner()));

        let table = WordIdTable::parse(&storage, 0).unwrap();
        assert_eq!(table.storage_size(), 4 + 9 + 5);
        assert_eq!(table.get(0).collect::<Vec<_>>(), vec![3, 5]);
        assert_eq!(table.get(9).collect::<Vec<_>>(), vec![7]);
        assert_eq!(table.get(100).count(), 0);
    }
}
