use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use memmap2::Mmap;

use crate::errors::{Result, SudareError};

/// Backing bytes of a dictionary: either memory-mapped or owned.
pub enum Storage {
    Mapped(Mmap),
    Owned(Vec<u8>),
}

impl Storage {
    /// Maps the file into memory.
    pub fn map<P>(path: P) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        let file = File::open(path)?;
        // SAFETY: The mapping is read-only and kept alive by the storage. The dictionary
        // file must not be modified while it is open.
        let mmap = unsafe { Mmap::map(&file)? };
        Ok(Self::Mapped(mmap))
    }
}

impl AsRef<[u8]> for Storage {
    #[inline(always)]
    fn as_ref(&self) -> &[u8] {
        match self {
            Self::Mapped(m) => m,
            Self::Owned(v) => v,
        }
    }
}

/// A shared byte range of a [`Storage`].
#[derive(Clone)]
pub struct Region {
    storage: Arc<Storage>,
    begin: usize,
    end: usize,
}

impl Region {
    /// Creates the region `[begin, end)`, checking it lies in the storage.
    pub fn new(storage: &Arc<Storage>, begin: usize, end: usize) -> Result<Self> {
        let len = storage.as_ref().as_ref().len();
        if begin > end || end > len {
            return Err(SudareError::invalid_format(
                "dictionary",
                format!("section {begin}..{end} exceeds the data length {len}"),
            ));
        }
        Ok(Self {
            storage: Arc::clone(storage),
            begin,
            end,
        })
    }

    /// Creates the region covering the whole storage.
    pub fn whole(storage: &Arc<Storage>) -> Self {
        Self {
            storage: Arc::clone(storage),
            begin: 0,
            end: storage.as_ref().as_ref().len(),
        }
    }

    #[inline(always)]
    pub const fn begin(&self) -> usize {
        self.begin
    }

    #[inline(always)]
    pub const fn end(&self) -> usize {
        self.end
    }
}

impl AsRef<[u8]> for Region {
    #[inline(always)]
    fn as_ref(&self) -> &[u8] {
        &self.storage.as_ref().as_ref()[self.begin..self.end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region() {
        let storage = Arc::new(Storage::Owned(vec![0, 1, 2, 3, 4]));
        let region = Region::new(&storage, 1, 4).unwrap();
        assert_eq!(region.as_ref(), &[1, 2, 3]);
        assert_eq!(Region::whole(&storage).as_ref().len(), 5);
        assert!(Region::new(&storage, 3, 6).is_err());
        assert!(Region::new(&storage, 4, 3).is_err());
    }
}
