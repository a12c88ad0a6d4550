//! Double-array trie compatible with darts-clone.
//!
//! The trie is read in place from a little-endian array of 32-bit units, so a memory-mapped
//! dictionary needs no conversion before lookup.
pub mod bit_vector;
pub mod builder;
pub mod dawg;

use crate::dictionary::binary::read_at;
use crate::errors::{Result, SudareError};

/// A match returned by the trie.
#[derive(Debug, Eq, PartialEq, Clone, Copy)]
pub struct TrieMatch {
    /// Value associated with the key.
    pub value: u32,

    /// Byte offset just after the key in the input.
    pub end: usize,
}

impl TrieMatch {
    /// Creates a new instance.
    #[inline(always)]
    pub const fn new(value: u32, end: usize) -> Self {
        Self { value, end }
    }
}

/// Double-array trie over a byte buffer.
pub struct Trie<T> {
    data: T,
}

impl<T> Trie<T>
where
    T: AsRef<[u8]>,
{
    /// Creates a trie from the packed units.
    ///
    /// # Errors
    ///
    /// [`SudareError`] is returned when the length is not a positive multiple of 4.
    pub fn new(data: T) -> Result<Self> {
        let len = data.as_ref().len();
        if len == 0 || len % 4 != 0 {
            return Err(SudareError::invalid_format(
                "trie",
                format!("the array length {len} is not a positive multiple of 4"),
            ));
        }
        Ok(Self { data })
    }

    /// Gets the number of units.
    #[inline(always)]
    pub fn num_units(&self) -> usize {
        self.data.as_ref().len() / 4
    }

    #[inline(always)]
    fn unit(&self, index: usize) -> Option<u32> {
        read_at(self.data.as_ref(), 0, index)
    }

    /// Returns an iterator of keys that are prefixes of `input[offset..]`, in increasing
    /// length order.
    #[inline]
    pub fn common_prefix_iterator<'a>(&'a self, input: &'a [u8], offset: usize) -> TrieMatchIter<'a, T> {
        let node_pos = self.unit(0).map_or(0, |u| Self::offset(u));
        TrieMatchIter {
            trie: self,
            node_pos,
            input,
            offset,
        }
    }

    /// Returns the value of `key` if it is stored.
    pub fn exact_match(&self, key: &[u8]) -> Option<u32> {
        let mut node_pos = 0;
        let mut unit = self.unit(node_pos)?;
        for &k in key {
            node_pos ^= Self::offset(unit) ^ usize::from(k);
            unit = self.unit(node_pos)?;
            if Self::label(unit) != u32::from(k) {
                return None;
            }
        }
        if !Self::has_leaf(unit) {
            return None;
        }
        let unit = self.unit(node_pos ^ Self::offset(unit))?;
        Some(Self::value(unit))
    }

    #[inline(always)]
    const fn has_leaf(unit: u32) -> bool {
        (unit >> 8) & 1 == 1
    }

    #[inline(always)]
    const fn value(unit: u32) -> u32 {
        unit & ((1 << 31) - 1)
    }

    #[inline(always)]
    const fn label(unit: u32) -> u32 {
        unit & ((1 << 31) | 0xFF)
    }

    #[inline(always)]
    const fn offset(unit: u32) -> usize {
        ((unit >> 10) << ((unit & (1 << 9)) >> 6)) as usize
    }
}

/// Iterator created by [`Trie::common_prefix_iterator`].
pub struct TrieMatchIter<'a, T> {
    trie: &'a Trie<T>,
    node_pos: usize,
    input: &'a [u8],
    offset: usize,
}

impl<'a, T> Iterator for TrieMatchIter<'a, T>
where
    T: AsRef<[u8]>,
{
    type Item = TrieMatch;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        while self.offset < self.input.len() {
            let k = self.input[self.offset];
            self.offset += 1;
            self.node_pos ^= usize::from(k);
            let unit = match self.trie.unit(self.node_pos) {
                Some(unit) if Trie::<T>::label(unit) == u32::from(k) => unit,
                _ => {
                    self.offset = self.input.len();
                    return None;
                }
            };
            self.node_pos ^= Trie::<T>::offset(unit);
            if Trie::<T>::has_leaf(unit) {
                let leaf = self.trie.unit(self.node_pos)?;
                return Some(TrieMatch::new(Trie::<T>::value(leaf), self.offset));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use builder::DoubleArrayBuilder;

    fn sorted_records() -> Vec<(&'static str, u32)> {
        let mut records = vec![
            ("東", 3),
            ("東京", 7),
            ("東京都", 11),
            ("京都", 5),
            ("a", 0),
            ("ab", 1),
            ("abc", 2),
            ("b", 9),
        ];
        records.sort_unstable_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));
        records
    }

    #[test]
    fn test_common_prefix_search() {
        let data = DoubleArrayBuilder::build(&sorted_records()).unwrap();
        let trie = Trie::new(data).unwrap();
        let input = "東京都庁".as_bytes();
        let matches: Vec<_> = trie.common_prefix_iterator(input, 0).collect();
        assert_eq!(
            matches,
            vec![
                TrieMatch::new(3, 3),
                TrieMatch::new(7, 6),
                TrieMatch::new(11, 9)
            ]
        );
        let matches: Vec<_> = trie.common_prefix_iterator(input, 3).collect();
        assert_eq!(matches, vec![]);
        let matches: Vec<_> = trie.common_prefix_iterator(b"xabcd", 1).collect();
        assert_eq!(
            matches,
            vec![
                TrieMatch::new(0, 2),
                TrieMatch::new(1, 3),
                TrieMatch::new(2, 4)
            ]
        );
    }

    #[test]
    fn test_exact_match() {
        let data = DoubleArrayBuilder::build(&sorted_records()).unwrap();
        let trie = Trie::new(data).unwrap();
        for (key, value) in sorted_records() {
            assert_eq!(trie.exact_match(key.as_bytes()), Some(value));
        }
        assert_eq!(trie.exact_match("京".as_bytes()), None);
        assert_eq!(trie.exact_match(b"abcd"), None);
        assert_eq!(trie.exact_match(b""), None);
    }

    #[test]
    fn test_build_from_keys() {
        let keys: Vec<_> = sorted_records().into_iter().map(|(k, _)| k).collect();
        let data = DoubleArrayBuilder::build_from_keys(&keys).unwrap();
        let trie = Trie::new(data).unwrap();
        for (i, key) in keys.iter().enumerate() {
            assert_eq!(trie.exact_match(key.as_bytes()), Some(i as u32));
        }
    }

    #[test]
    fn test_shared_values() {
        // Many keys sharing suffixes and values exercise the intersection table.
        let mut records = vec![];
        for head in b'a'..=b'z' {
            for tail in ["ing", "ed", "s"] {
                let key = format!("{}{tail}", head as char);
                records.push((key, u32::from(head % 3)));
            }
        }
        records.sort_unstable();
        let data = DoubleArrayBuilder::build(&records).unwrap();
        let trie = Trie::new(data).unwrap();
        for (key, value) in &records {
            assert_eq!(trie.exact_match(key.as_bytes()), Some(*value));
        }
        assert_eq!(trie.exact_match(b"xin"), None);
    }

    #[test]
    fn test_many_keys() {
        let mut records: Vec<_> = (0..5000u32).map(|i| (format!("k{}", i * 7919), i)).collect();
        records.sort_unstable();
        let data = DoubleArrayBuilder::build(&records).unwrap();
        let trie = Trie::new(data).unwrap();
        for (key, value) in &records {
            assert_eq!(trie.exact_match(key.as_bytes()), Some(*value));
        }
    }

    #[test]
    fn test_empty_keyset() {
        let records: Vec<(&str, u32)> = vec![];
        let data = DoubleArrayBuilder::build(&records).unwrap();
        let trie = Trie::new(data).unwrap();
        assert_eq!(trie.common_prefix_iterator(b"abc", 0).count(), 0);
        assert_eq!(trie.exact_match(b"a"), None);
    }

    #[test]
    fn test_wrong_key_order() {
        let records = vec![("b", 0), ("a", 1)];
        assert!(DoubleArrayBuilder::build(&records).is_err());
        assert!(DoubleArrayBuilder::build_from_keys(&["b", "a"]).is_err());
        assert!(DoubleArrayBuilder::build(&[("a", 0), ("a", 1)]).is_err());
    }

    #[test]
    fn test_invalid_units() {
        assert!(Trie::new(vec![0u8; 3]).is_err());
        assert!(Trie::new(Vec::<u8>::new()).is_err());
    }

    #[test]
    fn test_readable_by_yada() {
        let records = sorted_records();
        let data = DoubleArrayBuilder::build(&records).unwrap();
        let da = yada::DoubleArray::new(data);
        for (key, value) in &records {
            assert_eq!(da.exact_match_search(key.as_bytes()), Some(*value));
        }
        let matches: Vec<_> = da.common_prefix_search("東京都庁".as_bytes()).collect();
        assert_eq!(matches, vec![(3, 3), (7, 6), (11, 9)]);
    }

    #[test]
    fn test_read_yada_output() {
        let records = sorted_records();
        let data = yada::builder::DoubleArrayBuilder::build(&records).unwrap();
        let trie = Trie::new(data).unwrap();
        for (key, value) in &records {
            assert_eq!(trie.exact_match(key.as_bytes()), Some(*value));
        }
        let matches: Vec<_> = trie
            .common_prefix_iterator("東京都".as_bytes(), 0)
            .map(|m| m.value)
            .collect();
        assert_eq!(matches, vec![3, 7, 11]);
    }
}
