//! Builder of the double-array trie.
use crate::errors::{Result, SudareError};
use crate::trie::dawg::DawgBuilder;

const BLOCK_SIZE: u32 = 256;
const NUM_EXTRA_BLOCKS: u32 = 16;
const NUM_EXTRAS: u32 = BLOCK_SIZE * NUM_EXTRA_BLOCKS;

const UPPER_MASK: u32 = 0xFF << 21;
const LOWER_MASK: u32 = 0xFF;

#[derive(Default, Clone, Copy)]
struct BuilderUnit(u32);

impl BuilderUnit {
    #[inline(always)]
    fn set_has_leaf(&mut self, has_leaf: bool) {
        if has_leaf {
            self.0 |= 1 << 8;
        } else {
            self.0 &= !(1 << 8);
        }
    }

    #[inline(always)]
    fn set_value(&mut self, value: u32) {
        self.0 = value | (1 << 31);
    }

    #[inline(always)]
    fn set_label(&mut self, label: u8) {
        self.0 = (self.0 & !0xFF) | u32::from(label);
    }

    fn set_offset(&mut self, offset: u32) -> Result<()> {
        if offset >= 1 << 29 {
            return Err(SudareError::invalid_argument(
                "keyset",
                "failed to modify unit: too large offset",
            ));
        }
        self.0 &= (1 << 31) | (1 << 8) | 0xFF;
        if offset < 1 << 21 {
            self.0 |= offset << 10;
        } else {
            self.0 |= (offset << 2) | (1 << 9);
        }
        Ok(())
    }
}

#[derive(Default, Clone, Copy)]
struct ExtraUnit {
    prev: u32,
    next: u32,
    is_fixed: bool,
    is_used: bool,
}

/// Builder of a double array compatible with darts-clone.
///
/// The output is the sequence of 32-bit units in little endian, which can be read by
/// [`Trie`](crate::trie::Trie) without any conversion.
pub struct DoubleArrayBuilder {
    units: Vec<BuilderUnit>,
    extras: Vec<ExtraUnit>,
    labels: Vec<u8>,
    table: Vec<u32>,
    extras_head: u32,
}

impl DoubleArrayBuilder {
    fn new() -> Self {
        Self {
            units: vec![],
            extras: vec![ExtraUnit::default(); NUM_EXTRAS as usize],
            labels: vec![],
            table: vec![],
            extras_head: 0,
        }
    }

    /// Builds a double array from keys with values.
    ///
    /// # Arguments
    ///
    ///  - `keyset`: Pairs of a key and its value. Keys must be sorted in byte order without
    ///    duplicates. Values must be less than `2^31`.
    ///
    /// # Errors
    ///
    /// [`SudareError`] is returned when the keys are unsorted, a key is empty or contains
    /// a null byte, a value is too large, or the array becomes too large.
    pub fn build<K>(keyset: &[(K, u32)]) -> Result<Vec<u8>>
    where
        K: AsRef<[u8]>,
    {
        Self::check_order(keyset.iter().map(|(k, _)| k.as_ref()))?;

        let mut dawg = DawgBuilder::new();
        for (key, value) in keyset {
            dawg.insert(key.as_ref(), *value)?;
        }
        dawg.finish();

        let mut builder = Self::new();
        builder.build_from_dawg(&dawg)?;
        Ok(builder.into_bytes())
    }

    /// Builds a double array from sorted keys, associating each key with its ordinal.
    ///
    /// # Errors
    ///
    /// [`SudareError`] is returned when the keys are unsorted or contain a null byte.
    pub fn build_from_keys<K>(keys: &[K]) -> Result<Vec<u8>>
    where
        K: AsRef<[u8]>,
    {
        Self::check_order(keys.iter().map(|k| k.as_ref()))?;
        let keys: Vec<&[u8]> = keys.iter().map(|k| k.as_ref()).collect();
        let mut builder = Self::new();
        builder.build_from_keyset(&keys)?;
        Ok(builder.into_bytes())
    }

    fn check_order<'a, I>(keys: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a [u8]>,
    {
        let mut prev: Option<&[u8]> = None;
        for key in keys {
            if prev.map_or(false, |p| p >= key) {
                return Err(SudareError::invalid_argument("keyset", "wrong key order"));
            }
            prev = Some(key);
        }
        Ok(())
    }

    fn into_bytes(self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.units.len() * 4);
        for unit in &self.units {
            bytes.extend_from_slice(&unit.0.to_le_bytes());
        }
        bytes
    }

    #[inline(always)]
    fn num_units(&self) -> u32 {
        self.units.len() as u32
    }

    #[inline(always)]
    fn num_blocks(&self) -> u32 {
        self.num_units() / BLOCK_SIZE
    }

    #[inline(always)]
    fn extras(&mut self, id: u32) -> &mut ExtraUnit {
        &mut self.extras[(id % NUM_EXTRAS) as usize]
    }

    fn init_root(&mut self) -> Result<()> {
        self.reserve_id(0);
        self.extras(0).is_used = true;
        self.units[0].set_offset(1)?;
        self.units[0].set_label(0);
        Ok(())
    }

    fn build_from_dawg(&mut self, dawg: &DawgBuilder) -> Result<()> {
        self.table = vec![0; dawg.num_intersections() as usize];
        self.init_root()?;
        if dawg.child(dawg.root()) != 0 {
            self.build_from_dawg_node(dawg, dawg.root(), 0)?;
        }
        self.fix_all_blocks();
        Ok(())
    }

    fn build_from_dawg_node(&mut self, dawg: &DawgBuilder, dawg_id: u32, dic_id: u32) -> Result<()> {
        let mut dawg_child_id = dawg.child(dawg_id);
        if dawg.is_intersection(dawg_child_id) {
            let intersection_id = dawg.intersection_id(dawg_child_id) as usize;
            let mut offset = self.table[intersection_id];
            if offset != 0 {
                offset ^= dic_id;
                if offset & UPPER_MASK == 0 || offset & LOWER_MASK == 0 {
                    if dawg.is_leaf(dawg_child_id) {
                        self.units[dic_id as usize].set_has_leaf(true);
                    }
                    self.units[dic_id as usize].set_offset(offset)?;
                    return Ok(());
                }
            }
        }

        let offset = self.arrange_from_dawg(dawg, dawg_id, dic_id)?;
        if dawg.is_intersection(dawg_child_id) {
            self.table[dawg.intersection_id(dawg_child_id) as usize] = offset;
        }

        loop {
            let child_label = dawg.label(dawg_child_id);
            let dic_child_id = offset ^ u32::from(child_label);
            if child_label != 0 {
                self.build_from_dawg_node(dawg, dawg_child_id, dic_child_id)?;
            }
            dawg_child_id = dawg.sibling(dawg_child_id);
            if dawg_child_id == 0 {
                break;
            }
        }
        Ok(())
    }

    fn arrange_from_dawg(&mut self, dawg: &DawgBuilder, dawg_id: u32, dic_id: u32) -> Result<u32> {
        self.labels.clear();
        let mut dawg_child_id = dawg.child(dawg_id);
        while dawg_child_id != 0 {
            self.labels.push(dawg.label(dawg_child_id));
            dawg_child_id = dawg.sibling(dawg_child_id);
        }

        let offset = self.find_valid_offset(dic_id);
        self.units[dic_id as usize].set_offset(dic_id ^ offset)?;

        dawg_child_id = dawg.child(dawg_id);
        for i in 0..self.labels.len() {
            let label = self.labels[i];
            let dic_child_id = offset ^ u32::from(label);
            self.reserve_id(dic_child_id);
            if dawg.is_leaf(dawg_child_id) {
                self.units[dic_id as usize].set_has_leaf(true);
                self.units[dic_child_id as usize].set_value(dawg.value(dawg_child_id));
            } else {
                self.units[dic_child_id as usize].set_label(label);
            }
            dawg_child_id = dawg.sibling(dawg_child_id);
        }
        self.extras(offset).is_used = true;
        Ok(offset)
    }

    fn build_from_keyset(&mut self, keys: &[&[u8]]) -> Result<()> {
        self.init_root()?;
        if !keys.is_empty() {
            self.build_from_keyset_range(keys, 0, keys.len(), 0, 0)?;
        }
        self.fix_all_blocks();
        Ok(())
    }

    #[inline(always)]
    fn key_byte(keys: &[&[u8]], key_id: usize, depth: usize) -> u8 {
        keys[key_id].get(depth).copied().unwrap_or(0)
    }

    fn build_from_keyset_range(
        &mut self,
        keys: &[&[u8]],
        mut begin: usize,
        end: usize,
        depth: usize,
        dic_id: u32,
    ) -> Result<()> {
        let offset = self.arrange_from_keyset(keys, begin, end, depth, dic_id)?;

        while begin < end && Self::key_byte(keys, begin, depth) == 0 {
            begin += 1;
        }
        if begin == end {
            return Ok(());
        }

        let mut last_begin = begin;
        let mut last_label = Self::key_byte(keys, begin, depth);
        begin += 1;
        while begin < end {
            let label = Self::key_byte(keys, begin, depth);
            if label != last_label {
                self.build_from_keyset_range(
                    keys,
                    last_begin,
                    begin,
                    depth + 1,
                    offset ^ u32::from(last_label),
                )?;
                last_begin = begin;
                last_label = label;
            }
            begin += 1;
        }
        self.build_from_keyset_range(
            keys,
            last_begin,
            end,
            depth + 1,
            offset ^ u32::from(last_label),
        )
    }

    fn arrange_from_keyset(
        &mut self,
        keys: &[&[u8]],
        begin: usize,
        end: usize,
        depth: usize,
        dic_id: u32,
    ) -> Result<u32> {
        self.labels.clear();

        let mut value = None;
        for i in begin..end {
            let label = Self::key_byte(keys, i, depth);
            if label == 0 {
                if depth < keys[i].len() {
                    return Err(SudareError::invalid_argument(
                        "keyset",
                        "invalid null character",
                    ));
                }
                if value.is_none() {
                    value = Some(u32::try_from(i)?);
                }
            }
            match self.labels.last() {
                None => self.labels.push(label),
                Some(&last) if label != last => {
                    if label < last {
                        return Err(SudareError::invalid_argument("keyset", "wrong key order"));
                    }
                    self.labels.push(label);
                }
                _ => {}
            }
        }

        let offset = self.find_valid_offset(dic_id);
        self.units[dic_id as usize].set_offset(dic_id ^ offset)?;

        for i in 0..self.labels.len() {
            let label = self.labels[i];
            let dic_child_id = offset ^ u32::from(label);
            self.reserve_id(dic_child_id);
            if label == 0 {
                self.units[dic_id as usize].set_has_leaf(true);
                self.units[dic_child_id as usize].set_value(value.unwrap_or(0));
            } else {
                self.units[dic_child_id as usize].set_label(label);
            }
        }
        self.extras(offset).is_used = true;
        Ok(offset)
    }

    fn find_valid_offset(&mut self, id: u32) -> u32 {
        if self.extras_head >= self.num_units() {
            return self.num_units() | (id & LOWER_MASK);
        }
        let mut unfixed_id = self.extras_head;
        loop {
            let offset = unfixed_id ^ u32::from(self.labels[0]);
            if self.is_valid_offset(id, offset) {
                return offset;
            }
            unfixed_id = self.extras(unfixed_id).next;
            if unfixed_id == self.extras_head {
                break;
            }
        }
        self.num_units() | (id & LOWER_MASK)
    }

    fn is_valid_offset(&mut self, id: u32, offset: u32) -> bool {
        if self.extras(offset).is_used {
            return false;
        }
        let rel_offset = id ^ offset;
        if rel_offset & LOWER_MASK != 0 && rel_offset & UPPER_MASK != 0 {
            return false;
        }
        for i in 1..self.labels.len() {
            let label = u32::from(self.labels[i]);
            if self.extras(offset ^ label).is_fixed {
                return false;
            }
        }
        true
    }

    fn reserve_id(&mut self, id: u32) {
        if id >= self.num_units() {
            self.expand_units();
        }
        if id == self.extras_head {
            self.extras_head = self.extras(id).next;
            if self.extras_head == id {
                self.extras_head = self.num_units();
            }
        }
        let ExtraUnit { prev, next, .. } = *self.extras(id);
        self.extras(prev).next = next;
        self.extras(next).prev = prev;
        self.extras(id).is_fixed = true;
    }

    fn expand_units(&mut self) {
        let src_num_units = self.num_units();
        let src_num_blocks = self.num_blocks();

        let dest_num_units = src_num_units + BLOCK_SIZE;
        let dest_num_blocks = src_num_blocks + 1;

        if dest_num_blocks > NUM_EXTRA_BLOCKS {
            self.fix_block(src_num_blocks - NUM_EXTRA_BLOCKS);
        }

        self.units
            .resize(dest_num_units as usize, BuilderUnit::default());

        if dest_num_blocks > NUM_EXTRA_BLOCKS {
            for id in src_num_units..dest_num_units {
                let extra = self.extras(id);
                extra.is_used = false;
                extra.is_fixed = false;
            }
        }

        for i in src_num_units + 1..dest_num_units {
            self.extras(i - 1).next = i;
            self.extras(i).prev = i - 1;
        }

        self.extras(src_num_units).prev = dest_num_units - 1;
        self.extras(dest_num_units - 1).next = src_num_units;

        let head = self.extras_head;
        let head_prev = self.extras(head).prev;
        self.extras(src_num_units).prev = head_prev;
        self.extras(dest_num_units - 1).next = head;

        self.extras(head_prev).next = src_num_units;
        self.extras(head).prev = dest_num_units - 1;
    }

    fn fix_all_blocks(&mut self) {
        let end = self.num_blocks();
        let begin = end.saturating_sub(NUM_EXTRA_BLOCKS);
        for block_id in begin..end {
            self.fix_block(block_id);
        }
    }

    fn fix_block(&mut self, block_id: u32) {
        let begin = block_id * BLOCK_SIZE;
        let end = begin + BLOCK_SIZE;

        let mut unused_offset = 0;
        for offset in begin..end {
            if !self.extras(offset).is_used {
                unused_offset = offset;
                break;
            }
        }

        for id in begin..end {
            if !self.extras(id).is_fixed {
                self.reserve_id(id);
                self.units[id as usize].set_label((id ^ unused_offset) as u8);
            }
        }
    }
}
