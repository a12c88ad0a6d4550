//! Minimal DAWG used as the intermediate form of a valued key set.
use crate::errors::{Result, SudareError};
use crate::trie::bit_vector::BitVector;

const INITIAL_TABLE_SIZE: usize = 1 << 10;

#[derive(Default, Clone, Copy)]
struct DawgNode {
    child: u32,
    sibling: u32,
    label: u8,
    is_state: bool,
    has_sibling: bool,
}

impl DawgNode {
    #[inline(always)]
    const fn unit(&self) -> u32 {
        if self.label == 0 {
            (self.child << 1) | self.has_sibling as u32
        } else {
            (self.child << 2) | ((self.is_state as u32) << 1) | self.has_sibling as u32
        }
    }
}

#[derive(Default, Clone, Copy)]
struct DawgUnit(u32);

impl DawgUnit {
    #[inline(always)]
    const fn child(self) -> u32 {
        self.0 >> 2
    }

    #[inline(always)]
    const fn has_sibling(self) -> bool {
        self.0 & 1 == 1
    }

    #[inline(always)]
    const fn value(self) -> u32 {
        self.0 >> 1
    }

    #[inline(always)]
    const fn is_state(self) -> bool {
        self.0 & 2 == 2
    }
}

/// Builds a DAWG from keys inserted in byte order, merging equal suffix states.
pub struct DawgBuilder {
    nodes: Vec<DawgNode>,
    units: Vec<DawgUnit>,
    labels: Vec<u8>,
    is_intersections: BitVector,
    table: Vec<u32>,
    node_stack: Vec<u32>,
    recycle_bin: Vec<u32>,
    num_states: usize,
}

impl DawgBuilder {
    pub fn new() -> Self {
        let mut builder = Self {
            nodes: vec![],
            units: vec![],
            labels: vec![],
            is_intersections: BitVector::default(),
            table: vec![0; INITIAL_TABLE_SIZE],
            node_stack: vec![],
            recycle_bin: vec![],
            num_states: 1,
        };
        builder.append_node();
        builder.append_unit();
        builder.nodes[0].label = 0xFF;
        builder.node_stack.push(0);
        builder
    }

    #[inline(always)]
    pub const fn root(&self) -> u32 {
        0
    }

    #[inline(always)]
    pub fn child(&self, id: u32) -> u32 {
        self.units[id as usize].child()
    }

    #[inline(always)]
    pub fn sibling(&self, id: u32) -> u32 {
        if self.units[id as usize].has_sibling() {
            id + 1
        } else {
            0
        }
    }

    #[inline(always)]
    pub fn value(&self, id: u32) -> u32 {
        self.units[id as usize].value()
    }

    #[inline(always)]
    pub fn is_leaf(&self, id: u32) -> bool {
        self.label(id) == 0
    }

    #[inline(always)]
    pub fn label(&self, id: u32) -> u8 {
        self.labels[id as usize]
    }

    #[inline(always)]
    pub fn is_intersection(&self, id: u32) -> bool {
        self.is_intersections.get(id as usize)
    }

    #[inline(always)]
    pub fn intersection_id(&self, id: u32) -> u32 {
        self.is_intersections.rank(id as usize) - 1
    }

    #[inline(always)]
    pub const fn num_intersections(&self) -> u32 {
        self.is_intersections.num_ones()
    }

    #[inline(always)]
    pub fn num_units(&self) -> usize {
        self.units.len()
    }

    /// Inserts a key, which must be greater than every key inserted before.
    pub fn insert(&mut self, key: &[u8], value: u32) -> Result<()> {
        if value > i32::MAX as u32 {
            return Err(SudareError::invalid_argument("keyset", "negative value"));
        }
        if key.is_empty() {
            return Err(SudareError::invalid_argument("keyset", "zero-length key"));
        }
        if key.contains(&0) {
            return Err(SudareError::invalid_argument(
                "keyset",
                "invalid null character",
            ));
        }

        let mut id = 0;
        let mut key_pos = 0;
        while key_pos <= key.len() {
            let child_id = self.nodes[id].child as usize;
            if child_id == 0 {
                break;
            }
            let key_label = key.get(key_pos).copied().unwrap_or(0);
            let unit_label = self.nodes[child_id].label;
            if key_label < unit_label {
                return Err(SudareError::invalid_argument("keyset", "wrong key order"));
            } else if key_label > unit_label {
                self.nodes[child_id].has_sibling = true;
                self.flush(child_id as u32);
                break;
            }
            id = child_id;
            key_pos += 1;
        }

        if key_pos > key.len() {
            return Ok(());
        }

        while key_pos <= key.len() {
            let key_label = key.get(key_pos).copied().unwrap_or(0);
            let child_id = self.append_node();
            if self.nodes[id].child == 0 {
                self.nodes[child_id as usize].is_state = true;
            }
            self.nodes[child_id as usize].sibling = self.nodes[id].child;
            self.nodes[child_id as usize].label = key_label;
            self.nodes[id].child = child_id;
            self.node_stack.push(child_id);

            id = child_id as usize;
            key_pos += 1;
        }
        self.nodes[id].child = value;
        Ok(())
    }

    pub fn finish(&mut self) {
        self.flush(0);
        self.units[0] = DawgUnit(self.nodes[0].unit());
        self.labels[0] = self.nodes[0].label;
        self.nodes = vec![];
        self.table = vec![];
        self.node_stack = vec![];
        self.recycle_bin = vec![];
        self.is_intersections.build();
    }

    fn flush(&mut self, id: u32) {
        while let Some(&node_id) = self.node_stack.last() {
            if node_id == id {
                break;
            }
            self.node_stack.pop();

            if self.num_states >= self.table.len() - (self.table.len() >> 2) {
                self.expand_table();
            }

            let mut num_siblings = 0;
            let mut n = node_id;
            while n != 0 {
                num_siblings += 1;
                n = self.nodes[n as usize].sibling;
            }

            let (mut match_id, hash_id) = self.find_node(node_id);
            if match_id != 0 {
                self.is_intersections.set(match_id as usize, true);
            } else {
                let mut unit_id = 0;
                for _ in 0..num_siblings {
                    unit_id = self.append_unit();
                }
                let mut n = node_id;
                while n != 0 {
                    let node = self.nodes[n as usize];
                    self.units[unit_id as usize] = DawgUnit(node.unit());
                    self.labels[unit_id as usize] = node.label;
                    unit_id -= 1;
                    n = node.sibling;
                }
                match_id = unit_id + 1;
                self.table[hash_id] = match_id;
                self.num_states += 1;
            }

            let mut n = node_id;
            while n != 0 {
                let next = self.nodes[n as usize].sibling;
                self.recycle_bin.push(n);
                n = next;
            }

            if let Some(&top) = self.node_stack.last() {
                self.nodes[top as usize].child = match_id;
            }
        }
        self.node_stack.pop();
    }

    fn expand_table(&mut self) {
        let table_size = self.table.len() << 1;
        self.table = vec![0; table_size];
        for id in 1..self.units.len() as u32 {
            if self.labels[id as usize] == 0 || self.units[id as usize].is_state() {
                let hash_id = self.find_unit(id);
                self.table[hash_id] = id;
            }
        }
    }

    fn find_unit(&self, id: u32) -> usize {
        let mut hash_id = self.hash_unit(id) as usize % self.table.len();
        while self.table[hash_id] != 0 {
            hash_id = (hash_id + 1) % self.table.len();
        }
        hash_id
    }

    fn find_node(&self, node_id: u32) -> (u32, usize) {
        let mut hash_id = self.hash_node(node_id) as usize % self.table.len();
        loop {
            let unit_id = self.table[hash_id];
            if unit_id == 0 {
                break;
            }
            if self.are_equal(node_id, unit_id) {
                return (unit_id, hash_id);
            }
            hash_id = (hash_id + 1) % self.table.len();
        }
        (0, hash_id)
    }

    fn are_equal(&self, node_id: u32, mut unit_id: u32) -> bool {
        let mut n = self.nodes[node_id as usize].sibling;
        while n != 0 {
            if !self.units[unit_id as usize].has_sibling() {
                return false;
            }
            unit_id += 1;
            n = self.nodes[n as usize].sibling;
        }
        if self.units[unit_id as usize].has_sibling() {
            return false;
        }

        let mut n = node_id;
        while n != 0 {
            let node = &self.nodes[n as usize];
            if node.unit() != self.units[unit_id as usize].0
                || node.label != self.labels[unit_id as usize]
            {
                return false;
            }
            n = node.sibling;
            unit_id = unit_id.wrapping_sub(1);
        }
        true
    }

    fn hash_unit(&self, mut id: u32) -> u32 {
        let mut hash_value = 0;
        while id != 0 {
            let unit = self.units[id as usize];
            let label = u32::from(self.labels[id as usize]);
            hash_value ^= hash((label << 24) ^ unit.0);
            if !unit.has_sibling() {
                break;
            }
            id += 1;
        }
        hash_value
    }

    fn hash_node(&self, mut id: u32) -> u32 {
        let mut hash_value = 0;
        while id != 0 {
            let node = &self.nodes[id as usize];
            hash_value ^= hash((u32::from(node.label) << 24) ^ node.unit());
            id = node.sibling;
        }
        hash_value
    }

    fn append_unit(&mut self) -> u32 {
        self.is_intersections.push();
        self.units.push(DawgUnit::default());
        self.labels.push(0);
        (self.is_intersections.len() - 1) as u32
    }

    fn append_node(&mut self) -> u32 {
        if let Some(id) = self.recycle_bin.pop() {
            self.nodes[id as usize] = DawgNode::default();
            id
        } else {
            let id = self.nodes.len() as u32;
            self.nodes.push(DawgNode::default());
            id
        }
    }
}

#[inline(always)]
const fn hash(key: u32) -> u32 {
    let key = (!key).wrapping_add(key << 15);
    let key = key ^ (key >> 12);
    let key = key.wrapping_add(key << 2);
    let key = key ^ (key >> 4);
    let key = key.wrapping_mul(2057);
    key ^ (key >> 16)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_suffix() {
        let mut dawg = DawgBuilder::new();
        dawg.insert(b"ab", 0).unwrap();
        dawg.insert(b"cb", 0).unwrap();
        dawg.finish();
        assert!(dawg.num_intersections() > 0);

        let mut dawg = DawgBuilder::new();
        dawg.insert(b"ab", 0).unwrap();
        dawg.insert(b"cd", 1).unwrap();
        dawg.finish();
        assert_eq!(dawg.num_intersections(), 0);
    }

    #[test]
    fn test_wrong_order() {
        let mut dawg = DawgBuilder::new();
        dawg.insert(b"b", 0).unwrap();
        assert!(dawg.insert(b"a", 1).is_err());
    }

    #[test]
    fn test_null_character() {
        let mut dawg = DawgBuilder::new();
        assert!(dawg.insert(b"a", 0).is_ok());
        assert!(dawg.insert(b"b\0c", 1).is_err());
    }
}
