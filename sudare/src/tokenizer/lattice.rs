use std::io::Write;

use crate::common::INHIBITED_CONNECTION;
use crate::dictionary::grammar::Grammar;
use crate::dictionary::lexicon::WordInfo;
use crate::dictionary::word_id::WordId;
use crate::dictionary::Dictionary;
use crate::errors::{Result, SudareError};

/// The word a node stands for.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum NodeWord {
    /// A word in the lexicons.
    Word(WordId),
    /// An unknown word whose information is held by the lattice.
    Oov(usize),
    /// The beginning or end of the sentence.
    Boundary,
}

#[derive(Debug, Clone)]
pub struct Node {
    begin: usize,
    end: usize,
    left_id: i16,
    right_id: i16,
    cost: i16,
    word: NodeWord,
    is_oov: bool,
    best_previous: Option<usize>,
    total_cost: i32,
    is_connected_to_bos: bool,
}

impl Node {
    #[inline(always)]
    pub const fn begin(&self) -> usize {
        self.begin
    }

    #[inline(always)]
    pub const fn end(&self) -> usize {
        self.end
    }

    #[inline(always)]
    pub const fn left_id(&self) -> i16 {
        self.left_id
    }

    #[inline(always)]
    pub const fn right_id(&self) -> i16 {
        self.right_id
    }

    #[inline(always)]
    pub const fn cost(&self) -> i16 {
        self.cost
    }

    #[inline(always)]
    pub const fn word(&self) -> NodeWord {
        self.word
    }

    #[inline(always)]
    pub const fn is_oov(&self) -> bool {
        self.is_oov
    }

    #[inline(always)]
    pub const fn total_cost(&self) -> i32 {
        self.total_cost
    }

    #[inline(always)]
    pub const fn is_connected_to_bos(&self) -> bool {
        self.is_connected_to_bos
    }
}

/// Lattice of candidate words over the byte offsets of the working text.
///
/// Nodes live in an arena and refer to their best previous node by index.
/// The arena and the end lists are truncated, not freed, between sentences.
#[derive(Default)]
pub struct Lattice {
    nodes: Vec<Node>,
    ends: Vec<Vec<usize>>,
    oov_infos: Vec<WordInfo>,
    eos: Option<usize>,
    len: usize,
}

impl Lattice {
    const BOS: usize = 0;

    /// Clears the lattice for a text of `new_len` bytes and inserts BOS.
    pub fn reset(&mut self, new_len: usize) {
        Self::reset_vec(&mut self.ends, new_len + 1);
        self.nodes.clear();
        self.oov_infos.clear();
        self.len = new_len;
        self.eos = None;
        self.insert_bos();
    }

    fn reset_vec<T>(data: &mut Vec<Vec<T>>, new_len: usize) {
        for v in data.iter_mut() {
            v.clear();
        }
        let cur_len = data.len();
        if cur_len <= new_len {
            data.reserve(new_len - cur_len);
            for _ in cur_len..new_len {
                data.push(Vec::with_capacity(16))
            }
        }
    }

    /// Gets the length of the text in bytes.
    #[inline(always)]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Gets the number of nodes including BOS and EOS.
    #[inline(always)]
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    fn insert_bos(&mut self) {
        let (left_id, right_id, cost) = Grammar::BOS_PARAMETER;
        self.nodes.push(Node {
            begin: 0,
            end: 0,
            left_id,
            right_id,
            cost,
            word: NodeWord::Boundary,
            is_oov: false,
            best_previous: None,
            total_cost: i32::from(cost),
            is_connected_to_bos: true,
        });
        self.ends[0].push(Self::BOS);
    }

    /// Checks if a node ends at the byte.
    #[inline(always)]
    pub fn has_previous_node(&self, i: usize) -> bool {
        self.ends.get(i).map_or(false, |d| !d.is_empty())
    }

    /// Inserts a word in the lexicons.
    #[allow(clippy::too_many_arguments)]
    pub fn insert_word(
        &mut self,
        begin: usize,
        end: usize,
        word_id: WordId,
        left_id: i16,
        right_id: i16,
        cost: i16,
        grammar: &Grammar,
    ) {
        self.insert(begin, end, left_id, right_id, cost, NodeWord::Word(word_id), false, grammar);
    }

    /// Inserts an unknown word.
    #[allow(clippy::too_many_arguments)]
    pub fn insert_oov(
        &mut self,
        begin: usize,
        end: usize,
        left_id: i16,
        right_id: i16,
        cost: i16,
        info: WordInfo,
        grammar: &Grammar,
    ) {
        let idx = self.oov_infos.len();
        self.oov_infos.push(info);
        self.insert(begin, end, left_id, right_id, cost, NodeWord::Oov(idx), true, grammar);
    }

    #[allow(clippy::too_many_arguments)]
    fn insert(
        &mut self,
        begin: usize,
        end: usize,
        left_id: i16,
        right_id: i16,
        cost: i16,
        word: NodeWord,
        is_oov: bool,
        grammar: &Grammar,
    ) {
        debug_assert!(begin < end && end <= self.len);
        let mut node = Node {
            begin,
            end,
            left_id,
            right_id,
            cost,
            word,
            is_oov,
            best_previous: None,
            total_cost: 0,
            is_connected_to_bos: false,
        };
        self.connect_node(&mut node, grammar);
        let idx = self.nodes.len();
        self.nodes.push(node);
        self.ends[end].push(idx);
    }

    /// Connects the node to the best node ending at its beginning.
    ///
    /// Nodes not connected to BOS and inhibited connections are skipped.
    /// On ties, the first node inserted wins.
    fn connect_node(&self, r_node: &mut Node, grammar: &Grammar) {
        let mut best = None;
        let mut min_cost = i32::MAX;
        for &l_idx in &self.ends[r_node.begin] {
            let l_node = &self.nodes[l_idx];
            if !l_node.is_connected_to_bos {
                continue;
            }
            let conn_cost = grammar.get_connect_cost(l_node.right_id, r_node.left_id);
            if conn_cost == INHIBITED_CONNECTION {
                continue;
            }
            let cost = l_node.total_cost + i32::from(conn_cost);
            if cost < min_cost {
                min_cost = cost;
                best = Some(l_idx);
            }
        }
        r_node.best_previous = best;
        r_node.is_connected_to_bos = best.is_some();
        r_node.total_cost = if best.is_some() {
            min_cost + i32::from(r_node.cost)
        } else {
            i32::from(r_node.cost)
        };
    }

    /// Connects EOS at the end of the text.
    pub fn insert_eos(&mut self, grammar: &Grammar) -> Result<()> {
        let (left_id, right_id, cost) = Grammar::EOS_PARAMETER;
        let mut node = Node {
            begin: self.len,
            end: self.len,
            left_id,
            right_id,
            cost,
            word: NodeWord::Boundary,
            is_oov: false,
            best_previous: None,
            total_cost: 0,
            is_connected_to_bos: false,
        };
        self.connect_node(&mut node, grammar);
        if !node.is_connected_to_bos {
            return Err(SudareError::NoPath);
        }
        self.eos = Some(self.nodes.len());
        self.nodes.push(node);
        Ok(())
    }

    /// Appends the indices of the nodes on the best path, without BOS and EOS, in order.
    pub fn append_best_path(&self, path: &mut Vec<usize>) {
        let Some(eos) = self.eos else {
            return;
        };
        let start = path.len();
        let mut idx = self.nodes[eos].best_previous;
        while let Some(i) = idx {
            if i == Self::BOS {
                break;
            }
            path.push(i);
            idx = self.nodes[i].best_previous;
        }
        path[start..].reverse();
    }

    #[inline(always)]
    pub fn node(&self, idx: usize) -> &Node {
        &self.nodes[idx]
    }

    #[inline(always)]
    pub fn oov_info(&self, idx: usize) -> &WordInfo {
        &self.oov_infos[idx]
    }

    /// Writes the nodes and their connection costs, from the end of the text.
    pub fn dump<W>(&self, dict: &Dictionary, wtr: &mut W) -> Result<()>
    where
        W: Write,
    {
        let grammar = dict.grammar();
        let mut index = 0;
        let eos = self.eos.into_iter().collect::<Vec<_>>();
        let lists = std::iter::once(&eos).chain(self.ends[..=self.len].iter().rev());
        for list in lists {
            for &r_idx in list {
                let r_node = &self.nodes[r_idx];
                let (surface, word_id) = match r_node.word {
                    NodeWord::Word(id) => {
                        (dict.lexicon().get_word_info(id)?.surface, id.as_raw() as i64)
                    }
                    NodeWord::Oov(i) => (self.oov_infos[i].surface.clone(), -1),
                    NodeWord::Boundary => ("(null)".to_string(), -1),
                };
                write!(
                    wtr,
                    "{index}: {} {} {surface}({word_id}) {} {} {}: ",
                    r_node.begin, r_node.end, r_node.left_id, r_node.right_id, r_node.cost,
                )?;
                index += 1;
                if r_idx != Self::BOS {
                    for &l_idx in &self.ends[r_node.begin] {
                        let l_node = &self.nodes[l_idx];
                        let cost = l_node.total_cost
                            + i32::from(grammar.get_connect_cost(l_node.right_id, r_node.left_id));
                        write!(wtr, "{cost} ")?;
                    }
                }
                writeln!(wtr)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grammar() -> Grammar {
        // 3 x 3 matrix; connection (2, 1) is inhibited.
        let mut costs = vec![0; 9];
        costs[2 + 3] = INHIBITED_CONNECTION;
        costs[1 + 3 * 2] = 100;
        Grammar::new(vec![], 3, 3, costs).unwrap()
    }

    fn wid(i: u32) -> WordId {
        WordId::new(0, i).unwrap()
    }

    #[test]
    fn test_best_path() {
        let grammar = grammar();
        let mut lattice = Lattice::default();
        lattice.reset(4);
        //  0 --a(10)--> 2 --b(10)--> 4
        //  0 -----c(30)------------> 4
        lattice.insert_word(0, 2, wid(0), 0, 0, 10, &grammar);
        lattice.insert_word(2, 4, wid(1), 0, 0, 10, &grammar);
        lattice.insert_word(0, 4, wid(2), 0, 0, 30, &grammar);
        lattice.insert_eos(&grammar).unwrap();
        let mut path = vec![];
        lattice.append_best_path(&mut path);
        let words: Vec<_> = path.iter().map(|&i| lattice.node(i).word()).collect();
        assert_eq!(words, vec![NodeWord::Word(wid(0)), NodeWord::Word(wid(1))]);
        assert_eq!(lattice.node(path[1]).total_cost(), 20);
    }

    #[test]
    fn test_tie_takes_first() {
        let grammar = grammar();
        let mut lattice = Lattice::default();
        lattice.reset(2);
        lattice.insert_word(0, 2, wid(0), 0, 0, 10, &grammar);
        lattice.insert_word(0, 2, wid(1), 0, 0, 10, &grammar);
        lattice.insert_eos(&grammar).unwrap();
        let mut path = vec![];
        lattice.append_best_path(&mut path);
        assert_eq!(lattice.node(path[0]).word(), NodeWord::Word(wid(0)));
    }

    #[test]
    fn test_inhibited() {
        let grammar = grammar();
        let mut lattice = Lattice::default();
        lattice.reset(4);
        // a has right id 2, and b has left id 1, which are not connectable.
        lattice.insert_word(0, 2, wid(0), 0, 2, 0, &grammar);
        lattice.insert_word(2, 4, wid(1), 1, 0, 0, &grammar);
        assert!(!lattice.node(2).is_connected_to_bos());
        assert!(lattice.has_previous_node(4));
        assert!(matches!(lattice.insert_eos(&grammar), Err(SudareError::NoPath)));

        // c starting after a disconnected node is not connected either.
        lattice.reset(4);
        lattice.insert_word(0, 2, wid(0), 0, 2, 0, &grammar);
        lattice.insert_word(2, 4, wid(1), 1, 0, 0, &grammar);
        lattice.insert_word(2, 4, wid(2), 2, 0, 0, &grammar);
        lattice.insert_eos(&grammar).unwrap();
        let mut path = vec![];
        lattice.append_best_path(&mut path);
        assert_eq!(lattice.node(path[1]).word(), NodeWord::Word(wid(2)));
        assert_eq!(lattice.node(path[1]).total_cost(), 0);

        // (1, 2) costs 100.
        lattice.reset(4);
        lattice.insert_word(0, 2, wid(0), 0, 1, 0, &grammar);
        lattice.insert_word(2, 4, wid(1), 2, 0, 7, &grammar);
        lattice.insert_eos(&grammar).unwrap();
        path.clear();
        lattice.append_best_path(&mut path);
        assert_eq!(lattice.node(path[1]).total_cost(), 107);
    }

    #[test]
    fn test_oov() {
        let grammar = grammar();
        let mut lattice = Lattice::default();
        lattice.reset(3);
        let info = WordInfo {
            surface: "abc".to_string(),
            head_word_length: 3,
            ..Default::default()
        };
        lattice.insert_oov(0, 3, 0, 0, 5, info, &grammar);
        lattice.insert_eos(&grammar).unwrap();
        let mut path = vec![];
        lattice.append_best_path(&mut path);
        let node = lattice.node(path[0]);
        assert!(node.is_oov());
        let NodeWord::Oov(i) = node.word() else {
            panic!("not an oov node");
        };
        assert_eq!(lattice.oov_info(i).surface(), "abc");
    }
}
