//! Part-of-speech table and connection costs.
use std::sync::Arc;

use crate::common::{INHIBITED_CONNECTION, MAX_STRING_LENGTH, POS_DEPTH};
use crate::dictionary::binary::{read_at, ByteReader, ByteWriter};
use crate::dictionary::character::CharacterCategory;
use crate::dictionary::storage::{Region, Storage};
use crate::errors::{Result, SudareError};
use crate::utils::utf16_len;

/// A part-of-speech tuple of six fields.
pub type PartOfSpeech = Vec<String>;

enum ConnectionMatrix {
    Mapped(Region),
    Owned(Vec<i16>),
}

/// Grammar of a dictionary: the part-of-speech list and the connection cost matrix.
pub struct Grammar {
    pos_list: Vec<PartOfSpeech>,
    left_size: usize,
    right_size: usize,
    matrix: ConnectionMatrix,
    storage_size: usize,
    char_category: Option<Arc<CharacterCategory>>,
}

impl Grammar {
    /// Parameters `(left_id, right_id, cost)` of the beginning-of-sentence node.
    pub const BOS_PARAMETER: (i16, i16, i16) = (0, 0, 0);

    /// Parameters `(left_id, right_id, cost)` of the end-of-sentence node.
    pub const EOS_PARAMETER: (i16, i16, i16) = (0, 0, 0);

    /// Parses the grammar block starting at `offset`.
    pub(crate) fn parse(storage: &Arc<Storage>, offset: usize) -> Result<Self> {
        let data = storage.as_ref().as_ref();
        let mut rdr = ByteReader::new(data, offset);
        let pos_size = usize::from(rdr.read::<u16>()?);
        let mut pos_list = Vec::with_capacity(pos_size);
        for _ in 0..pos_size {
            let mut pos = Vec::with_capacity(POS_DEPTH);
            for _ in 0..POS_DEPTH {
                pos.push(rdr.read_string()?);
            }
            pos_list.push(pos);
        }
        let left_size = usize::try_from(rdr.read::<i16>()?)?;
        let right_size = usize::try_from(rdr.read::<i16>()?)?;
        let begin = rdr.position();
        let end = begin + 2 * left_size * right_size;
        let matrix = ConnectionMatrix::Mapped(Region::new(storage, begin, end)?);
        Ok(Self {
            pos_list,
            left_size,
            right_size,
            matrix,
            storage_size: end - offset,
            char_category: None,
        })
    }

    /// Creates an owned grammar.
    ///
    /// `costs` is laid out so that `costs[left + left_size * right]` is the cost
    /// of connecting `left` to `right`.
    pub fn new(
        pos_list: Vec<PartOfSpeech>,
        left_size: usize,
        right_size: usize,
        costs: Vec<i16>,
    ) -> Result<Self> {
        if costs.len() != left_size * right_size {
            return Err(SudareError::invalid_argument(
                "costs",
                "the length must be left_size * right_size",
            ));
        }
        if pos_list.iter().any(|pos| pos.len() != POS_DEPTH) {
            return Err(SudareError::invalid_argument(
                "pos_list",
                format!("a part of speech must have {POS_DEPTH} fields"),
            ));
        }
        let storage_size = grammar_size(&pos_list, costs.len())?;
        Ok(Self {
            pos_list,
            left_size,
            right_size,
            matrix: ConnectionMatrix::Owned(costs),
            storage_size,
            char_category: None,
        })
    }

    /// Gets the number of bytes the grammar block occupies.
    #[inline(always)]
    pub const fn storage_size(&self) -> usize {
        self.storage_size
    }

    /// Gets the number of parts of speech.
    #[inline(always)]
    pub fn part_of_speech_size(&self) -> usize {
        self.pos_list.len()
    }

    /// Gets the part of speech with the id.
    #[inline(always)]
    pub fn part_of_speech(&self, pos_id: u16) -> Option<&[String]> {
        self.pos_list.get(usize::from(pos_id)).map(|p| p.as_slice())
    }

    /// Gets the list of parts of speech.
    #[inline(always)]
    pub fn pos_list(&self) -> &[PartOfSpeech] {
        &self.pos_list
    }

    /// Finds the id of the part of speech.
    pub fn get_part_of_speech_id<S>(&self, pos: &[S]) -> Option<u16>
    where
        S: AsRef<str>,
    {
        self.pos_list
            .iter()
            .position(|p| {
                p.len() == pos.len() && p.iter().zip(pos).all(|(a, b)| a == b.as_ref())
            })
            .and_then(|id| u16::try_from(id).ok())
    }

    /// Gets the number of left context ids.
    #[inline(always)]
    pub const fn left_size(&self) -> usize {
        self.left_size
    }

    /// Gets the number of right context ids.
    #[inline(always)]
    pub const fn right_size(&self) -> usize {
        self.right_size
    }

    /// Gets the cost of connecting a node with right id `left_id` to a node with left id
    /// `right_id`.
    ///
    /// Ids out of the matrix are treated as inhibited.
    #[inline(always)]
    pub fn get_connect_cost(&self, left_id: i16, right_id: i16) -> i16 {
        let (Ok(left), Ok(right)) = (usize::try_from(left_id), usize::try_from(right_id)) else {
            return INHIBITED_CONNECTION;
        };
        if left >= self.left_size || right >= self.right_size {
            return INHIBITED_CONNECTION;
        }
        let index = left + self.left_size * right;
        match &self.matrix {
            ConnectionMatrix::Mapped(region) => {
                read_at(region.as_ref(), 0, index).unwrap_or(INHIBITED_CONNECTION)
            }
            ConnectionMatrix::Owned(costs) => costs[index],
        }
    }

    /// Overwrites a connection cost.
    ///
    /// The first call copies a mapped matrix into memory.
    pub fn set_connect_cost(&mut self, left_id: i16, right_id: i16, cost: i16) -> Result<()> {
        let left = usize::try_from(left_id)?;
        let right = usize::try_from(right_id)?;
        if left >= self.left_size || right >= self.right_size {
            return Err(SudareError::invalid_argument(
                "left_id/right_id",
                format!("({left_id}, {right_id}) is out of the matrix"),
            ));
        }
        if let ConnectionMatrix::Mapped(region) = &self.matrix {
            let costs = (0..self.left_size * self.right_size)
                .map(|i| read_at(region.as_ref(), 0, i).unwrap_or(INHIBITED_CONNECTION))
                .collect();
            self.matrix = ConnectionMatrix::Owned(costs);
        }
        if let ConnectionMatrix::Owned(costs) = &mut self.matrix {
            costs[left + self.left_size * right] = cost;
        }
        Ok(())
    }

    /// Appends parts of speech introduced by a user dictionary.
    pub(crate) fn add_pos_list(&mut self, other: &Self) {
        self.pos_list.extend(other.pos_list.iter().cloned());
    }

    /// Gets the character category table, if attached.
    #[inline(always)]
    pub fn character_category(&self) -> Option<&Arc<CharacterCategory>> {
        self.char_category.as_ref()
    }

    /// Attaches the character category table.
    pub fn set_character_category(&mut self, char_category: Arc<CharacterCategory>) {
        self.char_category = Some(char_category);
    }
}

/// Computes the number of bytes [`write_grammar`] emits.
fn grammar_size(pos_list: &[PartOfSpeech], num_costs: usize) -> Result<usize> {
    let mut size = 2;
    for field in pos_list.iter().flatten() {
        let len = utf16_len(field);
        if len > MAX_STRING_LENGTH {
            return Err(SudareError::invalid_argument(
                "pos_list",
                format!("length {len} exceeds {MAX_STRING_LENGTH}"),
            ));
        }
        let prefix = if len < 0x80 { 1 } else { 2 };
        size += prefix + 2 * len;
    }
    Ok(size + 4 + 2 * num_costs)
}

/// Writes a grammar block, reading costs through `cost_fn(left, right)`.
pub(crate) fn write_grammar<F>(
    wtr: &mut ByteWriter,
    pos_list: &[PartOfSpeech],
    left_size: usize,
    right_size: usize,
    cost_fn: F,
) -> Result<()>
where
    F: Fn(i16, i16) -> i16,
{
    wtr.write(u16::try_from(pos_list.len())?);
    for pos in pos_list {
        for field in pos {
            wtr.write_string(field)?;
        }
    }
    let left = i16::try_from(left_size)?;
    let right = i16::try_from(right_size)?;
    wtr.write(left);
    wtr.write(right);
    for r in 0..right {
        for l in 0..left {
            wtr.write(cost_fn(l, r));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(fields: &[&str]) -> PartOfSpeech {
        fields.iter().map(|s| s.to_string()).collect()
    }

    fn sample_bytes() -> Vec<u8> {
        let pos_list = vec![
            pos(&["名詞", "普通名詞", "一般", "*", "*", "*"]),
            pos(&["助詞", "格助詞", "*", "*", "*", "*"]),
        ];
        let mut wtr = ByteWriter::new();
        // costs[l + 3 * r] = 10 * l + r
        write_grammar(&mut wtr, &pos_list, 3, 2, |l, r| 10 * l + r).unwrap();
        wtr.into_inner()
    }

    #[test]
    fn test_parse() {
        let data = sample_bytes();
        let len = data.len();
        let storage = Arc::new(Storage::Owned(data));
        let grammar = Grammar::parse(&storage, 0).unwrap();
        assert_eq!(grammar.storage_size(), len);
        assert_eq!(grammar.part_of_speech_size(), 2);
        assert_eq!(grammar.part_of_speech(1).unwrap()[1], "格助詞");
        assert_eq!(
            grammar.get_part_of_speech_id(&["助詞", "格助詞", "*", "*", "*", "*"]),
            Some(1)
        );
        assert_eq!(grammar.get_part_of_speech_id(&["助詞"]), None);
        assert_eq!(grammar.get_connect_cost(2, 1), 21);
        assert_eq!(grammar.get_connect_cost(0, 0), 0);
        assert_eq!(grammar.get_connect_cost(3, 0), INHIBITED_CONNECTION);
        assert_eq!(grammar.get_connect_cost(-1, 0), INHIBITED_CONNECTION);
    }

    #[test]
    fn test_set_connect_cost() {
        let storage = Arc::new(Storage::Owned(sample_bytes()));
        let mut grammar = Grammar::parse(&storage, 0).unwrap();
        grammar.set_connect_cost(1, 1, -5).unwrap();
        assert_eq!(grammar.get_connect_cost(1, 1), -5);
        assert_eq!(grammar.get_connect_cost(2, 1), 21);
        assert!(grammar.set_connect_cost(3, 0, 0).is_err());

        // The mapped bytes are untouched.
        let other = Grammar::parse(&storage, 0).unwrap();
        assert_eq!(other.get_connect_cost(1, 1), 11);
    }

    #[test]
    fn test_add_pos_list() {
        let storage = Arc::new(Storage::Owned(sample_bytes()));
        let mut grammar = Grammar::parse(&storage, 0).unwrap();
        let user = Grammar::new(vec![pos(&["a", "b", "c", "d", "e", "f"])], 0, 0, vec![]).unwrap();
        grammar.add_pos_list(&user);
        assert_eq!(
            grammar.get_part_of_speech_id(&["a", "b", "c", "d", "e", "f"]),
            Some(2)
        );
    }

    #[test]
    fn test_new_storage_size() {
        let pos_list = vec![
            pos(&["名詞", "普通名詞", "一般", "*", "*", "*"]),
            pos(&["あ".repeat(200).as_str(), "😀", "", "*", "*", "*"]),
        ];
        let costs: Vec<i16> = (0..6).collect();
        let grammar = Grammar::new(pos_list.clone(), 3, 2, costs.clone()).unwrap();
        let mut wtr = ByteWriter::new();
        write_grammar(&mut wtr, &pos_list, 3, 2, |l, r| costs[(l + 3 * r) as usize]).unwrap();
        assert_eq!(grammar.storage_size(), wtr.position());

        let field = "a".repeat(MAX_STRING_LENGTH + 1);
        let long = vec![pos(&[field.as_str(), "*", "*", "*", "*", "*"])];
        assert!(Grammar::new(long, 0, 0, vec![]).is_err());
    }
}
