use std::io::{prelude::*, BufReader, Read};

use hashbrown::HashMap;

use crate::dictionary::character::CategoryType;
use crate::dictionary::grammar::Grammar;
use crate::errors::{Result, SudareError};
use crate::input_text::InputText;
use crate::plugin::oov::{OovNode, OovProvider};
use crate::plugin::resolve_pos_id;

#[derive(Debug, Clone, Copy)]
struct CategoryInfo {
    invoke: bool,
    group: bool,
    length: usize,
}

#[derive(Debug, Clone, Copy)]
struct OovTemplate {
    left_id: i16,
    right_id: i16,
    cost: i16,
    pos_id: u16,
}

/// Unknown word provider in the manner of MeCab, configured by the category definitions
/// of `char.def` and the templates of `unk.def`.
pub(crate) struct MecabOovProvider {
    categories: HashMap<CategoryType, CategoryInfo>,
    oovs: HashMap<CategoryType, Vec<OovTemplate>>,
}

impl MecabOovProvider {
    /// Creates a new instance from `char.def` and `unk.def`.
    pub fn from_readers<C, U>(char_def: C, unk_def: U, grammar: &Grammar) -> Result<Self>
    where
        C: Read,
        U: Read,
    {
        let categories = Self::read_character_property(char_def)?;
        let oovs = Self::read_oov(unk_def, &categories, grammar)?;
        Ok(Self { categories, oovs })
    }

    fn read_character_property<R>(rdr: R) -> Result<HashMap<CategoryType, CategoryInfo>>
    where
        R: Read,
    {
        let mut categories = HashMap::new();
        let reader = BufReader::new(rdr);
        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with("0x") {
                continue;
            }
            let cols: Vec<_> = line.split_whitespace().collect();
            if cols.len() < 4 {
                let msg = format!(
                    "a character category must consist of four items at line {}",
                    i + 1
                );
                return Err(SudareError::invalid_format("char.def", msg));
            }
            let category: CategoryType = cols[0].parse().map_err(|_| {
                let msg = format!("`{}` is invalid type at line {}", cols[0], i + 1);
                SudareError::invalid_format("char.def", msg)
            })?;
            if categories.contains_key(&category) {
                let msg = format!("`{}` is already defined at line {}", cols[0], i + 1);
                return Err(SudareError::invalid_format("char.def", msg));
            }
            let invoke = ["1", "0"]
                .contains(&cols[1])
                .then(|| cols[1] == "1")
                .ok_or_else(|| SudareError::invalid_format("char.def", "INVOKE must be 1 or 0."))?;
            let group = ["1", "0"]
                .contains(&cols[2])
                .then(|| cols[2] == "1")
                .ok_or_else(|| SudareError::invalid_format("char.def", "GROUP must be 1 or 0."))?;
            let length = cols[3].parse()?;
            categories.insert(
                category,
                CategoryInfo {
                    invoke,
                    group,
                    length,
                },
            );
        }
        Ok(categories)
    }

    fn read_oov<R>(
        rdr: R,
        categories: &HashMap<CategoryType, CategoryInfo>,
        grammar: &Grammar,
    ) -> Result<HashMap<CategoryType, Vec<OovTemplate>>>
    where
        R: Read,
    {
        let mut oovs: HashMap<_, Vec<_>> = HashMap::new();
        let reader = BufReader::new(rdr);
        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let cols: Vec<_> = line.split(',').collect();
            if cols.len() < 10 {
                let msg = format!("invalid format at line {}", i + 1);
                return Err(SudareError::invalid_format("unk.def", msg));
            }
            let category: CategoryType = cols[0].parse().map_err(|_| {
                let msg = format!("`{}` is invalid type at line {}", cols[0], i + 1);
                SudareError::invalid_format("unk.def", msg)
            })?;
            if !categories.contains_key(&category) {
                let msg = format!("`{}` is undefined at line {}", cols[0], i + 1);
                return Err(SudareError::invalid_format("unk.def", msg));
            }
            let template = OovTemplate {
                left_id: cols[1].parse()?,
                right_id: cols[2].parse()?,
                cost: cols[3].parse()?,
                pos_id: resolve_pos_id(grammar, &cols[4..10], "unk.def")?,
            };
            oovs.entry(category).or_default().push(template);
        }
        Ok(oovs)
    }

    fn push_nodes(
        input: &InputText,
        offset: usize,
        length: usize,
        templates: &[OovTemplate],
        out: &mut Vec<OovNode>,
    ) -> Result<()> {
        for t in templates {
            out.push(OovNode::new(
                input,
                offset,
                offset + length,
                t.pos_id,
                t.left_id,
                t.right_id,
                t.cost,
            )?);
        }
        Ok(())
    }
}

impl OovProvider for MecabOovProvider {
    fn provide_oov(
        &self,
        input: &InputText,
        offset: usize,
        has_other_words: bool,
        out: &mut Vec<OovNode>,
    ) -> Result<()> {
        let length = input.get_char_category_continuous_length(offset);
        if length == 0 {
            return Ok(());
        }
        for id in input.get_char_category_types_at(offset).id_iter() {
            let category = CategoryType::from_id(id);
            let (Some(cinfo), Some(templates)) =
                (self.categories.get(&category), self.oovs.get(&category))
            else {
                continue;
            };

            // A sub-length node may not be as long as the grouped one.
            let mut llength = length;
            if cinfo.group && (cinfo.invoke || !has_other_words) {
                Self::push_nodes(input, offset, length, templates, out)?;
                llength = length - 1;
            }
            if cinfo.invoke || !has_other_words {
                let mut prev = 0;
                for i in 1..=cinfo.length {
                    let sublength = input.get_code_points_offset_length(offset, i);
                    if sublength > llength || sublength == prev {
                        break;
                    }
                    Self::push_nodes(input, offset, sublength, templates, out)?;
                    prev = sublength;
                }
            }
        }
        Ok(())
    }
}
