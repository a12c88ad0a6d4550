use crate::config::Config;
use crate::dictionary::grammar::Grammar;
use crate::errors::Result;
use crate::input_text::InputText;
use crate::plugin::oov::{OovNode, OovProvider};
use crate::plugin::resolve_pos_id;

/// Provider of a one-character unknown word, used when nothing else starts at a position.
pub(crate) struct SimpleOovProvider {
    left_id: i16,
    right_id: i16,
    cost: i16,
    pos_id: u16,
}

impl SimpleOovProvider {
    pub fn new(config: &Config, grammar: &Grammar) -> Result<Self> {
        Ok(Self {
            left_id: config.simple_oov_left_id,
            right_id: config.simple_oov_right_id,
            cost: config.simple_oov_cost,
            pos_id: resolve_pos_id(grammar, &config.simple_oov_pos, "simple_oov_pos")?,
        })
    }
}

impl OovProvider for SimpleOovProvider {
    fn provide_oov(
        &self,
        input: &InputText,
        offset: usize,
        has_other_words: bool,
        out: &mut Vec<OovNode>,
    ) -> Result<()> {
        if has_other_words {
            return Ok(());
        }
        let length = input.get_code_points_offset_length(offset, 1);
        out.push(OovNode::new(
            input,
            offset,
            offset + length,
            self.pos_id,
            self.left_id,
            self.right_id,
            self.cost,
        )?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::dictionary::character::CharacterCategory;
    use crate::input_text::InputTextBuilder;

    #[test]
    fn test_provide() {
        let pos_list = vec![
            ["名詞", "普通名詞", "一般", "*", "*", "*"],
            ["補助記号", "一般", "*", "*", "*", "*"],
        ]
        .into_iter()
        .map(|p| p.iter().map(|s| s.to_string()).collect())
        .collect();
        let grammar = Grammar::new(pos_list, 1, 1, vec![0]).unwrap();
        let config = Config::default().simple_oov_parameters(1, 2, 3);
        let provider = SimpleOovProvider::new(&config, &grammar).unwrap();

        let cc = CharacterCategory::from_reader("".as_bytes()).unwrap();
        let input = InputTextBuilder::from_reader("".as_bytes())
            .unwrap()
            .build("😀x", &cc);

        let mut out = vec![];
        provider.provide_oov(&input, 0, true, &mut out).unwrap();
        assert!(out.is_empty());
        provider.provide_oov(&input, 0, false, &mut out).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].end, 4);
        assert_eq!(out[0].info.surface(), "😀");
        assert_eq!(out[0].info.pos_id(), 1);
        assert_eq!((out[0].left_id, out[0].right_id, out[0].cost), (1, 2, 3));
    }

    #[test]
    fn test_undefined_pos() {
        let grammar = Grammar::new(vec![], 1, 1, vec![0]).unwrap();
        assert!(SimpleOovProvider::new(&Config::default(), &grammar).is_err());
    }
}
