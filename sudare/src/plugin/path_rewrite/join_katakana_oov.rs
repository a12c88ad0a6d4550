use crate::config::Config;
use crate::dictionary::character::CategoryType;
use crate::dictionary::grammar::Grammar;
use crate::errors::Result;
use crate::input_text::InputText;
use crate::morpheme::ResultNode;
use crate::plugin::path_rewrite::{concatenate_oov, PathRewriter};
use crate::plugin::resolve_pos_id;

/// Rewriter joining an unknown katakana word with the adjacent katakana words.
pub(crate) struct JoinKatakanaOovRewriter {
    pos_id: u16,
    min_length: usize,
}

impl JoinKatakanaOovRewriter {
    pub fn new(config: &Config, grammar: &Grammar) -> Result<Self> {
        Ok(Self {
            pos_id: resolve_pos_id(grammar, &config.katakana_oov_pos, "katakana_oov_pos")?,
            min_length: config.katakana_oov_min_length,
        })
    }

    fn is_katakana(input: &InputText, node: &ResultNode) -> bool {
        input
            .get_char_category_types(node.begin, node.end)
            .contains(CategoryType::KATAKANA)
    }

    fn is_shorter(&self, input: &InputText, node: &ResultNode) -> bool {
        node.end <= node.begin + input.get_code_points_offset_length(node.begin, self.min_length)
    }

    fn can_oov_bow(input: &InputText, node: &ResultNode) -> bool {
        !input
            .get_char_category_types_at(node.begin)
            .contains(CategoryType::NOOOVBOW)
    }
}

impl PathRewriter for JoinKatakanaOovRewriter {
    fn rewrite(&self, input: &InputText, path: &mut Vec<ResultNode>) -> Result<()> {
        let mut i = 0;
        while i < path.len() {
            let node = &path[i];
            let triggers = node.is_oov
                || (self.is_shorter(input, node) && Self::can_oov_bow(input, node));
            if triggers && Self::is_katakana(input, node) {
                let mut begin = i;
                while begin > 0 && Self::is_katakana(input, &path[begin - 1]) {
                    begin -= 1;
                }
                while begin != i && !Self::can_oov_bow(input, &path[begin]) {
                    begin += 1;
                }
                let mut end = i + 1;
                while end < path.len() && Self::is_katakana(input, &path[end]) {
                    end += 1;
                }
                if end - begin > 1 {
                    concatenate_oov(path, begin, end, self.pos_id)?;
                    // The node after the joined one is not katakana.
                    i = begin + 1;
                }
            }
            i += 1;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::plugin::path_rewrite::tests::{input, path, surfaces};

    fn grammar() -> Grammar {
        let pos_list = vec![
            ["名詞", "普通名詞", "一般", "*", "*", "*"],
            ["補助記号", "一般", "*", "*", "*", "*"],
        ]
        .into_iter()
        .map(|p| p.iter().map(|s| s.to_string()).collect())
        .collect();
        Grammar::new(pos_list, 1, 1, vec![0]).unwrap()
    }

    fn rewrite(config: &Config, text: &str, nodes: &[(usize, bool)]) -> Vec<ResultNode> {
        let input = input(text);
        let mut path = path(&input, nodes);
        JoinKatakanaOovRewriter::new(config, &grammar())
            .unwrap()
            .rewrite(&input, &mut path)
            .unwrap();
        path
    }

    #[test]
    fn test_join_oov() {
        let config = Config::default();
        // アイ is a known word, ウ an unknown one.
        let path = rewrite(&config, "アイウ", &[(2, false), (1, true)]);
        assert_eq!(surfaces(&path), vec!["アイウ"]);
        assert!(path[0].is_oov);
        assert_eq!(path[0].info.pos_id(), 0);
        assert_eq!(path[0].info.reading_form(), "");

        let path = rewrite(&config, "aアイウb", &[(1, false), (2, false), (1, true), (1, false)]);
        assert_eq!(surfaces(&path), vec!["a", "アイウ", "b"]);
    }

    #[test]
    fn test_no_trigger() {
        let config = Config::default();
        let path = rewrite(&config, "アイウエ", &[(2, false), (2, false)]);
        assert_eq!(surfaces(&path), vec!["アイ", "ウエ"]);
        // An unknown word alone is left as is.
        let path = rewrite(&config, "aアイ", &[(1, false), (2, true)]);
        assert_eq!(surfaces(&path), vec!["a", "アイ"]);
    }

    #[test]
    fn test_short_known_word() {
        let config = Config::default();
        let path = rewrite(&config, "アイウ", &[(2, false), (1, false)]);
        assert_eq!(surfaces(&path), vec!["アイウ"]);

        let config = Config::default().katakana_oov_min_length(2);
        let path = rewrite(&config, "アイウエオ", &[(3, false), (2, false)]);
        assert_eq!(surfaces(&path), vec!["アイウエオ"]);
        let config = Config::default().katakana_oov_min_length(0);
        let path = rewrite(&config, "アイウ", &[(2, false), (1, false)]);
        assert_eq!(surfaces(&path), vec!["アイ", "ウ"]);
    }

    #[test]
    fn test_no_oov_bow() {
        let config = Config::default();
        // `・` cannot begin an unknown word and is not katakana.
        let path = rewrite(&config, "・アイ", &[(1, false), (1, true), (1, false)]);
        assert_eq!(surfaces(&path), vec!["・", "アイ"]);
        // `ー` is katakana but cannot begin an unknown word.
        let path = rewrite(&config, "ーアイ", &[(1, false), (1, true), (1, false)]);
        assert_eq!(surfaces(&path), vec!["ー", "アイ"]);
        let path = rewrite(&config, "アーイ", &[(1, false), (1, false), (1, true)]);
        assert_eq!(surfaces(&path), vec!["アーイ"]);
    }

    #[test]
    fn test_undefined_pos() {
        let grammar = Grammar::new(vec![], 1, 1, vec![0]).unwrap();
        assert!(JoinKatakanaOovRewriter::new(&Config::default(), &grammar).is_err());
    }
}
