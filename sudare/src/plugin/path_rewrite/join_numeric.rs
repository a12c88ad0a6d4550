use crate::config::Config;
use crate::dictionary::character::CategoryType;
use crate::errors::Result;
use crate::input_text::InputText;
use crate::morpheme::ResultNode;
use crate::plugin::path_rewrite::{concatenate, PathRewriter};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Run {
    Numeric,
    KanjiNumeric,
}

/// Rewriter joining runs of numerals into single morphemes.
pub(crate) struct JoinNumericRewriter {
    join_kanji_numeric: bool,
    join_all_numeric: bool,
}

impl JoinNumericRewriter {
    pub const fn new(config: &Config) -> Self {
        Self {
            join_kanji_numeric: config.join_kanji_numeric,
            join_all_numeric: config.join_all_numeric,
        }
    }
}

impl PathRewriter for JoinNumericRewriter {
    fn rewrite(&self, input: &InputText, path: &mut Vec<ResultNode>) -> Result<()> {
        // `i` always points to the current node, also after joining the preceding run.
        let mut run: Option<(Run, usize)> = None;
        let mut i = 0;
        while i < path.len() {
            let types = input.get_char_category_types(path[i].begin, path[i].end);
            if types.contains(CategoryType::NUMERIC) {
                match run {
                    Some((Run::Numeric, _)) => {
                        i += 1;
                        continue;
                    }
                    Some((Run::KanjiNumeric, begin)) => {
                        if self.join_all_numeric {
                            i += 1;
                            continue;
                        }
                        if i - begin > 1 {
                            concatenate(path, begin, i)?;
                            i = begin + 1;
                        }
                    }
                    None => {}
                }
                run = Some((Run::Numeric, i));
            } else if types.contains(CategoryType::KANJINUMERIC) {
                match run {
                    Some((Run::KanjiNumeric, _)) => {
                        i += 1;
                        continue;
                    }
                    Some((Run::Numeric, begin)) => {
                        if self.join_all_numeric {
                            i += 1;
                            continue;
                        }
                        if i - begin > 1 {
                            concatenate(path, begin, i)?;
                            i = begin + 1;
                        }
                    }
                    None => {}
                }
                run = self.join_kanji_numeric.then(|| (Run::KanjiNumeric, i));
            } else {
                if let Some((_, begin)) = run {
                    if i - begin > 1 {
                        concatenate(path, begin, i)?;
                        i = begin + 1;
                    }
                }
                run = None;
            }
            i += 1;
        }
        if let Some((_, begin)) = run {
            if path.len() - begin > 1 {
                concatenate(path, begin, path.len())?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::plugin::path_rewrite::tests::{input, path, surfaces};

    fn rewrite(config: &Config, text: &str) -> Vec<String> {
        let input = input(text);
        let n = text.chars().count();
        let mut path = path(&input, &vec![(1, false); n]);
        JoinNumericRewriter::new(config)
            .rewrite(&input, &mut path)
            .unwrap();
        surfaces(&path).into_iter().map(String::from).collect()
    }

    #[test]
    fn test_numeric() {
        let config = Config::default();
        assert_eq!(rewrite(&config, "123"), vec!["123"]);
        assert_eq!(rewrite(&config, "a12b3"), vec!["a", "12", "b", "3"]);
        assert_eq!(rewrite(&config, "12ab34"), vec!["12", "a", "b", "34"]);
    }

    #[test]
    fn test_kanji_numeric() {
        let config = Config::default();
        assert_eq!(rewrite(&config, "一二三"), vec!["一二三"]);
        assert_eq!(rewrite(&config, "一二漢三"), vec!["一二", "漢", "三"]);
        assert_eq!(rewrite(&config, "12一二"), vec!["12", "一二"]);
        assert_eq!(rewrite(&config, "一二12a"), vec!["一二", "12", "a"]);

        let config = Config::default().join_kanji_numeric(false);
        assert_eq!(rewrite(&config, "一二"), vec!["一", "二"]);
        assert_eq!(rewrite(&config, "1一23"), vec!["1", "一", "23"]);
    }

    #[test]
    fn test_all_numeric() {
        let config = Config::default().join_all_numeric(true);
        assert_eq!(rewrite(&config, "12一二3"), vec!["12一二3"]);
        assert_eq!(rewrite(&config, "一1a"), vec!["一1", "a"]);
    }

    #[test]
    fn test_joined_forms() {
        let input = input("a12");
        let mut path = path(&input, &[(1, false), (1, false), (1, true)]);
        JoinNumericRewriter::new(&Config::default())
            .rewrite(&input, &mut path)
            .unwrap();
        assert_eq!(surfaces(&path), vec!["a", "12"]);
        let node = &path[1];
        assert_eq!((node.begin, node.end), (1, 3));
        assert!(!node.is_oov);
        assert_eq!(node.info.pos_id(), 1);
        assert_eq!(node.info.reading_form(), "r1r2");
        assert_eq!(node.total_cost, 20);
    }
}
