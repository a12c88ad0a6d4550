//! Rewriters of the best path.
pub(crate) mod join_katakana_oov;
pub(crate) mod join_numeric;

pub(crate) use join_katakana_oov::JoinKatakanaOovRewriter;
pub(crate) use join_numeric::JoinNumericRewriter;

use crate::dictionary::lexicon::WordInfo;
use crate::errors::{Result, SudareError};
use crate::input_text::InputText;
use crate::morpheme::ResultNode;

/// Rewriter of the best path, run after the search in the configured order.
pub(crate) trait PathRewriter {
    fn rewrite(&self, input: &InputText, path: &mut Vec<ResultNode>) -> Result<()>;
}

fn check_range(path: &[ResultNode], begin: usize, end: usize) -> Result<()> {
    if begin >= end || end > path.len() {
        return Err(SudareError::invalid_argument(
            "end",
            format!("invalid range {begin}..{end} of a path of {}", path.len()),
        ));
    }
    Ok(())
}

/// Replaces `path[begin..end]` with one known-word node concatenating their forms.
///
/// The new node takes the part of speech of the first node.
pub(crate) fn concatenate(path: &mut Vec<ResultNode>, begin: usize, end: usize) -> Result<()> {
    check_range(path, begin, end)?;
    let mut info = WordInfo {
        pos_id: path[begin].info.pos_id,
        ..Default::default()
    };
    for node in &path[begin..end] {
        info.surface.push_str(&node.info.surface);
        info.head_word_length += node.info.head_word_length;
        info.normalized_form.push_str(&node.info.normalized_form);
        info.dictionary_form.push_str(&node.info.dictionary_form);
        info.reading_form.push_str(&node.info.reading_form);
    }
    let node = ResultNode {
        begin: path[begin].begin,
        end: path[end - 1].end,
        total_cost: path[end - 1].total_cost,
        word_id: None,
        is_oov: false,
        info,
    };
    path.splice(begin..end, [node]);
    Ok(())
}

/// Replaces `path[begin..end]` with one unknown-word node of the part of speech.
pub(crate) fn concatenate_oov(
    path: &mut Vec<ResultNode>,
    begin: usize,
    end: usize,
    pos_id: u16,
) -> Result<()> {
    check_range(path, begin, end)?;
    let mut surface = String::new();
    let mut head_word_length = 0;
    for node in &path[begin..end] {
        surface.push_str(&node.info.surface);
        head_word_length += node.info.head_word_length;
    }
    let info = WordInfo {
        normalized_form: surface.clone(),
        dictionary_form: surface.clone(),
        surface,
        head_word_length,
        pos_id,
        ..Default::default()
    };
    let node = ResultNode {
        begin: path[begin].begin,
        end: path[end - 1].end,
        total_cost: path[end - 1].total_cost,
        word_id: None,
        is_oov: true,
        info,
    };
    path.splice(begin..end, [node]);
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    use crate::dictionary::character::CharacterCategory;
    use crate::input_text::InputTextBuilder;

    pub const CHAR_DEF: &str = "\
0x0030..0x0039 NUMERIC
0x30A1..0x30FA KATAKANA
0x30FC KATAKANA NOOOVBOW
0x30FB SYMBOL NOOOVBOW
0x4E00..0x9FFF KANJI
0x4E00 KANJI KANJINUMERIC
0x4E8C KANJI KANJINUMERIC
0x4E09 KANJI KANJINUMERIC";

    pub fn input(text: &str) -> InputText {
        let cc = CharacterCategory::from_reader(CHAR_DEF.as_bytes()).unwrap();
        InputTextBuilder::from_reader("".as_bytes())
            .unwrap()
            .build(text, &cc)
    }

    /// Splits the working text into nodes of the given char lengths.
    pub fn path(input: &InputText, lens: &[(usize, bool)]) -> Vec<ResultNode> {
        let mut begin = 0;
        let mut path = vec![];
        for (i, &(n, is_oov)) in lens.iter().enumerate() {
            let end = begin + input.get_code_points_offset_length(begin, n);
            let surface = input.get_substring(begin, end).unwrap().to_string();
            path.push(ResultNode {
                begin,
                end,
                total_cost: i as i32 * 10,
                word_id: None,
                is_oov,
                info: WordInfo {
                    normalized_form: surface.to_uppercase(),
                    dictionary_form: surface.clone(),
                    reading_form: format!("r{i}"),
                    head_word_length: end - begin,
                    pos_id: i as u16,
                    surface,
                    ..Default::default()
                },
            });
            begin = end;
        }
        path
    }

    pub fn surfaces(path: &[ResultNode]) -> Vec<&str> {
        path.iter().map(|n| n.info.surface()).collect()
    }

    #[test]
    fn test_concatenate() {
        let input = input("abcd");
        let mut path = path(&input, &[(1, false), (2, true), (1, false)]);
        concatenate(&mut path, 0, 2).unwrap();
        assert_eq!(surfaces(&path), vec!["abc", "d"]);
        let node = &path[0];
        assert_eq!((node.begin, node.end), (0, 3));
        assert_eq!(node.total_cost, 10);
        assert!(!node.is_oov);
        assert_eq!(node.info.pos_id(), 0);
        assert_eq!(node.info.head_word_length(), 3);
        assert_eq!(node.info.normalized_form(), "ABC");
        assert_eq!(node.info.dictionary_form(), "abc");
        assert_eq!(node.info.reading_form(), "r0r1");
        assert_eq!(node.info.dictionary_form_word_id(), None);

        concatenate(&mut path, 0, 2).unwrap();
        assert_eq!(surfaces(&path), vec!["abcd"]);
        assert_eq!(path[0].info.normalized_form(), "ABCD");
        assert_eq!(path[0].info.reading_form(), "r0r1r2");
    }

    #[test]
    fn test_concatenate_oov() {
        let input = input("abcd");
        let mut path = path(&input, &[(1, false), (2, false), (1, false)]);
        concatenate_oov(&mut path, 1, 3, 9).unwrap();
        assert_eq!(surfaces(&path), vec!["a", "bcd"]);
        let node = &path[1];
        assert_eq!((node.begin, node.end), (1, 4));
        assert!(node.is_oov);
        assert_eq!(node.info.pos_id(), 9);
        assert_eq!(node.info.normalized_form(), "bcd");
        assert_eq!(node.info.dictionary_form(), "bcd");
        assert_eq!(node.info.reading_form(), "");
    }

    #[test]
    fn test_concatenate_invalid_range() {
        let input = input("ab");
        let mut path = path(&input, &[(1, false), (1, false)]);
        assert!(concatenate(&mut path, 1, 1).is_err());
        assert!(concatenate_oov(&mut path, 0, 3, 0).is_err());
        assert_eq!(path.len(), 2);
    }
}
