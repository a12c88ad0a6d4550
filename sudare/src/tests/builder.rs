use crate::config::Config;
use crate::dictionary::{Dictionary, SystemDictionaryBuilder, WordId, SYSTEM_DICT_VERSION};
use crate::errors::SudareError;

use super::{dictionary, resources, system_bytes, LEX_CSV, MATRIX_DEF};

#[test]
fn test_open_built_dictionary() {
    let dict = dictionary(&Config::default());
    assert_eq!(dict.header().version(), SYSTEM_DICT_VERSION);
    assert_eq!(dict.header().description(), "test");
    assert_eq!(dict.lexicon().size(0), 19);
    assert_eq!(dict.grammar().part_of_speech_size(), 10);
    assert_eq!(
        dict.grammar().get_part_of_speech_id(&["名詞", "数詞", "*", "*", "*", "*"]),
        Some(6)
    );
    assert_eq!((dict.grammar().left_size(), dict.grammar().right_size()), (1, 1));
}

#[test]
fn test_lookup() {
    let dict = dictionary(&Config::default());
    let mut matches: Vec<_> = dict
        .lexicon()
        .lookup("東京都に".as_bytes(), 0)
        .map(|(word_id, end)| (word_id.word(), end))
        .collect();
    matches.sort_unstable();
    assert_eq!(matches, vec![(0, 6), (1, 3), (4, 9)]);
}

#[test]
fn test_word_info() {
    let dict = dictionary(&Config::default());
    let lexicon = dict.lexicon();

    let info = lexicon.get_word_info(WordId::new(0, 7).unwrap()).unwrap();
    assert_eq!(info.surface(), "行っ");
    assert_eq!(info.reading_form(), "イッ");
    assert_eq!(info.dictionary_form(), "行く");
    assert_eq!(info.dictionary_form_word_id(), Some(WordId::new(0, 6).unwrap()));

    let info = lexicon.get_word_info(WordId::new(0, 14).unwrap()).unwrap();
    let ids = |ws: &[WordId]| ws.iter().map(|w| w.word()).collect::<Vec<_>>();
    assert_eq!(ids(info.a_unit_split()), vec![15, 16, 17]);
    assert_eq!(ids(info.b_unit_split()), vec![15, 18]);
    assert_eq!(ids(info.word_structure()), vec![15, 16, 17]);

    let info = lexicon.get_word_info(WordId::new(0, 9).unwrap()).unwrap();
    assert_eq!(info.normalized_form(), "東京");
    assert_eq!(info.head_word_length(), 5);
}

#[test]
fn test_open_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("system.dic");
    crate::dictionary::write_to_path(&path, &system_bytes()).unwrap();
    let dict = Dictionary::open(&path, &Config::default(), &resources()).unwrap();
    assert_eq!(dict.lexicon().size(0), 19);
}

#[test]
fn test_unresolved_split() {
    let lex = format!("{LEX_CSV}東西,0,0,100,東西,名詞,普通名詞,一般,*,*,*,トウザイ,東西,*,C,1/99,*,*\n");
    let result = SystemDictionaryBuilder::from_readers([lex.as_bytes()], MATRIX_DEF.as_bytes(), "");
    assert!(matches!(result, Err(SudareError::InvalidFormat(_))));
}

#[test]
fn test_not_system_dictionary() {
    let mut bytes = system_bytes();
    bytes[0] ^= 0xff;
    let result = Dictionary::from_bytes(bytes, &Config::default(), &resources());
    assert!(result.is_err());
}

#[test]
fn test_missing_plugin_pos() {
    let config = Config::default().simple_oov_pos(&["感動詞", "*", "*", "*", "*", "*"]);
    assert!(Dictionary::from_bytes(system_bytes(), &config, &resources()).is_err());

    let config = Config::default().mecab_oov(false).simple_oov(false);
    assert!(Dictionary::from_bytes(system_bytes(), &config, &resources()).is_err());
}
