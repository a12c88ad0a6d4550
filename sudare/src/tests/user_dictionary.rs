use crate::config::Config;
use crate::dictionary::{Dictionary, UserDictionaryBuilder, WordId, USER_DICT_VERSION_2};
use crate::tokenizer::{Mode, Tokenizer};

use super::{dictionary, USER_CSV};

fn user_bytes(base: &Dictionary) -> Vec<u8> {
    UserDictionaryBuilder::from_readers(base, [USER_CSV.as_bytes()], "user").unwrap()
}

fn tokenizer_with_user() -> Tokenizer {
    let mut dict = dictionary(&Config::default());
    let bytes = user_bytes(&dict);
    dict.add_user_dictionary_bytes(bytes).unwrap();
    Tokenizer::new(dict)
}

#[test]
fn test_attach() {
    let tokenizer = tokenizer_with_user();
    let dict = tokenizer.dictionary();
    assert_eq!(dict.user_headers().len(), 1);
    assert_eq!(dict.user_headers()[0].version(), USER_DICT_VERSION_2);
    assert_eq!(dict.user_headers()[0].description(), "user");
    assert_eq!(dict.lexicon().num_lexicons(), 2);
    assert_eq!(dict.lexicon().size(1), 4);
    // One new part of speech is appended to the system ones.
    assert_eq!(dict.grammar().part_of_speech_size(), 11);
}

#[test]
fn test_user_word_with_new_pos() {
    let tokenizer = tokenizer_with_user();
    let morphemes = tokenizer.tokenize(Mode::C, "すだれ").unwrap();
    assert_eq!(morphemes.len(), 1);
    let m = morphemes.morpheme(0);
    assert!(!m.is_oov());
    assert_eq!(m.dictionary_id(), Some(1));
    assert_eq!(m.part_of_speech_id(), 10);
    assert_eq!(m.part_of_speech(), ["名詞", "固有名詞", "人名", "一般", "*", "*"]);
    assert_eq!(m.reading_form(), "スダレ");
}

#[test]
fn test_without_user_dictionary() {
    let tokenizer = Tokenizer::new(dictionary(&Config::default()));
    let morphemes = tokenizer.tokenize(Mode::C, "すだれ").unwrap();
    assert_eq!(morphemes.len(), 1);
    assert!(morphemes.morpheme(0).is_oov());
}

#[test]
fn test_estimated_cost() {
    let tokenizer = tokenizer_with_user();
    let morphemes = tokenizer.tokenize(Mode::C, "東京タワー").unwrap();
    assert_eq!(morphemes.len(), 1);
    let m = morphemes.morpheme(0);
    assert_eq!(m.dictionary_id(), Some(1));
    assert_eq!(
        m.part_of_speech(),
        ["名詞", "固有名詞", "一般", "*", "*", "*"]
    );

    // 東京 (2000) and タワー (7000) give the internal cost 7000, and each of the two
    // morphemes adds -20.
    let word_id = m.word_id().unwrap();
    assert_eq!(tokenizer.dictionary().lexicon().get_cost(word_id), 6960);
}

#[test]
fn test_reference_to_system_word() {
    let tokenizer = tokenizer_with_user();
    let morphemes = tokenizer.tokenize(Mode::C, "いく").unwrap();
    let m = morphemes.morpheme(0);
    assert_eq!(m.dictionary_id(), Some(1));
    assert_eq!(m.dictionary_form(), "行く");
    assert_eq!(
        m.word_info().dictionary_form_word_id(),
        Some(WordId::new(0, 6).unwrap())
    );
}

#[test]
fn test_split_across_dictionaries() {
    let tokenizer = tokenizer_with_user();
    let morphemes = tokenizer.tokenize(Mode::A, "東京すだれ").unwrap();
    let units: Vec<_> = morphemes
        .iter()
        .map(|m| (m.surface(), m.dictionary_id()))
        .collect();
    assert_eq!(units, vec![("東京", Some(0)), ("すだれ", Some(1))]);

    let morphemes = tokenizer.tokenize(Mode::C, "東京すだれ").unwrap();
    assert_eq!(morphemes.len(), 1);
    let structure: Vec<_> = morphemes
        .morpheme(0)
        .word_structure()
        .iter()
        .map(|w| (w.dic(), w.word()))
        .collect();
    assert_eq!(structure, vec![(0, 0), (1, 1)]);
}

#[test]
fn test_too_many_user_dictionaries() {
    let mut dict = dictionary(&Config::default());
    let bytes = user_bytes(&dict);
    for _ in 0..15 {
        dict.add_user_dictionary_bytes(bytes.clone()).unwrap();
    }
    assert!(dict.lexicon().is_full());
    assert!(dict.add_user_dictionary_bytes(bytes).is_err());
}

#[test]
fn test_system_dictionary_as_user() {
    let mut dict = dictionary(&Config::default());
    assert!(dict.add_user_dictionary_bytes(super::system_bytes()).is_err());
}

#[test]
fn test_unresolved_user_reference() {
    let dict = dictionary(&Config::default());
    let csv = "x,0,0,100,x,名詞,普通名詞,一般,*,*,*,x,x,*,C,U5,*,*";
    assert!(UserDictionaryBuilder::from_readers(&dict, [csv.as_bytes()], "").is_err());
    let csv = "x,0,0,100,x,名詞,普通名詞,一般,*,*,*,x,x,*,C,19,*,*";
    assert!(UserDictionaryBuilder::from_readers(&dict, [csv.as_bytes()], "").is_err());
    let csv = "x,0,0,100,x,名詞,普通名詞,一般,*,*,*,x,x,*,C,18,*,*";
    assert!(UserDictionaryBuilder::from_readers(&dict, [csv.as_bytes()], "").is_ok());
}
