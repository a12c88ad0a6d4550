//! Dictionary for tokenization.
pub(crate) mod binary;
pub(crate) mod builder;
pub(crate) mod character;
pub(crate) mod grammar;
pub(crate) mod header;
pub(crate) mod lexicon;
pub(crate) mod lexicon_set;
pub(crate) mod storage;
pub(crate) mod word_id;

use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};

pub use builder::{write_to_path, SystemDictionaryBuilder, UserDictionaryBuilder};
pub use character::{CategoryType, CharacterCategory};
pub use grammar::{Grammar, PartOfSpeech};
pub use header::{DictionaryHeader, SYSTEM_DICT_VERSION, USER_DICT_VERSION, USER_DICT_VERSION_2};
pub use lexicon::WordInfo;
pub use lexicon_set::{LexiconSet, WordInfoCache};
pub use word_id::WordId;

use crate::common::USER_DICT_COST_PER_MORPH;
use crate::config::Config;
use crate::errors::{Result, SudareError};
use crate::input_text::InputTextBuilder;
use crate::plugin::oov::{MecabOovProvider, SimpleOovProvider};
use crate::plugin::path_rewrite::{JoinKatakanaOovRewriter, JoinNumericRewriter};
use crate::plugin::{OovProvider, PathRewriter};
use crate::tokenizer::{Mode, Worker};
use header::HEADER_SIZE;
use lexicon::Lexicon;
use storage::Storage;

/// Resource files read once and shared by the dictionaries opened with them.
#[derive(Clone)]
pub struct Resources {
    char_def: String,
    unk_def: String,
    char_category: Arc<CharacterCategory>,
    input_builder: Arc<InputTextBuilder>,
}

impl Resources {
    /// Reads `char.def`, `unk.def` and `rewrite.def`.
    ///
    /// # Errors
    ///
    /// [`SudareError`] is returned when a file is broken.
    pub fn from_readers<C, U, R>(mut char_def: C, mut unk_def: U, rewrite_def: R) -> Result<Self>
    where
        C: Read,
        U: Read,
        R: Read,
    {
        let mut char_text = String::new();
        char_def.read_to_string(&mut char_text)?;
        let mut unk_text = String::new();
        unk_def.read_to_string(&mut unk_text)?;
        let char_category = CharacterCategory::from_reader(char_text.as_bytes())?;
        let input_builder = InputTextBuilder::from_reader(rewrite_def)?;
        Ok(Self {
            char_def: char_text,
            unk_def: unk_text,
            char_category: Arc::new(char_category),
            input_builder: Arc::new(input_builder),
        })
    }
}

type OovProviders = Vec<Box<dyn OovProvider + Send + Sync>>;
type PathRewriters = Vec<Box<dyn PathRewriter + Send + Sync>>;

/// Dictionary for tokenization: the system dictionary, the attached user dictionaries,
/// and the plugins configured at open time.
pub struct Dictionary {
    header: DictionaryHeader,
    grammar: Grammar,
    lexicon: LexiconSet,
    char_category: Arc<CharacterCategory>,
    input_builder: Arc<InputTextBuilder>,
    oov_providers: OovProviders,
    path_rewriters: PathRewriters,
    user_headers: Vec<DictionaryHeader>,
}

impl Dictionary {
    /// Opens a system dictionary file by mapping it into memory.
    ///
    /// # Errors
    ///
    /// [`SudareError`] is returned when the file cannot be read, is not a system
    /// dictionary, or when a plugin cannot be configured.
    pub fn open<P>(path: P, config: &Config, resources: &Resources) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        info!(path = %path.display(), "opening system dictionary");
        Self::from_storage(Storage::map(path)?, config, resources)
    }

    /// Creates a dictionary from the bytes of a system dictionary.
    ///
    /// # Errors
    ///
    /// [`SudareError`] is returned when the bytes are not a system dictionary,
    /// or when a plugin cannot be configured.
    pub fn from_bytes(bytes: Vec<u8>, config: &Config, resources: &Resources) -> Result<Self> {
        Self::from_storage(Storage::Owned(bytes), config, resources)
    }

    fn from_storage(storage: Storage, config: &Config, resources: &Resources) -> Result<Self> {
        let storage = Arc::new(storage);
        let header = DictionaryHeader::parse(storage.as_ref().as_ref())?;
        if header.version() != SYSTEM_DICT_VERSION {
            return Err(SudareError::invalid_format(
                "dictionary",
                format!("{:#x} is not the version of a system dictionary", header.version()),
            ));
        }
        let mut grammar = Grammar::parse(&storage, HEADER_SIZE)?;
        grammar.set_character_category(Arc::clone(&resources.char_category));
        let lexicon = Lexicon::parse(&storage, HEADER_SIZE + grammar.storage_size())?;
        debug!(
            pos = grammar.part_of_speech_size(),
            left = grammar.left_size(),
            right = grammar.right_size(),
            words = lexicon.size(),
            "parsed system dictionary"
        );

        let oov_providers = Self::oov_providers_from_config(config, resources, &grammar)?;
        let path_rewriters = Self::path_rewriters_from_config(config, &grammar)?;
        let system_pos_size = grammar.part_of_speech_size();

        Ok(Self {
            header,
            grammar,
            lexicon: LexiconSet::new(lexicon, system_pos_size),
            char_category: Arc::clone(&resources.char_category),
            input_builder: Arc::clone(&resources.input_builder),
            oov_providers,
            path_rewriters,
            user_headers: vec![],
        })
    }

    fn oov_providers_from_config(
        config: &Config,
        resources: &Resources,
        grammar: &Grammar,
    ) -> Result<OovProviders> {
        let mut providers: OovProviders = vec![];
        if config.mecab_oov {
            providers.push(Box::new(MecabOovProvider::from_readers(
                resources.char_def.as_bytes(),
                resources.unk_def.as_bytes(),
                grammar,
            )?));
        }
        if config.simple_oov {
            providers.push(Box::new(SimpleOovProvider::new(config, grammar)?));
        }
        if providers.is_empty() {
            return Err(SudareError::invalid_argument(
                "config",
                "at least one unknown word provider must be enabled",
            ));
        }
        Ok(providers)
    }

    fn path_rewriters_from_config(config: &Config, grammar: &Grammar) -> Result<PathRewriters> {
        let mut rewriters: PathRewriters = vec![];
        if config.join_numeric {
            rewriters.push(Box::new(JoinNumericRewriter::new(config)));
        }
        if config.join_katakana_oov {
            rewriters.push(Box::new(JoinKatakanaOovRewriter::new(config, grammar)?));
        }
        Ok(rewriters)
    }

    /// Attaches a user dictionary file by mapping it into memory.
    ///
    /// # Errors
    ///
    /// [`SudareError`] is returned when the file cannot be read, is not a user
    /// dictionary, or when 15 user dictionaries are already attached.
    pub fn add_user_dictionary<P>(&mut self, path: P) -> Result<()>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        info!(path = %path.display(), "attaching user dictionary");
        self.add_user_storage(Storage::map(path)?)
    }

    /// Attaches a user dictionary given as bytes.
    ///
    /// # Errors
    ///
    /// [`SudareError`] is returned when the bytes are not a user dictionary,
    /// or when 15 user dictionaries are already attached.
    pub fn add_user_dictionary_bytes(&mut self, bytes: Vec<u8>) -> Result<()> {
        self.add_user_storage(Storage::Owned(bytes))
    }

    fn add_user_storage(&mut self, storage: Storage) -> Result<()> {
        if self.lexicon.is_full() {
            return Err(SudareError::invalid_argument(
                "dictionary",
                "no more user dictionaries can be attached",
            ));
        }
        let storage = Arc::new(storage);
        let header = DictionaryHeader::parse(storage.as_ref().as_ref())?;
        if !header.is_user_dictionary() {
            return Err(SudareError::invalid_format(
                "dictionary",
                format!("{:#x} is not the version of a user dictionary", header.version()),
            ));
        }
        let mut offset = HEADER_SIZE;
        let user_grammar = if header.has_grammar() {
            let grammar = Grammar::parse(&storage, offset)?;
            offset += grammar.storage_size();
            Some(grammar)
        } else {
            None
        };
        let mut lexicon = Lexicon::parse(&storage, offset)?;

        let costs = self.estimate_costs(&lexicon)?;
        debug!(
            words = lexicon.size(),
            estimated = costs.len(),
            "parsed user dictionary"
        );
        for (word, cost) in costs {
            lexicon.set_cost(word, cost)?;
        }

        let pos_offset = self.grammar.part_of_speech_size();
        if let Some(user_grammar) = user_grammar {
            self.grammar.add_pos_list(&user_grammar);
        }
        self.lexicon.add(lexicon, pos_offset)?;
        self.user_headers.push(header);
        Ok(())
    }

    /// Estimates the costs of the words stored with the cost `i16::MIN` by tokenizing
    /// their surfaces with the current dictionary.
    fn estimate_costs(&self, lexicon: &Lexicon) -> Result<Vec<(u32, i16)>> {
        let mut worker = Worker::new(self).rewrite_path(false);
        let mut costs = vec![];
        for word in 0..u32::try_from(lexicon.size())? {
            if lexicon.get_cost(word) != i16::MIN {
                continue;
            }
            let surface = lexicon.get_record(word)?.surface;
            let morphemes = worker.tokenize(Mode::C, &surface)?;
            let num_morphemes = i32::try_from(morphemes.len())?;
            let cost = morphemes.internal_cost() + USER_DICT_COST_PER_MORPH * num_morphemes;
            let cost = cost.clamp(i32::from(i16::MIN), i32::from(i16::MAX));
            costs.push((word, i16::try_from(cost)?));
        }
        Ok(costs)
    }

    /// Gets the header of the system dictionary.
    #[inline(always)]
    pub const fn header(&self) -> &DictionaryHeader {
        &self.header
    }

    /// Gets the headers of the attached user dictionaries, in attach order.
    #[inline(always)]
    pub fn user_headers(&self) -> &[DictionaryHeader] {
        &self.user_headers
    }

    /// Gets the grammar, including the parts of speech of the user dictionaries.
    #[inline(always)]
    pub const fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    /// Gets the set of lexicons.
    #[inline(always)]
    pub const fn lexicon(&self) -> &LexiconSet {
        &self.lexicon
    }

    /// Gets the character categories.
    #[inline(always)]
    pub fn character_category(&self) -> &CharacterCategory {
        &self.char_category
    }

    #[inline(always)]
    pub(crate) fn input_builder(&self) -> &InputTextBuilder {
        &self.input_builder
    }

    #[inline(always)]
    pub(crate) fn oov_providers(&self) -> &[Box<dyn OovProvider + Send + Sync>] {
        &self.oov_providers
    }

    #[inline(always)]
    pub(crate) fn path_rewriters(&self) -> &[Box<dyn PathRewriter + Send + Sync>] {
        &self.path_rewriters
    }
}
