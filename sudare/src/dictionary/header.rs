use std::time::{SystemTime, UNIX_EPOCH};

use bincode::{Decode, Encode};

use crate::common;
use crate::errors::{Result, SudareError};

/// Version tag of a system dictionary.
pub const SYSTEM_DICT_VERSION: u64 = 0x7366d3f18bd111e7;

/// Version tag of a user dictionary holding only a lexicon.
pub const USER_DICT_VERSION: u64 = 0xa50f31188bd211e7;

/// Version tag of a user dictionary with a block of new part-of-speech tuples.
pub const USER_DICT_VERSION_2: u64 = 0x9fdeb5a90168d868;

const DESCRIPTION_SIZE: usize = 256;

/// The fixed size of the header in bytes.
pub const HEADER_SIZE: usize = 8 + 8 + DESCRIPTION_SIZE;

/// Fixed-width integer part of the header.
#[derive(Decode, Encode)]
struct RawHeader {
    version: u64,
    create_time: u64,
}

/// Header at the top of every dictionary file.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct DictionaryHeader {
    version: u64,
    create_time: u64,
    description: String,
}

impl DictionaryHeader {
    /// Creates a header stamped with the current time.
    pub fn new(version: u64, description: &str) -> Self {
        let create_time = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_secs());
        Self {
            version,
            create_time,
            description: description.to_string(),
        }
    }

    /// Gets the version tag.
    #[inline(always)]
    pub const fn version(&self) -> u64 {
        self.version
    }

    /// Gets the creation time in seconds since the Unix epoch.
    #[inline(always)]
    pub const fn create_time(&self) -> u64 {
        self.create_time
    }

    /// Gets the description.
    #[inline(always)]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Checks if the header is of a user dictionary.
    #[inline(always)]
    pub const fn is_user_dictionary(&self) -> bool {
        self.version == USER_DICT_VERSION || self.version == USER_DICT_VERSION_2
    }

    /// Checks if the dictionary has a grammar block.
    #[inline(always)]
    pub const fn has_grammar(&self) -> bool {
        self.version == SYSTEM_DICT_VERSION || self.version == USER_DICT_VERSION_2
    }

    pub(crate) fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < HEADER_SIZE {
            return Err(SudareError::invalid_format(
                "dictionary",
                format!("the data is shorter than the header: {} bytes", data.len()),
            ));
        }
        let (raw, num_bytes): (RawHeader, usize) =
            bincode::decode_from_slice(&data[..HEADER_SIZE], common::bincode_config())?;
        let description = &data[num_bytes..HEADER_SIZE];
        let len = description
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(description.len());
        let description = String::from_utf8_lossy(&description[..len]).into_owned();
        Ok(Self {
            version: raw.version,
            create_time: raw.create_time,
            description,
        })
    }

    pub(crate) fn to_bytes(&self) -> Result<Vec<u8>> {
        let bytes = self.description.as_bytes();
        if bytes.len() > DESCRIPTION_SIZE {
            return Err(SudareError::invalid_argument(
                "description",
                format!("must be at most {DESCRIPTION_SIZE} bytes"),
            ));
        }
        let raw = RawHeader {
            version: self.version,
            create_time: self.create_time,
        };
        let mut data = bincode::encode_to_vec(raw, common::bincode_config())?;
        data.extend_from_slice(bytes);
        data.resize(HEADER_SIZE, 0);
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout() {
        let header = DictionaryHeader::new(SYSTEM_DICT_VERSION, "test");
        let data = header.to_bytes().unwrap();
        assert_eq!(data.len(), HEADER_SIZE);
        assert_eq!(&data[..8], &SYSTEM_DICT_VERSION.to_le_bytes());
        assert_eq!(&data[16..20], b"test");
        assert_eq!(data[20], 0);

        let parsed = DictionaryHeader::parse(&data).unwrap();
        assert_eq!(parsed, header);
        assert!(!parsed.is_user_dictionary());
        assert!(parsed.has_grammar());
    }

    #[test]
    fn test_too_long_description() {
        let header = DictionaryHeader::new(USER_DICT_VERSION, &"a".repeat(257));
        assert!(header.to_bytes().is_err());
    }

    #[test]
    fn test_truncated() {
        assert!(DictionaryHeader::parse(&[0; 100]).is_err());
    }
}
