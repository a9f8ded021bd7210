use std::path::PathBuf;
use std::thread;

use derive_builder::Builder;

use crate::code_unit::Endianness;
use crate::error::{Error, Result};
use crate::CharType;

/// Default base block size in bytes (512 KiB).
pub const DEFAULT_BLOCK_SIZE: u32 = 524_288;

/// Default preview window width in code units.
pub const DEFAULT_PREVIEW_WIDTH: usize = 50;

/// Everything a [`crate::SearchEngine`] needs to know about one search.
///
/// Construct it with [`SearchConfigBuilder`]; unset fields fall back to the
/// defaults below.
///
/// ```
/// use relscan::prelude::*;
///
/// let config = SearchConfigBuilder::default()
///     .file_path("game.rom")
///     .keyword(code_points("MONKEY"))
///     .build()
///     .unwrap();
/// assert!(config.is_relative_search);
/// ```
#[derive(Debug, Clone, Builder)]
#[builder(default, setter(into))]
pub struct SearchConfig {
    /// Path of the binary file to search.
    pub file_path: PathBuf,

    /// `true` searches for `keyword`; `false` runs a value scan over
    /// `reference_values`.
    pub is_relative_search: bool,

    /// Byte order applied to 16-bit reads. Ignored for 8-bit searches.
    pub endianness: Endianness,

    /// The search keyword, as code points. Must be non-empty for a
    /// relative search.
    pub keyword: Vec<CharType>,

    /// Character treated as a wildcard inside `keyword`. Zero disables
    /// wildcard handling.
    pub wildcard: CharType,

    /// Optional user-defined alphabet. When non-empty, keyword differences
    /// are taken over positions in this sequence instead of code points.
    pub custom_char_seq: Vec<CharType>,

    /// The literal value pattern used when `is_relative_search` is false.
    pub reference_values: Vec<i16>,

    /// Upper bound on worker parallelism. Zero lets the pool pick.
    pub preferred_num_threads: usize,

    /// Base block size in bytes. Each block additionally overlaps its
    /// successor by `(keyword_len - 1) * unit_width` bytes.
    pub preferred_search_block_size: u32,

    /// Preview window width in code units.
    pub preferred_preview_width: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            file_path: PathBuf::new(),
            is_relative_search: true,
            endianness: Endianness::Little,
            keyword: Vec::new(),
            wildcard: '*' as CharType,
            custom_char_seq: Vec::new(),
            reference_values: Vec::new(),
            preferred_num_threads: thread::available_parallelism().map(usize::from).unwrap_or(1),
            preferred_search_block_size: DEFAULT_BLOCK_SIZE,
            preferred_preview_width: DEFAULT_PREVIEW_WIDTH,
        }
    }
}

impl SearchConfig {
    /// Length of the pattern being searched for, in code units.
    pub fn pattern_len(&self) -> usize {
        if self.is_relative_search {
            self.keyword.len()
        } else {
            self.reference_values.len()
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.is_relative_search && self.keyword.is_empty() {
            return Err(Error::InvalidArgument(
                "relative search requires a non-empty keyword".into(),
            ));
        }
        if !self.is_relative_search && self.reference_values.is_empty() {
            return Err(Error::InvalidArgument(
                "value scan requires a non-empty reference value list".into(),
            ));
        }
        if self.preferred_search_block_size == 0 {
            return Err(Error::InvalidArgument("block size must be at least 1 byte".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::code_points;

    #[test]
    fn builder_fills_defaults() {
        let config = SearchConfigBuilder::default()
            .file_path("some.rom")
            .keyword(code_points("abc"))
            .build()
            .unwrap();

        assert!(config.is_relative_search);
        assert_eq!(config.endianness, Endianness::Little);
        assert_eq!(config.wildcard, '*' as u32);
        assert_eq!(config.preferred_search_block_size, DEFAULT_BLOCK_SIZE);
        assert_eq!(config.preferred_preview_width, DEFAULT_PREVIEW_WIDTH);
        assert_eq!(config.pattern_len(), 3);
    }

    #[test]
    fn validate_rejects_empty_patterns() {
        let config = SearchConfig::default();
        assert!(matches!(config.validate(), Err(Error::InvalidArgument(_))));

        let config = SearchConfig {
            is_relative_search: false,
            ..SearchConfig::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidArgument(_))));

        let config = SearchConfig {
            keyword: code_points("ok"),
            preferred_search_block_size: 0,
            ..SearchConfig::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidArgument(_))));
    }
}
