//! Relscan is a relative search engine for binary files.
//!
//! Given a readable keyword and a file of unknown character encoding, it
//! finds every offset at which *some* encoding of that keyword is embedded:
//! any mapping that preserves the relative numerical distances between the
//! keyword's characters. Reverse engineers use this to recover character
//! tables from game ROMs without knowing the byte value of a single
//! character up front.
//!
//! The pipeline has two layers: a Boyer-Moore-derived matcher over
//! first-order differences ([`RelativeMatcher`]), and a parallel engine
//! ([`SearchEngine`]) that streams a file through overlapping blocks,
//! sweeps code-unit alignments, and renders previews around each match.
//!
//! # Examples
//!
//! ```no_run
//! use std::sync::atomic::AtomicBool;
//!
//! use relscan::prelude::*;
//!
//! let config = SearchConfigBuilder::default()
//!     .file_path("game.rom")
//!     .keyword(code_points("MONKEY"))
//!     .build()
//!     .unwrap();
//!
//! let abort = AtomicBool::new(false);
//! let engine: SearchEngine<u8> = SearchEngine::new(config);
//! let results = engine.run(|_, _| {}, &abort, true).unwrap();
//!
//! for result in results {
//!     println!("{:#010x}  {}", result.offset, result.preview);
//! }
//! ```

#![warn(missing_docs)]

#[macro_use]
extern crate log;

use std::collections::BTreeMap;

pub mod code_unit;
pub mod config;
mod error;
pub mod matcher;
pub mod prelude;
pub mod search;
pub mod util;

pub use crate::code_unit::{adjust_endianness, CodeUnit, Endianness};
pub use crate::config::{SearchConfig, SearchConfigBuilder};
pub use crate::error::{Error, Result};
pub use crate::matcher::{MatchResult, MatcherMode, RelativeMatcher};
pub use crate::search::{SearchEngine, SearchResult};

/// The keyword alphabet unit: a 32-bit Unicode code point.
///
/// Kept as a raw `u32` rather than `char` because value-scan patterns are
/// cast into this space with wrap-around and may not be scalar values.
pub type CharType = u32;

/// Maps each character of interest to the code-unit value it takes in a
/// matched substring.
pub type EquivalencyMap<T> = BTreeMap<CharType, T>;

//------------------------------------------------------------------------------
// Progress reporting

/// Phase tag handed to the progress callback alongside a percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStep {
    /// The engine is validating inputs and planning blocks.
    Initializing,
    /// Workers are scanning blocks; reported once per completed block.
    Searching,
    /// All blocks are done and previews are being rendered.
    GeneratingPreviews,
    /// The abort flag was observed; partial results are being discarded.
    Aborting,
}
