//! Convenience re-exports for callers who want everything in scope.
//!
//! ```
//! use relscan::prelude::*;
//! ```

pub use crate::code_unit::{adjust_endianness, CodeUnit, Endianness};
pub use crate::config::{SearchConfig, SearchConfigBuilder};
pub use crate::matcher::{MatchResult, MatcherMode, RelativeMatcher};
pub use crate::search::{SearchEngine, SearchResult};
pub use crate::util::code_points;
pub use crate::{CharType, EquivalencyMap, Error, Result, SearchStep};
