//! Boyer-Moore-derived matcher over first-order differences.
//!
//! A classic Boyer-Moore search compares characters; this one compares the
//! *differences between neighbouring code units*, so any buffer substring
//! whose internal distances equal the keyword's internal distances is a
//! match, whatever byte values the encoding picked. The keyword is treated
//! as a cyclic sequence: position 0 is constrained against the last
//! position, so every character participates in exactly one difference.
//!
//! Three modes, fixed at construction:
//!
//! - **Simple relative**: no wildcards, uniform ASCII case. One backwards
//!   pass per window plus a wrap-around check.
//! - **Wildcard relative**: the keyword contains wildcards, or mixes ASCII
//!   cases (minority-case letters become wildcards and their true values
//!   are recovered after the match). Differences bridge across wildcard
//!   runs to the previous concrete position, fetched through a precomputed
//!   stride so the hot loop stays branch-free: a zero/all-ones mask zeroes
//!   the difference at wildcard positions instead of testing for them.
//! - **Value scan**: the "keyword" is a literal list of signed integers;
//!   only offsets are reported.
//!
//! The bad-character table is indexed by signed difference: non-positive
//! differences map onto the lower half, positive ones onto the upper half,
//! giving `2 * (T::MAX + 1)` entries. The `+ 1` matters: the value
//! `T::MAX` itself is a valid index.

mod simple;
mod wildcard;

use std::collections::HashMap;
use std::marker::PhantomData;

use crate::code_unit::CodeUnit;
use crate::error::{Error, Result};
use crate::util::{code_points, count_prefix_length, find_last_index, is_ascii_lower, is_ascii_upper};
use crate::{CharType, EquivalencyMap};

/// Which scan algorithm a matcher instance runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatcherMode {
    /// Plain relative differences, no wildcards.
    SimpleRelative,
    /// Differences bridged across wildcard positions.
    WildcardRelative,
    /// Relative differences over a literal value pattern; offsets only.
    ValueScan,
}

/// One hit inside a code-unit buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult<T> {
    /// Offset of the match, in code units from the start of the buffer.
    pub offset: u64,
    /// Recovered character values. Empty for value scans.
    pub values_map: EquivalencyMap<T>,
}

/// A preprocessed relative matcher over code units of type `T`.
///
/// Construction does all the table building; [`search`](Self::search) is
/// read-only afterwards, so one instance can be shared across worker
/// threads by reference.
#[derive(Debug)]
pub struct RelativeMatcher<T: CodeUnit> {
    mode: MatcherMode,
    keyword: Vec<CharType>,
    masked_keyword: Vec<CharType>,
    wildcard: CharType,

    /// Expected difference at each keyword position, wrap-around at 0.
    /// Wildcard positions hold the sentinel 0 and are masked out.
    expected_diff: Vec<i32>,
    /// Bad-character shifts indexed by signed difference.
    skip: Vec<i32>,

    /// All-ones at concrete positions, 0 at wildcards.
    diff_mask: Vec<i32>,
    /// Offset from a position to its bridged predecessor.
    stride: Vec<i32>,
    /// Shift cap applied when the mismatch lands near a wildcard.
    wildcard_skip: Vec<u8>,
    leading_wildcards: usize,
    first_non_wildcard: usize,

    /// Index of the first minority-case letter, when the keyword mixes case.
    opposing_case_index: Option<usize>,
    mostly_lowercase: bool,

    custom_seq: Vec<CharType>,
    seq_index: HashMap<CharType, i32>,

    _unit: PhantomData<T>,
}

impl<T: CodeUnit> RelativeMatcher<T> {
    /// Builds a matcher for a relative keyword search.
    ///
    /// `wildcard` is the character standing for "match anything"; zero
    /// disables wildcard handling. A non-empty `custom_seq` switches
    /// differences from code points to positions in that sequence.
    pub fn relative(keyword: &[CharType], wildcard: CharType, custom_seq: &[CharType]) -> Result<Self> {
        Self::build(keyword.to_vec(), wildcard, custom_seq.to_vec(), false)
    }

    /// Convenience constructor taking the keyword and sequence as strings.
    pub fn relative_str(keyword: &str, wildcard: CharType, custom_seq: &str) -> Result<Self> {
        Self::relative(&code_points(keyword), wildcard, &code_points(custom_seq))
    }

    /// Builds a matcher for a value scan: the pattern is the literal list
    /// of signed integers and matches carry no equivalence map.
    pub fn value_scan(values: &[i16]) -> Result<Self> {
        if values.is_empty() {
            return Err(Error::InvalidArgument(
                "value scan requires at least one reference value".into(),
            ));
        }

        // Negative values wrap into code-point space; differences survive
        // the wrap because they are taken with wrapping subtraction too.
        let derived: Vec<CharType> = values.iter().map(|&v| v as i32 as CharType).collect();
        Self::build(derived, 0, Vec::new(), true)
    }

    /// The mode this instance was constructed in.
    pub fn mode(&self) -> MatcherMode {
        self.mode
    }

    /// Finds every match in `data`, in ascending offset order.
    pub fn search(&self, data: &[T]) -> Vec<MatchResult<T>> {
        match self.mode {
            MatcherMode::SimpleRelative | MatcherMode::ValueScan => simple::scan(self, data),
            MatcherMode::WildcardRelative => wildcard::scan(self, data),
        }
    }

    //--------------------------------------------------------------------------
    // Construction

    fn build(
        keyword: Vec<CharType>,
        wildcard: CharType,
        custom_seq: Vec<CharType>,
        is_value_scan: bool,
    ) -> Result<Self> {
        if keyword.is_empty() {
            return Err(Error::InvalidArgument("keyword must not be empty".into()));
        }

        let mut seq_index = HashMap::with_capacity(custom_seq.len());
        for (i, &c) in custom_seq.iter().enumerate() {
            seq_index.insert(c, i as i32);
        }

        if !custom_seq.is_empty() {
            for &c in &keyword {
                if wildcard != 0 && c == wildcard {
                    continue;
                }
                if !seq_index.contains_key(&c) {
                    return Err(Error::InvalidArgument(format!(
                        "keyword character U+{c:04X} is missing from the custom sequence"
                    )));
                }
            }
        }

        let has_wildcards = wildcard != 0 && keyword.contains(&wildcard);
        let has_case_change = !is_value_scan
            && custom_seq.is_empty()
            && keyword.iter().any(|&c| is_ascii_upper(c))
            && keyword.iter().any(|&c| is_ascii_lower(c));

        let mode = if is_value_scan {
            MatcherMode::ValueScan
        } else if has_wildcards || has_case_change {
            MatcherMode::WildcardRelative
        } else {
            MatcherMode::SimpleRelative
        };

        let mut matcher = RelativeMatcher {
            mode,
            masked_keyword: keyword.clone(),
            keyword,
            wildcard,
            expected_diff: Vec::new(),
            skip: Vec::new(),
            diff_mask: Vec::new(),
            stride: Vec::new(),
            wildcard_skip: Vec::new(),
            leading_wildcards: 0,
            first_non_wildcard: 0,
            opposing_case_index: None,
            mostly_lowercase: false,
            custom_seq,
            seq_index,
            _unit: PhantomData,
        };

        match mode {
            MatcherMode::SimpleRelative | MatcherMode::ValueScan => matcher.preprocess_simple()?,
            MatcherMode::WildcardRelative => matcher.preprocess_wildcard()?,
        }

        Ok(matcher)
    }

    fn preprocess_simple(&mut self) -> Result<()> {
        let k = self.keyword.len();
        self.expected_diff = self.relative_values(&self.keyword);

        self.skip = vec![(k - 1) as i32; 2 * T::CARDINALITY];
        for i in (1..k).rev() {
            let index = self.checked_skip_index(self.expected_diff[i])?;
            // first write wins: the rightmost occurrence sets the shift
            if self.skip[index] == (k - 1) as i32 {
                self.skip[index] = (k - i - 1) as i32;
            }
        }

        Ok(())
    }

    fn preprocess_wildcard(&mut self) -> Result<()> {
        let k = self.keyword.len();

        if self.custom_seq.is_empty() {
            // A mixed-case keyword turns its minority-case letters into
            // wildcards; their values are recovered after a match from the
            // first opposing-case letter.
            let uppers = self.keyword.iter().filter(|&&c| is_ascii_upper(c)).count();
            let lowers = self.keyword.iter().filter(|&&c| is_ascii_lower(c)).count();
            self.mostly_lowercase = lowers > uppers;

            if uppers > 0 && lowers > 0 {
                let minority: fn(CharType) -> bool = if uppers > lowers {
                    is_ascii_lower
                } else {
                    is_ascii_upper
                };
                let opposing: fn(CharType) -> bool = if self.mostly_lowercase {
                    is_ascii_upper
                } else {
                    is_ascii_lower
                };

                let wildcard = self.wildcard;
                for c in &mut self.masked_keyword {
                    if minority(*c) {
                        *c = wildcard;
                    }
                }
                self.opposing_case_index = self.keyword.iter().position(|&c| opposing(c));
            }
        }

        let wildcard = self.wildcard;
        let wildcard_count = self.masked_keyword.iter().filter(|&&c| c == wildcard).count();
        if wildcard_count == k {
            return Err(Error::InvalidArgument(
                "keyword must contain at least one non-wildcard character".into(),
            ));
        }

        self.diff_mask = self
            .masked_keyword
            .iter()
            .map(|&c| if c == wildcard { 0 } else { -1 })
            .collect();
        self.leading_wildcards = count_prefix_length(&self.masked_keyword, &wildcard);
        self.first_non_wildcard = self
            .masked_keyword
            .iter()
            .position(|&c| c != wildcard)
            .unwrap_or(0);

        // Differences over the concrete characters only, then scattered back
        // onto their original positions; wildcard slots keep the 0 sentinel.
        let normalized: Vec<CharType> = self
            .masked_keyword
            .iter()
            .copied()
            .filter(|&c| c != wildcard)
            .collect();
        let normalized_table = self.relative_values(&normalized);

        self.expected_diff = vec![0i32; k];
        let mut source = normalized.len();
        for i in (0..k).rev() {
            if self.masked_keyword[i] != wildcard {
                source -= 1;
                self.expected_diff[i] = normalized_table[source];
            }
        }

        // Strides point each concrete position at its bridged predecessor;
        // the first concrete position wraps to the last one.
        let last_concrete = self
            .masked_keyword
            .iter()
            .rposition(|&c| c != wildcard)
            .unwrap_or(0);
        self.stride = vec![0i32; k];
        let mut previous: Option<usize> = None;
        for i in 0..k {
            if self.masked_keyword[i] == wildcard {
                continue;
            }
            let bridged = previous.unwrap_or(last_concrete);
            self.stride[i] = bridged as i32 - i as i32;
            previous = Some(i);
        }

        self.skip = vec![(k - 1) as i32; 2 * T::CARDINALITY];
        let mut trailing_wildcards = 0i32;
        for i in (1..k).rev() {
            let index = self.checked_skip_index(self.expected_diff[i])?;
            self.skip[index] = k as i32 - trailing_wildcards - i as i32 - 1;
            if self.masked_keyword[i] == wildcard {
                trailing_wildcards += 1;
            }
        }

        self.wildcard_skip = (0..k)
            .map(|i| {
                if self.masked_keyword[i] == wildcard {
                    1
                } else {
                    let last_wildcard = find_last_index(&self.masked_keyword[..i], &wildcard).unwrap_or(0);
                    (i as i32 - last_wildcard as i32 - 1).clamp(1, i32::from(u8::MAX)) as u8
                }
            })
            .collect();

        Ok(())
    }

    /// Relative difference table for `source`, cyclic at position 0. With a
    /// custom sequence the differences are over sequence positions.
    fn relative_values(&self, source: &[CharType]) -> Vec<i32> {
        let len = source.len();
        let mut table = vec![0i32; len];
        if len == 0 {
            return table;
        }

        if self.custom_seq.is_empty() {
            table[0] = source[0].wrapping_sub(source[len - 1]) as i32;
            for i in (1..len).rev() {
                table[i] = source[i].wrapping_sub(source[i - 1]) as i32;
            }
        } else {
            table[0] = self.seq_index[&source[0]] - self.seq_index[&source[len - 1]];
            for i in (1..len).rev() {
                table[i] = self.seq_index[&source[i]] - self.seq_index[&source[i - 1]];
            }
        }

        table
    }

    fn checked_skip_index(&self, diff: i32) -> Result<usize> {
        let index = skip_index(diff, T::CARDINALITY);
        if index >= self.skip.len() {
            return Err(Error::Internal(format!(
                "skip table index {index} out of bounds for difference {diff}"
            )));
        }
        Ok(index)
    }

    //--------------------------------------------------------------------------
    // Equivalence recovery

    /// Derives the character → code-unit map for a match at `pos`.
    fn recover_equivalences(&self, data: &[T], pos: usize) -> EquivalencyMap<T> {
        let mut map = EquivalencyMap::new();
        if self.mode == MatcherMode::ValueScan {
            return map;
        }

        let anchor = self.first_non_wildcard;

        if self.custom_seq.is_empty() {
            let delta = i64::from(data[pos + anchor].widen()) - i64::from(self.masked_keyword[anchor]);

            match self.opposing_case_index {
                None => {
                    map.insert('A' as CharType, T::from_wrapped(i64::from(b'A') + delta));
                    map.insert('a' as CharType, T::from_wrapped(i64::from(b'a') + delta));
                }
                Some(opposing) => {
                    let opposing_delta =
                        i64::from(data[pos + opposing].widen()) - i64::from(self.keyword[opposing]);
                    let (lower, upper) = if self.mostly_lowercase {
                        (delta, opposing_delta)
                    } else {
                        (opposing_delta, delta)
                    };
                    map.insert('A' as CharType, T::from_wrapped(i64::from(b'A') + upper));
                    map.insert('a' as CharType, T::from_wrapped(i64::from(b'a') + lower));
                }
            }
        } else {
            let delta =
                i64::from(data[pos + anchor].widen()) - i64::from(self.seq_index[&self.keyword[anchor]]);
            for &c in &self.custom_seq {
                map.insert(c, T::from_wrapped(i64::from(self.seq_index[&c]) + delta));
            }
        }

        map
    }
}

/// Maps a signed difference onto the bad-character table: non-positive
/// differences occupy the lower half, positive ones the upper half.
fn skip_index(diff: i32, half: usize) -> usize {
    if diff > 0 {
        half + diff as usize
    } else {
        (-diff) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_follows_keyword_shape() {
        let simple = RelativeMatcher::<u8>::relative_str("catch", '*' as u32, "").unwrap();
        assert_eq!(simple.mode(), MatcherMode::SimpleRelative);

        let wildcarded = RelativeMatcher::<u8>::relative_str("b*tter", '*' as u32, "").unwrap();
        assert_eq!(wildcarded.mode(), MatcherMode::WildcardRelative);

        // Mixed ASCII case is handled through the wildcard machinery even
        // without an explicit wildcard in the keyword.
        let mixed = RelativeMatcher::<u8>::relative_str("Butter", '*' as u32, "").unwrap();
        assert_eq!(mixed.mode(), MatcherMode::WildcardRelative);

        let scan = RelativeMatcher::<u8>::value_scan(&[1, 2, 3]).unwrap();
        assert_eq!(scan.mode(), MatcherMode::ValueScan);
    }

    #[test]
    fn empty_patterns_are_rejected() {
        assert!(matches!(
            RelativeMatcher::<u8>::relative(&[], 0, &[]),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            RelativeMatcher::<u8>::value_scan(&[]),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn custom_sequence_must_cover_the_keyword() {
        let seq = code_points("abcde");
        let err = RelativeMatcher::<u8>::relative(&code_points("faded"), 0, &seq);
        assert!(matches!(err, Err(Error::InvalidArgument(_))));

        // Wildcards are exempt from coverage.
        let ok = RelativeMatcher::<u8>::relative(&code_points("d*ed"), '*' as u32, &seq);
        assert!(ok.is_ok());
    }

    #[test]
    fn all_wildcard_keywords_are_rejected() {
        let err = RelativeMatcher::<u8>::relative_str("***", '*' as u32, "");
        assert!(matches!(err, Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn out_of_range_value_diffs_are_an_internal_error() {
        // A difference of 1000 cannot be indexed in a 512-entry 8-bit table.
        let err = RelativeMatcher::<u8>::value_scan(&[0, 1000]);
        assert!(matches!(err, Err(Error::Internal(_))));

        // The same pattern is fine for 16-bit units.
        assert!(RelativeMatcher::<u16>::value_scan(&[0, 1000]).is_ok());
    }

    #[test]
    fn single_character_keywords_terminate() {
        let matcher = RelativeMatcher::<u8>::relative_str("a", 0, "").unwrap();
        let hits = matcher.search(&[5u8, 9, 200]);
        assert_eq!(hits.len(), 3);
    }
}
