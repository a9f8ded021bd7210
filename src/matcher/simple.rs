//! Scan loop for the simple-relative and value-scan modes.

use crate::code_unit::CodeUnit;
use crate::matcher::{skip_index, MatchResult, RelativeMatcher};

/// Slides a window of keyword length across `data`, comparing neighbouring
/// differences backwards and finishing with the wrap-around check between
/// the first and last window positions.
pub(super) fn scan<T: CodeUnit>(matcher: &RelativeMatcher<T>, data: &[T]) -> Vec<MatchResult<T>> {
    let mut results = Vec::new();

    let keyword_len = matcher.keyword.len();
    if data.len() < keyword_len {
        return results;
    }

    let half = T::CARDINALITY;
    let mut pos = 0usize;

    while pos + keyword_len <= data.len() {
        let mut mismatched_diff = None;

        for i in (1..keyword_len).rev() {
            let diff = data[pos + i].widen() - data[pos + i - 1].widen();
            if diff != matcher.expected_diff[i] {
                mismatched_diff = Some(diff);
                break;
            }
        }

        if mismatched_diff.is_none() {
            let diff = data[pos].widen() - data[pos + keyword_len - 1].widen();
            if diff != matcher.expected_diff[0] {
                mismatched_diff = Some(diff);
            }
        }

        match mismatched_diff {
            None => {
                trace!("relative match at unit offset {pos}");
                results.push(MatchResult {
                    offset: pos as u64,
                    values_map: matcher.recover_equivalences(data, pos),
                });
                pos += (keyword_len - 1).max(1);
            }
            Some(diff) => {
                pos += matcher.skip[skip_index(diff, half)].max(1) as usize;
            }
        }
    }

    results
}
