//! Scan loop for the wildcard-relative mode.

use crate::code_unit::CodeUnit;
use crate::matcher::{skip_index, MatchResult, RelativeMatcher};

/// Like the simple scan, but each position's difference is taken against
/// its bridged predecessor (the nearest concrete position before it, with
/// wrap-around) and ANDed with the position mask, so wildcard slots compare
/// 0 against the 0 sentinel and pass without a branch.
pub(super) fn scan<T: CodeUnit>(matcher: &RelativeMatcher<T>, data: &[T]) -> Vec<MatchResult<T>> {
    let mut results = Vec::new();

    let keyword_len = matcher.keyword.len();
    if data.len() < keyword_len {
        return results;
    }

    let half = T::CARDINALITY;
    // A keyword opening with wildcards re-anchors on its first concrete
    // character, which shrinks the safe post-match advance. Never below 1,
    // or an almost-all-wildcard keyword would stall the scan.
    let advance_on_match = (keyword_len - 1 - matcher.leading_wildcards).max(1);
    let mut pos = 0usize;

    while pos + keyword_len <= data.len() {
        let mut mismatch = None;

        for checked in 0..keyword_len {
            let i = keyword_len - checked - 1;
            let bridged = (i as i32 + matcher.stride[i]) as usize;
            let diff = (data[pos + i].widen() - data[pos + bridged].widen()) & matcher.diff_mask[i];
            if diff != matcher.expected_diff[i] {
                mismatch = Some((i, diff));
                break;
            }
        }

        match mismatch {
            None => {
                trace!("wildcard match at unit offset {pos}");
                results.push(MatchResult {
                    offset: pos as u64,
                    values_map: matcher.recover_equivalences(data, pos),
                });
                pos += advance_on_match;
            }
            Some((i, diff)) => {
                let bad_char = matcher.skip[skip_index(diff, half)].max(1);
                pos += bad_char.min(i32::from(matcher.wildcard_skip[i])) as usize;
            }
        }
    }

    results
}
