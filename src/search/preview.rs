//! Rendering of the human-readable window around a match.

use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};

use crate::code_unit::{adjust_endianness, decode_units, CodeUnit};
use crate::config::SearchConfig;
use crate::error::Result;
use crate::util::to_utf8;
use crate::{CharType, EquivalencyMap};

/// Reads a window of `preferred_preview_width` code units centred on the
/// match and renders it through the match's equivalence map (relative
/// searches) or as a hex dump (value scans).
pub(crate) fn render_preview<T: CodeUnit>(
    file: &mut File,
    file_size: u64,
    match_offset: u64,
    values_map: &EquivalencyMap<T>,
    config: &SearchConfig,
) -> Result<String> {
    let window_width = config.preferred_preview_width;
    let unit_width = T::WIDTH as i64;

    // Centre the keyword in the window; a keyword wider than the window
    // flips the backup negative and the window starts inside the match.
    let keyword_half = (config.keyword.len() / 2) as i64;
    let window_half = (window_width / 2) as i64;
    let bytes_to_back_up = (window_half - keyword_half) * unit_width;

    let mut start = match_offset as i64 - bytes_to_back_up;
    let end = start + window_width as i64 * unit_width;
    if end > file_size as i64 {
        start -= end - file_size as i64;
    }
    let start = start.max(0) as u64;

    file.seek(SeekFrom::Start(start))?;
    let mut raw = vec![0u8; window_width * T::WIDTH];
    let available = read_up_to(file, &mut raw)?;

    let mut units: Vec<T> = decode_units(&raw[..available], 0);
    adjust_endianness(&mut units, config.endianness);

    if config.is_relative_search {
        Ok(decode_window(values_map, &units, config.custom_char_seq.is_empty()))
    } else {
        Ok(hex_window(&units))
    }
}

/// Substitutes each code unit through the equivalence map. For ASCII
/// searches the single `'a'`/`'A'` entries stand for their whole runs of 26
/// consecutive letters. Units outside the map render as `#`.
fn decode_window<T: CodeUnit>(values_map: &EquivalencyMap<T>, units: &[T], ascii: bool) -> String {
    let mut decoding: HashMap<T, String> = HashMap::with_capacity(values_map.len());

    for (&character, &value) in values_map {
        if ascii && (character == 'a' as CharType || character == 'A' as CharType) {
            for letter in 0..26i64 {
                let unit = T::from_wrapped(value.to_u64() as i64 + letter);
                decoding.insert(unit, to_utf8(character + letter as CharType));
            }
        } else {
            decoding.insert(value, to_utf8(character));
        }
    }

    let mut rendered = String::with_capacity(units.len());
    for unit in units {
        match decoding.get(unit) {
            Some(text) => rendered.push_str(text),
            None => rendered.push('#'),
        }
    }
    rendered
}

fn hex_window<T: CodeUnit>(units: &[T]) -> String {
    units
        .iter()
        .map(|unit| format!("{:0width$X}", unit.to_u64(), width = 2 * T::WIDTH))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Fills as much of `buf` as the file has left, short reads included.
fn read_up_to(file: &mut File, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = file.read(&mut buf[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_entries_expand_to_letter_runs() {
        let mut map = EquivalencyMap::new();
        map.insert('a' as CharType, b'a' + 3);
        map.insert('A' as CharType, b'A' + 3);

        let units: Vec<u8> = "catch".bytes().map(|b| b + 3).chain([0x01]).collect();
        assert_eq!(decode_window(&map, &units, true), "catch#");
    }

    #[test]
    fn custom_sequence_entries_stay_single_characters() {
        let mut map = EquivalencyMap::new();
        map.insert('a' as CharType, 5u8);
        map.insert('b' as CharType, 6u8);

        assert_eq!(decode_window(&map, &[5, 6, 7], false), "ab#");
    }

    #[test]
    fn hex_windows_pad_to_unit_width() {
        assert_eq!(hex_window(&[0x0Au8, 0xFF]), "0A FF");
        assert_eq!(hex_window(&[0x0135u16, 0x0002]), "0135 0002");
    }
}
