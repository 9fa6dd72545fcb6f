// Copyright 2024 Kevin Ludwig
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Six-bit OS/8 file names: encoding, decoding, host-syntax validation, and
//! wildcard pattern matching.
//!
//! A name occupies four 12-bit words: the first three each pack two of the
//! (up to six) name characters, the fourth packs the (up to two) extension
//! characters. Each half packs two six-bit codes per word: upper six bits
//! first, then lower six bits. A zero six-bit code terminates the name (or
//! extension) early; a all-zero fourth word means "no extension".

use crate::{Error, Result};

const SIXBIT_MASK: u16 = 0o77;

/// A decoded six-bit name: four raw directory words.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SixBitName(pub [u16; 4]);

/// A compiled wildcard pattern: `(name[i] XOR match[i]) & mask[i] == 0` for
/// every word `i` means a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pattern {
    pub match_words: [u16; 4],
    pub mask_words: [u16; 4],
}

/// Encodes one character to its six-bit OS/8 code: lowercase it, then if the
/// result is `>= 0x60` (every letter becomes one once lowercased) subtract
/// `0x60`. Digits, already below `0x60`, pass through unchanged.
fn char_to_code(c: char) -> Result<u8> {
    if !c.is_ascii_alphanumeric() {
        return Err(Error::NameSyntax(format!("illegal character '{c}'")));
    }
    let lower = c.to_ascii_lowercase() as u8;
    Ok(if lower >= 0x60 { lower - 0x60 } else { lower })
}

/// Inverse of [`char_to_code`]. `0` is reserved as "end of string" and must
/// be handled by the caller before reaching here.
fn code_to_char(code: u8) -> char {
    debug_assert_ne!(code, 0);
    if code <= 0x1A {
        (b'A' - 1 + code) as char
    } else {
        code as char
    }
}

/// Packs up to `len` (code, mask) pairs, two per word, into `words` words.
/// Positions beyond the supplied codes are packed as `(0, 0o77)`, i.e. "must
/// be absent here", unless zeroed by a wildcard.
fn pack_halves(codes: &[(u8, u16)], words: usize) -> ([u16; 4], [u16; 4]) {
    let mut match_words = [0u16; 4];
    let mut mask_words = [0u16; 4];
    for word in 0..words {
        let (c0, m0) = codes.get(word * 2).copied().unwrap_or((0, SIXBIT_MASK));
        let (c1, m1) = codes
            .get(word * 2 + 1)
            .copied()
            .unwrap_or((0, SIXBIT_MASK));
        match_words[word] = ((c0 as u16) << 6) | c1 as u16;
        mask_words[word] = (m0 << 6) | m1;
    }
    (match_words, mask_words)
}

/// Splits a host name string such as `HELLO.TX` or `A*.T*` into its name and
/// extension halves, rejecting anything the OS/8 name grammar doesn't allow:
/// up to six alphanumeric name characters with an optional trailing `*`,
/// then an optional `.` and up to two extension characters with their own
/// optional trailing `*`.
fn split_name(input: &str) -> Result<(&str, &str)> {
    match input.split_once('.') {
        Some((name, ext)) => Ok((name, ext)),
        None => Ok((input, "")),
    }
}

/// Strips at most one trailing `*`, reporting whether one was present.
fn strip_wildcard(half: &str) -> (&str, bool) {
    match half.strip_suffix('*') {
        Some(rest) => (rest, true),
        None => (half, false),
    }
}

fn encode_half(half: &str, max_len: usize, half_name: &str) -> Result<(Vec<(u8, u16)>, bool)> {
    let (literal, wildcard) = strip_wildcard(half);
    if literal.len() > max_len {
        return Err(Error::NameSyntax(format!(
            "{half_name} half longer than {max_len} characters: {half}"
        )));
    }
    if literal.chars().any(|c| c == '*') {
        return Err(Error::NameSyntax(format!(
            "only a single trailing wildcard is allowed in the {half_name} half"
        )));
    }
    let codes = literal
        .chars()
        .map(|c| char_to_code(c).map(|code| (code, SIXBIT_MASK)))
        .collect::<Result<Vec<_>>>()?;
    Ok((codes, wildcard))
}

/// Validates and normalizes a host-syntax file name, returning the
/// uppercase `(name, extension)` halves with wildcards stripped. Used to
/// build a present directory entry's six-bit name, where wildcards are not
/// allowed.
pub fn validate_filename(input: &str) -> Result<(String, String)> {
    let (name, ext) = split_name(input)?;
    let (name_codes, name_wild) = encode_half(name, 6, "name")?;
    let (ext_codes, ext_wild) = encode_half(ext, 2, "extension")?;
    if name_wild || ext_wild {
        return Err(Error::NameSyntax(format!(
            "wildcards are not allowed in a file name to create: {input}"
        )));
    }
    if name_codes.is_empty() {
        return Err(Error::NameSyntax(format!("empty name: {input}")));
    }
    Ok((
        name_codes.iter().map(|&(c, _)| code_to_char(c)).collect(),
        ext_codes.iter().map(|&(c, _)| code_to_char(c)).collect(),
    ))
}

/// Builds the four-word six-bit encoding of a literal (non-wildcard) file
/// name, for writing a new present directory entry.
pub fn build_sixbit(name: &str, ext: &str) -> Result<SixBitName> {
    let (name_codes, name_wild) = encode_half(name, 6, "name")?;
    let (ext_codes, ext_wild) = encode_half(ext, 2, "extension")?;
    if name_wild || ext_wild || name_codes.is_empty() {
        return Err(Error::NameSyntax(format!("{name}.{ext}")));
    }
    let (mut name_words, _) = pack_halves(&name_codes, 3);
    let (ext_words, _) = pack_halves(&ext_codes, 1);
    name_words[3] = ext_words[0];
    Ok(SixBitName(name_words))
}

/// Compiles a host wildcard pattern such as `A*.T*` into a [`Pattern`].
pub fn build_pattern(input: &str) -> Result<Pattern> {
    let (name, ext) = split_name(input)?;
    let (mut name_codes, name_wild) = encode_half(name, 6, "name")?;
    let (mut ext_codes, ext_wild) = encode_half(ext, 2, "extension")?;
    if name_wild {
        while name_codes.len() < 6 {
            name_codes.push((0, 0));
        }
    }
    if ext_wild {
        while ext_codes.len() < 2 {
            ext_codes.push((0, 0));
        }
    }
    let (name_match, name_mask) = pack_halves(&name_codes, 3);
    let (ext_match, ext_mask) = pack_halves(&ext_codes, 1);
    let mut match_words = name_match;
    match_words[3] = ext_match[0];
    let mut mask_words = name_mask;
    mask_words[3] = ext_mask[0];
    Ok(Pattern {
        match_words,
        mask_words,
    })
}

impl Pattern {
    /// Matches `name` against this pattern: `(name[i] ^ match[i]) & mask[i]
    /// == 0` for every word.
    pub fn matches(&self, name: &SixBitName) -> bool {
        (0..4).all(|i| (name.0[i] ^ self.match_words[i]) & self.mask_words[i] == 0)
    }
}

impl SixBitName {
    /// Decodes this name back to a display string such as `HELLO.TX`, or
    /// just `HELLO` when the extension word is all zero.
    pub fn to_filename(&self) -> String {
        let mut name = String::new();
        'outer: for word in 0..3 {
            for shift in [6, 0] {
                let code = ((self.0[word] >> shift) & SIXBIT_MASK) as u8;
                if code == 0 {
                    break 'outer;
                }
                name.push(code_to_char(code));
            }
        }
        let mut ext = String::new();
        for shift in [6, 0] {
            let code = ((self.0[3] >> shift) & SIXBIT_MASK) as u8;
            if code == 0 {
                break;
            }
            ext.push(code_to_char(code));
        }
        if ext.is_empty() {
            name
        } else {
            format!("{name}.{ext}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_name_with_extension() {
        let six = build_sixbit("hello", "tx").unwrap();
        assert_eq!(six.to_filename(), "HELLO.TX");
    }

    #[test]
    fn round_trips_name_without_extension() {
        let six = build_sixbit("a", "").unwrap();
        assert_eq!(six.to_filename(), "A");
    }

    #[test]
    fn rejects_name_too_long() {
        assert!(build_sixbit("TOOLONGNAME", "X").is_err());
    }

    #[test]
    fn rejects_wildcard_in_literal_name() {
        assert!(build_sixbit("A*", "X").is_err());
    }

    #[test]
    fn pattern_matches_exact_name() {
        let six = build_sixbit("hello", "tx").unwrap();
        let pattern = build_pattern("HELLO.TX").unwrap();
        assert!(pattern.matches(&six));
    }

    #[test]
    fn pattern_rejects_non_matching_name() {
        let six = build_sixbit("hello", "tx").unwrap();
        let pattern = build_pattern("WORLD.TX").unwrap();
        assert!(!pattern.matches(&six));
    }

    #[test]
    fn pattern_with_name_wildcard_matches_any_suffix() {
        let six = build_sixbit("help", "tx").unwrap();
        let pattern = build_pattern("HE*.TX").unwrap();
        assert!(pattern.matches(&six));
    }

    #[test]
    fn pattern_with_extension_wildcard_matches_any_extension() {
        let six = build_sixbit("hello", "tx").unwrap();
        let pattern = build_pattern("HELLO.*").unwrap();
        assert!(pattern.matches(&six));
    }

    #[test]
    fn validate_filename_normalizes_case_and_splits_extension() {
        let (name, ext) = validate_filename("hello.tx").unwrap();
        assert_eq!(name, "HELLO");
        assert_eq!(ext, "TX");
    }

    #[test]
    fn validate_filename_rejects_wildcards() {
        assert!(validate_filename("HE*.TX").is_err());
    }
}
