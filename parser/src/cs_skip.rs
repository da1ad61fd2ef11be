//! Skipping over source regions the generators never look at
//!
//! Method bodies, accessor blocks, attribute arguments and field
//! initializers are not parsed. They are skipped by a byte scanner that
//! tracks `()`, `[]` and `{}` nesting and steps over comments and every
//! string and character literal form, so a `}` inside `"..."` does not end
//! a block early.
//!
//! The scanner works on bytes. Every byte it stops at is ASCII, so the
//! resulting offsets are always valid `str` boundaries.

use nom::error::ErrorKind;

use crate::cs_parser::PResult;
use crate::syntax_error::fail_at;

/// Skip a region opened by `open` and closed by the matching `close`.
///
/// `input` must start with `open`. Returns the region including both
/// delimiters.
pub fn delimited_region(input: &str, open: u8, close: u8) -> PResult<'_, &str> {
    let bytes = input.as_bytes();
    if bytes.first() != Some(&open) {
        return Err(fail_at(input, ErrorKind::Char));
    }
    match scan_depth(bytes, 1, &[close]) {
        Some(index) => Ok((&input[index + 1..], &input[..index + 1])),
        None => Err(fail_at(input, ErrorKind::TakeUntil)),
    }
}

/// `{ ... }`
pub fn braced_block(input: &str) -> PResult<'_, &str> {
    delimited_region(input, b'{', b'}')
}

/// `( ... )`
pub fn parenthesized(input: &str) -> PResult<'_, &str> {
    delimited_region(input, b'(', b')')
}

/// `[ ... ]`
pub fn bracketed(input: &str) -> PResult<'_, &str> {
    delimited_region(input, b'[', b']')
}

/// Consume input up to (not including) the first byte from `stops` that is
/// outside any bracket, string or comment.
///
/// Fails if a closing bracket is unbalanced before a stop byte is found, or
/// if the input runs out.
pub fn take_until_top_level<'a>(input: &'a str, stops: &[u8]) -> PResult<'a, &'a str> {
    match scan_depth(input.as_bytes(), 0, stops) {
        Some(index) => Ok((&input[index..], &input[..index])),
        None => Err(fail_at(input, ErrorKind::TakeUntil)),
    }
}

/// Split a parameter or argument list body on its top-level commas.
///
/// Generic argument lists (`Dictionary<int, string>`) do not split, as
/// long as their `<` directly follows an identifier.
pub fn split_top_level_commas(text: &str) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut parts = Vec::new();
    let mut angle_depth = 0usize;
    let mut part_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'<' if i > 0 && is_identifier_byte(bytes[i - 1]) => {
                angle_depth += 1;
                i += 1;
            }
            b'>' if angle_depth > 0 => {
                angle_depth -= 1;
                i += 1;
            }
            b',' if angle_depth == 0 => {
                parts.push(&text[part_start..i]);
                i += 1;
                part_start = i;
            }
            b'(' | b'[' | b'{' => {
                let close = match bytes[i] {
                    b'(' => b')',
                    b'[' => b']',
                    _ => b'}',
                };
                i = match scan_depth(bytes, i + 1, &[close]) {
                    Some(index) => index + 1,
                    None => bytes.len(),
                };
            }
            _ => match literal_or_comment_end(bytes, i) {
                Some(end) => i = end,
                None => i += 1,
            },
        }
    }

    let tail = &text[part_start..];
    if !tail.trim().is_empty() || !parts.is_empty() {
        parts.push(tail);
    }
    parts
}

fn is_identifier_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Index of the first byte in `stops` at bracket depth zero, scanning from `from`
fn scan_depth(bytes: &[u8], from: usize, stops: &[u8]) -> Option<usize> {
    let mut depth = 0usize;
    let mut i = from;

    while i < bytes.len() {
        let b = bytes[i];
        if depth == 0 && stops.contains(&b) {
            return Some(i);
        }
        match b {
            b'(' | b'[' | b'{' => {
                depth += 1;
                i += 1;
            }
            b')' | b']' | b'}' => {
                if depth == 0 {
                    return None;
                }
                depth -= 1;
                i += 1;
            }
            b'"' | b'\'' => i = literal_or_comment_end(bytes, i)?,
            _ => match literal_or_comment_end(bytes, i) {
                Some(end) => i = end,
                None => i += 1,
            },
        }
    }
    None
}

/// End of a comment, string or character literal starting at `start`.
///
/// Returns `None` when nothing of the sort starts there, or when the
/// literal is unterminated.
fn literal_or_comment_end(bytes: &[u8], start: usize) -> Option<usize> {
    match bytes[start] {
        b'/' => match bytes.get(start + 1) {
            Some(b'/') => Some(
                bytes[start..]
                    .iter()
                    .position(|&b| b == b'\n')
                    .map_or(bytes.len(), |offset| start + offset + 1),
            ),
            Some(b'*') => find(bytes, start + 2, b"*/").map(|index| index + 2),
            _ => None,
        },
        b'\'' => char_literal_end(bytes, start),
        b'"' | b'@' | b'$' => string_literal_end(bytes, start),
        _ => None,
    }
}

fn find(bytes: &[u8], from: usize, needle: &[u8]) -> Option<usize> {
    if from > bytes.len() {
        return None;
    }
    bytes[from..]
        .windows(needle.len())
        .position(|window| window == needle)
        .map(|offset| from + offset)
}

fn char_literal_end(bytes: &[u8], start: usize) -> Option<usize> {
    let mut i = start + 1;
    if bytes.get(i) == Some(&b'\\') {
        i += 2;
    }
    while i < bytes.len() && bytes[i] != b'\'' && bytes[i] != b'\n' {
        i += 1;
    }
    (bytes.get(i) == Some(&b'\'')).then_some(i + 1)
}

/// Regular, verbatim (`@"..."`), interpolated (`$"..."`) and raw
/// (`"""..."""`) string literals, in any prefix combination.
fn string_literal_end(bytes: &[u8], start: usize) -> Option<usize> {
    let mut i = start;
    let mut verbatim = false;
    let mut interpolated = false;
    while i < bytes.len() && (bytes[i] == b'@' || bytes[i] == b'$') {
        if bytes[i] == b'@' {
            verbatim = true;
        } else {
            interpolated = true;
        }
        i += 1;
    }
    if bytes.get(i) != Some(&b'"') {
        return None;
    }

    let quotes = bytes[i..].iter().take_while(|&&b| b == b'"').count();
    if quotes >= 3 {
        let mut j = i + quotes;
        while j < bytes.len() {
            if bytes[j] == b'"' {
                let run = bytes[j..].iter().take_while(|&&b| b == b'"').count();
                if run >= quotes {
                    return Some(j + run);
                }
                j += run;
            } else {
                j += 1;
            }
        }
        return None;
    }

    let mut j = i + 1;
    while j < bytes.len() {
        match bytes[j] {
            b'\\' if !verbatim => j += 2,
            b'"' if verbatim && bytes.get(j + 1) == Some(&b'"') => j += 2,
            b'"' => return Some(j + 1),
            b'{' if interpolated && bytes.get(j + 1) == Some(&b'{') => j += 2,
            b'{' if interpolated => j = scan_depth(bytes, j + 1, b"}")? + 1,
            b'\n' if !verbatim => return None,
            _ => j += 1,
        }
    }
    None
}
