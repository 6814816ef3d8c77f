//! Quoted-span scanning shared by `String`, `PropertyName`, and the body of
//! `RdnBinary` literals (spec §4.2): all three are "text between unescaped
//! double quotes, backslash escapes some bytes, raw control bytes forbidden".

use super::{Advance, AdvanceResult, Reader};
use crate::error::RdnErrorKind;

/// Scan a quoted span starting at `open_quote` (the index of the opening
/// `"`). Returns the offset just past the closing `"` and whether any
/// backslash escape was seen in the span.
pub(crate) fn scan_quoted(reader: &mut Reader, open_quote: usize) -> AdvanceResult<(usize, bool)> {
    let mut i = open_quote + 1;
    let mut escaped = false;
    loop {
        let Some(byte) = reader.buf.get(i).copied() else {
            if reader.finished_feeding {
                return Err(reader.err(RdnErrorKind::UnexpectedEndOfData, i));
            }
            return Ok(Advance::NeedMoreData);
        };
        match byte {
            b'"' => return Ok(Advance::Done((i + 1, escaped))),
            b'\\' => {
                escaped = true;
                match scan_escape(reader, i)? {
                    Advance::Done(next) => i = next,
                    Advance::NeedMoreData => return Ok(Advance::NeedMoreData),
                }
            }
            0x00..=0x1f => {
                return Err(reader.err(RdnErrorKind::InvalidControlCharacter, i));
            }
            _ => i += 1,
        }
    }
}

/// Validate and size one backslash escape starting at `backslash`. Three
/// hex digits followed by end-of-final-input is the one boundary case the
/// spec calls out explicitly: it raises `InvalidStringEscape`, not
/// `UnexpectedEndOfData` (spec §4.2 boundary cases).
fn scan_escape(reader: &mut Reader, backslash: usize) -> AdvanceResult<usize> {
    let Some(marker) = reader.buf.get(backslash + 1).copied() else {
        if reader.finished_feeding {
            return Err(reader.err(RdnErrorKind::UnexpectedEndOfData, backslash));
        }
        return Ok(Advance::NeedMoreData);
    };
    match marker {
        b'"' | b'\\' | b'/' | b'b' | b'f' | b'n' | b'r' | b't' => Ok(Advance::Done(backslash + 2)),
        b'u' => {
            let digits_start = backslash + 2;
            let have = reader.buf.len().saturating_sub(digits_start);
            if have < 4 {
                if reader.finished_feeding {
                    return Err(reader.err(RdnErrorKind::InvalidStringEscape, backslash));
                }
                return Ok(Advance::NeedMoreData);
            }
            for (offset, &d) in reader.buf[digits_start..digits_start + 4].iter().enumerate() {
                if !d.is_ascii_hexdigit() {
                    return Err(reader.err(RdnErrorKind::InvalidHexDigit, digits_start + offset));
                }
            }
            Ok(Advance::Done(digits_start + 4))
        }
        _ => Err(reader.err(RdnErrorKind::InvalidStringEscape, backslash)),
    }
}

/// Decode the content between a string/property-name/binary token's quotes
/// (i.e. `token.slice(reader)[1..len-1]`) into its logical text, resolving
/// backslash escapes. Assumes the body already passed [`scan_quoted`]'s
/// validation, so every escape is well-formed.
pub fn unescape(body: &[u8]) -> String {
    let mut out = String::with_capacity(body.len());
    let mut i = 0;
    while i < body.len() {
        if body[i] != b'\\' {
            let start = i;
            while i < body.len() && body[i] != b'\\' {
                i += 1;
            }
            out.push_str(std::str::from_utf8(&body[start..i]).unwrap_or_default());
            continue;
        }
        match body[i + 1] {
            b'"' => out.push('"'),
            b'\\' => out.push('\\'),
            b'/' => out.push('/'),
            b'b' => out.push('\u{8}'),
            b'f' => out.push('\u{c}'),
            b'n' => out.push('\n'),
            b'r' => out.push('\r'),
            b't' => out.push('\t'),
            b'u' => {
                let hex = std::str::from_utf8(&body[i + 2..i + 6]).unwrap_or("0000");
                let code = u32::from_str_radix(hex, 16).unwrap_or(0);
                out.push(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER));
                i += 6;
                continue;
            }
            _ => {}
        }
        i += 2;
    }
    out
}
