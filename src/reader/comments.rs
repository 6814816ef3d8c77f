//! `//line` and `/* block */` comment scanning (spec §4.2, §4.5). Disallow
//! vs. Allow vs. Skip is decided by the caller in
//! [`super::Reader::skip_insignificant`]; this module only finds the
//! comment's extent.

use super::{Advance, AdvanceResult, Reader};
use crate::error::RdnErrorKind;

const LINE_SEPARATOR: [u8; 3] = [0xe2, 0x80, 0xa8];
const PARAGRAPH_SEPARATOR: [u8; 3] = [0xe2, 0x80, 0xa9];

/// Scan a comment starting at `start` (the first `/`). Returns the offset
/// just past the comment (the trailing line break, for a line comment, is
/// not included).
pub(crate) fn scan_comment(reader: &mut Reader, start: usize) -> AdvanceResult<usize> {
    match reader.buf.get(start + 1) {
        Some(b'/') => scan_line_comment(reader, start),
        Some(b'*') => scan_block_comment(reader, start),
        _ => unreachable!("caller only invokes scan_comment after seeing '//' or '/*'"),
    }
}

fn scan_line_comment(reader: &mut Reader, start: usize) -> AdvanceResult<usize> {
    let mut i = start + 2;
    loop {
        if reader.buf[i..].starts_with(&LINE_SEPARATOR) || reader.buf[i..].starts_with(&PARAGRAPH_SEPARATOR) {
            return Err(reader.err(RdnErrorKind::UnexpectedLineSeparator, i));
        }
        match reader.buf.get(i).copied() {
            None => {
                if reader.finished_feeding {
                    return Ok(Advance::Done(i));
                }
                return Ok(Advance::NeedMoreData);
            }
            Some(b'\n') | Some(b'\r') => return Ok(Advance::Done(i)),
            Some(_) => i += 1,
        }
    }
}

fn scan_block_comment(reader: &mut Reader, start: usize) -> AdvanceResult<usize> {
    let mut i = start + 2;
    loop {
        match reader.buf.get(i).copied() {
            None => {
                if reader.finished_feeding {
                    return Err(reader.err(RdnErrorKind::UnexpectedEndOfData, start));
                }
                return Ok(Advance::NeedMoreData);
            }
            Some(b'*') if reader.buf.get(i + 1) == Some(&b'/') => {
                return Ok(Advance::Done(i + 2));
            }
            Some(_) => i += 1,
        }
    }
}
