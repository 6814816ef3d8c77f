//! `@`-prefixed temporal literals: date/time, time-only, duration, and bare
//! unix timestamps (spec §4.2, §4.5).

use super::{Advance, Reader};
use crate::error::RdnErrorKind;
use crate::reader::ReadOutcome;
use crate::tables;
use crate::token::TokenKind;

pub(crate) fn scan(reader: &mut Reader, start: usize) -> Result<ReadOutcome, crate::error::RdnError> {
    let body_start = start + 1;
    let Some(first) = reader.buf.get(body_start).copied() else {
        return pending_or_eof(reader, start);
    };

    if first == b'P' {
        return scan_duration(reader, start, body_start);
    }
    if first.is_ascii_digit() {
        return scan_date_time_or_timestamp(reader, start, body_start);
    }
    Err(reader.err(RdnErrorKind::InvalidDateTime, body_start))
}

/// Scan while `valid` holds. Returns `Some(end)` once a non-matching byte
/// (or, at final input, the end of the buffer) is found; `None` means more
/// bytes are needed before the run's extent is known.
fn scan_run(reader: &Reader, from: usize, valid: impl Fn(u8) -> bool) -> Option<usize> {
    let mut i = from;
    while let Some(b) = reader.buf.get(i) {
        if valid(*b) {
            i += 1;
        } else {
            return Some(i);
        }
    }
    if reader.finished_feeding {
        Some(i)
    } else {
        None
    }
}

fn scan_duration(reader: &mut Reader, start: usize, body_start: usize) -> Result<ReadOutcome, crate::error::RdnError> {
    let end = match scan_run(reader, body_start, |b| {
        b.is_ascii_digit() || b == b'.' || tables::is_duration_designator(b)
    }) {
        Some(end) => end,
        None => return pending_or_eof(reader, start),
    };
    let body = std::str::from_utf8(&reader.buf[body_start..end])
        .map_err(|_| reader.err(RdnErrorKind::InvalidUtf8, body_start))?;
    if tables::parse_iso_duration(body).is_none() {
        return Err(reader.err(RdnErrorKind::InvalidDuration, start));
    }
    finish(reader, start, end, TokenKind::RdnDuration)
}

fn scan_date_time_or_timestamp(
    reader: &mut Reader,
    start: usize,
    body_start: usize,
) -> Result<ReadOutcome, crate::error::RdnError> {
    // Need at least two more bytes to disambiguate: `HH:` (time-only),
    // `YYYY-` (date-time), or plain digits (unix timestamp).
    let probe_len = 5usize;
    let have = reader.buf.len().saturating_sub(body_start).min(probe_len);
    if have < probe_len && !reader.finished_feeding {
        return pending_or_eof(reader, start);
    }

    let looks_like_time = reader.buf.get(body_start + 2) == Some(&b':');
    let looks_like_date = reader.buf.get(body_start + 4) == Some(&b'-');

    if looks_like_time {
        return scan_time_only(reader, start, body_start);
    }
    if looks_like_date {
        return scan_full_date_time(reader, start, body_start);
    }
    scan_unix_timestamp(reader, start, body_start)
}

fn scan_time_only(reader: &mut Reader, start: usize, body_start: usize) -> Result<ReadOutcome, crate::error::RdnError> {
    let end = match scan_run(reader, body_start, |b| b.is_ascii_digit() || b == b':' || b == b'.') {
        Some(end) => end,
        None => return pending_or_eof(reader, start),
    };
    let body = std::str::from_utf8(&reader.buf[body_start..end])
        .map_err(|_| reader.err(RdnErrorKind::InvalidUtf8, body_start))?;
    if tables::parse_iso_time_only(body).is_none() {
        return Err(reader.err(RdnErrorKind::InvalidDateTime, start));
    }
    finish(reader, start, end, TokenKind::RdnTimeOnly)
}

fn scan_full_date_time(reader: &mut Reader, start: usize, body_start: usize) -> Result<ReadOutcome, crate::error::RdnError> {
    let end = match scan_run(reader, body_start, |b| {
        b.is_ascii_digit() || matches!(b, b'-' | b':' | b'.' | b'T' | b'Z' | b'+')
    }) {
        Some(end) => end,
        None => return pending_or_eof(reader, start),
    };
    let body = std::str::from_utf8(&reader.buf[body_start..end])
        .map_err(|_| reader.err(RdnErrorKind::InvalidUtf8, body_start))?;
    if tables::parse_iso_datetime(body).is_none() {
        return Err(reader.err(RdnErrorKind::InvalidDateTime, start));
    }
    finish(reader, start, end, TokenKind::RdnDateTime)
}

/// Bare digit run: 10 digits or fewer is seconds-precision, 11-13 is
/// milliseconds-precision (spec §9 Open Question resolution recorded in
/// `SPEC_FULL.md`).
fn scan_unix_timestamp(reader: &mut Reader, start: usize, body_start: usize) -> Result<ReadOutcome, crate::error::RdnError> {
    let end = match scan_run(reader, body_start, |b| b.is_ascii_digit()) {
        Some(end) => end,
        None => return pending_or_eof(reader, start),
    };
    let len = end - body_start;
    if len == 0 || len > 13 {
        return Err(reader.err(RdnErrorKind::InvalidDateTime, start));
    }
    finish(reader, start, end, TokenKind::RdnDateTime)
}

fn finish(reader: &mut Reader, start: usize, end: usize, kind: TokenKind) -> Result<ReadOutcome, crate::error::RdnError> {
    match reader.peek_byte_after(end) {
        Advance::NeedMoreData => pending_or_eof(reader, start),
        Advance::Done(true) => {
            reader.pos = end;
            reader.root_seen = true;
            reader.after_value_produced();
            Ok(ReadOutcome::Token(reader.make_token(kind, start, end, false)))
        }
        Advance::Done(false) => Err(reader.err(RdnErrorKind::InvalidDateTime, end)),
    }
}

fn pending_or_eof(reader: &mut Reader, start: usize) -> Result<ReadOutcome, crate::error::RdnError> {
    if reader.finished_feeding {
        return Err(reader.err(RdnErrorKind::UnexpectedEndOfData, start));
    }
    reader.pos = start;
    Ok(ReadOutcome::NeedMoreData)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::ReaderOptions;

    fn one_token(input: &[u8]) -> Result<(TokenKind, usize, usize), crate::error::RdnError> {
        let mut reader = Reader::new(ReaderOptions::default());
        reader.feed(input).unwrap();
        reader.finish();
        match reader.read()? {
            ReadOutcome::Token(t) => Ok((t.kind, t.start, t.end)),
            other => panic!("expected a token, got {other:?}"),
        }
    }

    #[test]
    fn date_only() {
        let (kind, ..) = one_token(b"@2023-04-05").unwrap();
        assert_eq!(kind, TokenKind::RdnDateTime);
    }

    #[test]
    fn time_only() {
        let (kind, ..) = one_token(b"@12:30:00").unwrap();
        assert_eq!(kind, TokenKind::RdnTimeOnly);
    }

    #[test]
    fn duration() {
        let (kind, ..) = one_token(b"@P1Y2M3D").unwrap();
        assert_eq!(kind, TokenKind::RdnDuration);
    }

    #[test]
    fn unix_seconds_timestamp() {
        let (kind, _, end) = one_token(b"@1700000000").unwrap();
        assert_eq!(kind, TokenKind::RdnDateTime);
        assert_eq!(end, 11);
    }

    #[test]
    fn unix_millis_timestamp() {
        let (kind, ..) = one_token(b"@1700000000123").unwrap();
        assert_eq!(kind, TokenKind::RdnDateTime);
    }

    #[test]
    fn empty_duration_rejected() {
        let err = one_token(b"@P").unwrap_err();
        assert_eq!(err.kind, RdnErrorKind::InvalidDuration);
    }

    #[test]
    fn bad_date_rejected() {
        let err = one_token(b"@2023-99-05").unwrap_err();
        assert_eq!(err.kind, RdnErrorKind::InvalidDateTime);
    }
}
