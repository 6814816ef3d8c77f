//! Number, `n`-suffixed BigInteger, and the bare `NaN`/`Infinity`/
//! `-Infinity` float constants (spec §4.2).

use super::{Advance, Reader};
use crate::error::RdnErrorKind;
use crate::reader::ReadOutcome;
use crate::token::TokenKind;

/// Entry point from [`Reader::read_value`] for bytes `-`, `0`-`9`.
pub(crate) fn scan(reader: &mut Reader, start: usize) -> Result<ReadOutcome, crate::error::RdnError> {
    let mut i = start;
    let negative = reader.buf[i] == b'-';
    if negative {
        i += 1;
        if reader.buf.get(i) == Some(&b'I') {
            return scan_infinity(reader, start, i);
        }
    }

    let Some(first_digit) = reader.buf.get(i).copied() else {
        return pending_or_eof(reader, start, i);
    };
    if !first_digit.is_ascii_digit() {
        if negative {
            return Err(reader.err(RdnErrorKind::InvalidNumber { reason: "expected a digit after '-'" }, i));
        }
        unreachable!("dispatch only calls scan() for '-' or a digit");
    }

    let leading_zero = first_digit == b'0';
    i += 1;
    if leading_zero {
        match reader.buf.get(i) {
            Some(b) if b.is_ascii_digit() => {
                return Err(reader.err(RdnErrorKind::InvalidLeadingZeroInNumber, start));
            }
            None if !reader.finished_feeding => return pending_or_eof(reader, start, i),
            _ => {}
        }
    } else {
        while let Some(b) = reader.buf.get(i) {
            if b.is_ascii_digit() {
                i += 1;
            } else {
                break;
            }
        }
        if i >= reader.buf.len() && !reader.finished_feeding {
            return pending_or_eof(reader, start, i);
        }
    }

    let mut is_float = false;

    if reader.buf.get(i) == Some(&b'.') {
        is_float = true;
        i += 1;
        let frac_start = i;
        while let Some(b) = reader.buf.get(i) {
            if b.is_ascii_digit() {
                i += 1;
            } else {
                break;
            }
        }
        if i == frac_start {
            if i >= reader.buf.len() && !reader.finished_feeding {
                return pending_or_eof(reader, start, i);
            }
            return Err(reader.err(
                RdnErrorKind::InvalidNumber { reason: "expected a digit after '.'" },
                frac_start,
            ));
        }
        if i >= reader.buf.len() && !reader.finished_feeding {
            return pending_or_eof(reader, start, i);
        }
    }

    if matches!(reader.buf.get(i), Some(b'e') | Some(b'E')) {
        is_float = true;
        i += 1;
        if matches!(reader.buf.get(i), Some(b'+') | Some(b'-')) {
            i += 1;
        }
        let exp_start = i;
        while let Some(b) = reader.buf.get(i) {
            if b.is_ascii_digit() {
                i += 1;
            } else {
                break;
            }
        }
        if i == exp_start {
            if i >= reader.buf.len() && !reader.finished_feeding {
                return pending_or_eof(reader, start, i);
            }
            return Err(reader.err(
                RdnErrorKind::InvalidNumber { reason: "expected a digit in exponent" },
                exp_start,
            ));
        }
        if i >= reader.buf.len() && !reader.finished_feeding {
            return pending_or_eof(reader, start, i);
        }
    }

    let mut kind = TokenKind::Number;
    if !is_float && reader.buf.get(i) == Some(&b'n') {
        kind = TokenKind::BigInteger;
        i += 1;
    }

    match reader.peek_byte_after(i) {
        Advance::NeedMoreData => pending_or_eof(reader, start, i),
        Advance::Done(is_terminated) => {
            if !is_terminated {
                return Err(reader.err(
                    RdnErrorKind::InvalidNumber { reason: "unexpected byte after number" },
                    i,
                ));
            }
            reader.pos = i;
            reader.root_seen = true;
            reader.after_value_produced();
            Ok(ReadOutcome::Token(reader.make_token(kind, start, i, false)))
        }
    }
}

fn scan_infinity(reader: &mut Reader, start: usize, i_sign: usize) -> Result<ReadOutcome, crate::error::RdnError> {
    const WORD: &[u8] = b"Infinity";
    let avail = &reader.buf[i_sign..];
    let have = avail.len().min(WORD.len());
    if avail[..have] != WORD[..have] {
        return Err(reader.err(RdnErrorKind::InvalidNumber { reason: "expected Infinity" }, i_sign));
    }
    if have < WORD.len() {
        return pending_or_eof(reader, start, i_sign);
    }
    let end = i_sign + WORD.len();
    match reader.peek_byte_after(end) {
        Advance::NeedMoreData => pending_or_eof(reader, start, end),
        Advance::Done(true) => {
            reader.pos = end;
            reader.root_seen = true;
            reader.after_value_produced();
            Ok(ReadOutcome::Token(reader.make_token(TokenKind::Number, start, end, false)))
        }
        Advance::Done(false) => Err(reader.err(
            RdnErrorKind::InvalidNumber { reason: "unexpected byte after Infinity" },
            end,
        )),
    }
}

fn pending_or_eof(reader: &mut Reader, start: usize, _partial_end: usize) -> Result<ReadOutcome, crate::error::RdnError> {
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
    fn plain_integer() {
        let (kind, _, end) = one_token(b"42").unwrap();
        assert_eq!(kind, TokenKind::Number);
        assert_eq!(end, 2);
    }

    #[test]
    fn leading_zero_rejected() {
        let err = one_token(b"007").unwrap_err();
        assert_eq!(err.kind, RdnErrorKind::InvalidLeadingZeroInNumber);
    }

    #[test]
    fn zero_alone_is_fine() {
        let (kind, ..) = one_token(b"0").unwrap();
        assert_eq!(kind, TokenKind::Number);
    }

    #[test]
    fn float_with_exponent() {
        let (kind, _, end) = one_token(b"-1.5e10").unwrap();
        assert_eq!(kind, TokenKind::Number);
        assert_eq!(end, 7);
    }

    #[test]
    fn big_integer_suffix() {
        let (kind, ..) = one_token(b"123456789012345678901234567890n").unwrap();
        assert_eq!(kind, TokenKind::BigInteger);
    }

    #[test]
    fn negative_infinity() {
        let (kind, _, end) = one_token(b"-Infinity").unwrap();
        assert_eq!(kind, TokenKind::Number);
        assert_eq!(end, 9);
    }

    #[test]
    fn trailing_garbage_rejected() {
        let err = one_token(b"12abc").unwrap_err();
        assert!(matches!(err.kind, RdnErrorKind::InvalidNumber { .. }));
    }

    #[test]
    fn missing_exponent_digits_rejected() {
        let err = one_token(b"1e").unwrap_err();
        assert!(matches!(err.kind, RdnErrorKind::InvalidNumber { .. }));
    }
}
