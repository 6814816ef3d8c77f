//! Decoders for the body of an `RdnBinary` token (spec §4.2, §4.5):
//! `b"…"` is base64, `x"…"` is hex. The reader tokenizes both the same way
//! as a quoted string ([`super::strings::scan_quoted`]); decoding the body
//! into bytes is deferred to whoever actually wants the value, the same
//! split the writer/reader maintain for numbers and temporals.

use crate::error::{RdnError, RdnErrorKind};
use crate::position::Position;
use crate::tables;

/// Decode a `RdnBinary` token body (the bytes between the quotes, with
/// string escapes already resolved by the caller). `is_hex` distinguishes
/// `x"…"` from `b"…"` the same way [`crate::reader::Token::value_is_escaped`]
/// is repurposed for this token kind.
pub fn decode(body: &[u8], is_hex: bool, at: Position) -> Result<Vec<u8>, RdnError> {
    if is_hex {
        tables::decode_hex(body)
            .ok_or_else(|| RdnError::new(RdnErrorKind::InvalidHexDigit, at, None))
    } else {
        base64::decode(body).map_err(|_| RdnError::new(RdnErrorKind::InvalidHexDigit, at, None))
    }
}

pub fn encode(bytes: &[u8], as_hex: bool) -> String {
    if as_hex {
        tables::encode_hex(bytes)
    } else {
        base64::encode(bytes)
    }
}
