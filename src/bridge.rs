//! Convenience reader→writer transcoder (spec §1: "a convenience, not a
//! contract"; SPEC_FULL.md §4.6).
//!
//! Grounded in the same pull-a-token-act-on-it loop the teacher's own
//! `ITokenization` implementations run (`src/tokenization.rs`: call
//! `tokenize`, inspect the returned token, continue until EOF), generalized
//! from "feed a parser" to "feed a writer". Not part of the invariants in
//! spec §8 — best-effort re-serialization, not a guaranteed bijection (e.g.
//! `Comment` tokens are dropped rather than re-emitted, since `Writer` has
//! no comment-writing call).

use crate::error::RdnError;
use crate::reader::strings;
use crate::reader::{ReadOutcome, Reader, Token};
use crate::token::{ContainerKind, TokenKind};
use crate::writer::Writer;

/// Per-depth parity/role tracked purely for the bridge's own bookkeeping —
/// distinct from [`crate::bitstack::BitStack`], which both `Reader` and
/// `Writer` already maintain internally; this one only needs to know
/// "are we about to write a map value, and does a key need a trailing
/// arrow first".
struct Frame {
    kind: ContainerKind,
    map_item_index: u32,
}

/// Pull every token out of `reader` and re-emit it through `writer`.
/// `reader` must already have had all its input `feed`, and `finish()`
/// called; `writer` receives exactly one root value.
pub fn transcode(reader: &mut Reader, writer: &mut Writer) -> Result<(), RdnError> {
    let mut stack: Vec<Frame> = Vec::new();
    loop {
        match reader.read()? {
            ReadOutcome::EndOfInput => return Ok(()),
            ReadOutcome::NeedMoreData => {
                return Err(RdnError::new(
                    crate::error::RdnErrorKind::UnexpectedEndOfData,
                    crate::position::Position::new(0, 0),
                    None,
                ))
            }
            ReadOutcome::Token(token) => emit(reader, writer, &mut stack, &token)?,
        }
    }
}

fn emit(reader: &Reader, writer: &mut Writer, stack: &mut Vec<Frame>, token: &Token) -> Result<(), RdnError> {
    if token.kind == TokenKind::Comment {
        return Ok(());
    }

    if let Some(kind) = start_kind(token.kind) {
        maybe_write_arrow(writer, stack)?;
        match kind {
            ContainerKind::Object => writer.write_start_object()?,
            ContainerKind::Array => writer.write_start_array()?,
            ContainerKind::Set => writer.write_start_set()?,
            ContainerKind::Map => writer.write_start_map()?,
            ContainerKind::Tuple => writer.write_start_tuple()?,
            ContainerKind::Root => unreachable!("start_kind never returns Root"),
        }
        stack.push(Frame { kind, map_item_index: 0 });
        return Ok(());
    }

    if end_kind(token.kind).is_some() {
        let frame = stack.pop().expect("reader guarantees balanced Start/End");
        match frame.kind {
            ContainerKind::Object => writer.write_end_object(),
            ContainerKind::Array => writer.write_end_array(),
            ContainerKind::Set => writer.write_end_set(),
            ContainerKind::Map => writer.write_end_map(),
            ContainerKind::Tuple => writer.write_end_tuple(),
            ContainerKind::Root => unreachable!("end_kind never returns Root"),
        }?;
        advance_map_item(stack);
        return Ok(());
    }

    if token.kind == TokenKind::PropertyName {
        let name = strings::unescape(inner_body(reader, token));
        writer.write_property_name(&name)?;
        return Ok(());
    }

    maybe_write_arrow(writer, stack)?;
    write_scalar(reader, writer, token)?;
    advance_map_item(stack);
    Ok(())
}

/// Before a map's second (value) item in a key/value pair, emit the `=>`
/// the writer's own structural state machine requires.
fn maybe_write_arrow(writer: &mut Writer, stack: &[Frame]) -> Result<(), RdnError> {
    if let Some(frame) = stack.last() {
        if frame.kind == ContainerKind::Map && frame.map_item_index % 2 == 1 {
            writer.write_map_arrow()?;
        }
    }
    Ok(())
}

fn advance_map_item(stack: &mut [Frame]) {
    if let Some(frame) = stack.last_mut() {
        if frame.kind == ContainerKind::Map {
            frame.map_item_index += 1;
        }
    }
}

fn start_kind(kind: TokenKind) -> Option<ContainerKind> {
    match kind {
        TokenKind::StartObject => Some(ContainerKind::Object),
        TokenKind::StartArray => Some(ContainerKind::Array),
        TokenKind::StartSet => Some(ContainerKind::Set),
        TokenKind::StartMap => Some(ContainerKind::Map),
        TokenKind::StartTuple => Some(ContainerKind::Tuple),
        _ => None,
    }
}

fn end_kind(kind: TokenKind) -> Option<ContainerKind> {
    match kind {
        TokenKind::EndObject => Some(ContainerKind::Object),
        TokenKind::EndArray => Some(ContainerKind::Array),
        TokenKind::EndSet => Some(ContainerKind::Set),
        TokenKind::EndMap => Some(ContainerKind::Map),
        TokenKind::EndTuple => Some(ContainerKind::Tuple),
        _ => None,
    }
}

fn inner_body<'a>(reader: &'a Reader, token: &Token) -> &'a [u8] {
    let raw = token.slice(reader);
    &raw[1..raw.len() - 1]
}

fn write_scalar(reader: &Reader, writer: &mut Writer, token: &Token) -> Result<(), RdnError> {
    match token.kind {
        TokenKind::String => writer.write_string_value(&strings::unescape(inner_body(reader, token))),
        TokenKind::True => writer.write_boolean_value(true),
        TokenKind::False => writer.write_boolean_value(false),
        TokenKind::Null => writer.write_null_value(),
        _ => writer.write_raw_value(token.slice(reader)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::ReaderOptions;
    use crate::writer::WriterOptions;

    fn roundtrip(src: &str) -> String {
        let mut reader = Reader::new(ReaderOptions::default());
        reader.feed(src.as_bytes()).unwrap();
        reader.finish();
        let mut writer = Writer::new(WriterOptions::default());
        transcode(&mut reader, &mut writer).unwrap();
        String::from_utf8(writer.finish().unwrap()).unwrap()
    }

    #[test]
    fn transcodes_flat_array() {
        assert_eq!(roundtrip("[1, true, null]"), "[1,true,null]");
    }

    #[test]
    fn transcodes_object() {
        assert_eq!(roundtrip(r#"{"a": 1, "b": "x"}"#), r#"{"a":1,"b":"x"}"#);
    }

    #[test]
    fn transcodes_map_with_arrow() {
        assert_eq!(roundtrip(r#"Map{"a" => 1, "b" => 2}"#), r#"Map{"a" => 1,"b" => 2}"#);
    }

    #[test]
    fn transcodes_nested_sets_and_tuples() {
        assert_eq!(roundtrip("(1, Set{2, 3})"), "(1,Set{2,3})");
    }

    #[test]
    fn drops_comments_when_allowed() {
        let mut reader = Reader::new(ReaderOptions {
            comment_handling: crate::reader::CommentHandling::Allow,
            ..ReaderOptions::default()
        });
        reader.feed(b"[1, // trailing\n 2]").unwrap();
        reader.finish();
        let mut writer = Writer::new(WriterOptions::default());
        transcode(&mut reader, &mut writer).unwrap();
        assert_eq!(String::from_utf8(writer.finish().unwrap()).unwrap(), "[1,2]");
    }
}
