//! Property tests for the quantified invariants in spec §8: round-trip
//! minimization, indented idempotence, chunked-feeding equivalence, and
//! rollback safety after `NeedMoreData`.
//!
//! Grounded in the same fuzz-test shape `estuary-flow`'s `doc` crate uses
//! for its own invariants (`crates/doc/tests/shape_fuzz.rs`,
//! `crates/doc/tests/spill_merge_fuzz.rs`): a depth-bounded `Arbitrary`
//! value generator feeding either the `#[quickcheck]` attribute or a
//! manually-sized `QuickCheck::new().gen(Gen::new(n))` harness, placed in
//! `tests/` (an integration-test file, since these properties exercise
//! `reader`, `writer`, and `bridge` together rather than one module).

#[cfg(test)]
extern crate quickcheck;
#[cfg(test)]
#[macro_use(quickcheck)]
extern crate quickcheck_macros;

use quickcheck::{Arbitrary, Gen, QuickCheck};
use rdn::reader::{ReadOutcome, Reader, ReaderOptions};
use rdn::token::TokenKind;
use rdn::writer::{Writer, WriterOptions};

/// Characters that round-trip through `write_string_value` without needing
/// any escape sequence, so these properties exercise structural
/// round-tripping rather than string-escape edge cases (those already have
/// dedicated unit tests in `reader::strings`).
const SAFE_CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789 _.";

#[derive(Clone, Debug)]
enum SampleValue {
    Null,
    Bool(bool),
    Int(i64),
    Str(String),
    Array(Vec<SampleValue>),
    Object(Vec<(String, SampleValue)>),
    Set(Vec<SampleValue>),
    Tuple(Vec<SampleValue>),
}

fn gen_safe_string(g: &mut Gen, max_len: usize) -> String {
    let len = usize::arbitrary(g) % (max_len + 1);
    (0..len)
        .map(|_| SAFE_CHARS[usize::arbitrary(g) % SAFE_CHARS.len()] as char)
        .collect()
}

fn gen_identifier(g: &mut Gen) -> String {
    let s = gen_safe_string(g, 8);
    if s.is_empty() {
        "k".to_string()
    } else {
        s
    }
}

fn gen_children(g: &mut Gen, depth_budget: usize) -> Vec<SampleValue> {
    let count = usize::arbitrary(g) % 4;
    (0..count).map(|_| gen_value(g, depth_budget - 1)).collect()
}

fn gen_value(g: &mut Gen, depth_budget: usize) -> SampleValue {
    let choice = u64::arbitrary(g) % if depth_budget != 0 { 8 } else { 4 };
    match choice {
        0 => SampleValue::Null,
        1 => SampleValue::Bool(bool::arbitrary(g)),
        2 => SampleValue::Int(i64::arbitrary(g) % 1000),
        3 => SampleValue::Str(gen_safe_string(g, 12)),
        4 => SampleValue::Array(gen_children(g, depth_budget)),
        5 => SampleValue::Object(
            gen_children(g, depth_budget)
                .into_iter()
                .map(|v| (gen_identifier(g), v))
                .collect(),
        ),
        6 => SampleValue::Set(gen_children(g, depth_budget)),
        7 => SampleValue::Tuple(gen_children(g, depth_budget)),
        _ => unreachable!(),
    }
}

#[derive(Clone, Debug)]
struct SampleDocument(SampleValue);

impl Arbitrary for SampleDocument {
    fn arbitrary(g: &mut Gen) -> Self {
        Self(gen_value(g, 4))
    }
}

fn write_value(value: &SampleValue, writer: &mut Writer) {
    match value {
        SampleValue::Null => writer.write_null_value().unwrap(),
        SampleValue::Bool(b) => writer.write_boolean_value(*b).unwrap(),
        SampleValue::Int(n) => writer.write_number_value(*n as f64).unwrap(),
        SampleValue::Str(s) => writer.write_string_value(s).unwrap(),
        SampleValue::Array(items) => {
            writer.write_start_array().unwrap();
            items.iter().for_each(|item| write_value(item, writer));
            writer.write_end_array().unwrap();
        }
        SampleValue::Set(items) => {
            writer.write_start_set().unwrap();
            items.iter().for_each(|item| write_value(item, writer));
            writer.write_end_set().unwrap();
        }
        SampleValue::Tuple(items) => {
            writer.write_start_tuple().unwrap();
            items.iter().for_each(|item| write_value(item, writer));
            writer.write_end_tuple().unwrap();
        }
        SampleValue::Object(entries) => {
            writer.write_start_object().unwrap();
            for (key, item) in entries {
                writer.write_property_name(key).unwrap();
                write_value(item, writer);
            }
            writer.write_end_object().unwrap();
        }
    }
}

fn encode(value: &SampleValue, indented: bool) -> Vec<u8> {
    let mut writer = Writer::new(WriterOptions {
        indented,
        ..WriterOptions::default()
    });
    write_value(value, &mut writer);
    writer.finish().unwrap()
}

/// Tokenize a complete, well-formed buffer in one shot, as `(kind, raw
/// bytes)` pairs so two token streams can be compared without borrowing
/// either reader.
fn tokenize(bytes: &[u8]) -> Vec<(TokenKind, Vec<u8>)> {
    let mut reader = Reader::new(ReaderOptions::default());
    reader.feed(bytes).unwrap();
    reader.finish();
    let mut out = Vec::new();
    loop {
        match reader.read().unwrap() {
            ReadOutcome::Token(token) => {
                if token.kind != TokenKind::Comment {
                    out.push((token.kind, token.slice(&reader).to_vec()));
                }
            }
            ReadOutcome::NeedMoreData => break,
            ReadOutcome::EndOfInput => break,
        }
    }
    out
}

#[quickcheck]
fn round_trip_minimized_preserves_token_stream(sample: SampleDocument) -> bool {
    let x = encode(&sample.0, false);
    let mut reader = Reader::new(ReaderOptions::default());
    reader.feed(&x).unwrap();
    reader.finish();
    let mut writer = Writer::new(WriterOptions::default());
    rdn::bridge::transcode(&mut reader, &mut writer).unwrap();
    let y = writer.finish().unwrap();
    tokenize(&x) == tokenize(&y)
}

#[quickcheck]
fn indented_write_is_idempotent_through_a_parse(sample: SampleDocument) -> bool {
    let s1 = encode(&sample.0, true);
    let mut reader = Reader::new(ReaderOptions::default());
    reader.feed(&s1).unwrap();
    reader.finish();
    let mut writer = Writer::new(WriterOptions {
        indented: true,
        ..WriterOptions::default()
    });
    rdn::bridge::transcode(&mut reader, &mut writer).unwrap();
    let s2 = writer.finish().unwrap();
    s1 == s2
}

fn chunked_tokens(chunks: &[&[u8]]) -> Vec<(TokenKind, Vec<u8>)> {
    let mut reader = Reader::new(ReaderOptions::default());
    let mut out = Vec::new();
    for (i, chunk) in chunks.iter().enumerate() {
        reader.feed(chunk).unwrap();
        if i == chunks.len() - 1 {
            reader.finish();
        }
        loop {
            match reader.read().unwrap() {
                ReadOutcome::Token(token) => {
                    if token.kind != TokenKind::Comment {
                        out.push((token.kind, token.slice(&reader).to_vec()));
                    }
                }
                ReadOutcome::NeedMoreData => break,
                ReadOutcome::EndOfInput => return out,
            }
        }
    }
    out
}

fn chunked_feeding_matches_single_buffer(sample: SampleDocument, cut1: u8, cut2: u8) -> bool {
    let whole = encode(&sample.0, false);
    if whole.len() < 2 {
        return true;
    }
    let mut points = [(cut1 as usize) % whole.len(), (cut2 as usize) % whole.len()];
    points.sort_unstable();
    let (a, b) = (points[0], points[1]);
    let chunks: [&[u8]; 3] = [&whole[..a], &whole[a..b], &whole[b..]];

    chunked_tokens(&chunks) == tokenize(&whole)
}

#[test]
fn chunked_feeding_matches_single_buffer_feeding() {
    QuickCheck::new()
        .gen(Gen::new(8))
        .tests(200)
        .quickcheck(chunked_feeding_matches_single_buffer as fn(SampleDocument, u8, u8) -> bool);
}

/// Drain every immediately-available token, returning the call that finally
/// isn't one (`NeedMoreData`, since `finish()` is never called here).
fn drain_to_stop(reader: &mut Reader) -> (usize, ReadOutcome) {
    let mut count = 0;
    loop {
        match reader.read().unwrap() {
            ReadOutcome::Token(_) => count += 1,
            other => return (count, other),
        }
    }
}

fn rollback_after_need_more_data_matches_scratch(sample: SampleDocument, cut: u8) -> bool {
    let whole = encode(&sample.0, false);
    if whole.len() < 2 {
        return true;
    }
    let at = 1 + (cut as usize) % (whole.len() - 1);
    let prefix = &whole[..at];
    let extra = &whole[at..at + 1];

    let mut a = Reader::new(ReaderOptions::default());
    a.feed(prefix).unwrap();
    let (token_count, stop) = drain_to_stop(&mut a);
    if stop != ReadOutcome::NeedMoreData {
        // This prefix boundary didn't straddle a token; nothing to check.
        return true;
    }
    a.feed(extra).unwrap();
    let outcome_a = a.read().unwrap();

    let mut b = Reader::new(ReaderOptions::default());
    b.feed(&whole[..at + 1]).unwrap();
    for _ in 0..token_count {
        match b.read().unwrap() {
            ReadOutcome::Token(_) => {}
            _ => return false,
        }
    }
    let outcome_b = b.read().unwrap();

    outcome_a == outcome_b
}

#[test]
fn rollback_after_need_more_data_matches_feeding_from_scratch() {
    QuickCheck::new()
        .gen(Gen::new(8))
        .tests(200)
        .quickcheck(rollback_after_need_more_data_matches_scratch as fn(SampleDocument, u8) -> bool);
}
