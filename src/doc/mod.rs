//! Random-access document index (spec §3 `Document`, §4.4).
//!
//! A [`Document`] is built in one pass by driving [`crate::reader::Reader`]
//! over the whole input and recording one [`row::DbRow`] per token into a
//! flat, append-only table. After that single pass the document never
//! re-parses: every navigation (`nth_child`, `end_row`, typed value access)
//! is table lookups and, at most, a bounded decode of one scalar's raw
//! bytes. This is the same "index once, read many times without
//! re-lexing" split the teacher's own `Code` / line-break cache makes for
//! position lookups (`src/util/position.rs` here, `Code::obtain_position`
//! in the teacher), generalized from "line starts" to "every token".

mod row;

use crate::error::{RdnError, RdnErrorKind};
use crate::position::Position;
use crate::reader::{ReadOutcome, Reader, ReaderOptions, Token};
use crate::reader::{binary, strings};
use crate::tables::{self, IsoDateTime, IsoDuration};
use crate::token::TokenKind;
use crate::writer::Writer;
use num_bigint::BigInt;
use std::collections::HashSet;

pub use row::{DbRow, UNKNOWN_SIZE};

/// A parsed, typed value recovered from a row. Extraction happens on
/// demand (spec §3: "lazy typed value extraction without re-parsing"); this
/// type is the result of that extraction, not a node in a persistent tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Number(Number),
    BigInteger(BigInt),
    String(String),
    DateTime(IsoDateTime),
    TimeOnly(u8, u8, u8, u32),
    UnixTimestamp(i64),
    Duration(IsoDuration),
    Regex { pattern: String, flags: String },
    Binary(Vec<u8>),
}

/// Mirrors the numeric-type split `estuary-flow/crates/json/src/number.rs`
/// uses for its own JSON `Number`: a lossless unsigned/signed fast path plus
/// a float fallback, rather than always widening to `f64`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Unsigned(u64),
    Signed(i64),
    Float(f64),
}

struct BuildFrame {
    row_index: usize,
    direct_child_count: u32,
}

/// The in-memory representation of one parsed RDN document: the original
/// UTF-8 source bytes plus the metadata row table built over them.
pub struct Document {
    source: Vec<u8>,
    rows: Vec<DbRow>,
}

impl Drop for Document {
    fn drop(&mut self) {
        crate::pool::release(std::mem::take(&mut self.source));
    }
}

impl Document {
    /// Parse `source` in one pass, building the full metadata table.
    /// `options` governs the same reader tunables as a streaming parse
    /// (`max_depth`, comment handling, trailing commas); `allow_multiple_values`
    /// is ignored here — a `Document` indexes exactly one root value.
    pub fn parse(source: &[u8], mut options: ReaderOptions) -> Result<Document, RdnError> {
        options.allow_multiple_values = false;
        let mut reader = Reader::new(options);
        reader.feed(source)?;
        reader.finish();

        let mut rows: Vec<DbRow> = Vec::new();
        let mut stack: Vec<BuildFrame> = Vec::new();

        loop {
            match reader.read()? {
                ReadOutcome::EndOfInput => break,
                ReadOutcome::NeedMoreData => {
                    return Err(RdnError::new(
                        RdnErrorKind::UnexpectedEndOfData,
                        Position::new(0, 0),
                        None,
                    ))
                }
                ReadOutcome::Token(token) => {
                    if token.kind == TokenKind::Comment {
                        // Comments aren't part of the value tree; they are
                        // neither indexed nor counted as a direct child.
                        continue;
                    }
                    if token.kind.is_end() {
                        Self::close_row(&mut rows, &mut stack, &token);
                    } else {
                        Self::open_row(&mut rows, &mut stack, &token);
                    }
                }
            }
        }

        let mut owned_source = crate::pool::rent(source.len());
        owned_source.extend_from_slice(source);

        Ok(Document {
            source: owned_source,
            rows,
        })
    }

    /// Release this document's backing buffer back to the shared byte pool
    /// ahead of the normal [`Drop`]. Rust's ownership rules already make
    /// use-after-dispose a compile error (`self` is consumed), which is a
    /// stronger guarantee than a runtime check, so unlike the reader's
    /// "feed after finish" misuse there is no [`RdnErrorKind::AlreadyDisposed`]
    /// path here — there is nothing left to call it on.
    pub fn dispose(self) {
        drop(self);
    }

    fn note_child(stack: &mut [BuildFrame]) {
        if let Some(top) = stack.last_mut() {
            top.direct_child_count += 1;
        }
    }

    fn open_row(rows: &mut Vec<DbRow>, stack: &mut Vec<BuildFrame>, token: &Token) {
        Self::note_child(stack);
        let row_index = rows.len();
        let location = token.start as u32;
        if token.kind.is_start() {
            rows.push(DbRow::new(location, UNKNOWN_SIZE, 0, token.kind));
            stack.push(BuildFrame {
                row_index,
                direct_child_count: 0,
            });
        } else {
            let length = (token.end - token.start) as i32;
            rows.push(DbRow::new(location, length, 1, token.kind));
        }
    }

    fn close_row(rows: &mut Vec<DbRow>, stack: &mut Vec<BuildFrame>, token: &Token) {
        let frame = stack.pop().expect("reader guarantees balanced Start/End");
        let rows_since_start = (rows.len() - frame.row_index) as u32;
        let simple = rows_since_start == frame.direct_child_count + 1;
        let number_of_rows = rows_since_start + 1;

        let start_row = &mut rows[frame.row_index];
        start_row.size_or_length = frame.direct_child_count as i32;
        start_row.set_number_of_rows(number_of_rows);
        start_row.set_has_complex_children(!simple);

        rows.push(DbRow::new(token.start as u32, 0, 1, token.kind));
    }

    /// Row index of the single root value.
    pub fn root(&self) -> usize {
        0
    }

    pub fn row(&self, index: usize) -> DbRow {
        self.rows[index]
    }

    pub fn kind(&self, index: usize) -> TokenKind {
        self.rows[index].token_type()
    }

    /// Number of direct children of a container row (0 for a scalar).
    pub fn direct_child_count(&self, index: usize) -> usize {
        let row = self.rows[index];
        if row.token_type().is_start() {
            row.size_or_length.max(0) as usize
        } else {
            0
        }
    }

    /// Row index of this container's matching end row (itself, for a scalar).
    pub fn end_row(&self, index: usize) -> usize {
        index + self.rows[index].number_of_rows() as usize - 1
    }

    /// Row index of the `n`-th direct child of a container row.
    pub fn nth_child(&self, index: usize, n: usize) -> Option<usize> {
        let row = self.rows[index];
        if !row.token_type().is_start() || n >= self.direct_child_count(index) {
            return None;
        }
        if !row.has_complex_children() {
            return Some(index + 1 + n);
        }
        let mut cursor = index + 1;
        for _ in 0..n {
            cursor = self.end_row(cursor) + 1;
        }
        Some(cursor)
    }

    /// Row index of `property_name_index`'s value, always the immediately
    /// following row (spec §4.4 "Random access").
    pub fn property_value(&self, property_name_index: usize) -> usize {
        debug_assert_eq!(self.kind(property_name_index), TokenKind::PropertyName);
        property_name_index + 1
    }

    fn byte_end(&self, index: usize) -> usize {
        let row = self.rows[index];
        if row.token_type().is_start() {
            let end = self.rows[self.end_row(index)];
            end.location as usize + 1
        } else {
            row.location as usize + row.size_or_length.max(0) as usize
        }
    }

    /// The exact source bytes this row's token (or, for a container, its
    /// whole subtree) spans — quotes, brackets, and all (spec §4.4 "Raw
    /// bytes").
    pub fn raw_value(&self, index: usize) -> &[u8] {
        let start = self.rows[index].location as usize;
        &self.source[start..self.byte_end(index)]
    }

    fn inner_body(&self, index: usize) -> &[u8] {
        let raw = self.raw_value(index);
        &raw[1..raw.len() - 1]
    }

    fn err(&self, kind: RdnErrorKind, index: usize) -> RdnError {
        RdnError::new(kind, Position::new(0, 0), Some(self.rows[index].location as usize))
    }

    fn as_text(&self, index: usize) -> Result<&str, RdnError> {
        std::str::from_utf8(self.inner_body(index)).map_err(|_| self.err(RdnErrorKind::InvalidUtf8, index))
    }

    /// Unescape a `String`/`PropertyName` row's quoted body.
    pub fn as_str(&self, index: usize) -> Result<String, RdnError> {
        debug_assert!(matches!(
            self.kind(index),
            TokenKind::String | TokenKind::PropertyName
        ));
        Ok(strings::unescape(self.inner_body(index)))
    }

    pub fn as_number(&self, index: usize) -> Result<Number, RdnError> {
        let text = std::str::from_utf8(self.raw_value(index)).map_err(|_| self.err(RdnErrorKind::InvalidUtf8, index))?;
        if text == "NaN" {
            return Ok(Number::Float(f64::NAN));
        }
        if text == "Infinity" {
            return Ok(Number::Float(f64::INFINITY));
        }
        if text == "-Infinity" {
            return Ok(Number::Float(f64::NEG_INFINITY));
        }
        if !text.contains('.') && !text.contains(['e', 'E']) {
            if let Ok(u) = text.parse::<u64>() {
                return Ok(Number::Unsigned(u));
            }
            if let Ok(s) = text.parse::<i64>() {
                return Ok(Number::Signed(s));
            }
        }
        text.parse::<f64>()
            .map(Number::Float)
            .map_err(|_| self.err(RdnErrorKind::InvalidNumber { reason: "unparsable numeric literal" }, index))
    }

    pub fn as_big_integer(&self, index: usize) -> Result<BigInt, RdnError> {
        let raw = self.raw_value(index);
        let digits = std::str::from_utf8(&raw[..raw.len() - 1]) // drop trailing 'n'
            .map_err(|_| self.err(RdnErrorKind::InvalidUtf8, index))?;
        digits
            .parse::<BigInt>()
            .map_err(|_| self.err(RdnErrorKind::InvalidNumber { reason: "unparsable BigInteger literal" }, index))
    }

    pub fn as_date_time(&self, index: usize) -> Result<Value, RdnError> {
        let text = self.as_text(index)?;
        if text.bytes().all(|b| b.is_ascii_digit()) {
            let value: i64 = text
                .parse()
                .map_err(|_| self.err(RdnErrorKind::InvalidDateTime, index))?;
            return Ok(Value::UnixTimestamp(value));
        }
        tables::parse_iso_datetime(text)
            .map(Value::DateTime)
            .ok_or_else(|| self.err(RdnErrorKind::InvalidDateTime, index))
    }

    pub fn as_time_only(&self, index: usize) -> Result<(u8, u8, u8, u32), RdnError> {
        let text = self.as_text(index)?;
        tables::parse_iso_time_only(text).ok_or_else(|| self.err(RdnErrorKind::InvalidDateTime, index))
    }

    pub fn as_duration(&self, index: usize) -> Result<IsoDuration, RdnError> {
        let text = self.as_text(index)?;
        tables::parse_iso_duration(text).ok_or_else(|| self.err(RdnErrorKind::InvalidDuration, index))
    }

    /// Split a `RdnRegExp` row's `pattern/flags` span on its *last* `/`
    /// (spec §4.2: "splitting is done by the accessor via the last `/`").
    pub fn as_regex(&self, index: usize) -> Result<(&str, &str), RdnError> {
        let text = self.as_text(index)?;
        let slash = text
            .rfind('/')
            .ok_or_else(|| self.err(RdnErrorKind::InvalidRegex, index))?;
        Ok((&text[..slash], &text[slash + 1..]))
    }

    /// Decode a `RdnBinary` row. Base64-vs-hex is recovered from the raw
    /// prefix byte (`b` or `x`) rather than a packed flag: `DbRow`'s 32 bits
    /// are already fully spent on `number_of_rows`/`token_type`/
    /// `has_complex_children` (spec §3 `DbRow`), so base64-vs-hex rides on
    /// the bytes already on disk instead of costing the row table a 13th
    /// byte.
    pub fn as_binary(&self, index: usize) -> Result<Vec<u8>, RdnError> {
        let raw = self.raw_value(index);
        let is_hex = raw[0] == b'x';
        let body = &raw[2..raw.len() - 1];
        binary::decode(body, is_hex, self.position_of(index))
            .map_err(|_| self.err(RdnErrorKind::InvalidHexDigit, index))
    }

    fn position_of(&self, _index: usize) -> Position {
        Position::new(0, 0)
    }

    /// Find the `n`-th direct `PropertyName` child of an object row and
    /// return its value's row index.
    pub fn get_property(&self, object_index: usize, name: &str) -> Result<Option<usize>, RdnError> {
        debug_assert_eq!(self.kind(object_index), TokenKind::StartObject);
        let count = self.direct_child_count(object_index);
        let mut i = 0;
        while i < count {
            let child = self.nth_child(object_index, i).expect("i < count");
            if self.kind(child) == TokenKind::PropertyName && self.as_str(child)? == name {
                return Ok(Some(self.property_value(child)));
            }
            i += 1;
        }
        Ok(None)
    }

    /// DFS the whole document, raising `DuplicateProperty` on the first
    /// object whose direct property names collide (spec §4.4, optional
    /// post-parse pass).
    pub fn check_duplicate_properties(&self, case_sensitive: bool) -> Result<(), RdnError> {
        self.check_duplicates_from(self.root(), case_sensitive)
    }

    fn check_duplicates_from(&self, index: usize, case_sensitive: bool) -> Result<(), RdnError> {
        let row = self.rows[index];
        if row.token_type() == TokenKind::StartObject {
            let mut seen: HashSet<String> = HashSet::new();
            let count = self.direct_child_count(index);
            let mut i = 0;
            while i < count {
                let child = self.nth_child(index, i).expect("i < count");
                if self.kind(child) == TokenKind::PropertyName {
                    let name = self.as_str(child)?;
                    let key = if case_sensitive { name.clone() } else { name.to_lowercase() };
                    if !seen.insert(key) {
                        return Err(self.err(RdnErrorKind::DuplicateProperty { name }, child));
                    }
                }
                i += 1;
            }
        }
        if row.token_type().is_start() {
            let count = self.direct_child_count(index);
            let mut i = 0;
            while i < count {
                let child = self.nth_child(index, i).expect("i < count");
                self.check_duplicates_from(child, case_sensitive)?;
                i += 1;
            }
        }
        Ok(())
    }

    /// Re-emit the subtree rooted at `index` through `writer`'s public API
    /// (spec §4.4 "Writer-back"). Strings are unescaped and re-encoded
    /// through the writer's own encoder; everything else round-trips its
    /// already-valid raw text.
    pub fn write_element_to(&self, index: usize, writer: &mut Writer) -> Result<(), RdnError> {
        let kind = self.kind(index);
        match kind {
            TokenKind::StartObject => {
                writer.write_start_object()?;
                let count = self.direct_child_count(index);
                let mut i = 0;
                while i < count {
                    let name_idx = self.nth_child(index, i).expect("i < count");
                    let name = self.as_str(name_idx)?;
                    writer.write_property_name(&name)?;
                    self.write_element_to(self.property_value(name_idx), writer)?;
                    i += 1;
                }
                writer.write_end_object()
            }
            TokenKind::StartArray => {
                writer.write_start_array()?;
                self.write_children(index, writer)?;
                writer.write_end_array()
            }
            TokenKind::StartSet => {
                writer.write_start_set()?;
                self.write_children(index, writer)?;
                writer.write_end_set()
            }
            TokenKind::StartTuple => {
                writer.write_start_tuple()?;
                self.write_children(index, writer)?;
                writer.write_end_tuple()
            }
            TokenKind::StartMap => {
                writer.write_start_map()?;
                let count = self.direct_child_count(index);
                let mut i = 0;
                while i < count {
                    let child = self.nth_child(index, i).expect("i < count");
                    self.write_element_to(child, writer)?;
                    if i % 2 == 0 {
                        writer.write_map_arrow()?;
                    }
                    i += 1;
                }
                writer.write_end_map()
            }
            TokenKind::String => writer.write_string_value(&self.as_str(index)?),
            TokenKind::True => writer.write_boolean_value(true),
            TokenKind::False => writer.write_boolean_value(false),
            TokenKind::Null => writer.write_null_value(),
            TokenKind::Number => writer.write_raw_value(self.raw_value(index)),
            TokenKind::BigInteger => writer.write_big_integer_value(&self.as_big_integer(index)?),
            TokenKind::RdnDateTime => writer.write_raw_value(self.raw_value(index)),
            TokenKind::RdnTimeOnly => writer.write_raw_value(self.raw_value(index)),
            TokenKind::RdnDuration => writer.write_raw_value(self.raw_value(index)),
            TokenKind::RdnRegExp => {
                let (pattern, flags) = self.as_regex(index)?;
                let pattern = pattern.to_string();
                let flags = flags.to_string();
                writer.write_regexp_value(&pattern, &flags)
            }
            TokenKind::RdnBinary => writer.write_raw_value(self.raw_value(index)),
            _ => Err(self.err(RdnErrorKind::WriteValidation { reason: "not a value row" }, index)),
        }
    }

    fn write_children(&self, index: usize, writer: &mut Writer) -> Result<(), RdnError> {
        let count = self.direct_child_count(index);
        let mut i = 0;
        while i < count {
            let child = self.nth_child(index, i).expect("i < count");
            self.write_element_to(child, writer)?;
            i += 1;
        }
        Ok(())
    }

    /// Print this document's row tree to stdout, indented the same way the
    /// teacher prints an `ASTNode` (`ASTNode::print`).
    pub fn print_tree(&self) -> std::io::Result<()> {
        ptree::print_tree(&DocNode {
            doc: self,
            index: self.root(),
        })
    }
}

/// `ptree::TreeItem` adapter over a `Document` row, built fresh per
/// `print_tree` call rather than stored — a `Document`'s children are
/// already cheap to re-derive from `nth_child`.
#[derive(Clone)]
struct DocNode<'a> {
    doc: &'a Document,
    index: usize,
}

impl<'a> ptree::TreeItem for DocNode<'a> {
    type Child = Self;

    fn write_self<W: std::io::Write>(&self, f: &mut W, _style: &ptree::Style) -> std::io::Result<()> {
        let row = self.doc.row(self.index);
        write!(f, "{:?} @ {}", row.token_type(), row.location)
    }

    fn children(&self) -> std::borrow::Cow<[Self::Child]> {
        let count = self.doc.direct_child_count(self.index);
        let mut kids = Vec::with_capacity(count);
        for n in 0..count {
            if let Some(child) = self.doc.nth_child(self.index, n) {
                kids.push(DocNode {
                    doc: self.doc,
                    index: child,
                });
            }
        }
        std::borrow::Cow::from(kids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::WriterOptions;

    fn parse(src: &str) -> Document {
        Document::parse(src.as_bytes(), ReaderOptions::default()).unwrap()
    }

    #[test]
    fn navigates_flat_array() {
        let doc = parse("[1, 2, 3]");
        assert_eq!(doc.kind(doc.root()), TokenKind::StartArray);
        assert_eq!(doc.direct_child_count(doc.root()), 3);
        let second = doc.nth_child(doc.root(), 1).unwrap();
        assert_eq!(doc.as_number(second).unwrap(), Number::Unsigned(2));
    }

    #[test]
    fn raw_value_round_trips_byte_for_byte() {
        let src = r#"{"x":[1,2,{"y":@2020-01-01}]}"#;
        let doc = parse(src);
        assert_eq!(doc.raw_value(doc.root()), src.as_bytes());

        let x_value = doc.property_value(doc.nth_child(doc.root(), 0).unwrap());
        let third = doc.nth_child(x_value, 2).unwrap();
        assert_eq!(doc.raw_value(third), br#"{"y":@2020-01-01}"#);
    }

    #[test]
    fn nested_containers_use_complex_child_walk() {
        let doc = parse(r#"[[1, 2], 3, [4]]"#);
        assert!(doc.rows[doc.root()].has_complex_children());
        let second = doc.nth_child(doc.root(), 1).unwrap();
        assert_eq!(doc.as_number(second).unwrap(), Number::Unsigned(3));
        let third = doc.nth_child(doc.root(), 2).unwrap();
        assert_eq!(doc.kind(third), TokenKind::StartArray);
        assert_eq!(doc.direct_child_count(third), 1);
    }

    #[test]
    fn map_mixed_keys_navigate_as_alternating_children() {
        let doc = parse(r#"M{1 => "a", "k" => true, [1,2] => null}"#);
        let root = doc.root();
        assert_eq!(doc.kind(root), TokenKind::StartMap);
        assert_eq!(doc.direct_child_count(root), 6);
        let key0 = doc.nth_child(root, 0).unwrap();
        assert_eq!(doc.as_number(key0).unwrap(), Number::Unsigned(1));
        let val0 = doc.nth_child(root, 1).unwrap();
        assert_eq!(doc.as_str(val0).unwrap(), "a");
    }

    #[test]
    fn detects_duplicate_properties() {
        let doc = parse(r#"{"a": 1, "a": 2}"#);
        let err = doc.check_duplicate_properties(true).unwrap_err();
        assert!(matches!(err.kind, RdnErrorKind::DuplicateProperty { .. }));
    }

    #[test]
    fn no_duplicate_properties_across_nested_objects() {
        let doc = parse(r#"{"a": {"a": 1}}"#);
        assert!(doc.check_duplicate_properties(true).is_ok());
    }

    #[test]
    fn write_element_to_reproduces_equivalent_rdn() {
        let doc = parse(r#"{"a": [1, 2], "b": true}"#);
        let mut writer = Writer::new(WriterOptions::default());
        doc.write_element_to(doc.root(), &mut writer).unwrap();
        let out = writer.finish().unwrap();
        assert_eq!(out, br#"{"a": [1,2], "b": true}"#);
    }
}
