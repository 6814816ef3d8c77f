//! Streaming, resumable tokenizer (spec §3, §4.1).
//!
//! [`Reader`] consumes bytes fed through [`Reader::feed`] and yields one
//! [`Token`] at a time from [`Reader::read`]. Unlike the teacher's
//! `ITokenization`/production-graph machinery (built for a pre-declared,
//! combinator-assembled grammar), this is a single hand-written dispatch
//! loop: RDN's grammar is small and fixed, so there is nothing to compose.
//! What *is* kept from the teacher is the shape of the contract: a token
//! carries a span plus the information needed to slice it back out of the
//! source (`Lex<TToken>` in `lex.rs`), and position is recovered lazily via
//! [`crate::position::LineIndex`] rather than tracked eagerly.
//!
//! Resumability is accumulate-and-retry: bytes are appended to an internal
//! buffer, and when a scan runs out of buffer without reaching a natural end
//! it reports [`ReadOutcome::NeedMoreData`] and rewinds `pos` back to the
//! start of the token being scanned, so the *next* call to `read` simply
//! retries the same span against the (now longer) buffer. This trades the
//! literal cross-segment state-stitching the spec sketches
//! (`PartialStateForRollback`) for the same pattern
//! `other_examples/2d3a5fa9_kallsyms-gasp__src-json_sax_scanner.rs.rs` uses:
//! an owned accumulation buffer, no partial-token carry-over structures.

pub(crate) mod binary;
mod comments;
mod numbers;
mod regex_lit;
pub(crate) mod strings;
mod temporal;

use crate::bitstack::BitStack;
use crate::error::{RdnError, RdnErrorKind};
use crate::position::{LineIndex, Position};
use crate::token::{ContainerKind, TokenKind};

/// How the reader treats `//` and `/* */` comments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentHandling {
    /// A comment is a lexical error (`RdnErrorKind::InvalidByte`-shaped: the
    /// comment opener is simply not a legal byte in this context).
    Disallow,
    /// Comments are tokenized as [`TokenKind::Comment`] and handed to the
    /// caller like any other token.
    Allow,
    /// Comments are scanned and discarded; the caller never sees them.
    Skip,
}

impl Default for CommentHandling {
    fn default() -> Self {
        CommentHandling::Disallow
    }
}

/// Tunables for [`Reader`] (spec §3 "Reader options").
#[derive(Debug, Clone)]
pub struct ReaderOptions {
    pub max_depth: usize,
    pub comment_handling: CommentHandling,
    pub allow_trailing_commas: bool,
    /// Whether a finished root value may be followed by another root value
    /// (concatenated-documents mode) rather than only trailing whitespace.
    pub allow_multiple_values: bool,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            max_depth: 64,
            comment_handling: CommentHandling::Disallow,
            allow_trailing_commas: false,
            allow_multiple_values: false,
        }
    }
}

/// A single lexical token: its kind, its byte span in the fed input, and
/// (for scalars) whether the span contains backslash escapes the caller
/// must unescape before use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub start: usize,
    pub end: usize,
    pub value_is_escaped: bool,
    pub position: Position,
}

impl Token {
    /// Slice the raw source bytes this token spans. `reader` must be the
    /// same reader (or one sharing its buffer) that produced the token;
    /// bytes before `pos` may have been discarded in a future version, but
    /// [`Reader`] currently never discards consumed bytes.
    pub fn slice<'b>(&self, reader: &'b Reader) -> &'b [u8] {
        &reader.buf[self.start..self.end]
    }
}

/// Outcome of one [`Reader::read`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome {
    Token(Token),
    /// The buffer was exhausted mid-token; call [`Reader::feed`] with more
    /// bytes (or [`Reader::finish`] if there truly is no more) and retry.
    NeedMoreData,
    /// The root value (and, in `allow_multiple_values` mode, every
    /// subsequent root value) has been fully read and only trailing
    /// whitespace remains.
    EndOfInput,
}

/// Internal grammar state: what byte shape is legal next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Expect {
    RootValue,
    AfterRoot,
    Value { allow_close: bool },
    PropertyName { allow_close: bool },
    Colon,
    Arrow,
    CommaOrClose,
}

/// Resumable-scan result: either the sub-grammar consumer finished (and
/// produced `T`), or it ran out of buffer before reaching a natural
/// boundary. A hard lexical error is signalled through the surrounding
/// `Result`, not through this enum (spec §9 "escape hatch for non-local
/// return", collapsed from three outcomes to two since `NeedMoreData` and
/// `OperationIncomplete` mean the same thing to every caller here).
pub(crate) enum Advance<T> {
    Done(T),
    NeedMoreData,
}

pub(crate) type AdvanceResult<T> = Result<Advance<T>, RdnError>;

/// A streaming, resumable RDN tokenizer.
pub struct Reader {
    pub(crate) buf: Vec<u8>,
    pub(crate) options: ReaderOptions,
    pub(crate) pos: usize,
    pub(crate) finished_feeding: bool,
    pub(crate) containers: Vec<ContainerKind>,
    pub(crate) bits: BitStack,
    pub(crate) expect: Expect,
    pub(crate) root_seen: bool,
    lines: LineIndex,
}

impl Reader {
    pub fn new(options: ReaderOptions) -> Self {
        Self {
            buf: Vec::new(),
            options,
            pos: 0,
            finished_feeding: false,
            containers: Vec::new(),
            bits: BitStack::new(),
            expect: Expect::RootValue,
            root_seen: false,
            lines: LineIndex::new(),
        }
    }

    /// Append more input. Errors if called after [`Reader::finish`].
    pub fn feed(&mut self, bytes: &[u8]) -> Result<(), RdnError> {
        if self.finished_feeding {
            return Err(self.err(RdnErrorKind::AlreadyDisposed, self.pos));
        }
        self.buf.extend_from_slice(bytes);
        self.lines.extend(&self.buf);
        Ok(())
    }

    /// Declare that no more input is coming. After this, a `NeedMoreData`
    /// outcome mid-token becomes a hard `UnexpectedEndOfData` error.
    pub fn finish(&mut self) {
        self.finished_feeding = true;
    }

    pub(crate) fn position_at(&self, offset: usize) -> Position {
        self.lines.locate(offset)
    }

    pub(crate) fn err(&self, kind: RdnErrorKind, at: usize) -> RdnError {
        RdnError::new(kind, self.position_at(at), Some(at))
    }

    fn remaining(&self) -> &[u8] {
        &self.buf[self.pos..]
    }

    fn peek(&self) -> Option<u8> {
        self.buf.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.buf.get(self.pos + offset).copied()
    }

    fn make_token(&self, kind: TokenKind, start: usize, end: usize, escaped: bool) -> Token {
        Token {
            kind,
            start,
            end,
            value_is_escaped: escaped,
            position: self.position_at(start),
        }
    }

    /// Produce the next token, or report that more input (or end-of-input)
    /// is needed.
    pub fn read(&mut self) -> Result<ReadOutcome, RdnError> {
        loop {
            if let Some(outcome) = self.skip_insignificant()? {
                return Ok(outcome);
            }

            match self.peek() {
                None => {
                    return self.handle_exhausted();
                }
                Some(_) => {}
            }

            match self.expect {
                Expect::Colon => {
                    if self.peek() != Some(b':') {
                        return Err(self.err(RdnErrorKind::ExpectedSeparatorAfterPropertyName, self.pos));
                    }
                    self.pos += 1;
                    self.expect = Expect::Value { allow_close: false };
                    continue;
                }
                Expect::Arrow => {
                    if self.peek() != Some(b'=') {
                        return Err(self.err(RdnErrorKind::ExpectedStartOfValue, self.pos));
                    }
                    if self.peek_at(1) != Some(b'>') {
                        if self.peek_at(1).is_none() && !self.finished_feeding {
                            return Ok(ReadOutcome::NeedMoreData);
                        }
                        return Err(self.err(RdnErrorKind::ExpectedStartOfValue, self.pos));
                    }
                    self.pos += 2;
                    self.bits.set_map_awaiting_value(true);
                    self.expect = Expect::Value { allow_close: false };
                    continue;
                }
                Expect::PropertyName { allow_close } => {
                    return self.read_property_name(allow_close);
                }
                Expect::CommaOrClose => {
                    return self.read_comma_or_close();
                }
                Expect::RootValue | Expect::Value { .. } => {
                    return self.read_value();
                }
                Expect::AfterRoot => {
                    if self.options.allow_multiple_values {
                        self.expect = Expect::RootValue;
                        continue;
                    }
                    return Err(self.err(RdnErrorKind::ExpectedStartOfValue, self.pos));
                }
            }
        }
    }

    fn handle_exhausted(&mut self) -> Result<ReadOutcome, RdnError> {
        if !self.finished_feeding {
            return Ok(ReadOutcome::NeedMoreData);
        }
        match self.expect {
            Expect::AfterRoot => Ok(ReadOutcome::EndOfInput),
            Expect::RootValue if self.root_seen => Ok(ReadOutcome::EndOfInput),
            _ => Err(self.err(RdnErrorKind::UnexpectedEndOfData, self.pos)),
        }
    }

    /// Skip whitespace and (depending on `comment_handling`) comments.
    /// Returns `Ok(Some(outcome))` when a comment was handed back as a
    /// token or more data is needed mid-comment; `Ok(None)` to keep going.
    fn skip_insignificant(&mut self) -> Result<Option<ReadOutcome>, RdnError> {
        loop {
            while let Some(b) = self.peek() {
                if crate::tables::is_whitespace(b) {
                    self.pos += 1;
                } else {
                    break;
                }
            }
            match (self.peek(), self.peek_at(1)) {
                (Some(b'/'), Some(b'/')) | (Some(b'/'), Some(b'*')) => {
                    let start = self.pos;
                    match self::comments::scan_comment(self, start)? {
                        Advance::NeedMoreData => return Ok(Some(ReadOutcome::NeedMoreData)),
                        Advance::Done(end) => match self.options.comment_handling {
                            CommentHandling::Disallow => {
                                return Err(self.err(RdnErrorKind::InvalidByte { byte: b'/' }, start));
                            }
                            CommentHandling::Skip => {
                                tracing::warn!(start, end, "discarding comment (CommentHandling::Skip)");
                                self.pos = end;
                                continue;
                            }
                            CommentHandling::Allow => {
                                self.pos = end;
                                return Ok(Some(ReadOutcome::Token(self.make_token(
                                    TokenKind::Comment,
                                    start,
                                    end,
                                    false,
                                ))));
                            }
                        },
                    }
                }
                (Some(b'/'), None) if !self.finished_feeding => {
                    return Ok(Some(ReadOutcome::NeedMoreData));
                }
                _ => return Ok(None),
            }
        }
    }

    fn after_value_produced(&mut self) {
        match self.containers.last() {
            None => self.expect = Expect::AfterRoot,
            Some(ContainerKind::Object) => self.expect = Expect::CommaOrClose,
            Some(ContainerKind::Map) => {
                if self.bits.map_awaiting_value() {
                    self.expect = Expect::CommaOrClose;
                } else {
                    self.expect = Expect::Arrow;
                }
            }
            Some(_) => self.expect = Expect::CommaOrClose,
        }
    }

    fn read_property_name(&mut self, allow_close: bool) -> Result<ReadOutcome, RdnError> {
        let byte = self.peek().expect("checked by caller");
        if byte == b'}' {
            if allow_close {
                return Ok(self.close_container());
            }
            return Err(self.err(RdnErrorKind::TrailingCommaNotAllowed, self.pos));
        }
        if byte != b'"' {
            return Err(self.err(RdnErrorKind::ExpectedStartOfPropertyName, self.pos));
        }
        let start = self.pos;
        match self::strings::scan_quoted(self, start)? {
            Advance::NeedMoreData => Ok(ReadOutcome::NeedMoreData),
            Advance::Done((end, escaped)) => {
                self.pos = end;
                self.expect = Expect::Colon;
                Ok(ReadOutcome::Token(self.make_token(
                    TokenKind::PropertyName,
                    start,
                    end,
                    escaped,
                )))
            }
        }
    }

    fn read_comma_or_close(&mut self) -> Result<ReadOutcome, RdnError> {
        let byte = self.peek().expect("checked by caller");
        let current = *self
            .containers
            .last()
            .expect("CommaOrClose only reachable inside a container");
        if byte == current.close_byte() {
            return Ok(self.close_container());
        }
        if byte == b'}' || byte == b']' || byte == b')' {
            let closed = match byte {
                b']' => ContainerKind::Array,
                b')' => ContainerKind::Tuple,
                _ => ContainerKind::Object,
            };
            return Err(self.err(
                RdnErrorKind::MismatchedClose {
                    opened: current,
                    closed,
                },
                self.pos,
            ));
        }
        if byte == b',' {
            self.pos += 1;
            if current.is_map() {
                self.bits.set_map_awaiting_value(false);
            }
            let allow_close = self.options.allow_trailing_commas;
            self.expect = if current.is_object_like() {
                Expect::PropertyName { allow_close }
            } else {
                Expect::Value { allow_close }
            };
            return self.read();
        }
        Err(self.err(RdnErrorKind::ExpectedStartOfValue, self.pos))
    }

    fn close_container(&mut self) -> ReadOutcome {
        let kind = self.containers.pop().expect("checked by caller");
        self.bits.pop();
        let start = self.pos;
        self.pos += 1;
        self.after_value_produced();
        tracing::trace!(depth = self.containers.len(), ?kind, "container closed");
        ReadOutcome::Token(self.make_token(kind.end_token(), start, self.pos, false))
    }

    fn push_container(&mut self, kind: ContainerKind) -> Result<(), RdnError> {
        if self.containers.len() >= self.options.max_depth {
            return Err(self.err(
                RdnErrorKind::DepthTooLarge {
                    max_depth: self.options.max_depth,
                },
                self.pos,
            ));
        }
        tracing::trace!(depth = self.containers.len(), ?kind, "container started");
        self.containers.push(kind);
        self.bits
            .push(kind.is_object_like(), kind.is_map(), kind.is_tuple());
        self.expect = match kind {
            ContainerKind::Object => Expect::PropertyName { allow_close: true },
            _ => Expect::Value { allow_close: true },
        };
        Ok(())
    }

    fn read_value(&mut self) -> Result<ReadOutcome, RdnError> {
        let allow_close = matches!(
            self.expect,
            Expect::Value { allow_close: true }
        );
        let byte = self.peek().expect("checked by caller");
        let start = self.pos;

        if allow_close {
            if let Some(current) = self.containers.last() {
                if byte == current.close_byte() {
                    return Ok(self.close_container());
                }
            }
        }

        match byte {
            b'{' => {
                self.pos += 1;
                self.begin_object_or_set()
            }
            b'[' => {
                self.pos += 1;
                self.root_seen = true;
                self.push_container(ContainerKind::Array)?;
                Ok(ReadOutcome::Token(self.make_token(
                    TokenKind::StartArray,
                    start,
                    self.pos,
                    false,
                )))
            }
            b'(' => {
                self.pos += 1;
                self.root_seen = true;
                self.push_container(ContainerKind::Tuple)?;
                Ok(ReadOutcome::Token(self.make_token(
                    TokenKind::StartTuple,
                    start,
                    self.pos,
                    false,
                )))
            }
            b'S' => self.begin_explicit_prefix(b"Set", ContainerKind::Set),
            b'M' => self.begin_explicit_prefix(b"Map", ContainerKind::Map),
            b'"' => self.scalar_string(start),
            b't' => self.scalar_literal(b"true", TokenKind::True, start),
            b'f' => self.scalar_literal(b"false", TokenKind::False, start),
            b'n' => self.scalar_literal(b"null", TokenKind::Null, start),
            b'N' => self.scalar_literal(b"NaN", TokenKind::Number, start),
            b'I' => self.scalar_literal(b"Infinity", TokenKind::Number, start),
            b'-' | b'0'..=b'9' => self::numbers::scan(self, start),
            b'@' => self::temporal::scan(self, start),
            b'/' => self::regex_lit::scan(self, start),
            b'b' if self.peek_at(1) == Some(b'"') => self.scalar_binary(start, false),
            b'x' if self.peek_at(1) == Some(b'"') => self.scalar_binary(start, true),
            _ => Err(self.err(RdnErrorKind::ExpectedStartOfValue, start)),
        }
    }

    /// `{` at a value position: look ahead past whitespace for `"` (object)
    /// vs anything else (bare set).
    fn begin_object_or_set(&mut self) -> Result<ReadOutcome, RdnError> {
        self.root_seen = true;
        let mut probe = self.pos;
        while let Some(b) = self.buf.get(probe) {
            if crate::tables::is_whitespace(*b) {
                probe += 1;
            } else {
                break;
            }
        }
        if probe >= self.buf.len() {
            if !self.finished_feeding {
                self.pos -= 1; // rewind past the '{' we already consumed
                return Ok(ReadOutcome::NeedMoreData);
            }
        }
        let kind = if self.buf.get(probe) == Some(&b'"') {
            ContainerKind::Object
        } else {
            ContainerKind::Set
        };
        let start = self.pos - 1;
        self.push_container(kind)?;
        Ok(ReadOutcome::Token(self.make_token(
            kind.start_token(),
            start,
            self.pos,
            false,
        )))
    }

    /// `S{`/`Set{`/`M{`/`Map{`: an explicit prefix forcing Set or Map,
    /// disambiguated from an identifier-less bare `{` before any byte is
    /// consumed.
    fn begin_explicit_prefix(
        &mut self,
        long_form: &'static [u8],
        kind: ContainerKind,
    ) -> Result<ReadOutcome, RdnError> {
        let start = self.pos;
        let short_form = &long_form[0..1];
        let avail = self.remaining();

        let matches_prefix = |prefix: &[u8]| -> Option<bool> {
            let have = avail.len().min(prefix.len());
            if avail[..have] != prefix[..have] {
                return Some(false);
            }
            if have < prefix.len() {
                None
            } else {
                Some(true)
            }
        };

        match matches_prefix(long_form) {
            Some(true) => {
                self.pos += long_form.len();
            }
            Some(false) => match matches_prefix(short_form) {
                Some(true) => {
                    self.pos += short_form.len();
                }
                Some(false) => return Err(self.err(RdnErrorKind::ExpectedStartOfValue, start)),
                None => {
                    if self.finished_feeding {
                        return Err(self.err(RdnErrorKind::ExpectedStartOfValue, start));
                    }
                    return Ok(ReadOutcome::NeedMoreData);
                }
            },
            None => {
                if self.finished_feeding {
                    return Err(self.err(RdnErrorKind::ExpectedStartOfValue, start));
                }
                return Ok(ReadOutcome::NeedMoreData);
            }
        }

        match self.peek() {
            Some(b'{') => {
                self.pos += 1;
            }
            Some(_) => return Err(self.err(RdnErrorKind::ExpectedStartOfValue, start)),
            None => {
                if self.finished_feeding {
                    return Err(self.err(RdnErrorKind::ExpectedStartOfValue, start));
                }
                self.pos = start;
                return Ok(ReadOutcome::NeedMoreData);
            }
        }

        self.root_seen = true;
        self.push_container(kind)?;
        Ok(ReadOutcome::Token(self.make_token(
            kind.start_token(),
            start,
            self.pos,
            false,
        )))
    }

    fn scalar_string(&mut self, start: usize) -> Result<ReadOutcome, RdnError> {
        match self::strings::scan_quoted(self, start)? {
            Advance::NeedMoreData => Ok(ReadOutcome::NeedMoreData),
            Advance::Done((end, escaped)) => {
                self.pos = end;
                self.root_seen = true;
                self.after_value_produced();
                Ok(ReadOutcome::Token(self.make_token(
                    TokenKind::String,
                    start,
                    end,
                    escaped,
                )))
            }
        }
    }

    fn scalar_binary(&mut self, start: usize, is_hex: bool) -> Result<ReadOutcome, RdnError> {
        let quote = self.pos + 1;
        match self::strings::scan_quoted(self, quote)? {
            Advance::NeedMoreData => Ok(ReadOutcome::NeedMoreData),
            Advance::Done((end, _)) => {
                self.pos = end;
                self.root_seen = true;
                self.after_value_produced();
                Ok(ReadOutcome::Token(self.make_token(
                    TokenKind::RdnBinary,
                    start,
                    end,
                    is_hex,
                )))
            }
        }
    }

    fn scalar_literal(
        &mut self,
        literal: &'static [u8],
        kind: TokenKind,
        start: usize,
    ) -> Result<ReadOutcome, RdnError> {
        let avail = self.remaining();
        let have = avail.len().min(literal.len());
        if avail[..have] != literal[..have] {
            return Err(self.err(RdnErrorKind::ExpectedStartOfValue, start));
        }
        if have < literal.len() {
            if self.finished_feeding {
                return Err(self.err(RdnErrorKind::UnexpectedEndOfData, start));
            }
            return Ok(ReadOutcome::NeedMoreData);
        }
        let end = start + literal.len();
        match self.peek_byte_after(end) {
            Advance::Done(true) | Advance::Done(false) => {}
            Advance::NeedMoreData => return Ok(ReadOutcome::NeedMoreData),
        }
        self.pos = end;
        self.root_seen = true;
        self.after_value_produced();
        Ok(ReadOutcome::Token(self.make_token(kind, start, end, false)))
    }

    /// Confirm that `end` is immediately followed by a terminator byte or
    /// end-of-input; used after any fixed-text literal to reject e.g.
    /// `truex`. Returns `Advance::Done(_)` once confirmed valid (the bool is
    /// unused, kept for symmetry with other scan helpers), `NeedMoreData`
    /// when the next byte hasn't arrived yet and input isn't finished.
    pub(crate) fn peek_byte_after(&self, end: usize) -> Advance<bool> {
        match self.buf.get(end) {
            Some(b) if crate::tables::is_terminator(*b) => Advance::Done(true),
            Some(_) => Advance::Done(false),
            None => {
                if self.finished_feeding {
                    Advance::Done(true)
                } else {
                    Advance::NeedMoreData
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_all(input: &[u8], options: ReaderOptions) -> Result<Vec<TokenKind>, RdnError> {
        let mut reader = Reader::new(options);
        reader.feed(input).unwrap();
        reader.finish();
        let mut kinds = Vec::new();
        loop {
            match reader.read()? {
                ReadOutcome::Token(t) => kinds.push(t.kind),
                ReadOutcome::EndOfInput => break,
                ReadOutcome::NeedMoreData => {
                    return Err(reader.err(RdnErrorKind::UnexpectedEndOfData, reader.pos))
                }
            }
        }
        Ok(kinds)
    }

    #[test]
    fn reads_flat_array() {
        let kinds = read_all(b"[1, true, null]", ReaderOptions::default()).unwrap();
        assert_eq!(
            kinds,
            vec![
                TokenKind::StartArray,
                TokenKind::Number,
                TokenKind::True,
                TokenKind::Null,
                TokenKind::EndArray,
            ]
        );
    }

    #[test]
    fn reads_object_with_nested_array() {
        let kinds = read_all(br#"{"a": [1, 2]}"#, ReaderOptions::default()).unwrap();
        assert_eq!(
            kinds,
            vec![
                TokenKind::StartObject,
                TokenKind::PropertyName,
                TokenKind::StartArray,
                TokenKind::Number,
                TokenKind::Number,
                TokenKind::EndArray,
                TokenKind::EndObject,
            ]
        );
    }

    #[test]
    fn bare_brace_is_a_set() {
        let kinds = read_all(b"{1, 2}", ReaderOptions::default()).unwrap();
        assert_eq!(kinds[0], TokenKind::StartSet);
        assert_eq!(*kinds.last().unwrap(), TokenKind::EndSet);
    }

    #[test]
    fn explicit_map_prefix_round_trips() {
        let kinds = read_all(br#"Map{"a" => 1}"#, ReaderOptions::default()).unwrap();
        assert_eq!(
            kinds,
            vec![
                TokenKind::StartMap,
                TokenKind::String,
                TokenKind::Number,
                TokenKind::EndMap,
            ]
        );
    }

    #[test]
    fn mismatched_close_is_an_error() {
        let err = read_all(b"[1, 2)", ReaderOptions::default()).unwrap_err();
        assert!(matches!(err.kind, RdnErrorKind::MismatchedClose { .. }));
    }

    #[test]
    fn trailing_comma_rejected_by_default() {
        let err = read_all(b"[1, 2,]", ReaderOptions::default()).unwrap_err();
        assert_eq!(err.kind, RdnErrorKind::TrailingCommaNotAllowed);
    }

    #[test]
    fn trailing_comma_allowed_when_enabled() {
        let opts = ReaderOptions {
            allow_trailing_commas: true,
            ..ReaderOptions::default()
        };
        let kinds = read_all(b"[1, 2,]", opts).unwrap();
        assert_eq!(*kinds.last().unwrap(), TokenKind::EndArray);
    }

    #[test]
    fn depth_limit_is_enforced() {
        let opts = ReaderOptions {
            max_depth: 2,
            ..ReaderOptions::default()
        };
        let err = read_all(b"[[[1]]]", opts).unwrap_err();
        assert_eq!(
            err.kind,
            RdnErrorKind::DepthTooLarge { max_depth: 2 }
        );
    }

    #[test]
    fn feeding_byte_by_byte_still_parses() {
        let mut reader = Reader::new(ReaderOptions::default());
        let input = b"[1, 2]";
        let mut kinds = Vec::new();
        let mut i = 0;
        loop {
            match reader.read().unwrap() {
                ReadOutcome::Token(t) => {
                    kinds.push(t.kind);
                    continue;
                }
                ReadOutcome::EndOfInput => break,
                ReadOutcome::NeedMoreData => {
                    if i >= input.len() {
                        reader.finish();
                    } else {
                        reader.feed(&input[i..i + 1]).unwrap();
                        i += 1;
                    }
                }
            }
        }
        assert_eq!(
            kinds,
            vec![
                TokenKind::StartArray,
                TokenKind::Number,
                TokenKind::Number,
                TokenKind::EndArray,
            ]
        );
    }
}
