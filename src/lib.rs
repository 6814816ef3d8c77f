//! RDN is a JSON superset: a text format that keeps JSON's object/array/
//! string/number/boolean/null vocabulary and adds the literals a
//! general-purpose data interchange format tends to need once JSON's
//! limits start to bite — sets, maps with non-string keys, tuples,
//! dates/times/durations, regular expressions, binary blobs and
//! arbitrary-precision integers.
//!
//! This crate is a tokenizer and writer pair for that format, plus a
//! random-access document index built on top of them:
//!
//! - [`reader`] — a resumable, pull-model tokenizer ([`reader::Reader`])
//!   that accepts input in arbitrary-sized chunks and never blocks waiting
//!   for more bytes; callers drive it with [`reader::Reader::feed`] and
//!   [`reader::Reader::read`].
//! - [`writer`] — a forward-only, structurally-validating emitter
//!   ([`writer::Writer`]) that tracks the same container/map-arrow state
//!   machine as the reader, in reverse.
//! - [`doc`] — [`doc::Document`], a flat row-table index built by driving a
//!   [`reader::Reader`] once over the whole input, giving O(1) or
//!   near-O(1) random access to any subtree without re-lexing.
//! - [`bridge`] — a convenience function that pulls tokens from a `Reader`
//!   and replays them into a `Writer`; not a guaranteed bijection, just a
//!   shortcut for "re-serialize this input".
//!
//! # Example
//!
//! ```
//! use rdn::reader::{Reader, ReaderOptions, ReadOutcome};
//!
//! let mut reader = Reader::new(ReaderOptions::default());
//! reader.feed(br#"{"numbers": [1, 2, 3]}"#).unwrap();
//! reader.finish();
//!
//! let mut tokens = 0;
//! loop {
//!     match reader.read().unwrap() {
//!         ReadOutcome::Token(_) => tokens += 1,
//!         ReadOutcome::NeedMoreData => panic!("all input was already fed"),
//!         ReadOutcome::EndOfInput => break,
//!     }
//! }
//! assert_eq!(tokens, 8);
//! ```

pub mod bitstack;
pub mod bridge;
pub mod doc;
pub mod error;
mod pool;
pub mod position;
pub mod reader;
pub mod tables;
pub mod token;
pub mod writer;

pub use doc::{Document, Number, Value};
pub use error::{RdnError, RdnErrorKind};
pub use position::Position;
pub use reader::{CommentHandling, ReadOutcome, Reader, ReaderOptions, Token};
pub use token::{ContainerKind, TokenKind};
pub use writer::{DefaultEncoder, Encoder, Writer, WriterOptions};
