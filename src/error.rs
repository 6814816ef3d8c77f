//! Closed error-kind enumeration (spec §7) plus the public [`RdnError`] that
//! wraps a kind with the position it occurred at.

use crate::position::Position;
use crate::token::ContainerKind;
use thiserror::Error;

/// Every lexical, structural, or write-validation failure the crate can
/// raise. Each variant also has a stable resource code via [`RdnErrorKind::code`],
/// in the spirit of a typical .NET `SR.xxx` resource string table.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RdnErrorKind {
    #[error("unexpected end of data")]
    UnexpectedEndOfData,

    #[error("invalid byte 0x{byte:02x} in current context")]
    InvalidByte { byte: u8 },

    #[error("expected start of a value")]
    ExpectedStartOfValue,

    #[error("expected start of a property name")]
    ExpectedStartOfPropertyName,

    #[error("expected ':' after property name")]
    ExpectedSeparatorAfterPropertyName,

    #[error("expected a property name or '}}'")]
    ExpectedPropertyOrCloseBrace,

    #[error("mismatched close: container opened as {opened:?}, closed as {closed:?}")]
    MismatchedClose {
        opened: ContainerKind,
        closed: ContainerKind,
    },

    #[error("container nesting exceeds max depth {max_depth}")]
    DepthTooLarge { max_depth: usize },

    #[error("invalid string escape sequence")]
    InvalidStringEscape,

    #[error("invalid hex digit in \\u escape")]
    InvalidHexDigit,

    #[error("unexpected U+2028/U+2029 line separator inside a line comment")]
    UnexpectedLineSeparator,

    #[error("invalid control character in string")]
    InvalidControlCharacter,

    #[error("invalid number literal: {reason}")]
    InvalidNumber { reason: &'static str },

    #[error("leading zero is not allowed in a number literal")]
    InvalidLeadingZeroInNumber,

    #[error("invalid RDN date/time literal")]
    InvalidDateTime,

    #[error("invalid RDN duration literal")]
    InvalidDuration,

    #[error("invalid regex literal")]
    InvalidRegex,

    #[error("invalid UTF-8 byte sequence")]
    InvalidUtf8,

    #[error("trailing comma is not allowed")]
    TrailingCommaNotAllowed,

    #[error("duplicate property name {name:?}")]
    DuplicateProperty { name: String },

    #[error("invalid writer call: {reason}")]
    WriteValidation { reason: &'static str },

    #[error("document has already been disposed")]
    AlreadyDisposed,
}

impl RdnErrorKind {
    /// Stable resource code, independent of the (potentially localized in a
    /// future version) `Display` message.
    pub fn code(&self) -> &'static str {
        match self {
            RdnErrorKind::UnexpectedEndOfData => "RDN0001",
            RdnErrorKind::InvalidByte { .. } => "RDN0002",
            RdnErrorKind::ExpectedStartOfValue => "RDN0003",
            RdnErrorKind::ExpectedStartOfPropertyName => "RDN0004",
            RdnErrorKind::ExpectedSeparatorAfterPropertyName => "RDN0005",
            RdnErrorKind::ExpectedPropertyOrCloseBrace => "RDN0006",
            RdnErrorKind::MismatchedClose { .. } => "RDN0007",
            RdnErrorKind::DepthTooLarge { .. } => "RDN0008",
            RdnErrorKind::InvalidStringEscape => "RDN0009",
            RdnErrorKind::InvalidHexDigit => "RDN0010",
            RdnErrorKind::UnexpectedLineSeparator => "RDN0011",
            RdnErrorKind::InvalidControlCharacter => "RDN0012",
            RdnErrorKind::InvalidNumber { .. } => "RDN0013",
            RdnErrorKind::InvalidLeadingZeroInNumber => "RDN0014",
            RdnErrorKind::InvalidDateTime => "RDN0015",
            RdnErrorKind::InvalidDuration => "RDN0016",
            RdnErrorKind::InvalidRegex => "RDN0017",
            RdnErrorKind::InvalidUtf8 => "RDN0018",
            RdnErrorKind::TrailingCommaNotAllowed => "RDN0019",
            RdnErrorKind::DuplicateProperty { .. } => "RDN0020",
            RdnErrorKind::WriteValidation { .. } => "RDN0021",
            RdnErrorKind::AlreadyDisposed => "RDN0022",
        }
    }
}

/// A lexical, structural, or write-validation error with its source position.
#[derive(Debug, Clone, PartialEq)]
pub struct RdnError {
    pub kind: RdnErrorKind,
    pub position: Position,
    /// Byte offset the error was raised at, when one is meaningful.
    pub byte: Option<usize>,
}

impl RdnError {
    pub fn new(kind: RdnErrorKind, position: Position, byte: Option<usize>) -> Self {
        Self {
            kind,
            position,
            byte,
        }
    }
}

impl std::fmt::Display for RdnError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({}) at {}",
            self.kind,
            self.kind.code(),
            self.position
        )
    }
}

impl std::error::Error for RdnError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.kind)
    }
}
