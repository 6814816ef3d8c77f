//! Token and container kind enumerations (spec §3).

use std::fmt::{self, Debug, Display, Formatter};

/// Closed enumeration of token kinds the tokenizer can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TokenKind {
    None = 0,
    StartObject,
    EndObject,
    StartArray,
    EndArray,
    StartSet,
    EndSet,
    StartMap,
    EndMap,
    StartTuple,
    EndTuple,
    PropertyName,
    String,
    Number,
    BigInteger,
    True,
    False,
    Null,
    RdnDateTime,
    RdnTimeOnly,
    RdnDuration,
    RdnRegExp,
    RdnBinary,
    Comment,
}

impl TokenKind {
    pub fn is_start(&self) -> bool {
        matches!(
            self,
            TokenKind::StartObject
                | TokenKind::StartArray
                | TokenKind::StartSet
                | TokenKind::StartMap
                | TokenKind::StartTuple
        )
    }

    pub fn is_end(&self) -> bool {
        matches!(
            self,
            TokenKind::EndObject
                | TokenKind::EndArray
                | TokenKind::EndSet
                | TokenKind::EndMap
                | TokenKind::EndTuple
        )
    }

    pub fn is_scalar_value(&self) -> bool {
        matches!(
            self,
            TokenKind::String
                | TokenKind::Number
                | TokenKind::BigInteger
                | TokenKind::True
                | TokenKind::False
                | TokenKind::Null
                | TokenKind::RdnDateTime
                | TokenKind::RdnTimeOnly
                | TokenKind::RdnDuration
                | TokenKind::RdnRegExp
                | TokenKind::RdnBinary
        )
    }
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Debug::fmt(self, f)
    }
}
/// Enclosing container context (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    Root,
    Object,
    Array,
    Set,
    Map,
    Tuple,
}

impl ContainerKind {
    /// Token kind produced when this container is opened.
    pub fn start_token(&self) -> TokenKind {
        match self {
            ContainerKind::Root => TokenKind::None,
            ContainerKind::Object => TokenKind::StartObject,
            ContainerKind::Array => TokenKind::StartArray,
            ContainerKind::Set => TokenKind::StartSet,
            ContainerKind::Map => TokenKind::StartMap,
            ContainerKind::Tuple => TokenKind::StartTuple,
        }
    }

    /// Token kind produced when this container is closed.
    pub fn end_token(&self) -> TokenKind {
        match self {
            ContainerKind::Root => TokenKind::None,
            ContainerKind::Object => TokenKind::EndObject,
            ContainerKind::Array => TokenKind::EndArray,
            ContainerKind::Set => TokenKind::EndSet,
            ContainerKind::Map => TokenKind::EndMap,
            ContainerKind::Tuple => TokenKind::EndTuple,
        }
    }

    /// Whether property names (object keys) are expected in this container.
    pub fn is_object_like(&self) -> bool {
        matches!(self, ContainerKind::Object)
    }

    pub fn is_map(&self) -> bool {
        matches!(self, ContainerKind::Map)
    }

    pub fn is_tuple(&self) -> bool {
        matches!(self, ContainerKind::Tuple)
    }

    pub fn close_byte(&self) -> u8 {
        match self {
            ContainerKind::Root => 0,
            ContainerKind::Object | ContainerKind::Set | ContainerKind::Map => b'}',
            ContainerKind::Array => b']',
            ContainerKind::Tuple => b')',
        }
    }
}

impl Display for ContainerKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Debug::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_end_pairs_match() {
        for kind in [
            ContainerKind::Object,
            ContainerKind::Array,
            ContainerKind::Set,
            ContainerKind::Map,
            ContainerKind::Tuple,
        ] {
            assert!(kind.start_token().is_start());
            assert!(kind.end_token().is_end());
        }
    }
}
