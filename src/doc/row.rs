//! Fixed-size metadata row (spec §3 `DbRow`, §4.4 "Row layout").
//!
//! Each row describes one token occurrence: where its bytes start
//! (`location`), how big it is (`size_or_length` — byte length for a
//! scalar, direct child count for a container), how many rows its subtree
//! spans (`number_of_rows`, including the matching end row for containers),
//! which [`TokenKind`] it is, and whether it has "complex" children (any
//! child that is itself a container, which rules out the O(1) fixed-stride
//! child lookup in [`super::Document::nth_child`]).
//!
//! `number_of_rows`, `token_type`, and `has_complex_children` are packed
//! into one `u32` the way the spec's "12 bytes in practice" layout implies:
//! a `DbRow` here is `4 + 4 + 4 = 12` bytes, matching the teacher pack's own
//! preference for compact fixed-size table rows over one struct field per
//! concern (`estuary-flow/crates/json` keeps its validator state just as
//! tightly packed into scalar ints rather than nested structs).

use crate::token::TokenKind;

/// Sentinel written into `size_or_length` while a container row's final
/// child count is still unknown (build in progress).
pub const UNKNOWN_SIZE: i32 = -1;

const NUMBER_OF_ROWS_BITS: u32 = 26;
const NUMBER_OF_ROWS_MASK: u32 = (1 << NUMBER_OF_ROWS_BITS) - 1;
const TOKEN_TYPE_BITS: u32 = 5;
const TOKEN_TYPE_MASK: u32 = (1 << TOKEN_TYPE_BITS) - 1;
const HAS_COMPLEX_CHILDREN_BIT: u32 = NUMBER_OF_ROWS_BITS + TOKEN_TYPE_BITS;

/// One fixed-size entry in the metadata DB.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DbRow {
    pub location: u32,
    pub size_or_length: i32,
    packed: u32,
}

impl DbRow {
    pub fn new(location: u32, size_or_length: i32, number_of_rows: u32, token_type: TokenKind) -> Self {
        let mut row = Self {
            location,
            size_or_length,
            packed: 0,
        };
        row.set_number_of_rows(number_of_rows);
        row.set_token_type(token_type);
        row
    }

    pub fn number_of_rows(&self) -> u32 {
        self.packed & NUMBER_OF_ROWS_MASK
    }

    pub fn set_number_of_rows(&mut self, value: u32) {
        debug_assert!(value <= NUMBER_OF_ROWS_MASK, "subtree too large to index");
        self.packed = (self.packed & !NUMBER_OF_ROWS_MASK) | (value & NUMBER_OF_ROWS_MASK);
    }

    pub fn token_type(&self) -> TokenKind {
        let raw = (self.packed >> NUMBER_OF_ROWS_BITS) & TOKEN_TYPE_MASK;
        // SAFETY-free: token_type is always written from a real TokenKind by
        // `set_token_type`, so the bit pattern always round-trips through
        // this table.
        TOKEN_KIND_TABLE[raw as usize]
    }

    pub fn set_token_type(&mut self, kind: TokenKind) {
        let raw = kind as u32 & TOKEN_TYPE_MASK;
        self.packed = (self.packed & !(TOKEN_TYPE_MASK << NUMBER_OF_ROWS_BITS))
            | (raw << NUMBER_OF_ROWS_BITS);
    }

    pub fn has_complex_children(&self) -> bool {
        (self.packed >> HAS_COMPLEX_CHILDREN_BIT) & 1 != 0
    }

    pub fn set_has_complex_children(&mut self, value: bool) {
        if value {
            self.packed |= 1 << HAS_COMPLEX_CHILDREN_BIT;
        } else {
            self.packed &= !(1 << HAS_COMPLEX_CHILDREN_BIT);
        }
    }

    pub fn is_unknown_size(&self) -> bool {
        self.size_or_length == UNKNOWN_SIZE
    }
}

/// Index-by-discriminant lookup table mirroring `TokenKind`'s declaration
/// order (`#[repr(u8)]`), used to recover a `TokenKind` from the packed
/// 5-bit field without `unsafe` transmutes.
const TOKEN_KIND_TABLE: [TokenKind; 24] = [
    TokenKind::None,
    TokenKind::StartObject,
    TokenKind::EndObject,
    TokenKind::StartArray,
    TokenKind::EndArray,
    TokenKind::StartSet,
    TokenKind::EndSet,
    TokenKind::StartMap,
    TokenKind::EndMap,
    TokenKind::StartTuple,
    TokenKind::EndTuple,
    TokenKind::PropertyName,
    TokenKind::String,
    TokenKind::Number,
    TokenKind::BigInteger,
    TokenKind::True,
    TokenKind::False,
    TokenKind::Null,
    TokenKind::RdnDateTime,
    TokenKind::RdnTimeOnly,
    TokenKind::RdnDuration,
    TokenKind::RdnRegExp,
    TokenKind::RdnBinary,
    TokenKind::Comment,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packed_fields_round_trip() {
        let mut row = DbRow::new(10, UNKNOWN_SIZE, 0, TokenKind::StartArray);
        assert_eq!(row.location, 10);
        assert!(row.is_unknown_size());
        assert_eq!(row.token_type(), TokenKind::StartArray);
        assert!(!row.has_complex_children());

        row.set_number_of_rows(12345);
        row.set_has_complex_children(true);
        row.size_or_length = 3;

        assert_eq!(row.number_of_rows(), 12345);
        assert!(row.has_complex_children());
        assert_eq!(row.token_type(), TokenKind::StartArray);
        assert_eq!(row.size_or_length, 3);
    }

    #[test]
    fn every_token_kind_round_trips_through_the_packed_field() {
        for kind in TOKEN_KIND_TABLE {
            let mut row = DbRow::new(0, 0, 0, TokenKind::None);
            row.set_token_type(kind);
            assert_eq!(row.token_type(), kind);
        }
    }
}
