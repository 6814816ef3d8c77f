//! Forward-only, structurally-validating writer (spec §4.3).
//!
//! A [`Writer`] mirrors the reader's grammar state machine in the opposite
//! direction: instead of classifying bytes into tokens, it accepts typed
//! `Write*` calls and either emits bytes or rejects a call that would
//! produce structurally invalid RDN (two property names in a row, a value
//! with no enclosing container, a mismatched close, …). It reuses
//! [`crate::bitstack::BitStack`] for the same per-depth object/map/tuple
//! classification the reader uses, plus an exact [`ContainerKind`] stack
//! for validating closes (spec §4.3: "A bit-stack identical in shape to the
//! reader's").

use crate::bitstack::BitStack;
use crate::error::{RdnError, RdnErrorKind};
use crate::position::Position;
use crate::reader::binary;
use crate::tables;
use crate::token::ContainerKind;
use num_bigint::BigInt;

/// Escapes bytes for the minimized string form. The teacher's lexeme
/// utilities are pattern *matchers*, not encoders, so this trait has no
/// direct teacher analogue; its shape (an injectable strategy object
/// behind a trait object) follows the same "pluggable collaborator held
/// behind `Rc<dyn Trait>`" idiom used for `ILexeme`/`IProduction` throughout
/// the teacher crate.
pub trait Encoder: std::fmt::Debug {
    /// Append the minimally-escaped form of `value` (a logical string, not
    /// yet quoted) to `out`.
    fn encode_string(&self, value: &str, out: &mut Vec<u8>);
}

/// Default encoder: escapes only what RDN requires (`"`, `\`, and control
/// bytes via `\n`/`\t`/`\r`/`\uXXXX`), leaving everything else, including
/// non-ASCII UTF-8, untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultEncoder;

impl Encoder for DefaultEncoder {
    fn encode_string(&self, value: &str, out: &mut Vec<u8>) {
        for byte in value.bytes() {
            match byte {
                b'"' => out.extend_from_slice(b"\\\""),
                b'\\' => out.extend_from_slice(b"\\\\"),
                b'\n' => out.extend_from_slice(b"\\n"),
                b'\r' => out.extend_from_slice(b"\\r"),
                b'\t' => out.extend_from_slice(b"\\t"),
                0x00..=0x1f => {
                    out.extend_from_slice(format!("\\u{:04x}", byte).as_bytes());
                }
                _ => out.push(byte),
            }
        }
    }
}

/// Tunables for [`Writer`] (spec §4.3).
#[derive(Debug)]
pub struct WriterOptions {
    pub indented: bool,
    pub indent_character: u8,
    pub indent_size: usize,
    pub new_line: &'static [u8],
    pub max_depth: usize,
    /// Skip the `BitStack`-backed structural validation entirely. Intended
    /// for a caller that has already validated structure elsewhere (e.g.
    /// re-serializing a [`crate::doc::Document`] it just parsed) and
    /// wants to avoid paying for it twice.
    pub skip_validation: bool,
    pub encoder: Box<dyn Encoder>,
}

impl Default for WriterOptions {
    fn default() -> Self {
        Self {
            indented: false,
            indent_character: b' ',
            indent_size: 2,
            new_line: b"\n",
            max_depth: 64,
            skip_validation: false,
            encoder: Box::new(DefaultEncoder),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriterExpect {
    RootValue,
    AfterRoot,
    Value,
    PropertyName,
    Arrow,
    CommaOrPropertyName,
    CommaOrValue,
}

/// A forward-only RDN writer.
pub struct Writer {
    buf: Vec<u8>,
    options: WriterOptions,
    containers: Vec<ContainerKind>,
    bits: BitStack,
    expect: WriterExpect,
}

impl Writer {
    pub fn new(options: WriterOptions) -> Self {
        Self {
            buf: Vec::new(),
            options,
            containers: Vec::new(),
            bits: BitStack::new(),
            expect: WriterExpect::RootValue,
        }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    fn validation_error(&self, reason: &'static str) -> RdnError {
        RdnError::new(
            RdnErrorKind::WriteValidation { reason },
            Position::new(0, 0),
            None,
        )
    }

    fn check_can_write_value(&self) -> Result<(), RdnError> {
        if self.options.skip_validation {
            return Ok(());
        }
        match self.expect {
            WriterExpect::RootValue | WriterExpect::Value | WriterExpect::CommaOrValue => Ok(()),
            WriterExpect::AfterRoot => Err(self.validation_error("a value was already written at the root")),
            WriterExpect::PropertyName | WriterExpect::CommaOrPropertyName => {
                Err(self.validation_error("expected a property name, not a value"))
            }
            WriterExpect::Arrow => Err(self.validation_error("expected WriteMapArrow before a map value")),
        }
    }

    fn after_value_written(&mut self) {
        if self.options.skip_validation {
            return;
        }
        match self.containers.last() {
            None => self.expect = WriterExpect::AfterRoot,
            Some(ContainerKind::Object) => self.expect = WriterExpect::CommaOrValue,
            Some(ContainerKind::Map) => {
                if self.bits.map_awaiting_value() {
                    self.expect = WriterExpect::CommaOrValue;
                } else {
                    self.expect = WriterExpect::Arrow;
                }
            }
            Some(_) => self.expect = WriterExpect::CommaOrValue,
        }
    }

    /// Emit a line break and `depth * indent_size` indent characters.
    /// Callers pick `depth` explicitly (rather than reading
    /// `self.containers.len()` implicitly) since a close needs the
    /// *parent's* depth while a first child needs the container's own.
    fn write_indent(&mut self, depth: usize) {
        if !self.options.indented {
            return;
        }
        self.buf.extend_from_slice(self.options.new_line);
        for _ in 0..depth * self.options.indent_size {
            self.buf.push(self.options.indent_character);
        }
    }

    fn push_container(&mut self, kind: ContainerKind, open_bytes: &[u8]) -> Result<(), RdnError> {
        self.begin_value()?;
        if !self.options.skip_validation && self.containers.len() >= self.options.max_depth {
            return Err(RdnError::new(
                RdnErrorKind::DepthTooLarge {
                    max_depth: self.options.max_depth,
                },
                Position::new(0, 0),
                None,
            ));
        }
        self.buf.extend_from_slice(open_bytes);
        self.containers.push(kind);
        self.bits
            .push(kind.is_object_like(), kind.is_map(), kind.is_tuple());
        if !self.options.skip_validation {
            self.expect = if kind.is_object_like() {
                WriterExpect::PropertyName
            } else {
                WriterExpect::Value
            };
        }
        Ok(())
    }

    fn close_container(&mut self, expected: ContainerKind, close_byte: u8) -> Result<(), RdnError> {
        if !self.options.skip_validation {
            match self.containers.last() {
                Some(top) if *top == expected => {}
                Some(top) => {
                    return Err(RdnError::new(
                        RdnErrorKind::MismatchedClose {
                            opened: *top,
                            closed: expected,
                        },
                        Position::new(0, 0),
                        None,
                    ));
                }
                None => return Err(self.validation_error("no open container to close")),
            }
            // `Value`/`PropertyName` only survives to this point when the
            // container is still empty (every `write_*_value` call restores
            // `CommaOr*` before returning), so both pairs are legal close
            // points; anything else (e.g. `Arrow`, mid key/value gap) isn't.
            match self.expect {
                WriterExpect::Value
                | WriterExpect::PropertyName
                | WriterExpect::CommaOrValue
                | WriterExpect::CommaOrPropertyName => {}
                _ => return Err(self.validation_error("container is not ready to close")),
            }
        }
        // A container only reaches a close with `expect` still `Value` or
        // `PropertyName` when it never got a child (every `write_*_value`
        // call restores a `CommaOr*` state before returning), so only those
        // two states skip the closing indent.
        let had_children = matches!(
            self.expect,
            WriterExpect::CommaOrValue | WriterExpect::CommaOrPropertyName
        );
        self.containers.pop();
        self.bits.pop();
        if had_children {
            self.write_indent(self.containers.len());
        }
        self.buf.push(close_byte);
        self.after_value_written();
        Ok(())
    }

    pub fn write_start_object(&mut self) -> Result<(), RdnError> {
        self.push_container(ContainerKind::Object, b"{")
    }

    pub fn write_end_object(&mut self) -> Result<(), RdnError> {
        self.close_container(ContainerKind::Object, b'}')
    }

    pub fn write_start_array(&mut self) -> Result<(), RdnError> {
        self.push_container(ContainerKind::Array, b"[")
    }

    pub fn write_end_array(&mut self) -> Result<(), RdnError> {
        self.close_container(ContainerKind::Array, b']')
    }

    pub fn write_start_set(&mut self) -> Result<(), RdnError> {
        self.push_container(ContainerKind::Set, b"Set{")
    }

    pub fn write_end_set(&mut self) -> Result<(), RdnError> {
        self.close_container(ContainerKind::Set, b'}')
    }

    pub fn write_start_map(&mut self) -> Result<(), RdnError> {
        self.push_container(ContainerKind::Map, b"Map{")
    }

    pub fn write_end_map(&mut self) -> Result<(), RdnError> {
        self.close_container(ContainerKind::Map, b'}')
    }

    pub fn write_start_tuple(&mut self) -> Result<(), RdnError> {
        self.push_container(ContainerKind::Tuple, b"(")
    }

    pub fn write_end_tuple(&mut self) -> Result<(), RdnError> {
        self.close_container(ContainerKind::Tuple, b')')
    }

    /// `=>` between a map key and its value.
    pub fn write_map_arrow(&mut self) -> Result<(), RdnError> {
        if !self.options.skip_validation && self.expect != WriterExpect::Arrow {
            return Err(self.validation_error("WriteMapArrow called outside a map key/value gap"));
        }
        self.buf.extend_from_slice(b" => ");
        self.bits.set_map_awaiting_value(true);
        if !self.options.skip_validation {
            self.expect = WriterExpect::Value;
        }
        Ok(())
    }

    /// Emit the separator (comma, or nothing at all) and indentation that
    /// must precede the value/propertyName/container-open about to be
    /// written, and advance `expect` past the "first item" state.
    fn write_comma_if_needed(&mut self) -> Result<(), RdnError> {
        match self.expect {
            WriterExpect::CommaOrValue => {
                self.buf.push(b',');
                if self.containers.last().map(|c| c.is_map()).unwrap_or(false) {
                    self.bits.set_map_awaiting_value(false);
                }
                self.write_indent(self.containers.len());
                self.expect = WriterExpect::Value;
                Ok(())
            }
            WriterExpect::CommaOrPropertyName => {
                self.buf.push(b',');
                self.write_indent(self.containers.len());
                self.expect = WriterExpect::PropertyName;
                Ok(())
            }
            WriterExpect::Value | WriterExpect::PropertyName => {
                if !self.containers.is_empty() {
                    self.write_indent(self.containers.len());
                }
                Ok(())
            }
            WriterExpect::RootValue => Ok(()),
            WriterExpect::AfterRoot => Err(self.validation_error("a value was already written at the root")),
            WriterExpect::Arrow => Err(self.validation_error("expected WriteMapArrow before a map value")),
        }
    }

    pub fn write_property_name(&mut self, name: &str) -> Result<(), RdnError> {
        if !self.options.skip_validation
            && !matches!(self.expect, WriterExpect::PropertyName | WriterExpect::CommaOrPropertyName)
        {
            return Err(self.validation_error("expected a property name here"));
        }
        self.write_comma_if_needed()?;
        self.write_quoted(name);
        self.buf.extend_from_slice(b": ");
        if !self.options.skip_validation {
            self.expect = WriterExpect::Value;
        }
        Ok(())
    }

    fn write_quoted(&mut self, s: &str) {
        self.buf.push(b'"');
        self.options.encoder.encode_string(s, &mut self.buf);
        self.buf.push(b'"');
    }

    fn begin_value(&mut self) -> Result<(), RdnError> {
        self.check_can_write_value()?;
        self.write_comma_if_needed()
    }

    pub fn write_string_value(&mut self, value: &str) -> Result<(), RdnError> {
        self.begin_value()?;
        self.write_quoted(value);
        self.after_value_written();
        Ok(())
    }

    pub fn write_number_value(&mut self, value: f64) -> Result<(), RdnError> {
        self.begin_value()?;
        if value.is_nan() {
            self.buf.extend_from_slice(b"NaN");
        } else if value.is_infinite() {
            self.buf
                .extend_from_slice(if value > 0.0 { b"Infinity" } else { b"-Infinity" });
        } else {
            self.buf.extend_from_slice(format!("{value}").as_bytes());
        }
        self.after_value_written();
        Ok(())
    }

    pub fn write_big_integer_value(&mut self, value: &BigInt) -> Result<(), RdnError> {
        self.begin_value()?;
        self.buf.extend_from_slice(value.to_string().as_bytes());
        self.buf.push(b'n');
        self.after_value_written();
        Ok(())
    }

    pub fn write_boolean_value(&mut self, value: bool) -> Result<(), RdnError> {
        self.begin_value()?;
        self.buf
            .extend_from_slice(if value { b"true" } else { b"false" });
        self.after_value_written();
        Ok(())
    }

    pub fn write_null_value(&mut self) -> Result<(), RdnError> {
        self.begin_value()?;
        self.buf.extend_from_slice(b"null");
        self.after_value_written();
        Ok(())
    }

    pub fn write_date_time_value(
        &mut self,
        year: i32,
        month: u8,
        day: u8,
        time: Option<(u8, u8, u8, u32)>,
        offset_minutes: Option<i32>,
    ) -> Result<(), RdnError> {
        self.begin_value()?;
        self.buf.push(b'@');
        self.buf
            .extend_from_slice(format!("{year:04}-{month:02}-{day:02}").as_bytes());
        if let Some((h, m, s, ns)) = time {
            self.buf
                .extend_from_slice(format!("T{h:02}:{m:02}:{s:02}").as_bytes());
            if ns > 0 {
                self.buf.extend_from_slice(format!(".{ns:09}").as_bytes());
            }
            match offset_minutes {
                Some(0) => self.buf.push(b'Z'),
                Some(mins) => {
                    let sign = if mins < 0 { '-' } else { '+' };
                    let mins = mins.abs();
                    self.buf
                        .extend_from_slice(format!("{sign}{:02}:{:02}", mins / 60, mins % 60).as_bytes());
                }
                None => {}
            }
        }
        self.after_value_written();
        Ok(())
    }

    pub fn write_time_only_value(&mut self, hour: u8, minute: u8, second: u8, nanosecond: u32) -> Result<(), RdnError> {
        self.begin_value()?;
        self.buf
            .extend_from_slice(format!("@{hour:02}:{minute:02}:{second:02}").as_bytes());
        if nanosecond > 0 {
            self.buf
                .extend_from_slice(format!(".{nanosecond:09}").as_bytes());
        }
        self.after_value_written();
        Ok(())
    }

    pub fn write_unix_timestamp_value(&mut self, millis_or_seconds: i64) -> Result<(), RdnError> {
        self.begin_value()?;
        self.buf.push(b'@');
        self.buf
            .extend_from_slice(millis_or_seconds.to_string().as_bytes());
        self.after_value_written();
        Ok(())
    }

    pub fn write_duration_value(&mut self, duration: &tables::IsoDuration) -> Result<(), RdnError> {
        self.begin_value()?;
        self.buf.push(b'@');
        self.buf.push(b'P');
        write_designator(&mut self.buf, duration.years, b'Y');
        write_designator(&mut self.buf, duration.months, b'M');
        write_designator(&mut self.buf, duration.weeks, b'W');
        write_designator(&mut self.buf, duration.days, b'D');
        if duration.hours != 0.0 || duration.minutes != 0.0 || duration.seconds != 0.0 {
            self.buf.push(b'T');
            write_designator(&mut self.buf, duration.hours, b'H');
            write_designator(&mut self.buf, duration.minutes, b'M');
            write_designator(&mut self.buf, duration.seconds, b'S');
        }
        self.after_value_written();
        Ok(())
    }

    pub fn write_regexp_value(&mut self, pattern: &str, flags: &str) -> Result<(), RdnError> {
        self.begin_value()?;
        self.buf.push(b'/');
        self.buf.extend_from_slice(pattern.as_bytes());
        self.buf.push(b'/');
        self.buf.extend_from_slice(flags.as_bytes());
        self.after_value_written();
        Ok(())
    }

    pub fn write_binary_value(&mut self, bytes: &[u8], as_hex: bool) -> Result<(), RdnError> {
        self.begin_value()?;
        self.buf.push(if as_hex { b'x' } else { b'b' });
        self.buf.push(b'"');
        self.buf.extend_from_slice(binary::encode(bytes, as_hex).as_bytes());
        self.buf.push(b'"');
        self.after_value_written();
        Ok(())
    }

    /// Append an already-formatted, already-validated RDN value verbatim
    /// (e.g. a value round-tripped from [`crate::doc::Document`]
    /// without re-parsing it into a typed form). The caller is responsible
    /// for well-formedness; structural position is still checked unless
    /// `skip_validation` is set.
    pub fn write_raw_value(&mut self, raw: &[u8]) -> Result<(), RdnError> {
        self.begin_value()?;
        self.buf.extend_from_slice(raw);
        self.after_value_written();
        Ok(())
    }

    pub fn finish(self) -> Result<Vec<u8>, RdnError> {
        if !self.options.skip_validation
            && !matches!(self.expect, WriterExpect::AfterRoot)
            && !matches!(self.expect, WriterExpect::RootValue)
        {
            return Err(self.validation_error("document is not complete"));
        }
        Ok(self.buf)
    }
}

fn write_designator(buf: &mut Vec<u8>, value: f64, designator: u8) {
    if value == 0.0 {
        return;
    }
    if value.fract() == 0.0 {
        buf.extend_from_slice(format!("{}", value as i64).as_bytes());
    } else {
        buf.extend_from_slice(format!("{value}").as_bytes());
    }
    buf.push(designator);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finish(w: Writer) -> String {
        String::from_utf8(w.finish().unwrap()).unwrap()
    }

    #[test]
    fn writes_flat_array() {
        let mut w = Writer::new(WriterOptions::default());
        w.write_start_array().unwrap();
        w.write_number_value(1.0).unwrap();
        w.write_boolean_value(true).unwrap();
        w.write_null_value().unwrap();
        w.write_end_array().unwrap();
        assert_eq!(finish(w), "[1,true,null]");
    }

    #[test]
    fn writes_object_with_property() {
        let mut w = Writer::new(WriterOptions::default());
        w.write_start_object().unwrap();
        w.write_property_name("a").unwrap();
        w.write_number_value(1.0).unwrap();
        w.write_end_object().unwrap();
        assert_eq!(finish(w), r#"{"a": 1}"#);
    }

    #[test]
    fn writes_map_with_arrow() {
        let mut w = Writer::new(WriterOptions::default());
        w.write_start_map().unwrap();
        w.write_string_value("a").unwrap();
        w.write_map_arrow().unwrap();
        w.write_number_value(1.0).unwrap();
        w.write_end_map().unwrap();
        assert_eq!(finish(w), r#"Map{"a" => 1}"#);
    }

    #[test]
    fn property_without_value_position_is_rejected() {
        let mut w = Writer::new(WriterOptions::default());
        w.write_start_array().unwrap();
        let err = w.write_property_name("a").unwrap_err();
        assert!(matches!(err.kind, RdnErrorKind::WriteValidation { .. }));
    }

    #[test]
    fn mismatched_close_is_rejected() {
        let mut w = Writer::new(WriterOptions::default());
        w.write_start_array().unwrap();
        let err = w.write_end_object().unwrap_err();
        assert!(matches!(err.kind, RdnErrorKind::MismatchedClose { .. }));
    }

    #[test]
    fn indented_output_matches_expected_shape() {
        let mut w = Writer::new(WriterOptions {
            indented: true,
            ..WriterOptions::default()
        });
        w.write_start_object().unwrap();
        w.write_property_name("a").unwrap();
        w.write_start_array().unwrap();
        w.write_number_value(1.0).unwrap();
        w.write_number_value(2.0).unwrap();
        w.write_end_array().unwrap();
        w.write_end_object().unwrap();
        let out = finish(w);
        assert_eq!(out, "{\n  \"a\": [\n    1,\n    2\n  ]\n}");
    }

    #[test]
    fn duration_round_trips_designators() {
        let mut w = Writer::new(WriterOptions::default());
        let d = tables::IsoDuration {
            years: 1.0,
            months: 2.0,
            weeks: 0.0,
            days: 3.0,
            hours: 4.0,
            minutes: 5.0,
            seconds: 6.0,
        };
        w.write_duration_value(&d).unwrap();
        assert_eq!(finish(w), "@P1Y2M3DT4H5M6S");
    }
}
