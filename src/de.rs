//! TOML decoding.
//!
//! This module provides the [`Decoder`], a recursive-descent parser that
//! turns TOML text into a [`Table`], and the Serde glue that turns a decoded
//! [`Value`] into any `T: Deserialize`.
//!
//! ## Overview
//!
//! - **All or nothing**: the first violation aborts the decode; no partial
//!   document is ever returned
//! - **Positioned errors**: every error carries the line and column where
//!   parsing stopped
//! - **Structural checks**: duplicate keys, re-opened tables, and keys that
//!   would overwrite a table or an array of tables are all rejected
//!
//! ## Usage
//!
//! ```rust
//! use tidy_toml::{decode, Value};
//!
//! let doc = decode(r#"
//! title = "example"
//!
//! [owner]
//! name = "Tom"
//! dob = 1979-05-27T07:32:00-08:00
//!
//! [[fruit]]
//! name = "apple"
//! "#).unwrap();
//!
//! assert_eq!(doc.get("title").and_then(Value::as_str), Some("example"));
//! assert!(doc.get_path(&["owner", "dob"]).unwrap().is_datetime());
//! assert!(doc.get("fruit").unwrap().is_array_of_tables());
//! ```
//!
//! With Serde:
//!
//! ```rust
//! use serde::Deserialize;
//!
//! #[derive(Deserialize, Debug, PartialEq)]
//! struct Server { host: String, port: u16 }
//!
//! let server: Server = tidy_toml::from_str("host = \"localhost\"\nport = 8080").unwrap();
//! assert_eq!(server, Server { host: "localhost".to_string(), port: 8080 });
//! ```

use crate::cursor::Cursor;
use crate::lexical::{self, BASIC_INLINE, BASIC_MULTI, LITERAL_INLINE, LITERAL_MULTI};
use crate::{offset, Error, Result, Table, Value};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use log::{debug, trace};
use num_bigint::BigInt;
use regex::{Captures, Regex};
use serde::{de, forward_to_deserialize_any};
use std::collections::HashSet;

type KeyPath = Vec<String>;

/// Outcome of following one key while walking a table path.
enum PathStep<'t> {
    Created(&'t mut Table),
    Descended(&'t mut Table),
    Conflict,
}

/// The TOML decoder.
///
/// A decoder is built for one input and consumed by [`Decoder::decode`].
pub struct Decoder<'a> {
    cursor: Cursor<'a>,
}

/// Decodes TOML text into a document.
///
/// # Errors
///
/// Returns [`Error::Decode`] on the first grammar or structure violation.
///
/// # Examples
///
/// ```rust
/// let doc = tidy_toml::decode("fruit.apple.smooth = true\nfruit.orange = 2").unwrap();
/// assert_eq!(doc.get_path(&["fruit", "orange"]).and_then(|v| v.as_i64()), Some(2));
///
/// assert!(tidy_toml::decode("a = 1\na = 2").is_err());
/// ```
pub fn decode(text: &str) -> Result<Table> {
    Decoder::new(text).decode()
}

/// Decodes UTF-8 encoded TOML.
///
/// Invalid UTF-8 is reported as a decode error at the position of the first
/// bad byte.
///
/// ```rust
/// assert!(tidy_toml::decode_slice(b"a = 1").is_ok());
/// assert!(tidy_toml::decode_slice(b"a = \"\xff\"").unwrap_err().is_decode());
/// ```
pub fn decode_slice(bytes: &[u8]) -> Result<Table> {
    match std::str::from_utf8(bytes) {
        Ok(text) => decode(text),
        Err(e) => {
            let valid = String::from_utf8_lossy(&bytes[..e.valid_up_to()]);
            let line = valid.matches('\n').count() + 1;
            let col = valid.rsplit('\n').next().map_or(0, |l| l.chars().count()) + 1;
            Err(Error::decode(line, col, "invalid UTF-8 input"))
        }
    }
}

impl<'a> Decoder<'a> {
    #[must_use]
    pub fn new(text: &'a str) -> Self {
        Decoder {
            cursor: Cursor::new(text),
        }
    }

    /// Parses the whole input.
    pub fn decode(mut self) -> Result<Table> {
        self.cursor.eat_ws(false)?;
        let document = self.decode_root()?;
        self.cursor.eat_ws(false)?;

        if !self.cursor.eof() {
            return Err(self.cursor.error("extraneous input"));
        }
        Ok(document)
    }

    fn decode_root(&mut self) -> Result<Table> {
        let mut document = Table::new();

        while !self.cursor.eof() {
            if self.cursor.has_prefix("[[") {
                self.decode_table_array(&mut document)?;
            } else if self.cursor.has_prefix("[") {
                self.decode_table(&mut document)?;
            } else if self.at_key_start() {
                self.decode_kv(&mut document)?;
            } else {
                return Err(self.cursor.error(format!(
                    "unknown input: {}",
                    self.cursor.remaining_line()
                )));
            }
            self.cursor.eat_ws(false)?;
        }

        Ok(document)
    }

    fn at_key_start(&self) -> bool {
        self.cursor.has_prefix(BASIC_INLINE)
            || self.cursor.has_prefix(LITERAL_INLINE)
            || self.cursor.peek_match(lexical::key_regex()).is_some()
    }

    /// Walks `path` from `table`, creating missing tables along the way.
    ///
    /// With `allow_array_descent`, an array of tables on the path is entered
    /// through its last element.
    fn make_table_path<'t>(
        &self,
        mut table: &'t mut Table,
        path: &[String],
        allow_array_descent: bool,
    ) -> Result<&'t mut Table> {
        for key in path {
            table = match step_into(table, key, allow_array_descent) {
                PathStep::Created(next) => {
                    trace!("created implicit table {}", key);
                    next
                }
                PathStep::Descended(next) => next,
                PathStep::Conflict => {
                    return Err(self.cursor.error(format!(
                        "key path {} overlaps with existing value",
                        dotted(path)
                    )))
                }
            };
        }
        Ok(table)
    }

    /// Key-value statements until end of input or the next table header.
    fn decode_kv(&mut self, table: &mut Table) -> Result<()> {
        let mut bound = HashSet::new();

        while !self.cursor.eof() && !self.cursor.has_prefix("[") {
            self.decode_pair(table, &mut bound, true)?;
            self.cursor.eat_ws(true)?;
        }
        Ok(())
    }

    /// One `key = value` pair, shared by table bodies and inline tables.
    fn decode_pair(
        &mut self,
        table: &mut Table,
        bound: &mut HashSet<KeyPath>,
        allow_array_descent: bool,
    ) -> Result<()> {
        let key = self.decode_key()?;

        if let Some(prefix) = (1..key.len()).map(|n| &key[..n]).find(|p| bound.contains(*p)) {
            return Err(self.cursor.error(format!(
                "cannot add key {} when {} is already defined",
                dotted(&key),
                dotted(prefix)
            )));
        }

        self.cursor.eat_inline_ws();
        if !self.cursor.remove_prefix("=") {
            return Err(self.cursor.error("missing = after key"));
        }
        self.cursor.eat_inline_ws();

        let (leaf, parents) = key
            .split_last()
            .ok_or_else(|| self.cursor.error("expected a key"))?;
        let parent = self.make_table_path(table, parents, allow_array_descent)?;
        if parent.contains_key(leaf) {
            return Err(self.cursor.error(format!("duplicate key {}", dotted(&key))));
        }

        let value = self.decode_value()?;
        parent.insert(leaf.clone(), value);
        bound.insert(key);
        Ok(())
    }

    /// A `[a.b]` header and the key-values under it.
    fn decode_table(&mut self, document: &mut Table) -> Result<()> {
        self.cursor.remove_prefix("[");
        self.cursor.eat_inline_ws();
        let path = self.decode_key()?;
        debug!("opening table [{}] at line {}", dotted(&path), self.cursor.line());

        let (leaf, parents) = path
            .split_last()
            .ok_or_else(|| self.cursor.error("expected a table name"))?;
        let parent = self.make_table_path(document, parents, true)?;

        match parent.get(leaf) {
            None => {
                parent.insert(leaf.clone(), Value::Table(Table::new()));
            }
            Some(Value::Table(existing)) => {
                let has_kv = existing
                    .values()
                    .any(|v| !v.is_table() && !v.is_array_of_tables());
                if has_kv {
                    return Err(self.cursor.error(format!("duplicated table [{}]", dotted(&path))));
                }
            }
            Some(other) => {
                return Err(self.cursor.error(format!(
                    "value already defined as {}",
                    other.type_name()
                )))
            }
        }

        let table = match parent.get_mut(leaf) {
            Some(Value::Table(table)) => table,
            _ => return Err(self.cursor.error(format!("duplicated table [{}]", dotted(&path)))),
        };

        self.cursor.eat_inline_ws();
        if !self.cursor.remove_prefix("]") {
            return Err(self.cursor.error("unclosed table header, expected ]"));
        }
        self.cursor.eat_ws(true)?;
        self.decode_kv(table)
    }

    /// A `[[a.b]]` header, which appends a fresh table, and its key-values.
    fn decode_table_array(&mut self, document: &mut Table) -> Result<()> {
        self.cursor.remove_prefix("[[");
        self.cursor.eat_inline_ws();
        let path = self.decode_key()?;
        debug!("appending to table array [[{}]] at line {}", dotted(&path), self.cursor.line());

        let (leaf, parents) = path
            .split_last()
            .ok_or_else(|| self.cursor.error("expected a table name"))?;
        let parent = self.make_table_path(document, parents, true)?;

        match parent.get_mut(leaf) {
            None => {
                parent.insert(leaf.clone(), Value::Array(vec![Value::Table(Table::new())]));
            }
            Some(Value::Array(items)) if !items.is_empty() && items.iter().all(Value::is_table) => {
                items.push(Value::Table(Table::new()));
            }
            Some(Value::Array(_)) => {
                return Err(self.cursor.error("cannot add table to existing list"));
            }
            Some(_) => {
                return Err(self.cursor.error(format!("duplicated table [[{}]]", dotted(&path))));
            }
        }

        let table = match parent.get_mut(leaf) {
            Some(Value::Array(items)) => match items.last_mut() {
                Some(Value::Table(table)) => table,
                _ => return Err(self.cursor.error("cannot add table to existing list")),
            },
            _ => return Err(self.cursor.error("cannot add table to existing list")),
        };

        self.cursor.eat_inline_ws();
        if !self.cursor.remove_prefix("]]") {
            return Err(self.cursor.error("unclosed table array header, expected ]]"));
        }
        self.cursor.eat_ws(true)?;
        self.decode_kv(table)
    }

    /// A dotted key: bare, basic or literal segments joined by `.`.
    fn decode_key(&mut self) -> Result<KeyPath> {
        let mut path = Vec::new();

        loop {
            self.cursor.eat_inline_ws();
            if self.cursor.eof() {
                return Err(self.cursor.error("unexpected end of input while parsing key"));
            }

            if !path.is_empty() {
                if !self.cursor.remove_prefix(".") {
                    return Ok(path);
                }
                self.cursor.eat_inline_ws();
            } else if self.cursor.has_prefix(".") {
                return Err(self.cursor.error("unexpected dot at start of key"));
            }

            if let Some(segment) = self.cursor.take_match(lexical::key_regex()) {
                path.push(segment.to_string());
            } else if self.cursor.has_prefix(BASIC_INLINE) {
                path.push(self.decode_basic_string()?);
            } else if self.cursor.has_prefix(LITERAL_INLINE) {
                path.push(self.decode_literal_string()?);
            } else if path.is_empty() {
                return Err(self.cursor.error("expected a key"));
            } else {
                return Err(self.cursor.error("expected a key after ."));
            }
        }
    }

    fn decode_value(&mut self) -> Result<Value> {
        let rest = self.cursor.rest();

        if let Some(caps) = lexical::time_regex().captures(rest) {
            let time = parse_time(&caps, 1).map(Value::LocalTime);
            return self.finish_datetime(time, &caps);
        }
        if let Some(caps) = lexical::datetime_regex().captures(rest) {
            let naive = match (parse_date(&caps, 1), parse_time(&caps, 4)) {
                (Some(date), Some(time)) => Some(NaiveDateTime::new(date, time)),
                _ => None,
            };
            let value = match caps.get(8) {
                None => naive.map(Value::LocalDateTime),
                Some(tz) => naive.and_then(|naive| {
                    offset::fixed_offset(tz.as_str())
                        .and_then(|tz| tz.from_local_datetime(&naive).single())
                        .map(Value::OffsetDateTime)
                }),
            };
            return self.finish_datetime(value, &caps);
        }
        if let Some(caps) = lexical::date_regex().captures(rest) {
            let date = parse_date(&caps, 1).map(Value::LocalDate);
            return self.finish_datetime(date, &caps);
        }

        if self.cursor.has_prefix("{") {
            return self.decode_inline_table().map(Value::Table);
        }
        if self.cursor.has_prefix("[") {
            return self.decode_inline_array().map(Value::Array);
        }
        if self.cursor.has_prefix(BASIC_INLINE) || self.cursor.has_prefix(LITERAL_INLINE) {
            return self.decode_string().map(Value::String);
        }
        if self.cursor.remove_prefix("true") {
            return Ok(Value::Boolean(true));
        }
        if self.cursor.remove_prefix("false") {
            return Ok(Value::Boolean(false));
        }
        if ["+nan", "-nan", "nan"].iter().any(|p| self.cursor.remove_prefix(p)) {
            return Ok(Value::Float(f64::NAN));
        }
        if ["+inf", "inf"].iter().any(|p| self.cursor.remove_prefix(p)) {
            return Ok(Value::Float(f64::INFINITY));
        }
        if self.cursor.remove_prefix("-inf") {
            return Ok(Value::Float(f64::NEG_INFINITY));
        }

        match self.cursor.peek_char() {
            Some(c) if c == '+' || c == '-' || c.is_ascii_digit() => self.decode_number(),
            _ => Err(self.cursor.error("missing value")),
        }
    }

    /// Consumes a matched date/time, or fails if its fields are out of range.
    fn finish_datetime(&mut self, value: Option<Value>, caps: &Captures<'_>) -> Result<Value> {
        let value = value.ok_or_else(|| {
            self.cursor
                .error(format!("invalid RFC-3339 date/time {}", &caps[0]))
        })?;
        self.cursor.take(caps[0].chars().count())?;
        Ok(value)
    }

    fn decode_number(&mut self) -> Result<Value> {
        let prefixed: [(&str, &Regex, u32); 3] = [
            ("0x", lexical::hex_regex(), 16),
            ("0o", lexical::octal_regex(), 8),
            ("0b", lexical::binary_regex(), 2),
        ];
        for (prefix, pattern, radix) in prefixed {
            if self.cursor.has_prefix(prefix) {
                let text = self
                    .cursor
                    .take_match(pattern)
                    .ok_or_else(|| self.cursor.error("invalid number"))?;
                return self.integer(&text[prefix.len()..], radix);
            }
        }

        let int_text = self
            .cursor
            .peek_match(lexical::int_regex())
            .ok_or_else(|| self.cursor.error("invalid number"))?;
        let float_text = self
            .cursor
            .peek_match(lexical::float_regex())
            .ok_or_else(|| self.cursor.error("invalid number"))?;

        let leading = int_text.trim_start_matches(|c| c == '+' || c == '-');
        if leading != "0" && leading.starts_with('0') {
            return Err(self.cursor.error(format!("invalid leading zeros in {}", int_text)));
        }

        if float_text.len() == int_text.len() {
            self.cursor.take_match(lexical::int_regex());
            return self.integer(int_text, 10);
        }

        self.cursor.take_match(lexical::float_regex());
        float_text
            .replace('_', "")
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|_| self.cursor.error(format!("invalid float {}", float_text)))
    }

    fn integer(&self, digits: &str, radix: u32) -> Result<Value> {
        BigInt::parse_bytes(digits.replace('_', "").as_bytes(), radix)
            .map(Value::Integer)
            .ok_or_else(|| self.cursor.error(format!("invalid integer {}", digits)))
    }

    fn decode_string(&mut self) -> Result<String> {
        if self.cursor.has_prefix(BASIC_MULTI) {
            self.decode_multi_line_basic()
        } else if self.cursor.has_prefix(LITERAL_MULTI) {
            self.decode_multi_line_literal()
        } else if self.cursor.has_prefix(BASIC_INLINE) {
            self.decode_basic_string()
        } else {
            self.decode_literal_string()
        }
    }

    fn decode_basic_string(&mut self) -> Result<String> {
        self.cursor.remove_prefix(BASIC_INLINE);
        let mut out = String::new();

        loop {
            match self.cursor.next_char() {
                None => return Err(self.cursor.error("unexpected end of input, expected \"")),
                Some('"') => return Ok(out),
                Some('\r' | '\n') => {
                    return Err(self.cursor.error("unexpected newline in string"));
                }
                Some('\\') => out.push(self.unescape()?),
                Some(c) if lexical::is_control(c) => {
                    return Err(self.cursor.error("unescaped control character in string"));
                }
                Some(c) => out.push(c),
            }
        }
    }

    fn decode_literal_string(&mut self) -> Result<String> {
        self.cursor.remove_prefix(LITERAL_INLINE);
        let mut out = String::new();

        loop {
            match self.cursor.next_char() {
                None => return Err(self.cursor.error("unexpected end of input, expected '")),
                Some('\'') => return Ok(out),
                Some('\r' | '\n') => {
                    return Err(self.cursor.error("unexpected newline in string"));
                }
                Some(c) if lexical::is_control(c) => {
                    return Err(self.cursor.error("unescaped control character in string"));
                }
                Some(c) => out.push(c),
            }
        }
    }

    fn decode_multi_line_basic(&mut self) -> Result<String> {
        self.cursor.remove_prefix(BASIC_MULTI);
        self.trim_opening_newline();
        let mut out = String::new();

        loop {
            if self.cursor.remove_prefix(BASIC_MULTI) {
                self.absorb_quotes(&mut out, BASIC_INLINE);
                return Ok(out);
            }
            match self.cursor.next_char() {
                None => {
                    return Err(self.cursor.error("unexpected end of input, expected \"\"\""));
                }
                Some('\\') if self.at_line_continuation() => {
                    self.cursor.eat_while(|c| matches!(c, ' ' | '\t' | '\r' | '\n'));
                }
                Some('\\') => out.push(self.unescape()?),
                Some('\r') if self.cursor.has_prefix("\n") => {}
                Some(c) if c != '\r' && c != '\n' && lexical::is_control(c) => {
                    return Err(self.cursor.error("unescaped control character in string"));
                }
                Some(c) => out.push(c),
            }
        }
    }

    fn decode_multi_line_literal(&mut self) -> Result<String> {
        self.cursor.remove_prefix(LITERAL_MULTI);
        self.trim_opening_newline();
        let mut out = String::new();

        loop {
            if self.cursor.remove_prefix(LITERAL_MULTI) {
                self.absorb_quotes(&mut out, LITERAL_INLINE);
                return Ok(out);
            }
            match self.cursor.next_char() {
                None => return Err(self.cursor.error("unexpected end of input, expected '''")),
                Some('\r') if self.cursor.has_prefix("\n") => {}
                Some(c) if c != '\r' && c != '\n' && lexical::is_control(c) => {
                    return Err(self.cursor.error("unescaped control character in string"));
                }
                Some(c) => out.push(c),
            }
        }
    }

    fn trim_opening_newline(&mut self) {
        if !self.cursor.remove_prefix("\n") {
            self.cursor.remove_prefix("\r\n");
        }
    }

    /// Up to two quotes right after a closing delimiter belong to the content.
    fn absorb_quotes(&mut self, out: &mut String, quote: &str) {
        for _ in 0..2 {
            if self.cursor.remove_prefix(quote) {
                out.push_str(quote);
            }
        }
    }

    /// A backslash is a line continuation when only spaces and tabs separate it
    /// from the end of the line.
    fn at_line_continuation(&self) -> bool {
        let rest = self.cursor.rest().trim_start_matches(|c| c == ' ' || c == '\t');
        rest.starts_with('\n') || rest.starts_with("\r\n")
    }

    fn unescape(&mut self) -> Result<char> {
        let c = self
            .cursor
            .next_char()
            .ok_or_else(|| self.cursor.error("unexpected end of input in escape sequence"))?;

        let width = match c {
            'u' => 4,
            'U' => 8,
            _ => {
                return lexical::unescape(c)
                    .ok_or_else(|| self.cursor.error(format!("unknown escape sequence \\{}", c)))
            }
        };

        let digits = self.cursor.take(width)?;
        if !digits.chars().all(|d| d.is_ascii_hexdigit()) {
            return Err(self.cursor.error("expected a valid unicode scalar value"));
        }
        u32::from_str_radix(digits, 16)
            .ok()
            .and_then(char::from_u32)
            .ok_or_else(|| self.cursor.error(format!("invalid unicode scalar value {}", digits)))
    }

    fn decode_inline_table(&mut self) -> Result<Table> {
        self.cursor.remove_prefix("{");
        self.cursor.eat_inline_ws();
        let mut table = Table::new();
        let mut bound = HashSet::new();
        let mut first = true;

        loop {
            if self.cursor.eof() {
                return Err(self.cursor.error("unexpected end of input, expected }"));
            }
            if self.cursor.remove_prefix("}") {
                return Ok(table);
            }
            if !first {
                if !self.cursor.remove_prefix(",") {
                    return Err(self.cursor.error("expected , or }"));
                }
                self.cursor.eat_inline_ws();
            }
            first = false;

            self.decode_pair(&mut table, &mut bound, false)?;
            self.cursor.eat_inline_ws();
        }
    }

    fn decode_inline_array(&mut self) -> Result<Vec<Value>> {
        self.cursor.remove_prefix("[");
        self.cursor.eat_ws(false)?;
        let mut items = Vec::new();

        while !self.cursor.eof() {
            if !items.is_empty() {
                if self.cursor.remove_prefix(",") {
                    self.cursor.eat_ws(false)?;
                } else if !self.cursor.has_prefix("]") {
                    break;
                }
            }
            if self.cursor.remove_prefix("]") {
                return Ok(items);
            }

            items.push(self.decode_value()?);
            self.cursor.eat_ws(false)?;
        }

        Err(self.cursor.error("expected ]"))
    }
}

fn step_into<'t>(table: &'t mut Table, key: &str, allow_array_descent: bool) -> PathStep<'t> {
    if !table.contains_key(key) {
        table.insert(key.to_string(), Value::Table(Table::new()));
        return match table.get_mut(key) {
            Some(Value::Table(created)) => PathStep::Created(created),
            _ => PathStep::Conflict,
        };
    }

    match table.get_mut(key) {
        Some(Value::Table(existing)) => PathStep::Descended(existing),
        Some(Value::Array(items))
            if allow_array_descent && !items.is_empty() && items.iter().all(Value::is_table) =>
        {
            match items.last_mut() {
                Some(Value::Table(last)) => PathStep::Descended(last),
                _ => PathStep::Conflict,
            }
        }
        _ => PathStep::Conflict,
    }
}

fn dotted(path: &[String]) -> String {
    path.join(".")
}

fn field(caps: &Captures<'_>, index: usize) -> Option<u32> {
    caps.get(index)?.as_str().parse().ok()
}

/// Year, month and day from three consecutive groups. Year 0 is rejected.
fn parse_date(caps: &Captures<'_>, first: usize) -> Option<NaiveDate> {
    let year: i32 = caps.get(first)?.as_str().parse().ok()?;
    if year < 1 {
        return None;
    }
    NaiveDate::from_ymd_opt(year, field(caps, first + 1)?, field(caps, first + 2)?)
}

/// Hour, minute, second and an optional fraction padded or cut to microseconds.
fn parse_time(caps: &Captures<'_>, first: usize) -> Option<NaiveTime> {
    let micro = match caps.get(first + 3) {
        Some(fraction) => {
            let digits = fraction.as_str();
            format!("{:0<6}", &digits[..digits.len().min(6)]).parse().ok()?
        }
        None => 0,
    };
    NaiveTime::from_hms_micro_opt(
        field(caps, first)?,
        field(caps, first + 1)?,
        field(caps, first + 2)?,
        micro,
    )
}

/// Deserializes a decoded [`Value`] into any `T: Deserialize`.
pub struct ValueDeserializer {
    value: Value,
}

impl ValueDeserializer {
    #[must_use]
    pub fn new(value: Value) -> Self {
        ValueDeserializer { value }
    }
}

impl<'de> de::Deserializer<'de> for ValueDeserializer {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Value::String(s) => visitor.visit_string(s),
            Value::Integer(i) => {
                if let Ok(n) = i64::try_from(&i) {
                    visitor.visit_i64(n)
                } else if let Ok(n) = u64::try_from(&i) {
                    visitor.visit_u64(n)
                } else if let Ok(n) = i128::try_from(&i) {
                    visitor.visit_i128(n)
                } else {
                    Err(Error::custom(format!("integer {} is out of range", i)))
                }
            }
            Value::Float(f) => visitor.visit_f64(f),
            Value::Boolean(b) => visitor.visit_bool(b),
            value @ (Value::LocalDate(_)
            | Value::LocalTime(_)
            | Value::LocalDateTime(_)
            | Value::OffsetDateTime(_)) => visitor.visit_string(value.to_string()),
            Value::Array(arr) => visitor.visit_seq(SeqDeserializer::new(arr)),
            Value::Table(table) => visitor.visit_map(MapDeserializer::new(table)),
        }
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_some(self)
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_enum<V>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Value::String(variant) => visitor.visit_enum(EnumDeserializer::new(variant, None)),
            Value::Table(table) if table.len() == 1 => match table.into_iter().next() {
                Some((variant, value)) => {
                    visitor.visit_enum(EnumDeserializer::new(variant, Some(value)))
                }
                None => Err(Error::custom("expected a single-key table for enum")),
            },
            other => Err(Error::custom(format!(
                "expected string or single-key table for enum, found {}",
                other.type_name()
            ))),
        }
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf unit unit_struct seq tuple
        tuple_struct map struct identifier ignored_any
    }
}

struct SeqDeserializer {
    iter: std::vec::IntoIter<Value>,
}

impl SeqDeserializer {
    fn new(vec: Vec<Value>) -> Self {
        SeqDeserializer {
            iter: vec.into_iter(),
        }
    }
}

impl<'de> de::SeqAccess<'de> for SeqDeserializer {
    type Error = Error;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>>
    where
        T: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some(value) => seed.deserialize(ValueDeserializer::new(value)).map(Some),
            None => Ok(None),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        match self.iter.size_hint() {
            (lower, Some(upper)) if lower == upper => Some(upper),
            _ => None,
        }
    }
}

struct MapDeserializer {
    iter: indexmap::map::IntoIter<String, Value>,
    value: Option<Value>,
}

impl MapDeserializer {
    fn new(table: Table) -> Self {
        MapDeserializer {
            iter: table.into_iter(),
            value: None,
        }
    }
}

impl<'de> de::MapAccess<'de> for MapDeserializer {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>>
    where
        K: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some((key, value)) => {
                self.value = Some(value);
                seed.deserialize(ValueDeserializer::new(Value::String(key)))
                    .map(Some)
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value>
    where
        V: de::DeserializeSeed<'de>,
    {
        match self.value.take() {
            Some(value) => seed.deserialize(ValueDeserializer::new(value)),
            None => Err(Error::custom("next_value_seed called before next_key_seed")),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        match self.iter.size_hint() {
            (lower, Some(upper)) if lower == upper => Some(upper),
            _ => None,
        }
    }
}

struct EnumDeserializer {
    variant: String,
    value: Option<Value>,
}

impl EnumDeserializer {
    fn new(variant: String, value: Option<Value>) -> Self {
        EnumDeserializer { variant, value }
    }
}

impl<'de> de::EnumAccess<'de> for EnumDeserializer {
    type Error = Error;
    type Variant = VariantDeserializer;

    fn variant_seed<V>(self, seed: V) -> Result<(V::Value, Self::Variant)>
    where
        V: de::DeserializeSeed<'de>,
    {
        let variant = seed.deserialize(ValueDeserializer::new(Value::String(self.variant)))?;
        Ok((variant, VariantDeserializer { value: self.value }))
    }
}

struct VariantDeserializer {
    value: Option<Value>,
}

impl<'de> de::VariantAccess<'de> for VariantDeserializer {
    type Error = Error;

    fn unit_variant(self) -> Result<()> {
        match self.value {
            None => Ok(()),
            Some(_) => Err(Error::custom("expected unit variant")),
        }
    }

    fn newtype_variant_seed<T>(self, seed: T) -> Result<T::Value>
    where
        T: de::DeserializeSeed<'de>,
    {
        match self.value {
            Some(value) => seed.deserialize(ValueDeserializer::new(value)),
            None => Err(Error::custom("expected newtype variant")),
        }
    }

    fn tuple_variant<V>(self, _len: usize, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Some(Value::Array(arr)) => visitor.visit_seq(SeqDeserializer::new(arr)),
            _ => Err(Error::custom("expected tuple variant")),
        }
    }

    fn struct_variant<V>(self, _fields: &'static [&'static str], visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Some(Value::Table(table)) => visitor.visit_map(MapDeserializer::new(table)),
            _ => Err(Error::custom("expected struct variant")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn err_msg(text: &str) -> String {
        decode(text).unwrap_err().message().to_string()
    }

    #[test]
    fn test_step_into_outcomes() {
        let mut table = Table::new();
        table.insert("scalar".to_string(), Value::from(1));
        table.insert(
            "list".to_string(),
            Value::Array(vec![Value::Table(Table::new())]),
        );

        assert!(matches!(step_into(&mut table, "new", false), PathStep::Created(_)));
        assert!(matches!(step_into(&mut table, "new", false), PathStep::Descended(_)));
        assert!(matches!(step_into(&mut table, "scalar", true), PathStep::Conflict));
        assert!(matches!(step_into(&mut table, "list", true), PathStep::Descended(_)));
        assert!(matches!(step_into(&mut table, "list", false), PathStep::Conflict));
    }

    #[test]
    fn test_error_positions() {
        match decode("a = 1\nb = \n").unwrap_err() {
            Error::Decode { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_error_messages() {
        assert!(err_msg("a = 1\na = 2").contains("duplicate key"));
        assert!(err_msg("a = 1 b = 2").contains("unexpected content on line"));
        assert!(err_msg("a 1").contains("missing ="));
        assert!(err_msg("a = ").contains("missing value"));
        assert!(err_msg("a.b = 1\na.b.c = 2").contains("already defined"));
        assert!(err_msg("a = [1, 2").contains("expected ]"));
        assert!(err_msg("a = 007").contains("leading zeros"));
        assert!(err_msg("a = 1979-13-01").contains("RFC-3339"));
        assert!(err_msg("= 1").contains("unknown input"));
    }

    #[test]
    fn test_table_reopen_rules() {
        assert!(decode("[a.b]\nx = 1\n[a]\ny = 2").is_ok());
        assert!(decode("[a]\nx = 1\n[a]\ny = 2").is_err());
        assert!(err_msg("a = 1\n[a]").contains("already defined as integer"));
    }

    #[test]
    fn test_table_array_rules() {
        let doc = decode("[[a]]\nx = 1\n[[a]]\nx = 2\n[a.sub]\ny = 3").unwrap();
        let items = doc.get("a").and_then(Value::as_array).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(
            items[1].as_table().unwrap().get_path(&["sub", "y"]),
            Some(&Value::from(3))
        );

        assert!(err_msg("a = []\n[[a]]").contains("cannot add table"));
        assert!(err_msg("[a]\n[[a]]").contains("duplicated table"));
    }

    #[test]
    fn test_numbers() {
        let doc = decode("a = 0\nb = 0.0\nc = -0.0\nd = 0xDEAD_beef\ne = 1_000\nf = 6.02e+23").unwrap();
        assert_eq!(doc.get("a"), Some(&Value::from(0)));
        assert_eq!(doc.get("b"), Some(&Value::Float(0.0)));
        assert!(doc.get("c").and_then(Value::as_float).unwrap().is_sign_negative());
        assert_eq!(doc.get("d"), Some(&Value::from(0xdead_beef_u32)));
        assert_eq!(doc.get("e"), Some(&Value::from(1000)));
        assert_eq!(doc.get("f"), Some(&Value::Float(6.02e23)));
    }

    #[test]
    fn test_fraction_normalization() {
        let doc = decode("dt = 1979-05-27T07:32:00.9999999Z\nt = 07:32:00.123").unwrap();
        match doc.get("dt") {
            Some(Value::OffsetDateTime(dt)) => assert_eq!(dt.timestamp_subsec_micros(), 999_999),
            other => panic!("unexpected value {:?}", other),
        }
        assert_eq!(
            doc.get("t"),
            Some(&Value::LocalTime(NaiveTime::from_hms_micro_opt(7, 32, 0, 123_000).unwrap()))
        );

        assert!(decode("dt2 = 1979-05-27T07:32:00.9Z").is_err());
    }

    #[test]
    fn test_string_forms() {
        let doc = decode(
            "a = \"tab\\there \\u00e9\"\nb = 'C:\\path'\nc = \"\"\"\nline one\\\n    line two\"\"\"\nd = '''\nraw\\n'''",
        )
        .unwrap();
        assert_eq!(doc.get("a").and_then(Value::as_str), Some("tab\there é"));
        assert_eq!(doc.get("b").and_then(Value::as_str), Some("C:\\path"));
        assert_eq!(doc.get("c").and_then(Value::as_str), Some("line oneline two"));
        assert_eq!(doc.get("d").and_then(Value::as_str), Some("raw\\n"));
    }

    #[test]
    fn test_multi_line_strings_normalize_crlf() {
        let doc = decode("a = \"\"\"\r\none\r\ntwo\\r\\n\"\"\"\r\nb = '''\r\nx\r\ny'''\r\n").unwrap();
        assert_eq!(doc.get("a").and_then(Value::as_str), Some("one\ntwo\r\n"));
        assert_eq!(doc.get("b").and_then(Value::as_str), Some("x\ny"));
    }

    #[test]
    fn test_closing_quote_absorption() {
        let doc = decode("a = \"\"\"x\"\"\"\"\"\nb = '''y''''").unwrap();
        assert_eq!(doc.get("a").and_then(Value::as_str), Some("x\"\""));
        assert_eq!(doc.get("b").and_then(Value::as_str), Some("y'"));
    }

    #[test]
    fn test_invalid_escapes() {
        assert!(err_msg("a = \"\\q\"").contains("unknown escape"));
        assert!(decode("a = \"\\u00g0\"").is_err());
        assert!(err_msg("a = \"\\uD800\"").contains("invalid unicode scalar"));
        assert!(decode("a = \"\\U0011FFFF\"").is_err());
    }

    #[test]
    fn test_keys() {
        let doc = decode("\"quoted key\" = 1\n'lit' = 2\nsite . \"google.com\" = true").unwrap();
        assert!(doc.contains_key("quoted key"));
        assert!(doc.contains_key("lit"));
        assert_eq!(doc.get_path(&["site", "google.com"]), Some(&Value::from(true)));

        assert!(decode(".a = 1").is_err());
        assert!(decode("a. = 1").is_err());
        assert!(decode("a").is_err());
    }

    #[test]
    fn test_inline_tables() {
        let doc = decode("point = { x = 1, y.z = 2 }\nempty = {}").unwrap();
        assert_eq!(doc.get_path(&["point", "y", "z"]), Some(&Value::from(2)));
        assert_eq!(doc.get("empty"), Some(&Value::Table(Table::new())));

        assert!(err_msg("a = { x = 1, }").contains("expected a key"));
        assert!(err_msg("a = { x = 1 y = 2 }").contains("expected , or }"));
        assert!(decode("a = { x = 1, x = 2 }").is_err());
    }

    #[test]
    fn test_decode_slice_reports_position() {
        let err = decode_slice(b"a = 1\nb = \"\xc3\"").unwrap_err();
        assert_eq!(err, Error::decode(2, 6, "invalid UTF-8 input"));
    }
}
