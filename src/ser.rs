//! TOML encoding.
//!
//! This module provides the [`Encoder`], which writes a [`Table`] as
//! canonical, pretty-printed TOML, and the [`ValueSerializer`] that turns any
//! `T: Serialize` into a [`Value`] first.
//!
//! ## Overview
//!
//! The encoder normalizes layout rather than preserving it:
//!
//! - **Table blocks**: sub-tables and arrays of tables become `[a.b]` and
//!   `[[a.b]]` blocks, indented one level per emitted ancestor header
//! - **Wrapper collapsing**: a table whose only entry is another table gets no
//!   header of its own
//! - **String styles**: the lightest of basic, literal, multi-line basic and
//!   multi-line literal that represents the text exactly
//! - **Array layout**: one line when short, one element per line otherwise
//!
//! ## Usage
//!
//! ```rust
//! use tidy_toml::{decode, encode};
//!
//! let doc = decode("[server]\nhost = 'localhost'\n[server.tls]\nport = 443").unwrap();
//! assert_eq!(
//!     encode(&doc).unwrap(),
//!     "[server]\nhost = \"localhost\"\n\n  [server.tls]\n  port = 443\n"
//! );
//! ```
//!
//! ## Direct Encoder Usage
//!
//! ```rust
//! use tidy_toml::{decode, EncodeOptions, Encoder};
//!
//! let doc = decode("b = [1, 2]\na = 'x'").unwrap();
//! let options = EncodeOptions::sorted();
//! let encoder = Encoder::new(&options);
//! assert_eq!(encoder.encode(&doc).unwrap(), "a = \"x\"\nb = [1, 2]\n");
//! ```

use crate::lexical::{self, BASIC_INLINE, BASIC_MULTI, LITERAL_INLINE, LITERAL_MULTI, NEWLINE, TAB};
use crate::offset::format_offset;
use crate::{EncodeOptions, Error, Result, Table, Value};
use chrono::{Datelike, FixedOffset, NaiveDate, NaiveTime, Timelike};
use log::debug;
use num_bigint::BigInt;
use serde::{ser, Serialize};

/// One `[path]` or `[[path]]` block and the key-values written under it.
#[derive(Debug)]
struct TableBlock<'d> {
    path: Vec<&'d str>,
    entries: Vec<(&'d str, &'d Value)>,
    is_array: bool,
    depth: usize,
}

/// The TOML encoder.
///
/// Borrows its [`EncodeOptions`] and can encode any number of documents.
pub struct Encoder<'o> {
    options: &'o EncodeOptions,
}

/// Encodes a document with default options.
///
/// # Errors
///
/// Returns [`Error::Encode`] if a date or time has no TOML form: a year
/// outside 1 to 9999, a leap second, precision finer than a microsecond, or
/// an offset that is not a whole number of minutes.
///
/// # Examples
///
/// ```rust
/// use tidy_toml::{encode, Table, Value};
///
/// let mut doc = Table::new();
/// doc.insert("name".to_string(), Value::from("tidy"));
/// doc.insert("tags".to_string(), Value::from(vec![Value::from("a"), Value::from("b")]));
///
/// assert_eq!(encode(&doc).unwrap(), "name = \"tidy\"\ntags = [\"a\", \"b\"]\n");
/// ```
pub fn encode(document: &Table) -> Result<String> {
    encode_with_options(document, &EncodeOptions::default())
}

/// Encodes a document with the given options.
///
/// # Errors
///
/// Fails like [`encode`].
pub fn encode_with_options(document: &Table, options: &EncodeOptions) -> Result<String> {
    Encoder::new(options).encode(document)
}

/// Encodes a value that must be a table.
///
/// # Errors
///
/// Returns [`Error::Encode`] if `value` is not a table, or if it holds a
/// date or time [`encode`] rejects.
///
/// ```rust
/// use tidy_toml::{encode_value, EncodeOptions, Value};
///
/// assert!(encode_value(&Value::from(1), &EncodeOptions::default()).is_err());
/// ```
pub fn encode_value(value: &Value, options: &EncodeOptions) -> Result<String> {
    match value {
        Value::Table(table) => encode_with_options(table, options),
        other => Err(Error::encode(format!(
            "top-level value must be a table, found {}",
            other.type_name()
        ))),
    }
}

/// Renders a value as it appears on the right of `=`, never multi-line.
pub(crate) fn inline_value(value: &Value) -> String {
    let options = EncodeOptions::default();
    let mut out = String::new();
    Encoder::new(&options).write_value(&mut out, value, 0, false);
    out
}

impl<'o> Encoder<'o> {
    #[must_use]
    pub fn new(options: &'o EncodeOptions) -> Self {
        Encoder { options }
    }

    /// # Errors
    ///
    /// Fails like [`encode`], before any output is produced.
    pub fn encode(&self, document: &Table) -> Result<String> {
        for value in document.values() {
            check_value(value)?;
        }

        let mut out = String::with_capacity(256);

        for (i, block) in self.collect_tables(document, Vec::new(), false).iter().enumerate() {
            if i > 0 {
                out.push_str(&self.options.newline);
            }
            self.write_block(&mut out, block);
        }

        Ok(out)
    }

    fn ordered<'d>(&self, table: &'d Table) -> Vec<(&'d String, &'d Value)> {
        let mut entries: Vec<_> = table.iter().collect();
        if self.options.sort_keys {
            entries.sort_by(|a, b| a.0.cmp(b.0));
        }
        entries
    }

    /// Splits `table` into blocks, depth first, with its own block in front.
    fn collect_tables<'d>(
        &self,
        table: &'d Table,
        path: Vec<&'d str>,
        is_array: bool,
    ) -> Vec<TableBlock<'d>> {
        let mut entries = Vec::new();
        let mut collected = Vec::new();

        for (key, value) in self.ordered(table) {
            let mut child = path.clone();
            child.push(key.as_str());

            match value {
                Value::Table(sub) => collected.extend(self.collect_tables(sub, child, false)),
                Value::Array(items) if value.is_array_of_tables() => {
                    for item in items {
                        if let Value::Table(sub) = item {
                            collected.extend(self.collect_tables(sub, child.clone(), true));
                        }
                    }
                }
                _ => entries.push((key.as_str(), value)),
            }
        }

        let is_wrapper = !is_array && table.len() == 1 && table.values().all(Value::is_table);
        if is_wrapper {
            return collected;
        }

        if path.is_empty() {
            if !entries.is_empty() {
                collected.insert(0, TableBlock { path, entries, is_array, depth: 0 });
            }
            return collected;
        }

        for block in &mut collected {
            block.depth += 1;
        }
        debug!(
            "collected table block {} with {} entries",
            path.join("."),
            entries.len()
        );
        collected.insert(0, TableBlock { path, entries, is_array, depth: 0 });
        collected
    }

    fn indentation(&self, depth: usize) -> String {
        " ".repeat(depth * self.options.indent)
    }

    fn write_block(&self, out: &mut String, block: &TableBlock<'_>) {
        let prefix = self.indentation(block.depth);

        if !block.path.is_empty() {
            let (open, close) = if block.is_array { ("[[", "]]") } else { ("[", "]") };
            out.push_str(&prefix);
            out.push_str(open);
            for (i, key) in block.path.iter().enumerate() {
                if i > 0 {
                    out.push('.');
                }
                self.write_key(out, key);
            }
            out.push_str(close);
            out.push_str(&self.options.newline);
        }

        for (key, value) in &block.entries {
            out.push_str(&prefix);
            self.write_key(out, key);
            out.push_str(" = ");
            self.write_value(out, value, block.depth, true);
            out.push_str(&self.options.newline);
        }
    }

    fn write_key(&self, out: &mut String, key: &str) {
        if lexical::is_bare_key(key) {
            out.push_str(key);
        } else {
            self.write_string(out, key, 0, false);
        }
    }

    fn write_value(&self, out: &mut String, value: &Value, depth: usize, allow_multiline: bool) {
        match value {
            Value::String(s) => self.write_string(out, s, depth, allow_multiline),
            Value::Integer(i) => out.push_str(&i.to_string()),
            Value::Float(f) => out.push_str(&format_float(*f)),
            Value::Boolean(b) => out.push_str(if *b { "true" } else { "false" }),
            Value::LocalDate(date) => out.push_str(&format_date(date)),
            Value::LocalTime(time) => out.push_str(&format_time(time)),
            Value::LocalDateTime(dt) => {
                out.push_str(&format_date(&dt.date()));
                out.push('T');
                out.push_str(&format_time(&dt.time()));
            }
            Value::OffsetDateTime(dt) => {
                out.push_str(&format_date(&dt.date_naive()));
                out.push('T');
                out.push_str(&format_time(&dt.time()));
                out.push_str(&format_offset(dt.offset()));
            }
            Value::Array(items) => self.write_array(out, items, depth),
            Value::Table(table) => self.write_inline_table(out, table, depth),
        }
    }

    fn write_array(&self, out: &mut String, items: &[Value], depth: usize) {
        let parts: Vec<String> = items
            .iter()
            .map(|item| {
                let mut part = String::new();
                self.write_value(&mut part, item, depth + 1, false);
                part
            })
            .collect();

        let joined_len = parts.iter().map(|p| p.chars().count()).sum::<usize>()
            + 2 * parts.len().saturating_sub(1);
        let multiline = items.len() > 1
            && (items
                .iter()
                .any(|item| matches!(item, Value::Array(_) | Value::Table(_)))
                || items
                    .iter()
                    .any(|item| matches!(item, Value::String(s) if s.contains(NEWLINE)))
                || joined_len >= self.options.wrap);

        out.push('[');
        if multiline {
            let inner = self.indentation(depth + 1);
            for part in &parts {
                out.push_str(&self.options.newline);
                out.push_str(&inner);
                out.push_str(part);
                out.push(',');
            }
            out.push_str(&self.options.newline);
            out.push_str(&self.indentation(depth));
        } else {
            out.push_str(&parts.join(", "));
        }
        out.push(']');
    }

    fn write_inline_table(&self, out: &mut String, table: &Table, depth: usize) {
        if table.is_empty() {
            out.push_str("{}");
            return;
        }

        out.push_str("{ ");
        for (i, (key, value)) in self.ordered(table).into_iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            self.write_key(out, key);
            out.push_str(" = ");
            self.write_value(out, value, depth, false);
        }
        out.push_str(" }");
    }

    /// Picks the string form.
    ///
    /// Single-line: basic when no escaping or quoting is needed, literal when
    /// the text has `"` or `\` but nothing that must be escaped, basic with
    /// escapes otherwise. Multi-line (only where allowed, for text with a
    /// newline past its leading whitespace or longer than the wrap column):
    /// literal when the text has `\` and nothing that must be escaped, basic
    /// otherwise.
    fn write_string(&self, out: &mut String, s: &str, depth: usize, allow_multiline: bool) {
        let is_long = s.chars().count() + depth * self.options.indent > self.options.wrap;
        let mut multiline = allow_multiline && (s.trim_start().contains(NEWLINE) || is_long);
        if self.options.preserve_cr && s.contains('\r') {
            multiline = false;
        }

        let has_double_quote = s.contains(BASIC_INLINE);
        let has_single_quote = s.contains(LITERAL_INLINE);
        let has_backslash = s.contains('\\');
        let has_tab = s.contains(TAB);

        if !multiline {
            let must_escape = s
                .chars()
                .any(|c| lexical::is_control(c) || lexical::should_unicode_escape(c));

            if !must_escape && !has_double_quote && !has_backslash {
                self.write_basic(out, s);
            } else if !must_escape && !has_single_quote && !has_tab {
                out.push_str(LITERAL_INLINE);
                out.push_str(s);
                out.push_str(LITERAL_INLINE);
            } else {
                self.write_basic(out, s);
            }
            return;
        }

        let must_escape = s.chars().any(|c| {
            c == TAB
                || (c != NEWLINE && lexical::is_control(c))
                || lexical::should_unicode_escape(c)
        });

        if !must_escape && has_backslash && !s.contains(LITERAL_MULTI) {
            out.push_str(LITERAL_MULTI);
            if s.contains(NEWLINE) {
                out.push_str(&self.options.newline);
            }
            out.push_str(&s.replace(NEWLINE, &self.options.newline));
            out.push_str(LITERAL_MULTI);
        } else {
            self.write_multi_line_basic(out, s);
        }
    }

    fn write_basic(&self, out: &mut String, s: &str) {
        out.push_str(BASIC_INLINE);
        out.push_str(&lexical::escape(s));
        out.push_str(BASIC_INLINE);
    }

    fn write_multi_line_basic(&self, out: &mut String, s: &str) {
        let nl = self.options.newline.as_str();
        out.push_str(BASIC_MULTI);
        out.push_str(nl);

        let trailing_nl = s.ends_with(NEWLINE);
        let body = s.strip_suffix(NEWLINE).unwrap_or(s);
        let mut ends_with_space = false;

        for (i, line) in body.split(NEWLINE).enumerate() {
            let line = lexical::escape_multi_line(line).replace(BASIC_MULTI, "\"\"\\\"");

            if i > 0 {
                // a trailing space before a real newline is made visible as `\n\`
                if ends_with_space && line.starts_with(|c: char| !c.is_whitespace()) {
                    out.push_str("\\n\\");
                }
                out.push_str(nl);
            }
            ends_with_space = line.ends_with(' ');

            let mut col = 0;
            let words = lexical::word_regex()
                .find_iter(&line)
                .map(|m| m.as_str())
                .filter(|w| !w.is_empty());
            for word in words {
                let len = word.chars().count();
                if col == 0 || col + len < self.options.wrap {
                    out.push_str(word);
                    col += len;
                } else {
                    out.push('\\');
                    out.push_str(nl);
                    out.push_str(word);
                    col = len;
                }
            }
        }

        if trailing_nl {
            out.push_str(nl);
        }
        out.push_str(BASIC_MULTI);
    }
}

fn format_float(f: f64) -> String {
    if f.is_nan() {
        "nan".to_string()
    } else if f == f64::INFINITY {
        "inf".to_string()
    } else if f == f64::NEG_INFINITY {
        "-inf".to_string()
    } else {
        format!("{:?}", f)
    }
}

/// Rejects date and time values that would not decode back to themselves.
fn check_value(value: &Value) -> Result<()> {
    match value {
        Value::LocalDate(date) => check_date(date),
        Value::LocalTime(time) => check_time(time),
        Value::LocalDateTime(dt) => {
            check_date(&dt.date())?;
            check_time(&dt.time())
        }
        Value::OffsetDateTime(dt) => {
            check_date(&dt.date_naive())?;
            check_time(&dt.time())?;
            check_offset(dt.offset())
        }
        Value::Array(items) => items.iter().try_for_each(check_value),
        Value::Table(table) => table.values().try_for_each(check_value),
        Value::String(_) | Value::Integer(_) | Value::Float(_) | Value::Boolean(_) => Ok(()),
    }
}

fn check_date(date: &NaiveDate) -> Result<()> {
    if (1..=9999).contains(&date.year()) {
        Ok(())
    } else {
        Err(Error::encode(format!(
            "date {} is outside the years 1 to 9999",
            date
        )))
    }
}

fn check_time(time: &NaiveTime) -> Result<()> {
    let nanos = time.nanosecond();
    if nanos >= 1_000_000_000 {
        return Err(Error::encode(format!("time {} is a leap second", time)));
    }
    if nanos % 1_000 != 0 {
        return Err(Error::encode(format!(
            "time {} is more precise than a microsecond",
            time
        )));
    }
    Ok(())
}

fn check_offset(offset: &FixedOffset) -> Result<()> {
    if offset.local_minus_utc() % 60 == 0 {
        Ok(())
    } else {
        Err(Error::encode(format!(
            "offset {} is not a whole number of minutes",
            offset
        )))
    }
}

fn format_date(date: &NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// `HH:MM:SS`, plus six fractional digits when there is a sub-second part.
fn format_time(time: &NaiveTime) -> String {
    let micros = time.nanosecond() / 1_000;
    if micros == 0 {
        time.format("%H:%M:%S").to_string()
    } else {
        format!("{}.{:06}", time.format("%H:%M:%S"), micros)
    }
}

/// Serializes any `T: Serialize` into a [`Value`].
///
/// `Ok(None)` stands for an absent value (`None`), which tables skip and
/// arrays reject.
pub struct ValueSerializer;

pub struct SerializeVec {
    vec: Vec<Value>,
    variant: Option<&'static str>,
}

pub struct SerializeMap {
    map: Table,
    current_key: Option<String>,
    variant: Option<&'static str>,
}

impl ser::Serializer for ValueSerializer {
    type Ok = Option<Value>;
    type Error = Error;

    type SerializeSeq = SerializeVec;
    type SerializeTuple = SerializeVec;
    type SerializeTupleStruct = SerializeVec;
    type SerializeTupleVariant = SerializeVec;
    type SerializeMap = SerializeMap;
    type SerializeStruct = SerializeMap;
    type SerializeStructVariant = SerializeMap;

    fn serialize_bool(self, v: bool) -> Result<Option<Value>> {
        Ok(Some(Value::Boolean(v)))
    }

    fn serialize_i8(self, v: i8) -> Result<Option<Value>> {
        Ok(Some(Value::from(v)))
    }

    fn serialize_i16(self, v: i16) -> Result<Option<Value>> {
        Ok(Some(Value::from(v)))
    }

    fn serialize_i32(self, v: i32) -> Result<Option<Value>> {
        Ok(Some(Value::from(v)))
    }

    fn serialize_i64(self, v: i64) -> Result<Option<Value>> {
        Ok(Some(Value::from(v)))
    }

    fn serialize_i128(self, v: i128) -> Result<Option<Value>> {
        Ok(Some(Value::Integer(BigInt::from(v))))
    }

    fn serialize_u8(self, v: u8) -> Result<Option<Value>> {
        Ok(Some(Value::from(v)))
    }

    fn serialize_u16(self, v: u16) -> Result<Option<Value>> {
        Ok(Some(Value::from(v)))
    }

    fn serialize_u32(self, v: u32) -> Result<Option<Value>> {
        Ok(Some(Value::from(v)))
    }

    fn serialize_u64(self, v: u64) -> Result<Option<Value>> {
        Ok(Some(Value::Integer(BigInt::from(v))))
    }

    fn serialize_u128(self, v: u128) -> Result<Option<Value>> {
        Ok(Some(Value::Integer(BigInt::from(v))))
    }

    fn serialize_f32(self, v: f32) -> Result<Option<Value>> {
        Ok(Some(Value::Float(f64::from(v))))
    }

    fn serialize_f64(self, v: f64) -> Result<Option<Value>> {
        Ok(Some(Value::Float(v)))
    }

    fn serialize_char(self, v: char) -> Result<Option<Value>> {
        Ok(Some(Value::String(v.to_string())))
    }

    fn serialize_str(self, v: &str) -> Result<Option<Value>> {
        Ok(Some(Value::String(v.to_string())))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Option<Value>> {
        let vec = v.iter().map(|&b| Value::from(b)).collect();
        Ok(Some(Value::Array(vec)))
    }

    fn serialize_none(self) -> Result<Option<Value>> {
        Ok(None)
    }

    fn serialize_some<T>(self, value: &T) -> Result<Option<Value>>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Option<Value>> {
        Err(Error::encode("unit has no TOML representation"))
    }

    fn serialize_unit_struct(self, name: &'static str) -> Result<Option<Value>> {
        Err(Error::encode(format!(
            "unit struct {} has no TOML representation",
            name
        )))
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Option<Value>> {
        Ok(Some(Value::String(variant.to_string())))
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<Option<Value>>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Option<Value>>
    where
        T: ?Sized + Serialize,
    {
        let mut table = Table::new();
        table.insert(variant.to_string(), to_value(value)?);
        Ok(Some(Value::Table(table)))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SerializeVec> {
        Ok(SerializeVec::new(len.unwrap_or(0), None))
    }

    fn serialize_tuple(self, len: usize) -> Result<SerializeVec> {
        Ok(SerializeVec::new(len, None))
    }

    fn serialize_tuple_struct(self, _name: &'static str, len: usize) -> Result<SerializeVec> {
        Ok(SerializeVec::new(len, None))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<SerializeVec> {
        Ok(SerializeVec::new(len, Some(variant)))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<SerializeMap> {
        Ok(SerializeMap::new(None))
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<SerializeMap> {
        Ok(SerializeMap::new(None))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<SerializeMap> {
        Ok(SerializeMap::new(Some(variant)))
    }
}

impl SerializeVec {
    fn new(capacity: usize, variant: Option<&'static str>) -> Self {
        SerializeVec {
            vec: Vec::with_capacity(capacity),
            variant,
        }
    }

    fn push<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        self.vec.push(to_value(value)?);
        Ok(())
    }

    fn finish(self) -> Option<Value> {
        Some(wrap_variant(self.variant, Value::Array(self.vec)))
    }
}

impl SerializeMap {
    fn new(variant: Option<&'static str>) -> Self {
        SerializeMap {
            map: Table::new(),
            current_key: None,
            variant,
        }
    }

    fn insert<T: ?Sized + Serialize>(&mut self, key: String, value: &T) -> Result<()> {
        if let Some(value) = value.serialize(ValueSerializer)? {
            self.map.insert(key, value);
        }
        Ok(())
    }

    fn finish(self) -> Option<Value> {
        Some(wrap_variant(self.variant, Value::Table(self.map)))
    }
}

/// Externally tagged variants become a single-key table.
fn wrap_variant(variant: Option<&'static str>, value: Value) -> Value {
    match variant {
        Some(name) => {
            let mut table = Table::new();
            table.insert(name.to_string(), value);
            Value::Table(table)
        }
        None => value,
    }
}

impl ser::SerializeSeq for SerializeVec {
    type Ok = Option<Value>;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Option<Value>> {
        Ok(self.finish())
    }
}

impl ser::SerializeTuple for SerializeVec {
    type Ok = Option<Value>;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Option<Value>> {
        Ok(self.finish())
    }
}

impl ser::SerializeTupleStruct for SerializeVec {
    type Ok = Option<Value>;
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Option<Value>> {
        Ok(self.finish())
    }
}

impl ser::SerializeTupleVariant for SerializeVec {
    type Ok = Option<Value>;
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Option<Value>> {
        Ok(self.finish())
    }
}

impl ser::SerializeMap for SerializeMap {
    type Ok = Option<Value>;
    type Error = Error;

    fn serialize_key<T>(&mut self, key: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let key = match key.serialize(ValueSerializer)? {
            Some(Value::String(s)) => s,
            Some(Value::Integer(i)) => i.to_string(),
            Some(Value::Boolean(b)) => b.to_string(),
            Some(other) => {
                return Err(Error::encode(format!(
                    "table keys must be strings, found {}",
                    other.type_name()
                )))
            }
            None => return Err(Error::encode("table keys cannot be None")),
        };
        self.current_key = Some(key);
        Ok(())
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let key = self
            .current_key
            .take()
            .ok_or_else(|| Error::custom("serialize_value called without serialize_key"))?;
        self.insert(key, value)
    }

    fn end(self) -> Result<Option<Value>> {
        Ok(self.finish())
    }
}

impl ser::SerializeStruct for SerializeMap {
    type Ok = Option<Value>;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.insert(key.to_string(), value)
    }

    fn end(self) -> Result<Option<Value>> {
        Ok(self.finish())
    }
}

impl ser::SerializeStructVariant for SerializeMap {
    type Ok = Option<Value>;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.insert(key.to_string(), value)
    }

    fn end(self) -> Result<Option<Value>> {
        Ok(self.finish())
    }
}

/// Converts `value`, failing if it is absent.
pub(crate) fn to_value<T: Serialize + ?Sized>(value: &T) -> Result<Value> {
    value
        .serialize(ValueSerializer)?
        .ok_or_else(|| Error::encode("TOML has no null value"))
}
