//! # tidy_toml
//!
//! A TOML decoder and canonical pretty-printing encoder, with a Serde bridge.
//!
//! ## What does it do?
//!
//! [`decode`] parses TOML text into an ordered [`Table`] of [`Value`]s,
//! rejecting anything the grammar or the table rules forbid. [`encode`] writes
//! a table back out in one normalized layout: lightest string style, table
//! blocks indented by nesting, arrays wrapped when they get long. Running a
//! file through both is a formatter.
//!
//! ## Key Features
//!
//! - **Exact values**: arbitrary-precision integers, `-0.0`, `nan` and `inf`,
//!   microsecond date-times with fixed offsets
//! - **Strict structure**: duplicate keys and re-opened tables are errors,
//!   reported with line and column
//! - **Order preserving**: keys come back out in insertion order unless
//!   sorting is requested
//! - **Serde Compatible**: works with `#[derive(Serialize, Deserialize)]`
//! - **No Unsafe Code**
//!
//! ## Quick Start
//!
//! ```rust
//! use tidy_toml::{decode, encode, Value};
//!
//! let doc = decode(r#"
//! ## This is a TOML document.
//! title = "TOML Example"
//!
//! [database]
//! ports = [ 8001, 8001, 8002 ]
//! enabled = true
//! "#).unwrap();
//!
//! assert_eq!(doc.get("title").and_then(Value::as_str), Some("TOML Example"));
//! assert_eq!(
//!     encode(&doc).unwrap(),
//!     "title = \"TOML Example\"\n\n[database]\nports = [8001, 8001, 8002]\nenabled = true\n"
//! );
//! ```
//!
//! ### Serde
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//! use tidy_toml::{from_str, to_string};
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! struct Package {
//!     name: String,
//!     version: String,
//!     keywords: Vec<String>,
//! }
//!
//! let package = Package {
//!     name: "tidy".to_string(),
//!     version: "0.1.0".to_string(),
//!     keywords: vec!["toml".to_string()],
//! };
//!
//! let text = to_string(&package).unwrap();
//! assert_eq!(text, "name = \"tidy\"\nversion = \"0.1.0\"\nkeywords = [\"toml\"]\n");
//!
//! let back: Package = from_str(&text).unwrap();
//! assert_eq!(package, back);
//! ```
//!
//! ### Dynamic Values with toml! Macro
//!
//! ```rust
//! use tidy_toml::{encode_value, toml, EncodeOptions};
//!
//! let doc = toml!({
//!     "name": "Alice",
//!     "owner": { "age": 30 }
//! });
//!
//! let text = encode_value(&doc, &EncodeOptions::default()).unwrap();
//! assert_eq!(text, "name = \"Alice\"\n\n[owner]\nage = 30\n");
//! ```
//!
//! ## Logging
//!
//! The library logs through the `log` facade (`debug!` for table headers and
//! emitted blocks, `trace!` for cursor and path-walk events) and never
//! installs a logger itself.

pub mod cursor;
pub mod de;
pub mod error;
pub mod lexical;
pub mod macros;
pub mod map;
pub mod offset;
pub mod options;
pub mod ser;
pub mod value;

pub use de::{decode, decode_slice, Decoder, ValueDeserializer};
pub use error::{Error, Result};
pub use map::{Document, Table};
pub use options::EncodeOptions;
pub use ser::{encode, encode_value, encode_with_options, Encoder, ValueSerializer};
pub use value::Value;

use serde::{Deserialize, Serialize};
use std::io;

/// Serialize any `T: Serialize` to a TOML string.
///
/// The value must serialize to a table (a struct or a map).
///
/// # Examples
///
/// ```rust
/// use tidy_toml::to_string;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Point { x: i32, y: i32 }
///
/// let point = Point { x: 1, y: 2 };
/// assert_eq!(to_string(&point).unwrap(), "x = 1\ny = 2\n");
/// ```
///
/// # Errors
///
/// Returns an error if the value is not a table or holds something TOML
/// cannot express (unit, `None` inside an array, non-string map keys).
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string<T>(value: &T) -> Result<String>
where
    T: ?Sized + Serialize,
{
    to_string_with_options(value, &EncodeOptions::default())
}

/// Serialize any `T: Serialize` to a TOML string with custom options.
///
/// # Examples
///
/// ```rust
/// use tidy_toml::{to_string_with_options, EncodeOptions};
/// use std::collections::HashMap;
///
/// let mut map = HashMap::new();
/// map.insert("b", 1);
/// map.insert("a", 2);
///
/// let text = to_string_with_options(&map, &EncodeOptions::sorted()).unwrap();
/// assert_eq!(text, "a = 2\nb = 1\n");
/// ```
///
/// # Errors
///
/// Returns an error if the value cannot be serialized as a TOML table.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string_with_options<T>(value: &T, options: &EncodeOptions) -> Result<String>
where
    T: ?Sized + Serialize,
{
    encode_value(&to_value(value)?, options)
}

/// Convert any `T: Serialize` to a [`Value`].
///
/// # Examples
///
/// ```rust
/// use tidy_toml::to_value;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Point { x: i32, y: i32 }
///
/// let value = to_value(&Point { x: 1, y: 2 }).unwrap();
/// assert!(value.is_table());
/// ```
///
/// # Errors
///
/// Returns an error if the value has no TOML representation.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_value<T>(value: &T) -> Result<Value>
where
    T: ?Sized + Serialize,
{
    ser::to_value(value)
}

/// Serialize any `T: Serialize` to a writer as TOML.
///
/// # Examples
///
/// ```rust
/// use tidy_toml::to_writer;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Point { x: i32, y: i32 }
///
/// let mut buffer = Vec::new();
/// to_writer(&mut buffer, &Point { x: 1, y: 2 }).unwrap();
/// assert_eq!(buffer, b"x = 1\ny = 2\n");
/// ```
///
/// # Errors
///
/// Returns an error if serialization fails or writing to the writer fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer<W, T>(mut writer: W, value: &T) -> Result<()>
where
    W: io::Write,
    T: ?Sized + Serialize,
{
    let text = to_string(value)?;
    writer
        .write_all(text.as_bytes())
        .map_err(|e| Error::io(&e.to_string()))?;
    Ok(())
}

/// Deserialize an instance of type `T` from a string of TOML text.
///
/// # Examples
///
/// ```rust
/// use tidy_toml::from_str;
/// use serde::Deserialize;
///
/// #[derive(Deserialize, PartialEq, Debug)]
/// struct Point { x: i32, y: i32 }
///
/// let point: Point = from_str("x = 1\ny = 2").unwrap();
/// assert_eq!(point, Point { x: 1, y: 2 });
/// ```
///
/// # Errors
///
/// Returns an error if the input is not valid TOML or cannot be deserialized
/// to type `T`. Decode errors include line and column information.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_str<T>(s: &str) -> Result<T>
where
    T: for<'de> Deserialize<'de>,
{
    let document = decode(s)?;
    T::deserialize(ValueDeserializer::new(Value::Table(document)))
}

/// Deserialize an instance of type `T` from an I/O stream of TOML.
///
/// # Examples
///
/// ```rust
/// use tidy_toml::from_reader;
/// use serde::Deserialize;
/// use std::io::Cursor;
///
/// #[derive(Deserialize, PartialEq, Debug)]
/// struct Point { x: i32, y: i32 }
///
/// let point: Point = from_reader(Cursor::new(b"x = 1\ny = 2")).unwrap();
/// assert_eq!(point, Point { x: 1, y: 2 });
/// ```
///
/// # Errors
///
/// Returns an error if reading fails, the input is not valid UTF-8 or TOML,
/// or the data cannot be deserialized to type `T`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_reader<R, T>(mut reader: R) -> Result<T>
where
    R: io::Read,
    T: for<'de> Deserialize<'de>,
{
    let mut bytes = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .map_err(|e| Error::io(&e.to_string()))?;
    from_slice(&bytes)
}

/// Deserialize an instance of type `T` from bytes of TOML text.
///
/// # Errors
///
/// Returns an error if the bytes are not valid UTF-8, not valid TOML, or
/// cannot be deserialized to type `T`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_slice<T>(v: &[u8]) -> Result<T>
where
    T: for<'de> Deserialize<'de>,
{
    let document = decode_slice(v)?;
    T::deserialize(ValueDeserializer::new(Value::Table(document)))
}
