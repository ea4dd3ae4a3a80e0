//! Error types for TOML decoding and encoding.
//!
//! Every failure in this crate is reported through the single [`Error`] enum.
//! Decoding is all-or-nothing: the first grammar or structure violation aborts
//! the whole call and is returned with the line and column where it was found.
//!
//! ## Error Categories
//!
//! - **Decode errors**: malformed input, duplicate or conflicting keys, invalid
//!   escapes, impossible dates and times
//! - **Encode errors**: values with no TOML representation, or a top-level value
//!   that is not a table
//! - **I/O errors**: reader or writer failures in the Serde helpers
//!
//! ## Examples
//!
//! ```rust
//! use tidy_toml::{decode, Error};
//!
//! let err = decode("a = 1\na = 2").unwrap_err();
//! assert!(err.is_decode());
//!
//! if let Error::Decode { line, .. } = err {
//!     assert_eq!(line, 2);
//! }
//! ```

use std::fmt;
use thiserror::Error;

/// Represents all possible errors raised while decoding or encoding TOML.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Malformed TOML input, stamped with the 1-based position where parsing stopped.
    #[error("{msg} at line {line}, column {col}")]
    Decode { line: usize, col: usize, msg: String },

    /// A value that cannot be written as TOML.
    #[error("unable to encode: {0}")]
    Encode(String),

    /// IO error during reading or writing
    #[error("IO error: {0}")]
    Io(String),

    /// Message raised through Serde's `custom` hooks.
    #[error("{0}")]
    Custom(String),
}

impl Error {
    /// Creates a decode error at the given position.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use tidy_toml::Error;
    ///
    /// let err = Error::decode(3, 7, "missing value");
    /// assert_eq!(err.to_string(), "missing value at line 3, column 7");
    /// ```
    pub fn decode(line: usize, col: usize, msg: impl Into<String>) -> Self {
        Error::Decode {
            line,
            col,
            msg: msg.into(),
        }
    }

    /// Creates an encode error.
    pub fn encode(msg: impl Into<String>) -> Self {
        Error::Encode(msg.into())
    }

    /// Creates a custom error with a display message.
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }

    /// Creates an I/O error for file reading/writing failures.
    pub fn io(msg: &str) -> Self {
        Error::Io(msg.to_string())
    }

    /// Returns `true` for errors raised by the decoder.
    #[must_use]
    pub const fn is_decode(&self) -> bool {
        matches!(self, Error::Decode { .. })
    }

    /// Returns `true` for errors raised by the encoder.
    #[must_use]
    pub const fn is_encode(&self) -> bool {
        matches!(self, Error::Encode(_))
    }

    /// The human-readable message without position information.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Error::Decode { msg, .. } => msg,
            Error::Encode(msg) | Error::Io(msg) | Error::Custom(msg) => msg,
        }
    }
}

impl serde::ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

impl serde::de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
