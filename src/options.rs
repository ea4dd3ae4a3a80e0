//! Configuration options for TOML encoding.
//!
//! [`EncodeOptions`] controls key order, line endings, indentation of nested
//! table blocks, the soft wrap column for long strings and arrays, and how
//! carriage returns are treated.
//!
//! ## Examples
//!
//! ```rust
//! use tidy_toml::{decode, encode_with_options, EncodeOptions};
//!
//! let doc = decode("b = 1\na = 2").unwrap();
//!
//! let options = EncodeOptions::new().with_sort_keys(true);
//! assert_eq!(encode_with_options(&doc, &options).unwrap(), "a = 2\nb = 1\n");
//!
//! let options = EncodeOptions::new().with_newline("\r\n");
//! assert_eq!(encode_with_options(&doc, &options).unwrap(), "b = 1\r\na = 2\r\n");
//! ```

/// Configuration options for TOML encoding.
///
/// # Examples
///
/// ```rust
/// use tidy_toml::EncodeOptions;
///
/// let options = EncodeOptions::new();
/// assert_eq!(options.indent, 2);
/// assert_eq!(options.wrap, 120);
///
/// let options = EncodeOptions::new()
///     .with_indent(4)
///     .with_wrap(80)
///     .with_preserve_cr(true);
/// assert_eq!(options.indent, 4);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodeOptions {
    /// Alphabetize keys at every level instead of keeping insertion order.
    pub sort_keys: bool,
    /// Line terminator written after every line.
    pub newline: String,
    /// Spaces per nesting level of table blocks and multi-line arrays.
    pub indent: usize,
    /// Soft wrap column for multi-line strings and single-line arrays.
    pub wrap: usize,
    /// Never write a string containing `\r` as a multi-line string.
    pub preserve_cr: bool,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        EncodeOptions {
            sort_keys: false,
            newline: "\n".to_string(),
            indent: 2,
            wrap: 120,
            preserve_cr: false,
        }
    }
}

impl EncodeOptions {
    /// Creates default options: insertion order, `\n`, indent 2, wrap at 120.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Default options with keys sorted.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use tidy_toml::EncodeOptions;
    ///
    /// assert!(EncodeOptions::sorted().sort_keys);
    /// ```
    #[must_use]
    pub fn sorted() -> Self {
        EncodeOptions {
            sort_keys: true,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_sort_keys(mut self, sort_keys: bool) -> Self {
        self.sort_keys = sort_keys;
        self
    }

    /// Sets the line terminator.
    ///
    /// Applies to every emitted line, including lines inside multi-line
    /// strings and arrays.
    #[must_use]
    pub fn with_newline(mut self, newline: impl Into<String>) -> Self {
        self.newline = newline.into();
        self
    }

    /// Sets the indentation size (number of spaces per level).
    #[must_use]
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    /// Sets the wrap column.
    ///
    /// Strings longer than this (counting indentation) become multi-line
    /// strings; arrays whose single-line form would reach it are written one
    /// element per line.
    #[must_use]
    pub fn with_wrap(mut self, wrap: usize) -> Self {
        self.wrap = wrap;
        self
    }

    #[must_use]
    pub fn with_preserve_cr(mut self, preserve_cr: bool) -> Self {
        self.preserve_cr = preserve_cr;
        self
    }
}
