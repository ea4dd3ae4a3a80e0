//! Lexical tables shared by the decoder and the encoder.
//!
//! Delimiters, the escape table, the control-character set, the compiled
//! patterns for numbers, dates, times and bare keys, and the pure character
//! classification used to decide when the encoder must escape.

use regex::Regex;
use std::sync::OnceLock;

pub const NEWLINE: char = '\n';
pub const TAB: char = '\t';
pub const BASIC_INLINE: &str = "\"";
pub const BASIC_MULTI: &str = "\"\"\"";
pub const LITERAL_INLINE: &str = "'";
pub const LITERAL_MULTI: &str = "'''";

static TIME_REGEX: OnceLock<Regex> = OnceLock::new();
static DATE_REGEX: OnceLock<Regex> = OnceLock::new();
static DATETIME_REGEX: OnceLock<Regex> = OnceLock::new();
static HEX_REGEX: OnceLock<Regex> = OnceLock::new();
static OCTAL_REGEX: OnceLock<Regex> = OnceLock::new();
static BINARY_REGEX: OnceLock<Regex> = OnceLock::new();
static INT_REGEX: OnceLock<Regex> = OnceLock::new();
static FLOAT_REGEX: OnceLock<Regex> = OnceLock::new();
static KEY_REGEX: OnceLock<Regex> = OnceLock::new();
static WORD_REGEX: OnceLock<Regex> = OnceLock::new();

const TIME: &str = r"([0-9]{2}):([0-9]{2}):([0-9]{2})(?:\.([0-9]{3,}))?";
const DATE: &str = r"([0-9]{4})-([0-9]{2})-([0-9]{2})";
const OFFSET: &str = r"(Z|[-+][0-9]{2}:[0-9]{2})";
const DIGITS: &str = r"[0-9](?:_?[0-9])*";

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("Failed to compile lexical pattern")
}

/// Local time: `HH:MM:SS[.fff...]`, at least three fractional digits.
pub fn time_regex() -> &'static Regex {
    TIME_REGEX.get_or_init(|| compile(&format!("^{TIME}")))
}

/// Local date: `YYYY-MM-DD`.
pub fn date_regex() -> &'static Regex {
    DATE_REGEX.get_or_init(|| compile(&format!("^{DATE}")))
}

/// Date and time joined by `T` or a space, with an optional `Z`/`±HH:MM` offset.
pub fn datetime_regex() -> &'static Regex {
    DATETIME_REGEX.get_or_init(|| compile(&format!("^{DATE}[T ]{TIME}{OFFSET}?")))
}

pub fn hex_regex() -> &'static Regex {
    HEX_REGEX.get_or_init(|| compile(r"^0x[0-9A-Fa-f](?:_?[0-9A-Fa-f])*"))
}

pub fn octal_regex() -> &'static Regex {
    OCTAL_REGEX.get_or_init(|| compile(r"^0o[0-7](?:_?[0-7])*"))
}

pub fn binary_regex() -> &'static Regex {
    BINARY_REGEX.get_or_init(|| compile(r"^0b[01](?:_?[01])*"))
}

pub fn int_regex() -> &'static Regex {
    INT_REGEX.get_or_init(|| compile(&format!("^[-+]?{DIGITS}")))
}

/// Integer part with an optional fraction and an optional exponent.
pub fn float_regex() -> &'static Regex {
    FLOAT_REGEX.get_or_init(|| {
        compile(&format!(
            r"^[-+]?{DIGITS}(?:\.{DIGITS})?(?:[eE][-+]?{DIGITS})?"
        ))
    })
}

pub fn key_regex() -> &'static Regex {
    KEY_REGEX.get_or_init(|| compile(r"^[-_A-Za-z0-9]+"))
}

/// A run of non-whitespace followed by its trailing whitespace.
pub fn word_regex() -> &'static Regex {
    WORD_REGEX.get_or_init(|| compile(r"[^\s]*\s*"))
}

/// Returns `true` if `key` can be written without quotes.
pub fn is_bare_key(key: &str) -> bool {
    key_regex().find(key).map_or(false, |m| m.end() == key.len())
}

/// Characters that may not appear unescaped in any string form.
///
/// U+0000 to U+0008, U+000A to U+001F and U+007F. Tab is allowed.
pub const fn is_control(c: char) -> bool {
    matches!(c, '\u{0}'..='\u{8}' | '\u{a}'..='\u{1f}' | '\u{7f}')
}

/// Maps the character after a backslash to the character it stands for.
pub const fn unescape(c: char) -> Option<char> {
    match c {
        'b' => Some('\u{8}'),
        't' => Some('\t'),
        'n' => Some('\n'),
        'f' => Some('\u{c}'),
        'r' => Some('\r'),
        '"' => Some('"'),
        '\\' => Some('\\'),
        _ => None,
    }
}

/// Maps a character to its short escape sequence, if it has one.
pub const fn short_escape(c: char) -> Option<&'static str> {
    match c {
        '\u{8}' => Some("\\b"),
        '\t' => Some("\\t"),
        '\n' => Some("\\n"),
        '\u{c}' => Some("\\f"),
        '\r' => Some("\\r"),
        '"' => Some("\\\""),
        '\\' => Some("\\\\"),
        _ => None,
    }
}

/// Returns `true` if the encoder must write `c` as a `\u`/`\U` escape.
///
/// Covers the Unicode "other" and "separator" general categories: control,
/// format and private-use characters, and every space, line or paragraph
/// separator except the ASCII space. The short-escape whitespace characters
/// are excluded because they have their own escapes.
pub fn should_unicode_escape(c: char) -> bool {
    if matches!(c, ' ' | '\u{8}' | '\u{c}' | '\n' | '\r' | '\t') {
        return false;
    }
    c.is_control() || is_separator(c) || is_format(c) || is_private_use(c)
}

/// Zs, Zl and Zp.
fn is_separator(c: char) -> bool {
    matches!(
        c,
        ' ' | '\u{a0}'
            | '\u{1680}'
            | '\u{2000}'..='\u{200a}'
            | '\u{2028}'
            | '\u{2029}'
            | '\u{202f}'
            | '\u{205f}'
            | '\u{3000}'
    )
}

/// Cf.
fn is_format(c: char) -> bool {
    matches!(
        c,
        '\u{ad}'
            | '\u{600}'..='\u{605}'
            | '\u{61c}'
            | '\u{6dd}'
            | '\u{70f}'
            | '\u{890}'..='\u{891}'
            | '\u{8e2}'
            | '\u{180e}'
            | '\u{200b}'..='\u{200f}'
            | '\u{202a}'..='\u{202e}'
            | '\u{2060}'..='\u{2064}'
            | '\u{2066}'..='\u{206f}'
            | '\u{feff}'
            | '\u{fff9}'..='\u{fffb}'
            | '\u{110bd}'
            | '\u{110cd}'
            | '\u{13430}'..='\u{1343f}'
            | '\u{1bca0}'..='\u{1bca3}'
            | '\u{1d173}'..='\u{1d17a}'
            | '\u{e0001}'
            | '\u{e0020}'..='\u{e007f}'
    )
}

/// Co.
fn is_private_use(c: char) -> bool {
    matches!(
        c,
        '\u{e000}'..='\u{f8ff}' | '\u{f0000}'..='\u{ffffd}' | '\u{100000}'..='\u{10fffd}'
    )
}

/// Appends `c` to `out`, escaped for a basic string.
pub fn push_escaped(out: &mut String, c: char) {
    if let Some(escape) = short_escape(c) {
        out.push_str(escape);
    } else if should_unicode_escape(c) || is_control(c) {
        let code = u32::from(c);
        if code > 0xffff {
            out.push_str(&format!("\\U{code:08x}"));
        } else {
            out.push_str(&format!("\\u{code:04x}"));
        }
    } else {
        out.push(c);
    }
}

/// Escapes every character of `s` for an inline basic string.
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        push_escaped(&mut out, c);
    }
    out
}

/// Escapes `s` for a multi-line basic string, where `"` may stay raw.
pub fn escape_multi_line(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if c == '"' {
            out.push(c);
        } else {
            push_escaped(&mut out, c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_set_excludes_tab() {
        assert!(is_control('\u{0}'));
        assert!(is_control('\u{1f}'));
        assert!(is_control('\u{7f}'));
        assert!(is_control('\n'));
        assert!(!is_control('\t'));
        assert!(!is_control(' '));
    }

    #[test]
    fn test_unicode_escape_classification() {
        assert!(!should_unicode_escape(' '));
        assert!(!should_unicode_escape('\n'));
        assert!(!should_unicode_escape('é'));
        assert!(!should_unicode_escape('ʞ'));
        assert!(should_unicode_escape('\u{0}'));
        assert!(should_unicode_escape('\u{a0}'));
        assert!(should_unicode_escape('\u{2028}'));
        assert!(should_unicode_escape('\u{200b}'));
        assert!(should_unicode_escape('\u{feff}'));
        assert!(should_unicode_escape('\u{e000}'));
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape("a\"b\\c"), "a\\\"b\\\\c");
        assert_eq!(escape("tab\there"), "tab\\there");
        assert_eq!(escape("\u{1}"), "\\u0001");
        assert_eq!(escape("\u{7f}"), "\\u007f");
        assert_eq!(escape("\u{a0}"), "\\u00a0");
        assert_eq!(escape("\u{f0000}"), "\\U000f0000");
        assert_eq!(escape("José"), "José");
    }

    #[test]
    fn test_escape_multi_line_keeps_quotes() {
        assert_eq!(escape_multi_line("say \"hi\"\\"), "say \"hi\"\\\\");
    }

    #[test]
    fn test_bare_keys() {
        assert!(is_bare_key("bare_key"));
        assert!(is_bare_key("bare-key"));
        assert!(is_bare_key("1234"));
        assert!(!is_bare_key(""));
        assert!(!is_bare_key("127.0.0.1"));
        assert!(!is_bare_key("character encoding"));
        assert!(!is_bare_key("ʎǝʞ"));
    }

    #[test]
    fn test_number_patterns() {
        let float = float_regex().find("224_617.445_991_228").map(|m| m.as_str());
        assert_eq!(float, Some("224_617.445_991_228"));
        assert_eq!(int_regex().find("+99 ").map(|m| m.as_str()), Some("+99"));
        assert_eq!(hex_regex().find("0xdead_beef").map(|m| m.as_str()), Some("0xdead_beef"));
        assert!(hex_regex().find("0xg").is_none());
        assert!(int_regex().find("_1").is_none());
    }

    #[test]
    fn test_datetime_patterns() {
        let caps = datetime_regex()
            .captures("1979-05-27 00:32:00.999999-07:00")
            .expect("datetime should match");
        assert_eq!(&caps[1], "1979");
        assert_eq!(&caps[7], "999999");
        assert_eq!(&caps[8], "-07:00");
        assert!(time_regex().find("1979-05-27").is_none());
        assert_eq!(
            time_regex().find("00:32:00.9").map(|m| m.as_str()),
            Some("00:32:00")
        );
    }
}
