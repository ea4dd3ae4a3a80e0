//! Fixed UTC offsets for offset date-times.
//!
//! RFC 3339 offsets are either `Z` or `±HH:MM`. The decoder turns that text
//! into a [`FixedOffset`]; the encoder turns it back into `±HH:MM`, writing a
//! zero offset as `+00:00`.
//!
//! ```rust
//! use tidy_toml::offset::{fixed_offset, format_offset};
//!
//! let offset = fixed_offset("-07:00").unwrap();
//! assert_eq!(offset.local_minus_utc(), -7 * 3600);
//! assert_eq!(format_offset(&offset), "-07:00");
//! assert_eq!(format_offset(&fixed_offset("Z").unwrap()), "+00:00");
//! ```

use chrono::FixedOffset;

/// Parses `Z` or `±HH:MM` into a fixed offset.
///
/// Returns `None` for any other text, and for hours above 23 or minutes above 59.
#[must_use]
pub fn fixed_offset(text: &str) -> Option<FixedOffset> {
    if text == "Z" {
        return FixedOffset::east_opt(0);
    }

    let (sign, rest) = match text.as_bytes().first()? {
        b'+' => (1, &text[1..]),
        b'-' => (-1, &text[1..]),
        _ => return None,
    };
    let (hours, minutes) = rest.split_once(':')?;
    let two_digits = |s: &str| s.len() == 2 && s.bytes().all(|b| b.is_ascii_digit());
    if !two_digits(hours) || !two_digits(minutes) {
        return None;
    }
    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    if hours > 23 || minutes > 59 {
        return None;
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

/// Renders an offset as `±HH:MM`.
#[must_use]
pub fn format_offset(offset: &FixedOffset) -> String {
    let seconds = offset.local_minus_utc();
    let sign = if seconds < 0 { '-' } else { '+' };
    let minutes = seconds.abs() / 60;
    format!("{}{:02}:{:02}", sign, minutes / 60, minutes % 60)
}
