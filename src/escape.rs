//! Unicode Escape Normalizer
//!
//! Converts `\uXXXX` escape sequences (4 hex digits, case-insensitive) into
//! the octal byte escapes of the code point's UTF-8 encoding, so that table
//! fields and C sources authored with `\uXXXX` escapes end up as plain byte
//! sequences the C compiler accepts.
//!
//! Surrogate halves are not paired: each `\uXXXX` unit is encoded
//! independently as the UTF-8 form of its raw 16-bit value. Existing table
//! files rely on this, so it is kept as-is.

use std::sync::OnceLock;

use regex::{Captures, Regex};

fn unicode_escape_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        // The pattern is a literal and always compiles.
        Regex::new(r"\\u([0-9A-Fa-f]{4})").unwrap_or_else(|e| panic!("invalid escape pattern: {}", e))
    })
}

/// Replace every `\uXXXX` escape in `text` with octal UTF-8 byte escapes.
///
/// Text without any `\uXXXX` escapes is returned unchanged, so applying the
/// normalizer twice is the same as applying it once.
///
/// # Example
/// ```
/// use multilang::escape::normalize_unicode_escapes;
///
/// assert_eq!(normalize_unicode_escapes(r"\u4f60\u597d"), r"\344\275\240\345\245\275");
/// assert_eq!(normalize_unicode_escapes("plain text"), "plain text");
/// ```
pub fn normalize_unicode_escapes(text: &str) -> String {
    unicode_escape_pattern()
        .replace_all(text, |caps: &Captures<'_>| {
            // The capture is exactly 4 hex digits, so parsing cannot fail.
            let code_point = u32::from_str_radix(&caps[1], 16).unwrap_or(0);
            encode_octal_utf8(code_point)
        })
        .into_owned()
}

/// Encode one code point as three-digit octal escapes of its UTF-8 bytes.
///
/// The byte length is selected by code-point range:
/// - `<= 0x7F`: one byte, the code point itself
/// - `<= 0x7FF`: `110xxxxx 10xxxxxx`
/// - `<= 0xFFFF`: `1110xxxx 10xxxxxx 10xxxxxx`
/// - otherwise (up to 0x10FFFF): `11110xxx 10xxxxxx 10xxxxxx 10xxxxxx`
///
/// A 4-hex-digit escape can never reach the four-byte branch; it exists so
/// the encoder covers the full UTF-8 range.
pub(crate) fn encode_octal_utf8(code_point: u32) -> String {
    if code_point <= 0x7F {
        format!("\\{:03o}", code_point)
    } else if code_point <= 0x7FF {
        let byte1 = 0xC0 | (code_point >> 6);
        let byte2 = 0x80 | (code_point & 0x3F);
        format!("\\{:03o}\\{:03o}", byte1, byte2)
    } else if code_point <= 0xFFFF {
        let byte1 = 0xE0 | (code_point >> 12);
        let byte2 = 0x80 | ((code_point >> 6) & 0x3F);
        let byte3 = 0x80 | (code_point & 0x3F);
        format!("\\{:03o}\\{:03o}\\{:03o}", byte1, byte2, byte3)
    } else {
        let byte1 = 0xF0 | (code_point >> 18);
        let byte2 = 0x80 | ((code_point >> 12) & 0x3F);
        let byte3 = 0x80 | ((code_point >> 6) & 0x3F);
        let byte4 = 0x80 | (code_point & 0x3F);
        format!("\\{:03o}\\{:03o}\\{:03o}\\{:03o}", byte1, byte2, byte3, byte4)
    }
}
