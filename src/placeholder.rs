//! The placeholder marker: U+FFFC OBJECT REPLACEMENT CHARACTER.
//!
//! A replacement string containing the marker means "insert a copy of the
//! looked-up key here". Every lookup kind expands it through this module so
//! the convention stays identical across offset, range and map lookups and
//! across regex replacements (where the key is the matched span).
//!
//! ```
//! use glyphic::placeholder::{PLACEHOLDER, fill};
//!
//! let template = format!("{PLACEHOLDER}\u{20E0}");
//! assert_eq!(fill(&template, "z"), "z\u{20E0}");
//! ```

use memchr::memmem;
use std::borrow::Cow;

/// The one placeholder marker shared by every lookup kind.
pub const PLACEHOLDER: char = '\u{FFFC}';

/// [`PLACEHOLDER`] as a string slice, also the value of an unset default.
pub const PLACEHOLDER_STR: &str = "\u{FFFC}";

// UTF-8 encoding of U+FFFC
const PLACEHOLDER_UTF8: &[u8] = b"\xEF\xBF\xBC";

#[inline(always)]
pub fn contains_placeholder(text: &str) -> bool {
    memmem::find(text.as_bytes(), PLACEHOLDER_UTF8).is_some()
}

/// Replace every marker in `template` with one copy of `key`.
///
/// Returns the template borrowed when it holds no marker.
pub fn fill<'a>(template: &'a str, key: &str) -> Cow<'a, str> {
    let bytes = template.as_bytes();
    let mut hits = memmem::find_iter(bytes, PLACEHOLDER_UTF8).peekable();
    if hits.peek().is_none() {
        return Cow::Borrowed(template);
    }

    let mut out = String::with_capacity(template.len() + key.len());
    let mut last = 0;
    for at in hits {
        // The marker is a whole scalar value, so `at` is a char boundary.
        out.push_str(&template[last..at]);
        out.push_str(key);
        last = at + PLACEHOLDER_UTF8.len();
    }
    out.push_str(&template[last..]);
    Cow::Owned(out)
}

/// Fill `template` with the character at code point `key`.
///
/// Keys that are not Unicode scalar values (surrogates, values past
/// U+10FFFF) cannot be rendered; the template is returned unchanged.
#[inline]
pub fn fill_code_point(template: &str, key: u32) -> Cow<'_, str> {
    match char::from_u32(key) {
        Some(c) => {
            let mut buf = [0u8; 4];
            fill(template, c.encode_utf8(&mut buf))
        }
        None => Cow::Borrowed(template),
    }
}

/// Values that can carry a placeholder and be re-rendered with a key.
///
/// Range tables are generic over their value type; only values that
/// implement this trait can be looked up with `copy_key` enabled.
pub trait KeyCopy: Clone {
    /// Returns `None` when the value holds no marker and is reused as-is.
    fn copy_key(&self, key: u32) -> Option<Self>;
}

impl KeyCopy for String {
    fn copy_key(&self, key: u32) -> Option<Self> {
        match fill_code_point(self, key) {
            Cow::Owned(s) => Some(s),
            Cow::Borrowed(_) => None,
        }
    }
}

impl KeyCopy for Option<String> {
    fn copy_key(&self, key: u32) -> Option<Self> {
        self.as_ref().and_then(|s| s.copy_key(key)).map(Some)
    }
}

impl KeyCopy for bool {
    #[inline(always)]
    fn copy_key(&self, _key: u32) -> Option<Self> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_utf8_matches_char() {
        let mut buf = [0u8; 4];
        assert_eq!(PLACEHOLDER.encode_utf8(&mut buf).as_bytes(), PLACEHOLDER_UTF8);
        assert_eq!(PLACEHOLDER_STR.chars().next(), Some(PLACEHOLDER));
    }

    #[test]
    fn test_fill_without_marker_borrows() {
        let out = fill("plain", "x");
        assert!(matches!(out, Cow::Borrowed("plain")));
    }

    #[test]
    fn test_fill_every_occurrence() {
        let template = "\u{FFFC}-\u{FFFC}";
        assert_eq!(fill(template, "ab"), "ab-ab");
    }

    #[test]
    fn test_fill_keeps_surrounding_text() {
        let template = "[\u{FFFC}]\u{20DD}";
        assert_eq!(fill(template, "Ж"), "[Ж]\u{20DD}");
    }

    #[test]
    fn test_fill_code_point_surrogate_is_left_alone() {
        let out = fill_code_point("\u{FFFC}!", 0xD800);
        assert_eq!(out, "\u{FFFC}!");
    }

    #[test]
    fn test_key_copy_impls() {
        assert_eq!(
            String::from("\u{FFFC}\u{2713}").copy_key('A' as u32),
            Some("A\u{2713}".to_string())
        );
        assert_eq!(String::from("same").copy_key('A' as u32), None);
        assert_eq!(None::<String>.copy_key(65), None);
        assert_eq!(true.copy_key(65), None);
    }

    #[test]
    fn test_contains_placeholder() {
        assert!(contains_placeholder("a\u{FFFC}"));
        assert!(!contains_placeholder("abc"));
        assert!(!contains_placeholder(""));
    }
}
