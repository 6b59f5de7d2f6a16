//! XML entity decoding.
//!
//! Text and attribute values coming out of the tokenizer pass through
//! [`unescape`], which resolves the five predefined entities and numeric
//! character references.

use memchr::memchr;
use std::borrow::Cow;

/// Error type for unescape operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnescapeError {
    /// The invalid entity that caused the error.
    pub entity: String,
    /// Position in the input where the error occurred.
    pub position: usize,
}

impl std::fmt::Display for UnescapeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid XML entity '{}' at position {}", self.entity, self.position)
    }
}

impl std::error::Error for UnescapeError {}

/// Unescapes XML entities in a string.
///
/// Returns a `Cow<str>` to avoid allocation when no unescaping is needed.
#[inline]
pub fn unescape(s: &str) -> Result<Cow<'_, str>, UnescapeError> {
    if memchr(b'&', s.as_bytes()).is_none() {
        return Ok(Cow::Borrowed(s));
    }

    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    let mut consumed = 0;

    while let Some(amp) = memchr(b'&', rest.as_bytes()) {
        out.push_str(&rest[..amp]);
        let entity_start = consumed + amp;
        let after = &rest[amp + 1..];

        let len = match memchr(b';', after.as_bytes()) {
            Some(len) if len > 0 => len,
            _ => {
                return Err(UnescapeError {
                    entity: String::from("&"),
                    position: entity_start,
                })
            }
        };

        let entity = &after[..len];
        match decode_entity(entity).or_else(|| decode_numeric_entity(entity)) {
            Some(c) => out.push(c),
            None => {
                return Err(UnescapeError {
                    entity: format!("&{};", entity),
                    position: entity_start,
                })
            }
        }

        // '&' and ';' are ASCII, so these offsets stay on char boundaries.
        let skip = amp + 1 + len + 1;
        consumed += skip;
        rest = &rest[skip..];
    }

    out.push_str(rest);
    Ok(Cow::Owned(out))
}

#[inline]
fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "lt" => Some('<'),
        "gt" => Some('>'),
        "amp" => Some('&'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => None,
    }
}

/// Decodes a numeric character reference (&#NNN; or &#xHHH;).
fn decode_numeric_entity(entity: &str) -> Option<char> {
    let digits = entity.strip_prefix('#')?;
    let (radix, digits) = match digits.strip_prefix(['x', 'X']) {
        Some(hex) => (16, hex),
        None => (10, digits),
    };

    // `from_str_radix` would also take a leading sign.
    if digits.is_empty() || !digits.bytes().all(|b| (b as char).is_digit(radix)) {
        return None;
    }

    let code = u32::from_str_radix(digits, radix).ok()?;
    char::from_u32(code).filter(|&c| is_xml_char(c))
}

/// The XML 1.0 `Char` production.
#[inline]
fn is_xml_char(c: char) -> bool {
    matches!(c,
        '\u{9}' | '\u{A}' | '\u{D}'
        | '\u{20}'..='\u{D7FF}'
        | '\u{E000}'..='\u{FFFD}'
        | '\u{10000}'..='\u{10FFFF}')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unescape_no_entities() {
        let s = "Hello, World!";
        let unescaped = unescape(s).unwrap();
        assert!(matches!(unescaped, Cow::Borrowed(_)));
        assert_eq!(unescaped, s);
    }

    #[test]
    fn test_unescape_predefined() {
        assert_eq!(unescape("&lt;").unwrap(), "<");
        assert_eq!(unescape("&gt;").unwrap(), ">");
        assert_eq!(unescape("&amp;").unwrap(), "&");
        assert_eq!(unescape("&quot;").unwrap(), "\"");
        assert_eq!(unescape("&apos;").unwrap(), "'");
    }

    #[test]
    fn test_unescape_mixed() {
        assert_eq!(
            unescape("Fish &amp; Chips &lt;b&gt;café&lt;/b&gt;").unwrap(),
            "Fish & Chips <b>café</b>"
        );
    }

    #[test]
    fn test_unescape_numeric() {
        assert_eq!(unescape("&#65;").unwrap(), "A");
        assert_eq!(unescape("&#8364;").unwrap(), "€");
        assert_eq!(unescape("&#x41;").unwrap(), "A");
        assert_eq!(unescape("&#X20AC;").unwrap(), "€");
    }

    #[test]
    fn test_unescape_invalid_entity() {
        let err = unescape("ok &invalid; ok").unwrap_err();
        assert_eq!(err.entity, "&invalid;");
        assert_eq!(err.position, 3);
    }

    #[test]
    fn test_unescape_unterminated_entity() {
        assert!(unescape("&lt").is_err());
        assert!(unescape("a & b").is_err());
        assert!(unescape("&#;").is_err());
    }

    #[test]
    fn test_unescape_rejects_signed_references() {
        assert!(unescape("&#+65;").is_err());
        assert!(unescape("&#-65;").is_err());
        assert!(unescape("&#x+41;").is_err());
    }

    #[test]
    fn test_unescape_rejects_non_xml_chars() {
        assert!(unescape("&#0;").is_err());
        assert!(unescape("&#x1F;").is_err());
        assert!(unescape("&#xFFFE;").is_err());
        assert_eq!(unescape("&#9;&#10;&#13;").unwrap(), "\t\n\r");
        assert_eq!(unescape("&#x1F600;").unwrap(), "\u{1F600}");
    }
}
